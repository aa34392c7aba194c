//! Two-way value synchronization with external consumers.
//!
//! A [`ValueAccessor`] is the capability set an external value consumer
//! (a model binding, a form control) exposes to the picker. The picker
//! pairs each accessor with a [`ValueAccessorBridge`] carrying a write
//! guard, so a change propagated from the picker is never echoed back to
//! the picker when the accessor notifies its subscribers.
//!
//! Two accessors ship with the crate: [`ModelBinding`] (a plain mutable
//! model slot) and [`FormControl`] (adds disabled state that propagates to
//! the bound input).

use fechar_core::PlainDate;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

/// Boxed listener for value changes.
pub type ChangeListener = Box<dyn Fn(Option<PlainDate>) + Send + Sync>;

/// Boxed listener for disabled-state changes.
pub type DisabledListener = Box<dyn Fn(bool) + Send + Sync>;

/// Stored form of a change listener.
type StoredListener = Arc<dyn Fn(Option<PlainDate>) + Send + Sync>;

/// Stored form of a disabled listener.
type StoredDisabledListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Capability set for an external value consumer.
///
/// `set_value` is the picker-to-consumer channel; consumer-to-picker flows
/// through `subscribe` notifications. Every value change notifies
/// subscribers regardless of origin — the bridge's write guard is what
/// keeps a picker-originated write from being applied back to the picker.
pub trait ValueAccessor: Send + Sync {
    /// Current value held by the consumer.
    fn get_value(&self) -> Option<PlainDate>;

    /// Write a value into the consumer and notify its subscribers.
    fn set_value(&self, value: Option<PlainDate>);

    /// Register a listener for value changes.
    fn subscribe(&self, listener: ChangeListener);

    /// Mark the consumer dirty (received a direct user edit).
    fn mark_dirty(&self);

    /// Mark the consumer touched (its field lost focus at least once).
    fn mark_touched(&self);

    /// Register a listener for disabled-state changes.
    ///
    /// Consumers without a disabled concept ignore the registration.
    fn on_disabled_change(&self, _listener: DisabledListener) {}
}

/// Pairing of an accessor with the directional write guard.
///
/// The guard is raised while the picker pushes a value into the accessor;
/// the picker's own change subscription checks it and drops the echo.
#[derive(Clone)]
pub struct ValueAccessorBridge {
    accessor: Arc<dyn ValueAccessor>,
    writing: Arc<AtomicBool>,
}

impl ValueAccessorBridge {
    pub(crate) fn new(accessor: Arc<dyn ValueAccessor>) -> Self {
        Self {
            accessor,
            writing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Handle to the write guard, for the change subscription to check.
    pub(crate) fn guard(&self) -> Arc<AtomicBool> {
        self.writing.clone()
    }

    /// Push a picker-originated value into the accessor under the guard.
    pub(crate) fn push_from_picker(&self, value: Option<PlainDate>) {
        self.writing.store(true, Ordering::SeqCst);
        self.accessor.set_value(value);
        self.writing.store(false, Ordering::SeqCst);
    }

    pub(crate) fn mark_dirty(&self) {
        self.accessor.mark_dirty();
    }

    pub(crate) fn mark_touched(&self) {
        self.accessor.mark_touched();
    }
}

struct ModelBindingInner {
    value: RwLock<Option<PlainDate>>,
    dirty: AtomicBool,
    touched: AtomicBool,
    subscribers: RwLock<Vec<StoredListener>>,
}

/// A plain mutable model slot with change subscribers.
///
/// `set` applies an external write, `get` reads, subscribers hear every
/// change.
#[derive(Clone)]
pub struct ModelBinding {
    inner: Arc<ModelBindingInner>,
}

impl Default for ModelBinding {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBinding {
    /// Create an empty model binding.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ModelBindingInner {
                value: RwLock::new(None),
                dirty: AtomicBool::new(false),
                touched: AtomicBool::new(false),
                subscribers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Current model value.
    #[must_use]
    pub fn get(&self) -> Option<PlainDate> {
        *self
            .inner
            .value
            .read()
            .expect("model binding value lock poisoned")
    }

    /// Apply a model write and notify subscribers.
    pub fn set(&self, value: Option<PlainDate>) {
        *self
            .inner
            .value
            .write()
            .expect("model binding value lock poisoned") = value;
        self.notify(value);
    }

    /// Whether the bound field has received direct user edits.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Whether the bound field has lost focus at least once.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.inner.touched.load(Ordering::SeqCst)
    }

    fn notify(&self, value: Option<PlainDate>) {
        let subscribers: Vec<StoredListener> = self
            .inner
            .subscribers
            .read()
            .expect("model binding subscriber lock poisoned")
            .clone();
        for subscriber in subscribers {
            subscriber(value);
        }
    }
}

impl ValueAccessor for ModelBinding {
    fn get_value(&self) -> Option<PlainDate> {
        self.get()
    }

    fn set_value(&self, value: Option<PlainDate>) {
        self.set(value);
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.inner
            .subscribers
            .write()
            .expect("model binding subscriber lock poisoned")
            .push(Arc::from(listener));
    }

    fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::SeqCst);
    }

    fn mark_touched(&self) {
        self.inner.touched.store(true, Ordering::SeqCst);
    }
}

struct FormControlInner {
    value: RwLock<Option<PlainDate>>,
    dirty: AtomicBool,
    touched: AtomicBool,
    disabled: AtomicBool,
    subscribers: RwLock<Vec<StoredListener>>,
    disabled_subscribers: RwLock<Vec<StoredDisabledListener>>,
}

/// A form-control value consumer: value plus dirty/touched/disabled state.
///
/// Disabling the control propagates to the input it is bound to through
/// the picker's disabled subscription.
#[derive(Clone)]
pub struct FormControl {
    inner: Arc<FormControlInner>,
}

impl Default for FormControl {
    fn default() -> Self {
        Self::new()
    }
}

impl FormControl {
    /// Create an enabled, empty form control.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(FormControlInner {
                value: RwLock::new(None),
                dirty: AtomicBool::new(false),
                touched: AtomicBool::new(false),
                disabled: AtomicBool::new(false),
                subscribers: RwLock::new(Vec::new()),
                disabled_subscribers: RwLock::new(Vec::new()),
            }),
        }
    }

    /// Current control value.
    #[must_use]
    pub fn value(&self) -> Option<PlainDate> {
        *self
            .inner
            .value
            .read()
            .expect("form control value lock poisoned")
    }

    /// Write the control value and notify subscribers.
    pub fn set_value(&self, value: Option<PlainDate>) {
        self.write_and_notify(value);
    }

    fn write_and_notify(&self, value: Option<PlainDate>) {
        *self
            .inner
            .value
            .write()
            .expect("form control value lock poisoned") = value;
        let subscribers: Vec<StoredListener> = self
            .inner
            .subscribers
            .read()
            .expect("form control subscriber lock poisoned")
            .clone();
        for subscriber in subscribers {
            subscriber(value);
        }
    }

    /// Disable the control (and any input bound through a picker).
    pub fn disable(&self) {
        self.set_disabled(true);
    }

    /// Re-enable the control.
    pub fn enable(&self) {
        self.set_disabled(false);
    }

    /// Whether the control is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.inner.disabled.load(Ordering::SeqCst)
    }

    /// Whether the control has received direct user edits.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.inner.dirty.load(Ordering::SeqCst)
    }

    /// Whether the control's field has lost focus at least once.
    #[must_use]
    pub fn is_touched(&self) -> bool {
        self.inner.touched.load(Ordering::SeqCst)
    }

    fn set_disabled(&self, disabled: bool) {
        self.inner.disabled.store(disabled, Ordering::SeqCst);
        let subscribers: Vec<StoredDisabledListener> = self
            .inner
            .disabled_subscribers
            .read()
            .expect("form control subscriber lock poisoned")
            .clone();
        for subscriber in subscribers {
            subscriber(disabled);
        }
    }
}

impl ValueAccessor for FormControl {
    fn get_value(&self) -> Option<PlainDate> {
        self.value()
    }

    fn set_value(&self, value: Option<PlainDate>) {
        self.write_and_notify(value);
    }

    fn subscribe(&self, listener: ChangeListener) {
        self.inner
            .subscribers
            .write()
            .expect("form control subscriber lock poisoned")
            .push(Arc::from(listener));
    }

    fn mark_dirty(&self) {
        self.inner.dirty.store(true, Ordering::SeqCst);
    }

    fn mark_touched(&self) {
        self.inner.touched.store(true, Ordering::SeqCst);
    }

    fn on_disabled_change(&self, listener: DisabledListener) {
        self.inner
            .disabled_subscribers
            .write()
            .expect("form control subscriber lock poisoned")
            .push(Arc::from(listener));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn date(year: i32, month: u8, day: u8) -> PlainDate {
        PlainDate::new(year, month, day).unwrap()
    }

    #[test]
    fn test_model_binding_set_notifies_subscribers() {
        let model = ModelBinding::new();
        let seen = Arc::new(RwLock::new(None));

        let seen_in_listener = seen.clone();
        model.subscribe(Box::new(move |value| {
            *seen_in_listener.write().unwrap() = value;
        }));

        model.set(Some(date(2017, 1, 1)));
        assert_eq!(model.get(), Some(date(2017, 1, 1)));
        assert_eq!(*seen.read().unwrap(), Some(date(2017, 1, 1)));
    }

    #[test]
    fn test_model_binding_dirty_and_touched_flags() {
        let model = ModelBinding::new();
        assert!(!model.is_dirty());
        assert!(!model.is_touched());

        model.mark_dirty();
        model.mark_touched();
        assert!(model.is_dirty());
        assert!(model.is_touched());
    }

    #[test]
    fn test_bridge_guard_suppresses_echo() {
        let model = ModelBinding::new();
        let bridge = ValueAccessorBridge::new(Arc::new(model.clone()));
        let guard = bridge.guard();

        let echoes = Arc::new(AtomicUsize::new(0));
        let echoes_in_listener = echoes.clone();
        model.subscribe(Box::new(move |_| {
            if guard.load(Ordering::SeqCst) {
                return;
            }
            echoes_in_listener.fetch_add(1, Ordering::SeqCst);
        }));

        bridge.push_from_picker(Some(date(2020, 6, 15)));
        assert_eq!(echoes.load(Ordering::SeqCst), 0);
        assert_eq!(model.get(), Some(date(2020, 6, 15)));

        model.set(Some(date(2021, 6, 15)));
        assert_eq!(echoes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_form_control_disable_notifies() {
        let control = FormControl::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        let seen_in_listener = seen.clone();
        control.on_disabled_change(Box::new(move |disabled| {
            seen_in_listener.write().unwrap().push(disabled);
        }));

        control.disable();
        control.enable();
        assert!(!control.is_disabled());
        assert_eq!(*seen.read().unwrap(), vec![true, false]);
    }

    #[test]
    fn test_form_control_value_round_trip() {
        let control = FormControl::new();
        assert_eq!(control.value(), None);
        control.set_value(Some(date(2017, 1, 1)));
        assert_eq!(control.value(), Some(date(2017, 1, 1)));
        assert_eq!(ValueAccessor::get_value(&control), Some(date(2017, 1, 1)));
    }
}
