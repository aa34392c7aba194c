//! The date-picker controller.
//!
//! A [`DatePicker`] owns the selection state, the resolved start date, the
//! touch-UI flag, and the open/close lifecycle of at most one presentation
//! session. It composes exactly one registered [`DatePickerInput`], one
//! [`PresentationMode`] chosen per open, and any number of value-accessor
//! bridges.
//!
//! Selection writes are origin-tagged. For one assignment the order is
//! fixed: internal state commits first, then every bridge (except the
//! originating one) is pushed, then the input text is reformatted (except
//! when the text itself originated the write), then the session is asked
//! to close (API/calendar origin only). No lock is held while bridges,
//! the input, or host listeners run.

use crate::accessor::{ValueAccessor, ValueAccessorBridge};
use crate::input::DatePickerInput;
use crate::surface::{CalendarView, PresentationMode, PresentationSession, SelectHandler};
use fechar_core::{EventKind, Host, PickerError, PlainDate};
use std::sync::atomic::Ordering;
use std::sync::{Arc, RwLock, Weak};

/// Where a selection write came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOrigin {
    /// The public setter or a calendar pick.
    Api,
    /// The user typing into the bound input.
    UserText,
    /// An external consumer, identified by its bridge index.
    External(usize),
}

struct PickerState {
    selected: Option<PlainDate>,
    start_at: Option<PlainDate>,
    explicit_start_at: Option<PlainDate>,
    touch_ui: bool,
    input: Option<DatePickerInput>,
    session: Option<PresentationSession>,
    bridges: Vec<ValueAccessorBridge>,
}

pub(crate) struct PickerInner {
    host: Host,
    state: RwLock<PickerState>,
}

/// Cloneable handle to a date-picker controller.
#[derive(Clone)]
pub struct DatePicker {
    inner: Arc<PickerInner>,
}

/// Weak handle used by listeners so wiring never keeps a picker alive.
#[derive(Clone)]
pub(crate) struct WeakDatePicker(Weak<PickerInner>);

impl WeakDatePicker {
    pub(crate) fn upgrade(&self) -> Option<DatePicker> {
        self.0.upgrade().map(|inner| DatePicker { inner })
    }
}

impl DatePicker {
    /// Create a picker bound to a host tree.
    #[must_use]
    pub fn new(host: &Host) -> Self {
        Self {
            inner: Arc::new(PickerInner {
                host: host.clone(),
                state: RwLock::new(PickerState {
                    selected: None,
                    start_at: None,
                    explicit_start_at: None,
                    touch_ui: false,
                    input: None,
                    session: None,
                    bridges: Vec::new(),
                }),
            }),
        }
    }

    /// Configure the touch-UI flag (dialog presentation when set).
    #[must_use]
    pub fn with_touch_ui(self, touch_ui: bool) -> Self {
        self.state_mut().touch_ui = touch_ui;
        self
    }

    /// Configure an explicit start date, overriding the input-derived
    /// default.
    #[must_use]
    pub fn with_start_at(self, start_at: Option<PlainDate>) -> Self {
        {
            let mut state = self.state_mut();
            state.explicit_start_at = start_at;
            state.start_at = start_at;
        }
        self
    }

    // === State accessors ===

    /// The current selection.
    #[must_use]
    pub fn selected(&self) -> Option<PlainDate> {
        self.state().selected
    }

    /// The resolved start date: the explicit configuration, else the bound
    /// input's value at registration, else empty.
    #[must_use]
    pub fn start_at(&self) -> Option<PlainDate> {
        self.state().start_at
    }

    /// Whether the picker presents as a modal dialog.
    #[must_use]
    pub fn is_touch_ui(&self) -> bool {
        self.state().touch_ui
    }

    /// Whether a presentation session is active.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state().session.is_some()
    }

    /// Switch between dialog and popup presentation. Read once per open.
    pub fn set_touch_ui(&self, touch_ui: bool) {
        self.state_mut().touch_ui = touch_ui;
    }

    /// Explicitly reconfigure the start date. Passing `None` falls back to
    /// the bound input's current value.
    pub fn set_start_at(&self, start_at: Option<PlainDate>) {
        let mut state = self.state_mut();
        state.explicit_start_at = start_at;
        let resolved = start_at.or_else(|| state.input.as_ref().and_then(DatePickerInput::value));
        state.start_at = resolved;
    }

    // === Selection ===

    /// Set the selection.
    ///
    /// A changed value propagates to every attached accessor and the bound
    /// input, then closes the active session; selecting the current value
    /// changes nothing. The session's removal from the host tree completes
    /// at the next settle checkpoint.
    pub fn set_selected(&self, value: Option<PlainDate>) {
        self.apply_selection(value, WriteOrigin::Api);
    }

    // === Lifecycle ===

    /// Open the presentation surface.
    ///
    /// Chooses dialog presentation when the touch-UI flag is set, popup
    /// otherwise; a popup is anchored at the registered input's resolved
    /// connection element. Opening an already-open picker is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::NoInputRegistered`] when no input has been
    /// registered.
    pub fn open(&self) -> Result<(), PickerError> {
        let (input, mode, view) = {
            let state = self.state();
            if state.session.is_some() {
                return Ok(());
            }
            let input = state
                .input
                .clone()
                .ok_or(PickerError::NoInputRegistered)?;
            let mode = if state.touch_ui {
                PresentationMode::Dialog
            } else {
                PresentationMode::Popup
            };
            let view = CalendarView {
                selected: state.selected,
                start_at: state.start_at,
            };
            (input, mode, view)
        };

        let host = self.inner.host.clone();
        let anchor = match mode {
            PresentationMode::Popup => Some(input.popup_connection_element()),
            PresentationMode::Dialog => None,
        };

        let weak = self.downgrade();
        let on_select: SelectHandler = Arc::new(move |date| {
            if let Some(picker) = weak.upgrade() {
                picker.set_selected(Some(date));
            }
        });

        let mut session = mode.render(&host, anchor, view, on_select);
        if mode == PresentationMode::Popup {
            let pane = session.root();
            let weak = self.downgrade();
            let host_for_listener = host.clone();
            let listener = host.on_global(EventKind::Click, move |target, _| {
                if host_for_listener.is_within(target, pane) {
                    return;
                }
                if let Some(picker) = weak.upgrade() {
                    picker.close();
                }
            });
            session.set_outside_listener(listener);
        }

        self.state_mut().session = Some(session);
        Ok(())
    }

    /// Close the active presentation session, if any.
    ///
    /// Idempotent. The surface leaves the host tree at the next settle
    /// checkpoint; `is_open` flips immediately.
    pub fn close(&self) {
        let session = self.state_mut().session.take();
        if let Some(session) = session {
            session.close(&self.inner.host);
        }
    }

    // === Composition ===

    /// Attach an external value consumer.
    ///
    /// Wires the accessor's change subscription through an origin-guarded
    /// bridge (external changes apply after one settle step; the picker's
    /// own writes are never echoed back), wires disabled-state changes to
    /// the bound input, and adopts a pre-existing accessor value when the
    /// picker has none.
    pub fn connect(&self, accessor: Arc<dyn ValueAccessor>) {
        let bridge = ValueAccessorBridge::new(accessor.clone());
        let guard = bridge.guard();
        let index = {
            let mut state = self.state_mut();
            state.bridges.push(bridge);
            state.bridges.len() - 1
        };

        let weak = self.downgrade();
        let host = self.inner.host.clone();
        accessor.subscribe(Box::new(move |value| {
            if guard.load(Ordering::SeqCst) {
                return;
            }
            let weak = weak.clone();
            host.defer(move || {
                if let Some(picker) = weak.upgrade() {
                    picker.apply_selection(value, WriteOrigin::External(index));
                }
            });
        }));

        let weak = self.downgrade();
        accessor.on_disabled_change(Box::new(move |disabled| {
            if let Some(picker) = weak.upgrade() {
                if let Some(input) = picker.registered_input() {
                    input.set_disabled(disabled);
                }
            }
        }));

        if let Some(value) = accessor.get_value() {
            if self.selected().is_none() {
                let weak = self.downgrade();
                self.inner.host.defer(move || {
                    if let Some(picker) = weak.upgrade() {
                        picker.apply_selection(Some(value), WriteOrigin::External(index));
                    }
                });
            }
        }
    }

    // === Crate-internal wiring ===

    pub(crate) fn downgrade(&self) -> WeakDatePicker {
        WeakDatePicker(Arc::downgrade(&self.inner))
    }

    /// Register the picker's single input. The existing registration is
    /// kept on failure.
    pub(crate) fn register_input(&self, input: &DatePickerInput) -> Result<(), PickerError> {
        let mut state = self.state_mut();
        if state.input.is_some() {
            return Err(PickerError::MultipleInputsRegistered);
        }
        state.input = Some(input.clone());
        if state.start_at.is_none() {
            let resolved = state.explicit_start_at.or_else(|| input.value());
            state.start_at = resolved;
        }
        Ok(())
    }

    pub(crate) fn registered_input(&self) -> Option<DatePickerInput> {
        self.state().input.clone()
    }

    /// A live text edit on the bound input: mark every accessor dirty,
    /// then apply the best-effort parse (malformed text degrades to an
    /// empty selection, it never errors).
    pub(crate) fn handle_user_input(&self, text: &str) {
        let bridges = self.state().bridges.clone();
        for bridge in &bridges {
            bridge.mark_dirty();
        }
        self.apply_selection(PlainDate::parse(text).ok(), WriteOrigin::UserText);
    }

    /// The bound input lost focus: mark every accessor touched.
    pub(crate) fn handle_blur(&self) {
        let bridges = self.state().bridges.clone();
        for bridge in &bridges {
            bridge.mark_touched();
        }
    }

    fn apply_selection(&self, value: Option<PlainDate>, origin: WriteOrigin) {
        let (bridges, input) = {
            let mut state = self.state_mut();
            if state.selected == value {
                return;
            }
            state.selected = value;
            (state.bridges.clone(), state.input.clone())
        };

        for (index, bridge) in bridges.iter().enumerate() {
            if origin == WriteOrigin::External(index) {
                continue;
            }
            bridge.push_from_picker(value);
        }

        if origin != WriteOrigin::UserText {
            if let Some(input) = &input {
                input.write_value(value);
            }
        }

        if origin == WriteOrigin::Api {
            self.close();
        }
    }

    // === Lock helpers ===

    fn state(&self) -> std::sync::RwLockReadGuard<'_, PickerState> {
        self.inner.state.read().expect("picker state lock poisoned")
    }

    fn state_mut(&self) -> std::sync::RwLockWriteGuard<'_, PickerState> {
        self.inner.state.write().expect("picker state lock poisoned")
    }
}
