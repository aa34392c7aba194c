//! The text-input surface bound to a picker.
//!
//! A [`DatePickerInput`] wraps one host `Input` element: it parses and
//! formats the selection as `M/D/YYYY` text, resolves the element popups
//! anchor to, and registers itself with exactly one picker. Live `Input`
//! events flow into the picker's user-text path, focus opens the picker,
//! and blur marks attached accessors touched. Controller-driven text
//! writes go through a reentrancy guard so they are never mistaken for
//! user edits.

use crate::picker::DatePicker;
use fechar_core::{ElementId, ElementKind, EventKind, Host, PickerError, PlainDate, UiEvent};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct InputInner {
    host: Host,
    element: ElementId,
    /// Raised while the controller rewrites the text programmatically.
    suppress_events: AtomicBool,
}

/// Cloneable handle to the input surface bound to a picker.
#[derive(Clone)]
pub struct DatePickerInput {
    inner: Arc<InputInner>,
}

impl DatePickerInput {
    /// Bind a host input element to a picker.
    ///
    /// Registers with the picker first — a picker accepts exactly one
    /// input, and a failed registration wires nothing — then listens for
    /// live text edits, focus (which opens the picker), and blur.
    ///
    /// # Errors
    ///
    /// Returns [`PickerError::MultipleInputsRegistered`] when the picker
    /// already has a registered input; the existing registration is kept.
    pub fn attach(
        host: &Host,
        element: ElementId,
        picker: &DatePicker,
    ) -> Result<Self, PickerError> {
        let input = Self {
            inner: Arc::new(InputInner {
                host: host.clone(),
                element,
                suppress_events: AtomicBool::new(false),
            }),
        };
        picker.register_input(&input)?;

        let weak = picker.downgrade();
        let inner = Arc::downgrade(&input.inner);
        host.on(element, EventKind::Input, move |event| {
            if let UiEvent::Input { text } = event {
                let Some(inner) = inner.upgrade() else { return };
                if inner.suppress_events.load(Ordering::SeqCst) {
                    return;
                }
                if let Some(picker) = weak.upgrade() {
                    picker.handle_user_input(text);
                }
            }
        });

        let weak = picker.downgrade();
        host.on(element, EventKind::Focus, move |_| {
            if let Some(picker) = weak.upgrade() {
                // Registration is checked above; an attached input can
                // always open its picker.
                picker
                    .open()
                    .expect("attached input is registered with its picker");
            }
        });

        let weak = picker.downgrade();
        host.on(element, EventKind::Blur, move |_| {
            if let Some(picker) = weak.upgrade() {
                picker.handle_blur();
            }
        });

        Ok(input)
    }

    /// The host element this input wraps.
    #[must_use]
    pub fn element(&self) -> ElementId {
        self.inner.element
    }

    /// Current displayed text.
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.host.text(self.inner.element)
    }

    /// Best-effort parse of the displayed text.
    ///
    /// Unparseable text silently reads as no selection; malformed user
    /// input is a local condition, never a picker error.
    #[must_use]
    pub fn value(&self) -> Option<PlainDate> {
        PlainDate::parse(&self.text()).ok()
    }

    /// The element a popup should anchor to.
    ///
    /// Defaults to the input element itself; an input nested inside a
    /// decorated field wrapper resolves to the wrapper's underline element
    /// instead, so the overlay aligns with the visible field boundary.
    /// Stable across calls while the tree around the input is unchanged.
    #[must_use]
    pub fn popup_connection_element(&self) -> ElementId {
        let host = &self.inner.host;
        host.ancestor_of_kind(self.inner.element, ElementKind::FieldWrapper)
            .and_then(|wrapper| host.child_of_kind(wrapper, ElementKind::Underline))
            .unwrap_or(self.inner.element)
    }

    /// Set the disabled flag of the underlying element.
    pub fn set_disabled(&self, disabled: bool) {
        self.inner.host.set_disabled(self.inner.element, disabled);
    }

    /// Whether the underlying element is disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.inner.host.is_disabled(self.inner.element)
    }

    /// Controller-driven text rewrite; an empty selection renders as an
    /// empty string. Guarded so it is never observed as a user edit.
    pub(crate) fn write_value(&self, value: Option<PlainDate>) {
        self.inner.suppress_events.store(true, Ordering::SeqCst);
        self.inner.host.set_text(
            self.inner.element,
            value.map(|d| d.to_string()).unwrap_or_default(),
        );
        self.inner.suppress_events.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(year: i32, month: u8, day: u8) -> PlainDate {
        PlainDate::new(year, month, day).unwrap()
    }

    fn attach_input(host: &Host) -> (DatePicker, DatePickerInput, ElementId) {
        let element = host.create_element(ElementKind::Input);
        let picker = DatePicker::new(host);
        let input = DatePickerInput::attach(host, element, &picker).unwrap();
        (picker, input, element)
    }

    #[test]
    fn test_value_parses_displayed_text() {
        let host = Host::new();
        let (_picker, input, element) = attach_input(&host);

        host.set_text(element, "1/1/2020");
        assert_eq!(input.value(), Some(date(2020, 1, 1)));
        assert_eq!(input.text(), "1/1/2020");
    }

    #[test]
    fn test_unparseable_text_reads_as_empty() {
        let host = Host::new();
        let (_picker, input, element) = attach_input(&host);

        host.set_text(element, "not a date");
        assert_eq!(input.value(), None);
        host.set_text(element, "");
        assert_eq!(input.value(), None);
    }

    #[test]
    fn test_connection_element_defaults_to_input() {
        let host = Host::new();
        let (_picker, input, element) = attach_input(&host);
        assert_eq!(input.popup_connection_element(), element);
    }

    #[test]
    fn test_connection_element_prefers_wrapper_underline() {
        let host = Host::new();
        let wrapper = host.create_element(ElementKind::FieldWrapper);
        let element = host.create_child(wrapper, ElementKind::Input);
        let underline = host.create_child(wrapper, ElementKind::Underline);

        let picker = DatePicker::new(&host);
        let input = DatePickerInput::attach(&host, element, &picker).unwrap();

        assert_eq!(input.popup_connection_element(), underline);
        // Stable across calls.
        assert_eq!(input.popup_connection_element(), underline);
    }

    #[test]
    fn test_wrapper_without_underline_falls_back_to_input() {
        let host = Host::new();
        let wrapper = host.create_element(ElementKind::FieldWrapper);
        let element = host.create_child(wrapper, ElementKind::Input);

        let picker = DatePicker::new(&host);
        let input = DatePickerInput::attach(&host, element, &picker).unwrap();
        assert_eq!(input.popup_connection_element(), element);
    }

    #[test]
    fn test_write_value_formats_and_clears() {
        let host = Host::new();
        let (_picker, input, _element) = attach_input(&host);

        input.write_value(Some(date(2017, 1, 1)));
        assert_eq!(input.text(), "1/1/2017");
        input.write_value(None);
        assert_eq!(input.text(), "");
    }

    #[test]
    fn test_live_input_updates_selection() {
        let host = Host::new();
        let (picker, _input, element) = attach_input(&host);

        host.dispatch(
            element,
            &UiEvent::Input {
                text: "1/1/2017".into(),
            },
        );
        assert_eq!(picker.selected(), Some(date(2017, 1, 1)));
    }

    #[test]
    fn test_focus_opens_picker() {
        let host = Host::new();
        let (picker, _input, element) = attach_input(&host);

        host.dispatch(element, &UiEvent::Focus);
        assert!(picker.is_open());
    }

    #[test]
    fn test_disabled_flag_round_trip() {
        let host = Host::new();
        let (_picker, input, _element) = attach_input(&host);

        assert!(!input.is_disabled());
        input.set_disabled(true);
        assert!(input.is_disabled());
    }

    proptest::proptest! {
        // Formatting a selection into the input and parsing it back is the
        // identity; the empty selection renders and re-reads as empty text.
        #[test]
        fn prop_write_then_value_round_trips(
            year in 1900i32..=2100,
            month in 1u8..=12,
            day in 1u8..=28,
        ) {
            let host = Host::new();
            let (_picker, input, _element) = attach_input(&host);
            let written = date(year, month, day);

            input.write_value(Some(written));
            proptest::prop_assert_eq!(input.value(), Some(written));

            input.write_value(None);
            proptest::prop_assert_eq!(input.text(), "");
            proptest::prop_assert_eq!(input.value(), None);
        }
    }
}
