//! Picker fixtures: a host tree plus a composed picker, built to order.
//!
//! A [`PickerFixture`] assembles the compositions integration tests need —
//! a bare input, an input inside a decorated field wrapper, a toggle
//! button, a model binding or form control — and exposes event-simulation
//! and settle helpers so tests read as user interactions.

use fechar_core::{ElementId, ElementKind, Host, PlainDate, UiEvent};
use fechar_widgets::{
    DatePicker, DatePickerInput, DatePickerToggle, FormControl, ModelBinding,
};
use std::sync::Arc;

/// Shorthand for a known-good date in test scenarios.
///
/// # Panics
///
/// Panics when the components do not name a real calendar day.
#[must_use]
pub fn date(year: i32, month: u8, day: u8) -> PlainDate {
    PlainDate::new(year, month, day).expect("test dates are valid")
}

/// Builder for [`PickerFixture`].
#[derive(Debug, Clone, Default)]
pub struct PickerFixtureBuilder {
    input_value: Option<String>,
    start_at: Option<PlainDate>,
    touch_ui: bool,
    wrapped: bool,
    with_toggle: bool,
    with_model: bool,
    with_form_control: bool,
}

impl PickerFixtureBuilder {
    /// Start an empty fixture description.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the input's displayed text.
    #[must_use]
    pub fn input_value(mut self, value: impl Into<String>) -> Self {
        self.input_value = Some(value.into());
        self
    }

    /// Configure an explicit start date on the picker.
    #[must_use]
    pub const fn start_at(mut self, start_at: PlainDate) -> Self {
        self.start_at = Some(start_at);
        self
    }

    /// Configure touch-UI (dialog) presentation.
    #[must_use]
    pub const fn touch_ui(mut self, touch_ui: bool) -> Self {
        self.touch_ui = touch_ui;
        self
    }

    /// Nest the input inside a field wrapper with an underline element.
    #[must_use]
    pub const fn inside_field_wrapper(mut self) -> Self {
        self.wrapped = true;
        self
    }

    /// Add a toggle button wired to the picker.
    #[must_use]
    pub const fn with_toggle(mut self) -> Self {
        self.with_toggle = true;
        self
    }

    /// Connect a [`ModelBinding`] to the picker.
    #[must_use]
    pub const fn with_model(mut self) -> Self {
        self.with_model = true;
        self
    }

    /// Connect a [`FormControl`] to the picker.
    #[must_use]
    pub const fn with_form_control(mut self) -> Self {
        self.with_form_control = true;
        self
    }

    /// Build the fixture.
    ///
    /// # Panics
    ///
    /// Panics when the composition itself is invalid; fixtures always bind
    /// exactly one input.
    #[must_use]
    pub fn build(self) -> PickerFixture {
        let host = Host::new();

        let (input_element, underline) = if self.wrapped {
            let wrapper = host.create_element(ElementKind::FieldWrapper);
            let input_element = host.create_child(wrapper, ElementKind::Input);
            let underline = host.create_child(wrapper, ElementKind::Underline);
            (input_element, Some(underline))
        } else {
            (host.create_element(ElementKind::Input), None)
        };

        if let Some(value) = &self.input_value {
            host.set_text(input_element, value.clone());
        }

        let picker = DatePicker::new(&host)
            .with_touch_ui(self.touch_ui)
            .with_start_at(self.start_at);
        let input = DatePickerInput::attach(&host, input_element, &picker)
            .expect("fixtures bind exactly one input");

        let toggle_element = if self.with_toggle {
            let button = host.create_element(ElementKind::Button);
            let _ = DatePickerToggle::attach(&host, button, &picker);
            Some(button)
        } else {
            None
        };

        let model = if self.with_model {
            let model = ModelBinding::new();
            picker.connect(Arc::new(model.clone()));
            Some(model)
        } else {
            None
        };

        let form_control = if self.with_form_control {
            let control = FormControl::new();
            picker.connect(Arc::new(control.clone()));
            Some(control)
        } else {
            None
        };

        PickerFixture {
            host,
            picker,
            input,
            input_element,
            underline,
            toggle_element,
            model,
            form_control,
        }
    }
}

/// A composed picker under test.
pub struct PickerFixture {
    host: Host,
    picker: DatePicker,
    input: DatePickerInput,
    input_element: ElementId,
    underline: Option<ElementId>,
    toggle_element: Option<ElementId>,
    model: Option<ModelBinding>,
    form_control: Option<FormControl>,
}

impl PickerFixture {
    /// The host tree.
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// The picker controller.
    #[must_use]
    pub const fn picker(&self) -> &DatePicker {
        &self.picker
    }

    /// The bound input.
    #[must_use]
    pub const fn input(&self) -> &DatePickerInput {
        &self.input
    }

    /// The input's host element.
    #[must_use]
    pub const fn input_element(&self) -> ElementId {
        self.input_element
    }

    /// The wrapper's underline element, when built with a field wrapper.
    #[must_use]
    pub const fn underline(&self) -> Option<ElementId> {
        self.underline
    }

    /// The toggle's host element, when built with a toggle.
    #[must_use]
    pub const fn toggle_element(&self) -> Option<ElementId> {
        self.toggle_element
    }

    /// The connected model binding.
    ///
    /// # Panics
    ///
    /// Panics when the fixture was built without [`PickerFixtureBuilder::with_model`].
    #[must_use]
    pub fn model(&self) -> &ModelBinding {
        self.model
            .as_ref()
            .expect("fixture was built without a model binding")
    }

    /// The connected form control.
    ///
    /// # Panics
    ///
    /// Panics when the fixture was built without
    /// [`PickerFixtureBuilder::with_form_control`].
    #[must_use]
    pub fn form_control(&self) -> &FormControl {
        self.form_control
            .as_ref()
            .expect("fixture was built without a form control")
    }

    // === Event simulation ===

    /// Dispatch a live text-entry event on the bound input.
    pub fn type_text(&self, text: impl Into<String>) {
        self.host
            .dispatch(self.input_element, &UiEvent::Input { text: text.into() });
    }

    /// Focus the bound input.
    pub fn focus_input(&self) {
        self.host.dispatch(self.input_element, &UiEvent::Focus);
    }

    /// Blur the bound input.
    pub fn blur_input(&self) {
        self.host.dispatch(self.input_element, &UiEvent::Blur);
    }

    /// Click the toggle button.
    ///
    /// # Panics
    ///
    /// Panics when the fixture was built without [`PickerFixtureBuilder::with_toggle`].
    pub fn click_toggle(&self) {
        let toggle = self
            .toggle_element
            .expect("fixture was built without a toggle");
        self.host.dispatch(toggle, &UiEvent::Click);
    }

    /// Click an arbitrary element.
    pub fn click(&self, element: ElementId) {
        self.host.dispatch(element, &UiEvent::Click);
    }

    /// Pick a date on the open calendar surface.
    ///
    /// # Panics
    ///
    /// Panics when no calendar surface is open.
    pub fn pick_date(&self, picked: PlainDate) {
        let calendar = self
            .calendar()
            .expect("no calendar surface is open");
        self.host.dispatch(calendar, &UiEvent::Select { date: picked });
    }

    // === Surface queries ===

    /// The open popup pane, if any.
    #[must_use]
    pub fn popup_pane(&self) -> Option<ElementId> {
        self.host.find_kind(ElementKind::OverlayPane)
    }

    /// The open dialog container, if any.
    #[must_use]
    pub fn dialog(&self) -> Option<ElementId> {
        self.host.find_kind(ElementKind::DialogContainer)
    }

    /// The open calendar surface, if any.
    #[must_use]
    pub fn calendar(&self) -> Option<ElementId> {
        self.host.find_kind(ElementKind::Calendar)
    }

    /// Drain deferred work so asynchronous completions become observable.
    pub fn settle(&self) -> usize {
        self.host.settle()
    }
}
