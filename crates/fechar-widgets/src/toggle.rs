//! Trigger control that opens a picker on click.

use crate::picker::DatePicker;
use fechar_core::{ElementId, EventKind, Host};

/// A click trigger bound to a picker.
///
/// Wiring a toggle to a picker whose input is missing is a composition
/// bug: the click path has no return channel, so the open failure panics
/// with the configuration fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatePickerToggle {
    element: ElementId,
}

impl DatePickerToggle {
    /// Bind a host button element to a picker.
    pub fn attach(host: &Host, element: ElementId, picker: &DatePicker) -> Self {
        let weak = picker.downgrade();
        host.on(element, EventKind::Click, move |_| {
            if let Some(picker) = weak.upgrade() {
                picker
                    .open()
                    .expect("a toggle requires its picker to have a registered input");
            }
        });
        Self { element }
    }

    /// The host element this toggle wraps.
    #[must_use]
    pub const fn element(&self) -> ElementId {
        self.element
    }
}
