//! Date-picker coordination widgets for fechar.
//!
//! The pieces compose around a [`DatePicker`] controller:
//! - [`DatePickerInput`] — the single text input bound to a picker
//! - [`PresentationMode`] — popup vs. dialog surface strategy
//! - [`ValueAccessor`] implementations — [`ModelBinding`], [`FormControl`]
//! - [`DatePickerToggle`] — a click trigger
//!
//! ```
//! use fechar_core::{ElementKind, Host};
//! use fechar_widgets::{DatePicker, DatePickerInput};
//!
//! let host = Host::new();
//! let element = host.create_element(ElementKind::Input);
//! host.set_text(element, "1/1/2020");
//!
//! let picker = DatePicker::new(&host);
//! let input = DatePickerInput::attach(&host, element, &picker)?;
//!
//! picker.open()?;
//! assert!(picker.is_open());
//! assert_eq!(picker.start_at(), input.value());
//! # Ok::<(), fechar_core::PickerError>(())
//! ```

mod accessor;
mod input;
mod picker;
mod surface;
mod toggle;

pub use accessor::{
    ChangeListener, DisabledListener, FormControl, ModelBinding, ValueAccessor,
    ValueAccessorBridge,
};
pub use input::DatePickerInput;
pub use picker::DatePicker;
pub use surface::{CalendarView, PresentationMode, PresentationSession, POPUP_PANE_HEIGHT};
pub use toggle::DatePickerToggle;

pub use fechar_core::{PickerError, PlainDate};
