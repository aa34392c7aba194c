//! Testing harness for fechar pickers.
//!
//! Provides [`PickerFixture`] and its builder, which compose a host tree,
//! a picker, its bound input, and optional collaborators (field wrapper,
//! toggle, model binding, form control), plus event-simulation and settle
//! helpers:
//!
//! ```
//! use fechar_test::{date, PickerFixtureBuilder};
//!
//! let fixture = PickerFixtureBuilder::new()
//!     .input_value("1/1/2020")
//!     .build();
//!
//! assert_eq!(fixture.picker().start_at(), Some(date(2020, 1, 1)));
//! fixture.picker().open().unwrap();
//! assert!(fixture.popup_pane().is_some());
//! ```

mod fixture;

pub use fixture::{date, PickerFixture, PickerFixtureBuilder};
