//! Error types for picker composition faults.

use thiserror::Error;

/// Configuration faults raised by picker composition.
///
/// These indicate a composition bug, not a runtime condition: they are
/// surfaced immediately rather than logged or retried.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PickerError {
    /// A second input attempted to register with a picker that already has
    /// one. The existing registration is kept.
    #[error("a date picker can only be associated with a single input")]
    MultipleInputsRegistered,

    /// `open` was called on a picker with no registered input.
    #[error("attempted to open a date picker with no associated input")]
    NoInputRegistered,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            PickerError::MultipleInputsRegistered.to_string(),
            "a date picker can only be associated with a single input"
        );
        assert_eq!(
            PickerError::NoInputRegistered.to_string(),
            "attempted to open a date picker with no associated input"
        );
    }
}
