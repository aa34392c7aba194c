//! Input events for host-tree elements.

use crate::date::PlainDate;
use serde::{Deserialize, Serialize};

/// Input event types delivered to host elements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiEvent {
    /// Live text entry into an input element.
    Input {
        /// The full text of the input after the edit.
        text: String,
    },
    /// Element gained focus.
    Focus,
    /// Element lost focus.
    Blur,
    /// Element was clicked.
    Click,
    /// A date was picked on a calendar surface.
    Select {
        /// The picked date.
        date: PlainDate,
    },
}

impl UiEvent {
    /// The kind of this event, for listener registration.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::Input { .. } => EventKind::Input,
            Self::Focus => EventKind::Focus,
            Self::Blur => EventKind::Blur,
            Self::Click => EventKind::Click,
            Self::Select { .. } => EventKind::Select,
        }
    }
}

/// Discriminant of [`UiEvent`], used as a listener registration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Live text entry.
    Input,
    /// Focus gained.
    Focus,
    /// Focus lost.
    Blur,
    /// Click.
    Click,
    /// Calendar date pick.
    Select,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_kind_matches_variant() {
        assert_eq!(
            UiEvent::Input {
                text: "1/1/2020".into()
            }
            .kind(),
            EventKind::Input
        );
        assert_eq!(UiEvent::Focus.kind(), EventKind::Focus);
        assert_eq!(UiEvent::Blur.kind(), EventKind::Blur);
        assert_eq!(UiEvent::Click.kind(), EventKind::Click);
        assert_eq!(
            UiEvent::Select {
                date: PlainDate::new(2020, 1, 1).unwrap()
            }
            .kind(),
            EventKind::Select
        );
    }
}
