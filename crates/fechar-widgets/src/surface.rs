//! Presentation surfaces: the anchored popup pane and the modal dialog.
//!
//! The two presentation modes are a closed set; everywhere behavior
//! differs (modality, anchoring, dismissal, close animation) the code
//! matches exhaustively on [`PresentationMode`]. Surfaces hold no
//! application state: they render from the [`CalendarView`] snapshot
//! passed at render time and report a picked date through the `on_select`
//! callback.

use fechar_core::{ElementId, ElementKind, EventKind, GlobalListenerId, Host, PlainDate, UiEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Height of a freshly rendered popup pane. Closing animates it to zero.
pub const POPUP_PANE_HEIGHT: f32 = 320.0;

/// Callback a surface reports picked dates through.
pub(crate) type SelectHandler = Arc<dyn Fn(PlainDate) + Send + Sync>;

/// How a picker presents its calendar surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresentationMode {
    /// Non-modal overlay pane anchored to the input's connection element.
    /// Dismissed by outside interaction or explicit close.
    #[default]
    Popup,
    /// Modal centered dialog. Dismissed only by explicit close.
    Dialog,
}

/// Value snapshot a surface renders from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarView {
    /// The currently selected date, if any.
    pub selected: Option<PlainDate>,
    /// The date the calendar should initially display.
    pub start_at: Option<PlainDate>,
}

impl CalendarView {
    /// The date the calendar opens on: the selection, else the start date.
    #[must_use]
    pub fn active_date(&self) -> Option<PlainDate> {
        self.selected.or(self.start_at)
    }
}

/// One open→close cycle of a rendered surface.
///
/// Owns the lifetime of the surface subtree; dropped state after
/// [`PresentationSession::close`] has run and the host settled.
pub struct PresentationSession {
    mode: PresentationMode,
    root: ElementId,
    calendar: ElementId,
    outside_listener: Option<GlobalListenerId>,
}

impl PresentationMode {
    /// Render a calendar surface into the host.
    ///
    /// A popup is anchored at `anchor` and given its open height; a dialog
    /// ignores the anchor and relies on host modality while attached. The
    /// calendar reports picks by dispatching [`UiEvent::Select`] to the
    /// session's calendar element, which forwards to `on_select`.
    pub(crate) fn render(
        self,
        host: &Host,
        anchor: Option<ElementId>,
        view: CalendarView,
        on_select: SelectHandler,
    ) -> PresentationSession {
        let root = match self {
            Self::Popup => {
                let pane = host.create_element(ElementKind::OverlayPane);
                host.set_height(pane, POPUP_PANE_HEIGHT);
                host.set_anchor(pane, anchor);
                pane
            }
            Self::Dialog => host.create_element(ElementKind::DialogContainer),
        };

        let calendar = host.create_child(root, ElementKind::Calendar);
        host.set_text(
            calendar,
            view.active_date().map(|d| d.to_string()).unwrap_or_default(),
        );
        host.on(calendar, EventKind::Select, move |event| {
            if let UiEvent::Select { date } = event {
                on_select(*date);
            }
        });

        PresentationSession {
            mode: self,
            root,
            calendar,
            outside_listener: None,
        }
    }
}

impl PresentationSession {
    /// The mode this session was rendered with.
    #[must_use]
    pub const fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// Root element of the surface subtree.
    #[must_use]
    pub const fn root(&self) -> ElementId {
        self.root
    }

    /// The calendar element inside the surface.
    #[must_use]
    pub const fn calendar(&self) -> ElementId {
        self.calendar
    }

    /// Record the popup's outside-interaction dismiss listener.
    pub(crate) fn set_outside_listener(&mut self, listener: GlobalListenerId) {
        self.outside_listener = Some(listener);
    }

    /// Tear the surface down.
    ///
    /// The dismiss listener is removed and the popup's height collapses
    /// immediately; removal of the subtree from the tree is deferred to the
    /// next settle checkpoint, so callers must settle before asserting the
    /// surface is gone.
    pub(crate) fn close(self, host: &Host) {
        if let Some(listener) = self.outside_listener {
            host.remove_global(listener);
        }
        match self.mode {
            PresentationMode::Popup => host.set_height(self.root, 0.0),
            PresentationMode::Dialog => {}
        }
        let host_for_removal = host.clone();
        let root = self.root;
        host.defer(move || host_for_removal.remove(root));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::RwLock;

    fn date(year: i32, month: u8, day: u8) -> PlainDate {
        PlainDate::new(year, month, day).unwrap()
    }

    fn noop_select() -> SelectHandler {
        Arc::new(|_| {})
    }

    #[test]
    fn test_popup_render_anchors_and_sizes_pane() {
        let host = Host::new();
        let input = host.create_element(ElementKind::Input);

        let session = PresentationMode::Popup.render(
            &host,
            Some(input),
            CalendarView::default(),
            noop_select(),
        );

        assert_eq!(session.mode(), PresentationMode::Popup);
        assert_eq!(host.kind(session.root()), Some(ElementKind::OverlayPane));
        assert_eq!(host.anchor(session.root()), Some(input));
        assert_eq!(host.height(session.root()), POPUP_PANE_HEIGHT);
        assert_eq!(host.kind(session.calendar()), Some(ElementKind::Calendar));
        assert_eq!(host.parent(session.calendar()), Some(session.root()));
    }

    #[test]
    fn test_dialog_render_creates_container() {
        let host = Host::new();
        let session =
            PresentationMode::Dialog.render(&host, None, CalendarView::default(), noop_select());

        assert_eq!(host.kind(session.root()), Some(ElementKind::DialogContainer));
        assert!(host.anchor(session.root()).is_none());
    }

    #[test]
    fn test_calendar_shows_active_date() {
        let host = Host::new();
        let view = CalendarView {
            selected: None,
            start_at: Some(date(2010, 1, 1)),
        };
        let session = PresentationMode::Popup.render(&host, None, view, noop_select());
        assert_eq!(host.text(session.calendar()), "1/1/2010");
    }

    #[test]
    fn test_select_event_reaches_handler() {
        let host = Host::new();
        let picked = Arc::new(RwLock::new(None));

        let picked_in_handler = picked.clone();
        let session = PresentationMode::Dialog.render(
            &host,
            None,
            CalendarView::default(),
            Arc::new(move |picked_date| {
                *picked_in_handler.write().unwrap() = Some(picked_date);
            }),
        );

        host.dispatch(
            session.calendar(),
            &UiEvent::Select {
                date: date(2017, 1, 1),
            },
        );
        assert_eq!(*picked.read().unwrap(), Some(date(2017, 1, 1)));
    }

    #[test]
    fn test_popup_close_collapses_then_removes_after_settle() {
        let host = Host::new();
        let session =
            PresentationMode::Popup.render(&host, None, CalendarView::default(), noop_select());
        let pane = session.root();

        session.close(&host);
        assert!(host.contains(pane));
        assert_eq!(host.height(pane), 0.0);

        host.settle();
        assert!(!host.contains(pane));
    }

    #[test]
    fn test_dialog_close_removes_after_settle() {
        let host = Host::new();
        let session =
            PresentationMode::Dialog.render(&host, None, CalendarView::default(), noop_select());
        let dialog = session.root();

        session.close(&host);
        assert!(host.contains(dialog));

        host.settle();
        assert!(!host.contains(dialog));
    }

    #[test]
    fn test_active_date_prefers_selection() {
        let view = CalendarView {
            selected: Some(date(2020, 5, 5)),
            start_at: Some(date(2010, 1, 1)),
        };
        assert_eq!(view.active_date(), Some(date(2020, 5, 5)));
    }
}
