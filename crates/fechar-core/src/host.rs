//! The host element tree pickers coordinate against.
//!
//! A [`Host`] is a small retained tree of UI elements: inputs, field
//! wrappers, trigger buttons, and the transient popup/dialog surfaces. It
//! stands in for whatever real surface tree the embedder renders into, and
//! exposes exactly the operations the coordination layer needs: kind
//! queries, text and disabled state, anchor links, event dispatch with
//! listener registration, and a deferred-task checkpoint (see
//! [`Scheduler`]).
//!
//! Dispatch honors two platform rules: disabled elements receive no
//! events, and while a dialog container is attached all events targeted
//! outside it are swallowed (modality).

use crate::event::{EventKind, UiEvent};
use crate::scheduler::Scheduler;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

/// Type alias for per-element event listeners.
type ElementListener = Arc<dyn Fn(&UiEvent) + Send + Sync>;

/// Type alias for host-wide event listeners.
type GlobalListener = Arc<dyn Fn(ElementId, &UiEvent) + Send + Sync>;

/// Unique identifier for an element in a [`Host`] tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementId(pub u64);

/// Registration handle for a host-wide listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlobalListenerId(u64);

/// The closed set of element kinds the coordination layer works with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    /// A text input.
    Input,
    /// A decorated field container wrapping an input.
    FieldWrapper,
    /// The visible boundary element of a field wrapper.
    Underline,
    /// A trigger button.
    Button,
    /// A non-modal anchored overlay pane.
    OverlayPane,
    /// A modal centered dialog container.
    DialogContainer,
    /// A calendar surface rendered inside a pane or dialog.
    Calendar,
}

struct Node {
    kind: ElementKind,
    text: String,
    disabled: bool,
    height: f32,
    anchored_to: Option<ElementId>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    listeners: HashMap<EventKind, Vec<ElementListener>>,
}

impl Node {
    fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            text: String::new(),
            disabled: false,
            height: 0.0,
            anchored_to: None,
            parent: None,
            children: Vec::new(),
            listeners: HashMap::new(),
        }
    }
}

struct HostInner {
    nodes: RwLock<HashMap<ElementId, Node>>,
    next_id: AtomicU64,
    globals: RwLock<Vec<(GlobalListenerId, EventKind, GlobalListener)>>,
    next_global: AtomicU64,
    scheduler: Scheduler,
}

/// Shared handle to a host element tree.
///
/// Cloning yields a handle to the same tree. All mutation goes through
/// interior locks; no lock is held while listeners or deferred tasks run.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Create an empty host tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HostInner {
                nodes: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                globals: RwLock::new(Vec::new()),
                next_global: AtomicU64::new(1),
                scheduler: Scheduler::new(),
            }),
        }
    }

    // === Tree construction ===

    /// Create a detached root-level element.
    pub fn create_element(&self, kind: ElementKind) -> ElementId {
        let id = ElementId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        self.nodes_mut().insert(id, Node::new(kind));
        id
    }

    /// Create an element and append it to `parent`.
    pub fn create_child(&self, parent: ElementId, kind: ElementKind) -> ElementId {
        let child = self.create_element(kind);
        self.append_child(parent, child);
        child
    }

    /// Append `child` under `parent`, detaching it from any previous parent.
    pub fn append_child(&self, parent: ElementId, child: ElementId) {
        let mut nodes = self.nodes_mut();
        if let Some(old_parent) = nodes.get(&child).and_then(|n| n.parent) {
            if let Some(node) = nodes.get_mut(&old_parent) {
                node.children.retain(|c| *c != child);
            }
        }
        if let Some(node) = nodes.get_mut(&child) {
            node.parent = Some(parent);
        }
        if let Some(node) = nodes.get_mut(&parent) {
            node.children.push(child);
        }
    }

    /// Remove an element and its entire subtree.
    pub fn remove(&self, id: ElementId) {
        let mut nodes = self.nodes_mut();
        if let Some(parent) = nodes.get(&id).and_then(|n| n.parent) {
            if let Some(node) = nodes.get_mut(&parent) {
                node.children.retain(|c| *c != id);
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = nodes.remove(&current) {
                stack.extend(node.children);
            }
        }
    }

    // === Queries ===

    /// Check whether an element is attached to the tree.
    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.nodes().contains_key(&id)
    }

    /// Get the kind of an element.
    #[must_use]
    pub fn kind(&self, id: ElementId) -> Option<ElementKind> {
        self.nodes().get(&id).map(|n| n.kind)
    }

    /// Find any attached element of the given kind.
    #[must_use]
    pub fn find_kind(&self, kind: ElementKind) -> Option<ElementId> {
        self.nodes()
            .iter()
            .find(|(_, n)| n.kind == kind)
            .map(|(id, _)| *id)
    }

    /// All attached elements of the given kind.
    #[must_use]
    pub fn elements_of_kind(&self, kind: ElementKind) -> Vec<ElementId> {
        self.nodes()
            .iter()
            .filter(|(_, n)| n.kind == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Direct child of `parent` with the given kind.
    #[must_use]
    pub fn child_of_kind(&self, parent: ElementId, kind: ElementKind) -> Option<ElementId> {
        let nodes = self.nodes();
        nodes.get(&parent).and_then(|n| {
            n.children
                .iter()
                .find(|c| nodes.get(c).is_some_and(|child| child.kind == kind))
                .copied()
        })
    }

    /// Nearest ancestor of `id` (excluding `id` itself) with the given kind.
    #[must_use]
    pub fn ancestor_of_kind(&self, id: ElementId, kind: ElementKind) -> Option<ElementId> {
        let nodes = self.nodes();
        let mut current = nodes.get(&id).and_then(|n| n.parent);
        while let Some(ancestor) = current {
            let node = nodes.get(&ancestor)?;
            if node.kind == kind {
                return Some(ancestor);
            }
            current = node.parent;
        }
        None
    }

    /// Parent of an element, if any.
    #[must_use]
    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes().get(&id).and_then(|n| n.parent)
    }

    /// Check whether `id` is `ancestor` or one of its descendants.
    #[must_use]
    pub fn is_within(&self, id: ElementId, ancestor: ElementId) -> bool {
        Self::is_within_locked(&self.nodes(), id, ancestor)
    }

    fn is_within_locked(
        nodes: &HashMap<ElementId, Node>,
        id: ElementId,
        ancestor: ElementId,
    ) -> bool {
        let mut current = Some(id);
        while let Some(element) = current {
            if element == ancestor {
                return true;
            }
            current = nodes.get(&element).and_then(|n| n.parent);
        }
        false
    }

    // === Element state ===

    /// Current text of an element. Missing elements read as empty.
    #[must_use]
    pub fn text(&self, id: ElementId) -> String {
        self.nodes().get(&id).map(|n| n.text.clone()).unwrap_or_default()
    }

    /// Set element text programmatically. Dispatches no events.
    pub fn set_text(&self, id: ElementId, text: impl Into<String>) {
        if let Some(node) = self.nodes_mut().get_mut(&id) {
            node.text = text.into();
        }
    }

    /// Check whether an element is disabled.
    #[must_use]
    pub fn is_disabled(&self, id: ElementId) -> bool {
        self.nodes().get(&id).is_some_and(|n| n.disabled)
    }

    /// Set the disabled flag of an element.
    pub fn set_disabled(&self, id: ElementId, disabled: bool) {
        if let Some(node) = self.nodes_mut().get_mut(&id) {
            node.disabled = disabled;
        }
    }

    /// Current height of an element.
    #[must_use]
    pub fn height(&self, id: ElementId) -> f32 {
        self.nodes().get(&id).map_or(0.0, |n| n.height)
    }

    /// Set the height of an element.
    pub fn set_height(&self, id: ElementId, height: f32) {
        if let Some(node) = self.nodes_mut().get_mut(&id) {
            node.height = height;
        }
    }

    /// The element this one is anchored to, if any.
    #[must_use]
    pub fn anchor(&self, id: ElementId) -> Option<ElementId> {
        self.nodes().get(&id).and_then(|n| n.anchored_to)
    }

    /// Record which element `id` is anchored to.
    pub fn set_anchor(&self, id: ElementId, anchor: Option<ElementId>) {
        if let Some(node) = self.nodes_mut().get_mut(&id) {
            node.anchored_to = anchor;
        }
    }

    // === Events ===

    /// Register a listener for events of `kind` on an element.
    pub fn on(
        &self,
        id: ElementId,
        kind: EventKind,
        listener: impl Fn(&UiEvent) + Send + Sync + 'static,
    ) {
        if let Some(node) = self.nodes_mut().get_mut(&id) {
            node.listeners
                .entry(kind)
                .or_default()
                .push(Arc::new(listener));
        }
    }

    /// Register a host-wide listener invoked for every delivered event of
    /// `kind`, after the target's own listeners.
    pub fn on_global(
        &self,
        kind: EventKind,
        listener: impl Fn(ElementId, &UiEvent) + Send + Sync + 'static,
    ) -> GlobalListenerId {
        let id = GlobalListenerId(self.inner.next_global.fetch_add(1, Ordering::SeqCst));
        self.globals_mut().push((id, kind, Arc::new(listener)));
        id
    }

    /// Remove a previously registered host-wide listener.
    pub fn remove_global(&self, id: GlobalListenerId) {
        self.globals_mut().retain(|(gid, _, _)| *gid != id);
    }

    /// Dispatch an event to an element, returning whether it was delivered.
    ///
    /// Delivery is refused for detached targets, disabled targets, and (while
    /// a dialog container is attached) targets outside the dialog subtree.
    /// An [`UiEvent::Input`] event writes the carried text to the target
    /// before listeners run. Listeners registered during dispatch do not see
    /// the event that registered them.
    pub fn dispatch(&self, target: ElementId, event: &UiEvent) -> bool {
        {
            let nodes = self.nodes();
            let Some(node) = nodes.get(&target) else {
                return false;
            };
            if node.disabled {
                return false;
            }
            let modal = nodes
                .iter()
                .find(|(_, n)| n.kind == ElementKind::DialogContainer)
                .map(|(id, _)| *id);
            if let Some(dialog) = modal {
                if !Self::is_within_locked(&nodes, target, dialog) {
                    return false;
                }
            }
        }

        if let UiEvent::Input { text } = event {
            self.set_text(target, text.clone());
        }

        let listeners: Vec<ElementListener> = self
            .nodes()
            .get(&target)
            .and_then(|n| n.listeners.get(&event.kind()).cloned())
            .unwrap_or_default();
        let globals: Vec<GlobalListener> = self
            .globals()
            .iter()
            .filter(|(_, kind, _)| *kind == event.kind())
            .map(|(_, _, listener)| listener.clone())
            .collect();

        for listener in listeners {
            listener(event);
        }
        for listener in globals {
            listener(target, event);
        }
        true
    }

    // === Scheduling ===

    /// Enqueue work for the next settle checkpoint.
    pub fn defer(&self, task: impl FnOnce() + Send + 'static) {
        self.inner.scheduler.defer(task);
    }

    /// Drain all deferred work. Returns the number of tasks run.
    pub fn settle(&self) -> usize {
        self.inner.scheduler.settle()
    }

    /// Handle to the underlying scheduler.
    #[must_use]
    pub fn scheduler(&self) -> Scheduler {
        self.inner.scheduler.clone()
    }

    // === Lock helpers ===

    fn nodes(&self) -> std::sync::RwLockReadGuard<'_, HashMap<ElementId, Node>> {
        self.inner.nodes.read().expect("host tree lock poisoned")
    }

    fn nodes_mut(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<ElementId, Node>> {
        self.inner.nodes.write().expect("host tree lock poisoned")
    }

    fn globals(
        &self,
    ) -> std::sync::RwLockReadGuard<'_, Vec<(GlobalListenerId, EventKind, GlobalListener)>> {
        self.inner.globals.read().expect("host listener lock poisoned")
    }

    fn globals_mut(
        &self,
    ) -> std::sync::RwLockWriteGuard<'_, Vec<(GlobalListenerId, EventKind, GlobalListener)>> {
        self.inner.globals.write().expect("host listener lock poisoned")
    }
}

impl std::fmt::Debug for Host {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host")
            .field("elements", &self.nodes().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_create_and_query_by_kind() {
        let host = Host::new();
        assert!(host.find_kind(ElementKind::Input).is_none());

        let input = host.create_element(ElementKind::Input);
        assert_eq!(host.find_kind(ElementKind::Input), Some(input));
        assert_eq!(host.kind(input), Some(ElementKind::Input));
        assert!(host.contains(input));
    }

    #[test]
    fn test_tree_relations() {
        let host = Host::new();
        let wrapper = host.create_element(ElementKind::FieldWrapper);
        let input = host.create_child(wrapper, ElementKind::Input);
        let underline = host.create_child(wrapper, ElementKind::Underline);

        assert_eq!(host.parent(input), Some(wrapper));
        assert_eq!(
            host.child_of_kind(wrapper, ElementKind::Underline),
            Some(underline)
        );
        assert_eq!(
            host.ancestor_of_kind(input, ElementKind::FieldWrapper),
            Some(wrapper)
        );
        assert!(host.ancestor_of_kind(wrapper, ElementKind::FieldWrapper).is_none());
        assert!(host.is_within(input, wrapper));
        assert!(!host.is_within(wrapper, input));
    }

    #[test]
    fn test_remove_takes_subtree() {
        let host = Host::new();
        let pane = host.create_element(ElementKind::OverlayPane);
        let calendar = host.create_child(pane, ElementKind::Calendar);

        host.remove(pane);
        assert!(!host.contains(pane));
        assert!(!host.contains(calendar));
    }

    #[test]
    fn test_input_event_writes_text_before_listeners() {
        let host = Host::new();
        let input = host.create_element(ElementKind::Input);
        let seen = Arc::new(RwLock::new(String::new()));

        let host_for_listener = host.clone();
        let seen_in_listener = seen.clone();
        host.on(input, EventKind::Input, move |_| {
            *seen_in_listener.write().unwrap() = host_for_listener.text(input);
        });

        host.dispatch(
            input,
            &UiEvent::Input {
                text: "1/1/2020".into(),
            },
        );
        assert_eq!(host.text(input), "1/1/2020");
        assert_eq!(*seen.read().unwrap(), "1/1/2020");
    }

    #[test]
    fn test_set_text_dispatches_nothing() {
        let host = Host::new();
        let input = host.create_element(ElementKind::Input);
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_in_listener = fired.clone();
        host.on(input, EventKind::Input, move |_| {
            fired_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        host.set_text(input, "2/2/2022");
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_disabled_element_receives_no_events() {
        let host = Host::new();
        let input = host.create_element(ElementKind::Input);
        host.set_disabled(input, true);
        assert!(!host.dispatch(input, &UiEvent::Focus));
    }

    #[test]
    fn test_dialog_swallows_outside_events() {
        let host = Host::new();
        let button = host.create_element(ElementKind::Button);
        let dialog = host.create_element(ElementKind::DialogContainer);
        let calendar = host.create_child(dialog, ElementKind::Calendar);

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_in_listener = fired.clone();
        host.on(button, EventKind::Click, move |_| {
            fired_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        assert!(!host.dispatch(button, &UiEvent::Click));
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(host.dispatch(calendar, &UiEvent::Click));

        host.remove(dialog);
        assert!(host.dispatch(button, &UiEvent::Click));
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_global_listener_lifecycle() {
        let host = Host::new();
        let button = host.create_element(ElementKind::Button);
        let fired = Arc::new(AtomicUsize::new(0));

        let fired_in_listener = fired.clone();
        let registration = host.on_global(EventKind::Click, move |target, _| {
            assert_eq!(target, button);
            fired_in_listener.fetch_add(1, Ordering::SeqCst);
        });

        host.dispatch(button, &UiEvent::Click);
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        host.remove_global(registration);
        host.dispatch(button, &UiEvent::Click);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_anchor_link() {
        let host = Host::new();
        let input = host.create_element(ElementKind::Input);
        let pane = host.create_element(ElementKind::OverlayPane);

        assert!(host.anchor(pane).is_none());
        host.set_anchor(pane, Some(input));
        assert_eq!(host.anchor(pane), Some(input));
    }

    #[test]
    fn test_defer_and_settle_via_host() {
        let host = Host::new();
        let pane = host.create_element(ElementKind::OverlayPane);

        let host_in_task = host.clone();
        host.defer(move || host_in_task.remove(pane));

        assert!(host.contains(pane));
        assert_eq!(host.settle(), 1);
        assert!(!host.contains(pane));
    }
}
