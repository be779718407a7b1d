use std::collections::HashMap;
use std::rc::Rc;

use crate::Result;
use crate::dom::NodeId;
use crate::page::PageState;

pub(crate) type HandlerFn = dyn Fn(&mut PageState, &mut EventState) -> Result<()>;

// Handlers are shared closures: the store hands out clones so dispatch can
// run them while the page state is mutably borrowed.
#[derive(Clone)]
pub(crate) struct Handler(Rc<HandlerFn>);

impl std::fmt::Debug for Handler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Handler")
    }
}

impl Handler {
    pub(crate) fn new(
        handler: impl Fn(&mut PageState, &mut EventState) -> Result<()> + 'static,
    ) -> Self {
        Self(Rc::new(handler))
    }

    pub(crate) fn invoke(&self, state: &mut PageState, event: &mut EventState) -> Result<()> {
        (self.0)(state, event)
    }
}

#[derive(Debug, Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Handler>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: &str, handler: Handler) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str) -> Vec<Handler> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .cloned()
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub(crate) struct EventState {
    pub(crate) event_type: String,
    pub(crate) target: NodeId,
    pub(crate) current_target: NodeId,
    pub(crate) default_prevented: bool,
}

impl EventState {
    pub(crate) fn new(event_type: &str, target: NodeId) -> Self {
        Self {
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
        }
    }

    pub(crate) fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}
