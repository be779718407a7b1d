use crate::dom::{self, Dom, NodeId, truncate_chars};
use crate::events::{EventState, Handler, ListenerStore};
use crate::html::parse_html;
use crate::{Error, Result, behaviors, selector};

const TRACE_LOG_LIMIT: usize = 10_000;
const SCROLL_SETTLE_LIMIT: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub top: i64,
    pub behavior: ScrollBehavior,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub href: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDelivery {
    pub action: String,
}

#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub viewport_width: i64,
    pub scroll_y: i64,
    pub reduced_motion: bool,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1024,
            scroll_y: 0,
            reduced_motion: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct WindowState {
    pub(crate) viewport_width: i64,
    pub(crate) scroll_y: i64,
    pub(crate) reduced_motion: bool,
}

#[derive(Debug)]
pub(crate) struct PageState {
    pub(crate) dom: Dom,
    pub(crate) window: WindowState,
    pending_scrolls: Vec<ScrollRequest>,
    scroll_log: Vec<ScrollRequest>,
    navigations: Vec<Navigation>,
    form_deliveries: Vec<FormDelivery>,
}

impl PageState {
    // Behaviors never move the viewport themselves; they file a request and
    // the page settles it after the triggering action completes.
    pub(crate) fn request_scroll_top(&mut self, behavior: ScrollBehavior) {
        self.pending_scrolls.push(ScrollRequest { top: 0, behavior });
    }

    pub(crate) fn request_scroll_into_view(
        &mut self,
        target: NodeId,
        behavior: ScrollBehavior,
    ) -> Result<()> {
        let top = self.dom.offset_top(target)?;
        self.pending_scrolls.push(ScrollRequest { top, behavior });
        Ok(())
    }
}

#[derive(Debug)]
pub struct Page {
    pub(crate) state: PageState,
    listeners: ListenerStore,
    trace: bool,
    trace_logs: Vec<String>,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with(html, PageOptions::default())
    }

    pub fn from_html_with(html: &str, options: PageOptions) -> Result<Self> {
        stacker::grow(32 * 1024 * 1024, || Self::mount(html, options))
    }

    fn mount(html: &str, options: PageOptions) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Self {
            state: PageState {
                dom,
                window: WindowState {
                    viewport_width: options.viewport_width,
                    scroll_y: options.scroll_y,
                    reduced_motion: options.reduced_motion,
                },
                pending_scrolls: Vec::new(),
                scroll_log: Vec::new(),
                navigations: Vec::new(),
                form_deliveries: Vec::new(),
            },
            listeners: ListenerStore::default(),
            trace: false,
            trace_logs: Vec::new(),
            trace_to_stderr: true,
        };
        behaviors::install(&mut page)?;
        Ok(page)
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn viewport_width(&self) -> i64 {
        self.state.window.viewport_width
    }

    pub fn scroll_y(&self) -> i64 {
        self.state.window.scroll_y
    }

    pub fn reduced_motion(&self) -> bool {
        self.state.window.reduced_motion
    }

    pub fn scroll_requests(&self) -> &[ScrollRequest] {
        &self.state.scroll_log
    }

    pub fn navigations(&self) -> &[Navigation] {
        &self.state.navigations
    }

    pub fn form_deliveries(&self) -> &[FormDelivery] {
        &self.state.form_deliveries
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.state.dom.disabled(target) {
            return Ok(());
        }

        let outcome = self.dispatch_event(target, "click")?;
        if !outcome.default_prevented {
            self.apply_click_default(target)?;
        }
        self.settle_scrolls()
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.state.dom.disabled(target) {
            return Ok(());
        }

        let tag = self
            .state
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.state.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        self.settle_scrolls()
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .state
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.state.dom.find_ancestor_by_tag(target, "form")
        };

        if let Some(form_id) = form {
            self.submit_form(form_id)?;
        }
        self.settle_scrolls()
    }

    pub fn scroll_to(&mut self, offset: i64) -> Result<()> {
        if offset < 0 {
            return Err(Error::Runtime(
                "scroll_to requires a non-negative offset".into(),
            ));
        }
        self.jump_scroll(offset)?;
        self.settle_scrolls()
    }

    pub fn resize_to(&mut self, width: i64) -> Result<()> {
        if width < 0 {
            return Err(Error::Runtime(
                "resize_to requires a non-negative width".into(),
            ));
        }
        if width != self.state.window.viewport_width {
            self.state.window.viewport_width = width;
            let root = self.state.dom.root;
            self.dispatch_event(root, "resize")?;
        }
        self.settle_scrolls()
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        self.settle_scrolls()
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.state.dom.text_content(target))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        self.state.dom.value(target)
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        Ok(self.state.dom.attr(target, name))
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.state.dom.class_contains(target, class_name)
    }

    pub fn style_property(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let target = self.select_one(selector)?;
        self.state.dom.style_property(target, name)
    }

    pub fn set_offset_top(&mut self, selector: &str, value: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.state.dom.set_offset_top(target, value)
    }

    pub fn set_scroll_height(&mut self, selector: &str, value: i64) -> Result<()> {
        let target = self.select_one(selector)?;
        self.state.dom.set_scroll_height(target, value)
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.state.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.state.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_attr(&self, selector: &str, name: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.state.dom.attr(target, name);
        if actual.as_deref() != Some(expected) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("{name}={expected}"),
                actual: actual
                    .map(|value| format!("{name}={value}"))
                    .unwrap_or_else(|| format!("{name} absent")),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.state.dom.class_contains(target, class_name)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name} present={expected}"),
                actual: format!("class {class_name} present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub(crate) fn query(&self, selector: &str) -> Result<Option<NodeId>> {
        selector::query_selector(&self.state.dom, selector)
    }

    pub(crate) fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        selector::query_selector_all(&self.state.dom, selector)
    }

    pub(crate) fn query_from(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        selector::query_selector_from(&self.state.dom, scope, selector)
    }

    pub(crate) fn query_all_from(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        selector::query_selector_all_from(&self.state.dom, scope, selector)
    }

    pub(crate) fn window_target(&self) -> NodeId {
        self.state.dom.root
    }

    pub(crate) fn add_listener(&mut self, target: NodeId, event: &str, handler: Handler) {
        self.listeners.add(target, event, handler);
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.query(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.state.dom.dump_node(node_id), 200)
    }

    fn dispatch_event(&mut self, target: NodeId, event_type: &str) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        let mut path = vec![target];
        let mut cursor = self.state.dom.parent(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.state.dom.parent(node);
        }

        for node in path {
            event.current_target = node;
            let handlers = self.listeners.get(node, event_type);
            for handler in handlers {
                self.trace_event_line(&event);
                handler.invoke(&mut self.state, &mut event)?;
            }
        }

        self.trace_event_done(&event);
        Ok(event)
    }

    fn apply_click_default(&mut self, target: NodeId) -> Result<()> {
        let is_anchor = self
            .state
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("a"))
            .unwrap_or(false);

        if is_anchor {
            if let Some(href) = self.state.dom.attr(target, "href") {
                if self.trace {
                    let line = format!("[nav] href={href}");
                    self.trace_line(line);
                }
                self.state.navigations.push(Navigation { href: href.clone() });
                if let Some(fragment) = href.strip_prefix('#') {
                    if !fragment.is_empty() {
                        if let Some(node) = self.state.dom.by_id(fragment) {
                            let top = self.state.dom.offset_top(node)?;
                            self.jump_scroll(top)?;
                        }
                    }
                }
                return Ok(());
            }
        }

        if dom::is_submit_control(&self.state.dom, target) {
            if let Some(form) = self.state.dom.find_ancestor_by_tag(target, "form") {
                self.submit_form(form)?;
            }
        }

        Ok(())
    }

    fn submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if !outcome.default_prevented {
            let action = self.state.dom.attr(form, "action").unwrap_or_default();
            self.state.form_deliveries.push(FormDelivery { action });
        }
        Ok(())
    }

    // The host performs the movement: apply the new offset, then tell
    // scroll listeners about it.
    fn jump_scroll(&mut self, top: i64) -> Result<()> {
        if top != self.state.window.scroll_y {
            self.state.window.scroll_y = top;
            let root = self.state.dom.root;
            self.dispatch_event(root, "scroll")?;
        }
        Ok(())
    }

    fn settle_scrolls(&mut self) -> Result<()> {
        let mut rounds = 0usize;
        loop {
            let pending = std::mem::take(&mut self.state.pending_scrolls);
            if pending.is_empty() {
                return Ok(());
            }
            rounds += 1;
            if rounds > SCROLL_SETTLE_LIMIT {
                return Err(Error::Runtime(format!(
                    "scroll settling exceeded {SCROLL_SETTLE_LIMIT} rounds"
                )));
            }

            let mut moved = false;
            for request in pending {
                if self.trace {
                    let line = format!(
                        "[scroll] settle top={} behavior={:?}",
                        request.top, request.behavior
                    );
                    self.trace_line(line);
                }
                if request.top != self.state.window.scroll_y {
                    self.state.window.scroll_y = request.top;
                    moved = true;
                }
                self.state.scroll_log.push(request);
            }

            if moved {
                let root = self.state.dom.root;
                self.dispatch_event(root, "scroll")?;
            }
        }
    }

    fn trace_event_line(&mut self, event: &EventState) {
        if !self.trace {
            return;
        }
        let line = format!(
            "[event] {} target={} current={} default_prevented={}",
            event.event_type,
            self.node_label(event.target),
            self.node_label(event.current_target),
            event.default_prevented
        );
        self.trace_line(line);
    }

    fn trace_event_done(&mut self, event: &EventState) {
        if !self.trace {
            return;
        }
        let line = format!(
            "[event] done {} target={} default_prevented={}",
            event.event_type,
            self.node_label(event.target),
            event.default_prevented
        );
        self.trace_line(line);
    }

    fn node_label(&self, node_id: NodeId) -> String {
        match self.state.dom.tag_name(node_id) {
            Some(tag) => match self.state.dom.attr(node_id, "id") {
                Some(id) => format!("{tag}#{id}"),
                None => tag.to_string(),
            },
            None => "document".into(),
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        if self.trace_logs.len() >= TRACE_LOG_LIMIT {
            self.trace_logs.remove(0);
        }
        self.trace_logs.push(line);
    }
}
