use crate::Result;
use crate::dom::NodeId;
use crate::events::Handler;
use crate::page::{Page, PageState, ScrollBehavior};

// Hidden at exactly this offset, visible above it.
const VISIBILITY_THRESHOLD: i64 = 360;

const CONTROL_SELECTOR: &str = ".back-to-top";
const VISIBLE_CLASS: &str = "is-visible";

pub(crate) fn attach(page: &mut Page) -> Result<()> {
    let Some(control) = page.query(CONTROL_SELECTOR)? else {
        return Ok(());
    };

    // The page may mount already scrolled; compute the initial state.
    apply_visibility(&mut page.state, control)?;

    let window = page.window_target();
    page.add_listener(
        window,
        "scroll",
        Handler::new(move |state, _event| apply_visibility(state, control)),
    );

    page.add_listener(
        control,
        "click",
        Handler::new(move |state, _event| {
            let behavior = if state.window.reduced_motion {
                ScrollBehavior::Auto
            } else {
                ScrollBehavior::Smooth
            };
            state.request_scroll_top(behavior);
            Ok(())
        }),
    );

    Ok(())
}

fn apply_visibility(state: &mut PageState, control: NodeId) -> Result<()> {
    if state.window.scroll_y > VISIBILITY_THRESHOLD {
        state.dom.class_add(control, VISIBLE_CLASS)
    } else {
        state.dom.class_remove(control, VISIBLE_CLASS)
    }
}
