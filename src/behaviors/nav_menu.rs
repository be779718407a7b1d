use crate::Result;
use crate::dom::NodeId;
use crate::events::Handler;
use crate::page::{Page, PageState};

// The desktop layout has no openable panel above this width.
const MENU_BREAKPOINT: i64 = 780;

const TOGGLE_SELECTOR: &str = ".nav__toggle";
const PANEL_SELECTOR: &str = "#primary-menu";
const OPEN_CLASS: &str = "is-open";

pub(crate) fn attach(page: &mut Page) -> Result<()> {
    let Some(toggle) = page.query(TOGGLE_SELECTOR)? else {
        return Ok(());
    };
    let Some(panel) = page.query(PANEL_SELECTOR)? else {
        return Ok(());
    };

    page.add_listener(
        toggle,
        "click",
        Handler::new(move |state, _event| {
            let open = state.dom.class_toggle(panel, OPEN_CLASS)?;
            sync_expanded(state, toggle, open)?;
            if open {
                let height = state.dom.scroll_height(panel)?;
                state
                    .dom
                    .set_style_property(panel, "max-height", &format!("{height}px"))?;
            } else {
                state.dom.clear_style_property(panel, "max-height")?;
            }
            Ok(())
        }),
    );

    // Links resolved once at install, same as the toggle and panel.
    for link in page.query_all_from(panel, "a")? {
        page.add_listener(
            link,
            "click",
            Handler::new(move |state, _event| close_menu(state, panel, toggle)),
        );
    }

    let window = page.window_target();
    page.add_listener(
        window,
        "resize",
        Handler::new(move |state, _event| {
            if state.window.viewport_width > MENU_BREAKPOINT {
                close_menu(state, panel, toggle)?;
            }
            Ok(())
        }),
    );

    // A stale open overlay while scrolling on a narrow viewport is forced
    // closed.
    page.add_listener(
        window,
        "scroll",
        Handler::new(move |state, _event| {
            if state.window.viewport_width <= MENU_BREAKPOINT
                && state.dom.class_contains(panel, OPEN_CLASS)?
            {
                close_menu(state, panel, toggle)?;
            }
            Ok(())
        }),
    );

    Ok(())
}

// Idempotent: closing an already-closed menu changes nothing.
fn close_menu(state: &mut PageState, panel: NodeId, toggle: NodeId) -> Result<()> {
    state.dom.class_remove(panel, OPEN_CLASS)?;
    sync_expanded(state, toggle, false)
}

fn sync_expanded(state: &mut PageState, toggle: NodeId, open: bool) -> Result<()> {
    state
        .dom
        .set_attr(toggle, "aria-expanded", if open { "true" } else { "false" })
}
