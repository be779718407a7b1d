use crate::Result;
use crate::events::Handler;
use crate::page::{Page, ScrollBehavior};

pub(crate) fn attach(page: &mut Page) -> Result<()> {
    // Resolved once at install and applied uniformly to every routed link.
    let behavior = if page.reduced_motion() {
        ScrollBehavior::Auto
    } else {
        ScrollBehavior::Smooth
    };

    for link in page.query_all("a[href^='#']")? {
        let Some(href) = page.state.dom.attr(link, "href") else {
            continue;
        };
        let fragment = href.trim();
        if fragment.is_empty() || fragment == "#" {
            continue;
        }
        // Broken or placeholder fragments keep default navigation instead of
        // raising an error.
        let Some(target) = page.query(fragment).ok().flatten() else {
            continue;
        };

        page.add_listener(
            link,
            "click",
            Handler::new(move |state, event| {
                event.prevent_default();
                state.request_scroll_into_view(target, behavior)
            }),
        );
    }

    Ok(())
}
