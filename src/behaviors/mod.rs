use crate::Result;
use crate::page::Page;

mod back_to_top;
mod contact_form;
mod nav_menu;
mod smooth_scroll;

// Composition root, run once when a page mounts. Each component resolves its
// own elements and stays inert when they are absent; none shares state with
// the others.
pub(crate) fn install(page: &mut Page) -> Result<()> {
    nav_menu::attach(page)?;
    smooth_scroll::attach(page)?;
    back_to_top::attach(page)?;
    contact_form::attach(page)?;
    Ok(())
}
