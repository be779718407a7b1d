use super::*;

const PAGE: &str = r#"
    <header>
      <nav>
        <button class='nav__toggle' aria-expanded='false'>Meniu</button>
        <ul id='primary-menu'>
          <li><a href='#despre'>Despre</a></li>
          <li><a href='#rezervari'>Rezervări</a></li>
          <li><a href='#contact'>Contact</a></li>
        </ul>
      </nav>
    </header>
    <main>
      <section id='despre'><a href='#'>Sus</a><a href='#nicaieri'>Lipsă</a></section>
      <section id='rezervari'></section>
      <section id='contact'>
        <form class='contact__form'>
          <input id='name' name='name'>
          <p data-error-for='name'></p>
          <input id='email' name='email'>
          <p data-error-for='email'></p>
          <textarea id='message' name='message'></textarea>
          <p data-error-for='message'></p>
          <p class='form__success'></p>
          <button type='submit'>Trimite</button>
        </form>
      </section>
    </main>
    <button class='back-to-top'>Sus</button>
    "#;

fn narrow() -> PageOptions {
    PageOptions {
        viewport_width: 600,
        ..PageOptions::default()
    }
}

#[test]
fn menu_toggle_flips_state_and_syncs_expanded_attribute() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;
    page.set_scroll_height("#primary-menu", 240)?;

    page.click(".nav__toggle")?;
    page.assert_class("#primary-menu", "is-open", true)?;
    page.assert_attr(".nav__toggle", "aria-expanded", "true")?;
    assert_eq!(
        page.style_property("#primary-menu", "max-height")?,
        Some("240px".into())
    );

    page.click(".nav__toggle")?;
    page.assert_class("#primary-menu", "is-open", false)?;
    page.assert_attr(".nav__toggle", "aria-expanded", "false")?;
    assert_eq!(page.style_property("#primary-menu", "max-height")?, None);
    Ok(())
}

#[test]
fn menu_toggle_parity_over_many_activations() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;
    for n in 1..=6 {
        page.click(".nav__toggle")?;
        let expected = n % 2 == 1;
        page.assert_class("#primary-menu", "is-open", expected)?;
        page.assert_attr(
            ".nav__toggle",
            "aria-expanded",
            if expected { "true" } else { "false" },
        )?;
    }
    Ok(())
}

#[test]
fn menu_link_click_closes_panel_idempotently() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;

    page.click(".nav__toggle")?;
    page.assert_class("#primary-menu", "is-open", true)?;
    page.click("#primary-menu a[href='#despre']")?;
    page.assert_class("#primary-menu", "is-open", false)?;

    // Closed already: a second link click keeps it closed.
    page.click("#primary-menu a[href='#despre']")?;
    page.assert_class("#primary-menu", "is-open", false)?;
    page.assert_attr(".nav__toggle", "aria-expanded", "false")?;
    Ok(())
}

#[test]
fn resize_past_breakpoint_forces_menu_closed() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;

    page.click(".nav__toggle")?;
    page.assert_class("#primary-menu", "is-open", true)?;

    // 780 itself is not past the breakpoint.
    page.resize_to(780)?;
    page.assert_class("#primary-menu", "is-open", true)?;

    page.resize_to(781)?;
    page.assert_class("#primary-menu", "is-open", false)?;
    page.assert_attr(".nav__toggle", "aria-expanded", "false")?;
    Ok(())
}

#[test]
fn scroll_closes_menu_only_on_narrow_viewports() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;
    page.click(".nav__toggle")?;
    page.scroll_to(40)?;
    page.assert_class("#primary-menu", "is-open", false)?;

    let mut wide = Page::from_html(PAGE)?;
    wide.click(".nav__toggle")?;
    wide.scroll_to(40)?;
    wide.assert_class("#primary-menu", "is-open", true)?;
    Ok(())
}

#[test]
fn routed_anchor_click_suppresses_navigation_and_requests_scroll() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.set_offset_top("#despre", 640)?;

    page.click("#primary-menu a[href='#despre']")?;
    assert!(page.navigations().is_empty());
    assert_eq!(
        page.scroll_requests().last().copied(),
        Some(ScrollRequest {
            top: 640,
            behavior: ScrollBehavior::Smooth,
        })
    );
    assert_eq!(page.scroll_y(), 640);
    Ok(())
}

#[test]
fn placeholder_and_unresolvable_anchors_keep_default_navigation() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;

    page.click("#despre a[href='#']")?;
    page.click("#despre a[href='#nicaieri']")?;

    let hrefs = page
        .navigations()
        .iter()
        .map(|nav| nav.href.as_str())
        .collect::<Vec<_>>();
    assert_eq!(hrefs, ["#", "#nicaieri"]);
    assert!(page.scroll_requests().is_empty());
    Ok(())
}

#[test]
fn reduced_motion_makes_routed_scrolls_instant() -> Result<()> {
    let options = PageOptions {
        reduced_motion: true,
        ..PageOptions::default()
    };
    let mut page = Page::from_html_with(PAGE, options)?;
    page.set_offset_top("#rezervari", 900)?;

    page.click("#primary-menu a[href='#rezervari']")?;
    assert_eq!(
        page.scroll_requests().last().copied(),
        Some(ScrollRequest {
            top: 900,
            behavior: ScrollBehavior::Auto,
        })
    );
    Ok(())
}

#[test]
fn back_to_top_visibility_follows_scroll_threshold() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.assert_class(".back-to-top", "is-visible", false)?;

    page.scroll_to(360)?;
    page.assert_class(".back-to-top", "is-visible", false)?;

    page.scroll_to(361)?;
    page.assert_class(".back-to-top", "is-visible", true)?;

    page.scroll_to(0)?;
    page.assert_class(".back-to-top", "is-visible", false)?;
    Ok(())
}

#[test]
fn back_to_top_initial_state_respects_mount_offset() -> Result<()> {
    let options = PageOptions {
        scroll_y: 500,
        ..PageOptions::default()
    };
    let page = Page::from_html_with(PAGE, options)?;
    page.assert_class(".back-to-top", "is-visible", true)?;
    Ok(())
}

#[test]
fn back_to_top_click_scrolls_to_origin_and_hides_itself() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.scroll_to(800)?;
    page.assert_class(".back-to-top", "is-visible", true)?;

    page.click(".back-to-top")?;
    assert_eq!(page.scroll_y(), 0);
    page.assert_class(".back-to-top", "is-visible", false)?;
    assert_eq!(
        page.scroll_requests().last().copied(),
        Some(ScrollRequest {
            top: 0,
            behavior: ScrollBehavior::Smooth,
        })
    );
    Ok(())
}

#[test]
fn back_to_top_click_honors_reduced_motion_at_click_time() -> Result<()> {
    let options = PageOptions {
        scroll_y: 700,
        reduced_motion: true,
        ..PageOptions::default()
    };
    let mut page = Page::from_html_with(PAGE, options)?;
    page.click(".back-to-top")?;
    assert_eq!(
        page.scroll_requests().last().copied(),
        Some(ScrollRequest {
            top: 0,
            behavior: ScrollBehavior::Auto,
        })
    );
    Ok(())
}

#[test]
fn empty_submission_reports_every_required_field() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.click(".contact__form button")?;

    page.assert_text("[data-error-for='name']", "Te rugăm să adaugi numele.")?;
    page.assert_text("[data-error-for='email']", "Te rugăm să adaugi emailul.")?;
    page.assert_text(
        "[data-error-for='message']",
        "Spune-ne câteva detalii despre rezervare.",
    )?;
    page.assert_text(".form__success", "")?;

    page.assert_class("#name", "is-invalid", true)?;
    page.assert_attr("#name", "aria-invalid", "true")?;
    assert!(page.form_deliveries().is_empty());
    Ok(())
}

#[test]
fn invalid_email_reports_only_the_format_error() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.type_text("#name", "Ana")?;
    page.type_text("#email", "not-an-email")?;
    page.type_text("#message", "hello")?;
    page.click(".contact__form button")?;

    page.assert_text("[data-error-for='email']", "Email invalid. Ex: nume@domeniu.com")?;
    page.assert_text("[data-error-for='name']", "")?;
    page.assert_text("[data-error-for='message']", "")?;
    page.assert_class("#email", "is-invalid", true)?;
    page.assert_class("#name", "is-invalid", false)?;
    page.assert_text(".form__success", "")?;
    Ok(())
}

#[test]
fn valid_submission_shows_success_and_resets_fields() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.type_text("#name", "Ana")?;
    page.type_text("#email", "ana@example.com")?;
    page.type_text("#message", "hello")?;
    page.click(".contact__form button")?;

    page.assert_text(
        ".form__success",
        "Mulțumim! Trimite formularul cu providerul preferat (Formspree/EmailJS).",
    )?;
    page.assert_text("[data-error-for='name']", "")?;
    page.assert_text("[data-error-for='email']", "")?;
    page.assert_text("[data-error-for='message']", "")?;
    page.assert_value("#name", "")?;
    page.assert_value("#email", "")?;
    page.assert_value("#message", "")?;
    assert!(page.form_deliveries().is_empty());
    Ok(())
}

#[test]
fn each_attempt_revalidates_from_a_clean_slate() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.type_text("#name", "Ana")?;
    page.type_text("#email", "ana@example.com")?;
    page.type_text("#message", "hello")?;
    page.click(".contact__form button")?;
    page.assert_text(
        ".form__success",
        "Mulțumim! Trimite formularul cu providerul preferat (Formspree/EmailJS).",
    )?;

    // Fields were reset, so the next attempt fails fresh and clears the
    // success message.
    page.click(".contact__form button")?;
    page.assert_text(".form__success", "")?;
    page.assert_text("[data-error-for='name']", "Te rugăm să adaugi numele.")?;
    Ok(())
}

#[test]
fn repeated_failing_submissions_do_not_accumulate_messages() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.click(".contact__form button")?;
    page.click(".contact__form button")?;

    page.assert_text("[data-error-for='name']", "Te rugăm să adaugi numele.")?;
    page.assert_text("[data-error-for='email']", "Te rugăm să adaugi emailul.")?;
    page.assert_text(
        "[data-error-for='message']",
        "Spune-ne câteva detalii despre rezervare.",
    )?;
    Ok(())
}

#[test]
fn whitespace_only_values_fail_required_rules() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.type_text("#name", "   ")?;
    page.type_text("#email", " ana@example.com ")?;
    page.type_text("#message", "\t")?;
    page.click(".contact__form button")?;

    page.assert_text("[data-error-for='name']", "Te rugăm să adaugi numele.")?;
    // Email is trimmed before the format check.
    page.assert_text("[data-error-for='email']", "")?;
    page.assert_text(
        "[data-error-for='message']",
        "Spune-ne câteva detalii despre rezervare.",
    )?;
    Ok(())
}

#[test]
fn submit_helper_routes_through_the_owning_form() -> Result<()> {
    let mut page = Page::from_html(PAGE)?;
    page.submit("#email")?;
    page.assert_text("[data-error-for='email']", "Te rugăm să adaugi emailul.")?;
    Ok(())
}

#[test]
fn unvalidated_form_submission_records_a_delivery() -> Result<()> {
    let html = r#"
        <form class='signup' action='https://formspree.io/f/demo'>
          <input id='email' name='email'>
          <button type='submit'>Send</button>
        </form>
        "#;
    let mut page = Page::from_html(html)?;
    page.click(".signup button")?;
    assert_eq!(
        page.form_deliveries(),
        [FormDelivery {
            action: "https://formspree.io/f/demo".into(),
        }]
    );
    Ok(())
}

#[test]
fn components_stay_inert_on_a_partial_document() -> Result<()> {
    let mut page = Page::from_html("<p id='x'>hi</p>")?;
    page.scroll_to(400)?;
    page.resize_to(900)?;
    page.assert_text("#x", "hi")?;
    assert!(page.scroll_requests().is_empty());
    Ok(())
}

#[test]
fn disabled_controls_ignore_clicks_and_typing() -> Result<()> {
    let html = r#"
        <form class='contact__form'>
          <input id='name' name='name' disabled>
          <input id='email' name='email'>
          <textarea id='message' name='message'></textarea>
          <button id='send' type='submit' disabled>Trimite</button>
        </form>
        "#;
    let mut page = Page::from_html(html)?;
    page.type_text("#name", "Ana")?;
    page.assert_value("#name", "")?;
    page.click("#send")?;
    // The disabled submit control never reaches the form.
    assert_eq!(page.attr("#email", "aria-invalid")?, None);
    Ok(())
}

#[test]
fn typing_into_a_non_control_is_a_type_mismatch() {
    let mut page = Page::from_html(PAGE).expect("page mounts");
    let err = page
        .type_text("#despre", "text")
        .expect_err("sections do not accept text");
    match err {
        Error::TypeMismatch { expected, .. } => {
            assert_eq!(expected, "input or textarea");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn unsupported_selectors_are_rejected() {
    let page = Page::from_html(PAGE).expect("page mounts");
    let err = page
        .assert_exists("p:first-child")
        .expect_err("pseudo-classes are unsupported");
    match err {
        Error::UnsupportedSelector(selector) => assert_eq!(selector, "p:first-child"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn scoped_and_grouped_selectors_resolve() -> Result<()> {
    let page = Page::from_html(PAGE)?;
    page.assert_exists("form.contact__form [data-error-for='email']")?;
    page.assert_exists(".contact__form > button")?;
    page.assert_exists(".back-to-top, .nav__toggle")?;
    page.assert_exists("a[href^='#rez']")?;
    Ok(())
}

#[test]
fn character_references_decode_in_text_and_attributes() -> Result<()> {
    let page = Page::from_html("<p id='x' title='a &amp; b'>1 &lt; 2 &#x2714;</p>")?;
    page.assert_text("#x", "1 < 2 \u{2714}")?;
    page.assert_attr("#x", "title", "a & b")?;
    Ok(())
}

#[test]
fn trace_logs_record_event_dispatch() -> Result<()> {
    let mut page = Page::from_html_with(PAGE, narrow())?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.click(".nav__toggle")?;

    let logs = page.take_trace_logs();
    assert!(!logs.is_empty());
    assert!(logs.iter().any(|line| line.starts_with("[event] click")));
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn negative_scroll_and_resize_are_rejected() {
    let mut page = Page::from_html(PAGE).expect("page mounts");
    assert!(matches!(page.scroll_to(-1), Err(Error::Runtime(_))));
    assert!(matches!(page.resize_to(-1), Err(Error::Runtime(_))));
}
