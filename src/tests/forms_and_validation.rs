use super::*;

const CONTACT_HTML: &str = r#"
    <form id='contact-form'>
        <div class='form-group'>
            <label for='name'>Name</label>
            <input id='name' name='name' type='text' required minlength='2'>
            <span id='name-error' class='error-message'></span>
        </div>
        <div class='form-group'>
            <label for='email'>Email</label>
            <input id='email' name='email' type='email' required>
            <span id='email-error' class='error-message'></span>
        </div>
        <div class='form-group'>
            <label for='message'>Message</label>
            <textarea id='message' name='message' required minlength='10'></textarea>
            <span id='message-error' class='error-message'></span>
        </div>
        <button id='send' type='submit'>Send</button>
    </form>
    <div id='success-message' class='hidden'>Thanks! We will be in touch.</div>
    "#;

fn fill_contact_form(page: &mut Page) -> Result<()> {
    page.type_text("#name", "Joanna")?;
    page.type_text("#email", "jo@example.test")?;
    page.type_text("#message", "Hello from the tests!")?;
    Ok(())
}

#[test]
fn blur_on_an_empty_required_field_shows_its_message() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.focus("#name")?;
    page.blur("#name")?;

    page.assert_text("#name-error", "This field is required")?;
    assert!(page.dump_dom("#name")?.contains("class=\"error\""));
    Ok(())
}

#[test]
fn typing_clears_a_field_error() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.focus("#name")?;
    page.blur("#name")?;
    page.assert_text("#name-error", "This field is required")?;

    page.type_text("#name", "Jo")?;
    page.assert_text("#name-error", "")?;
    assert!(!page.dump_dom("#name")?.contains("error"));
    Ok(())
}

#[test]
fn email_shape_is_checked_on_blur() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.focus("#email")?;
    page.type_text("#email", "not-an-email")?;
    page.blur("#email")?;
    page.assert_text("#email-error", "Please enter a valid email")?;

    page.focus("#email")?;
    page.type_text("#email", "jo@example.test")?;
    page.blur("#email")?;
    page.assert_text("#email-error", "")?;
    Ok(())
}

#[test]
fn minlength_is_checked_after_presence() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.focus("#name")?;
    page.type_text("#name", "J")?;
    page.blur("#name")?;
    page.assert_text("#name-error", "Minimum 2 characters required")?;

    page.focus("#message")?;
    page.type_text("#message", "too short")?;
    page.blur("#message")?;
    page.assert_text("#message-error", "Minimum 10 characters required")?;
    Ok(())
}

#[test]
fn pattern_matching_is_anchored_to_the_whole_value() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='code' name='code' pattern='[A-Z]{3}'>
                <span id='code-error' class='error-message'></span>
            </div>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.focus("#code")?;
    page.type_text("#code", "AB1")?;
    page.blur("#code")?;
    page.assert_text("#code-error", "Please match the required format")?;

    page.focus("#code")?;
    page.type_text("#code", "xABCx")?;
    page.blur("#code")?;
    page.assert_text("#code-error", "Please match the required format")?;

    page.focus("#code")?;
    page.type_text("#code", "ABC")?;
    page.blur("#code")?;
    page.assert_text("#code-error", "")?;

    // Optional field: an empty value is never a pattern violation.
    page.focus("#code")?;
    page.type_text("#code", "")?;
    page.blur("#code")?;
    page.assert_text("#code-error", "")?;
    Ok(())
}

#[test]
fn unparseable_pattern_attributes_constrain_nothing() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='code' name='code' pattern='['>
                <span id='code-error' class='error-message'></span>
            </div>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.focus("#code")?;
    page.type_text("#code", "anything")?;
    page.blur("#code")?;
    page.assert_text("#code-error", "")?;
    Ok(())
}

#[test]
fn url_inputs_require_a_scheme() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='site' name='site' type='url'>
                <span id='site-error' class='error-message'></span>
            </div>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.focus("#site")?;
    page.type_text("#site", "notaurl")?;
    page.blur("#site")?;
    page.assert_text("#site-error", "Please enter a valid url")?;

    for valid in ["https://example.test/menu", "mailto:chef@example.test"] {
        page.focus("#site")?;
        page.type_text("#site", valid)?;
        page.blur("#site")?;
        page.assert_text("#site-error", "")?;
    }
    Ok(())
}

#[test]
fn required_checkbox_must_be_checked_to_submit() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='agree' name='agree' type='checkbox' required>
                <span id='agree-error' class='error-message'></span>
            </div>
            <button id='send' type='submit'>Send</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#send")?;
    page.assert_text("#agree-error", "This field is required")?;
    assert!(page.submissions().is_empty());

    page.set_checked("#agree", true)?;
    page.assert_text("#agree-error", "")?;
    page.click("#send")?;
    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: vec![("agree".to_string(), "on".to_string())],
        }]
    );
    Ok(())
}

#[test]
fn required_radio_group_accepts_any_checked_member() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='plan-a' name='plan' type='radio' value='basic' required>
                <input id='plan-b' name='plan' type='radio' value='pro' required>
                <span id='plan-error' class='error-message'></span>
            </div>
            <button id='send' type='submit'>Send</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#send")?;
    page.assert_text("#plan-error", "This field is required")?;
    assert!(page.submissions().is_empty());

    page.set_checked("#plan-b", true)?;
    page.click("#send")?;
    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: vec![("plan".to_string(), "pro".to_string())],
        }]
    );
    Ok(())
}

#[test]
fn rejected_submit_focuses_the_first_invalid_field() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.click("#send")?;

    assert!(page.submissions().is_empty());
    assert_eq!(page.active_element_id(), Some("name".to_string()));
    page.assert_text("#name-error", "This field is required")?;
    page.assert_text("#email-error", "This field is required")?;
    page.assert_text("#message-error", "This field is required")?;
    page.assert_visible("#contact-form")?;
    page.assert_hidden("#success-message")?;
    Ok(())
}

#[test]
fn accepted_submit_records_entries_and_swaps_visibility() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    fill_contact_form(&mut page)?;
    page.click("#send")?;

    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: vec![
                ("name".to_string(), "Joanna".to_string()),
                ("email".to_string(), "jo@example.test".to_string()),
                ("message".to_string(), "Hello from the tests!".to_string()),
            ],
        }]
    );
    page.assert_hidden("#contact-form")?;
    page.assert_visible("#success-message")?;

    let timers = page.pending_timers();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].due_at, 3000);
    Ok(())
}

#[test]
fn success_notice_reverts_after_three_seconds() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    fill_contact_form(&mut page)?;
    page.click("#send")?;

    page.advance_time(2999)?;
    page.assert_hidden("#contact-form")?;
    page.assert_visible("#success-message")?;

    page.advance_time(1)?;
    page.assert_visible("#contact-form")?;
    page.assert_hidden("#success-message")?;
    page.assert_value("#name", "")?;
    page.assert_value("#email", "")?;
    page.assert_value("#message", "")?;
    assert!(page.pending_timers().is_empty());
    Ok(())
}

#[test]
fn resubmission_restarts_the_notice_clock() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    fill_contact_form(&mut page)?;
    page.click("#send")?;
    page.advance_time(1000)?;

    // Values are still valid, so a second submit goes straight through
    // and supersedes the first revert timer.
    page.click("#send")?;
    assert_eq!(page.submissions().len(), 2);
    let timers = page.pending_timers();
    assert_eq!(timers.len(), 1);
    assert_eq!(timers[0].due_at, 4000);

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| line.contains("[form] revert canceled id=1")));
    assert!(logs.iter().any(|line| {
        line.contains("[form] revert scheduled id=2 delay_ms=3000")
    }));

    page.advance_time(2000)?;
    page.assert_hidden("#contact-form")?;
    page.advance_time(1000)?;
    page.assert_visible("#contact-form")?;
    Ok(())
}

#[test]
fn disabled_and_readonly_fields_skip_validation() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <div class='form-group'>
                <input id='frozen' name='frozen' type='text' required disabled>
                <span id='frozen-error' class='error-message'></span>
            </div>
            <div class='form-group'>
                <input id='fixed' name='fixed' type='text' required readonly>
                <span id='fixed-error' class='error-message'></span>
            </div>
            <div class='form-group'>
                <input id='real' name='real' type='text' required>
                <span id='real-error' class='error-message'></span>
            </div>
            <button id='send' type='submit'>Send</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#send")?;
    page.assert_text("#frozen-error", "")?;
    page.assert_text("#fixed-error", "")?;
    page.assert_text("#real-error", "This field is required")?;
    assert_eq!(page.active_element_id(), Some("real".to_string()));

    page.type_text("#real", "present")?;
    page.click("#send")?;
    // Disabled controls stay out of the submission; readonly ones stay in.
    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: vec![
                ("fixed".to_string(), String::new()),
                ("real".to_string(), "present".to_string()),
            ],
        }]
    );
    Ok(())
}

#[test]
fn fields_inside_a_disabled_fieldset_are_inert() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <fieldset disabled>
                <div class='form-group'>
                    <input id='legacy' name='legacy' type='text' required>
                    <span id='legacy-error' class='error-message'></span>
                </div>
            </fieldset>
            <button id='send' type='submit'>Send</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#send")?;
    page.assert_text("#legacy-error", "")?;
    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: Vec::new(),
        }]
    );
    Ok(())
}

#[test]
fn reset_button_restores_markup_defaults() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <input id='who' name='who' value='default'>
            <textarea id='note' name='note'>seed note</textarea>
            <input id='opt' name='opt' type='checkbox' checked>
            <button id='clear' type='reset'>Reset</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.type_text("#who", "changed")?;
    page.type_text("#note", "edited away")?;
    page.set_checked("#opt", false)?;

    page.click("#clear")?;
    page.assert_value("#who", "default")?;
    page.assert_value("#note", "seed note")?;
    page.assert_checked("#opt", true)?;
    Ok(())
}

#[test]
fn enter_submits_from_single_line_inputs_only() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    fill_contact_form(&mut page)?;

    page.press_enter("#name")?;
    assert_eq!(page.submissions().len(), 1);

    page.press_enter("#message")?;
    assert_eq!(page.submissions().len(), 1);
    Ok(())
}

#[test]
fn label_clicks_forward_to_their_control() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <label id='agree-label' for='agree'>I agree</label>
            <input id='agree' name='agree' type='checkbox'>
            <label id='wrap-label'>Nested <input id='inner' name='inner' type='checkbox'></label>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#agree-label")?;
    page.assert_checked("#agree", true)?;

    page.click("#wrap-label")?;
    page.assert_checked("#inner", true)?;

    page.click("#agree-label")?;
    page.assert_checked("#agree", false)?;
    Ok(())
}

#[test]
fn checking_a_radio_unchecks_its_form_group_only() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <input id='r-small' name='size' type='radio' value='s' checked>
            <input id='r-medium' name='size' type='radio' value='m'>
        </form>
        <input id='free' name='size' type='radio' value='x' checked>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#r-medium")?;
    page.assert_checked("#r-medium", true)?;
    page.assert_checked("#r-small", false)?;
    // Same group name outside the form belongs to a different owner.
    page.assert_checked("#free", true)?;

    // Clicking an already checked radio changes nothing.
    page.click("#r-medium")?;
    page.assert_checked("#r-medium", true)?;
    Ok(())
}

#[test]
fn unnamed_and_unchecked_controls_stay_out_of_entries() -> Result<()> {
    let html = r#"
        <form id='contact-form'>
            <input id='named' name='user' value='u1'>
            <input id='anon' value='ghost'>
            <input id='box' name='box' type='checkbox' value='yes' checked>
            <input id='off' name='off' type='checkbox'>
            <button id='send' type='submit'>Send</button>
        </form>
        "#;

    let mut page = Page::from_html(html)?;
    page.click("#send")?;
    assert_eq!(
        page.submissions(),
        &[FormSubmission {
            form: "#contact-form".to_string(),
            fields: vec![
                ("user".to_string(), "u1".to_string()),
                ("box".to_string(), "yes".to_string()),
            ],
        }]
    );
    Ok(())
}

#[test]
fn typing_into_non_controls_reports_a_type_mismatch() -> Result<()> {
    let page_html = "<div id='panel'>x</div><input id='plain' type='text'>";
    let mut page = Page::from_html(page_html)?;

    let err = page
        .type_text("#panel", "hello")
        .expect_err("divs take no text");
    match err {
        Error::TypeMismatch {
            selector,
            expected,
            actual,
        } => {
            assert_eq!(selector, "#panel");
            assert_eq!(expected, "input or textarea");
            assert_eq!(actual, "div");
        }
        other => panic!("wrong error variant: {other:?}"),
    }

    let err = page
        .set_checked("#plain", true)
        .expect_err("text inputs have no checkedness");
    match err {
        Error::TypeMismatch { expected, actual, .. } => {
            assert_eq!(expected, "input[type=checkbox|radio]");
            assert_eq!(actual, "input[type=text]");
        }
        other => panic!("wrong error variant: {other:?}"),
    }
    Ok(())
}

#[test]
fn hidden_inputs_ignore_typing_and_focus() -> Result<()> {
    let html = "<form id='contact-form'><input id='token' name='token' type='hidden' value='t0'></form>";
    let mut page = Page::from_html(html)?;

    page.type_text("#token", "overwritten")?;
    page.assert_value("#token", "t0")?;

    page.focus("#token")?;
    assert_eq!(page.active_element_id(), None);
    Ok(())
}

#[test]
fn submit_gesture_resolves_the_owning_form() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    fill_contact_form(&mut page)?;
    page.submit("#name")?;
    assert_eq!(page.submissions().len(), 1);

    // A control without a form owner has nowhere to submit to.
    let mut orphan = Page::from_html("<input id='lone' type='text'>")?;
    orphan.submit("#lone")?;
    assert!(orphan.submissions().is_empty());
    Ok(())
}

#[test]
fn form_flow_emits_behavior_trace_lines() -> Result<()> {
    let mut page = Page::from_html(CONTACT_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.focus("#name")?;
    page.blur("#name")?;
    page.click("#send")?;
    fill_contact_form(&mut page)?;
    page.click("#send")?;
    page.advance_time(3000)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().any(|line| {
        line.contains("[form] invalid field=#name reason=value_missing")
    }));
    assert!(logs.iter().any(|line| {
        line.contains("[form] submit rejected form=#contact-form first_error=#name")
    }));
    assert!(logs.iter().any(|line| {
        line.contains("[form] submit accepted form=#contact-form fields=3")
    }));
    assert!(logs.iter().any(|line| {
        line.contains("[form] revert scheduled id=1 delay_ms=3000")
    }));
    assert!(logs.iter().any(|line| line.contains("[form] revert fired form=#contact-form")));
    Ok(())
}
