use super::*;
use crate::schedule::TimerTask;

const TRACE_HTML: &str = r#"
    <nav><a id='jump' href='#menu'>Menu</a></nav>
    <section id='menu'>
        <input id='menu-search' type='text'>
        <article class='menu-item'><h3>Pizza</h3></article>
    </section>
    <form id='jobs'></form>
    "#;

fn queue_notice(page: &mut Page) -> Result<()> {
    let form = page.select_one("#jobs")?;
    page.schedule_timeout(
        TimerTask::RevertSubmitNotice {
            form,
            success: None,
        },
        0,
    );
    Ok(())
}

#[test]
fn take_trace_logs_drains_the_buffer() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.click("#jump")?;

    let logs = page.take_trace_logs();
    assert!(!logs.is_empty());
    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn trace_stays_empty_while_disabled() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.click("#jump")?;
    queue_notice(&mut page)?;
    page.advance_time(0)?;

    assert!(page.take_trace_logs().is_empty());
    Ok(())
}

#[test]
fn enabling_late_captures_only_later_work() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.click("#jump")?;

    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.advance_time(5)?;

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 1);
    assert!(logs[0].contains("[timer] advance delta_ms=5 from=0 to=5 ran_due=0"));
    Ok(())
}

#[test]
fn timer_lines_can_be_silenced() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_timers(false);

    queue_notice(&mut page)?;
    page.advance_time(0)?;
    page.click("#jump")?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().all(|line| !line.contains("[timer]")));
    assert!(logs.iter().any(|line| line.contains("[event]")));
    Ok(())
}

#[test]
fn event_lines_can_be_silenced() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_events(false);

    page.click("#jump")?;
    queue_notice(&mut page)?;
    page.advance_time(0)?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().all(|line| !line.contains("[event]")));
    assert!(logs.iter().any(|line| line.contains("[nav]")));
    assert!(logs.iter().any(|line| line.contains("[timer]")));
    Ok(())
}

#[test]
fn behavior_lines_can_be_silenced() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_behaviors(false);

    page.click("#jump")?;
    page.type_text("#menu-search", "pizza")?;

    let logs = page.take_trace_logs();
    assert!(logs.iter().all(|line| !line.contains("[nav]")));
    assert!(logs.iter().all(|line| !line.contains("[filter]")));
    assert!(logs.iter().any(|line| line.contains("[event]")));
    Ok(())
}

#[test]
fn log_limit_evicts_the_oldest_lines() -> Result<()> {
    let mut page = Page::from_html(TRACE_HTML)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);
    page.set_trace_log_limit(2)?;

    page.click("#jump")?;
    page.advance_time(5)?;

    let logs = page.take_trace_logs();
    assert_eq!(logs.len(), 2);
    assert!(logs[1].contains("[timer] advance delta_ms=5 from=0 to=5 ran_due=0"));

    let err = page
        .set_trace_log_limit(0)
        .expect_err("a zero limit would drop every line");
    match err {
        Error::PageRuntime(msg) => {
            assert!(msg.contains("set_trace_log_limit requires at least 1 entry"));
        }
        other => panic!("wrong error variant: {other:?}"),
    }
    Ok(())
}
