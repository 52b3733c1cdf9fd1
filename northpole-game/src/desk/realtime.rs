//! Tokio driver that lets the scripted delays elapse in real time.
use tokio::time::{Instant, sleep};

use super::{DeskEvent, DeskSession};

/// Sleep until the next pending timer and fire it.
///
/// Returns `None` when nothing is scheduled.
pub async fn step(session: &mut DeskSession) -> Option<Vec<DeskEvent>> {
    let wait = session.next_timer_in()?;
    let started = Instant::now();
    sleep(wait).await;
    Some(session.advance(started.elapsed()))
}

/// Drive the session until its transmit/grade/clear pipeline is idle,
/// handing each batch of events to `on_events` as it happens.
pub async fn drive_until_idle<F>(session: &mut DeskSession, mut on_events: F)
where
    F: FnMut(&DeskSession, &[DeskEvent]),
{
    while let Some(events) = step(session).await {
        if !events.is_empty() {
            on_events(session, &events);
        }
    }
}
