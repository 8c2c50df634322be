//! # LogWriter: narrates the dinner on stdout.
//!
//! One line per event, in the order a philosopher lived it.
//!
//! ## Example output
//! ```text
//! [started] philosopher=0
//! [thinking] philosopher=0 for=812ms
//! [hungry] philosopher=0
//! [seated] philosopher=0 seat=2
//! [picked-up] philosopher=0 seat=2 chopstick=2
//! [picked-up] philosopher=0 seat=2 chopstick=3 holding=2,3
//! [eating] philosopher=0 seat=2 for=1400ms
//! [put-down] philosopher=0 seat=2 chopsticks=2,3
//! [stood] philosopher=0 seat=2
//! [timeout] philosopher=4 seat=1 put-down=1 waited-for=2 after=2710ms attempt=1
//! [retry] philosopher=4 seat=1 thinking=390ms attempt=1
//! [stop-requested]
//! [finished] philosopher=0 meals=3
//! [all-finished]
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::{Delivery, Subscribe};

/// Narrating subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Renders one event as a narration line.
    pub fn render(e: &Event) -> String {
        let who = Field("philosopher", e.philosopher.map(|p| p.0));
        let seat = Field("seat", e.seat);
        match e.kind {
            EventKind::ActorStarted => format!("[started]{who}"),
            EventKind::Thinking => format!("[thinking]{who}{}", Ms("for", e.delay_ms)),
            EventKind::Hungry => format!("[hungry]{who}"),
            EventKind::Seated => format!("[seated]{who}{seat}"),
            EventKind::PrimaryPickedUp => {
                format!("[picked-up]{who}{seat}{}", Field("chopstick", e.chopstick))
            }
            EventKind::SecondaryPickedUp => format!(
                "[picked-up]{who}{seat}{}{}",
                Field("chopstick", e.neighbor),
                Pair("holding", e.chopstick, e.neighbor)
            ),
            EventKind::Eating => format!("[eating]{who}{seat}{}", Ms("for", e.delay_ms)),
            EventKind::ChopsticksReleased => {
                format!("[put-down]{who}{seat}{}", Pair("chopsticks", e.chopstick, e.neighbor))
            }
            EventKind::Stood => format!("[stood]{who}{seat}"),
            EventKind::AcquireTimedOut => format!(
                "[timeout]{who}{seat}{}{}{}{}",
                Field("put-down", e.chopstick),
                Field("waited-for", e.neighbor),
                Ms("after", e.timeout_ms),
                Field("attempt", e.attempt)
            ),
            EventKind::RetryScheduled => format!(
                "[retry]{who}{seat}{}{}",
                Ms("thinking", e.delay_ms),
                Field("attempt", e.attempt)
            ),
            EventKind::GaveUpSeat => {
                format!("[gave-up-seat]{who}{seat}{}", Field("attempt", e.attempt))
            }
            EventKind::ActorFinished => format!("[finished]{who}{}", Field("meals", e.meals)),
            EventKind::StopRequested => "[stop-requested]".to_string(),
            EventKind::AllFinished => "[all-finished]".to_string(),
            EventKind::GraceExceeded => "[grace-exceeded]".to_string(),
            EventKind::SubscriberOverflow => format!(
                "[subscriber-overflow] subscriber={} reason={}",
                e.subscriber.unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            EventKind::SubscriberPanicked => format!(
                "[subscriber-panicked] subscriber={} info={}",
                e.subscriber.unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
        }
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        println!("{}", Self::render(e));
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }

    fn queue_capacity(&self) -> usize {
        4096
    }

    fn delivery(&self) -> Delivery {
        Delivery::Lossless
    }
}

/// ` key=value`, or nothing when the value is absent.
struct Field<T>(&'static str, Option<T>);

impl<T: std::fmt::Display> std::fmt::Display for Field<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.1 {
            Some(v) => write!(f, " {}={v}", self.0),
            None => Ok(()),
        }
    }
}

/// ` key=<n>ms`.
struct Ms(&'static str, Option<u32>);

impl std::fmt::Display for Ms {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.1 {
            Some(ms) => write!(f, " {}={ms}ms", self.0),
            None => Ok(()),
        }
    }
}

/// ` key=a,b`.
struct Pair(&'static str, Option<usize>, Option<usize>);

impl std::fmt::Display for Pair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.1, self.2) {
            (Some(a), Some(b)) => write!(f, " {}={a},{b}", self.0),
            _ => Ok(()),
        }
    }
}
