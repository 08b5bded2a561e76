//! Async meter service.
//!
//! All mutation of the meter happens on one task: events arrive over an mpsc
//! channel and the overlay refresh is a `select!` branch on the same loop, so
//! a refresh or a bulk completion can never interleave with `record_damage`.
//!
//! Blocking line sources (stdin) are read on a plain thread with
//! [`forward_json_lines`] so that an interrupted session never waits on a
//! pending read.

use std::future::Future;
use std::io::BufRead;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::events::MeterEvent;
use crate::meter::DpsMeter;
use crate::names::NameResolver;

const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(50);

/// Run the meter until the event channel closes or `shutdown` resolves.
///
/// Remaining fights are completed and reported before the meter is returned.
pub async fn run<C, R, S>(
    mut meter: DpsMeter<C, R>,
    mut events: mpsc::Receiver<MeterEvent>,
    refresh_interval: Duration,
    shutdown: S,
) -> DpsMeter<C, R>
where
    C: Clock,
    R: NameResolver,
    S: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(refresh_interval.max(MIN_REFRESH_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    info!(?refresh_interval, "meter service started");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => meter.process_event(event),
                None => break,
            },
            _ = ticker.tick() => meter.tick(),
            _ = &mut shutdown => {
                info!("meter service interrupted");
                break;
            }
        }
    }

    meter.shutdown();
    info!("meter service stopped");
    meter
}

/// Forward JSON-lines encoded events from `reader` into `tx`.
///
/// Blocks the calling thread; must not run on an async worker. Blank lines
/// are skipped and malformed lines are logged and skipped. Returns the number
/// of events forwarded; stops early if the receiver is gone.
pub fn forward_json_lines<Rd: BufRead>(reader: Rd, tx: mpsc::Sender<MeterEvent>) -> std::io::Result<usize> {
    let mut forwarded = 0;

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event = match serde_json::from_str::<MeterEvent>(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line_number, error = %e, "skipping malformed event");
                continue;
            }
        };

        if tx.blocking_send(event).is_err() {
            debug!("meter service gone, stopping reader");
            break;
        }
        forwarded += 1;
    }

    Ok(forwarded)
}
