use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Duration;

use dps_meter_core::config::{MeterConfig, MeterConfigExt};
use dps_meter_core::names::CreatureNames;
use dps_meter_core::service;
use dps_meter_core::{DisplaySink, DpsMeter, ManualClock, MonotonicClock, StdoutSink, TimedEvent};
use dps_meter_types::formatting::format_duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Outcome of replaying a recorded event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaySummary {
    pub events: usize,
    pub skipped: usize,
    pub duration_ms: u64,
}

/// Load the config from `path`, or from the platform config dir.
pub fn load_config(path: Option<&Path>) -> Result<MeterConfig, String> {
    match path {
        Some(path) => MeterConfig::load_from(path).map_err(|e| error_chain(&e)),
        None => Ok(MeterConfig::load().unwrap_or_else(|e| {
            warn!(error = %error_chain(&e), "using default configuration");
            MeterConfig::default()
        })),
    }
}

fn load_names(config: &MeterConfig) -> Result<CreatureNames, String> {
    config.creature_names().map_err(|e| error_chain(&e))
}

/// Replay a JSON-lines file of timed events, printing reports to stdout.
pub fn replay(path: &Path, config: &MeterConfig, show_overlay: bool) -> Result<(), String> {
    let file = File::open(path).map_err(|e| format!("failed to open {}: {e}", path.display()))?;
    let names = load_names(config)?;
    let sink = Box::new(StdoutSink::stdout(show_overlay));

    let summary = replay_reader(BufReader::new(file), config, names, sink)?;
    println!(
        "replayed {} events ({} skipped) over {}",
        summary.events,
        summary.skipped,
        format_duration(summary.duration_ms / 1_000)
    );
    Ok(())
}

/// Replay timed events from `input` on a manual clock.
///
/// The clock follows each event's `at_ms`; overlay refreshes run at every
/// refresh interval crossed between events.
pub fn replay_reader<R: BufRead>(
    input: R,
    config: &MeterConfig,
    names: CreatureNames,
    sink: Box<dyn DisplaySink + Send>,
) -> Result<ReplaySummary, String> {
    let clock = ManualClock::new(0);
    let mut meter = DpsMeter::new(clock.clone(), names, config);
    meter.add_sink(sink);

    let refresh_ms = config.refresh_interval_ms.max(1);
    let mut next_refresh_ms = refresh_ms;
    let mut summary = ReplaySummary {
        events: 0,
        skipped: 0,
        duration_ms: 0,
    };

    for (index, line) in input.lines().enumerate() {
        let line = line.map_err(|e| format!("failed to read line {}: {e}", index + 1))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let timed: TimedEvent = match serde_json::from_str(line) {
            Ok(timed) => timed,
            Err(e) => {
                warn!(line_number = index + 1, error = %e, "skipping malformed event");
                summary.skipped += 1;
                continue;
            }
        };

        while next_refresh_ms <= timed.at_ms {
            clock.set_ms(next_refresh_ms);
            meter.tick();
            next_refresh_ms += refresh_ms;
        }

        clock.set_ms(timed.at_ms);
        meter.process_event(timed.event);
        summary.events += 1;
        summary.duration_ms = summary.duration_ms.max(timed.at_ms);
    }

    meter.shutdown();
    Ok(summary)
}

/// Read JSON-lines events from stdin in real time until EOF or Ctrl-C.
///
/// Stdin is read on its own thread. On Ctrl-C that thread is left blocked
/// and dies with the process, so exiting never waits for another line.
pub async fn live(config: &MeterConfig, show_overlay: bool) -> Result<(), String> {
    let names = load_names(config)?;
    let mut meter = DpsMeter::new(MonotonicClock::new(), names, config);
    meter.add_sink(Box::new(StdoutSink::stdout(show_overlay)));

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    std::thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || match service::forward_json_lines(std::io::stdin().lock(), tx) {
            Ok(events) => info!(events, "input closed"),
            Err(e) => warn!(error = %e, "failed reading events"),
        })
        .map_err(|e| format!("failed to start stdin reader: {e}"))?;

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let refresh = Duration::from_millis(config.refresh_interval_ms);
    service::run(meter, rx, refresh, interrupted).await;
    Ok(())
}

/// Print the effective configuration and where it is stored.
pub fn show_config(config: &MeterConfig) -> Result<(), String> {
    match MeterConfig::config_path() {
        Ok(path) => println!("# default location: {}", path.display()),
        Err(e) => println!("# default location unavailable: {}", error_chain(&e)),
    }
    let text = toml::to_string_pretty(config).map_err(|e| e.to_string())?;
    print!("{text}");
    Ok(())
}

/// Render an error with its source chain, e.g. `outer: inner`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        text.push_str(": ");
        text.push_str(&e.to_string());
        source = e.source();
    }
    text
}
