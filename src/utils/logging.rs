use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

pub const TIMING_TARGET: &str = "newsify.timing";

const LOGS_DIR: &str = "logs";

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Which events a log file receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    General,
    Timing,
}

#[derive(Debug, Clone, Copy)]
struct LogFile {
    name: &'static str,
    stream: Stream,
    json: bool,
}

const LOG_FILES: [LogFile; 4] = [
    LogFile { name: "newsify.log", stream: Stream::General, json: false },
    LogFile { name: "newsify.jsonl", stream: Stream::General, json: true },
    LogFile { name: "timing.log", stream: Stream::Timing, json: false },
    LogFile { name: "timing.jsonl", stream: Stream::Timing, json: true },
];

/// Flushes the non-blocking file writers when dropped.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn parse_log_level(value: &str) -> LevelFilter {
    match value.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" | "warning" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

fn general_targets(level: LevelFilter) -> Targets {
    Targets::new()
        .with_default(level)
        .with_target(TIMING_TARGET, LevelFilter::OFF)
        .with_target("hyper", LevelFilter::WARN)
        .with_target("hyper_util", LevelFilter::WARN)
        .with_target("reqwest", LevelFilter::WARN)
}

fn timing_targets() -> Targets {
    Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target(TIMING_TARGET, LevelFilter::INFO)
}

fn stream_targets(stream: Stream, level: LevelFilter) -> Targets {
    match stream {
        Stream::General => general_targets(level),
        Stream::Timing => timing_targets(),
    }
}

fn rolling_writer(logs_dir: &Path, file_name: &str) -> (NonBlocking, WorkerGuard) {
    tracing_appender::non_blocking(tracing_appender::rolling::daily(logs_dir, file_name))
}

fn file_layer(writer: NonBlocking, json: bool, filter: Targets) -> BoxedLayer {
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false);
    if json {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.with_filter(filter).boxed()
    }
}

/// Installs a stdout layer plus one daily-rolling file per entry in [`LOG_FILES`] under `logs/`.
/// Upload and LLM timing events only reach the `timing.*` files.
pub fn init_logging(log_level: &str) -> LoggingGuards {
    let logs_dir = Path::new(LOGS_DIR);
    if let Err(err) = fs::create_dir_all(logs_dir) {
        eprintln!("Failed to create logs directory: {err}");
    }
    let level = parse_log_level(log_level);

    let mut layers: Vec<BoxedLayer> = vec![tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_filter(general_targets(level))
        .boxed()];
    let mut guards = Vec::with_capacity(LOG_FILES.len());
    for file in LOG_FILES {
        let (writer, guard) = rolling_writer(logs_dir, file.name);
        layers.push(file_layer(writer, file.json, stream_targets(file.stream, level)));
        guards.push(guard);
    }

    tracing_subscriber::registry().with(layers).init();

    LoggingGuards { _guards: guards }
}
