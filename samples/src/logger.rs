use crate::config::LoggingConfig;
use fern::colors::{Color, ColoredLevelConfig};
use log::LevelFilter;
use std::fmt::{Arguments, Display};
use std::fs::OpenOptions;

pub fn level_filter(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn write_line(out: fern::FormatCallback<'_>, level: impl Display, message: &Arguments, target: &str) {
    out.finish(format_args!(
        "[{} {level} {target}] {message}",
        chrono::Local::now().format(TIME_FORMAT)
    ))
}

/// Logs to stderr, and additionally to `logging.file` when configured.
///
/// Only stderr is colored.
pub fn setup_logger(logging: &LoggingConfig) -> Result<(), log::SetLoggerError> {
    let colors = ColoredLevelConfig::new()
        .trace(Color::BrightBlack)
        .debug(Color::BrightBlue)
        .info(Color::Green)
        .warn(Color::Yellow)
        .error(Color::Red);

    let mut dispatch = fern::Dispatch::new()
        .level(level_filter(logging.level()))
        // Connection pool chatter drowns out the sample's own output
        .level_for("hyper_util", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(
            fern::Dispatch::new()
                .format(move |out, message, record| {
                    write_line(out, colors.color(record.level()), message, record.target())
                })
                .chain(std::io::stderr()),
        );

    let file = logging
        .file()
        .map(|path| (path, OpenOptions::new().create(true).append(true).open(path)));
    match file {
        Some((_, Ok(file))) => {
            dispatch = dispatch.chain(
                fern::Dispatch::new()
                    .format(|out, message, record| {
                        write_line(out, record.level(), message, record.target())
                    })
                    .chain(file),
            );
        }
        Some((path, Err(e))) => eprintln!("Cannot open log file {path} ({e}), logging to stderr only"),
        None => {}
    }

    dispatch.apply()?;
    log::debug!("Logger initialized at level {}", logging.level());
    Ok(())
}
