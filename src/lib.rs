pub mod byteorder;
pub mod cli;
pub mod config;
pub mod driver;
pub mod emit;
pub mod errors;
pub mod fileloop;
pub mod fits;
pub mod format;
pub mod protocol;
pub mod schema;

pub use config::{RunConfig, RunState};
pub use errors::ConvertError;
pub use fileloop::FileLoop;

/// Controls the verbosity of fits2db's internal tracing output.
///
/// | Variant | `log` level | When to use                    |
/// |---------|-------------|---------------------------------|
/// | `Error` | `error`     | scripted / quiet runs           |
/// | `Info`  | `info`      | default — per-file progress     |
/// | `Debug` | `debug`     | `--debug`/`--verbose` — traces   |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Info,
    Debug,
}

/// Initialize the global `log` subscriber: colored terminal output on
/// stderr plus a per-run file under `logs/`.
pub fn init_logging(level: LogLevel) {
    let filter = match level {
        LogLevel::Error => log::LevelFilter::Error,
        LogLevel::Info => log::LevelFilter::Info,
        LogLevel::Debug => log::LevelFilter::Debug,
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let term = simplelog::TermLogger::new(
        filter,
        config.clone(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    );
    let loggers: Vec<Box<dyn simplelog::SharedLogger>> = if std::fs::create_dir_all("logs").is_ok() {
        let time = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time moves forward")
            .as_secs();
        match std::fs::File::create(format!("logs/{}.log", time)) {
            Ok(file) => vec![
                term,
                simplelog::WriteLogger::new(log::LevelFilter::Debug, config, file),
            ],
            Err(_) => vec![term],
        }
    } else {
        vec![term]
    };
    let _ = simplelog::CombinedLogger::init(loggers);
}
