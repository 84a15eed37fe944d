use clap::Parser;

use fits2db::cli::Cli;
use fits2db::config::{RunConfig, RunState};
use fits2db::errors::exit_code;
use fits2db::{init_logging, FileLoop, LogLevel};

fn main() {
    let cli = Cli::parse();

    let level = if cli.debug {
        LogLevel::Debug
    } else if cli.verbose {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };
    init_logging(level);

    if std::env::var("PARAM_DBG").is_ok() {
        log::debug!("{:#?}", cli);
    }

    let opts = match RunConfig::from_cli(&cli) {
        Ok(opts) => opts,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(e.exit_code());
        }
    };

    if std::env::var("PARAM_DBG").is_ok() {
        log::debug!("{:#?}", opts);
    }

    if cli.noop {
        log::info!("--noop given, exiting without processing any input");
        std::process::exit(exit_code::SUCCESS);
    }

    let mut state = RunState::new();
    let code = FileLoop::run(&cli.inputs, &opts, &mut state);
    std::process::exit(code);
}
