use clap::Parser;
use tickerscope::cli::{Cli, run};
use tickerscope::logging::{LogConfig, init_logging};

fn main() -> std::process::ExitCode {
    if let Err(e) = init_logging(LogConfig::from_env()) {
        eprintln!("warning: logging disabled: {e}");
    }
    run(Cli::parse())
}
