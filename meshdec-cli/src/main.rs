use std::process::ExitCode;

use clap::Parser;
use meshdec_cli::logging::{init_logger, resolve_log_level};
use meshdec_cli::{run, CliArgs, EXIT_FAILURE};
use meshdec_simplification::EdgeCollapseDecimator;

fn main() -> ExitCode {
    let cli = match CliArgs::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logger(&resolve_log_level(cli.log_level));

    let mut decimator = EdgeCollapseDecimator::new();
    match run(&cli.params(), &mut decimator) {
        Ok(report) => {
            log::debug!("{:?}", report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            log::error!("{}", err);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}
