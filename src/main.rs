use std::process::ExitCode;

use anyhow::Context as _;
use workshop::{Config, Coordinator, Error};

/* ---------- */

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_args(std::env::args_os()) {
        Ok(config) => config,
        Err(Error::Usage(err) | Error::InvalidArgument(err)) => {
            // Help goes to stdout and isn't a failure, everything else is.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(config) {
        Ok(()) => {
            println!("Program completed successfully!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> anyhow::Result<()> {
    let output = config.output.clone();
    let report = Coordinator::new(config)
        .run()
        .with_context(|| format!("run writing to {} failed", output.display()))?;

    anyhow::ensure!(report.is_complete(), "the run stopped early: {report:?}");
    Ok(())
}
