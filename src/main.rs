use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

/// Exit code for a run that completed but found issues.
const QA_FAILED: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> anyhow::Result<ExitCode> {
    obs_qa::logging::init().context("init logging")?;

    let cli = obs_qa::cli::Cli::parse();
    tracing::debug!(?cli, "parsed cli");

    match cli.command {
        obs_qa::cli::Command::Check(args) => {
            let report = obs_qa::check::run(args).await.context("check")?;
            if !report.passed {
                return Ok(ExitCode::from(QA_FAILED));
            }
        }
        obs_qa::cli::Command::Parse(args) => {
            obs_qa::inspect::parse_file(args).context("parse")?;
        }
        obs_qa::cli::Command::Frameset(args) => {
            obs_qa::inspect::list_frameset(args).context("frameset")?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
