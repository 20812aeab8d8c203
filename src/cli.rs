use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    Check(CheckArgs),
    Parse(ParseArgs),
    Frameset(FramesetArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Language code of the translation (e.g. `en`, `fr`).
    #[arg(long)]
    pub lang: String,

    /// Wiki base URL (default: `OBS_QA_BASE_URL` or https://door43.org).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds (default: `OBS_QA_TIMEOUT_SECS` or 30).
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Maximum concurrent chapter requests (default: `OBS_QA_CONCURRENCY` or 1).
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Write the report to this file instead of stdout.
    #[arg(long)]
    pub out: Option<String>,

    /// Overwrite `--out` if it already exists.
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Raw chapter markup file.
    #[arg(long)]
    pub file: String,

    /// Chapter number (01..50).
    #[arg(long)]
    pub chapter: String,

    /// Language code used for issue links.
    #[arg(long, default_value = "en")]
    pub lang: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,
}

#[derive(Debug, Args)]
pub struct FramesetArgs {
    /// Only list frames of this chapter (01..50).
    #[arg(long)]
    pub chapter: Option<String>,
}
