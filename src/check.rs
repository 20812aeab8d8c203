use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;

use crate::cli::CheckArgs;
use crate::fetch::{FetchConfig, HttpChapterFetcher};
use crate::formats::QaReport;
use crate::report::{render_report, write_output};
use crate::translation::ObsTranslation;

/// Runs a QA check for one language and emits the report.
pub async fn run(args: CheckArgs) -> anyhow::Result<QaReport> {
    let lang = args.lang.trim();
    if lang.is_empty() || lang.contains('/') {
        anyhow::bail!("--lang must be a non-empty language code: {:?}", args.lang);
    }

    let out_path = args.out.as_deref().map(PathBuf::from);
    if let Some(out_path) = out_path.as_deref()
        && out_path.exists()
        && !args.force
    {
        anyhow::bail!("report output already exists: {}", out_path.display());
    }

    let mut config = FetchConfig::from_env();
    if let Some(base_url) = args.base_url.as_deref() {
        config.base_url = base_url.to_owned();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(timeout_secs);
    }
    let concurrency = args
        .concurrency
        .or_else(|| {
            std::env::var("OBS_QA_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
        })
        .unwrap_or(1);

    let fetcher = HttpChapterFetcher::new(config).context("build chapter fetcher")?;
    let base_url = fetcher.base_url().to_owned();

    let mut translation =
        ObsTranslation::new(lang, &base_url, Arc::new(fetcher)).with_concurrency(concurrency);
    tracing::info!(%translation, %base_url, concurrency, "qa check");
    let report = translation.qa_check().await;

    let rendered = render_report(&report, args.format).context("render report")?;
    match out_path {
        Some(out_path) => {
            write_output(&out_path, &rendered, args.force).context("write report")?;
            tracing::info!(out = %out_path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    Ok(report)
}
