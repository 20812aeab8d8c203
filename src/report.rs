use std::fmt::Write as _;
use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::Path;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::formats::QaReport;

pub fn render_report(report: &QaReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(report)),
        other => render_structured(report, other),
    }
}

/// `Text` has no generic rendering and falls back to YAML.
pub fn render_structured<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(value).context("serialize json")?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml | OutputFormat::Text => {
            serde_yaml::to_string(value).context("serialize yaml")
        }
    }
}

fn render_text(report: &QaReport) -> String {
    let mut out = String::new();
    for issue in &report.issues {
        let _ = writeln!(out, "{}\t{}", issue.description, issue.url);
    }
    let verdict = if report.passed { "PASS" } else { "FAIL" };
    let _ = writeln!(
        out,
        "{verdict}: {} ({} issues, {} chapters checked, {} frames delivered)",
        report.language,
        report.issues.len(),
        report.chapters_checked,
        report.frames_delivered
    );
    out
}

pub fn write_output(path: &Path, contents: &str, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("report output already exists: {}", path.display());
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create report dir: {}", parent.display()))?;
    }

    let mut options = OpenOptions::new();
    options.write(true);
    if force {
        options.create(true).truncate(true);
    } else {
        options.create_new(true);
    }
    let mut out = options
        .open(path)
        .with_context(|| format!("open report output: {}", path.display()))?;
    out.write_all(contents.as_bytes())
        .with_context(|| format!("write report: {}", path.display()))?;
    out.flush().context("flush report")?;
    Ok(())
}
