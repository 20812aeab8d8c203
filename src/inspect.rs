use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use serde::Serialize;

use crate::cli::{FramesetArgs, OutputFormat, ParseArgs};
use crate::formats::{Chapter, ChapterNumber, Issue};
use crate::frameset::canonical_frameset;
use crate::parse::{is_delivered, parse_chapter};
use crate::report::render_structured;
use crate::urls::{DEFAULT_BASE_URL, IssueLocator};

#[derive(Debug, Serialize)]
struct ParseOutput {
    chapter: Chapter,
    issues: Vec<Issue>,
}

/// Parses a local raw chapter file and prints what was extracted.
pub fn parse_file(args: ParseArgs) -> anyhow::Result<()> {
    let path = PathBuf::from(&args.file);
    let number: ChapterNumber = args.chapter.parse().context("parse --chapter")?;

    let bytes =
        std::fs::read(&path).with_context(|| format!("read chapter: {}", path.display()))?;
    let raw = String::from_utf8_lossy(&bytes);

    let locator = IssueLocator::new(DEFAULT_BASE_URL, &args.lang);
    let parsed = parse_chapter(&raw, number, &locator);
    let output = ParseOutput {
        chapter: parsed.value,
        issues: parsed.issues,
    };

    let rendered = match args.format {
        OutputFormat::Text => render_parse_text(&output),
        other => render_structured(&output, other).context("render parse output")?,
    };
    print!("{rendered}");
    Ok(())
}

fn render_parse_text(output: &ParseOutput) -> String {
    let chapter = &output.chapter;
    let mut out = String::new();
    let _ = writeln!(out, "chapter {}: {}", chapter.number, chapter.title);
    let _ = writeln!(out, "reference: {}", chapter.reference);
    for frame in &chapter.frames {
        let marker = if is_delivered(frame) { " " } else { "!" };
        let _ = writeln!(out, "{marker} {} {}", frame.display_id(), frame.text);
    }
    for issue in &output.issues {
        let _ = writeln!(out, "issue: {}", issue.description);
    }
    out
}

/// Prints canonical frame ids, one per line.
pub fn list_frameset(args: FramesetArgs) -> anyhow::Result<()> {
    let chapter = args
        .chapter
        .as_deref()
        .map(str::parse::<ChapterNumber>)
        .transpose()
        .context("parse --chapter")?
        .map(|number| number.to_string());

    for id in canonical_frameset() {
        if chapter.as_deref().is_some_and(|c| c != id.chapter()) {
            continue;
        }
        println!("{id}");
    }
    Ok(())
}
