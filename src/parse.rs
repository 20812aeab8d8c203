//! Extraction of chapter title, reference and frames from DokuWiki markup.
//!
//! Every step that can fail records an [`Issue`](crate::formats::Issue) and falls back to
//! [`NOT_FOUND`]; parsing itself never fails.

use std::sync::OnceLock;

use regex::Regex;

use crate::formats::{Chapter, ChapterNumber, Frame, FrameId, NOT_FOUND, Parsed};
use crate::smartquotes;
use crate::urls::{IssueLocator, default_image_url};

static TITLE_RE: OnceLock<Regex> = OnceLock::new();
static REF_RE: OnceLock<Regex> = OnceLock::new();
static FRAME_RE: OnceLock<Regex> = OnceLock::new();
static FRAME_ID_RE: OnceLock<Regex> = OnceLock::new();
static IMG_LINK_RE: OnceLock<Regex> = OnceLock::new();
static HTML_TAG_RE: OnceLock<Regex> = OnceLock::new();
static LINK_TAG_RE: OnceLock<Regex> = OnceLock::new();
static IMG_TAG_RE: OnceLock<Regex> = OnceLock::new();

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("valid regex"))
}

fn title_re() -> &'static Regex {
    regex(&TITLE_RE, r"======.*")
}

fn ref_re() -> &'static Regex {
    regex(&REF_RE, r"//.*//")
}

fn frame_re() -> &'static Regex {
    regex(&FRAME_RE, r"\{\{[^{]*")
}

fn frame_id_re() -> &'static Regex {
    regex(&FRAME_ID_RE, r"[0-5][0-9]-[0-9][0-9]")
}

fn img_link_re() -> &'static Regex {
    regex(&IMG_LINK_RE, r"https://.*\.(jpg|jpeg|gif)")
}

fn html_tag_re() -> &'static Regex {
    regex(&HTML_TAG_RE, r"<.*?>")
}

fn link_tag_re() -> &'static Regex {
    regex(&LINK_TAG_RE, r"\[\[.*?\]\]")
}

fn img_tag_re() -> &'static Regex {
    regex(&IMG_TAG_RE, r"\{\{.*?\}\}")
}

/// Frame text must be longer than this (in characters) to count as delivered.
pub const MIN_DELIVERED_TEXT_CHARS: usize = 10;

pub fn parse_chapter(raw: &str, number: ChapterNumber, locator: &IssueLocator) -> Parsed<Chapter> {
    let mut issues = Vec::new();

    let title = match title_re().find(raw) {
        Some(m) => m.as_str().replace('=', "").trim().to_owned(),
        None => {
            issues.push(locator.chapter_issue(
                format!("{NOT_FOUND}: title in chapter {number}"),
                number,
            ));
            NOT_FOUND.to_owned()
        }
    };

    let reference = match ref_re().find(raw) {
        Some(m) => m.as_str().replace('/', "").trim().to_owned(),
        None => {
            issues.push(
                locator.chapter_issue(format!("{NOT_FOUND}: reference in {number}"), number),
            );
            NOT_FOUND.to_owned()
        }
    };

    let mut frames = Vec::new();
    for block in frame_re().find_iter(raw) {
        let parsed = parse_frame(block.as_str(), number, locator);
        issues.extend(parsed.issues);
        frames.push(parsed.value);
    }

    tracing::debug!(
        chapter = %number,
        frames = frames.len(),
        issues = issues.len(),
        "parsed chapter"
    );

    Parsed {
        value: Chapter {
            number,
            title,
            reference,
            frames,
            fetched: true,
        },
        issues,
    }
}

fn parse_frame(block: &str, number: ChapterNumber, locator: &IssueLocator) -> Parsed<Frame> {
    let mut issues = Vec::new();
    let lines: Vec<&str> = block
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    let id = frame_id_re()
        .find(block)
        .and_then(|m| m.as_str().parse::<FrameId>().ok());
    if id.is_none() {
        issues.push(locator.chapter_issue(format!("{NOT_FOUND}: frame id in {number}"), number));
    }
    let id_text = id.as_ref().map_or(NOT_FOUND, FrameId::as_str);

    let first_line = lines.first().map_or("", |line| line.trim());
    let image_url = match img_link_re().find(first_line) {
        Some(m) => m.as_str().to_owned(),
        None => default_image_url(id_text),
    };

    let text = clean_frame_text(lines.get(1..).unwrap_or_default());

    Parsed {
        value: Frame {
            id,
            image_url,
            text,
        },
        issues,
    }
}

/// Joins caption lines and strips wiki/HTML residue. Lines carrying a `//`
/// reference marker are skipped.
pub fn clean_frame_text(lines: &[&str]) -> String {
    let joined: String = lines
        .iter()
        .filter(|line| !line.contains("//"))
        .copied()
        .collect();
    clean_text(&joined)
}

/// Removes formatting markup and applies typographic quotes. Idempotent.
pub fn clean_text(input: &str) -> String {
    let mut text = input.trim().to_owned();
    loop {
        let stripped = strip_markup_once(&text);
        if stripped == text {
            break;
        }
        text = stripped;
    }
    smartquotes::educate(&text).trim().to_owned()
}

fn strip_markup_once(input: &str) -> String {
    let text = input.replace("\\\\", "").replace("**", "").replace("__", "");
    let text = html_tag_re().replace_all(&text, "");
    let text = link_tag_re().replace_all(&text, "");
    let text = img_tag_re().replace_all(&text, "");
    text.into_owned()
}

pub fn is_delivered(frame: &Frame) -> bool {
    frame.text.chars().count() > MIN_DELIVERED_TEXT_CHARS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> IssueLocator {
        IssueLocator::new("https://door43.org", "en")
    }

    fn chapter(n: u8) -> ChapterNumber {
        ChapterNumber::new(n).unwrap()
    }

    #[test]
    fn parses_title_reference_and_single_frame() {
        let raw = "====== My Title\n//My Ref//\n{{img.jpg\nFrame 01-01 text here that is long enough\n";
        let parsed = parse_chapter(raw, chapter(1), &locator());

        assert!(parsed.issues.is_empty(), "{:?}", parsed.issues);
        let ch = parsed.value;
        assert_eq!(ch.number.to_string(), "01");
        assert_eq!(ch.title, "My Title");
        assert_eq!(ch.reference, "My Ref");
        assert_eq!(ch.frames.len(), 1);
        let frame = &ch.frames[0];
        assert_eq!(frame.display_id(), "01-01");
        assert_eq!(frame.text, "Frame 01-01 text here that is long enough");
        assert_eq!(
            frame.image_url,
            "https://api.unfoldingword.org/obs/jpg/1/en/360px/obs-en-01-01.jpg"
        );
        assert!(is_delivered(frame));
    }

    #[test]
    fn missing_title_and_reference_record_two_issues() {
        let raw = "{{https://cdn.door43.org/obs/jpg/360px/obs-en-03-02.jpg}}\n\nNoah built a big boat.\n";
        let parsed = parse_chapter(raw, chapter(3), &locator());

        assert_eq!(parsed.value.title, NOT_FOUND);
        assert_eq!(parsed.value.reference, NOT_FOUND);
        let descriptions: Vec<&str> = parsed
            .issues
            .iter()
            .map(|issue| issue.description.as_str())
            .collect();
        assert_eq!(
            descriptions,
            vec!["NOT FOUND: title in chapter 03", "NOT FOUND: reference in 03"]
        );
        for issue in &parsed.issues {
            assert_eq!(issue.chapter_ref, "03");
            assert_eq!(issue.url, "https://door43.org/en/obs/03");
        }

        let frame = &parsed.value.frames[0];
        assert_eq!(frame.display_id(), "03-02");
        assert_eq!(
            frame.image_url,
            "https://cdn.door43.org/obs/jpg/360px/obs-en-03-02.jpg"
        );
        assert_eq!(frame.text, "Noah built a big boat.");
    }

    #[test]
    fn image_link_accepts_jpeg_and_gif() {
        let raw = "====== T\n//R//\n\
{{https://x.org/obs-en-08-01.jpeg}}\nJoseph was the favorite son.\n\
{{https://x.org/obs-en-08-02.gif?w=360}}\nHis brothers hated him.\n";
        let frames = parse_chapter(raw, chapter(8), &locator()).value.frames;

        assert_eq!(frames[0].image_url, "https://x.org/obs-en-08-01.jpeg");
        assert_eq!(frames[1].image_url, "https://x.org/obs-en-08-02.gif");
    }

    #[test]
    fn image_link_spans_to_the_last_extension_on_the_line() {
        let raw = "====== T\n//R//\n\
{{https://a.org/obs-en-08-03.jpg|https://b.org/alt.gif}}\nThey sold Joseph as a slave.\n";
        let frames = parse_chapter(raw, chapter(8), &locator()).value.frames;

        assert_eq!(
            frames[0].image_url,
            "https://a.org/obs-en-08-03.jpg|https://b.org/alt.gif"
        );
        assert_eq!(frames[0].display_id(), "08-03");
    }

    #[test]
    fn image_link_on_a_later_line_is_ignored() {
        let raw = "====== T\n//R//\n{{picture}}\nSee https://x.org/obs-en-08-04.png and more.jpg\n";
        let frames = parse_chapter(raw, chapter(8), &locator()).value.frames;

        assert_eq!(
            frames[0].image_url,
            "https://api.unfoldingword.org/obs/jpg/1/en/360px/obs-en-08-04.jpg"
        );
    }

    #[test]
    fn frame_without_id_is_reported_and_uses_placeholder_image() {
        let raw = "====== T\n//R//\n{{picture.png}}\nA frame with no identifier at all.\n";
        let parsed = parse_chapter(raw, chapter(7), &locator());

        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].description, "NOT FOUND: frame id in 07");
        let frame = &parsed.value.frames[0];
        assert!(frame.id.is_none());
        assert_eq!(frame.display_id(), NOT_FOUND);
        assert!(frame.image_url.ends_with("obs-en-NOT FOUND.jpg"));
    }

    #[test]
    fn frames_keep_document_order_and_skip_reference_lines() {
        let raw = "====== Creation\n\
{{https://x.org/obs-en-01-01.jpg}}\n\n\
This is how the beginning happened.\n\n\
{{https://x.org/obs-en-01-02.jpg}}\n\n\
The Spirit was there.\n\n\
//A Bible story from: Genesis 1-2//\n";
        let parsed = parse_chapter(raw, chapter(1), &locator());

        let ids: Vec<&str> = parsed.value.frames.iter().map(Frame::display_id).collect();
        assert_eq!(ids, vec!["01-01", "01-02"]);
        assert_eq!(parsed.value.reference, "A Bible story from: Genesis 1-2");
        assert_eq!(parsed.value.frames[1].text, "The Spirit was there.");
    }

    #[test]
    fn triple_brace_does_not_start_a_frame_body() {
        let raw = "====== T\n//R//\n{{{\n";
        let parsed = parse_chapter(raw, chapter(2), &locator());
        assert_eq!(parsed.value.frames.len(), 1);
        assert_eq!(parsed.value.frames[0].text, "");
    }

    #[test]
    fn clean_text_strips_markup_and_educates_quotes() {
        let cleaned = clean_text(
            r#"**God** said, "Let there be __light__."\\ <b>[[link|x]]</b>{{img.jpg}} It's good"#,
        );
        assert_eq!(
            cleaned,
            "God said, \u{201C}Let there be light.\u{201D}  It\u{2019}s good"
        );
    }

    #[test]
    fn clean_text_is_idempotent() {
        let inputs = [
            "  <<b>>nested<</b>> tags  ",
            "*__*bold residue",
            "[[a]]]] and {{{{x}}}} -- \"quote\"",
            "plain text",
        ];
        for input in inputs {
            let once = clean_text(input);
            assert_eq!(clean_text(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn parsing_is_deterministic() {
        let raw = "====== A\n//B//\n{{https://x/obs-en-04-01.jpg}}\n\nAbram obeyed God and left.\n";
        let first = parse_chapter(raw, chapter(4), &locator());
        let second = parse_chapter(raw, chapter(4), &locator());
        assert_eq!(first, second);
    }

    #[test]
    fn short_text_is_not_delivered() {
        let frame = Frame {
            id: "01-01".parse().ok(),
            image_url: String::new(),
            text: "0123456789".to_owned(),
        };
        assert!(!is_delivered(&frame));
    }
}
