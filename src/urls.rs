use crate::formats::{ChapterNumber, Issue};

pub const DEFAULT_BASE_URL: &str = "https://door43.org";

const IMAGE_URL_PREFIX: &str = "https://api.unfoldingword.org/obs/jpg/1/en/360px/obs-en-";

/// Fallback image for a frame whose markup carries no explicit image link.
pub fn default_image_url(frame_id: &str) -> String {
    format!("{IMAGE_URL_PREFIX}{frame_id}.jpg")
}

pub fn raw_index_url(base_url: &str, lang: &str) -> String {
    format!("{}/{lang}/obs?do=export_raw", base_url.trim_end_matches('/'))
}

pub fn raw_chapter_url(base_url: &str, lang: &str, chapter: ChapterNumber) -> String {
    format!(
        "{}/{lang}/obs/{chapter}?do=export_raw",
        base_url.trim_end_matches('/')
    )
}

/// Builds issues that point at the human-facing wiki page of a chapter.
#[derive(Debug, Clone)]
pub struct IssueLocator {
    base_url: String,
    lang: String,
}

impl IssueLocator {
    pub fn new(base_url: &str, lang: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            lang: lang.to_owned(),
        }
    }

    pub fn page_url(&self, chapter_ref: &str) -> String {
        format!("{}/{}/obs/{chapter_ref}", self.base_url, self.lang)
    }

    pub fn issue(&self, description: impl Into<String>, chapter_ref: &str) -> Issue {
        Issue {
            description: description.into(),
            chapter_ref: chapter_ref.to_owned(),
            url: self.page_url(chapter_ref),
        }
    }

    pub fn chapter_issue(&self, description: impl Into<String>, chapter: ChapterNumber) -> Issue {
        self.issue(description, &chapter.to_string())
    }
}
