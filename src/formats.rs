use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Placeholder recorded wherever an expected piece of markup is absent.
pub const NOT_FOUND: &str = "NOT FOUND";

pub const CHAPTER_COUNT: u8 = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    #[error("chapter number must be 01..50: {0:?}")]
    ChapterNumber(String),
    #[error("frame id must look like CC-FF with CC in 00..59: {0:?}")]
    FrameId(String),
}

/// One of the fifty chapters, always rendered with two digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChapterNumber(u8);

impl ChapterNumber {
    pub fn new(number: u8) -> Result<Self, IdError> {
        if (1..=CHAPTER_COUNT).contains(&number) {
            Ok(Self(number))
        } else {
            Err(IdError::ChapterNumber(number.to_string()))
        }
    }

    pub fn all() -> impl Iterator<Item = ChapterNumber> {
        (1..=CHAPTER_COUNT).map(ChapterNumber)
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for ChapterNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

impl FromStr for ChapterNumber {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.len() > 2 || !trimmed.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(IdError::ChapterNumber(s.to_owned()));
        }
        let number: u8 = trimmed
            .parse()
            .map_err(|_| IdError::ChapterNumber(s.to_owned()))?;
        Self::new(number).map_err(|_| IdError::ChapterNumber(s.to_owned()))
    }
}

impl Serialize for ChapterNumber {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ChapterNumber {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// `CC-FF` identifier of a single frame.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FrameId(String);

impl FrameId {
    pub fn new(chapter: ChapterNumber, frame: u8) -> Self {
        Self(format!("{chapter}-{frame:02}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The two-digit chapter prefix, e.g. `"22"` for `"22-07"`.
    pub fn chapter(&self) -> &str {
        &self.0[..2]
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for FrameId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let b = s.as_bytes();
        let valid = b.len() == 5
            && (b'0'..=b'5').contains(&b[0])
            && b[1].is_ascii_digit()
            && b[2] == b'-'
            && b[3].is_ascii_digit()
            && b[4].is_ascii_digit();
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(IdError::FrameId(s.to_owned()))
        }
    }
}

impl<'de> Deserialize<'de> for FrameId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// `None` when no frame id could be found in the block.
    pub id: Option<FrameId>,
    pub image_url: String,
    pub text: String,
}

impl Frame {
    pub fn display_id(&self) -> &str {
        self.id.as_ref().map_or(NOT_FOUND, FrameId::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: ChapterNumber,
    pub title: String,
    pub reference: String,
    pub frames: Vec<Frame>,
    /// False for the placeholder recorded when the chapter could not be fetched.
    pub fetched: bool,
}

impl Chapter {
    pub fn missing(number: ChapterNumber) -> Self {
        Self {
            number,
            title: NOT_FOUND.to_owned(),
            reference: NOT_FOUND.to_owned(),
            frames: Vec::new(),
            fetched: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub description: String,
    /// Two-digit chapter number, or empty for language-level issues.
    pub chapter_ref: String,
    pub url: String,
}

/// A value together with the issues found while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaReport {
    pub language: String,
    pub passed: bool,
    pub chapters_checked: usize,
    pub frames_delivered: usize,
    pub checked_at: String,
    pub issues: Vec<Issue>,
}
