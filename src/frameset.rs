//! The canonical Open Bible Stories frameset and the check of delivered
//! frames against it.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use crate::formats::{Chapter, ChapterNumber, FrameId, Issue, Parsed};
use crate::parse::is_delivered;
use crate::urls::IssueLocator;

/// Number of frames in each chapter, chapter 01 first.
const FRAMES_PER_CHAPTER: [u8; 50] = [
    16, 12, 16, 9, 10, 7, 10, 15, 15, 12, // 01-10
    8, 14, 15, 15, 13, 18, 14, 13, 18, 13, // 11-20
    15, 7, 10, 9, 8, 10, 11, 10, 9, 9, // 21-30
    8, 16, 9, 10, 13, 7, 11, 15, 12, 9, // 31-40
    8, 11, 13, 9, 13, 10, 14, 14, 18, 17, // 41-50
];

static CANONICAL: OnceLock<BTreeSet<FrameId>> = OnceLock::new();

pub fn canonical_frameset() -> &'static BTreeSet<FrameId> {
    CANONICAL.get_or_init(|| {
        ChapterNumber::all()
            .zip(FRAMES_PER_CHAPTER)
            .flat_map(|(chapter, count)| (1..=count).map(move |frame| FrameId::new(chapter, frame)))
            .collect()
    })
}

pub fn frames_in_chapter(chapter: ChapterNumber) -> usize {
    FRAMES_PER_CHAPTER[usize::from(chapter.get() - 1)].into()
}

/// Ids of frames whose cleaned text is long enough to count.
pub fn delivered_frames(chapters: &[Chapter]) -> BTreeSet<FrameId> {
    chapters
        .iter()
        .flat_map(|chapter| chapter.frames.iter())
        .filter(|frame| is_delivered(frame))
        .filter_map(|frame| frame.id.clone())
        .collect()
}

/// One issue per canonical frame that was not delivered, in id order.
pub fn missing_frame_issues(delivered: &BTreeSet<FrameId>, locator: &IssueLocator) -> Vec<Issue> {
    canonical_frameset()
        .difference(delivered)
        .map(|id| locator.issue(format!("missing frame: {id}"), id.chapter()))
        .collect()
}

/// Delivered frame ids, with one issue per canonical frame not among them.
pub fn validate(chapters: &[Chapter], locator: &IssueLocator) -> Parsed<BTreeSet<FrameId>> {
    let delivered = delivered_frames(chapters);
    let issues = missing_frame_issues(&delivered, locator);
    Parsed {
        value: delivered,
        issues,
    }
}
