use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::fetch::ChapterFetcher;
use crate::formats::{CHAPTER_COUNT, Chapter, ChapterNumber, Issue, QaReport};
use crate::frameset;
use crate::parse::parse_chapter;
use crate::urls::IssueLocator;

type FetchResult = anyhow::Result<Option<String>>;

pub const INDEX_MISSING: &str = "OBS does not seem to exist for that language";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QaState {
    NotStarted,
    IndexChecked,
    ChaptersFetched,
    FramesValidated,
    Done,
}

/// QA run over one language's OBS translation.
pub struct ObsTranslation {
    lang: String,
    locator: IssueLocator,
    fetcher: Arc<dyn ChapterFetcher>,
    concurrency: usize,
    state: QaState,
    chapters: Vec<Chapter>,
    issues: Vec<Issue>,
    frames_delivered: usize,
    passed: bool,
}

impl ObsTranslation {
    pub fn new(lang: &str, base_url: &str, fetcher: Arc<dyn ChapterFetcher>) -> Self {
        Self {
            lang: lang.to_owned(),
            locator: IssueLocator::new(base_url, lang),
            fetcher,
            concurrency: 1,
            state: QaState::NotStarted,
            chapters: Vec::new(),
            issues: Vec::new(),
            frames_delivered: 0,
            passed: false,
        }
    }

    /// Maximum chapter requests in flight, clamped to 1..=50. `1` fetches
    /// strictly in order.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, usize::from(CHAPTER_COUNT));
        self
    }

    pub fn language(&self) -> &str {
        &self.lang
    }

    pub fn state(&self) -> QaState {
        self.state
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Runs the full check from scratch and returns its report.
    pub async fn qa_check(&mut self) -> QaReport {
        self.reset();

        if !self.check_index().await {
            tracing::warn!(lang = %self.lang, "obs index page missing");
            return self.finish();
        }
        self.state = QaState::IndexChecked;

        self.fetch_chapters().await;
        self.state = QaState::ChaptersFetched;

        let checked = frameset::validate(&self.chapters, &self.locator);
        self.frames_delivered = checked.value.len();
        self.issues.extend(checked.issues);
        self.state = QaState::FramesValidated;

        self.finish()
    }

    /// Reserved for rendering a checked translation; currently does nothing.
    pub fn publish(&self) {}

    fn reset(&mut self) {
        self.state = QaState::NotStarted;
        self.chapters.clear();
        self.issues.clear();
        self.frames_delivered = 0;
        self.passed = false;
    }

    async fn check_index(&mut self) -> bool {
        let exists = match self.fetcher.index_exists(&self.lang).await {
            Ok(exists) => exists,
            Err(err) => {
                tracing::warn!(lang = %self.lang, ?err, "index probe failed");
                false
            }
        };
        if !exists {
            self.issues.push(self.locator.issue(INDEX_MISSING, ""));
        }
        exists
    }

    async fn fetch_chapters(&mut self) {
        let mut fetched = if self.concurrency == 1 {
            self.fetch_raw_sequential().await
        } else {
            self.fetch_raw_concurrent().await
        };

        for number in ChapterNumber::all() {
            let raw = match fetched.remove(&number) {
                Some(Ok(Some(raw))) => Some(raw),
                Some(Ok(None)) => None,
                Some(Err(err)) => {
                    tracing::warn!(chapter = %number, ?err, "chapter fetch failed");
                    None
                }
                None => None,
            };

            match raw {
                Some(raw) => {
                    let parsed = parse_chapter(&raw, number, &self.locator);
                    self.issues.extend(parsed.issues);
                    self.chapters.push(parsed.value);
                }
                None => {
                    tracing::warn!(chapter = %number, "chapter missing");
                    self.issues.push(
                        self.locator
                            .chapter_issue(format!("Chapter {number} is missing"), number),
                    );
                    self.chapters.push(Chapter::missing(number));
                }
            }
        }
    }

    async fn fetch_raw_sequential(&self) -> BTreeMap<ChapterNumber, FetchResult> {
        let mut fetched = BTreeMap::new();
        for number in ChapterNumber::all() {
            let result = self.fetcher.fetch_chapter(&self.lang, number).await;
            fetched.insert(number, result);
        }
        fetched
    }

    async fn fetch_raw_concurrent(&self) -> BTreeMap<ChapterNumber, FetchResult> {
        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for number in ChapterNumber::all() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let lang = self.lang.clone();
            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                (number, fetcher.fetch_chapter(&lang, number).await)
            });
        }

        let mut fetched = BTreeMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((number, result)) => {
                    fetched.insert(number, result);
                }
                Err(err) => tracing::warn!(?err, "chapter fetch task failed"),
            }
        }
        fetched
    }

    fn finish(&mut self) -> QaReport {
        self.passed = self.issues.is_empty();
        self.state = QaState::Done;
        tracing::info!(
            lang = %self.lang,
            chapters = self.chapters.len(),
            frames_delivered = self.frames_delivered,
            issues = self.issues.len(),
            passed = self.passed,
            "qa check finished"
        );
        QaReport {
            language: self.lang.clone(),
            passed: self.passed,
            chapters_checked: self.chapters.len(),
            frames_delivered: self.frames_delivered,
            checked_at: chrono::Utc::now().to_rfc3339(),
            issues: self.issues.clone(),
        }
    }
}

impl fmt::Display for ObsTranslation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OBS Translation for: {}", self.lang)
    }
}
