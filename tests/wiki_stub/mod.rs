use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::thread;
use std::time::Duration;

/// Number of frames per chapter in the canonical frameset.
pub const FRAMES_PER_CHAPTER: [usize; 50] = [
    16, 12, 16, 9, 10, 7, 10, 15, 15, 12, 8, 14, 15, 15, 13, 18, 14, 13, 18, 13, 15, 7, 10, 9, 8,
    10, 11, 10, 9, 9, 8, 16, 9, 10, 13, 7, 11, 15, 12, 9, 8, 11, 13, 9, 13, 10, 14, 14, 18, 17,
];

/// Raw DokuWiki markup for a chapter, leaving out the frames in `skip`.
#[allow(dead_code)]
pub fn chapter_markup(lang: &str, chapter: usize, skip: &[&str]) -> String {
    let mut raw = format!("====== {chapter}. Story {chapter} ======\n\n");
    for frame in 1..=FRAMES_PER_CHAPTER[chapter - 1] {
        let id = format!("{chapter:02}-{frame:02}");
        if skip.contains(&id.as_str()) {
            continue;
        }
        raw.push_str(&format!(
            "{{{{https://api.unfoldingword.org/obs/jpg/1/{lang}/360px/obs-{lang}-{id}.jpg}}}}\n\n\
             **Frame** {id}: \"the caption\" of this frame.\n\n"
        ));
    }
    raw.push_str("//A Bible story from: Genesis 1-2//\n");
    raw
}

#[derive(Debug, Clone, Default)]
pub struct WikiStubConfig {
    pub lang: String,
    pub index_exists: bool,
    /// Raw markup keyed by two-digit chapter number. Absent chapters are 404.
    pub chapters: HashMap<String, String>,
    /// Status used for content that exists. `None` means 200.
    pub served_status: Option<u16>,
    /// Chapters answered only after the given delay.
    pub slow_chapters: HashMap<String, Duration>,
}

impl WikiStubConfig {
    pub fn complete(lang: &str) -> Self {
        let chapters = (1..=50)
            .map(|n| (format!("{n:02}"), chapter_markup(lang, n, &[])))
            .collect();
        Self {
            lang: lang.to_owned(),
            index_exists: true,
            chapters,
            ..Self::default()
        }
    }
}

pub struct WikiStub {
    pub base_url: String,
    pub chapter_requests: Arc<AtomicUsize>,
    pub index_requests: Arc<AtomicUsize>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl WikiStub {
    pub fn spawn(config: WikiStubConfig) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start wiki stub server");
        let addr = server.server_addr();
        let base_url = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let chapter_requests = Arc::new(AtomicUsize::new(0));
        let index_requests = Arc::new(AtomicUsize::new(0));
        let chapter_counter = Arc::clone(&chapter_requests);
        let index_counter = Arc::clone(&index_requests);

        let handle = thread::spawn(move || {
            let index_path = format!("/{}/obs?do=export_raw", config.lang);
            let chapter_prefix = format!("/{}/obs/", config.lang);

            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(50)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let url = request.url().to_string();
                let served = config.served_status.unwrap_or(200);
                let mut delay = None;
                let (status, body) = if url == index_path {
                    index_counter.fetch_add(1, Ordering::SeqCst);
                    if config.index_exists {
                        (served, "====== Open Bible Stories ======\n".to_owned())
                    } else {
                        (404, "not found".to_owned())
                    }
                } else if let Some(rest) = url.strip_prefix(&chapter_prefix)
                    && let Some(chapter) = rest.strip_suffix("?do=export_raw")
                {
                    chapter_counter.fetch_add(1, Ordering::SeqCst);
                    delay = config.slow_chapters.get(chapter).copied();
                    match config.chapters.get(chapter) {
                        Some(raw) => (served, raw.clone()),
                        None => (404, "not found".to_owned()),
                    }
                } else {
                    (404, "not found".to_owned())
                };

                let header = tiny_http::Header::from_bytes(
                    &b"Content-Type"[..],
                    &b"text/plain; charset=iso-8859-1"[..],
                )
                .expect("build header");
                let response = tiny_http::Response::from_string(body)
                    .with_status_code(status)
                    .with_header(header);
                match delay {
                    // Answered off the accept loop so later requests are not held up.
                    Some(delay) => {
                        thread::spawn(move || {
                            thread::sleep(delay);
                            let _ = request.respond(response);
                        });
                    }
                    None => {
                        let _ = request.respond(response);
                    }
                }
            }
        });

        Self {
            base_url,
            chapter_requests,
            index_requests,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    #[allow(dead_code)]
    pub fn chapter_request_count(&self) -> usize {
        self.chapter_requests.load(Ordering::SeqCst)
    }

    #[allow(dead_code)]
    pub fn index_request_count(&self) -> usize {
        self.index_requests.load(Ordering::SeqCst)
    }
}

impl Drop for WikiStub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
