//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a paginated feed and its images, and
//! run the crawl loop end-to-end against a temporary storage root.

use async_trait::async_trait;
use page_harvest::config::{Config, FeedConfig};
use page_harvest::crawler::{build_http_client, Crawler, ItemFetcher, PageFetcher};
use page_harvest::state::{CancellationSignal, PageNumber, PageOutcome};
use page_harvest::storage::{FsImageStore, ImageStore, StorageResult};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const FEED_PATH: &str = "/v1/images/search";

/// Shared, ordered record of what happened during a crawl
#[derive(Debug, Clone, PartialEq, Eq)]
enum Event {
    PageRequested(u64),
    ItemSaved(u64),
}

type EventLog = Arc<Mutex<Vec<Event>>>;

/// Wraps the filesystem store, logs every save and cancels the crawl once a
/// given number of items has been saved
struct RecordingStore {
    inner: FsImageStore,
    log: EventLog,
    remaining: AtomicUsize,
    cancel: CancellationSignal,
}

impl RecordingStore {
    fn new(root: &Path, log: EventLog, cancel_after: usize, cancel: CancellationSignal) -> Self {
        Self {
            inner: FsImageStore::new(root),
            log,
            remaining: AtomicUsize::new(cancel_after),
            cancel,
        }
    }
}

#[async_trait]
impl ImageStore for RecordingStore {
    async fn save_image(
        &self,
        page: PageNumber,
        id: &str,
        content: &[u8],
    ) -> StorageResult<PathBuf> {
        let saved = self.inner.save_image(page, id, content).await?;
        self.log.lock().unwrap().push(Event::ItemSaved(page.get()));
        if self.remaining.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.cancel.cancel();
        }
        Ok(saved)
    }
}

/// Serves a page manifest and records when it was requested
struct PageResponder {
    page: u64,
    body: String,
    log: EventLog,
}

impl Respond for PageResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.log
            .lock()
            .unwrap()
            .push(Event::PageRequested(self.page));
        ResponseTemplate::new(200).set_body_string(self.body.clone())
    }
}

/// Serves an image and sets the cancellation signal while it is in flight
struct CancellingImage {
    cancel: CancellationSignal,
    body: Vec<u8>,
}

impl Respond for CancellingImage {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.cancel.cancel();
        ResponseTemplate::new(200)
            .set_body_bytes(self.body.clone())
            .set_delay(Duration::from_millis(200))
    }
}

/// Creates a test configuration pointing at the mock feed
fn create_test_config(base_url: &str, root: &Path) -> Config {
    let mut config = Config::default();
    config.feed = FeedConfig {
        endpoint: format!("{}{}", base_url, FEED_PATH),
        limit: 3,
        api_key: Some("test-key".to_string()),
        ..FeedConfig::default()
    };
    config.crawler.max_concurrent_items = 4;
    config.output.storage_root = root.to_path_buf();
    config
}

fn manifest(base_url: &str, page: u64, ids: &[&str]) -> String {
    let items: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id":"{}","url":"{}/img/{}/{}.jpg","width":500}}"#,
                id, base_url, page, id
            )
        })
        .collect();
    format!("[{}]", items.join(","))
}

fn image_bytes(page: u64, id: &str) -> Vec<u8> {
    format!("page {} image {}", page, id).into_bytes()
}

/// Mounts a page manifest and one image per id
async fn mount_page(server: &MockServer, page: u64, ids: &[&str], log: Option<EventLog>) {
    let base_url = server.uri();
    let body = manifest(&base_url, page, ids);

    let mock = Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("page", page.to_string()));
    let mock = match log {
        Some(log) => mock.respond_with(PageResponder { page, body, log }),
        None => mock.respond_with(ResponseTemplate::new(200).set_body_string(body)),
    };
    mock.expect(1).mount(server).await;

    for (i, id) in ids.iter().enumerate() {
        Mock::given(method("GET"))
            .and(path(format!("/img/{}/{}.jpg", page, id)))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(image_bytes(page, id))
                    // Stagger completions so siblings finish out of order
                    .set_delay(Duration::from_millis(((ids.len() - i) * 30) as u64)),
            )
            .mount(server)
            .await;
    }
}

/// Asserts that no request for `page` ever reaches the server
async fn forbid_page(server: &MockServer, page: u64) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("page", page.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .expect(0)
        .mount(server)
        .await;
}

fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_end_to_end_two_pages() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &["a1", "a2", "a3"], None).await;
    mount_page(&server, 2, &["b1", "b2", "b3"], None).await;
    forbid_page(&server, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let cancel = CancellationSignal::new();
    let log = EventLog::default();
    let store = Arc::new(RecordingStore::new(dir.path(), log, 6, cancel.clone()));

    let crawler = Crawler::new(&config, "test-key", store, cancel).expect("crawler");
    let summary = crawler.run(PageNumber::FIRST).await.expect("crawl failed");

    assert_eq!(summary.pages_attempted, 2);
    assert_eq!(summary.pages_succeeded, 2);
    assert_eq!(summary.items_saved, 6);
    assert_eq!(summary.items_failed, 0);
    assert_eq!(summary.next_page, PageNumber::new(3).unwrap());

    assert_eq!(
        file_names(&dir.path().join("page_1")),
        vec!["a1.jpg", "a2.jpg", "a3.jpg"]
    );
    assert_eq!(
        file_names(&dir.path().join("page_2")),
        vec!["b1.jpg", "b2.jpg", "b3.jpg"]
    );
    assert_eq!(
        std::fs::read(dir.path().join("page_2").join("b2.jpg")).unwrap(),
        image_bytes(2, "b2")
    );
    assert_eq!(file_names(dir.path()), vec!["page_1", "page_2"]);
}

#[tokio::test]
async fn test_pages_are_strictly_sequential() {
    let server = MockServer::start().await;
    let log = EventLog::default();
    for page in 1..=3 {
        mount_page(&server, page, &["x", "y", "z"], Some(log.clone())).await;
    }
    forbid_page(&server, 4).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let cancel = CancellationSignal::new();
    let store = Arc::new(RecordingStore::new(dir.path(), log.clone(), 9, cancel.clone()));

    let crawler = Crawler::new(&config, "test-key", store, cancel).expect("crawler");
    crawler.run(PageNumber::FIRST).await.expect("crawl failed");

    let events = log.lock().unwrap().clone();
    assert_eq!(events.len(), 12);

    // Every item of page N is saved after page N is requested and before
    // page N+1 is requested
    for page in 1..=3u64 {
        let requested_at = events
            .iter()
            .position(|e| *e == Event::PageRequested(page))
            .expect("page requested");
        let saves: Vec<usize> = events
            .iter()
            .enumerate()
            .filter(|(_, e)| **e == Event::ItemSaved(page))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(saves.len(), 3);
        assert!(saves.iter().all(|&i| i > requested_at));

        if let Some(next_at) = events
            .iter()
            .position(|e| *e == Event::PageRequested(page + 1))
        {
            assert!(
                saves.iter().all(|&i| i < next_at),
                "page {} started before page {} finished: {:?}",
                page + 1,
                page,
                events
            );
        }
    }
}

#[tokio::test]
async fn test_failed_page_is_skipped_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 2, &["c1", "c2"], None).await;
    forbid_page(&server, 3).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path());
    let cancel = CancellationSignal::new();
    let store = Arc::new(RecordingStore::new(
        dir.path(),
        EventLog::default(),
        2,
        cancel.clone(),
    ));

    let crawler = Crawler::new(&config, "test-key", store, cancel).expect("crawler");
    let summary = crawler.run(PageNumber::FIRST).await.expect("crawl failed");

    assert_eq!(summary.pages_attempted, 2);
    assert_eq!(summary.pages_failed, 1);
    assert_eq!(summary.pages_succeeded, 1);
    assert!(!dir.path().join("page_1").exists());
    assert_eq!(
        file_names(&dir.path().join("page_2")),
        vec!["c1.jpg", "c2.jpg"]
    );
}

#[tokio::test]
async fn test_undecodable_page_is_skipped() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, 2, &["d1"], None).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());
    config.crawler.max_pages = Some(2);

    let crawler = Crawler::new(
        &config,
        "test-key",
        Arc::new(FsImageStore::new(dir.path())),
        CancellationSignal::new(),
    )
    .expect("crawler");
    let summary = crawler.run(PageNumber::FIRST).await.expect("crawl failed");

    assert_eq!(summary.pages_failed, 1);
    assert!(dir.path().join("page_2").join("d1.jpg").exists());
}

#[tokio::test]
async fn test_item_failure_is_isolated() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let body = format!(
        r#"[
            {{"id":"i1","url":"{0}/img/1/i1.jpg"}},
            {{"id":"i2","url":"{0}/img/1/i2.jpg"}},
            {{"id":"i3","url":"http://127.0.0.1:1/img/1/i3.jpg"}},
            {{"id":"i4","url":"{0}/img/1/i4.jpg"}},
            {{"id":"i5","url":"{0}/img/1/i5.jpg"}}
        ]"#,
        base_url
    );
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;
    for id in ["i1", "i2", "i4", "i5"] {
        Mock::given(method("GET"))
            .and(path(format!("/img/1/{}.jpg", id)))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(image_bytes(1, id)))
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let client = build_http_client(&config).unwrap();
    let items = ItemFetcher::new(client.clone(), Arc::new(FsImageStore::new(dir.path())));
    let fetcher = PageFetcher::new(client, &config.feed, "test-key", items, 5).unwrap();

    let outcome = fetcher.fetch(PageNumber::FIRST).await;

    assert!(outcome.is_success());
    assert!(matches!(
        outcome,
        PageOutcome::Processed {
            items: 5,
            saved: 4,
            failed: 1,
            ..
        }
    ));
    assert_eq!(
        file_names(&dir.path().join("page_1")),
        vec!["i1.jpg", "i2.jpg", "i4.jpg", "i5.jpg"]
    );
}

#[tokio::test]
async fn test_cancellation_finishes_current_page() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let cancel = CancellationSignal::new();

    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .and(query_param("page", "5"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(manifest(&base_url, 5, &["p", "q", "r"])),
        )
        .expect(1)
        .mount(&server)
        .await;
    // The first image request to arrive sets the signal; all three are in
    // flight for another 200ms
    for id in ["p", "q", "r"] {
        Mock::given(method("GET"))
            .and(path(format!("/img/5/{}.jpg", id)))
            .respond_with(CancellingImage {
                cancel: cancel.clone(),
                body: image_bytes(5, id),
            })
            .mount(&server)
            .await;
    }
    forbid_page(&server, 6).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, dir.path());
    let crawler = Crawler::new(
        &config,
        "test-key",
        Arc::new(FsImageStore::new(dir.path())),
        cancel.clone(),
    )
    .expect("crawler");

    let summary = crawler.run(PageNumber::new(5).unwrap()).await.expect("crawl failed");

    assert!(cancel.is_cancelled());
    assert_eq!(summary.pages_attempted, 1);
    assert_eq!(summary.items_saved, 3);
    assert_eq!(summary.next_page, PageNumber::new(6).unwrap());
    assert_eq!(
        file_names(&dir.path().join("page_5")),
        vec!["p.jpg", "q.jpg", "r.jpg"]
    );
}

#[tokio::test]
async fn test_refetching_page_overwrites_images() {
    let server = MockServer::start().await;
    let base_url = server.uri();
    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&base_url, dir.path());
    config.crawler.max_pages = Some(1);

    for content in [&b"first version"[..], &b"second"[..]] {
        server.reset().await;
        Mock::given(method("GET"))
            .and(path(FEED_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(manifest(&base_url, 1, &["same"])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/1/same.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
            .mount(&server)
            .await;

        let summary =
            page_harvest::run_crawl(&config, Some(PageNumber::FIRST), CancellationSignal::new())
                .await
                .expect("crawl failed");
        assert_eq!(summary.items_saved, 1);
    }

    let page_dir = dir.path().join("page_1");
    assert_eq!(file_names(&page_dir), vec!["same.jpg"]);
    assert_eq!(std::fs::read(page_dir.join("same.jpg")).unwrap(), b"second");
}

#[tokio::test]
async fn test_restart_resumes_after_last_page() {
    let server = MockServer::start().await;
    mount_page(&server, 1, &["r1"], None).await;
    mount_page(&server, 2, &["r2"], None).await;
    mount_page(&server, 3, &["r3"], None).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path());

    config.crawler.max_pages = Some(2);
    let first = page_harvest::run_crawl(&config, None, CancellationSignal::new())
        .await
        .expect("first run failed");
    assert_eq!(first.start_page, PageNumber::FIRST);
    assert_eq!(first.next_page, PageNumber::new(3).unwrap());

    config.crawler.max_pages = Some(1);
    let second = page_harvest::run_crawl(&config, None, CancellationSignal::new())
        .await
        .expect("second run failed");
    assert_eq!(second.start_page, PageNumber::new(3).unwrap());

    assert_eq!(file_names(dir.path()), vec!["page_1", "page_2", "page_3"]);
}
