//! Integration tests for the crawler
//!
//! These tests use wiremock to serve directory listings and test the full
//! traversal end-to-end.

use dirlist_catalog::config::Config;
use dirlist_catalog::crawler::{
    Coordinator, CrawlOutcome, CrawlReport, FetchError, Fetcher, ShutdownSignal,
};
use dirlist_catalog::output::{load_catalog, CatalogSink, JsonCatalogWriter, OutputResult};
use dirlist_catalog::{Catalog, CrawlError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Sink that keeps every checkpoint in memory
#[derive(Clone, Default)]
struct RecordingSink {
    saves: Arc<Mutex<Vec<Catalog>>>,
}

impl RecordingSink {
    fn snapshots(&self) -> Vec<Catalog> {
        self.saves.lock().unwrap().clone()
    }
}

impl CatalogSink for RecordingSink {
    fn save(&mut self, catalog: &Catalog) -> OutputResult<()> {
        self.saves.lock().unwrap().push(catalog.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

/// Serves a listing and requests shutdown while doing so
struct TriggerOnServe {
    signal: ShutdownSignal,
    body: String,
}

impl Respond for TriggerOnServe {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        self.signal.trigger();
        ResponseTemplate::new(200).set_body_string(self.body.clone())
    }
}

/// Creates a test configuration rooted at `{server}/movies/` with no waits
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.crawler.root_url = format!("{}/movies/", server.uri());
    config.crawler.request_delay = 0;
    config.crawler.rate_limit_cooldown = 0;
    config.crawler.transient_retry_delay = 0;
    config.http.referer = None;
    config
}

/// Builds an Apache-style listing page for the given hrefs
fn listing(hrefs: &[&str]) -> String {
    let mut html = String::from(
        "<html><head><title>Index</title></head><body>\n<a href=\"../\">Parent Directory</a>\n",
    );
    for href in hrefs {
        html.push_str(&format!("<a href=\"{0}\">{0}</a>\n", href));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_page(server: &MockServer, page_path: &str, body: String, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn mount_status(server: &MockServer, page_path: &str, status: u16, expected_hits: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(status))
        .expect(expected_hits)
        .mount(server)
        .await;
}

async fn crawl(config: &Config, sink: RecordingSink) -> CrawlReport {
    Coordinator::new(config, sink, ShutdownSignal::new())
        .expect("Failed to create coordinator")
        .run()
        .await
}

fn titles(catalog: &Catalog) -> Vec<String> {
    catalog
        .entries()
        .iter()
        .map(|entry| entry.title().to_string())
        .collect()
}

#[tokio::test]
async fn test_depth_first_order() {
    let server = MockServer::start().await;

    mount_page(&server, "/movies/", listing(&["A/", "Root.2001.mkv", "C/"]), 1).await;
    mount_page(&server, "/movies/A/", listing(&["Alpha.2002.mkv", "B/", "Omega.2003.mkv"]), 1).await;
    mount_page(&server, "/movies/A/B/", listing(&["Beta.2004.mkv"]), 1).await;
    mount_page(&server, "/movies/C/", listing(&["Gamma.2005.mkv"]), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(
        titles(&report.catalog),
        vec!["Alpha", "Beta", "Omega", "Root", "Gamma"]
    );
    assert_eq!(report.statistics.pages_fetched, 4);
}

#[tokio::test]
async fn test_entries_carry_year_link_and_genre() {
    let server = MockServer::start().await;

    mount_page(&server, "/movies/", listing(&["The.Matrix.1999.1080p.mkv", "Untitled.mp4"]), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    let entries = report.catalog.entries();
    assert_eq!(entries.len(), 2);

    assert_eq!(entries[0].title(), "The Matrix");
    assert_eq!(entries[0].year(), Some(1999));
    assert_eq!(entries[0].download_links().len(), 1);
    assert_eq!(entries[0].download_links()[0].label, "Download");
    assert_eq!(
        entries[0].download_links()[0].url,
        format!("{}/movies/The.Matrix.1999.1080p.mkv", server.uri())
    );
    assert_eq!(entries[0].genre().to_vec(), vec!["Uncategorized".to_string()]);

    assert_eq!(entries[1].title(), "Untitled");
    assert_eq!(entries[1].year(), None);
}

#[tokio::test]
async fn test_each_directory_fetched_once_and_root_never_revisited() {
    let server = MockServer::start().await;

    mount_page(&server, "/movies/", listing(&["A/", "B/"]), 1).await;

    // A links back to root by absolute path and sideways to B
    let a_body = r#"<html><body>
        <a href="../">Parent Directory</a>
        <a href="/movies/">Home</a>
        <a href="../B/">B/</a>
        <a href="./">.</a>
        <a href="a.mkv">a.mkv</a>
    </body></html>"#;
    mount_page(&server, "/movies/A/", a_body.to_string(), 1).await;

    // B links back to A, which was already visited
    mount_page(&server, "/movies/B/", listing(&["../A/", "b.mkv"]), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.catalog), vec!["b", "a"]);
    assert_eq!(report.statistics.pages_fetched, 3);
}

#[tokio::test]
async fn test_directory_outside_root_not_followed() {
    let server = MockServer::start().await;

    mount_page(&server, "/movies/", listing(&["/tv/", "Keep.mkv"]), 1).await;
    mount_page(&server, "/tv/", listing(&["Show.mkv"]), 0).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(titles(&report.catalog), vec!["Keep"]);
}

#[tokio::test]
async fn test_failed_directories_do_not_stop_siblings() {
    let server = MockServer::start().await;

    mount_page(&server, "/movies/", listing(&["broken/", "busy/", "limited/", "good/"]), 1).await;

    // Permanent error: one request, no retry
    mount_status(&server, "/movies/broken/", 500, 1).await;
    // Rate limited on every attempt: the budget of 3 is used up
    mount_status(&server, "/movies/busy/", 503, 3).await;
    mount_status(&server, "/movies/limited/", 429, 3).await;

    mount_page(&server, "/movies/good/", listing(&["Survivor.2010.mkv"]), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert_eq!(titles(&report.catalog), vec!["Survivor"]);
    assert_eq!(report.statistics.pages_fetched, 2);
    assert_eq!(report.statistics.pages_abandoned, 3);
    assert_eq!(report.statistics.rate_limit_waits, 6);
}

#[tokio::test]
async fn test_rate_limited_page_recovers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movies/"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/movies/", listing(&["Patience.1998.mkv"]), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(titles(&report.catalog), vec!["Patience"]);
    assert_eq!(report.statistics.rate_limit_waits, 1);
    assert_eq!(report.statistics.pages_abandoned, 0);
}

#[tokio::test]
async fn test_root_failure_still_writes_final_checkpoint() {
    let server = MockServer::start().await;
    mount_status(&server, "/movies/", 404, 1).await;

    let config = create_test_config(&server);
    let sink = RecordingSink::default();
    let report = crawl(&config, sink.clone()).await;

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert!(report.catalog.is_empty());

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert!(snapshots[0].is_empty());
}

#[tokio::test]
async fn test_non_media_files_never_catalogued() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/movies/",
        listing(&["Heat.1995.srt", "Heat.1995.nfo", "Heat.1995.jpg", "Heat.1995.MKV"]),
        1,
    )
    .await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.catalog.len(), 1);
    assert_eq!(report.catalog.entries()[0].year(), Some(1995));
}

#[tokio::test]
async fn test_duplicate_file_links_make_one_entry() {
    let server = MockServer::start().await;

    let body = r#"<html><body>
        <a href="Heat.1995.mkv"><img src="/icons/movie.gif"></a>
        <a href="Heat.1995.mkv">Heat.1995.mkv</a>
    </body></html>"#;
    mount_page(&server, "/movies/", body.to_string(), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.catalog.len(), 1);
    assert_eq!(report.statistics.duplicate_files, 1);
}

#[tokio::test]
async fn test_non_listing_page_yields_no_entries() {
    let server = MockServer::start().await;
    mount_page(&server, "/movies/", "\u{0}\u{1}not html at all".to_string(), 1).await;

    let config = create_test_config(&server);
    let report = crawl(&config, RecordingSink::default()).await;

    assert_eq!(report.outcome, CrawlOutcome::Completed);
    assert!(report.catalog.is_empty());
}

#[tokio::test]
async fn test_checkpoints_every_twenty_and_at_completion() {
    let server = MockServer::start().await;

    let first: Vec<String> = (0..30).map(|i| format!("First{}.2000.mkv", i)).collect();
    let second: Vec<String> = (0..15).map(|i| format!("Second{}.2001.mkv", i)).collect();

    mount_page(&server, "/movies/", listing(&["one/", "two/"]), 1).await;
    mount_page(
        &server,
        "/movies/one/",
        listing(&first.iter().map(String::as_str).collect::<Vec<_>>()),
        1,
    )
    .await;
    mount_page(
        &server,
        "/movies/two/",
        listing(&second.iter().map(String::as_str).collect::<Vec<_>>()),
        1,
    )
    .await;

    let config = create_test_config(&server);
    let sink = RecordingSink::default();
    let report = crawl(&config, sink.clone()).await;

    let snapshots = sink.snapshots();
    let sizes: Vec<usize> = snapshots.iter().map(Catalog::len).collect();
    assert_eq!(sizes, vec![20, 40, 45]);

    for pair in snapshots.windows(2) {
        let (earlier, later) = (&pair[0], &pair[1]);
        assert_eq!(&later.entries()[..earlier.len()], earlier.entries());
    }

    assert_eq!(report.catalog, snapshots[2]);
    assert_eq!(report.statistics.checkpoints, 3);
}

#[tokio::test]
async fn test_final_checkpoint_written_to_json_file() {
    let server = MockServer::start().await;
    mount_page(&server, "/movies/", listing(&["Heat.1995.mkv", "Ronin.1998.mp4"]), 1).await;

    let dir = tempfile::TempDir::new().unwrap();
    let catalog_path = dir.path().join("directory_import.json");

    let config = create_test_config(&server);
    let writer = JsonCatalogWriter::new(&catalog_path);
    let report = Coordinator::new(&config, writer, ShutdownSignal::new())
        .expect("Failed to create coordinator")
        .run()
        .await;

    let saved = load_catalog(&catalog_path).expect("Failed to read catalog");
    assert_eq!(saved, report.catalog);
    assert_eq!(titles(&saved), vec!["Heat", "Ronin"]);

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&catalog_path).unwrap()).unwrap();
    assert_eq!(raw["movies"][1]["year"], 1998);
    assert!(raw["movies"][0]["downloadLinks"].is_array());
}

#[tokio::test]
async fn test_interrupt_saves_entries_found_so_far() {
    let server = MockServer::start().await;
    let shutdown = ShutdownSignal::new();

    let files: Vec<String> = (0..17).map(|i| format!("Clip{}.2015.mp4", i)).collect();
    let mut hrefs: Vec<&str> = files.iter().map(String::as_str).collect();
    hrefs.push("more/");

    Mock::given(method("GET"))
        .and(path("/movies/"))
        .respond_with(TriggerOnServe {
            signal: shutdown.clone(),
            body: listing(&hrefs),
        })
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/movies/more/", listing(&["Never.mkv"]), 0).await;

    let dir = tempfile::TempDir::new().unwrap();
    let catalog_path = dir.path().join("directory_import.json");

    let config = create_test_config(&server);
    let report = Coordinator::new(&config, JsonCatalogWriter::new(&catalog_path), shutdown)
        .expect("Failed to create coordinator")
        .run()
        .await;

    assert_eq!(report.outcome, CrawlOutcome::Interrupted);
    assert_eq!(report.catalog.len(), 17);

    let saved = load_catalog(&catalog_path).expect("Failed to read catalog");
    assert_eq!(saved.len(), 17);
    assert_eq!(saved, report.catalog);
}

#[tokio::test]
async fn test_dropped_run_saves_entries_found_so_far() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/movies/",
        listing(&["Heat.1995.mkv", "Ronin.1998.mkv", "slow/", "After.2001.mkv"]),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/movies/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing(&["Late.2003.mkv"]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = create_test_config(&server);
    let sink = RecordingSink::default();
    let coordinator = Coordinator::new(&config, sink.clone(), ShutdownSignal::new())
        .expect("Failed to create coordinator");

    // The slow page is still in flight when the run is cancelled
    let result = tokio::time::timeout(Duration::from_millis(500), coordinator.run()).await;
    assert!(result.is_err());

    let snapshots = sink.snapshots();
    assert_eq!(snapshots.len(), 1);
    assert_eq!(titles(&snapshots[0]), vec!["Heat", "Ronin"]);
}

#[tokio::test]
async fn test_coordinator_dropped_before_run_writes_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/movies/", listing(&["Heat.1995.mkv"]), 0).await;

    let dir = tempfile::TempDir::new().unwrap();
    let catalog_path = dir.path().join("directory_import.json");
    std::fs::write(&catalog_path, r#"{"movies":[]}"#).unwrap();
    let before = std::fs::read_to_string(&catalog_path).unwrap();

    let config = create_test_config(&server);
    let sink = RecordingSink::default();
    drop(
        Coordinator::new(&config, sink.clone(), ShutdownSignal::new())
            .expect("Failed to create coordinator"),
    );
    drop(
        Coordinator::new(
            &config,
            JsonCatalogWriter::new(&catalog_path),
            ShutdownSignal::new(),
        )
        .expect("Failed to create coordinator"),
    );

    assert!(sink.snapshots().is_empty());
    assert_eq!(std::fs::read_to_string(&catalog_path).unwrap(), before);
}

#[tokio::test]
async fn test_invalid_config_rejected_before_run() {
    let server = MockServer::start().await;
    let mut config = create_test_config(&server);
    config.crawler.checkpoint_interval = 0;

    let result = Coordinator::new(&config, RecordingSink::default(), ShutdownSignal::new());
    assert!(matches!(result, Err(CrawlError::Config(_))));
}

#[tokio::test]
async fn test_shutdown_before_start_fetches_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/movies/", listing(&["a.mkv"]), 0).await;

    let shutdown = ShutdownSignal::new();
    shutdown.trigger();

    let config = create_test_config(&server);
    let sink = RecordingSink::default();
    let report = Coordinator::new(&config, sink.clone(), shutdown)
        .expect("Failed to create coordinator")
        .run()
        .await;

    assert_eq!(report.outcome, CrawlOutcome::Interrupted);
    assert_eq!(sink.snapshots().len(), 1);
}

#[tokio::test]
async fn test_independent_runs_share_nothing() {
    let server = MockServer::start().await;
    mount_page(&server, "/movies/", listing(&["Heat.1995.mkv"]), 2).await;

    let config = create_test_config(&server);
    let first = crawl(&config, RecordingSink::default()).await;
    let second = crawl(&config, RecordingSink::default()).await;

    assert_eq!(first.catalog.len(), 1);
    assert_eq!(second.catalog.len(), 1);
}

#[tokio::test]
async fn test_fetcher_sends_configured_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/movies/"))
        .and(header("user-agent", "TestAgent/1.0"))
        .and(header("referer", "https://referer.example.com/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = create_test_config(&server);
    config.http.user_agent = "TestAgent/1.0".to_string();
    config.http.referer = Some("https://referer.example.com/".to_string());

    let mut fetcher = Fetcher::from_config(&config.crawler, &config.http).unwrap();
    let url = url::Url::parse(&config.crawler.root_url).unwrap();

    assert_eq!(fetcher.fetch(&url).await.unwrap(), "ok");
}

#[tokio::test]
async fn test_fetcher_does_not_retry_permanent_errors() {
    let server = MockServer::start().await;
    mount_status(&server, "/movies/", 404, 1).await;

    let config = create_test_config(&server);
    let mut fetcher = Fetcher::from_config(&config.crawler, &config.http).unwrap();
    let url = url::Url::parse(&config.crawler.root_url).unwrap();

    let result = fetcher.fetch(&url).await;
    assert!(matches!(result, Err(FetchError::Status { status: 404, .. })));
}

#[tokio::test]
async fn test_fetcher_reports_exhausted_rate_limit() {
    let server = MockServer::start().await;
    mount_status(&server, "/movies/", 429, 2).await;

    let mut config = create_test_config(&server);
    config.crawler.max_attempts = 2;
    let mut fetcher = Fetcher::from_config(&config.crawler, &config.http).unwrap();
    let url = url::Url::parse(&config.crawler.root_url).unwrap();

    let result = fetcher.fetch(&url).await;
    assert!(matches!(
        result,
        Err(FetchError::RateLimited { attempts: 2, .. })
    ));
    assert_eq!(fetcher.stats().rate_limit_waits, 2);
}
