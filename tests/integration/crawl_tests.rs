//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the real
//! fetcher and robots.txt checker through the crawl loop end-to-end. Time is
//! virtual: every cooldown and delay goes through a `ManualClock`.

use chrono::{TimeZone, Utc};
use navigate_crawler::config::Config;
use navigate_crawler::crawler::{Clock, Coordinator, CrawlStep, ItemOutcome, ManualClock};
use navigate_crawler::robots::RobotsPolicyChecker;
use navigate_crawler::state::QueueStatus;
use navigate_crawler::storage::{SqliteStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|l| format!("<a href=\"{}\">{}</a>", l, l))
        .collect();
    format!(
        "<html><head><title>{}</title>\
         <meta name=\"description\" content=\"About {}\">\
         <meta name=\"keywords\" content=\"test, {}\"></head>\
         <body><main><p>{} body</p>{}</main></body></html>",
        title, title, title, title, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Builds a coordinator over a temp-file database with virtual time
fn create_coordinator(config: Config, db_dir: &TempDir) -> (Arc<ManualClock>, Coordinator) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap(),
    ));
    let storage = SqliteStorage::new(&db_dir.path().join("crawl.db")).expect("open database");
    let policy = RobotsPolicyChecker::new(&config.user_agent, &config.fetch, clock.clone())
        .expect("build robots checker");

    let coordinator = Coordinator::new(config, storage)
        .expect("build coordinator")
        .with_clock(clock.clone())
        .with_policy(Arc::new(policy));
    (clock, coordinator)
}

#[tokio::test]
async fn test_full_crawl_respects_robots_and_records_graph() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nDisallow: /private").await;
    mount_page(&server, "/", html("Home", &["/a", "/b", "/logo.png"])).await;
    mount_page(&server, "/a", html("A", &["/"])).await;
    mount_page(&server, "/b", html("B", &["/private/x"])).await;
    mount_page(&server, "/private/x", html("Secret", &[])).await;

    let db_dir = TempDir::new().unwrap();
    let (clock, mut crawler) = create_coordinator(Config::default(), &db_dir);
    crawler.seed(&[format!("{}/", base)]).unwrap();

    let counters = crawler.run().await.unwrap();

    assert_eq!(counters.processed, 4);
    assert_eq!(counters.completed, 3);
    assert_eq!(counters.disallowed, 1);
    assert_eq!(counters.failed, 0);
    // Three pages on one host, 30s apart
    assert!(clock.total_slept() >= Duration::from_secs(60));

    let private_requests = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.url.path() == "/private/x")
        .count();
    assert_eq!(private_requests, 0);

    // Reopen the database from disk
    drop(crawler);
    let storage = SqliteStorage::new(&db_dir.path().join("crawl.db")).unwrap();

    let home = storage
        .get_document_by_url(&format!("{}/", base))
        .unwrap()
        .expect("home document");
    assert!(home.processed);
    assert_eq!(home.title.as_deref(), Some("Home"));
    assert_eq!(home.description.as_deref(), Some("About Home"));
    assert_eq!(home.keywords, vec!["test", "Home"]);
    assert_eq!(
        home.links,
        vec![format!("{}/a", base), format!("{}/b", base)]
    );

    let secret = storage
        .get_document_by_url(&format!("{}/private/x", base))
        .unwrap()
        .expect("placeholder for disallowed page");
    assert!(!secret.processed);
    assert_eq!(secret.title, None);

    assert!(!storage
        .queue_contains_url(&format!("{}/logo.png", base))
        .unwrap());
    assert_eq!(
        storage
            .queue_items_by_status(QueueStatus::Disallowed)
            .unwrap()
            .len(),
        1
    );
    assert_eq!(storage.count_links().unwrap(), 4);
    assert_eq!(storage.get_outgoing_links(home.id).unwrap().len(), 2);
}

#[tokio::test]
async fn test_server_error_fails_item_then_retries() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", html("Recovered", &[])).await;

    let db_dir = TempDir::new().unwrap();
    let (clock, mut crawler) = create_coordinator(Config::default(), &db_dir);
    crawler.seed(&[format!("{}/flaky", base)]).unwrap();

    let CrawlStep::Processed { id, outcome } = crawler.step().await.unwrap() else {
        panic!("expected the seed to be processed");
    };
    assert_eq!(outcome, ItemOutcome::Failed);
    let item = crawler.storage().get_queue_item(id).unwrap();
    assert_eq!(item.status, QueueStatus::Failed);
    assert_eq!(item.last_error, Some(clock.now()));

    clock.advance(Duration::from_secs(10 * 60));
    assert_eq!(crawler.step().await.unwrap(), CrawlStep::Waiting);

    clock.advance(Duration::from_secs(21 * 60));
    assert_eq!(crawler.step().await.unwrap(), CrawlStep::RetriesReset(1));

    let step = crawler.step().await.unwrap();
    assert_eq!(
        step,
        CrawlStep::Processed {
            id,
            outcome: ItemOutcome::Completed
        }
    );
    assert_eq!(crawler.step().await.unwrap(), CrawlStep::Finished);
}

#[tokio::test]
async fn test_missing_robots_allows_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_page(&server, "/", html("Open", &[])).await;

    let db_dir = TempDir::new().unwrap();
    let (_clock, mut crawler) = create_coordinator(Config::default(), &db_dir);
    crawler.seed(&[format!("{}/", base)]).unwrap();

    let counters = crawler.run().await.unwrap();
    assert_eq!(counters.completed, 1);
    assert_eq!(crawler.storage().count_documents(Some(true)).unwrap(), 1);
}

#[tokio::test]
async fn test_depth_limit_stops_link_following() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(&server, "/", html("Root", &["/one"])).await;
    mount_page(&server, "/one", html("One", &["/two"])).await;
    mount_page(&server, "/two", html("Two", &["/three"])).await;

    let mut config = Config::default();
    config.crawler.max_depth = 1;

    let db_dir = TempDir::new().unwrap();
    let (_clock, mut crawler) = create_coordinator(config, &db_dir);
    crawler.seed(&[format!("{}/", base)]).unwrap();

    let counters = crawler.run().await.unwrap();
    assert_eq!(counters.completed, 2);

    let storage = crawler.storage();
    assert!(!storage.queue_contains_url(&format!("{}/two", base)).unwrap());
    assert!(storage
        .get_document_by_url(&format!("{}/two", base))
        .unwrap()
        .is_none());
    assert_eq!(storage.count_links().unwrap(), 1);
}

#[tokio::test]
async fn test_file_links_are_never_enqueued_or_fetched() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_robots(&server, "User-agent: *\nAllow: /").await;
    mount_page(
        &server,
        "/",
        html("Docs", &["/report.pdf", "/images/banner", "/guide"]),
    )
    .await;
    mount_page(&server, "/guide", html("Guide", &[])).await;

    let db_dir = TempDir::new().unwrap();
    let (_clock, mut crawler) = create_coordinator(Config::default(), &db_dir);
    crawler.seed(&[format!("{}/", base)]).unwrap();

    let counters = crawler.run().await.unwrap();
    assert_eq!(counters.completed, 2);

    let requested: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert!(!requested.contains(&"/report.pdf".to_string()));
    assert!(!requested.contains(&"/images/banner".to_string()));
}
