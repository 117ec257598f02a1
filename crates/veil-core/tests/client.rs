use async_trait::async_trait;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;

use veil_core::{
    Client, Config, DomainFilter, Envelope, FetchError, FetchRequest, FetchResponse, Fetcher,
    SessionRecord,
};

const EXAMPLE_PAGE: &str = "<!doctype html>\n<html>\n<head>\n<title>Example Domain</title>\n</head>\n<body><h1>Example Domain</h1></body>\n</html>\n";

/// Serves example.com and fails every other host like an unresolvable name
struct ExampleFetcher;

#[async_trait]
impl Fetcher for ExampleFetcher {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        match request.url.host_str() {
            Some("example.com") => Ok(FetchResponse {
                headers: BTreeMap::from([
                    ("content-type".to_string(), "text/html; charset=UTF-8".to_string()),
                    ("content-length".to_string(), EXAMPLE_PAGE.len().to_string()),
                ]),
                payload: EXAMPLE_PAGE.as_bytes().to_vec(),
            }),
            Some(host) => Err(FetchError::Transport(format!(
                "dns error: failed to lookup address information for {}",
                host
            ))),
            None => Err(FetchError::Transport("missing host".to_string())),
        }
    }
}

fn client() -> Client {
    Client::with_fetcher(Config::new("veil.local".to_string()), Arc::new(ExampleFetcher)).unwrap()
}

fn own_session() -> Envelope {
    Envelope::Session(SessionRecord::new("veil.local".to_string()))
}

#[test]
fn test_read_on_fresh_client() {
    let client = client();

    let envelope = client.read().unwrap();
    assert_eq!(envelope, own_session());
    assert_eq!(
        serde_json::to_value(&envelope).unwrap(),
        json!({
            "type": "Session",
            "data": { "agent": null, "domain": "veil.local", "tabs": [], "warning": 0 }
        })
    );
}

#[test]
fn test_query_on_fresh_client() {
    let client = client();

    assert_eq!(client.query(&DomainFilter::parse("*")), vec![own_session()]);
    assert_eq!(
        client.query(&DomainFilter::parse("veil.local")),
        vec![own_session()]
    );
    assert!(client.query(&DomainFilter::parse("does-not-exist")).is_empty());
}

#[tokio::test]
async fn test_browsing_scenario() {
    let client = client();

    // No mode on file: downloads are not restricted
    let outcome = client
        .download("https://example.com/index.html")
        .await
        .unwrap()
        .unwrap();
    let page = String::from_utf8(outcome.payload).unwrap();
    assert!(page.contains("<html>"));
    assert!(page.contains("<title>Example Domain</title>"));
    assert!(page.contains("</html>"));
    assert!(!outcome.headers.is_empty());

    let saved = client
        .save_mode(&json!({
            "domain": "example.com",
            "mode": { "text": true, "image": false, "audio": false, "video": false, "other": false }
        }))
        .unwrap();
    assert!(saved);

    let text = client
        .download("https://example.com/index.html")
        .await
        .unwrap();
    assert!(text.is_some());

    let image = client
        .download("https://example.com/image.png")
        .await
        .unwrap();
    assert!(image.is_none());

    let unreachable = client
        .download("https://does-not-exist/index.html")
        .await
        .unwrap();
    assert!(unreachable.is_none());

    let example = client.sessions().get("example.com").unwrap();
    assert_eq!(example.warning, 0);
    let missing = client.sessions().get("does-not-exist").unwrap();
    assert_eq!(missing.warning, 1);

    let all = client.query(&DomainFilter::All);
    assert_eq!(all.len(), 3);
    assert_eq!(all[0], own_session());
    assert_eq!(client.read().unwrap(), own_session());
}

#[test]
fn test_malformed_mode_is_rejected() {
    let client = client();

    let saved = client
        .save_mode(&json!({
            "domain": "example.com",
            "mode": { "text": true, "image": "no" }
        }))
        .unwrap();

    assert!(!saved);
    assert!(client.modes().read("example.com").is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_downloads_and_queries() {
    let client = client();

    let receivers: Vec<_> = (0..16)
        .map(|i| {
            let locator = if i % 2 == 0 {
                "https://does-not-exist/".to_string()
            } else {
                "https://example.com/index.html".to_string()
            };
            client.spawn_download(locator)
        })
        .collect();

    // Reads interleave with the in-flight downloads
    assert!(client.read().is_some());
    assert!(!client.query(&DomainFilter::All).is_empty());

    let mut completed = 0;
    for receiver in receivers {
        if Client::join_download(receiver).await.unwrap().is_some() {
            completed += 1;
        }
    }

    assert_eq!(completed, 8);
    assert_eq!(client.sessions().get("does-not-exist").unwrap().warning, 8);
    assert_eq!(client.sessions().get("example.com").unwrap().warning, 0);
}
