//! End-to-end test over real HTTP.
//!
//! A throwaway tokio listener serves the fixture API; the page talks to it
//! through [`HttpClient`] exactly as the binary does.

use std::sync::{Arc, Mutex};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use postview::client::Fetcher;
use postview::client::http::HttpClient;
use postview::config::Config;
use postview::env::Env;
use postview::mutate;
use postview::orchestrator::Page;
use postview::progress::ProgressTracker;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/api/{name}")).unwrap()
}

/// Answer `GET` requests from the fixture files; record each request path.
async fn serve_fixtures() -> (String, Arc<Mutex<Vec<String>>>) {
    let users = fixture("users.json");
    let posts: Vec<serde_json::Value> = serde_json::from_str(&fixture("posts.json")).unwrap();
    let comments: Vec<serde_json::Value> =
        serde_json::from_str(&fixture("comments.json")).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = vec![0u8; 8192];
            let n = socket.read(&mut buf).await.unwrap_or(0);
            let request = String::from_utf8_lossy(&buf[..n]).to_string();
            let path = request
                .lines()
                .next()
                .and_then(|l| l.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();
            log.lock().unwrap().push(path.clone());

            let filter = |items: &[serde_json::Value], key: &str, value: &str| {
                let matching: Vec<_> = items
                    .iter()
                    .filter(|item| item[key].to_string() == value)
                    .cloned()
                    .collect();
                serde_json::to_string(&matching).unwrap()
            };
            let (status, body) = match path.split_once('?') {
                None if path == "/users" => ("200 OK", users.clone()),
                Some(("/users", query)) => {
                    let all: Vec<serde_json::Value> = serde_json::from_str(&users).unwrap();
                    ("200 OK", filter(&all, "id", query.trim_start_matches("id=")))
                }
                Some(("/posts", query)) => {
                    ("200 OK", filter(&posts, "userId", query.trim_start_matches("userId=")))
                }
                Some(("/comments", "postId=11")) => ("500 Internal Server Error", "{}".to_string()),
                Some(("/comments", query)) => {
                    ("200 OK", filter(&comments, "postId", query.trim_start_matches("postId=")))
                }
                _ => ("404 Not Found", "{}".to_string()),
            };
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{addr}"), seen)
}

async fn page_for(base_url: &str) -> Page {
    let env = Env::mock([("POSTVIEW_BASE_URL", base_url)]);
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_with_global(None, Some(dir.path()), &env).unwrap();
    let client = HttpClient::new(&config.api.base_url, &config.api.user_agent).unwrap();
    Page::new(
        Fetcher::new(Arc::new(client)),
        config.page_options(),
        Arc::new(ProgressTracker::silent()),
    )
}

#[tokio::test]
async fn select_user_over_http() {
    let (base, seen) = serve_fixtures().await;
    let mut page = page_for(&base).await;

    assert_eq!(page.init().await.unwrap(), Some(2));
    let report = page.select_user(Some("3")).await.unwrap();
    assert_eq!(report.post_count, 2);

    let doc = page.document();
    let main = mutate::main_container(doc).unwrap();
    assert!(doc.text_content(main).contains("Author: Ann with Acme"));

    // Post 10 has a comment; post 11 answered 500 and renders empty.
    let ok = mutate::comment_section(doc, 10).unwrap();
    let failed = mutate::comment_section(doc, 11).unwrap();
    assert!(doc.text_content(ok).contains("Great post"));
    assert!(doc.children(failed).is_empty());

    let seen = seen.lock().unwrap().clone();
    assert!(seen.contains(&"/users".to_string()));
    assert!(seen.contains(&"/posts?userId=3".to_string()));
    assert!(seen.contains(&"/users?id=3".to_string()));
    assert!(seen.contains(&"/comments?postId=11".to_string()));
}

#[tokio::test]
async fn unreachable_api_renders_placeholder() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut page = page_for(&format!("http://{addr}")).await;
    assert_eq!(page.init().await.unwrap(), None);
    let report = page.select_user(Some("3")).await.unwrap();

    assert_eq!(report.post_count, 0);
    let doc = page.document();
    let main = mutate::main_container(doc).unwrap();
    assert_eq!(doc.text_content(main), postview::constants::PLACEHOLDER_TEXT);
}
