use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use affiliate_api::{ConsoleApi, Credentials, DateRange, Filter, HttpApi};
use affiliate_core::config::ApiConfig;
use affiliate_core::types::{Advertiser, Campaign, CampaignStatus, User};
use affiliate_core::{ConsoleError, EntityId};
use chrono::NaiveDate;
use serde_json::json;

/// Serve one canned response and hand back the raw request text.
fn spawn_server(status: u16, body: &'static str) -> (String, mpsc::Receiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = tx.send(read_request(&mut stream));
            let response = format!(
                "HTTP/1.1 {status} X\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes());
        }
    });
    (format!("http://{}/api", addr), rx)
}

/// Read headers plus a `Content-Length` body, however the client chunks it.
fn read_request(stream: &mut impl Read) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = stream.read(&mut buf).unwrap_or(0);
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);
        let text = String::from_utf8_lossy(&data).to_string();
        if let Some(split) = text.find("\r\n\r\n") {
            let content_length = text[..split]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= split + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).to_string()
}

fn api(base_url: String) -> HttpApi {
    HttpApi::new(&ApiConfig {
        base_url,
        timeout_secs: 5,
        user_agent: "affiliate-test".to_string(),
    })
    .expect("client")
}

#[tokio::test]
async fn list_posts_filter_with_bearer_token() {
    let (url, rx) = spawn_server(
        200,
        r#"{"success":true,"data":[{"id":1,"title":"Alpha","status":"active"}]}"#,
    );
    let api = api(url);
    api.set_token(Some("tok-123".into()));

    let mut filter = Filter::new();
    filter.insert("status".into(), json!("active"));
    let campaigns: Vec<Campaign> = api.list(&filter).await.expect("list");

    assert_eq!(campaigns.len(), 1);
    assert_eq!(campaigns[0].title, "Alpha");

    let request = rx.recv().expect("request");
    assert!(request.starts_with("POST /api/admin/campaign/list "));
    assert!(request.to_lowercase().contains("authorization: bearer tok-123"));
    assert!(request.contains(r#""status":"active""#));
}

#[tokio::test]
async fn user_list_sends_filters_as_query() {
    let (url, rx) = spawn_server(200, r#"{"success":true,"data":[]}"#);
    let api = api(url);
    let mut filter = Filter::new();
    filter.insert("role".into(), json!("manager"));
    let users: Vec<User> = api.list(&filter).await.expect("list");
    assert!(users.is_empty());

    let request = rx.recv().expect("request");
    assert!(request.starts_with("GET /api/admin/user/company-users?role=manager "));
}

#[tokio::test]
async fn unauthorized_maps_to_session_error() {
    let (url, _rx) = spawn_server(401, r#"{"success":false,"message":"jwt expired"}"#);
    let err = api(url)
        .list::<Advertiser>(&Filter::new())
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test]
async fn duck_typed_payload_is_rejected() {
    let (url, _rx) = spawn_server(200, r#"{"success":true,"data":{"advertisers":[]}}"#);
    let err = api(url)
        .list::<Advertiser>(&Filter::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn status_patch_returns_partial_data() {
    let (url, rx) = spawn_server(200, r#"{"success":true,"data":{"id":5,"status":"paused"}}"#);
    let patch = api(url)
        .set_status::<Campaign>(&EntityId::from(5), CampaignStatus::Paused)
        .await
        .expect("status");
    assert_eq!(patch, json!({"id": 5, "status": "paused"}));

    let request = rx.recv().expect("request");
    assert!(request.starts_with("PATCH /api/admin/campaign/5/status "));
    assert!(request.contains(r#"{"status":"paused"}"#));
}

#[tokio::test]
async fn login_returns_token() {
    let (url, rx) = spawn_server(200, r#"{"success":true,"data":{"token":"a.b.c"}}"#);
    let token = api(url)
        .login(&Credentials {
            email: "admin@example.com".into(),
            password: "secret".into(),
        })
        .await
        .expect("login");
    assert_eq!(token, "a.b.c");
    assert!(rx.recv().expect("request").starts_with("POST /api/common/auth/login "));
}

#[tokio::test]
async fn server_error_keeps_backend_message() {
    let (url, _rx) = spawn_server(500, r#"{"success":false,"message":"Database unavailable"}"#);
    let err = api(url)
        .dashboard(&DateRange::new(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        ))
        .await
        .unwrap_err();
    assert_eq!(err.user_message("Failed to load dashboard"), "Database unavailable");
}

#[tokio::test]
async fn missing_preference_is_none() {
    let (url, rx) = spawn_server(200, r#"{"success":true,"data":null}"#);
    let pref = api(url).load_preference("campaignList").await.expect("pref");
    assert!(pref.is_none());
    assert!(rx
        .recv()
        .expect("request")
        .starts_with("GET /api/common/user-preference/campaignList "));
}

#[tokio::test]
async fn connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let err = api(format!("http://{addr}/api"))
        .list::<Advertiser>(&Filter::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ConsoleError::Transport(_)));
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    thread::spawn(move || {
        if let Ok((mut stream, _)) = listener.accept() {
            let _ = read_request(&mut stream);
            // Hold the connection open without answering.
            thread::sleep(Duration::from_secs(5));
        }
    });
    let api = HttpApi::new(&ApiConfig {
        base_url: format!("http://{addr}/api"),
        timeout_secs: 1,
        user_agent: "affiliate-test".to_string(),
    })
    .expect("client");

    let started = Instant::now();
    let err = api.list::<Campaign>(&Filter::new()).await.unwrap_err();
    assert!(matches!(err, ConsoleError::Timeout));
    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(err.user_message("Failed to load campaigns"), "Failed to load campaigns");
}

#[tokio::test]
async fn record_id_is_encoded_as_one_segment() {
    let (url, rx) = spawn_server(200, r#"{"success":true,"data":{}}"#);
    api(url)
        .update::<User>(&EntityId::from("a/b c"), &json!({"name": "x"}))
        .await
        .expect("update");
    let request = rx.recv().expect("request");
    assert!(request.starts_with("PUT /api/admin/user/a%2Fb%20c "));
}
