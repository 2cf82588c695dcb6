use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use wallet_chat::api::{ new_client, ApiConfig };
use wallet_chat::session::refresh::{ refresh_once, spawn_history_refresh };
use wallet_chat::session::{ Session, SessionClient };
use wiremock::matchers::{ method, path, path_regex };
use wiremock::{ Mock, MockServer, ResponseTemplate };

async fn active_client(server: &MockServer) -> Arc<Mutex<SessionClient>> {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "response": "hi" })))
        .mount(server)
        .await;

    let config = ApiConfig::new(&server.uri(), Duration::from_secs(2)).unwrap();
    let mut client = SessionClient::new(new_client(&config).unwrap(), Session::new("0xABC", 0));
    client.send_message("hello").await.unwrap();
    Arc::new(Mutex::new(client))
}

fn three_message_history() -> serde_json::Value {
    serde_json::json!({
        "history": [
            { "role": "user", "content": "hello" },
            { "role": "assistant", "content": "hi" },
            { "role": "assistant", "content": "anything else?" }
        ]
    })
}

#[tokio::test]
async fn busy_session_skips_the_refresh() {
    let server = MockServer::start().await;
    let client = active_client(&server).await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_message_history()))
        .expect(0)
        .mount(&server)
        .await;

    let _busy = client.lock().await;
    assert!(!refresh_once(&client).await);
}

#[tokio::test]
async fn background_refresh_adopts_server_history_and_stops_on_cancel() {
    let server = MockServer::start().await;
    let client = active_client(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/api/history/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(three_message_history()))
        .expect(1..)
        .mount(&server)
        .await;

    let shutdown = CancellationToken::new();
    let handle = spawn_history_refresh(client.clone(), Duration::from_millis(50), shutdown.clone());

    let mut adopted = false;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(25)).await;
        if client.lock().await.session().messages.len() == 3 {
            adopted = true;
            break;
        }
    }

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert!(adopted, "history was not reconciled in time");
}
