//! Model backends against a one-shot local HTTP server.

use serde_json::json;
use tickwise_agents::backends::{AnthropicBackend, Message, OpenAiBackend};
use tickwise_agents::{AgentError, ModelBackend, ModelRequest, ModelTurn, ToolSpec};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn request() -> ModelRequest {
    ModelRequest {
        system: "You are a stock analyst.".to_string(),
        tools: vec![ToolSpec {
            name: "get_market_data".to_string(),
            description: "prices".to_string(),
            input_schema: json!({"type": "object"}),
        }],
        messages: vec![Message::User {
            content: "Analyze TSLA stock".to_string(),
        }],
        max_tokens: 256,
    }
}

/// Answer exactly one request with `status` and `body`; the handle yields
/// the raw request text.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let raw = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        raw
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(end) = text.find("\r\n\r\n") {
            let length = text[..end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    if name.eq_ignore_ascii_case("content-length") {
                        value.trim().parse::<usize>().ok()
                    } else {
                        None
                    }
                })
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

#[tokio::test]
async fn anthropic_posts_messages_and_reads_tool_use() {
    let body = json!({
        "content": [
            {"type": "text", "text": "Let me check prices."},
            {"type": "tool_use", "id": "toolu_1", "name": "get_market_data", "input": {"query": "TSLA"}}
        ],
        "stop_reason": "tool_use"
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", body).await;
    let backend = AnthropicBackend::new("test-key", "claude-sonnet-4-0")
        .unwrap()
        .with_base_url(&format!("{base_url}/"));

    let turn = backend.complete(&request()).await.unwrap();

    match turn {
        ModelTurn::ToolCalls { text, calls } => {
            assert_eq!(text.as_deref(), Some("Let me check prices."));
            assert_eq!(calls.len(), 1);
            assert_eq!(calls[0].id, "toolu_1");
            assert_eq!(calls[0].input, json!({"query": "TSLA"}));
        }
        other => panic!("expected tool calls, got {other:?}"),
    }

    let raw = server.await.unwrap().to_lowercase();
    assert!(raw.starts_with("post /v1/messages "), "{raw}");
    assert!(raw.contains("x-api-key: test-key"));
    assert!(raw.contains("anthropic-version: 2023-06-01"));
    assert!(raw.contains(r#""model":"claude-sonnet-4-0""#));
}

#[tokio::test]
async fn anthropic_error_status_is_a_backend_error() {
    let (base_url, server) =
        serve_once("529 Site Overloaded", json!({"type": "error"}).to_string()).await;
    let backend = AnthropicBackend::new("test-key", "claude-sonnet-4-0")
        .unwrap()
        .with_base_url(&base_url);

    let err = backend.complete(&request()).await.unwrap_err();

    assert!(matches!(&err, AgentError::Backend(message) if message.contains("529")), "{err}");
    server.await.unwrap();
}

#[tokio::test]
async fn openai_posts_chat_completion_with_bearer_auth() {
    let body = json!({
        "choices": [{"message": {"role": "assistant", "content": "HOLD for now.", "tool_calls": null}}]
    })
    .to_string();
    let (base_url, server) = serve_once("200 OK", body).await;
    let backend = OpenAiBackend::new("test-key", "gpt-4")
        .unwrap()
        .with_base_url(&base_url);

    let turn = backend.complete(&request()).await.unwrap();

    assert_eq!(turn, ModelTurn::Final("HOLD for now.".to_string()));
    let raw = server.await.unwrap().to_lowercase();
    assert!(raw.starts_with("post /v1/chat/completions "), "{raw}");
    assert!(raw.contains("authorization: bearer test-key"));
    assert!(raw.contains(r#""model":"gpt-4""#));
}
