use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::llm::media::image_data_url;
use crate::utils::http::get_http_client;
use crate::utils::timing::log_llm_timing;

const ERROR_BODY_LOG_LIMIT: usize = 2000;

pub(crate) fn truncate_for_log(value: &str, limit: usize) -> String {
    if value.chars().count() <= limit {
        return value.to_string();
    }
    let truncated: String = value.chars().take(limit).collect();
    format!("{truncated}... (truncated)")
}

fn summarize_payload(payload: &Value) -> String {
    let model = payload
        .get("model")
        .and_then(|v| v.as_str())
        .unwrap_or("unknown");
    let message_count = payload
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|messages| messages.len())
        .unwrap_or(0);
    let image_parts = payload
        .get("messages")
        .and_then(|v| v.as_array())
        .map(|messages| {
            messages
                .iter()
                .filter_map(|message| message.get("content").and_then(|c| c.as_array()))
                .flatten()
                .filter(|part| part.get("type").and_then(|t| t.as_str()) == Some("image_url"))
                .count()
        })
        .unwrap_or(0);
    let max_tokens = payload
        .get("max_tokens")
        .and_then(|v| v.as_u64())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "default".to_string());

    format!(
        "model={}, messages={}, images={}, max_tokens={}",
        model, message_count, image_parts, max_tokens
    )
}

fn summarize_error_body(body: &str) -> (Option<String>, String) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, "empty response body".to_string());
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        let message = value
            .pointer("/error/message")
            .and_then(|v| v.as_str())
            .map(|v| v.to_string())
            .or_else(|| {
                value
                    .get("message")
                    .and_then(|v| v.as_str())
                    .map(|v| v.to_string())
            });
        return (
            message,
            truncate_for_log(&value.to_string(), ERROR_BODY_LOG_LIMIT),
        );
    }

    (None, truncate_for_log(trimmed, ERROR_BODY_LOG_LIMIT))
}

/// Plain string content when there are no images, otherwise a text part followed by one
/// `image_url` part per image.
pub fn build_message_content(text: &str, images: &[&[u8]]) -> Value {
    if images.is_empty() {
        return Value::String(text.to_string());
    }

    let mut parts = Vec::with_capacity(images.len() + 1);
    parts.push(json!({
        "type": "text",
        "text": text
    }));

    for image in images {
        parts.push(json!({
            "type": "image_url",
            "image_url": { "url": image_data_url(image) }
        }));
    }

    Value::Array(parts)
}

pub fn system_and_user(system_prompt: &str, user_content: &str) -> Vec<Value> {
    vec![
        json!({ "role": "system", "content": system_prompt }),
        json!({ "role": "user", "content": user_content }),
    ]
}

fn extract_message_content(response: &Value) -> Option<String> {
    let content = response
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())?
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

async fn call_chat_api(config: &Config, payload: &Value) -> Result<Value> {
    debug!("Chat completion request: {}", summarize_payload(payload));

    let client = get_http_client();
    let response = client
        .post(format!(
            "{}/chat/completions",
            config.openai_base_url.trim_end_matches('/')
        ))
        .bearer_auth(&config.openai_api_key)
        .timeout(config.llm_timeout())
        .json(payload)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let (message, body_summary) = summarize_error_body(&body);
        warn!(
            "Chat completion API error: status={}, body={}",
            status, body_summary
        );
        let detail = message.unwrap_or(body_summary);
        return Err(anyhow!(
            "Chat completion request failed with status {}: {}",
            status,
            detail
        ));
    }

    let value = response.json::<Value>().await?;
    debug!(
        "Chat completion response received for model={}",
        payload
            .get("model")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
    );
    Ok(value)
}

/// Sends `messages` to the chat-completion endpoint and returns the first choice's text.
pub async fn chat_completion(
    config: &Config,
    operation: &str,
    messages: Vec<Value>,
    max_tokens: Option<u32>,
) -> Result<String> {
    let mut payload = json!({
        "model": config.openai_model,
        "messages": messages,
    });
    let mut metadata = None;
    if let Some(max_tokens) = max_tokens {
        payload["max_tokens"] = json!(max_tokens);
        metadata = Some(json!({ "max_tokens": max_tokens }));
    }

    log_llm_timing("openai", &config.openai_model, operation, metadata, || async {
        let response = call_chat_api(config, &payload).await?;
        extract_message_content(&response).ok_or_else(|| {
            warn!(
                "Chat completion response had no message content: {}",
                truncate_for_log(&response.to_string(), ERROR_BODY_LOG_LIMIT)
            );
            anyhow!("Malformed chat completion response for {operation}")
        })
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use crate::llm::media::TINY_PNG;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion(content: &str) -> Value {
        json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "model": "gpt-4o",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }]
        })
    }

    #[test]
    fn text_only_content_is_a_plain_string() {
        assert_eq!(build_message_content("hello", &[]), json!("hello"));
    }

    #[test]
    fn image_content_puts_text_first() {
        let content = build_message_content("What's in this image?", &[TINY_PNG]);
        let parts = content.as_array().expect("array content");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["type"], "text");
        assert_eq!(parts[0]["text"], "What's in this image?");
        assert_eq!(parts[1]["type"], "image_url");
        assert!(parts[1]["image_url"]["url"]
            .as_str()
            .unwrap_or_default()
            .starts_with("data:image/png;base64,"));
    }

    #[test]
    fn error_body_message_is_extracted() {
        let (message, _) =
            summarize_error_body(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#);
        assert_eq!(message.as_deref(), Some("Invalid API key"));

        let (message, summary) = summarize_error_body("   ");
        assert!(message.is_none());
        assert_eq!(summary, "empty response body");
    }

    #[test]
    fn payload_summary_counts_images() {
        let payload = json!({
            "model": "gpt-4o",
            "max_tokens": 300,
            "messages": [{ "role": "user", "content": build_message_content("hi", &[TINY_PNG]) }]
        });
        assert_eq!(
            summarize_payload(&payload),
            "model=gpt-4o, messages=1, images=1, max_tokens=300"
        );
    }

    #[test]
    fn missing_content_yields_none() {
        assert!(extract_message_content(&json!({ "choices": [] })).is_none());
        assert!(extract_message_content(&completion("  ")).is_none());
        assert_eq!(
            extract_message_content(&completion(" Headline ")).as_deref(),
            Some("Headline")
        );
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("A quiet harbor")))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&format!("{}/v1", server.uri()), "uploads", "newsified.css");
        let text = chat_completion(&config, "test", system_and_user("sys", "user"), Some(10))
            .await
            .expect("completion");
        assert_eq!(text, "A quiet harbor");

        let requests = server.received_requests().await.unwrap_or_default();
        let body: Value = serde_json::from_slice(&requests[0].body).expect("json body");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["max_tokens"], 10);
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error_with_upstream_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": { "message": "Rate limit reached" }
            })))
            .mount(&server)
            .await;

        let config = test_config(&format!("{}/v1", server.uri()), "uploads", "newsified.css");
        let err = chat_completion(&config, "test", system_and_user("sys", "user"), None)
            .await
            .expect_err("status 429 should fail");
        let message = err.to_string();
        assert!(message.contains("429"));
        assert!(message.contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn slow_response_hits_the_configured_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(completion("Too late"))
                    .set_delay(std::time::Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let mut config = test_config(&format!("{}/v1", server.uri()), "uploads", "newsified.css");
        config.llm_timeout_seconds = 1;
        let err = chat_completion(&config, "test", system_and_user("sys", "user"), None)
            .await
            .expect_err("delayed response should time out");
        assert!(err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<reqwest::Error>())
            .any(reqwest::Error::is_timeout));
    }
}
