use std::time::Duration;

use eventsource_stream::Eventsource;
use futures::StreamExt;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::VisionConfig;
use crate::vision::error::VisionError;
use crate::vision::payload::ImagePayload;

const DONE_SENTINEL: &str = "[DONE]";

/// One-shot client for a chat-completion style VLM endpoint.
///
/// Each call builds its request from an immutable config snapshot, so
/// concurrent calls are independent and carry no shared state.
pub struct VisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

/// Non-streaming response body: `choices[0].message.content`.
#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Streamed chunk: `choices[0].delta.content`.
#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkDelta {
    content: Option<String>,
}

impl VisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, VisionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// Base URL with the model path appended, never a double slash.
    fn endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.config.invoke_url.trim_end_matches('/'),
            self.config.model.trim_start_matches('/')
        )
    }

    fn request_body(&self, payload: &ImagePayload) -> Value {
        let prompt = format!("{}<img src=\"{}\" />", self.config.content, payload.data_url());
        json!({
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "top_p": self.config.top_p,
            "stream": self.config.stream,
        })
    }

    /// Send one inference request and reduce the response to a description.
    ///
    /// A single attempt is made; retry policy belongs to the caller.
    pub async fn describe(&self, payload: &ImagePayload) -> Result<String, VisionError> {
        let url = self.endpoint();
        let accept = if self.config.stream {
            "text/event-stream"
        } else {
            "application/json"
        };

        let mut request = self
            .http
            .post(&url)
            .header(ACCEPT, accept)
            .json(&self.request_body(payload));
        if !self.config.api_key.is_empty() {
            request = request.header(AUTHORIZATION, format!("Bearer {}", self.config.api_key));
        }

        debug!(%url, stream = self.config.stream, "Sending inference request");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VisionError::RequestFailed {
                status: Some(status.as_u16()),
                message: format!("Endpoint returned {}: {}", status, body),
                partial: None,
            });
        }

        if self.config.stream {
            collect_stream(response).await
        } else {
            extract_message(response).await
        }
    }
}

async fn extract_message(response: reqwest::Response) -> Result<String, VisionError> {
    let completion: ChatCompletion = response
        .json()
        .await
        .map_err(|e| VisionError::request_failed(format!("Malformed response body: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| VisionError::request_failed("Response contained no choices"))?;

    Ok(choice.message.content.trim().to_string())
}

/// Accumulate `delta.content` fragments from a server-sent-event body in
/// arrival order, stopping at the `[DONE]` sentinel. A stream that ends
/// without a single fragment yields an empty description, not an error;
/// a transport error or an unparseable chunk aborts with whatever was
/// accumulated so far attached as a diagnostic.
async fn collect_stream(response: reqwest::Response) -> Result<String, VisionError> {
    let mut events = response.bytes_stream().eventsource();
    let mut parts: Vec<String> = Vec::new();

    while let Some(event) = events.next().await {
        let event = event.map_err(|e| stream_aborted(format!("Stream error: {}", e), &parts))?;
        if event.data == DONE_SENTINEL {
            break;
        }

        let chunk: ChatCompletionChunk = serde_json::from_str(&event.data)
            .map_err(|e| stream_aborted(format!("Malformed stream chunk: {}", e), &parts))?;

        if let Some(content) = chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
            if !content.is_empty() {
                parts.push(content);
            }
        }
    }

    Ok(parts.concat().trim().to_string())
}

fn stream_aborted(message: String, parts: &[String]) -> VisionError {
    VisionError::RequestFailed {
        status: None,
        message,
        partial: (!parts.is_empty()).then(|| parts.concat()),
    }
}
