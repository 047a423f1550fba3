//! Description service: sends one image to a vision-capable chat-completion
//! endpoint and turns the answer into a short, ASCII-folded Latvian caption.

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

use crate::{config::Config, errors::Error};

/// Instruction sent alongside every image.
pub const PROMPT: &str = "Apraksti, kas redzams attēla latviesu valoda. Maksimali 14 vardus.";

/// Cap on the completion length.
pub const MAX_TOKENS: u32 = 500;

// Uploads are never sniffed; everything is labelled as JPEG.
const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [UserMessage<'a>; 1],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct UserMessage<'a> {
    role: &'static str,
    content: [ContentPart<'a>; 2],
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Clone)]
pub struct DescriptionService {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
}

impl DescriptionService {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            client,
            url: config.completions_url(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    /// Describes the image stored at `path`.
    pub async fn describe(&self, path: &Path) -> Result<String, Error> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "could not read image for description"
                );
                return Err(Error::SourceNotFound);
            }
        };

        let image_base64 = general_purpose::STANDARD.encode(&bytes);
        let payload = ChatRequest {
            model: &self.model,
            messages: [UserMessage {
                role: "user",
                content: [
                    ContentPart::Text { text: PROMPT },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: format!("{DATA_URI_PREFIX}{image_base64}"),
                        },
                    },
                ],
            }],
            max_tokens: MAX_TOKENS,
        };

        tracing::debug!(
            model = %self.model,
            image_bytes = bytes.len(),
            "sending request to vision API"
        );

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::TransportFailure(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| Error::TransportFailure(e.to_string()))?;

        tracing::info!(status = status.as_u16(), body_len = body.len(), "vision API responded");

        if status != reqwest::StatusCode::OK {
            return Err(Error::UpstreamStatusFailure(status.as_u16()));
        }

        let content = extract_content(&body).ok_or(Error::ResponseParseFailure)?;
        Ok(fold_diacritics(content.trim()))
    }
}

// Only the first choice matters; the rest of the body is not validated.
fn extract_content(body: &str) -> Option<String> {
    let result: Value = serde_json::from_str(body).ok()?;
    result
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Replaces the Latvian lowercase long vowels and softened consonants with
/// their plain Latin letters. Everything else is left alone.
pub fn fold_diacritics(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            'ā' => 'a',
            'ē' => 'e',
            'ī' => 'i',
            'ū' => 'u',
            'č' => 'c',
            'ģ' => 'g',
            'ķ' => 'k',
            'ļ' => 'l',
            'ņ' => 'n',
            'š' => 's',
            'ž' => 'z',
            other => other,
        })
        .collect()
}
