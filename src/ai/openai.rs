use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncWriteExt, DuplexStream};

use crate::ai::{AudioStream, Intelligence, ILLUSTRATION_PROMPT, SUMMARY_PROMPT};
use crate::app::{CancellationToken, PodcastError, Result};
use crate::chunker::{split_text, SPEECH_CHUNK_BYTES};
use crate::config::Settings;

const CHAT_MODEL: &str = "gpt-3.5-turbo";
const IMAGE_MODEL: &str = "dall-e-2";
const IMAGE_SIZE: &str = "512x512";
const SPEECH_MODEL: &str = "tts-1-hd";
const SPEECH_VOICE: &str = "alloy";
const SPEECH_SPEED: f32 = 1.0;

const API_TIMEOUT: Duration = Duration::from_secs(300);
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(10);
const PIPE_CAPACITY: usize = 64 * 1024;

/// [`Intelligence`] backed by the OpenAI chat, image and speech endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    api: Client,
    download: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let api = Client::builder()
            .connect_timeout(DOWNLOAD_TIMEOUT)
            .timeout(API_TIMEOUT)
            .user_agent(concat!("podcaster/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let download = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("podcaster/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            api,
            download,
            api_key: settings.api_key.clone(),
            base_url: settings.base_url.clone(),
        })
    }

    fn post(&self, endpoint: &str) -> RequestBuilder {
        self.api
            .post(format!("{}/{}", self.base_url, endpoint))
            .bearer_auth(&self.api_key)
    }

    async fn send(
        &self,
        cancel: &CancellationToken,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<Response> {
        let response = cancel.or_cancel(request.send()).await??;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = cancel.or_cancel(response.bytes()).await?.unwrap_or_default();
        let message = serde_json::from_slice::<ApiErrorBody>(&body)
            .map(|b| b.error.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&body).trim().to_string());
        Err(PodcastError::Remote(format!(
            "{} returned {}: {}",
            endpoint, status, message
        )))
    }

    async fn download(&self, cancel: &CancellationToken, url: &str) -> Result<Vec<u8>> {
        let response = cancel.or_cancel(self.download.get(url).send()).await??;
        if response.status() != StatusCode::OK {
            return Err(PodcastError::Remote(format!(
                "bad status code fetching illustration: {}",
                response.status()
            )));
        }
        let body = cancel.or_cancel(response.bytes()).await??;
        Ok(body.to_vec())
    }

    /// Synthesize each chunk in order and copy the audio into `pipe`.
    async fn stream_speech(
        &self,
        cancel: &CancellationToken,
        chunks: Vec<String>,
        mut pipe: DuplexStream,
    ) -> Result<()> {
        let total = chunks.len();
        for (index, chunk) in chunks.iter().enumerate() {
            if chunk.trim().is_empty() {
                continue;
            }
            tracing::debug!(chunk = index + 1, total, bytes = chunk.len(), "Requesting speech");

            let request = self.post("audio/speech").json(&SpeechRequest {
                model: SPEECH_MODEL,
                input: chunk,
                voice: SPEECH_VOICE,
                speed: SPEECH_SPEED,
            });
            let mut response = self.send(cancel, "audio/speech", request).await?;

            while let Some(bytes) = cancel.or_cancel(response.chunk()).await?? {
                cancel.or_cancel(pipe.write_all(&bytes)).await??;
            }
        }
        pipe.shutdown().await?;
        Ok(())
    }
}

#[async_trait]
impl Intelligence for OpenAiClient {
    async fn summary(&self, cancel: &CancellationToken, content: &str) -> Result<String> {
        let request = self.post("chat/completions").json(&ChatRequest {
            model: CHAT_MODEL,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SUMMARY_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content,
                },
            ],
        });
        let response = self.send(cancel, "chat/completions", request).await?;
        let body: ChatResponse = cancel.or_cancel(response.json()).await??;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| PodcastError::Remote("no choices in response".into()))?;
        Ok(choice.message.content.unwrap_or_default())
    }

    async fn illustration(&self, cancel: &CancellationToken, content: &str) -> Result<Vec<u8>> {
        let prompt = format!("{}{}", ILLUSTRATION_PROMPT, content);
        let request = self.post("images/generations").json(&ImageRequest {
            model: IMAGE_MODEL,
            prompt: &prompt,
            n: 1,
            size: IMAGE_SIZE,
        });
        let response = self.send(cancel, "images/generations", request).await?;
        let body: ImageResponse = cancel.or_cancel(response.json()).await??;

        let url = body
            .data
            .into_iter()
            .next()
            .ok_or_else(|| PodcastError::Remote("no data in response".into()))?
            .url
            .ok_or_else(|| PodcastError::Remote("image response carries no URL".into()))?;

        tracing::debug!("Downloading illustration from {}", url);
        self.download(cancel, &url).await
    }

    async fn speech(&self, cancel: &CancellationToken, content: &str) -> Result<AudioStream> {
        let chunks = split_text(SPEECH_CHUNK_BYTES, content)?;
        tracing::debug!(chunks = chunks.len(), "Split content for speech");

        let (writer, reader) = tokio::io::duplex(PIPE_CAPACITY);
        let client = self.clone();
        let cancel = cancel.clone();

        let producer = tokio::spawn(async move {
            let result = client.stream_speech(&cancel, chunks, writer).await;
            if let Err(ref e) = result {
                tracing::error!("Speech synthesis stopped: {}", e);
            }
            result
        });

        Ok(AudioStream::piped(reader, producer))
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}
