//! Client for the sketch-to-image generation endpoint.

use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use thiserror::Error;

/// Default generation endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/generate-image";

/// Generation errors.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("response did not contain an image URL")]
    MissingImage,
    #[error("could not start request worker: {0}")]
    Spawn(String),
}

/// Where the last generation request stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GenerationStatus {
    #[default]
    Idle,
    Pending,
    Succeeded { image_url: String },
    Failed(String),
}

impl GenerationStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Short text for the toolbar.
    pub fn label(&self) -> String {
        match self {
            Self::Idle => String::new(),
            Self::Pending => "Generating...".to_string(),
            Self::Succeeded { .. } => "Image generated".to_string(),
            Self::Failed(message) => format!("Generation failed: {}", message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(rename = "imageUrl")]
    image_url: Option<String>,
    error: Option<String>,
}

/// Posts sketches to the endpoint on a worker thread.
pub struct GenerationClient {
    endpoint: String,
    status: GenerationStatus,
    sender: Sender<Result<String, GenerateError>>,
    receiver: Receiver<Result<String, GenerateError>>,
}

impl GenerationClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let (sender, receiver) = channel();
        Self {
            endpoint: endpoint.into(),
            status: GenerationStatus::Idle,
            sender,
            receiver,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn status(&self) -> &GenerationStatus {
        &self.status
    }

    /// Send a PNG snapshot. Ignored while a request is already in flight.
    pub fn submit(&mut self, png: Vec<u8>) {
        if self.status.is_pending() {
            log::debug!("Generation already in progress");
            return;
        }

        let endpoint = self.endpoint.clone();
        let sender = self.sender.clone();
        let spawned = thread::Builder::new()
            .name("inkboard-generate".to_string())
            .spawn(move || {
                let _ = sender.send(post_sketch(&endpoint, png));
            });

        self.status = match spawned {
            Ok(_) => {
                log::info!("Sent sketch to {}", self.endpoint);
                GenerationStatus::Pending
            }
            Err(e) => {
                let err = GenerateError::Spawn(e.to_string());
                log::error!("{}", err);
                GenerationStatus::Failed(err.to_string())
            }
        };
    }

    /// Apply a finished request, if any. Returns true when the status changed.
    pub fn poll(&mut self) -> bool {
        let Ok(result) = self.receiver.try_recv() else {
            return false;
        };
        self.status = match result {
            Ok(image_url) => {
                log::info!("Generation succeeded");
                GenerationStatus::Succeeded { image_url }
            }
            Err(e) => {
                log::error!("Generation failed: {}", e);
                GenerationStatus::Failed(e.to_string())
            }
        };
        true
    }
}

fn post_sketch(endpoint: &str, png: Vec<u8>) -> Result<String, GenerateError> {
    let part = multipart::Part::bytes(png)
        .file_name("sketch.png")
        .mime_str("image/png")?;
    let form = multipart::Form::new().part("image", part);

    let response = Client::new().post(endpoint).multipart(form).send()?;
    let status = response.status();
    let body = response.text()?;
    let parsed: Option<GenerateResponse> = serde_json::from_str(&body).ok();

    if !status.is_success() {
        let message = parsed
            .and_then(|r| r.error)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        return Err(GenerateError::Status {
            status: status.as_u16(),
            message,
        });
    }

    parsed
        .and_then(|r| r.image_url)
        .ok_or(GenerateError::MissingImage)
}
