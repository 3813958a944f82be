//! Discord webhook delivery — posts the rendered report as a file attachment.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use serde_json::json;
use tracing::info;

use crate::errors::AppError;

/// Message posted alongside the PDF.
pub const DEFAULT_CAPTION: &str = "Here's your curated content 🚀";

#[derive(Clone)]
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Uploads `pdf_path` with `caption` as a single multipart POST.
    pub async fn send_report(&self, pdf_path: &Path, caption: &str) -> Result<(), AppError> {
        let bytes = tokio::fs::read(pdf_path).await.map_err(|e| {
            AppError::Delivery(format!("failed to read {}: {e}", pdf_path.display()))
        })?;
        let file_name = pdf_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string());

        let file_part = Part::bytes(bytes)
            .file_name(file_name.clone())
            .mime_str("application/pdf")
            .map_err(|e| AppError::Delivery(format!("invalid attachment mime type: {e}")))?;

        let form = Form::new()
            .text("payload_json", json!({ "content": caption }).to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("failed to reach webhook: {e}")))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "webhook returned {status}: {body}"
            )));
        }

        info!("Delivered {file_name} to Discord webhook");
        Ok(())
    }
}
