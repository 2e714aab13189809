//! HTML-to-PDF rendering is delegated to an external service — the spec
//! treats it as a collaborator interface, not something this core raster's
//! itself. `ExportRenderer` is the port; `HttpRenderer` the real
//! implementation over `reqwest`, `NullRenderer` a test double.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const RENDER_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RenderOptions {
    pub page_size: Option<String>,
    pub landscape: bool,
    pub margin_mm: Option<f32>,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer endpoint not configured")]
    NotReady,

    #[error("request to renderer failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("renderer returned status {status}: {body}")]
    BadStatus { status: u16, body: String },
}

#[async_trait]
pub trait ExportRenderer: Send + Sync {
    async fn render_html(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError>;

    /// Cheap precondition check (endpoint configured), not a live health
    /// probe of the remote service.
    fn ready(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    html: &'a str,
    #[serde(flatten)]
    options: &'a RenderOptions,
}

pub struct HttpRenderer {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpRenderer {
    pub fn new(endpoint: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(RENDER_TIMEOUT)
            .build()
            .expect("reqwest client with a fixed timeout never fails to build");

        Self {
            client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ExportRenderer for HttpRenderer {
    async fn render_html(&self, html: &str, options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        if !self.ready() {
            return Err(RenderError::NotReady);
        }

        let response = self
            .client
            .post(self.endpoint.as_str())
            .json(&RenderRequest { html, options })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), endpoint = %self.endpoint, "render request rejected");
            return Err(RenderError::BadStatus { status: status.as_u16(), body });
        }

        Ok(response.bytes().await?.to_vec())
    }

    fn ready(&self) -> bool {
        !self.endpoint.is_empty()
    }
}

/// Passthrough test double: returns the HTML unchanged as bytes, taking
/// no network dependency.
#[derive(Debug, Default)]
pub struct NullRenderer;

#[async_trait]
impl ExportRenderer for NullRenderer {
    async fn render_html(&self, html: &str, _options: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        Ok(html.as_bytes().to_vec())
    }

    fn ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn null_renderer_echoes_the_input_html() {
        let renderer = NullRenderer;
        let out = renderer.render_html("<html></html>", &RenderOptions::default()).await.unwrap();
        assert_eq!(out, b"<html></html>");
    }

    #[test]
    fn http_renderer_is_not_ready_without_an_endpoint() {
        let renderer = HttpRenderer::new("");
        assert!(!renderer.ready());
    }

    #[test]
    fn http_renderer_is_ready_with_an_endpoint() {
        let renderer = HttpRenderer::new("https://render.internal/pdf");
        assert!(renderer.ready());
    }
}
