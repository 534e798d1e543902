//! HTTP clients and page fetching
//!
//! Two explicitly constructed clients: the page client the engine fetches
//! HTML with, and the image client the downloader uses, which is the only
//! one that honors the optional proxy.

use reqwest::{Client, Proxy};
use std::time::Duration;
use url::Url;

/// Result of fetching one page
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched an HTML page
    Html {
        /// Final URL after redirects
        final_url: String,
        /// Page body
        body: String,
    },

    /// The response is not HTML
    NotHtml { content_type: String },

    /// Non-success HTTP status
    HttpError { status_code: u16 },

    /// Connection, timeout, or body-read failure
    NetworkError { error: String },
}

fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

/// Builds the client used for page fetches
pub fn build_page_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Builds the client used for image downloads
///
/// The proxy, when configured, applies to this client only; page fetches
/// never go through it.
pub fn build_image_client(proxy: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(user_agent())
        .timeout(Duration::from_secs(60))
        .connect_timeout(Duration::from_secs(10));

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Fetches one page and classifies the result
pub async fn fetch_page(client: &Client, url: &Url) -> FetchResult {
    let response = match client.get(url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "request timeout".to_string()
            } else if e.is_connect() {
                "connection failed".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::NetworkError { error };
        }
    };

    let status = response.status();
    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("")
        .to_string();

    if !content_type.contains("text/html") {
        return FetchResult::NotHtml { content_type };
    }

    let final_url = response.url().to_string();
    match response.text().await {
        Ok(body) => FetchResult::Html { final_url, body },
        Err(e) => FetchResult::NetworkError {
            error: e.to_string(),
        },
    }
}
