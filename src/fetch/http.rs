// src/fetch/http.rs
// =============================================================================
// The real Fetcher, backed by one shared reqwest::Client.
//
// The client is built once at startup and cloned into every seed's task
// (reqwest::Client is a cheap, reference-counted handle with a shared
// connection pool).
//
// Media types are compared on the part of the Content-Type header before
// any ';' parameters, so "text/html; charset=utf-8" counts as text/html.
// =============================================================================

use async_trait::async_trait;
use reqwest::{header, Client, Response, StatusCode};
use tracing::debug;

use super::Fetcher;
use crate::config::CrawlConfig;
use crate::error::FetchError;

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::Client)?;
        Ok(HttpFetcher { client })
    }

    async fn get(&self, url: &str) -> Result<Response, FetchError> {
        debug!(url, "GET");
        self.client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            })
    }
}

// Extracts "text/html" out of "Text/HTML; charset=utf-8"
fn media_type(response: &Response) -> String {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|value| value.trim().to_ascii_lowercase())
        .unwrap_or_default()
}

fn expect_media_type(response: &Response, url: &str, expected: &'static str) -> Result<(), FetchError> {
    let found = media_type(response);
    if found == expected {
        Ok(())
    } else {
        Err(FetchError::ContentType {
            url: url.to_string(),
            expected,
            found,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.get(url).await?;

        let status = response.status();
        if status.is_client_error() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        expect_media_type(&response, url, "text/html")?;

        let body = response.bytes().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })?;
        Ok(body.to_vec())
    }

    async fn fetch_robots(&self, url: &str) -> Result<String, FetchError> {
        let response = self.get(url).await?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(String::new()),
            StatusCode::FORBIDDEN => {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: StatusCode::FORBIDDEN.as_u16(),
                })
            }
            _ => {}
        }
        expect_media_type(&response, url, "text/plain")?;

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&CrawlConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_page_returns_html_body() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/page")
            .with_status(200)
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<p>hello</p>")
            .create_async()
            .await;

        let body = fetcher()
            .fetch_page(&format!("{}/page", server.url()))
            .await
            .unwrap();
        assert_eq!(body, b"<p>hello</p>");
    }

    #[tokio::test]
    async fn test_page_client_error_fails() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/missing")
            .with_status(404)
            .with_header("content-type", "text/html")
            .create_async()
            .await;

        let err = fetcher()
            .fetch_page(&format!("{}/missing", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_page_must_be_html() {
        let mut server = Server::new_async().await;
        let _page = server
            .mock("GET", "/data.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body("{}")
            .create_async()
            .await;

        let err = fetcher()
            .fetch_page(&format!("{}/data.json", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ContentType { expected: "text/html", .. }));
    }

    #[tokio::test]
    async fn test_missing_robots_is_empty() {
        let mut server = Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(404)
            .create_async()
            .await;

        let body = fetcher()
            .fetch_robots(&format!("{}/robots.txt", server.url()))
            .await
            .unwrap();
        assert_eq!(body, "");
    }

    #[tokio::test]
    async fn test_forbidden_robots_is_an_error() {
        let mut server = Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(403)
            .with_header("content-type", "text/plain")
            .create_async()
            .await;

        let err = fetcher()
            .fetch_robots(&format!("{}/robots.txt", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_robots_body_returned() {
        let mut server = Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_header("content-type", "text/plain; charset=utf-8")
            .with_body("User-agent: *\nDisallow: /private\n")
            .create_async()
            .await;

        let body = fetcher()
            .fetch_robots(&format!("{}/robots.txt", server.url()))
            .await
            .unwrap();
        assert!(body.contains("Disallow: /private"));
    }

    #[tokio::test]
    async fn test_robots_must_be_plain_text() {
        let mut server = Server::new_async().await;
        let _robots = server
            .mock("GET", "/robots.txt")
            .with_status(200)
            .with_header("content-type", "text/html")
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = fetcher()
            .fetch_robots(&format!("{}/robots.txt", server.url()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::ContentType { expected: "text/plain", .. }));
    }
}
