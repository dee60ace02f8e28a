use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::{RequestBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument, warn};

use crate::constants::{self, DOWNLOAD_CHUNK_SIZE};
use crate::error::{MigrationError, Result};

/// Outbound HTTP with the fixed client headers.
///
/// Every call takes its own timeout so metadata, download and submission
/// calls can be bounded differently.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(constants::USER_AGENT));
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;
        Ok(Self { client })
    }

    /// GET returning a JSON body. `api_key`, when non-empty, is sent verbatim
    /// as the `Authorization` header (CKAN's convention).
    #[instrument(skip(self, query, api_key))]
    pub async fn get_json(
        &self,
        url: &str,
        query: &[(&str, String)],
        api_key: &str,
        timeout: Duration,
    ) -> Result<Value> {
        let request = with_api_key(self.client.get(url).query(query), api_key)?;
        let resp = send(request.timeout(timeout), url).await?;
        Ok(resp.json::<Value>().await?)
    }

    /// POST a JSON body with a bearer token, returning the JSON response.
    #[instrument(skip(self, body, bearer))]
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        bearer: &str,
        timeout: Duration,
    ) -> Result<Value> {
        let request = self
            .client
            .post(url)
            .bearer_auth(bearer)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .timeout(timeout);
        let resp = send(request, url).await?;
        Ok(resp.json::<Value>().await?)
    }

    /// POST an unauthenticated JSON body, returning the JSON response.
    pub async fn post_json_anonymous<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
        timeout: Duration,
    ) -> Result<Value> {
        let request = self.client.post(url).json(body).timeout(timeout);
        let resp = send(request, url).await?;
        Ok(resp.json::<Value>().await?)
    }

    /// Streams `url` into `dest`, truncating any existing file. Returns the
    /// number of bytes written. A body that fails midway leaves no file.
    #[instrument(skip(self, api_key))]
    pub async fn download_to(
        &self,
        url: &str,
        dest: &Path,
        api_key: &str,
        timeout: Duration,
    ) -> Result<u64> {
        let request = with_api_key(self.client.get(url), api_key)?;
        let mut resp = send(request.timeout(timeout), url).await?;

        let file = File::create(dest).await?;
        match stream_body(&mut resp, file).await {
            Ok(written) => {
                debug!("Downloaded {} bytes to {}", written, dest.display());
                Ok(written)
            }
            Err(err) => {
                // a truncated file must not look like a staged one
                if let Err(remove_err) = tokio::fs::remove_file(dest).await {
                    warn!("Could not remove partial download {}: {}", dest.display(), remove_err);
                }
                Err(err)
            }
        }
    }

    /// Raw builder access for callers that need extra headers or bodies
    /// (the bridge client's multipart uploads).
    pub fn request(&self, method: reqwest::Method, url: &str) -> RequestBuilder {
        self.client.request(method, url)
    }
}

fn with_api_key(request: RequestBuilder, api_key: &str) -> Result<RequestBuilder> {
    if api_key.is_empty() {
        return Ok(request);
    }
    let value = HeaderValue::from_str(api_key)
        .map_err(|_| MigrationError::Input("API key contains invalid header characters".to_string()))?;
    Ok(request.header(AUTHORIZATION, value))
}

async fn stream_body(resp: &mut Response, file: File) -> Result<u64> {
    let mut writer = BufWriter::with_capacity(DOWNLOAD_CHUNK_SIZE, file);
    let mut written: u64 = 0;
    while let Some(chunk) = resp.chunk().await? {
        if chunk.is_empty() {
            continue;
        }
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    writer.flush().await?;
    Ok(written)
}

/// Sends the request and turns non-success statuses into `Transport` errors.
pub(crate) async fn send(request: RequestBuilder, url: &str) -> Result<Response> {
    let resp = request.send().await?;
    ensure_success(resp, url).await
}

pub(crate) async fn ensure_success(resp: Response, url: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(MigrationError::Transport {
        status: status.as_u16(),
        url: url.to_string(),
        body,
    })
}
