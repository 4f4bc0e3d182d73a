use std::time::Duration;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use tokio::time::Instant;
use tracing::debug;

use crate::errors::{Result, VidmillError};
use crate::models::{job_from_value, ErrorEnvelope, Job, Metadata, WaitOptions};

const DEFAULT_BASE_URL: &str = "https://api.vidmill.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Builder for constructing a [`Client`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use vidmill::ClientBuilder;
/// use std::time::Duration;
///
/// # fn example() -> vidmill::Result<()> {
/// let client = ClientBuilder::new()
///     .api_key("vm_live_abc123")
///     .base_url("https://custom.example.com/v1")
///     .timeout(Duration::from_secs(120))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
}

impl ClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Override the base URL (defaults to `https://api.vidmill.com/v1`).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the HTTP request timeout (defaults to 60 seconds).
    pub fn timeout(mut self, d: Duration) -> Self {
        self.timeout = d;
        self
    }

    /// Build the [`Client`].
    ///
    /// If no API key was set via [`api_key`](Self::api_key), the builder will
    /// attempt to read the `VIDMILL_API_KEY` environment variable.
    ///
    /// Returns [`VidmillError::Authentication`] if no key is available.
    pub fn build(self) -> Result<Client> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("VIDMILL_API_KEY").ok())
            .ok_or_else(|| VidmillError::Authentication {
                message: "API key is required. Pass it to ClientBuilder::api_key() \
                          or set the VIDMILL_API_KEY environment variable."
                    .into(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(VidmillError::Http)?;

        Ok(Client {
            base_url: self.base_url.trim_end_matches('/').to_string(),
            api_key,
            http,
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// The Vidmill API client.
///
/// Use [`Client::new`] for quick construction or [`ClientBuilder`] for full
/// control.
///
/// # Example
///
/// ```no_run
/// use vidmill::{Client, ConfigBuilder};
///
/// # async fn example() -> vidmill::Result<()> {
/// let client = Client::new("vm_live_abc123");
///
/// let config = ConfigBuilder::new()
///     .source("https://example.com/video.mp4")
///     .output("mp4", "s3://a:s@bucket/video.mp4")
///     .build()?;
///
/// // Submit and poll until the encoding finishes
/// let job = client.encode(&config, None).await?;
/// println!("mp4 at {:?}", job.output_url("mp4"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl Client {
    /// Create a new client with the given API key and default settings.
    ///
    /// For customization, use [`ClientBuilder`] instead.
    pub fn new(api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .expect("failed to build HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key,
            http,
        }
    }

    /// Submit a configuration document and return the created [`Job`].
    ///
    /// The returned job starts in "processing" status; use
    /// [`get_job`](Self::get_job) to track it, [`wait`](Self::wait) to block
    /// until it is terminal, or [`encode`](Self::encode) for a one-call
    /// submit-and-wait workflow.
    ///
    /// # Errors
    ///
    /// [`VidmillError::Service`] with the service's `error_code` (e.g.
    /// `config_not_valid`) when the document is rejected.
    pub async fn submit(&self, config: &str) -> Result<Job> {
        let url = format!("{}/job", self.base_url);
        let req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "text/plain")
            .body(config.to_string());

        let (status_code, val) = self.send(req).await?;

        // The service reports some rejections in a 2xx body rather than an
        // HTTP error status.
        let envelope: ErrorEnvelope = serde_json::from_value(val.clone()).unwrap_or_default();
        if envelope.status.as_deref() == Some("error") {
            return Err(VidmillError::Service {
                status_code,
                error_code: envelope.error_code,
                message: envelope
                    .message
                    .unwrap_or_else(|| "job was rejected".to_string()),
                body: Some(val),
            });
        }

        let job = job_from_value(val);
        debug!(job_id = job.id, "job submitted");
        Ok(job)
    }

    /// Fetch the current state of a job by its identifier.
    pub async fn get_job(&self, job_id: u64) -> Result<Job> {
        let url = format!("{}/jobs/{job_id}", self.base_url);
        let (_, val) = self.send(self.http.get(&url)).await?;
        Ok(job_from_value(val))
    }

    /// Retrieve probed metadata for a job's source file and all finished
    /// outputs.
    ///
    /// Returns `None` while the service has not probed anything yet (the
    /// endpoint responds with JSON `null` until then).
    pub async fn get_all_metadata(&self, job_id: u64) -> Result<Option<Metadata>> {
        let url = format!("{}/metadata/jobs/{job_id}", self.base_url);
        let (_, val) = self.send(self.http.get(&url)).await?;

        if val.is_null() {
            return Ok(None);
        }
        Ok(Some(Metadata { raw: val }))
    }

    /// Retrieve probed metadata for a single target: `"source"` or an output
    /// format name such as `"mp4"`.
    ///
    /// Returns `None` while that target has not been probed yet.
    pub async fn get_metadata_for(
        &self,
        job_id: u64,
        target: &str,
    ) -> Result<Option<serde_json::Value>> {
        let url = format!("{}/metadata/jobs/{job_id}/{target}", self.base_url);
        let (_, val) = self.send(self.http.get(&url)).await?;

        if val.is_null() {
            return Ok(None);
        }
        Ok(Some(val))
    }

    /// Submit a configuration document and poll until the job reaches a
    /// terminal status.
    ///
    /// # Errors
    ///
    /// - [`VidmillError::JobFailed`] if the job reaches "error" status.
    /// - [`VidmillError::Timeout`] if polling exceeds the configured timeout.
    pub async fn encode(&self, config: &str, opts: Option<WaitOptions>) -> Result<Job> {
        let job = self.submit(config).await?;
        let opts = opts.unwrap_or_default();
        self.wait(job.id, &opts).await
    }

    /// Poll a job until it reaches a terminal status or the timeout is
    /// exceeded. Returns the completed [`Job`].
    pub async fn wait(&self, job_id: u64, opts: &WaitOptions) -> Result<Job> {
        let deadline = Instant::now() + opts.timeout;

        loop {
            let job = self.get_job(job_id).await?;

            if let Some(ref cb) = opts.on_progress {
                cb(&job);
            }

            if job.is_failed() {
                return Err(VidmillError::JobFailed(format!(
                    "job {} failed: {}",
                    job.id,
                    job.error_code.as_deref().unwrap_or("unknown error")
                )));
            }

            if job.is_complete() {
                return Ok(job);
            }

            if Instant::now() >= deadline {
                return Err(VidmillError::Timeout(opts.timeout));
            }

            tokio::time::sleep(opts.poll_interval).await;
        }
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    /// Attach authentication, execute one request, and map error responses
    /// to typed errors. Exactly one attempt per call; retry policy belongs
    /// to the caller.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<(u16, serde_json::Value)> {
        let response = req
            .header(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                    .expect("invalid API key characters"),
            )
            .send()
            .await
            .map_err(VidmillError::Http)?;

        let status = response.status();
        let status_code = status.as_u16();

        if status.is_success() {
            let val = response.json().await.map_err(VidmillError::Http)?;
            return Ok((status_code, val));
        }

        let response_text = response.text().await.unwrap_or_default();
        let parsed_body: Option<serde_json::Value> = serde_json::from_str(&response_text).ok();

        let envelope: ErrorEnvelope = parsed_body
            .as_ref()
            .and_then(|b| serde_json::from_value(b.clone()).ok())
            .unwrap_or_default();

        let message = envelope
            .message
            .unwrap_or_else(|| response_text.clone());

        debug!(status_code, error_code = ?envelope.error_code, "request failed");

        Err(match status_code {
            401 => VidmillError::Authentication { message },
            404 => VidmillError::NotFound { message },
            _ => VidmillError::Service {
                status_code,
                error_code: envelope.error_code,
                message,
                body: parsed_body,
            },
        })
    }
}
