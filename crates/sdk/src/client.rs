//! MediaFetch Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{DownloadsSnapshot, Job, OutputDirResponse, SubmitResponse};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;
use tokio::time::Instant;

/// MediaFetch daemon client
///
/// # Example
///
/// ```no_run
/// use mediafetch_sdk::MediaFetchClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MediaFetchClient::connect("http://127.0.0.1:9535").await?;
/// # Ok(())
/// # }
/// ```
pub struct MediaFetchClient {
    client: HttpClient,
}

impl MediaFetchClient {
    /// Connect to the MediaFetch daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9535`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Start one download per URL
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use mediafetch_sdk::MediaFetchClient;
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let client = MediaFetchClient::connect("http://127.0.0.1:9535").await?;
    /// let response = client.submit(vec!["https://example.com/watch?v=1".to_string()]).await?;
    /// println!("{}: {:?}", response.message, response.job_ids);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit(&self, urls: Vec<String>) -> Result<SubmitResponse> {
        let mut params = ObjectParams::new();
        params.insert("urls", urls)?;

        Ok(self.client.request("downloads.submit.v1", params).await?)
    }

    /// Current state of one download
    pub async fn status(&self, job_id: impl Into<String>) -> Result<Job> {
        let mut params = ObjectParams::new();
        params.insert("job_id", job_id.into())?;

        Ok(self.client.request("downloads.status.v1", params).await?)
    }

    /// Active downloads and recent history
    pub async fn list(&self) -> Result<DownloadsSnapshot> {
        Ok(self.client.request("downloads.list.v1", rpc_params![]).await?)
    }

    /// Directory new downloads are saved to
    pub async fn output_dir(&self) -> Result<String> {
        let response: OutputDirResponse =
            self.client.request("settings.output_dir.v1", rpc_params![]).await?;
        Ok(response.path)
    }

    /// Change the directory new downloads are saved to
    pub async fn set_output_dir(&self, path: impl Into<String>) -> Result<String> {
        let mut params = ObjectParams::new();
        params.insert("path", path.into())?;

        let response: OutputDirResponse =
            self.client.request("settings.set_output_dir.v1", params).await?;
        Ok(response.path)
    }

    /// Poll `status` until the job finishes
    ///
    /// # Errors
    /// - SdkError::Timeout if `timeout` elapses first
    /// - any error from `status`, such as an unknown id
    pub async fn wait_for(
        &self,
        job_id: &str,
        poll_interval: Duration,
        timeout: Duration,
    ) -> Result<Job> {
        let deadline = Instant::now() + timeout;
        loop {
            let job = self.status(job_id).await?;
            if job.status.is_terminal() {
                return Ok(job);
            }
            if Instant::now() >= deadline {
                return Err(SdkError::Timeout(format!(
                    "job {} still {:?} after {:?}",
                    job_id, job.status, timeout
                )));
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
