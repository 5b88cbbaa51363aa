use {
    crate::{Error, Result},
    bytes::Bytes,
    ironbox_protocol::{BlockId, BlockManifest, CheckOutTarget, blob::STORAGE_API_VERSION},
    reqwest::{StatusCode, Url},
    std::{
        fmt::{self, Debug},
        future::Future,
        time::Duration,
    },
    tokio::time::sleep,
    tracing::warn,
};

/// A single PUT request to the blob storage.
#[derive(Clone)]
pub struct PutRequest {
    pub url: String,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Bytes,
}

impl PutRequest {
    /// Uploads one block of the blob.
    #[must_use]
    #[inline]
    pub fn block(target: &CheckOutTarget, block_id: &BlockId, body: Bytes) -> Self {
        Self {
            url: target.block_url(block_id),
            headers: vec![
                ("content-type", "application/octet-stream"),
                ("x-ms-blob-type", "BlockBlob"),
                ("x-ms-version", STORAGE_API_VERSION),
            ],
            body,
        }
    }

    /// Commits the uploaded blocks in manifest order.
    #[must_use]
    #[inline]
    pub fn block_list(target: &CheckOutTarget, manifest: &BlockManifest) -> Self {
        Self {
            url: target.block_list_url(),
            headers: vec![
                ("content-type", "text/xml"),
                ("x-ms-version", STORAGE_API_VERSION),
            ],
            body: Bytes::from(manifest.to_xml()),
        }
    }
}

// The URL carries the access signature.
impl Debug for PutRequest {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PutRequest")
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish_non_exhaustive()
    }
}

/// Sends requests to the blob storage.
///
/// Implementations return the response status; interpreting it is up to the caller.
pub trait BlobTransport {
    fn put(&self, request: PutRequest) -> impl Future<Output = Result<StatusCode>> + Send;
}

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[must_use]
#[inline]
pub fn upload_timeout(base: Duration, upload_size: usize) -> Duration {
    // Assuming upload speed above 1 MB/s.
    base.saturating_add(Duration::from_micros(
        u64::try_from(upload_size).unwrap_or(u64::MAX),
    ))
}

/// Sends blob requests over HTTP.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    reqwest: reqwest::Client,
    timeout: Duration,
}

impl ReqwestTransport {
    #[must_use]
    #[inline]
    pub const fn new(reqwest: reqwest::Client, timeout: Duration) -> Self {
        Self { reqwest, timeout }
    }
}

impl BlobTransport for ReqwestTransport {
    #[inline]
    async fn put(&self, request: PutRequest) -> Result<StatusCode> {
        let url = Url::parse(&request.url).map_err(|source| Error::InvalidUrl {
            url: request.url.clone(),
            source,
        })?;
        let mut builder = self
            .reqwest
            .put(url)
            .timeout(upload_timeout(self.timeout, request.body.len()));
        for (name, value) in request.headers {
            builder = builder.header(name, value);
        }
        let response = builder.body(request.body).send().await?;
        Ok(response.status())
    }
}

/// Retries requests that failed to reach the storage.
///
/// A received status, successful or not, is never retried. With `attempts`
/// equal to 1 every request is sent exactly once.
#[derive(Debug, Clone)]
pub struct Retrying<T> {
    inner: T,
    attempts: usize,
    pause: Duration,
}

impl<T> Retrying<T> {
    pub const DEFAULT_PAUSE: Duration = Duration::from_secs(10);

    #[must_use]
    #[inline]
    pub fn new(inner: T, attempts: usize, pause: Duration) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            pause,
        }
    }

    #[must_use]
    #[inline]
    pub const fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: BlobTransport + Sync> BlobTransport for Retrying<T> {
    #[inline]
    async fn put(&self, request: PutRequest) -> Result<StatusCode> {
        let mut attempt = 0_usize;
        loop {
            attempt = attempt.saturating_add(1);
            let err = match self.inner.put(request.clone()).await {
                Err(err) if err.is_transport_failure() && attempt < self.attempts => err,
                result => break result,
            };
            warn!(error = %err, attempt, "transport failed, will retry");
            sleep(self.pause).await;
        }
    }
}
