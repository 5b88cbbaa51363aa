mod upload;

pub use upload::encrypted_path;
use {
    crate::{
        Error, Result,
        blob::{BlockUploader, DEFAULT_TIMEOUT, ReqwestTransport, Retrying},
        crypto::PaddingFileEncrypter,
        util::maybe_block_in_place,
    },
    ironbox_protocol::{
        BlockManifest, CheckOutTarget, CipherSpec,
        endpoints::{
            CheckInEntityContainerBlob, CheckOutEntityContainerBlob, ContainerKeyData,
            CreateEntityContainerBlob, EntityCredentials, InvalidKeyData, Ping,
            RequestToResponse,
        },
    },
    reqwest::{StatusCode, Url, header::ACCEPT},
    scopeguard::defer,
    serde::{Serialize, de::DeserializeOwned},
    std::{path::Path, time::Duration},
    tracing::{debug, info, instrument},
    upload::remove_encrypted_copy,
};

pub const DEFAULT_ENDPOINT: &str = "https://api.goironcloud.com/latest/";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Timeout of API requests and base timeout of block uploads.
    pub timeout: Duration,
    /// Number of tries of a storage request that could not be sent.
    pub transport_attempts: usize,
    pub retry_pause: Duration,
}

impl Default for ClientOptions {
    #[inline]
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            transport_attempts: 1,
            retry_pause: Retrying::<ReqwestTransport>::DEFAULT_PAUSE,
        }
    }
}

/// IronBox API client.
///
/// Reuse created client or clone it in order to reuse a connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    reqwest: reqwest::Client,
    endpoint: Url,
    credentials: EntityCredentials,
    uploader: BlockUploader<Retrying<ReqwestTransport>>,
}

#[derive(Serialize)]
struct EntityForm<'a, R> {
    #[serde(flatten)]
    credentials: &'a EntityCredentials,
    #[serde(flatten)]
    request: &'a R,
}

impl Client {
    #[inline]
    pub fn new(endpoint: Url, credentials: EntityCredentials) -> Result<Self> {
        Self::with_options(endpoint, credentials, ClientOptions::default())
    }

    #[inline]
    pub fn with_options(
        mut endpoint: Url,
        credentials: EntityCredentials,
        options: ClientOptions,
    ) -> Result<Self> {
        // Endpoint names are joined to the base path.
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        let reqwest = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        let transport = Retrying::new(
            ReqwestTransport::new(reqwest.clone(), options.timeout),
            options.transport_attempts,
            options.retry_pause,
        );
        Ok(Self {
            reqwest,
            endpoint,
            credentials,
            uploader: BlockUploader::new(transport),
        })
    }

    #[must_use]
    #[inline]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn url(&self, path: &str) -> Result<Url> {
        self.endpoint.join(path).map_err(|source| Error::InvalidUrl {
            url: format!("{}{path}", self.endpoint),
            source,
        })
    }

    /// Checks that the API server is accessible.
    #[instrument(skip_all)]
    #[inline]
    pub async fn ping(&self) -> Result<()> {
        let status = self.reqwest.get(self.url(Ping::PATH)?).send().await?.status();
        if status != StatusCode::OK {
            return Err(Error::ServiceUnavailable {
                endpoint: Ping::PATH,
                status,
            });
        }
        debug!("API server is accessible");
        Ok(())
    }

    /// Sends an API request as a form along with the entity credentials.
    #[instrument(skip_all, fields(endpoint = R::PATH))]
    #[inline(never)]
    pub async fn request<R>(&self, request: &R) -> Result<R::Response>
    where
        R: RequestToResponse + Serialize + Sync,
        R::Response: DeserializeOwned,
    {
        let response = self
            .reqwest
            .post(self.url(R::PATH)?)
            .header(ACCEPT, "application/json")
            .form(&EntityForm {
                credentials: &self.credentials,
                request,
            })
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::ServiceUnavailable {
                endpoint: R::PATH,
                status,
            });
        }
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|err| Error::InvalidResponse {
            endpoint: R::PATH,
            reason: err.to_string(),
        })
    }

    /// Fetches the session key material of the container.
    #[inline]
    pub async fn container_key_data(&self) -> Result<CipherSpec> {
        self.request(&ContainerKeyData {})
            .await?
            .into_cipher_spec()
            .map_err(|err| match err {
                InvalidKeyData::Configuration(err) => Error::Configuration(err),
                err @ (InvalidKeyData::MissingField(_) | InvalidKeyData::Base64 { .. }) => {
                    Error::InvalidResponse {
                        endpoint: ContainerKeyData::PATH,
                        reason: err.to_string(),
                    }
                }
            })
    }

    /// Creates a blob in the container and returns its ID name.
    #[inline]
    pub async fn create_entity_container_blob(&self, blob_name: &str) -> Result<String> {
        let blob_id_name = self
            .request(&CreateEntityContainerBlob {
                blob_name: blob_name.to_owned(),
            })
            .await?;
        if blob_id_name.is_empty() {
            return Err(Error::InvalidResponse {
                endpoint: CreateEntityContainerBlob::PATH,
                reason: "empty blob ID name".into(),
            });
        }
        Ok(blob_id_name)
    }

    /// Checks out a blob so that its content can be uploaded.
    #[inline]
    pub async fn check_out_entity_container_blob(
        &self,
        blob_id_name: &str,
    ) -> Result<CheckOutTarget> {
        let data = self
            .request(&CheckOutEntityContainerBlob {
                blob_id_name: blob_id_name.to_owned(),
            })
            .await?;
        Ok(data.validate()?)
    }

    /// Uploads an encrypted file to the checked-out blob.
    #[inline]
    pub async fn upload_blob(
        &self,
        encrypted_path: impl AsRef<Path>,
        target: &CheckOutTarget,
    ) -> Result<BlockManifest> {
        self.uploader.upload(encrypted_path, target).await
    }

    /// Marks the blob as ready. `original_path` is the unencrypted file; its
    /// size is reported to the service.
    #[inline]
    pub async fn check_in_entity_container_blob(
        &self,
        blob_id_name: &str,
        original_path: impl AsRef<Path>,
        target: &CheckOutTarget,
    ) -> Result<()> {
        let original_path = original_path.as_ref();
        if !original_path.is_file() {
            return Err(Error::FileNotFound(original_path.to_owned()));
        }
        let blob_size_bytes = fs_err::metadata(original_path)?.len();
        let accepted = self
            .request(&CheckInEntityContainerBlob {
                blob_id_name: blob_id_name.to_owned(),
                blob_size_bytes,
                blob_check_in_token: target.check_in_token().to_owned(),
            })
            .await?;
        if !accepted {
            return Err(Error::InvalidResponse {
                endpoint: CheckInEntityContainerBlob::PATH,
                reason: "check-in was not confirmed".into(),
            });
        }
        Ok(())
    }

    /// Uploads a local file to the container under `blob_name`.
    ///
    /// The file is encrypted into a temporary copy next to it, the copy is
    /// uploaded and the blob is checked in. The copy is removed afterwards,
    /// whether the upload succeeded or not.
    #[instrument(skip_all, fields(path = ?path.as_ref(), blob_name = %blob_name))]
    #[inline]
    pub async fn upload_file_to_container(
        &self,
        path: impl AsRef<Path>,
        blob_name: &str,
    ) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        let encrypted_path = encrypted_path(path);

        self.ping().await?;
        let spec = self.container_key_data().await?;
        let encrypter = PaddingFileEncrypter::new(&spec)?;
        let blob_id_name = self.create_entity_container_blob(blob_name).await?;
        let target = self.check_out_entity_container_blob(&blob_id_name).await?;
        debug!(%blob_id_name, "checked out blob");

        defer! {
            remove_encrypted_copy(&encrypted_path);
        }
        let encrypted_size =
            maybe_block_in_place(|| encrypter.encrypt_file(path, &encrypted_path))?;
        info!(encrypted_size, "encrypted local copy of file");

        let manifest = self.upload_blob(&encrypted_path, &target).await?;
        self.check_in_entity_container_blob(&blob_id_name, path, &target)
            .await?;
        info!(%blob_id_name, blocks = manifest.len(), "uploaded file to container");
        Ok(())
    }
}
