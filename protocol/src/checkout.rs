use {
    crate::{
        blob::BlockId,
        error::{ConfigurationError, MissingFields},
    },
    derivative::Derivative,
    serde::Deserialize,
    url::Url,
};

/// Check-out response as received from the service. Any field may be absent.
#[derive(Default, Clone, Deserialize, Derivative)]
#[derivative(Debug)]
#[serde(rename_all = "PascalCase")]
pub struct CheckOutData {
    #[derivative(Debug = "ignore")]
    pub shared_access_signature: Option<String>,
    #[derivative(Debug = "ignore")]
    pub shared_access_signature_uri: Option<String>,
    #[derivative(Debug = "ignore")]
    pub check_in_token: Option<String>,
    pub storage_uri: Option<String>,
    pub storage_type: Option<i64>,
    pub container_storage_name: Option<String>,
}

impl CheckOutData {
    /// Turns the response into a [`CheckOutTarget`], reporting every absent field.
    #[inline]
    pub fn validate(self) -> Result<CheckOutTarget, ConfigurationError> {
        match self {
            Self {
                shared_access_signature: Some(shared_access_signature),
                shared_access_signature_uri: Some(shared_access_signature_uri),
                check_in_token: Some(check_in_token),
                storage_uri: Some(storage_uri),
                storage_type: Some(storage_type),
                container_storage_name: Some(container_storage_name),
            } => {
                check_sas_uri(&shared_access_signature_uri)?;
                Ok(CheckOutTarget {
                    shared_access_signature,
                    shared_access_signature_uri,
                    check_in_token,
                    storage_uri,
                    storage_type,
                    container_storage_name,
                })
            }
            data => {
                let mut missing = MissingFields::default();
                missing.check("shared_access_signature", data.shared_access_signature.as_ref());
                missing.check(
                    "shared_access_signature_uri",
                    data.shared_access_signature_uri.as_ref(),
                );
                missing.check("check_in_token", data.check_in_token.as_ref());
                missing.check("storage_uri", data.storage_uri.as_ref());
                missing.check("storage_type", data.storage_type.as_ref());
                missing.check("container_storage_name", data.container_storage_name.as_ref());
                Err(missing.into_error())
            }
        }
    }
}

/// Blob destination reserved by a check-out. Immutable once validated.
#[derive(Clone, PartialEq, Eq, Derivative)]
#[derivative(Debug)]
pub struct CheckOutTarget {
    #[derivative(Debug = "ignore")]
    shared_access_signature: String,
    #[derivative(Debug = "ignore")]
    shared_access_signature_uri: String,
    #[derivative(Debug = "ignore")]
    check_in_token: String,
    storage_uri: String,
    storage_type: i64,
    container_storage_name: String,
}

impl CheckOutTarget {
    #[must_use]
    #[inline]
    pub fn shared_access_signature(&self) -> &str {
        &self.shared_access_signature
    }

    #[must_use]
    #[inline]
    pub fn shared_access_signature_uri(&self) -> &str {
        &self.shared_access_signature_uri
    }

    #[must_use]
    #[inline]
    pub fn check_in_token(&self) -> &str {
        &self.check_in_token
    }

    #[must_use]
    #[inline]
    pub fn storage_uri(&self) -> &str {
        &self.storage_uri
    }

    #[must_use]
    #[inline]
    pub const fn storage_type(&self) -> i64 {
        self.storage_type
    }

    #[must_use]
    #[inline]
    pub fn container_storage_name(&self) -> &str {
        &self.container_storage_name
    }

    /// URI of a single block upload. The block ID is appended unescaped.
    #[must_use]
    #[inline]
    pub fn block_url(&self, block_id: &BlockId) -> String {
        format!(
            "{}&comp=block&blockid={}",
            self.shared_access_signature_uri,
            block_id.to_base64()
        )
    }

    #[must_use]
    #[inline]
    pub fn block_list_url(&self) -> String {
        format!("{}&comp=blockList", self.shared_access_signature_uri)
    }
}

// Block and commit parameters are appended with `&`, so the URI must already
// carry the signature query.
fn check_sas_uri(value: &str) -> Result<(), ConfigurationError> {
    let url = Url::parse(value).map_err(|err| ConfigurationError::InvalidSasUri(err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigurationError::InvalidSasUri(format!(
            "unsupported scheme `{}`",
            url.scheme()
        )));
    }
    if url.query().is_none_or(str::is_empty) {
        return Err(ConfigurationError::InvalidSasUri(
            "missing signature query".into(),
        ));
    }
    Ok(())
}
