use {
    crate::{
        checkout::CheckOutData,
        error::ConfigurationError,
        key::CipherSpec,
    },
    base64::{Engine, prelude::BASE64_STANDARD},
    derivative::Derivative,
    serde::{Deserialize, Serialize, Serializer},
    thiserror::Error,
};

pub trait RequestToResponse {
    type Response;
    const PATH: &'static str;
}
macro_rules! response_type {
    ($request:ty, $response:ty) => {
        impl RequestToResponse for $request {
            type Response = $response;
            const PATH: &'static str = stringify!($request);
        }
    };
}

pub type Response<Request> = <Request as RequestToResponse>::Response;

/// Kind of entity that authenticates against the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EntityType {
    #[default]
    EmailAddress,
    NameIdentifier,
    EntityIdentifier,
}

impl Serialize for EntityType {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(match self {
            Self::EmailAddress => 0,
            Self::NameIdentifier => 1,
            Self::EntityIdentifier => 2,
        })
    }
}

/// Form fields sent with every API request.
#[derive(Clone, Serialize, Derivative)]
#[derivative(Debug)]
#[serde(rename_all = "PascalCase")]
pub struct EntityCredentials {
    pub entity: String,
    pub entity_type: EntityType,
    #[derivative(Debug = "ignore")]
    pub entity_password: String,
    #[serde(rename = "ContainerID")]
    pub container_id: i64,
}

/// Checks that the API server responds. Sent with GET and no form fields.
#[derive(Debug, Serialize)]
pub struct Ping {}
response_type!(Ping, bool);

/// Returns the session key material of the container.
#[derive(Debug, Serialize)]
pub struct ContainerKeyData {}
response_type!(ContainerKeyData, ContainerKeyDataResponse);

/// Creates a blob in the container and returns its ID name.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateEntityContainerBlob {
    pub blob_name: String,
}
response_type!(CreateEntityContainerBlob, String);

/// Reserves the blob for uploading its content.
#[derive(Debug, Serialize)]
pub struct CheckOutEntityContainerBlob {
    #[serde(rename = "BlobIDName")]
    pub blob_id_name: String,
}
response_type!(CheckOutEntityContainerBlob, CheckOutData);

/// Marks a checked-out blob as ready. Must only be sent after the block list
/// has been committed.
#[derive(Serialize, Derivative)]
#[derivative(Debug)]
#[serde(rename_all = "PascalCase")]
pub struct CheckInEntityContainerBlob {
    #[serde(rename = "BlobIDName")]
    pub blob_id_name: String,
    /// Size of the original (unencrypted) file.
    pub blob_size_bytes: u64,
    #[derivative(Debug = "ignore")]
    pub blob_check_in_token: String,
}
response_type!(CheckInEntityContainerBlob, bool);

#[derive(Default, Clone, Deserialize, Derivative)]
#[derivative(Debug)]
pub struct ContainerKeyDataResponse {
    #[serde(rename = "SessionKeyBase64")]
    #[derivative(Debug = "ignore")]
    pub session_key_base64: Option<String>,
    #[serde(rename = "SessionIVBase64")]
    #[derivative(Debug = "ignore")]
    pub session_iv_base64: Option<String>,
    #[serde(rename = "SymmetricKeyStrength")]
    pub symmetric_key_strength: Option<i64>,
}

#[derive(Debug, Error)]
pub enum InvalidKeyData {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` is not valid base64")]
    Base64 {
        field: &'static str,
        #[source]
        source: base64::DecodeError,
    },
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl ContainerKeyDataResponse {
    /// Decodes the key material. Nothing is used before all three fields are
    /// present and decodable.
    #[inline]
    pub fn into_cipher_spec(self) -> Result<CipherSpec, InvalidKeyData> {
        let key = self
            .session_key_base64
            .ok_or(InvalidKeyData::MissingField("SessionKeyBase64"))?;
        let iv = self
            .session_iv_base64
            .ok_or(InvalidKeyData::MissingField("SessionIVBase64"))?;
        let key_strength = self
            .symmetric_key_strength
            .ok_or(InvalidKeyData::MissingField("SymmetricKeyStrength"))?;
        let key = decode_base64("SessionKeyBase64", &key)?;
        let iv = decode_base64("SessionIVBase64", &iv)?;
        Ok(CipherSpec::new(key, iv, key_strength)?)
    }
}

fn decode_base64(field: &'static str, value: &str) -> Result<Vec<u8>, InvalidKeyData> {
    BASE64_STANDARD
        .decode(value)
        .map_err(|source| InvalidKeyData::Base64 { field, source })
}
