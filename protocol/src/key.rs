use {
    crate::error::{ConfigurationError, MissingFields},
    derivative::Derivative,
    derive_more::Display,
};

/// Length of the CBC initialization vector, equal to the AES block size.
pub const IV_LEN: usize = 16;

/// Cipher selected by the key-issuing service for a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum CipherKind {
    #[display("AES-128-CBC")]
    Aes128Cbc,
    #[display("AES-256-CBC")]
    Aes256Cbc,
}

impl CipherKind {
    #[must_use]
    #[inline]
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128Cbc => 16,
            Self::Aes256Cbc => 32,
        }
    }
}

/// Key strength selector as reported by the service.
///
/// The selector determines the cipher: `1` is AES-128-CBC, `2` is AES-256-CBC.
/// No other selector is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyStrength {
    Aes128,
    Aes256,
}

impl KeyStrength {
    #[must_use]
    #[inline]
    pub const fn cipher(self) -> CipherKind {
        match self {
            Self::Aes128 => CipherKind::Aes128Cbc,
            Self::Aes256 => CipherKind::Aes256Cbc,
        }
    }

    #[must_use]
    #[inline]
    pub const fn selector(self) -> i64 {
        match self {
            Self::Aes128 => 1,
            Self::Aes256 => 2,
        }
    }
}

impl TryFrom<i64> for KeyStrength {
    type Error = ConfigurationError;

    #[inline]
    fn try_from(selector: i64) -> Result<Self, Self::Error> {
        match selector {
            1 => Ok(Self::Aes128),
            2 => Ok(Self::Aes256),
            other => Err(ConfigurationError::InvalidKeyStrength(other)),
        }
    }
}

/// Symmetric key material for one upload session.
///
/// Can only be obtained through [`CipherSpecBuilder::build`], so every field is
/// present and the key and IV lengths match the cipher.
#[derive(Clone, PartialEq, Eq, Derivative)]
#[derivative(Debug)]
pub struct CipherSpec {
    cipher: CipherKind,
    key_strength: KeyStrength,
    #[derivative(Debug = "ignore")]
    symmetric_key: Vec<u8>,
    #[derivative(Debug = "ignore")]
    initialization_vector: Vec<u8>,
}

impl CipherSpec {
    #[inline]
    pub fn new(
        symmetric_key: impl Into<Vec<u8>>,
        initialization_vector: impl Into<Vec<u8>>,
        key_strength: i64,
    ) -> Result<Self, ConfigurationError> {
        CipherSpecBuilder::default()
            .symmetric_key(symmetric_key)
            .initialization_vector(initialization_vector)
            .key_strength(key_strength)?
            .build()
    }

    #[must_use]
    #[inline]
    pub fn builder() -> CipherSpecBuilder {
        CipherSpecBuilder::default()
    }

    #[must_use]
    #[inline]
    pub const fn cipher(&self) -> CipherKind {
        self.cipher
    }

    #[must_use]
    #[inline]
    pub const fn key_strength(&self) -> KeyStrength {
        self.key_strength
    }

    #[must_use]
    #[inline]
    pub fn symmetric_key(&self) -> &[u8] {
        &self.symmetric_key
    }

    #[must_use]
    #[inline]
    pub fn initialization_vector(&self) -> &[u8] {
        &self.initialization_vector
    }
}

#[derive(Default, Clone, Derivative)]
#[derivative(Debug)]
pub struct CipherSpecBuilder {
    #[derivative(Debug = "ignore")]
    symmetric_key: Option<Vec<u8>>,
    #[derivative(Debug = "ignore")]
    initialization_vector: Option<Vec<u8>>,
    key_strength: Option<KeyStrength>,
}

impl CipherSpecBuilder {
    #[must_use]
    #[inline]
    pub fn symmetric_key(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.symmetric_key = Some(value.into());
        self
    }

    #[must_use]
    #[inline]
    pub fn initialization_vector(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.initialization_vector = Some(value.into());
        self
    }

    /// Fails immediately on a selector other than 1 or 2.
    #[inline]
    pub fn key_strength(mut self, selector: i64) -> Result<Self, ConfigurationError> {
        self.key_strength = Some(KeyStrength::try_from(selector)?);
        Ok(self)
    }

    #[inline]
    pub fn build(self) -> Result<CipherSpec, ConfigurationError> {
        match (
            self.symmetric_key,
            self.initialization_vector,
            self.key_strength,
        ) {
            (Some(symmetric_key), Some(initialization_vector), Some(key_strength)) => {
                let cipher = key_strength.cipher();
                check_len("symmetric_key", cipher, cipher.key_len(), &symmetric_key)?;
                check_len("initialization_vector", cipher, IV_LEN, &initialization_vector)?;
                Ok(CipherSpec {
                    cipher,
                    key_strength,
                    symmetric_key,
                    initialization_vector,
                })
            }
            (symmetric_key, initialization_vector, key_strength) => {
                let mut missing = MissingFields::default();
                missing.check("symmetric_key", symmetric_key.as_ref());
                missing.check("initialization_vector", initialization_vector.as_ref());
                missing.check("key_strength", key_strength.as_ref());
                // The cipher is derived from the key strength.
                missing.check("cipher", key_strength.map(KeyStrength::cipher).as_ref());
                Err(missing.into_error())
            }
        }
    }
}

fn check_len(
    field: &'static str,
    cipher: CipherKind,
    expected: usize,
    value: &[u8],
) -> Result<(), ConfigurationError> {
    if value.len() == expected {
        Ok(())
    } else {
        Err(ConfigurationError::InvalidLength {
            field,
            cipher,
            expected,
            got: value.len(),
        })
    }
}
