use {
    aes::{Aes128, Aes256},
    cbc::cipher::{BlockEncryptMut, KeyIvInit, block_padding::NoPadding},
    ironbox_protocol::{CipherKind, CipherSpec, ConfigurationError},
    std::{
        fmt::{self, Debug},
        io,
    },
};

/// AES block length. Input of [`BlockCipherEncrypter::encrypt`] must be a multiple of it.
pub const CIPHER_BLOCK_LEN: usize = 16;

#[derive(Clone)]
enum Mode {
    Aes128(cbc::Encryptor<Aes128>),
    Aes256(cbc::Encryptor<Aes256>),
}

/// Encrypts whole chunks with AES-CBC and no padding.
///
/// Every chunk is encrypted independently, starting from the initialization
/// vector of the session, so the output only depends on the key, the IV and
/// the chunk itself.
#[derive(Clone)]
pub struct BlockCipherEncrypter {
    cipher: CipherKind,
    // Initial state; cloned for each chunk.
    mode: Mode,
}

impl BlockCipherEncrypter {
    #[inline]
    pub fn new(spec: &CipherSpec) -> Result<Self, ConfigurationError> {
        let key = spec.symmetric_key();
        let iv = spec.initialization_vector();
        let invalid_length = |_| ConfigurationError::InvalidLength {
            field: "symmetric_key",
            cipher: spec.cipher(),
            expected: spec.cipher().key_len(),
            got: key.len(),
        };
        let mode = match spec.cipher() {
            CipherKind::Aes128Cbc => {
                Mode::Aes128(cbc::Encryptor::new_from_slices(key, iv).map_err(invalid_length)?)
            }
            CipherKind::Aes256Cbc => {
                Mode::Aes256(cbc::Encryptor::new_from_slices(key, iv).map_err(invalid_length)?)
            }
        };
        Ok(Self {
            cipher: spec.cipher(),
            mode,
        })
    }

    #[must_use]
    #[inline]
    pub const fn cipher(&self) -> CipherKind {
        self.cipher
    }

    /// Returns a ciphertext of the same length as `chunk`.
    ///
    /// Padding is the caller's job: a chunk whose length is not a multiple of
    /// [`CIPHER_BLOCK_LEN`] is rejected.
    #[inline]
    pub fn encrypt(&self, chunk: &[u8]) -> io::Result<Vec<u8>> {
        if chunk.len() % CIPHER_BLOCK_LEN != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "chunk length {} is not a multiple of {CIPHER_BLOCK_LEN}",
                    chunk.len()
                ),
            ));
        }
        if chunk.is_empty() {
            return Ok(Vec::new());
        }
        let mut buf = chunk.to_vec();
        let len = buf.len();
        let encrypted_len = match &self.mode {
            Mode::Aes128(encryptor) => encryptor
                .clone()
                .encrypt_padded_mut::<NoPadding>(&mut buf, len),
            Mode::Aes256(encryptor) => encryptor
                .clone()
                .encrypt_padded_mut::<NoPadding>(&mut buf, len),
        }
        .map_err(|_| io::Error::other("encryption failed"))?
        .len();
        debug_assert_eq!(encrypted_len, len);
        Ok(buf)
    }
}

impl Debug for BlockCipherEncrypter {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCipherEncrypter")
            .field("cipher", &self.cipher)
            .finish_non_exhaustive()
    }
}
