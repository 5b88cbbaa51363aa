use {
    crate::{
        Error, Result,
        crypto::BlockCipherEncrypter,
    },
    fs_err::File,
    ironbox_protocol::{CipherSpec, ConfigurationError},
    std::{
        io::{self, BufWriter, Read, Write},
        path::Path,
    },
    tracing::{debug, instrument},
};

/// Length of a plaintext chunk and of its ciphertext.
pub const CHUNK_SIZE: usize = 1024;
const CHUNK_SIZE_U64: u64 = 1024;

const PAD_BASE: u8 = 16;

/// Pad byte for a final chunk holding `len` bytes of the file.
#[must_use]
#[inline]
pub fn pad_value(len: usize) -> u8 {
    #[expect(
        clippy::as_conversions,
        clippy::cast_possible_truncation,
        reason = "pad value is defined modulo 256"
    )]
    let low_byte = (len % CHUNK_SIZE) as u8;
    PAD_BASE.wrapping_sub(low_byte)
}

/// Extends the final chunk to the next multiple of [`CHUNK_SIZE`].
///
/// A chunk that is already a multiple of [`CHUNK_SIZE`] (including an empty one)
/// receives a whole chunk of padding.
#[inline]
pub fn pad_chunk(chunk: &mut Vec<u8>) {
    let remainder = chunk.len() % CHUNK_SIZE;
    let padded_len = chunk.len().saturating_add(CHUNK_SIZE.saturating_sub(remainder));
    chunk.resize(padded_len, pad_value(remainder));
}

/// Size of the encrypted copy of a file of `original_len` bytes.
#[must_use]
#[inline]
pub const fn encrypted_len(original_len: u64) -> u64 {
    (original_len / CHUNK_SIZE_U64).saturating_add(1).saturating_mul(CHUNK_SIZE_U64)
}

/// Produces an encrypted copy of a file chunk by chunk, without loading the
/// whole file into memory.
#[derive(Debug, Clone)]
pub struct PaddingFileEncrypter {
    encrypter: BlockCipherEncrypter,
}

impl PaddingFileEncrypter {
    #[inline]
    pub fn new(spec: &CipherSpec) -> Result<Self, ConfigurationError> {
        Ok(Self {
            encrypter: BlockCipherEncrypter::new(spec)?,
        })
    }

    /// Encrypts `input` into `output`, replacing `output` if it exists.
    ///
    /// Returns the size of the encrypted file. On failure `output` may be left
    /// partially written.
    #[instrument(skip_all, fields(input = ?input.as_ref()))]
    #[inline]
    pub fn encrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<u64> {
        let encrypt = || -> io::Result<u64> {
            let input = File::open(input.as_ref())?;
            let output = BufWriter::new(File::create(output.as_ref())?);
            self.encrypt(input, output)
        };
        let encrypted_size = encrypt().map_err(Error::Encrypt)?;
        debug!(encrypted_size, "encrypted local copy of file");
        Ok(encrypted_size)
    }

    /// Encrypts a stream and returns the number of bytes written.
    #[inline]
    pub fn encrypt(&self, mut input: impl Read, mut output: impl Write) -> io::Result<u64> {
        let mut chunk = Vec::with_capacity(CHUNK_SIZE);
        let mut written = 0_u64;
        loop {
            chunk.clear();
            input.by_ref().take(CHUNK_SIZE_U64).read_to_end(&mut chunk)?;
            let is_last = chunk.len() < CHUNK_SIZE;
            if is_last {
                pad_chunk(&mut chunk);
            }
            output.write_all(&self.encrypter.encrypt(&chunk)?)?;
            written = written.saturating_add(CHUNK_SIZE_U64);
            if is_last {
                break;
            }
        }
        output.flush()?;
        Ok(written)
    }
}
