//! Local encryption of files before upload.
//!
//! The key material comes from the key-issuing service (see
//! [`ironbox_protocol::CipherSpec`]). The cipher is AES-128-CBC or AES-256-CBC,
//! depending on the key strength of the container.
//!
//! A file is encrypted in chunks of [`CHUNK_SIZE`] bytes. Each chunk is
//! encrypted on its own, starting from the session IV, so the encrypted file
//! is simply a sequence of 1024-byte ciphertexts:
//!
//! - every chunk except the last one holds exactly 1024 bytes of the file;
//! - the last chunk holds the remaining 0..=1023 bytes, padded up to 1024
//!   bytes. The pad byte is `16 - k` (modulo 256), where `k` is the number of
//!   file bytes in the chunk.
//!
//! The last chunk is always present, so a file of `N` bytes produces
//! `(N / 1024 + 1) * 1024` encrypted bytes. The pad value does not depend on
//! the AES block size, which is what the service expects when it decrypts the
//! blob.

mod cipher;
mod io;

pub use {
    cipher::{BlockCipherEncrypter, CIPHER_BLOCK_LEN},
    io::{CHUNK_SIZE, PaddingFileEncrypter, encrypted_len, pad_chunk, pad_value},
};
