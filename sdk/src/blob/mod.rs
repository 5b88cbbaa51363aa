//! Upload of an encrypted file as a block blob.
//!
//! The file is sent in blocks of up to [`BLOCK_SIZE`] bytes named
//! `block00000000`, `block00000001`, and so on. Once every block has been
//! accepted, the ordered block list is committed in a single request, which
//! makes the blob visible. If any request fails, the upload stops; blocks that
//! were already sent stay uncommitted on the storage side.

mod transport;

pub use transport::{
    BlobTransport, DEFAULT_TIMEOUT, PutRequest, ReqwestTransport, Retrying, upload_timeout,
};
use {
    crate::{Error, Result, util::maybe_block_in_place},
    bytes::Bytes,
    fs_err::File,
    ironbox_protocol::{
        BlockId, BlockManifest, CheckOutTarget,
        blob::{BLOCK_SIZE, BLOCK_SIZE_U64, MAX_BLOB_SIZE, MAX_BLOCKS},
    },
    reqwest::StatusCode,
    std::{
        io::{self, Read},
        path::Path,
    },
    tracing::{debug, info, instrument},
};

/// Rejects files that do not fit into [`MAX_BLOCKS`] blocks.
#[inline]
pub fn check_blob_size(size: u64) -> Result<()> {
    if size > MAX_BLOB_SIZE {
        Err(Error::FileTooLarge {
            size,
            max: MAX_BLOB_SIZE,
        })
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BlockUploader<T> {
    transport: T,
}

impl<T: BlobTransport> BlockUploader<T> {
    #[must_use]
    #[inline]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    #[must_use]
    #[inline]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Uploads the file and commits it as a single blob.
    ///
    /// Returns the committed block list. Nothing is visible remotely unless this
    /// returns `Ok`.
    #[instrument(skip_all, fields(path = ?path.as_ref()))]
    #[inline]
    pub async fn upload(
        &self,
        path: impl AsRef<Path>,
        target: &CheckOutTarget,
    ) -> Result<BlockManifest> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        let mut file = File::open(path)?;
        let size = file.metadata()?.len();
        check_blob_size(size)?;

        let mut manifest = BlockManifest::default();
        loop {
            let index = manifest.len();
            let block = maybe_block_in_place(|| read_block(&mut file))
                .map_err(|source| Error::ReadBlock { index, source })?;
            if block.is_empty() {
                break;
            }
            if index >= MAX_BLOCKS {
                // The file has grown since the size check.
                return Err(Error::FileTooLarge {
                    size: size.max(MAX_BLOB_SIZE.saturating_add(1)),
                    max: MAX_BLOB_SIZE,
                });
            }
            let block_id = BlockId::new(u32::try_from(index).map_err(io::Error::other)?);
            let block_len = block.len();
            let status = self
                .transport
                .put(PutRequest::block(target, &block_id, block))
                .await?;
            if status != StatusCode::CREATED {
                return Err(Error::BlockUpload { block_id, status });
            }
            debug!(%block_id, block_len, "uploaded block");
            manifest.push(block_id);
        }
        drop(file);

        let status = self
            .transport
            .put(PutRequest::block_list(target, &manifest))
            .await?;
        if status != StatusCode::CREATED {
            return Err(Error::CommitBlockList { status });
        }
        info!(blocks = manifest.len(), size, "committed blob");
        Ok(manifest)
    }
}

/// Reads up to [`BLOCK_SIZE`] bytes. Returns an empty block at the end of file.
fn read_block(file: &mut impl Read) -> io::Result<Bytes> {
    let mut buf = Vec::with_capacity(BLOCK_SIZE);
    file.take(BLOCK_SIZE_U64).read_to_end(&mut buf)?;
    Ok(buf.into())
}
