//! Block blob dialect of the storage service (API version 2012-02-12).
//!
//! A blob is uploaded as a sequence of blocks, each named by a fixed-width
//! block ID, and becomes visible only when the ordered list of block IDs is
//! committed in a single request.

use {
    base64::{Engine, prelude::BASE64_STANDARD},
    derive_more::Display,
    std::fmt::Write,
};

/// Max length of a single block.
pub const BLOCK_SIZE: usize = 4 * 1024 * 1024;
pub const BLOCK_SIZE_U64: u64 = 4 * 1024 * 1024;

/// Max number of blocks that can be committed into one blob.
pub const MAX_BLOCKS: usize = 50_000;

/// Max size of a blob uploaded under this scheme (about 200 GB).
pub const MAX_BLOB_SIZE: u64 = 50_000 * BLOCK_SIZE_U64;

/// Value of the `x-ms-version` header.
pub const STORAGE_API_VERSION: &str = "2012-02-12";

/// Name of a block inside a blob.
///
/// All block IDs of a blob must have the same length, so the index is always
/// zero-padded to 8 digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub struct BlockId(String);

impl BlockId {
    #[must_use]
    #[inline]
    pub fn new(index: u32) -> Self {
        Self(format!("block{index:08}"))
    }

    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Form used in block URIs and in the committed block list.
    #[must_use]
    #[inline]
    pub fn to_base64(&self) -> String {
        BASE64_STANDARD.encode(&self.0)
    }
}

/// Ordered list of uploaded block IDs that defines how the blob is assembled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockManifest {
    ids: Vec<BlockId>,
}

impl BlockManifest {
    #[inline]
    pub fn push(&mut self, id: BlockId) {
        self.ids.push(id);
    }

    #[must_use]
    #[inline]
    pub fn ids(&self) -> &[BlockId] {
        &self.ids
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Body of the commit request.
    #[must_use]
    #[inline]
    pub fn to_xml(&self) -> String {
        let mut body = String::from(r#"<?xml version="1.0" encoding="utf-8"?><BlockList>"#);
        for id in &self.ids {
            // Writing to a String cannot fail.
            let _ = write!(body, "<Latest>{}</Latest>", id.to_base64());
        }
        body.push_str("</BlockList>");
        body
    }
}
