//! Client side of the IronBox secure file transfer service.
//!
//! A file is encrypted locally under a per-container session key
//! ([`crypto`]), uploaded to blob storage as a list of blocks ([`blob`]) and
//! then checked in with the service ([`client`]).

pub mod blob;
pub mod client;
pub mod crypto;
mod error;
pub mod util;

pub use {
    error::{Error, ErrorKind, Result},
    ironbox_protocol as protocol,
};
