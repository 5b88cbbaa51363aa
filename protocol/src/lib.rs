//! Data model of the IronBox secure file transfer service.
//!
//! Nothing in this crate performs I/O. Key material and check-out targets can
//! only be constructed in a validated state; wire responses are deserialized
//! into forms with optional fields and then validated.

pub mod blob;
mod checkout;
pub mod endpoints;
mod error;
mod key;

pub use crate::{
    blob::{BlockId, BlockManifest},
    checkout::{CheckOutData, CheckOutTarget},
    error::ConfigurationError,
    key::{CipherKind, CipherSpec, CipherSpecBuilder, IV_LEN, KeyStrength},
};
