//! Shared vocabulary for every Crypto Info crate: normalized provider
//! records, the provider/oracle/messenger traits, errors and constants.

pub mod constants;
pub mod error;
pub mod json;
pub mod traits;
pub mod types;
