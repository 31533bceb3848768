//! Coincheck exchange module.

pub mod client;
pub mod signing;

pub use client::CoincheckClient;
