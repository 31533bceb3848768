//! On-chain wallet balances through an Etherscan-compatible explorer API.

pub mod client;

pub use client::ExplorerClient;
