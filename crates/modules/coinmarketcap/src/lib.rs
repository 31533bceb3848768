//! CoinMarketCap quotes as a JPY price oracle.

pub mod client;

pub use client::CoinMarketCapClient;
