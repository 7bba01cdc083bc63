//! tokenwire - access-token protocol client
//!
//! A client for the SAS/GAS token protocol: fixed-width big-endian frames
//! exchanged with a token server over UDP.
//!
//! # Features
//!
//! - Individual token request and validation (SAS)
//! - Group token request and validation (GAS) for any number of entries
//! - Bounded retry on datagram loss
//! - Strict response classification (error frame, size, type tag)
//!
//! # Usage
//!
//! ```no_run
//! use tokenwire::{ClientConfig, TokenClient};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TokenClient::new("tokens.example.net", 51001, ClientConfig::default())?;
//!     let sas = client.individual_token_request("2021031726", 1234).await?;
//!     println!("{}", sas);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod transport;

pub use client::TokenClient;
pub use config::ClientConfig;
pub use error::TokenWireError;
