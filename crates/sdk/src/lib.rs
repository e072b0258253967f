//! Waitroom SDK - Rust Client Library
//!
//! Provides a client for the Waitroom daemon's JSON-RPC API.
//!
//! # Example
//!
//! ```no_run
//! use waitroom_sdk::WaitroomClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = WaitroomClient::connect("http://127.0.0.1:9010").await?;
//!
//!     let rank = match client.register("default", "42").await {
//!         Ok(response) => response.rank,
//!         Err(e) if e.is_already_registered() => client.rank("default", "42").await?.rank,
//!         Err(e) => return Err(e.into()),
//!     };
//!     println!("Waiting at position {}", rank);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod types;

pub use client::WaitroomClient;
pub use error::{Result, SdkError};
pub use types::{
    AdmittedResponse, AllowResponse, AllowedResponse, EnterResponse, EntryStatus, RankResponse,
    RegisterResponse, StatsResponse, TouchResponse, RANK_NOT_PRESENT,
};
