//! JSON-RPC API Layer
//!
//! Exposes the waiting-room operations as JSON-RPC 2.0 methods for the
//! HTTP layer that renders the waiting room and for the gateway in front of
//! the protected site.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use server::{RpcServer, RpcServerConfig};
