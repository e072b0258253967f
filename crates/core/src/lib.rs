// Waitroom Core - Domain Logic & Ports
// NO infrastructure dependencies (Hexagonal Architecture)

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{AppError, Result};
