//! Configuration validation
//!
//! Validates search specifications before anything is built.

mod error;
mod validator;

#[cfg(test)]
mod proptests;
#[cfg(test)]
pub(crate) mod tests;

pub use error::ValidationError;
pub use validator::validate_config;
