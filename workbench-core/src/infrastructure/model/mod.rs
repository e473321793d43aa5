//! Reasoning engine backends behind the [`ModelProvider`] trait.
//!
//! - `types`: request, response and error types
//! - `traits`: [`ModelProvider`] and [`ModelClient`]
//! - `clients`: the HTTP chat client and its provider dialects
//! - `provider`: [`DynamicModelProvider`], which routes by provider id

pub mod clients;
pub mod provider;
pub mod traits;
pub mod types;

pub use clients::{ChatClient, Dialect};
pub use provider::DynamicModelProvider;
pub use traits::{ModelClient, ModelProvider};
pub use types::{ModelError, ModelRequest, ModelResponse};
