//! HTTP chat backends.
//!
//! One client type covers every provider; [`Dialect`] decides the URL,
//! authentication, request body and where the reply text lives.

mod base;
mod chat;
mod dialect;

pub use base::{Auth, HttpClientBase};
pub use chat::{ChatClient, resolve_api_key};
pub use dialect::Dialect;
