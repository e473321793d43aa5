pub mod server;
pub mod types;

pub use server::{ServeError, ToolServer};
pub use types::{RpcError, RpcRequest, RpcResponse};
