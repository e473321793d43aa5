pub mod builtin;
mod error;
mod interface;
mod local;
mod manager;
mod process;
mod registry;
mod result;
pub mod schema;

pub use builtin::{Workspace, floor_div, render_tree};
pub use error::TransportError;
pub use interface::{ToolDescriptor, ToolTransport};
pub use local::LocalTransport;
pub use manager::ServerManager;
pub use process::StdioProcess;
pub use registry::{RegistryError, ToolDefinition, ToolKind, ToolRegistry};
pub use result::{ErrorKind, InvocationResult, ToolFailure};
pub use schema::{Arguments, ParamSpec, ParamType};
