//! Tool requests and built-in tool parameter shapes

pub mod builtin;
pub mod request;

pub use builtin::{LineEnd, LineRange, EDIT_FILE, EXECUTE_BASH, EXECUTE_IPYTHON_CELL};
pub use request::{
    generate_conversation_id, timestamp_conversation_id, ToolParameters, ToolRequest,
    ToolResponse,
};
