//! Tool System - the web_search descriptor and the gateway that serves it

mod definition;
mod gateway;

pub use definition::{ToolDescriptor, WEB_SEARCH};
pub use gateway::{CallRequest, ToolGateway};
