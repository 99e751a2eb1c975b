//! Protocol models: bridge events and commands, permission state, push payloads.

pub mod command;
pub mod event;
pub mod permission;
pub mod push;

pub use command::*;
pub use event::*;
pub use permission::*;
pub use push::*;
