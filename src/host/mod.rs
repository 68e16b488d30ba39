//! Headless host: drives one match session over JSON lines

pub mod handler;
pub mod protocol;
pub mod runner;

pub use handler::{read_commands, write_messages, HostError};
pub use protocol::{HostCommand, HostMsg};
pub use runner::SessionRunner;
