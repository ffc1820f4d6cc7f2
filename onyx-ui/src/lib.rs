pub mod api;
pub mod components;
pub mod identity;
pub mod interop;
pub mod shell;

pub use api::*;
pub use components::*;
pub use shell::Shell;
