pub mod api;
pub mod components;
pub mod config;
pub mod error;
pub mod shell;

#[cfg(test)]
mod test_support;

pub use api::*;
pub use components::*;
pub use config::*;
pub use error::*;
pub use shell::*;
