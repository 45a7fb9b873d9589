mod config;
pub use config::*;

mod client;
pub use client::*;

mod types;
pub use types::*;
