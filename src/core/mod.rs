pub mod config;
pub mod error;
pub mod generator;
pub mod icon_table;

pub use config::*;
pub use error::*;
