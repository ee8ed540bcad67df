pub mod config;
pub mod error;
pub mod types;

pub use config::RackwiseConfig;
pub use error::ErrorKind;
pub use types::*;
