pub mod cs;
pub mod error;
pub mod harness;

pub use cs::compression;
pub use error::{Error, Result};
