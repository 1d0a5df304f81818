//! Core definitions (error kinds, result alias and verification macros), relied upon
//! by all termpos-* crates.

pub mod error;
pub mod macros;
pub mod result;

pub use result::Result;
