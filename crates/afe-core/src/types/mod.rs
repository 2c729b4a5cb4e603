//! # Types
//!
//! Value types shared by the decoder, the resolvers and the renderer.

pub mod address;
pub mod registers;

// Re-export all public types
pub use address::{Address, ModuleBase};
pub use registers::{RegisterId, RegisterSnapshot, GENERAL_PURPOSE_COUNT};
