//! Data models for Stackview

pub mod branch;
pub mod repository;
pub mod stack;

pub use branch::*;
pub use repository::*;
pub use stack::*;
