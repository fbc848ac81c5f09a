//! Order-specific domain logic: lifecycle rules, actions and errors.

mod actions;
pub mod entity;
pub mod error;
pub mod lifecycle;

pub use actions::*;
pub use error::*;
