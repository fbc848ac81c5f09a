//! Typed clients over the generic resource actors.

mod order_client;

pub use order_client::*;
