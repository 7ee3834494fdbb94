//! HTTP handlers for the room collection.

pub mod rooms;
pub use rooms::*;
