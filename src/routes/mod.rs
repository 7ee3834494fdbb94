//! Route tables: the room collection and operational endpoints.

mod common;
mod rooms;

pub use common::common_routes;
pub use rooms::{app, cors_layer, room_routes};
