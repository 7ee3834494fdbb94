//! RoomService: CRUD execution against the rooms table.

mod rooms;
pub use rooms::RoomService;
