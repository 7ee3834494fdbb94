//! Roomforge: escape-room builder backend and client library.

pub mod builder;
pub mod error;
pub mod handlers;
pub mod migration;
pub mod model;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;

pub use builder::{BuilderSession, RoomsClient};
pub use error::AppError;
pub use migration::apply_migrations;
pub use model::{NewRoom, RoomKey, RoomPatch, RoomRecord, Stage};
pub use routes::{app, common_routes, room_routes};
pub use service::RoomService;
pub use state::AppState;
pub use store::{connect, connect_in_memory};
