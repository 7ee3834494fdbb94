//! Client-side builder: the in-memory room session, its Unsaved/Bound
//! binding machine, and the HTTP client that executes its requests.

mod client;
mod session;

pub use client::{ClientError, RoomsClient};
pub use session::{
    generate_unique_id, Binding, BuilderSession, ExportArtifact, RoomRenderer, SaveOutcome,
    SaveRequest, StageDraft, DEFAULT_ROOM_NAME, DEFAULT_TIMER_MINUTES,
};
