//! Demo consumer: starts the server in-process on an ephemeral port, then
//! drives a builder session through save, list, load, update, export, and
//! delete.

use roomforge::builder::{BuilderSession, RoomRenderer, RoomsClient};
use roomforge::{apply_migrations, routes, store, AppState, Stage};
use tracing_subscriber::EnvFilter;

/// Stand-in for the real template generator, which lives outside this repo.
struct PlainRenderer;

impl RoomRenderer for PlainRenderer {
    fn render(
        &self,
        room_name: &str,
        stages: &[Stage],
        timer_minutes: u32,
        unique_id: &str,
    ) -> String {
        format!(
            "<!doctype html><html><head><title>{room_name}</title></head>\
             <body data-room=\"{unique_id}\" data-timer=\"{timer_minutes}\">{} stages</body></html>",
            stages.len()
        )
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("builder_demo=info,roomforge=info")),
        )
        .init();

    let pool = store::connect_in_memory().await?;
    apply_migrations(&pool).await?;
    let app = routes::app(AppState { pool });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "server stopped");
        }
    });

    let client = RoomsClient::new(format!("http://{addr}"));
    let mut session = BuilderSession::new();
    session.room_name = "Demo Room".into();
    session.draft.title = "Find the key".into();
    session.draft.solution = "under the mat".into();
    session.add_stage();

    let outcome = session.save(&client).await?;
    tracing::info!(?outcome, "saved");

    let rooms = session.load_candidates(&client).await?;
    tracing::info!(count = rooms.len(), "rooms on server");

    session.draft.title = "Open the safe".into();
    session.draft.solution = "1234".into();
    session.add_stage();
    let outcome = session.save(&client).await?;
    tracing::info!(?outcome, "saved again");

    if let Some(artifact) = session.export(&PlainRenderer, chrono::Utc::now()) {
        tracing::info!(file = %artifact.file_name, bytes = artifact.html.len(), "exported");
    }

    let uid = session.unique_id().map(str::to_owned);
    if let Some(uid) = uid {
        let mut other = BuilderSession::new();
        other.load(&client, &uid).await?;
        tracing::info!(name = %other.room_name, stages = other.stages.len(), "loaded into a fresh session");
    }

    let deleted = session.delete_saved(&client).await?;
    tracing::info!(deleted, "cleaned up");

    Ok(())
}
