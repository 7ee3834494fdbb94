//! In-memory builder state and its transitions.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::model::{NewRoom, RoomPatch, RoomRecord, Stage};

use super::client::{ClientError, RoomsClient};

pub const DEFAULT_ROOM_NAME: &str = "My Escape Room";
pub const DEFAULT_TIMER_MINUTES: u32 = 30;

/// Whether the in-memory room is associated with a persisted identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Unsaved,
    Bound(String),
}

/// Stage input fields, cleared whenever a stage is added.
#[derive(Debug, Clone, Default)]
pub struct StageDraft {
    pub title: String,
    pub description: String,
    pub solution: String,
    pub stage_image: String,
}

/// Renders the standalone HTML artifact. The template itself belongs to an
/// external collaborator; only the seam is fixed here.
pub trait RoomRenderer {
    fn render(&self, room_name: &str, stages: &[Stage], timer_minutes: u32, unique_id: &str)
        -> String;
}

/// Result of an export. Producing one persists nothing and binds nothing.
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub unique_id: String,
    pub file_name: String,
    pub html: String,
}

/// A planned persistence request. Planning does not change state;
/// `commit_save` applies the transition once the request succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveRequest {
    Create { unique_id: String },
    Update { unique_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(String),
    Updated(String),
}

/// One editing session of the builder.
#[derive(Debug, Clone)]
pub struct BuilderSession {
    pub room_name: String,
    pub timer_minutes: u32,
    pub stages: Vec<Stage>,
    pub draft: StageDraft,
    binding: Binding,
}

impl Default for BuilderSession {
    fn default() -> Self {
        Self::new()
    }
}

impl BuilderSession {
    pub fn new() -> Self {
        BuilderSession {
            room_name: DEFAULT_ROOM_NAME.to_string(),
            timer_minutes: DEFAULT_TIMER_MINUTES,
            stages: Vec::new(),
            draft: StageDraft::default(),
            binding: Binding::Unsaved,
        }
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    pub fn unique_id(&self) -> Option<&str> {
        match &self.binding {
            Binding::Bound(uid) => Some(uid),
            Binding::Unsaved => None,
        }
    }

    /// Append the draft as a stage. No-op when the draft title is empty or
    /// whitespace-only; clears the draft fields on success.
    pub fn add_stage(&mut self) -> bool {
        if self.draft.title.trim().is_empty() {
            return false;
        }
        let draft = std::mem::take(&mut self.draft);
        self.stages.push(Stage {
            title: draft.title,
            description: draft.description,
            solution: draft.solution,
            stage_image: draft.stage_image,
        });
        true
    }

    /// Remove the stage at `index`; later stages shift down by one.
    /// Out-of-range is a no-op.
    pub fn delete_stage(&mut self, index: usize) -> bool {
        if index >= self.stages.len() {
            return false;
        }
        self.stages.remove(index);
        true
    }

    pub fn can_save(&self) -> bool {
        !self.stages.is_empty()
    }

    pub fn can_export(&self) -> bool {
        !self.stages.is_empty()
    }

    pub fn can_delete(&self) -> bool {
        matches!(self.binding, Binding::Bound(_))
    }

    /// Plan the save request for the current state: a create with a fresh
    /// identifier when unsaved, an update addressed by the bound identifier
    /// otherwise. `None` when saving is gated off (no stages).
    pub fn plan_save(&self, now: DateTime<Utc>) -> Option<SaveRequest> {
        if !self.can_save() {
            return None;
        }
        Some(match &self.binding {
            Binding::Unsaved => SaveRequest::Create {
                unique_id: generate_unique_id(now),
            },
            Binding::Bound(uid) => SaveRequest::Update {
                unique_id: uid.clone(),
            },
        })
    }

    /// Transition to Bound after a successful save.
    pub fn commit_save(&mut self, unique_id: String) {
        self.binding = Binding::Bound(unique_id);
    }

    /// Execute the planned save through `client`. `Ok(None)` when gated off.
    /// On any failure the binding does not change.
    pub async fn save(&mut self, client: &RoomsClient) -> Result<Option<SaveOutcome>, ClientError> {
        let Some(request) = self.plan_save(Utc::now()) else {
            return Ok(None);
        };
        match request {
            SaveRequest::Create { unique_id } => {
                client
                    .create(&NewRoom {
                        unique_id: Some(unique_id.clone()),
                        name: self.room_name.clone(),
                        stages: self.stages.clone(),
                    })
                    .await?;
                self.commit_save(unique_id.clone());
                Ok(Some(SaveOutcome::Created(unique_id)))
            }
            SaveRequest::Update { unique_id } => {
                client
                    .update_by_uid(
                        &unique_id,
                        &RoomPatch {
                            name: Some(self.room_name.clone()),
                            stages: Some(self.stages.clone()),
                        },
                    )
                    .await?;
                Ok(Some(SaveOutcome::Updated(unique_id)))
            }
        }
    }

    /// Fetch all saved rooms as load candidates. Does not change the binding.
    pub async fn load_candidates(
        &self,
        client: &RoomsClient,
    ) -> Result<Vec<RoomRecord>, ClientError> {
        client.list().await
    }

    /// Load one room by identifier, replacing the in-memory name and stage
    /// sequence and binding to the loaded record.
    pub async fn load(&mut self, client: &RoomsClient, unique_id: &str) -> Result<(), ClientError> {
        let room = client.fetch_by_uid(unique_id).await?;
        self.room_name = room.name;
        self.stages = room.applied_images_data;
        self.binding = Binding::Bound(room.unique_id.unwrap_or_else(|| unique_id.to_string()));
        Ok(())
    }

    /// Delete the persisted room. Only valid when bound; call once the user
    /// has confirmed. `Ok(false)` when unsaved. On success the in-memory
    /// room resets to defaults; on failure the binding is kept.
    pub async fn delete_saved(&mut self, client: &RoomsClient) -> Result<bool, ClientError> {
        let Binding::Bound(uid) = self.binding.clone() else {
            return Ok(false);
        };
        client.delete_by_uid(&uid).await?;
        *self = BuilderSession::new();
        Ok(true)
    }

    /// Produce the static HTML artifact for the current room. Uses the bound
    /// identifier or derives a fresh one from `now`; neither persists
    /// anything nor changes the binding.
    pub fn export<R: RoomRenderer>(&self, renderer: &R, now: DateTime<Utc>) -> Option<ExportArtifact> {
        if !self.can_export() {
            return None;
        }
        let unique_id = match &self.binding {
            Binding::Bound(uid) => uid.clone(),
            Binding::Unsaved => generate_unique_id(now),
        };
        let html = renderer.render(&self.room_name, &self.stages, self.timer_minutes, &unique_id);
        Some(ExportArtifact {
            file_name: format!("{unique_id}.html"),
            unique_id,
            html,
        })
    }
}

/// Identifier-safe form of a timestamp: RFC 3339 with `:` and `.` replaced.
pub fn generate_unique_id(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    struct StubRenderer;

    impl RoomRenderer for StubRenderer {
        fn render(
            &self,
            room_name: &str,
            stages: &[Stage],
            timer_minutes: u32,
            unique_id: &str,
        ) -> String {
            format!("{room_name}|{}|{timer_minutes}|{unique_id}", stages.len())
        }
    }

    fn session_with_stages(titles: &[&str]) -> BuilderSession {
        let mut session = BuilderSession::new();
        for title in titles {
            session.draft.title = title.to_string();
            assert!(session.add_stage());
        }
        session
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 13, 13, 28).unwrap()
    }

    #[test]
    fn add_stage_ignores_whitespace_title() {
        let mut session = BuilderSession::new();
        session.draft.title = "   ".into();
        session.draft.description = "kept".into();
        assert!(!session.add_stage());
        assert!(session.stages.is_empty());
        // failed add does not clear the inputs
        assert_eq!(session.draft.description, "kept");
    }

    #[test]
    fn add_stage_appends_and_clears_draft() {
        let mut session = BuilderSession::new();
        session.draft.title = "Find the key".into();
        session.draft.solution = "under the mat".into();
        assert!(session.add_stage());
        assert_eq!(session.stages.len(), 1);
        assert_eq!(session.stages[0].title, "Find the key");
        assert_eq!(session.stages[0].solution, "under the mat");
        assert!(session.draft.title.is_empty());
        assert!(session.draft.solution.is_empty());
    }

    #[test]
    fn delete_stage_shifts_later_stages_down() {
        let mut session = session_with_stages(&["first", "second"]);
        assert!(session.delete_stage(0));
        assert_eq!(session.stages.len(), 1);
        assert_eq!(session.stages[0].title, "second");
    }

    #[test]
    fn delete_stage_out_of_range_is_noop() {
        let mut session = session_with_stages(&["only"]);
        assert!(!session.delete_stage(1));
        assert_eq!(session.stages.len(), 1);
    }

    #[test]
    fn save_and_export_gated_off_without_stages() {
        let session = BuilderSession::new();
        assert!(!session.can_save());
        assert!(session.plan_save(fixed_now()).is_none());
        assert!(session.export(&StubRenderer, fixed_now()).is_none());
        assert!(!session.can_delete());
    }

    #[test]
    fn plan_save_creates_when_unsaved_and_updates_when_bound() {
        let mut session = session_with_stages(&["one"]);
        let planned = session.plan_save(fixed_now()).unwrap();
        let SaveRequest::Create { unique_id } = planned else {
            panic!("expected create");
        };
        assert_eq!(unique_id, generate_unique_id(fixed_now()));

        session.commit_save(unique_id.clone());
        assert_eq!(session.binding(), &Binding::Bound(unique_id.clone()));
        assert_eq!(
            session.plan_save(fixed_now()),
            Some(SaveRequest::Update { unique_id })
        );
    }

    #[test]
    fn export_uses_bound_identifier_but_never_binds() {
        let mut session = session_with_stages(&["one"]);
        let artifact = session.export(&StubRenderer, fixed_now()).unwrap();
        assert_eq!(artifact.unique_id, generate_unique_id(fixed_now()));
        assert_eq!(artifact.file_name, format!("{}.html", artifact.unique_id));
        assert_eq!(session.binding(), &Binding::Unsaved);

        session.commit_save("bound-id".into());
        let artifact = session.export(&StubRenderer, fixed_now()).unwrap();
        assert_eq!(artifact.unique_id, "bound-id");
        assert_eq!(artifact.html, "My Escape Room|1|30|bound-id");
    }

    #[test]
    fn generated_identifier_is_identifier_safe() {
        let uid = generate_unique_id(fixed_now());
        assert_eq!(uid, "2025-10-16T13-13-28-000Z");
        assert!(!uid.contains(':'));
        assert!(!uid.contains('.'));
        assert!(uid.len() <= crate::model::UNIQUE_ID_MAX_LEN);
    }
}
