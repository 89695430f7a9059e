use std::{fmt, sync::Arc};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{dates::BirthDate, domain::StudentId, protocol::Student};
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

pub mod config;
pub mod error;
pub mod form;
pub mod lifecycle;
pub mod session;
pub mod store;

pub use config::{load_settings, ClientSettings, ServiceEndpoint};
pub use error::{RosterError, RosterResult};
pub use form::StudentForm;
pub use lifecycle::RefreshOutcome;
pub use session::{EditSession, EditSessionController, SubmitAction};
pub use store::{HttpStudentStore, RemoteStudentStore};

use lifecycle::{RefreshTicket, RefreshTracker};
use session::SubmitAction as Action;

const EVENT_CAPACITY: usize = 64;

pub const DELETE_PROMPT_TITLE: &str = "Confirm";
pub const DELETE_PROMPT_MESSAGE: &str = "Are you sure you want to delete this student?";
pub const DELETE_PROMPT_CANCEL: &str = "Cancel";
pub const DELETE_PROMPT_CONFIRM: &str = "Delete";

#[derive(Debug, Clone)]
pub struct ClientState {
    pub roster: Vec<Student>,
    pub loading: bool,
    pub edit: EditSessionController,
    pub last_error: Option<String>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

impl Default for ClientState {
    fn default() -> Self {
        Self {
            roster: Vec::new(),
            loading: true,
            edit: EditSessionController::new(),
            last_error: None,
            last_refreshed_at: None,
        }
    }
}

impl ClientState {
    pub fn session(&self) -> EditSession {
        self.edit.session()
    }

    pub fn form(&self) -> &StudentForm {
        self.edit.form()
    }

    pub fn student(&self, id: StudentId) -> Option<&Student> {
        self.roster.iter().find(|student| student.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Refresh,
    StartEdit,
    Submit,
    Remove,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Refresh => "refresh",
            Self::StartEdit => "start_edit",
            Self::Submit => "submit",
            Self::Remove => "remove",
        })
    }
}

#[derive(Debug, Clone)]
pub enum RosterEvent {
    LoadingChanged(bool),
    RosterReplaced { count: usize },
    SessionChanged(EditSession),
    StudentSaved(Student),
    StudentDeleted(StudentId),
    OperationFailed { operation: Operation, message: String },
}

#[derive(Debug, Clone)]
pub struct DeletePrompt {
    pub student_id: StudentId,
    /// `None` when the id is not in the cached roster.
    pub student: Option<Student>,
    pub title: &'static str,
    pub message: &'static str,
    pub cancel_label: &'static str,
    pub confirm_label: &'static str,
}

impl DeletePrompt {
    fn new(student_id: StudentId, student: Option<Student>) -> Self {
        Self {
            student_id,
            student,
            title: DELETE_PROMPT_TITLE,
            message: DELETE_PROMPT_MESSAGE,
            cancel_label: DELETE_PROMPT_CANCEL,
            confirm_label: DELETE_PROMPT_CONFIRM,
        }
    }
}

#[async_trait]
pub trait ConfirmPrompt: Send + Sync {
    async fn confirm(&self, prompt: &DeletePrompt) -> bool;
}

pub struct PreConfirmed;

#[async_trait]
impl ConfirmPrompt for PreConfirmed {
    async fn confirm(&self, _prompt: &DeletePrompt) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoveOutcome {
    Deleted,
    Declined,
}

pub struct RosterController {
    store: Arc<dyn RemoteStudentStore>,
    state: Mutex<ClientState>,
    refreshes: RefreshTracker,
    background_refresh: Mutex<Option<JoinHandle<()>>>,
    events: broadcast::Sender<RosterEvent>,
}

impl RosterController {
    pub fn new(store: Arc<dyn RemoteStudentStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            store,
            state: Mutex::new(ClientState::default()),
            refreshes: RefreshTracker::new(),
            background_refresh: Mutex::new(None),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RosterEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ClientState {
        self.state.lock().await.clone()
    }

    pub async fn roster(&self) -> Vec<Student> {
        self.state.lock().await.roster.clone()
    }

    pub async fn session(&self) -> EditSession {
        self.state.lock().await.session()
    }

    pub async fn form(&self) -> StudentForm {
        self.state.lock().await.form().clone()
    }

    pub async fn edit_form(&self, apply: impl FnOnce(&mut StudentForm)) -> StudentForm {
        let mut guard = self.state.lock().await;
        let form = guard.edit.form_mut();
        apply(&mut *form);
        form.clone()
    }

    pub async fn start(&self) -> RosterResult<RefreshOutcome> {
        info!("starting roster client");
        self.refresh().await
    }

    /// A failed fetch keeps the previous cache.
    pub async fn refresh(&self) -> RosterResult<RefreshOutcome> {
        self.refresh_with(self.refreshes.issue()).await
    }

    // The ticket is issued by the caller so a spawned refresh is ordered by
    // when it was requested, not by when its task first runs.
    async fn refresh_with(&self, ticket: RefreshTicket) -> RosterResult<RefreshOutcome> {
        {
            let mut state = self.state.lock().await;
            if !state.loading {
                state.loading = true;
                self.emit(RosterEvent::LoadingChanged(true));
            }
        }

        let result = self.store.list().await;

        let mut state = self.state.lock().await;
        if !self.refreshes.is_current(ticket) {
            debug!(
                ticket = ticket.sequence(),
                "dropping result of superseded roster refresh"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        state.loading = false;
        self.emit(RosterEvent::LoadingChanged(false));

        match result {
            Ok(students) => {
                let count = students.len();
                state.roster = students;
                state.last_error = None;
                state.last_refreshed_at = Some(Utc::now());
                self.emit(RosterEvent::RosterReplaced { count });
                info!(count, "roster refreshed");
                Ok(RefreshOutcome::Applied { count })
            }
            Err(err) => {
                drop(state);
                Err(self.failed(Operation::Refresh, err).await)
            }
        }
    }

    pub async fn spawn_refresh(self: &Arc<Self>) {
        let ticket = self.refreshes.issue();
        let controller = Arc::clone(self);
        let task = tokio::spawn(async move {
            let _ = controller.refresh_with(ticket).await;
        });

        let previous = self.background_refresh.lock().await.replace(task);
        if let Some(previous) = previous {
            if !previous.is_finished() {
                debug!("aborting superseded background refresh");
            }
            previous.abort();
        }
    }

    pub async fn start_edit(&self, id: StudentId) -> RosterResult<EditSession> {
        let result = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;
            state.edit.start_edit(id, &state.roster)
        };

        match result {
            Ok(session) => {
                self.emit(RosterEvent::SessionChanged(session));
                Ok(session)
            }
            Err(err) => Err(self.failed(Operation::StartEdit, err).await),
        }
    }

    pub async fn cancel_edit(&self) -> EditSession {
        let session = self.state.lock().await.edit.cancel_edit();
        debug!("edit session cancelled");
        self.emit(RosterEvent::SessionChanged(session));
        session
    }

    pub async fn submit(&self, form: StudentForm) -> RosterResult<Student> {
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(err) => return Err(self.failed(Operation::Submit, err).await),
        };

        if BirthDate::parse_display(&form.birth_date).is_err() {
            warn!(
                birth_date = %form.birth_date,
                "birth date is not a calendar date; sending it unchecked"
            );
        }

        let dispatched = self.session().await;
        let action = dispatched.submit_action();
        let result = match action {
            Action::Create => self.store.create(&draft).await,
            Action::Update(id) => self.store.update(id, &draft).await,
        };
        let student = match result {
            Ok(student) => student,
            Err(err) => return Err(self.failed(Operation::Submit, err).await),
        };

        match action {
            Action::Create => info!(student_id = %student.id, "student created"),
            Action::Update(id) => info!(student_id = %id, "student updated"),
        }

        let reset = {
            let mut state = self.state.lock().await;
            if state.session() == dispatched {
                Some(state.edit.on_submit_succeeded())
            } else {
                debug!("edit session changed while saving; leaving it open");
                None
            }
        };
        self.emit(RosterEvent::StudentSaved(student.clone()));
        if let Some(session) = reset {
            self.emit(RosterEvent::SessionChanged(session));
        }

        self.refresh_after_mutation().await;
        Ok(student)
    }

    pub async fn remove(
        &self,
        id: StudentId,
        prompt: &dyn ConfirmPrompt,
    ) -> RosterResult<RemoveOutcome> {
        let student = self.state.lock().await.student(id).cloned();
        if !prompt.confirm(&DeletePrompt::new(id, student)).await {
            debug!(student_id = %id, "delete declined");
            return Ok(RemoveOutcome::Declined);
        }

        if let Err(err) = self.store.delete(id).await {
            return Err(self.failed(Operation::Remove, err).await);
        }

        info!(student_id = %id, "student deleted");
        self.emit(RosterEvent::StudentDeleted(id));

        self.refresh_after_mutation().await;
        Ok(RemoveOutcome::Deleted)
    }

    // The mutation already succeeded; a failed follow-up refresh is reported
    // through `failed` and not returned to the caller.
    async fn refresh_after_mutation(&self) {
        if let Err(err) = self.refresh().await {
            debug!(%err, "refresh after mutation failed");
        }
    }

    async fn failed(&self, operation: Operation, err: RosterError) -> RosterError {
        let message = err.to_string();
        warn!(%operation, error = %message, "roster operation failed");
        self.state.lock().await.last_error = Some(message.clone());
        self.emit(RosterEvent::OperationFailed { operation, message });
        err
    }

    fn emit(&self, event: RosterEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
