use shared::{domain::StudentId, protocol::Student};
use tracing::debug;

use crate::{
    error::{RosterError, RosterResult},
    form::StudentForm,
};

pub const SAVE_LABEL: &str = "Save";
pub const SAVE_EDIT_LABEL: &str = "Save Edit";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditSession {
    #[default]
    Idle,
    Editing(StudentId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitAction {
    Create,
    Update(StudentId),
}

impl EditSession {
    pub fn target(&self) -> Option<StudentId> {
        match self {
            Self::Idle => None,
            Self::Editing(id) => Some(*id),
        }
    }

    pub fn submit_action(&self) -> SubmitAction {
        match self {
            Self::Idle => SubmitAction::Create,
            Self::Editing(id) => SubmitAction::Update(*id),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        match self {
            Self::Idle => SAVE_LABEL,
            Self::Editing(_) => SAVE_EDIT_LABEL,
        }
    }
}

/// Owns the edit session together with the form it governs, so the form is
/// only ever populated from the student being edited.
#[derive(Debug, Clone, Default)]
pub struct EditSessionController {
    session: EditSession,
    form: StudentForm,
}

impl EditSessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> EditSession {
        self.session
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    /// Loads `id` from `roster` into the form. Retargets if already editing.
    /// An id missing from the roster leaves session and form untouched.
    pub fn start_edit(&mut self, id: StudentId, roster: &[Student]) -> RosterResult<EditSession> {
        let student = roster
            .iter()
            .find(|student| student.id == id)
            .ok_or(RosterError::UnknownStudent(id))?;

        self.form = StudentForm::from_student(student);
        self.session = EditSession::Editing(id);
        debug!(student_id = %id, "edit session started");
        Ok(self.session)
    }

    pub fn cancel_edit(&mut self) -> EditSession {
        self.reset()
    }

    pub fn on_submit_succeeded(&mut self) -> EditSession {
        self.reset()
    }

    fn reset(&mut self) -> EditSession {
        self.form.clear();
        self.session = EditSession::Idle;
        self.session
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
