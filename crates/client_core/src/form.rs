use shared::{
    dates::{to_display_form, to_service_form},
    protocol::{Student, StudentDraft},
};

use crate::error::{RosterError, RosterResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub name: String,
    pub age: String,
    pub birth_date: String,
}

impl StudentForm {
    pub fn new(
        name: impl Into<String>,
        age: impl Into<String>,
        birth_date: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            age: age.into(),
            birth_date: birth_date.into(),
        }
    }

    /// Fills the form from a cached student. An unreadable service date
    /// leaves the birth date field empty.
    pub fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            age: student.age.to_string(),
            birth_date: to_display_form(&student.birth_date),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.age.is_empty() && self.birth_date.is_empty()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn to_draft(&self) -> RosterResult<StudentDraft> {
        if self.name.trim().is_empty() {
            return Err(RosterError::missing("name"));
        }
        if self.age.trim().is_empty() {
            return Err(RosterError::missing("age"));
        }
        if self.birth_date.trim().is_empty() {
            return Err(RosterError::missing("birth date"));
        }

        let age = self
            .age
            .trim()
            .parse::<u32>()
            .map_err(|_| RosterError::Validation {
                field: "age",
                reason: format!("{:?} is not a non-negative whole number", self.age),
            })?;
        let birth_date = to_service_form(&self.birth_date)?;

        Ok(StudentDraft {
            name: self.name.clone(),
            age,
            birth_date,
        })
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
