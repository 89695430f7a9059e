use serde::{Deserialize, Serialize};

use crate::{dates::ServiceDate, domain::StudentId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: StudentId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: u32,
    #[serde(rename = "dataNascimento", default)]
    pub birth_date: ServiceDate,
}

/// Body of `POST /alunos` and `PUT /alunos/{id}`.
///
/// `birth_date` is already in service form (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentDraft {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "idade")]
    pub age: u32,
    #[serde(rename = "dataNascimento")]
    pub birth_date: String,
}
