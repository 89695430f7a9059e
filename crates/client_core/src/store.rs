use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    domain::StudentId,
    protocol::{Student, StudentDraft},
};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    config::{ClientSettings, ServiceEndpoint},
    error::{RosterError, RosterResult},
};

#[async_trait]
pub trait RemoteStudentStore: Send + Sync {
    async fn list(&self) -> RosterResult<Vec<Student>>;
    async fn create(&self, draft: &StudentDraft) -> RosterResult<Student>;
    async fn update(&self, id: StudentId, draft: &StudentDraft) -> RosterResult<Student>;
    async fn delete(&self, id: StudentId) -> RosterResult<()>;
}

pub struct HttpStudentStore {
    http: Client,
    endpoint: RwLock<ServiceEndpoint>,
}

impl HttpStudentStore {
    pub fn new(endpoint: ServiceEndpoint) -> Self {
        Self {
            http: Client::new(),
            endpoint: RwLock::new(endpoint),
        }
    }

    pub fn from_settings(settings: &ClientSettings) -> RosterResult<Self> {
        Ok(Self::new(settings.endpoint()?))
    }

    pub async fn endpoint(&self) -> ServiceEndpoint {
        self.endpoint.read().await.clone()
    }

    /// Points later requests at `host`, keeping the current port. Requests
    /// already in flight finish against the old host.
    pub async fn set_host(&self, host: &str) -> RosterResult<()> {
        let mut endpoint = self.endpoint.write().await;
        let next = ServiceEndpoint::with_port(host, endpoint.port())?;
        info!(
            from = endpoint.base_url().as_str(),
            to = next.base_url().as_str(),
            "roster service host changed"
        );
        *endpoint = next;
        Ok(())
    }
}

#[async_trait]
impl RemoteStudentStore for HttpStudentStore {
    async fn list(&self) -> RosterResult<Vec<Student>> {
        let url = self.endpoint().await.students_url();
        debug!(%url, "GET students");
        let students = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(students)
    }

    async fn create(&self, draft: &StudentDraft) -> RosterResult<Student> {
        let url = self.endpoint().await.students_url();
        debug!(%url, "POST student");
        let student = self
            .http
            .post(url)
            .json(draft)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(student)
    }

    async fn update(&self, id: StudentId, draft: &StudentDraft) -> RosterResult<Student> {
        let url = self.endpoint().await.student_url(id);
        debug!(%url, "PUT student");
        let res = self.http.put(url).json(draft).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(RosterError::NotFound(id));
        }
        let student = res.error_for_status()?.json().await?;
        Ok(student)
    }

    async fn delete(&self, id: StudentId) -> RosterResult<()> {
        let url = self.endpoint().await.student_url(id);
        debug!(%url, "DELETE student");
        self.http.delete(url).send().await?.error_for_status()?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
