use std::{fmt, fs, io, path::Path};

use anyhow::Context;
use serde::Deserialize;
use url::Url;

use crate::error::{RosterError, RosterResult};
use shared::domain::StudentId;

pub const SERVICE_PORT: u16 = 8080;
pub const DEFAULT_HOST: &str = "localhost";
pub const SETTINGS_FILE: &str = "roster.toml";

const STUDENTS_PATH: &str = "/alunos";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub host: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
        }
    }
}

impl ClientSettings {
    pub fn endpoint(&self) -> RosterResult<ServiceEndpoint> {
        ServiceEndpoint::for_host(&self.host)
    }
}

#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    host: Option<String>,
}

/// Defaults, then `roster.toml` in the working directory, then the
/// environment.
pub fn load_settings() -> anyhow::Result<ClientSettings> {
    load_settings_from(Path::new(SETTINGS_FILE), |key| std::env::var(key).ok())
}

pub fn load_settings_from(
    path: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<ClientSettings> {
    let mut settings = ClientSettings::default();

    match fs::read_to_string(path) {
        Ok(raw) => {
            let file_cfg: SettingsFile = toml::from_str(&raw)
                .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
            if let Some(host) = file_cfg.host {
                settings.host = host;
            }
        }
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    }

    if let Some(v) = env("ROSTER_HOST") {
        settings.host = v;
    }
    if let Some(v) = env("APP__HOST") {
        settings.host = v;
    }

    Ok(settings)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    base_url: Url,
}

impl ServiceEndpoint {
    pub fn for_host(host: &str) -> RosterResult<Self> {
        Self::with_port(host, SERVICE_PORT)
    }

    pub fn with_port(host: &str, port: u16) -> RosterResult<Self> {
        let host = host.trim();
        if host.is_empty() {
            return Err(RosterError::InvalidEndpoint("host must not be empty".into()));
        }

        let base_url = Url::parse(&format!("http://{host}:{port}/"))
            .map_err(|err| RosterError::InvalidEndpoint(format!("{host}: {err}")))?;

        // Rejects hosts that smuggle in a path, query or credentials.
        if base_url.path() != "/"
            || base_url.query().is_some()
            || !base_url.username().is_empty()
            || base_url.port_or_known_default() != Some(port)
        {
            return Err(RosterError::InvalidEndpoint(format!(
                "{host} is not a bare host name"
            )));
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn host(&self) -> &str {
        self.base_url.host_str().unwrap_or_default()
    }

    pub fn port(&self) -> u16 {
        self.base_url.port_or_known_default().unwrap_or(SERVICE_PORT)
    }

    pub fn students_url(&self) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(STUDENTS_PATH);
        url
    }

    pub fn student_url(&self, id: StudentId) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(&format!("{STUDENTS_PATH}/{id}"));
        url
    }
}

impl fmt::Display for ServiceEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_url.as_str())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
