use super::{FileSource, SourceKind};
use permit_common::{PermitError, Result};
use std::time::Duration;
use tracing::debug;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

/// Downloads the profile's hook files over HTTPS, one GET per file.
pub struct RemoteSource {
    base_url: String,
    files: Vec<String>,
    agent: ureq::Agent,
}

impl RemoteSource {
    pub fn new(base_url: &str, files: Vec<String>) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(DOWNLOAD_TIMEOUT))
            .build()
            .into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            files,
            agent,
        }
    }

    pub fn url_for(&self, rel: &str) -> String {
        format!("{}/{}", self.base_url, rel.trim_start_matches('/'))
    }
}

impl FileSource for RemoteSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Remote
    }

    fn location(&self) -> String {
        self.base_url.clone()
    }

    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self.files.clone())
    }

    fn fetch(&self, rel: &str) -> Result<Vec<u8>> {
        let url = self.url_for(rel);
        debug!(%url, "downloading");

        let unavailable = |reason: String| PermitError::SourceUnavailable {
            path: url.clone(),
            reason,
            remote: true,
        };

        let mut response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| unavailable(e.to_string()))?;
        response
            .body_mut()
            .read_to_vec()
            .map_err(|e| unavailable(e.to_string()))
    }
}
