//! Local routing document.
//!
//! The continuation token is a fingerprint of the last delivered content,
//! so polling an unchanged file reports "no change" without keeping any
//! state in the source itself.

use async_trait::async_trait;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::source::{ConfigFetchError, ConfigSource, PollOutcome};

const INITIAL_TOKEN: &str = "file:initial";

#[derive(Debug, Clone)]
pub struct FileConfigSource {
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn fingerprint(content: &[u8]) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("file:{:016x}", hasher.finish())
}

#[async_trait]
impl ConfigSource for FileConfigSource {
    async fn start_session(&self) -> Result<String, ConfigFetchError> {
        Ok(INITIAL_TOKEN.to_string())
    }

    async fn poll(&self, token: &str) -> Result<PollOutcome, ConfigFetchError> {
        let content = tokio::fs::read(&self.path).await?;
        let next_token = fingerprint(&content);

        if next_token == token || content.is_empty() {
            return Ok(PollOutcome {
                next_token,
                content: None,
            });
        }

        Ok(PollOutcome {
            next_token,
            content: Some(content),
        })
    }

    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }
}
