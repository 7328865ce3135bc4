use anyhow::{bail, Result};
use async_trait::async_trait;
use cracker_core::{HarvestError, PuzzleRecord};
use std::path::{Path, PathBuf};

use crate::Sink;

/// Writes each record to `<folder>/<game_key>.json`.
pub struct JsonFileSink {
    pub folder: PathBuf,
}

/// Game keys are scraped text; only plain `[A-Za-z0-9_-]+` names may become files.
fn is_safe_file_stem(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl JsonFileSink {
    pub fn new(folder: impl AsRef<Path>) -> Self {
        let folder = folder.as_ref().to_path_buf();
        std::fs::create_dir_all(&folder).ok(); // ensure folder exists
        Self { folder }
    }

    async fn write(&self, record: &PuzzleRecord) -> Result<PathBuf> {
        if !is_safe_file_stem(&record.game_key) {
            bail!("game key {:?} is not a usable file name", record.game_key);
        }
        let path = self.folder.join(format!("{}.json", record.game_key));
        let data = serde_json::to_string_pretty(record)?;
        tokio::fs::write(&path, data).await?;
        Ok(path)
    }
}

#[async_trait]
impl Sink for JsonFileSink {
    async fn publish(&mut self, record: &PuzzleRecord) -> Result<(), HarvestError> {
        let path = self.write(record).await.map_err(|e| {
            HarvestError::publish_error(format!(
                "Failed to store puzzle {}: {:#}",
                record.game_key, e
            ))
        })?;
        log::debug!("Stored puzzle {} at {}", record.game_key, path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_plain_keys_are_file_stems() {
        assert!(is_safe_file_stem("abcde12345"));
        assert!(is_safe_file_stem("Ab_9-x"));
        for key in ["", ".", "..", "../up", "a/b", "a\\b", "a.b", "ключ"] {
            assert!(!is_safe_file_stem(key), "{:?}", key);
        }
    }
}
