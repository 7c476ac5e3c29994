use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{info, warn};

pub mod models;
use models::*;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse dataset {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read-only historical datasets, loaded lazily on first access and kept for
/// the life of the process.
///
/// Each dataset sits behind a `OnceLock`, so concurrent first readers block on
/// a single load and every later read is lock-free. A missing or malformed
/// file degrades to an empty dataset; callers then take their fallback paths.
#[derive(Debug, Default)]
pub struct DatasetCache {
    qb_path: Option<PathBuf>,
    skill_path: Option<PathBuf>,
    qb: OnceLock<QbDataset>,
    skill: OnceLock<SkillDataset>,
}

impl DatasetCache {
    pub fn new(qb_path: Option<PathBuf>, skill_path: Option<PathBuf>) -> Self {
        DatasetCache {
            qb_path,
            skill_path,
            qb: OnceLock::new(),
            skill: OnceLock::new(),
        }
    }

    /// Build a cache around datasets that are already in memory.
    pub fn from_datasets(qb: QbDataset, skill: SkillDataset) -> Self {
        DatasetCache {
            qb_path: None,
            skill_path: None,
            qb: OnceLock::from(qb),
            skill: OnceLock::from(skill),
        }
    }

    pub fn qb(&self) -> &QbDataset {
        self.qb
            .get_or_init(|| load_or_empty(self.qb_path.as_deref(), "quarterback"))
    }

    pub fn skill(&self) -> &SkillDataset {
        self.skill
            .get_or_init(|| load_or_empty(self.skill_path.as_deref(), "skill-position"))
    }
}

fn load_or_empty<S>(path: Option<&Path>, label: &str) -> SeasonDataset<S>
where
    S: DeserializeOwned,
{
    let Some(path) = path else {
        info!("No {} dataset configured; using positional fallbacks", label);
        return SeasonDataset::default();
    };
    match load_dataset(path) {
        Ok(ds) => {
            info!(
                "Loaded {} dataset from {} ({} players, latest season {})",
                label,
                path.display(),
                ds.players.len(),
                ds.latest_season
            );
            ds
        }
        Err(e) => {
            warn!("{} dataset unavailable, degrading to fallbacks: {}", label, e);
            SeasonDataset::default()
        }
    }
}

/// Read and parse one dataset file.
pub fn load_dataset<S>(path: &Path) -> Result<SeasonDataset<S>, DatasetError>
where
    S: DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|source| DatasetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| DatasetError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_degrades_to_empty_dataset() {
        let cache = DatasetCache::new(Some(PathBuf::from("/nonexistent/qb.json")), None);
        assert!(cache.qb().is_empty());
        assert!(cache.skill().is_empty());
    }

    #[test]
    fn malformed_file_degrades_to_empty_dataset() {
        let path = std::env::temp_dir().join("whatif_odds_malformed_dataset.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = load_dataset::<QbSeason>(&path).unwrap_err();
        assert!(matches!(err, DatasetError::Parse { .. }));

        let cache = DatasetCache::new(Some(path.clone()), None);
        assert!(cache.qb().is_empty());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn dataset_is_loaded_once_and_reused() {
        let path = std::env::temp_dir().join("whatif_odds_skill_dataset.json");
        std::fs::write(
            &path,
            r#"{"latestSeason": 2024, "players": {"test back": {"playerName": "Test Back", "seasons": []}}}"#,
        )
        .unwrap();
        let cache = DatasetCache::new(None, Some(path.clone()));
        let first = cache.skill() as *const SkillDataset;
        std::fs::remove_file(&path).ok();
        let second = cache.skill() as *const SkillDataset;
        assert_eq!(first, second);
        assert_eq!(cache.skill().latest_season, 2024);
    }
}
