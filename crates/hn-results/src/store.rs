//! Run storage API.

use std::fs;
use std::path::{Path, PathBuf};

use hn_sim::{HourRecord, SimRecord};
use tracing::debug;

use crate::types::RunManifest;
use crate::{ResultsError, ResultsResult};

const MANIFEST_FILE: &str = "manifest.json";
const HOURS_FILE: &str = "hours.jsonl";

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    /// Store next to the project file, under `.heatnet/runs`.
    pub fn for_project(project_path: &Path) -> ResultsResult<Self> {
        let project_dir = project_path
            .parent()
            .ok_or_else(|| ResultsError::InvalidPath {
                message: "project path has no parent directory".to_string(),
            })?;
        let runs_dir = project_dir.join(".heatnet").join("runs");
        Self::new(runs_dir)
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join(MANIFEST_FILE).exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, hours: &[HourRecord]) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let mut content = String::new();
        for record in hours {
            content.push_str(&serde_json::to_string(record)?);
            content.push('\n');
        }
        fs::write(run_dir.join(HOURS_FILE), content)?;

        // Manifest last: its presence marks a complete run.
        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join(MANIFEST_FILE), manifest_json)?;

        debug!(run_id = %manifest.run_id, hours = hours.len(), "saved run");
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join(MANIFEST_FILE);

        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_hours(&self, run_id: &str) -> ResultsResult<Vec<HourRecord>> {
        let hours_path = self.run_dir(run_id).join(HOURS_FILE);

        if !hours_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }

        let content = fs::read_to_string(hours_path)?;
        let mut records = Vec::new();
        for line in content.lines() {
            if !line.trim().is_empty() {
                records.push(serde_json::from_str(line)?);
            }
        }
        Ok(records)
    }

    /// Manifest plus hourly records reassembled into a [`SimRecord`].
    pub fn load_record(&self, run_id: &str) -> ResultsResult<(RunManifest, SimRecord)> {
        let manifest = self.load_manifest(run_id)?;
        let hours = self.load_hours(run_id)?;

        if let Some(bad) = hours
            .iter()
            .find(|h| h.consumers.len() != manifest.consumer_ids.len())
        {
            return Err(ResultsError::Corrupt {
                run_id: run_id.to_string(),
                what: format!(
                    "hour {} has {} consumers, manifest lists {}",
                    bad.hour,
                    bad.consumers.len(),
                    manifest.consumer_ids.len()
                ),
            });
        }

        let record = SimRecord {
            worst_point: manifest.worst_point,
            hours,
        };
        Ok((manifest, record))
    }

    /// Runs of one project, oldest first.
    pub fn list_runs(&self, project_name: &str) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();

        if !self.root_dir.exists() {
            return Ok(runs);
        }

        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id)
                    && manifest.project_name == project_name
                {
                    runs.push(manifest);
                }
            }
        }

        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// RFC 3339 timestamp for new manifests.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
