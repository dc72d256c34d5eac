//! Content-based hashing for run IDs.

use hn_project::Project;
use sha2::{Digest, Sha256};

use crate::types::RunType;

pub fn compute_run_id(project: &Project, run_type: &RunType, solver_version: &str) -> String {
    let mut hasher = Sha256::new();

    let project_json = serde_json::to_string(project).unwrap_or_default();
    hasher.update(project_json.as_bytes());

    let run_type_json = serde_json::to_string(run_type).unwrap_or_default();
    hasher.update(run_type_json.as_bytes());

    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}
