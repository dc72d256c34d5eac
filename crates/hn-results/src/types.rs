//! Result data types.

use serde::{Deserialize, Serialize};

pub type RunId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub project_name: String,
    pub timestamp: String,
    pub run_type: RunType,
    pub solver_version: String,
    /// Index into `consumer_ids` of the pressure controller's worst point.
    pub worst_point: usize,
    pub consumer_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unconverged_hours: Vec<usize>,
}

impl RunManifest {
    pub fn worst_point_id(&self) -> Option<&str> {
        self.consumer_ids.get(self.worst_point).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum RunType {
    Hourly {
        first_hour: usize,
        hours: usize,
        max_iterations: usize,
    },
    /// Hours split into chunks, each chunk starting from initial conditions.
    ChunkParallel {
        first_hour: usize,
        hours: usize,
        max_iterations: usize,
        chunk_hours: usize,
    },
}

impl RunType {
    pub fn hours(&self) -> usize {
        match *self {
            RunType::Hourly { hours, .. } | RunType::ChunkParallel { hours, .. } => hours,
        }
    }
}
