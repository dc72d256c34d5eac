//! Project loading, saving, validation, and introspection.

use std::path::Path;

use hn_project::Project;

use crate::error::{AppError, AppResult};

/// Headline numbers of a project.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSummary {
    pub name: String,
    pub version: u32,
    pub streets: usize,
    pub consumers: usize,
    pub producers: usize,
    pub hours: usize,
    /// Sum of the consumers' peak demands.
    pub peak_demand_w: f64,
}

/// Load, migrate and validate a project (`.json` or YAML).
pub fn load_project(path: &Path) -> AppResult<Project> {
    if !path.exists() {
        return Err(AppError::ProjectFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(hn_project::load_project(path)?)
}

pub fn save_project(path: &Path, project: &Project) -> AppResult<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("json") => hn_project::save_json(path, project)?,
        _ => hn_project::save_yaml(path, project)?,
    }
    Ok(())
}

pub fn validate_project(project: &Project) -> AppResult<()> {
    hn_project::validate_project(project)?;
    Ok(())
}

pub fn summarize(project: &Project) -> ProjectSummary {
    let peak_demand_w = project
        .consumers()
        .filter_map(|p| p.demand.as_deref())
        .filter_map(|id| project.series(id))
        .map(|s| s.peak_w())
        .sum();

    ProjectSummary {
        name: project.name.clone(),
        version: project.version,
        streets: project.streets.len(),
        consumers: project.consumers().count(),
        producers: project.producers().count(),
        hours: project_hours(project),
        peak_demand_w,
    }
}

/// Length of the project's hourly series.
pub(crate) fn project_hours(project: &Project) -> usize {
    project
        .demand_series
        .first()
        .map_or(0, |s| s.hourly_w.len())
}
