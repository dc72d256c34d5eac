//! Schema migration framework.

use crate::ProjectError;
use crate::schema::{PointRoleDef, Project};

pub const LATEST_VERSION: u32 = 2;

pub fn migrate_to_latest(mut project: Project) -> Result<Project, ProjectError> {
    while project.version < LATEST_VERSION {
        project = migrate_one_version(project)?;
    }
    Ok(project)
}

fn migrate_one_version(project: Project) -> Result<Project, ProjectError> {
    match project.version {
        0 => migrate_v0_to_v1(project),
        1 => migrate_v1_to_v2(project),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

fn migrate_v0_to_v1(mut project: Project) -> Result<Project, ProjectError> {
    project.version = 1;
    Ok(project)
}

/// Version 1 had no explicit point roles: producers were recognised by name.
fn migrate_v1_to_v2(mut project: Project) -> Result<Project, ProjectError> {
    for point in &mut project.points {
        if point.role != PointRoleDef::Consumer || point.demand.is_some() {
            continue;
        }
        let name = format!("{} {}", point.id, point.name).to_ascii_lowercase();
        if name.contains("producer") || name.contains("plant") || name.contains("erzeuger") {
            point.role = PointRoleDef::Producer;
        }
    }

    project.version = 2;
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProjectBuilder;

    #[test]
    fn migrate_latest_is_noop() {
        let project = ProjectBuilder::new("test").build();
        let migrated = migrate_to_latest(project.clone()).unwrap();
        assert_eq!(migrated, project);
    }

    #[test]
    fn migrate_named_producer_to_role() {
        let mut project = ProjectBuilder::new("old")
            .consumer("heating plant", [0.0, 0.0], None)
            .consumer("house", [10.0, 0.0], Some("d1"))
            .consumer("shed", [20.0, 0.0], None)
            .build();
        project.version = 1;

        let migrated = migrate_to_latest(project).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
        assert_eq!(migrated.points[0].role, PointRoleDef::Producer);
        assert_eq!(migrated.points[1].role, PointRoleDef::Consumer);
        assert_eq!(migrated.points[2].role, PointRoleDef::Consumer);
    }

    #[test]
    fn future_version_is_left_to_validation() {
        let mut project = ProjectBuilder::new("test").build();
        project.version = LATEST_VERSION + 1;
        assert!(migrate_to_latest(project).is_ok());
    }
}
