//! Project validation logic.

use std::collections::HashSet;

use hn_components::PipeType;

use crate::schema::{DemandSeriesDef, PointDef, PointRoleDef, Project};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported feature: {feature} - {reason}")]
    Unsupported { feature: String, reason: String },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

fn invalid(field: impl Into<String>, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.into(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn unique<'a>(
    ids: impl IntoIterator<Item = &'a String>,
    context: &str,
) -> Result<HashSet<&'a String>, ValidationError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ValidationError::DuplicateId {
                id: id.clone(),
                context: context.to_string(),
            });
        }
    }
    Ok(seen)
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > crate::migrate::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    unique(project.streets.iter().map(|s| &s.id), "streets")?;
    for street in &project.streets {
        if street.points.len() < 2 {
            return Err(invalid(
                format!("street '{}'", street.id),
                street.points.len(),
                "needs at least two vertices",
            ));
        }
        if street.points.iter().flatten().any(|v| !v.is_finite()) {
            return Err(invalid(
                format!("street '{}'", street.id),
                "NaN/inf",
                "coordinates must be finite",
            ));
        }
    }

    let series_ids = unique(project.demand_series.iter().map(|s| &s.id), "demand_series")?;
    let hours = project.demand_series.first().map(|s| s.hourly_w.len());
    for series in &project.demand_series {
        validate_series(series, hours.unwrap_or(0))?;
    }

    let point_ids = unique(project.points.iter().map(|p| &p.id), "points")?;
    for point in &project.points {
        validate_point(point, &series_ids)?;
    }
    if project.producers().count() > 1 {
        return Err(ValidationError::Unsupported {
            feature: "multiple producers".to_string(),
            reason: "a network is fed by one circulation pump".to_string(),
        });
    }

    validate_plant(project, hours.unwrap_or(0))?;

    project
        .network
        .validate()
        .map_err(|e| invalid("network", e, "invalid generation options"))?;

    let pipes = &project.pipes;
    for o in &pipes.overrides {
        PipeType::new(o.name.clone(), o.inner_diameter_mm, o.roughness_mm)
            .map_err(|e| invalid(format!("pipes.overrides '{}'", o.name), e, "invalid pipe type"))?;
    }
    let known = pipes.overrides.iter().any(|o| o.name == pipes.pipe_type)
        || hn_components::PipeCatalog::standard()
            .get(&pipes.pipe_type)
            .is_ok();
    if !known {
        return Err(ValidationError::MissingReference {
            id: pipes.pipe_type.clone(),
            context: "pipes.pipe_type".to_string(),
        });
    }

    let sim = &project.simulation;
    if sim.max_iterations == 0 {
        return Err(invalid("simulation.max_iterations", 0, "must be positive"));
    }
    if sim.chunk_hours == Some(0) {
        return Err(invalid("simulation.chunk_hours", 0, "must be positive"));
    }
    if let Some(range) = &sim.hours {
        if range.start > range.end || range.end > hours.unwrap_or(0) {
            return Err(invalid(
                "simulation.hours",
                format!("{}..{}", range.start, range.end),
                "outside the demand series",
            ));
        }
    }
    if let Some(worst) = &sim.worst_point {
        let is_consumer = point_ids.contains(worst)
            && project.consumers().any(|p| &p.id == worst);
        if !is_consumer {
            return Err(ValidationError::MissingReference {
                id: worst.clone(),
                context: "simulation.worst_point".to_string(),
            });
        }
    }

    project
        .controls
        .pressure
        .validate()
        .map_err(|e| invalid("controls.pressure", e, "invalid controller setting"))?;
    project
        .controls
        .return_temperature
        .validate()
        .map_err(|e| invalid("controls.return_temperature", e, "invalid controller setting"))?;

    Ok(())
}

fn validate_point(point: &PointDef, series_ids: &HashSet<&String>) -> Result<(), ValidationError> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(invalid(
            format!("point '{}'", point.id),
            format!("({}, {})", point.x, point.y),
            "coordinates must be finite",
        ));
    }
    if let Some(d) = point.diameter_mm {
        if !d.is_finite() || d <= 0.0 {
            return Err(invalid(
                format!("point '{}' diameter_mm", point.id),
                d,
                "must be positive",
            ));
        }
    }
    match (&point.role, &point.demand) {
        (PointRoleDef::Producer, Some(_)) => Err(invalid(
            format!("point '{}' demand", point.id),
            "set",
            "producers carry no demand",
        )),
        (PointRoleDef::Consumer, Some(id)) if !series_ids.contains(id) => {
            Err(ValidationError::MissingReference {
                id: id.clone(),
                context: format!("point '{}' demand", point.id),
            })
        }
        _ => Ok(()),
    }
}

fn validate_series(series: &DemandSeriesDef, hours: usize) -> Result<(), ValidationError> {
    let field = |name: &str| format!("demand_series '{}' {}", series.id, name);
    let check = |name: &str, values: &[f64]| {
        if values.len() != hours {
            return Err(invalid(field(name), values.len(), "series lengths differ"));
        }
        if let Some(v) = values.iter().find(|v| !v.is_finite()) {
            return Err(invalid(field(name), v, "must be finite"));
        }
        Ok(())
    };

    check("hourly_w", &series.hourly_w)?;
    if let Some(v) = series.hourly_w.iter().find(|&&v| v < 0.0) {
        return Err(invalid(field("hourly_w"), v, "demand cannot be negative"));
    }
    if let Some(values) = &series.target_return_c {
        check("target_return_c", values)?;
    }
    if let Some(values) = &series.min_supply_c {
        check("min_supply_c", values)?;
    }
    Ok(())
}

fn validate_plant(project: &Project, hours: usize) -> Result<(), ValidationError> {
    let plant = &project.plant;
    if !(plant.lift_bar.is_finite() && plant.lift_bar > 0.0) {
        return Err(invalid("plant.lift_bar", plant.lift_bar, "must be positive"));
    }
    if !(plant.flow_bar.is_finite() && plant.flow_bar >= plant.lift_bar) {
        return Err(invalid("plant.flow_bar", plant.flow_bar, "must be at least the lift"));
    }
    if !(plant.supply_temperature_c.is_finite()
        && plant.design_return_c.is_finite()
        && plant.supply_temperature_c > plant.design_return_c)
    {
        return Err(invalid(
            "plant.design_return_c",
            plant.design_return_c,
            "must be below the supply temperature",
        ));
    }
    if !(plant.design_velocity_mps.is_finite() && plant.design_velocity_mps > 0.0) {
        return Err(invalid(
            "plant.design_velocity_mps",
            plant.design_velocity_mps,
            "must be positive",
        ));
    }
    if let Some(schedule) = &plant.supply_schedule_c {
        if schedule.len() != hours {
            return Err(invalid(
                "plant.supply_schedule_c",
                schedule.len(),
                "series lengths differ",
            ));
        }
        if let Some(v) = schedule.iter().find(|v| !v.is_finite()) {
            return Err(invalid("plant.supply_schedule_c", v, "must be finite"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ProjectBuilder;

    fn district() -> ProjectBuilder {
        ProjectBuilder::new("district")
            .street("s1", &[[0.0, 0.0], [100.0, 0.0]])
            .producer("plant", [0.0, 10.0])
            .consumer("h1", [50.0, 10.0], Some("d1"))
            .demand("d1", vec![1000.0, 2000.0, 1500.0])
    }

    #[test]
    fn valid_district() {
        validate_project(&district().build()).unwrap();
    }

    #[test]
    fn duplicate_point_rejected() {
        let project = district().consumer("h1", [60.0, 10.0], None).build();
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::DuplicateId { .. })
        ));
    }

    #[test]
    fn dangling_demand_rejected() {
        let project = district().consumer("h2", [60.0, 10.0], Some("nope")).build();
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn non_finite_coordinates_rejected() {
        let project = district().consumer("h2", [f64::NAN, 10.0], None).build();
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::InvalidValue { .. })
        ));
        let project = district().street("s2", &[[0.0, 0.0], [f64::INFINITY, 1.0]]).build();
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn ragged_series_rejected() {
        let project = district().demand("d2", vec![1.0]).build();
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn bad_controller_settings_rejected() {
        let mut project = district().build();
        project.controls.pressure.gain = -1.0;
        assert!(validate_project(&project).is_err());

        let mut project = district().build();
        project.controls.return_temperature.max_iterations = 0;
        assert!(validate_project(&project).is_err());
    }

    #[test]
    fn worst_point_must_be_a_consumer() {
        let mut project = district().build();
        project.simulation.worst_point = Some("plant".to_string());
        assert!(validate_project(&project).is_err());
        project.simulation.worst_point = Some("h1".to_string());
        assert!(validate_project(&project).is_ok());
    }

    #[test]
    fn unknown_pipe_type_rejected() {
        let mut project = district().build();
        project.pipes.pipe_type = "DN 999".to_string();
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::MissingReference { .. })
        ));
    }

    #[test]
    fn second_producer_unsupported() {
        let project = district().producer("plant-2", [100.0, 10.0]).build();
        assert!(matches!(
            validate_project(&project),
            Err(ValidationError::Unsupported { .. })
        ));
    }
}
