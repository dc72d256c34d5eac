//! Standard pipe types.

use hn_core::units::{Length, mm};
use serde::{Deserialize, Serialize};

use crate::common::check_positive;
use crate::error::{ComponentError, ComponentResult};

/// A standard pipe type. Dimensions in millimetres as listed by manufacturers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeType {
    pub name: String,
    pub inner_diameter_mm: f64,
    /// Absolute wall roughness.
    pub roughness_mm: f64,
}

impl PipeType {
    pub fn new(
        name: impl Into<String>,
        inner_diameter_mm: f64,
        roughness_mm: f64,
    ) -> ComponentResult<Self> {
        check_positive(inner_diameter_mm, "inner diameter")?;
        check_positive(roughness_mm, "roughness")?;
        Ok(Self {
            name: name.into(),
            inner_diameter_mm,
            roughness_mm,
        })
    }

    pub fn inner_diameter(&self) -> Length {
        mm(self.inner_diameter_mm)
    }

    pub fn roughness(&self) -> Length {
        mm(self.roughness_mm)
    }
}

/// Bonded steel pipes, double reinforced insulation: (name, inner diameter mm).
const KMR_2V: &[(&str, f64)] = &[
    ("KMR 20/110-2v", 21.7),
    ("KMR 25/110-2v", 28.5),
    ("KMR 32/125-2v", 37.2),
    ("KMR 40/140-2v", 43.1),
    ("KMR 50/160-2v", 54.5),
    ("KMR 65/180-2v", 70.3),
    ("KMR 80/200-2v", 82.5),
    ("KMR 100/250-2v", 107.1),
    ("KMR 125/280-2v", 132.5),
    ("KMR 150/315-2v", 160.3),
    ("KMR 200/400-2v", 210.1),
    ("KMR 250/500-2v", 263.0),
    ("KMR 300/560-2v", 312.7),
];

const STEEL_ROUGHNESS_MM: f64 = 0.1;

/// Lookup table of pipe types, ordered by ascending diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipeCatalog {
    types: Vec<PipeType>,
}

impl PipeCatalog {
    /// The built-in KMR series.
    pub fn standard() -> Self {
        let types = KMR_2V
            .iter()
            .map(|&(name, d)| PipeType {
                name: name.to_string(),
                inner_diameter_mm: d,
                roughness_mm: STEEL_ROUGHNESS_MM,
            })
            .collect();
        Self { types }
    }

    /// Add or replace types; the catalog stays sorted by diameter.
    pub fn with_overrides(mut self, overrides: impl IntoIterator<Item = PipeType>) -> Self {
        for ty in overrides {
            match self.types.iter_mut().find(|t| t.name == ty.name) {
                Some(existing) => *existing = ty,
                None => self.types.push(ty),
            }
        }
        self.types
            .sort_by(|a, b| a.inner_diameter_mm.total_cmp(&b.inner_diameter_mm));
        self
    }

    pub fn types(&self) -> &[PipeType] {
        &self.types
    }

    pub fn get(&self, name: &str) -> ComponentResult<&PipeType> {
        self.types
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| ComponentError::UnknownPipeType {
                name: name.to_string(),
            })
    }

    /// Smallest type whose inner diameter is at least `diameter_mm`.
    pub fn smallest_at_least(&self, diameter_mm: f64) -> Option<&PipeType> {
        self.types.iter().find(|t| t.inner_diameter_mm >= diameter_mm)
    }
}

impl Default for PipeCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uom::si::length::meter;

    #[test]
    fn standard_lookup() {
        let catalog = PipeCatalog::standard();
        let ty = catalog.get("KMR 100/250-2v").unwrap();
        assert!((ty.inner_diameter().get::<meter>() - 0.1071).abs() < 1e-12);
        assert!(catalog.get("nope").is_err());
    }

    #[test]
    fn overrides_replace_and_insert_sorted() {
        let catalog = PipeCatalog::standard().with_overrides([
            PipeType::new("KMR 100/250-2v", 100.0, 0.05).unwrap(),
            PipeType::new("PE 15", 15.0, 0.01).unwrap(),
        ]);
        assert_eq!(catalog.types()[0].name, "PE 15");
        assert_eq!(catalog.get("KMR 100/250-2v").unwrap().inner_diameter_mm, 100.0);
        assert_eq!(catalog.types().len(), KMR_2V.len() + 1);
    }

    #[test]
    fn smallest_fitting_type() {
        let catalog = PipeCatalog::standard();
        assert_eq!(catalog.smallest_at_least(50.0).unwrap().name, "KMR 50/160-2v");
        assert!(catalog.smallest_at_least(1000.0).is_none());
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(PipeType::new("x", 0.0, 0.1).is_err());
        assert!(PipeType::new("x", 10.0, f64::NAN).is_err());
    }
}
