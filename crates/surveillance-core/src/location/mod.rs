//! Administrative hierarchy: province → district → sector.
//!
//! Static reference data used to validate registrations, to drive the
//! cascading province/district/sector pickers, and to name grouping levels.

mod rwanda;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{LocationSnapshot, Scope};

/// Hierarchy errors.
#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Unknown province: {0}")]
    UnknownProvince(String),

    #[error("Unknown district {district} in province {province}")]
    UnknownDistrict { province: String, district: String },

    #[error("Unknown sector {sector} in district {district}")]
    UnknownSector { district: String, sector: String },

    #[error("Sector {0} is not in any district")]
    UnplacedSector(String),

    #[error("Sector {0} exists in more than one district")]
    AmbiguousSector(String),

    #[error("{0} must be selected first")]
    MissingParent(&'static str),

    #[error("Failed to read hierarchy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid hierarchy JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type LocationResult<T> = Result<T, LocationError>;

/// A district and its sectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct District {
    pub name: String,
    pub sectors: Vec<String>,
}

/// A province and its districts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Province {
    pub name: String,
    pub districts: Vec<District>,
}

/// The full reference tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationHierarchy {
    provinces: Vec<Province>,
}

impl Default for LocationHierarchy {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocationHierarchy {
    /// The compiled-in table.
    pub fn builtin() -> Self {
        let provinces = rwanda::PROVINCES
            .iter()
            .map(|(province, districts)| Province {
                name: province.to_string(),
                districts: districts
                    .iter()
                    .map(|(district, sectors)| District {
                        name: district.to_string(),
                        sectors: sectors.iter().map(|s| s.to_string()).collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { provinces }
    }

    /// Build from an explicit province list.
    pub fn new(provinces: Vec<Province>) -> Self {
        Self { provinces }
    }

    /// Parse a JSON array of provinces (`[{"name", "districts": [{"name", "sectors"}]}]`).
    pub fn from_json_str(json: &str) -> LocationResult<Self> {
        let provinces: Vec<Province> = serde_json::from_str(json)?;
        Ok(Self { provinces })
    }

    /// Load a JSON province list from disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> LocationResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    pub fn province(&self, name: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.name == name)
    }

    /// Districts of a province.
    pub fn districts(&self, province: &str) -> LocationResult<&[District]> {
        self.province(province)
            .map(|p| p.districts.as_slice())
            .ok_or_else(|| LocationError::UnknownProvince(province.to_string()))
    }

    /// Sectors of a district.
    pub fn sectors(&self, province: &str, district: &str) -> LocationResult<&[String]> {
        self.districts(province)?
            .iter()
            .find(|d| d.name == district)
            .map(|d| d.sectors.as_slice())
            .ok_or_else(|| LocationError::UnknownDistrict {
                province: province.to_string(),
                district: district.to_string(),
            })
    }

    /// Check that province, district and sector nest correctly.
    pub fn validate(&self, location: &LocationSnapshot) -> LocationResult<()> {
        let sectors = self.sectors(&location.province, &location.district)?;
        if sectors.iter().any(|s| *s == location.sector) {
            Ok(())
        } else {
            Err(LocationError::UnknownSector {
                district: location.district.clone(),
                sector: location.sector.clone(),
            })
        }
    }

    /// Check that every level set on a scope exists under its parent.
    pub fn validate_scope(&self, scope: &Scope) -> LocationResult<()> {
        match (&scope.province, &scope.district, &scope.sector) {
            (None, None, None) => Ok(()),
            (Some(p), None, None) => self.districts(p).map(|_| ()),
            (Some(p), Some(d), None) => self.sectors(p, d).map(|_| ()),
            (Some(p), Some(d), Some(s)) => {
                self.validate(&LocationSnapshot::new(p.clone(), d.clone(), s.clone()))
            }
            (None, _, _) => Err(LocationError::MissingParent("province")),
            (Some(_), None, Some(_)) => Err(LocationError::MissingParent("district")),
        }
    }
}

impl LocationHierarchy {
    /// Fill in the province and district of a scope that names its sector
    /// without them. The sector must sit in exactly one district consistent
    /// with whatever parents are given.
    pub fn complete_scope(&self, scope: &Scope) -> LocationResult<Scope> {
        let sector = match &scope.sector {
            Some(sector) if scope.province.is_none() || scope.district.is_none() => sector,
            _ => return Ok(scope.clone()),
        };
        let matches: Vec<(&Province, &District)> = self
            .provinces
            .iter()
            .filter(|p| scope.province.as_ref().map_or(true, |name| *name == p.name))
            .flat_map(|p| p.districts.iter().map(move |d| (p, d)))
            .filter(|(_, d)| scope.district.as_ref().map_or(true, |name| *name == d.name))
            .filter(|(_, d)| d.sectors.iter().any(|s| s == sector))
            .collect();
        match matches.as_slice() {
            [(province, district)] => Ok(Scope::sector(
                province.name.clone(),
                district.name.clone(),
                sector.clone(),
            )),
            [] => Err(LocationError::UnplacedSector(sector.clone())),
            _ => Err(LocationError::AmbiguousSector(sector.clone())),
        }
    }
}

/// Cascading province → district → sector selection.
///
/// Changing a level clears every level below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
}

impl LocationSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_province(
        &mut self,
        hierarchy: &LocationHierarchy,
        province: &str,
    ) -> LocationResult<()> {
        hierarchy.districts(province)?;
        if self.province.as_deref() != Some(province) {
            self.province = Some(province.to_string());
            self.district = None;
            self.sector = None;
        }
        Ok(())
    }

    pub fn select_district(
        &mut self,
        hierarchy: &LocationHierarchy,
        district: &str,
    ) -> LocationResult<()> {
        let province = self
            .province
            .as_deref()
            .ok_or(LocationError::MissingParent("province"))?;
        hierarchy.sectors(province, district)?;
        if self.district.as_deref() != Some(district) {
            self.district = Some(district.to_string());
            self.sector = None;
        }
        Ok(())
    }

    pub fn select_sector(&mut self, hierarchy: &LocationHierarchy, sector: &str) -> LocationResult<()> {
        let province = self
            .province
            .as_deref()
            .ok_or(LocationError::MissingParent("province"))?;
        let district = self
            .district
            .as_deref()
            .ok_or(LocationError::MissingParent("district"))?;
        hierarchy.validate(&LocationSnapshot::new(province, district, sector))?;
        self.sector = Some(sector.to_string());
        Ok(())
    }

    /// Clear everything.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Use the selection as a read scope.
    pub fn to_scope(&self) -> Scope {
        Scope {
            province: self.province.clone(),
            district: self.district.clone(),
            sector: self.sector.clone(),
        }
    }

    /// A complete snapshot, once all three levels are chosen.
    pub fn to_snapshot(&self) -> Option<LocationSnapshot> {
        match (&self.province, &self.district, &self.sector) {
            (Some(p), Some(d), Some(s)) => Some(LocationSnapshot::new(p.clone(), d.clone(), s.clone())),
            _ => None,
        }
    }
}
