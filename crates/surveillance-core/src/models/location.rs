//! Location snapshot models.

use serde::{Deserialize, Serialize};

/// Grouping label used when a record carries no usable location component.
pub const UNKNOWN_LOCATION: &str = "unknown";

/// Where an animal lives, or where a case was reported.
///
/// Disease cases hold their own copy taken at report time; it is never
/// refreshed from the animal afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocationSnapshot {
    pub province: String,
    pub district: String,
    pub sector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub village: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl LocationSnapshot {
    /// Create a snapshot with the three administrative levels.
    pub fn new(
        province: impl Into<String>,
        district: impl Into<String>,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            province: province.into(),
            district: district.into(),
            sector: sector.into(),
            ..Default::default()
        }
    }

    /// Attach map coordinates.
    pub fn with_coordinates(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    /// Both latitude and longitude are present.
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }

    /// Province label for grouping.
    pub fn province_label(&self) -> String {
        grouping_label(&self.province)
    }

    /// District label for grouping.
    pub fn district_label(&self) -> String {
        grouping_label(&self.district)
    }

    /// Sector label for grouping.
    pub fn sector_label(&self) -> String {
        grouping_label(&self.sector)
    }

    /// True when any administrative level is blank.
    pub fn is_incomplete(&self) -> bool {
        [&self.province, &self.district, &self.sector]
            .iter()
            .any(|part| part.trim().is_empty())
    }
}

/// Trimmed label, or [`UNKNOWN_LOCATION`] when blank.
pub fn grouping_label(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        UNKNOWN_LOCATION.to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_parts_group_as_unknown() {
        let loc = LocationSnapshot::new("Kigali City", "  ", "");
        assert_eq!(loc.province_label(), "Kigali City");
        assert_eq!(loc.district_label(), UNKNOWN_LOCATION);
        assert_eq!(loc.sector_label(), UNKNOWN_LOCATION);
        assert!(loc.is_incomplete());
    }

    #[test]
    fn test_coordinates() {
        let loc = LocationSnapshot::new("Eastern", "Nyagatare", "Karangazi");
        assert!(!loc.has_coordinates());
        let loc = loc.with_coordinates(-1.29, 30.33);
        assert!(loc.has_coordinates());
    }

    #[test]
    fn test_serializes_camel_case_without_empty_optionals() {
        let loc = LocationSnapshot::new("Northern", "Musanze", "Muhoza");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["province"], "Northern");
        assert!(json.get("latitude").is_none());
    }
}
