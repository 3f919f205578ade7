//! Caller identity and scope.

use serde::{Deserialize, Serialize};

use super::location::LocationSnapshot;

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Veterinarian,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Veterinarian => "veterinarian",
            Role::Admin => "admin",
            Role::SuperAdmin => "super_admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        [Role::Veterinarian, Role::Admin, Role::SuperAdmin]
            .into_iter()
            .find(|r| r.as_str() == s)
    }
}

/// Location restriction applied to every read on behalf of a caller.
///
/// `None` on a level means "any". An all-`None` scope is the national view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Scope {
    pub province: Option<String>,
    pub district: Option<String>,
    pub sector: Option<String>,
}

impl Scope {
    pub fn national() -> Self {
        Self::default()
    }

    pub fn province(province: impl Into<String>) -> Self {
        Self {
            province: Some(province.into()),
            ..Default::default()
        }
    }

    pub fn district(province: impl Into<String>, district: impl Into<String>) -> Self {
        Self {
            province: Some(province.into()),
            district: Some(district.into()),
            sector: None,
        }
    }

    pub fn sector(
        province: impl Into<String>,
        district: impl Into<String>,
        sector: impl Into<String>,
    ) -> Self {
        Self {
            province: Some(province.into()),
            district: Some(district.into()),
            sector: Some(sector.into()),
        }
    }

    pub fn is_national(&self) -> bool {
        self.province.is_none() && self.district.is_none() && self.sector.is_none()
    }

    /// Whether a location falls inside this scope.
    pub fn contains(&self, location: &LocationSnapshot) -> bool {
        fn level_ok(wanted: &Option<String>, actual: &str) -> bool {
            wanted.as_deref().map_or(true, |w| w == actual)
        }
        level_ok(&self.province, &location.province)
            && level_ok(&self.district, &location.district)
            && level_ok(&self.sector, &location.sector)
    }
}

/// An authenticated caller with a resolved scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Caller {
    pub user_id: String,
    pub role: Role,
    pub scope: Scope,
}

impl Caller {
    pub fn new(user_id: impl Into<String>, role: Role, scope: Scope) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            scope,
        }
    }

    /// Resolve the scope from a user profile: veterinarians assigned to a
    /// sector only see that sector, everyone else sees the whole country.
    pub fn from_profile(
        user_id: impl Into<String>,
        role: Role,
        province: Option<String>,
        district: Option<String>,
        sector: Option<String>,
    ) -> Self {
        let scope = match (role, sector) {
            (Role::Veterinarian, Some(sector)) => Scope {
                province,
                district,
                sector: Some(sector),
            },
            _ => Scope::national(),
        };
        Self::new(user_id, role, scope)
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == Role::SuperAdmin
    }
}
