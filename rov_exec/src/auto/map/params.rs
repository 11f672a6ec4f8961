//! # World Map Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::MapError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapParams {
    /// Number of cells along each side of the square map.
    pub map_size: usize,

    /// Rectified pixels per world cell.
    pub map_scale: f64,

    /// Maximum deviation of pitch and roll from level for the map to be updated.
    ///
    /// Units: degrees
    pub level_tol_deg: f64,

    /// How navigable observations clear obstacle memory.
    pub nav_override: NavOverride,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which cells have their obstacle layer cleared by navigable observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavOverride {
    /// Only cells seen navigable in the current update.
    Tick,

    /// Every cell ever seen navigable.
    Cumulative,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MapParams {
    fn default() -> Self {
        Self {
            map_size: 200,
            map_scale: 10.0,
            level_tol_deg: 1.0,
            nav_override: NavOverride::Tick,
        }
    }
}

impl MapParams {
    /// Check the parameters describe a usable map.
    pub fn validate(&self) -> Result<(), MapError> {
        if self.map_size == 0 {
            return Err(MapError::ZeroSize);
        }

        if !(self.map_scale.is_finite() && self.map_scale > 0.0) {
            return Err(MapError::InvalidScale(self.map_scale));
        }

        if !(self.level_tol_deg >= 0.0) {
            return Err(MapError::InvalidLevelTol(self.level_tol_deg));
        }

        Ok(())
    }
}

impl Default for NavOverride {
    fn default() -> Self {
        NavOverride::Tick
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(MapParams::default().validate().is_ok());

        let params: MapParams = util::params::from_str("map_size = 0\n").unwrap();
        assert!(matches!(params.validate(), Err(MapError::ZeroSize)));

        for &scale in [0.0, -10.0, f64::NAN, f64::INFINITY].iter() {
            let params = MapParams {
                map_scale: scale,
                ..Default::default()
            };
            assert!(matches!(params.validate(), Err(MapError::InvalidScale(_))));
        }

        let params = MapParams {
            level_tol_deg: -1.0,
            ..Default::default()
        };
        assert!(matches!(params.validate(), Err(MapError::InvalidLevelTol(_))));
    }
}
