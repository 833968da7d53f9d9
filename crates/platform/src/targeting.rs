use adpilot_core::config::ProvisioningConfig;
use serde::Serialize;

/// Targeting spec attached to every ad set, serialized straight into the
/// platform's `targeting` field. Values come from fixed configuration, not
/// per-call negotiation.
#[derive(Debug, Clone, Serialize)]
pub struct Targeting {
    pub geo_locations: GeoLocations,
    pub age_min: u8,
    pub age_max: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoLocations {
    pub countries: Vec<String>,
}

impl Targeting {
    pub fn from_config(config: &ProvisioningConfig) -> Self {
        Self {
            geo_locations: GeoLocations {
                countries: config.countries.clone(),
            },
            age_min: config.age_min,
            age_max: config.age_max,
        }
    }
}
