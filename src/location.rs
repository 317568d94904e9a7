//! Fixed table of forecast locations

use crate::ClimaError;
use serde::{Deserialize, Serialize};

/// A named forecast location. Identity is `id`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Stable key used in snapshots and URLs
    pub id: String,
    /// Full name shown in the header
    pub display_name: String,
    /// Neighbourhood / district line below the name
    pub sub_label: String,
    /// Compact name for location tabs
    pub short_name: String,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Location {
    #[must_use]
    pub fn new(
        id: &str,
        display_name: &str,
        sub_label: &str,
        short_name: &str,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.to_string(),
            display_name: display_name.to_string(),
            sub_label: sub_label.to_string(),
            short_name: short_name.to_string(),
            latitude,
            longitude,
        }
    }

    /// Format location as coordinates string
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Ordered, immutable set of locations queried on every refresh
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRegistry {
    locations: Vec<Location>,
}

impl Default for LocationRegistry {
    fn default() -> Self {
        Self::new(vec![
            Location::new(
                "itajai",
                "Prefeitura de Itajaí",
                "Centro / Vila Operária",
                "Itajaí",
                -26.9046,
                -48.6612,
            ),
            Location::new(
                "bc",
                "Rua Bibiano Santos",
                "Pioneiros - BC",
                "BC (Pioneiros)",
                -26.9745,
                -48.6360,
            ),
        ])
    }
}

impl LocationRegistry {
    /// Build a registry; later duplicates of an id are ignored
    #[must_use]
    pub fn new(locations: Vec<Location>) -> Self {
        let mut unique: Vec<Location> = Vec::with_capacity(locations.len());
        for location in locations {
            if unique.iter().all(|l| l.id != location.id) {
                unique.push(location);
            }
        }
        Self { locations: unique }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.id == id)
    }

    pub fn require(&self, id: &str) -> Result<&Location, ClimaError> {
        self.get(id).ok_or_else(|| ClimaError::unknown_location(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.locations.iter()
    }

    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.locations.iter().map(|l| l.id.as_str()).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
