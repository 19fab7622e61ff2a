//! Fixed catalogs used by the synthetic generator and local structuring

use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight Andalusian provinces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Province {
    Granada,
    #[serde(rename = "Málaga")]
    Malaga,
    Sevilla,
    #[serde(rename = "Córdoba")]
    Cordoba,
    #[serde(rename = "Cádiz")]
    Cadiz,
    #[serde(rename = "Almería")]
    Almeria,
    #[serde(rename = "Jaén")]
    Jaen,
    Huelva,
}

impl Province {
    /// Provinces in the order fallback data cycles through them
    pub const CYCLE: [Province; 8] = [
        Province::Granada,
        Province::Malaga,
        Province::Sevilla,
        Province::Cordoba,
        Province::Cadiz,
        Province::Almeria,
        Province::Jaen,
        Province::Huelva,
    ];

    /// Province for a result position
    pub fn for_index(index: usize) -> Province {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// Display name, with accents
    pub fn name(&self) -> &'static str {
        match self {
            Province::Granada => "Granada",
            Province::Malaga => "Málaga",
            Province::Sevilla => "Sevilla",
            Province::Cordoba => "Córdoba",
            Province::Cadiz => "Cádiz",
            Province::Almeria => "Almería",
            Province::Jaen => "Jaén",
            Province::Huelva => "Huelva",
        }
    }

    /// Lowercase name as used in synthetic URLs
    pub fn slug(&self) -> String {
        self.name().to_lowercase()
    }
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Property types cycled by the synthetic generator
pub const PROPERTY_TYPES: [&str; 5] = ["Casa Rural", "Cortijo", "Villa", "Finca", "Chalet"];

/// Amenity bundles cycled by local structuring
pub const AMENITY_BUNDLES: [&[&str]; 5] = [
    &["Piscina", "Wifi", "Jardín", "BBQ", "Parking"],
    &["Aire acondicionado", "Chimenea", "Terraza", "Wifi", "Cocina equipada"],
    &["Piscina privada", "Wifi", "Vistas montaña", "Parking", "Jardín"],
    &["Jacuzzi", "Wifi", "Aire acondicionado", "BBQ", "Terraza"],
    &["Piscina", "Wifi", "Chimenea", "Jardín", "Parking gratuito"],
];

/// Placeholder images cycled by local structuring
pub const IMAGES: [&str; 8] = [
    "https://images.unsplash.com/photo-1582268611958-ebfd161ef9cf?w=800",
    "https://images.unsplash.com/photo-1564013799919-ab600027ffc6?w=800",
    "https://images.unsplash.com/photo-1600596542815-ffad4c1539a9?w=800",
    "https://images.unsplash.com/photo-1600585154340-be6161a56a0c?w=800",
    "https://images.unsplash.com/photo-1600607687939-ce8a6c25118c?w=800",
    "https://images.unsplash.com/photo-1600566753190-17f0baa2a6c3?w=800",
    "https://images.unsplash.com/photo-1600573472591-ee6b68d14c68?w=800",
    "https://images.unsplash.com/photo-1600047509807-ba8f99d2cdde?w=800",
];

pub fn property_type(index: usize) -> &'static str {
    PROPERTY_TYPES[index % PROPERTY_TYPES.len()]
}

pub fn amenities(index: usize) -> Vec<String> {
    AMENITY_BUNDLES[index % AMENITY_BUNDLES.len()]
        .iter()
        .map(|a| a.to_string())
        .collect()
}

pub fn image(index: usize) -> &'static str {
    IMAGES[index % IMAGES.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_province_cycle() {
        assert_eq!(Province::for_index(0), Province::Granada);
        assert_eq!(Province::for_index(7), Province::Huelva);
        assert_eq!(Province::for_index(9), Province::Malaga);
        assert_eq!(Province::Cadiz.slug(), "cádiz");
    }

    #[test]
    fn test_province_serializes_with_accents() {
        let json = serde_json::to_value(Province::Almeria).unwrap();
        assert_eq!(json, "Almería");
    }

    #[test]
    fn test_catalog_cycles() {
        assert_eq!(property_type(6), "Cortijo");
        assert_eq!(amenities(5), amenities(0));
        assert_eq!(image(8), image(0));
    }
}
