//! Synthetic results used when no remote engine answers
//!
//! Output depends only on the position index, so the same request always
//! yields the same data.

use crate::results::{property_type, Province, RawResult};

/// Source name attached to synthetic results
pub const SYNTHETIC_SOURCE: &str = "synthetic";

/// Number of synthetic results generated per search
pub const SYNTHETIC_COUNT: usize = 8;

/// Generate the fixed set of synthetic results
pub fn generate() -> Vec<RawResult> {
    (0..SYNTHETIC_COUNT).map(synthetic_result).collect()
}

fn synthetic_result(index: usize) -> RawResult {
    let kind = property_type(index);
    let province = Province::for_index(index);

    RawResult::new(SYNTHETIC_SOURCE)
        .with_title(format!("{} en {} - Alquiler Rural", kind, province))
        .with_snippet(format!(
            "Hermosa {} en {} con todas las comodidades. Piscina, wifi, jardín y vistas \
             espectaculares. Ideal para familias y grupos.",
            kind.to_lowercase(),
            province
        ))
        .with_link(format!(
            "https://ejemplo{}.com/casa-rural-{}",
            index + 1,
            province.slug()
        ))
        .with_position(index as u32 + 1)
}
