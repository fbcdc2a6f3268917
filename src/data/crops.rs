use super::items::{CORN, CORN_SEED, TOMATO, TOMATO_SEED};
use crate::shared::*;

/// Crop varieties available on a fresh store.
///
/// Growth is measured in simulated hours; base yield is the harvest amount
/// before soil, water and fertilizer bonuses.
pub fn starter_varieties() -> Vec<CropVariety> {
    vec![
        CropVariety {
            id: 1,
            name: "Corn".into(),
            growth_hours: 10.0,
            base_yield: 5,
            seed_item_id: CORN_SEED,
            produce_item_id: CORN,
        },
        CropVariety {
            id: 2,
            name: "Tomato".into(),
            growth_hours: 8.0,
            base_yield: 4,
            seed_item_id: TOMATO_SEED,
            produce_item_id: TOMATO,
        },
    ]
}
