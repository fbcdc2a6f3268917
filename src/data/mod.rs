//! Data layer: the starter tables a fresh store is seeded with.
//!
//! Only used on first run (no store file yet) or when the durable store
//! cannot be opened. Afterwards the store is the single authority.

mod crops;
mod items;

use crate::shared::*;
use crate::store::{InventoryRow, PlotRow, StoreData};

pub use crops::starter_varieties;
pub use items::{starter_items, APPLE, CORN, CORN_SEED, TOMATO, TOMATO_SEED, WOOD};

pub const STARTER_PLAYER: PlayerId = 1;
pub const STARTER_FARM: FarmId = 1;
pub const STARTER_COLUMNS: i32 = 6;
pub const STARTER_ROWS: i32 = 4;

/// One active player with one farm, an empty plot grid and a few seeds.
pub fn starter_store_data() -> StoreData {
    let players = vec![PlayerRecord {
        id: STARTER_PLAYER,
        name: "Farmer".into(),
        level: 1,
        exp: 0,
        gold: 500.0,
        gems: 0,
        active: true,
    }];

    let farms = vec![FarmRecord {
        id: STARTER_FARM,
        player_id: STARTER_PLAYER,
        name: "Sunny Acre".into(),
        soil_quality: 50,
    }];

    let mut plots = Vec::new();
    let mut next_id = 1;
    for y in 0..STARTER_ROWS {
        for x in 0..STARTER_COLUMNS {
            plots.push(PlotRow::empty(next_id, STARTER_FARM, x, y));
            next_id += 1;
        }
    }

    let inventory = vec![
        InventoryRow {
            farm_id: STARTER_FARM,
            item_id: CORN_SEED,
            quantity: 5,
        },
        InventoryRow {
            farm_id: STARTER_FARM,
            item_id: TOMATO_SEED,
            quantity: 5,
        },
    ];

    StoreData {
        players,
        farms,
        plots,
        varieties: starter_varieties(),
        items: starter_items(),
        inventory,
        action_log: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variety_references_catalog_items() {
        let data = starter_store_data();
        for variety in &data.varieties {
            let seed = data.items.iter().find(|i| i.id == variety.seed_item_id);
            let produce = data.items.iter().find(|i| i.id == variety.produce_item_id);
            assert_eq!(seed.map(|i| i.item_type), Some(ItemType::Seed), "{}", variety.name);
            assert_eq!(produce.map(|i| i.item_type), Some(ItemType::Produce), "{}", variety.name);
        }
    }

    #[test]
    fn starter_plots_are_empty_and_unique() {
        let data = starter_store_data();
        assert_eq!(data.plots.len(), (STARTER_COLUMNS * STARTER_ROWS) as usize);
        assert!(data.plots.iter().all(|p| p.status == PlotStatus::Empty));
        let mut ids: Vec<_> = data.plots.iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), data.plots.len());
    }
}
