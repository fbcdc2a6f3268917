//! Persistence backends for the `FarmStore` contract.
//!
//! `StoreData` holds the tables and applies mutations; `MemoryStore` keeps
//! it in memory (with failure injection for tests) and `JsonFileStore`
//! flushes it to disk after every committed mutation.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SessionConfig;
use crate::shared::*;

mod json;

pub use json::JsonFileStore;

// ═══════════════════════════════════════════════════════════════════════
// TABLES
// ═══════════════════════════════════════════════════════════════════════

/// Stored plot row. `variety_id` and `planted_at` are set and cleared together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRow {
    pub id: PlotId,
    pub farm_id: FarmId,
    pub x: i32,
    pub y: i32,
    pub status: PlotStatus,
    pub variety_id: Option<CropVarietyId>,
    pub planted_at: Option<SimHours>,
    pub water_level: u8,
    pub fertilizer_level: u8,
}

impl PlotRow {
    pub fn empty(id: PlotId, farm_id: FarmId, x: i32, y: i32) -> Self {
        Self {
            id,
            farm_id,
            x,
            y,
            status: PlotStatus::Empty,
            variety_id: None,
            planted_at: None,
            water_level: 0,
            fertilizer_level: 0,
        }
    }

    fn clear(&mut self) {
        self.status = PlotStatus::Empty;
        self.variety_id = None;
        self.planted_at = None;
        self.water_level = 0;
        self.fertilizer_level = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRow {
    pub farm_id: FarmId,
    pub item_id: ItemId,
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreData {
    pub players: Vec<PlayerRecord>,
    pub farms: Vec<FarmRecord>,
    pub plots: Vec<PlotRow>,
    pub varieties: Vec<CropVariety>,
    pub items: Vec<ItemDef>,
    pub inventory: Vec<InventoryRow>,
    pub action_log: Vec<ActionLogEntry>,
}

/// Mutation kinds, used to target failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Read,
    Plant,
    SetStatus,
    Harvest,
    Reset,
    SetLevels,
    AdjustInventory,
    LogAction,
}

/// A single store write. Applied all-or-nothing by `StoreData::apply`.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Plant {
        plot_id: PlotId,
        variety_id: CropVarietyId,
        planted_at: SimHours,
    },
    SetStatus {
        plot_id: PlotId,
        status: PlotStatus,
    },
    Harvest {
        plot_id: PlotId,
    },
    Reset {
        plot_id: PlotId,
    },
    SetLevels {
        plot_id: PlotId,
        water: Option<u8>,
        fertilizer: Option<u8>,
    },
    AdjustInventory {
        farm_id: FarmId,
        item_id: ItemId,
        delta: i64,
    },
    Log(ActionLogEntry),
}

impl Mutation {
    pub fn op(&self) -> StoreOp {
        match self {
            Mutation::Plant { .. } => StoreOp::Plant,
            Mutation::SetStatus { .. } => StoreOp::SetStatus,
            Mutation::Harvest { .. } => StoreOp::Harvest,
            Mutation::Reset { .. } => StoreOp::Reset,
            Mutation::SetLevels { .. } => StoreOp::SetLevels,
            Mutation::AdjustInventory { .. } => StoreOp::AdjustInventory,
            Mutation::Log(_) => StoreOp::LogAction,
        }
    }
}

impl StoreData {
    fn plot_row_mut(&mut self, plot_id: PlotId) -> Result<&mut PlotRow, StoreError> {
        self.plots
            .iter_mut()
            .find(|p| p.id == plot_id)
            .ok_or_else(|| StoreError::NotFound(format!("plot {plot_id}")))
    }

    /// Validates then applies `mutation`. On `Err` nothing has changed.
    pub fn apply(&mut self, mutation: Mutation) -> Result<(), StoreError> {
        match mutation {
            Mutation::Plant {
                plot_id,
                variety_id,
                planted_at,
            } => {
                if !self.varieties.iter().any(|v| v.id == variety_id) {
                    return Err(StoreError::NotFound(format!("crop variety {variety_id}")));
                }
                let row = self.plot_row_mut(plot_id)?;
                if row.status != PlotStatus::Empty {
                    return Err(StoreError::Conflict(format!(
                        "plot {plot_id} is {}",
                        row.status.label()
                    )));
                }
                row.status = PlotStatus::Growing;
                row.variety_id = Some(variety_id);
                row.planted_at = Some(planted_at);
            }
            Mutation::SetStatus { plot_id, status } => {
                let row = self.plot_row_mut(plot_id)?;
                if status == PlotStatus::Empty {
                    row.clear();
                } else if row.variety_id.is_none() {
                    return Err(StoreError::Conflict(format!(
                        "plot {plot_id} has no crop to mark {}",
                        status.label()
                    )));
                } else {
                    row.status = status;
                }
            }
            Mutation::Harvest { plot_id } => {
                let row = self.plot_row_mut(plot_id)?;
                if row.status != PlotStatus::Mature {
                    return Err(StoreError::Conflict(format!(
                        "plot {plot_id} is {}",
                        row.status.label()
                    )));
                }
                row.clear();
            }
            Mutation::Reset { plot_id } => {
                self.plot_row_mut(plot_id)?.clear();
            }
            Mutation::SetLevels {
                plot_id,
                water,
                fertilizer,
            } => {
                if water.is_none() && fertilizer.is_none() {
                    return Err(StoreError::Conflict("no level supplied".into()));
                }
                let row = self.plot_row_mut(plot_id)?;
                if let Some(water) = water {
                    row.water_level = water.min(LEVEL_MAX);
                }
                if let Some(fertilizer) = fertilizer {
                    row.fertilizer_level = fertilizer.min(LEVEL_MAX);
                }
            }
            Mutation::AdjustInventory {
                farm_id,
                item_id,
                delta,
            } => {
                let item = self
                    .items
                    .iter()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| StoreError::NotFound(format!("item {item_id}")))?;
                let stack_limit = item.stack_limit;
                let current = self
                    .inventory
                    .iter()
                    .find(|r| r.farm_id == farm_id && r.item_id == item_id)
                    .map_or(0, |r| r.quantity as i64);
                let next = current + delta;
                if next < 0 {
                    return Err(StoreError::Conflict(format!(
                        "item {item_id} would drop to {next}"
                    )));
                }
                if stack_limit > 0 && next > stack_limit as i64 {
                    return Err(StoreError::Conflict(format!(
                        "item {item_id} exceeds stack limit {stack_limit}"
                    )));
                }
                match self
                    .inventory
                    .iter_mut()
                    .find(|r| r.farm_id == farm_id && r.item_id == item_id)
                {
                    Some(row) => row.quantity = next as u32,
                    None => self.inventory.push(InventoryRow {
                        farm_id,
                        item_id,
                        quantity: next as u32,
                    }),
                }
            }
            Mutation::Log(entry) => self.action_log.push(entry),
        }
        Ok(())
    }

    pub fn active_players(&self) -> Vec<PlayerRecord> {
        self.players.iter().filter(|p| p.active).cloned().collect()
    }

    pub fn player(&self, id: PlayerId) -> Option<PlayerRecord> {
        self.players.iter().find(|p| p.id == id).cloned()
    }

    pub fn farms_for_player(&self, player_id: PlayerId) -> Vec<FarmRecord> {
        self.farms
            .iter()
            .filter(|f| f.player_id == player_id)
            .cloned()
            .collect()
    }

    pub fn farm(&self, id: FarmId) -> Option<FarmRecord> {
        self.farms.iter().find(|f| f.id == id).cloned()
    }

    pub fn plots(&self, farm_id: FarmId) -> Vec<Plot> {
        let mut plots: Vec<Plot> = self
            .plots
            .iter()
            .filter(|row| row.farm_id == farm_id)
            .map(|row| {
                let crop = match (row.variety_id, row.planted_at) {
                    (Some(variety_id), Some(planted_at)) => {
                        let variety = self.varieties.iter().find(|v| v.id == variety_id);
                        Some(PlantedCrop {
                            variety_id,
                            planted_at,
                            name: variety.map_or_else(|| "Unknown".into(), |v| v.name.clone()),
                            growth_hours: variety.map_or(0.0, |v| v.growth_hours),
                        })
                    }
                    _ => None,
                };
                Plot {
                    id: row.id,
                    farm_id: row.farm_id,
                    x: row.x,
                    y: row.y,
                    status: row.status,
                    crop,
                    water_level: row.water_level,
                    fertilizer_level: row.fertilizer_level,
                }
            })
            .collect();
        plots.sort_by_key(|p| (p.y, p.x));
        plots
    }

    pub fn inventory(&self, farm_id: FarmId) -> Vec<InventoryItem> {
        let mut items: Vec<InventoryItem> = self
            .inventory
            .iter()
            .filter(|row| row.farm_id == farm_id && row.quantity > 0)
            .filter_map(|row| {
                let def = self.items.iter().find(|i| i.id == row.item_id)?;
                Some(InventoryItem {
                    item_id: row.item_id,
                    name: def.name.clone(),
                    item_type: def.item_type,
                    quantity: row.quantity,
                    base_price: def.base_price,
                })
            })
            .collect();
        items.sort_by_key(|i| i.item_id);
        items
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MEMORY STORE
// ═══════════════════════════════════════════════════════════════════════

/// In-process store. Failure injection makes chosen operations return
/// `StoreError::Unavailable` without touching the data.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: Mutex<StoreData>,
    failing: Mutex<HashSet<StoreOp>>,
}

impl MemoryStore {
    pub fn new(data: StoreData) -> Self {
        Self {
            data: Mutex::new(data),
            failing: Mutex::new(HashSet::new()),
        }
    }

    /// Make every subsequent `op` call fail until cleared.
    pub fn fail_on(&self, op: StoreOp) {
        match self.failing.lock() {
            Ok(mut failing) => {
                failing.insert(op);
            }
            Err(poisoned) => {
                poisoned.into_inner().insert(op);
            }
        }
    }

    pub fn clear_failures(&self) {
        match self.failing.lock() {
            Ok(mut failing) => failing.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Copy of the current tables.
    pub fn snapshot(&self) -> StoreData {
        match self.data.lock() {
            Ok(data) => data.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn check(&self, op: StoreOp) -> Result<(), StoreError> {
        let failing = self
            .failing
            .lock()
            .map_err(|_| StoreError::Unavailable("failure table poisoned".into()))?;
        if failing.contains(&op) {
            return Err(StoreError::Unavailable(format!("{op:?} disabled")));
        }
        Ok(())
    }

    fn read(&self) -> Result<MutexGuard<'_, StoreData>, StoreError> {
        self.check(StoreOp::Read)?;
        self.data
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn commit(&self, mutation: Mutation) -> Result<(), StoreError> {
        self.check(mutation.op())?;
        let mut data = self
            .data
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))?;
        data.apply(mutation)
    }
}

impl FarmStore for MemoryStore {
    fn active_players(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self.read()?.active_players())
    }

    fn player(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.read()?.player(id))
    }

    fn farms_for_player(&self, player_id: PlayerId) -> Result<Vec<FarmRecord>, StoreError> {
        Ok(self.read()?.farms_for_player(player_id))
    }

    fn farm(&self, id: FarmId) -> Result<Option<FarmRecord>, StoreError> {
        Ok(self.read()?.farm(id))
    }

    fn plots(&self, farm_id: FarmId) -> Result<Vec<Plot>, StoreError> {
        Ok(self.read()?.plots(farm_id))
    }

    fn inventory(&self, farm_id: FarmId) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.read()?.inventory(farm_id))
    }

    fn crop_varieties(&self) -> Result<Vec<CropVariety>, StoreError> {
        Ok(self.read()?.varieties.clone())
    }

    fn catalog(&self) -> Result<Vec<ItemDef>, StoreError> {
        Ok(self.read()?.items.clone())
    }

    fn plant(
        &self,
        plot_id: PlotId,
        variety_id: CropVarietyId,
        planted_at: SimHours,
    ) -> Result<(), StoreError> {
        self.commit(Mutation::Plant {
            plot_id,
            variety_id,
            planted_at,
        })
    }

    fn set_plot_status(&self, plot_id: PlotId, status: PlotStatus) -> Result<(), StoreError> {
        self.commit(Mutation::SetStatus { plot_id, status })
    }

    fn harvest_plot(&self, plot_id: PlotId) -> Result<(), StoreError> {
        self.commit(Mutation::Harvest { plot_id })
    }

    fn reset_plot(&self, plot_id: PlotId) -> Result<(), StoreError> {
        self.commit(Mutation::Reset { plot_id })
    }

    fn set_plot_levels(
        &self,
        plot_id: PlotId,
        water: Option<u8>,
        fertilizer: Option<u8>,
    ) -> Result<(), StoreError> {
        self.commit(Mutation::SetLevels {
            plot_id,
            water,
            fertilizer,
        })
    }

    fn adjust_inventory(
        &self,
        farm_id: FarmId,
        item_id: ItemId,
        delta: i64,
    ) -> Result<(), StoreError> {
        self.commit(Mutation::AdjustInventory {
            farm_id,
            item_id,
            delta,
        })
    }

    fn log_action(&self, entry: ActionLogEntry) -> Result<(), StoreError> {
        self.commit(Mutation::Log(entry))
    }
}

/// Opens the durable store at the configured path, seeding it on first run.
/// Falls back to an in-memory store when the file cannot be used.
pub fn open_store(config: &SessionConfig) -> Arc<dyn FarmStore> {
    match JsonFileStore::open_or_seed(&config.store_path, crate::data::starter_store_data) {
        Ok(store) => {
            info!("[Store] Using {}", config.store_path);
            Arc::new(store)
        }
        Err(e) => {
            warn!(
                "[Store] Could not open {}: {}; progress will not be saved",
                config.store_path, e
            );
            Arc::new(MemoryStore::new(crate::data::starter_store_data()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> MemoryStore {
        MemoryStore::new(crate::data::starter_store_data())
    }

    #[test]
    fn plant_only_applies_to_empty_plots() {
        let store = store();
        let plot = store.plots(1).unwrap()[0].id;
        store.plant(plot, 1, 0.0).unwrap();
        assert!(matches!(
            store.plant(plot, 1, 1.0),
            Err(StoreError::Conflict(_))
        ));
        let row = store.plots(1).unwrap()[0].clone();
        assert_eq!(row.status, PlotStatus::Growing);
        assert_eq!(row.crop.unwrap().planted_at, 0.0);
    }

    #[test]
    fn harvest_requires_mature_and_clears_the_row() {
        let store = store();
        let plot = store.plots(1).unwrap()[0].id;
        store.plant(plot, 1, 0.0).unwrap();
        store.set_plot_levels(plot, Some(70), None).unwrap();
        assert!(store.harvest_plot(plot).is_err());
        store.set_plot_status(plot, PlotStatus::Mature).unwrap();
        store.harvest_plot(plot).unwrap();
        let row = store.plots(1).unwrap()[0].clone();
        assert_eq!(row.status, PlotStatus::Empty);
        assert!(row.crop.is_none());
        assert_eq!(row.water_level, 0);
    }

    #[test]
    fn levels_update_partially() {
        let store = store();
        let plot = store.plots(1).unwrap()[0].id;
        store.set_plot_levels(plot, Some(40), Some(10)).unwrap();
        store.set_plot_levels(plot, None, Some(30)).unwrap();
        let row = store.plots(1).unwrap()[0].clone();
        assert_eq!((row.water_level, row.fertilizer_level), (40, 30));
        assert!(store.set_plot_levels(plot, None, None).is_err());
    }

    #[test]
    fn inventory_delta_creates_rows_and_rejects_negative_totals() {
        let store = store();
        let data = store.snapshot();
        let apple = data.items.iter().find(|i| i.name == "Apple").unwrap().id;
        assert_eq!(
            store.inventory(1).unwrap().iter().find(|i| i.item_id == apple),
            None
        );
        store.adjust_inventory(1, apple, 2).unwrap();
        assert!(store.adjust_inventory(1, apple, -3).is_err());
        let row = store
            .inventory(1)
            .unwrap()
            .into_iter()
            .find(|i| i.item_id == apple)
            .unwrap();
        assert_eq!(row.quantity, 2);
        assert_eq!(row.item_type, ItemType::Produce);
    }

    #[test]
    fn injected_failures_leave_data_untouched() {
        let store = store();
        let before = store.snapshot();
        store.fail_on(StoreOp::Plant);
        let plot = before.plots[0].id;
        assert!(matches!(
            store.plant(plot, 1, 0.0),
            Err(StoreError::Unavailable(_))
        ));
        assert_eq!(store.snapshot(), before);
        store.clear_failures();
        assert!(store.plant(plot, 1, 0.0).is_ok());
    }
}
