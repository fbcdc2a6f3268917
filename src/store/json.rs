use bevy::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use super::{Mutation, StoreData};
use crate::shared::*;

/// Durable store backed by one JSON file. Each mutation is applied to a
/// copy, flushed atomically, and only then committed in memory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl JsonFileStore {
    /// Opens `path`, or creates it from `seed` when it does not exist yet.
    pub fn open_or_seed(
        path: impl AsRef<Path>,
        seed: impl FnOnce() -> StoreData,
    ) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            let data = seed();
            write_atomic(&path, &data)?;
            info!("[Store] Seeded new store at {}", path.display());
            data
        };
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreData>, StoreError> {
        self.data
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".into()))
    }

    fn commit(&self, mutation: Mutation) -> Result<(), StoreError> {
        let mut data = self.lock()?;
        let mut next = data.clone();
        next.apply(mutation)?;
        write_atomic(&self.path, &next)?;
        *data = next;
        Ok(())
    }
}

/// Write to a temp file first, then rename over the target.
fn write_atomic(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(data)?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, json)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl FarmStore for JsonFileStore {
    fn active_players(&self) -> Result<Vec<PlayerRecord>, StoreError> {
        Ok(self.lock()?.active_players())
    }

    fn player(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError> {
        Ok(self.lock()?.player(id))
    }

    fn farms_for_player(&self, player_id: PlayerId) -> Result<Vec<FarmRecord>, StoreError> {
        Ok(self.lock()?.farms_for_player(player_id))
    }

    fn farm(&self, id: FarmId) -> Result<Option<FarmRecord>, StoreError> {
        Ok(self.lock()?.farm(id))
    }

    fn plots(&self, farm_id: FarmId) -> Result<Vec<Plot>, StoreError> {
        Ok(self.lock()?.plots(farm_id))
    }

    fn inventory(&self, farm_id: FarmId) -> Result<Vec<InventoryItem>, StoreError> {
        Ok(self.lock()?.inventory(farm_id))
    }

    fn crop_varieties(&self) -> Result<Vec<CropVariety>, StoreError> {
        Ok(self.lock()?.varieties.clone())
    }

    fn catalog(&self) -> Result<Vec<ItemDef>, StoreError> {
        Ok(self.lock()?.items.clone())
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
