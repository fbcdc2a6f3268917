//! Harvesting mature crops and clearing withered ones.

use bevy::prelude::*;
use serde_json::json;

use super::crops::refresh;
use crate::shared::*;

/// `max(1, floor(base × (1 + soil/200 + water/200 + fertilizer/100)))`,
/// evaluated in integers so the floor is exact.
pub fn harvest_yield(base_yield: u32, soil_quality: u8, water_level: u8, fertilizer_level: u8) -> u32 {
    let soil = soil_quality.min(LEVEL_MAX) as u64;
    let water = water_level.min(LEVEL_MAX) as u64;
    let fertilizer = fertilizer_level.min(LEVEL_MAX) as u64;
    let scaled = base_yield as u64 * (200 + soil + water + 2 * fertilizer) / 200;
    scaled.clamp(1, u32::MAX as u64) as u32
}

/// Mature → Empty. The produce is credited first; if the plot write then
/// fails, the produce is taken back.
pub fn harvest(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    now: SimHours,
) -> Result<String, FarmError> {
    let farm_id = session.farm.id;
    let plot = session
        .plot(plot_id)
        .ok_or_else(|| FarmError::invalid("No soil ahead."))?;
    if plot.status != PlotStatus::Mature {
        return Err(FarmError::invalid("Nothing to harvest here."));
    }
    let crop = plot
        .crop
        .as_ref()
        .ok_or_else(|| FarmError::invalid("Nothing to harvest here."))?;
    let variety = session
        .variety(crop.variety_id)
        .ok_or_else(|| FarmError::invalid("Crop info not found!"))?;

    let amount = harvest_yield(
        variety.base_yield,
        session.farm.soil_quality,
        plot.water_level,
        plot.fertilizer_level,
    );
    let produce = variety.produce_item_id;
    let crop_name = crop.name.clone();

    store
        .adjust_inventory(farm_id, produce, amount as i64)
        .map_err(|e| FarmError::persistence("Inventory full!", e))?;

    if let Err(e) = store.harvest_plot(plot_id) {
        warn!("[Farming] Harvesting plot {} failed: {}; reverting produce", plot_id, e);
        if let Err(revert) = store.adjust_inventory(farm_id, produce, -(amount as i64)) {
            error!(
                "[Farming] Produce revert for item {} on farm {} failed: {}",
                produce, farm_id, revert
            );
        }
        refresh(store, session);
        return Err(FarmError::persistence("Harvest failed!", e));
    }

    let entry = ActionLogEntry {
        player_id: session.player.id,
        farm_id,
        action: ActionKind::Harvest,
        meta: json!({ "PlotId": plot_id, "Yield": amount }),
        at: now,
    };
    if let Err(e) = store.log_action(entry) {
        warn!("[Farming] Could not log harvest on plot {}: {}", plot_id, e);
    }

    refresh(store, session);
    info!("[Farming] Harvested {} {} from plot {}", amount, crop_name, plot_id);
    Ok(format!("Harvested {} {}!", amount, crop_name))
}

/// Any status → Empty, crop and levels cleared.
pub fn clear_withered(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
) -> Result<String, FarmError> {
    if session.plot(plot_id).is_none() {
        return Err(FarmError::invalid("No soil ahead."));
    }
    store
        .reset_plot(plot_id)
        .map_err(|e| FarmError::persistence("Clear failed!", e))?;
    refresh(store, session);
    Ok("Cleared withered crop".to_string())
}
