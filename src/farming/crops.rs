//! Planting, growth progress and the tick-driven maturity check.

use bevy::prelude::*;
use serde_json::json;

use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Planting
// ─────────────────────────────────────────────────────────────────────────────

/// Plants `preferred`, or the variety of the first seed in stock.
///
/// The seed is deducted before the plot is written; if the plot write fails
/// the seed is refunded. Inventory is read fresh from the store.
pub fn plant(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    preferred: Option<CropVarietyId>,
    now: SimHours,
) -> Result<String, FarmError> {
    let farm_id = session.farm.id;
    let plot = session
        .plot(plot_id)
        .ok_or_else(|| FarmError::invalid("No soil ahead."))?;
    if plot.status != PlotStatus::Empty {
        return Err(FarmError::invalid("Target plot is not empty."));
    }

    let inventory = store
        .inventory(farm_id)
        .map_err(|e| FarmError::persistence("Could not read inventory!", e))?;
    let mut seeds = inventory
        .iter()
        .filter(|item| item.item_type == ItemType::Seed && item.quantity > 0)
        .peekable();
    if seeds.peek().is_none() {
        return Err(FarmError::invalid("No seeds to plant!"));
    }

    let preferred = preferred.and_then(|id| session.variety(id)).cloned();
    let seed = match &preferred {
        Some(variety) => seeds
            .find(|item| item.item_id == variety.seed_item_id)
            .ok_or_else(|| FarmError::invalid("No matching seed in inventory"))?,
        None => seeds.next().ok_or_else(|| FarmError::invalid("No seeds to plant!"))?,
    };
    let variety = match preferred {
        Some(variety) => variety,
        None => session
            .varieties
            .iter()
            .find(|v| v.seed_item_id == seed.item_id)
            .cloned()
            .ok_or_else(|| FarmError::invalid("Crop variety not found!"))?,
    };
    let seed_item = seed.item_id;

    store
        .adjust_inventory(farm_id, seed_item, -1)
        .map_err(|e| FarmError::persistence("Insufficient seeds!", e))?;

    if let Err(e) = store.plant(plot_id, variety.id, now) {
        warn!("[Farming] Planting plot {} failed: {}; refunding seed", plot_id, e);
        if let Err(refund) = store.adjust_inventory(farm_id, seed_item, 1) {
            error!(
                "[Farming] Seed refund for item {} on farm {} failed: {}",
                seed_item, farm_id, refund
            );
        }
        refresh(store, session);
        return Err(FarmError::persistence("Planting failed!", e));
    }

    let entry = ActionLogEntry {
        player_id: session.player.id,
        farm_id,
        action: ActionKind::Plant,
        meta: json!({ "PlotId": plot_id, "CropVarietyId": variety.id }),
        at: now,
    };
    if let Err(e) = store.log_action(entry) {
        warn!("[Farming] Could not log planting on plot {}: {}", plot_id, e);
    }

    refresh(store, session);
    info!("[Farming] Planted {} on plot {}", variety.name, plot_id);
    Ok(format!("Planted {}!", variety.name))
}

/// Seed use: plants the variety whose name contains the seed keyword.
pub fn sow(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    seed: SeedKind,
    now: SimHours,
) -> Result<String, FarmError> {
    let status = session.plot(plot_id).map(|p| p.status);
    if status != Some(PlotStatus::Empty) {
        return Err(FarmError::invalid("Target plot is not empty."));
    }
    let variety = session
        .variety_matching(seed.keyword())
        .cloned()
        .ok_or_else(|| FarmError::invalid("No crop variety matches the selected seed."))?;
    plant(store, session, plot_id, Some(variety.id), now)?;
    Ok(format!("Sowed {}", variety.name))
}

// ─────────────────────────────────────────────────────────────────────────────
// Growth
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthProgress {
    /// Whole percent, capped at 100.
    pub percent: u32,
    pub remaining_hours: f64,
}

/// Advisory progress of a planted crop. `None` for an empty plot or a
/// variety without a growth duration.
pub fn growth_progress(plot: &Plot, now: SimHours) -> Option<GrowthProgress> {
    let crop = plot.crop.as_ref()?;
    if crop.growth_hours <= 0.0 {
        return None;
    }
    let elapsed = plot.elapsed_hours(now)?;
    Some(GrowthProgress {
        percent: (elapsed / crop.growth_hours * 100.0).min(100.0) as u32,
        remaining_hours: (crop.growth_hours - elapsed).max(0.0),
    })
}

pub fn check_growth(session: &FarmSession, plot_id: PlotId, now: SimHours) -> Result<String, FarmError> {
    let plot = session
        .plot(plot_id)
        .ok_or_else(|| FarmError::invalid("No soil ahead."))?;
    let progress =
        growth_progress(plot, now).ok_or_else(|| FarmError::invalid("Nothing is growing here."))?;
    let name = plot.crop.as_ref().map_or("Crop", |c| c.name.as_str());
    Ok(format!(
        "{}: {}% complete ({:.1}h left)",
        name, progress.percent, progress.remaining_hours
    ))
}

// ─────────────────────────────────────────────────────────────────────────────
// Maturity
// ─────────────────────────────────────────────────────────────────────────────

/// Plots whose status changed during one maturity pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaturityReport {
    pub matured: Vec<PlotId>,
    pub withered: Vec<PlotId>,
}

impl MaturityReport {
    pub fn is_empty(&self) -> bool {
        self.matured.is_empty() && self.withered.is_empty()
    }
}

/// The status a plot should have at `now`, if it differs from the current one.
pub fn due_status(plot: &Plot, now: SimHours, wither_after: Option<f64>) -> Option<PlotStatus> {
    let crop = plot.crop.as_ref()?;
    let elapsed = plot.elapsed_hours(now)?;
    match plot.status {
        PlotStatus::Growing if elapsed >= crop.growth_hours => Some(PlotStatus::Mature),
        PlotStatus::Mature => match wither_after {
            Some(grace) if elapsed >= crop.growth_hours + grace => Some(PlotStatus::Withered),
            _ => None,
        },
        _ => None,
    }
}

/// Persists every due Growing→Mature and Mature→Withered transition.
///
/// A plot whose store write fails keeps its old status and is retried on the
/// next pass. Views are reloaded only when something changed.
pub fn advance_maturity(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    now: SimHours,
    wither_after: Option<f64>,
) -> MaturityReport {
    let mut report = MaturityReport::default();
    let due: Vec<(PlotId, PlotStatus)> = session
        .plots
        .iter()
        .filter_map(|plot| due_status(plot, now, wither_after).map(|s| (plot.id, s)))
        .collect();

    for (plot_id, status) in due {
        match store.set_plot_status(plot_id, status) {
            Ok(()) => match status {
                PlotStatus::Mature => report.matured.push(plot_id),
                PlotStatus::Withered => report.withered.push(plot_id),
                PlotStatus::Empty | PlotStatus::Growing => {}
            },
            Err(e) => warn!(
                "[Farming] Could not mark plot {} {}: {}",
                plot_id,
                status.label(),
                e
            ),
        }
    }

    if !report.is_empty() {
        if let Err(e) = session.reload_plots(store) {
            warn!("[Farming] Plot reload after maturity pass failed: {}", e);
        }
    }
    report
}

/// Re-reads plots and inventory after a mutation. A failed read keeps the old
/// view; the next successful reload corrects it.
pub(super) fn refresh(store: &dyn FarmStore, session: &mut FarmSession) {
    if let Err(e) = session.reload_plots(store) {
        warn!("[Farming] Plot reload failed: {}", e);
    }
    if let Err(e) = session.reload_inventory(store) {
        warn!("[Farming] Inventory reload failed: {}", e);
    }
}
