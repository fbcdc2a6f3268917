//! Watering and hoeing: saturating increments of the plot levels.

use bevy::prelude::*;

use super::crops::refresh;
use crate::shared::*;

/// Which level a soil action raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoilLevel {
    Water,
    Fertilizer,
}

impl SoilLevel {
    fn current(self, plot: &Plot) -> u8 {
        match self {
            SoilLevel::Water => plot.water_level,
            SoilLevel::Fertilizer => plot.fertilizer_level,
        }
    }

    fn saturated_message(self) -> &'static str {
        match self {
            SoilLevel::Water => "Soil moisture is already sufficient.",
            SoilLevel::Fertilizer => "Soil is already fertile.",
        }
    }

    fn failed_message(self) -> &'static str {
        match self {
            SoilLevel::Water => "Watering failed.",
            SoilLevel::Fertilizer => "Hoeing failed.",
        }
    }
}

/// `current + increment`, capped at 100.
pub fn raised_level(current: u8, increment: u8) -> u8 {
    current.saturating_add(increment).min(LEVEL_MAX)
}

/// Raises one level of a plot. Already at the cap is a successful no-op.
pub fn raise_level(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    level: SoilLevel,
    increment: u8,
) -> Result<Option<u8>, FarmError> {
    let plot = session
        .plot(plot_id)
        .ok_or_else(|| FarmError::invalid("No soil ahead."))?;
    let current = level.current(plot);
    let next = raised_level(current, increment);
    if next == current {
        return Ok(None);
    }

    let write = match level {
        SoilLevel::Water => store.set_plot_levels(plot_id, Some(next), None),
        SoilLevel::Fertilizer => store.set_plot_levels(plot_id, None, Some(next)),
    };
    write.map_err(|e| FarmError::persistence(level.failed_message(), e))?;

    if let Some(plot) = session.plot_mut(plot_id) {
        match level {
            SoilLevel::Water => plot.water_level = next,
            SoilLevel::Fertilizer => plot.fertilizer_level = next,
        }
    }
    debug!("[Farming] Plot {} {:?} {} -> {}", plot_id, level, current, next);
    Ok(Some(next))
}

pub fn water(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    increment: u8,
) -> Result<String, FarmError> {
    match raise_level(store, session, plot_id, SoilLevel::Water, increment)? {
        Some(_) => Ok(format!("Water +{increment}")),
        None => Ok(SoilLevel::Water.saturated_message().to_string()),
    }
}

/// Hoeing works the soil and raises its fertilizer level.
pub fn fertilize(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    plot_id: PlotId,
    increment: u8,
) -> Result<String, FarmError> {
    match raise_level(store, session, plot_id, SoilLevel::Fertilizer, increment)? {
        Some(_) => Ok("Hoeing improved fertility.".to_string()),
        None => Ok(SoilLevel::Fertilizer.saturated_message().to_string()),
    }
}

/// Rain: adds `amount` of water to every plot regardless of status. Each plot
/// is written on its own; a failed plot is skipped and logged. Returns how
/// many plots were written.
pub fn rain_on_all(store: &dyn FarmStore, session: &mut FarmSession, amount: u8) -> usize {
    let mut written = 0;
    for plot in &session.plots {
        let next = raised_level(plot.water_level, amount);
        if next == plot.water_level {
            continue;
        }
        match store.set_plot_levels(plot.id, Some(next), None) {
            Ok(()) => written += 1,
            Err(e) => warn!("[Farming] Rain on plot {} failed: {}", plot.id, e),
        }
    }
    refresh(store, session);
    written
}
