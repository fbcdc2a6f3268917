//! Visual synchronisation: one soil sprite and one crop sprite per plot.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::*;

#[derive(Component, Debug, Clone, Copy)]
pub struct SoilSprite {
    pub plot: PlotId,
}

#[derive(Component, Debug, Clone, Copy)]
pub struct CropSprite {
    pub plot: PlotId,
}

/// Plot id → (soil entity, crop entity).
#[derive(Resource, Default, Debug)]
pub struct PlotEntities {
    pub by_plot: HashMap<PlotId, (Entity, Entity)>,
}

/// Growth stage used to pick a crop image: 0..=2 while growing, 3 when mature.
pub fn crop_stage(plot: &Plot, now: SimHours) -> Option<u8> {
    match plot.status {
        PlotStatus::Growing => {
            let growth = plot.crop.as_ref().map_or(0.0, |c| c.growth_hours);
            let elapsed = plot.elapsed_hours(now).unwrap_or(0.0);
            let progress = if growth > 0.0 { (elapsed / growth).min(1.0) } else { 1.0 };
            Some(((progress * 3.0) as u8).min(2))
        }
        PlotStatus::Mature => Some(3),
        PlotStatus::Empty | PlotStatus::Withered => None,
    }
}

pub fn soil_color(plot: &Plot) -> Color {
    let base = match plot.status {
        PlotStatus::Empty => Color::srgb(0.55, 0.40, 0.25),
        PlotStatus::Growing => Color::srgb(0.45, 0.32, 0.18),
        PlotStatus::Mature => Color::srgb(0.50, 0.36, 0.20),
        PlotStatus::Withered => Color::srgb(0.40, 0.35, 0.30),
    };
    // Wet soil reads darker.
    if plot.water_level > 50 {
        base.darker(0.08)
    } else {
        base
    }
}

/// Placeholder colour when no crop image is loaded.
pub fn crop_color(plot: &Plot) -> Color {
    match plot.status {
        PlotStatus::Empty => Color::NONE,
        PlotStatus::Growing => Color::srgb(0.2, 0.55, 0.2),
        PlotStatus::Mature => Color::srgb(0.95, 0.8, 0.15),
        PlotStatus::Withered => Color::srgb(0.5, 0.5, 0.5),
    }
}

fn crop_image_key(plot: &Plot, stage: u8) -> Option<String> {
    let name = plot.crop.as_ref()?.name.to_lowercase();
    SEED_ORDER
        .iter()
        .find(|seed| name.contains(seed.keyword()))
        .map(|seed| format!("{}_{}", seed.keyword(), stage))
}

pub fn sync_plot_sprites(
    mut commands: Commands,
    session: Res<FarmSession>,
    grid: Res<WorldGrid>,
    clock: Res<SimClock>,
    assets: Res<GameAssets>,
    selected: Res<SelectedPlot>,
    mut entities: ResMut<PlotEntities>,
    mut soil: Query<&mut Sprite, (With<SoilSprite>, Without<CropSprite>)>,
    mut crops: Query<(&mut Sprite, &mut Visibility), (With<CropSprite>, Without<SoilSprite>)>,
) {
    // Entities are spawned with default sprites and filled in next frame.
    if session.is_changed() || entities.by_plot.len() != session.plots.len() {
        for plot in &session.plots {
            if entities.by_plot.contains_key(&plot.id) {
                continue;
            }
            let rect = grid.plot_rect(plot);
            let soil_entity = commands
                .spawn((
                    SoilSprite { plot: plot.id },
                    Sprite::from_color(soil_color(plot), rect.size()),
                    Transform::from_translation(world_to_render(rect.center(), Z_SOIL)),
                    SessionEntity,
                ))
                .id();
            let crop_entity = commands
                .spawn((
                    CropSprite { plot: plot.id },
                    Sprite::from_color(crop_color(plot), rect.size() * 0.6),
                    Transform::from_translation(world_to_render(rect.center(), Z_SOIL + 1.0)),
                    Visibility::Hidden,
                    SessionEntity,
                ))
                .id();
            entities.by_plot.insert(plot.id, (soil_entity, crop_entity));
        }
    }

    for plot in &session.plots {
        let Some(&(soil_entity, crop_entity)) = entities.by_plot.get(&plot.id) else {
            continue;
        };
        if let Ok(mut sprite) = soil.get_mut(soil_entity) {
            sprite.color = if selected.plot == Some(plot.id) {
                soil_color(plot).lighter(0.1)
            } else {
                soil_color(plot)
            };
        }
        let Ok((mut sprite, mut visibility)) = crops.get_mut(crop_entity) else {
            continue;
        };
        *visibility = if plot.status == PlotStatus::Empty {
            Visibility::Hidden
        } else {
            Visibility::Inherited
        };
        let image = crop_stage(plot, clock.now())
            .and_then(|stage| crop_image_key(plot, stage))
            .and_then(|key| assets.image(&key));
        match image {
            Some(image) => {
                sprite.image = image;
                sprite.color = Color::WHITE;
            }
            None => {
                sprite.image = Handle::default();
                sprite.color = crop_color(plot);
            }
        }
    }
}

/// Drops the id map when a session ends; the entities go with `SessionEntity`.
pub fn clear_plot_entities(mut entities: ResMut<PlotEntities>) {
    entities.by_plot.clear();
}
