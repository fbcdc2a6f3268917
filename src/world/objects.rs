//! Trees: construction, damage, fruit drops, stumps and particles.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{EnvironmentConfig, GameConfig};
use crate::shared::*;

// ═══════════════════════════════════════════════════════════════════════
// TREE STATE MACHINE
// ═══════════════════════════════════════════════════════════════════════

/// What a single `Tree::damage` call produced.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DamageOutcome {
    /// Top-left of the fruit that fell, if any.
    pub dropped_fruit: Option<Vec2>,
    /// True only on the hit that felled the tree.
    pub felled: bool,
}

impl DamageOutcome {
    /// Items the hit hands to the player, in order.
    pub fn collected(&self) -> Vec<CollectTag> {
        let mut tags = Vec::new();
        if self.dropped_fruit.is_some() {
            tags.push(CollectTag::Apple);
        }
        if self.felled {
            tags.push(CollectTag::Wood);
        }
        tags
    }
}

impl Tree {
    /// Builds a standing tree and rolls each fruit slot once.
    pub fn new(
        kind: TreeKind,
        top_left: Vec2,
        size: Vec2,
        config: &EnvironmentConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let rect = Rect::from_corners(top_left, top_left + size);
        let hitbox = inflate_rect(rect, -size.x * 0.2, -size.y * 0.75);
        let fruit_slots: Vec<Vec2> = config
            .apple_positions(kind)
            .iter()
            .map(|&(x, y)| top_left + Vec2::new(x, y))
            .collect();
        let fruit = (0..fruit_slots.len())
            .filter(|_| rng.gen::<f64>() < config.apple_spawn_chance)
            .collect();

        Self {
            kind,
            rect,
            hitbox,
            health: config.tree_health,
            alive: config.tree_health > 0,
            fruit,
            fruit_slots,
        }
    }

    /// One axe hit. Dead trees ignore further hits.
    pub fn damage(&mut self, rng: &mut impl Rng, config: &EnvironmentConfig) -> DamageOutcome {
        let mut outcome = DamageOutcome::default();
        if !self.alive {
            return outcome;
        }

        self.health = self.health.saturating_sub(1);

        if !self.fruit.is_empty() {
            let pick = rng.gen_range(0..self.fruit.len());
            let slot = self.fruit.remove(pick);
            outcome.dropped_fruit = self.fruit_slots.get(slot).copied();
        }

        if self.health == 0 {
            self.fell(config);
            outcome.felled = true;
        }

        outcome
    }

    /// Swap to the stump footprint, anchored at the old bottom center.
    fn fell(&mut self, config: &EnvironmentConfig) {
        let stump = config.stump_size(self.kind);
        let bottom_center = Vec2::new(self.rect.center().x, self.rect.max.y);
        self.rect = Rect::from_corners(
            bottom_center - Vec2::new(stump.x / 2.0, stump.y),
            bottom_center + Vec2::new(stump.x / 2.0, 0.0),
        );
        self.hitbox = inflate_rect(self.rect, -10.0, -stump.y * 0.6);
        self.fruit.clear();
        self.alive = false;
    }

    pub fn image_key(&self) -> String {
        if self.alive {
            format!("tree_{}", self.kind.name())
        } else {
            format!("stump_{}", self.kind.name())
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SPAWNING
// ═══════════════════════════════════════════════════════════════════════

/// Links a fruit sprite to its tree and attach-point index.
#[derive(Component, Debug, Clone, Copy)]
pub struct FruitSprite {
    pub tree: Entity,
    pub slot: usize,
}

pub fn spawn_trees(
    mut commands: Commands,
    pending: Option<Res<PendingTrees>>,
    config: Res<GameConfig>,
) {
    let Some(pending) = pending else {
        return;
    };
    let apple = Vec2::splat(config.environment.apple_size);
    for tree in pending.0.iter().cloned() {
        let fruit: Vec<(usize, Vec2)> = tree
            .fruit
            .iter()
            .filter_map(|&slot| tree.fruit_slots.get(slot).map(|pos| (slot, *pos)))
            .collect();
        let entity = commands
            .spawn((
                tree.clone(),
                SessionEntity,
                Sprite::from_color(Color::srgb(0.2, 0.5, 0.2), tree.rect.size()),
                Transform::from_translation(world_to_render(tree.rect.center(), Z_MAIN)),
            ))
            .id();
        for (slot, top_left) in fruit {
            commands.spawn((
                FruitSprite { tree: entity, slot },
                SessionEntity,
                Sprite::from_color(Color::srgb(0.85, 0.1, 0.1), apple),
                Transform::from_translation(world_to_render(top_left + apple / 2.0, Z_FRUIT)),
            ));
        }
    }
    info!("[World] Spawned {} trees", pending.0.len());
    commands.remove_resource::<PendingTrees>();
}

/// Spawns the fading particles and item events for one damage outcome.
pub fn emit_damage_effects(
    commands: &mut Commands,
    tree: &Tree,
    outcome: DamageOutcome,
    config: &EnvironmentConfig,
    collected: &mut EventWriter<ItemCollectedEvent>,
) {
    if let Some(top_left) = outcome.dropped_fruit {
        let rect = Rect::from_corners(top_left, top_left + Vec2::splat(config.apple_size));
        commands.spawn((
            Particle {
                rect,
                timer: Timer::from_seconds(config.fruit_particle_secs, TimerMode::Once),
            },
            SessionEntity,
        ));
    }
    if outcome.felled {
        commands.spawn((
            Particle {
                rect: tree.rect,
                timer: Timer::from_seconds(config.stump_particle_secs, TimerMode::Once),
            },
            SessionEntity,
        ));
    }
    for tag in outcome.collected() {
        collected.send(ItemCollectedEvent { tag });
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PER-TICK SYSTEMS
// ═══════════════════════════════════════════════════════════════════════

pub fn tick_particles(
    mut commands: Commands,
    time: Res<Time>,
    mut particles: Query<(Entity, &mut Particle)>,
) {
    for (entity, mut particle) in &mut particles {
        particle.timer.tick(time.delta());
        if particle.timer.finished() {
            commands.entity(entity).despawn();
        }
    }
}

/// Adds one catalog item named after `tag` to the farm inventory.
/// Returns the message to show.
pub fn collect_item(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    tag: CollectTag,
) -> Result<String, FarmError> {
    let Some(item) = session.catalog_item_named(tag.name()).cloned() else {
        return Ok(format!("Obtained {} (not registered in item catalog)", tag.name()));
    };
    store
        .adjust_inventory(session.farm.id, item.id, 1)
        .map_err(|e| FarmError::persistence("Collecting failed!", e))?;
    if let Err(e) = session.reload_inventory(store) {
        warn!("[World] Inventory reload after collecting failed: {}", e);
    }
    Ok(format!("Obtained {} x1", item.name))
}

pub fn collect_tree_items(
    mut events: EventReader<ItemCollectedEvent>,
    store: Res<FarmStoreHandle>,
    mut session: ResMut<FarmSession>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for event in events.read() {
        match collect_item(store.get(), &mut session, event.tag) {
            Ok(message) => {
                toasts.send(ToastEvent::new(message));
            }
            Err(e) => {
                warn!("[World] {}", e);
                toasts.send(ToastEvent::new(e.user_message()));
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// RENDER SYNC
// ═══════════════════════════════════════════════════════════════════════

pub fn sync_tree_sprites(
    mut commands: Commands,
    assets: Res<GameAssets>,
    mut trees: Query<(Entity, &Tree, &mut Sprite, &mut Transform), Changed<Tree>>,
    fruit: Query<(Entity, &FruitSprite)>,
) {
    for (entity, tree, mut sprite, mut transform) in &mut trees {
        match assets.image(&tree.image_key()) {
            Some(image) => sprite.image = image,
            None => {
                sprite.color = if tree.alive {
                    Color::srgb(0.2, 0.5, 0.2)
                } else {
                    Color::srgb(0.45, 0.3, 0.15)
                };
            }
        }
        sprite.custom_size = Some(tree.rect.size());
        transform.translation = world_to_render(tree.rect.center(), Z_MAIN);

        for (fruit_entity, link) in &fruit {
            if link.tree == entity && !tree.fruit.contains(&link.slot) {
                commands.entity(fruit_entity).despawn();
            }
        }
    }
}

/// Gives new particles a sprite and fades existing ones out.
pub fn sync_particle_sprites(
    mut commands: Commands,
    mut particles: Query<(Entity, &Particle, Option<&mut Sprite>)>,
) {
    for (entity, particle, sprite) in &mut particles {
        let alpha = 1.0 - particle.timer.fraction();
        match sprite {
            Some(mut sprite) => sprite.color.set_alpha(alpha),
            None => {
                commands.entity(entity).insert((
                    Sprite::from_color(Color::srgba(1.0, 1.0, 1.0, alpha), particle.rect.size()),
                    Transform::from_translation(world_to_render(
                        particle.rect.center(),
                        Z_PARTICLE,
                    )),
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config_with_chance(chance: f64) -> EnvironmentConfig {
        EnvironmentConfig {
            apple_spawn_chance: chance,
            ..EnvironmentConfig::default()
        }
    }

    fn tree(chance: f64, seed: u64) -> (Tree, StdRng, EnvironmentConfig) {
        let config = config_with_chance(chance);
        let mut rng = StdRng::seed_from_u64(seed);
        let tree = Tree::new(
            TreeKind::Small,
            Vec2::new(100.0, 200.0),
            config.tree_size(TreeKind::Small),
            &config,
            &mut rng,
        );
        (tree, rng, config)
    }

    #[test]
    fn hitbox_is_a_footprint_inside_the_sprite() {
        let (tree, _, _) = tree(0.8, 1);
        assert!(tree.hitbox.width() < tree.rect.width());
        assert!(tree.hitbox.height() < tree.rect.height());
        assert_eq!(tree.hitbox.center(), tree.rect.center());
    }

    #[test]
    fn full_chance_fills_every_slot_and_zero_fills_none() {
        let (full, _, config) = tree(1.0, 2);
        assert_eq!(full.fruit.len(), config.apple_positions_small.len());
        let (bare, _, _) = tree(0.0, 2);
        assert!(bare.fruit.is_empty());
    }

    #[test]
    fn each_hit_drops_one_apple_until_the_tree_falls() {
        let (mut tree, mut rng, config) = tree(1.0, 3);
        let mut apples = 0;
        let mut wood = 0;
        for _ in 0..4 {
            let outcome = tree.damage(&mut rng, &config);
            assert!(outcome.dropped_fruit.is_some());
            assert!(!outcome.felled);
            apples += 1;
        }
        let last = tree.damage(&mut rng, &config);
        assert!(last.felled);
        for tag in last.collected() {
            match tag {
                CollectTag::Apple => apples += 1,
                CollectTag::Wood => wood += 1,
            }
        }
        assert_eq!((apples, wood), (5, 1));
        assert!(!tree.alive);
        assert_eq!(tree.health, 0);
        // The sixth apple is cleared without a drop.
        assert!(tree.fruit.is_empty());
    }

    #[test]
    fn apple_drops_never_exceed_initial_fruit() {
        for seed in 0..20 {
            let (mut tree, mut rng, config) = tree(0.5, seed);
            let initial = tree.fruit.len();
            let mut apples = 0;
            for _ in 0..10 {
                let outcome = tree.damage(&mut rng, &config);
                apples += outcome.collected().iter().filter(|t| **t == CollectTag::Apple).count();
            }
            assert!(apples <= initial, "seed {seed}: {apples} > {initial}");
        }
    }

    #[test]
    fn dead_trees_ignore_further_hits() {
        let (mut tree, mut rng, config) = tree(0.0, 4);
        let mut felled = 0;
        for _ in 0..config.tree_health {
            if tree.damage(&mut rng, &config).felled {
                felled += 1;
            }
        }
        let stump = tree.clone();
        let after = tree.damage(&mut rng, &config);
        assert_eq!(felled, 1);
        assert_eq!(after, DamageOutcome::default());
        assert_eq!(tree, stump);
    }

    #[test]
    fn stump_keeps_the_bottom_center() {
        let (mut tree, mut rng, config) = tree(0.0, 5);
        let bottom = Vec2::new(tree.rect.center().x, tree.rect.max.y);
        for _ in 0..config.tree_health {
            tree.damage(&mut rng, &config);
        }
        assert_eq!(Vec2::new(tree.rect.center().x, tree.rect.max.y), bottom);
        assert_eq!(tree.rect.size(), config.stump_size(TreeKind::Small));
        assert_eq!(tree.image_key(), "stump_small");
    }
}
