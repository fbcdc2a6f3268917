use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, AsyncComputeTaskPool, Task};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;

use crate::config::GameConfig;
use crate::shared::*;
use crate::world::inference::{infer_obstacles, AlphaMask};
use crate::world::{build_world_grid, load_map, WorldSources};

/// Everything a farm needs before the first `Playing` tick.
#[derive(Debug, Clone)]
pub struct LoadedFarm {
    pub session: FarmSession,
    pub grid: WorldGrid,
    pub trees: Vec<Tree>,
    /// Latest stored planting time; the clock resumes no earlier than this.
    pub resume_at: SimHours,
}

/// The single in-flight farm build.
#[derive(Resource)]
pub struct FarmLoadTask(pub Task<Result<LoadedFarm, FarmError>>);

/// A failed build, shown until the timer sends us back to `Select`.
#[derive(Resource, Debug)]
pub struct LoadFailure {
    pub message: String,
    pub timer: Timer,
}

/// Builds a farm session. Runs on the async compute pool.
///
/// A broken map fails the load. A missing or unreadable background only
/// loses the inferred obstacles; it is skipped when a map is present.
pub fn build_farm(
    store: &dyn FarmStore,
    config: &GameConfig,
    request: EnterFarmRequest,
    seed: u64,
) -> Result<LoadedFarm, FarmError> {
    let session = FarmSession::load(store, request.player_id, request.farm_id)?;
    let map = load_map(config)?;

    let (background_size, inferred) = match (&map, config.world.background_path.as_deref()) {
        (None, Some(path)) => match AlphaMask::load(Path::new(path)) {
            Ok(mask) => {
                let cell = config.world.tile_size.max(0.0) as u32;
                let rects = infer_obstacles(&mask, cell, &config.world.inference);
                let size = Vec2::new(mask.width as f32, mask.height as f32);
                (Some(size), rects)
            }
            Err(e) => {
                warn!("[Session] Background skipped: {}", e);
                (None, Vec::new())
            }
        },
        _ => (None, Vec::new()),
    };

    let grid = build_world_grid(
        config,
        &session.plots,
        WorldSources {
            map: map.as_ref(),
            background_size,
            inferred,
        },
    );

    let mut rng = StdRng::seed_from_u64(seed);
    let environment = &config.environment;
    let trees = map
        .iter()
        .flat_map(|m| m.trees.iter())
        .map(|placement| {
            let size = placement
                .size
                .unwrap_or_else(|| environment.tree_size(placement.kind));
            Tree::new(
                placement.kind,
                placement.top_left(size),
                size,
                environment,
                &mut rng,
            )
        })
        .collect();

    let resume_at = session
        .plots
        .iter()
        .filter_map(|p| p.crop.as_ref().map(|c| c.planted_at))
        .fold(0.0, f64::max);

    Ok(LoadedFarm {
        session,
        grid,
        trees,
        resume_at,
    })
}

/// Text shown (and toasted) for a failed build.
pub fn failure_text(error: &FarmError) -> String {
    match error {
        FarmError::SceneLoad(_) => error.user_message(),
        other => format!("Load Failed: {}", other.user_message()),
    }
}

pub fn start_farm_load(
    mut commands: Commands,
    mut requests: EventReader<EnterFarmRequest>,
    pending: Option<Res<FarmLoadTask>>,
    store: Res<FarmStoreHandle>,
    config: Res<GameConfig>,
    mut rng: ResMut<SimRng>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    // The latest request of the frame wins.
    let Some(request) = requests.read().last().copied() else {
        return;
    };
    if pending.is_some() {
        debug!("[Session] Load already in flight, ignoring {:?}", request);
        return;
    }

    info!(
        "[Session] Loading farm {} for player {}",
        request.farm_id, request.player_id
    );
    let store = store.0.clone();
    let config = config.clone();
    let seed: u64 = rng.0.gen();
    let task = AsyncComputeTaskPool::get()
        .spawn(async move { build_farm(store.as_ref(), &config, request, seed) });
    commands.insert_resource(FarmLoadTask(task));
    next_state.set(GameState::LoadingFarm);
}

pub fn poll_farm_load(
    mut commands: Commands,
    task: Option<ResMut<FarmLoadTask>>,
    config: Res<GameConfig>,
    mut clock: ResMut<SimClock>,
    mut day: ResMut<DayCounter>,
    mut next_state: ResMut<NextState<GameState>>,
    mut toasts: EventWriter<ToastEvent>,
) {
    let Some(mut task) = task else {
        return;
    };
    let Some(result) = block_on(future::poll_once(&mut task.0)) else {
        return;
    };
    commands.remove_resource::<FarmLoadTask>();

    match result {
        Ok(loaded) => {
            info!(
                "[Session] Farm '{}' ready: {} plots, {} trees, {} obstacles",
                loaded.session.farm.name,
                loaded.session.plots.len(),
                loaded.trees.len(),
                loaded.grid.obstacles.len()
            );
            if clock.now() < loaded.resume_at {
                *clock = SimClock::at(loaded.resume_at);
            }
            *day = DayCounter::default();
            commands.insert_resource(loaded.session);
            commands.insert_resource(loaded.grid);
            commands.insert_resource(PendingTrees(loaded.trees));
            next_state.set(GameState::Playing);
        }
        Err(e) => {
            warn!("[Session] Failed to load farm: {}", e);
            let message = failure_text(&e);
            toasts.send(ToastEvent::new(message.clone()));
            commands.insert_resource(LoadFailure {
                message,
                timer: Timer::from_seconds(config.session.load_fail_delay_secs, TimerMode::Once),
            });
        }
    }
}

pub fn tick_load_failure(
    mut commands: Commands,
    time: Res<Time>,
    failure: Option<ResMut<LoadFailure>>,
    mut next_state: ResMut<NextState<GameState>>,
) {
    let Some(mut failure) = failure else {
        return;
    };
    failure.timer.tick(time.delta());
    if failure.timer.finished() {
        info!("[Session] Returning to selection after: {}", failure.message);
        commands.remove_resource::<LoadFailure>();
        next_state.set(GameState::Select);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;
    use crate::store::{MemoryStore, StoreOp};

    fn request() -> EnterFarmRequest {
        EnterFarmRequest {
            player_id: data::STARTER_PLAYER,
            farm_id: data::STARTER_FARM,
        }
    }

    fn no_map() -> GameConfig {
        let mut config = GameConfig::default();
        config.world.map_path = None;
        config.world.background_path = None;
        config
    }

    #[test]
    fn builds_the_starter_farm() {
        let store = MemoryStore::new(data::starter_store_data());
        let loaded = build_farm(&store, &no_map(), request(), 3).unwrap();
        assert_eq!(loaded.session.plots.len(), 24);
        assert!(loaded.trees.is_empty());
        assert!(loaded.grid.width > 0.0 && loaded.grid.height > 0.0);
        assert_eq!(loaded.resume_at, 0.0);
    }

    #[test]
    fn map_trees_stand_on_their_anchor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farm.tmx");
        std::fs::write(
            &path,
            r#"<map width="50" height="40" tilewidth="64" tileheight="64">
 <objectgroup name="Trees">
  <object name="Small" x="300" y="400"/>
  <object name="Large" x="900" y="700" width="96" height="112"/>
 </objectgroup>
</map>"#,
        )
        .unwrap();
        let mut config = no_map();
        config.world.map_path = Some(path.display().to_string());
        let store = MemoryStore::new(data::starter_store_data());

        let loaded = build_farm(&store, &config, request(), 3).unwrap();

        let small_size = config.environment.tree_size(TreeKind::Small);
        let small = &loaded.trees[0].rect;
        assert_eq!(small.min, Vec2::new(300.0, 400.0 - small_size.y));
        assert_eq!(small.max.y, 400.0);
        let large = &loaded.trees[1].rect;
        assert_eq!(large.min, Vec2::new(900.0, 588.0));
        assert_eq!(large.max.y, 700.0);
    }

    #[test]
    fn resumes_after_the_latest_planting() {
        let store = MemoryStore::new(data::starter_store_data());
        let plots = store.plots(data::STARTER_FARM).unwrap();
        store.plant(plots[3].id, 1, 42.5).unwrap();
        let loaded = build_farm(&store, &no_map(), request(), 3).unwrap();
        assert_eq!(loaded.resume_at, 42.5);
    }

    #[test]
    fn unknown_farm_is_a_scene_failure() {
        let store = MemoryStore::new(data::starter_store_data());
        let mut bad = request();
        bad.farm_id = 99;
        let err = build_farm(&store, &no_map(), bad, 3).unwrap_err();
        assert_eq!(failure_text(&err), "Load Failed: farm 99 not found");
    }

    #[test]
    fn store_outage_is_reported_as_a_load_failure() {
        let store = MemoryStore::new(data::starter_store_data());
        store.fail_on(StoreOp::Read);
        let err = build_farm(&store, &no_map(), request(), 3).unwrap_err();
        assert_eq!(failure_text(&err), "Load Failed: Loading farm failed!");
    }
}
