//! Headless integration tests for Farmstead.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, register only the
//! pure-logic systems (skipping all rendering/UI), and verify that the
//! core game loops work correctly against an in-memory store.
//!
//! Run with: `cargo test --test headless`

use std::sync::Arc;
use std::time::Duration;

use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use farmstead::calendar::{process_day_end, tick_sleep_fade};
use farmstead::config::GameConfig;
use farmstead::data::{self, CORN, CORN_SEED};
use farmstead::farming::{handle_plot_actions, tick_maturity};
use farmstead::player::interact_dispatch::{
    dispatch_seed_use, dispatch_tool_use, dispatch_trigger, AXE_NOT_APPLICABLE,
};
use farmstead::player::tools::tool_target;
use farmstead::session::SessionPlugin;
use farmstead::shared::*;
use farmstead::store::{InventoryRow, MemoryStore};
use farmstead::ui::toast::queue_toasts;
use farmstead::world::{build_world_grid, WorldSources};

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

fn test_config() -> GameConfig {
    let mut config = GameConfig::default();
    config.world.map_path = None;
    config.world.background_path = None;
    config.session.load_fail_delay_secs = 0.0;
    config
}

/// Builds a minimal Bevy app with all shared resources and events registered
/// but NO rendering, windowing, or asset loading. Systems must be added
/// per-test depending on what's being exercised. Toasts land in the
/// `MessageQueue` so tests can read them.
fn build_test_app(store: Arc<MemoryStore>) -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);

    // ── Game State ───────────────────────────────────────────────────────
    app.init_state::<GameState>();

    // ── Shared Resources (mirrors main.rs) ───────────────────────────────
    app.insert_resource(FarmStoreHandle::new(store))
        .insert_resource(test_config())
        .insert_resource(SimRng::seeded(7))
        .init_resource::<SimClock>()
        .init_resource::<DayCounter>()
        .init_resource::<PlayerInput>()
        .init_resource::<MessageQueue>()
        .init_resource::<InventoryPanel>()
        .init_resource::<HelpOverlay>()
        .init_resource::<SleepFade>()
        .init_resource::<SelectedPlot>()
        .init_resource::<GameAssets>();

    // ── Shared Events (mirrors main.rs) ──────────────────────────────────
    app.add_event::<ToastEvent>()
        .add_event::<ItemCollectedEvent>()
        .add_event::<DayEndEvent>()
        .add_event::<DayStartedEvent>()
        .add_event::<EnterFarmRequest>()
        .add_event::<PlotActionEvent>();

    app.add_systems(PostUpdate, queue_toasts);
    app
}

/// Loads the starter farm into the app the way a finished background load would.
fn install_farm(app: &mut App, store: &MemoryStore) {
    let config = test_config();
    let session = FarmSession::load(store, data::STARTER_PLAYER, data::STARTER_FARM).unwrap();
    let grid = build_world_grid(&config, &session.plots, WorldSources::default());
    app.insert_resource(session).insert_resource(grid);
}

fn starter_store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new(data::starter_store_data()))
}

/// Starter data with exactly one corn seed and nothing else.
fn one_corn_seed_store() -> Arc<MemoryStore> {
    let mut data = data::starter_store_data();
    data.inventory = vec![InventoryRow {
        farm_id: data::STARTER_FARM,
        item_id: CORN_SEED,
        quantity: 1,
    }];
    Arc::new(MemoryStore::new(data))
}

fn first_plot(app: &App) -> Plot {
    app.world().resource::<FarmSession>().plots[0].clone()
}

fn stored_plot(store: &MemoryStore, id: PlotId) -> Plot {
    store
        .plots(data::STARTER_FARM)
        .unwrap()
        .into_iter()
        .find(|p| p.id == id)
        .unwrap()
}

fn quantity(store: &MemoryStore, item: ItemId) -> u32 {
    store
        .inventory(data::STARTER_FARM)
        .unwrap()
        .iter()
        .find(|i| i.item_id == item)
        .map_or(0, |i| i.quantity)
}

fn messages(app: &App) -> Vec<String> {
    app.world()
        .resource::<MessageQueue>()
        .entries
        .iter()
        .map(|m| m.text.clone())
        .collect()
}

/// Spawns the player so that its facing-down tool target lands on `point`.
fn spawn_player_aiming_at(app: &mut App, point: Vec2, tool: Tool) -> Entity {
    let config = test_config();
    let origin = PlayerBody::spawn_at(Vec2::ZERO, &config.player);
    let offset = tool_target(&origin, &config.player);
    let body = PlayerBody::spawn_at(point - offset, &config.player);
    let control = PlayerControl {
        tool_index: TOOL_ORDER.iter().position(|t| *t == tool).unwrap(),
        ..Default::default()
    };
    app.world_mut().spawn((Player, body, control)).id()
}

fn plot_center(app: &App, plot: &Plot) -> Vec2 {
    app.world().resource::<WorldGrid>().plot_rect(plot).center()
}

fn press(app: &mut App, edit: impl FnOnce(&mut PlayerInput)) {
    let mut input = app.world_mut().resource_mut::<PlayerInput>();
    *input = PlayerInput::default();
    edit(&mut input);
}

fn run_until(app: &mut App, mut done: impl FnMut(&App) -> bool) {
    for _ in 0..500 {
        app.update();
        if done(app) {
            return;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    panic!("condition not reached within the frame budget");
}

fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}

// ─────────────────────────────────────────────────────────────────────────────
// Session lifecycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_background_load_enters_playing_and_escape_returns() {
    let store = starter_store();
    let mut app = build_test_app(store.clone());
    app.add_plugins(SessionPlugin);
    app.update();
    assert_eq!(state(&app), GameState::Select);

    press(&mut app, |input| input.confirm = true);
    app.update();
    press(&mut app, |_| {});

    run_until(&mut app, |app| state(app) == GameState::Playing);
    let session = app.world().resource::<FarmSession>();
    assert_eq!(session.farm.id, data::STARTER_FARM);
    assert_eq!(session.plots.len(), 24);
    assert!(app.world().resource::<WorldGrid>().width > 0.0);
    assert!(app.world().get_resource::<PendingTrees>().is_some());

    press(&mut app, |input| input.back = true);
    app.update();
    press(&mut app, |_| {});
    app.update();
    assert_eq!(state(&app), GameState::Select);
    assert!(app.world().get_resource::<FarmSession>().is_none());
}

#[test]
fn test_reentering_a_farm_starts_again_on_day_one() {
    let store = starter_store();
    let mut app = build_test_app(store);
    app.add_plugins(SessionPlugin);
    app.update();

    let enter = |app: &mut App| {
        press(app, |input| input.confirm = true);
        app.update();
        press(app, |_| {});
        run_until(app, |app| state(app) == GameState::Playing);
    };

    enter(&mut app);
    app.world_mut().resource_mut::<DayCounter>().day = 3;

    press(&mut app, |input| input.back = true);
    app.update();
    press(&mut app, |_| {});
    run_until(&mut app, |app| state(app) == GameState::Select);

    enter(&mut app);
    assert_eq!(app.world().resource::<DayCounter>().day, 1);
}

#[test]
fn test_failed_load_returns_to_selection() {
    let store = starter_store();
    let mut app = build_test_app(store);
    app.add_plugins(SessionPlugin);
    app.update();

    app.world_mut().send_event(EnterFarmRequest {
        player_id: data::STARTER_PLAYER,
        farm_id: 99,
    });
    let mut saw_loading = false;
    run_until(&mut app, |app| {
        saw_loading |= state(app) == GameState::LoadingFarm;
        saw_loading && state(app) == GameState::Select
    });

    assert!(app.world().get_resource::<FarmSession>().is_none());
    assert!(messages(&app).contains(&"Load Failed: farm 99 not found".to_string()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Plot lifecycle through PlotActionEvent
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_enter_on_empty_plot_plants_the_only_seed() {
    let store = one_corn_seed_store();
    let mut app = build_test_app(store.clone());
    install_farm(&mut app, &store);
    app.add_systems(Update, handle_plot_actions);

    let plot = first_plot(&app);
    app.world_mut().send_event(PlotActionEvent {
        plot: plot.id,
        action: PlotAction::Interact,
    });
    app.update();

    let stored = stored_plot(&store, plot.id);
    assert_eq!(stored.status, PlotStatus::Growing);
    assert_eq!(stored.crop.as_ref().map(|c| c.variety_id), Some(1));
    assert_eq!(quantity(&store, CORN_SEED), 0);
    assert_eq!(store.snapshot().action_log.len(), 1);
    assert_eq!(
        app.world().resource::<FarmSession>().plot(plot.id).unwrap().status,
        PlotStatus::Growing
    );
    assert!(messages(&app).contains(&"Planted Corn!".to_string()));
}

#[test]
fn test_harvest_yields_ten_corn() {
    let store = starter_store();
    let plot_id = store.plots(data::STARTER_FARM).unwrap()[0].id;
    store.plant(plot_id, 1, 0.0).unwrap();
    store.set_plot_status(plot_id, PlotStatus::Mature).unwrap();
    store.set_plot_levels(plot_id, Some(80), Some(40)).unwrap();

    let mut app = build_test_app(store.clone());
    install_farm(&mut app, &store);
    app.add_systems(Update, handle_plot_actions);

    app.world_mut().send_event(PlotActionEvent {
        plot: plot_id,
        action: PlotAction::Harvest,
    });
    app.update();

    assert_eq!(quantity(&store, CORN), 10);
    assert_eq!(stored_plot(&store, plot_id).status, PlotStatus::Empty);
    assert!(messages(&app).contains(&"Harvested 10 Corn!".to_string()));
}

#[test]
fn test_growing_plot_matures_when_the_clock_passes_growth_hours() {
    let store = starter_store();
    let plot_id = store.plots(data::STARTER_FARM).unwrap()[0].id;
    store.plant(plot_id, 1, 0.0).unwrap();

    let mut app = build_test_app(store.clone());
    install_farm(&mut app, &store);
    app.add_systems(Update, tick_maturity);

    app.insert_resource(SimClock::at(9.5));
    app.update();
    assert_eq!(stored_plot(&store, plot_id).status, PlotStatus::Growing);

    app.insert_resource(SimClock::at(10.0));
    app.update();
    assert_eq!(stored_plot(&store, plot_id).status, PlotStatus::Mature);
}

// ─────────────────────────────────────────────────────────────────────────────
// Interaction dispatcher
// ─────────────────────────────────────────────────────────────────────────────

fn axe_app(store: &Arc<MemoryStore>) -> App {
    let mut app = build_test_app(store.clone());
    install_farm(&mut app, store);
    app.add_systems(Update, (dispatch_tool_use, handle_plot_actions).chain());
    app
}

#[test]
fn test_axe_clears_a_withered_plot() {
    let store = starter_store();
    let plot_id = store.plots(data::STARTER_FARM).unwrap()[0].id;
    store.plant(plot_id, 1, 0.0).unwrap();
    store.set_plot_status(plot_id, PlotStatus::Withered).unwrap();

    let mut app = axe_app(&store);
    let plot = first_plot(&app);
    let target = plot_center(&app, &plot);
    spawn_player_aiming_at(&mut app, target, Tool::Axe);
    press(&mut app, |input| input.use_tool = true);
    app.update();

    assert_eq!(stored_plot(&store, plot_id).status, PlotStatus::Empty);
    assert!(stored_plot(&store, plot_id).crop.is_none());
}

#[test]
fn test_axe_harvests_a_mature_plot() {
    let store = starter_store();
    let plot_id = store.plots(data::STARTER_FARM).unwrap()[0].id;
    store.plant(plot_id, 1, 0.0).unwrap();
    store.set_plot_status(plot_id, PlotStatus::Mature).unwrap();

    let mut app = axe_app(&store);
    let plot = first_plot(&app);
    let target = plot_center(&app, &plot);
    spawn_player_aiming_at(&mut app, target, Tool::Axe);
    press(&mut app, |input| input.use_tool = true);
    app.update();

    assert_eq!(stored_plot(&store, plot_id).status, PlotStatus::Empty);
    assert!(quantity(&store, CORN) >= 1);
    assert_eq!(store.snapshot().action_log.len(), 1);
}

#[test]
fn test_axe_on_open_ground_is_not_applicable() {
    let store = starter_store();
    let before = store.snapshot();

    let mut app = axe_app(&store);
    spawn_player_aiming_at(&mut app, Vec2::new(2600.0, 400.0), Tool::Axe);
    press(&mut app, |input| input.use_tool = true);
    app.update();

    assert_eq!(store.snapshot(), before);
    assert!(messages(&app).contains(&AXE_NOT_APPLICABLE.to_string()));
}

#[test]
fn test_seed_use_without_seeds_changes_nothing() {
    let mut data = data::starter_store_data();
    data.inventory.clear();
    let store = Arc::new(MemoryStore::new(data));
    let before = store.snapshot();

    let mut app = build_test_app(store.clone());
    install_farm(&mut app, &store);
    app.add_systems(Update, (dispatch_seed_use, handle_plot_actions).chain());

    let plot = first_plot(&app);
    let target = plot_center(&app, &plot);
    spawn_player_aiming_at(&mut app, target, Tool::Hoe);
    press(&mut app, |input| input.use_seed = true);
    app.update();

    assert_eq!(store.snapshot(), before);
    assert_eq!(stored_plot(&store, plot.id).status, PlotStatus::Empty);
    assert!(messages(&app).contains(&"No seeds to plant!".to_string()));
}

// ─────────────────────────────────────────────────────────────────────────────
// Day cycle
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_sleeping_in_bed_with_forced_rain_waters_every_plot() {
    let store = starter_store();
    let mut app = build_test_app(store.clone());
    install_farm(&mut app, &store);
    {
        let mut config = app.world_mut().resource_mut::<GameConfig>();
        config.day_cycle.rain_chance = 1.0;
        config.day_cycle.fade_speed = 1_000_000.0;
    }
    app.add_systems(
        Update,
        (dispatch_trigger, tick_sleep_fade, process_day_end).chain(),
    );

    let player = spawn_player_aiming_at(&mut app, Vec2::new(2600.0, 400.0), Tool::Hoe);
    let hitbox = app.world().get::<PlayerBody>(player).unwrap().hitbox;
    app.world_mut()
        .resource_mut::<WorldGrid>()
        .zones
        .push(InteractionZone {
            name: "Bed".into(),
            rect: hitbox,
        });

    press(&mut app, |input| input.interact = true);
    app.update();
    press(&mut app, |_| {});
    assert!(app.world().get::<PlayerControl>(player).unwrap().asleep);
    assert!(messages(&app).contains(&"Going to bed...".to_string()));

    run_until(&mut app, |app| {
        !app.world().get::<PlayerControl>(player).unwrap().asleep
    });

    assert_eq!(app.world().resource::<DayCounter>().day, 2);
    for plot in store.plots(data::STARTER_FARM).unwrap() {
        assert_eq!(plot.water_level, 25);
    }
    assert!(app
        .world()
        .resource::<FarmSession>()
        .plots
        .iter()
        .all(|p| p.water_level == 25));
    assert!(!app.world().resource::<SleepFade>().active);
}
