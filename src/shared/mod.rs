//! Shared components, resources, events, and states for Farmstead.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly.
//!
//! World coordinates are y-down with the origin at the top-left corner of
//! the map, matching the map asset. Only the render systems convert to
//! Bevy's y-up space.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════
// GAME STATE
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum GameState {
    /// Player/farm selection. Also the fallback after a failed load.
    #[default]
    Select,
    /// A farm session is being built on a background task.
    LoadingFarm,
    Playing,
}

// ═══════════════════════════════════════════════════════════════════════
// IDENTIFIERS & TIME
// ═══════════════════════════════════════════════════════════════════════

pub type PlayerId = u32;
pub type FarmId = u32;
pub type PlotId = u32;
pub type ItemId = u32;
pub type CropVarietyId = u32;

/// Simulated hours since the store's epoch.
pub type SimHours = f64;

/// Injectable simulation clock. Growth progress and maturity read this
/// instead of the wall clock.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SimClock {
    pub hours: SimHours,
}

impl SimClock {
    pub fn at(hours: SimHours) -> Self {
        Self { hours }
    }

    pub fn now(&self) -> SimHours {
        self.hours
    }

    pub fn advance(&mut self, hours: SimHours) {
        if hours > 0.0 {
            self.hours += hours;
        }
    }
}

/// Seedable randomness for weather rolls, fruit draws and drop choice.
#[derive(Resource, Debug, Clone)]
pub struct SimRng(pub StdRng);

impl Default for SimRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}

impl SimRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

/// The in-game day counter advanced by sleeping.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCounter {
    pub day: u32,
}

impl Default for DayCounter {
    fn default() -> Self {
        Self { day: 1 }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// TOOLS & SEEDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Facing {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Facing {
    /// Action-name prefix used to key animation frame sets.
    pub fn name(self) -> &'static str {
        match self {
            Facing::Up => "up",
            Facing::Down => "down",
            Facing::Left => "left",
            Facing::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Hoe,
    Axe,
    WateringCan,
}

/// Cycling order for the equipped tool.
pub const TOOL_ORDER: [Tool; 3] = [Tool::Hoe, Tool::Axe, Tool::WateringCan];

impl Tool {
    pub fn name(self) -> &'static str {
        match self {
            Tool::Hoe => "hoe",
            Tool::Axe => "axe",
            Tool::WateringCan => "water",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeedKind {
    Corn,
    Tomato,
}

pub const SEED_ORDER: [SeedKind; 2] = [SeedKind::Corn, SeedKind::Tomato];

impl SeedKind {
    /// Lowercase keyword matched as a substring against crop variety names.
    pub fn keyword(self) -> &'static str {
        match self {
            SeedKind::Corn => "corn",
            SeedKind::Tomato => "tomato",
        }
    }
}

/// Rotates `current` by `step` within `0..len`, wrapping in both directions.
pub fn cycle_index(current: usize, len: usize, step: i32) -> usize {
    if len == 0 {
        return 0;
    }
    let len = len as i64;
    ((current as i64 + step as i64).rem_euclid(len)) as usize
}

// ═══════════════════════════════════════════════════════════════════════
// FARM RECORDS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub id: PlayerId,
    pub name: String,
    pub level: u32,
    pub exp: u32,
    pub gold: f64,
    pub gems: u32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FarmRecord {
    pub id: FarmId,
    pub player_id: PlayerId,
    pub name: String,
    /// 0..=100
    pub soil_quality: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlotStatus {
    #[default]
    Empty,
    Growing,
    Mature,
    Withered,
}

impl PlotStatus {
    pub fn label(self) -> &'static str {
        match self {
            PlotStatus::Empty => "Empty",
            PlotStatus::Growing => "Growing",
            PlotStatus::Mature => "Mature",
            PlotStatus::Withered => "Withered",
        }
    }
}

/// The crop occupying a plot. Variety and planting time exist together or
/// not at all; name and growth hours are joined from the variety table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlantedCrop {
    pub variety_id: CropVarietyId,
    pub planted_at: SimHours,
    pub name: String,
    pub growth_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    pub id: PlotId,
    pub farm_id: FarmId,
    pub x: i32,
    pub y: i32,
    pub status: PlotStatus,
    pub crop: Option<PlantedCrop>,
    pub water_level: u8,
    pub fertilizer_level: u8,
}

impl Plot {
    pub fn empty(id: PlotId, farm_id: FarmId, x: i32, y: i32) -> Self {
        Self {
            id,
            farm_id,
            x,
            y,
            status: PlotStatus::Empty,
            crop: None,
            water_level: 0,
            fertilizer_level: 0,
        }
    }

    /// Simulated hours since planting, never negative.
    pub fn elapsed_hours(&self, now: SimHours) -> Option<f64> {
        self.crop
            .as_ref()
            .map(|crop| (now - crop.planted_at).max(0.0))
    }

    /// Back to Empty with no crop and zeroed levels.
    pub fn reset(&mut self) {
        self.status = PlotStatus::Empty;
        self.crop = None;
        self.water_level = 0;
        self.fertilizer_level = 0;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropVariety {
    pub id: CropVarietyId,
    pub name: String,
    pub growth_hours: f64,
    pub base_yield: u32,
    pub seed_item_id: ItemId,
    pub produce_item_id: ItemId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemType {
    Seed,
    Produce,
    Material,
    Feed,
    Tool,
    Misc,
}

/// Catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub stack_limit: u32,
    pub base_price: f64,
}

/// One inventory row joined with its catalog name, type and price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item_id: ItemId,
    pub name: String,
    pub item_type: ItemType,
    pub quantity: u32,
    pub base_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Plant,
    Harvest,
}

/// Append-only audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub player_id: PlayerId,
    pub farm_id: FarmId,
    pub action: ActionKind,
    pub meta: serde_json::Value,
    pub at: SimHours,
}

// ═══════════════════════════════════════════════════════════════════════
// PERSISTENCE CONTRACT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("conditional update rejected: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Durable authority for players, farms, plots, inventory, catalog and the
/// action log. Every mutation either applies completely or returns `Err`.
pub trait FarmStore: Send + Sync {
    fn active_players(&self) -> Result<Vec<PlayerRecord>, StoreError>;
    fn player(&self, id: PlayerId) -> Result<Option<PlayerRecord>, StoreError>;
    fn farms_for_player(&self, player_id: PlayerId) -> Result<Vec<FarmRecord>, StoreError>;
    fn farm(&self, id: FarmId) -> Result<Option<FarmRecord>, StoreError>;
    /// Plots of a farm with crop name and growth hours joined in.
    fn plots(&self, farm_id: FarmId) -> Result<Vec<Plot>, StoreError>;
    /// Rows with quantity > 0, joined with catalog name, type and price.
    fn inventory(&self, farm_id: FarmId) -> Result<Vec<InventoryItem>, StoreError>;
    fn crop_varieties(&self) -> Result<Vec<CropVariety>, StoreError>;
    fn catalog(&self) -> Result<Vec<ItemDef>, StoreError>;

    /// Only applies while the plot is Empty.
    fn plant(
        &self,
        plot_id: PlotId,
        variety_id: CropVarietyId,
        planted_at: SimHours,
    ) -> Result<(), StoreError>;
    fn set_plot_status(&self, plot_id: PlotId, status: PlotStatus) -> Result<(), StoreError>;
    /// Only applies while the plot is Mature. Resets it to Empty.
    fn harvest_plot(&self, plot_id: PlotId) -> Result<(), StoreError>;
    /// Unconditional reset to Empty.
    fn reset_plot(&self, plot_id: PlotId) -> Result<(), StoreError>;
    /// Partial update; `None` leaves a level untouched. Both `None` is an error.
    fn set_plot_levels(
        &self,
        plot_id: PlotId,
        water: Option<u8>,
        fertilizer: Option<u8>,
    ) -> Result<(), StoreError>;
    /// Signed delta; creates the row if absent. A negative result is rejected.
    fn adjust_inventory(&self, farm_id: FarmId, item_id: ItemId, delta: i64)
        -> Result<(), StoreError>;
    fn log_action(&self, entry: ActionLogEntry) -> Result<(), StoreError>;
}

/// Shared handle to the active store. Cloned into background loaders.
#[derive(Resource, Clone)]
pub struct FarmStoreHandle(pub Arc<dyn FarmStore>);

impl FarmStoreHandle {
    pub fn new(store: Arc<dyn FarmStore>) -> Self {
        Self(store)
    }

    pub fn get(&self) -> &dyn FarmStore {
        self.0.as_ref()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ERRORS
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Error)]
pub enum FarmError {
    /// A store call failed. `message` is what the player sees.
    #[error("{message} ({source})")]
    Persistence {
        message: &'static str,
        #[source]
        source: StoreError,
    },
    /// Rejected before any mutation; the message is shown as-is.
    #[error("{0}")]
    InvalidInteraction(String),
    #[error("asset missing: {0}")]
    AssetMissing(String),
    #[error("farm load failed: {0}")]
    SceneLoad(String),
}

impl FarmError {
    pub fn invalid(message: impl Into<String>) -> Self {
        FarmError::InvalidInteraction(message.into())
    }

    pub fn persistence(message: &'static str, source: StoreError) -> Self {
        FarmError::Persistence { message, source }
    }

    /// Text for the transient message queue.
    pub fn user_message(&self) -> String {
        match self {
            FarmError::Persistence { message, .. } => (*message).to_string(),
            FarmError::InvalidInteraction(message) => message.clone(),
            FarmError::AssetMissing(key) => format!("Missing asset: {key}"),
            FarmError::SceneLoad(reason) => format!("Load Failed: {reason}"),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// SESSION SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════

/// In-memory view of the active farm. Owned by the simulation thread and
/// refreshed from the store after every mutation.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmSession {
    pub player: PlayerRecord,
    pub farm: FarmRecord,
    pub plots: Vec<Plot>,
    pub inventory: Vec<InventoryItem>,
    pub varieties: Vec<CropVariety>,
    pub catalog: Vec<ItemDef>,
}

impl FarmSession {
    /// Reads a complete snapshot of `farm_id`, which must belong to `player_id`.
    pub fn load(
        store: &dyn FarmStore,
        player_id: PlayerId,
        farm_id: FarmId,
    ) -> Result<Self, FarmError> {
        let read = |e| FarmError::persistence("Loading farm failed!", e);
        let player = store
            .player(player_id)
            .map_err(read)?
            .ok_or_else(|| FarmError::SceneLoad(format!("player {player_id} not found")))?;
        let farm = store
            .farm(farm_id)
            .map_err(read)?
            .filter(|farm| farm.player_id == player_id)
            .ok_or_else(|| FarmError::SceneLoad(format!("farm {farm_id} not found")))?;
        Ok(Self {
            plots: store.plots(farm.id).map_err(read)?,
            inventory: store.inventory(farm.id).map_err(read)?,
            varieties: store.crop_varieties().map_err(read)?,
            catalog: store.catalog().map_err(read)?,
            player,
            farm,
        })
    }

    pub fn plot(&self, id: PlotId) -> Option<&Plot> {
        self.plots.iter().find(|p| p.id == id)
    }

    pub fn plot_mut(&mut self, id: PlotId) -> Option<&mut Plot> {
        self.plots.iter_mut().find(|p| p.id == id)
    }

    pub fn variety(&self, id: CropVarietyId) -> Option<&CropVariety> {
        self.varieties.iter().find(|v| v.id == id)
    }

    /// First variety whose name contains `keyword`, ignoring case.
    pub fn variety_matching(&self, keyword: &str) -> Option<&CropVariety> {
        let keyword = keyword.to_lowercase();
        self.varieties
            .iter()
            .find(|v| v.name.to_lowercase().contains(&keyword))
    }

    /// Catalog entry whose name equals `name`, ignoring case.
    pub fn catalog_item_named(&self, name: &str) -> Option<&ItemDef> {
        self.catalog
            .iter()
            .find(|item| item.name.eq_ignore_ascii_case(name))
    }

    pub fn quantity_of(&self, item_id: ItemId) -> u32 {
        self.inventory
            .iter()
            .find(|i| i.item_id == item_id)
            .map_or(0, |i| i.quantity)
    }

    /// Replaces the plot view with the store's.
    pub fn reload_plots(&mut self, store: &dyn FarmStore) -> Result<(), StoreError> {
        self.plots = store.plots(self.farm.id)?;
        Ok(())
    }

    pub fn reload_inventory(&mut self, store: &dyn FarmStore) -> Result<(), StoreError> {
        self.inventory = store.inventory(self.farm.id)?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD GEOMETRY
// ═══════════════════════════════════════════════════════════════════════

/// Static geometry of one farm instance.
#[derive(Resource, Debug, Clone, Default)]
pub struct WorldGrid {
    pub tile_size: f32,
    pub width: f32,
    pub height: f32,
    /// World-space offset added to every plot rectangle.
    pub plot_offset: Vec2,
    pub obstacles: Vec<Rect>,
    /// Top-left corner of the player sprite at spawn.
    pub spawn: Vec2,
    pub zones: Vec<InteractionZone>,
}

/// Invisible trigger area placed by the map (bed, trader, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionZone {
    pub name: String,
    pub rect: Rect,
}

/// Strict overlap: rectangles that only share an edge do not collide.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

/// Half-open containment: the max edges are outside.
pub fn rect_contains(rect: Rect, point: Vec2) -> bool {
    point.x >= rect.min.x && point.x < rect.max.x && point.y >= rect.min.y && point.y < rect.max.y
}

/// Grows (or shrinks, for negative values) the total width and height by
/// `dx`/`dy`, keeping the center fixed.
pub fn inflate_rect(rect: Rect, dx: f32, dy: f32) -> Rect {
    let size = (rect.size() + Vec2::new(dx, dy)).max(Vec2::ZERO);
    Rect::from_center_size(rect.center(), size)
}

/// Moves `rect` inside `bounds` without resizing it. A rect larger than the
/// bounds on an axis is centered on that axis.
pub fn clamp_rect_inside(rect: Rect, bounds: Rect) -> Rect {
    let size = rect.size();
    let clamp_axis = |min: f32, len: f32, lo: f32, hi: f32| -> f32 {
        if len >= hi - lo {
            lo + (hi - lo - len) / 2.0
        } else {
            min.clamp(lo, hi - len)
        }
    };
    let x = clamp_axis(rect.min.x, size.x, bounds.min.x, bounds.max.x);
    let y = clamp_axis(rect.min.y, size.y, bounds.min.y, bounds.max.y);
    Rect::new(x, y, x + size.x, y + size.y)
}

/// Render translation for a world-space point (y-down) in Bevy space (y-up).
pub fn world_to_render(point: Vec2, z: f32) -> Vec3 {
    Vec3::new(point.x, -point.y, z)
}

/// Rect from a top-left corner and a size, as stored in map and config data.
pub fn rect_xywh(x: f32, y: f32, w: f32, h: f32) -> Rect {
    Rect::new(x, y, x + w, y + h)
}

// ═══════════════════════════════════════════════════════════════════════
// PLAYER
// ═══════════════════════════════════════════════════════════════════════

#[derive(Component, Debug, Clone, Default)]
pub struct Player;

/// Physical state of the player. `pos` is always the hitbox center.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct PlayerBody {
    /// Visual bounds.
    pub sprite: Rect,
    /// Collision-authoritative bounds, smaller than the sprite.
    pub hitbox: Rect,
    pub pos: Vec2,
    pub facing: Facing,
    pub moving: bool,
}

/// Equipped tool/seed and the timed tool swing.
#[derive(Component, Debug, Clone)]
pub struct PlayerControl {
    pub tool_index: usize,
    pub seed_index: usize,
    /// Counts down while a tool swing plays. Movement is suppressed meanwhile.
    pub tool_timer: Timer,
    pub asleep: bool,
}

impl Default for PlayerControl {
    fn default() -> Self {
        let mut tool_timer = Timer::from_seconds(0.0, TimerMode::Once);
        tool_timer.tick(std::time::Duration::ZERO);
        Self {
            tool_index: 0,
            seed_index: 0,
            tool_timer,
            asleep: false,
        }
    }
}

impl PlayerControl {
    pub fn tool(&self) -> Tool {
        TOOL_ORDER[self.tool_index % TOOL_ORDER.len()]
    }

    pub fn seed(&self) -> SeedKind {
        SEED_ORDER[self.seed_index % SEED_ORDER.len()]
    }

    pub fn using_tool(&self) -> bool {
        !self.tool_timer.finished()
    }
}

/// Animation state exposed to the renderer.
#[derive(Component, Debug, Clone)]
pub struct PlayerAnimation {
    pub action: String,
    pub frame: usize,
    pub frame_timer: Timer,
}

// ═══════════════════════════════════════════════════════════════════════
// ENVIRONMENT
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeKind {
    Small,
    Large,
}

impl TreeKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Small" => Some(TreeKind::Small),
            "Large" => Some(TreeKind::Large),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TreeKind::Small => "small",
            TreeKind::Large => "large",
        }
    }
}

/// A destructible tree. Alive until health reaches 0, then a stump forever.
#[derive(Component, Debug, Clone, PartialEq)]
pub struct Tree {
    pub kind: TreeKind,
    pub rect: Rect,
    pub hitbox: Rect,
    pub health: u32,
    pub alive: bool,
    /// Occupied fruit attach points, as indices into the kind's offset table.
    pub fruit: Vec<usize>,
    /// World-space positions matching each attach-point index.
    pub fruit_slots: Vec<Vec2>,
}

/// Trees built by the farm loader, spawned on entering Playing.
#[derive(Resource, Debug, Clone, Default)]
pub struct PendingTrees(pub Vec<Tree>);

/// Short-lived fading visual left where fruit dropped or a tree fell.
#[derive(Component, Debug, Clone)]
pub struct Particle {
    pub rect: Rect,
    pub timer: Timer,
}

/// Item tags produced by environment entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectTag {
    Apple,
    Wood,
}

impl CollectTag {
    pub fn name(self) -> &'static str {
        match self {
            CollectTag::Apple => "apple",
            CollectTag::Wood => "wood",
        }
    }
}

/// Marker for every entity that belongs to the active farm session.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct SessionEntity;

// ═══════════════════════════════════════════════════════════════════════
// INPUT
// ═══════════════════════════════════════════════════════════════════════

/// One tick of abstract input. Filled in PreUpdate, read by simulation.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerInput {
    /// World-space direction: x right, y down. Not normalized.
    pub move_axis: Vec2,
    /// Facing requested by the most recently evaluated pressed key.
    pub facing: Option<Facing>,
    pub use_tool: bool,
    pub use_seed: bool,
    pub interact: bool,
    pub tool_next: bool,
    pub tool_prev: bool,
    pub seed_next: bool,
    pub seed_prev: bool,
    pub toggle_inventory: bool,
    pub toggle_help: bool,
    pub back: bool,
    pub select_prev: bool,
    pub select_next: bool,
    pub confirm: bool,
}

#[derive(Resource, Debug, Clone)]
pub struct KeyBindings {
    pub move_up: KeyCode,
    pub move_down: KeyCode,
    pub move_left: KeyCode,
    pub move_right: KeyCode,
    pub use_tool: KeyCode,
    pub use_seed: KeyCode,
    pub interact: KeyCode,
    pub tool_prev: KeyCode,
    pub tool_next: KeyCode,
    pub seed_prev: KeyCode,
    pub seed_next: KeyCode,
    pub inventory: KeyCode,
    pub help: KeyCode,
    pub back: KeyCode,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            move_up: KeyCode::KeyW,
            move_down: KeyCode::KeyS,
            move_left: KeyCode::KeyA,
            move_right: KeyCode::KeyD,
            use_tool: KeyCode::Space,
            use_seed: KeyCode::ControlLeft,
            interact: KeyCode::Enter,
            tool_prev: KeyCode::KeyQ,
            tool_next: KeyCode::KeyE,
            seed_prev: KeyCode::KeyZ,
            seed_next: KeyCode::KeyX,
            inventory: KeyCode::KeyI,
            help: KeyCode::KeyH,
            back: KeyCode::Escape,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// ASSETS
// ═══════════════════════════════════════════════════════════════════════

/// Owned asset provider, built once at startup and read through `Res`.
/// Absent keys mean "draw a placeholder".
#[derive(Resource, Debug, Clone, Default)]
pub struct GameAssets {
    /// Animation frames keyed by action name (`down`, `left_idle`, `up_axe`, ...).
    pub animations: HashMap<String, Vec<Handle<Image>>>,
    /// Static images keyed by object, tool or seed name.
    pub images: HashMap<String, Handle<Image>>,
}

impl GameAssets {
    pub fn frames(&self, action: &str) -> Option<&[Handle<Image>]> {
        self.animations
            .get(action)
            .map(Vec::as_slice)
            .filter(|frames| !frames.is_empty())
    }

    pub fn frame_count(&self, action: &str) -> Option<usize> {
        self.frames(action).map(<[_]>::len)
    }

    pub fn image(&self, key: &str) -> Option<Handle<Image>> {
        self.images.get(key).cloned()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PRESENTATION HAND-OFF
// ═══════════════════════════════════════════════════════════════════════

/// Transient notification queue of (text, remaining seconds).
#[derive(Resource, Debug, Clone, Default)]
pub struct MessageQueue {
    pub entries: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub text: String,
    pub remaining: f32,
}

/// The plot nearest the player, with the action hint a UI would show.
#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct SelectedPlot {
    pub plot: Option<PlotId>,
    pub hint: Option<&'static str>,
}

/// Top-left corner of the visible screen in world coordinates.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraOffset(pub Vec2);

/// While open, the simulation tick is paused.
#[derive(Resource, Debug, Clone, Default)]
pub struct InventoryPanel {
    pub open: bool,
}

/// Run condition: false while the inventory panel pauses the simulation.
pub fn simulation_running(panel: Option<Res<InventoryPanel>>) -> bool {
    panel.map_or(true, |panel| !panel.open)
}

#[derive(Resource, Debug, Clone)]
pub struct HelpOverlay {
    pub visible: bool,
    pub timer: Timer,
}

impl Default for HelpOverlay {
    fn default() -> Self {
        Self {
            visible: true,
            timer: Timer::from_seconds(10.0, TimerMode::Once),
        }
    }
}

/// Fade state of the sleep transition, 0 = clear, 1 = black.
#[derive(Resource, Debug, Clone, Default)]
pub struct SleepFade {
    pub active: bool,
    pub darkening: bool,
    pub level: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS
// ═══════════════════════════════════════════════════════════════════════

/// Queue a transient message.
#[derive(Event, Debug, Clone)]
pub struct ToastEvent {
    pub message: String,
    pub duration_secs: f32,
}

impl ToastEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            duration_secs: MESSAGE_SECS,
        }
    }
}

/// A tree dropped an item for the player.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemCollectedEvent {
    pub tag: CollectTag,
}

/// The sleep fade reached black; the day cycle should run.
#[derive(Event, Debug, Clone, Copy)]
pub struct DayEndEvent;

/// Sent after the day cycle finished.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayStartedEvent {
    pub day: u32,
    pub rained: bool,
}

/// What the interaction dispatcher asks the farming domain to do to a plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotAction {
    /// Plant the variety matching the selected seed.
    Sow(SeedKind),
    /// Status-driven default: plant, check growth, harvest or clear.
    Interact,
    Water,
    Fertilize,
    Harvest,
    ClearWithered,
}

#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlotActionEvent {
    pub plot: PlotId,
    pub action: PlotAction,
}

/// Ask for a farm session to be built in the background.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnterFarmRequest {
    pub player_id: PlayerId,
    pub farm_id: FarmId,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

pub const MESSAGE_SECS: f32 = 2.0;
pub const LEVEL_MAX: u8 = 100;

// Draw order, low to high.
pub const Z_GROUND: f32 = 0.0;
pub const Z_SOIL: f32 = 2.0;
pub const Z_MAIN: f32 = 7.0;
pub const Z_FRUIT: f32 = 8.0;
pub const Z_PARTICLE: f32 = 9.0;
pub const Z_OVERLAY: f32 = 20.0;
