mod hud;
mod input;
mod select_screen;
pub mod toast;
mod transitions;

use bevy::prelude::*;
use crate::shared::*;

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // ─── MESSAGE QUEUE (every state) ───
        app.init_resource::<MessageQueue>()
            .init_resource::<InventoryPanel>()
            .init_resource::<HelpOverlay>()
            .init_resource::<SleepFade>();
        app.add_systems(Update, (toast::queue_toasts, toast::tick_messages).chain());

        // ─── ALWAYS-PRESENT OVERLAYS ───
        app.add_systems(
            Startup,
            (transitions::spawn_fade_overlay, toast::spawn_toast_container),
        );
        app.add_systems(
            PostUpdate,
            (transitions::update_fade, toast::sync_toast_lines),
        );

        // ─── SELECTION SCREEN ───
        app.add_systems(OnEnter(GameState::Select), select_screen::spawn_select_screen);
        app.add_systems(OnExit(GameState::Select), select_screen::despawn_select_screen);
        app.add_systems(
            PostUpdate,
            select_screen::update_select_text.run_if(in_state(GameState::Select)),
        );

        // ─── LOADING SCREEN ───
        app.add_systems(OnEnter(GameState::LoadingFarm), select_screen::spawn_loading_screen);
        app.add_systems(OnExit(GameState::LoadingFarm), select_screen::despawn_loading_screen);
        app.add_systems(
            PostUpdate,
            select_screen::update_loading_text.run_if(in_state(GameState::LoadingFarm)),
        );

        // ─── PANEL TOGGLES (also while paused) ───
        app.add_systems(
            Update,
            (input::toggle_panels, input::tick_help_overlay)
                .chain()
                .run_if(in_state(GameState::Playing)),
        );

        // ─── HUD ───
        app.add_systems(OnEnter(GameState::Playing), hud::spawn_hud);
        app.add_systems(OnExit(GameState::Playing), hud::despawn_hud);
        app.add_systems(
            PostUpdate,
            (
                hud::update_status_text,
                hud::update_equip_text,
                hud::update_hint_text,
                hud::update_panels,
            )
                .run_if(in_state(GameState::Playing)),
        );
    }
}
