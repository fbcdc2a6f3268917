use bevy::prelude::*;
use crate::shared::*;

/// I opens and closes the inventory panel, H the help overlay.
pub fn toggle_panels(
    input: Res<PlayerInput>,
    mut panel: ResMut<InventoryPanel>,
    mut help: ResMut<HelpOverlay>,
) {
    if input.toggle_inventory {
        panel.open = !panel.open;
        info!("[UI] Inventory {}", if panel.open { "opened" } else { "closed" });
    }
    if input.toggle_help {
        help.toggle();
    }
}

impl HelpOverlay {
    /// Showing again restarts the auto-hide countdown.
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if self.visible {
            self.timer.reset();
        }
    }

    pub fn tick(&mut self, dt: std::time::Duration) {
        if !self.visible {
            return;
        }
        self.timer.tick(dt);
        if self.timer.finished() {
            self.visible = false;
        }
    }
}

pub fn tick_help_overlay(time: Res<Time>, mut help: ResMut<HelpOverlay>) {
    help.tick(time.delta());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn help_hides_itself_after_ten_seconds() {
        let mut help = HelpOverlay::default();
        help.tick(Duration::from_secs(9));
        assert!(help.visible);
        help.tick(Duration::from_secs(1));
        assert!(!help.visible);

        help.toggle();
        assert!(help.visible);
        help.tick(Duration::from_secs(5));
        assert!(help.visible);
    }
}
