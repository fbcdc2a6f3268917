use bevy::prelude::*;

use crate::shared::*;

/// Players to choose from and the farms of the highlighted one.
#[derive(Resource, Debug, Clone, Default)]
pub struct SelectScreen {
    pub players: Vec<PlayerRecord>,
    pub index: usize,
    pub farms: Vec<FarmRecord>,
    /// Last problem shown under the list.
    pub status: Option<String>,
}

impl SelectScreen {
    pub fn selected_player(&self) -> Option<&PlayerRecord> {
        self.players.get(self.index)
    }

    /// Re-reads active players, keeping the highlight in range.
    pub fn refresh(&mut self, store: &dyn FarmStore) -> Result<(), StoreError> {
        self.players = store.active_players()?;
        if self.index >= self.players.len() {
            self.index = 0;
        }
        self.load_farms(store)
    }

    /// Moves the highlight by `step` with wraparound and loads that player's farms.
    pub fn cycle(&mut self, store: &dyn FarmStore, step: i32) -> Result<(), StoreError> {
        self.index = cycle_index(self.index, self.players.len(), step);
        self.load_farms(store)
    }

    fn load_farms(&mut self, store: &dyn FarmStore) -> Result<(), StoreError> {
        self.farms = match self.selected_player() {
            Some(player) => store.farms_for_player(player.id)?,
            None => Vec::new(),
        };
        Ok(())
    }

    /// The request Enter produces: the highlighted player's first farm.
    pub fn enter_request(&self) -> Option<EnterFarmRequest> {
        let player = self.selected_player()?;
        let farm = self.farms.first()?;
        Some(EnterFarmRequest {
            player_id: player.id,
            farm_id: farm.id,
        })
    }
}

pub fn refresh_select_screen(store: Res<FarmStoreHandle>, mut screen: ResMut<SelectScreen>) {
    match screen.refresh(store.get()) {
        Ok(()) => {
            info!("[Session] {} active player(s)", screen.players.len());
        }
        Err(e) => {
            warn!("[Session] Reading players failed: {}", e);
            screen.status = Some("Could not read players!".into());
        }
    }
}

pub fn navigate_select_screen(
    input: Res<PlayerInput>,
    store: Res<FarmStoreHandle>,
    mut screen: ResMut<SelectScreen>,
    mut requests: EventWriter<EnterFarmRequest>,
    mut toasts: EventWriter<ToastEvent>,
) {
    let step = if input.select_next {
        1
    } else if input.select_prev {
        -1
    } else {
        0
    };
    if step != 0 {
        if let Err(e) = screen.cycle(store.get(), step) {
            warn!("[Session] Reading farms failed: {}", e);
            screen.status = Some("Could not read farms!".into());
        }
    }

    if !input.confirm {
        return;
    }
    match screen.enter_request() {
        Some(request) => {
            screen.status = None;
            requests.send(request);
        }
        None => {
            let message = match screen.selected_player() {
                Some(player) => format!("{} has no farm yet.", player.name),
                None => "No active players.".to_string(),
            };
            screen.status = Some(message.clone());
            toasts.send(ToastEvent::new(message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;
    use crate::store::MemoryStore;

    fn two_players() -> MemoryStore {
        let mut data = data::starter_store_data();
        let mut second = data.players[0].clone();
        second.id = 2;
        second.name = "Rowan".into();
        data.players.push(second);
        MemoryStore::new(data)
    }

    #[test]
    fn cycling_wraps_and_loads_farms() {
        let store = two_players();
        let mut screen = SelectScreen::default();
        screen.refresh(&store).unwrap();
        assert_eq!(screen.players.len(), 2);
        assert_eq!(screen.farms.len(), 1);

        screen.cycle(&store, 1).unwrap();
        assert_eq!(screen.selected_player().unwrap().name, "Rowan");
        assert!(screen.farms.is_empty());
        assert_eq!(screen.enter_request(), None);

        screen.cycle(&store, 1).unwrap();
        assert_eq!(screen.index, 0);
        assert_eq!(
            screen.enter_request(),
            Some(EnterFarmRequest {
                player_id: data::STARTER_PLAYER,
                farm_id: data::STARTER_FARM,
            })
        );
    }
}
