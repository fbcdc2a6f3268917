//! Calendar domain: the simulated clock and the day cycle.
//!
//! Responsible for:
//! - Advancing `SimClock` by real delta time while the simulation runs
//! - Driving the sleep fade (darken, day change at full black, lighten, wake)
//! - Starting a new day: the rain roll, the day counter, the sleep hours
//!   and a fresh plot/inventory view
//!
//! A day only ends when the player sleeps. There is no clock-driven rollover.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{DayCycleConfig, GameConfig};
use crate::farming::soil;
use crate::shared::*;

pub struct CalendarPlugin;

impl Plugin for CalendarPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            advance_clock
                .run_if(in_state(GameState::Playing))
                .run_if(simulation_running),
        )
        // The fade keeps running with the panel open so a sleep never stalls.
        .add_systems(
            Update,
            (tick_sleep_fade, process_day_end)
                .chain()
                .run_if(in_state(GameState::Playing)),
        )
        .add_systems(OnExit(GameState::Playing), reset_sleep_fade);
    }
}

// ─── Clock ────────────────────────────────────────────────────────────────────

/// Simulated hours gained for `delta_secs` of real time.
pub fn simulated_hours(delta_secs: f32, hours_per_second: f64) -> SimHours {
    (delta_secs as f64 * hours_per_second).max(0.0)
}

pub fn advance_clock(time: Res<Time>, config: Res<GameConfig>, mut clock: ResMut<SimClock>) {
    clock.advance(simulated_hours(
        time.delta_secs(),
        config.farming.hours_per_second,
    ));
}

// ─── Sleep fade ───────────────────────────────────────────────────────────────

/// What a fade step crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeStep {
    Idle,
    Running,
    /// Full black reached: the day changes now.
    Black,
    /// Fully lit again: the player wakes.
    Finished,
}

/// Moves the fade by `step` (fraction of a full fade).
pub fn advance_fade(fade: &mut SleepFade, step: f32) -> FadeStep {
    if !fade.active {
        return FadeStep::Idle;
    }
    if fade.darkening {
        fade.level = (fade.level + step).min(1.0);
        if fade.level >= 1.0 {
            fade.darkening = false;
            return FadeStep::Black;
        }
    } else {
        fade.level = (fade.level - step).max(0.0);
        if fade.level <= 0.0 {
            fade.active = false;
            return FadeStep::Finished;
        }
    }
    FadeStep::Running
}

pub fn tick_sleep_fade(
    time: Res<Time>,
    config: Res<GameConfig>,
    mut fade: ResMut<SleepFade>,
    mut day_end: EventWriter<DayEndEvent>,
    mut players: Query<&mut PlayerControl, With<Player>>,
) {
    if !fade.active {
        return;
    }
    let step = config.day_cycle.fade_speed * time.delta_secs();
    match advance_fade(&mut fade, step) {
        FadeStep::Black => {
            day_end.send(DayEndEvent);
        }
        FadeStep::Finished => {
            for mut control in &mut players {
                control.asleep = false;
            }
            info!("[DayCycle] Player woke up");
        }
        FadeStep::Idle | FadeStep::Running => {}
    }
}

fn reset_sleep_fade(mut fade: ResMut<SleepFade>) {
    *fade = SleepFade::default();
}

// ─── Day change ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayOutcome {
    pub day: u32,
    pub rained: bool,
    /// Plots whose water level the rain raised.
    pub watered: usize,
}

impl DayOutcome {
    pub fn message(&self) -> String {
        if self.rained {
            format!("Day {} begins! It rained overnight.", self.day)
        } else {
            format!("Day {} begins!", self.day)
        }
    }
}

/// Ends the current day: rolls rain (each plot gets `rain_water`, capped),
/// bumps the day counter, fast-forwards the clock by the hours slept and
/// reloads plots and inventory from the store.
///
/// Rain writes are per plot; one failing plot does not stop the others.
/// A failed reload is reported after the day has already advanced.
pub fn start_new_day(
    store: &dyn FarmStore,
    session: &mut FarmSession,
    counter: &mut DayCounter,
    clock: &mut SimClock,
    rng: &mut impl Rng,
    config: &DayCycleConfig,
) -> Result<DayOutcome, FarmError> {
    let rained = rng.gen_bool(config.rain_chance.clamp(0.0, 1.0));
    let watered = if rained {
        soil::rain_on_all(store, session, config.rain_water)
    } else {
        0
    };

    counter.day += 1;
    clock.advance(config.sleep_hours);

    session
        .reload_plots(store)
        .and_then(|()| session.reload_inventory(store))
        .map_err(|e| FarmError::persistence("Could not reload the farm!", e))?;

    Ok(DayOutcome {
        day: counter.day,
        rained,
        watered,
    })
}

pub fn process_day_end(
    mut events: EventReader<DayEndEvent>,
    store: Res<FarmStoreHandle>,
    mut session: ResMut<FarmSession>,
    mut counter: ResMut<DayCounter>,
    mut clock: ResMut<SimClock>,
    mut rng: ResMut<SimRng>,
    config: Res<GameConfig>,
    mut started: EventWriter<DayStartedEvent>,
    mut toasts: EventWriter<ToastEvent>,
) {
    for _ in events.read() {
        match start_new_day(
            store.get(),
            &mut session,
            &mut counter,
            &mut clock,
            &mut rng.0,
            &config.day_cycle,
        ) {
            Ok(outcome) => {
                info!(
                    "[DayCycle] Day {} started (rain: {}, {} plot(s) watered)",
                    outcome.day, outcome.rained, outcome.watered
                );
                started.send(DayStartedEvent {
                    day: outcome.day,
                    rained: outcome.rained,
                });
                toasts.send(ToastEvent::new(outcome.message()));
            }
            Err(e) => {
                warn!("[DayCycle] Day {} started with errors: {}", counter.day, e);
                toasts.send(ToastEvent::new(e.user_message()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data;
    use crate::store::{MemoryStore, StoreOp};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn setup() -> (MemoryStore, FarmSession) {
        let store = MemoryStore::new(data::starter_store_data());
        let session = FarmSession::load(&store, data::STARTER_PLAYER, data::STARTER_FARM).unwrap();
        (store, session)
    }

    fn config(rain_chance: f64) -> DayCycleConfig {
        DayCycleConfig {
            rain_chance,
            ..DayCycleConfig::default()
        }
    }

    #[test]
    fn forced_rain_waters_every_plot_and_advances_the_day() {
        let (store, mut session) = setup();
        let wet = session.plots[0].id;
        store.set_plot_levels(wet, Some(90), None).unwrap();
        session.reload_plots(&store).unwrap();

        let mut counter = DayCounter::default();
        let mut clock = SimClock::at(3.0);
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = start_new_day(
            &store,
            &mut session,
            &mut counter,
            &mut clock,
            &mut rng,
            &config(1.0),
        )
        .unwrap();

        assert!(outcome.rained);
        assert_eq!(outcome.day, 2);
        assert_eq!(counter.day, 2);
        assert_eq!(clock.now(), 11.0);
        assert_eq!(session.plot(wet).unwrap().water_level, 100);
        for plot in store.plots(session.farm.id).unwrap() {
            let expected = if plot.id == wet { 100 } else { 25 };
            assert_eq!(plot.water_level, expected);
        }
        assert_eq!(outcome.message(), "Day 2 begins! It rained overnight.");
    }

    #[test]
    fn dry_night_leaves_levels_alone() {
        let (store, mut session) = setup();
        let mut counter = DayCounter::default();
        let mut clock = SimClock::default();
        let mut rng = StdRng::seed_from_u64(7);
        let outcome = start_new_day(
            &store,
            &mut session,
            &mut counter,
            &mut clock,
            &mut rng,
            &config(0.0),
        )
        .unwrap();
        assert!(!outcome.rained);
        assert_eq!(outcome.watered, 0);
        assert!(session.plots.iter().all(|p| p.water_level == 0));
        assert_eq!(outcome.message(), "Day 2 begins!");
    }

    #[test]
    fn failing_rain_writes_still_start_the_day() {
        let (store, mut session) = setup();
        store.fail_on(StoreOp::SetLevels);
        let mut counter = DayCounter::default();
        let mut clock = SimClock::default();
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = start_new_day(
            &store,
            &mut session,
            &mut counter,
            &mut clock,
            &mut rng,
            &config(1.0),
        )
        .unwrap();
        assert_eq!(outcome.watered, 0);
        assert_eq!(counter.day, 2);
        assert!(session.plots.iter().all(|p| p.water_level == 0));
    }

    #[test]
    fn fade_darkens_then_lightens_once() {
        let mut fade = SleepFade {
            active: true,
            darkening: true,
            level: 0.0,
        };
        let mut steps = Vec::new();
        for _ in 0..6 {
            steps.push(advance_fade(&mut fade, 0.4));
        }
        assert_eq!(
            steps,
            vec![
                FadeStep::Running,
                FadeStep::Running,
                FadeStep::Black,
                FadeStep::Running,
                FadeStep::Running,
                FadeStep::Finished,
            ]
        );
        assert!(!fade.active);
        assert_eq!(advance_fade(&mut fade, 0.4), FadeStep::Idle);
    }

    #[test]
    fn clock_scales_real_time() {
        assert_eq!(simulated_hours(4.0, 0.5), 2.0);
        assert_eq!(simulated_hours(-1.0, 1.0), 0.0);
    }
}
