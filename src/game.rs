//! Frame-driven game clock
//!
//! One call to [`Game::frame`] per display refresh. The mode decides what the
//! frame does: nothing in the menu, render only while paused, and exactly one
//! tick followed by one render while playing.

use crate::consts::{MAX_FRAME_MS, NOMINAL_FRAME_MS};
use crate::error::ConfigError;
use crate::settings::Settings;
use crate::sim::{
    GameEvent, GameMode, GameState, InputEvent, RenderSnapshot, StatsSnapshot, dispatch, tick,
};
use crate::tuning::Tuning;

/// Whatever presents the game: a canvas, a test recorder, a headless logger
pub trait Frontend {
    fn render(&mut self, snapshot: &RenderSnapshot<'_>);

    /// Called when coins, diamonds, level or upgrade levels changed
    fn stats_changed(&mut self, _stats: &StatsSnapshot) {}
}

/// Game instance: the state plus the frame clock that drives it
pub struct Game {
    pub state: GameState,
    last_time_ms: Option<f64>,
}

impl Game {
    pub fn new(seed: u64) -> Self {
        Self {
            state: GameState::new(seed),
            last_time_ms: None,
        }
    }

    /// Build a game from loaded balance and settings, rejecting bad tuning
    pub fn with_config(seed: u64, tuning: Tuning, settings: Settings) -> Result<Self, ConfigError> {
        if let Err(err) = tuning.validate() {
            log::warn!("Rejected tuning: {}", err);
            return Err(err);
        }
        if tuning == Tuning::default() {
            log::info!("Game configured with default tuning (seed {})", seed);
        } else {
            log::info!("Game configured with custom tuning (seed {})", seed);
        }
        Ok(Self {
            state: GameState::with_config(seed, tuning, settings),
            last_time_ms: None,
        })
    }

    /// Forward one UI input to the simulation
    pub fn handle(&mut self, event: InputEvent, now_ms: f64) {
        dispatch(&mut self.state, event, now_ms);
        // Shots don't change anything the HUD shows
        if event != InputEvent::Shoot {
            self.state.mark_stats_dirty();
        }
    }

    /// Run one display frame at timestamp `time_ms`
    pub fn frame(&mut self, time_ms: f64, frontend: &mut impl Frontend) {
        let dt_ms = match self.last_time_ms {
            Some(last) => {
                let gap = time_ms - last;
                if gap > MAX_FRAME_MS {
                    log::debug!("Frame gap of {:.0}ms clamped to {}ms", gap, MAX_FRAME_MS);
                }
                gap.clamp(0.0, MAX_FRAME_MS)
            }
            None => NOMINAL_FRAME_MS,
        };
        self.last_time_ms = Some(time_ms);

        match self.state.mode {
            GameMode::Menu => {}
            GameMode::Playing => {
                tick(&mut self.state, dt_ms, time_ms);
                frontend.render(&RenderSnapshot::capture(&self.state));
            }
            GameMode::Paused | GameMode::GameOver => {
                frontend.render(&RenderSnapshot::capture(&self.state));
            }
        }

        if self.state.take_stats_dirty() {
            frontend.stats_changed(&StatsSnapshot::capture(&self.state));
        }
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.state.drain_events()
    }
}
