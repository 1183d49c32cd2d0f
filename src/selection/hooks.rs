//! Callbacks into the game shell

use super::engine::SelectedEvent;
use super::fallback::FallbackRung;
use crate::config::EventId;
use crate::timeline::Era;
use serde::Serialize;

/// Analytics record emitted once per successful selection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionTelemetry {
    pub event_id: EventId,
    pub year: Option<i32>,
    pub era: Option<Era>,
    pub notoriety: Option<i32>,
    pub gap_years: f64,
    pub level: u32,
    pub is_temporal_jump: bool,
    pub is_bonus: bool,
    pub is_anti_frustration: bool,
    pub pool_tier: Option<u8>,
    pub fallback_rung: Option<FallbackRung>,
    pub score: Option<f64>,
}

/// Host-side collaborators notified by the engine
///
/// All methods are fire-and-forget; the engine never inspects their outcome.
pub trait SelectionHooks {
    /// Called once with every selected event, jumps included
    fn update_state(&mut self, selected: &SelectedEvent);

    fn set_error(&mut self, message: &str);

    fn set_game_over(&mut self, game_over: bool);

    fn record_selection(&mut self, _telemetry: &SelectionTelemetry) {}
}

/// Hooks that ignore everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHooks;

impl SelectionHooks for NoopHooks {
    fn update_state(&mut self, _selected: &SelectedEvent) {}

    fn set_error(&mut self, _message: &str) {}

    fn set_game_over(&mut self, _game_over: bool) {}
}

/// Hooks that keep everything they are told, for tests and the simulator
#[derive(Debug, Default, Clone)]
pub struct RecordingHooks {
    pub updates: Vec<EventId>,
    pub errors: Vec<String>,
    pub game_over: bool,
    pub telemetry: Vec<SelectionTelemetry>,
}

impl RecordingHooks {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SelectionHooks for RecordingHooks {
    fn update_state(&mut self, selected: &SelectedEvent) {
        self.updates.push(selected.event.id.clone());
    }

    fn set_error(&mut self, message: &str) {
        self.errors.push(message.to_string());
    }

    fn set_game_over(&mut self, game_over: bool) {
        self.game_over = game_over;
    }

    fn record_selection(&mut self, telemetry: &SelectionTelemetry) {
        self.telemetry.push(telemetry.clone());
    }
}
