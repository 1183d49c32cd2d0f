//! Anti-frustration and bonus event pacing

use super::state::SelectionState;
use rand::Rng;

/// Consecutive wrong answers before an easy event is forced
pub const ERRORS_BEFORE_EASY_EVENT: u32 = 2;

/// Notoriety floor when an easy event is forced
pub const FORCE_EASY_FLOOR: i32 = 70;

/// Notoriety floor for bonus events
pub const BONUS_FLOOR: i32 = 75;

/// Flags consumed by one selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PacingFlags {
    pub force_easy: bool,
    pub force_bonus: bool,
}

impl SelectionState {
    pub fn record_correct_answer(&mut self) {
        self.consecutive_errors = 0;
        self.should_force_easy_event = false;
    }

    pub fn record_incorrect_answer(&mut self) {
        self.consecutive_errors += 1;
        if self.consecutive_errors >= ERRORS_BEFORE_EASY_EVENT {
            if !self.should_force_easy_event {
                tracing::info!(errors = self.consecutive_errors, "forcing an easy event");
            }
            self.should_force_easy_event = true;
        }
    }

    /// Arm the bonus flag when the countdown is reached and re-roll it
    pub fn tick_bonus<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.event_count < self.bonus_event_countdown {
            return false;
        }
        self.should_force_bonus_event = true;
        self.bonus_event_countdown = self.event_count + rng.gen_range(8..=10);
        tracing::info!(next = self.bonus_event_countdown, "bonus event armed");
        true
    }

    /// Take the one-shot pacing flags, clearing them on the state
    pub fn take_pacing_flags(&mut self) -> PacingFlags {
        PacingFlags {
            force_easy: std::mem::take(&mut self.should_force_easy_event),
            force_bonus: std::mem::take(&mut self.should_force_bonus_event),
        }
    }
}

/// Minimum (era-adjusted) notoriety an event needs for this selection
///
/// Level sets the base, a long streak lowers it, a broken streak raises it,
/// and the easy/bonus overrides lift it further.
pub fn notoriety_floor(level: u32, streak: u32, flags: PacingFlags) -> i32 {
    let mut floor: i32 = if level <= 3 {
        40
    } else if level <= 6 {
        30
    } else if level <= 10 {
        20
    } else {
        0
    };

    if streak >= 10 {
        floor = (floor - 10).max(0);
    } else if streak == 0 {
        floor += 5;
    }

    if flags.force_bonus {
        floor = floor.max(BONUS_FLOOR);
    }
    if flags.force_easy {
        floor = floor.max(FORCE_EASY_FLOOR);
    }
    floor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn fresh_state() -> SelectionState {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        SelectionState::new(&mut rng)
    }

    #[test]
    fn test_two_errors_force_easy() {
        let mut state = fresh_state();
        state.record_incorrect_answer();
        assert!(!state.should_force_easy_event);
        state.record_incorrect_answer();
        assert!(state.should_force_easy_event);

        let flags = state.take_pacing_flags();
        assert!(flags.force_easy);
        assert!(!state.should_force_easy_event);
    }

    #[test]
    fn test_correct_answer_resets() {
        let mut state = fresh_state();
        state.record_incorrect_answer();
        state.record_incorrect_answer();
        state.record_correct_answer();
        assert_eq!(state.consecutive_errors, 0);
        assert!(!state.should_force_easy_event);
    }

    #[test]
    fn test_bonus_countdown() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = fresh_state();
        state.event_count = state.bonus_event_countdown - 1;
        assert!(!state.tick_bonus(&mut rng));

        state.event_count += 1;
        assert!(state.tick_bonus(&mut rng));
        assert!(state.should_force_bonus_event);
        let gap = state.bonus_event_countdown - state.event_count;
        assert!((8..=10).contains(&gap));
    }

    #[test]
    fn test_floor_layers() {
        let none = PacingFlags::default();
        assert_eq!(notoriety_floor(2, 3, none), 40);
        assert_eq!(notoriety_floor(2, 0, none), 45);
        assert_eq!(notoriety_floor(2, 12, none), 30);
        assert_eq!(notoriety_floor(12, 12, none), 0);

        let easy = PacingFlags { force_easy: true, force_bonus: false };
        assert!(notoriety_floor(12, 12, easy) >= FORCE_EASY_FLOOR);

        let bonus = PacingFlags { force_easy: false, force_bonus: true };
        assert_eq!(notoriety_floor(9, 4, bonus), BONUS_FLOOR);
    }
}
