//! Per-session selection state

use crate::config::EventId;
use crate::timeline::Era;
use ahash::AHashSet;
use rand::Rng;
use smallvec::SmallVec;
use std::collections::VecDeque;

/// Number of recent selection eras remembered
pub const RECENT_ERA_WINDOW: usize = 4;

/// Event counter value at session start (the first two events are dealt by
/// the game shell before the engine is asked for the next one)
pub const INITIAL_EVENT_COUNT: u32 = 2;

/// Ids already shown this session, in insertion order
///
/// Owned by the host and mutated in place by the engine: selected events are
/// appended, and the deepest fallback recycles the oldest half.
#[derive(Debug, Clone, Default)]
pub struct UsedEvents {
    order: VecDeque<EventId>,
    members: AHashSet<EventId>,
}

impl UsedEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an id, returning false if it was already present
    pub fn insert(&mut self, id: impl Into<EventId>) -> bool {
        let id = id.into();
        if self.members.contains(&id) {
            return false;
        }
        self.members.insert(id.clone());
        self.order.push_back(id);
        true
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.members.contains(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Ids from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &EventId> {
        self.order.iter()
    }

    /// Forget the oldest half (rounded up), returning how many were removed
    pub fn recycle_oldest_half(&mut self) -> usize {
        let count = (self.order.len() + 1) / 2;
        for id in self.order.drain(..count) {
            self.members.remove(&id);
        }
        count
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.members.clear();
    }
}

impl<S: Into<EventId>> FromIterator<S> for UsedEvents {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut used = UsedEvents::new();
        used.extend(iter);
        used
    }
}

impl<S: Into<EventId>> Extend<S> for UsedEvents {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for id in iter {
            self.insert(id);
        }
    }
}

/// Mutable state of one game session's selector
#[derive(Debug, Clone)]
pub struct SelectionState {
    /// Antique events returned during the current level
    pub antique_events_count: u32,
    /// Monotonic call counter
    pub event_count: u32,
    /// A temporal jump is due once `event_count` reaches this
    pub forced_jump_event_count: u32,
    /// A bonus event is due once `event_count` reaches this
    pub bonus_event_countdown: u32,
    pub consecutive_errors: u32,
    pub should_force_easy_event: bool,
    pub should_force_bonus_event: bool,
    /// Eras of the most recent selections, oldest first
    pub recent_eras: SmallVec<[Era; RECENT_ERA_WINDOW]>,
    /// Length of the current run of selections in the same era; at 2 or more
    /// the orchestrator steers low levels away from that era
    pub consecutive_era_count: u32,
    /// Time of the last accepted call, for debouncing
    pub last_call_ms: Option<i64>,
}

impl SelectionState {
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            antique_events_count: 0,
            event_count: INITIAL_EVENT_COUNT,
            forced_jump_event_count: rng.gen_range(12..=19),
            bonus_event_countdown: INITIAL_EVENT_COUNT + rng.gen_range(8..=10),
            consecutive_errors: 0,
            should_force_easy_event: false,
            should_force_bonus_event: false,
            recent_eras: SmallVec::new(),
            consecutive_era_count: 0,
            last_call_ms: None,
        }
    }

    /// Whether the scheduled temporal jump is due (or overdue after a failed attempt)
    #[inline]
    pub fn jump_due(&self) -> bool {
        self.event_count >= self.forced_jump_event_count
    }

    /// Schedule the next temporal jump 3 to 5 events from now
    pub fn schedule_next_jump<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.forced_jump_event_count = self.event_count + rng.gen_range(3..=5);
    }

    /// Record the era of a selection
    pub fn push_era(&mut self, era: Era) {
        if self.recent_eras.last() == Some(&era) {
            self.consecutive_era_count += 1;
        } else {
            self.consecutive_era_count = 1;
        }
        if self.recent_eras.len() == RECENT_ERA_WINDOW {
            self.recent_eras.remove(0);
        }
        self.recent_eras.push(era);
    }

    #[inline]
    pub fn last_era(&self) -> Option<Era> {
        self.recent_eras.last().copied()
    }

    /// True when the last `n` selections exist and all satisfy `pred`
    pub fn last_eras_all(&self, n: usize, pred: impl Fn(Era) -> bool) -> bool {
        n > 0
            && self.recent_eras.len() >= n
            && self.recent_eras[self.recent_eras.len() - n..]
                .iter()
                .all(|era| pred(*era))
    }

    /// Start a new level: the antique quota is per level
    pub fn begin_level(&mut self) {
        self.antique_events_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_used_events_insertion_order() {
        let mut used: UsedEvents = ["a", "b", "c"].into_iter().collect();
        assert!(!used.insert("b"));
        assert_eq!(used.len(), 3);
        assert_eq!(used.iter().cloned().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_recycle_oldest_half() {
        let mut used: UsedEvents = ["a", "b", "c", "d", "e"].into_iter().collect();
        assert_eq!(used.recycle_oldest_half(), 3);
        assert!(!used.contains("a"));
        assert!(!used.contains("c"));
        assert!(used.contains("d"));
        assert_eq!(used.len(), 2);

        let mut single: UsedEvents = ["x"].into_iter().collect();
        assert_eq!(single.recycle_oldest_half(), 1);
        assert!(single.is_empty());
    }

    #[test]
    fn test_initial_state() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let state = SelectionState::new(&mut rng);
        assert_eq!(state.event_count, INITIAL_EVENT_COUNT);
        assert!((12..=19).contains(&state.forced_jump_event_count));
        assert!((10..=12).contains(&state.bonus_event_countdown));
        assert!(!state.jump_due());
    }

    #[test]
    fn test_era_ring_buffer() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut state = SelectionState::new(&mut rng);
        state.push_era(Era::Antiquity);
        state.push_era(Era::Antiquity);
        assert_eq!(state.consecutive_era_count, 2);
        state.push_era(Era::MiddleAges);
        assert_eq!(state.consecutive_era_count, 1);
        state.push_era(Era::MiddleAges);
        state.push_era(Era::Twentieth);
        assert_eq!(state.recent_eras.len(), RECENT_ERA_WINDOW);
        assert_eq!(state.recent_eras[0], Era::Antiquity);
        assert!(state.last_eras_all(1, Era::is_modern));
        assert!(!state.last_eras_all(2, Era::is_modern));
        assert!(state.last_eras_all(3, |e| e != Era::Renaissance));
        assert!(!state.last_eras_all(5, |_| true));
    }

    #[test]
    fn test_schedule_next_jump() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = SelectionState::new(&mut rng);
        state.event_count = 20;
        state.schedule_next_jump(&mut rng);
        assert!((23..=25).contains(&state.forced_jump_event_count));
    }
}
