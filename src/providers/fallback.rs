// Canned supportive replies used when the language provider fails
//
// The random source is injected so tests can seed it and assert a
// deterministic selection.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;

const REPLIES: &[&str] = &[
    "Thank you for sharing that with me. I'm here, and I'm listening. Would you like to \
     tell me more about what's been on your mind?",
    "That sounds like a lot to carry. Whatever you're feeling right now is okay. What \
     would feel most helpful to talk about?",
    "I hear you. Sometimes just putting things into words is a big step. Take your time, \
     there's no rush here.",
    "I'm glad you reached out. Your feelings matter, and so do you. How has the rest of \
     your day been?",
];

/// Deterministic-seedable pool of fallback replies
pub struct CannedReplies {
    rng: Mutex<StdRng>,
}

impl CannedReplies {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Fixed seed for deterministic selection in tests
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn pick(&self) -> &'static str {
        let mut rng = self.rng.lock().expect("reply rng poisoned");
        let index = rng.gen_range(0..REPLIES.len());
        REPLIES[index]
    }
}

impl Default for CannedReplies {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_selection_is_deterministic() {
        let a = CannedReplies::seeded(7);
        let b = CannedReplies::seeded(7);

        for _ in 0..10 {
            assert_eq!(a.pick(), b.pick());
        }
    }

    #[test]
    fn test_pick_returns_known_reply() {
        let replies = CannedReplies::new();
        assert!(REPLIES.contains(&replies.pick()));
    }
}
