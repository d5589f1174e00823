//! Score and best score
//!
//! `Scoreboard::set_score` is the only way the score changes, and the only
//! place the best score is persisted.

use crate::persistence::BestScoreStore;

pub struct Scoreboard {
    score: u32,
    best: u32,
    store: Box<dyn BestScoreStore>,
}

impl Scoreboard {
    /// Create a scoreboard, reading the persisted best (0 if none)
    pub fn new(store: Box<dyn BestScoreStore>) -> Self {
        let best = store.load();
        log::info!("Best score loaded: {}", best);
        Self {
            score: 0,
            best,
            store,
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best(&self) -> u32 {
        self.best
    }

    /// Store a new score; raise and persist the best if it was beaten
    ///
    /// Returns the new best when this call raised it.
    pub fn set_score(&mut self, value: u32) -> Option<u32> {
        self.score = value;
        if self.score > self.best {
            self.best = self.score;
            self.store.save(self.best);
            return Some(self.best);
        }
        None
    }

    /// Award one point
    pub fn increment(&mut self) -> Option<u32> {
        self.set_score(self.score.saturating_add(1))
    }
}

impl std::fmt::Debug for Scoreboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scoreboard")
            .field("score", &self.score)
            .field("best", &self.best)
            .finish_non_exhaustive()
    }
}
