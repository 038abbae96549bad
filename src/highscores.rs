//! High score tracking
//!
//! Kept in memory for the lifetime of the process, one entry per player.
//! A round reset never lowers them.

/// Per-player best scores
#[derive(Debug, Clone, Default)]
pub struct HighScores {
    enabled: bool,
    best: Vec<u32>,
}

impl HighScores {
    /// Create an empty table; a disabled table records nothing
    pub fn new(players: usize, enabled: bool) -> Self {
        Self {
            enabled,
            best: vec![0; players],
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Offer a live score. Returns true if it set a new best.
    pub fn record(&mut self, player: usize, score: u32) -> bool {
        if !self.enabled {
            return false;
        }
        match self.best.get_mut(player) {
            Some(best) if score > *best => {
                *best = score;
                true
            }
            _ => false,
        }
    }

    /// Best score per player
    pub fn best(&self) -> &[u32] {
        &self.best
    }

    /// Best score for one player (0 if unknown)
    pub fn top_score(&self, player: usize) -> u32 {
        self.best.get(player).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_is_monotonic() {
        let mut scores = HighScores::new(1, true);
        assert!(scores.record(0, 5));
        assert!(!scores.record(0, 3));
        assert!(!scores.record(0, 5));
        assert!(scores.record(0, 6));
        assert_eq!(scores.best(), &[6]);
    }

    #[test]
    fn test_disabled_records_nothing() {
        let mut scores = HighScores::new(2, false);
        assert!(!scores.record(1, 9));
        assert_eq!(scores.best(), &[0, 0]);
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let mut scores = HighScores::new(1, true);
        assert!(!scores.record(3, 9));
        assert_eq!(scores.top_score(3), 0);
    }
}
