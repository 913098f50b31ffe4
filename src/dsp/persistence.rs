//! Persistence Tracker
//!
//! Temporal confirmation of howling candidates: a bin is confirmed only if
//! it was an intersection candidate in at least 3 of the last 5 frames
//! (fewer while less than 5 frames of history exist). Isolated single-frame
//! spectral spikes never survive this vote.
//!
//! State is a ring of at most 5 per-bin flag rows; the full candidate
//! history matrix of the reference design is never materialized.

use std::collections::VecDeque;

// Confirmation vote: candidate in at least CONFIRM_MIN of the last
// WINDOW_FRAMES frames.
const WINDOW_FRAMES: usize = 5;
const CONFIRM_MIN: u8 = 3;

pub struct PersistenceTracker {
    history: VecDeque<Vec<u8>>,
    n_bins: usize,
}

impl PersistenceTracker {
    pub fn new(n_bins: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(WINDOW_FRAMES),
            n_bins,
        }
    }

    /// Number of frames observed so far, capped at the window length.
    pub fn frames_tracked(&self) -> usize {
        self.history.len()
    }

    /// Record this frame's candidate bins and return the confirmed set,
    /// ascending. `candidates` must hold ascending indices `< n_bins`.
    pub fn observe(&mut self, candidates: &[usize]) -> Vec<usize> {
        let mut row = vec![0u8; self.n_bins];
        for &c in candidates {
            debug_assert!(c < self.n_bins, "candidate bin out of range");
            if c < self.n_bins {
                row[c] = 1;
            }
        }
        if self.history.len() == WINDOW_FRAMES {
            self.history.pop_front();
        }
        self.history.push_back(row);

        let mut confirmed = Vec::new();
        for bin in 0..self.n_bins {
            let votes: u8 = self.history.iter().map(|r| r[bin]).sum();
            if votes >= CONFIRM_MIN {
                confirmed.push(bin);
            }
        }
        confirmed
    }

    /// Forget all history (used when a new run starts on the same tracker).
    pub fn reset(&mut self) {
        self.history.clear();
    }
}
