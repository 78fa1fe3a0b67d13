//! The shuffled problem deck a room draws from.

use std::sync::Arc;

use rand::seq::SliceRandom;

use crate::Problem;

/// A shuffled queue over the full catalogue.
///
/// `draw` pops one problem; when the queue runs dry a fresh copy of the
/// whole catalogue is reshuffled in, so a long match cycles through every
/// problem before repeating any. `draw` returns `None` only when the
/// catalogue itself is empty.
#[derive(Debug)]
pub struct Deck {
    source: Arc<[Problem]>,
    queue: Vec<Problem>,
}

impl Deck {
    /// Creates a deck over the given catalogue, pre-shuffled.
    pub fn new(source: Arc<[Problem]>) -> Self {
        let mut deck = Self {
            source,
            queue: Vec::new(),
        };
        deck.refill();
        deck
    }

    /// Draws the next problem, reshuffling a fresh copy of the catalogue
    /// when the queue empties.
    pub fn draw(&mut self) -> Option<Problem> {
        if self.queue.is_empty() {
            self.refill();
        }
        self.queue.pop()
    }

    /// Number of problems left before the next reshuffle.
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    fn refill(&mut self) {
        self.queue = self.source.to_vec();
        self.queue.shuffle(&mut rand::rng());
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn problem(n: usize) -> Problem {
        Problem {
            description: format!("problem {n}"),
            starter_code: String::new(),
            solution: n.to_string(),
        }
    }

    fn catalogue(n: usize) -> Arc<[Problem]> {
        (0..n).map(problem).collect::<Vec<_>>().into()
    }

    #[test]
    fn test_draw_empty_catalogue_returns_none() {
        let mut deck = Deck::new(catalogue(0));
        assert_eq!(deck.draw(), None);
        assert_eq!(deck.draw(), None);
    }

    #[test]
    fn test_draw_cycles_whole_catalogue_before_repeating() {
        let mut deck = Deck::new(catalogue(4));

        let mut seen: Vec<String> =
            (0..4).filter_map(|_| deck.draw()).map(|p| p.solution).collect();
        seen.sort();

        assert_eq!(seen, vec!["0", "1", "2", "3"]);
    }

    #[test]
    fn test_draw_refills_after_exhaustion() {
        let mut deck = Deck::new(catalogue(2));

        for _ in 0..2 {
            assert!(deck.draw().is_some());
        }
        assert_eq!(deck.remaining(), 0);

        // Third draw triggers the reshuffle of a fresh copy.
        assert!(deck.draw().is_some());
        assert_eq!(deck.remaining(), 1);
    }

    #[test]
    fn test_single_problem_catalogue_repeats_forever() {
        let mut deck = Deck::new(catalogue(1));
        for _ in 0..5 {
            assert_eq!(deck.draw().map(|p| p.solution), Some("0".into()));
        }
    }
}
