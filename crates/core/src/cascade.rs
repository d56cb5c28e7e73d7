//! Cascade engine - remove, drop, refill
//!
//! Builds a new grid: cleared cells are emptied, every column is compacted
//! toward the bottom keeping ball order and ids, and the holes left at the
//! top are filled with fresh balls.

use crate::generator::TokenFactory;
use crate::grid::Grid;
use crate::types::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// Nothing to clear; the grid is untouched.
    Unchanged,
    Applied {
        grid: Grid,
        /// Balls actually removed.
        removed: usize,
        /// Fresh balls spawned (equals `removed`).
        spawned: usize,
        /// Whether the new grid still has a legal chain.
        has_moves: bool,
    },
}

/// Run one cascade over `grid`.
pub fn cascade(
    grid: &Grid,
    clear: &[Position],
    factory: &mut TokenFactory,
    min_len: usize,
) -> CascadeOutcome {
    if clear.is_empty() {
        return CascadeOutcome::Unchanged;
    }

    let mut next = grid.clone();
    let mut removed = 0;
    for &pos in clear {
        if next.token(pos).is_some() {
            next.set(pos, None);
            removed += 1;
        }
    }

    // Gravity, column by column from the bottom up.
    let rows = next.rows();
    for col in 0..next.cols() {
        let mut write = rows;
        for read in (0..rows).rev() {
            let from = Position::new(read, col);
            if let Some(token) = next.token(from) {
                write -= 1;
                if write != read {
                    next.set(Position::new(write, col), Some(token));
                    next.set(from, None);
                }
            }
        }
    }

    let mut spawned = 0;
    for row in 0..rows {
        for col in 0..next.cols() {
            let pos = Position::new(row, col);
            if next.get(pos) == Some(None) {
                next.set(pos, Some(factory.spawn()));
                spawned += 1;
            }
        }
    }

    let has_moves = next.has_any_match(min_len);
    CascadeOutcome::Applied {
        grid: next,
        removed,
        spawned,
        has_moves,
    }
}
