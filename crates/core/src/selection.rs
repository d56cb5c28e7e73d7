//! Selection state machine - building a chain with the pointer
//!
//! `Idle -> Dragging(chain) -> Idle`. Every operation reports whether it
//! changed anything; invalid input is silently ignored.

use tracing::debug;

use crate::grid::Grid;
use crate::types::Position;

/// Ordered, non-repeating list of selected positions.
pub type Chain = Vec<Position>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging(Chain),
}

#[derive(Debug, Clone, Default)]
pub struct Selection {
    state: SelectionState,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, SelectionState::Dragging(_))
    }

    /// Current chain (empty when idle)
    pub fn chain(&self) -> &[Position] {
        match &self.state {
            SelectionState::Idle => &[],
            SelectionState::Dragging(chain) => chain,
        }
    }

    /// Start a drag on an occupied cell. Only valid while idle.
    pub fn begin(&mut self, grid: &Grid, pos: Position) -> bool {
        if self.is_dragging() || grid.token(pos).is_none() {
            return false;
        }
        self.state = SelectionState::Dragging(vec![pos]);
        true
    }

    /// Feed a pointer-enter.
    ///
    /// - entering the second-to-last cell pops the last one (backtrack)
    /// - entering a cell already in the chain does nothing
    /// - an adjacent cell of the chain's color is appended
    pub fn extend(&mut self, grid: &Grid, pos: Position) -> bool {
        let SelectionState::Dragging(chain) = &mut self.state else {
            return false;
        };

        if chain.len() >= 2 && chain[chain.len() - 2] == pos {
            chain.pop();
            return true;
        }
        if chain.contains(&pos) {
            return false;
        }

        let (Some(&first), Some(&last)) = (chain.first(), chain.last()) else {
            return false;
        };
        let (Some(head), Some(next)) = (grid.token(first), grid.token(pos)) else {
            return false;
        };
        if next.color != head.color || !last.is_adjacent(pos) {
            return false;
        }
        chain.push(pos);
        true
    }

    /// Finish the drag. Returns the chain if it is long enough.
    pub fn commit(&mut self, min_len: usize) -> Option<Chain> {
        match std::mem::take(&mut self.state) {
            SelectionState::Dragging(chain) if chain.len() >= min_len => Some(chain),
            SelectionState::Dragging(chain) => {
                debug!(len = chain.len(), min_len, "chain too short, discarded");
                None
            }
            SelectionState::Idle => None,
        }
    }

    /// Drop the drag without side effects.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.state = SelectionState::Idle;
        was_dragging
    }
}
