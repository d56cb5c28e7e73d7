//! Match resolver - what a committed chain clears
//!
//! Pure function of the grid and the chain: validates the chain, then expands
//! it with the color bomb effect. Nothing is removed here; the cascade engine
//! does that once the dissolve window is over.

use std::fmt;

use arrayvec::ArrayVec;

use crate::grid::Grid;
use crate::types::{BallColor, Position};

/// Everything the session needs to score and clear a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResolution {
    /// The chain as drawn.
    pub chain: Vec<Position>,
    /// Chain plus bomb-triggered positions, row-major, no duplicates.
    pub cleared: Vec<Position>,
    pub chain_length: usize,
    /// Balls removed only because of a bomb.
    pub bonus_cleared: usize,
    /// Colors whose bomb was part of the chain.
    pub bomb_colors: ArrayVec<BallColor, 6>,
}

impl MatchResolution {
    pub fn is_cleared(&self, pos: Position) -> bool {
        self.cleared.binary_search(&pos).is_ok()
    }
}

/// Why a chain cannot be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    TooShort { len: usize, min: usize },
    OutOfBounds(Position),
    EmptyCell(Position),
    ColorMismatch(Position),
    NotAdjacent(Position),
    Duplicate(Position),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::TooShort { len, min } => {
                write!(f, "chain of {len} is shorter than the minimum of {min}")
            }
            ChainError::OutOfBounds(p) => write!(f, "({}, {}) is off the board", p.row, p.col),
            ChainError::EmptyCell(p) => write!(f, "({}, {}) is empty", p.row, p.col),
            ChainError::ColorMismatch(p) => {
                write!(f, "({}, {}) does not match the chain color", p.row, p.col)
            }
            ChainError::NotAdjacent(p) => {
                write!(f, "({}, {}) is not next to the previous cell", p.row, p.col)
            }
            ChainError::Duplicate(p) => write!(f, "({}, {}) appears twice", p.row, p.col),
        }
    }
}

impl std::error::Error for ChainError {}

/// Validate `chain` against `grid` and compute what it clears.
pub fn resolve(grid: &Grid, chain: &[Position], min_len: usize) -> Result<MatchResolution, ChainError> {
    if chain.len() < min_len.max(1) {
        return Err(ChainError::TooShort {
            len: chain.len(),
            min: min_len.max(1),
        });
    }

    let cols = grid.cols() as usize;
    let index = |p: Position| p.row as usize * cols + p.col as usize;
    let mut in_chain = vec![false; grid.rows() as usize * cols];

    let mut color = None;
    let mut bomb_colors: ArrayVec<BallColor, 6> = ArrayVec::new();
    let mut prev: Option<Position> = None;

    for &pos in chain {
        if !grid.contains(pos) {
            return Err(ChainError::OutOfBounds(pos));
        }
        let token = grid.token(pos).ok_or(ChainError::EmptyCell(pos))?;
        let chain_color = *color.get_or_insert(token.color);
        if token.color != chain_color {
            return Err(ChainError::ColorMismatch(pos));
        }
        if in_chain[index(pos)] {
            return Err(ChainError::Duplicate(pos));
        }
        if let Some(prev) = prev {
            if !prev.is_adjacent(pos) {
                return Err(ChainError::NotAdjacent(pos));
            }
        }
        in_chain[index(pos)] = true;
        if token.is_bomb() && !bomb_colors.contains(&token.color) {
            bomb_colors.push(token.color);
        }
        prev = Some(pos);
    }

    let mut cleared = Vec::with_capacity(chain.len());
    let mut bonus_cleared = 0;
    for (pos, token) in grid.tokens() {
        if in_chain[index(pos)] {
            cleared.push(pos);
        } else if bomb_colors.contains(&token.color) {
            cleared.push(pos);
            bonus_cleared += 1;
        }
    }

    Ok(MatchResolution {
        chain: chain.to_vec(),
        cleared,
        chain_length: chain.len(),
        bonus_cleared,
        bomb_colors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(row: u8, col: u8) -> Position {
        Position::new(row, col)
    }

    #[test]
    fn test_plain_chain_clears_only_itself() {
        let grid = Grid::parse(&["RRG", "BRG", "RYY"]).unwrap();
        let res = resolve(&grid, &[p(0, 0), p(0, 1), p(1, 1)], 2).unwrap();
        assert_eq!(res.chain_length, 3);
        assert_eq!(res.bonus_cleared, 0);
        assert!(res.bomb_colors.is_empty());
        assert_eq!(res.cleared, vec![p(0, 0), p(0, 1), p(1, 1)]);
        assert!(!res.is_cleared(p(2, 0)));
    }

    #[test]
    fn test_bomb_expands_to_all_of_its_color() {
        // Chain of three reds, one of them a bomb; five reds on the board.
        let grid = Grid::parse(&["RrR", "BGR", "RYY"]).unwrap();
        let res = resolve(&grid, &[p(0, 0), p(0, 1), p(0, 2)], 2).unwrap();
        assert_eq!(res.chain_length, 3);
        assert_eq!(res.bonus_cleared, 2);
        assert_eq!(res.bomb_colors.as_slice(), &[BallColor::Red]);
        assert_eq!(res.cleared, vec![p(0, 0), p(0, 1), p(0, 2), p(1, 2), p(2, 0)]);
    }

    #[test]
    fn test_bomb_outside_chain_does_nothing() {
        let grid = Grid::parse(&["RRG", "rGG"]).unwrap();
        let res = resolve(&grid, &[p(0, 0), p(0, 1)], 2).unwrap();
        assert_eq!(res.bonus_cleared, 0);
        assert_eq!(res.cleared.len(), 2);
    }

    #[test]
    fn test_rejections() {
        let grid = Grid::parse(&["RRG", "R.G"]).unwrap();
        assert_eq!(
            resolve(&grid, &[p(0, 0)], 2),
            Err(ChainError::TooShort { len: 1, min: 2 })
        );
        assert_eq!(
            resolve(&grid, &[p(0, 0), p(5, 0)], 2),
            Err(ChainError::OutOfBounds(p(5, 0)))
        );
        assert_eq!(
            resolve(&grid, &[p(0, 1), p(1, 1)], 2),
            Err(ChainError::EmptyCell(p(1, 1)))
        );
        assert_eq!(
            resolve(&grid, &[p(0, 1), p(0, 2)], 2),
            Err(ChainError::ColorMismatch(p(0, 2)))
        );
        assert_eq!(
            resolve(&grid, &[p(0, 1), p(1, 0)], 2),
            Err(ChainError::NotAdjacent(p(1, 0)))
        );
        assert_eq!(
            resolve(&grid, &[p(0, 0), p(0, 1), p(0, 0)], 2),
            Err(ChainError::Duplicate(p(0, 0)))
        );
    }

    #[test]
    fn test_error_display() {
        let msg = ChainError::NotAdjacent(p(1, 2)).to_string();
        assert!(msg.contains("(1, 2)"));
    }
}
