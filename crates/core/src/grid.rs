//! Grid module - the playfield of balls
//!
//! The grid is `rows x cols` cells stored flat in row-major order. Row 0 is the
//! top row. Outside of a cascade every cell holds exactly one token; only the
//! cascade engine builds grids with holes, and it fills them before returning.

use crate::types::{BallColor, Cell, Position, Token};

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: u8,
    cols: u8,
    /// Flat array of cells, row-major order (row * cols + col)
    cells: Vec<Cell>,
}

/// True when `a` and `b` are one orthogonal step apart.
pub fn adjacent(a: Position, b: Position) -> bool {
    a.is_adjacent(b)
}

impl Grid {
    /// Create a grid with every cell empty
    pub fn empty(rows: u8, cols: u8) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows as usize * cols as usize],
        }
    }

    /// Build a grid cell by cell, visiting positions in row-major order.
    pub fn from_fn(rows: u8, cols: u8, mut f: impl FnMut(Position) -> Cell) -> Self {
        let mut cells = Vec::with_capacity(rows as usize * cols as usize);
        for row in 0..rows {
            for col in 0..cols {
                cells.push(f(Position::new(row, col)));
            }
        }
        Self { rows, cols, cells }
    }

    /// Fixture constructor: one slice of colors per row, ids assigned 1.. in
    /// row-major order, no bombs.
    ///
    /// Returns `None` if rows are ragged or empty.
    pub fn from_colors(rows: &[&[BallColor]]) -> Option<Self> {
        let cols = rows.first()?.len();
        if cols == 0 || rows.iter().any(|r| r.len() != cols) {
            return None;
        }
        let mut next_id = 1;
        Some(Self::from_fn(rows.len() as u8, cols as u8, |p| {
            let token = Token::new(next_id, rows[p.row as usize][p.col as usize]);
            next_id += 1;
            Some(token)
        }))
    }

    /// Fixture constructor from letter rows.
    ///
    /// `Y R B W K G` are the six colors (K is black), lowercase marks a color
    /// bomb and `.` an empty cell. Ids are assigned 1.. in row-major order.
    ///
    /// ```
    /// use color_connect_core::Grid;
    /// use color_connect_types::{BallColor, Position};
    ///
    /// let grid = Grid::parse(&["RRb", "YK."]).unwrap();
    /// assert_eq!(grid.rows(), 2);
    /// let t = grid.token(Position::new(0, 2)).unwrap();
    /// assert_eq!(t.color, BallColor::Blue);
    /// assert!(t.is_bomb());
    /// assert!(grid.token(Position::new(1, 2)).is_none());
    /// ```
    pub fn parse(rows: &[&str]) -> Option<Self> {
        let cols = rows.first()?.chars().count();
        if cols == 0 || rows.iter().any(|r| r.chars().count() != cols) {
            return None;
        }
        let mut cells = Vec::with_capacity(rows.len() * cols);
        let mut next_id = 1;
        for row in rows {
            for ch in row.chars() {
                if ch == '.' {
                    cells.push(None);
                    continue;
                }
                let color = color_from_letter(ch.to_ascii_uppercase())?;
                let token = if ch.is_ascii_lowercase() {
                    Token::bomb(next_id, color)
                } else {
                    Token::new(next_id, color)
                };
                next_id += 1;
                cells.push(Some(token));
            }
        }
        Some(Self {
            rows: rows.len() as u8,
            cols: cols as u8,
            cells,
        })
    }

    #[inline(always)]
    fn index(&self, pos: Position) -> Option<usize> {
        if pos.row >= self.rows || pos.col >= self.cols {
            return None;
        }
        Some(pos.row as usize * self.cols as usize + pos.col as usize)
    }

    pub fn rows(&self) -> u8 {
        self.rows
    }

    pub fn cols(&self) -> u8 {
        self.cols
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    /// Get cell at position
    /// Returns None if out of bounds
    pub fn get(&self, pos: Position) -> Option<Cell> {
        self.index(pos).map(|idx| self.cells[idx])
    }

    /// Token at position, if in bounds and occupied
    pub fn token(&self, pos: Position) -> Option<Token> {
        self.get(pos).flatten()
    }

    pub(crate) fn set(&mut self, pos: Position, cell: Cell) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.cells[idx] = cell;
                true
            }
            None => false,
        }
    }

    /// All positions in row-major order
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| Position::new(row, col)))
    }

    /// Occupied cells in row-major order
    pub fn tokens(&self) -> impl Iterator<Item = (Position, Token)> + '_ {
        self.positions()
            .filter_map(move |p| self.token(p).map(|t| (p, t)))
    }

    pub fn count_color(&self, color: BallColor) -> usize {
        self.cells
            .iter()
            .filter(|c| matches!(c, Some(t) if t.color == color))
            .count()
    }

    /// True when no cell is empty
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Highest token id on the board (0 if empty)
    pub fn max_id(&self) -> u32 {
        self.cells
            .iter()
            .flatten()
            .map(|t| t.id)
            .max()
            .unwrap_or(0)
    }

    /// Whether some straight run of `min_len` same-colored balls exists.
    ///
    /// Checks rightward and downward runs from every cell and stops at the
    /// first hit. Any such run is a legal chain, so this doubles as the
    /// "moves remaining" test.
    pub fn has_any_match(&self, min_len: usize) -> bool {
        let min_len = min_len.max(1);
        for pos in self.positions() {
            let Some(start) = self.token(pos) else {
                continue;
            };
            if min_len == 1 {
                return true;
            }
            if self.run_matches(pos, start.color, min_len, 0, 1)
                || self.run_matches(pos, start.color, min_len, 1, 0)
            {
                return true;
            }
        }
        false
    }

    fn run_matches(&self, from: Position, color: BallColor, len: usize, dr: u8, dc: u8) -> bool {
        (1..len).all(|k| {
            let k = k as u16;
            let row = from.row as u16 + dr as u16 * k;
            let col = from.col as u16 + dc as u16 * k;
            if row >= self.rows as u16 || col >= self.cols as u16 {
                return false;
            }
            matches!(
                self.token(Position::new(row as u8, col as u8)),
                Some(t) if t.color == color
            )
        })
    }
}

fn color_from_letter(ch: char) -> Option<BallColor> {
    match ch {
        'Y' => Some(BallColor::Yellow),
        'R' => Some(BallColor::Red),
        'B' => Some(BallColor::Blue),
        'W' => Some(BallColor::White),
        'K' => Some(BallColor::Black),
        'G' => Some(BallColor::Green),
        _ => None,
    }
}
