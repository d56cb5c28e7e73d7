//! Scoring module - points and time bonus for a match
//!
//! | Chain length | Points | Time bonus |
//! |--------------|--------|------------|
//! | 2            | 40     | 0 s        |
//! | 3            | 90     | 0 s        |
//! | 4            | 160    | +2 s       |
//! | 5            | 250    | +4 s       |
//! | 6            | 360    | +6 s       |
//! | 7            | 490    | +8 s       |
//! | 8            | 640    | +10 s      |
//! | 9+           | n²×10  | +12 s      |
//!
//! Balls removed only by a color bomb add a flat bonus each. The time bonus
//! only looks at the drawn chain, never at bomb victims.

use crate::resolver::MatchResolution;

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreResult {
    pub match_score: u32,
    pub bonus_score: u32,
    pub total: u32,
    pub time_bonus_secs: u32,
}

/// Points for a chain: `len² × 10`.
pub fn match_score(len: usize) -> u32 {
    let len = len.min(u16::MAX as usize) as u32;
    len.saturating_mul(len).saturating_mul(10)
}

/// Points for balls cleared by bombs.
pub fn bonus_score(bonus_cleared: usize, points_per_ball: u32) -> u32 {
    (bonus_cleared.min(u32::MAX as usize) as u32).saturating_mul(points_per_ball)
}

/// Seconds added to the clock for a chain of `len`.
pub fn time_bonus_secs(len: usize) -> u32 {
    match len {
        0..=3 => 0,
        4 => 2,
        5 => 4,
        6 => 6,
        7 => 8,
        8 => 10,
        _ => 12,
    }
}

/// Full score for a resolved match.
pub fn calculate_score(resolution: &MatchResolution, points_per_ball: u32) -> ScoreResult {
    let match_score = match_score(resolution.chain_length);
    let bonus_score = bonus_score(resolution.bonus_cleared, points_per_ball);
    ScoreResult {
        match_score,
        bonus_score,
        total: match_score.saturating_add(bonus_score),
        time_bonus_secs: time_bonus_secs(resolution.chain_length),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::resolver::resolve;
    use crate::types::Position;

    #[test]
    fn test_match_score_table() {
        assert_eq!(match_score(2), 40);
        assert_eq!(match_score(3), 90);
        assert_eq!(match_score(4), 160);
        assert_eq!(match_score(10), 1000);
    }

    #[test]
    fn test_time_bonus_table() {
        assert_eq!(time_bonus_secs(2), 0);
        assert_eq!(time_bonus_secs(3), 0);
        assert_eq!(time_bonus_secs(4), 2);
        assert_eq!(time_bonus_secs(5), 4);
        assert_eq!(time_bonus_secs(6), 6);
        assert_eq!(time_bonus_secs(7), 8);
        assert_eq!(time_bonus_secs(8), 10);
        assert_eq!(time_bonus_secs(9), 12);
        assert_eq!(time_bonus_secs(30), 12);
    }

    #[test]
    fn test_bonus_score() {
        assert_eq!(bonus_score(0, 10), 0);
        assert_eq!(bonus_score(2, 10), 20);
        assert_eq!(bonus_score(3, 25), 75);
    }

    #[test]
    fn test_calculate_score_with_bomb() {
        let grid = Grid::parse(&["RrR", "BGR", "RYY"]).unwrap();
        let chain = [Position::new(0, 0), Position::new(0, 1), Position::new(0, 2)];
        let res = resolve(&grid, &chain, 2).unwrap();
        let score = calculate_score(&res, 10);
        assert_eq!(
            score,
            ScoreResult {
                match_score: 90,
                bonus_score: 20,
                total: 110,
                time_bonus_secs: 0,
            }
        );
    }

    #[test]
    fn test_time_bonus_ignores_bomb_victims() {
        // Chain of 2 with a bomb that takes out 4 more reds: still no time bonus.
        let grid = Grid::parse(&["Rr", "RR", "RR"]).unwrap();
        let res = resolve(&grid, &[Position::new(0, 0), Position::new(0, 1)], 2).unwrap();
        assert_eq!(res.bonus_cleared, 4);
        let score = calculate_score(&res, 10);
        assert_eq!(score.time_bonus_secs, 0);
        assert_eq!(score.total, 40 + 40);
    }
}
