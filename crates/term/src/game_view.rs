//! GameView: maps a `SessionSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::SessionSnapshot;
use crate::fb::{CellStyle, FrameBuffer, Rgb};
use crate::types::{BallColor, BoardLayout, GameOverReason, Position, SessionPhase, Token};

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

/// One leaderboard row as shown on the panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub name: String,
    pub score: u32,
}

/// Side panel data that does not come from the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelInfo {
    /// Provisional leaderboard rank of the running score.
    pub rank: Option<usize>,
    pub top: Vec<ScoreLine>,
    /// Status line (save result, leaderboard errors).
    pub message: Option<String>,
}

const PLAY_BG: Rgb = Rgb::new(30, 30, 40);
const PANEL_BG: Rgb = Rgb::new(0, 0, 0);
const CHAIN_BG: Rgb = Rgb::new(70, 70, 95);

/// A lightweight terminal renderer for the board.
pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
    /// Board cell height in terminal rows.
    cell_h: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // 2x1 helps compensate for typical terminal glyph aspect ratio.
        Self {
            cell_w: 2,
            cell_h: 1,
        }
    }
}

impl GameView {
    pub fn new(cell_w: u16, cell_h: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
            cell_h: cell_h.max(1),
        }
    }

    /// Where a `rows x cols` board lands inside `viewport`.
    ///
    /// The board (plus its one-cell border) is centered; the returned origin is
    /// the first cell inside the border.
    pub fn layout(&self, rows: u8, cols: u8, viewport: Viewport) -> BoardLayout {
        let frame_w = cols as u16 * self.cell_w + 2;
        let frame_h = rows as u16 * self.cell_h + 2;
        let start_x = viewport.width.saturating_sub(frame_w + PANEL_W) / 2;
        let start_y = viewport.height.saturating_sub(frame_h) / 2;
        BoardLayout {
            origin_x: start_x + 1,
            origin_y: start_y + 1,
            cell_w: self.cell_w,
            cell_h: self.cell_h,
            rows,
            cols,
        }
    }

    /// Render into an existing framebuffer and return the board layout used.
    ///
    /// Callers can reuse a framebuffer across frames and only resize when the
    /// terminal size changes.
    pub fn render_into(
        &self,
        snap: &SessionSnapshot,
        panel: &PanelInfo,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) -> BoardLayout {
        fb.resize(viewport.width, viewport.height);
        fb.clear_with(CellStyle::default());

        let rows = snap.grid.rows();
        let cols = snap.grid.cols();
        let layout = self.layout(rows, cols, viewport);
        let start_x = layout.origin_x - 1;
        let start_y = layout.origin_y - 1;
        let frame_w = cols as u16 * self.cell_w + 2;
        let frame_h = rows as u16 * self.cell_h + 2;

        let bg = CellStyle::new(Rgb::new(80, 80, 90), PLAY_BG);
        let border = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);

        fb.fill_rect(
            layout.origin_x,
            layout.origin_y,
            cols as u16 * self.cell_w,
            rows as u16 * self.cell_h,
            bg,
        );
        fb.draw_frame(start_x, start_y, frame_w, frame_h, border);

        for row in 0..rows {
            for col in 0..cols {
                let pos = Position::new(row, col);
                match snap.token(pos) {
                    Some(token) => self.draw_ball(
                        fb,
                        &layout,
                        pos,
                        token,
                        snap.in_chain(pos),
                        snap.is_clearing(pos),
                    ),
                    None => self.draw_empty_cell(fb, &layout, pos),
                }
            }
        }

        self.draw_side_panel(fb, snap, panel, viewport, start_x, start_y, frame_w);

        match snap.phase {
            SessionPhase::NotStarted => {
                self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "Press Enter", 0);
            }
            SessionPhase::GameOver => {
                let reason = snap.game_over_reason.unwrap_or(GameOverReason::TimesUp);
                self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, reason.message(), 0);
                self.draw_overlay_text(fb, start_x, start_y, frame_w, frame_h, "r: again", 1);
            }
            SessionPhase::Active => {}
        }

        layout
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &SessionSnapshot, panel: &PanelInfo, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, panel, viewport, &mut fb);
        fb
    }

    fn cell_origin(&self, layout: &BoardLayout, pos: Position) -> (u16, u16) {
        (
            layout.origin_x + pos.col as u16 * self.cell_w,
            layout.origin_y + pos.row as u16 * self.cell_h,
        )
    }

    fn draw_empty_cell(&self, fb: &mut FrameBuffer, layout: &BoardLayout, pos: Position) {
        let style = CellStyle::new(Rgb::new(90, 90, 100), PLAY_BG).dim();
        let (px, py) = self.cell_origin(layout, pos);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, style);
        fb.put_char(px, py, '·', style);
    }

    fn draw_ball(
        &self,
        fb: &mut FrameBuffer,
        layout: &BoardLayout,
        pos: Position,
        token: Token,
        in_chain: bool,
        clearing: bool,
    ) {
        let mut style = CellStyle::new(ball_rgb(token.color), PLAY_BG);
        let mut glyph = if token.is_bomb() { '◉' } else { '●' };
        if in_chain {
            style = style.on(CHAIN_BG).bold();
        }
        if clearing {
            style.dim = true;
            glyph = '○';
        }
        let (px, py) = self.cell_origin(layout, pos);
        fb.fill_rect(px, py, self.cell_w, self.cell_h, style);
        fb.put_char(px, py, glyph, style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &SessionSnapshot,
        panel: &PanelInfo,
        viewport: Viewport,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
    ) {
        let panel_x = start_x.saturating_add(frame_w).saturating_add(2);
        if panel_x >= viewport.width {
            return;
        }
        let panel_w = viewport.width - panel_x;
        if panel_w < 12 {
            return;
        }

        let label = CellStyle::new(Rgb::new(220, 220, 220), PANEL_BG).bold();
        let value = CellStyle::new(Rgb::new(200, 200, 200), PANEL_BG);
        let dim = value.dim();

        let mut y = start_y;
        fb.put_str(panel_x, y, "SCORE", label);
        y = y.saturating_add(1);
        fb.put_u32(panel_x, y, snap.score, value);
        y = y.saturating_add(2);

        fb.put_str(panel_x, y, "TIME", label);
        y = y.saturating_add(1);
        let (m, s) = snap.clock();
        let time_style = if snap.time_remaining <= 10 && snap.phase == SessionPhase::Active {
            CellStyle::new(Rgb::new(230, 90, 90), PANEL_BG).bold()
        } else {
            value
        };
        fb.put_clock(panel_x, y, m, s, time_style);
        y = y.saturating_add(2);

        if let Some(rank) = panel.rank {
            fb.put_str(panel_x, y, "RANK", label);
            y = y.saturating_add(1);
            fb.put_char(panel_x, y, '#', value);
            fb.put_u32(panel_x + 1, y, rank as u32, value);
            y = y.saturating_add(2);
        }

        fb.put_str(panel_x, y, "TOP", label);
        y = y.saturating_add(1);
        if panel.top.is_empty() {
            fb.put_str(panel_x, y, "-", dim);
            y = y.saturating_add(1);
        }
        for (i, line) in panel.top.iter().enumerate() {
            if y >= viewport.height {
                break;
            }
            let x = fb.put_u32(panel_x, y, i as u32 + 1, dim);
            let x = fb.put_str(x, y, ". ", dim);
            let x = fb.put_str(x, y, &line.name, value);
            let x = fb.put_str(x, y, " ", value);
            fb.put_u32(x, y, line.score, value);
            y = y.saturating_add(1);
        }

        if let Some(msg) = &panel.message {
            y = y.saturating_add(1);
            fb.put_str(panel_x, y, msg, dim);
        }
    }

    fn draw_overlay_text(
        &self,
        fb: &mut FrameBuffer,
        start_x: u16,
        start_y: u16,
        frame_w: u16,
        frame_h: u16,
        text: &str,
        line: u16,
    ) {
        let mid_y = start_y.saturating_add(frame_h / 2).saturating_add(line);
        let style = CellStyle::new(Rgb::new(255, 255, 255), PANEL_BG).bold();
        fb.put_centered(start_x, frame_w, mid_y, text, style);
    }
}

/// Width reserved right of the board for the side panel when centering.
const PANEL_W: u16 = 24;

fn ball_rgb(color: BallColor) -> Rgb {
    match color {
        BallColor::Yellow => Rgb::new(240, 220, 80),
        BallColor::Red => Rgb::new(220, 70, 70),
        BallColor::Blue => Rgb::new(80, 120, 230),
        BallColor::White => Rgb::new(240, 240, 240),
        BallColor::Black => Rgb::new(120, 110, 140),
        BallColor::Green => Rgb::new(100, 210, 120),
    }
}
