use crate::ui::RenderFrame;
use checkers_core::logic::board::{Piece, Player, Position, BOARD_SIZE};
use std::fmt::Write;

const LAST_COL: u8 = 7;

/// Draws a frame as text. The selected origin is wrapped in parentheses and
/// each destination in asterisks; row 0 is printed first.
#[must_use]
pub fn render_text(frame: &RenderFrame) -> String {
    let mut out = String::from(" ");
    for col in 0..BOARD_SIZE {
        let _ = write!(out, " {col} ");
    }
    out.push('\n');

    for pos in Position::all() {
        if pos.col() == 0 {
            let _ = write!(out, "{}", pos.row());
        }
        let symbol = frame.board.cell_at(pos).piece().map_or('.', Piece::symbol);
        let (open, close) = if frame.origin == Some(pos) {
            ('(', ')')
        } else if frame.is_destination(pos) {
            ('*', '*')
        } else {
            (' ', ' ')
        };
        let _ = write!(out, "{open}{symbol}{close}");
        if pos.col() == LAST_COL {
            out.push('\n');
        }
    }

    if !frame.board_synced {
        out.push_str("(board out of date)\n");
    }
    if let Some(notice) = &frame.notice {
        let _ = writeln!(out, "{notice}");
    }

    let controls = frame.controls();
    for player in [Player::White, Player::Black] {
        let button = controls.button(player);
        let state = if button.disabled { " (disabled)" } else { "" };
        let _ = write!(out, "[{}]{state}", button.label);
        if let Some(took) = controls.took(player) {
            let _ = write!(out, " {took}");
        }
        out.push('\n');
    }
    out
}
