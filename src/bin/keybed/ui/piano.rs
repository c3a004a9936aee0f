//! Key bed widget

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use keybed::{
    keyboard::{KeyMap, KeyboardLayout, OCTAVE_SHIFT},
    synth::RingBackend,
    NoteId, PolyphonyEngine,
};

const MAX_WHITE_WIDTH: u16 = 6;

/// Computer key that currently plays `note`, given the shift state.
fn label(keymap: &KeyMap, note: NoteId, shifted: bool) -> String {
    let unshifted = if shifted {
        note.transpose_octaves(-OCTAVE_SHIFT)
    } else {
        Some(note)
    };
    unshifted
        .and_then(|n| keymap.label_for(n))
        .map(|c| c.to_ascii_uppercase().to_string())
        .unwrap_or_default()
}

/// Draw white keys, then black keys over their upper part. Sounding notes
/// are lit.
pub fn render_keybed(
    frame: &mut Frame,
    area: Rect,
    layout: &KeyboardLayout,
    keymap: &KeyMap,
    engine: &PolyphonyEngine<RingBackend>,
    shifted: bool,
) {
    let whites = layout.whites();
    if whites.is_empty() || area.width < whites.len() as u16 {
        return;
    }

    let white_w = (area.width / whites.len() as u16).min(MAX_WHITE_WIDTH);
    let black_w = (white_w * 3 / 5).max(1);
    let black_h = (area.height * 3 / 5).max(1);
    let left = area.x + (area.width - white_w * whites.len() as u16) / 2;

    for (i, &note) in whites.iter().enumerate() {
        let rect = Rect::new(left + i as u16 * white_w, area.y, white_w, area.height);
        let fill = if engine.is_sounding(note) {
            Color::Cyan
        } else {
            Color::White
        };
        let key = Paragraph::new(format!("{}\n{note}", label(keymap, note, shifted)))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Black).bg(fill))
            .block(
                Block::default()
                    .borders(Borders::LEFT | Borders::RIGHT | Borders::BOTTOM)
                    .border_type(BorderType::Plain)
                    .border_style(Style::default().fg(Color::DarkGray).bg(fill)),
            );
        // labels sit at the bottom of the key
        let text_h = 3.min(rect.height);
        let body = Rect::new(rect.x, rect.y, rect.width, rect.height - text_h);
        frame.render_widget(Block::default().style(Style::default().bg(fill)), body);
        frame.render_widget(
            key,
            Rect::new(rect.x, rect.y + rect.height - text_h, rect.width, text_h),
        );
    }

    for black in layout.blacks() {
        let center = left + (black.left_white as u16 + 1) * white_w;
        let x = center.saturating_sub(black_w / 2);
        if x + black_w > area.x + area.width {
            continue;
        }
        let rect = Rect::new(x, area.y, black_w, black_h);
        let fill = if engine.is_sounding(black.note) {
            Color::Cyan
        } else {
            Color::Black
        };
        let key = Paragraph::new(label(keymap, black.note, shifted))
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Gray).bg(fill));
        frame.render_widget(Clear, rect);
        frame.render_widget(key, Rect::new(rect.x, rect.y + rect.height - 1, rect.width, 1));
        frame.render_widget(
            Block::default().style(Style::default().bg(fill)),
            Rect::new(rect.x, rect.y, rect.width, rect.height - 1),
        );
    }
}
