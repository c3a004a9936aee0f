//! Status bar - voice selector, octave shift, polyphony and output level

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use keybed::{synth::RingBackend, PolyphonyEngine};

/// Output level over the scope buffer
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    engine: &PolyphonyEngine<RingBackend>,
    shifted: bool,
    sample_rate: f32,
    stats: &AudioStats,
) {
    let block = Block::default().title(" keybed ").borders(Borders::ALL);

    let active = engine.active_profile().name();
    let mut spans = Vec::new();
    for name in engine.voice_profile_names() {
        let style = if name == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        spans.push(Span::styled(format!(" {name} "), style));
        spans.push(Span::raw(" "));
    }

    spans.extend([
        Span::raw(" "),
        Span::styled(
            if shifted { "Octave +2  " } else { "Octave +0  " },
            Style::default().fg(if shifted { Color::Yellow } else { Color::White }),
        ),
        Span::styled(
            format!(
                "Voices {}/{} (+{} releasing)  ",
                engine.voice_count(),
                engine.config().max_polyphony,
                engine.releasing_count()
            ),
            Style::default().fg(Color::White),
        ),
        Span::styled(
            format!("{:.1}kHz  ", sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", stats.peak, stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}
