//! Layout rendering (collection picker, progress bar, key hints)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

use crate::controller::UiState;
use crate::model::{Collection, SessionSnapshot, Source};
use super::utils::truncate_string;

const ACCENT: Color = Color::Rgb(154, 202, 144);
const MAX_CHIP_WIDTH: usize = 24;

pub fn render_picker(
    frame: &mut Frame,
    area: Rect,
    collections: &[Collection],
    ui_state: &UiState,
    active: &Source,
) {
    let mut spans = Vec::with_capacity(collections.len() * 2);
    for (i, collection) in collections.iter().enumerate() {
        let mut style = if collection.source == *active {
            Style::default().fg(Color::Black).bg(ACCENT)
        } else {
            Style::default().fg(ACCENT)
        };
        if i == ui_state.picker_selected {
            style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
        }

        spans.push(Span::styled(
            format!(" {} ", truncate_string(&collection.name, MAX_CHIP_WIDTH)),
            style,
        ));
        spans.push(Span::raw(" "));
    }

    let picker = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Playlists (Tab to pick, Enter to open) "),
    );
    frame.render_widget(picker, area);
}

pub fn render_progress(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let total = snapshot.total_count.unwrap_or(0);
    let ratio = if total > 0 {
        (snapshot.position as f64 / total as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let mut block = Block::default().borders(Borders::ALL).title(" Progress ");
    if snapshot.loading_more {
        block = block.title_bottom(Line::from(" Loading more songs... ").right_aligned());
    }

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio)
        .label(snapshot.progress_label());

    frame.render_widget(gauge, area);
}

pub fn render_hints(frame: &mut Frame, area: Rect) {
    let hints = Paragraph::new(" Drag the card or press ← remove / → keep · q quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(hints, area);
}
