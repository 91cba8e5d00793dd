//! The swipeable track card

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{CardTransform, Item, ReviewStatus, SessionSnapshot, SwipeDirection};
use super::utils::{blend, centered_rect, offset_rect, truncate_string};

const CARD_WIDTH: u16 = 44;
const CARD_HEIGHT: u16 = 14;
const CARD_BG: (u8, u8, u8) = (246, 245, 224);
const KEEP_TINT: (u8, u8, u8) = (29, 185, 84);
const REMOVE_TINT: (u8, u8, u8) = (255, 68, 68);
const TEXT: Color = Color::Rgb(38, 111, 76);

pub fn render_card_area(
    frame: &mut Frame,
    area: Rect,
    snapshot: &SessionSnapshot,
    transform: &CardTransform,
) {
    match &snapshot.status {
        ReviewStatus::Loading => render_message(frame, area, "Loading playlist songs..."),
        ReviewStatus::Idle if snapshot.loading_more => {
            render_message(frame, area, "Loading more songs...")
        }
        ReviewStatus::Idle => render_message(
            frame,
            area,
            "Could not load more songs. Open the playlist again to retry.",
        ),
        ReviewStatus::Exhausted(reason) => render_message(frame, area, reason.message()),
        ReviewStatus::Reviewing(item) => render_card(frame, area, item, transform),
    }
}

fn render_message(frame: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(TEXT));
    let line_area = centered_rect(area, area.width, 1);
    frame.render_widget(paragraph, line_area);
}

fn render_card(frame: &mut Frame, area: Rect, item: &Item, transform: &CardTransform) {
    let home = centered_rect(area, CARD_WIDTH, CARD_HEIGHT);
    let card_area = offset_rect(home, transform.offset_x, transform.offset_y, area);
    if card_area.width == 0 || card_area.height == 0 {
        return;
    }

    let feedback = transform.feedback;
    let background = match feedback.direction {
        SwipeDirection::Right => blend(CARD_BG, KEEP_TINT, feedback.intensity * 0.8),
        SwipeDirection::Left => blend(CARD_BG, REMOVE_TINT, feedback.intensity * 0.8),
        SwipeDirection::None => Color::Rgb(CARD_BG.0, CARD_BG.1, CARD_BG.2),
    };

    let text_width = (CARD_WIDTH as usize).saturating_sub(4);
    let mut lines = vec![
        Line::from(""),
        match &item.album_image_url {
            Some(_) => Line::from(Span::styled("♪ album art", Style::default().fg(Color::DarkGray))),
            None => Line::from(Span::styled("No Image", Style::default().fg(Color::DarkGray))),
        },
        Line::from(""),
        Line::from(Span::styled(
            truncate_string(&item.name, text_width),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            truncate_string(item.primary_artist(), text_width),
            Style::default().fg(Color::Rgb(106, 106, 88)),
        )),
    ];

    if let Some(outcome) = feedback.direction.outcome() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            outcome.label(),
            Style::default().fg(TEXT).add_modifier(Modifier::BOLD),
        )));
    }

    let title = match transform.rotation_deg {
        r if r > 5.0 => " ↻ ",
        r if r < -5.0 => " ↺ ",
        _ => "",
    };

    let card = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(TEXT))
                .title(title)
                .style(Style::default().bg(background)),
        );

    frame.render_widget(Clear, card_area);
    frame.render_widget(card, card_area);
}
