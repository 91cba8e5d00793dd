//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared geometry and color helpers
//! - `layout`: Collection picker, progress bar and key hints
//! - `card`: The swipeable track card and the empty-queue messages

mod utils;
mod layout;
mod card;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::controller::UiState;
use crate::model::{CardTransform, Collection, SessionSnapshot};

pub use utils::{CELL_HEIGHT_PX, CELL_WIDTH_PX};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        snapshot: &SessionSnapshot,
        collections: &[Collection],
        ui_state: &UiState,
        transform: &CardTransform,
    ) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Collection picker
                Constraint::Min(0),    // Card
                Constraint::Length(3), // Progress
                Constraint::Length(1), // Key hints
            ])
            .split(frame.area());

        layout::render_picker(frame, chunks[0], collections, ui_state, &snapshot.source);
        card::render_card_area(frame, chunks[1], snapshot, transform);
        layout::render_progress(frame, chunks[2], snapshot);
        layout::render_hints(frame, chunks[3]);
    }
}
