//! Key and mouse event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::model::{CatalogClient, Outcome, Release};
use crate::view::{CELL_HEIGHT_PX, CELL_WIDTH_PX};
use super::ReviewController;

/// A mouse drag in progress
#[derive(Clone, Copy, Debug)]
pub struct DragState {
    origin_column: u16,
    origin_row: u16,
    /// Whether the drag moved past the slop and drives the card
    swiping: bool,
}

impl DragState {
    fn displacement(&self, column: u16, row: u16) -> (f32, f32) {
        let dx = (column as f32 - self.origin_column as f32) * CELL_WIDTH_PX;
        let dy = (row as f32 - self.origin_row as f32) * CELL_HEIGHT_PX;
        (dx, dy)
    }
}

impl<C: CatalogClient> ReviewController<C> {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.ui.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.ui.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('x') => self.press_button(Outcome::Remove),
            KeyCode::Right | KeyCode::Char('k') => self.press_button(Outcome::Keep),
            KeyCode::Tab => self.picker_move(1),
            KeyCode::BackTab => self.picker_move(-1),
            KeyCode::Enter => {
                let selected = self
                    .collections()
                    .get(self.ui.picker_selected)
                    .map(|collection| collection.source.clone());
                if let Some(source) = selected {
                    self.select_source(source);
                }
            }
            _ => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                self.drag = Some(DragState {
                    origin_column: mouse.column,
                    origin_row: mouse.row,
                    swiping: false,
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                let Some(mut drag) = self.drag else {
                    return;
                };
                let (dx, dy) = drag.displacement(mouse.column, mouse.row);

                if !drag.swiping && self.gesture.should_start(dx, dy) {
                    // A fling interrupted by the new drag still counts, and
                    // lands before the next card is picked up
                    if let Some(intent) = self.gesture.interrupt() {
                        self.handle_intent(intent);
                    }
                    if let Some(target) = self.swipe_target() {
                        drag.swiping = true;
                        self.gesture.grant(target);
                    }
                }
                if drag.swiping {
                    self.gesture.sample(dx, dy);
                }
                self.drag = Some(drag);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                if let Some(drag) = self.drag.take().filter(|drag| drag.swiping) {
                    let (dx, dy) = drag.displacement(mouse.column, mouse.row);
                    if let Release::Commit(outcome) = self.gesture.release(dx, dy) {
                        tracing::debug!(?outcome, "Card swiped away");
                    }
                }
            }
            _ => {}
        }
    }

    /// Keep/remove buttons commit directly, without the swipe animation
    fn press_button(&mut self, outcome: Outcome) {
        if self.gesture.is_animating() || self.gesture.is_dragging() {
            return;
        }
        self.commit(outcome);
    }

    fn picker_move(&mut self, step: isize) {
        let count = self.collections().len() as isize;
        if count == 0 {
            return;
        }
        let next = (self.ui.picker_selected as isize + step).rem_euclid(count);
        self.ui.picker_selected = next as usize;
    }
}
