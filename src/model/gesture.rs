//! Swipe gesture translation
//!
//! Turns pointer movement into card motion, a keep/remove preview and, on a
//! long enough release, a [`SwipeIntent`]. The translator never touches the
//! review session: intents are handed to the controller through a channel
//! once the fling animation has finished.

use std::time::Duration;

use super::types::Outcome;
use crate::config::GestureConfig;

/// Which way the card is being pulled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SwipeDirection {
    #[default]
    None,
    Left,
    Right,
}

impl SwipeDirection {
    pub fn outcome(self) -> Option<Outcome> {
        match self {
            SwipeDirection::None => None,
            SwipeDirection::Left => Some(Outcome::Remove),
            SwipeDirection::Right => Some(Outcome::Keep),
        }
    }
}

/// Preview shown on top of the card every frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Feedback {
    pub direction: SwipeDirection,
    /// Overlay opacity, 0.0 to 1.0
    pub intensity: f32,
}

/// Visual state of the card for one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CardTransform {
    pub offset_x: f32,
    pub offset_y: f32,
    pub rotation_deg: f32,
    pub feedback: Feedback,
}

/// The card a swipe was started on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwipeTarget {
    /// Generation of the session showing the card
    pub generation: u64,
    pub item_id: String,
}

/// A decision produced by a completed swipe
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwipeIntent {
    pub outcome: Outcome,
    pub target: SwipeTarget,
}

/// What a release did
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    /// The card flies off; the intent follows when the animation ends
    Commit(Outcome),
    /// The card springs back, nothing is decided
    Cancel,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Visual {
    x: f32,
    y: f32,
    /// Horizontal displacement driving the rotation
    rotate: f32,
    opacity: f32,
}

impl Visual {
    fn lerp(from: Visual, to: Visual, t: f32) -> Visual {
        let mix = |a: f32, b: f32| a + (b - a) * t;
        Visual {
            x: mix(from.x, to.x),
            y: mix(from.y, to.y),
            rotate: mix(from.rotate, to.rotate),
            opacity: mix(from.opacity, to.opacity),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Tween {
    from: Visual,
    to: Visual,
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    fn new(from: Visual, to: Visual, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
        }
    }

    fn advance(&mut self, dt: Duration) -> Visual {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        Visual::lerp(self.from, self.to, ease_in_out(self.progress()))
    }

    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        self.elapsed.as_secs_f32() / self.duration.as_secs_f32()
    }

    fn finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

fn ease_in_out(t: f32) -> f32 {
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

#[derive(Clone, Debug)]
enum Phase {
    Idle,
    Dragging { target: SwipeTarget },
    Flinging { intent: SwipeIntent, tween: Tween },
    Settling { tween: Tween },
}

pub struct GestureTranslator {
    config: GestureConfig,
    phase: Phase,
    visual: Visual,
    direction: SwipeDirection,
}

impl GestureTranslator {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            phase: Phase::Idle,
            visual: Visual::default(),
            direction: SwipeDirection::None,
        }
    }

    /// Whether a drag has moved far enough to become a swipe
    pub fn should_start(&self, dx: f32, dy: f32) -> bool {
        dx.abs() > self.config.start_slop || dy.abs() > self.config.start_slop
    }

    /// Stop any running animation and put the card back to neutral.
    ///
    /// A fling that was cut short still delivers its decision.
    pub fn interrupt(&mut self) -> Option<SwipeIntent> {
        let pending = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Flinging { intent, .. } => Some(intent),
            _ => None,
        };
        self.reset();
        pending
    }

    /// Take over `target` for a new drag.
    ///
    /// Call [`interrupt`](Self::interrupt) first to collect a fling in
    /// progress; otherwise its decision is lost.
    pub fn grant(&mut self, target: SwipeTarget) {
        self.reset();
        self.phase = Phase::Dragging { target };
    }

    /// Follow the pointer, `(dx, dy)` being the displacement since the grant
    pub fn sample(&mut self, dx: f32, dy: f32) -> Feedback {
        if !matches!(self.phase, Phase::Dragging { .. }) {
            return self.feedback();
        }

        self.visual.x = dx;
        self.visual.y = dy;
        self.visual.rotate = dx;

        if dx.abs() > self.config.activation_threshold {
            self.direction = if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            };
            self.visual.opacity = (dx.abs() / self.config.commit_threshold).min(1.0);
        } else {
            self.direction = SwipeDirection::None;
            self.visual.opacity = 0.0;
        }
        self.feedback()
    }

    /// End the drag at `(dx, dy)`
    pub fn release(&mut self, dx: f32, dy: f32) -> Release {
        let target = match &self.phase {
            Phase::Dragging { target } => target.clone(),
            _ => return Release::Cancel,
        };
        self.sample(dx, dy);

        if dx.abs() > self.config.commit_threshold {
            let (outcome, fling_x) = if dx > 0.0 {
                (Outcome::Keep, self.config.fling_target)
            } else {
                (Outcome::Remove, -self.config.fling_target)
            };
            let to = Visual {
                x: fling_x,
                ..self.visual
            };
            tracing::debug!(dx, ?outcome, item_id = %target.item_id, "Swipe committed");
            self.phase = Phase::Flinging {
                intent: SwipeIntent { outcome, target },
                tween: Tween::new(self.visual, to, self.config.fling_duration()),
            };
            Release::Commit(outcome)
        } else {
            tracing::trace!(dx, "Swipe cancelled");
            self.direction = SwipeDirection::None;
            self.phase = Phase::Settling {
                tween: Tween::new(self.visual, Visual::default(), self.config.settle_duration()),
            };
            Release::Cancel
        }
    }

    /// Step the running animation by `dt`.
    ///
    /// Returns the intent of a fling that completed during this step, after
    /// which the card is back at neutral.
    pub fn advance(&mut self, dt: Duration) -> Option<SwipeIntent> {
        match &mut self.phase {
            Phase::Flinging { intent, tween } => {
                self.visual = tween.advance(dt);
                if tween.finished() {
                    let intent = intent.clone();
                    self.reset();
                    return Some(intent);
                }
                None
            }
            Phase::Settling { tween } => {
                self.visual = tween.advance(dt);
                if tween.finished() {
                    self.reset();
                }
                None
            }
            Phase::Idle | Phase::Dragging { .. } => None,
        }
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Flinging { .. } | Phase::Settling { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.phase, Phase::Dragging { .. })
    }

    pub fn feedback(&self) -> Feedback {
        match self.direction {
            SwipeDirection::None => Feedback::default(),
            direction => Feedback {
                direction,
                intensity: self.visual.opacity,
            },
        }
    }

    pub fn transform(&self) -> CardTransform {
        CardTransform {
            offset_x: self.visual.x,
            offset_y: self.visual.y,
            rotation_deg: self.visual.rotate / self.config.rotation_range
                * self.config.max_rotation_deg,
            feedback: self.feedback(),
        }
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.visual = Visual::default();
        self.direction = SwipeDirection::None;
    }
}
