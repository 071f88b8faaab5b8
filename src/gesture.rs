//! Horizontal drag and swipe detection.
//!
//! Mouse and touch input are tracked separately but resolve through the same
//! displacement test. Coordinates are in pointer units; the caller decides
//! what a unit is.

pub const DEFAULT_SWIPE_THRESHOLD: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { x: f64, button: PointerButton },
    Up { x: f64, button: PointerButton },
    Leave { x: f64 },
    TouchStart { x: f64 },
    TouchEnd { x: f64 },
}

/// Outcome of a completed pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    /// Dragged left: advance one year.
    Next,
    /// Dragged right: go back one year.
    Prev,
    /// Movement within the threshold; treat as a click.
    Tap,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum DragState {
    Idle,
    Dragging { start_x: f64 },
}

#[derive(Debug, Clone)]
pub struct GestureTracker {
    threshold: f64,
    mouse: DragState,
    touch_start: Option<f64>,
}

impl Default for GestureTracker {
    fn default() -> Self {
        GestureTracker::new(DEFAULT_SWIPE_THRESHOLD)
    }
}

impl GestureTracker {
    pub fn new(threshold: f64) -> Self {
        GestureTracker {
            threshold: threshold.abs(),
            mouse: DragState::Idle,
            touch_start: None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.mouse, DragState::Dragging { .. })
    }

    /// Feeds one event. Returns a decision only when an interaction ends.
    pub fn handle(&mut self, event: PointerEvent) -> Option<Swipe> {
        match event {
            PointerEvent::Down {
                x,
                button: PointerButton::Primary,
            } => {
                self.mouse = DragState::Dragging { start_x: x };
                None
            }
            PointerEvent::Down { .. } => None,
            PointerEvent::Up {
                x,
                button: PointerButton::Primary,
            }
            | PointerEvent::Leave { x } => match self.mouse {
                DragState::Dragging { start_x } => {
                    self.mouse = DragState::Idle;
                    Some(self.classify(start_x, x))
                }
                DragState::Idle => None,
            },
            PointerEvent::Up { .. } => None,
            PointerEvent::TouchStart { x } => {
                self.touch_start = Some(x);
                None
            }
            PointerEvent::TouchEnd { x } => {
                let start_x = self.touch_start.take()?;
                Some(self.classify(start_x, x))
            }
        }
    }

    fn classify(&self, start_x: f64, end_x: f64) -> Swipe {
        let displacement = start_x - end_x;
        if displacement > self.threshold {
            Swipe::Next
        } else if displacement < -self.threshold {
            Swipe::Prev
        } else {
            Swipe::Tap
        }
    }
}
