use crate::coords::Vec2;

use super::types::{GestureInput, InputEvent, MouseButton, MouseButtonState};

/// Turns primary-button press/move/release into drag gestures.
///
/// Every drag event carries the press position, so consumers can compute a
/// delta relative to where the drag began rather than to the previous move.
#[derive(Debug, Default, Clone)]
pub struct DragTracker {
    start: Option<Vec2>,
    last: Option<Vec2>,
}

impl DragTracker {
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.start.is_some()
    }

    /// Feeds one event; returns the gesture it completes, if any.
    pub fn process(&mut self, ev: &InputEvent) -> Option<GestureInput> {
        match *ev {
            InputEvent::PointerButton {
                button: MouseButton::Left,
                state,
                position,
            } => match state {
                MouseButtonState::Pressed => {
                    self.start = Some(position);
                    self.last = Some(position);
                    None
                }
                MouseButtonState::Released => {
                    let start = self.start.take()?;
                    self.last = None;
                    Some(GestureInput::DragEnd { start, end: position })
                }
            },

            InputEvent::PointerMoved(current) => {
                let start = self.start?;
                if self.last == Some(current) {
                    return None;
                }
                self.last = Some(current);
                Some(GestureInput::DragMove { start, current })
            }

            InputEvent::MouseWheel(delta) => {
                let delta_y = delta.scroll_down();
                // Horizontal-only scrolling is not a zoom step.
                (delta_y != 0.0).then_some(GestureInput::Wheel { delta_y })
            }

            // A release that never arrives must not leave a drag open.
            InputEvent::Focused(false) => {
                self.last = None;
                self.start.take()?;
                log::debug!("drag abandoned on focus loss");
                Some(GestureInput::DragCancel)
            }

            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::MouseWheelDelta;

    fn button(state: MouseButtonState, x: f32, y: f32) -> InputEvent {
        InputEvent::PointerButton {
            button: MouseButton::Left,
            state,
            position: Vec2::new(x, y),
        }
    }

    fn moved(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerMoved(Vec2::new(x, y))
    }

    #[test]
    fn moves_without_press_are_ignored() {
        let mut t = DragTracker::default();
        assert_eq!(t.process(&moved(5.0, 5.0)), None);
        assert_eq!(t.process(&button(MouseButtonState::Released, 5.0, 5.0)), None);
    }

    #[test]
    fn press_move_release_yields_move_then_end() {
        let mut t = DragTracker::default();
        assert_eq!(t.process(&button(MouseButtonState::Pressed, 10.0, 20.0)), None);
        assert!(t.is_dragging());

        assert_eq!(
            t.process(&moved(15.0, 25.0)),
            Some(GestureInput::DragMove {
                start: Vec2::new(10.0, 20.0),
                current: Vec2::new(15.0, 25.0)
            })
        );
        assert_eq!(
            t.process(&moved(30.0, 20.0)),
            Some(GestureInput::DragMove {
                start: Vec2::new(10.0, 20.0),
                current: Vec2::new(30.0, 20.0)
            })
        );
        assert_eq!(
            t.process(&button(MouseButtonState::Released, 30.0, 20.0)),
            Some(GestureInput::DragEnd {
                start: Vec2::new(10.0, 20.0),
                end: Vec2::new(30.0, 20.0)
            })
        );
        assert!(!t.is_dragging());
    }

    #[test]
    fn repeated_position_is_not_reemitted() {
        let mut t = DragTracker::default();
        t.process(&button(MouseButtonState::Pressed, 0.0, 0.0));
        assert!(t.process(&moved(1.0, 1.0)).is_some());
        assert_eq!(t.process(&moved(1.0, 1.0)), None);
    }

    #[test]
    fn secondary_button_does_not_drag() {
        let mut t = DragTracker::default();
        t.process(&InputEvent::PointerButton {
            button: MouseButton::Right,
            state: MouseButtonState::Pressed,
            position: Vec2::zero(),
        });
        assert!(!t.is_dragging());
    }

    #[test]
    fn focus_loss_cancels_drag() {
        let mut t = DragTracker::default();
        t.process(&button(MouseButtonState::Pressed, 0.0, 0.0));
        t.process(&moved(4.0, 4.0));
        assert_eq!(
            t.process(&InputEvent::Focused(false)),
            Some(GestureInput::DragCancel)
        );
        assert!(!t.is_dragging());
        assert_eq!(t.process(&button(MouseButtonState::Released, 9.0, 9.0)), None);
    }

    #[test]
    fn focus_loss_without_drag_is_silent() {
        let mut t = DragTracker::default();
        assert_eq!(t.process(&InputEvent::Focused(false)), None);
    }

    #[test]
    fn wheel_uses_browser_sign() {
        let mut t = DragTracker::default();
        // Wheel toward the user: content moves up, browser reports positive deltaY.
        let toward = InputEvent::MouseWheel(MouseWheelDelta::Line { x: 0.0, y: -1.0 });
        assert_eq!(t.process(&toward), Some(GestureInput::Wheel { delta_y: 1.0 }));

        let sideways = InputEvent::MouseWheel(MouseWheelDelta::Pixel { x: 3.0, y: 0.0 });
        assert_eq!(t.process(&sideways), None);
    }
}
