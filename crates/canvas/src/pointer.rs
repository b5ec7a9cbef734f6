use crate::device::DeviceClass;
use crate::geometry::Point;

/// How raw pointer events feed the shader's pointer uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputPolicy {
    /// Every cursor or touch movement overwrites the sticky position, and the
    /// sticky position is read regardless of device class.
    #[default]
    Direct,
    /// Touch movement only counts while a touch is held. Mobile reads the
    /// sticky touch position; desktop reads the live cursor instead.
    DragGated,
}

/// Pointer transitions delivered by the host, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    CursorMoved(Point),
    TouchStarted(Point),
    TouchMoved(Point),
    TouchEnded,
}

/// Returned by every input transition: the host should skip its default
/// handling (scrolling, gesture navigation) for the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct Handled;

#[derive(Debug, Clone, PartialEq)]
pub struct PointerState {
    policy: InputPolicy,
    sticky: Point,
    live: Point,
    dragging: bool,
}

impl PointerState {
    pub fn new(policy: InputPolicy, origin: Point) -> Self {
        Self {
            policy,
            sticky: origin,
            live: origin,
            dragging: false,
        }
    }

    /// Last position retained across frames.
    pub fn sticky(&self) -> Point {
        self.sticky
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn apply(&mut self, event: PointerEvent) -> Handled {
        match (self.policy, event) {
            (InputPolicy::Direct, PointerEvent::CursorMoved(position)) => {
                self.live = position;
                self.sticky = position;
            }
            (InputPolicy::DragGated, PointerEvent::CursorMoved(position)) => {
                self.live = position;
            }
            (InputPolicy::Direct, PointerEvent::TouchStarted(position))
            | (InputPolicy::Direct, PointerEvent::TouchMoved(position)) => {
                self.sticky = position;
            }
            (InputPolicy::Direct, PointerEvent::TouchEnded) => {}
            (InputPolicy::DragGated, PointerEvent::TouchStarted(position)) => {
                self.dragging = true;
                self.sticky = position;
            }
            (InputPolicy::DragGated, PointerEvent::TouchMoved(position)) => {
                if self.dragging {
                    self.sticky = position;
                }
            }
            (InputPolicy::DragGated, PointerEvent::TouchEnded) => {
                self.dragging = false;
            }
        }
        tracing::trace!(
            ?event,
            sticky = ?self.sticky,
            dragging = self.dragging,
            "pointer transition"
        );
        Handled
    }

    /// Position the shader should see for the given device class.
    pub fn read(&self, class: DeviceClass) -> Point {
        match (self.policy, class) {
            (InputPolicy::Direct, _) | (InputPolicy::DragGated, DeviceClass::Mobile) => {
                self.sticky
            }
            (InputPolicy::DragGated, DeviceClass::Desktop) => self.live,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> Point {
        Point::new(150.0, 75.0)
    }

    #[test]
    fn direct_tracks_every_movement() {
        let mut pointer = PointerState::new(InputPolicy::Direct, origin());
        let _ = pointer.apply(PointerEvent::CursorMoved(Point::new(10.0, 20.0)));
        assert_eq!(pointer.sticky(), Point::new(10.0, 20.0));

        let _ = pointer.apply(PointerEvent::TouchStarted(Point::new(30.0, 40.0)));
        assert_eq!(pointer.sticky(), Point::new(30.0, 40.0));

        let _ = pointer.apply(PointerEvent::TouchEnded);
        let _ = pointer.apply(PointerEvent::TouchMoved(Point::new(50.0, 60.0)));
        assert_eq!(pointer.sticky(), Point::new(50.0, 60.0));
        assert!(!pointer.is_dragging());
    }

    #[test]
    fn direct_reads_sticky_on_both_classes() {
        let mut pointer = PointerState::new(InputPolicy::Direct, origin());
        let _ = pointer.apply(PointerEvent::TouchMoved(Point::new(5.0, 6.0)));
        assert_eq!(pointer.read(DeviceClass::Mobile), Point::new(5.0, 6.0));
        assert_eq!(pointer.read(DeviceClass::Desktop), Point::new(5.0, 6.0));
    }

    #[test]
    fn touch_end_is_sticky() {
        let mut pointer = PointerState::new(InputPolicy::Direct, origin());
        let _ = pointer.apply(PointerEvent::TouchStarted(Point::new(1.0, 2.0)));
        let _ = pointer.apply(PointerEvent::TouchEnded);
        assert_eq!(pointer.sticky(), Point::new(1.0, 2.0));
    }

    #[test]
    fn drag_gated_touch_sequence() {
        let mut pointer = PointerState::new(InputPolicy::DragGated, origin());

        let _ = pointer.apply(PointerEvent::TouchStarted(Point::new(120.0, 80.0)));
        assert!(pointer.is_dragging());
        assert_eq!(pointer.sticky(), Point::new(120.0, 80.0));

        let _ = pointer.apply(PointerEvent::TouchMoved(Point::new(140.0, 90.0)));
        assert_eq!(pointer.sticky(), Point::new(140.0, 90.0));

        let _ = pointer.apply(PointerEvent::TouchEnded);
        assert!(!pointer.is_dragging());

        let _ = pointer.apply(PointerEvent::TouchMoved(Point::new(10.0, 10.0)));
        assert_eq!(pointer.sticky(), Point::new(140.0, 90.0));
    }

    #[test]
    fn drag_gated_desktop_reads_live_cursor() {
        let mut pointer = PointerState::new(InputPolicy::DragGated, origin());
        let _ = pointer.apply(PointerEvent::TouchStarted(Point::new(1.0, 1.0)));
        let _ = pointer.apply(PointerEvent::CursorMoved(Point::new(200.0, 100.0)));

        assert_eq!(pointer.sticky(), Point::new(1.0, 1.0));
        assert_eq!(pointer.read(DeviceClass::Mobile), Point::new(1.0, 1.0));
        assert_eq!(pointer.read(DeviceClass::Desktop), Point::new(200.0, 100.0));
    }

    #[test]
    fn starts_at_origin() {
        let pointer = PointerState::new(InputPolicy::DragGated, origin());
        assert_eq!(pointer.read(DeviceClass::Desktop), origin());
        assert_eq!(pointer.read(DeviceClass::Mobile), origin());
    }
}
