//! Pointer drag tracking.
//!
//! [`DragBuffer`] collects pointer positions while the pointer is held and
//! reports the distance covered every [`DRAG_BUFFER_DEPTH`] samples. Samples
//! older than the stale timeout start a new window.

use std::rc::Rc;
use std::time::Duration;

use rice_core::Point;
use web_time::Instant;

pub const DRAG_BUFFER_DEPTH: usize = 5;

const DEFAULT_STALE_AFTER: Duration = Duration::from_millis(300);

/// Distance from the first to the last sample of a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DragDistance {
    pub dx: i32,
    pub dy: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl DragDistance {
    /// Direction of the dominant axis; `None` for no movement. Ties go to
    /// the vertical axis.
    pub fn direction(&self) -> Option<SwipeDirection> {
        if self.dx == 0 && self.dy == 0 {
            return None;
        }
        Some(if self.dy.abs() >= self.dx.abs() {
            if self.dy < 0 {
                SwipeDirection::Up
            } else {
                SwipeDirection::Down
            }
        } else if self.dx < 0 {
            SwipeDirection::Left
        } else {
            SwipeDirection::Right
        })
    }
}

pub struct DragBuffer {
    samples: [Point; DRAG_BUFFER_DEPTH],
    len: usize,
    last_sample: Option<Instant>,
    stale_after: Duration,
    on_drag: Option<Rc<dyn Fn(DragDistance)>>,
}

impl Default for DragBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl DragBuffer {
    pub fn new() -> Self {
        Self {
            samples: [Point::default(); DRAG_BUFFER_DEPTH],
            len: 0,
            last_sample: None,
            stale_after: DEFAULT_STALE_AFTER,
            on_drag: None,
        }
    }

    pub fn stale_after(mut self, timeout: Duration) -> Self {
        self.stale_after = timeout;
        self
    }

    pub fn on_drag(mut self, f: impl Fn(DragDistance) + 'static) -> Self {
        self.on_drag = Some(Rc::new(f));
        self
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn reset(&mut self) {
        self.samples = [Point::default(); DRAG_BUFFER_DEPTH];
        self.len = 0;
        self.last_sample = None;
    }

    pub fn push(&mut self, x: i32, y: i32) -> Option<DragDistance> {
        self.push_at(x, y, Instant::now())
    }

    /// Records a sample taken at `now`. Returns the window's distance when
    /// this sample completes it.
    pub fn push_at(&mut self, x: i32, y: i32, now: Instant) -> Option<DragDistance> {
        let stale = self
            .last_sample
            .is_some_and(|t| now.saturating_duration_since(t) > self.stale_after);
        if stale || self.len >= DRAG_BUFFER_DEPTH {
            self.reset();
        }
        self.samples[self.len] = Point { x, y };
        self.len += 1;
        self.last_sample = Some(now);

        if self.len < DRAG_BUFFER_DEPTH {
            return None;
        }
        let first = self.samples[0];
        let last = self.samples[DRAG_BUFFER_DEPTH - 1];
        let distance = DragDistance {
            dx: last.x - first.x,
            dy: last.y - first.y,
        };
        self.reset();
        if let Some(cb) = &self.on_drag {
            cb(distance);
        }
        Some(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_reports_every_fifth_sample() {
        let mut buf = DragBuffer::new();
        let t = Instant::now();
        for i in 0..4 {
            assert_eq!(buf.push_at(i * 2, 100 - i * 5, t), None);
        }
        assert_eq!(buf.push_at(8, 80, t), Some(DragDistance { dx: 8, dy: -20 }));
        assert!(buf.is_empty());
        assert_eq!(buf.push_at(0, 0, t), None);
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_stale_samples_start_new_window() {
        let mut buf = DragBuffer::new().stale_after(Duration::from_millis(100));
        let t = Instant::now();
        buf.push_at(0, 0, t);
        buf.push_at(0, 10, t);
        buf.push_at(0, 20, t + Duration::from_millis(500));
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_listener_is_called() {
        let seen = Rc::new(Cell::new(None));
        let sink = seen.clone();
        let mut buf = DragBuffer::new().on_drag(move |d| sink.set(Some(d)));
        let t = Instant::now();
        for i in 0..5 {
            buf.push_at(i * 10, 0, t);
        }
        assert_eq!(seen.get(), Some(DragDistance { dx: 40, dy: 0 }));
    }

    #[test]
    fn test_direction_picks_dominant_axis() {
        assert_eq!(DragDistance { dx: 3, dy: -10 }.direction(), Some(SwipeDirection::Up));
        assert_eq!(DragDistance { dx: -30, dy: 10 }.direction(), Some(SwipeDirection::Left));
        assert_eq!(DragDistance { dx: 0, dy: 0 }.direction(), None);
    }
}
