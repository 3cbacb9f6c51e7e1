//! Horizontal swipe recognition.
//!
//! [`SwipeGesture`] consumes raw pointer samples (position + timestamp) and
//! reports cumulative displacement and instantaneous velocity to a
//! [`GestureListener`].  It knows nothing about the cube; anything that can
//! report "delta x so far" and "velocity x right now" could stand in for it.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Movement (px) before a press turns into a gesture.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// Widest angle from the horizontal axis that still counts as a swipe.
const MAX_ANGLE_DEG: f64 = 40.0;

/// Velocity is measured over this trailing window.
const VELOCITY_WINDOW: Duration = Duration::from_millis(100);

/// Snapshot of a gesture handed to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureDetail {
    pub start_x: f64,
    pub start_y: f64,
    pub current_x: f64,
    pub current_y: f64,
    /// Cumulative horizontal displacement since the press.
    pub delta_x: f64,
    pub delta_y: f64,
    /// Horizontal speed in px/ms over the trailing window.
    pub velocity_x: f64,
    pub velocity_y: f64,
}

impl GestureDetail {
    /// A bare detail with only the horizontal components set.
    pub fn horizontal(delta_x: f64, velocity_x: f64) -> Self {
        Self {
            current_x: delta_x,
            delta_x,
            velocity_x,
            ..Self::default()
        }
    }
}

/// Receiver of gesture callbacks.  Moves always precede the end.
pub trait GestureListener {
    fn on_move(&mut self, detail: &GestureDetail);
    fn on_end(&mut self, detail: &GestureDetail);
}

/// A callback produced by the recognizer, to be handed to a listener.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureUpdate {
    Move(GestureDetail),
    End(GestureDetail),
}

impl GestureUpdate {
    pub fn dispatch<L: GestureListener + ?Sized>(self, listener: &mut L) {
        match self {
            GestureUpdate::Move(detail) => listener.on_move(&detail),
            GestureUpdate::End(detail) => listener.on_end(&detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracking {
    /// No pointer down.
    Idle,
    /// Pointer down, threshold not yet crossed.
    Pressed,
    /// Swipe recognised; moves are being reported.
    Started,
    /// Pointer down but the movement was not horizontal.
    Rejected,
}

/// Pointer-sample → swipe recognizer.
#[derive(Debug, Clone)]
pub struct SwipeGesture {
    enabled: bool,
    destroyed: bool,
    threshold: f64,
    tracking: Tracking,
    start: (f64, f64),
    samples: VecDeque<(f64, f64, Instant)>,
}

impl Default for SwipeGesture {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SwipeGesture {
    pub fn new(threshold: f64) -> Self {
        Self {
            enabled: true,
            destroyed: false,
            threshold: threshold.max(0.0),
            tracking: Tracking::Idle,
            start: (0.0, 0.0),
            samples: VecDeque::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled && !self.destroyed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// True once a swipe has been recognised and until it ends.
    pub fn is_tracking(&self) -> bool {
        self.tracking == Tracking::Started
    }

    /// Enable or disable recognition.  Disabling drops any gesture in
    /// progress without an end callback.
    pub fn enable(&mut self, enabled: bool) {
        if self.destroyed {
            return;
        }
        if !enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    /// Detach for good.  Every later call is a no-op.
    pub fn destroy(&mut self) {
        if !self.destroyed {
            tracing::debug!("swipe gesture destroyed");
        }
        self.reset();
        self.enabled = false;
        self.destroyed = true;
    }

    pub fn pointer_down(&mut self, x: f64, y: f64, at: Instant) {
        if !self.is_enabled() {
            return;
        }
        self.tracking = Tracking::Pressed;
        self.start = (x, y);
        self.samples.clear();
        self.samples.push_back((x, y, at));
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, at: Instant) -> Option<GestureUpdate> {
        if !self.is_enabled() {
            return None;
        }
        match self.tracking {
            Tracking::Idle | Tracking::Rejected => None,
            Tracking::Pressed => {
                self.record(x, y, at);
                let (dx, dy) = (x - self.start.0, y - self.start.1);
                if dx.hypot(dy) < self.threshold || (dx == 0.0 && dy == 0.0) {
                    return None;
                }
                if is_horizontal(dx, dy) {
                    self.tracking = Tracking::Started;
                    Some(GestureUpdate::Move(self.detail(x, y)))
                } else {
                    self.tracking = Tracking::Rejected;
                    None
                }
            }
            Tracking::Started => {
                self.record(x, y, at);
                Some(GestureUpdate::Move(self.detail(x, y)))
            }
        }
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, at: Instant) -> Option<GestureUpdate> {
        if !self.is_enabled() {
            return None;
        }
        let started = self.tracking == Tracking::Started;
        let update = if started {
            self.record(x, y, at);
            Some(GestureUpdate::End(self.detail(x, y)))
        } else {
            None
        };
        self.reset();
        update
    }

    fn reset(&mut self) {
        self.tracking = Tracking::Idle;
        self.samples.clear();
    }

    fn record(&mut self, x: f64, y: f64, at: Instant) {
        self.samples.push_back((x, y, at));
        while let Some(&(_, _, t)) = self.samples.front() {
            if at.saturating_duration_since(t) > VELOCITY_WINDOW && self.samples.len() > 1 {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    fn detail(&self, x: f64, y: f64) -> GestureDetail {
        let (velocity_x, velocity_y) = self.velocity();
        GestureDetail {
            start_x: self.start.0,
            start_y: self.start.1,
            current_x: x,
            current_y: y,
            delta_x: x - self.start.0,
            delta_y: y - self.start.1,
            velocity_x,
            velocity_y,
        }
    }

    /// Velocity over the trailing window.  Zero when the pointer has been
    /// still for the whole window.
    fn velocity(&self) -> (f64, f64) {
        let (Some(&(x0, y0, t0)), Some(&(x1, y1, t1))) = (self.samples.front(), self.samples.back())
        else {
            return (0.0, 0.0);
        };
        let elapsed = t1.saturating_duration_since(t0);
        if self.samples.len() < 2 || elapsed.is_zero() || elapsed > VELOCITY_WINDOW {
            return (0.0, 0.0);
        }
        let ms = elapsed.as_secs_f64() * 1000.0;
        ((x1 - x0) / ms, (y1 - y0) / ms)
    }
}

fn is_horizontal(dx: f64, dy: f64) -> bool {
    let angle = dy.abs().atan2(dx.abs()).to_degrees();
    angle <= MAX_ANGLE_DEG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        moves: Vec<GestureDetail>,
        ends: Vec<GestureDetail>,
    }

    impl GestureListener for Recorder {
        fn on_move(&mut self, detail: &GestureDetail) {
            self.moves.push(*detail);
        }
        fn on_end(&mut self, detail: &GestureDetail) {
            self.ends.push(*detail);
        }
    }

    fn ms(base: Instant, n: u64) -> Instant {
        base + Duration::from_millis(n)
    }

    fn feed(rec: &mut Recorder, update: Option<GestureUpdate>) {
        if let Some(u) = update {
            u.dispatch(rec);
        }
    }

    #[test]
    fn reports_delta_and_velocity() {
        let t = Instant::now();
        let mut g = SwipeGesture::new(2.0);
        let mut rec = Recorder::default();

        g.pointer_down(100.0, 10.0, t);
        let u = g.pointer_move(101.0, 10.0, ms(t, 10));
        assert!(u.is_none(), "below threshold");
        let u = g.pointer_move(90.0, 10.0, ms(t, 20));
        feed(&mut rec, u);
        let u = g.pointer_move(80.0, 11.0, ms(t, 40));
        feed(&mut rec, u);
        let u = g.pointer_up(80.0, 11.0, ms(t, 40));
        feed(&mut rec, u);

        assert_eq!(rec.moves.len(), 2);
        assert_eq!(rec.moves[1].delta_x, -20.0);
        assert_eq!(rec.ends.len(), 1);
        let end = rec.ends[0];
        assert_eq!(end.delta_x, -20.0);
        // 20px left over 40ms.
        assert!((end.velocity_x + 0.5).abs() < 1e-9, "{}", end.velocity_x);
        assert!(!g.is_tracking());
    }

    #[test]
    fn paused_pointer_has_no_velocity() {
        let t = Instant::now();
        let mut g = SwipeGesture::new(1.0);
        g.pointer_down(0.0, 0.0, t);
        assert!(g.pointer_move(50.0, 0.0, ms(t, 10)).is_some());
        let Some(GestureUpdate::End(end)) = g.pointer_up(50.0, 0.0, ms(t, 500)) else {
            panic!("expected end");
        };
        assert_eq!(end.delta_x, 50.0);
        assert_eq!(end.velocity_x, 0.0);
    }

    #[test]
    fn vertical_motion_is_rejected() {
        let t = Instant::now();
        let mut g = SwipeGesture::new(1.0);
        g.pointer_down(0.0, 0.0, t);
        assert!(g.pointer_move(1.0, 8.0, ms(t, 10)).is_none());
        assert!(g.pointer_move(30.0, 8.0, ms(t, 20)).is_none());
        assert!(g.pointer_up(30.0, 8.0, ms(t, 30)).is_none());
    }

    #[test]
    fn tap_without_motion_never_ends() {
        let t = Instant::now();
        let mut g = SwipeGesture::default();
        g.pointer_down(5.0, 5.0, t);
        assert!(g.pointer_up(5.0, 5.0, ms(t, 30)).is_none());
    }

    #[test]
    fn disabled_and_destroyed_ignore_input() {
        let t = Instant::now();
        let mut g = SwipeGesture::new(1.0);
        g.pointer_down(0.0, 0.0, t);
        assert!(g.pointer_move(10.0, 0.0, ms(t, 10)).is_some());
        g.enable(false);
        assert!(!g.is_tracking());
        assert!(g.pointer_up(10.0, 0.0, ms(t, 20)).is_none());

        g.enable(true);
        g.pointer_down(0.0, 0.0, ms(t, 30));
        assert!(g.pointer_move(10.0, 0.0, ms(t, 40)).is_some());

        g.destroy();
        g.enable(true);
        assert!(!g.is_enabled());
        g.pointer_down(0.0, 0.0, ms(t, 50));
        assert!(g.pointer_move(10.0, 0.0, ms(t, 60)).is_none());
    }
}
