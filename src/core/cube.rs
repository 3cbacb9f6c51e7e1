//! Rotation/gesture controller for the cube.
//!
//! [`Cube`] owns the single rotation value, the four-face assignment and the
//! swipe recognizer.  It never changes its own index: a committed swipe is
//! reported as [`CubeEvent::Change`] and the caller answers with
//! [`Cube::set_index`] (or [`Cube::snap_back`] to refuse).

use std::mem;
use std::time::{Duration, Instant};

use super::gesture::{GestureDetail, GestureListener, SwipeGesture, DEFAULT_THRESHOLD};
use super::panes::{PaneAssignment, PaneSlot, PaneTracker, PANE_COUNT};
use super::scale::{linear_conversion, scale_for_angle, ScaleRange, DEFAULT_SCALE_RANGE};
use super::spring::{Rest, Spring, SpringConfig, TransitionId};

/// Release speed (px/ms) above which a swipe commits regardless of distance.
pub const COMMIT_VELOCITY: f64 = 0.12;

const QUARTER_TURN: f64 = 90.0;

/// Rotation (degrees) at which `index` faces the viewer.
pub fn rotation_for_index(index: i64) -> f64 {
    index as f64 * -QUARTER_TURN
}

// ───────────────────────────────────────── inputs ────────────

/// Requested index, optionally skipping the animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeIndex {
    Animated(i64),
    Jump { index: i64, immediate: bool },
}

impl CubeIndex {
    pub fn index(self) -> i64 {
        match self {
            CubeIndex::Animated(index) | CubeIndex::Jump { index, .. } => index,
        }
    }

    pub fn immediate(self) -> bool {
        match self {
            CubeIndex::Animated(_) => false,
            CubeIndex::Jump { immediate, .. } => immediate,
        }
    }
}

impl From<i64> for CubeIndex {
    fn from(index: i64) -> Self {
        CubeIndex::Animated(index)
    }
}

impl From<(i64, bool)> for CubeIndex {
    fn from((index, immediate): (i64, bool)) -> Self {
        CubeIndex::Jump { index, immediate }
    }
}

/// Dimensions and behaviour of the cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeOptions {
    /// Face width (host pixels/cells).  Also the full-drag distance.
    pub width: f64,
    pub height: f64,
    /// Distance from the viewer to the screen plane.
    pub perspective: f64,
    pub scale_range: ScaleRange,
    /// Keep host scrolling suspended even while idle.
    pub lock_scrolling: bool,
    pub enable_gestures: bool,
    pub spring: SpringConfig,
    /// Movement before a press becomes a swipe.
    pub gesture_threshold: f64,
}

impl Default for CubeOptions {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 600.0,
            perspective: 800.0,
            scale_range: DEFAULT_SCALE_RANGE,
            lock_scrolling: false,
            enable_gestures: true,
            spring: SpringConfig::default(),
            gesture_threshold: DEFAULT_THRESHOLD,
        }
    }
}

// ───────────────────────────────────────── outputs ───────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Rotating towards the current index (or waiting for the caller to
    /// confirm a committed swipe).
    Animating,
    Dragging,
    SnappingBack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeEvent {
    /// A swipe committed to this index.  The caller owns the index.
    Change(i64),
    /// The latest transition settled.
    Rest,
}

/// One visible face as the renderer needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaneView {
    pub slot: PaneSlot,
    /// Content index; negative means empty.
    pub index: i64,
    pub base_rotation: f64,
    /// Front-facing and not animating.
    pub active: bool,
}

// ───────────────────────────────────────── controller ────────

#[derive(Debug)]
pub struct Cube {
    options: CubeOptions,
    index: i64,
    panes: PaneTracker,
    rotation: Spring,
    animating: bool,
    phase: Phase,
    gesture: SwipeGesture,
    /// Recognition paused after a release until the cube settles.
    suspended: bool,
    drag_started: bool,
    transition: Option<TransitionId>,
    events: Vec<CubeEvent>,
}

impl Cube {
    pub fn new(index: impl Into<CubeIndex>, options: CubeOptions) -> Self {
        let index = index.into().index();
        let mut gesture = SwipeGesture::new(options.gesture_threshold);
        gesture.enable(options.enable_gestures);
        Self {
            options,
            index,
            panes: PaneTracker::new(index),
            rotation: Spring::new(rotation_for_index(index), options.spring),
            animating: false,
            phase: Phase::Idle,
            gesture,
            suspended: false,
            drag_started: false,
            transition: None,
            events: Vec::new(),
        }
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    pub fn options(&self) -> &CubeOptions {
        &self.options
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    /// Current rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation.value()
    }

    pub fn target_rotation(&self) -> f64 {
        rotation_for_index(self.index)
    }

    pub fn assignment(&self) -> &PaneAssignment {
        self.panes.panes()
    }

    pub fn gestures_enabled(&self) -> bool {
        self.gesture.is_enabled()
    }

    /// Host scrolling must stay suspended while this is true.
    pub fn scroll_locked(&self) -> bool {
        self.animating || self.options.lock_scrolling
    }

    /// Scale of the whole cube for the current rotation.
    pub fn scale(&self) -> f64 {
        scale_for_angle(self.rotation(), self.options.scale_range)
    }

    /// The four faces in slot order.
    pub fn panes(&self) -> [PaneView; PANE_COUNT] {
        let front = PaneSlot::for_index(self.index);
        let assignment = self.panes.panes();
        PaneSlot::ALL.map(|slot| PaneView {
            slot,
            index: assignment.get(slot),
            base_rotation: slot.base_rotation(),
            active: slot == front && !self.animating,
        })
    }

    /// Drain the events produced since the last call.
    pub fn take_events(&mut self) -> Vec<CubeEvent> {
        mem::take(&mut self.events)
    }

    pub fn set_options(&mut self, options: CubeOptions) {
        self.options = options;
        self.sync_gesture();
    }

    /// Move to a new index.  Re-assigns the faces and rotates to the new
    /// target, superseding whatever transition was in flight.
    pub fn set_index(&mut self, index: impl Into<CubeIndex>) {
        let request = index.into();
        let index = request.index();
        if index == self.index {
            return;
        }
        tracing::debug!(from = self.index, to = index, immediate = request.immediate(), "set index");
        self.panes.advance(index);
        self.index = index;
        self.drag_started = false;
        self.suspended = false;
        self.sync_gesture();
        self.start_transition(request.immediate(), Phase::Animating);
    }

    /// Ease back to the current index.  Gestures stay off until it settles.
    pub fn snap_back(&mut self) {
        self.drag_started = false;
        self.suspended = true;
        self.sync_gesture();
        self.start_transition(false, Phase::SnappingBack);
    }

    /// Advance the animation.  Call once per frame.
    pub fn tick(&mut self, dt: Duration) {
        if let Some(rest) = self.rotation.tick(dt) {
            self.on_rest(rest);
        }
    }

    // ── pointer input ──────────────────────────────────────────

    pub fn pointer_down(&mut self, x: f64, y: f64, at: Instant) {
        self.gesture.pointer_down(x, y, at);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64, at: Instant) {
        if let Some(update) = self.gesture.pointer_move(x, y, at) {
            update.dispatch(self);
        }
    }

    pub fn pointer_up(&mut self, x: f64, y: f64, at: Instant) {
        if let Some(update) = self.gesture.pointer_up(x, y, at) {
            update.dispatch(self);
        }
    }

    // ── internals ──────────────────────────────────────────────

    fn sync_gesture(&mut self) {
        self.gesture
            .enable(self.options.enable_gestures && !self.suspended);
    }

    fn start_transition(&mut self, immediate: bool, phase: Phase) {
        let target = self.target_rotation();
        let (id, superseded) = if immediate {
            self.rotation.set_immediate(target)
        } else {
            self.rotation.animate_to(target)
        };
        if let Some(rest) = superseded {
            tracing::trace!(?rest, "transition superseded");
        }
        self.transition = Some(id);
        self.animating = true;
        self.phase = phase;
    }

    fn on_rest(&mut self, rest: Rest) {
        if !rest.finished || self.transition != Some(rest.id) {
            return;
        }
        self.transition = None;
        if self.phase == Phase::SnappingBack {
            self.suspended = false;
            self.sync_gesture();
        }
        tracing::debug!(index = self.index, "cube at rest");
        self.animating = false;
        self.phase = Phase::Idle;
        self.events.push(CubeEvent::Rest);
    }

    fn commit(&mut self, index: i64) {
        tracing::info!(from = self.index, to = index, "swipe committed");
        self.phase = Phase::Animating;
        self.animating = true;
        self.events.push(CubeEvent::Change(index));
    }
}

impl GestureListener for Cube {
    fn on_move(&mut self, detail: &GestureDetail) {
        if !self.gesture.is_enabled() {
            return;
        }
        // Nothing lies before the first index.
        if self.index == 0 && detail.delta_x > 0.0 {
            return;
        }

        if !self.drag_started {
            self.drag_started = true;
            self.animating = true;
            self.phase = Phase::Dragging;
            self.transition = None;
        }

        let current = self.target_rotation();
        let convert = linear_conversion([0.0, self.options.width], [current, current + QUARTER_TURN]);
        let value = convert(detail.delta_x).clamp(current - QUARTER_TURN, current + QUARTER_TURN);
        if let Some(rest) = self.rotation.jump_to(value) {
            tracing::trace!(?rest, "transition interrupted by drag");
        }
    }

    fn on_end(&mut self, detail: &GestureDetail) {
        if !self.gesture.is_enabled() {
            return;
        }
        let started = mem::take(&mut self.drag_started);
        self.suspended = true;
        self.sync_gesture();

        let half = self.options.width / 2.0;
        let target = if detail.velocity_x.abs() > COMMIT_VELOCITY {
            Some(if detail.delta_x < 0.0 {
                self.index + 1
            } else {
                self.index - 1
            })
        } else if detail.delta_x < -half {
            Some(self.index + 1)
        } else if detail.delta_x > half {
            Some(self.index - 1)
        } else {
            None
        };

        match target {
            // Nothing lies before the first index.
            Some(next) if next >= 0 => self.commit(next),
            _ if !started && self.index == 0 && detail.delta_x > 0.0 => {
                // The drag never moved the cube; hand the gesture straight back.
                self.suspended = false;
                self.sync_gesture();
            }
            _ => {
                tracing::debug!(delta_x = detail.delta_x, ?target, "snap back");
                self.snap_back();
            }
        }
    }
}

impl Drop for Cube {
    fn drop(&mut self) {
        self.gesture.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_at(index: i64, width: f64) -> Cube {
        Cube::new(
            index,
            CubeOptions {
                width,
                ..CubeOptions::default()
            },
        )
    }

    fn settle(cube: &mut Cube) -> Vec<CubeEvent> {
        let mut events = Vec::new();
        for _ in 0..2_000 {
            cube.tick(Duration::from_millis(16));
            events.extend(cube.take_events());
            if !cube.is_animating() {
                break;
            }
        }
        events
    }

    fn release(cube: &mut Cube, delta_x: f64, velocity_x: f64) -> Vec<CubeEvent> {
        let detail = GestureDetail::horizontal(delta_x, velocity_x);
        cube.on_move(&detail);
        cube.on_end(&detail);
        cube.take_events()
    }

    #[test]
    fn fast_flick_commits_regardless_of_distance() {
        let mut cube = cube_at(3, 300.0);
        assert_eq!(release(&mut cube, 1.0, 0.2), vec![CubeEvent::Change(2)]);

        let mut cube = cube_at(3, 300.0);
        assert_eq!(release(&mut cube, -1.0, -0.2), vec![CubeEvent::Change(4)]);
    }

    #[test]
    fn long_drag_commits_to_neighbour() {
        let mut cube = cube_at(1, 300.0);
        assert_eq!(release(&mut cube, -200.0, 0.01), vec![CubeEvent::Change(2)]);

        let mut cube = cube_at(1, 300.0);
        assert_eq!(release(&mut cube, 200.0, 0.01), vec![CubeEvent::Change(0)]);
    }

    #[test]
    fn short_drag_snaps_back() {
        let mut cube = cube_at(2, 300.0);
        assert!(release(&mut cube, -100.0, 0.01).is_empty());
        assert_eq!(cube.phase(), Phase::SnappingBack);
        assert!(!cube.gestures_enabled());

        let events = settle(&mut cube);
        assert_eq!(events, vec![CubeEvent::Rest]);
        assert_eq!(cube.index(), 2);
        assert_eq!(cube.rotation(), -180.0);
        assert_eq!(cube.phase(), Phase::Idle);
        assert!(cube.gestures_enabled());
    }

    #[test]
    fn first_index_ignores_rightward_drag() {
        let mut cube = cube_at(0, 300.0);
        let detail = GestureDetail::horizontal(120.0, 0.0);
        cube.on_move(&detail);
        assert_eq!(cube.rotation(), 0.0);
        assert_eq!(cube.phase(), Phase::Idle);
        assert!(!cube.is_animating());

        assert!(release(&mut cube, 250.0, 0.9).is_empty());
        assert_eq!(cube.rotation(), 0.0);
        assert!(cube.gestures_enabled());
    }

    #[test]
    fn first_index_flick_back_to_start_snaps_back() {
        let mut cube = cube_at(0, 300.0);
        assert!(release(&mut cube, 0.0, 0.2).is_empty());
        assert_eq!(cube.phase(), Phase::SnappingBack);
        assert_eq!(settle(&mut cube), vec![CubeEvent::Rest]);
        assert_eq!(cube.index(), 0);
        assert!(cube.gestures_enabled());
    }

    #[test]
    fn first_index_pointer_flick_never_goes_negative() {
        let t = Instant::now();
        let at = |ms| t + Duration::from_millis(ms);
        let mut cube = cube_at(0, 40.0);

        cube.pointer_down(20.0, 5.0, at(0));
        cube.pointer_move(25.0, 5.0, at(100));
        cube.pointer_move(10.0, 5.0, at(250));
        cube.pointer_move(20.0, 5.0, at(300));
        cube.pointer_up(20.0, 5.0, at(300));
        assert!(cube.take_events().is_empty());

        settle(&mut cube);
        assert_eq!(cube.index(), 0);
        assert_eq!(cube.rotation(), 0.0);
        assert!(cube.gestures_enabled());
    }

    #[test]
    fn first_index_still_swipes_forward() {
        let mut cube = cube_at(0, 300.0);
        assert_eq!(release(&mut cube, -40.0, -0.3), vec![CubeEvent::Change(1)]);
    }

    #[test]
    fn drag_maps_and_clamps_rotation() {
        let mut cube = cube_at(2, 300.0);
        cube.on_move(&GestureDetail::horizontal(-150.0, 0.0));
        assert_eq!(cube.rotation(), -225.0);
        assert_eq!(cube.phase(), Phase::Dragging);
        assert!(cube.is_animating());

        cube.on_move(&GestureDetail::horizontal(-600.0, 0.0));
        assert_eq!(cube.rotation(), -270.0);
        cube.on_move(&GestureDetail::horizontal(600.0, 0.0));
        assert_eq!(cube.rotation(), -90.0);
    }

    #[test]
    fn programmatic_change_rotates_and_rests_once() {
        let mut cube = cube_at(0, 300.0);
        cube.set_index(1);
        assert!(cube.is_animating());
        assert_eq!(cube.assignment().raw(), [0, 1, 2, 3]);
        assert!(cube.panes().iter().all(|p| !p.active));

        let events = settle(&mut cube);
        assert_eq!(events, vec![CubeEvent::Rest]);
        assert_eq!(cube.rotation(), -90.0);
        let active: Vec<_> = cube.panes().iter().filter(|p| p.active).map(|p| p.slot).collect();
        assert_eq!(active, vec![PaneSlot::Right]);
    }

    #[test]
    fn later_index_supersedes_earlier_one() {
        let mut cube = cube_at(0, 300.0);
        cube.set_index(1);
        cube.tick(Duration::from_millis(32));
        cube.set_index(2);
        let events = settle(&mut cube);
        assert_eq!(events, vec![CubeEvent::Rest]);
        assert_eq!(cube.rotation(), -180.0);
    }

    #[test]
    fn immediate_jump_lands_on_next_tick() {
        let mut cube = cube_at(0, 300.0);
        cube.set_index((6, true));
        assert_eq!(cube.index(), 6);
        cube.tick(Duration::ZERO);
        assert_eq!(cube.take_events(), vec![CubeEvent::Rest]);
        assert_eq!(cube.rotation(), -540.0);
        assert_eq!(cube.assignment().get(PaneSlot::for_index(6)), 6);
    }

    #[test]
    fn commit_waits_for_caller_then_reenables() {
        let mut cube = cube_at(1, 300.0);
        assert_eq!(release(&mut cube, -200.0, 0.0), vec![CubeEvent::Change(2)]);
        assert!(!cube.gestures_enabled());
        assert!(cube.is_animating());

        cube.set_index(2);
        assert!(cube.gestures_enabled());
        assert_eq!(settle(&mut cube), vec![CubeEvent::Rest]);
        assert_eq!(cube.rotation(), -180.0);
    }

    #[test]
    fn refused_commit_snaps_back() {
        let mut cube = cube_at(4, 300.0);
        assert_eq!(release(&mut cube, -200.0, 0.0), vec![CubeEvent::Change(5)]);
        cube.snap_back();
        assert_eq!(settle(&mut cube), vec![CubeEvent::Rest]);
        assert_eq!(cube.index(), 4);
        assert_eq!(cube.rotation(), -360.0);
        assert!(cube.gestures_enabled());
    }

    #[test]
    fn pointer_swipe_end_to_end() {
        let t = Instant::now();
        let at = |ms| t + Duration::from_millis(ms);
        let mut cube = cube_at(0, 40.0);

        cube.pointer_down(30.0, 5.0, at(0));
        cube.pointer_move(25.0, 5.0, at(200));
        assert!(cube.rotation() < 0.0);
        cube.pointer_move(5.0, 5.0, at(400));
        cube.pointer_up(5.0, 5.0, at(400));
        assert_eq!(cube.take_events(), vec![CubeEvent::Change(1)]);

        cube.set_index(1);
        settle(&mut cube);
        assert_eq!(cube.rotation(), -90.0);
    }

    #[test]
    fn disabled_gestures_ignore_pointer() {
        let t = Instant::now();
        let mut cube = Cube::new(
            2,
            CubeOptions {
                enable_gestures: false,
                ..CubeOptions::default()
            },
        );
        cube.pointer_down(100.0, 0.0, t);
        cube.pointer_move(0.0, 0.0, t + Duration::from_millis(20));
        cube.pointer_up(0.0, 0.0, t + Duration::from_millis(30));
        assert!(cube.take_events().is_empty());
        assert_eq!(cube.rotation(), -180.0);
    }

    #[test]
    fn scroll_lock_follows_animation() {
        let mut cube = cube_at(0, 300.0);
        assert!(!cube.scroll_locked());
        cube.set_index(1);
        assert!(cube.scroll_locked());
        settle(&mut cube);
        assert!(!cube.scroll_locked());

        let mut options = *cube.options();
        options.lock_scrolling = true;
        cube.set_options(options);
        assert!(cube.scroll_locked());
    }
}
