//! Damped spring driving the cube's rotation value.
//!
//! Every call to [`Spring::animate_to`] or [`Spring::set_immediate`] starts a
//! *transition* identified by a [`TransitionId`].  Each transition produces
//! exactly one [`Rest`]: `finished = true` when the value settles on the
//! target, or `finished = false` when a later call supersedes it.

use std::time::Duration;

/// Integration step.  Ticks are split into steps of this length.
const STEP: Duration = Duration::from_millis(1);

/// Physical parameters of the spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
    pub mass: f64,
    /// Distance and speed below which the spring counts as settled.
    pub precision: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            tension: 170.0,
            friction: 26.0,
            mass: 1.0,
            precision: 0.01,
        }
    }
}

/// Identifier of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransitionId(u64);

/// Completion signal of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rest {
    pub id: TransitionId,
    /// `false` when the transition was superseded before settling.
    pub finished: bool,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    id: TransitionId,
    /// Jump straight to the target on the next tick.
    immediate: bool,
}

/// A single animated `f64`.
#[derive(Debug, Clone)]
pub struct Spring {
    value: f64,
    velocity: f64,
    target: f64,
    config: SpringConfig,
    transition: Option<Transition>,
    next_id: u64,
}

impl Spring {
    /// A spring at rest on `value`.
    pub fn new(value: f64, config: SpringConfig) -> Self {
        Self {
            value,
            velocity: 0.0,
            target: value,
            config: SpringConfig {
                tension: config.tension.max(0.0001),
                friction: config.friction.max(0.0),
                mass: config.mass.max(0.0001),
                precision: config.precision.max(1e-6),
            },
            transition: None,
            next_id: 0,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    /// True while a transition is in flight.
    pub fn is_animating(&self) -> bool {
        self.transition.is_some()
    }

    pub fn current_transition(&self) -> Option<TransitionId> {
        self.transition.map(|t| t.id)
    }

    /// Ease towards `target`.  Returns the new transition and the rest of
    /// the one it superseded, if any.
    pub fn animate_to(&mut self, target: f64) -> (TransitionId, Option<Rest>) {
        self.start(target, false)
    }

    /// Move to `target` without easing.  The transition still completes
    /// through [`Spring::tick`] so the caller sees one [`Rest`] for it.
    pub fn set_immediate(&mut self, target: f64) -> (TransitionId, Option<Rest>) {
        self.start(target, true)
    }

    /// Set the value outright, outside any transition (finger tracking).
    pub fn jump_to(&mut self, value: f64) -> Option<Rest> {
        let superseded = self.supersede();
        self.value = value;
        self.target = value;
        self.velocity = 0.0;
        superseded
    }

    /// Advance by `dt`.  Returns the rest of the current transition when it
    /// settles during this tick.
    pub fn tick(&mut self, dt: Duration) -> Option<Rest> {
        let transition = self.transition?;

        if transition.immediate {
            self.value = self.target;
            self.velocity = 0.0;
            return self.finish();
        }

        let mut remaining = dt;
        while !remaining.is_zero() {
            let step = remaining.min(STEP);
            remaining -= step;
            self.step(step.as_secs_f64());
            if self.is_settled() {
                self.value = self.target;
                self.velocity = 0.0;
                return self.finish();
            }
        }
        None
    }

    fn start(&mut self, target: f64, immediate: bool) -> (TransitionId, Option<Rest>) {
        let superseded = self.supersede();
        let id = TransitionId(self.next_id);
        self.next_id += 1;
        self.target = target;
        self.transition = Some(Transition { id, immediate });
        (id, superseded)
    }

    fn supersede(&mut self) -> Option<Rest> {
        self.transition.take().map(|t| Rest {
            id: t.id,
            finished: false,
        })
    }

    fn finish(&mut self) -> Option<Rest> {
        self.transition.take().map(|t| Rest {
            id: t.id,
            finished: true,
        })
    }

    fn step(&mut self, dt: f64) {
        let c = self.config;
        let spring_force = -c.tension * (self.value - self.target);
        let damping_force = -c.friction * self.velocity;
        let acceleration = (spring_force + damping_force) / c.mass;
        self.velocity += acceleration * dt;
        self.value += self.velocity * dt;
    }

    fn is_settled(&self) -> bool {
        let p = self.config.precision;
        (self.value - self.target).abs() < p && self.velocity.abs() < p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_until_rest(spring: &mut Spring) -> (Rest, u32) {
        for frame in 1..=10_000 {
            if let Some(rest) = spring.tick(Duration::from_millis(16)) {
                return (rest, frame);
            }
        }
        panic!("spring never settled");
    }

    #[test]
    fn eases_to_target_and_rests_once() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        let (id, superseded) = spring.animate_to(-90.0);
        assert!(superseded.is_none());

        spring.tick(Duration::from_millis(16));
        assert!(spring.value() < 0.0 && spring.value() > -90.0);

        let (rest, frames) = run_until_rest(&mut spring);
        assert_eq!(rest, Rest { id, finished: true });
        assert!(frames > 5, "settled too fast: {frames}");
        assert_eq!(spring.value(), -90.0);
        assert!(!spring.is_animating());
        assert_eq!(spring.tick(Duration::from_millis(16)), None);
    }

    #[test]
    fn immediate_completes_on_next_tick() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        let (id, _) = spring.set_immediate(270.0);
        assert!(spring.is_animating());
        let rest = spring.tick(Duration::ZERO);
        assert_eq!(rest, Some(Rest { id, finished: true }));
        assert_eq!(spring.value(), 270.0);
    }

    #[test]
    fn superseded_transition_reports_unfinished() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        let (first, _) = spring.animate_to(-90.0);
        spring.tick(Duration::from_millis(50));
        let (second, superseded) = spring.animate_to(-180.0);
        assert_eq!(superseded, Some(Rest { id: first, finished: false }));
        assert_ne!(first, second);

        let (rest, _) = run_until_rest(&mut spring);
        assert_eq!(rest.id, second);
        assert_eq!(spring.value(), -180.0);
    }

    #[test]
    fn jump_cancels_and_holds_value() {
        let mut spring = Spring::new(0.0, SpringConfig::default());
        let (id, _) = spring.animate_to(-90.0);
        let superseded = spring.jump_to(-30.0);
        assert_eq!(superseded, Some(Rest { id, finished: false }));
        assert_eq!(spring.value(), -30.0);
        assert!(!spring.is_animating());
        assert_eq!(spring.tick(Duration::from_millis(16)), None);
        assert_eq!(spring.value(), -30.0);
    }
}
