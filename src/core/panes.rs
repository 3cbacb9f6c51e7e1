//! Pane index assignment — which content index each of the four cube faces
//! shows.
//!
//! The cube only ever has four faces.  Content indices are mapped onto them
//! cyclically (`index mod 4`), so a face that has rotated out of view gets
//! re-used for content further along.  Because the rotation value keeps
//! growing (`index * -90`), a re-used face must show an index from the
//! correct *virtual lap*: the face two steps ahead of index 2 shows 4, not 0.
//!
//! Everything here is pure; the travel direction is explicit state carried by
//! [`PaneTracker`] instead of living in a hidden global.

use std::fmt;

/// Number of faces on the cube.
pub const PANE_COUNT: usize = 4;

/// Index offset between two consecutive laps around the cube.
const LAP: i64 = PANE_COUNT as i64;

// ───────────────────────────────────────── slot ──────────────

/// One of the four fixed faces of the cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaneSlot {
    Front,
    Right,
    Back,
    Left,
}

impl PaneSlot {
    /// All slots in slot-number order (0–3).
    pub const ALL: [PaneSlot; PANE_COUNT] =
        [PaneSlot::Front, PaneSlot::Right, PaneSlot::Back, PaneSlot::Left];

    /// The slot that shows `index` (Euclidean remainder, so negative indices
    /// still land on a slot).
    pub fn for_index(index: i64) -> Self {
        Self::ALL[index.rem_euclid(LAP) as usize]
    }

    pub fn number(self) -> usize {
        match self {
            PaneSlot::Front => 0,
            PaneSlot::Right => 1,
            PaneSlot::Back => 2,
            PaneSlot::Left => 3,
        }
    }

    /// The rotation (degrees, around Y) the face is mounted at.
    pub fn base_rotation(self) -> f64 {
        match self {
            PaneSlot::Front => 0.0,
            PaneSlot::Right => 90.0,
            PaneSlot::Back => -180.0,
            PaneSlot::Left => -90.0,
        }
    }

    /// Slot `steps` positions further round the cube (wraps 3 → 0).
    pub fn ahead(self, steps: usize) -> Self {
        Self::ALL[(self.number() + steps) % PANE_COUNT]
    }

    /// Slot `steps` positions back round the cube (wraps 0 → 3).
    pub fn behind(self, steps: usize) -> Self {
        Self::ALL[(self.number() + PANE_COUNT - steps % PANE_COUNT) % PANE_COUNT]
    }
}

// ───────────────────────────────────────── direction ─────────

/// Travel direction through the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    pub fn from_forward(forward: bool) -> Self {
        if forward {
            Direction::Forward
        } else {
            Direction::Backward
        }
    }

    pub fn is_forward(self) -> bool {
        self == Direction::Forward
    }
}

// ───────────────────────────────────────── assignment ────────

/// Content index per slot.  Negative values mean "nothing here".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaneAssignment([i64; PANE_COUNT]);

impl Default for PaneAssignment {
    /// Initial render: nothing sits behind index 0.
    fn default() -> Self {
        Self([0, 1, 2, -1])
    }
}

impl PaneAssignment {
    pub fn from_raw(raw: [i64; PANE_COUNT]) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> [i64; PANE_COUNT] {
        self.0
    }

    /// Raw value of `slot`, sentinel included.
    pub fn get(&self, slot: PaneSlot) -> i64 {
        self.0[slot.number()]
    }

    /// The content index shown by `slot`, or `None` when the face is empty.
    pub fn content(&self, slot: PaneSlot) -> Option<usize> {
        usize::try_from(self.get(slot)).ok()
    }

    fn set(&mut self, slot: PaneSlot, value: i64) {
        self.0[slot.number()] = value;
    }

    /// The converged window around `index`: the index itself, both
    /// neighbours, and the far face two steps along the travel direction.
    pub fn around(index: i64, direction: Direction) -> Self {
        let slot = PaneSlot::for_index(index);
        let mut panes = Self([0; PANE_COUNT]);
        panes.set(slot, index);
        panes.set(slot.ahead(1), index + 1);
        panes.set(slot.behind(1), index - 1);
        let far = match direction {
            Direction::Forward => index + 2,
            Direction::Backward => index - 2,
        };
        panes.set(slot.ahead(2), far);
        panes
    }

    /// Move `slot` onto the nearest lap ahead of `index`.
    fn rebase_ahead(&mut self, slot: PaneSlot, index: i64) {
        let mut value = self.get(slot);
        while value <= index {
            value += LAP;
        }
        while value - LAP > index {
            value -= LAP;
        }
        self.set(slot, value);
    }

    /// Move `slot` onto the nearest lap behind `index`.
    fn rebase_behind(&mut self, slot: PaneSlot, index: i64) {
        let mut value = self.get(slot);
        while value >= index {
            value -= LAP;
        }
        while value + LAP < index {
            value += LAP;
        }
        self.set(slot, value);
    }
}

impl fmt::Display for PaneAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "[{a}, {b}, {c}, {d}]")
    }
}

/// Compute the next assignment after a one-step move to `index`.
///
/// `last` is the direction of the previous move; returns the new assignment
/// and the direction to carry into the next call.
pub fn assign(
    previous: &PaneAssignment,
    index: i64,
    forward: bool,
    last: Direction,
) -> (PaneAssignment, Direction) {
    let direction = Direction::from_forward(forward);
    let direction_changed = direction != last;

    let mut panes = *previous;
    let active = PaneSlot::for_index(index);
    panes.set(active, index);

    match direction {
        Direction::Forward => {
            let next = active.ahead(1);
            if direction_changed {
                panes.rebase_ahead(next, index);
            }
            panes.rebase_ahead(next.ahead(1), index);
        }
        Direction::Backward => {
            let prev = active.behind(1);
            if direction_changed {
                panes.rebase_behind(prev, index);
            }
            panes.rebase_behind(prev.behind(1), index);
        }
    }

    (panes, direction)
}

// ───────────────────────────────────────── tracker ───────────

/// Assignment plus the state needed to compute the next one.
#[derive(Debug, Clone)]
pub struct PaneTracker {
    panes: PaneAssignment,
    direction: Direction,
    index: i64,
}

impl Default for PaneTracker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PaneTracker {
    /// Start at `index`.  Index 0 uses the canonical first-render seed.
    pub fn new(index: i64) -> Self {
        let panes = if index == 0 {
            PaneAssignment::default()
        } else {
            PaneAssignment::around(index, Direction::Forward)
        };
        Self {
            panes,
            direction: Direction::Forward,
            index,
        }
    }

    pub fn panes(&self) -> &PaneAssignment {
        &self.panes
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn index(&self) -> i64 {
        self.index
    }

    /// Move to `index`.  Single steps go through [`assign`]; longer jumps
    /// re-seed the whole window since incremental re-basing only patches
    /// the faces adjacent to the previous index.
    pub fn advance(&mut self, index: i64) -> &PaneAssignment {
        if index == self.index {
            return &self.panes;
        }
        let forward = index > self.index;
        if (index - self.index).abs() == 1 {
            let (panes, direction) = assign(&self.panes, index, forward, self.direction);
            self.panes = panes;
            self.direction = direction;
        } else {
            self.direction = Direction::from_forward(forward);
            self.panes = PaneAssignment::around(index, self.direction);
        }
        self.index = index;
        tracing::debug!(index, panes = %self.panes, "pane assignment");
        &self.panes
    }
}
