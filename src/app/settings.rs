//! Settings menu model (data only).
//!
//! Keeping these definitions outside the input handler lets both the handler
//! and UI renderers consume the same source of truth without cross-importing.

use super::state::AppState;

/// A single item in the settings menu.
pub enum SettingsItem {
    /// Boolean toggle — reads/writes via accessors on `AppState`.
    Toggle {
        label: &'static str,
        get: fn(&AppState) -> bool,
        set: fn(&mut AppState, bool),
    },
    /// Cycles through a finite set of values.
    Cycle {
        label: &'static str,
        value: fn(&AppState) -> String,
        cycle: fn(&mut AppState),
    },
}

impl SettingsItem {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Toggle { label, .. } | Self::Cycle { label, .. } => label,
        }
    }

    /// Current value as shown in the popup.
    pub fn display_value(&self, state: &AppState) -> String {
        match self {
            Self::Toggle { get, .. } => String::from(if get(state) { "ON" } else { "OFF" }),
            Self::Cycle { value, .. } => value(state),
        }
    }

    /// Toggle or advance the item.
    pub fn activate(&self, state: &mut AppState) {
        match self {
            Self::Toggle { get, set, .. } => {
                let current = get(state);
                set(state, !current);
            }
            Self::Cycle { cycle, .. } => cycle(state),
        }
        state.apply_cube_options();
        state.persist();
    }
}

/// Named spring presets: (label, tension, friction).
pub const SPRING_PRESETS: &[(&str, f64, f64)] = &[
    ("default", 170.0, 26.0),
    ("gentle", 120.0, 14.0),
    ("wobbly", 180.0, 12.0),
    ("stiff", 210.0, 20.0),
    ("slow", 280.0, 60.0),
];

const SCALE_STEPS: &[f64] = &[1.0, 0.975, 0.95, 0.9, 0.85, 0.75];
const PERSPECTIVE_STEPS: &[u16] = &[40, 60, 100, 160, 250, 400];

fn spring_label(state: &AppState) -> &'static str {
    SPRING_PRESETS
        .iter()
        .find(|(_, t, f)| *t == state.config.spring_tension && *f == state.config.spring_friction)
        .map_or("custom", |&(label, _, _)| label)
}

/// The step after the one closest to `current`.
fn next_step<T: Copy + Into<f64>>(steps: &[T], current: f64) -> T {
    let idx = steps
        .iter()
        .enumerate()
        .min_by(|a, b| {
            let da = ((*a.1).into() - current).abs();
            let db = ((*b.1).into() - current).abs();
            da.total_cmp(&db)
        })
        .map_or(0, |(i, _)| i);
    steps[(idx + 1) % steps.len()]
}

/// All items shown in the settings popup, in display order.
pub static SETTINGS_ITEMS: &[SettingsItem] = &[
    SettingsItem::Toggle {
        label: "Lock Scrolling",
        get: |s| s.config.lock_scrolling,
        set: |s, v| {
            s.config.lock_scrolling = v;
            s.status_message = Some(if v {
                "Story list scrolling locked".into()
            } else {
                "Story list scrolls while the cube is idle".into()
            });
        },
    },
    SettingsItem::Toggle {
        label: "Swipe Gestures",
        get: |s| s.config.enable_gestures,
        set: |s, v| {
            s.config.enable_gestures = v;
            s.status_message = Some(format!("Swipe gestures {}", if v { "on" } else { "off" }));
        },
    },
    SettingsItem::Cycle {
        label: "Mid-turn Scale",
        value: |s| format!("{:.0}%", s.config.scale_min * 100.0),
        cycle: |s| {
            s.config.scale_min = next_step(SCALE_STEPS, s.config.scale_min);
            s.status_message = Some(format!("Mid-turn scale: {:.1}%", s.config.scale_min * 100.0));
        },
    },
    SettingsItem::Cycle {
        label: "Perspective",
        value: |s| format!("{} cols", s.config.perspective),
        cycle: |s| {
            s.config.perspective = next_step(PERSPECTIVE_STEPS, s.config.perspective as f64);
            s.status_message = Some(format!("Perspective: {} cols", s.config.perspective));
        },
    },
    SettingsItem::Cycle {
        label: "Spring",
        value: |s| spring_label(s).to_string(),
        cycle: |s| {
            let idx = SPRING_PRESETS
                .iter()
                .position(|(label, _, _)| *label == spring_label(s))
                .map_or(0, |i| (i + 1) % SPRING_PRESETS.len());
            let (label, tension, friction) = SPRING_PRESETS[idx];
            s.config.spring_tension = tension;
            s.config.spring_friction = friction;
            s.status_message = Some(format!("Spring: {label}"));
        },
    },
];
