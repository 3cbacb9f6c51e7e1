//! Tracks whether host scrolling should be suspended.

/// Edge-detecting lock flag.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollLock {
    locked: bool,
}

impl ScrollLock {
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Feed the desired state.  Returns `Some(new_state)` on a transition.
    pub fn update(&mut self, locked: bool) -> Option<bool> {
        if self.locked == locked {
            return None;
        }
        self.locked = locked;
        if locked {
            tracing::debug!("scrolling locked");
        } else {
            tracing::debug!("scrolling restored");
        }
        Some(locked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_only_transitions() {
        let mut lock = ScrollLock::default();
        assert_eq!(lock.update(false), None);
        assert_eq!(lock.update(true), Some(true));
        assert_eq!(lock.update(true), None);
        assert!(lock.is_locked());
        assert_eq!(lock.update(false), Some(false));
        assert!(!lock.is_locked());
    }
}
