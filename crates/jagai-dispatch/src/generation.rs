/// Token identifying one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Generation(u64);

/// Issues [`Generation`]s and remembers the newest one.
///
/// A response is applied only if it carries the newest generation, so a
/// request that resolves late never overwrites the result of a newer one.
#[derive(Debug, Default)]
pub struct Latest(u64);

impl Latest {
    pub fn issue(&mut self) -> Generation {
        self.0 += 1;
        Generation(self.0)
    }

    /// Make every generation issued so far stale.
    pub fn invalidate(&mut self) {
        self.0 += 1;
    }

    #[must_use]
    pub const fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_newest_is_current() {
        let mut latest = Latest::default();
        let first = latest.issue();
        let second = latest.issue();
        assert!(!latest.is_current(first));
        assert!(latest.is_current(second));
    }

    #[test]
    fn invalidate_makes_all_stale() {
        let mut latest = Latest::default();
        let issued = latest.issue();
        latest.invalidate();
        assert!(!latest.is_current(issued));
    }
}
