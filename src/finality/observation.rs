use alloy::primitives::BlockNumber;

/// Running count of identical consecutive readings of the finalized block.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StabilityObservation {
    last_value: BlockNumber,
    consecutive_count: u32,
}

impl StabilityObservation {
    /// Start observing from a first reading.
    #[must_use]
    pub fn new(seed: BlockNumber) -> Self {
        Self { last_value: seed, consecutive_count: 1 }
    }

    #[must_use]
    pub fn last_value(&self) -> BlockNumber {
        self.last_value
    }

    #[must_use]
    pub fn consecutive_count(&self) -> u32 {
        self.consecutive_count
    }

    /// Record a reading and report whether `required` identical readings were seen in a row.
    ///
    /// A reading different from the previous one restarts the count at one.
    pub fn observe(&mut self, value: BlockNumber, required: u32) -> bool {
        if value == self.last_value {
            self.consecutive_count = self.consecutive_count.saturating_add(1);
        } else {
            info!(
                previous = self.last_value,
                current = value,
                observed_times = self.consecutive_count,
                "Finalized block changed, restarting observation"
            );
            self.last_value = value;
            self.consecutive_count = 1;
        }
        self.is_stable(required)
    }

    #[must_use]
    pub fn is_stable(&self, required: u32) -> bool {
        self.consecutive_count >= required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seed_counts_once() {
        let observation = StabilityObservation::new(5);
        assert_eq!(observation.last_value(), 5);
        assert_eq!(observation.consecutive_count(), 1);
        assert!(observation.is_stable(1));
        assert!(!observation.is_stable(2));
    }

    #[test]
    fn change_resets_count() {
        let mut observation = StabilityObservation::new(5);

        assert!(!observation.observe(5, 3));
        assert_eq!(observation.consecutive_count(), 2);

        assert!(!observation.observe(7, 3));
        assert_eq!(observation.last_value(), 7);
        assert_eq!(observation.consecutive_count(), 1);

        assert!(!observation.observe(7, 3));
        assert!(observation.observe(7, 3));
    }

    #[test]
    fn going_backwards_is_a_change() {
        let mut observation = StabilityObservation::new(9);
        observation.observe(9, 3);

        assert!(!observation.observe(8, 3));
        assert_eq!(observation.last_value(), 8);
        assert_eq!(observation.consecutive_count(), 1);
    }
}
