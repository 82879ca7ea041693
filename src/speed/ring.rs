//! Fixed-capacity ring of interval samples

/// Circular buffer that overwrites its oldest sample once full.
///
/// `total_written` keeps counting past the capacity; the write cursor is
/// always `total_written % capacity`.
#[derive(Debug, Clone)]
pub struct SampleRing {
    slots: Vec<u64>,
    capacity: usize,
    total_written: u64,
}

impl SampleRing {
    /// Create an empty ring. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            slots: vec![0; capacity],
            capacity,
            total_written: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Samples written since creation or the last clear
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of slots holding a sample
    pub fn len(&self) -> usize {
        self.total_written.min(self.capacity as u64) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.total_written == 0
    }

    /// Slot the next sample goes to
    pub fn cursor(&self) -> usize {
        (self.total_written % self.capacity as u64) as usize
    }

    /// Store a sample, overwriting the oldest when full
    pub fn push(&mut self, sample: u64) {
        let cursor = self.cursor();
        self.slots[cursor] = sample;
        self.total_written += 1;
    }

    /// Sum of the populated slots
    pub fn sum(&self) -> u64 {
        self.slots[..self.len()].iter().sum()
    }

    /// Forget every sample
    pub fn clear(&mut self) {
        self.total_written = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_before_wrapping() {
        let mut ring = SampleRing::new(3);
        assert!(ring.is_empty());
        ring.push(10);
        ring.push(20);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.cursor(), 2);
        assert_eq!(ring.sum(), 30);
    }

    #[test]
    fn wraps_and_overwrites_oldest() {
        let mut ring = SampleRing::new(3);
        for s in [1, 2, 3, 4, 5] {
            ring.push(s);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.total_written(), 5);
        assert_eq!(ring.cursor(), 2);
        // Slots now hold 4, 5, 3
        assert_eq!(ring.sum(), 12);
    }

    #[test]
    fn clear_resets_population() {
        let mut ring = SampleRing::new(2);
        ring.push(7);
        ring.push(8);
        ring.push(9);
        ring.clear();
        assert!(ring.is_empty());
        assert_eq!(ring.sum(), 0);
        assert_eq!(ring.len(), 0);
    }

    #[test]
    fn zero_capacity_is_raised() {
        let mut ring = SampleRing::new(0);
        assert_eq!(ring.capacity(), 1);
        ring.push(5);
        ring.push(6);
        assert_eq!(ring.sum(), 6);
    }
}
