/// Hands out the human-facing document number. The composer never touches
/// ambient storage itself: callers own persistence of the counter (a
/// browser session, a file, a database row) and pass an implementation in.
/// Numbers are rendered zero-padded to seven digits.
pub trait SequenceCounter {
    /// The number the next document should carry, without consuming it
    fn current(&self) -> String;
    /// Advance the counter and return the new number. Called only after a
    /// document has actually been produced.
    fn increment_and_get(&mut self) -> String;
}

/// An in-memory [SequenceCounter], useful as the default session counter
/// and as a test double. Starts at 1, i.e. "0000001".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemorySequence {
    value: u64,
}

impl MemorySequence {
    pub fn new() -> MemorySequence {
        MemorySequence { value: 1 }
    }

    /// Resume from a previously persisted value
    pub fn starting_at(value: u64) -> MemorySequence {
        MemorySequence { value }
    }
}

impl Default for MemorySequence {
    fn default() -> Self {
        MemorySequence::new()
    }
}

impl SequenceCounter for MemorySequence {
    fn current(&self) -> String {
        format!("{:07}", self.value)
    }

    fn increment_and_get(&mut self) -> String {
        self.value += 1;
        format!("{:07}", self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn a_fresh_counter_reads_one() {
        assert_eq!(MemorySequence::new().current(), "0000001");
    }

    #[test]
    fn incrementing_advances_and_pads() {
        let mut counter = MemorySequence::new();
        assert_eq!(counter.increment_and_get(), "0000002");
        assert_eq!(counter.current(), "0000002");

        let mut counter = MemorySequence::starting_at(9_999_999);
        assert_eq!(counter.current(), "9999999");
        // past seven digits the number simply grows wider
        assert_eq!(counter.increment_and_get(), "10000000");
    }
}
