//! Process sequence scheduler
//!
//! A fixed number of slots, each optionally holding a step, executed in
//! slot order once per cycle. A command can swap in a temporary chain (a
//! calibration, for example) with [`ProcessSequence::save_and_clear`] and
//! bring the previous chain back with [`ProcessSequence::restore`].
//!
//! Only one chain can be saved at a time. Saving twice or restoring with
//! nothing saved is reported as an error and changes nothing.

/// Number of slots in the sequence
pub const SEQUENCE_CAPACITY: usize = 10;

/// Slot contents of a whole sequence
pub type Slots<S> = [Option<S>; SEQUENCE_CAPACITY];

/// Rejected sequence operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// Slot index at or beyond [`SEQUENCE_CAPACITY`]
    IndexOutOfRange(u8),
    /// A saved chain is already outstanding
    AlreadySaved,
    /// Nothing to restore
    NothingSaved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode<S> {
    /// Running the base chain
    Normal,
    /// Running a temporary chain; `base` comes back on restore
    Temporary { base: Slots<S> },
}

/// Ordered, fixed-capacity chain of steps
#[derive(Debug, Clone)]
pub struct ProcessSequence<S> {
    slots: Slots<S>,
    mode: Mode<S>,
}

impl<S: Copy> Default for ProcessSequence<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Copy> ProcessSequence<S> {
    /// Create an empty sequence in normal mode
    pub const fn new() -> Self {
        Self {
            slots: [None; SEQUENCE_CAPACITY],
            mode: Mode::Normal,
        }
    }

    /// Execute every occupied slot in ascending order
    ///
    /// `execute` may rearrange the sequence. Each slot is read just before it
    /// runs, so a step installed behind the current index runs on the next
    /// call and one installed ahead of it runs in this one.
    pub fn run<F>(&mut self, mut execute: F)
    where
        F: FnMut(&mut Self, S),
    {
        for index in 0..SEQUENCE_CAPACITY {
            if let Some(step) = self.slots[index] {
                execute(self, step);
            }
        }
    }

    /// Empty every slot
    pub fn clear(&mut self) {
        self.slots = [None; SEQUENCE_CAPACITY];
    }

    /// Put `step` into slot `index`, or empty it with `None`
    pub fn set(&mut self, index: u8, step: Option<S>) -> Result<(), SequenceError> {
        let slot = self
            .slots
            .get_mut(index as usize)
            .ok_or(SequenceError::IndexOutOfRange(index))?;
        *slot = step;
        Ok(())
    }

    /// Empty the sequence and fill it from slot 0 with `steps`
    ///
    /// Steps beyond the last slot are ignored.
    pub fn fill<I>(&mut self, steps: I)
    where
        I: IntoIterator<Item = S>,
    {
        self.clear();
        for (slot, step) in self.slots.iter_mut().zip(steps) {
            *slot = Some(step);
        }
    }

    /// Put `step` into the first slot
    pub fn set_first(&mut self, step: S) {
        self.slots[0] = Some(step);
    }

    /// Put `step` into the last slot
    pub fn set_last(&mut self, step: S) {
        self.slots[SEQUENCE_CAPACITY - 1] = Some(step);
    }

    /// Step in slot `index`
    pub fn get(&self, index: u8) -> Option<S> {
        self.slots.get(index as usize).copied().flatten()
    }

    /// Save the current chain and start from an empty one
    pub fn save_and_clear(&mut self) -> Result<(), SequenceError> {
        if self.is_temporary() {
            return Err(SequenceError::AlreadySaved);
        }
        self.mode = Mode::Temporary { base: self.slots };
        self.clear();
        Ok(())
    }

    /// Bring back the chain saved by [`ProcessSequence::save_and_clear`]
    pub fn restore(&mut self) -> Result<(), SequenceError> {
        match self.mode {
            Mode::Temporary { base } => {
                self.slots = base;
                self.mode = Mode::Normal;
                Ok(())
            }
            Mode::Normal => Err(SequenceError::NothingSaved),
        }
    }

    /// Empty every slot and drop any saved chain
    pub fn reset(&mut self) {
        self.clear();
        self.mode = Mode::Normal;
    }

    /// Whether a temporary chain is running over a saved one
    pub fn is_temporary(&self) -> bool {
        matches!(self.mode, Mode::Temporary { .. })
    }

    /// Current slot contents
    pub fn slots(&self) -> &Slots<S> {
        &self.slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn executed(sequence: &mut ProcessSequence<char>) -> heapless::Vec<char, SEQUENCE_CAPACITY> {
        let mut seen = heapless::Vec::new();
        sequence.run(|_, step| seen.push(step).unwrap());
        seen
    }

    #[test]
    fn test_run_skips_empty_slots() {
        let mut sequence = ProcessSequence::new();
        sequence.set(0, Some('a')).unwrap();
        sequence.set(3, Some('b')).unwrap();
        sequence.set_last('z');

        assert_eq!(executed(&mut sequence).as_slice(), &['a', 'b', 'z']);
    }

    #[test]
    fn test_set_out_of_range() {
        let mut sequence = ProcessSequence::<char>::new();
        assert_eq!(
            sequence.set(10, Some('a')),
            Err(SequenceError::IndexOutOfRange(10))
        );
        assert!(sequence.slots().iter().all(Option::is_none));
        assert_eq!(sequence.get(200), None);
    }

    #[test]
    fn test_fill_replaces_chain() {
        let mut sequence = ProcessSequence::new();
        sequence.set(7, Some('z')).unwrap();
        sequence.fill(['a', 'b', 'c']);

        assert_eq!(sequence.slots()[..4], [Some('a'), Some('b'), Some('c'), None]);
        assert_eq!(sequence.get(7), None);

        sequence.fill(core::iter::repeat('x').take(SEQUENCE_CAPACITY + 3));
        assert!(sequence.slots().iter().all(|slot| *slot == Some('x')));
    }

    #[test]
    fn test_first_and_last_slots() {
        let mut sequence = ProcessSequence::new();
        sequence.set_first('a');
        sequence.set_last('z');
        assert_eq!(sequence.get(0), Some('a'));
        assert_eq!(sequence.get(SEQUENCE_CAPACITY as u8 - 1), Some('z'));
    }

    #[test]
    fn test_save_and_restore() {
        let mut sequence = ProcessSequence::new();
        sequence.set(0, Some('A')).unwrap();
        sequence.set(1, Some('B')).unwrap();
        sequence.set(2, Some('C')).unwrap();

        sequence.save_and_clear().unwrap();
        sequence.set(0, Some('D')).unwrap();
        assert_eq!(executed(&mut sequence).as_slice(), &['D']);

        sequence.restore().unwrap();
        assert_eq!(executed(&mut sequence).as_slice(), &['A', 'B', 'C']);
        assert!(!sequence.is_temporary());
    }

    #[test]
    fn test_double_save_rejected() {
        let mut sequence = ProcessSequence::new();
        sequence.set(0, Some('A')).unwrap();
        sequence.save_and_clear().unwrap();
        sequence.set(0, Some('D')).unwrap();

        assert_eq!(sequence.save_and_clear(), Err(SequenceError::AlreadySaved));
        assert_eq!(sequence.get(0), Some('D'));

        sequence.restore().unwrap();
        assert_eq!(sequence.get(0), Some('A'));
    }

    #[test]
    fn test_restore_without_save() {
        let mut sequence = ProcessSequence::new();
        sequence.set(4, Some('A')).unwrap();

        assert_eq!(sequence.restore(), Err(SequenceError::NothingSaved));
        assert_eq!(sequence.get(4), Some('A'));
    }

    #[test]
    fn test_reset_drops_saved_chain() {
        let mut sequence = ProcessSequence::new();
        sequence.set(0, Some('A')).unwrap();
        sequence.save_and_clear().unwrap();
        sequence.set(0, Some('D')).unwrap();

        sequence.reset();
        assert!(!sequence.is_temporary());
        assert!(executed(&mut sequence).is_empty());
        assert_eq!(sequence.restore(), Err(SequenceError::NothingSaved));
    }

    #[test]
    fn test_step_can_replace_chain_mid_run() {
        let mut sequence = ProcessSequence::new();
        sequence.set(0, Some('a')).unwrap();
        sequence.set_last('!');

        let mut seen = heapless::Vec::<char, 16>::new();
        sequence.run(|sequence, step| {
            seen.push(step).unwrap();
            if step == '!' {
                sequence.clear();
                sequence.set(0, Some('x')).unwrap();
                sequence.set(1, Some('y')).unwrap();
            }
        });
        assert_eq!(seen.as_slice(), &['a', '!']);

        assert_eq!(executed(&mut sequence).as_slice(), &['x', 'y']);
    }
}
