//! Fixed-capacity sample buffering.

/// Absorbs arbitrary-length input blocks until a full window is available.
///
/// A completed window's storage is moved out to the caller and the
/// internal buffer starts over empty, so a returned window is never
/// aliased by later feeds.
pub struct SampleAccumulator<T> {
    buffer: Vec<T>,
    capacity: usize,
}

impl<T: Copy> SampleAccumulator<T> {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "window capacity must be positive");
        Self {
            buffer: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append as many samples as fit and return how many were taken.
    ///
    /// The consumed count never exceeds the remaining room, so callers
    /// should offer the unconsumed tail of the block again on the next
    /// call. The window is returned as soon as the buffer reaches
    /// capacity.
    pub fn feed(&mut self, block: &[T]) -> (usize, Option<Vec<T>>) {
        let room = self.capacity - self.buffer.len();
        let consumed = block.len().min(room);
        self.buffer.extend_from_slice(&block[..consumed]);

        if self.buffer.len() == self.capacity {
            let window =
                std::mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
            (consumed, Some(window))
        } else {
            (consumed, None)
        }
    }

    /// Number of samples currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn fills_in_one_call() {
        let mut acc = SampleAccumulator::new(4);
        let (consumed, window) = acc.feed(&[1, 2, 3, 4]);
        assert_eq!(consumed, 4);
        assert_eq!(window, Some(vec![1, 2, 3, 4]));
        assert_eq!(acc.buffered(), 0);
    }

    #[test]
    fn oversized_block_is_claimed_up_to_capacity() {
        let mut acc = SampleAccumulator::new(4);
        let block = [1, 2, 3, 4, 5, 6];
        let (consumed, window) = acc.feed(&block);
        assert_eq!(consumed, 4);
        assert_eq!(window, Some(vec![1, 2, 3, 4]));

        // The caller re-offers the tail.
        let (consumed, window) = acc.feed(&block[consumed..]);
        assert_eq!(consumed, 2);
        assert_eq!(window, None);
        assert_eq!(acc.buffered(), 2);
    }

    #[test]
    fn returned_window_is_not_aliased_by_later_feeds() {
        let mut acc = SampleAccumulator::new(2);
        let (_, window) = acc.feed(&[7, 8]);
        let window = window.unwrap();
        let (_, next) = acc.feed(&[9, 10]);
        assert_eq!(window, vec![7, 8]);
        assert_eq!(next, Some(vec![9, 10]));
    }

    proptest! {
        /// Any partition of one capacity's worth of samples yields
        /// exactly one window with the samples in order.
        #[test]
        fn partition_invariance(mut cuts in prop::collection::vec(0usize..=64, 0..8)) {
            let data: Vec<u32> = (0..64).collect();
            cuts.sort_unstable();
            cuts.push(data.len());

            let mut acc = SampleAccumulator::new(data.len());
            let mut windows = Vec::new();
            let mut start = 0;
            for &cut in &cuts {
                let mut block = &data[start..cut];
                while !block.is_empty() {
                    let (consumed, window) = acc.feed(block);
                    prop_assert!(consumed > 0);
                    if let Some(window) = window {
                        windows.push(window);
                    }
                    block = &block[consumed..];
                }
                start = cut;
            }

            prop_assert_eq!(windows.len(), 1);
            prop_assert_eq!(&windows[0], &data);
        }

        /// The consumed count is bounded by both the block length and
        /// the remaining room.
        #[test]
        fn consumed_never_exceeds_room(
            blocks in prop::collection::vec(prop::collection::vec(0u32..100, 0..50), 1..10),
        ) {
            let capacity = 37;
            let mut acc = SampleAccumulator::new(capacity);
            for block in &blocks {
                let buffered = acc.buffered();
                let (consumed, window) = acc.feed(block);
                prop_assert!(consumed <= block.len());
                prop_assert!(consumed <= capacity - buffered);
                if window.is_some() {
                    prop_assert_eq!(acc.buffered(), 0);
                } else {
                    prop_assert_eq!(acc.buffered(), buffered + consumed);
                }
            }
        }
    }
}
