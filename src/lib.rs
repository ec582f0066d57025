//! A double-ended queue stored as a chain of fixed-size blocks.
//!
//! [`Deque`] offers amortized O(1) insertion and removal at both ends,
//! positional access whose cost grows only with the distance from the nearer
//! end, in-place mutation by index, rotation, and an optional bounded mode in
//! which every insertion that overflows the bound evicts an element from the
//! opposite end.
//!
//! ```
//! use chaindeque::Deque;
//!
//! let mut dq = Deque::new();
//! for i in 0..5 {
//!     dq.append(i);
//! }
//! assert_eq!(dq.pop_left(), Ok(0));
//! assert_eq!(dq.get(2), Ok(&3));
//! dq.set(2, 9).unwrap();
//! dq.rotate(-2);
//! assert_eq!(dq.to_string(), "Deque{9, 4, 1, 2}");
//! ```

mod block;
mod error;

use core::{
    fmt,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    ops::{Index, IndexMut},
};

use tracing::{debug, trace};

use crate::block::{BlockChain, BlockId, Side};
pub use crate::block::{BLOCK_CENTER, BLOCK_LEN};
pub use crate::error::DequeError;

/// Rendering lists every element of a deque at most this long.
const RENDER_FULL_MAX: usize = 10;
/// Longer deques render this many leading elements followed by `...`.
const RENDER_PREFIX: usize = 9;

pub struct Deque<T> {
    chain: BlockChain<T>,
    left: BlockId,
    right: BlockId,
    /// First occupied slot of the left block.
    left_idx: usize,
    /// One past the last occupied slot of the right block.
    right_end: usize,
    len: usize,
    max_len: Option<usize>,
}

impl<T> Deque<T> {
    /// Creates an empty, unbounded deque.
    pub fn new() -> Self {
        let (chain, block) = BlockChain::new();
        Self {
            chain,
            left: block,
            right: block,
            left_idx: BLOCK_CENTER + 1,
            right_end: BLOCK_CENTER + 1,
            len: 0,
            max_len: None,
        }
    }

    /// Creates an empty deque that never holds more than `max_len` elements.
    ///
    /// Once full, [`append`](Self::append) discards the leftmost element and
    /// [`append_left`](Self::append_left) discards the rightmost one.
    pub fn bounded(max_len: usize) -> Result<Self, DequeError> {
        if max_len == 0 {
            debug!("rejected bounded deque with zero capacity");
            return Err(DequeError::InvalidArgument("max_len must be greater than zero"));
        }
        debug!(max_len, "created bounded deque");
        let mut this = Self::new();
        this.max_len = Some(max_len);
        Ok(this)
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bound given to [`bounded`](Self::bounded), if any.
    #[inline]
    pub const fn max_len(&self) -> Option<usize> {
        self.max_len
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.max_len == Some(self.len)
    }

    /// Appends `item` to the right end.
    #[inline]
    pub fn append(&mut self, item: T) {
        self.push_back_raw(item);
        if self.over_capacity() {
            trace!(side = ?Side::Left, "evicting from bounded deque");
            drop(self.pop_front_raw());
        }
    }

    /// Appends `item` to the left end.
    #[inline]
    pub fn append_left(&mut self, item: T) {
        self.push_front_raw(item);
        if self.over_capacity() {
            trace!(side = ?Side::Right, "evicting from bounded deque");
            drop(self.pop_back_raw());
        }
    }

    /// Removes and returns the rightmost element.
    #[inline]
    pub fn pop(&mut self) -> Result<T, DequeError> {
        self.pop_back_raw().ok_or(DequeError::Empty)
    }

    /// Removes and returns the leftmost element.
    #[inline]
    pub fn pop_left(&mut self) -> Result<T, DequeError> {
        self.pop_front_raw().ok_or(DequeError::Empty)
    }

    #[inline]
    pub fn front(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: a non-empty deque has an initialized slot at `left_idx`
            // of the left block.
            Some(unsafe { self.chain.block(self.left).slots[self.left_idx].assume_init_ref() })
        }
    }

    #[inline]
    pub fn back(&self) -> Option<&T> {
        if self.is_empty() {
            None
        } else {
            // SAFETY: a non-empty deque has an initialized slot just before
            // `right_end` in the right block.
            Some(unsafe { self.chain.block(self.right).slots[self.right_end - 1].assume_init_ref() })
        }
    }

    /// Returns the element at `index`, counted from the left end.
    pub fn get(&self, index: usize) -> Result<&T, DequeError> {
        self.check_index(index)?;
        let (block, offset) = self.locate(index);
        // SAFETY: `locate` maps an in-bounds index to an occupied slot.
        Ok(unsafe { self.chain.block(block).slots[offset].assume_init_ref() })
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut T, DequeError> {
        self.check_index(index)?;
        let (block, offset) = self.locate(index);
        // SAFETY: `locate` maps an in-bounds index to an occupied slot.
        Ok(unsafe { self.chain.block_mut(block).slots[offset].assume_init_mut() })
    }

    /// Overwrites the element at `index`, dropping the previous value.
    pub fn set(&mut self, index: usize, value: T) -> Result<(), DequeError> {
        *self.get_mut(index)? = value;
        Ok(())
    }

    /// Rotates the deque `n` steps to the right, or `-n` steps to the left
    /// when `n` is negative. Rotating by any multiple of `len` is a no-op.
    pub fn rotate(&mut self, n: isize) {
        if self.len <= 1 || n == 0 {
            return;
        }
        let len = self.len;
        let steps = n.unsigned_abs() % len;
        let right = if n > 0 { steps } else { (len - steps) % len };

        // Go whichever way moves fewer elements.
        if right <= len / 2 {
            for _ in 0..right {
                if let Some(item) = self.pop_back_raw() {
                    self.push_front_raw(item);
                }
            }
        } else {
            for _ in 0..len - right {
                if let Some(item) = self.pop_front_raw() {
                    self.push_back_raw(item);
                }
            }
        }
    }

    /// Drops every element and releases every block but one.
    pub fn clear(&mut self) {
        while self.pop_back_raw().is_some() {}
    }

    /// Renders the deque as `Deque{e0, e1, ...}`; see the [`Display`](fmt::Display) impl.
    pub fn render(&self) -> String
    where
        T: fmt::Debug,
    {
        self.to_string()
    }

    #[inline]
    fn over_capacity(&self) -> bool {
        matches!(self.max_len, Some(max) if self.len > max)
    }

    #[inline]
    fn check_index(&self, index: usize) -> Result<(), DequeError> {
        if index < self.len {
            Ok(())
        } else {
            Err(DequeError::IndexOutOfRange { index, len: self.len })
        }
    }

    #[inline]
    fn push_back_raw(&mut self, item: T) {
        if self.right_end == BLOCK_LEN {
            self.right = self.chain.link(self.right, Side::Right);
            self.right_end = 0;
        }
        self.chain.block_mut(self.right).slots[self.right_end].write(item);
        self.right_end += 1;
        self.len += 1;
    }

    #[inline]
    fn push_front_raw(&mut self, item: T) {
        if self.left_idx == 0 {
            self.left = self.chain.link(self.left, Side::Left);
            self.left_idx = BLOCK_LEN;
        }
        self.left_idx -= 1;
        self.chain.block_mut(self.left).slots[self.left_idx].write(item);
        self.len += 1;
    }

    #[inline]
    fn pop_back_raw(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.right_end -= 1;
        // SAFETY: the slot before the old `right_end` was occupied, and moving
        // the cursor past it means it is never read again.
        let item = unsafe { self.chain.block(self.right).slots[self.right_end].assume_init_read() };
        self.len -= 1;

        if self.len == 0 {
            self.recenter();
        } else if self.right_end == 0 {
            // with elements left and the right block drained, there is a block to its left
            self.right = self.chain.unlink(self.right, Side::Right);
            self.right_end = BLOCK_LEN;
        }
        Some(item)
    }

    #[inline]
    fn pop_front_raw(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        // SAFETY: `left_idx` is occupied in a non-empty deque and the cursor
        // moves past it right after the read.
        let item = unsafe { self.chain.block(self.left).slots[self.left_idx].assume_init_read() };
        self.left_idx += 1;
        self.len -= 1;

        if self.len == 0 {
            self.recenter();
        } else if self.left_idx == BLOCK_LEN {
            self.left = self.chain.unlink(self.left, Side::Left);
            self.left_idx = 0;
        }
        Some(item)
    }

    /// Only called once the deque is empty, at which point the chain is down
    /// to a single block.
    #[inline]
    fn recenter(&mut self) {
        debug_assert_eq!(self.left, self.right);
        self.left_idx = BLOCK_CENTER + 1;
        self.right_end = BLOCK_CENTER + 1;
    }

    /// Picks the chain end with fewer whole blocks between it and `index`.
    /// Returns that end, the number of blocks to skip, and the slot offset in
    /// the target block.
    fn route(&self, index: usize) -> (Side, usize, usize) {
        debug_assert!(index < self.len);
        let from_left = self.left_idx + index;
        // distance from the last slot of the right block
        let from_right = (BLOCK_LEN - self.right_end) + (self.len - 1 - index);
        if from_left / BLOCK_LEN <= from_right / BLOCK_LEN {
            (Side::Left, from_left / BLOCK_LEN, from_left % BLOCK_LEN)
        } else {
            (Side::Right, from_right / BLOCK_LEN, BLOCK_LEN - 1 - from_right % BLOCK_LEN)
        }
    }

    /// Maps an in-bounds index to its block and slot.
    fn locate(&self, index: usize) -> (BlockId, usize) {
        let (from, hops, offset) = self.route(index);
        let (mut block, inward) = match from {
            Side::Left => (self.left, Side::Right),
            Side::Right => (self.right, Side::Left),
        };
        for _ in 0..hops {
            block = self.chain.neighbor(block, inward);
        }
        (block, offset)
    }

    #[inline]
    fn slots(&self) -> Slots<'_, T> {
        Slots { deque: self, block: Some(self.left), idx: self.left_idx, remaining: self.len }
    }
}

/// Left-to-right walk over the occupied slots, used by the trait impls below.
struct Slots<'a, T> {
    deque: &'a Deque<T>,
    block: Option<BlockId>,
    idx: usize,
    remaining: usize,
}

impl<'a, T> Iterator for Slots<'a, T> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        if self.idx == BLOCK_LEN {
            self.block = self.deque.chain.try_neighbor(self.block?, Side::Right);
            self.idx = 0;
        }
        let block = self.deque.chain.block(self.block?);
        // SAFETY: the first `len` slots walked from `left_idx` are all occupied.
        let item = unsafe { block.slots[self.idx].assume_init_ref() };
        self.idx += 1;
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> ExactSizeIterator for Slots<'a, T> {}

impl<'a, T> FusedIterator for Slots<'a, T> {}

impl<T> Drop for Deque<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for Deque<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        iter.into_iter().for_each(|item| self.append(item));
    }
}

impl<'a, T: 'a + Copy> Extend<&'a T> for Deque<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Deque<T> {
    #[inline]
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut this = Self::new();
        this.extend(iter);
        this
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(arr: [T; N]) -> Self {
        Self::from_iter(arr)
    }
}

impl<T: Clone> Clone for Deque<T> {
    fn clone(&self) -> Self {
        let mut this = Self::new();
        this.max_len = self.max_len;
        for item in self.slots() {
            this.push_back_raw(item.clone());
        }
        this
    }
}

/// Lists the elements left to right with their `Debug` representation. A
/// deque of more than ten elements shows only the first nine, then `...`.
impl<T: fmt::Debug> fmt::Display for Deque<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shown = if self.len > RENDER_FULL_MAX { RENDER_PREFIX } else { self.len };
        f.write_str("Deque{")?;
        for (i, item) in self.slots().take(shown).enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item:?}")?;
        }
        if shown < self.len {
            f.write_str(", ...")?;
        }
        f.write_str("}")
    }
}

impl<T: fmt::Debug> fmt::Debug for Deque<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl<T: PartialEq<U>, U> PartialEq<Deque<U>> for Deque<T> {
    fn eq(&self, other: &Deque<U>) -> bool {
        self.len == other.len && self.slots().zip(other.slots()).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for Deque<T> {
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        self.len == other.len() && self.slots().zip(other).all(|(a, b)| a == b)
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for Deque<T> {
    #[inline]
    fn eq(&self, other: &[U; N]) -> bool {
        self == other.as_slice()
    }
}

impl<T: Eq> Eq for Deque<T> {}

impl<T: Hash> Hash for Deque<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        self.slots().for_each(|t| t.hash(state));
    }
}

impl<T> Index<usize> for Deque<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &Self::Output {
        self.get(index).expect("Out of bounds access")
    }
}

impl<T> IndexMut<usize> for Deque<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.get_mut(index).expect("Out of bounds access")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference walk: always from the left end.
    fn locate_from_left<T>(dq: &Deque<T>, index: usize) -> (BlockId, usize) {
        let pos = dq.left_idx + index;
        let mut block = dq.left;
        for _ in 0..pos / BLOCK_LEN {
            block = dq.chain.neighbor(block, Side::Right);
        }
        (block, pos % BLOCK_LEN)
    }

    /// Blocks between `block` and the end of the chain on `side`.
    fn hops_to_end<T>(dq: &Deque<T>, mut block: BlockId, side: Side) -> usize {
        let mut hops = 0;
        while let Some(next) = dq.chain.try_neighbor(block, side) {
            block = next;
            hops += 1;
        }
        hops
    }

    fn assert_routes_from_nearer_end<T>(dq: &Deque<T>) {
        for index in 0..dq.len() {
            let (from, hops, offset) = dq.route(index);
            let (block, located_offset) = dq.locate(index);
            assert_eq!(offset, located_offset);
            let (taken, other) = match from {
                Side::Left => (hops_to_end(dq, block, Side::Left), hops_to_end(dq, block, Side::Right)),
                Side::Right => (hops_to_end(dq, block, Side::Right), hops_to_end(dq, block, Side::Left)),
            };
            assert_eq!(hops, taken, "index {index}");
            assert!(taken <= other, "index {index} walked {taken} blocks from {from:?}, {other} from the other end");
        }
    }

    #[test]
    fn new_deque_is_centered_in_one_block() {
        let dq = Deque::<i32>::new();
        assert_eq!(dq.chain.len(), 1);
        assert_eq!(dq.left, dq.right);
        assert_eq!(dq.left_idx, BLOCK_CENTER + 1);
        assert_eq!(dq.right_end, BLOCK_CENTER + 1);
    }

    #[test]
    fn blocks_are_linked_on_overflow_and_released_on_drain() {
        let mut dq = Deque::new();
        // the right half of the first block holds BLOCK_LEN - BLOCK_CENTER - 1 items
        for i in 0..BLOCK_LEN - BLOCK_CENTER - 1 {
            dq.append(i);
        }
        assert_eq!(dq.chain.len(), 1);
        dq.append(usize::MAX);
        assert_eq!(dq.chain.len(), 2);
        assert_eq!(dq.right_end, 1);

        for _ in 0..=BLOCK_CENTER + 1 {
            dq.append_left(0);
        }
        assert_eq!(dq.chain.len(), 3);
        assert_eq!(dq.left_idx, BLOCK_LEN - 1);

        dq.pop_left().unwrap();
        assert_eq!(dq.chain.len(), 2);
        assert_eq!(dq.left_idx, 0);

        dq.pop().unwrap();
        assert_eq!(dq.chain.len(), 1);
        assert_eq!(dq.right_end, BLOCK_LEN);
    }

    #[test]
    fn draining_recenters_the_last_block() {
        let mut dq = Deque::new();
        for i in 0..5 * BLOCK_LEN {
            dq.append(i);
        }
        while dq.pop_left().is_ok() {}
        assert_eq!(dq.chain.len(), 1);
        assert_eq!(dq.left_idx, BLOCK_CENTER + 1);
        assert_eq!(dq.right_end, BLOCK_CENTER + 1);

        for i in 0..3 {
            dq.append_left(i);
        }
        while dq.pop().is_ok() {}
        assert_eq!(dq.left_idx, BLOCK_CENTER + 1);
        assert_eq!(dq.right_end, BLOCK_CENTER + 1);
    }

    #[test]
    fn repeated_refill_does_not_drift() {
        let mut dq = Deque::new();
        for _ in 0..1000 {
            dq.append(1u8);
            dq.pop_left().unwrap();
        }
        assert_eq!(dq.chain.len(), 1);
        assert_eq!(dq.left_idx, BLOCK_CENTER + 1);
    }

    #[test]
    fn locate_matches_left_walk() {
        let mut dq = Deque::new();
        for i in 0..7 * BLOCK_LEN + 13 {
            if i % 3 == 0 {
                dq.append_left(i);
            } else {
                dq.append(i);
            }
        }
        for index in 0..dq.len() {
            assert_eq!(dq.locate(index), locate_from_left(&dq, index), "index {index}");
        }
    }

    #[test]
    fn locate_walks_from_the_nearer_end() {
        let centered: Deque<usize> = (0..10 * BLOCK_LEN).collect();
        assert_eq!(centered.left_idx, BLOCK_CENTER + 1);
        assert_routes_from_nearer_end(&centered);

        let mut skewed = Deque::new();
        for i in 0..9 * BLOCK_LEN + 5 {
            skewed.append_left(i);
        }
        for i in 0..BLOCK_LEN / 3 {
            skewed.append(i);
        }
        assert_ne!(skewed.left_idx, BLOCK_CENTER + 1);
        assert_routes_from_nearer_end(&skewed);

        for dq in [&centered, &skewed] {
            assert!(dq.chain.len() >= 8);
            for index in [dq.len() - 1, dq.len() - 2, dq.len() - BLOCK_LEN / 2] {
                let (from, hops, _) = dq.route(index);
                assert_eq!(from, Side::Right, "index {index}");
                assert!(hops <= 1, "index {index} walked {hops} blocks");
            }
            let (from, hops, _) = dq.route(1);
            assert_eq!((from, hops), (Side::Left, 0));
        }
    }

    #[test]
    fn rotate_keeps_cursor_invariants() {
        let mut dq: Deque<usize> = (0..3 * BLOCK_LEN).collect();
        dq.rotate(BLOCK_LEN as isize + 5);
        dq.rotate(-(2 * BLOCK_LEN as isize));
        assert!(dq.left_idx < BLOCK_LEN);
        assert!(dq.right_end > 0);
        assert_eq!(dq.len(), 3 * BLOCK_LEN);
        let total_slots = dq.chain.len() * BLOCK_LEN;
        assert_eq!(total_slots - dq.left_idx - (BLOCK_LEN - dq.right_end), dq.len());
    }

    #[test]
    fn clear_releases_all_but_one_block() {
        let mut dq: Deque<String> = (0..500).map(|i| i.to_string()).collect();
        assert!(dq.chain.len() > 1);
        dq.clear();
        assert!(dq.is_empty());
        assert_eq!(dq.chain.len(), 1);
        assert_eq!(dq.left_idx, BLOCK_CENTER + 1);
    }
}
