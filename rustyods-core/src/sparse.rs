//! Sparse, auto-growing indexed storage.
//!
//! `SparseVec` backs the rows of a table, the cells of a row and the column
//! styles of a table. Reads past the materialized tail return a shared blank
//! value; writes grow the storage only when the written value is not blank,
//! and trailing blanks are pruned after every mutation so the materialized
//! length is always one past the last non-blank element.

use crate::error::{Result, RustyodsError};

/// Values that have a designated "blank" state.
pub trait Blank: Default {
    fn is_blank(&self) -> bool;
}

impl<T> Blank for Option<T> {
    fn is_blank(&self) -> bool {
        self.is_none()
    }
}

/// Ordered, zero-indexed collection with an unbounded logical size.
#[derive(Clone, Debug)]
pub struct SparseVec<T> {
    items: Vec<T>,
    blank: T,
    limit: u32,
}

impl<T: Blank> SparseVec<T> {
    /// Create an empty sequence addressable on `[0, limit)`.
    pub fn new(limit: u32) -> Self {
        SparseVec {
            items: Vec::new(),
            blank: T::default(),
            limit,
        }
    }

    /// Number of addressable positions.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Number of positions actually stored.
    pub fn materialized_len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Value at `index`, or the blank value past the materialized tail.
    pub fn get(&self, index: u32) -> &T {
        self.items.get(index as usize).unwrap_or(&self.blank)
    }

    /// Mutable access to an already materialized position.
    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.items.get_mut(index as usize)
    }

    /// Store `value` at `index`.
    ///
    /// Writing a blank past the tail is a no-op; writing a blank over the last
    /// element prunes every trailing blank.
    pub fn set(&mut self, index: u32, value: T) -> Result<()> {
        self.check(index)?;
        let idx = index as usize;
        if idx < self.items.len() {
            let pruning = value.is_blank() && idx + 1 == self.items.len();
            self.items[idx] = value;
            if pruning {
                self.trim();
            }
        } else if !value.is_blank() {
            self.grow_to(idx);
            self.items.push(value);
        }
        Ok(())
    }

    /// Mutable access to `index`, back-filling blanks up to it.
    ///
    /// The returned slot may still be blank once the caller is done with it;
    /// callers that can leave it blank call [`SparseVec::trim`] afterwards.
    pub fn entry(&mut self, index: u32) -> Result<&mut T> {
        self.check(index)?;
        let idx = index as usize;
        if idx >= self.items.len() {
            self.grow_to(idx);
            self.items.push(T::default());
        }
        Ok(&mut self.items[idx])
    }

    /// Drop trailing blank values.
    pub fn trim(&mut self) {
        while self.items.last().is_some_and(Blank::is_blank) {
            self.items.pop();
        }
    }

    /// Remove the first `count` positions, shifting the rest down.
    ///
    /// Returns the removed values, padded with blanks when `count` exceeds the
    /// materialized length.
    pub fn take_front(&mut self, count: usize) -> Vec<T> {
        let stored = count.min(self.items.len());
        let mut taken: Vec<T> = self.items.drain(..stored).collect();
        taken.resize_with(count, T::default);
        self.trim();
        taken
    }

    /// Iterate over the materialized positions.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate over `(index, value)` pairs that are not blank.
    pub fn iter_non_blank(&self) -> impl Iterator<Item = (u32, &T)> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_blank())
            .map(|(i, v)| (i as u32, v))
    }

    fn check(&self, index: u32) -> Result<()> {
        if index >= self.limit {
            return Err(RustyodsError::IndexOutOfBounds {
                index,
                max: self.limit.saturating_sub(1),
            });
        }
        Ok(())
    }

    /// Back-fill blanks so that the next push lands at `idx`.
    fn grow_to(&mut self, idx: usize) {
        self.items.resize_with(idx, T::default);
    }
}

impl<T: Blank> Default for SparseVec<T> {
    fn default() -> Self {
        SparseVec::new(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq() -> SparseVec<Option<&'static str>> {
        SparseVec::new(1_000)
    }

    #[test]
    fn test_get_past_tail_is_blank() {
        let s = seq();
        assert_eq!(s.get(0), &None);
        assert_eq!(s.get(999), &None);
        assert_eq!(s.materialized_len(), 0);
    }

    #[test]
    fn test_set_back_fills() {
        let mut s = seq();
        s.set(5, Some("x")).unwrap();
        assert_eq!(s.materialized_len(), 6);
        assert_eq!(s.get(5), &Some("x"));
        assert!(s.iter().take(5).all(Option::is_none));
    }

    #[test]
    fn test_clear_last_prunes_all_trailing_blanks() {
        let mut s = seq();
        s.set(5, Some("x")).unwrap();
        s.set(5, None).unwrap();
        assert_eq!(s.materialized_len(), 0);
        assert!((0..10).all(|i| s.get(i).is_none()));

        s.set(1, Some("a")).unwrap();
        s.set(7, Some("b")).unwrap();
        s.set(7, None).unwrap();
        assert_eq!(s.materialized_len(), 2);
    }

    #[test]
    fn test_clear_middle_keeps_length() {
        let mut s = seq();
        s.set(1, Some("a")).unwrap();
        s.set(3, Some("b")).unwrap();
        s.set(1, None).unwrap();
        assert_eq!(s.materialized_len(), 4);
    }

    #[test]
    fn test_blank_past_tail_is_noop() {
        let mut s = seq();
        s.set(42, None).unwrap();
        assert_eq!(s.materialized_len(), 0);
    }

    #[test]
    fn test_out_of_bounds() {
        let mut s = seq();
        assert!(matches!(
            s.set(1_000, Some("x")),
            Err(RustyodsError::IndexOutOfBounds { index: 1000, max: 999 })
        ));
        assert!(s.entry(5_000).is_err());
    }

    #[test]
    fn test_entry_then_trim() {
        let mut s = seq();
        let _ = s.entry(9).unwrap();
        assert_eq!(s.materialized_len(), 10);
        s.trim();
        assert_eq!(s.materialized_len(), 0);

        *s.entry(2).unwrap() = Some("v");
        s.trim();
        assert_eq!(s.materialized_len(), 3);
    }

    #[test]
    fn test_take_front() {
        let mut s = seq();
        s.set(0, Some("a")).unwrap();
        s.set(2, Some("c")).unwrap();
        s.set(4, Some("e")).unwrap();
        let taken = s.take_front(3);
        assert_eq!(taken, vec![Some("a"), None, Some("c")]);
        assert_eq!(s.get(1), &Some("e"));
        assert_eq!(s.materialized_len(), 2);

        let padded = s.take_front(4);
        assert_eq!(padded.len(), 4);
        assert!(s.is_empty());
    }

    #[test]
    fn test_iter_non_blank() {
        let mut s = seq();
        s.set(3, Some("d")).unwrap();
        s.set(1, Some("b")).unwrap();
        let found: Vec<_> = s.iter_non_blank().map(|(i, v)| (i, *v)).collect();
        assert_eq!(found, vec![(1, Some("b")), (3, Some("d"))]);
    }
}
