//! Growable array with an explicit growth policy.
//!
//! [`Vector`] wraps a `Vec` but controls when the backing storage grows and
//! shrinks: capacity doubles starting from [`MIN_CAPACITY`], and storage is
//! only released by an explicit [`Vector::shrink_to_fit`]. Node lists, clause
//! scratch buffers and cone collections all reuse their allocations this way.

use std::ops::{Index, IndexMut};

/// Smallest non-zero capacity of a [`Vector`].
pub const MIN_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vector<T> {
    data: Vec<T>,
}

impl<T> Vector<T> {
    /// Create an empty vector without allocating.
    pub const fn new() -> Self {
        Self { data: Vec::new() }
    }

    /// Create an empty vector holding at least `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity.max(MIN_CAPACITY)),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Make room for at least `capacity` elements, doubling if needed.
    pub fn grow(&mut self, capacity: usize) {
        let current = self.data.capacity();
        if capacity <= current {
            return;
        }
        let target = capacity.max(current * 2).max(MIN_CAPACITY);
        self.data.reserve_exact(target - self.data.len());
    }

    pub fn push(&mut self, value: T) {
        if self.data.len() == self.data.capacity() {
            self.grow(self.data.len() + 1);
        }
        self.data.push(value);
    }

    /// Remove the last element. The backing storage is kept.
    pub fn pop(&mut self) -> Option<T> {
        self.data.pop()
    }

    pub fn last(&self) -> Option<&T> {
        self.data.last()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.data.get(index)
    }
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.data.get_mut(index)
    }

    /// Remove all elements, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Shorten to `len` elements, keeping the allocation.
    pub fn truncate(&mut self, len: usize) {
        self.data.truncate(len);
    }

    /// Release all capacity beyond the current length.
    pub fn shrink_to_fit(&mut self) {
        self.data.shrink_to_fit();
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<T> {
        self.data
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<usize> for Vector<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for Vector<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Vector::new();
        v.extend(iter);
        v
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_capacity() {
        let mut v = Vector::new();
        assert_eq!(v.capacity(), 0);
        v.push(1);
        assert!(v.capacity() >= MIN_CAPACITY);

        let v = Vector::<u8>::with_capacity(3);
        assert!(v.capacity() >= MIN_CAPACITY);
    }

    #[test]
    fn test_doubling() {
        let mut v = Vector::new();
        for i in 0..MIN_CAPACITY {
            v.push(i);
        }
        let cap = v.capacity();
        v.push(MIN_CAPACITY);
        assert!(v.capacity() >= 2 * cap);
        assert_eq!(v.len(), MIN_CAPACITY + 1);
        assert_eq!(v[MIN_CAPACITY], MIN_CAPACITY);
    }

    #[test]
    fn test_pop_keeps_storage() {
        let mut v: Vector<u32> = (0..40).collect();
        let cap = v.capacity();
        while v.pop().is_some() {}
        assert!(v.is_empty());
        assert_eq!(v.capacity(), cap);

        v.extend(0..10);
        v.truncate(2);
        assert_eq!(v.as_slice(), &[0, 1]);
        assert_eq!(v.capacity(), cap);

        v.shrink_to_fit();
        assert!(v.capacity() < cap);
        assert_eq!(v.as_slice(), &[0, 1]);
    }

    #[test]
    fn test_index_mut() {
        let mut v: Vector<u32> = (0..3).collect();
        v[1] = 10;
        assert_eq!(v.get(1), Some(&10));
        assert_eq!(v.get(3), None);
        assert_eq!(v.last(), Some(&2));
    }
}
