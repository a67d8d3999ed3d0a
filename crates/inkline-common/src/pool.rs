//! Fixed-capacity scratch buffers.
//!
//! Layout runs once per rendered frame, so the token and chunk buffers are
//! reserved up front and then only written into. A [`Pool`] never grows: a
//! push past its capacity fails with [`PoolFull`] and leaves the pool as it
//! was, so callers see an error rather than a silently truncated result.

use thiserror::Error;

/// Returned when a [`Pool`] has no room left for another element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("pool exhausted (capacity {capacity})")]
pub struct PoolFull {
    /// The capacity the pool was created with.
    pub capacity: usize,
}

/// A buffer with a hard capacity, reserved once at construction.
#[derive(Debug, Clone)]
pub struct Pool<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> Pool<T> {
    /// Reserve a pool that holds at most `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an element.
    ///
    /// # Errors
    ///
    /// Returns [`PoolFull`] when the pool already holds `capacity` elements.
    pub fn push(&mut self, item: T) -> Result<(), PoolFull> {
        if self.items.len() >= self.capacity {
            return Err(PoolFull {
                capacity: self.capacity,
            });
        }
        self.items.push(item);
        Ok(())
    }

    /// Drop every element, keeping the reservation.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Number of elements currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the pool holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maximum number of elements the pool accepts.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stored elements in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Stored elements, mutably.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_until_full() {
        let mut pool = Pool::with_capacity(2);
        assert!(pool.push(1).is_ok());
        assert!(pool.push(2).is_ok());
        assert_eq!(pool.push(3), Err(PoolFull { capacity: 2 }));
        assert_eq!(pool.as_slice(), &[1, 2]);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut pool = Pool::with_capacity(1);
        pool.push('a').unwrap();
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.capacity(), 1);
        assert!(pool.push('b').is_ok());
    }

    #[test]
    fn test_zero_capacity() {
        let mut pool: Pool<u8> = Pool::with_capacity(0);
        assert!(pool.push(0).is_err());
        assert!(pool.is_empty());
    }
}
