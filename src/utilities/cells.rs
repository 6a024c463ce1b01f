// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cell types for sharing driver state from `&self` methods.

use core::cell::Cell;

/// An [`OptionalCell`] is a `Cell` that wraps an `Option`.
///
/// This is a helper type that makes keeping types that can be `None` a
/// little cleaner.
pub struct OptionalCell<T: Copy> {
    value: Cell<Option<T>>,
}

impl<T: Copy> OptionalCell<T> {
    /// Create an empty `OptionalCell` (contains just `None`).
    pub const fn empty() -> OptionalCell<T> {
        OptionalCell {
            value: Cell::new(None),
        }
    }

    /// Update the stored value.
    pub fn set(&self, val: T) {
        self.value.set(Some(val));
    }

    /// Reset the stored value to `None`.
    pub fn clear(&self) {
        self.value.set(None);
    }

    /// Check if the cell contains something.
    pub fn is_some(&self) -> bool {
        self.value.get().is_some()
    }

    /// Check if the cell is `None`.
    pub fn is_none(&self) -> bool {
        self.value.get().is_none()
    }

    /// Return the contained value, leaving the cell unchanged.
    pub fn get(&self) -> Option<T> {
        self.value.get()
    }

    /// Return the contained value and replace it with `None`.
    pub fn take(&self) -> Option<T> {
        self.value.take()
    }

    /// Call a closure on the value if the value exists.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(T) -> R,
    {
        self.value.get().map(closure)
    }
}

/// A shared reference to a mutable reference.
///
/// A [`TakeCell`] wraps a potential reference to mutable memory that may be
/// available at a given point. Rather than enforcing borrow rules at
/// compile-time, `TakeCell` enables multiple clients to hold references to
/// it, but ensures that only one referrer has access to the underlying
/// mutable reference at a time. Clients either move the memory out of the
/// `TakeCell` or operate on a borrow within a closure.
pub struct TakeCell<'a, T: 'a + ?Sized> {
    val: Cell<Option<&'a mut T>>,
}

impl<'a, T: ?Sized> TakeCell<'a, T> {
    pub const fn empty() -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(None),
        }
    }

    /// Create a new `TakeCell` containing `value`.
    pub const fn new(value: &'a mut T) -> TakeCell<'a, T> {
        TakeCell {
            val: Cell::new(Some(value)),
        }
    }

    pub fn is_none(&self) -> bool {
        let inner = self.take();
        let result = inner.is_none();
        self.val.set(inner);
        result
    }

    pub fn is_some(&self) -> bool {
        !self.is_none()
    }

    /// Take the mutable reference out of the `TakeCell`, leaving a `None` in
    /// its place. If the value has already been taken elsewhere (and not
    /// `replace`d), the returned `Option` is empty.
    pub fn take(&self) -> Option<&'a mut T> {
        self.val.replace(None)
    }

    /// Store `val` in the `TakeCell`.
    pub fn put(&self, val: Option<&'a mut T>) {
        self.val.replace(val);
    }

    /// Replace the contents of the `TakeCell` with `val`. If the cell was
    /// not empty, the previous value is returned, otherwise `None` is
    /// returned.
    pub fn replace(&self, val: &'a mut T) -> Option<&'a mut T> {
        self.val.replace(Some(val))
    }

    /// Allow `closure` to borrow the contents of the `TakeCell`
    /// if-and-only-if it is not `take`n already. The state of the `TakeCell`
    /// is unchanged after the closure completes.
    pub fn map<F, R>(&self, closure: F) -> Option<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        match self.take() {
            Some(val) => {
                let res = closure(val);
                self.val.replace(Some(val));
                Some(res)
            }
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_cell_single_referrer() {
        let mut value = 1234;
        let cell = TakeCell::new(&mut value);
        assert!(cell.is_some());
        let taken = cell.take();
        assert_eq!(taken.map(|v| *v), Some(1234));
        assert!(cell.take().is_none());
    }

    #[test]
    fn optional_cell_map() {
        let cell: OptionalCell<u32> = OptionalCell::empty();
        assert_eq!(cell.map(|v| v + 1), None);
        cell.set(41);
        assert_eq!(cell.map(|v| v + 1), Some(42));
        assert!(cell.is_some());
    }
}
