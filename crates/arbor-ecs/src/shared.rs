//! Shared handles: live component state and identity-compared callbacks.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

/// Cloneable handle to a value that every holder observes live.
///
/// Component payloads are exposed through this handle: a write made through
/// one clone is visible through every other clone, including the one the
/// component's own callbacks hold.
pub struct Shared<T: ?Sized>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    /// Wrap a value.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self(Rc::new(RefCell::new(value)))
    }

    /// Replace the value, returning the old one.
    pub fn replace(&self, value: T) -> T {
        self.0.replace(value)
    }
}

impl<T: Clone> Shared<T> {
    /// Clone the current value out.
    #[must_use]
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: ?Sized> Shared<T> {
    pub(crate) fn from_rc(rc: Rc<RefCell<T>>) -> Self {
        Self(rc)
    }

    pub(crate) fn rc(&self) -> &Rc<RefCell<T>> {
        &self.0
    }

    /// Borrow the value immutably.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed mutably.
    #[must_use]
    pub fn read(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the value mutably.
    ///
    /// # Panics
    ///
    /// Panics if the value is currently borrowed.
    #[must_use]
    pub fn write(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Whether both handles point at the same value.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: ?Sized> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(value) => f.debug_tuple("Shared").field(&&*value).finish(),
            Err(_) => f.write_str("Shared(<borrowed>)"),
        }
    }
}

impl<T: Default> Default for Shared<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// A reference-counted callback compared by identity.
///
/// Two `Callback`s are equal only if they are clones of the same closure,
/// which is what makes accumulator deduplication meaningful for functions.
pub struct Callback<F: ?Sized>(Rc<F>);

impl<F: ?Sized> Callback<F> {
    /// Wrap an already type-erased closure.
    #[must_use]
    pub fn from_rc(rc: Rc<F>) -> Self {
        Self(rc)
    }
}

impl<F: ?Sized> Clone for Callback<F> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<F: ?Sized> PartialEq for Callback<F> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<F: ?Sized> Eq for Callback<F> {}

impl<F: ?Sized> Deref for Callback<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.0
    }
}

impl<F: ?Sized> fmt::Debug for Callback<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({:p})", Rc::as_ptr(&self.0).cast::<()>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_writes_are_visible_to_all_clones() {
        let a = Shared::new(vec![1, 2]);
        let b = a.clone();

        b.write().push(3);

        assert_eq!(*a.read(), vec![1, 2, 3]);
        assert!(a.ptr_eq(&b));
        assert!(!a.ptr_eq(&Shared::new(vec![1, 2, 3])));
    }

    #[test]
    fn test_callback_identity() {
        let rc: Rc<dyn Fn() -> i32> = Rc::new(|| 1);
        let a = Callback::from_rc(rc);
        let b = a.clone();
        let other_rc: Rc<dyn Fn() -> i32> = Rc::new(|| 1);
        let c = Callback::from_rc(other_rc);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!((*a)(), 1);
    }
}
