use std::cell::RefCell;
use std::rc::Rc;

/// A shared, mutable cell for handing a live value across an ownership
/// boundary: one holder creates it, clones of the handle read or overwrite
/// the same value. There is no change notification; observers read on their
/// own schedule.
#[derive(Debug, Default)]
pub struct SharedRef<T> {
    inner: Rc<RefCell<T>>,
}

impl<T> SharedRef<T> {
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(value)),
        }
    }

    /// Overwrite the stored value.
    pub fn set(&self, value: T) {
        *self.inner.borrow_mut() = value;
    }

    /// Swap in a new value and return the old one.
    pub fn replace(&self, value: T) -> T {
        self.inner.replace(value)
    }

    /// Read through a closure without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow())
    }

    /// Mutate in place through a closure.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        f(&mut self.inner.borrow_mut())
    }
}

impl<T: Clone> SharedRef<T> {
    /// Clone the stored value out.
    pub fn get(&self) -> T {
        self.inner.borrow().clone()
    }
}

// Manual impl: a handle is cloneable regardless of whether T is.
impl<T> Clone for SharedRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_observe_each_others_writes() {
        let parent = SharedRef::new(10);
        let child = parent.clone();

        child.set(42);
        assert_eq!(parent.get(), 42);

        parent.with_mut(|v| *v += 1);
        assert_eq!(child.get(), 43);
    }

    #[test]
    fn replace_returns_the_previous_value() {
        let cell = SharedRef::new("before".to_string());
        assert_eq!(cell.replace("after".to_string()), "before");
        assert_eq!(cell.get(), "after");
    }

    #[test]
    fn with_reads_without_consuming() {
        let cell = SharedRef::new(vec![1, 2, 3]);
        let len = cell.with(|v| v.len());
        assert_eq!(len, 3);
        assert_eq!(cell.get(), vec![1, 2, 3]);
    }
}
