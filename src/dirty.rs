//! Dirty values and the dependency resolver that consumes them.
//!
//! A [`Dirty`] wraps a value together with a "modified since last consumed"
//! flag. Every write goes through a setter that raises the flag; the flag is
//! only lowered by [`Dirty::clean`] or by [`clean_all`], which is how derived
//! state (projection matrix, projection-view uniform) gets recomputed at most
//! once per frame no matter how many of its inputs changed.
//!
//! ```
//! use picker::dirty::{clean_all, Dirty};
//!
//! let mut fov = Dirty::new(45.0_f32);
//! let mut aspect = Dirty::new(1.0_f32);
//!
//! // Both inputs start dirty, so the combinator runs once.
//! let first = clean_all((&mut fov, &mut aspect), |(f, a)| f * a);
//! assert_eq!(first, Some(45.0));
//!
//! // Nothing changed since: no recompute.
//! assert!(clean_all((&mut fov, &mut aspect), |(f, a)| f * a).is_none());
//!
//! // One input changed: the combinator still sees every current value.
//! fov.set(60.0);
//! assert_eq!(clean_all((&mut fov, &mut aspect), |(f, a)| f * a), Some(60.0));
//! ```

/// A value paired with a modified flag.
///
/// The flag is set on construction and on every write. There is no public
/// mutable access to the value that bypasses the flag.
#[derive(Debug, Clone, PartialEq)]
pub struct Dirty<T> {
    value: T,
    dirty: bool,
}

impl<T: Default> Default for Dirty<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> Dirty<T> {
    /// Wrap `value`. The result is dirty until its first clean.
    pub const fn new(value: T) -> Self {
        Self { value, dirty: true }
    }

    /// Replace the stored value and mark it modified.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.dirty = true;
    }

    /// Mutate the stored value in place and mark it modified.
    pub fn modify<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        self.dirty = true;
        f(&mut self.value)
    }

    /// Current value. Does not touch the flag.
    pub const fn get(&self) -> &T {
        &self.value
    }

    /// Whether the value was written since the last clean.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Raise the flag without changing the value.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Run `f` on the current value and lower the flag, but only if dirty.
    ///
    /// Returns `f`'s result when it ran.
    pub fn clean<R>(&mut self, f: impl FnOnce(&T) -> R) -> Option<R> {
        if !self.dirty {
            return None;
        }
        let out = f(&self.value);
        self.dirty = false;
        Some(out)
    }
}

/// An ordered group of dirty inputs consumed together by [`clean_all`].
///
/// Implemented for tuples of two to four `&mut Dirty<_>`.
pub trait DirtySet {
    /// Shared view of every current value, in tuple order.
    type Values;

    /// Whether any member is dirty.
    fn any_dirty(&self) -> bool;

    /// Lower every member's flag, including ones that were already clean.
    fn clear_all(&mut self);

    /// Give up mutable access and borrow every current value.
    fn into_values(self) -> Self::Values;
}

macro_rules! impl_dirty_set {
    ($($name:ident: $ty:ident),+) => {
        impl<'a, $($ty),+> DirtySet for ($(&'a mut Dirty<$ty>,)+) {
            type Values = ($(&'a $ty,)+);

            fn any_dirty(&self) -> bool {
                let ($($name,)+) = self;
                false $(|| $name.dirty)+
            }

            fn clear_all(&mut self) {
                let ($($name,)+) = self;
                $($name.dirty = false;)+
            }

            fn into_values(self) -> Self::Values {
                let ($($name,)+) = self;
                ($(&$name.value,)+)
            }
        }
    };
}

impl_dirty_set!(a: A, b: B);
impl_dirty_set!(a: A, b: B, c: C);
impl_dirty_set!(a: A, b: B, c: C, d: D);

/// Resolve a dependency group.
///
/// If any input is dirty, every flag in the group is cleared and `f` is
/// invoked once with all current values; its result is returned. If no input
/// is dirty, `f` is never invoked and `None` is returned.
pub fn clean_all<S, R>(
    mut inputs: S,
    f: impl FnOnce(S::Values) -> R,
) -> Option<R>
where
    S: DirtySet,
{
    if !inputs.any_dirty() {
        return None;
    }
    inputs.clear_all();
    Some(f(inputs.into_values()))
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn new_value_is_dirty() {
        let value = Dirty::new(3);
        assert!(value.is_dirty());
        assert_eq!(*value.get(), 3);
    }

    #[test]
    fn clean_runs_once_per_dirty_run_with_latest_value() {
        let mut value = Dirty::new(1);
        value.set(2);
        value.set(7);

        let seen = Cell::new(Vec::new());
        let record = |v: &i32| {
            let mut all = seen.take();
            all.push(*v);
            seen.set(all);
        };

        assert!(value.clean(record).is_some());
        assert!(value.clean(record).is_none());
        assert!(!value.is_dirty());
        assert_eq!(seen.take(), vec![7]);
    }

    #[test]
    fn get_does_not_clear_flag() {
        let mut value = Dirty::new(1.5_f32);
        let _ = value.get();
        assert!(value.is_dirty());
        let _ = value.clean(|_| ());
        value.set(2.0);
        assert_eq!(*value.get(), 2.0);
        assert!(value.is_dirty());
    }

    #[test]
    fn mark_dirty_and_modify_raise_flag() {
        let mut value = Dirty::new(vec![1]);
        let _ = value.clean(|_| ());
        value.mark_dirty();
        assert!(value.is_dirty());

        let _ = value.clean(|_| ());
        value.modify(|v| v.push(2));
        assert!(value.is_dirty());
        assert_eq!(value.clean(Vec::len), Some(2));
    }

    #[test]
    fn clean_all_with_one_dirty_input_sees_all_values_and_clears_all() {
        let mut a = Dirty::new(1);
        let mut b = Dirty::new(10);
        let mut c = Dirty::new(100);
        let _ = clean_all((&mut a, &mut b, &mut c), |_| ());

        b.set(20);
        let sum = clean_all((&mut a, &mut b, &mut c), |(a, b, c)| a + b + c);
        assert_eq!(sum, Some(121));
        assert!(!a.is_dirty());
        assert!(!b.is_dirty());
        assert!(!c.is_dirty());
    }

    #[test]
    fn clean_all_without_dirty_inputs_never_invokes() {
        let mut a = Dirty::new(1);
        let mut b = Dirty::new(2);
        let _ = clean_all((&mut a, &mut b), |_| ());

        let calls = Cell::new(0);
        for _ in 0..3 {
            let _ = clean_all((&mut a, &mut b), |_| calls.set(calls.get() + 1));
        }
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn clean_all_runs_once_when_every_input_changed() {
        let mut a = Dirty::new(0);
        let mut b = Dirty::new(0);
        let mut c = Dirty::new(0);
        let mut d = Dirty::new(0);
        let _ = clean_all((&mut a, &mut b, &mut c, &mut d), |_| ());

        a.set(1);
        b.set(2);
        c.set(3);
        d.set(4);
        let calls = Cell::new(0);
        let product =
            clean_all((&mut a, &mut b, &mut c, &mut d), |(a, b, c, d)| {
                calls.set(calls.get() + 1);
                a * b * c * d
            });
        assert_eq!(product, Some(24));
        assert_eq!(calls.get(), 1);
    }
}
