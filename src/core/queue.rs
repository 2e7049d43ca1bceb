use std::cmp::Ordering;
use std::collections::VecDeque;

use crate::error::SchedError;

/// Total order over handles, resolved through the store the handles point into.
///
/// `Less` means `a` ranks ahead of `b`. Anything else means `b` is not
/// behind `a`; callers must not rely on `Equal` being returned for ties.
pub trait Comparator<H> {
    type Store: ?Sized;

    fn compare(&self, store: &Self::Store, a: &H, b: &H) -> Ordering;
}

// Handles kept sorted under `C`. Removal by value uses handle equality.
#[derive(Debug)]
pub struct OrderedQueue<H, C> {
    items: VecDeque<H>,
    cmp: C,
}

impl<H, C: Comparator<H>> OrderedQueue<H, C> {
    pub fn new(cmp: C) -> Self {
        Self {
            items: VecDeque::new(),
            cmp,
        }
    }

    pub fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Insert `handle` before the first occupant it strictly outranks.
    ///
    /// Occupants that compare equal keep their place ahead of the newcomer.
    /// Returns the index the handle landed at.
    pub fn offer(&mut self, handle: H, store: &C::Store) -> Result<usize, SchedError> {
        self.items.try_reserve(1)?;

        let index = self
            .items
            .iter()
            .position(|existing| self.cmp.compare(store, &handle, existing) == Ordering::Less)
            .unwrap_or(self.items.len());

        self.items.insert(index, handle);
        Ok(index)
    }

    pub fn peek(&self) -> Option<&H> {
        self.items.front()
    }

    pub fn poll(&mut self) -> Option<H> {
        self.items.pop_front()
    }

    pub fn at(&self, index: usize) -> Option<&H> {
        self.items.get(index)
    }

    pub fn remove_at(&mut self, index: usize) -> Option<H> {
        self.items.remove(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &H> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// No handle is ranked strictly ahead of the handle in front of it.
    pub fn is_sorted(&self, store: &C::Store) -> bool {
        self.items
            .iter()
            .zip(self.items.iter().skip(1))
            .all(|(front, back)| self.cmp.compare(store, back, front) != Ordering::Less)
    }

    /// Stable re-sort, for when the keys the comparator reads have changed
    /// underneath the queue.
    ///
    /// Only valid for comparators that form a total order.
    pub fn resort(&mut self, store: &C::Store) {
        let cmp = &self.cmp;
        self.items
            .make_contiguous()
            .sort_by(|a, b| cmp.compare(store, a, b));
    }
}

impl<H: PartialEq, C: Comparator<H>> OrderedQueue<H, C> {
    /// Remove every handle equal to `value`, keeping survivors in order.
    pub fn remove_all(&mut self, value: &H) -> usize {
        let before = self.items.len();
        self.items.retain(|h| h != value);
        before - self.items.len()
    }
}
