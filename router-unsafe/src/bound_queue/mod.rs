//! A fixed-capacity ring buffer FIFO queue, generic over its backing storage.

pub mod stack;

use core::fmt;

/// Backing storage a [`BoundedQueue`] can be built on top of.
///
/// # Safety
/// Implementors must guarantee that every `idx < capacity()` is a distinct, stable
/// storage slot for the lifetime of the container.
pub trait Queueable {
    type Item;

    fn capacity(&self) -> usize;

    /// # Safety
    /// The caller must ensure `idx` is in bounds and the slot is initialized.
    unsafe fn get_unchecked(&self, idx: usize) -> &Self::Item;

    /// # Safety
    /// The caller must ensure `idx` is in bounds and the slot is initialized.
    unsafe fn get_mut_unchecked(&mut self, idx: usize) -> &mut Self::Item;

    /// # Safety
    /// The caller must ensure `idx` is in bounds and the slot is initialized; the slot
    /// is left logically uninitialized afterward.
    unsafe fn read_unchecked(&mut self, idx: usize) -> Self::Item;

    /// # Safety
    /// The caller must ensure `idx` is in bounds and not currently initialized.
    unsafe fn write_unchecked(&mut self, idx: usize, item: Self::Item);
}

pub(crate) struct BoundedQueue<Q>
where
    Q: Queueable,
{
    queue: Q,
    head: usize,
    len: usize,
}

impl<Q> BoundedQueue<Q>
where
    Q: Queueable,
{
    const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == self.queue.capacity()
    }

    const fn len(&self) -> usize {
        self.len
    }

    fn front(&self) -> Option<&Q::Item> {
        (!self.is_empty()).then(|| unsafe { self.queue.get_unchecked(self.head) })
    }

    fn front_mut(&mut self) -> Option<&mut Q::Item> {
        (!self.is_empty()).then(|| unsafe { self.queue.get_mut_unchecked(self.head) })
    }

    fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    fn pop_front(&mut self) -> Option<Q::Item> {
        if self.is_empty() {
            return None;
        }

        let idx = self.head;
        self.head = self.wrap(self.head + 1);
        self.len -= 1;

        Some(unsafe { self.queue.read_unchecked(idx) })
    }

    fn truncate(&mut self, n: usize) {
        while self.len > n {
            self.pop_front();
        }
    }

    fn push_back(&mut self, item: Q::Item) -> Result<(), PushError<Q::Item>> {
        if self.is_full() {
            return Err(PushError(item));
        }

        let idx = self.wrap(self.head + self.len);
        unsafe { self.queue.write_unchecked(idx, item) };
        self.len += 1;
        Ok(())
    }

    const fn iter(&self) -> Iter<'_, Q> {
        Iter {
            queue: &self.queue,
            head: self.head,
            remaining: self.len,
        }
    }

    fn wrap(&self, idx: usize) -> usize {
        let cap = self.queue.capacity();
        if idx >= cap {
            idx - cap
        } else {
            idx
        }
    }
}

impl<Q> fmt::Debug for BoundedQueue<Q>
where
    Q: Queueable,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundedQueue(len = {})", self.len)
    }
}

impl<Q> Drop for BoundedQueue<Q>
where
    Q: Queueable,
{
    fn drop(&mut self) {
        self.clear();
    }
}

pub struct PushError<T>(T);

impl<T> PushError<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for PushError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PushError(..)")
    }
}

#[must_use = "iterator adaptors are lazy and do nothing unless consumed"]
#[derive(Clone)]
pub struct Iter<'a, Q>
where
    Q: Queueable,
{
    queue: &'a Q,
    head: usize,
    remaining: usize,
}

impl<'a, Q> Iterator for Iter<'a, Q>
where
    Q: Queueable,
{
    type Item = &'a Q::Item;

    fn next(&mut self) -> Option<&'a Q::Item> {
        if self.remaining == 0 {
            return None;
        }

        let item = unsafe { self.queue.get_unchecked(self.head) };

        let cap = self.queue.capacity();
        self.head = if self.head + 1 >= cap { 0 } else { self.head + 1 };
        self.remaining -= 1;

        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
