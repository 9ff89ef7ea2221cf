use core::fmt;
use core::iter::FusedIterator;
use core::mem::ManuallyDrop;
use core::ptr;
use core::slice;

use av_raw::RawBuffer;

use super::DynamicArray;

// -----------------------------------------------------------------------------
// IntoIter

/// An owning iterator over the elements of a [`DynamicArray`].
///
/// Elements not consumed are dropped together with the iterator.
///
/// # Examples
///
/// ```
/// use av_vec::dyn_array;
///
/// let array = dyn_array![String::from("a"), String::from("b")];
/// let mut iter = array.into_iter();
///
/// assert_eq!(iter.len(), 2);
/// assert_eq!(iter.next_back().as_deref(), Some("b"));
/// assert_eq!(iter.as_slice(), ["a"]);
/// ```
pub struct IntoIter<T> {
    buf: RawBuffer<T>,
    /// Slots `[head, tail)` are still live.
    head: usize,
    tail: usize,
}

impl<T> IntoIter<T> {
    /// Returns the remaining elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `[head, tail)` are live.
        unsafe { slice::from_raw_parts(self.buf.ptr_at(self.head), self.tail - self.head) }
    }

    /// Returns the remaining elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        let len = self.tail - self.head;
        // SAFETY: `[head, tail)` are live.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr_at_mut(self.head), len) }
    }
}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        // SAFETY: `[head, tail)` are live and never read again.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        // SAFETY: slot `head` is live and leaves the live range.
        let value = unsafe { self.buf.ptr_at(self.head).read() };
        self.head += 1;
        Some(value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.tail - self.head;
        (len, Some(len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    #[inline]
    fn next_back(&mut self) -> Option<T> {
        if self.head == self.tail {
            return None;
        }
        self.tail -= 1;
        // SAFETY: slot `tail` was live and left the live range.
        unsafe { Some(self.buf.ptr_at(self.tail).read()) }
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}

impl<T> IntoIterator for DynamicArray<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        let mut this = ManuallyDrop::new(self);
        IntoIter {
            buf: this.buf.take(),
            head: 0,
            tail: this.len,
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
