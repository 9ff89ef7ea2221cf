use core::any::type_name;
use core::mem;
use core::ops::Range;
use core::ptr;
use core::slice;

use av_raw::{AllocError, RawBuffer};

use crate::cfg;

// -----------------------------------------------------------------------------
// Modules

mod impls;
mod iter;

cfg::serde! { mod serde; }

pub use iter::IntoIter;

// -----------------------------------------------------------------------------
// DynamicArray

/// A contiguous growable array.
///
/// Slots `[0, len)` of the underlying [`RawBuffer`] hold live values, slots
/// `[len, capacity)` are uninitialized. `len <= capacity` holds on entry and
/// exit of every method.
///
/// When an append or insert finds the array full, the capacity grows to
/// `max(1, 2 * capacity)`. The new value is constructed inside the new
/// buffer **before** any existing element is relocated, so a panicking
/// constructor (see [`emplace_back`](Self::emplace_back)) or an allocation
/// failure leaves the array untouched.
///
/// Relocation is always a bitwise move. Moves in Rust cannot unwind, so a
/// half-relocated state is unreachable and no copy-based fallback exists.
///
/// Pointers obtained from [`as_ptr_range`](Self::as_ptr_range) and friends
/// are invalidated by any reallocation or shift: growth past capacity,
/// insert, erase, resize and reserve beyond capacity.
///
/// # Examples
///
/// ```
/// use av_vec::DynamicArray;
///
/// let mut array = DynamicArray::new();
/// assert_eq!(array.capacity(), 0);
///
/// array.push(1);
/// assert_eq!(array.capacity(), 1);
/// array.push(2);
/// assert_eq!(array.capacity(), 2);
/// array.push(3);
/// assert_eq!(array.capacity(), 4);
///
/// assert_eq!(array, [1, 2, 3]);
/// assert_eq!(array[1], 2);
/// ```
pub struct DynamicArray<T> {
    buf: RawBuffer<T>,
    len: usize,
}

impl<T> Drop for DynamicArray<T> {
    fn drop(&mut self) {
        // SAFETY: slots `[0, len)` are live; drops them in index order.
        // The buffer then releases the storage.
        unsafe { ptr::drop_in_place(self.as_mut_slice()) }
    }
}

impl<T> DynamicArray<T> {
    /// Creates an empty array.
    ///
    /// This function does not allocate any memory.
    /// The first allocation occurs when the first element is pushed.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::DynamicArray;
    ///
    /// let array: DynamicArray<i32> = DynamicArray::new();
    /// assert!(array.is_empty());
    /// assert_eq!(array.capacity(), 0);
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            buf: RawBuffer::new(),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow, aborts on allocation failure.
    #[inline]
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawBuffer::with_capacity(capacity),
            len: 0,
        }
    }

    /// Creates an empty array with room for exactly `capacity` elements,
    /// returning the allocation failure instead of diverging.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(Self {
            buf: RawBuffer::try_with_capacity(capacity)?,
            len: 0,
        })
    }

    /// Creates an array of `count` default values.
    ///
    /// Length and capacity are both `count`.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::DynamicArray;
    ///
    /// let array = DynamicArray::<String>::with_default(5);
    /// assert_eq!(array.len(), 5);
    /// assert_eq!(array.capacity(), 5);
    /// assert!(array.iter().all(String::is_empty));
    /// ```
    #[track_caller]
    pub fn with_default(count: usize) -> Self
    where
        T: Default,
    {
        let mut array = Self::with_capacity(count);
        array.resize_with(count, T::default);
        array
    }

    /// Creates an array holding `count` clones of `elem`.
    ///
    /// Used by [`dyn_array!`](crate::dyn_array) for the `[elem; count]` form.
    #[track_caller]
    pub fn from_elem(elem: T, count: usize) -> Self
    where
        T: Clone,
    {
        let mut array = Self::with_capacity(count);
        if count > 0 {
            for _ in 1..count {
                // SAFETY: at most `count` elements are written.
                unsafe { array.push_unchecked(elem.clone()) };
            }
            // SAFETY: the last free slot.
            unsafe { array.push_unchecked(elem) };
        }
        array
    }

    /// Returns the number of live elements.
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the array holds no elements.
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the array can hold without
    /// reallocating.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Extracts a slice of the live elements.
    #[inline]
    pub const fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are live and the pointer is aligned.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Extracts a mutable slice of the live elements.
    #[inline]
    pub const fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: slots `[0, len)` are live and the pointer is aligned.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Returns the address of the first element (the begin cursor).
    ///
    /// The pointer is dangling but aligned when nothing is allocated.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns the mutable address of the first element.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns the begin and end cursors: the first element and one past
    /// the last live element.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let array = dyn_array![1u32, 2, 3];
    /// let range = array.as_ptr_range();
    /// assert_eq!(unsafe { range.end.offset_from(range.start) }, 3);
    /// ```
    #[inline]
    pub const fn as_ptr_range(&self) -> Range<*const T> {
        let start = self.buf.as_ptr();
        // SAFETY: `len <= capacity`, so this is at most one past the end.
        let end = unsafe { self.buf.ptr_at(self.len) };
        start..end
    }

    /// Returns the mutable begin and end cursors.
    #[inline]
    pub const fn as_mut_ptr_range(&mut self) -> Range<*mut T> {
        let len = self.len;
        let start = self.buf.as_mut_ptr();
        // SAFETY: `len <= capacity`, so this is at most one past the end.
        let end = unsafe { self.buf.ptr_at_mut(len) };
        start..end
    }

    /// Returns a reference to the element at `index` without bounds checks.
    ///
    /// The bound is asserted when the `debug` alias is active (debug builds
    /// or the `debug` feature). Use indexing or [`get`](slice::get) for a
    /// checked access.
    ///
    /// # Safety
    ///
    /// `index < len`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn get_unchecked(&self, index: usize) -> &T {
        cfg::debug! {
            assert!(index < self.len, "index out of bounds of the array");
        }
        // SAFETY: `index` names a live slot.
        unsafe { &*self.buf.ptr_at(index) }
    }

    /// Returns a mutable reference to the element at `index` without bounds
    /// checks.
    ///
    /// # Safety
    ///
    /// `index < len`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        cfg::debug! {
            assert!(index < self.len, "index out of bounds of the array");
        }
        // SAFETY: `index` names a live slot.
        unsafe { &mut *self.buf.ptr_at_mut(index) }
    }

    /// Appends an element and returns a reference to it.
    ///
    /// Grows to `max(1, 2 * capacity)` when full.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// *array.push(1) += 10;
    /// assert_eq!(array, [11]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn push(&mut self, value: T) -> &mut T {
        self.emplace_back(move || value)
    }

    /// Appends the value produced by `f` and returns a reference to it.
    ///
    /// When the array is full, `f` runs after the new buffer is allocated
    /// but before any element is relocated. If `f` panics, the array is
    /// left exactly as it was.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::DynamicArray;
    ///
    /// let mut array = DynamicArray::new();
    /// array.emplace_back(|| String::from("built in place"));
    /// assert_eq!(array[0], "built in place");
    /// ```
    #[inline]
    #[track_caller]
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.emplace(self.len, f)
    }

    /// Appends an element if there is spare capacity.
    ///
    /// Returns `Err(value)` and leaves the array unchanged when full.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::DynamicArray;
    ///
    /// let mut array = DynamicArray::with_capacity(1);
    /// assert_eq!(array.push_within_capacity(1), Ok(&mut 1));
    /// assert_eq!(array.push_within_capacity(2), Err(2));
    /// assert_eq!(array.len(), 1);
    /// ```
    #[inline]
    pub fn push_within_capacity(&mut self, value: T) -> Result<&mut T, T> {
        if self.len < self.buf.capacity() {
            // SAFETY: `len < capacity`.
            unsafe { self.push_unchecked(value) };
            // SAFETY: the slot was just initialized.
            Ok(unsafe { self.get_unchecked_mut(self.len - 1) })
        } else {
            Err(value)
        }
    }

    /// Appends an element without checking capacity.
    ///
    /// # Safety
    ///
    /// The caller must ensure that `len < capacity`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline(always)]
    pub unsafe fn push_unchecked(&mut self, value: T) {
        cfg::debug! {
            assert!(self.len < self.buf.capacity(), "push on a full array");
        }
        // SAFETY: slot `len` is free.
        unsafe { self.buf.ptr_at_mut(self.len).write(value) };
        self.len += 1;
    }

    /// Inserts an element at `index`, shifting everything after it to the
    /// right, and returns a reference to it.
    ///
    /// O(len) due to the shift.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut array = dyn_array![1, 2, 3];
    /// array.insert(1, 9);
    /// assert_eq!(array, [1, 9, 2, 3]);
    ///
    /// array.insert(4, 7);
    /// assert_eq!(array, [1, 9, 2, 3, 7]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        self.emplace(index, move || value)
    }

    /// Inserts the value produced by `f` at `index` and returns a reference
    /// to it.
    ///
    /// `f` runs before any existing element is moved, on both the in-place
    /// and the reallocating path, so a panic in `f` leaves the array
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    #[track_caller]
    pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        let len = self.len;
        if index > len {
            insert_failed(index, len);
        }

        if len == self.buf.capacity() {
            let mut next: RawBuffer<T> = RawBuffer::with_capacity(self.grown_capacity());
            // SAFETY: `index <= len < next.capacity()`.
            unsafe { next.ptr_at_mut(index).write(f()) };
            // SAFETY: `next` has room for `len + 1` elements, `index <= len`.
            unsafe { self.relocate_around(&mut next, index) };
            self.adopt(next);
        } else {
            let value = f();
            // SAFETY: `len < capacity`, so slot `len` receives the last
            // element of the shifted tail.
            unsafe {
                let slot = self.buf.ptr_at_mut(index);
                if index < len {
                    ptr::copy(slot, slot.add(1), len - index);
                }
                slot.write(value);
            }
        }

        self.len = len + 1;
        // SAFETY: slot `index` was just initialized.
        unsafe { &mut *self.buf.ptr_at_mut(index) }
    }

    /// Drops the element at `index` and shifts everything after it to the
    /// left.
    ///
    /// Returns the index that now holds the following element, or `len`
    /// if the last element was erased. O(len) due to the shift.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut array = dyn_array![1, 9, 2, 3];
    /// let next = array.erase(2);
    /// assert_eq!(array, [1, 9, 3]);
    /// assert_eq!(array[next], 3);
    /// ```
    #[inline]
    #[track_caller]
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Removes and returns the element at `index`, shifting everything after
    /// it to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    #[track_caller]
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        if index >= len {
            remove_failed(index, len);
        }

        // SAFETY: `index < len`; the value is read out before its slot is
        // overwritten by the shifted tail.
        unsafe {
            let slot = self.buf.ptr_at_mut(index);
            let value = slot.read();
            ptr::copy(slot.add(1), slot, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the array is empty. [`pop`](Self::pop) is the non-panicking
    /// alternative.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut array = dyn_array![1, 9, 3];
    /// array.pop_back();
    /// assert_eq!(array, [1, 9]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn pop_back(&mut self) {
        assert!(self.len > 0, "`pop_back` called on an empty array");
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted.
        unsafe { self.buf.ptr_at_mut(self.len).drop_in_place() }
    }

    /// Removes the last element and returns it, or `None` if empty.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: the slot was live and is no longer counted.
        unsafe { Some(self.buf.ptr_at(self.len).read()) }
    }

    /// Ensures the capacity is at least `new_capacity`.
    ///
    /// Does nothing if `new_capacity <= capacity`; otherwise reallocates to
    /// **exactly** `new_capacity` slots. The length is unchanged.
    ///
    /// # Panics
    ///
    /// Panics on capacity overflow, aborts on allocation failure.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut array = dyn_array![1, 2];
    /// array.reserve(10);
    /// assert_eq!(array.capacity(), 10);
    ///
    /// array.reserve(3);
    /// assert_eq!(array.capacity(), 10);
    /// ```
    #[inline]
    #[track_caller]
    pub fn reserve(&mut self, new_capacity: usize) {
        if let Err(err) = self.try_reserve(new_capacity) {
            err.handle_error();
        }
    }

    /// Fallible version of [`reserve`](Self::reserve).
    ///
    /// On error the array keeps its old buffer, length and contents.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::{AllocError, dyn_array};
    ///
    /// let mut array = dyn_array![1u64, 2, 3];
    /// let err = array.try_reserve(usize::MAX).unwrap_err();
    /// assert!(matches!(err, AllocError::CapacityOverflow { .. }));
    /// assert_eq!(array, [1, 2, 3]);
    /// ```
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.buf.capacity() {
            return Ok(());
        }
        self.reallocate(new_capacity).inspect_err(|err| {
            log::debug!(
                "DynamicArray<{}>: reserving {new_capacity} slots failed: {err}",
                type_name::<T>(),
            );
        })
    }

    /// Resizes the array to `new_len`.
    ///
    /// Shrinking drops the trailing elements. Growing reserves exactly
    /// `new_len` slots (if needed) and fills them with default values.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut array = dyn_array![1, 2, 3];
    /// array.resize(5);
    /// assert_eq!(array, [1, 2, 3, 0, 0]);
    ///
    /// array.resize(1);
    /// assert_eq!(array, [1]);
    /// ```
    #[inline]
    #[track_caller]
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes the array to `new_len`, filling new slots with values
    /// returned by `f`.
    ///
    /// If `f` panics, the elements constructed so far stay in the array.
    #[track_caller]
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }

        self.reserve(new_len);
        while self.len < new_len {
            // SAFETY: capacity is at least `new_len`.
            unsafe { self.push_unchecked(f()) };
        }
    }

    /// Drops every element past `len`. Does nothing if `len >= self.len()`.
    ///
    /// The capacity is unchanged.
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        // SAFETY: `[len, self.len)` are live. The length is updated first so
        // a panicking destructor cannot cause a double drop.
        unsafe {
            let tail = ptr::slice_from_raw_parts_mut(self.buf.ptr_at_mut(len), self.len - len);
            self.len = len;
            ptr::drop_in_place(tail);
        }
    }

    /// Drops all elements, keeping the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Exchanges the contents of two arrays in O(1).
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::{DynamicArray, dyn_array};
    ///
    /// let mut a = dyn_array![1, 2];
    /// let mut b = DynamicArray::new();
    ///
    /// a.swap(&mut b);
    /// assert!(a.is_empty());
    /// assert_eq!(b, [1, 2]);
    /// ```
    #[inline]
    pub const fn swap(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Moves the buffer and all elements out, leaving an empty array with
    /// capacity `0` behind. No element is copied.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_vec::dyn_array;
    ///
    /// let mut a = dyn_array![1, 2, 3];
    /// let b = a.take();
    ///
    /// assert_eq!(a.len(), 0);
    /// assert_eq!(a.capacity(), 0);
    /// assert_eq!(b, [1, 2, 3]);
    /// ```
    #[inline]
    pub const fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }

    // -------------------------------------------------------------------------
    // Reallocation

    /// Capacity after one growth step: `max(1, 2 * capacity)`.
    ///
    /// Doubling saturates at `usize::MAX`, so an oversized request is
    /// reported by the allocation with the capacity it actually asked for.
    #[inline]
    #[track_caller]
    fn grown_capacity(&self) -> usize {
        match self.buf.capacity() {
            0 => 1,
            usize::MAX => AllocError::CapacityOverflow {
                capacity: usize::MAX,
            }
            .handle_error(),
            capacity => capacity.saturating_mul(2),
        }
    }

    /// Moves every live element into `next`, leaving slot `gap` free.
    ///
    /// The source slots are logically uninitialized afterwards.
    ///
    /// # Safety
    /// - `gap <= len`
    /// - `next.capacity() > len`
    #[inline]
    unsafe fn relocate_around(&mut self, next: &mut RawBuffer<T>, gap: usize) {
        let len = self.len;
        unsafe {
            let src = self.buf.as_ptr();
            let dst = next.as_mut_ptr();
            ptr::copy_nonoverlapping(src, dst, gap);
            ptr::copy_nonoverlapping(src.add(gap), dst.add(gap + 1), len - gap);
        }
    }

    /// Moves every live element into a new buffer of exactly `new_capacity`
    /// slots and adopts it.
    fn reallocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        debug_assert!(new_capacity >= self.len);

        let mut next = RawBuffer::try_with_capacity(new_capacity)?;
        // SAFETY: `next` has room for `len` elements; buffers never overlap.
        unsafe { ptr::copy_nonoverlapping(self.buf.as_ptr(), next.as_mut_ptr(), self.len) };
        self.adopt(next);
        Ok(())
    }

    /// Installs `next`, whose prefix already holds the relocated elements.
    ///
    /// The old storage is released without dropping anything: every value
    /// in it was moved out.
    #[inline]
    fn adopt(&mut self, mut next: RawBuffer<T>) {
        log::trace!(
            "DynamicArray<{}>: relocated {} elements, capacity {} -> {}",
            type_name::<T>(),
            self.len,
            self.buf.capacity(),
            next.capacity(),
        );
        self.buf.swap(&mut next);
    }
}

// -----------------------------------------------------------------------------
// panic helper

#[cold]
#[inline(never)]
#[track_caller]
fn insert_failed(index: usize, len: usize) -> ! {
    panic!("insertion index (is {index}) should be <= len (is {len})");
}

#[cold]
#[inline(never)]
#[track_caller]
fn remove_failed(index: usize, len: usize) -> ! {
    panic!("removal index (is {index}) should be < len (is {len})");
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use super::DynamicArray;
    use crate::dyn_array;
    use alloc::rc::Rc;
    use alloc::string::{String, ToString};
    use core::cell::Cell;
    use alloc::vec::Vec;
    use core::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;

    /// Counts drops and can be told to panic when cloned.
    #[derive(Debug)]
    struct Tracked {
        id: u32,
        drops: Rc<Cell<usize>>,
        poisoned: bool,
    }

    impl Tracked {
        fn new(id: u32, drops: &Rc<Cell<usize>>) -> Self {
            Self {
                id,
                drops: drops.clone(),
                poisoned: false,
            }
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            if self.poisoned {
                panic!("cloned a poisoned value");
            }
            Self {
                id: self.id,
                drops: self.drops.clone(),
                poisoned: false,
            }
        }
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn ids(array: &DynamicArray<Tracked>) -> Vec<u32> {
        array.iter().map(|t| t.id).collect()
    }

    #[test]
    fn is_sync_send() {
        use core::panic::{RefUnwindSafe, UnwindSafe};

        fn is_send<T: Send>() {}
        fn is_sync<T: Sync>() {}
        fn is_unwindsafe<T: UnwindSafe>() {}
        fn is_refunwindsafe<T: RefUnwindSafe>() {}

        is_send::<DynamicArray<i32>>();
        is_sync::<DynamicArray<i32>>();
        is_unwindsafe::<DynamicArray<i32>>();
        is_refunwindsafe::<DynamicArray<i32>>();
    }

    #[test]
    fn append_insert_erase_pop_scenario() {
        let mut array = DynamicArray::new();
        let mut capacities = alloc::vec![array.capacity()];
        for value in [1, 2, 3] {
            array.push(value);
            capacities.push(array.capacity());
        }
        assert_eq!(capacities, [0, 1, 2, 4]);
        assert_eq!(array, [1, 2, 3]);
        assert_eq!(array.len(), 3);

        assert_eq!(*array.insert(1, 9), 9);
        assert_eq!(array, [1, 9, 2, 3]);
        assert_eq!(array.capacity(), 4);

        assert_eq!(array.erase(2), 2);
        assert_eq!(array, [1, 9, 3]);

        array.pop_back();
        assert_eq!(array, [1, 9]);
        assert_eq!(array.capacity(), 4);
    }

    #[test]
    fn with_default_fills_exactly() {
        let array = DynamicArray::<u64>::with_default(5);
        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 5);
        assert!(array.iter().all(|&v| v == 0));

        let empty = DynamicArray::<u64>::with_default(0);
        assert_eq!(empty.capacity(), 0);
    }

    #[test]
    fn insert_reallocates_around_the_gap() {
        let mut array = dyn_array![String::from("a"), String::from("c")];
        assert_eq!(array.capacity(), 2);

        array.insert(1, "b".to_string());
        assert_eq!(array.capacity(), 4);
        assert_eq!(array, ["a", "b", "c"]);

        array.insert(0, "start".to_string());
        array.insert(4, "end".to_string());
        assert_eq!(array, ["start", "a", "b", "c", "end"]);
    }

    #[test]
    fn insert_into_empty() {
        let mut array = DynamicArray::with_capacity(2);
        array.insert(0, 5);
        assert_eq!(array, [5]);
        assert_eq!(array.capacity(), 2);
    }

    #[test]
    #[should_panic(expected = "insertion index (is 3) should be <= len (is 2)")]
    fn insert_out_of_bounds() {
        let mut array = dyn_array![1, 2];
        array.insert(3, 0);
    }

    #[test]
    #[should_panic(expected = "removal index (is 2) should be < len (is 2)")]
    fn erase_out_of_bounds() {
        let mut array = dyn_array![1, 2];
        array.erase(2);
    }

    #[test]
    #[should_panic(expected = "`pop_back` called on an empty array")]
    fn pop_back_empty() {
        DynamicArray::<u8>::new().pop_back();
    }

    #[test]
    fn pop_and_remove_return_values() {
        let mut array = dyn_array![1, 2, 3];
        assert_eq!(array.remove(0), 1);
        assert_eq!(array.pop(), Some(3));
        assert_eq!(array.pop(), Some(2));
        assert_eq!(array.pop(), None);
    }

    #[test]
    fn erase_last_returns_end() {
        let mut array = dyn_array![1, 2, 3];
        let next = array.erase(2);
        assert_eq!(next, array.len());
    }

    #[test]
    fn reserve_is_exact_and_keeps_len() {
        let mut array = dyn_array![1, 2, 3];
        array.reserve(2);
        assert_eq!(array.capacity(), 3);

        array.reserve(7);
        assert_eq!(array.capacity(), 7);
        assert_eq!(array, [1, 2, 3]);
    }

    #[test]
    fn try_reserve_failure_leaves_array_untouched() {
        let mut array = dyn_array![1u8, 2, 3];
        let addr = array.as_ptr();

        assert!(array.try_reserve(isize::MAX as usize).is_err());
        assert_eq!(array.as_ptr(), addr);
        assert_eq!(array.capacity(), 3);
        assert_eq!(array, [1, 2, 3]);
    }

    #[test]
    fn resize_shrinks_and_grows() {
        let drops = Rc::new(Cell::new(0));
        let mut array = DynamicArray::new();
        for id in 0..4 {
            array.push(Tracked::new(id, &drops));
        }

        array.resize_with(2, || unreachable!());
        assert_eq!(ids(&array), [0, 1]);
        assert_eq!(drops.get(), 2);
        assert_eq!(array.capacity(), 4);

        let mut next = 10;
        array.resize_with(6, || {
            next += 1;
            Tracked::new(next, &drops)
        });
        assert_eq!(ids(&array), [0, 1, 11, 12, 13, 14]);
        assert_eq!(array.capacity(), 6);

        drop(array);
        assert_eq!(drops.get(), 8);
    }

    #[test]
    fn panicking_constructor_on_growth_is_a_no_op() {
        let mut array = dyn_array![1, 2];
        let addr = array.as_ptr();

        let result = catch_unwind(AssertUnwindSafe(|| {
            array.emplace_back(|| panic!("constructor failed"));
        }));
        assert!(result.is_err());

        assert_eq!(array, [1, 2]);
        assert_eq!(array.capacity(), 2);
        assert_eq!(array.as_ptr(), addr);
    }

    #[test]
    fn panicking_constructor_on_insert_is_a_no_op() {
        let drops = Rc::new(Cell::new(0));
        let mut array = DynamicArray::new();
        for id in 0..3 {
            array.push(Tracked::new(id, &drops));
        }

        // in place, capacity 4
        let result = catch_unwind(AssertUnwindSafe(|| {
            array.emplace(1, || panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(ids(&array), [0, 1, 2]);

        array.push(Tracked::new(3, &drops));
        assert_eq!(array.len(), array.capacity());

        // reallocating
        let result = catch_unwind(AssertUnwindSafe(|| {
            array.emplace(2, || panic!("constructor failed"));
        }));
        assert!(result.is_err());
        assert_eq!(ids(&array), [0, 1, 2, 3]);
        assert_eq!(array.capacity(), 4);
        assert_eq!(drops.get(), 0);
    }

    #[test]
    fn every_element_dropped_exactly_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut array = DynamicArray::new();
            for id in 0..10 {
                array.push(Tracked::new(id, &drops));
            }
            array.insert(3, Tracked::new(100, &drops));
            array.erase(0);
            array.pop_back();
            assert_eq!(drops.get(), 2);

            array.reserve(64);
            array.truncate(5);
            assert_eq!(drops.get(), 6);
        }
        assert_eq!(drops.get(), 11);
    }

    #[test]
    fn clone_is_deep_and_sized_to_len() {
        let mut original = DynamicArray::with_capacity(10);
        original.push(String::from("x"));
        original.push(String::from("y"));

        let mut copy = original.clone();
        assert_eq!(copy.capacity(), 2);
        assert_eq!(copy, original);

        copy[0].push('!');
        copy.push(String::from("z"));
        assert_eq!(original, ["x", "y"]);
        assert_eq!(copy, ["x!", "y", "z"]);
    }

    #[test]
    fn panicking_clone_drops_partial_copy() {
        let drops = Rc::new(Cell::new(0));
        let mut array = DynamicArray::new();
        array.push(Tracked::new(0, &drops));
        array.push(Tracked::new(1, &drops));
        let mut poisoned = Tracked::new(2, &drops);
        poisoned.poisoned = true;
        array.push(poisoned);

        let result = catch_unwind(AssertUnwindSafe(|| array.clone()));
        assert!(result.is_err());
        assert_eq!(drops.get(), 2);
        assert_eq!(ids(&array), [0, 1, 2]);
    }

    #[test]
    fn clone_from_reuses_storage_when_it_fits() {
        let mut target = DynamicArray::with_capacity(8);
        target.push(1);
        let addr = target.as_ptr();

        let source = dyn_array![5, 6, 7, 8];
        target.clone_from(&source);
        assert_eq!(target, [5, 6, 7, 8]);
        assert_eq!(target.capacity(), 8);
        assert_eq!(target.as_ptr(), addr);

        let shorter = dyn_array![9];
        target.clone_from(&shorter);
        assert_eq!(target, [9]);
        assert_eq!(target.as_ptr(), addr);
    }

    #[test]
    fn clone_from_reallocates_when_too_small() {
        let mut target = dyn_array![1];
        let source = dyn_array![1, 2, 3];

        target.clone_from(&source);
        assert_eq!(target, [1, 2, 3]);
        assert_eq!(target.capacity(), 3);
    }

    #[test]
    fn clone_from_drops_excess() {
        let drops = Rc::new(Cell::new(0));
        let mut target = DynamicArray::new();
        for id in 0..4 {
            target.push(Tracked::new(id, &drops));
        }
        let mut source = DynamicArray::new();
        source.push(Tracked::new(7, &drops));

        target.clone_from(&source);
        assert_eq!(ids(&target), [7]);
        // three excess elements and the overwritten prefix value
        assert_eq!(drops.get(), 4);
    }

    #[test]
    fn take_leaves_source_empty() {
        let mut a = dyn_array![1, 2, 3];
        let addr = a.as_ptr();

        let b = a.take();
        assert_eq!(a.len(), 0);
        assert_eq!(a.capacity(), 0);
        assert_eq!(b, [1, 2, 3]);
        assert_eq!(b.as_ptr(), addr);

        // move-assign: the old contents of `a` are released
        a = b;
        assert_eq!(a, [1, 2, 3]);
    }

    #[test]
    fn swap_exchanges_everything() {
        let mut a = dyn_array![1, 2, 3];
        let mut b = DynamicArray::with_capacity(9);
        b.push(4);

        a.swap(&mut b);
        assert_eq!(a, [4]);
        assert_eq!(a.capacity(), 9);
        assert_eq!(b, [1, 2, 3]);
        assert_eq!(b.capacity(), 3);
    }

    #[test]
    fn unchecked_access_and_cursors() {
        let mut array = dyn_array![10, 20, 30];
        unsafe {
            assert_eq!(*array.get_unchecked(2), 30);
            *array.get_unchecked_mut(0) = 11;
        }
        assert_eq!(array[0], 11);

        let range = array.as_ptr_range();
        assert_eq!(range.start, array.as_ptr());
        assert_eq!(unsafe { range.end.offset_from(range.start) }, 3);

        let range = array.as_mut_ptr_range();
        unsafe { *range.start = 1 };
        assert_eq!(array[0], 1);
    }

    #[test]
    fn zero_sized_elements() {
        let mut array = DynamicArray::new();
        for _ in 0..5 {
            array.push(());
        }
        assert_eq!(array.len(), 5);
        assert_eq!(array.capacity(), 8);
        array.insert(2, ());
        array.erase(0);
        assert_eq!(array.len(), 5);
    }

    #[test]
    fn growth_saturates_before_overflowing() {
        let array = DynamicArray::<()>::with_capacity(usize::MAX / 2 + 1);
        assert_eq!(array.grown_capacity(), usize::MAX);

        let array = DynamicArray::<u64>::with_capacity(3);
        assert_eq!(array.grown_capacity(), 6);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn growth_past_usize_max_panics() {
        let array = DynamicArray::<()>::with_capacity(usize::MAX);
        let _ = array.grown_capacity();
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "index out of bounds of the array")]
    fn get_unchecked_past_len_panics_in_debug() {
        let mut array = DynamicArray::with_capacity(4);
        array.push(1);
        // Slot 1 is allocated but not live.
        let _ = unsafe { array.get_unchecked(1) };
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "index out of bounds of the array")]
    fn get_unchecked_mut_past_len_panics_in_debug() {
        let mut array = dyn_array![1, 2];
        let _ = unsafe { array.get_unchecked_mut(2) };
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "push on a full array")]
    fn push_unchecked_when_full_panics_in_debug() {
        let mut array = DynamicArray::with_capacity(1);
        unsafe {
            array.push_unchecked(1);
            array.push_unchecked(2);
        }
    }

    #[test]
    fn push_within_capacity() {
        let mut array = DynamicArray::with_capacity(2);
        assert!(array.push_within_capacity(1).is_ok());
        assert!(array.push_within_capacity(2).is_ok());
        assert_eq!(array.push_within_capacity(3), Err(3));
        assert_eq!(array, [1, 2]);
    }
}
