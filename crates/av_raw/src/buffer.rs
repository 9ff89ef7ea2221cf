use alloc::alloc as malloc;
use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::mem::{self, MaybeUninit};
use core::ptr::{self, NonNull};

use crate::{AllocError, cfg};

// -----------------------------------------------------------------------------
// RawBuffer

/// Uninitialized, aligned storage for `capacity` values of `T`.
///
/// The buffer only tracks *slots*, not values. Writing into a slot, reading
/// out of it and dropping whatever lives there is entirely up to the owner.
/// Dropping a `RawBuffer` releases the memory and **never** runs a
/// destructor of `T`.
///
/// A buffer with capacity `0` owns no allocation and its pointer is
/// dangling (but aligned). The same holds for zero-sized `T` at any
/// capacity: the slot count is recorded, but the allocator is never called.
///
/// `RawBuffer` is move-only. Copying raw storage without knowing which slots
/// are live is meaningless, so it does not implement [`Clone`].
///
/// # Examples
///
/// ```
/// use av_raw::RawBuffer;
///
/// let mut buf = RawBuffer::<String>::with_capacity(2);
/// assert_eq!(buf.capacity(), 2);
///
/// unsafe {
///     buf.ptr_at_mut(0).write(String::from("slot 0"));
///     assert_eq!(&*buf.ptr_at(0), "slot 0");
///     // The buffer does not drop live values, the owner does.
///     buf.ptr_at_mut(0).drop_in_place();
/// }
/// ```
pub struct RawBuffer<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _marker: PhantomData<T>,
}

// SAFETY: `RawBuffer` uniquely owns its allocation, like `Box<[T]>`.
unsafe impl<T: Send> Send for RawBuffer<T> {}
// SAFETY: shared access only hands out shared pointers to the slots.
unsafe impl<T: Sync> Sync for RawBuffer<T> {}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        // SAFETY: `ptr` and `capacity` describe an allocation made by `allocate`.
        unsafe { deallocate(self.ptr, self.capacity) }
    }
}

impl<T> Default for RawBuffer<T> {
    /// Creates an empty buffer without allocating.
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RawBuffer<T> {
    /// Creates an empty buffer.
    ///
    /// This function does not allocate any memory.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_raw::RawBuffer;
    ///
    /// let buf = RawBuffer::<u32>::new();
    /// assert_eq!(buf.capacity(), 0);
    /// assert!(!buf.is_allocated());
    /// ```
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates storage for exactly `capacity` slots.
    ///
    /// A capacity of `0` makes no allocator call.
    ///
    /// # Panics
    ///
    /// Panics if the total size exceeds `isize::MAX` bytes, and aborts through
    /// [`handle_alloc_error`](alloc::alloc::handle_alloc_error) if the
    /// allocator fails. Use [`try_with_capacity`](Self::try_with_capacity)
    /// to handle those cases.
    #[inline]
    #[track_caller]
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(buf) => buf,
            Err(err) => err.handle_error(),
        }
    }

    /// Allocates storage for exactly `capacity` slots, returning the
    /// allocator failure instead of diverging.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_raw::{AllocError, RawBuffer};
    ///
    /// let buf = RawBuffer::<u64>::try_with_capacity(8).unwrap();
    /// assert_eq!(buf.capacity(), 8);
    ///
    /// let err = RawBuffer::<u64>::try_with_capacity(usize::MAX).unwrap_err();
    /// assert!(matches!(err, AllocError::CapacityOverflow { .. }));
    /// ```
    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        let ptr = allocate::<T>(capacity)?;
        Ok(Self {
            ptr,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Returns the number of slots, not bytes and not live values.
    #[inline(always)]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns `true` if this buffer owns memory obtained from the allocator.
    ///
    /// Always `false` for capacity `0` and for zero-sized `T`.
    #[inline(always)]
    pub const fn is_allocated(&self) -> bool {
        size_of::<T>() != 0 && self.capacity != 0
    }

    /// Returns the address of slot `0`.
    ///
    /// The pointer is dangling when nothing is allocated.
    #[inline(always)]
    pub const fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the mutable address of slot `0`.
    ///
    /// The pointer is dangling when nothing is allocated.
    #[inline(always)]
    pub const fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the address of slot `offset`.
    ///
    /// # Safety
    ///
    /// `offset <= capacity`. The one-past-the-end address is allowed so
    /// callers can compute an end sentinel, but it must not be dereferenced.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn ptr_at(&self, offset: usize) -> *const T {
        cfg::debug! {
            assert!(offset <= self.capacity, "slot offset out of bounds of the buffer");
        }
        // SAFETY: the caller keeps `offset` within the allocation or one past it.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Returns the mutable address of slot `offset`.
    ///
    /// # Safety
    ///
    /// `offset <= capacity`, see [`ptr_at`](Self::ptr_at).
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn ptr_at_mut(&mut self, offset: usize) -> *mut T {
        cfg::debug! {
            assert!(offset <= self.capacity, "slot offset out of bounds of the buffer");
        }
        // SAFETY: the caller keeps `offset` within the allocation or one past it.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Returns the slot at `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn slot(&self, index: usize) -> &MaybeUninit<T> {
        cfg::debug! {
            assert!(index < self.capacity, "slot index out of bounds of the buffer");
        }
        // SAFETY: `index` is in bounds and `MaybeUninit<T>` has the layout of `T`.
        unsafe { &*self.ptr.as_ptr().add(index).cast::<MaybeUninit<T>>() }
    }

    /// Returns the mutable slot at `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity`.
    #[cfg_attr(debug_assertions, track_caller)]
    #[inline]
    pub const unsafe fn slot_mut(&mut self, index: usize) -> &mut MaybeUninit<T> {
        cfg::debug! {
            assert!(index < self.capacity, "slot index out of bounds of the buffer");
        }
        // SAFETY: `index` is in bounds and `MaybeUninit<T>` has the layout of `T`.
        unsafe { &mut *self.ptr.as_ptr().add(index).cast::<MaybeUninit<T>>() }
    }

    /// Views every slot as possibly-uninitialized memory.
    #[inline]
    pub const fn as_uninit_slice(&self) -> &[MaybeUninit<T>] {
        // SAFETY: any bit pattern is a valid `MaybeUninit<T>`.
        unsafe {
            &*ptr::slice_from_raw_parts(self.ptr.as_ptr().cast::<MaybeUninit<T>>(), self.capacity)
        }
    }

    /// Views every slot as possibly-uninitialized mutable memory.
    ///
    /// Overwriting a live slot through this view leaks the old value.
    #[inline]
    pub const fn as_uninit_slice_mut(&mut self) -> &mut [MaybeUninit<T>] {
        // SAFETY: any bit pattern is a valid `MaybeUninit<T>`.
        unsafe {
            &mut *ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().cast::<MaybeUninit<T>>(), self.capacity)
        }
    }

    /// Exchanges the storage of two buffers.
    ///
    /// O(1), no slot is touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_raw::RawBuffer;
    ///
    /// let mut a = RawBuffer::<u8>::with_capacity(4);
    /// let mut b = RawBuffer::<u8>::new();
    ///
    /// a.swap(&mut b);
    /// assert_eq!(a.capacity(), 0);
    /// assert_eq!(b.capacity(), 4);
    /// ```
    #[inline]
    pub const fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    /// Moves the storage out, leaving an empty buffer behind.
    ///
    /// # Examples
    ///
    /// ```
    /// use av_raw::RawBuffer;
    ///
    /// let mut a = RawBuffer::<u8>::with_capacity(4);
    /// let addr = a.as_ptr();
    ///
    /// let b = a.take();
    /// assert_eq!(a.capacity(), 0);
    /// assert_eq!(b.capacity(), 4);
    /// assert_eq!(b.as_ptr(), addr);
    /// ```
    #[inline]
    pub const fn take(&mut self) -> Self {
        mem::replace(self, Self::new())
    }
}

impl<T> fmt::Debug for RawBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawBuffer")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}

// -----------------------------------------------------------------------------
// alloc helper

/// Creates the layout of `capacity` consecutive `T`, checking for overflow.
#[inline]
fn array_layout<T>(capacity: usize) -> Result<Layout, AllocError> {
    Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow { capacity })
}

/// Creates the layout of `capacity` consecutive `T` without checking.
///
/// # Safety
/// - `size_of::<T>() * capacity` must not overflow
/// - The resulting size must be <= `isize::MAX`
#[inline]
const unsafe fn array_layout_unchecked<T>(capacity: usize) -> Layout {
    unsafe { Layout::from_size_align_unchecked(size_of::<T>() * capacity, align_of::<T>()) }
}

/// Obtains storage for `capacity` slots, or a dangling pointer when no
/// memory is needed.
fn allocate<T>(capacity: usize) -> Result<NonNull<T>, AllocError> {
    if size_of::<T>() == 0 || capacity == 0 {
        return Ok(NonNull::dangling());
    }

    let layout = array_layout::<T>(capacity)?;

    // SAFETY: `layout` has a non-zero size.
    let ptr = unsafe { malloc::alloc(layout) };
    NonNull::new(ptr.cast::<T>()).ok_or(AllocError::OutOfMemory { layout })
}

/// Releases storage obtained from [`allocate`]. Zero capacity is valid.
///
/// Note that this function does **not** call `drop`.
///
/// # Safety
/// - `ptr` must come from `allocate::<T>(capacity)`
#[inline]
unsafe fn deallocate<T>(ptr: NonNull<T>, capacity: usize) {
    if size_of::<T>() != 0 && capacity != 0 {
        unsafe {
            let layout = array_layout_unchecked::<T>(capacity);
            malloc::dealloc(ptr.as_ptr().cast::<u8>(), layout);
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
