//! A contiguous growable array built on [`av_raw::RawBuffer`].
//!
//! [`DynamicArray<T>`] keeps the usual dynamic-array contract: amortized
//! O(1) append, O(1) random access, automatic growth and ownership of its
//! elements. What it adds is an explicit, tested ordering for every
//! reallocation:
//!
//! 1. allocate the next buffer (`max(1, 2 * capacity)` slots on growth),
//! 2. construct the new value inside it,
//! 3. relocate the existing elements,
//! 4. release the old storage.
//!
//! Allocation or construction failing in steps 1-2 leaves the array exactly
//! as it was. Relocation in step 3 is a bitwise move and cannot fail.
//!
//! ```
//! use av_vec::{DynamicArray, dyn_array};
//!
//! let mut array = DynamicArray::new();
//! array.push(1);
//! array.push(2);
//! array.push(3);
//! assert_eq!(array.capacity(), 4);
//!
//! array.insert(1, 9);
//! assert_eq!(array, [1, 9, 2, 3]);
//!
//! array.erase(2);
//! array.pop_back();
//! assert_eq!(array, dyn_array![1, 9]);
//! ```
#![expect(unsafe_code, reason = "Manual element lifetime management.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub mod cfg {
    av_cfg::define_alias! {
        #[cfg(any(feature = "debug", debug_assertions))] => debug,
        #[cfg(feature = "serde")] => serde,
    }
}

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

#[cfg(test)]
extern crate std;

// -----------------------------------------------------------------------------
// Modules

mod array;
mod macros;

// -----------------------------------------------------------------------------
// Top-level exports

pub use array::{DynamicArray, IntoIter};
pub use av_raw::AllocError;
