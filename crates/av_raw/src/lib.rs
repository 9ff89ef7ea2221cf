//! Untyped storage for a fixed number of element slots.
//!
//! [`RawBuffer<T>`] owns a block of aligned, **uninitialized** memory sized
//! for `capacity` values of `T`. It never constructs or drops elements: the
//! owner decides which slots hold live values and is responsible for them.
//!
//! Keeping allocation apart from construction lets a container build the
//! next buffer completely before giving up the current one, which is what
//! makes growth all-or-nothing.
//!
//! Allocation failures surface as [`AllocError`], either returned from the
//! `try_*` constructors or turned into a panic / allocator abort by
//! [`AllocError::handle_error`].
#![expect(unsafe_code, reason = "Raw storage management is inherently unsafe.")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

// -----------------------------------------------------------------------------
// Compilation config

/// Some macros used for compilation control.
pub mod cfg {
    av_cfg::define_alias! {
        #[cfg(any(feature = "debug", debug_assertions))] => debug,
    }
}

// -----------------------------------------------------------------------------
// No STD Support

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod buffer;
mod error;

// -----------------------------------------------------------------------------
// Top-level exports

pub use buffer::RawBuffer;
pub use error::AllocError;
