//! Compile-time configuration helpers shared by the workspace crates.
//!
//! Each crate declares its own aliases with [`define_alias!`], usually in a
//! `cfg` module at the crate root:
//!
//! ```
//! mod cfg {
//!     av_cfg::define_alias! {
//!         #[cfg(any(feature = "debug", debug_assertions))] => debug,
//!         #[cfg(feature = "this-feature-does-not-exist")] => never,
//!     }
//! }
//!
//! fn checked(index: usize, len: usize) -> usize {
//!     cfg::debug! { assert!(index < len); }
//!     index
//! }
//!
//! assert_eq!(checked(1, 2), 1);
//! assert!(!cfg::never!());
//! ```
//!
//! An alias is a macro that either passes its input through ([`enabled!`])
//! or discards it ([`disabled!`]). Both understand an `if { .. } else { .. }`
//! form that selects one of two branches, and an empty invocation that
//! evaluates to a `bool`.
#![no_std]

// -----------------------------------------------------------------------------
// Aliases

/// Defines one alias macro per `#[cfg(..)] => name` pair.
///
/// The generated macros are re-exports of [`enabled!`] or [`disabled!`],
/// depending on whether the predicate holds in the crate that invokes
/// `define_alias!`.
#[macro_export]
macro_rules! define_alias {
    () => {};
    (
        #[cfg($meta:meta)] => $name:ident
        $(, $($rest:tt)*)?
    ) => {
        $crate::switch! {
            #[cfg($meta)] => {
                #[doc = concat!(
                    "Passes the given code through, `#[cfg(",
                    stringify!($meta),
                    ")]` is active."
                )]
                #[doc(inline)]
                pub use $crate::enabled as $name;
            }
            _ => {
                #[doc = concat!(
                    "Discards the given code, `#[cfg(",
                    stringify!($meta),
                    ")]` is not active."
                )]
                #[doc(inline)]
                pub use $crate::disabled as $name;
            }
        }

        $( $crate::define_alias! { $($rest)* } )?
    };
}

/// Expands to its input, or to the `if` branch of an `if { .. } else { .. }`.
///
/// An empty invocation evaluates to `true`.
#[macro_export]
macro_rules! enabled {
    () => { true };
    (if { $($p:tt)* } else { $($n:tt)* }) => { $($p)* };
    ($($p:tt)*) => { $($p)* };
}

/// Expands to nothing, or to the `else` branch of an `if { .. } else { .. }`.
///
/// An empty invocation evaluates to `false`.
#[macro_export]
macro_rules! disabled {
    () => { false };
    (if { $($p:tt)* } else { $($n:tt)* }) => { $($n)* };
    ($($p:tt)*) => {};
}

// -----------------------------------------------------------------------------
// Switch

/// Selects the first arm whose condition holds.
///
/// Conditions are either `#[cfg(..)]` predicates or paths to alias macros
/// generated by [`define_alias!`]. `_` matches unconditionally.
///
/// ```
/// mod cfg {
///     av_cfg::define_alias! {
///         #[cfg(feature = "this-feature-does-not-exist")] => never,
///     }
/// }
///
/// av_cfg::switch! {
///     cfg::never => {
///         const PICKED: &str = "never";
///     }
///     #[cfg(any())] => {
///         const PICKED: &str = "empty any";
///     }
///     _ => {
///         const PICKED: &str = "fallback";
///     }
/// }
///
/// assert_eq!(PICKED, "fallback");
/// ```
#[macro_export]
macro_rules! switch {
    () => {};
    (_ => { $($output:tt)* }) => {
        $($output)*
    };
    (
        #[cfg($meta:meta)] => { $($output:tt)* }
        $($rest:tt)*
    ) => {
        #[cfg($meta)]
        $crate::switch! { _ => { $($output)* } }

        #[cfg(not($meta))]
        $crate::switch! { $($rest)* }
    };
    (
        $cond:path => { $($output:tt)* }
        $($rest:tt)*
    ) => {
        $cond! {
            if {
                $crate::switch! { _ => { $($output)* } }
            } else {
                $crate::switch! { $($rest)* }
            }
        }
    };
}
