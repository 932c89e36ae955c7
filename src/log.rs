//  LOG.rs
//    by Lut99
//
//  Created:
//    14 Oct 2026, 09:51:40
//  Last edited:
//    15 Oct 2026, 16:20:12
//  Auto updated?
//    Yes
//
//  Description:
//!   Provides [`log`]-macro counterparts that only log if the `log`-feature
//!   is given.
//!
//!   The engine traces a lot (every binding, every rule tested, every state
//!   expanded), so without the feature these compile to nothing at all.
//


/***** LIBRARY *****/
/// Mirrors the `info!()`-macro from the [`log`](https://github.com/rust-lang/log)-crate if the
/// `log`-feature is enabled, or else does nothing.
#[cfg(feature = "log")]
macro_rules! info {
    ($($t:tt)*) => {
        ::log::info!($($t)*)
    };
}
#[cfg(not(feature = "log"))]
macro_rules! info {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use info;

/// Mirrors the `debug!()`-macro from the [`log`](https://github.com/rust-lang/log)-crate if the
/// `log`-feature is enabled, or else does nothing.
#[cfg(feature = "log")]
macro_rules! debug {
    ($($t:tt)*) => {
        ::log::debug!($($t)*)
    };
}
#[cfg(not(feature = "log"))]
macro_rules! debug {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use debug;

/// Mirrors the `trace!()`-macro from the [`log`](https://github.com/rust-lang/log)-crate if the
/// `log`-feature is enabled, or else does nothing.
#[cfg(feature = "log")]
macro_rules! trace {
    ($($t:tt)*) => {
        ::log::trace!($($t)*)
    };
}
#[cfg(not(feature = "log"))]
macro_rules! trace {
    ($($t:tt)*) => {};
}
#[allow(unused)]
pub(crate) use trace;
