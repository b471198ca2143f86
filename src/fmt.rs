//! Crate-internal logging macros.
//!
//! With the `defmt` feature these forward to `defmt`. Without it they only
//! borrow their arguments, so host builds need no global logger.

macro_rules! info {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::info!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        { $(let _ = &$x;)* }
    }};
}

macro_rules! debug {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::debug!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        { $(let _ = &$x;)* }
    }};
}

// Not `warn`: that name collides with the built-in lint attribute.
macro_rules! warning {
    ($s:literal $(, $x:expr)* $(,)?) => {{
        #[cfg(feature = "defmt")]
        ::defmt::warn!($s $(, $x)*);
        #[cfg(not(feature = "defmt"))]
        { $(let _ = &$x;)* }
    }};
}

pub(crate) use debug;
pub(crate) use info;
pub(crate) use warning;
