// kernel/ — Dense row gather/reduce primitives for the averaging engine.
//
// Exactly one implementation is compiled in, selected at build time: the
// portable scalar kernels by default, or candle tensor kernels behind the
// `candle` cargo feature. Both export the same two functions and produce the
// same results, so the engine never branches on which backend it got.
//
// Row data arrives as the flat row-major slice of a VectorTable together
// with its row width. Callers guarantee `indices` is non-empty, every index
// is in range, and (for the weighted variant) `weights` matches `indices`
// in length.

#[cfg(feature = "candle")]
mod candle;
#[cfg(feature = "candle")]
pub use self::candle::{mean_rows, weighted_sum_rows};

#[cfg(not(feature = "candle"))]
mod scalar;
#[cfg(not(feature = "candle"))]
pub use self::scalar::{mean_rows, weighted_sum_rows};
