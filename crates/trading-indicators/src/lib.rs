//! Window statistics for breakout detection.
//!
//! - `WindowStats`: high, low and mean volume of a bar window
//! - `simd`: vectorized reductions used to compute them

pub mod simd;
mod window;

pub use window::WindowStats;
