//! Per-channel smoothing stages for orientation, accelerometer and gyroscope samples.
//!
//! Both families keep their state per device and per channel. Channels missing from the
//! stage's [`ChannelMask`](crate::types::ChannelMask) pass through untouched, as do pose and
//! gesture events.

mod exponential;
mod fir;
mod iir;
mod moving_average;

pub use exponential::{Ema, ExponentialMovingAverage};
pub use fir::{FirFilter, Recurrence, Window};
pub use iir::{Blend, IirFilter};
pub use moving_average::{Mean, MovingAverage};
