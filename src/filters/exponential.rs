use super::iir::{Blend, IirFilter};
use crate::types::ChannelMask;

/// `alpha * new + (1 - alpha) * previous`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ema {
    pub alpha: f32,
}

impl Blend for Ema {
    fn blend(&self, sample: f32, previous: f32) -> f32 {
        self.alpha * sample + (1.0 - self.alpha) * previous
    }
}

pub type ExponentialMovingAverage = IirFilter<Ema>;

impl ExponentialMovingAverage {
    pub fn new(channels: ChannelMask, alpha: f32) -> Self {
        Self::with_blend(Ema { alpha }, channels)
    }

    pub fn alpha(&self) -> f32 {
        self.blend().alpha
    }
}
