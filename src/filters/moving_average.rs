use nalgebra::SVector;

use super::fir::{FirFilter, Recurrence, Window};
use crate::types::ChannelMask;

/// Running arithmetic mean of the window.
///
/// While the window fills, the previous mean is re-weighted by the current length. Once full,
/// the evicted sample's share is swapped for the new one in O(1).
#[derive(Clone, Copy, Debug, Default)]
pub struct Mean;

impl Recurrence for Mean {
    fn recalculate<const D: usize>(
        &self,
        current: Option<&SVector<f32, D>>,
        sample: &SVector<f32, D>,
        evicted: Option<&SVector<f32, D>>,
        window: &Window<D>,
    ) -> SVector<f32, D> {
        match (current, evicted) {
            (None, _) => *sample,
            (Some(mean), None) => {
                let n = window.len() as f32;
                (mean * (n - 1.0) + sample) / n
            }
            (Some(mean), Some(old)) => {
                let capacity = window.capacity() as f32;
                mean - old / capacity + sample / capacity
            }
        }
    }
}

pub type MovingAverage = FirFilter<Mean>;

impl MovingAverage {
    pub fn new(channels: ChannelMask, window: usize) -> Self {
        Self::with_recurrence(Mean, channels, window)
    }
}
