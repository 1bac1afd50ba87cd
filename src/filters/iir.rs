use std::collections::HashMap;

use nalgebra::{Quaternion, SVector, Vector3, Vector4};

use crate::{
    broadcast::{Outbox, Stage},
    types::{Channel, ChannelMask, DeviceId, OrientationEvent, VectorEvent},
};

/// Combines one component of a new sample with the previous output component.
pub trait Blend {
    fn blend(&self, sample: f32, previous: f32) -> f32;
}

#[derive(Clone, Copy, Debug, Default)]
struct Running {
    orientation: Option<Vector4<f32>>,
    accelerometer: Option<Vector3<f32>>,
    gyroscope: Option<Vector3<f32>>,
}

fn advance<B: Blend, const D: usize>(
    blend: &B,
    slot: &mut Option<SVector<f32, D>>,
    sample: SVector<f32, D>,
) -> SVector<f32, D> {
    // The first sample seeds the output as-is.
    let next = match slot {
        Some(previous) => sample.zip_map(previous, |new, old| blend.blend(new, old)),
        None => sample,
    };
    *slot = Some(next);
    next
}

/// Recursive filter stage: each output depends only on the new sample and the previous output.
pub struct IirFilter<B> {
    blend: B,
    channels: ChannelMask,
    devices: HashMap<DeviceId, Running>,
}

impl<B: Blend> IirFilter<B> {
    pub fn with_blend(blend: B, channels: ChannelMask) -> Self {
        Self {
            blend,
            channels,
            devices: HashMap::new(),
        }
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn blend(&self) -> &B {
        &self.blend
    }
}

impl<B: Blend> Stage for IirFilter<B> {
    fn on_orientation(&mut self, event: &OrientationEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Orientation) {
            out.orientation(*event);
            return;
        }
        let running = self.devices.entry(event.device).or_default();
        let coords = advance(&self.blend, &mut running.orientation, event.rotation.coords);
        out.orientation(OrientationEvent {
            rotation: Quaternion::from_vector(coords),
            ..*event
        });
    }

    fn on_accelerometer(&mut self, event: &VectorEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Accelerometer) {
            out.accelerometer(*event);
            return;
        }
        let running = self.devices.entry(event.device).or_default();
        let vector = advance(&self.blend, &mut running.accelerometer, event.vector);
        out.accelerometer(VectorEvent { vector, ..*event });
    }

    fn on_gyroscope(&mut self, event: &VectorEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Gyroscope) {
            out.gyroscope(*event);
            return;
        }
        let running = self.devices.entry(event.device).or_default();
        let vector = advance(&self.blend, &mut running.gyroscope, event.vector);
        out.gyroscope(VectorEvent { vector, ..*event });
    }
}
