use std::collections::HashMap;

use nalgebra::{Quaternion, Vector3};

use super::math;
use crate::{
    broadcast::{Outbox, Stage},
    types::{Channel, ChannelMask, DeviceId, OrientationEvent, VectorEvent},
};

/// Rotates accelerometer and gyroscope vectors by the device's latest orientation so they no
/// longer depend on how the sensor sits on the arm.
pub struct CorrectForOrientation {
    channels: ChannelMask,
    latest: HashMap<DeviceId, Quaternion<f32>>,
}

impl CorrectForOrientation {
    pub fn new(channels: ChannelMask) -> Self {
        Self {
            channels,
            latest: HashMap::new(),
        }
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn latest(&self, device: DeviceId) -> Option<Quaternion<f32>> {
        self.latest.get(&device).copied()
    }

    fn correct(&self, channel: Channel, event: &VectorEvent) -> VectorEvent {
        if !self.channels.contains(channel) {
            return *event;
        }
        // Unrotated until the first orientation sample for this device.
        let vector: Vector3<f32> = match self.latest.get(&event.device) {
            Some(q) => math::rotate(q, &event.vector),
            None => event.vector,
        };
        VectorEvent { vector, ..*event }
    }
}

impl Stage for CorrectForOrientation {
    fn on_orientation(&mut self, event: &OrientationEvent, out: &mut Outbox) {
        self.latest.insert(event.device, event.rotation);
        out.orientation(*event);
    }

    fn on_accelerometer(&mut self, event: &VectorEvent, out: &mut Outbox) {
        out.accelerometer(self.correct(Channel::Accelerometer, event));
    }

    fn on_gyroscope(&mut self, event: &VectorEvent, out: &mut Outbox) {
        out.gyroscope(self.correct(Channel::Gyroscope, event));
    }
}
