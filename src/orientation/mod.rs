//! Coarse arm and wrist orientation relative to a calibrated pose.

mod correct;
pub mod math;
mod poses;

use core::fmt;
use std::collections::HashMap;

use nalgebra::Quaternion;

use crate::{
    broadcast::{Outbox, Stage},
    config::OrientationConfig,
    types::{DeviceId, OrientationEvent},
};

pub use correct::CorrectForOrientation;
pub use poses::OrientationPoses;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArmOrientation {
    #[default]
    Level,
    Down,
    Up,
}

impl fmt::Display for ArmOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ArmOrientation::Level => "level",
            ArmOrientation::Down => "down",
            ArmOrientation::Up => "up",
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WristOrientation {
    #[default]
    Sideways,
    Down,
    Up,
}

impl fmt::Display for WristOrientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WristOrientation::Sideways => "sideways",
            WristOrientation::Down => "down",
            WristOrientation::Up => "up",
        })
    }
}

#[derive(Clone, Copy, Debug)]
struct DeviceOrientation {
    live: Quaternion<f32>,
    reference: Option<Quaternion<f32>>,
}

impl DeviceOrientation {
    fn relative(&self, conversion: fn(&Quaternion<f32>) -> f32) -> f32 {
        match self.reference {
            Some(reference) => math::relative_angle(&reference, &self.live, conversion),
            None => 0.0,
        }
    }
}

/// Tracks the live orientation of every device and classifies it against a calibrated
/// reference.
///
/// Until a device is calibrated its relative angles are zero and it classifies as
/// level/sideways.
pub struct OrientationTracker {
    thresholds: OrientationConfig,
    devices: HashMap<DeviceId, DeviceOrientation>,
}

impl OrientationTracker {
    pub fn new(config: &OrientationConfig) -> Self {
        Self {
            thresholds: config.clone(),
            devices: HashMap::new(),
        }
    }

    /// Snapshots the device's live orientation as its reference. Returns `false` when no
    /// orientation has been seen for `device` yet.
    pub fn calibrate(&mut self, device: DeviceId) -> bool {
        match self.devices.get_mut(&device) {
            Some(state) => {
                state.reference = Some(state.live);
                log::info!("orientation: device={} calibrated", device);
                true
            }
            None => {
                log::warn!("orientation: device={} calibrate before first sample", device);
                false
            }
        }
    }

    /// Calibrates every device seen so far and returns how many there were.
    pub fn calibrate_all(&mut self) -> usize {
        for state in self.devices.values_mut() {
            state.reference = Some(state.live);
        }
        log::info!("orientation: calibrated {} device(s)", self.devices.len());
        self.devices.len()
    }

    pub fn is_calibrated(&self, device: DeviceId) -> bool {
        self.devices
            .get(&device)
            .is_some_and(|state| state.reference.is_some())
    }

    pub fn live(&self, device: DeviceId) -> Option<Quaternion<f32>> {
        self.devices.get(&device).map(|state| state.live)
    }

    pub fn reference(&self, device: DeviceId) -> Option<Quaternion<f32>> {
        self.devices.get(&device).and_then(|state| state.reference)
    }

    pub fn relative_arm_angle(&self, device: DeviceId) -> f32 {
        self.devices
            .get(&device)
            .map_or(0.0, |state| state.relative(math::pitch))
    }

    pub fn relative_wrist_angle(&self, device: DeviceId) -> f32 {
        self.devices
            .get(&device)
            .map_or(0.0, |state| state.relative(math::roll))
    }

    pub fn arm(&self, device: DeviceId) -> ArmOrientation {
        let angle = self.relative_arm_angle(device);
        if angle < self.thresholds.arm_up_below {
            ArmOrientation::Up
        } else if angle > self.thresholds.arm_down_above {
            ArmOrientation::Down
        } else {
            ArmOrientation::Level
        }
    }

    pub fn wrist(&self, device: DeviceId) -> WristOrientation {
        let angle = self.relative_wrist_angle(device);
        if angle < self.thresholds.wrist_down_below {
            WristOrientation::Down
        } else if angle > self.thresholds.wrist_up_above {
            WristOrientation::Up
        } else {
            WristOrientation::Sideways
        }
    }
}

impl Stage for OrientationTracker {
    fn on_orientation(&mut self, event: &OrientationEvent, out: &mut Outbox) {
        self.devices
            .entry(event.device)
            .and_modify(|state| state.live = event.rotation)
            .or_insert(DeviceOrientation {
                live: event.rotation,
                reference: None,
            });
        out.orientation(*event);
    }
}
