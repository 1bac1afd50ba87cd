//! Click, double-click and hold recognition over the pose stream.

mod hsm;
mod trace;

use std::collections::HashMap;

use embassy_time::Duration;

use crate::{
    broadcast::{Outbox, Stage},
    clock::SharedClock,
    config::GestureConfig,
    types::{DeviceId, Event, PoseEvent},
};

use hsm::GestureMachine;
pub use trace::{GestureStateId, GestureTraceSample};

/// Turns each device's pose sequence into gestures.
///
/// Every incoming pose is re-broadcast as-is after any click it completes. A pose released
/// within the click window yields one single or double click; a pose held past it yields
/// one hold on the next periodic tick.
pub struct GestureRecognizer {
    config: GestureConfig,
    clock: SharedClock,
    machines: HashMap<DeviceId, GestureMachine>,
}

impl GestureRecognizer {
    pub fn new(config: &GestureConfig, clock: SharedClock) -> Self {
        Self {
            config: config.clone(),
            clock,
            machines: HashMap::new(),
        }
    }

    pub fn click_max_hold(&self) -> Duration {
        Duration::from_millis(self.config.click_max_hold_ms)
    }

    pub fn double_click_timeout(&self) -> Duration {
        Duration::from_millis(self.config.double_click_timeout_ms)
    }

    pub fn trace(&self, device: DeviceId) -> Option<GestureTraceSample> {
        self.machines.get(&device).map(GestureMachine::trace)
    }

    fn forward(events: Vec<Event>, out: &mut Outbox) {
        for event in events {
            out.push(event);
        }
    }
}

impl Stage for GestureRecognizer {
    fn on_pose(&mut self, event: &PoseEvent, out: &mut Outbox) {
        let now = self.clock.now();
        let config = &self.config;
        let machine = self
            .machines
            .entry(event.device)
            .or_insert_with(|| GestureMachine::new(event.device, config));
        Self::forward(machine.pose(event.pose, event.timestamp_us, now), out);
    }

    fn on_periodic(&mut self, out: &mut Outbox) {
        let now = self.clock.now();
        let mut machines: Vec<_> = self.machines.iter_mut().collect();
        machines.sort_by_key(|(device, _)| **device);
        for (_, machine) in machines {
            Self::forward(machine.tick(now), out);
        }
    }
}

#[cfg(test)]
mod tests;
