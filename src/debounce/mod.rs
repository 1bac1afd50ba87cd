use std::collections::HashMap;

use embassy_time::Duration;

use crate::{
    broadcast::{Outbox, Stage},
    clock::{SharedClock, Stopwatch},
    config::DebounceConfig,
    types::{DeviceId, Pose, PoseEvent},
};

#[derive(Clone, Copy, Debug)]
struct DeviceState {
    last_raw: Pose,
    last_raw_at_us: u64,
    last_emitted: Pose,
    changed: Stopwatch,
}

/// Republishes a pose only once it has been stable for longer than the timeout.
///
/// Expiry is checked on every periodic tick against the injected clock, and on every raw pose
/// against the sensor timestamp of the previous raw pose. The comparison baseline
/// (`last_emitted`) only moves when a pose is emitted. The instantaneous pose bypasses the
/// timeout entirely.
pub struct Debounce {
    timeout: Duration,
    instantaneous: Pose,
    clock: SharedClock,
    devices: HashMap<DeviceId, DeviceState>,
}

impl Debounce {
    pub fn new(config: &DebounceConfig, clock: SharedClock) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            instantaneous: config.instantaneous,
            clock,
            devices: HashMap::new(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn last_emitted(&self, device: DeviceId) -> Option<Pose> {
        self.devices.get(&device).map(|state| state.last_emitted)
    }

    fn emit(device: DeviceId, state: &mut DeviceState, out: &mut Outbox) {
        log::debug!(
            "debounce: device={} emit pose={} ts_us={}",
            device,
            state.last_raw,
            state.last_raw_at_us
        );
        state.last_emitted = state.last_raw;
        out.pose(PoseEvent {
            device,
            timestamp_us: state.last_raw_at_us,
            pose: state.last_raw,
        });
    }
}

impl Stage for Debounce {
    fn on_pose(&mut self, event: &PoseEvent, out: &mut Outbox) {
        let now = self.clock.now();
        let state = self.devices.entry(event.device).or_insert(DeviceState {
            last_raw: Pose::Rest,
            last_raw_at_us: 0,
            last_emitted: Pose::Rest,
            changed: Stopwatch::started(now),
        });

        let held = Duration::from_micros(event.timestamp_us.saturating_sub(state.last_raw_at_us));
        if held > self.timeout && state.last_raw != state.last_emitted {
            Self::emit(event.device, state, out);
        }

        state.last_raw = event.pose;
        state.last_raw_at_us = event.timestamp_us;
        state.changed.tick(now);

        // Too short-lived to ever survive the timeout.
        if event.pose == self.instantaneous {
            Self::emit(event.device, state, out);
        }
    }

    fn on_periodic(&mut self, out: &mut Outbox) {
        let now = self.clock.now();
        let mut devices: Vec<_> = self.devices.iter_mut().collect();
        devices.sort_by_key(|(device, _)| **device);
        for (device, state) in devices {
            if state.changed.since_tick(now) > self.timeout && state.last_raw != state.last_emitted
            {
                Self::emit(*device, state, out);
                state.changed.tick(now);
            }
        }
    }
}

#[cfg(test)]
mod tests;
