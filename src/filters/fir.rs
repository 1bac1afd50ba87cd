use std::collections::{HashMap, VecDeque};

use nalgebra::{Quaternion, SVector};

use crate::{
    broadcast::{Outbox, Stage},
    types::{Channel, ChannelMask, DeviceId, OrientationEvent, VectorEvent},
};

/// Fixed-capacity trailing window of samples. Capacity never changes after construction.
#[derive(Clone, Debug)]
pub struct Window<const D: usize> {
    samples: VecDeque<SVector<f32, D>>,
    capacity: usize,
}

impl<const D: usize> Window<D> {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends `sample`, returning the oldest sample if the window was already full.
    pub fn push(&mut self, sample: SVector<f32, D>) -> Option<SVector<f32, D>> {
        let evicted = if self.is_full() {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &SVector<f32, D>> {
        self.samples.iter()
    }
}

/// Recomputes a channel's filtered value after `sample` has been pushed into `window`.
///
/// `current` is the previous output (`None` for the first sample) and `evicted` the sample
/// that dropped out of a full window.
pub trait Recurrence {
    fn recalculate<const D: usize>(
        &self,
        current: Option<&SVector<f32, D>>,
        sample: &SVector<f32, D>,
        evicted: Option<&SVector<f32, D>>,
        window: &Window<D>,
    ) -> SVector<f32, D>;
}

#[derive(Clone, Debug)]
struct Track<const D: usize> {
    window: Window<D>,
    value: Option<SVector<f32, D>>,
}

impl<const D: usize> Track<D> {
    fn new(capacity: usize) -> Self {
        Self {
            window: Window::new(capacity),
            value: None,
        }
    }

    fn update<R: Recurrence>(&mut self, recurrence: &R, sample: SVector<f32, D>) -> SVector<f32, D> {
        let evicted = self.window.push(sample);
        let value = recurrence.recalculate(
            self.value.as_ref(),
            &sample,
            evicted.as_ref(),
            &self.window,
        );
        self.value = Some(value);
        value
    }
}

#[derive(Clone, Debug)]
struct DeviceTracks {
    orientation: Track<4>,
    accelerometer: Track<3>,
    gyroscope: Track<3>,
}

impl DeviceTracks {
    fn new(capacity: usize) -> Self {
        Self {
            orientation: Track::new(capacity),
            accelerometer: Track::new(capacity),
            gyroscope: Track::new(capacity),
        }
    }
}

/// Finite-window filter stage generic over its recurrence.
pub struct FirFilter<R> {
    recurrence: R,
    channels: ChannelMask,
    capacity: usize,
    devices: HashMap<DeviceId, DeviceTracks>,
}

impl<R: Recurrence> FirFilter<R> {
    pub fn with_recurrence(recurrence: R, channels: ChannelMask, window: usize) -> Self {
        Self {
            recurrence,
            channels,
            capacity: window.max(1),
            devices: HashMap::new(),
        }
    }

    pub fn channels(&self) -> ChannelMask {
        self.channels
    }

    pub fn window(&self) -> usize {
        self.capacity
    }
}

fn tracks_for(
    devices: &mut HashMap<DeviceId, DeviceTracks>,
    device: DeviceId,
    capacity: usize,
) -> &mut DeviceTracks {
    devices
        .entry(device)
        .or_insert_with(|| DeviceTracks::new(capacity))
}

impl<R: Recurrence> Stage for FirFilter<R> {
    fn on_orientation(&mut self, event: &OrientationEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Orientation) {
            out.orientation(*event);
            return;
        }
        let tracks = tracks_for(&mut self.devices, event.device, self.capacity);
        let filtered = tracks
            .orientation
            .update(&self.recurrence, event.rotation.coords);
        out.orientation(OrientationEvent {
            rotation: Quaternion::from_vector(filtered),
            ..*event
        });
    }

    fn on_accelerometer(&mut self, event: &VectorEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Accelerometer) {
            out.accelerometer(*event);
            return;
        }
        let tracks = tracks_for(&mut self.devices, event.device, self.capacity);
        let vector = tracks.accelerometer.update(&self.recurrence, event.vector);
        out.accelerometer(VectorEvent { vector, ..*event });
    }

    fn on_gyroscope(&mut self, event: &VectorEvent, out: &mut Outbox) {
        if !self.channels.contains(Channel::Gyroscope) {
            out.gyroscope(*event);
            return;
        }
        let tracks = tracks_for(&mut self.devices, event.device, self.capacity);
        let vector = tracks.gyroscope.update(&self.recurrence, event.vector);
        out.gyroscope(VectorEvent { vector, ..*event });
    }
}
