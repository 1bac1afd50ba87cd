use core::{fmt, ops::BitOr};

use nalgebra::{Quaternion, Vector3};
use serde::Deserialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeviceId(pub u32);

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classified hand pose.
///
/// The first seven variants are reported by the sensor; `WaveUp`/`WaveDown` are produced by
/// orientation-aware reinterpretation. Every variant owns a unique tag, and equality is
/// equality of tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pose {
    Rest,
    Fist,
    WaveIn,
    WaveOut,
    FingersSpread,
    DoubleTap,
    #[default]
    Unknown,
    WaveUp,
    WaveDown,
}

impl Pose {
    pub const ALL: [Pose; 9] = [
        Pose::Rest,
        Pose::Fist,
        Pose::WaveIn,
        Pose::WaveOut,
        Pose::FingersSpread,
        Pose::DoubleTap,
        Pose::Unknown,
        Pose::WaveUp,
        Pose::WaveDown,
    ];

    pub const fn tag(self) -> &'static str {
        match self {
            Pose::Rest => "rest",
            Pose::Fist => "fist",
            Pose::WaveIn => "waveIn",
            Pose::WaveOut => "waveOut",
            Pose::FingersSpread => "fingersSpread",
            Pose::DoubleTap => "doubleTap",
            Pose::Unknown => "unknown",
            Pose::WaveUp => "waveUp",
            Pose::WaveDown => "waveDown",
        }
    }

    /// Unrecognized tags classify as `Unknown`.
    pub fn from_tag(tag: &str) -> Pose {
        Self::ALL
            .into_iter()
            .find(|pose| pose.tag() == tag)
            .unwrap_or(Pose::Unknown)
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GestureKind {
    #[default]
    Unknown,
    None,
    SingleClick,
    DoubleClick,
    Hold,
}

impl GestureKind {
    pub const fn tag(self) -> &'static str {
        match self {
            GestureKind::Unknown => "unknown",
            GestureKind::None => "none",
            GestureKind::SingleClick => "singleClick",
            GestureKind::DoubleClick => "doubleClick",
            GestureKind::Hold => "hold",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A temporal classification of the pose it carries.
///
/// Two gestures are equal exactly when their descriptive strings (`kind: pose`) are equal;
/// the derived equality over both fields is that relation since tags are unique.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gesture {
    pub kind: GestureKind,
    pub pose: Pose,
}

impl Gesture {
    pub const fn new(kind: GestureKind, pose: Pose) -> Self {
        Self { kind, pose }
    }

    pub fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.pose)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoseEvent {
    pub device: DeviceId,
    pub timestamp_us: u64,
    pub pose: Pose,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GestureEvent {
    pub device: DeviceId,
    pub timestamp_us: u64,
    pub gesture: Gesture,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrientationEvent {
    pub device: DeviceId,
    pub timestamp_us: u64,
    pub rotation: Quaternion<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VectorEvent {
    pub device: DeviceId,
    pub timestamp_us: u64,
    pub vector: Vector3<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    Pose(PoseEvent),
    Gesture(GestureEvent),
    Orientation(OrientationEvent),
    Accelerometer(VectorEvent),
    Gyroscope(VectorEvent),
    Periodic,
}

impl Event {
    pub fn pose(device: DeviceId, timestamp_us: u64, pose: Pose) -> Self {
        Event::Pose(PoseEvent {
            device,
            timestamp_us,
            pose,
        })
    }

    pub fn gesture(device: DeviceId, timestamp_us: u64, gesture: Gesture) -> Self {
        Event::Gesture(GestureEvent {
            device,
            timestamp_us,
            gesture,
        })
    }

    pub fn orientation(device: DeviceId, timestamp_us: u64, rotation: Quaternion<f32>) -> Self {
        Event::Orientation(OrientationEvent {
            device,
            timestamp_us,
            rotation,
        })
    }

    pub fn accelerometer(device: DeviceId, timestamp_us: u64, vector: Vector3<f32>) -> Self {
        Event::Accelerometer(VectorEvent {
            device,
            timestamp_us,
            vector,
        })
    }

    pub fn gyroscope(device: DeviceId, timestamp_us: u64, vector: Vector3<f32>) -> Self {
        Event::Gyroscope(VectorEvent {
            device,
            timestamp_us,
            vector,
        })
    }

    pub const fn kind(&self) -> EventKind {
        match self {
            Event::Pose(_) => EventKind::Pose,
            Event::Gesture(_) => EventKind::Gesture,
            Event::Orientation(_) => EventKind::Orientation,
            Event::Accelerometer(_) => EventKind::Accelerometer,
            Event::Gyroscope(_) => EventKind::Gyroscope,
            Event::Periodic => EventKind::Periodic,
        }
    }

    pub const fn device(&self) -> Option<DeviceId> {
        match self {
            Event::Pose(e) => Some(e.device),
            Event::Gesture(e) => Some(e.device),
            Event::Orientation(e) => Some(e.device),
            Event::Accelerometer(e) | Event::Gyroscope(e) => Some(e.device),
            Event::Periodic => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum EventKind {
    Pose = 0,
    Gesture = 1,
    Orientation = 2,
    Accelerometer = 3,
    Gyroscope = 4,
    Periodic = 5,
}

impl EventKind {
    pub const COUNT: usize = 6;

    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventMask(u8);

impl EventMask {
    pub const NONE: Self = Self(0);
    pub const POSE: Self = Self(EventKind::Pose.bit());
    pub const GESTURE: Self = Self(EventKind::Gesture.bit());
    pub const ORIENTATION: Self = Self(EventKind::Orientation.bit());
    pub const ACCELEROMETER: Self = Self(EventKind::Accelerometer.bit());
    pub const GYROSCOPE: Self = Self(EventKind::Gyroscope.bit());
    pub const PERIODIC: Self = Self(EventKind::Periodic.bit());
    pub const ALL: Self = Self(0x3F);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, kind: EventKind) -> bool {
        self.0 & kind.bit() != 0
    }
}

impl BitOr for EventMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl From<EventKind> for EventMask {
    fn from(kind: EventKind) -> Self {
        Self(kind.bit())
    }
}

/// Sensor data channel a filter or correction stage may operate on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Orientation,
    Accelerometer,
    Gyroscope,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const NONE: Self = Self(0);
    pub const ORIENTATION: Self = Self(0x01);
    pub const ACCELEROMETER: Self = Self(0x02);
    pub const GYROSCOPE: Self = Self(0x04);
    pub const ALL: Self = Self(0x07);

    pub const fn contains(self, channel: Channel) -> bool {
        self.0 & Self::of(channel).0 != 0
    }

    pub const fn of(channel: Channel) -> Self {
        match channel {
            Channel::Orientation => Self::ORIENTATION,
            Channel::Accelerometer => Self::ACCELEROMETER,
            Channel::Gyroscope => Self::GYROSCOPE,
        }
    }

    pub fn from_channels(channels: &[Channel]) -> Self {
        channels
            .iter()
            .fold(Self::NONE, |mask, channel| mask | Self::of(*channel))
    }
}

impl BitOr for ChannelMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
