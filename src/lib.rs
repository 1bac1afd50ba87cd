//! Turns classified hand poses and raw IMU samples from a wearable sensor into debounced
//! poses, orientation-corrected vectors, orientation-aware poses and gestures.
//!
//! Stages are composed into a tree of [`broadcast::Node`]s. The sensor source feeds the root;
//! every node re-broadcasts what its stage produces to its children.

pub mod blocker;
pub mod broadcast;
pub mod clock;
pub mod config;
pub mod debounce;
pub mod filters;
pub mod gestures;
pub mod orientation;
pub mod pipeline;
pub mod types;

pub use broadcast::{Node, Stage};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use config::{ConfigError, PipelineConfig};
pub use pipeline::GesturePipeline;
pub use types::{DeviceId, Event, Gesture, GestureKind, Pose};
