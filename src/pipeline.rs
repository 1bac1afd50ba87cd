use std::path::Path;

use nalgebra::{Quaternion, Vector3};

use crate::{
    broadcast::{Node, Root},
    clock::SharedClock,
    config::{ConfigError, PipelineConfig},
    debounce::Debounce,
    filters::{ExponentialMovingAverage, MovingAverage},
    gestures::GestureRecognizer,
    orientation::{CorrectForOrientation, OrientationPoses, OrientationTracker},
    types::{DeviceId, Event, Pose},
};

/// The standard stage tree.
///
/// ```text
/// root ─┬─ debounce ── orientation_poses ── gestures
///       └─ moving_average ── exponential_average ─┬─ tracker
///                                                 └─ correction
/// ```
///
/// Consumers attach below whichever node carries the events they want.
pub struct GesturePipeline {
    root: Node<Root>,
    debounce: Node<Debounce>,
    orientation_poses: Node<OrientationPoses>,
    gestures: Node<GestureRecognizer>,
    moving_average: Node<MovingAverage>,
    exponential_average: Node<ExponentialMovingAverage>,
    tracker: Node<OrientationTracker>,
    correction: Node<CorrectForOrientation>,
}

impl GesturePipeline {
    pub fn new(config: &PipelineConfig, clock: SharedClock) -> Self {
        let root = Node::root();

        let debounce = Node::new(Debounce::new(&config.debounce, clock.clone()));
        let tracker = Node::new(OrientationTracker::new(&config.orientation));
        let orientation_poses = Node::new(OrientationPoses::new(tracker.clone()));
        let gestures = Node::new(GestureRecognizer::new(&config.gestures, clock));

        let moving_average = Node::new(MovingAverage::new(
            config.moving_average.mask(),
            config.moving_average.window,
        ));
        let exponential_average = Node::new(ExponentialMovingAverage::new(
            config.exponential_average.mask(),
            config.exponential_average.alpha,
        ));
        let correction = Node::new(CorrectForOrientation::new(config.correction.mask()));

        root.attach(&debounce);
        debounce.attach(&orientation_poses);
        orientation_poses.attach(&gestures);

        root.attach(&moving_average);
        moving_average.attach(&exponential_average);
        exponential_average.attach(&tracker);
        exponential_average.attach(&correction);

        log::info!(
            "pipeline: assembled debounce_ms={} window={} alpha={}",
            config.debounce.timeout_ms,
            config.moving_average.window,
            config.exponential_average.alpha
        );

        Self {
            root,
            debounce,
            orientation_poses,
            gestures,
            moving_average,
            exponential_average,
            tracker,
            correction,
        }
    }

    pub fn from_path(path: impl AsRef<Path>, clock: SharedClock) -> Result<Self, ConfigError> {
        let config = PipelineConfig::from_path(path)?;
        Ok(Self::new(&config, clock))
    }

    pub fn on_pose(&self, device: DeviceId, timestamp_us: u64, pose: Pose) {
        self.root.dispatch(&Event::pose(device, timestamp_us, pose));
    }

    pub fn on_orientation(&self, device: DeviceId, timestamp_us: u64, rotation: Quaternion<f32>) {
        self.root
            .dispatch(&Event::orientation(device, timestamp_us, rotation));
    }

    pub fn on_accelerometer(&self, device: DeviceId, timestamp_us: u64, vector: Vector3<f32>) {
        self.root
            .dispatch(&Event::accelerometer(device, timestamp_us, vector));
    }

    pub fn on_gyroscope(&self, device: DeviceId, timestamp_us: u64, vector: Vector3<f32>) {
        self.root
            .dispatch(&Event::gyroscope(device, timestamp_us, vector));
    }

    pub fn periodic(&self) {
        self.root.periodic();
    }

    pub fn calibrate(&self, device: DeviceId) -> bool {
        self.tracker.stage_mut().calibrate(device)
    }

    pub fn calibrate_all(&self) -> usize {
        self.tracker.stage_mut().calibrate_all()
    }

    pub fn root(&self) -> &Node<Root> {
        &self.root
    }

    pub fn debounce(&self) -> &Node<Debounce> {
        &self.debounce
    }

    pub fn orientation_poses(&self) -> &Node<OrientationPoses> {
        &self.orientation_poses
    }

    pub fn gestures(&self) -> &Node<GestureRecognizer> {
        &self.gestures
    }

    pub fn moving_average(&self) -> &Node<MovingAverage> {
        &self.moving_average
    }

    pub fn exponential_average(&self) -> &Node<ExponentialMovingAverage> {
        &self.exponential_average
    }

    pub fn tracker(&self) -> &Node<OrientationTracker> {
        &self.tracker
    }

    pub fn correction(&self) -> &Node<CorrectForOrientation> {
        &self.correction
    }
}
