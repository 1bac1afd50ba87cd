use super::{OrientationTracker, WristOrientation};
use crate::{
    broadcast::{Node, Outbox, Stage},
    types::{DeviceId, Pose, PoseEvent},
};

/// Splits the two wave poses into up/down variants using the wrist orientation.
///
/// The tracker is read at the moment each pose arrives, so the decision always reflects the
/// most recent orientation sample that reached it.
///
/// This stage never handles orientation events itself; it forwards them and only reads the
/// tracker node it was given. That tracker must be attached to an orientation stream. A tracker
/// that never receives samples stays neutral, and every wave then passes through unchanged as
/// if the wrist were sideways.
pub struct OrientationPoses {
    tracker: Node<OrientationTracker>,
}

impl OrientationPoses {
    pub fn new(tracker: Node<OrientationTracker>) -> Self {
        Self { tracker }
    }

    pub fn tracker(&self) -> &Node<OrientationTracker> {
        &self.tracker
    }

    pub fn reinterpret(&self, device: DeviceId, pose: Pose) -> Pose {
        let wrist = self.tracker.stage().wrist(device);
        match (pose, wrist) {
            (Pose::WaveIn, WristOrientation::Down) | (Pose::WaveOut, WristOrientation::Up) => {
                Pose::WaveDown
            }
            (Pose::WaveIn, WristOrientation::Up) | (Pose::WaveOut, WristOrientation::Down) => {
                Pose::WaveUp
            }
            _ => pose,
        }
    }
}

impl Stage for OrientationPoses {
    fn on_pose(&mut self, event: &PoseEvent, out: &mut Outbox) {
        let pose = self.reinterpret(event.device, event.pose);
        if pose != event.pose {
            log::debug!(
                "orientation_poses: device={} {} -> {}",
                event.device,
                event.pose,
                pose
            );
        }
        out.pose(PoseEvent { pose, ..*event });
    }
}
