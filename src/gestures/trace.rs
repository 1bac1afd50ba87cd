use crate::types::{Gesture, Pose};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum GestureStateId {
    #[default]
    Idle = 0,
    Pressed = 1,
    Holding = 2,
}

impl GestureStateId {
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Snapshot of one device's recognizer after its most recent dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GestureTraceSample {
    pub now_us: u64,
    pub state_id: GestureStateId,
    pub pose: Pose,
    pub held_ms: u64,
    /// Last gesture emitted during that dispatch, if any.
    pub emitted: Option<Gesture>,
}
