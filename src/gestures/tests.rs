use std::rc::Rc;

use super::*;
use crate::{
    broadcast::{testing::Recorder, Node},
    clock::ManualClock,
    types::{Gesture, GestureKind, Pose},
};

const DEVICE: DeviceId = DeviceId(1);

struct Rig {
    clock: ManualClock,
    node: Node<GestureRecognizer>,
    out: Rc<Recorder>,
}

impl Rig {
    fn new(click_max_hold_ms: u64, double_click_timeout_ms: u64) -> Self {
        let clock = ManualClock::new();
        let config = GestureConfig {
            click_max_hold_ms,
            double_click_timeout_ms,
        };
        let node = Node::new(GestureRecognizer::new(&config, clock.shared()));
        let out = Recorder::shared();
        node.attach(&out);
        Self { clock, node, out }
    }

    fn pose_at(&self, ms: u64, pose: Pose) {
        self.pose_for(DEVICE, ms, pose);
    }

    fn pose_for(&self, device: DeviceId, ms: u64, pose: Pose) {
        self.clock.set_us(ms * 1_000);
        self.node.dispatch(&Event::pose(device, ms * 1_000, pose));
    }

    fn tick_at(&self, ms: u64) {
        self.clock.set_us(ms * 1_000);
        self.node.periodic();
    }

    fn ticks_through(&self, from_ms: u64, to_ms: u64, step_ms: u64) {
        let mut t = from_ms;
        while t <= to_ms {
            self.tick_at(t);
            t += step_ms;
        }
    }

    fn kinds_for(&self, pose: Pose) -> Vec<GestureKind> {
        self.out
            .gestures()
            .into_iter()
            .filter(|gesture| gesture.pose == pose)
            .map(|gesture| gesture.kind)
            .collect()
    }

    fn gesture_events(&self) -> Vec<(DeviceId, u64, Gesture)> {
        self.out
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Gesture(e) => Some((e.device, e.timestamp_us, e.gesture)),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn quick_release_yields_single_click() {
    let rig = Rig::new(1_000, 750);
    rig.pose_at(0, Pose::Fist);
    rig.pose_at(200, Pose::Rest);

    assert_eq!(rig.kinds_for(Pose::Fist), vec![GestureKind::SingleClick]);
    assert_eq!(
        rig.gesture_events(),
        vec![(
            DEVICE,
            200_000,
            Gesture::new(GestureKind::SingleClick, Pose::Fist)
        )]
    );
}

#[test]
fn second_click_inside_timeout_becomes_double_click() {
    let rig = Rig::new(1_000, 750);
    rig.pose_at(0, Pose::Fist);
    rig.pose_at(200, Pose::Rest);
    rig.pose_at(400, Pose::Fist);
    rig.pose_at(600, Pose::Rest);

    assert_eq!(
        rig.kinds_for(Pose::Fist),
        vec![GestureKind::SingleClick, GestureKind::DoubleClick]
    );
}

#[test]
fn second_click_after_timeout_stays_single() {
    let rig = Rig::new(1_000, 750);
    rig.pose_at(0, Pose::Fist);
    rig.pose_at(100, Pose::Rest);
    rig.pose_at(1_000, Pose::Fist);
    rig.pose_at(1_100, Pose::Rest);

    assert_eq!(
        rig.kinds_for(Pose::Fist),
        vec![GestureKind::SingleClick, GestureKind::SingleClick]
    );
}

#[test]
fn held_pose_emits_one_hold_and_no_click_on_release() {
    let rig = Rig::new(1_000, 750);
    rig.pose_at(0, Pose::Fist);
    rig.ticks_through(0, 1_000, 100);
    assert!(rig.kinds_for(Pose::Fist).is_empty());

    rig.ticks_through(1_100, 3_000, 100);
    assert_eq!(
        rig.gesture_events(),
        vec![(DEVICE, 0, Gesture::new(GestureKind::Hold, Pose::Fist))]
    );

    rig.pose_at(3_050, Pose::Rest);
    assert_eq!(rig.kinds_for(Pose::Fist), vec![GestureKind::Hold]);
}

#[test]
fn each_continuous_hold_fires_once() {
    let rig = Rig::new(500, 750);
    rig.pose_at(0, Pose::Fist);
    rig.ticks_through(0, 2_000, 50);
    rig.pose_at(2_000, Pose::Rest);
    rig.pose_at(2_100, Pose::Fist);
    rig.ticks_through(2_100, 4_000, 50);

    assert_eq!(
        rig.kinds_for(Pose::Fist),
        vec![GestureKind::Hold, GestureKind::Hold]
    );
    assert_eq!(rig.kinds_for(Pose::Rest), vec![GestureKind::SingleClick]);
}

#[test]
fn base_pose_follows_the_click_it_completes() {
    let rig = Rig::new(1_000, 750);
    rig.pose_at(0, Pose::Fist);
    rig.pose_at(200, Pose::WaveIn);

    let events = rig.out.events();
    assert_eq!(
        events,
        vec![
            Event::pose(DEVICE, 0, Pose::Fist),
            Event::gesture(
                DEVICE,
                200_000,
                Gesture::new(GestureKind::SingleClick, Pose::Fist)
            ),
            Event::pose(DEVICE, 200_000, Pose::WaveIn),
        ]
    );
}

#[test]
fn zero_windows_degenerate_to_immediate_firing() {
    let rig = Rig::new(0, 0);
    rig.pose_at(0, Pose::Fist);
    rig.pose_at(0, Pose::Rest);
    assert_eq!(rig.kinds_for(Pose::Fist), vec![GestureKind::SingleClick]);

    rig.pose_at(1, Pose::Fist);
    assert!(rig.kinds_for(Pose::Rest).is_empty());

    rig.tick_at(2);
    assert_eq!(
        rig.kinds_for(Pose::Fist),
        vec![GestureKind::SingleClick, GestureKind::Hold]
    );
}

#[test]
fn devices_are_recognized_independently() {
    let rig = Rig::new(1_000, 750);
    rig.pose_for(DeviceId(1), 0, Pose::Fist);
    rig.pose_for(DeviceId(2), 500, Pose::FingersSpread);

    rig.tick_at(1_100);
    assert_eq!(
        rig.gesture_events(),
        vec![(DeviceId(1), 0, Gesture::new(GestureKind::Hold, Pose::Fist))]
    );

    rig.tick_at(1_600);
    assert_eq!(rig.gesture_events().len(), 2);
    assert_eq!(
        rig.gesture_events()[1],
        (
            DeviceId(2),
            500_000,
            Gesture::new(GestureKind::Hold, Pose::FingersSpread)
        )
    );
}

#[test]
fn trace_reports_state_and_hold_duration() {
    let rig = Rig::new(1_000, 750);
    assert!(rig.node.stage().trace(DEVICE).is_none());

    rig.pose_at(0, Pose::Fist);
    let trace = rig.node.stage().trace(DEVICE).expect("trace after first pose");
    assert_eq!(trace.state_id, GestureStateId::Pressed);
    assert_eq!(trace.pose, Pose::Fist);
    assert_eq!(trace.emitted, None);

    rig.tick_at(600);
    let trace = rig.node.stage().trace(DEVICE).expect("trace after tick");
    assert_eq!(trace.state_id, GestureStateId::Pressed);
    assert_eq!(trace.held_ms, 600);
    assert_eq!(trace.now_us, 600_000);

    rig.tick_at(1_200);
    let trace = rig.node.stage().trace(DEVICE).expect("trace after hold");
    assert_eq!(trace.state_id, GestureStateId::Holding);
    assert_eq!(trace.state_id.as_u8(), 2);
    assert_eq!(
        trace.emitted,
        Some(Gesture::new(GestureKind::Hold, Pose::Fist))
    );
}

#[test]
fn periodic_ticks_keep_flowing_downstream() {
    let rig = Rig::new(1_000, 750);
    rig.ticks_through(0, 400, 100);
    assert_eq!(rig.out.periodic_count(), 5);
    assert!(rig.out.gestures().is_empty());
}
