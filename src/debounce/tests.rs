use super::*;
use crate::{
    broadcast::{testing::Recorder, Node},
    clock::ManualClock,
    types::Event,
};

const DEVICE: DeviceId = DeviceId(1);

struct Rig {
    clock: ManualClock,
    node: Node<Debounce>,
    out: std::rc::Rc<Recorder>,
    next_tick_us: u64,
}

impl Rig {
    fn new(timeout_ms: u64) -> Self {
        let clock = ManualClock::new();
        let config = DebounceConfig {
            timeout_ms,
            ..DebounceConfig::default()
        };
        let node = Node::new(Debounce::new(&config, clock.shared()));
        let out = Recorder::shared();
        node.attach(&out);
        Self {
            clock,
            node,
            out,
            next_tick_us: 0,
        }
    }

    /// Ticks every `cadence_us` up to and including `t_us`, then delivers the pose at `t_us`.
    fn pose_at(&mut self, t_us: u64, pose: Pose, cadence_us: u64) {
        self.ticks_until(t_us, cadence_us);
        self.clock.set_us(t_us);
        self.node.dispatch(&Event::pose(DEVICE, t_us, pose));
    }

    fn ticks_until(&mut self, t_us: u64, cadence_us: u64) {
        while self.next_tick_us <= t_us {
            self.clock.set_us(self.next_tick_us);
            self.node.periodic();
            self.next_tick_us += cadence_us;
        }
    }

    fn emitted(&self) -> Vec<(u64, Pose)> {
        self.out
            .events()
            .into_iter()
            .filter_map(|event| match event {
                Event::Pose(e) => Some((e.timestamp_us, e.pose)),
                _ => None,
            })
            .collect()
    }
}

#[test]
fn pose_held_past_timeout_emits_once_with_its_own_timestamp() {
    for timeout_ms in [5, 10, 100] {
        let mut rig = Rig::new(timeout_ms);
        rig.pose_at(0, Pose::Rest, 1_000);
        rig.pose_at(1, Pose::Fist, 1_000);
        rig.pose_at(1 + timeout_ms * 1_000 + 1, Pose::Rest, 1_000);

        assert_eq!(rig.emitted(), vec![(1, Pose::Fist)], "timeout={timeout_ms}");
    }
}

#[test]
fn pose_replaced_before_timeout_emits_nothing() {
    for timeout_ms in [5, 10, 100] {
        let mut rig = Rig::new(timeout_ms);
        rig.pose_at(0, Pose::Rest, 1_000);
        rig.pose_at(1, Pose::Fist, 1_000);
        rig.pose_at(1 + timeout_ms * 1_000 - 1, Pose::Rest, 1_000);

        assert!(rig.emitted().is_empty(), "timeout={timeout_ms}");
    }
}

#[test]
fn periodic_tick_emits_stable_pose_exactly_once() {
    let mut rig = Rig::new(10);
    rig.pose_at(0, Pose::Fist, 5_000);
    rig.ticks_until(200_000, 5_000);

    assert_eq!(rig.emitted(), vec![(0, Pose::Fist)]);
    assert_eq!(rig.node.stage().last_emitted(DEVICE), Some(Pose::Fist));
    assert_eq!(rig.out.periodic_count(), 41);
}

#[test]
fn returning_to_last_emitted_pose_is_not_reemitted() {
    let mut rig = Rig::new(10);
    rig.pose_at(0, Pose::Fist, 5_000);
    rig.ticks_until(50_000, 5_000);
    rig.pose_at(52_000, Pose::Rest, 5_000);
    rig.pose_at(53_000, Pose::Fist, 5_000);
    rig.ticks_until(200_000, 5_000);

    assert_eq!(rig.emitted(), vec![(0, Pose::Fist)]);
}

#[test]
fn instantaneous_pose_bypasses_the_timeout() {
    let mut rig = Rig::new(100);
    rig.pose_at(0, Pose::Rest, 50_000);
    rig.pose_at(10, Pose::DoubleTap, 50_000);

    assert_eq!(rig.emitted(), vec![(10, Pose::DoubleTap)]);

    rig.pose_at(20, Pose::Rest, 50_000);
    rig.ticks_until(500_000, 50_000);
    assert_eq!(
        rig.emitted(),
        vec![(10, Pose::DoubleTap), (20, Pose::Rest)]
    );
}

#[test]
fn no_ticks_means_no_time_based_emission() {
    let clock = ManualClock::new();
    let node = Node::new(Debounce::new(&DebounceConfig::default(), clock.shared()));
    let out = Recorder::shared();
    node.attach(&out);

    node.dispatch(&Event::pose(DEVICE, 0, Pose::Fist));
    clock.advance_ms(10_000);

    assert!(out.poses().is_empty());

    node.periodic();
    assert_eq!(out.poses(), vec![Pose::Fist]);
}

#[test]
fn zero_timeout_fires_on_first_tick_after_any_elapsed_time() {
    let mut rig = Rig::new(0);
    rig.pose_at(0, Pose::Fist, 1);
    assert!(rig.emitted().is_empty());

    rig.ticks_until(1, 1);
    assert_eq!(rig.emitted(), vec![(0, Pose::Fist)]);
}

#[test]
fn devices_debounce_independently() {
    let clock = ManualClock::new();
    let node = Node::new(Debounce::new(&DebounceConfig::default(), clock.shared()));
    let out = Recorder::shared();
    node.attach(&out);

    node.dispatch(&Event::pose(DeviceId(1), 0, Pose::Fist));
    clock.advance_ms(8);
    node.dispatch(&Event::pose(DeviceId(2), 8_000, Pose::WaveIn));
    clock.advance_ms(4);
    node.periodic();

    assert_eq!(out.poses(), vec![Pose::Fist]);

    clock.advance_ms(10);
    node.periodic();
    assert_eq!(out.poses(), vec![Pose::Fist, Pose::WaveIn]);
}
