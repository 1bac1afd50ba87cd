use std::collections::HashMap;

use embassy_time::{Duration, Instant};
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::trace::{GestureStateId, GestureTraceSample};
use crate::{
    clock::Stopwatch,
    config::GestureConfig,
    types::{DeviceId, Event, Gesture, GestureKind, Pose},
};

#[derive(Clone, Copy, Debug)]
enum GestureHsmEvent {
    Pose {
        pose: Pose,
        timestamp_us: u64,
        now: Instant,
    },
    Tick {
        now: Instant,
    },
}

#[derive(Default)]
struct DispatchContext {
    emitted: Vec<Event>,
}

/// One device's click/double-click/hold machine.
pub(super) struct GestureMachine {
    machine: statig::blocking::StateMachine<GestureHsm>,
}

impl GestureMachine {
    pub(super) fn new(device: DeviceId, config: &GestureConfig) -> Self {
        Self {
            machine: GestureHsm::new(device, config).state_machine(),
        }
    }

    /// Releases the held pose, presses `pose`, and returns the events to broadcast.
    pub(super) fn pose(&mut self, pose: Pose, timestamp_us: u64, now: Instant) -> Vec<Event> {
        let mut context = DispatchContext::default();
        self.machine.handle_with_context(
            &GestureHsmEvent::Pose {
                pose,
                timestamp_us,
                now,
            },
            &mut context,
        );
        context.emitted
    }

    pub(super) fn tick(&mut self, now: Instant) -> Vec<Event> {
        let mut context = DispatchContext::default();
        self.machine
            .handle_with_context(&GestureHsmEvent::Tick { now }, &mut context);
        context.emitted
    }

    pub(super) fn trace(&self) -> GestureTraceSample {
        self.machine.inner().last_trace
    }
}

#[derive(Clone, Copy, Debug)]
struct Pressed {
    pose: Pose,
    timestamp_us: u64,
}

struct GestureHsm {
    device: DeviceId,
    click_max: Duration,
    double_click_timeout: Duration,
    current: Option<Pressed>,
    // Keyed by gesture: `none` marks the press, click kinds mark when they were emitted.
    timers: HashMap<Gesture, Stopwatch>,
    last_trace: GestureTraceSample,
}

impl GestureHsm {
    fn new(device: DeviceId, config: &GestureConfig) -> Self {
        Self {
            device,
            click_max: Duration::from_millis(config.click_max_hold_ms),
            double_click_timeout: Duration::from_millis(config.double_click_timeout_ms),
            current: None,
            timers: HashMap::new(),
            last_trace: GestureTraceSample::default(),
        }
    }

    fn press_timer(&self, pose: Pose) -> Option<Stopwatch> {
        self.timers
            .get(&Gesture::new(GestureKind::None, pose))
            .copied()
    }

    fn held_for(&self, now: Instant) -> Duration {
        self.current
            .and_then(|pressed| self.press_timer(pressed.pose))
            .map_or(Duration::from_millis(0), |timer| timer.since_tick(now))
    }

    fn emit(&mut self, context: &mut DispatchContext, timestamp_us: u64, gesture: Gesture) {
        log::debug!(
            "gestures: device={} gesture={} ts_us={}",
            self.device,
            gesture,
            timestamp_us
        );
        context
            .emitted
            .push(Event::gesture(self.device, timestamp_us, gesture));
        self.last_trace.emitted = Some(gesture);
    }

    /// Emits a click for the previous pose if it was let go within the click window.
    fn release(&mut self, context: &mut DispatchContext, timestamp_us: u64, now: Instant) {
        let Some(previous) = self.current else {
            return;
        };
        let Some(pressed_at) = self.press_timer(previous.pose) else {
            return;
        };
        if pressed_at.since_tick(now) > self.click_max {
            return;
        }

        let last_single = self
            .timers
            .get(&Gesture::new(GestureKind::SingleClick, previous.pose));
        let kind = match last_single {
            Some(single) if Stopwatch::between(single, &pressed_at) <= self.double_click_timeout => {
                GestureKind::DoubleClick
            }
            _ => GestureKind::SingleClick,
        };

        let gesture = Gesture::new(kind, previous.pose);
        self.timers.insert(gesture, Stopwatch::started(now));
        self.emit(context, timestamp_us, gesture);
    }

    fn press(&mut self, context: &mut DispatchContext, pose: Pose, timestamp_us: u64, now: Instant) {
        self.timers
            .insert(Gesture::new(GestureKind::None, pose), Stopwatch::started(now));
        self.current = Some(Pressed { pose, timestamp_us });
        context
            .emitted
            .push(Event::pose(self.device, timestamp_us, pose));
    }

    fn update_trace(&mut self, state_id: GestureStateId, now: Instant) {
        self.last_trace = GestureTraceSample {
            now_us: now.as_micros(),
            state_id,
            pose: self.current.map_or(Pose::Unknown, |pressed| pressed.pose),
            held_ms: self.held_for(now).as_millis(),
            emitted: self.last_trace.emitted,
        };
    }
}

#[state_machine(initial = "State::idle()")]
impl GestureHsm {
    #[state(superstate = "tracking")]
    fn idle(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Tick { now } => {
                self.update_trace(GestureStateId::Idle, *now);
                Handled
            }
            GestureHsmEvent::Pose { .. } => Super,
        }
    }

    #[state(superstate = "tracking")]
    fn pressed(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Tick { now } => {
                self.last_trace.emitted = None;
                if let Some(pressed) = self.current {
                    if self.held_for(*now) > self.click_max {
                        self.emit(
                            context,
                            pressed.timestamp_us,
                            Gesture::new(GestureKind::Hold, pressed.pose),
                        );
                        self.update_trace(GestureStateId::Holding, *now);
                        return Transition(State::holding());
                    }
                }
                self.update_trace(GestureStateId::Pressed, *now);
                Handled
            }
            GestureHsmEvent::Pose { .. } => Super,
        }
    }

    #[state(superstate = "tracking")]
    fn holding(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        let _ = context;
        match event {
            GestureHsmEvent::Tick { now } => {
                self.last_trace.emitted = None;
                self.update_trace(GestureStateId::Holding, *now);
                Handled
            }
            GestureHsmEvent::Pose { .. } => Super,
        }
    }

    #[superstate]
    fn tracking(&mut self, context: &mut DispatchContext, event: &GestureHsmEvent) -> Outcome<State> {
        match event {
            GestureHsmEvent::Pose {
                pose,
                timestamp_us,
                now,
            } => {
                self.last_trace.emitted = None;
                self.release(context, *timestamp_us, *now);
                self.press(context, *pose, *timestamp_us, *now);
                self.update_trace(GestureStateId::Pressed, *now);
                Transition(State::pressed())
            }
            GestureHsmEvent::Tick { .. } => Handled,
        }
    }
}
