//! Fan-out tree every pipeline stage is built on.
//!
//! A [`Node`] owns one [`Stage`] and an ordered set of children. An incoming event is handed to
//! the stage, which writes whatever it wants to republish into an [`Outbox`]; the node then
//! broadcasts each outgoing event to its children in attach order. `Periodic` is always
//! forwarded by the node itself after the stage's own output, so a stage that reacts to ticks
//! cannot cut its subtree off from them. Only [`Stage::blocks`] can stop an event kind.
//!
//! The stage is borrowed only while it handles an event, never while children run, so a
//! descendant may read any stage (including its own ancestors) and may attach or detach
//! children anywhere in the tree mid-dispatch. Detaching never affects a broadcast that has
//! already started: every broadcast iterates a snapshot of the child list.

use core::{
    cell::{Ref, RefCell, RefMut},
    ptr,
};
use std::rc::Rc;

use crate::types::{Event, EventKind, GestureEvent, OrientationEvent, PoseEvent, VectorEvent};

pub trait Listener {
    fn dispatch(&self, event: &Event);
}

pub type SharedListener = Rc<dyn Listener>;

pub trait AsListener {
    fn as_listener(&self) -> SharedListener;
}

impl<L: Listener + 'static> AsListener for Rc<L> {
    fn as_listener(&self) -> SharedListener {
        self.clone()
    }
}

#[derive(Debug, Default)]
pub struct Outbox {
    events: Vec<Event>,
}

impl Outbox {
    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn pose(&mut self, event: PoseEvent) {
        self.push(Event::Pose(event));
    }

    pub fn gesture(&mut self, event: GestureEvent) {
        self.push(Event::Gesture(event));
    }

    pub fn orientation(&mut self, event: OrientationEvent) {
        self.push(Event::Orientation(event));
    }

    pub fn accelerometer(&mut self, event: VectorEvent) {
        self.push(Event::Accelerometer(event));
    }

    pub fn gyroscope(&mut self, event: VectorEvent) {
        self.push(Event::Gyroscope(event));
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }
}

/// Per-kind event handlers. Every default forwards the event unchanged.
pub trait Stage {
    /// Checked before any handler; a blocked event is neither handled nor forwarded.
    fn blocks(&mut self, kind: EventKind) -> bool {
        let _ = kind;
        false
    }

    fn on_pose(&mut self, event: &PoseEvent, out: &mut Outbox) {
        out.pose(*event);
    }

    fn on_gesture(&mut self, event: &GestureEvent, out: &mut Outbox) {
        out.gesture(*event);
    }

    fn on_orientation(&mut self, event: &OrientationEvent, out: &mut Outbox) {
        out.orientation(*event);
    }

    fn on_accelerometer(&mut self, event: &VectorEvent, out: &mut Outbox) {
        out.accelerometer(*event);
    }

    fn on_gyroscope(&mut self, event: &VectorEvent, out: &mut Outbox) {
        out.gyroscope(*event);
    }

    /// Runs before the node forwards the tick.
    fn on_periodic(&mut self, out: &mut Outbox) {
        let _ = out;
    }
}

/// Stage of the node the sensor source feeds.
#[derive(Clone, Copy, Debug, Default)]
pub struct Root;

impl Stage for Root {}

#[derive(Clone, Default)]
pub struct Fanout {
    children: Rc<RefCell<Vec<SharedListener>>>,
}

impl Fanout {
    pub fn attach(&self, child: SharedListener) -> bool {
        let mut children = self.children.borrow_mut();
        if children.iter().any(|known| same_listener(known, &child)) {
            return false;
        }
        children.push(child);
        true
    }

    pub fn detach(&self, child: &SharedListener) -> bool {
        let mut children = self.children.borrow_mut();
        let before = children.len();
        children.retain(|known| !same_listener(known, child));
        children.len() != before
    }

    pub fn contains(&self, child: &SharedListener) -> bool {
        self.children
            .borrow()
            .iter()
            .any(|known| same_listener(known, child))
    }

    pub fn len(&self) -> usize {
        self.children.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.borrow().is_empty()
    }

    pub fn broadcast(&self, event: &Event) {
        let snapshot = self.children.borrow().clone();
        for child in &snapshot {
            child.dispatch(event);
        }
    }
}

fn same_listener(a: &SharedListener, b: &SharedListener) -> bool {
    ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

struct Link<S> {
    stage: RefCell<S>,
    fanout: Fanout,
}

impl<S: Stage> Listener for Link<S> {
    fn dispatch(&self, event: &Event) {
        let mut out = Outbox::default();
        {
            let mut stage = self.stage.borrow_mut();
            let kind = event.kind();
            if stage.blocks(kind) {
                log::trace!("broadcast: blocked kind={kind:?}");
                return;
            }
            match event {
                Event::Pose(e) => stage.on_pose(e, &mut out),
                Event::Gesture(e) => stage.on_gesture(e, &mut out),
                Event::Orientation(e) => stage.on_orientation(e, &mut out),
                Event::Accelerometer(e) => stage.on_accelerometer(e, &mut out),
                Event::Gyroscope(e) => stage.on_gyroscope(e, &mut out),
                Event::Periodic => {
                    stage.on_periodic(&mut out);
                    out.push(Event::Periodic);
                }
            }
        }

        for outgoing in out.iter() {
            self.fanout.broadcast(outgoing);
        }
    }
}

/// Shareable handle to one stage of the tree. Clones refer to the same node.
pub struct Node<S> {
    link: Rc<Link<S>>,
}

impl<S> Clone for Node<S> {
    fn clone(&self) -> Self {
        Self {
            link: self.link.clone(),
        }
    }
}

impl<S: Stage + 'static> Node<S> {
    pub fn new(stage: S) -> Self {
        Self {
            link: Rc::new(Link {
                stage: RefCell::new(stage),
                fanout: Fanout::default(),
            }),
        }
    }

    /// Returns `false` when `child` is already attached.
    pub fn attach(&self, child: &impl AsListener) -> bool {
        self.link.fanout.attach(child.as_listener())
    }

    pub fn detach(&self, child: &impl AsListener) -> bool {
        self.link.fanout.detach(&child.as_listener())
    }

    pub fn is_attached(&self, child: &impl AsListener) -> bool {
        self.link.fanout.contains(&child.as_listener())
    }

    pub fn child_count(&self) -> usize {
        self.link.fanout.len()
    }

    pub fn dispatch(&self, event: &Event) {
        self.link.dispatch(event);
    }

    pub fn periodic(&self) {
        self.link.dispatch(&Event::Periodic);
    }

    pub fn stage(&self) -> Ref<'_, S> {
        self.link.stage.borrow()
    }

    pub fn stage_mut(&self) -> RefMut<'_, S> {
        self.link.stage.borrow_mut()
    }
}

impl Node<Root> {
    pub fn root() -> Self {
        Self::new(Root)
    }
}

impl<S: Stage + 'static> AsListener for Node<S> {
    fn as_listener(&self) -> SharedListener {
        self.link.clone()
    }
}

#[cfg(test)]
pub(crate) mod testing;
