use core::cell::RefCell;
use std::rc::Rc;

use super::Listener;
use crate::types::{Event, Gesture, Pose};

#[derive(Default)]
pub(crate) struct Recorder {
    events: RefCell<Vec<Event>>,
}

impl Recorder {
    pub(crate) fn shared() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    pub(crate) fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub(crate) fn poses(&self) -> Vec<Pose> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Pose(e) => Some(e.pose),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn gestures(&self) -> Vec<Gesture> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                Event::Gesture(e) => Some(e.gesture),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn periodic_count(&self) -> usize {
        self.events
            .borrow()
            .iter()
            .filter(|event| matches!(event, Event::Periodic))
            .count()
    }
}

impl Listener for Recorder {
    fn dispatch(&self, event: &Event) {
        self.events.borrow_mut().push(*event);
    }
}
