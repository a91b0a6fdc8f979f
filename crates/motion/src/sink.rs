//! Write targets for the shutter drive angle.
//!
//! The driver publishes up to one value per display frame. Routing that
//! through the host's reactive state would rebuild the view every frame,
//! so the value goes to a [`DriveSink`] instead: a retained handle the
//! renderer reads when it paints.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Name of the custom property the blades rotate by.
pub const DRIVE_PROPERTY: &str = "--drive";

/// Receives the drive angle once per frame.
pub trait DriveSink {
    fn set(&mut self, angle_deg: f64);
}

impl<F: FnMut(f64)> DriveSink for F {
    fn set(&mut self, angle_deg: f64) {
        self(angle_deg)
    }
}

/// The CSS value of the drive property, e.g. `"12.5deg"`.
pub fn css_drive_value(angle_deg: f64) -> String {
    format!("{angle_deg}deg")
}

/// A retained handle on the current drive angle.
///
/// Clones share one cell: the driver writes through one clone, the
/// renderer reads through another. Reading never notifies anyone.
#[derive(Debug, Clone)]
pub struct SharedDrive {
    angle: Rc<Cell<f64>>,
}

impl SharedDrive {
    /// A handle holding `initial` until the first write.
    pub fn new(initial_deg: f64) -> Self {
        Self {
            angle: Rc::new(Cell::new(initial_deg)),
        }
    }

    pub fn get(&self) -> f64 {
        self.angle.get()
    }

    /// `(property, value)` as it would be set on the container's style.
    pub fn css_property(&self) -> (&'static str, String) {
        (DRIVE_PROPERTY, css_drive_value(self.get()))
    }
}

impl DriveSink for SharedDrive {
    fn set(&mut self, angle_deg: f64) {
        self.angle.set(angle_deg);
    }
}

/// Keeps every write, for tests and curve dumps.
///
/// Clones share one log.
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    writes: Rc<RefCell<Vec<f64>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn writes(&self) -> Vec<f64> {
        self.writes.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.writes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.borrow().is_empty()
    }

    pub fn last(&self) -> Option<f64> {
        self.writes.borrow().last().copied()
    }
}

impl DriveSink for RecordingSink {
    fn set(&mut self, angle_deg: f64) {
        self.writes.borrow_mut().push(angle_deg);
    }
}
