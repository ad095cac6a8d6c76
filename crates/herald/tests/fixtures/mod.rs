#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

herald::events! {
    pub struct ValueChanged(i32);
    pub struct OtherChanged(i32);
    pub struct Pair(i32, i32);
    pub struct Ping();
    pub struct Renamed(String);
}

/// Shared, cloneable log of what listeners observed.
#[derive(Debug)]
pub struct Recorder<T> {
    entries: Rc<RefCell<Vec<T>>>,
}

impl<T> Clone for Recorder<T> {
    fn clone(&self) -> Self {
        Self { entries: Rc::clone(&self.entries) }
    }
}

impl<T: Clone> Recorder<T> {
    #[must_use]
    pub fn new() -> Self {
        Self { entries: Rc::new(RefCell::new(Vec::new())) }
    }

    pub fn push(&self, entry: T) {
        self.entries.borrow_mut().push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> Vec<T> {
        self.entries.borrow().clone()
    }

    /// Returns the entries and clears the log.
    pub fn take(&self) -> Vec<T> {
        std::mem::take(&mut *self.entries.borrow_mut())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}

/// Shared call counter.
#[derive(Debug, Clone, Default)]
pub struct Counter(Rc<Cell<usize>>);

impl Counter {
    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    #[must_use]
    pub fn get(&self) -> usize {
        self.0.get()
    }
}

/// A listener that always panics.
pub fn explode(_: &i32) {
    panic!("listener exploded");
}

/// A listener that rejects negative values.
pub fn reject_negative(value: &i32) -> Result<(), String> {
    if *value < 0 { Err(format!("negative value {value}")) } else { Ok(()) }
}
