//! Observer registry for reaction-system state changes
//!
//! Listeners are shared `Rc<RefCell<_>>` handles compared by pointer, so
//! the same listener can only be attached once. `detach` of a listener
//! that is not attached is an error. `notify` runs listeners in attachment
//! order and stops at the first failure, which is returned to the caller.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::error::{KineticaError, Result};

/// Copy of the reactor state at one accepted integration step
#[derive(Debug, Clone, PartialEq)]
pub struct StateSnapshot {
    /// Reaction time in seconds
    pub time: f64,
    /// Core species concentrations in mol/m^3, core order
    pub core_species_concentrations: Vec<f64>,
}

/// Receives snapshots from a reaction system
pub trait ReactionSystemListener {
    fn update(&mut self, snapshot: &StateSnapshot) -> Result<()>;
}

/// Shared listener handle
pub type SharedListener = Rc<RefCell<dyn ReactionSystemListener>>;

fn same_listener<L: ?Sized>(attached: &SharedListener, other: &Rc<RefCell<L>>) -> bool {
    Rc::as_ptr(attached) as *const u8 == Rc::as_ptr(other) as *const u8
}

/// Ordered, duplicate-free set of listeners
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    listeners: Vec<SharedListener>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a listener; returns false if it was already attached
    pub fn attach(&mut self, listener: SharedListener) -> bool {
        if self.listeners.iter().any(|l| same_listener(l, &listener)) {
            return false;
        }
        self.listeners.push(listener);
        true
    }

    /// Detach a listener
    pub fn detach<L: ReactionSystemListener + ?Sized>(&mut self, listener: &Rc<RefCell<L>>) -> Result<()> {
        let index = self
            .listeners
            .iter()
            .position(|l| same_listener(l, listener))
            .ok_or(KineticaError::ListenerNotFound)?;
        self.listeners.remove(index);
        Ok(())
    }

    pub fn contains<L: ReactionSystemListener + ?Sized>(&self, listener: &Rc<RefCell<L>>) -> bool {
        self.listeners.iter().any(|l| same_listener(l, listener))
    }

    /// Deliver a snapshot to every listener in attachment order
    pub fn notify(&self, snapshot: &StateSnapshot) -> Result<()> {
        for listener in &self.listeners {
            let mut listener =
                listener
                    .try_borrow_mut()
                    .map_err(|_| KineticaError::ListenerFailed {
                        reason: "listener is already borrowed".to_string(),
                    })?;
            listener.update(snapshot)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Listener that keeps every snapshot it receives
#[derive(Debug, Clone, Default)]
pub struct ConcentrationRecorder {
    pub data: Vec<StateSnapshot>,
}

impl ConcentrationRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl ReactionSystemListener for ConcentrationRecorder {
    fn update(&mut self, snapshot: &StateSnapshot) -> Result<()> {
        self.data.push(snapshot.clone());
        Ok(())
    }
}
