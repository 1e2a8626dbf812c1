//! The event-store port and an in-memory implementation.
//!
//! The engine itself never touches a store; [`crate::service::ScheduleService`]
//! reads snapshots from one and writes validated results back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::error::{Result, SchedulingError};
use crate::event::Event;

/// Notification delivered to subscribers after a mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreChange {
    Upserted(Event),
    Removed(String),
}

pub type Listener = Box<dyn Fn(&StoreChange) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Where events live. Implementations must be safe to share across threads.
pub trait EventStore: Send + Sync {
    /// A snapshot of every event.
    fn list(&self) -> Result<Vec<Event>>;

    fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Insert or replace by `event.id`.
    fn upsert(&self, event: Event) -> Result<()>;

    /// Remove by id, returning the removed event if there was one.
    fn remove(&self, id: &str) -> Result<Option<Event>>;

    fn subscribe(&self, listener: Listener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(SubscriptionId, Arc<Listener>)>,
}

/// `RwLock`-guarded store that keeps insertion order.
#[derive(Default)]
pub struct InMemoryEventStore {
    events: RwLock<Vec<Event>>,
    listeners: Mutex<Listeners>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<Event>) -> Self {
        // Last write wins for duplicate ids, like repeated upserts.
        let mut seen: HashMap<String, usize> = HashMap::new();
        let mut unique: Vec<Event> = Vec::with_capacity(events.len());
        for event in events {
            match seen.get(&event.id) {
                Some(&pos) => unique[pos] = event,
                None => {
                    seen.insert(event.id.clone(), unique.len());
                    unique.push(event);
                }
            }
        }
        Self {
            events: RwLock::new(unique),
            listeners: Mutex::default(),
        }
    }

    fn notify(&self, change: StoreChange) -> Result<()> {
        // Snapshot the listeners so callbacks may (un)subscribe without deadlocking.
        let listeners: Vec<Arc<Listener>> = self
            .listeners
            .lock()
            .map_err(|_| poisoned())?
            .entries
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(&change);
        }
        Ok(())
    }
}

fn poisoned() -> SchedulingError {
    SchedulingError::Store("lock poisoned".to_string())
}

impl EventStore for InMemoryEventStore {
    fn list(&self) -> Result<Vec<Event>> {
        Ok(self.events.read().map_err(|_| poisoned())?.clone())
    }

    fn get(&self, id: &str) -> Result<Option<Event>> {
        let events = self.events.read().map_err(|_| poisoned())?;
        Ok(events.iter().find(|e| e.id == id).cloned())
    }

    fn upsert(&self, event: Event) -> Result<()> {
        {
            let mut events = self.events.write().map_err(|_| poisoned())?;
            match events.iter_mut().find(|e| e.id == event.id) {
                Some(existing) => *existing = event.clone(),
                None => events.push(event.clone()),
            }
        }
        self.notify(StoreChange::Upserted(event))
    }

    fn remove(&self, id: &str) -> Result<Option<Event>> {
        let removed = {
            let mut events = self.events.write().map_err(|_| poisoned())?;
            let pos = events.iter().position(|e| e.id == id);
            pos.map(|pos| events.remove(pos))
        };
        if removed.is_some() {
            self.notify(StoreChange::Removed(id.to_string()))?;
        }
        Ok(removed)
    }

    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let id = SubscriptionId(listeners.next_id);
        listeners.next_id += 1;
        listeners.entries.push((id, Arc::new(listener)));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = match self.listeners.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = listeners.entries.len();
        listeners.entries.retain(|(sid, _)| *sid != id);
        listeners.entries.len() != before
    }
}
