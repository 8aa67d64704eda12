use crate::storage::profile::{ConnectionState, VpnProfile};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// Change notification emitted by [`ProfileCollection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileEvent {
    Added(String),
    Removed(String),
    Updated(String),
    Moved { from: usize, to: usize },
    StateChanged { name: String, state: ConnectionState },
}

/// Ordered, shared collection of VPN profiles.
///
/// The internal state is a Vec guarded by a Mutex behind an Arc, so the
/// collection can be shared across tasks and cloned cheaply: cloning only
/// bumps the reference count. Reads hand out clones; writes hold the lock
/// for the duration of one field store, never across an await.
///
/// `state` writes from a status poll and from a user-initiated operation on
/// the same profile are not serialized against each other: each write is
/// consistent on its own, and the last writer wins. Subscribers receive a
/// [`ProfileEvent`] for every observable change.
#[derive(Clone)]
pub struct ProfileCollection {
    inner: Arc<Mutex<Vec<VpnProfile>>>,
    events: broadcast::Sender<ProfileEvent>,
}

impl Default for ProfileCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileCollection {
    pub fn new() -> Self {
        Self::from_profiles(Vec::new())
    }

    pub fn from_profiles(profiles: Vec<VpnProfile>) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            inner: Arc::new(Mutex::new(profiles)),
            events,
        }
    }

    /// Subscribe to change notifications. Slow receivers may observe
    /// `RecvError::Lagged`; the collection never blocks on them.
    pub fn subscribe(&self) -> broadcast::Receiver<ProfileEvent> {
        self.events.subscribe()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Profile names in collection order.
    pub fn names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    /// Clone of the whole collection in order.
    pub fn snapshot(&self) -> Vec<VpnProfile> {
        self.inner.lock().unwrap().clone()
    }

    /// Clone of one profile by name.
    pub fn get(&self, name: &str) -> Option<VpnProfile> {
        self.inner
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.name == name)
            .cloned()
    }

    /// Append a profile. Names are the lookup key, so duplicates are refused.
    pub fn add(&self, profile: VpnProfile) -> bool {
        let name = profile.name.clone();
        {
            let mut list = self.inner.lock().unwrap();
            if list.iter().any(|p| p.name == name) {
                return false;
            }
            list.push(profile);
        }
        let _ = self.events.send(ProfileEvent::Added(name));
        true
    }

    /// Remove a profile by name. Returns whether it existed.
    pub fn remove(&self, name: &str) -> bool {
        let removed = {
            let mut list = self.inner.lock().unwrap();
            match list.iter().position(|p| p.name == name) {
                Some(idx) => {
                    list.remove(idx);
                    true
                }
                None => false,
            }
        };
        if removed {
            let _ = self.events.send(ProfileEvent::Removed(name.to_string()));
        }
        removed
    }

    /// Replace the profile named `name` with `profile`, keeping its position
    /// and cached state. Refused if the new name collides with another entry.
    pub fn update(&self, name: &str, mut profile: VpnProfile) -> bool {
        let updated = {
            let mut list = self.inner.lock().unwrap();
            if profile.name != name && list.iter().any(|p| p.name == profile.name) {
                return false;
            }
            match list.iter().position(|p| p.name == name) {
                Some(idx) => {
                    profile.state = list[idx].state;
                    list[idx] = profile;
                    true
                }
                None => false,
            }
        };
        if updated {
            let _ = self.events.send(ProfileEvent::Updated(name.to_string()));
        }
        updated
    }

    /// Record the observed connection state of `name`.
    ///
    /// The write is unconditional (last observation wins); the event fires
    /// only when the stored value actually changed, so periodic polls of a
    /// stable collection stay silent.
    pub fn set_state(&self, name: &str, state: ConnectionState) {
        let changed = {
            let mut list = self.inner.lock().unwrap();
            match list.iter_mut().find(|p| p.name == name) {
                Some(profile) => {
                    let changed = profile.state != state;
                    profile.state = state;
                    changed
                }
                None => false,
            }
        };
        if changed {
            let _ = self.events.send(ProfileEvent::StateChanged {
                name: name.to_string(),
                state,
            });
        }
    }

    /// Move the entry at `from` so it ends up at index `to`.
    ///
    /// Membership and the relative order of every other entry are preserved.
    /// No-op when `from == to` or either index is out of bounds.
    pub fn move_profile(&self, from: usize, to: usize) -> bool {
        {
            let mut list = self.inner.lock().unwrap();
            if from == to || from >= list.len() || to >= list.len() {
                return false;
            }
            let entry = list.remove(from);
            list.insert(to, entry);
        }
        let _ = self.events.send(ProfileEvent::Moved { from, to });
        true
    }
}
