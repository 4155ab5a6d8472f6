use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

/// Last reply produced per key.
///
/// Endpoints use it to decide the `changed` flag of [`crate::Endpoint::make`].
/// A cache shared by several Watch sessions dedups across all of them: the
/// first session to observe a change marks it seen and the others suppress
/// it. Give each session its own cache, for example by starting an empty one
/// when the endpoint is cloned for a call.
#[derive(Debug)]
pub struct ChangeCache<R> {
    entries: DashMap<String, R>,
}

impl<R> Default for ChangeCache<R> {
    fn default() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl<R: Clone + PartialEq> ChangeCache<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `reply` for `key`; `false` when it equals the cached one.
    pub fn observe(
        &self,
        key: &str,
        reply: &R,
    ) -> bool {
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut cached) => {
                if cached.get() == reply {
                    return false;
                }
                cached.insert(reply.clone());
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(reply.clone());
                true
            }
        }
    }

    pub fn get(
        &self,
        key: &str,
    ) -> Option<R> {
        self.entries.get(key).map(|r| r.value().clone())
    }

    /// Forgets `key`, so the next reply for it counts as changed.
    pub fn forget(
        &self,
        key: &str,
    ) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
