/// Playback registry
///
/// Holds the live instances keyed by sound name. At most one instance exists
/// per name; inserting under a taken name hands back the previous instance
/// for the caller to retire.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use super::instance::{InstanceId, PlaybackInstance};

#[derive(Debug, Default)]
pub struct PlaybackRegistry {
    instances: HashMap<String, PlaybackInstance>,
    next_id: u64,
}

impl PlaybackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the id for the next instance
    pub fn allocate_id(&mut self) -> InstanceId {
        self.next_id += 1;
        InstanceId(self.next_id)
    }

    /// Install `instance`, also handing back whatever was registered under
    /// its name
    pub fn insert(
        &mut self,
        instance: PlaybackInstance,
    ) -> (&mut PlaybackInstance, Option<PlaybackInstance>) {
        match self.instances.entry(instance.name().to_string()) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(instance);
                (entry.into_mut(), Some(previous))
            }
            Entry::Vacant(entry) => (entry.insert(instance), None),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<PlaybackInstance> {
        self.instances.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&PlaybackInstance> {
        self.instances.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PlaybackInstance> {
        self.instances.get_mut(name)
    }

    /// Name the live instance `id` is registered under, if it is still live
    pub fn name_of(&self, id: InstanceId) -> Option<&str> {
        self.instances
            .values()
            .find(|instance| instance.id() == id)
            .map(PlaybackInstance::name)
    }

    /// Instances whose playback reached the end, lowest id first
    pub fn finished_ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self
            .instances
            .values()
            .filter(|instance| instance.is_finished())
            .map(PlaybackInstance::id)
            .collect();
        ids.sort();
        ids
    }

    pub fn ids(&self) -> Vec<InstanceId> {
        let mut ids: Vec<InstanceId> = self.instances.values().map(PlaybackInstance::id).collect();
        ids.sort();
        ids
    }

    pub fn instances(&self) -> &HashMap<String, PlaybackInstance> {
        &self.instances
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PlaybackInstance> {
        self.instances.values_mut()
    }

    /// Take every instance out, leaving the registry empty
    pub fn drain(&mut self) -> Vec<PlaybackInstance> {
        self.instances.drain().map(|(_, instance)| instance).collect()
    }

    pub fn listener_count(&self) -> usize {
        self.instances.values().map(|i| i.listeners().len()).sum()
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
