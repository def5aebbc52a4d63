use std::{
    collections::{HashMap, HashSet},
    hash::Hash,
};

use futures::{stream, Stream, StreamExt};
use kube::{
    runtime::{
        reflector::ObjectRef,
        watcher::{Error as WatcherError, Event},
    },
    Resource,
};
use log::debug;

use crate::helpers::pretty_type_name;

/// A single change of a watched object, as seen by the informer.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent<K> {
    Added(K),
    Updated { old: K, new: K },
    Deleted(K),
}

/// Tracks the last seen state of every watched object so raw watcher events can be told apart
/// into additions, updates and deletions.
pub struct Informer<K: Resource> {
    known: HashMap<ObjectRef<K>, K>,
}

impl<K> Informer<K>
where
    K: Resource + Clone,
    K::DynamicType: Default + Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            known: HashMap::new(),
        }
    }

    pub fn process(&mut self, event: Event<K>) -> Vec<ResourceEvent<K>> {
        match event {
            Event::Applied(object) => vec![self.apply(object)],
            Event::Deleted(object) => {
                self.known.remove(&ObjectRef::from_obj(&object));

                vec![ResourceEvent::Deleted(object)]
            }
            Event::Restarted(objects) => self.restart(objects),
        }
    }

    fn apply(&mut self, object: K) -> ResourceEvent<K> {
        match self
            .known
            .insert(ObjectRef::from_obj(&object), object.clone())
        {
            Some(old) => ResourceEvent::Updated { old, new: object },
            None => ResourceEvent::Added(object),
        }
    }

    // a relist replaces the whole view, anything not listed anymore was deleted while
    // the watch was down
    fn restart(&mut self, objects: Vec<K>) -> Vec<ResourceEvent<K>> {
        debug!(
            "{} watch (re)started with {} objects",
            pretty_type_name::<K>(),
            objects.len()
        );

        let mut listed = HashSet::with_capacity(objects.len());
        let mut events = Vec::with_capacity(objects.len());

        for object in objects {
            listed.insert(ObjectRef::from_obj(&object));
            events.push(self.apply(object));
        }

        let gone = self
            .known
            .keys()
            .filter(|key| !listed.contains(*key))
            .cloned()
            .collect::<Vec<_>>();

        for key in gone {
            if let Some(object) = self.known.remove(&key) {
                events.push(ResourceEvent::Deleted(object));
            }
        }

        events
    }
}

impl<K> Default for Informer<K>
where
    K: Resource + Clone,
    K::DynamicType: Default + Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Turns a raw watcher stream into a stream of typed add/update/delete notifications.
/// Watcher errors are passed through untouched.
pub fn informer<K, S>(watch: S) -> impl Stream<Item = Result<ResourceEvent<K>, WatcherError>>
where
    K: Resource + Clone,
    K::DynamicType: Default + Eq + Hash + Clone,
    S: Stream<Item = Result<Event<K>, WatcherError>>,
{
    let mut informer = Informer::new();

    watch.flat_map(move |event| {
        let events: Vec<Result<ResourceEvent<K>, WatcherError>> = match event {
            Ok(event) => informer.process(event).into_iter().map(Ok).collect(),
            Err(error) => vec![Err(error)],
        };

        stream::iter(events)
    })
}

#[cfg(test)]
mod tests {
    use futures::{stream, StreamExt};
    use kube::{runtime::watcher::Event, ResourceExt};

    use crate::resources::crd::v1alpha1::machine::{Machine, MachineSpec, MachineVersionInfo};

    use super::{informer, Informer, ResourceEvent};

    fn machine(name: &str, kubelet: &str) -> Machine {
        let mut machine = Machine::new(
            name,
            MachineSpec {
                versions: MachineVersionInfo {
                    kubelet: kubelet.into(),
                    ..Default::default()
                },
                ..Default::default()
            },
        );
        machine.metadata.namespace = Some("default".into());

        machine
    }

    fn describe(event: &ResourceEvent<Machine>) -> String {
        match event {
            ResourceEvent::Added(m) => format!("added {}", m.name_any()),
            ResourceEvent::Updated { old, new } => format!(
                "updated {} {}->{}",
                new.name_any(),
                old.spec.versions.kubelet,
                new.spec.versions.kubelet
            ),
            ResourceEvent::Deleted(m) => format!("deleted {}", m.name_any()),
        }
    }

    fn describe_all(events: &[ResourceEvent<Machine>]) -> Vec<String> {
        events.iter().map(describe).collect()
    }

    #[test]
    fn first_apply_is_an_addition_and_later_ones_are_updates() {
        let mut informer = Informer::new();

        let added = informer.process(Event::Applied(machine("vm-a", "1.7.3")));
        let updated = informer.process(Event::Applied(machine("vm-a", "1.7.4")));

        assert_eq!(describe_all(&added), ["added vm-a"]);
        assert_eq!(describe_all(&updated), ["updated vm-a 1.7.3->1.7.4"]);
    }

    #[test]
    fn deletion_forgets_the_object() {
        let mut informer = Informer::new();

        informer.process(Event::Applied(machine("vm-a", "1.7.3")));
        let deleted = informer.process(Event::Deleted(machine("vm-a", "1.7.3")));
        let readded = informer.process(Event::Applied(machine("vm-a", "1.7.3")));

        assert_eq!(describe_all(&deleted), ["deleted vm-a"]);
        assert_eq!(describe_all(&readded), ["added vm-a"]);
    }

    #[test]
    fn objects_with_the_same_name_in_different_namespaces_are_distinct() {
        let mut informer = Informer::new();
        let mut other = machine("vm-a", "1.7.3");
        other.metadata.namespace = Some("other".into());

        informer.process(Event::Applied(machine("vm-a", "1.7.3")));
        let events = informer.process(Event::Applied(other));

        assert_eq!(describe_all(&events), ["added vm-a"]);
    }

    #[test]
    fn restart_reports_current_state_and_deletions_missed_while_down() {
        let mut informer = Informer::new();

        informer.process(Event::Applied(machine("vm-a", "1.7.3")));
        informer.process(Event::Applied(machine("vm-b", "1.7.3")));

        let events = informer.process(Event::Restarted(vec![
            machine("vm-b", "1.7.4"),
            machine("vm-c", "1.7.4"),
        ]));

        assert_eq!(
            describe_all(&events),
            ["updated vm-b 1.7.3->1.7.4", "added vm-c", "deleted vm-a"]
        );
    }

    #[test]
    fn initial_listing_is_all_additions() {
        let mut informer = Informer::new();

        let events = informer.process(Event::Restarted(vec![
            machine("vm-a", "1.7.3"),
            machine("vm-b", "1.7.3"),
        ]));

        assert_eq!(describe_all(&events), ["added vm-a", "added vm-b"]);
    }

    #[tokio::test]
    async fn informer_stream_preserves_per_object_order() {
        let watch = stream::iter(vec![
            Ok(Event::Restarted(vec![machine("vm-a", "1.7.3")])),
            Ok(Event::Applied(machine("vm-a", "1.7.4"))),
            Ok(Event::Deleted(machine("vm-a", "1.7.4"))),
        ]);

        let events = informer(watch)
            .map(|event| describe(&event.unwrap()))
            .collect::<Vec<_>>()
            .await;

        assert_eq!(
            events,
            ["added vm-a", "updated vm-a 1.7.3->1.7.4", "deleted vm-a"]
        );
    }
}
