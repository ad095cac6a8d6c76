pub mod fixtures;

use fixtures::*;
use herald::{Emitter, Event, ListenerId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Register { other: bool, once: bool },
    Remove(usize),
    Emit { other: bool },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (any::<bool>(), any::<bool>()).prop_map(|(other, once)| Op::Register { other, once }),
        any::<usize>().prop_map(Op::Remove),
        any::<bool>().prop_map(|other| Op::Emit { other }),
    ]
}

fn register<E>(emitter: &Emitter, event: E, once: bool, tag: usize, log: &Recorder<usize>) -> ListenerId
where
    E: Event<Args = (i32,)>,
{
    let sink = log.clone();
    let callback = move |_: &i32| sink.push(tag);
    if once { emitter.once(event, callback).id() } else { emitter.on(event, callback).id() }
}

/// A listener as the model sees it: id, tag, event, once.
type Entry = (ListenerId, usize, bool, bool);

proptest! {
    #[test]
    fn emission_matches_a_registration_order_model(ops in proptest::collection::vec(op(), 0..64)) {
        let emitter = Emitter::new();
        let log = Recorder::new();
        let mut model: Vec<Entry> = Vec::new();
        let mut last_id: Option<ListenerId> = None;

        for (tag, op) in ops.into_iter().enumerate() {
            match op {
                Op::Register { other, once } => {
                    let id = if other {
                        register(&emitter, OtherChanged, once, tag, &log)
                    } else {
                        register(&emitter, ValueChanged, once, tag, &log)
                    };
                    prop_assert!(last_id.is_none_or(|last| last < id));
                    last_id = Some(id);
                    model.push((id, tag, other, once));
                },
                Op::Remove(index) => {
                    if model.is_empty() {
                        continue;
                    }
                    let (id, ..) = model.remove(index % model.len());
                    prop_assert!(emitter.remove_listener(id));
                    prop_assert!(!emitter.remove_listener(id));
                },
                Op::Emit { other } => {
                    if other {
                        emitter.emit(OtherChanged, (0,));
                    } else {
                        emitter.emit(ValueChanged, (0,));
                    }
                    let expected: Vec<usize> =
                        model.iter().filter(|entry| entry.2 == other).map(|entry| entry.1).collect();
                    prop_assert_eq!(log.take(), expected);
                    model.retain(|entry| !(entry.2 == other && entry.3));
                },
            }
            prop_assert_eq!(emitter.listener_count(), model.len());
        }
    }

    #[test]
    fn once_listeners_fire_at_most_once(emits in 0_usize..16) {
        let emitter = Emitter::new();
        let calls = Counter::default();
        let c = calls.clone();
        emitter.once(Ping, move || c.bump());

        for _ in 0..emits {
            emitter.emit(Ping, ());
        }
        prop_assert_eq!(calls.get(), emits.min(1));
    }
}
