//! Property tests for the alias table, selector grammar and connection state

use proptest::prelude::*;

use jmctl_core::domain::{
    AliasRegistry, CanonicalOperation, Direction, Grammar, Limits, MixerTarget, Mutation, Port,
    PortRef, PortSelector,
};
use jmctl_infra::MemoryMixer;

fn registry() -> AliasRegistry {
    AliasRegistry::standard().unwrap()
}

#[test]
fn test_every_alias_resolves_to_its_own_operation() {
    let aliases = registry();
    for set in aliases.sets() {
        for token in set.tokens() {
            assert_eq!(aliases.resolve(token), Some(set.operation()), "{token}");
            for other in aliases.sets().filter(|s| s.operation() != set.operation()) {
                assert!(!other.contains(token), "{token} is shared with {}", other.operation());
            }
        }
    }
}

#[test]
fn test_every_alias_works_as_a_get_command() {
    let aliases = registry();
    let grammar = Grammar::new(&aliases, Limits::default());
    for op in CanonicalOperation::ALL {
        for token in aliases.aliases(op).tokens() {
            let mut tokens = vec!["-i", "mic1", token.as_str()];
            if op == CanonicalOperation::Connected {
                tokens.push("spk1");
            }
            let request = grammar.parse_get(&tokens).unwrap();
            assert_eq!(request.query.operation(), op, "{token}");
        }
    }
}

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
}

fn patchbay(outputs: usize) -> MemoryMixer {
    (0..outputs).fold(
        MemoryMixer::new().with_port(Port::new(Direction::Input, "mic")),
        |mixer, i| mixer.with_port(Port::new(Direction::Output, format!("out{i}"))),
    )
}

#[derive(Debug, Clone, Copy)]
enum Edit {
    Connect(usize),
    Disconnect(usize),
    Toggle(usize),
}

fn edit() -> impl Strategy<Value = Edit> {
    prop_oneof![
        (0..4usize).prop_map(Edit::Connect),
        (0..4usize).prop_map(Edit::Disconnect),
        (0..4usize).prop_map(Edit::Toggle),
    ]
}

async fn apply(mixer: &MemoryMixer, edit: Edit) {
    let mic = PortRef::input("mic");
    match edit {
        Edit::Connect(i) => mixer.connect(&mic, &format!("out{i}")).await.unwrap(),
        Edit::Disconnect(i) => mixer.disconnect(&mic, &format!("out{i}")).await.unwrap(),
        Edit::Toggle(i) => mixer.toggle_connection(&mic, &format!("out{i}")).await.unwrap(),
    }
}

fn connections(mixer: &MemoryMixer) -> Vec<String> {
    let mut names = mixer.snapshot(&PortRef::input("mic")).unwrap().connections;
    names.sort();
    names
}

proptest! {
    #[test]
    fn selector_accepts_exactly_one_mode(
        input in any::<bool>(),
        output in any::<bool>(),
        monitor in any::<bool>(),
        name in proptest::option::of("[a-z][a-z0-9]{1,6}"),
    ) {
        let aliases = registry();
        if let Some(name) = &name {
            prop_assume!(aliases.resolve(name).is_none());
        }
        let grammar = Grammar::new(&aliases, Limits::default());

        let mut tokens: Vec<&str> = Vec::new();
        for (set, flag) in [(input, "-i"), (output, "-o"), (monitor, "-m")] {
            if set {
                tokens.push(flag);
            }
        }
        if let Some(name) = &name {
            tokens.push(name);
        }
        tokens.push("name");

        let modes = [input, output, monitor].iter().filter(|m| **m).count();
        let valid = modes == 1 && monitor == name.is_none();

        match grammar.parse_get(&tokens) {
            Ok(request) => {
                prop_assert!(valid, "accepted {:?}", tokens);
                let expected = match (input, output, name.clone()) {
                    (true, _, Some(name)) => PortSelector::Input(name),
                    (_, true, Some(name)) => PortSelector::Output(name),
                    _ => PortSelector::Monitor,
                };
                prop_assert_eq!(request.selector, expected);
            }
            Err(_) => prop_assert!(!valid, "rejected {:?}", tokens),
        }
    }

    #[test]
    fn level_values_follow_limits(value in -3.0f32..3.0) {
        let aliases = registry();
        let grammar = Grammar::new(&aliases, Limits::default());
        let raw = value.to_string();

        let request = grammar.parse_set(&["-o", "spk1", "balance", "--val", raw.as_str()]);
        if (-1.0..=1.0).contains(&value) {
            let request = request.unwrap();
            prop_assert_eq!(request.mutation, Mutation::Balance(value));
        } else {
            prop_assert!(request.is_err());
        }
    }

    #[test]
    fn connect_and_disconnect_are_idempotent(
        start in proptest::collection::vec(edit(), 0..8),
        target in 0..4usize,
    ) {
        runtime().block_on(async {
            let mixer = patchbay(4);
            for e in &start {
                apply(&mixer, *e).await;
            }

            apply(&mixer, Edit::Connect(target)).await;
            let connected = connections(&mixer);
            assert!(connected.contains(&format!("out{target}")));
            apply(&mixer, Edit::Connect(target)).await;
            assert_eq!(connections(&mixer), connected);

            apply(&mixer, Edit::Disconnect(target)).await;
            let disconnected = connections(&mixer);
            assert!(!disconnected.contains(&format!("out{target}")));
            apply(&mixer, Edit::Disconnect(target)).await;
            assert_eq!(connections(&mixer), disconnected);
        });
    }

    #[test]
    fn toggle_twice_restores_membership(
        start in proptest::collection::vec(edit(), 0..8),
        target in 0..4usize,
    ) {
        runtime().block_on(async {
            let mixer = patchbay(4);
            for e in &start {
                apply(&mixer, *e).await;
            }
            let before = connections(&mixer);

            apply(&mixer, Edit::Toggle(target)).await;
            assert_ne!(connections(&mixer), before);
            apply(&mixer, Edit::Toggle(target)).await;
            assert_eq!(connections(&mixer), before);
        });
    }

    #[test]
    fn bare_non_alias_token_is_the_port(name in "[a-z][a-z0-9]{1,6}") {
        let aliases = registry();
        prop_assume!(aliases.resolve(&name).is_none());
        let grammar = Grammar::new(&aliases, Limits::default());

        let request = grammar.parse_get(&["-o", name.as_str(), "connections"]).unwrap();
        prop_assert_eq!(request.selector.port_ref(), Some(PortRef::output(name.clone())));

        // Order of PORT and flag does not matter
        let request = grammar.parse_get(&[name.as_str(), "-o", "cs"]).unwrap();
        prop_assert_eq!(request.selector, PortSelector::Output(name));
    }
}
