//! End-to-end command tests
//!
//! Each test parses a command line, builds the request and executes it
//! against a `MemoryMixer`, checking the printed lines and the calls made.

use clap::Parser;
use std::time::Duration;

use jmctl::{build_request, execute, report, Cli, Failure, EXIT_FAILURE, EXIT_USAGE};
use jmctl_core::domain::{
    AliasRegistry, Direction, ExecError, Grammar, Limits, MixerError, MixerTarget, Port, PortRef,
    Property,
};
use jmctl_infra::{JamyxerClient, MemoryMixer};

/// Run one command line (without the program name) against `mixer`
async fn jmctl(mixer: &MemoryMixer, args: &[&str]) -> Result<String, Failure> {
    let argv = std::iter::once("jmctl").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv).unwrap();

    let aliases = AliasRegistry::standard().unwrap();
    let grammar = Grammar::new(&aliases, Limits::default());
    let request = build_request(&cli, &grammar).map_err(Failure::Usage)?;

    let mut out = Vec::new();
    execute(mixer, &request, &mut out).await.map_err(Failure::Exec)?;
    Ok(String::from_utf8(out).unwrap())
}

fn port(direction: Direction, name: &str, connections: &[&str]) -> Port {
    let mut port = Port::new(direction, name);
    port.connections = connections.iter().map(|c| c.to_string()).collect();
    port
}

/// Studio fixture: `mon` is the monitor and feeds both speakers, `mic1` is unpatched
fn studio() -> MemoryMixer {
    let mut mic1 = port(Direction::Input, "mic1", &[]);
    mic1.volume = 0.75;
    let mut mic2 = port(Direction::Input, "mic2", &[]);
    mic2.mono = true;

    MemoryMixer::new()
        .with_port(mic1)
        .with_port(mic2)
        .with_port(port(Direction::Input, "mon", &["spk1", "spk2"]))
        .with_port(port(Direction::Output, "spk1", &["mon"]))
        .with_port(port(Direction::Output, "spk2", &["mon"]))
        .with_monitor(PortRef::input("mon"))
}

// ============================================================================
// LISTING AND READS
// ============================================================================

#[tokio::test]
async fn test_get_all_lists_names_in_order() {
    let mixer = studio();
    assert_eq!(jmctl(&mixer, &["get-all", "-i"]).await.unwrap(), "mic1\nmic2\nmon\n");
    assert_eq!(jmctl(&mixer, &["ga", "-o"]).await.unwrap(), "spk1\nspk2\n");
}

#[tokio::test]
async fn test_get_escaped_volume() {
    let mixer = studio();
    let out = jmctl(&mixer, &["get", "-i", "--", "mic1", "volume"]).await.unwrap();
    assert_eq!(out, "0.75\n");
}

#[tokio::test]
async fn test_get_monitor_connected() {
    let mixer = studio();
    assert_eq!(jmctl(&mixer, &["get", "-m", "connected", "spk1"]).await.unwrap(), "true\n");
    assert_eq!(jmctl(&mixer, &["g", "-m", "cd", "mic2"]).await.unwrap(), "false\n");
}

#[tokio::test]
async fn test_get_scalar_properties() {
    let mixer = studio();
    assert_eq!(jmctl(&mixer, &["get", "-i", "mic2", "ismono"]).await.unwrap(), "true\n");
    assert_eq!(jmctl(&mixer, &["get", "-o", "spk1", "-in"]).await.unwrap(), "false\n");
    assert_eq!(jmctl(&mixer, &["get", "-o", "spk1", "balance"]).await.unwrap(), "0\n");
    assert_eq!(jmctl(&mixer, &["-g", "-m", "n"]).await.unwrap(), "mon\n");
}

#[tokio::test]
async fn test_get_connections_and_monitored() {
    let mixer = studio();
    assert_eq!(jmctl(&mixer, &["get", "-m", "cs"]).await.unwrap(), "spk1\nspk2\n");
    assert_eq!(jmctl(&mixer, &["get", "-i", "mon", "monitored"]).await.unwrap(), "true\n");
    assert_eq!(jmctl(&mixer, &["get", "-i", "mic1", "md"]).await.unwrap(), "false\n");
}

#[tokio::test]
async fn test_unknown_port_is_not_found() {
    let mixer = studio();
    let err = jmctl(&mixer, &["get", "-i", "nope", "name"]).await.unwrap_err();
    assert!(matches!(
        err,
        Failure::Exec(ExecError::Mixer(MixerError::PortNotFound { ref name, .. })) if name == "nope"
    ));

    let mut stderr = Vec::new();
    assert_eq!(report(&err, &mut stderr), EXIT_FAILURE);
    assert_eq!(String::from_utf8(stderr).unwrap(), "error: No input port named 'nope'\n");
}

#[tokio::test]
async fn test_dropped_daemon_connection_exits_with_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let daemon = tokio::spawn(async move {
        // Accept and hang up without answering
        let (stream, _) = listener.accept().await.unwrap();
        drop(stream);
    });

    let client = JamyxerClient::connect(addr).await.unwrap();
    daemon.await.unwrap();

    let cli = Cli::try_parse_from(["jmctl", "get-all", "-i"]).unwrap();
    let aliases = AliasRegistry::standard().unwrap();
    let request = build_request(&cli, &Grammar::new(&aliases, Limits::default())).unwrap();

    let mut out = Vec::new();
    let failure = Failure::from(execute(&client, &request, &mut out).await.unwrap_err());
    assert!(matches!(failure, Failure::Exec(ExecError::Mixer(MixerError::Io(_)))));

    let mut stderr = Vec::new();
    assert_eq!(report(&failure, &mut stderr), EXIT_FAILURE);
    let stderr = String::from_utf8(stderr).unwrap();
    assert!(stderr.starts_with("error: Daemon connection error: "), "{stderr}");
    assert!(out.is_empty());
}

#[tokio::test]
async fn test_monitored_without_monitor_is_false() {
    let mixer = MemoryMixer::new().with_port(port(Direction::Input, "mic1", &[]));
    assert_eq!(jmctl(&mixer, &["get", "-i", "mic1", "monitored"]).await.unwrap(), "false\n");
}

// ============================================================================
// MUTATIONS
// ============================================================================

#[tokio::test]
async fn test_set_connect_adds_other_once() {
    let mixer = studio();
    let out = jmctl(&mixer, &["set", "-o", "spk1", "connected", "mic1", "-c"]).await.unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.iter().filter(|l| **l == "mic1").count(), 1);
    assert_eq!(lines, ["mon", "mic1"]);

    // Connecting again changes nothing
    let again = jmctl(&mixer, &["set", "-o", "spk1", "connected", "mic1", "-c"]).await.unwrap();
    assert_eq!(again, out);
}

#[tokio::test]
async fn test_set_toggle_twice_restores() {
    let mixer = studio();
    let spk2 = PortRef::output("spk2");
    let before = mixer.snapshot(&spk2).unwrap().connections;

    let once = jmctl(&mixer, &["s", "-o", "spk2", "cd", "mon", "-t"]).await.unwrap();
    assert_eq!(once, "");
    jmctl(&mixer, &["s", "-o", "spk2", "cd", "mon", "-t"]).await.unwrap();
    assert_eq!(mixer.snapshot(&spk2).unwrap().connections, before);
}

#[tokio::test]
async fn test_set_disconnect_is_idempotent() {
    let mixer = studio();
    for _ in 0..2 {
        let out = jmctl(&mixer, &["set", "-m", "connected", "spk1", "-d"]).await.unwrap();
        assert_eq!(out, "spk2\n");
    }
}

#[tokio::test]
async fn test_set_volume_prints_read_back_value() {
    let mixer = studio();
    let out = jmctl(&mixer, &["set", "-i", "mic1", "vol", "--val", "0.5"]).await.unwrap();
    assert_eq!(out, "0.5\n");
    assert_eq!(mixer.snapshot(&PortRef::input("mic1")).unwrap().volume, 0.5);

    let out = jmctl(&mixer, &["--set", "-o", "spk1", "b", "-v", "-0.25"]).await.unwrap();
    assert_eq!(out, "-0.25\n");
}

#[tokio::test]
async fn test_set_monitored_prints_monitor_name() {
    let mixer = studio();
    let out = jmctl(&mixer, &["set", "-i", "mic2", "monitored"]).await.unwrap();
    assert_eq!(out, "mic2\n");
    assert_eq!(jmctl(&mixer, &["get", "-m", "name"]).await.unwrap(), "mic2\n");
}

// ============================================================================
// USAGE ERRORS MAKE NO CALLS
// ============================================================================

#[tokio::test]
async fn test_usage_errors_make_no_calls() {
    let mixer = studio();
    let rejected: &[&[&str]] = &[
        &["set", "-o", "spk1", "balance", "--val", "abc"],
        &["set", "-o", "spk1", "balance", "--val", "2"],
        &["set", "-o", "spk1", "volume"],
        &["set", "-o", "spk1", "connected", "mic1"],
        &["set", "-o", "spk1", "connected", "mic1", "-c", "-d"],
        &["set", "-i", "mic1", "name"],
        &["get", "-i", "-o", "mic1", "name"],
        &["get", "-m", "mic1", "name"],
        &["get", "mic1", "name"],
        &["get", "-i", "mic1"],
        &["get", "-i", "mic1", "-V", "-B", "volume"],
    ];

    for args in rejected {
        let result = jmctl(&mixer, args).await;
        assert!(matches!(result, Err(Failure::Usage(_))), "{args:?} gave {result:?}");
        assert_eq!(result.unwrap_err().exit_code(), EXIT_USAGE);
    }
    assert_eq!(mixer.call_count(), 0);
}

// ============================================================================
// WAIT GATE
// ============================================================================

#[tokio::test]
async fn test_get_without_wait_returns_at_once() {
    let mixer = studio();
    let out = tokio::time::timeout(
        Duration::from_secs(5),
        jmctl(&mixer, &["get", "-i", "mic1", "volume"]),
    )
    .await
    .expect("get without a wait flag must not block")
    .unwrap();

    assert_eq!(out, "0.75\n");
    assert_eq!(mixer.call_count(), 1);
}

#[tokio::test]
async fn test_wait_on_volume_is_released_by_a_change() {
    let mixer = studio();
    let mic1 = PortRef::input("mic1");

    let change = async {
        // port lookup plus the wait call
        while mixer.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        mixer.set_balance(&mic1, 0.5).await.unwrap();
        mixer.set_volume(&mic1, 0.25).await.unwrap();
    };
    let (out, ()) = tokio::join!(jmctl(&mixer, &["get", "-i", "mic1", "volume", "-V"]), change);

    assert_eq!(out.unwrap(), "0.25\n");
}

#[tokio::test]
async fn test_wait_on_balance_then_connections() {
    let mixer = studio();
    let mon = PortRef::input("mon");

    let change = async {
        while mixer.call_count() < 2 {
            tokio::task::yield_now().await;
        }
        mixer.nudge(&mon, Property::Balance, -1.0).unwrap();
    };
    let (out, ()) = tokio::join!(jmctl(&mixer, &["get", "-B", "-m", "cs"]), change);

    assert_eq!(out.unwrap(), "spk1\nspk2\n");
}
