//! End-to-end recording scenarios driven through the recorder's public API.

use rewind_core::{
    AgentEnvelope, Config, ObserverHandle, OutboundMessage, Recorder, RecordingState, TabId,
};
use serde_json::{json, Value};
use tokio::sync::mpsc::UnboundedReceiver;

const TAB: TabId = TabId(101);

fn envelope(message: Value) -> AgentEnvelope {
    AgentEnvelope {
        tab_id: TAB,
        title: "Todo App".to_string(),
        message,
    }
}

fn record(rec: &mut Recorder, payload: Value) {
    rec.handle_agent_message(envelope(json!({"action": "recordSnap", "payload": payload})));
}

fn reload(rec: &mut Recorder) {
    rec.handle_agent_message(envelope(json!({"action": "tabReload"})));
}

fn observe(rec: &mut Recorder) -> UnboundedReceiver<OutboundMessage> {
    let (handle, rx) = ObserverHandle::channel();
    rec.connect_observer(handle);
    rx
}

fn drain(rx: &mut UnboundedReceiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

fn snapshots(rec: &Recorder) -> Vec<Value> {
    rec.store().get(TAB).unwrap().snapshots.clone()
}

#[test]
fn single_record_creates_session_and_tree() {
    let mut rec = Recorder::new(&Config::default());
    let mut rx = observe(&mut rec);

    record(&mut rec, json!("A"));

    let session = rec.store().get(TAB).unwrap();
    assert_eq!(session.title, "Todo App");
    assert_eq!(session.snapshots, vec![json!("A")]);
    assert_eq!(session.hierarchy.len(), 1);
    assert_eq!(session.hierarchy.current(), session.hierarchy.root());
    assert_eq!(session.hierarchy.current_node().unwrap().payload, json!("A"));

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action(), "initialConnectSnapshots");
}

#[test]
fn reload_then_echo_keeps_first_snapshot_only() {
    let mut rec = Recorder::new(&Config::default());
    let mut rx = observe(&mut rec);

    record(&mut rec, json!("A"));
    record(&mut rec, json!("A2"));
    reload(&mut rec);
    assert_eq!(snapshots(&rec), vec![json!("A")]);

    record(&mut rec, json!("B"));
    assert_eq!(snapshots(&rec), vec![json!("A")]);
    assert_eq!(rec.store().tracker(TAB).state(), RecordingState::Steady);

    let actions: Vec<&str> = drain(&mut rx).iter().map(|m| m.action()).collect();
    assert_eq!(
        actions,
        vec![
            "initialConnectSnapshots",
            "sendSnapshots",
            "initialConnectSnapshots",
            "sendSnapshots"
        ]
    );
}

#[test]
fn steady_records_grow_list_and_tree() {
    let mut rec = Recorder::new(&Config::default());
    let mut rx = observe(&mut rec);

    record(&mut rec, json!("A"));
    record(&mut rec, json!("B"));

    let session = rec.store().get(TAB).unwrap();
    assert_eq!(session.snapshots, vec![json!("A"), json!("B")]);

    let root = session.hierarchy.root().unwrap();
    let children = session.hierarchy.children(root);
    assert_eq!(children.len(), 1);
    assert_eq!(session.hierarchy.get(children[0]).unwrap().payload, json!("B"));
    assert_eq!(session.hierarchy.current(), Some(children[0]));

    let sent = drain(&mut rx);
    match sent.last().unwrap() {
        OutboundMessage::SendSnapshots {
            payload,
            source_tab,
        } => {
            assert_eq!(*source_tab, TAB);
            assert_eq!(payload["101"]["snapshots"], json!(["A", "B"]));
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn first_record_after_reloads_on_fresh_session() {
    let mut rec = Recorder::new(&Config::default());
    let mut rx = observe(&mut rec);

    reload(&mut rec);
    reload(&mut rec);
    drain(&mut rx);

    record(&mut rec, json!("A"));
    assert_eq!(snapshots(&rec).len(), 1);

    let sent = drain(&mut rx);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].action(), "initialConnectSnapshots");
}

#[test]
fn persist_survives_reload() {
    let mut rec = Recorder::new(&Config::default());
    let observer = rewind_core::ObserverId::new();

    record(&mut rec, json!("A"));
    record(&mut rec, json!("B"));
    record(&mut rec, json!("C"));
    rec.handle_observer_message(
        observer,
        json!({"action": "setPersist", "payload": true, "tabId": 101}),
    );

    reload(&mut rec);
    assert_eq!(snapshots(&rec).len(), 3);

    // Echo is still dropped while persisting
    record(&mut rec, json!("A"));
    assert_eq!(snapshots(&rec).len(), 3);
}

#[test]
fn tab_close_broadcasts_and_resets() {
    let mut rec = Recorder::new(&Config::default());

    record(&mut rec, json!("A"));
    record(&mut rec, json!("B"));
    reload(&mut rec);

    let mut rx = observe(&mut rec);
    drain(&mut rx);

    rec.tab_closed(TAB);
    assert_eq!(drain(&mut rx), vec![OutboundMessage::delete_tab(TAB)]);
    assert!(!rec.store().contains(TAB));

    // A new session starts unseen; the stale reload flag is gone
    assert_eq!(rec.store().tracker(TAB).state(), RecordingState::Unseen);
    record(&mut rec, json!("Z"));
    assert_eq!(snapshots(&rec), vec![json!("Z")]);
}

#[test]
fn tab_close_without_observers() {
    let mut rec = Recorder::new(&Config::default());
    record(&mut rec, json!("A"));

    rec.tab_closed(TAB);
    rec.tab_closed(TabId(999));

    assert!(rec.store().is_empty());
}

#[test]
fn late_observer_receives_existing_state() {
    let mut rec = Recorder::new(&Config::default());

    let mut early = observe(&mut rec);
    assert!(drain(&mut early).is_empty());

    record(&mut rec, json!("A"));
    record(&mut rec, json!("B"));

    let mut late = observe(&mut rec);
    let sent = drain(&mut late);
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        OutboundMessage::InitialConnectSnapshots { payload } => {
            assert_eq!(payload["101"]["snapshots"], json!(["A", "B"]));
            assert_eq!(payload["101"]["mode"]["persist"], false);
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn disconnected_observer_stops_receiving() {
    let mut rec = Recorder::new(&Config::default());
    let (handle, mut rx) = ObserverHandle::channel();
    let id = handle.id();
    rec.connect_observer(handle);

    record(&mut rec, json!("A"));
    assert!(rec.disconnect_observer(id));
    record(&mut rec, json!("B"));

    assert_eq!(drain(&mut rx).len(), 1);
    assert!(rec.observers().is_empty());
}

#[test]
fn dropped_observer_is_pruned_on_broadcast() {
    let mut rec = Recorder::new(&Config::default());
    let gone = observe(&mut rec);
    let mut alive = observe(&mut rec);
    drop(gone);

    record(&mut rec, json!("A"));

    assert_eq!(rec.observers().len(), 1);
    assert_eq!(drain(&mut alive).len(), 1);
}

#[test]
fn node_ids_are_global_across_tabs() {
    let mut rec = Recorder::new(&Config::default());

    record(&mut rec, json!("A"));
    rec.handle_agent_message(AgentEnvelope {
        tab_id: TabId(202),
        title: "Other".to_string(),
        message: json!({"action": "recordSnap", "payload": "X"}),
    });
    record(&mut rec, json!("B"));

    let first = rec.store().get(TAB).unwrap();
    let second = rec.store().get(TabId(202)).unwrap();
    let first_ids: Vec<u64> = first.hierarchy.nodes().iter().map(|n| n.id.0).collect();
    let second_ids: Vec<u64> = second.hierarchy.nodes().iter().map(|n| n.id.0).collect();

    assert_eq!(first_ids, vec![1, 3]);
    assert_eq!(second_ids, vec![2]);
}
