use script_graph::builtin_nodes::standard_catalog;
use script_graph::{
    AlignEdge, Connection, DistributeAxis, EditError, EditorConfig, LinkDirection, NodeData, Position, ScriptEditor,
    Snapshot,
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use uuid::Uuid;

fn editor() -> ScriptEditor {
    ScriptEditor::new(Arc::new(standard_catalog()), EditorConfig::default())
}

fn add(ed: &mut ScriptEditor, node_type: &str, x: f32, y: f32) -> Uuid {
    ed.add_node(node_type, Position::new(x, y), NodeData::new()).unwrap()
}

#[test]
fn add_and_log_scenario() {
    let mut ed = editor();
    let sum = add(&mut ed, "math.add", 0.0, 0.0);
    let log = add(&mut ed, "action.log", 200.0, 0.0);

    assert!(ed.connect(Connection::new(sum, "result", log, "message")).is_ok());
    assert!(matches!(
        ed.connect(Connection::new(sum, "result", log, "exec_in")),
        Err(EditError::Incompatible { .. })
    ));
    assert_eq!(ed.graph().edges.len(), 1);
}

#[test]
fn second_source_replaces_first() {
    let mut ed = editor();
    let a = add(&mut ed, "data.number", 0.0, 0.0);
    let c = add(&mut ed, "data.number", 0.0, 100.0);
    let b = add(&mut ed, "math.add", 200.0, 0.0);
    ed.connect(Connection::new(a, "value", b, "a")).unwrap();
    ed.connect(Connection::new(c, "value", b, "a")).unwrap();

    let into_b: Vec<_> = ed
        .graph()
        .edges
        .iter()
        .filter(|e| e.target == b && e.target_port == "a")
        .collect();
    assert_eq!(into_b.len(), 1);
    assert_eq!(into_b[0].source, c);
}

#[test]
fn delete_removes_incident_edges() {
    let mut ed = editor();
    let hub = add(&mut ed, "math.add", 100.0, 0.0);
    let a = add(&mut ed, "data.number", 0.0, 0.0);
    let b = add(&mut ed, "data.number", 0.0, 100.0);
    let log = add(&mut ed, "action.log", 300.0, 0.0);
    let other = add(&mut ed, "data.string", 0.0, 300.0);
    let log2 = add(&mut ed, "action.log", 300.0, 300.0);
    ed.connect(Connection::new(a, "value", hub, "a")).unwrap();
    ed.connect(Connection::new(b, "value", hub, "b")).unwrap();
    ed.connect(Connection::new(hub, "result", log, "message")).unwrap();
    ed.connect(Connection::new(other, "value", log2, "message")).unwrap();

    ed.select_node(hub, false);
    assert_eq!(ed.delete_selected(), 1);
    assert_eq!(ed.graph().edges.len(), 1);
    assert_eq!(ed.graph().nodes.len(), 5);
    assert!(ed.selected_nodes().is_empty());
}

/// Edge endpoints without edge ids, which are allowed to change.
fn edge_signature(ed: &ScriptEditor) -> HashSet<(Uuid, String, Uuid, String)> {
    ed.graph()
        .edges
        .iter()
        .map(|e| (e.source, e.source_port.clone(), e.target, e.target_port.clone()))
        .collect()
}

#[test]
fn group_round_trip_restores_graph() {
    let mut ed = editor();
    let tick = add(&mut ed, "trigger.on_tick", 0.0, 0.0);
    let branch = add(&mut ed, "flow.branch", 150.0, 0.0);
    let not = add(&mut ed, "logic.not", 150.0, 150.0);
    let chat = add(&mut ed, "action.send_chat", 300.0, 0.0);
    let wait = add(&mut ed, "action.wait", 300.0, 150.0);
    ed.connect(Connection::new(tick, "exec_out", branch, "exec_in")).unwrap();
    ed.connect(Connection::new(not, "result", branch, "condition")).unwrap();
    ed.connect(Connection::new(branch, "true", chat, "exec_in")).unwrap();
    ed.connect(Connection::new(branch, "false", wait, "exec_in")).unwrap();
    ed.update_node_data(branch, NodeData::new().with("label", "guard"));
    ed.update_node_data(chat, NodeData::new().with("message", "intruder!"));

    let nodes_before = ed.graph().nodes.clone();
    let edges_before = edge_signature(&ed);

    ed.select_nodes([branch, not]);
    let group = ed.create_group_from_selection().unwrap();
    assert!(ed.diagnostics().is_empty(), "{:?}", ed.diagnostics());
    ed.select_node(group, false);
    ed.ungroup_selected();

    assert_eq!(edge_signature(&ed), edges_before);
    let ids: HashSet<_> = ed.graph().nodes.keys().copied().collect();
    assert_eq!(ids, nodes_before.keys().copied().collect());
    for (id, node) in &nodes_before {
        let now = ed.node(*id).unwrap();
        assert_eq!(now.position, node.position);
        assert_eq!(now.data, node.data);
        assert_eq!(now.parent_group, None);
    }
}

#[test]
fn clipboard_round_trip_is_isomorphic() {
    let mut ed = editor();
    let a = add(&mut ed, "data.number", 0.0, 0.0);
    let b = add(&mut ed, "math.add", 100.0, 40.0);
    let log = add(&mut ed, "action.log", 300.0, 0.0);
    ed.update_node_data(a, NodeData::new().with("value", 7.0));
    ed.connect(Connection::new(a, "value", b, "a")).unwrap();
    ed.connect(Connection::new(b, "result", log, "message")).unwrap();

    ed.select_nodes([a, b]);
    let snapshot = Snapshot::from_text(&ed.copy_selection().unwrap().to_text().unwrap()).unwrap();
    let existing: HashSet<Uuid> = ed.graph().nodes.keys().copied().collect();
    let pasted = ed.paste(&snapshot, snapshot.reference);

    assert_eq!(pasted.len(), 2);
    assert!(pasted.iter().all(|id| !existing.contains(id)));
    let originals: HashMap<&str, Uuid> = [("data.number", a), ("math.add", b)].into_iter().collect();
    for id in &pasted {
        let copy = ed.node(*id).unwrap();
        let original = ed.node(originals[copy.node_type.as_str()]).unwrap();
        assert_eq!(copy.position, original.position);
        assert_eq!(copy.data, original.data);
    }
    let internal: Vec<_> = ed
        .graph()
        .edges
        .iter()
        .filter(|e| pasted.contains(&e.source) || pasted.contains(&e.target))
        .collect();
    assert_eq!(internal.len(), 1);
    assert_eq!((internal[0].source_port.as_str(), internal[0].target_port.as_str()), ("value", "a"));
}

#[test]
fn linked_selection_is_idempotent() {
    let mut ed = editor();
    let a = add(&mut ed, "data.number", 0.0, 0.0);
    let b = add(&mut ed, "math.add", 100.0, 0.0);
    let c = add(&mut ed, "data.number", 0.0, 100.0);
    let far = add(&mut ed, "data.string", 0.0, 400.0);
    ed.connect(Connection::new(a, "value", b, "a")).unwrap();
    ed.connect(Connection::new(c, "value", b, "b")).unwrap();

    ed.select_node(a, false);
    ed.select_linked(LinkDirection::Both);
    let once: HashSet<_> = ed.selected_nodes().into_iter().collect();
    ed.select_linked(LinkDirection::Both);
    let twice: HashSet<_> = ed.selected_nodes().into_iter().collect();
    assert_eq!(once, HashSet::from([a, b, c]));
    assert_eq!(once, twice);
    assert!(!twice.contains(&far));
}

#[test]
fn shortest_path_on_chain_and_disconnected() {
    let mut ed = editor();
    let a = add(&mut ed, "data.number", 0.0, 0.0);
    let x = add(&mut ed, "math.add", 100.0, 0.0);
    let y = add(&mut ed, "math.multiply", 200.0, 0.0);
    let b = add(&mut ed, "action.log", 300.0, 0.0);
    let lone = add(&mut ed, "data.number", 0.0, 300.0);
    ed.connect(Connection::new(a, "value", x, "a")).unwrap();
    ed.connect(Connection::new(x, "result", y, "a")).unwrap();
    ed.connect(Connection::new(y, "result", b, "message")).unwrap();

    assert!(ed.select_shortest_path(a, b));
    let selected: HashSet<_> = ed.selected_nodes().into_iter().collect();
    assert_eq!(selected, HashSet::from([a, x, y, b]));

    assert!(!ed.select_shortest_path(a, lone));
    let selected: HashSet<_> = ed.selected_nodes().into_iter().collect();
    assert_eq!(selected, HashSet::from([a, lone]));
}

#[test]
fn align_and_distribute_examples() {
    let mut ed = editor();
    let ids = [
        add(&mut ed, "data.number", 10.0, 5.0),
        add(&mut ed, "data.number", 50.0, 6.0),
        add(&mut ed, "data.number", 30.0, 7.0),
    ];
    ed.select_nodes(ids);
    ed.align_selected(AlignEdge::Left);
    for (id, y) in ids.iter().zip([5.0, 6.0, 7.0]) {
        assert_eq!(ed.node(*id).unwrap().position, Position::new(10.0, y));
    }

    let spread = [
        add(&mut ed, "data.number", 0.0, 0.0),
        add(&mut ed, "data.number", 90.0, 0.0),
        add(&mut ed, "data.number", 30.0, 0.0),
    ];
    ed.select_nodes(spread);
    ed.distribute_selected(DistributeAxis::Horizontal);
    let xs: Vec<_> = spread.iter().map(|id| ed.node(*id).unwrap().position.x).collect();
    assert_eq!(xs, vec![0.0, 90.0, 45.0]);
}
