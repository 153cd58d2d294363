//! Tests for the record codec and schema documents.

use proptest::prelude::*;
use rstest::{fixture, rstest};

use super::*;

#[fixture]
fn order_schema() -> Schema {
    Schema::new(vec![
        SchemaNode::value("RecordType", "O"),
        SchemaNode::value("SequenceNumber", ""),
        SchemaNode::object(
            "Specimen",
            Schema::new(vec![
                SchemaNode::value("SpecimenId", ""),
                SchemaNode::value("Rack", ""),
            ]),
        ),
        SchemaNode::repeated(
            "Tests",
            Schema::new(vec![
                SchemaNode::value("Code", ""),
                SchemaNode::value("Dilution", ""),
            ]),
        ),
        SchemaNode::value("Priority", ""),
    ])
}

#[rstest]
fn encodes_nested_and_repeated_fields(order_schema: Schema) {
    let tree = RecordTree::new()
        .with("Specimen", RecordTree::new().with("SpecimenId", "SPEC-1"))
        .with(
            "Tests",
            vec![
                RecordTree::new().with("Code", "GLU"),
                RecordTree::new().with("Code", "NA").with("Dilution", "2"),
            ],
        )
        .with("Priority", "S");
    let line = RecordCodec::default().encode(&order_schema, &tree, Some(3));
    assert_eq!(line, "O|3|SPEC-1^|GLU^\\NA^2|S");
}

#[rstest]
fn schema_literal_wins_over_tree_value(order_schema: Schema) {
    let tree = RecordTree::new().with("RecordType", "X");
    let line = RecordCodec::default().encode(&order_schema, &tree, None);
    assert!(line.starts_with("O|"));
}

#[rstest]
fn sequence_override_replaces_tree_value(order_schema: Schema) {
    let tree = RecordTree::new().with("SequenceNumber", "99");
    let codec = RecordCodec::default();
    assert!(codec.encode(&order_schema, &tree, Some(1)).starts_with("O|1|"));
    assert!(codec.encode(&order_schema, &tree, None).starts_with("O|99|"));
}

#[test]
fn sequence_override_applies_only_at_top_level() {
    let schema = Schema::new(vec![
        SchemaNode::value("SequenceNumber", ""),
        SchemaNode::object("Inner", Schema::new(vec![SchemaNode::value("SequenceNumber", "")])),
    ]);
    let tree = RecordTree::new().with("Inner", RecordTree::new().with("SequenceNumber", "7"));
    assert_eq!(RecordCodec::default().encode(&schema, &tree, Some(2)), "2|7");
}

#[rstest]
fn mismatched_value_renders_empty(order_schema: Schema) {
    let tree = RecordTree::new()
        .with("Priority", RecordTree::new())
        .with("Specimen", "flat");
    let line = RecordCodec::default().encode(&order_schema, &tree, None);
    assert_eq!(line, "O||^|^|");
}

#[rstest]
fn decodes_missing_fields_as_empty(order_schema: Schema) {
    let tree = RecordCodec::default().decode(&order_schema, "O|1");
    assert_eq!(tree.scalar("RecordType"), Some("O"));
    assert_eq!(tree.scalar("Priority"), Some(""));
    let specimen = tree.get("Specimen").and_then(TreeValue::as_object).expect("object");
    assert_eq!(specimen.scalar("SpecimenId"), Some(""));
}

#[rstest]
fn repeated_field_with_several_occurrences_decodes_as_list(order_schema: Schema) {
    let tree = RecordCodec::default().decode(&order_schema, "O|1|S^R|GLU^\\NA^2|R");
    let tests = tree.get("Tests").and_then(TreeValue::as_list).expect("list");
    assert_eq!(tests.len(), 2);
    assert_eq!(tests[1].scalar("Code"), Some("NA"));
    assert_eq!(tests[1].scalar("Dilution"), Some("2"));
}

#[rstest]
fn single_occurrence_decodes_as_object(order_schema: Schema) {
    let codec = RecordCodec::default();
    let tree = RecordTree::new().with("Tests", vec![RecordTree::new().with("Code", "GLU")]);
    let line = codec.encode(&order_schema, &tree, Some(1));
    let decoded = codec.decode(&order_schema, &line);
    let tests = decoded.get("Tests").expect("field");
    assert_eq!(tests.as_list(), None);
    assert_eq!(tests.as_object().and_then(|t| t.scalar("Code")), Some("GLU"));
}

#[rstest]
fn surplus_fields_are_dropped(order_schema: Schema) {
    let tree = RecordCodec::default().decode(&order_schema, "O|1|^|^|R|extra|more");
    assert_eq!(tree.len(), order_schema.len());
    assert_eq!(tree.scalar("Priority"), Some("R"));
}

#[test]
fn custom_separators_are_honoured() {
    let codec = RecordCodec::new(Separators {
        field: ';',
        component: ':',
        repeat: '~',
    });
    let schema = Schema::new(vec![
        SchemaNode::value("A", ""),
        SchemaNode::object("B", Schema::new(vec![SchemaNode::value("C", ""), SchemaNode::value("D", "")])),
    ]);
    let tree = RecordTree::new()
        .with("A", "1")
        .with("B", RecordTree::new().with("C", "2").with("D", "3"));
    let line = codec.encode(&schema, &tree, None);
    assert_eq!(line, "1;2:3");
    assert_eq!(codec.decode(&schema, &line), tree);
}

#[test]
fn schema_document_parses_every_kind() {
    let schema = Schema::from_json(
        r#"[
            {"name": "RecordType", "value": "R"},
            {"name": "Test", "object": [{"name": "Code", "value": ""}]},
            {"name": "Flags", "repeated": [{"name": "Flag", "value": ""}]}
        ]"#,
    )
    .expect("valid schema");
    let kinds: Vec<_> = schema.iter().map(|n| &n.kind).collect();
    assert!(matches!(kinds[0], NodeKind::Value(v) if v == "R"));
    assert!(matches!(kinds[1], NodeKind::Object(s) if s.len() == 1));
    assert!(matches!(kinds[2], NodeKind::Repeated(s) if s.len() == 1));
}

#[rstest]
#[case(r#"[{"name": "X"}]"#)]
#[case(r#"[{"name": "X", "value": "", "object": []}]"#)]
fn node_needs_exactly_one_kind(#[case] json: &str) {
    let err = Schema::from_json(json).expect_err("ambiguous node");
    assert!(err.to_string().contains("exactly one"), "{err}");
}

#[test]
fn schema_document_round_trips_through_json() {
    let schema = order_schema();
    let json = serde_json::to_string(&schema).expect("serialise");
    assert_eq!(Schema::from_json(&json).expect("parse"), schema);
}

#[test]
fn tree_deserialises_from_plain_json() {
    let tree: RecordTree =
        serde_json::from_str(r#"{"Id": "1", "Sub": {"A": "x"}, "Many": [{"A": "y"}]}"#)
            .expect("valid tree");
    assert_eq!(tree.scalar("Id"), Some("1"));
    assert!(tree.get("Sub").and_then(TreeValue::as_object).is_some());
    assert_eq!(tree.lookup(&["Many", "A"]).and_then(TreeValue::as_scalar), Some("y"));
}

fn flat_schema(names: &[String]) -> Schema {
    names.iter().map(|n| SchemaNode::value(n.clone(), "")).collect()
}

prop_compose! {
    fn shaped_tree()(
        top in proptest::collection::vec("[A-Za-z0-9 .-]{0,8}", 1..5),
        nested in proptest::collection::vec(proptest::collection::vec("[A-Za-z0-9 .-]{0,8}", 1..4), 0..3),
    ) -> (Schema, RecordTree) {
        let mut nodes = Vec::new();
        let mut tree = RecordTree::new();
        for (i, value) in top.into_iter().enumerate() {
            let name = format!("F{i}");
            nodes.push(SchemaNode::value(name.clone(), ""));
            tree.insert(name, value);
        }
        for (i, values) in nested.into_iter().enumerate() {
            let names: Vec<String> = (0..values.len()).map(|j| format!("C{j}")).collect();
            let sub: RecordTree = names.iter().cloned().zip(values).collect();
            let name = format!("N{i}");
            nodes.push(SchemaNode::object(name.clone(), flat_schema(&names)));
            tree.insert(name, sub);
        }
        (Schema::new(nodes), tree)
    }
}

proptest! {
    #[test]
    fn decode_inverts_encode_without_repeats((schema, tree) in shaped_tree()) {
        let codec = RecordCodec::default();
        let line = codec.encode(&schema, &tree, None);
        prop_assert_eq!(codec.decode(&schema, &line), tree);
    }
}
