//! Tests for batch decoding and query/result routing.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rstest::{fixture, rstest};

use super::*;
use crate::record::{RecordError, RecordTree, Separators, TreeValue};

const SCHEMA: &str = include_str!("../../demos/schema.json");
const CATALOG: &str = include_str!("../../demos/catalog.json");
const QUERY: &str = "H|\\^&|||Analyzer^1.0|20240105090000\nQ|1|^SPEC-9||ALL|O\nL|1|N";
const RESULTS: &str = include_str!("../../demos/results.txt");

#[fixture]
fn schema() -> Arc<MessageSchema> { Arc::new(MessageSchema::from_json(SCHEMA).expect("demo schema")) }

fn noon() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 19)
        .and_then(|d| d.and_hms_opt(10, 15, 0))
        .expect("valid time")
}

#[rstest]
#[case("H|x", Some(RecordType::Header))]
#[case("P|1", Some(RecordType::Patient))]
#[case("O|1", Some(RecordType::Order))]
#[case("R|1", Some(RecordType::Result))]
#[case("Q|1", Some(RecordType::Query))]
#[case("L|1", Some(RecordType::Termination))]
#[case("C|1", None)]
#[case("", None)]
fn lines_are_classified_by_first_character(#[case] line: &str, #[case] kind: Option<RecordType>) {
    assert_eq!(RecordType::classify(line), kind);
}

#[rstest]
fn query_batch_decodes_into_groups(schema: Arc<MessageSchema>) {
    let message = schema.decode(&RecordCodec::default(), QUERY);
    assert!(message.header.is_some());
    assert!(message.termination.is_some());
    assert_eq!(message.queries.len(), 1);
    let key = message.queries[0]
        .lookup(&["StartingRange", "SpecimenId"])
        .and_then(TreeValue::as_scalar);
    assert_eq!(key, Some("SPEC-9"));
}

#[rstest]
#[tokio::test]
async fn unknown_key_yields_a_routine_order(schema: Arc<MessageSchema>) {
    let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new()));
    let outcome = router.route_at(QUERY, noon()).await;
    assert_eq!(
        outcome,
        RouteOutcome::Reply(
            "H|\\^&|||Analyzer^1.0|20240105090000\nP|1|||^\nO|1|SPEC-9||^|R|20260319101500\nL|1|N"
                .into()
        )
    );

    let RouteOutcome::Reply(text) = outcome else {
        unreachable!()
    };
    let reply = router.decode(&text);
    assert_eq!(reply.patients.len(), 1);
    assert_eq!(reply.patients[0].scalar("PracticePatientId"), Some(""));
    assert_eq!(reply.orders[0].scalar("SpecimenId"), Some("SPEC-9"));
    assert_eq!(reply.orders[0].scalar("Priority"), Some("R"));
}

#[rstest]
#[tokio::test]
async fn custom_separators_apply_to_queries_and_replies(schema: Arc<MessageSchema>) {
    let separators = Separators {
        field: '!',
        component: '~',
        repeat: '`',
    };
    let query = "Q!1!~SPEC-7!!ALL!O\nL!1!N";

    let default = MessageRouter::new(schema.clone(), Arc::new(InMemoryOrderCatalog::new()));
    assert_eq!(default.route_at(query, noon()).await, RouteOutcome::Ignored);

    let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new())).with_separators(separators);
    assert_eq!(
        router.route_at(query, noon()).await,
        RouteOutcome::Reply("P!1!!!~\nO!1!SPEC-7!!~!R!20260319101500\nL!1!N".into())
    );
}

#[rstest]
#[tokio::test]
async fn router_config_selects_key_and_priority(schema: Arc<MessageSchema>) {
    let config = RouterConfig {
        query_key: vec!["StartingRange".into(), "PatientId".into()],
        priority: "S".into(),
        timestamp_format: "%Y-%m-%d".into(),
        ..RouterConfig::default()
    };
    let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new())).with_config(config);
    let query = "Q|1|PAT-3^||ALL|O\nL|1|N";
    assert_eq!(
        router.route_at(query, noon()).await,
        RouteOutcome::Reply("P|1|||^\nO|1|PAT-3||^|S|2026-03-19\nL|1|N".into())
    );
}

#[rstest]
#[tokio::test]
async fn catalog_order_answers_query_case_insensitively(schema: Arc<MessageSchema>) {
    let catalog = InMemoryOrderCatalog::from_json(CATALOG).expect("demo catalog");
    let router = MessageRouter::new(schema, Arc::new(catalog));
    let query = QUERY.replace("SPEC-9", "spec-1001");
    let RouteOutcome::Reply(text) = router.route_at(&query, noon()).await else {
        panic!("expected a reply");
    };
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "H|\\^&|||Analyzer^1.0|20240105090000");
    assert_eq!(lines[1], "P|1|PAT-17||Doe^Jane");
    assert_eq!(lines[2], "O|1|SPEC-1001||^GLU\\^NA|S|20240105083000");
    assert_eq!(lines[3], "L|1|N");
}

#[rstest]
#[tokio::test]
async fn complete_results_reach_the_sink(schema: Arc<MessageSchema>) {
    let (sink, mut rx) = ChannelSink::new(4);
    let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new())).with_sink(Arc::new(sink));
    assert_eq!(router.route(RESULTS).await, RouteOutcome::Delivered);

    let delivered = rx.recv().await.expect("delivery");
    assert_eq!(delivered.results.len(), 1);
    assert_eq!(delivered.results[0].scalar("Value"), Some("5.4"));
    let test = delivered.results[0].get("Test").and_then(TreeValue::as_object);
    assert_eq!(test.and_then(|t| t.scalar("TestCode")), Some("GLU"));
}

#[rstest]
#[case("H|\\^&|||Analyzer^1.0|20240105090000\nL|1|N")]
#[case("H|\\^&\nQ|1|^||ALL|O\nL|1|N")]
#[case("")]
#[tokio::test]
async fn nothing_actionable_is_ignored(schema: Arc<MessageSchema>, #[case] batch: &str) {
    let router = MessageRouter::new(schema, Arc::new(InMemoryOrderCatalog::new()));
    assert_eq!(router.route(batch).await, RouteOutcome::Ignored);
}

#[rstest]
fn records_are_numbered_per_group(schema: Arc<MessageSchema>) {
    let message = Message {
        patients: vec![
            RecordTree::new().with("PracticePatientId", "A"),
            RecordTree::new().with("PracticePatientId", "B"),
        ],
        termination: Some(RecordTree::new()),
        ..Message::default()
    };
    let text = schema.encode(&RecordCodec::default(), &message);
    assert_eq!(text, "P|1|A||^\nP|2|B||^\nL|1|N");
}

#[test]
fn schema_document_requires_every_group() {
    let err = MessageSchema::from_json(r#"{"Header": []}"#).expect_err("incomplete");
    assert!(matches!(err, RecordError::MissingGroup { group: "Patient" }));
}

#[test]
fn message_json_uses_group_names() {
    let message = Message {
        orders: vec![RecordTree::new().with("SpecimenId", "S1")],
        ..Message::default()
    };
    let json = serde_json::to_string(&message).expect("serialise");
    assert_eq!(json, r#"{"Order":[{"SpecimenId":"S1"}]}"#);
}
