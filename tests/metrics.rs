//! Tests for `labwire` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
#![cfg(feature = "metrics")]

use bytes::Bytes;
use labwire::{
    config::LinkConfig,
    control::ENQ,
    frame::Inbound,
    metrics::{self, CONNECTION_PANICS, Direction, FRAMES_PROCESSED, FRAMES_REJECTED, RETRANSMISSIONS},
    session::Responder,
};
use labwire_testing::{counter_value, debugging_recorder_setup, final_frame, with_checksum};
use metrics_util::debugging::DebugValue;
use rstest::rstest;

#[test]
fn outbound_frame_metric_carries_direction() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, || metrics::inc_frames(Direction::Outbound));

    let found = snapshotter.snapshot().into_vec().iter().any(|(k, _, _, v)| {
        k.key().name() == FRAMES_PROCESSED
            && k.key()
                .labels()
                .any(|l| l.key() == "direction" && l.value() == "outbound")
            && matches!(v, DebugValue::Counter(c) if *c > 0)
    });
    assert!(found, "outbound frames metric not recorded");
}

#[test]
fn responder_counts_rejected_frames() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, || {
        let mut responder = Responder::new(LinkConfig::default());
        responder.handle(Inbound::Control(ENQ));
        let bad = with_checksum(final_frame(1, "Halo"), *b"FF");
        responder.handle(Inbound::Frame(Bytes::from(bad)));
        responder.handle(Inbound::Frame(Bytes::from(final_frame(1, "Halo"))));
    });

    assert_eq!(counter_value(&snapshotter, FRAMES_REJECTED), 1);
    assert_eq!(counter_value(&snapshotter, FRAMES_PROCESSED), 2);
}

#[rstest]
#[case(1)]
#[case(3)]
fn retransmissions_accumulate(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, || {
        (0..expected).for_each(|_| metrics::inc_retransmissions());
    });
    assert_eq!(counter_value(&snapshotter, RETRANSMISSIONS), expected);
}

#[test]
fn connection_panics_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    ::metrics::with_local_recorder(&recorder, metrics::inc_connection_panics);
    assert_eq!(counter_value(&snapshotter, CONNECTION_PANICS), 1);
}
