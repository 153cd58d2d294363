//! Byte-level scenarios fed straight into a responder.

use labwire::control::{ACK, NAK};
use labwire_testing::{
    continuation_frame,
    drive_responder,
    enq,
    eot,
    final_frame,
    with_checksum,
};
use rstest::rstest;

#[tokio::test]
async fn lines_split_across_frames_are_rejoined() {
    let outcome = drive_responder(vec![
        enq(),
        continuation_frame(1, "Hello "),
        final_frame(2, "Morasaurus"),
        final_frame(3, "Halo Dunia"),
        eot(),
    ])
    .await
    .expect("drive");

    assert_eq!(outcome.replies, [ACK, ACK, ACK, ACK]);
    assert_eq!(outcome.delivered, ["Hello Morasaurus\nHalo Dunia"]);
    assert_eq!(outcome.error, None);
}

#[tokio::test]
async fn rejected_frame_is_accepted_when_resent() {
    let good = final_frame(1, "Halo Dunia");
    let outcome = drive_responder(vec![
        enq(),
        with_checksum(good.clone(), *b"FF"),
        good,
        eot(),
    ])
    .await
    .expect("drive");

    assert_eq!(outcome.replies, [ACK, NAK, ACK]);
    assert_eq!(outcome.delivered, ["Halo Dunia"]);
}

#[rstest]
#[case::wrong_number(final_frame(2, "Halo"))]
#[case::bogus_number(final_frame(9, "Halo"))]
#[case::bad_checksum(with_checksum(final_frame(1, "Halo"), *b"00"))]
#[tokio::test]
async fn invalid_frames_are_refused(#[case] frame: Vec<u8>) {
    let outcome = drive_responder(vec![enq(), frame, eot()])
        .await
        .expect("drive");

    assert_eq!(outcome.replies, [ACK, NAK]);
    assert_eq!(outcome.delivered, [""]);
}

#[tokio::test]
async fn consecutive_cycles_start_numbering_afresh() {
    let outcome = drive_responder(vec![
        enq(),
        final_frame(1, "first"),
        eot(),
        enq(),
        final_frame(1, "second"),
        eot(),
    ])
    .await
    .expect("drive");

    assert_eq!(outcome.replies, [ACK, ACK, ACK, ACK]);
    assert_eq!(outcome.delivered, ["first", "second"]);
}

#[tokio::test]
async fn stream_closed_mid_cycle_discards_the_transfer() {
    let outcome = drive_responder(vec![enq(), final_frame(1, "partial")])
        .await
        .expect("drive");

    assert_eq!(outcome.replies, [ACK, ACK]);
    assert!(outcome.delivered.is_empty());
    assert_eq!(outcome.error, None);
}
