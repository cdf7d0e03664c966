// Unit tests for newline framing of backend stdout

use crate::codec::{FrameDecoder, InboundEvent, decode};

/// **VALUE**: Verifies that a payload split across two reads is reassembled.
///
/// **WHY THIS MATTERS**: The pipe may hand over half a payload. Decoding each read on
/// its own would lose every event that straddles a read boundary.
///
/// **BUG THIS CATCHES**: Would catch if the unterminated tail were discarded between pushes.
#[test]
fn given_payload_split_across_chunks_when_pushed_then_one_frame_emitted() {
    // GIVEN: A decoder and a payload cut in the middle
    let mut decoder = FrameDecoder::default();

    // WHEN: Pushing both halves
    let first = decoder.push(br#"{"type":"call_ended","#);
    let second = decoder.push(b"\"call_id\":\"4\"}\n");

    // THEN: Only the second push completes a frame, and it decodes
    assert!(first.is_empty());
    assert_eq!(second.len(), 1);
    assert_eq!(
        decode(&second[0]),
        Some(InboundEvent::CallEnded {
            call_id: "4".to_string()
        })
    );
    assert_eq!(decoder.pending_len(), 0);
}

/// **VALUE**: Verifies that several payloads in one read become separate frames in order.
///
/// **BUG THIS CATCHES**: Would catch the case where only the first payload of a burst
/// is delivered because the whole chunk was treated as one message.
#[test]
fn given_two_payloads_and_log_line_in_one_chunk_when_pushed_then_frames_in_order() {
    // GIVEN: A burst with a log line between two payloads
    let mut decoder = FrameDecoder::default();
    let chunk = b"{\"type\":\"call_init\",\"id\":\"1\"}\nSetting up media\n{\"type\":\"call_ended\",\"call_id\":\"1\"}\n";

    // WHEN: Pushing
    let frames = decoder.push(chunk);

    // THEN: Three frames, the log line yields no event
    assert_eq!(frames.len(), 3);
    let events: Vec<_> = frames.iter().filter_map(|frame| decode(frame)).collect();
    assert_eq!(
        events,
        vec![
            InboundEvent::CallInit { id: "1".to_string() },
            InboundEvent::CallEnded {
                call_id: "1".to_string()
            },
        ]
    );
}

#[test]
fn given_crlf_and_blank_lines_when_pushed_then_blank_lines_skipped() {
    let mut decoder = FrameDecoder::default();

    let frames = decoder.push(b"\r\n\nfirst\r\n  \nsecond\n");

    assert_eq!(frames, vec!["first".to_string(), "second".to_string()]);
}

/// **VALUE**: Verifies that an oversized line is dropped and decoding resumes after it.
///
/// **WHY THIS MATTERS**: A runaway backend must not grow the buffer without bound, and
/// one bad line must not poison the rest of the stream.
///
/// **BUG THIS CATCHES**: Would catch if the decoder kept discarding after the newline, or
/// delivered the tail of the oversized line as a frame.
#[test]
fn given_oversized_line_when_pushed_then_dropped_and_next_frame_delivered() {
    // GIVEN: A small limit
    let mut decoder = FrameDecoder::new(16);

    // WHEN: Pushing a long line in pieces, then a short one
    let first = decoder.push(&[b'x'; 20]);
    let second = decoder.push(b"yyyy\nok\n");

    // THEN: Only the short line survives
    assert!(first.is_empty());
    assert_eq!(decoder.pending_len(), 0);
    assert_eq!(second, vec!["ok".to_string()]);
}

#[test]
fn given_oversized_complete_line_when_pushed_then_following_line_kept() {
    let mut decoder = FrameDecoder::new(8);

    let frames = decoder.push(b"0123456789abcdef\nshort\n");

    assert_eq!(frames, vec!["short".to_string()]);
}

/// **VALUE**: Verifies that a final payload without a trailing newline is flushed on finish.
///
/// **WHY THIS MATTERS**: A backend that exits right after printing its last event may
/// not terminate the line. That event must still reach the session.
#[test]
fn given_unterminated_tail_when_finished_then_tail_returned_once() {
    // GIVEN: A tail without newline
    let mut decoder = FrameDecoder::default();
    assert!(decoder.push(br#"{"type":"error","message":"bye"}"#).is_empty());

    // WHEN: Finishing twice
    let first = decoder.finish();
    let second = decoder.finish();

    // THEN: Returned once
    assert_eq!(first.as_deref(), Some(r#"{"type":"error","message":"bye"}"#));
    assert_eq!(second, None);
}

#[test]
fn given_discarding_state_when_finished_then_nothing_returned() {
    let mut decoder = FrameDecoder::new(4);
    decoder.push(b"too long for the limit");

    assert_eq!(decoder.finish(), None);
    assert_eq!(decoder.push(b"ok\n"), vec!["ok".to_string()]);
}
