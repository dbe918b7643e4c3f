//! Fuzz target: `CommandDecoder::push`
//!
//! Drives arbitrary byte sequences into the streaming frame decoder and
//! asserts that it never panics, never yields a frame larger than the
//! fixed buffer, and recovers cleanly after a reset.
//!
//! cargo fuzz run fuzz_frame_decoder

#![no_main]

use homelink::link::CommandDecoder;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = CommandDecoder::new();

    for &b in data {
        match decoder.push(b) {
            Ok(Some(frame)) => {
                assert!(frame.len() <= 512, "frame exceeds MAX_FRAME_SIZE");
                // a complete frame is always a brace-delimited object
                assert_eq!(frame.first(), Some(&b'{'));
                assert_eq!(frame.last(), Some(&b'}'));
            }
            Ok(None) | Err(_) => {}
        }
    }

    // After a reset the decoder must accept a clean frame again.
    decoder.reset();
    let mut got = None;
    for &b in br#"{"ok":true}"# {
        if let Ok(Some(frame)) = decoder.push(b) {
            got = Some(frame.to_vec());
        }
    }
    assert_eq!(got.as_deref(), Some(br#"{"ok":true}"#.as_slice()));
});
