//! Fuzz target: `LineAssembler::feed`
//!
//! Splits arbitrary bytes at a fuzzer-chosen point and feeds both halves.
//! Delivered lines must be non-empty, bounded and terminator-free, and
//! the assembler must resynchronise cleanly after a reset.
//!
//! cargo fuzz run fuzz_line_assembler

#![no_main]

use libfuzzer_sys::fuzz_target;
use smokehouse::host::line::{LineAssembler, MAX_LINE_LEN};

fuzz_target!(|data: &[u8]| {
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let at = usize::from(split).min(rest.len());
    let (head, tail) = rest.split_at(at);

    let mut asm = LineAssembler::new();
    let check = |line: &[u8]| {
        assert!(!line.is_empty());
        assert!(line.len() <= MAX_LINE_LEN);
        assert!(!line.contains(&b'\n'));
    };
    asm.feed(head, check);
    asm.feed(tail, check);
    assert!(asm.pending() <= MAX_LINE_LEN);

    asm.reset();
    assert_eq!(asm.feed(b"HEATER_STATE 1\n", |_| {}), 1);
});
