//! Fuzz target for label CSV parsing.
//!
//! This fuzzer feeds arbitrary byte sequences to the label CSV parser,
//! checking for panics, crashes, or hangs.

#![no_main]

use keylabel::store::{from_label_csv_slice, CsvEncoding};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    let _ = from_label_csv_slice(data, CsvEncoding::Utf8);
});
