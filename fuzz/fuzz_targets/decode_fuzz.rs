//! Decode fuzz target: feed arbitrary bytes to the wire walker and the
//! CallResponse decoder. Neither must panic; malformed input returns
//! Err(CodecError). Build with: cargo fuzz run decode_fuzz (requires nightly
//! and cargo fuzz).

#![cfg_attr(fuzzing, no_main)]

#[cfg(fuzzing)]
use libfuzzer_sys::fuzz_target;

#[cfg(fuzzing)]
fuzz_target!(|data: &[u8]| {
    let _ = sumwire::wire::validate(data);
    if let Ok(resp) = sumwire::CallResponse::decode(data) {
        // whatever decodes must re-encode and decode to the same value
        let again = sumwire::CallResponse::decode(&resp.encode()).expect("re-decode");
        assert_eq!(again, resp);
    }
});

#[cfg(not(fuzzing))]
fn main() {
    eprintln!("Build with: cargo fuzz run decode_fuzz");
}
