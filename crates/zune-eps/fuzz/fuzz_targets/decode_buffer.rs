#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    use zune_eps::zune_core::bytestream::ZCursor;
    let data = ZCursor::new(data);

    let mut decoder = zune_eps::EpsDecoder::new(data);
    let _ = decoder.decode();
    let _ = decoder.read_preview();
});
