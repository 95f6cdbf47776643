//! Benchmark: compare structural walk vs full decode vs decode+encode for
//! CallResponse buffers, plus frame decoding over a batch of responses.
//! Walk uses the zero-copy WireWalker only (no values allocated).

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use sumwire::frame::encode_frame;
use sumwire::{decode_frame, CallResponse, Codec, Data};

fn sample_response() -> CallResponse {
    let mut payload = Vec::new();
    sumwire::wire::encode_key(1, sumwire::WireType::Varint, &mut payload);
    sumwire::wire::encode_varint(0, &mut payload);
    sumwire::wire::encode_key(2, sumwire::WireType::LengthDelimited, &mut payload);
    sumwire::wire::encode_varint(32, &mut payload);
    payload.extend_from_slice(&[0x42; 32]);

    let mut resp = CallResponse::new();
    resp.set_success(true)
        .set_msg("oracle evaluated in 3ms")
        .set_data(Some(Data::from_encoded(payload).expect("payload")));
    resp
}

fn bench_codec(c: &mut Criterion) {
    let resp = sample_response();
    let bytes = resp.encode();
    let codec = Codec::for_sum();
    let frame = encode_frame(&codec, &vec![resp.to_value(); 64]);

    c.bench_function("encode_call_response", |b| {
        b.iter(|| black_box(resp.encode()))
    });

    c.bench_function("decode_call_response", |b| {
        b.iter(|| CallResponse::decode(black_box(&bytes)).expect("decode"))
    });

    c.bench_function("walk_call_response", |b| {
        b.iter(|| sumwire::wire::validate(black_box(&bytes)).expect("walk"))
    });

    c.bench_function("decode_frame_64", |b| {
        b.iter(|| {
            let result =
                decode_frame(&codec, "sum.CallResponse", black_box(&frame)).expect("frame");
            assert_eq!(result.messages.len(), 64);
        })
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);
