//! Throughput benchmark for XML-RPC encoding and decoding.
//!
//! Builds a synthetic `methodCall` carrying one struct per record and
//! measures encode (contiguous and chunked) and decode speed.

use std::time::Instant;

use xmlrpc_codec::{
    decode, encode, BinaryRaw, DateTimeRaw, DecodeOptions, EncodeOptions, Envelope, IsoDateTime,
    MethodCall, OutputShape, StructBuilder, Value,
};

const DEFAULT_RECORDS: usize = 10_000;
const ENCODE_ITERS: u32 = 10;
const DECODE_ITERS: u32 = 5;

// =============================================================================
// DATA GENERATION
// =============================================================================

fn record(i: usize) -> Value {
    let month = (i % 12 + 1) as u8;
    let day = (i % 28 + 1) as u8;
    let stamp = IsoDateTime::new(2024, month, day, (i % 24) as u8, (i % 60) as u8, 0)
        .map(|dt| Value::DateTime(DateTimeRaw::from_datetime(&dt)))
        .unwrap_or(Value::Nil);

    StructBuilder::new()
        .member("id", i as i64)
        .member("name", format!("record <{}> & co", i))
        .member("score", i as f64 * 0.37 + 0.001)
        .member("active", i % 3 == 0)
        .member("created", stamp)
        .member("payload", BinaryRaw::from_bytes(&(i as u64).to_le_bytes()))
        .member(
            "tags",
            vec![Value::string("alpha"), Value::int(i as i64 * 7), Value::Nil],
        )
        .nested("owner", |o| o.member("uid", (i % 97) as i64).member("nick", "bench"))
        .into_value()
}

fn build_call(records: usize) -> MethodCall {
    let items: Vec<Value> = (0..records).map(record).collect();
    MethodCall::builder("bench.upload")
        .param(records as i64)
        .param(Value::Array(items))
        .build()
}

fn throughput(bytes: usize, secs: f64) -> f64 {
    (bytes as f64 / 1_000_000.0) / secs
}

fn main() {
    let records = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(DEFAULT_RECORDS);

    println!("=== XML-RPC codec benchmark ===");
    println!("Records: {}", records);

    let build_start = Instant::now();
    let call = Envelope::from(build_call(records));
    println!("Built call in {:?}", build_start.elapsed());

    // Benchmark encoding (contiguous)
    let options = EncodeOptions::new();
    for _ in 0..2 {
        let _ = encode(&call, &options).expect("Failed to encode");
    }

    let encode_start = Instant::now();
    let mut encoded = None;
    for _ in 0..ENCODE_ITERS {
        encoded = Some(encode(&call, &options).expect("Failed to encode"));
    }
    let encode_time = encode_start.elapsed() / ENCODE_ITERS;
    let encoded = encoded.expect("at least one iteration").into_bytes();

    println!(
        "\nEncode (contiguous): {} bytes in {:?} (avg of {} iterations)",
        encoded.len(),
        encode_time,
        ENCODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        throughput(encoded.len(), encode_time.as_secs_f64())
    );

    // Benchmark encoding (chunked)
    let chunked_options = EncodeOptions::new().output(OutputShape::Chunked);
    let chunked_start = Instant::now();
    let mut chunked = None;
    for _ in 0..ENCODE_ITERS {
        chunked = Some(encode(&call, &chunked_options).expect("Failed to encode chunked"));
    }
    let chunked_time = chunked_start.elapsed() / ENCODE_ITERS;
    let chunked = chunked.expect("at least one iteration");

    println!(
        "\nEncode (chunked): {} bytes in {} chunks, {:?} (avg of {} iterations)",
        chunked.len(),
        chunked.chunks().len(),
        chunked_time,
        ENCODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        throughput(chunked.len(), chunked_time.as_secs_f64())
    );
    assert_eq!(
        chunked.into_bytes(),
        encoded,
        "Chunked output should match contiguous output"
    );

    // Benchmark decoding
    let decode_options = DecodeOptions::new();
    for _ in 0..2 {
        let _ = decode(&encoded, &decode_options).expect("Failed to decode");
    }

    let decode_start = Instant::now();
    let mut decoded = None;
    for _ in 0..DECODE_ITERS {
        decoded = Some(decode(&encoded, &decode_options).expect("Failed to decode"));
    }
    let decode_time = decode_start.elapsed() / DECODE_ITERS;
    let decoded = decoded.expect("at least one iteration");

    println!(
        "\nDecode: {:?} (avg of {} iterations)",
        decode_time, DECODE_ITERS
    );
    println!(
        "  Throughput: {:.2} MB/s",
        throughput(encoded.len(), decode_time.as_secs_f64())
    );
    assert_eq!(decoded, call, "Decoded call should match the original");

    println!("\n=== Summary ===");
    println!("Records: {}", records);
    println!(
        "Document size: {} bytes ({:.1} MB)",
        encoded.len(),
        encoded.len() as f64 / 1_000_000.0
    );
    println!(
        "Bytes per record: {:.1}",
        encoded.len() as f64 / records.max(1) as f64
    );
}
