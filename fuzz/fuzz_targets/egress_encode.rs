#![no_main]

use alertrelay_core::types::NormalizedResult;
use alertrelay_gateway::router::encode_results;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

#[derive(Arbitrary, Debug)]
struct FuzzResult {
    status: u8,
    name: String,
    output: String,
}

fuzz_target!(|input: Vec<FuzzResult>| {
    let results: Vec<NormalizedResult> = input
        .into_iter()
        .map(|r| NormalizedResult::new(r.status, r.name, r.output))
        .collect();
    let body = encode_results(&results);

    // 연결된 문자열 리터럴을 순서대로 되읽을 수 있어야 함
    let decoded: Vec<String> = serde_json::Deserializer::from_str(&body)
        .into_iter::<String>()
        .collect::<Result<_, _>>()
        .expect("egress body must be a stream of JSON strings");
    assert_eq!(decoded.len(), results.len());
    for (entry, result) in decoded.iter().zip(&results) {
        assert_eq!(entry, &result.to_check_json().unwrap());
    }
});
