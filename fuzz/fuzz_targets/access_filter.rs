#![no_main]

use alertrelay_gateway::AccessFilter;
use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

/// 퍼저용 구조적 입력
#[derive(Arbitrary, Debug)]
struct FuzzInput {
    allowed: Vec<String>,
    remote: String,
}

fuzz_target!(|input: FuzzInput| {
    let filter = AccessFilter::new(input.allowed.iter().take(16));
    let allowed = filter.allowed(&input.remote);
    if filter.is_open() {
        assert!(allowed);
    }
});
