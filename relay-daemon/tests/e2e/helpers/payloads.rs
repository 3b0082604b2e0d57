//! Catchpoint alert payloads used across scenarios.

/// Build a Catchpoint alert with one `<Failure>` per entry in `failures`.
#[allow(dead_code)]
pub fn catchpoint_alert(test: &str, level: &str, failures: &[(&str, &str)]) -> String {
    let items: String = failures
        .iter()
        .map(|(node, text)| format!(r#"<Failure Node="{node}">{text}</Failure>"#))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<Alert version="2">
  <TestDetail Name="{test}" Id="4242" Link="https://portal.example.com/tests/4242"/>
  <NotificationLevel>{level}</NotificationLevel>
  <Failures>{items}</Failures>
</Alert>"#
    )
}

/// Decode an egress body into the JSON objects it carries, in order.
#[allow(dead_code)]
pub fn decode_egress(body: &str) -> Vec<serde_json::Value> {
    serde_json::Deserializer::from_str(body)
        .into_iter::<String>()
        .map(|entry| {
            let text = entry.expect("egress entry is not a JSON string");
            serde_json::from_str(&text).expect("egress entry is not a JSON object")
        })
        .collect()
}
