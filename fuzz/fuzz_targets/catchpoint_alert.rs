#![no_main]

use alertrelay_core::plugin::FormatPlugin;
use alertrelay_gateway::CatchpointAlertPlugin;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let plugin = CatchpointAlertPlugin::new();
    if let Ok(alert) = plugin.parse(data) {
        // 성공한 파싱은 항상 서비스 이름과 메시지를 하나 이상 가짐
        assert!(!alert.service.trim().is_empty());
        assert!(!alert.messages.is_empty());
    }
});
