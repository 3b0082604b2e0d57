//! 에러 타입 — 도메인별 에러 정의

/// alertrelay 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 포맷 플러그인 에러
    #[error("plugin error: {0}")]
    Plugin(#[from] PluginError),

    /// 레거시 모니터링 데몬 전송 에러
    #[error("forward error: {0}")]
    Forward(#[from] ForwardError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 포맷 플러그인 에러
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    /// 동일한 이름의 플러그인이 이미 등록됨
    #[error("plugin already registered: {name}")]
    AlreadyRegistered { name: String },

    /// 등록되지 않은 플러그인 이름
    #[error("unsupported plugin name: {name}")]
    NotFound { name: String },

    /// 페이로드 파싱 실패
    #[error("{plugin}: failed to parse payload: {reason}")]
    Parse { plugin: String, reason: String },
}

/// 레거시 포워더 에러
#[derive(Debug, thiserror::Error)]
pub enum ForwardError {
    /// 연결 실패
    #[error("connection to {addr} failed: {reason}")]
    Connection { addr: String, reason: String },

    /// 프로토콜 처리 실패 (핸드셰이크, 전송 등)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// 타임아웃
    #[error("timed out after {secs}s while {stage}")]
    Timeout { stage: String, secs: u64 },
}
