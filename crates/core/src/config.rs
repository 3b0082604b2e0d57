//! 설정 관리 — alertrelay.toml 파싱 및 런타임 설정
//!
//! [`RelayConfig`]는 모든 구성 요소의 설정을 담는 최상위 구조체입니다.
//! 시작 시 한 번 로드되며 프로세스 수명 동안 읽기 전용입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선, 데몬에서 적용)
//! 2. 환경변수 (`ALERTRELAY_SERVER_PORT=8081` 형식)
//! 3. 설정 파일 (`alertrelay.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), alertrelay_core::error::RelayError> {
//! use alertrelay_core::config::RelayConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = RelayConfig::load("alertrelay.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = RelayConfig::parse("[server]\nport = 8081")?;
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, RelayError};

/// alertrelay 통합 설정
///
/// `alertrelay.toml` 파일의 최상위 구조를 나타냅니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// 일반 설정 (로깅)
    #[serde(default)]
    pub general: GeneralConfig,
    /// HTTP 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 인제스트 경로 목록 (설정 순서대로 매칭)
    #[serde(default = "default_ingestion_routes")]
    pub ingestion: Vec<IngestionRoute>,
    /// 이그레스(풀) 경로 목록
    #[serde(default = "default_egress_routes")]
    pub egress: Vec<EgressRoute>,
    /// NSCA 포워더 설정
    #[serde(default)]
    pub nsca: NscaConfig,
    /// 메트릭 설정
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            ingestion: default_ingestion_routes(),
            egress: default_egress_routes(),
            nsca: NscaConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl RelayConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, RelayError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelayError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                RelayError::Io(e)
            }
        })?;
        Self::parse(&content)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, RelayError> {
        toml::from_str(toml_str).map_err(|e| {
            RelayError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `ALERTRELAY_{SECTION}_{FIELD}`
    /// 경로 목록(`ingestion`, `egress`)은 파일에서만 설정합니다.
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "ALERTRELAY_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "ALERTRELAY_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.log_file, "ALERTRELAY_GENERAL_LOG_FILE");

        // Server
        override_string(
            &mut self.server.listen_addr,
            "ALERTRELAY_SERVER_LISTEN_ADDR",
        );
        override_u16(&mut self.server.port, "ALERTRELAY_SERVER_PORT");
        override_usize(
            &mut self.server.worker_threads,
            "ALERTRELAY_SERVER_WORKER_THREADS",
        );
        override_u64(
            &mut self.server.request_timeout_secs,
            "ALERTRELAY_SERVER_REQUEST_TIMEOUT_SECS",
        );
        override_usize(
            &mut self.server.max_body_bytes,
            "ALERTRELAY_SERVER_MAX_BODY_BYTES",
        );
        override_csv(
            &mut self.server.allowed_ips,
            "ALERTRELAY_SERVER_ALLOWED_IPS",
        );
        override_string(
            &mut self.server.dump_requests_dir,
            "ALERTRELAY_SERVER_DUMP_REQUESTS_DIR",
        );

        // NSCA
        override_bool(&mut self.nsca.enabled, "ALERTRELAY_NSCA_ENABLED");
        override_string(&mut self.nsca.host, "ALERTRELAY_NSCA_HOST");
        override_u16(&mut self.nsca.port, "ALERTRELAY_NSCA_PORT");
        override_string(
            &mut self.nsca.client_hostname,
            "ALERTRELAY_NSCA_CLIENT_HOSTNAME",
        );
        override_string(&mut self.nsca.encryption, "ALERTRELAY_NSCA_ENCRYPTION");
        override_string(&mut self.nsca.password, "ALERTRELAY_NSCA_PASSWORD");
        override_u64(&mut self.nsca.timeout_secs, "ALERTRELAY_NSCA_TIMEOUT_SECS");

        // Metrics
        override_bool(&mut self.metrics.enabled, "ALERTRELAY_METRICS_ENABLED");
        override_string(
            &mut self.metrics.listen_addr,
            "ALERTRELAY_METRICS_LISTEN_ADDR",
        );
        override_u16(&mut self.metrics.port, "ALERTRELAY_METRICS_PORT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RelayError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.server.port == 0 {
            return Err(invalid("server.port", "must not be 0".to_owned()));
        }
        if self.server.request_timeout_secs == 0 {
            return Err(invalid(
                "server.request_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }
        if self.server.max_body_bytes == 0 {
            return Err(invalid(
                "server.max_body_bytes",
                "must be greater than 0".to_owned(),
            ));
        }

        let mut seen = HashSet::new();
        for (idx, route) in self.ingestion.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(invalid(
                    &format!("ingestion[{idx}].path"),
                    format!("'{}' must start with '/'", route.path),
                ));
            }
            if route.plugin.trim().is_empty() {
                return Err(invalid(
                    &format!("ingestion[{idx}].plugin"),
                    "plugin name must not be empty".to_owned(),
                ));
            }
            if !seen.insert(route.path.as_str()) {
                return Err(invalid(
                    &format!("ingestion[{idx}].path"),
                    format!("duplicate ingestion path '{}'", route.path),
                ));
            }
        }

        for (idx, route) in self.egress.iter().enumerate() {
            if !route.path.starts_with('/') {
                return Err(invalid(
                    &format!("egress[{idx}].path"),
                    format!("'{}' must start with '/'", route.path),
                ));
            }
        }

        if self.nsca.enabled {
            if self.nsca.host.is_empty() {
                return Err(invalid(
                    "nsca.host",
                    "host must not be empty when nsca is enabled".to_owned(),
                ));
            }
            if self.nsca.port == 0 {
                return Err(invalid("nsca.port", "must not be 0".to_owned()));
            }
            let valid_encryption = ["none", "xor"];
            if !valid_encryption.contains(&self.nsca.encryption.as_str()) {
                return Err(invalid(
                    "nsca.encryption",
                    format!("must be one of: {}", valid_encryption.join(", ")),
                ));
            }
            // NUL 종료 문자를 포함해 64바이트 필드에 들어가야 함
            if self.nsca.client_hostname.is_empty() || self.nsca.client_hostname.len() > 63 {
                return Err(invalid(
                    "nsca.client_hostname",
                    "must be 1-63 bytes".to_owned(),
                ));
            }
        }

        if self.metrics.enabled && self.metrics.endpoint != "/metrics" {
            return Err(invalid(
                "metrics.endpoint",
                "only '/metrics' is supported".to_owned(),
            ));
        }

        Ok(())
    }

    /// 인제스트 경로에 설정된 플러그인 이름 목록
    pub fn plugin_names(&self) -> impl Iterator<Item = &str> {
        self.ingestion.iter().map(|r| r.plugin.as_str())
    }
}

fn invalid(field: &str, reason: String) -> RelayError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 로그 파일 경로 (비어 있으면 stdout)
    pub log_file: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "json".to_owned(),
            log_file: String::new(),
        }
    }
}

/// HTTP 서버 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// tokio 워커 스레드 수 (0이면 CPU 수)
    pub worker_threads: usize,
    /// 요청당 읽기/쓰기 데드라인 (초)
    pub request_timeout_secs: u64,
    /// 요청 본문 최대 크기 (바이트)
    pub max_body_bytes: usize,
    /// 허용된 클라이언트 IP 목록 (비어 있으면 모두 허용)
    pub allowed_ips: Vec<String>,
    /// 요청 본문 덤프 디렉토리 (비어 있으면 비활성화)
    pub dump_requests_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1".to_owned(),
            port: 8080,
            worker_threads: 0,
            request_timeout_secs: 10,
            max_body_bytes: 1024 * 1024, // 1MB
            allowed_ips: Vec::new(),
            dump_requests_dir: String::new(),
        }
    }
}

impl ServerConfig {
    /// `listen_addr:port` 형식의 바인드 주소
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.port)
    }
}

/// 인제스트 경로: 알림 페이로드를 받아 지정된 플러그인으로 파싱합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionRoute {
    /// HTTP 경로 (정확히 일치)
    pub path: String,
    /// 포맷 플러그인 이름
    pub plugin: String,
}

/// 이그레스 경로: 버퍼링된 결과를 드레인하여 응답합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EgressRoute {
    /// HTTP 경로 (정확히 일치)
    pub path: String,
}

fn default_ingestion_routes() -> Vec<IngestionRoute> {
    vec![IngestionRoute {
        path: "/catchpoint/alerts".to_owned(),
        plugin: "catchpoint_alerts".to_owned(),
    }]
}

fn default_egress_routes() -> Vec<EgressRoute> {
    vec![EgressRoute {
        path: "/sensu/results".to_owned(),
    }]
}

/// NSCA 포워더 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NscaConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// NSCA 서버 호스트
    pub host: String,
    /// NSCA 서버 포트
    pub port: u16,
    /// 패킷에 기록되는 호스트 이름
    pub client_hostname: String,
    /// 암호화 방식 (none, xor)
    pub encryption: String,
    /// XOR 암호화 비밀번호
    pub password: String,
    /// 연결/송수신 타임아웃 (초)
    pub timeout_secs: u64,
}

impl Default for NscaConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_owned(),
            port: 5667,
            client_hostname: "catchpoint".to_owned(),
            encryption: "none".to_owned(),
            password: String::new(),
            timeout_secs: 10,
        }
    }
}

/// Prometheus 메트릭 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 바인드 주소
    pub listen_addr: String,
    /// 바인드 포트
    pub port: u16,
    /// 스크레이프 경로
    pub endpoint: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: "127.0.0.1".to_owned(),
            port: 9100,
            endpoint: "/metrics".to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_u16(target: &mut u16, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u16>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u16 from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

fn override_csv(target: &mut Vec<String>, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();
    }
}
