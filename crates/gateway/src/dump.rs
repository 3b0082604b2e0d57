//! 요청 본문 덤프 -- 디버그용 원본 페이로드 보존
//!
//! 덤프 디렉토리가 설정되면 수락된 요청의 본문을 요청마다 새 파일에 그대로 저장합니다.
//! 파일 이름은 `{유닉스 나노초}_{pid}.txt` 형식입니다.
//! 쓰기 실패는 로그만 남기고 클라이언트에게 드러나지 않습니다.

use std::path::{Path, PathBuf};

use alertrelay_core::metrics as m;
use tracing::{debug, warn};

/// 요청 본문 덤프 작성기
#[derive(Debug, Clone)]
pub struct RequestDumper {
    dir: PathBuf,
}

impl RequestDumper {
    /// 설정 문자열에서 덤프 작성기를 만듭니다.
    ///
    /// 경로가 비어 있거나 공백뿐이면 `None`(덤프 비활성화)입니다.
    pub fn from_config(dir: &str) -> Option<Self> {
        let trimmed = dir.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self {
            dir: PathBuf::from(trimmed),
        })
    }

    /// 덤프 디렉토리
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 새 덤프 파일 경로를 만듭니다.
    fn next_path(&self) -> PathBuf {
        let nanos = chrono::Utc::now()
            .timestamp_nanos_opt()
            .unwrap_or_default();
        self.dir
            .join(format!("{}_{}.txt", nanos, std::process::id()))
    }

    /// 본문을 새 파일에 기록합니다.
    ///
    /// 실패는 경고 로그와 메트릭으로만 보고하며, 기록된 경로를 반환합니다.
    pub async fn dump(&self, body: &[u8]) -> Option<PathBuf> {
        let path = self.next_path();
        match tokio::fs::write(&path, body).await {
            Ok(()) => {
                debug!(path = %path.display(), bytes = body.len(), "request body dumped");
                Some(path)
            }
            Err(e) => {
                metrics::counter!(m::DUMP_ERRORS_TOTAL).increment(1);
                warn!(path = %path.display(), error = %e, "failed to dump request body");
                None
            }
        }
    }
}
