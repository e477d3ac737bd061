//! Error types for longcalc
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// longcalc 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 입력 관련
    // ========================================================================
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // ========================================================================
    // Task 관련
    // ========================================================================
    #[error("Task already running: {0}")]
    TaskAlreadyRunning(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariant(String),

    #[error("Task failed: {0}")]
    Task(String),

    #[error("Cancelled")]
    Cancelled,

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 프로그래밍 오류(불변식 위반)인지 확인
    pub fn is_internal(&self) -> bool {
        matches!(self, Error::InternalInvariant(_) | Error::Internal(_))
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
