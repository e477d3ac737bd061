//! Calc Config - 통합 설정
//!
//! 글로벌 + 프로젝트 설정을 병합하는 CalcConfig

use crate::storage::{load_file, JsonStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// 설정 파일명
pub const CALC_CONFIG_FILE: &str = "config.json";

/// 이 값 미만의 n 은 진행 표시 없이 계산
pub const DEFAULT_PROGRESS_THRESHOLD: u64 = 250;

/// 진행 이벤트 간격 (바깥 루프 기준)
pub const DEFAULT_PROGRESS_STEP: u64 = 10;

/// 워커 → UI 채널 용량
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

// ============================================================================
// Progress Mode
// ============================================================================

/// 진행 이벤트 페이로드 형태
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// 정수 퍼센트 (0..=100)
    #[default]
    Percent,
    /// 텍스트 메시지
    Message,
}

impl std::fmt::Display for ProgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProgressMode::Percent => write!(f, "percent"),
            ProgressMode::Message => write!(f, "message"),
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percent" => Ok(ProgressMode::Percent),
            "message" => Ok(ProgressMode::Message),
            other => Err(Error::Config(format!("Unknown progress mode: {}", other))),
        }
    }
}

// ============================================================================
// Calc Config (통합)
// ============================================================================

/// longcalc 통합 설정
///
/// 파일에 없는 필드는 `None` 으로 남고, `merge` 시 덮어쓰지 않는다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcConfig {
    /// 진행 이벤트 형태
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_mode: Option<ProgressMode>,

    /// 진행 표시 임계값
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_threshold: Option<u64>,

    /// 진행 이벤트 간격
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_step: Option<u64>,

    /// 진행 표시가 꺼진 경우에도 시작 알림 전송
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emit_startup_notification_when_disabled: Option<bool>,

    /// 이벤트 채널 용량
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_capacity: Option<usize>,
}

impl CalcConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 필드가 기본값으로 채워진 설정 (`config --init` 용)
    pub fn with_defaults() -> Self {
        Self {
            progress_mode: Some(ProgressMode::default()),
            progress_threshold: Some(DEFAULT_PROGRESS_THRESHOLD),
            progress_step: Some(DEFAULT_PROGRESS_STEP),
            emit_startup_notification_when_disabled: Some(false),
            channel_capacity: Some(DEFAULT_CHANNEL_CAPACITY),
        }
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드
    pub fn load() -> Result<Self> {
        let mut config = Self::new();

        // 1. 글로벌 설정
        if let Ok(global) = JsonStore::global() {
            if let Some(global_config) = global.load_optional::<CalcConfig>(CALC_CONFIG_FILE)? {
                debug!("Loaded global config from {}", global.base_dir().display());
                config.merge(global_config);
            }
        }

        // 2. 프로젝트 설정
        if let Ok(project) = JsonStore::current_project() {
            if let Some(project_config) = project.load_optional::<CalcConfig>(CALC_CONFIG_FILE)? {
                debug!("Loaded project config from {}", project.base_dir().display());
                config.merge(project_config);
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// 지정된 파일만 로드 (글로벌/프로젝트 검색 없음)
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: CalcConfig = load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// 글로벌 설정 저장
    pub fn save_global(&self) -> Result<()> {
        let store = JsonStore::global()?;
        store.save(CALC_CONFIG_FILE, self)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<()> {
        let store = JsonStore::current_project()?;
        store.save(CALC_CONFIG_FILE, self)
    }

    // ========================================================================
    // Merge / Validate
    // ========================================================================

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: CalcConfig) {
        if other.progress_mode.is_some() {
            self.progress_mode = other.progress_mode;
        }
        if other.progress_threshold.is_some() {
            self.progress_threshold = other.progress_threshold;
        }
        if other.progress_step.is_some() {
            self.progress_step = other.progress_step;
        }
        if other.emit_startup_notification_when_disabled.is_some() {
            self.emit_startup_notification_when_disabled =
                other.emit_startup_notification_when_disabled;
        }
        if other.channel_capacity.is_some() {
            self.channel_capacity = other.channel_capacity;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.progress_step == Some(0) {
            return Err(Error::Config("progressStep must be at least 1".to_string()));
        }
        if self.channel_capacity == Some(0) {
            return Err(Error::Config("channelCapacity must be at least 1".to_string()));
        }
        Ok(())
    }

    // ========================================================================
    // Effective values
    // ========================================================================

    pub fn progress_mode(&self) -> ProgressMode {
        self.progress_mode.unwrap_or_default()
    }

    pub fn progress_threshold(&self) -> u64 {
        self.progress_threshold.unwrap_or(DEFAULT_PROGRESS_THRESHOLD)
    }

    pub fn progress_step(&self) -> u64 {
        self.progress_step.unwrap_or(DEFAULT_PROGRESS_STEP).max(1)
    }

    pub fn emit_startup_notification_when_disabled(&self) -> bool {
        self.emit_startup_notification_when_disabled.unwrap_or(false)
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY).max(1)
    }

    // ========================================================================
    // Builder
    // ========================================================================

    pub fn mode(mut self, mode: ProgressMode) -> Self {
        self.progress_mode = Some(mode);
        self
    }

    pub fn threshold(mut self, threshold: u64) -> Self {
        self.progress_threshold = Some(threshold);
        self
    }

    pub fn step(mut self, step: u64) -> Self {
        self.progress_step = Some(step);
        self
    }

    pub fn startup_notification_when_disabled(mut self, enabled: bool) -> Self {
        self.emit_startup_notification_when_disabled = Some(enabled);
        self
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }
}
