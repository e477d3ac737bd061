//! # longcalc-foundation
//!
//! Foundation layer for longcalc:
//! - Core: 핵심 Trait 정의 (DisplaySurface)
//! - Config: 통합 설정 (CalcConfig, ProgressMode)
//! - Storage: JsonStore (설정 파일)
//! - Strings: 표시 문자열
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  CalcConfig (global + project + CLI)                    │
//! │                     │                                   │
//! │                     ▼                                   │
//! │   CubeTask ──(mpsc)──▶ TaskController                   │
//! │   (worker thread)          │                            │
//! │                            ▼                            │
//! │                     DisplaySurface                      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod storage;
pub mod strings;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (핵심 Trait)
// ============================================================================
pub use crate::core::DisplaySurface;

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    CalcConfig, ProgressMode, CALC_CONFIG_FILE, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PROGRESS_STEP,
    DEFAULT_PROGRESS_THRESHOLD,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::JsonStore;
