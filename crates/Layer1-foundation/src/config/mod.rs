//! Config - 통합 설정 관리
//!
//! - `calc.rs` - CalcConfig 통합 설정 (진행 표시 정책, 채널 용량)

mod calc;

pub use calc::{
    CalcConfig, ProgressMode, CALC_CONFIG_FILE, DEFAULT_CHANNEL_CAPACITY, DEFAULT_PROGRESS_STEP,
    DEFAULT_PROGRESS_THRESHOLD,
};
