//! Core Traits - 핵심 인터페이스 정의
//!
//! Layer2 의 TaskController 가 호출하고 Layer4 (CLI) 가 구현하는 trait.
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Layer4-CLI                                                 │
//! │  └── DisplaySurface 구현 (터미널 출력, 프롬프트 루프)          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer2-Task                                                │
//! │  ├── CubeTask (백그라운드 계산 + 진행 이벤트)                  │
//! │  └── TaskController (이벤트 → DisplaySurface 전달)            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Layer1-Foundation (이 레이어)                              │
//! │  ├── Trait 정의 (DisplaySurface)                            │
//! │  └── Error, Config, 표시 문자열                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```

// ============================================================================
// DisplaySurface Trait - UI 협력자 인터페이스
// ============================================================================

/// UI 협력자 (표시 영역 + 트리거 컨트롤)
///
/// 모든 메서드는 인터랙티브 컨텍스트에서만 호출된다. 백그라운드 워커는
/// 이 trait 에 접근하지 않는다.
pub trait DisplaySurface: Send {
    /// 퍼센트 진행 표시 갱신 (0..=100)
    fn on_progress_percent(&mut self, percent: u8);

    /// 텍스트 진행 메시지
    fn on_progress_message(&mut self, text: &str);

    /// 최종 결과 (두 줄 형식)
    fn on_result(&mut self, text: &str);

    /// 트리거 컨트롤 활성/비활성
    fn set_trigger_enabled(&mut self, enabled: bool);

    /// 오류 메시지 (내부 오류, 입력 오류)
    fn on_error(&mut self, text: &str);
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Box<D> {
    fn on_progress_percent(&mut self, percent: u8) {
        (**self).on_progress_percent(percent)
    }

    fn on_progress_message(&mut self, text: &str) {
        (**self).on_progress_message(text)
    }

    fn on_result(&mut self, text: &str) {
        (**self).on_result(text)
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        (**self).set_trigger_enabled(enabled)
    }

    fn on_error(&mut self, text: &str) {
        (**self).on_error(text)
    }
}
