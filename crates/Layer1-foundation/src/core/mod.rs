//! Core Module - 핵심 인터페이스
//!
//! - `traits.rs`: 인터페이스 (DisplaySurface)

pub mod traits;

pub use traits::DisplaySurface;
