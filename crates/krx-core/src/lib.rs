//! # KRX Core
//!
//! KRX 투자자별 순매수 수집기의 핵심 도메인 모델 및 포트를 제공합니다.
//!
//! 이 크레이트는 수집 파이프라인 전반에서 사용되는 기본 타입을 제공합니다:
//! - 순매수 레코드(`KrxData`)와 시장/투자자 구분
//! - 집계 구간, 순위 항목, 리포트 문서 모델
//! - 저장 산출물 키 규칙
//! - 데이터 수집/저장 포트 (`KrxDataPort`, `StoragePort`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
