//! 데이터 수집 및 저장 어댑터.
//!
//! 이 crate는 다음을 제공합니다:
//! - KRX 정보데이터시스템 순매수 데이터 소스 (`KrxDataPort` 구현)
//! - 로컬 파일 시스템 / Google Drive 저장소 (`StoragePort` 구현)
//! - 여러 저장소를 순서대로 사용하는 복합 저장소

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// KRX 데이터 소스 재내보내기
pub use provider::KrxHttpAdapter;

// 저장소 재내보내기
pub use storage::{
    build_storage, BackendOutcome, FallbackStorageAdapter, GoogleDriveAdapter,
    LocalStorageAdapter, WriteReport,
};
