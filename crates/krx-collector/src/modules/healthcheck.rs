//! 저장소 상태 점검.

use krx_core::{PersistenceError, StoragePort};
use std::sync::Arc;

/// 점검에 사용하는 키. 존재하지 않아도 응답만 받으면 정상입니다.
pub const HEALTHCHECK_KEY: &str = "healthcheck/sentinel.txt";

/// 저장소 하나의 점검 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendHealth {
    pub backend: String,
    /// 응답했으면 센티널 키 존재 여부, 아니면 에러
    pub result: Result<bool, PersistenceError>,
}

impl BackendHealth {
    pub fn is_healthy(&self) -> bool {
        self.result.is_ok()
    }
}

/// 각 저장소에서 센티널 키를 읽어 응답 여부를 확인합니다.
pub async fn check_backends(backends: &[Arc<dyn StoragePort>]) -> Vec<BackendHealth> {
    let mut results = Vec::with_capacity(backends.len());

    for backend in backends {
        let result = backend.read(HEALTHCHECK_KEY).await.map(|c| c.is_some());
        match &result {
            Ok(found) => tracing::info!(backend = backend.name(), found, "저장소 정상"),
            Err(e) => tracing::error!(backend = backend.name(), error = %e, "저장소 응답 실패"),
        }
        results.push(BackendHealth {
            backend: backend.name().to_string(),
            result,
        });
    }

    results
}
