//! 여러 저장소를 순서대로 사용하는 복합 저장소.
//!
//! - 쓰기: 모든 저장소에 순서대로 시도하고, 하나라도 성공하면 성공입니다.
//! - 읽기: 앞선 저장소부터 조회하여 처음 찾은 내용을 반환합니다.

use async_trait::async_trait;
use krx_core::{PersistenceError, StoragePort};
use std::sync::Arc;
use tracing::{debug, warn};

/// 저장소 하나의 쓰기 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendOutcome {
    pub backend: String,
    pub result: Result<(), PersistenceError>,
}

impl BackendOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// 키 하나에 대한 저장소별 쓰기 결과.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub key: String,
    pub outcomes: Vec<BackendOutcome>,
}

impl WriteReport {
    /// 하나 이상의 저장소에 기록되었는지 여부.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().any(BackendOutcome::is_success)
    }

    pub fn succeeded(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| o.is_success())
            .map(|o| o.backend.as_str())
            .collect()
    }

    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_success())
            .map(|o| o.backend.as_str())
            .collect()
    }
}

/// 순서가 있는 저장소 목록을 하나의 저장소로 묶습니다.
pub struct FallbackStorageAdapter {
    name: String,
    backends: Vec<Arc<dyn StoragePort>>,
}

impl FallbackStorageAdapter {
    pub fn new(backends: Vec<Arc<dyn StoragePort>>) -> Self {
        let names: Vec<&str> = backends.iter().map(|b| b.name()).collect();
        Self {
            name: format!("fallback({})", names.join(",")),
            backends,
        }
    }

    pub fn backends(&self) -> &[Arc<dyn StoragePort>] {
        &self.backends
    }

    /// 모든 저장소에 쓰고 저장소별 결과를 반환합니다.
    ///
    /// 한 저장소의 실패는 다음 저장소 시도를 막지 않습니다.
    pub async fn write_all(&self, key: &str, content: &[u8]) -> WriteReport {
        let mut outcomes = Vec::with_capacity(self.backends.len());

        for backend in &self.backends {
            let result = backend.write(key, content).await;
            match &result {
                Ok(()) => debug!(backend = backend.name(), key, "저장 성공"),
                Err(e) => warn!(backend = backend.name(), key, error = %e, "저장 실패"),
            }
            outcomes.push(BackendOutcome {
                backend: backend.name().to_string(),
                result,
            });
        }

        WriteReport {
            key: key.to_string(),
            outcomes,
        }
    }
}

#[async_trait]
impl StoragePort for FallbackStorageAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn write(&self, key: &str, content: &[u8]) -> Result<(), PersistenceError> {
        let report = self.write_all(key, content).await;
        if report.is_success() {
            Ok(())
        } else {
            Err(PersistenceError::AllBackendsFailed {
                key: key.to_string(),
                attempted: report.outcomes.len(),
            })
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let mut answered = false;

        for backend in &self.backends {
            match backend.read(key).await {
                Ok(Some(content)) => {
                    debug!(backend = backend.name(), key, "읽기 성공");
                    return Ok(Some(content));
                }
                Ok(None) => {
                    answered = true;
                    debug!(backend = backend.name(), key, "키 없음, 다음 저장소 조회");
                }
                Err(e) => {
                    warn!(backend = backend.name(), key, error = %e, "읽기 실패, 다음 저장소 조회");
                }
            }
        }

        if answered || self.backends.is_empty() {
            Ok(None)
        } else {
            Err(PersistenceError::AllBackendsFailed {
                key: key.to_string(),
                attempted: self.backends.len(),
            })
        }
    }
}
