//! 로컬 파일 시스템 저장소.

use async_trait::async_trait;
use krx_core::{PersistenceError, StoragePort};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// 기준 디렉토리 아래에 키 경로 그대로 파일을 저장합니다.
pub struct LocalStorageAdapter {
    base_path: PathBuf,
}

impl LocalStorageAdapter {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// 키를 실제 경로로 변환합니다.
    ///
    /// 절대 경로, 빈 세그먼트, `.`/`..` 세그먼트는 거부합니다.
    fn resolve(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        if key.is_empty() || key.starts_with('/') || key.contains('\\') || key.contains(':') {
            return Err(PersistenceError::InvalidKey(key.to_string()));
        }

        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." {
                return Err(PersistenceError::InvalidKey(key.to_string()));
            }
            path.push(segment);
        }
        Ok(path)
    }
}

#[async_trait]
impl StoragePort for LocalStorageAdapter {
    fn name(&self) -> &str {
        "local"
    }

    async fn write(&self, key: &str, content: &[u8]) -> Result<(), PersistenceError> {
        let path = self.resolve(key)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PersistenceError::Io(format!("{}: {}", parent.display(), e)))?;
        }

        // 임시 파일에 쓴 뒤 교체. 실패하면 임시 파일을 남기지 않습니다.
        let tmp_path = path.with_extension("tmp");
        let replaced = match tokio::fs::write(&tmp_path, content).await {
            Ok(()) => tokio::fs::rename(&tmp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = replaced {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp_path).await {
                if cleanup.kind() != ErrorKind::NotFound {
                    warn!(path = %tmp_path.display(), error = %cleanup, "임시 파일 삭제 실패");
                }
            }
            return Err(PersistenceError::Io(format!("{}: {}", path.display(), e)));
        }

        debug!(key, bytes = content.len(), "로컬 저장 완료");
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, PersistenceError> {
        let path = self.resolve(key)?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Io(format!("{}: {}", path.display(), e))),
        }
    }
}
