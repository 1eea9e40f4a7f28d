//! 산출물 저장소 구현.

pub mod fallback;
pub mod google_drive;
pub mod local;

pub use fallback::{BackendOutcome, FallbackStorageAdapter, WriteReport};
pub use google_drive::GoogleDriveAdapter;
pub use local::LocalStorageAdapter;

use krx_core::{BackendKind, StorageConfig, StorageOrder, StoragePort};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;

/// 설정된 순서대로 저장소를 생성하여 하나로 묶습니다.
pub fn build_storage(config: &StorageConfig, order: StorageOrder) -> Result<FallbackStorageAdapter> {
    let mut backends: Vec<Arc<dyn StoragePort>> = Vec::new();

    for kind in order.backends() {
        match kind {
            BackendKind::Local => {
                backends.push(Arc::new(LocalStorageAdapter::new(&config.local_base_path)));
            }
            BackendKind::Drive => {
                backends.push(Arc::new(GoogleDriveAdapter::new(&config.drive)?));
            }
        }
    }

    let storage = FallbackStorageAdapter::new(backends);
    info!(storage = storage.name(), "저장소 구성 완료");
    Ok(storage)
}
