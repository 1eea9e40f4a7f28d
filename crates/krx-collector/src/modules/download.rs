//! 원격 저장소의 산출물을 로컬로 내려받기.

use chrono::NaiveDate;
use krx_core::{ArtifactKey, Market, StoragePort};
use std::time::Instant;

use crate::CollectionStats;

/// 한 날짜의 산출물을 `source`에서 읽어 `target`에 기록합니다.
///
/// 원본에 없는 키는 `empty`, 읽기/쓰기 실패는 `errors`로 집계하고 다음 키로 넘어갑니다.
pub async fn download_artifacts(
    source: &dyn StoragePort,
    target: &dyn StoragePort,
    date: NaiveDate,
    markets: &[Market],
) -> CollectionStats {
    let start = Instant::now();
    let mut stats = CollectionStats::new();

    tracing::info!(
        %date,
        source = source.name(),
        target = target.name(),
        "산출물 다운로드 시작"
    );

    for key in ArtifactKey::all_for(date, markets) {
        let path = key.path();
        stats.total += 1;

        let content = match source.read(&path).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                tracing::debug!(key = %path, "원본에 없음");
                stats.empty += 1;
                continue;
            }
            Err(e) => {
                tracing::warn!(key = %path, error = %e, "원본 읽기 실패");
                stats.errors += 1;
                continue;
            }
        };

        match target.write(&path, &content).await {
            Ok(()) => {
                tracing::info!(key = %path, size = content.len(), "다운로드 완료");
                stats.success += 1;
            }
            Err(e) => {
                tracing::warn!(key = %path, error = %e, "로컬 저장 실패");
                stats.errors += 1;
            }
        }
    }

    stats.elapsed = start.elapsed();
    stats
}
