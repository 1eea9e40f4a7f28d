//! Collector 설정 로드.
//!
//! `.env` → 설정 파일 → 환경 변수 순으로 읽은 뒤 CLI 인자를 마지막으로 적용합니다.

use krx_core::{AppConfig, LogConfig, Market, StorageOrder};
use std::path::Path;

use crate::error::{CollectorError, Result};

/// CLI에서 지정한 설정 덮어쓰기.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub storage_order: Option<StorageOrder>,
    pub markets: Vec<Market>,
}

impl CliOverrides {
    /// `--drive`, `--drive-first` 플래그를 저장소 순서로 변환합니다.
    pub fn storage_order_from_flags(drive: bool, drive_first: bool) -> Option<StorageOrder> {
        if drive_first {
            Some(StorageOrder::DriveThenLocal)
        } else if drive {
            Some(StorageOrder::LocalThenDrive)
        } else {
            None
        }
    }

    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(order) = self.storage_order {
            config.storage.order = order;
        }
        if !self.markets.is_empty() {
            config.routine.markets = self.markets.clone();
        }
    }
}

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    pub app: AppConfig,
}

impl CollectorConfig {
    /// `.env`, 설정 파일, 환경 변수를 읽고 CLI 덮어쓰기를 적용합니다.
    pub fn load(path: &Path, overrides: &CliOverrides) -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut app = AppConfig::load(path).map_err(|e| CollectorError::Config(e.to_string()))?;
        overrides.apply(&mut app);

        let config = Self { app };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let routine = &self.app.routine;
        if routine.markets.is_empty() {
            return Err(CollectorError::Config(
                "수집할 시장이 설정되지 않았습니다".to_string(),
            ));
        }
        if routine.max_concurrent_fetches == 0 {
            return Err(CollectorError::Config(
                "max_concurrent_fetches는 1 이상이어야 합니다".to_string(),
            ));
        }
        if self.app.krx.categories.is_empty() {
            return Err(CollectorError::Config(
                "수집할 투자자 구분이 설정되지 않았습니다".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig::from_config(&self.app.logging)
    }

    pub fn storage_order(&self) -> StorageOrder {
        self.app.storage.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_order_flags() {
        assert_eq!(CliOverrides::storage_order_from_flags(false, false), None);
        assert_eq!(
            CliOverrides::storage_order_from_flags(true, false),
            Some(StorageOrder::LocalThenDrive)
        );
        assert_eq!(
            CliOverrides::storage_order_from_flags(true, true),
            Some(StorageOrder::DriveThenLocal)
        );
        assert_eq!(
            CliOverrides::storage_order_from_flags(false, true),
            Some(StorageOrder::DriveThenLocal)
        );
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut app = AppConfig::default();
        app.storage.order = StorageOrder::DriveThenLocal;

        CliOverrides {
            log_level: Some("debug".to_string()),
            log_format: None,
            storage_order: Some(StorageOrder::LocalOnly),
            markets: vec![Market::Kosdaq],
        }
        .apply(&mut app);

        assert_eq!(app.logging.level, "debug");
        assert_eq!(app.logging.format, "pretty");
        assert_eq!(app.storage.order, StorageOrder::LocalOnly);
        assert_eq!(app.routine.markets, vec![Market::Kosdaq]);
    }

    #[test]
    fn test_empty_overrides_keep_config() {
        let mut app = AppConfig::default();
        app.storage.order = StorageOrder::LocalThenDrive;
        CliOverrides::default().apply(&mut app);
        assert_eq!(app.storage.order, StorageOrder::LocalThenDrive);
        assert_eq!(app.routine.markets, Market::ALL.to_vec());
    }

    #[test]
    fn test_validate() {
        let mut config = CollectorConfig {
            app: AppConfig::default(),
        };
        assert!(config.validate().is_ok());

        config.app.routine.max_concurrent_fetches = 0;
        assert!(matches!(config.validate(), Err(CollectorError::Config(_))));
    }
}
