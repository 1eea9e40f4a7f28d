//! 설정 파일/환경 변수 로드 통합 테스트.

use krx_core::{AppConfig, CumulativeAnchor, InvestorCategory, Market, StorageOrder};
use std::io::Write;

#[test]
fn test_load_from_toml_file() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[logging]
level = "debug"
format = "json"

[krx]
request_delay_ms = 250
categories = ["foreigner", "institution"]

[storage]
local_base_path = "/data/krx"
order = "local,drive"

[routine]
markets = ["KOSDAQ"]
cumulative_anchor = "range"
"#
    )
    .unwrap();

    let config = AppConfig::load(file.path()).unwrap();

    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.krx.request_delay_ms, 250);
    assert_eq!(
        config.krx.categories,
        vec![InvestorCategory::Foreigner, InvestorCategory::Institution]
    );
    assert_eq!(config.storage.local_base_path, "/data/krx");
    assert_eq!(config.storage.order, StorageOrder::LocalThenDrive);
    assert_eq!(config.routine.markets, vec![Market::Kosdaq]);
    assert_eq!(config.routine.cumulative_anchor, CumulativeAnchor::Range);
    // 파일에 없는 값은 기본값
    assert_eq!(config.krx.timeout_secs, 30);
}

#[test]
fn test_missing_file_uses_defaults_and_env() {
    std::env::set_var("KRX__ROUTINE__MAX_CONCURRENT_FETCHES", "4");

    let config = AppConfig::load("does/not/exist.toml").unwrap();

    assert_eq!(config.routine.max_concurrent_fetches, 4);
    assert_eq!(config.storage.order, StorageOrder::LocalOnly);
    assert_eq!(config.storage.local_base_path, "./output");

    std::env::remove_var("KRX__ROUTINE__MAX_CONCURRENT_FETCHES");
}

#[test]
fn test_invalid_storage_order_is_rejected() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "[storage]\norder = \"s3\"").unwrap();

    assert!(AppConfig::load(file.path()).is_err());
}
