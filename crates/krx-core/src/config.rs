//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수(`KRX__SECTION__KEY`) 순으로 덮어씁니다.
//! CLI 인자는 바이너리에서 마지막으로 적용합니다.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::domain::{CumulativeAnchor, InvestorCategory, Market};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 로깅 설정
    pub logging: LoggingConfig,
    /// KRX 수집 설정
    pub krx: KrxConfig,
    /// 저장소 설정
    pub storage: StorageConfig,
    /// 일일 루틴 설정
    pub routine: RoutineConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 시작/종료 이벤트 출력
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

/// KRX 정보데이터시스템 접속 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct KrxConfig {
    /// OTP 발급 URL
    pub otp_url: String,
    /// CSV 다운로드 URL
    pub download_url: String,
    /// 요청 전 대기 시간 (밀리초)
    pub request_delay_ms: u64,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
    /// 수집할 투자자 구분
    pub categories: Vec<InvestorCategory>,
}

impl Default for KrxConfig {
    fn default() -> Self {
        Self {
            otp_url: "http://data.krx.co.kr/comm/fileDn/GenerateOTP/generate.cmd".to_string(),
            download_url: "http://data.krx.co.kr/comm/fileDn/download_csv/download.cmd"
                .to_string(),
            request_delay_ms: 1000,
            timeout_secs: 30,
            categories: InvestorCategory::ALL.to_vec(),
        }
    }
}

/// 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// 로컬 저장 기준 디렉토리
    pub local_base_path: String,
    /// 저장소 사용 순서
    pub order: StorageOrder,
    /// Google Drive 설정
    pub drive: DriveConfig,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            local_base_path: "./output".to_string(),
            order: StorageOrder::default(),
            drive: DriveConfig::default(),
        }
    }
}

/// 저장소 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Drive,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::Local => f.write_str("local"),
            BackendKind::Drive => f.write_str("drive"),
        }
    }
}

/// 저장소 사용 순서.
///
/// 쓰기는 모든 저장소에 순서대로, 읽기는 앞선 저장소부터 시도합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum StorageOrder {
    /// 로컬만 사용
    #[default]
    LocalOnly,
    /// 로컬 → Google Drive
    LocalThenDrive,
    /// Google Drive → 로컬
    DriveThenLocal,
}

impl StorageOrder {
    pub fn backends(&self) -> &'static [BackendKind] {
        match self {
            StorageOrder::LocalOnly => &[BackendKind::Local],
            StorageOrder::LocalThenDrive => &[BackendKind::Local, BackendKind::Drive],
            StorageOrder::DriveThenLocal => &[BackendKind::Drive, BackendKind::Local],
        }
    }

    pub fn uses_drive(&self) -> bool {
        self.backends().contains(&BackendKind::Drive)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageOrder::LocalOnly => "local",
            StorageOrder::LocalThenDrive => "local,drive",
            StorageOrder::DriveThenLocal => "drive,local",
        }
    }
}

impl fmt::Display for StorageOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: Vec<String> = s
            .split(',')
            .map(|part| part.trim().to_lowercase())
            .filter(|part| !part.is_empty())
            .collect();

        match normalized.iter().map(String::as_str).collect::<Vec<_>>().as_slice() {
            ["local"] => Ok(StorageOrder::LocalOnly),
            ["local", "drive"] => Ok(StorageOrder::LocalThenDrive),
            ["drive", "local"] => Ok(StorageOrder::DriveThenLocal),
            _ => Err(format!("Unknown storage order: {}", s)),
        }
    }
}

impl TryFrom<String> for StorageOrder {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<StorageOrder> for String {
    fn from(order: StorageOrder) -> Self {
        order.as_str().to_string()
    }
}

/// Google Drive 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DriveConfig {
    /// 산출물을 저장할 최상위 폴더 ID
    pub root_folder_id: String,
    /// OAuth 액세스 토큰 (외부에서 발급)
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
    /// Drive API 기본 URL
    pub api_base_url: String,
    /// 업로드 API 기본 URL
    pub upload_base_url: String,
    /// HTTP 요청 타임아웃 (초)
    pub timeout_secs: u64,
}

impl DriveConfig {
    /// 액세스 토큰을 비밀값으로 반환합니다.
    pub fn token(&self) -> Option<SecretString> {
        self.access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .map(|t| SecretString::new(t.into()))
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            root_folder_id: "root".to_string(),
            access_token: None,
            api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
            timeout_secs: 60,
        }
    }
}

impl fmt::Debug for DriveConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriveConfig")
            .field("root_folder_id", &self.root_folder_id)
            .field(
                "access_token",
                &self.access_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("api_base_url", &self.api_base_url)
            .field("upload_base_url", &self.upload_base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// 일일 루틴 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutineConfig {
    /// 수집 대상 시장
    pub markets: Vec<Market>,
    /// 동시 수집 최대 개수
    pub max_concurrent_fetches: usize,
    /// (날짜, 시장) 하나당 수집 타임아웃 (초)
    pub fetch_timeout_secs: u64,
    /// 요약/관심종목 상위 개수
    pub top_k: usize,
    /// 누적 구간 시작 기준
    pub cumulative_anchor: CumulativeAnchor,
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            markets: Market::ALL.to_vec(),
            max_concurrent_fetches: 2,
            fetch_timeout_secs: 120,
            top_k: 20,
            cumulative_anchor: CumulativeAnchor::default(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("KRX")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("routine.markets")
                    .with_list_parse_key("krx.categories")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
