//! tracing 기반 로깅 초기화.
//!
//! 수집기는 설정 파일의 `[logging]` 섹션(또는 `KRX__LOGGING__*` 환경 변수, CLI 옵션)으로
//! 레벨과 형식을 정합니다. 로그는 표준 에러로 출력합니다.
//!
//! - **pretty**: 터미널에서 직접 실행할 때
//! - **json**: 스케줄러에서 실행하고 로그를 수집할 때
//! - **compact**: 한 줄 요약

use crate::config::LoggingConfig;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 초기화 옵션.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 기본 필터 (예: "info", "krx_data=debug"). `RUST_LOG`이 있으면 그쪽이 우선합니다.
    pub level: String,
    pub format: LogFormat,
    /// `daily_routine` 등 span의 시작/종료 이벤트 출력 여부
    pub with_span_events: bool,
}

impl LogConfig {
    /// 설정 파일의 로깅 섹션에서 생성합니다.
    ///
    /// 알 수 없는 형식은 `Pretty`로 대체합니다.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            format: config.format.parse().unwrap_or_default(),
            with_span_events: config.span_events,
        }
    }

    fn span_events(&self) -> FmtSpan {
        if self.with_span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn fmt_layer(&self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(self.span_events());

        match self.format {
            LogFormat::Pretty => layer.pretty().boxed(),
            LogFormat::Json => layer.json().with_current_span(true).boxed(),
            LogFormat::Compact => layer.compact().boxed(),
        }
    }
}

/// 전역 로깅을 초기화합니다. 프로세스당 한 번만 호출할 수 있습니다.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(env_filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "로깅 초기화");
    Ok(())
}

/// 기준일 필드가 포함된 루틴 span을 생성합니다.
#[macro_export]
macro_rules! collect_span {
    ($name:expr, $date:expr) => {
        tracing::info_span!($name, run_date = %$date)
    };
}
