//! 수집 작업 모듈.

pub mod daily_routine;
pub mod download;
pub mod healthcheck;

pub use daily_routine::{DailyRoutineService, RunRequest, MAX_FETCH_ATTEMPTS};
pub use download::download_artifacts;
pub use healthcheck::{check_backends, BackendHealth, HEALTHCHECK_KEY};
