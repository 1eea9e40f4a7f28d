//! 순매수 순위 분석 모듈.
//!
//! 이 crate는 다음을 제공합니다:
//! - 투자자 구분·구간별 순매수 순위 집계 (`RankingAggregator`)
//! - 외국인·기관 공통 순매수 종목 분석
//! - 종목 × 거래일 피벗 (`DailyPivot`)
//! - 형식 독립적인 리포트 문서 생성 (`ReportBuilder`)
//! - 리포트/원본/관심종목 직렬화

pub mod aggregator;
pub mod common;
pub mod pivot;
pub mod render;
pub mod report_builder;

pub use aggregator::RankingAggregator;
pub use common::{common_buys, top_for_market, CommonBuy};
pub use pivot::DailyPivot;
pub use render::{
    parse_raw_json, render_raw_json, render_report_json, render_watchlist_csv, RenderError,
};
pub use report_builder::{ReportBuilder, DEFAULT_TOP_K};
