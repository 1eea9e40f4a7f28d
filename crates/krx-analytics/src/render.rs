//! 산출물 직렬화.
//!
//! - 리포트: JSON
//! - 원본 수집 데이터: JSON (다시 읽어 누적 집계에 사용)
//! - 관심종목: HTS 업로드용 CSV (헤더 `종목명`, EUC-KR)

use krx_core::{
    AggregationWindow, InvestorCategory, KrxData, Market, Rankings, ReportDocument,
};
use thiserror::Error;

use crate::common::top_for_market;

/// 직렬화 에러.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("JSON 직렬화 실패: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV 작성 실패: {0}")]
    Csv(String),

    #[error("EUC-KR로 표현할 수 없는 문자가 있습니다: {0}")]
    Encoding(String),
}

/// 관심종목 파일의 블록 순서.
pub const WATCHLIST_ORDER: [(Market, InvestorCategory); 4] = [
    (Market::Kospi, InvestorCategory::Foreigner),
    (Market::Kosdaq, InvestorCategory::Foreigner),
    (Market::Kospi, InvestorCategory::Institution),
    (Market::Kosdaq, InvestorCategory::Institution),
];

const WATCHLIST_HEADER: &str = "종목명";

/// 리포트 문서를 JSON으로 직렬화합니다.
///
/// 같은 문서는 항상 같은 바이트가 됩니다.
pub fn render_report_json(document: &ReportDocument) -> Result<Vec<u8>, RenderError> {
    let mut bytes = serde_json::to_vec_pretty(document)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// 원본 수집 레코드를 JSON으로 직렬화합니다.
pub fn render_raw_json(records: &[KrxData]) -> Result<Vec<u8>, RenderError> {
    Ok(serde_json::to_vec_pretty(records)?)
}

/// 저장된 원본 수집 레코드를 읽습니다.
pub fn parse_raw_json(bytes: &[u8]) -> Result<Vec<KrxData>, RenderError> {
    Ok(serde_json::from_slice(bytes)?)
}

/// 관심종목 CSV를 만듭니다.
///
/// KOSPI 외국인 → KOSDAQ 외국인 → KOSPI 기관 → KOSDAQ 기관 순으로
/// 각 상위 `top_n`개 종목명을 이어 붙입니다. 중복 종목도 그대로 둡니다.
/// `markets`에 없는 시장은 건너뜁니다.
pub fn render_watchlist_csv(
    rankings: &Rankings,
    window: AggregationWindow,
    markets: &[Market],
    top_n: usize,
) -> Result<Vec<u8>, RenderError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer
        .write_record([WATCHLIST_HEADER])
        .map_err(|e| RenderError::Csv(e.to_string()))?;

    for (market, category) in WATCHLIST_ORDER {
        if !markets.contains(&market) {
            continue;
        }
        for entry in top_for_market(rankings, category, window, market, top_n) {
            writer
                .write_record([entry.issue_name.as_str()])
                .map_err(|e| RenderError::Csv(e.to_string()))?;
        }
    }

    let data = writer
        .into_inner()
        .map_err(|e| RenderError::Csv(e.to_string()))?;
    let text = String::from_utf8(data).map_err(|e| RenderError::Csv(e.to_string()))?;

    let (encoded, _, had_errors) = encoding_rs::EUC_KR.encode(&text);
    if had_errors {
        return Err(RenderError::Encoding(text));
    }
    Ok(encoded.into_owned())
}
