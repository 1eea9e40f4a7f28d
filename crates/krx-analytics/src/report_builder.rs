//! 순위 결과를 파일 형식과 무관한 리포트 문서로 변환합니다.
//!
//! # 시트 구성
//!
//! 1. `summary`: 기준일 일별 순위의 투자자별 상위 K개
//! 2. `common`: 시장별 외국인·기관 공통 순매수 종목
//! 3. `{category}_{window}`: 구간·투자자 구분별 전체 순위 (일별 구간 → 누적 구간)
//! 4. `pivot_{category}_{window}`: 누적 순위 순서의 거래일별 금액과 합계 (`build_with_pivot`)

use krx_core::{
    AggregationWindow, Cell, InvestorCategory, RankingEntry, RankingKey, Rankings,
    ReportDocument, ReportMetadata, Sheet,
};

use crate::common::common_buys;
use crate::pivot::DailyPivot;

/// 순위/요약 시트 컬럼.
pub const RANKING_COLUMNS: [&str; 6] = [
    "rank",
    "ticker",
    "issue_name",
    "category",
    "net_buy_amount",
    "window",
];

/// 피벗 시트의 고정 컬럼. 사이에 거래일 열이 들어갑니다.
pub const PIVOT_LEADING_COLUMNS: [&str; 3] = ["rank", "ticker", "issue_name"];
pub const PIVOT_TOTAL_COLUMN: &str = "total";

/// 공통 순매수 시트 컬럼.
pub const COMMON_COLUMNS: [&str; 3] = ["market", "ticker", "issue_name"];

pub const SUMMARY_SHEET: &str = "summary";
pub const COMMON_SHEET: &str = "common";

/// 기본 요약 상위 개수.
pub const DEFAULT_TOP_K: usize = 20;

/// 리포트 문서 생성기.
#[derive(Debug, Clone, Copy)]
pub struct ReportBuilder {
    top_k: usize,
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_K)
    }
}

impl ReportBuilder {
    pub fn new(top_k: usize) -> Self {
        Self { top_k }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// 순위 결과로 리포트 문서를 만듭니다. I/O는 하지 않습니다.
    pub fn build(&self, rankings: &Rankings, metadata: ReportMetadata) -> ReportDocument {
        let mut sheets = Vec::with_capacity(rankings.len() + 2);

        sheets.push(self.summary_sheet(rankings, &metadata));
        sheets.push(self.common_sheet(rankings, &metadata));

        // BTreeMap 순회 순서 = 구간 → 투자자 구분 표시 순서
        for (key, entries) in rankings {
            let mut sheet = Sheet::new(sheet_name(key), &RANKING_COLUMNS);
            for entry in entries {
                sheet.push_row(ranking_row(entry));
            }
            sheets.push(sheet);
        }

        ReportDocument { metadata, sheets }
    }

    /// `build`의 시트 뒤에 투자자 구분별 피벗 시트를 붙입니다.
    ///
    /// 피벗 구간의 순위표가 있는 투자자 구분만 시트를 만듭니다.
    pub fn build_with_pivot(
        &self,
        rankings: &Rankings,
        pivot: &DailyPivot,
        metadata: ReportMetadata,
    ) -> ReportDocument {
        let mut document = self.build(rankings, metadata);

        for category in InvestorCategory::ALL {
            let key = RankingKey::new(category, pivot.window());
            if let Some(entries) = rankings.get(&key) {
                document.sheets.push(pivot_sheet(&key, entries, pivot));
            }
        }

        document
    }

    fn summary_sheet(&self, rankings: &Rankings, metadata: &ReportMetadata) -> Sheet {
        let window = AggregationWindow::daily(metadata.run_date);
        let mut sheet = Sheet::new(SUMMARY_SHEET, &RANKING_COLUMNS);

        for category in InvestorCategory::ALL {
            let Some(entries) = rankings.get(&RankingKey::new(category, window)) else {
                continue;
            };
            for entry in entries.iter().take(self.top_k) {
                sheet.push_row(ranking_row(entry));
            }
        }
        sheet
    }

    fn common_sheet(&self, rankings: &Rankings, metadata: &ReportMetadata) -> Sheet {
        let mut sheet = Sheet::new(COMMON_SHEET, &COMMON_COLUMNS);

        for &market in &metadata.markets {
            for common in common_buys(rankings, metadata.run_date, market, self.top_k) {
                sheet.push_row(vec![
                    Cell::text(common.market.as_str()),
                    Cell::Text(common.ticker),
                    Cell::Text(common.issue_name),
                ]);
            }
        }
        sheet
    }
}

/// 순위 시트 이름 (`{category}_{window label}`).
pub fn sheet_name(key: &RankingKey) -> String {
    format!("{}_{}", key.category, key.window.label())
}

/// 피벗 시트 이름 (`pivot_{category}_{window label}`).
pub fn pivot_sheet_name(key: &RankingKey) -> String {
    format!("pivot_{}", sheet_name(key))
}

fn pivot_sheet(key: &RankingKey, entries: &[RankingEntry], pivot: &DailyPivot) -> Sheet {
    let mut header: Vec<String> = PIVOT_LEADING_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(pivot.days().iter().map(|d| d.format("%Y-%m-%d").to_string()));
    header.push(PIVOT_TOTAL_COLUMN.to_string());

    let rows = entries
        .iter()
        .map(|entry| {
            let mut row = vec![
                Cell::Integer(i64::from(entry.rank)),
                Cell::text(&entry.ticker),
                Cell::text(&entry.issue_name),
            ];
            row.extend(
                pivot
                    .row(entry.category, &entry.ticker)
                    .into_iter()
                    .map(Cell::Amount),
            );
            row.push(Cell::Amount(entry.net_buy_amount));
            row
        })
        .collect();

    Sheet {
        name: pivot_sheet_name(key),
        header,
        rows,
    }
}

fn ranking_row(entry: &RankingEntry) -> Vec<Cell> {
    vec![
        Cell::Integer(i64::from(entry.rank)),
        Cell::text(&entry.ticker),
        Cell::text(&entry.issue_name),
        Cell::text(entry.category.as_str()),
        Cell::Amount(entry.net_buy_amount),
        Cell::Text(entry.window.label()),
    ]
}
