//! 순매수 순위 집계기.
//!
//! 투자자 구분과 집계 구간별로 종목 순매수 금액을 합산하여 순위를 매깁니다.
//!
//! # 순위 규칙
//!
//! - 구간 내 순매수 합계 내림차순
//! - 합계가 같으면 종목코드 오름차순
//! - 순위는 1부터 빠짐없이 증가
//!
//! # 예시
//!
//! ```rust,ignore
//! use krx_analytics::RankingAggregator;
//! use krx_core::AggregationWindow;
//!
//! let windows = vec![AggregationWindow::daily(run_date)];
//! let rankings = RankingAggregator::new().aggregate(&records, &windows)?;
//!
//! for (key, entries) in &rankings {
//!     println!("{} {}: {}종목", key.category, key.window, entries.len());
//! }
//! ```

use chrono::NaiveDate;
use krx_core::{
    AggregationError, AggregationWindow, Amount, InvestorCategory, KrxData, Market, RankingEntry,
    RankingKey, Rankings,
};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// 종목별 누적 상태.
struct TickerTotal<'a> {
    amount: Amount,
    market: Market,
    issue_name: &'a str,
    name_date: NaiveDate,
}

impl<'a> TickerTotal<'a> {
    fn new(record: &'a KrxData) -> Self {
        Self {
            amount: Amount::ZERO,
            market: record.market,
            issue_name: &record.issue_name,
            name_date: record.date,
        }
    }

    /// 종목명은 가장 최근 레코드의 것을 사용하고, 같은 날이면 사전순으로 앞선 것.
    fn observe_name(&mut self, record: &'a KrxData) {
        let newer = record.date > self.name_date;
        let same_day_smaller =
            record.date == self.name_date && record.issue_name.as_str() < self.issue_name;
        if newer || same_day_smaller {
            self.issue_name = &record.issue_name;
            self.name_date = record.date;
            self.market = record.market;
        }
    }
}

/// 순매수 순위 집계기.
///
/// 순수 계산만 수행하며 입력 순서와 관계없이 같은 결과를 냅니다.
#[derive(Debug, Default, Clone, Copy)]
pub struct RankingAggregator;

impl RankingAggregator {
    pub fn new() -> Self {
        Self
    }

    /// 레코드를 구간별 순위표로 집계합니다.
    ///
    /// # 인자
    ///
    /// * `records` - 수집된 순매수 레코드 (여러 날짜/시장 혼합 가능)
    /// * `windows` - 집계할 구간 목록
    ///
    /// # 반환
    ///
    /// 입력에 등장한 모든 투자자 구분 × 요청한 모든 구간의 순위표.
    /// 구간에 해당하는 레코드가 없으면 빈 순위표입니다.
    ///
    /// # Errors
    ///
    /// - `AggregationError::MalformedRecord`: 종목코드가 빈 레코드
    /// - `AggregationError::Overflow`: 합계가 표현 범위를 넘는 경우
    pub fn aggregate(
        &self,
        records: &[KrxData],
        windows: &[AggregationWindow],
    ) -> Result<Rankings, AggregationError> {
        // 1. 구조 검증
        for record in records {
            if record.ticker.trim().is_empty() {
                return Err(AggregationError::MalformedRecord {
                    date: record.date,
                    market: record.market,
                    category: record.category,
                    reason: "종목코드가 비어 있습니다".to_string(),
                });
            }
        }

        let categories: BTreeSet<InvestorCategory> = records.iter().map(|r| r.category).collect();

        // 2. 구간 × 투자자 구분별 합산 및 정렬
        let mut rankings = Rankings::new();
        for window in windows {
            for &category in &categories {
                let entries = rank_window(records, category, *window)?;
                debug!(
                    window = %window,
                    category = %category,
                    count = entries.len(),
                    "순위 집계"
                );
                rankings.insert(RankingKey::new(category, *window), entries);
            }
        }

        Ok(rankings)
    }
}

/// 하나의 (투자자 구분, 구간) 순위표를 계산합니다.
fn rank_window(
    records: &[KrxData],
    category: InvestorCategory,
    window: AggregationWindow,
) -> Result<Vec<RankingEntry>, AggregationError> {
    let mut totals: HashMap<&str, TickerTotal<'_>> = HashMap::new();

    for record in records
        .iter()
        .filter(|r| r.category == category && window.contains(r.date))
    {
        let total = totals
            .entry(record.ticker.as_str())
            .or_insert_with(|| TickerTotal::new(record));

        total.amount = total
            .amount
            .checked_add(record.net_buy_amount)
            .ok_or_else(|| AggregationError::Overflow {
                ticker: record.ticker.clone(),
                window: window.label(),
            })?;
        total.observe_name(record);
    }

    let mut sorted: Vec<(&str, TickerTotal<'_>)> = totals.into_iter().collect();
    sorted.sort_by(|(ticker_a, a), (ticker_b, b)| {
        b.amount.cmp(&a.amount).then_with(|| ticker_a.cmp(ticker_b))
    });

    Ok(sorted
        .into_iter()
        .enumerate()
        .map(|(idx, (ticker, total))| RankingEntry {
            rank: (idx + 1) as u32,
            ticker: ticker.to_string(),
            issue_name: total.issue_name.to_string(),
            market: total.market,
            category,
            net_buy_amount: total.amount,
            window,
        })
        .collect())
}
