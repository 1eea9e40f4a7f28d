//! 순매수 순위.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{AggregationWindow, InvestorCategory, Market};
use crate::types::Amount;

/// 하나의 (투자자 구분, 집계 구간) 순위표의 한 줄.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankingEntry {
    /// 1부터 시작하는 연속 순위
    pub rank: u32,
    pub ticker: String,
    pub issue_name: String,
    pub market: Market,
    pub category: InvestorCategory,
    /// 구간 내 순매수 합계
    pub net_buy_amount: Amount,
    pub window: AggregationWindow,
}

/// 순위표 식별 키.
///
/// 구간이 먼저 비교되므로 순회 순서가 리포트 시트 순서와 같습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RankingKey {
    pub window: AggregationWindow,
    pub category: InvestorCategory,
}

impl RankingKey {
    pub fn new(category: InvestorCategory, window: AggregationWindow) -> Self {
        Self { window, category }
    }
}

/// 집계 결과 전체.
pub type Rankings = BTreeMap<RankingKey, Vec<RankingEntry>>;
