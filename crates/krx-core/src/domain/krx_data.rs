//! 투자자별 순매수 레코드.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{InvestorCategory, Market};
use crate::types::Amount;

/// 하루, 한 시장, 한 투자자 구분의 종목별 순매수 금액.
///
/// 수집 어댑터가 생성하고 이후에는 읽기 전용으로만 사용됩니다.
/// 같은 배치 안에서 `(date, market, category, ticker)`는 유일합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KrxData {
    /// 거래일
    pub date: NaiveDate,
    /// 시장
    pub market: Market,
    /// 투자자 구분
    pub category: InvestorCategory,
    /// 종목 단축코드 (6자리)
    pub ticker: String,
    /// 종목명
    pub issue_name: String,
    /// 순매수 거래대금 (원, 음수는 순매도)
    pub net_buy_amount: Amount,
}

impl KrxData {
    pub fn new(
        date: NaiveDate,
        market: Market,
        category: InvestorCategory,
        ticker: impl Into<String>,
        issue_name: impl Into<String>,
        net_buy_amount: Amount,
    ) -> Self {
        Self {
            date,
            market,
            category,
            ticker: ticker.into(),
            issue_name: issue_name.into(),
            net_buy_amount,
        }
    }

    /// 정렬 및 중복 판단에 사용하는 키.
    pub fn sort_key(&self) -> (NaiveDate, Market, InvestorCategory, &str) {
        (self.date, self.market, self.category, self.ticker.as_str())
    }
}

/// 레코드를 `(date, market, category, ticker)` 순으로 정렬합니다.
///
/// 수집 완료 순서와 관계없이 같은 입력이면 같은 순서가 됩니다.
pub fn sort_records(records: &mut [KrxData]) {
    records.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
}
