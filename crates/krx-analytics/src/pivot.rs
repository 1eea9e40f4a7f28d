//! 종목 × 거래일 순매수 피벗.
//!
//! 누적 구간의 거래일별 금액을 투자자 구분·종목별로 펼칩니다.
//! 시트로 만들 때 행 순서는 같은 구간의 누적 순위를 따르고, 마지막 열은 합계입니다.

use chrono::NaiveDate;
use krx_core::{AggregationError, AggregationWindow, Amount, InvestorCategory, KrxData};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// 구간 하나의 거래일별 순매수 금액표.
#[derive(Debug, Clone)]
pub struct DailyPivot {
    window: AggregationWindow,
    /// 열 순서: 구간의 평일 + 레코드가 있는 날짜
    days: Vec<NaiveDate>,
    amounts: BTreeMap<InvestorCategory, HashMap<String, BTreeMap<NaiveDate, Amount>>>,
}

impl DailyPivot {
    /// 구간에 속한 레코드를 날짜별로 합산합니다.
    ///
    /// 같은 (투자자 구분, 종목, 날짜) 레코드는 더하고, 합계가 표현 범위를 넘으면
    /// `AggregationError::Overflow`.
    pub fn from_records(
        records: &[KrxData],
        window: AggregationWindow,
    ) -> Result<Self, AggregationError> {
        let mut days: BTreeSet<NaiveDate> = window.business_days().into_iter().collect();
        let mut amounts: BTreeMap<InvestorCategory, HashMap<String, BTreeMap<NaiveDate, Amount>>> =
            BTreeMap::new();

        for record in records.iter().filter(|r| window.contains(r.date)) {
            days.insert(record.date);

            let cell = amounts
                .entry(record.category)
                .or_default()
                .entry(record.ticker.clone())
                .or_default()
                .entry(record.date)
                .or_insert(Amount::ZERO);
            *cell = cell
                .checked_add(record.net_buy_amount)
                .ok_or_else(|| AggregationError::Overflow {
                    ticker: record.ticker.clone(),
                    window: record.date.format("%Y-%m-%d").to_string(),
                })?;
        }

        Ok(Self {
            window,
            days: days.into_iter().collect(),
            amounts,
        })
    }

    pub fn window(&self) -> AggregationWindow {
        self.window
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// 종목의 거래일별 금액 (`days()` 순서, 없는 날은 0).
    pub fn row(&self, category: InvestorCategory, ticker: &str) -> Vec<Amount> {
        let by_day = self
            .amounts
            .get(&category)
            .and_then(|tickers| tickers.get(ticker));

        self.days
            .iter()
            .map(|day| {
                by_day
                    .and_then(|amounts| amounts.get(day))
                    .copied()
                    .unwrap_or(Amount::ZERO)
            })
            .collect()
    }
}
