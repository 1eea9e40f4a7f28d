//! 외국인·기관 공통 순매수 종목 분석.

use chrono::NaiveDate;
use krx_core::{AggregationWindow, InvestorCategory, Market, RankingEntry, RankingKey, Rankings};
use serde::Serialize;
use std::collections::BTreeMap;

/// 외국인과 기관 상위 목록에 모두 포함된 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommonBuy {
    pub market: Market,
    pub ticker: String,
    pub issue_name: String,
}

/// 순위표에서 특정 시장의 상위 `top_n`개 항목을 고릅니다.
///
/// 시장으로 먼저 거른 뒤 자르므로 시장별로 `top_n`개씩 나옵니다.
pub fn top_for_market<'a>(
    rankings: &'a Rankings,
    category: InvestorCategory,
    window: AggregationWindow,
    market: Market,
    top_n: usize,
) -> Vec<&'a RankingEntry> {
    rankings
        .get(&RankingKey::new(category, window))
        .map(|entries| {
            entries
                .iter()
                .filter(|e| e.market == market)
                .take(top_n)
                .collect()
        })
        .unwrap_or_default()
}

/// 기준일 일별 순위에서 외국인·기관 상위 `top_n`에 모두 든 종목을 찾습니다.
///
/// 결과는 종목코드 오름차순입니다.
pub fn common_buys(
    rankings: &Rankings,
    run_date: NaiveDate,
    market: Market,
    top_n: usize,
) -> Vec<CommonBuy> {
    let window = AggregationWindow::daily(run_date);

    let foreigner: BTreeMap<&str, &RankingEntry> = top_for_market(
        rankings,
        InvestorCategory::Foreigner,
        window,
        market,
        top_n,
    )
    .into_iter()
    .map(|e| (e.ticker.as_str(), e))
    .collect();

    let institution = top_for_market(
        rankings,
        InvestorCategory::Institution,
        window,
        market,
        top_n,
    );

    let mut common: Vec<CommonBuy> = institution
        .into_iter()
        .filter_map(|inst| {
            foreigner.get(inst.ticker.as_str()).map(|f| CommonBuy {
                market,
                ticker: f.ticker.clone(),
                issue_name: f.issue_name.clone(),
            })
        })
        .collect();

    common.sort_by(|a, b| a.ticker.cmp(&b.ticker));
    common
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RankingAggregator;
    use krx_core::KrxData;
    use rust_decimal::Decimal;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    fn record(market: Market, category: InvestorCategory, ticker: &str, amount: i64) -> KrxData {
        KrxData::new(date(), market, category, ticker, ticker, Decimal::from(amount))
    }

    fn rankings() -> Rankings {
        let records = vec![
            record(Market::Kospi, InvestorCategory::Foreigner, "005930", 300),
            record(Market::Kospi, InvestorCategory::Foreigner, "000660", 200),
            record(Market::Kospi, InvestorCategory::Foreigner, "051910", 100),
            record(Market::Kospi, InvestorCategory::Institution, "051910", 900),
            record(Market::Kospi, InvestorCategory::Institution, "005930", 800),
            record(Market::Kospi, InvestorCategory::Institution, "000270", 700),
            record(Market::Kosdaq, InvestorCategory::Foreigner, "035720", 50),
            record(Market::Kosdaq, InvestorCategory::Institution, "035720", 40),
        ];
        RankingAggregator::new()
            .aggregate(&records, &[AggregationWindow::daily(date())])
            .unwrap()
    }

    #[test]
    fn test_common_buys_within_top_n() {
        let rankings = rankings();

        let all = common_buys(&rankings, date(), Market::Kospi, 3);
        let tickers: Vec<_> = all.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["005930", "051910"]);

        // 외국인 상위 2개(005930, 000660)와 기관 상위 2개(051910, 005930)
        let top2 = common_buys(&rankings, date(), Market::Kospi, 2);
        assert_eq!(top2.len(), 1);
        assert_eq!(top2[0].ticker, "005930");
    }

    #[test]
    fn test_common_buys_per_market() {
        let rankings = rankings();
        let kosdaq = common_buys(&rankings, date(), Market::Kosdaq, 20);
        assert_eq!(kosdaq.len(), 1);
        assert_eq!(kosdaq[0].market, Market::Kosdaq);
    }

    #[test]
    fn test_missing_window_is_empty() {
        let rankings = rankings();
        let other_day = NaiveDate::from_ymd_opt(2025, 12, 2).unwrap();
        assert!(common_buys(&rankings, other_day, Market::Kospi, 20).is_empty());
    }
}
