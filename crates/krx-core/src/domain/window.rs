//! 집계 구간.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AggregationError;

/// 집계 구간 종류.
///
/// 리포트 시트 순서는 일별 구간이 먼저, 누적 구간이 나중입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Daily,
    Cumulative,
}

/// 날짜 범위와 종류로 정의되는 집계 구간.
///
/// 항상 `start <= end`이며 일별 구간은 `start == end`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AggregationWindow {
    kind: WindowKind,
    start: NaiveDate,
    end: NaiveDate,
}

impl AggregationWindow {
    /// 하루짜리 구간.
    pub fn daily(date: NaiveDate) -> Self {
        Self {
            kind: WindowKind::Daily,
            start: date,
            end: date,
        }
    }

    /// `[start, end]` 누적 구간.
    pub fn cumulative(start: NaiveDate, end: NaiveDate) -> Result<Self, AggregationError> {
        if start > end {
            return Err(AggregationError::InvalidWindow { start, end });
        }
        Ok(Self {
            kind: WindowKind::Cumulative,
            start,
            end,
        })
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 구간 안의 평일.
    pub fn business_days(&self) -> Vec<NaiveDate> {
        business_days(self.start, self.end)
    }

    /// 날짜가 구간에 포함되는지 확인합니다 (양 끝 포함).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// 시트 이름 등에 사용하는 레이블.
    ///
    /// 일별은 `YYYY-MM-DD`, 누적은 `YYYY-MM-DD~YYYY-MM-DD`.
    pub fn label(&self) -> String {
        match self.kind {
            WindowKind::Daily => self.start.format("%Y-%m-%d").to_string(),
            WindowKind::Cumulative => format!(
                "{}~{}",
                self.start.format("%Y-%m-%d"),
                self.end.format("%Y-%m-%d")
            ),
        }
    }
}

impl fmt::Display for AggregationWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// `start..=end` 사이의 평일. 공휴일은 구분하지 않습니다.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// 누적 구간의 시작일 기준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CumulativeAnchor {
    /// 실행일이 속한 달의 1일
    #[default]
    Month,
    /// 실행일이 속한 해의 1월 1일
    Year,
    /// 요청 범위의 시작일
    Range,
}

impl CumulativeAnchor {
    /// 누적 구간 시작일을 계산합니다.
    ///
    /// 요청 범위가 기준일보다 앞서면 요청 범위 시작일을 사용합니다.
    pub fn start_for(&self, run_date: NaiveDate, range_start: NaiveDate) -> NaiveDate {
        let anchor = match self {
            CumulativeAnchor::Month => run_date.with_day(1).unwrap_or(run_date),
            CumulativeAnchor::Year => {
                NaiveDate::from_ymd_opt(run_date.year(), 1, 1).unwrap_or(run_date)
            }
            CumulativeAnchor::Range => range_start,
        };
        anchor.min(range_start).min(run_date)
    }
}

impl FromStr for CumulativeAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "month" => Ok(CumulativeAnchor::Month),
            "year" => Ok(CumulativeAnchor::Year),
            "range" => Ok(CumulativeAnchor::Range),
            _ => Err(format!("Unknown cumulative anchor: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_cumulative_rejects_inverted_range() {
        let err = AggregationWindow::cumulative(date(2025, 12, 5), date(2025, 12, 1)).unwrap_err();
        assert!(matches!(err, AggregationError::InvalidWindow { .. }));
    }

    #[test]
    fn test_contains_is_inclusive() {
        let window = AggregationWindow::cumulative(date(2025, 12, 1), date(2025, 12, 5)).unwrap();
        assert!(window.contains(date(2025, 12, 1)));
        assert!(window.contains(date(2025, 12, 5)));
        assert!(!window.contains(date(2025, 12, 6)));

        let daily = AggregationWindow::daily(date(2025, 12, 3));
        assert!(daily.contains(date(2025, 12, 3)));
        assert!(!daily.contains(date(2025, 12, 4)));
    }

    #[test]
    fn test_labels() {
        assert_eq!(AggregationWindow::daily(date(2025, 12, 1)).label(), "2025-12-01");
        let cumulative =
            AggregationWindow::cumulative(date(2025, 12, 1), date(2025, 12, 3)).unwrap();
        assert_eq!(cumulative.label(), "2025-12-01~2025-12-03");
    }

    #[test]
    fn test_daily_sorts_before_cumulative() {
        let cumulative =
            AggregationWindow::cumulative(date(2025, 11, 1), date(2025, 11, 2)).unwrap();
        let late_daily = AggregationWindow::daily(date(2025, 12, 31));
        assert!(late_daily < cumulative);
        assert!(AggregationWindow::daily(date(2025, 12, 1)) < late_daily);
    }

    #[test]
    fn test_business_days_skip_weekends() {
        // 2025-12-05 금 ~ 12-08 월
        assert_eq!(
            business_days(date(2025, 12, 5), date(2025, 12, 8)),
            vec![date(2025, 12, 5), date(2025, 12, 8)]
        );
        assert!(business_days(date(2025, 12, 6), date(2025, 12, 7)).is_empty());

        let window = AggregationWindow::cumulative(date(2025, 12, 1), date(2025, 12, 3)).unwrap();
        assert_eq!(window.business_days().len(), 3);
    }

    #[test]
    fn test_anchor_start() {
        let run = date(2025, 12, 10);
        assert_eq!(CumulativeAnchor::Month.start_for(run, run), date(2025, 12, 1));
        assert_eq!(CumulativeAnchor::Year.start_for(run, run), date(2025, 1, 1));
        assert_eq!(
            CumulativeAnchor::Range.start_for(run, date(2025, 12, 8)),
            date(2025, 12, 8)
        );
        // 요청 범위가 월초보다 앞서면 범위 시작일
        assert_eq!(
            CumulativeAnchor::Month.start_for(run, date(2025, 11, 20)),
            date(2025, 11, 20)
        );
    }
}
