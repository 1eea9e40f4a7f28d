//! 파일 형식과 무관한 리포트 문서 모델.

use chrono::NaiveDate;
use serde::Serialize;

use super::Market;
use crate::types::Amount;

/// 시트 셀 값.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Integer(i64),
    Text(String),
    Amount(Amount),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }
}

/// 이름이 있는 시트 하나.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, header: &[&str]) -> Self {
        Self {
            name: name.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 리포트 생성에 필요한 실행 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportMetadata {
    /// 기준일 (요약 시트의 일별 구간)
    pub run_date: NaiveDate,
    /// 리포트에 포함된 시장
    pub markets: Vec<Market>,
}

/// 순서가 있는 시트 모음.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportDocument {
    pub metadata: ReportMetadata,
    pub sheets: Vec<Sheet>,
}

impl ReportDocument {
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cells_serialize_untagged() {
        let row = vec![
            Cell::Integer(1),
            Cell::text("005930"),
            Cell::Amount(dec!(1000000)),
        ];
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, "[1,\"005930\",\"1000000\"]");
    }
}
