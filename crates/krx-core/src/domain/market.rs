//! 시장 및 투자자 구분.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 국내 주식 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// 유가증권시장
    Kospi,
    /// 코스닥시장
    Kosdaq,
}

impl Market {
    /// 지원하는 전체 시장.
    pub const ALL: [Market; 2] = [Market::Kospi, Market::Kosdaq];

    /// 저장 키 등에 사용하는 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Kospi => "KOSPI",
            Market::Kosdaq => "KOSDAQ",
        }
    }

    /// KRX 정보데이터시스템 시장 ID.
    pub fn krx_id(&self) -> &'static str {
        match self {
            Market::Kospi => "STK",
            Market::Kosdaq => "KSQ",
        }
    }

    /// 한글 시장명.
    pub fn name_ko(&self) -> &'static str {
        match self {
            Market::Kospi => "코스피",
            Market::Kosdaq => "코스닥",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Market {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "KOSPI" | "STK" => Ok(Market::Kospi),
            "KOSDAQ" | "KSQ" => Ok(Market::Kosdaq),
            _ => Err(format!("Unknown market: {}", s)),
        }
    }
}

/// 투자자 구분.
///
/// 선언 순서가 리포트 표시 순서입니다 (외국인 → 기관 → 개인).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestorCategory {
    /// 외국인
    Foreigner,
    /// 기관 합계
    Institution,
    /// 개인
    Individual,
}

impl InvestorCategory {
    /// 표시 순서대로 정렬된 전체 투자자 구분.
    pub const ALL: [InvestorCategory; 3] = [
        InvestorCategory::Foreigner,
        InvestorCategory::Institution,
        InvestorCategory::Individual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvestorCategory::Foreigner => "foreigner",
            InvestorCategory::Institution => "institution",
            InvestorCategory::Individual => "individual",
        }
    }

    /// KRX 투자자 구분 코드 (`invstTpCd`).
    pub fn krx_code(&self) -> &'static str {
        match self {
            InvestorCategory::Foreigner => "9000",
            InvestorCategory::Institution => "7050",
            InvestorCategory::Individual => "8000",
        }
    }

    /// 한글 투자자명.
    pub fn name_ko(&self) -> &'static str {
        match self {
            InvestorCategory::Foreigner => "외국인",
            InvestorCategory::Institution => "기관",
            InvestorCategory::Individual => "개인",
        }
    }
}

impl fmt::Display for InvestorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvestorCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "foreigner" | "foreign" | "9000" => Ok(InvestorCategory::Foreigner),
            "institution" | "institutions" | "7050" => Ok(InvestorCategory::Institution),
            "individual" | "retail" | "8000" => Ok(InvestorCategory::Individual),
            _ => Err(format!("Unknown investor category: {}", s)),
        }
    }
}
