//! 저장 산출물과 논리 키 규칙.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::fmt;

use super::Market;

/// 저장소에 기록되는 산출물 종류.
///
/// 같은 날짜로 다시 실행하면 같은 키가 만들어지고 덮어씁니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtifactKey {
    /// 시장별 원본 수집 데이터 (`raw/{market}/{YYYYMMDD}.json`)
    Raw { market: Market, date: NaiveDate },
    /// 리포트 (`report/{YYYYMMDD}.json`)
    Report { date: NaiveDate },
    /// 일별 관심종목 (`watchlist/{YYYYMMDD}_daily.csv`)
    DailyWatchlist { date: NaiveDate },
    /// 누적 관심종목 (`watchlist/{YYYYMMDD}_cumulative.csv`)
    CumulativeWatchlist { date: NaiveDate },
}

impl ArtifactKey {
    /// 한 날짜에 생성될 수 있는 모든 키.
    pub fn all_for(date: NaiveDate, markets: &[Market]) -> Vec<ArtifactKey> {
        let mut keys: Vec<ArtifactKey> = markets
            .iter()
            .map(|&market| ArtifactKey::Raw { market, date })
            .collect();
        keys.push(ArtifactKey::Report { date });
        keys.push(ArtifactKey::DailyWatchlist { date });
        keys.push(ArtifactKey::CumulativeWatchlist { date });
        keys
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            ArtifactKey::Raw { date, .. }
            | ArtifactKey::Report { date }
            | ArtifactKey::DailyWatchlist { date }
            | ArtifactKey::CumulativeWatchlist { date } => *date,
        }
    }

    /// `/`로 구분된 저장 경로.
    pub fn path(&self) -> String {
        match self {
            ArtifactKey::Raw { market, date } => {
                format!("raw/{}/{}.json", market.as_str(), date.format("%Y%m%d"))
            }
            ArtifactKey::Report { date } => format!("report/{}.json", date.format("%Y%m%d")),
            ArtifactKey::DailyWatchlist { date } => {
                format!("watchlist/{}_daily.csv", date.format("%Y%m%d"))
            }
            ArtifactKey::CumulativeWatchlist { date } => {
                format!("watchlist/{}_cumulative.csv", date.format("%Y%m%d"))
            }
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// 논리 키와 바이트 내용.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageArtifact {
    pub key: ArtifactKey,
    pub content: Vec<u8>,
}

impl StorageArtifact {
    pub fn new(key: ArtifactKey, content: Vec<u8>) -> Self {
        Self { key, content }
    }

    /// 내용의 SHA-256 (소문자 hex).
    pub fn checksum(&self) -> String {
        hex::encode(Sha256::digest(&self.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    #[test]
    fn test_key_paths() {
        assert_eq!(
            ArtifactKey::Raw {
                market: Market::Kosdaq,
                date: dec1()
            }
            .path(),
            "raw/KOSDAQ/20251201.json"
        );
        assert_eq!(ArtifactKey::Report { date: dec1() }.path(), "report/20251201.json");
        assert_eq!(
            ArtifactKey::DailyWatchlist { date: dec1() }.path(),
            "watchlist/20251201_daily.csv"
        );
        assert_eq!(
            ArtifactKey::CumulativeWatchlist { date: dec1() }.path(),
            "watchlist/20251201_cumulative.csv"
        );
    }

    #[test]
    fn test_all_for() {
        let keys = ArtifactKey::all_for(dec1(), &Market::ALL);
        assert_eq!(keys.len(), 5);
        assert!(keys.iter().all(|k| k.date() == dec1()));
    }

    #[test]
    fn test_checksum() {
        let artifact = StorageArtifact::new(ArtifactKey::Report { date: dec1() }, b"abc".to_vec());
        assert_eq!(
            artifact.checksum(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
