//! KRX(한국거래소) 투자자별 순매수 데이터 소스.
//!
//! KRX 정보데이터시스템의 "투자자별 순매수 상위종목" 화면(MDCSTAT02401)을
//! OTP 발급 → CSV 다운로드 방식으로 조회합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use krx_data::KrxHttpAdapter;
//!
//! let krx = KrxHttpAdapter::new(&config.krx)?;
//! let records = krx.fetch(date, Market::Kospi).await?;
//! ```

use async_trait::async_trait;
use chrono::NaiveDate;
use krx_core::{parse_krx_amount, FetchError, InvestorCategory, KrxConfig, KrxData, KrxDataPort, Market};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{fetch_error, truncate, Result};

/// 순매수 상위종목 화면 bld.
const BLD_NET_BUY: &str = "dbms/MDC/STAT/standard/MDCSTAT02401";

/// KRX가 요구하는 Referer.
const KRX_REFERER: &str =
    "http://data.krx.co.kr/contents/MDC/MDI/mdiLoader/index.cmd?menuId=MDC0201020101";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 정상 OTP의 최소 길이.
const MIN_OTP_LEN: usize = 50;

const TICKER_HEADER: &str = "종목코드";
const NAME_HEADER: &str = "종목명";
const NET_BUY_KEYWORDS: [&str; 2] = ["순매수", "거래대금"];

/// KRX HTTP 데이터 소스.
pub struct KrxHttpAdapter {
    client: reqwest::Client,
    otp_url: String,
    download_url: String,
    request_delay: Duration,
    categories: Vec<InvestorCategory>,
}

impl KrxHttpAdapter {
    /// 설정으로 새 어댑터를 생성합니다.
    pub fn new(config: &KrxConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            otp_url: config.otp_url.clone(),
            download_url: config.download_url.clone(),
            request_delay: Duration::from_millis(config.request_delay_ms),
            categories: config.categories.clone(),
        })
    }

    /// OTP 발급 요청 파라미터.
    fn otp_params(
        date: NaiveDate,
        market: Market,
        category: InvestorCategory,
    ) -> Vec<(&'static str, String)> {
        let day = date.format("%Y%m%d").to_string();
        let mut params = vec![
            ("locale", "ko_KR".to_string()),
            ("mktId", market.krx_id().to_string()),
            ("invstTpCd", category.krx_code().to_string()),
            ("strtDd", day.clone()),
            ("endDd", day),
            ("share", "1".to_string()),
            ("money", "3".to_string()),
            ("csvxls_isNo", "false".to_string()),
            ("name", "fileDown".to_string()),
            ("url", BLD_NET_BUY.to_string()),
        ];
        if market == Market::Kosdaq {
            params.push(("segTpCd", "ALL".to_string()));
        }
        params
    }

    /// 투자자 구분 하나의 CSV를 내려받아 파싱합니다.
    async fn fetch_category(
        &self,
        date: NaiveDate,
        market: Market,
        category: InvestorCategory,
    ) -> std::result::Result<Vec<KrxData>, FetchError> {
        tokio::time::sleep(self.request_delay).await;

        debug!(%date, %market, %category, "KRX OTP 발급 요청");

        let response = self
            .client
            .post(&self.otp_url)
            .header("Referer", KRX_REFERER)
            .form(&Self::otp_params(date, market, category))
            .send()
            .await
            .map_err(|e| fetch_error("OTP 요청 실패", e))?;

        if !response.status().is_success() {
            return Err(FetchError::Otp(format!("OTP 발급 오류: {}", response.status())));
        }

        let otp = response
            .text()
            .await
            .map_err(|e| fetch_error("OTP 응답 읽기 실패", e))?;
        let otp = otp.trim();

        if otp.len() < MIN_OTP_LEN {
            return Err(FetchError::Otp(format!(
                "비정상 OTP ({}자): {}",
                otp.len(),
                truncate(otp, MIN_OTP_LEN)
            )));
        }

        tokio::time::sleep(self.request_delay).await;

        let response = self
            .client
            .post(&self.download_url)
            .header("Referer", KRX_REFERER)
            .form(&[("code", otp)])
            .send()
            .await
            .map_err(|e| fetch_error("CSV 다운로드 실패", e))?;

        if !response.status().is_success() {
            return Err(FetchError::Network(format!(
                "CSV 다운로드 오류: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| fetch_error("CSV 응답 읽기 실패", e))?;

        debug!(response_len = bytes.len(), "KRX CSV 수신");

        let text = decode_krx_csv(&bytes);
        parse_net_buy_csv(&text, date, market, category)
    }
}

#[async_trait]
impl KrxDataPort for KrxHttpAdapter {
    async fn fetch(&self, date: NaiveDate, market: Market) -> std::result::Result<Vec<KrxData>, FetchError> {
        let mut records = Vec::new();

        for &category in &self.categories {
            let mut batch = self.fetch_category(date, market, category).await?;
            debug!(%date, %market, %category, count = batch.len(), "투자자별 순매수 수집");
            records.append(&mut batch);
        }

        info!(%date, %market, count = records.len(), "KRX 순매수 조회 완료");

        Ok(records)
    }
}

/// KRX CSV 바이트를 문자열로 변환합니다.
///
/// KRX는 EUC-KR로 내려주지만 UTF-8(BOM 포함)도 허용합니다.
pub fn decode_krx_csv(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let (text, _, had_errors) = encoding_rs::EUC_KR.decode(bytes);
    if had_errors {
        warn!("EUC-KR 디코딩 중 잘못된 바이트가 대체되었습니다");
    }
    text.into_owned()
}

/// 순매수 상위종목 CSV를 레코드로 변환합니다.
///
/// 헤더만 있는 CSV(휴장일)는 빈 벡터입니다.
pub fn parse_net_buy_csv(
    text: &str,
    date: NaiveDate,
    market: Market,
    category: InvestorCategory,
) -> std::result::Result<Vec<KrxData>, FetchError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| FetchError::Parse(format!("CSV 헤더 읽기 실패: {}", e)))?
        .clone();

    let ticker_idx = column_index(&headers, TICKER_HEADER)?;
    let name_idx = column_index(&headers, NAME_HEADER)?;

    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| FetchError::Parse(format!("CSV 행 읽기 실패: {}", e)))?;

    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let amount_idx = net_buy_column(&headers, first).ok_or_else(|| {
        FetchError::Parse(format!("순매수 컬럼을 찾을 수 없습니다: {:?}", headers))
    })?;

    let mut records = Vec::with_capacity(rows.len());
    for row in &rows {
        let ticker = row.get(ticker_idx).unwrap_or("").trim_matches('"');
        if ticker.is_empty() {
            continue;
        }
        let issue_name = row.get(name_idx).unwrap_or("");
        let amount = parse_krx_amount(row.get(amount_idx).unwrap_or(""))
            .map_err(|e| FetchError::Parse(format!("{} ({})", e, ticker)))?;

        records.push(KrxData::new(date, market, category, ticker, issue_name, amount));
    }

    Ok(records)
}

fn column_index(headers: &csv::StringRecord, name: &str) -> std::result::Result<usize, FetchError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| FetchError::Parse(format!("'{}' 컬럼이 없습니다", name)))
}

/// 순매수 거래대금 컬럼 위치.
///
/// 헤더에 "순매수"와 "거래대금"이 모두 포함된 컬럼을 우선하고,
/// 없으면 첫 데이터 행에서 숫자로 읽히는 마지막 컬럼을 사용합니다.
fn net_buy_column(headers: &csv::StringRecord, first_row: &csv::StringRecord) -> Option<usize> {
    if let Some(idx) = headers
        .iter()
        .position(|h| NET_BUY_KEYWORDS.iter().all(|k| h.contains(k)))
    {
        return Some(idx);
    }

    let fallback = (0..headers.len()).rev().find(|&idx| {
        first_row
            .get(idx)
            .map(|v| !v.is_empty() && parse_krx_amount(v).is_ok())
            .unwrap_or(false)
    });

    if let Some(idx) = fallback {
        warn!(
            column = headers.get(idx).unwrap_or(""),
            "순매수 컬럼을 찾을 수 없어 마지막 숫자 컬럼을 사용합니다"
        );
    }
    fallback
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dec1() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
    }

    const SAMPLE: &str = "종목코드,종목명,매도거래량,매수거래량,순매수거래량,매도거래대금,매수거래대금,순매수거래대금\n\
        005930,삼성전자,\"1,000\",\"2,000\",\"1,000\",\"50,000,000\",\"51,000,000\",\"1,000,000\"\n\
        000660,SK하이닉스,10,20,10,\"100\",\"600\",\"500,000\"\n\
        035720,카카오,30,10,-20,\"900\",\"100\",\"-800\"\n";

    #[test]
    fn test_parse_net_buy_csv() {
        let records =
            parse_net_buy_csv(SAMPLE, dec1(), Market::Kospi, InvestorCategory::Institution).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].ticker, "005930");
        assert_eq!(records[0].issue_name, "삼성전자");
        assert_eq!(records[0].net_buy_amount, dec!(1000000));
        assert_eq!(records[2].net_buy_amount, dec!(-800));
        assert!(records.iter().all(|r| r.category == InvestorCategory::Institution));
    }

    #[test]
    fn test_parse_falls_back_to_last_numeric_column() {
        let csv = "종목코드,종목명,금액,비고\n005930,삼성전자,\"12,345\",\n";
        let records =
            parse_net_buy_csv(csv, dec1(), Market::Kospi, InvestorCategory::Foreigner).unwrap();
        assert_eq!(records[0].net_buy_amount, dec!(12345));
    }

    #[test]
    fn test_parse_header_only_is_empty() {
        let csv = "종목코드,종목명,순매수거래대금\n";
        let records =
            parse_net_buy_csv(csv, dec1(), Market::Kosdaq, InvestorCategory::Foreigner).unwrap();
        assert!(records.is_empty());
        assert!(parse_net_buy_csv("", dec1(), Market::Kosdaq, InvestorCategory::Foreigner)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_parse_missing_ticker_column() {
        let csv = "코드,종목명,순매수거래대금\n005930,삼성전자,1\n";
        let err = parse_net_buy_csv(csv, dec1(), Market::Kospi, InvestorCategory::Foreigner)
            .unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[test]
    fn test_decode_euc_kr_and_utf8() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("종목코드,종목명");
        assert_eq!(decode_krx_csv(&encoded), "종목코드,종목명");

        let mut with_bom = vec![0xEF, 0xBB, 0xBF];
        with_bom.extend_from_slice("종목명".as_bytes());
        assert_eq!(decode_krx_csv(&with_bom), "종목명");
    }

    #[test]
    fn test_otp_params() {
        let params = KrxHttpAdapter::otp_params(dec1(), Market::Kosdaq, InvestorCategory::Foreigner);
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("mktId"), Some("KSQ"));
        assert_eq!(get("invstTpCd"), Some("9000"));
        assert_eq!(get("strtDd"), Some("20251201"));
        assert_eq!(get("endDd"), Some("20251201"));
        assert_eq!(get("segTpCd"), Some("ALL"));

        let kospi = KrxHttpAdapter::otp_params(dec1(), Market::Kospi, InvestorCategory::Institution);
        assert!(!kospi.iter().any(|(k, _)| *k == "segTpCd"));
    }
}
