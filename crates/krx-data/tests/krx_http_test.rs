//! KrxHttpAdapter 통합 테스트.
//!
//! mockito 서버로 OTP 발급 → CSV 다운로드 흐름을 검증합니다.

use chrono::NaiveDate;
use krx_core::{FetchError, InvestorCategory, KrxConfig, KrxDataPort, Market};
use krx_data::KrxHttpAdapter;
use mockito::{Matcher, Server};
use rust_decimal_macros::dec;

// ============================================================================
// 테스트 헬퍼 함수
// ============================================================================

fn otp_code() -> String {
    "A".repeat(64)
}

fn euc_kr(text: &str) -> Vec<u8> {
    let (bytes, _, _) = encoding_rs::EUC_KR.encode(text);
    bytes.into_owned()
}

fn adapter(server: &Server, categories: Vec<InvestorCategory>) -> KrxHttpAdapter {
    let config = KrxConfig {
        otp_url: format!("{}/otp", server.url()),
        download_url: format!("{}/download", server.url()),
        request_delay_ms: 0,
        timeout_secs: 5,
        categories,
    };
    KrxHttpAdapter::new(&config).expect("adapter")
}

fn dec1() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 1).unwrap()
}

// ============================================================================
// 테스트
// ============================================================================

#[tokio::test]
async fn test_fetch_kospi_institution() {
    let mut server = Server::new_async().await;

    let otp_mock = server
        .mock("POST", "/otp")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("mktId".into(), "STK".into()),
            Matcher::UrlEncoded("invstTpCd".into(), "7050".into()),
            Matcher::UrlEncoded("strtDd".into(), "20251201".into()),
            Matcher::UrlEncoded("url".into(), "dbms/MDC/STAT/standard/MDCSTAT02401".into()),
        ]))
        .with_body(otp_code())
        .create_async()
        .await;

    let csv = "종목코드,종목명,순매수거래량,순매수거래대금\n\
               005930,삼성전자,10,\"1,000,000\"\n\
               000660,SK하이닉스,5,\"500,000\"\n";
    let download_mock = server
        .mock("POST", "/download")
        .match_body(Matcher::UrlEncoded("code".into(), otp_code()))
        .with_body(euc_kr(csv))
        .create_async()
        .await;

    let krx = adapter(&server, vec![InvestorCategory::Institution]);
    let records = krx.fetch(dec1(), Market::Kospi).await.unwrap();

    otp_mock.assert_async().await;
    download_mock.assert_async().await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].ticker, "005930");
    assert_eq!(records[0].issue_name, "삼성전자");
    assert_eq!(records[0].net_buy_amount, dec!(1000000));
    assert_eq!(records[1].net_buy_amount, dec!(500000));
    assert!(records
        .iter()
        .all(|r| r.market == Market::Kospi && r.date == dec1()));
}

#[tokio::test]
async fn test_fetch_kosdaq_sends_segment_and_all_categories() {
    let mut server = Server::new_async().await;

    let otp_mock = server
        .mock("POST", "/otp")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("mktId".into(), "KSQ".into()),
            Matcher::UrlEncoded("segTpCd".into(), "ALL".into()),
        ]))
        .with_body(otp_code())
        .expect(2)
        .create_async()
        .await;

    let _download = server
        .mock("POST", "/download")
        .with_body(euc_kr("종목코드,종목명,순매수거래대금\n035720,카카오,\"-800\"\n"))
        .expect(2)
        .create_async()
        .await;

    let krx = adapter(
        &server,
        vec![InvestorCategory::Foreigner, InvestorCategory::Institution],
    );
    let records = krx.fetch(dec1(), Market::Kosdaq).await.unwrap();

    otp_mock.assert_async().await;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].category, InvestorCategory::Foreigner);
    assert_eq!(records[1].category, InvestorCategory::Institution);
    assert_eq!(records[0].net_buy_amount, dec!(-800));
}

#[tokio::test]
async fn test_holiday_returns_empty() {
    let mut server = Server::new_async().await;

    let _otp = server
        .mock("POST", "/otp")
        .with_body(otp_code())
        .create_async()
        .await;
    let _download = server
        .mock("POST", "/download")
        .with_body(euc_kr("종목코드,종목명,순매수거래대금\n"))
        .create_async()
        .await;

    let krx = adapter(&server, vec![InvestorCategory::Foreigner]);
    let records = krx.fetch(dec1(), Market::Kospi).await.unwrap();
    assert!(records.is_empty());
}

#[tokio::test]
async fn test_short_otp_is_rejected() {
    let mut server = Server::new_async().await;

    let _otp = server
        .mock("POST", "/otp")
        .with_body("LOGOUT")
        .create_async()
        .await;
    let download = server
        .mock("POST", "/download")
        .expect(0)
        .create_async()
        .await;

    let krx = adapter(&server, vec![InvestorCategory::Foreigner]);
    let err = krx.fetch(dec1(), Market::Kospi).await.unwrap_err();

    assert!(matches!(err, FetchError::Otp(_)));
    assert!(!err.is_retryable());
    download.assert_async().await;
}

#[tokio::test]
async fn test_download_server_error() {
    let mut server = Server::new_async().await;

    let _otp = server
        .mock("POST", "/otp")
        .with_body(otp_code())
        .create_async()
        .await;
    let _download = server
        .mock("POST", "/download")
        .with_status(503)
        .create_async()
        .await;

    let krx = adapter(&server, vec![InvestorCategory::Foreigner]);
    let err = krx.fetch(dec1(), Market::Kospi).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
    assert!(err.is_retryable());
}
