//! 정확한 금액 계산을 위한 Decimal 유틸리티.
//!
//! 순매수 금액은 실행마다, 구현마다 동일하게 재현되어야 하므로
//! 부동소수점 대신 `Decimal`로 누적합니다.

use rust_decimal::Decimal;
use std::str::FromStr;

/// 순매수 금액 타입 (원 단위, 음수는 순매도).
pub type Amount = Decimal;

/// KRX 숫자 문자열 파싱 (쉼표 제거).
///
/// 빈 문자열과 `-`는 0으로 취급합니다.
pub fn parse_krx_amount(s: &str) -> Result<Amount, String> {
    let trimmed = s.trim().trim_matches('"');
    if trimmed.is_empty() || trimmed == "-" {
        return Ok(Decimal::ZERO);
    }

    let cleaned = trimmed.replace(',', "");

    Decimal::from_str(&cleaned).map_err(|e| format!("숫자 파싱 실패: {} - {}", s, e))
}
