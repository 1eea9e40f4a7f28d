//! 외부 데이터 제공자.

pub mod krx_http;

pub use krx_http::{decode_krx_csv, parse_net_buy_csv, KrxHttpAdapter};
