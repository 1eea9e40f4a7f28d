//! 순매수 수집/집계를 위한 도메인 모델.

mod artifact;
mod data_port;
mod krx_data;
mod market;
mod ranking;
mod report;
mod storage_port;
mod window;

pub use artifact::*;
pub use data_port::*;
pub use krx_data::*;
pub use market::*;
pub use ranking::*;
pub use report::*;
pub use storage_port::*;
pub use window::*;
