pub mod export;
pub mod ranking;
