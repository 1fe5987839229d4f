pub mod heat_balance;
pub mod series;
pub mod units;
