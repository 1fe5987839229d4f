pub const SECONDS_PER_HOUR: u32 = 3_600;
pub const MINUTES_PER_HOUR: u32 = 60;
pub const HOURS_PER_DAY: u32 = 24;
pub const DAYS_PER_YEAR: u32 = 365;
pub const HOURS_PER_YEAR: u32 = HOURS_PER_DAY * DAYS_PER_YEAR;
