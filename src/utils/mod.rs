pub mod dirs;
pub mod rate_limit;
