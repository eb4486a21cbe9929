pub mod analyse;
mod batch;
pub mod find_irs;
