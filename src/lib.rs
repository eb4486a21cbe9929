pub mod chloroplast;
pub mod cli;
pub mod commands;
pub mod genome;
pub mod irs;
pub mod utils;
pub mod writers;
