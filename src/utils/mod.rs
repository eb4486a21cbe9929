mod circular;
mod readers;
mod strand;
mod util;

pub use circular::{circular_distance, circular_offset, CircularInterval};
pub use readers::{open_table_reader, split_table_line};
pub use strand::Strand;
pub use util::{create_writer, default_num_threads, handle_error_and_exit, Result};
