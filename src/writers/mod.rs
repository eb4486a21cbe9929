mod write_tsv;

pub use write_tsv::ReportWriter;
