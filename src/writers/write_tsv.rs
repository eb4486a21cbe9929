//! Defines the `ReportWriter` struct for writing per-sequence results as a TSV report.
//!

use crate::chloroplast::SequenceSummary;
use crate::utils::Result;
use itertools::Itertools;
use std::{
    env,
    fmt::Display,
    fs::File,
    io::{BufWriter, Write},
};

/// Column names of the report.
const COLUMNS: [&str; 13] = [
    "seq_id",
    "length",
    "taxid",
    "genes",
    "cds",
    "part_starts",
    "part_lengths",
    "part_genes",
    "offset",
    "trnH_GUG",
    "part_orientation",
    "irs_took_from",
    "took_part_starts",
];

/// Structure for writing report rows from sequence summaries.
pub struct ReportWriter<W: Write> {
    /// Buffered output the rows are written to.
    writer: BufWriter<W>,
}

impl ReportWriter<File> {
    /// Creates the report file and writes its header.
    ///
    /// # Arguments
    /// * `output_path` - Path of the output TSV file.
    ///
    /// # Returns
    /// Returns a `Result` with either a new `ReportWriter` instance or an error message.
    pub fn new(output_path: &str) -> Result<Self> {
        let file = File::create(output_path)
            .map_err(|e| format!("Invalid report output path {}: {}", output_path, e))?;
        Self::from_writer(file)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wraps any writer and writes the report header to it.
    pub fn from_writer(inner: W) -> Result<Self> {
        let mut report = ReportWriter {
            writer: BufWriter::new(inner),
        };
        report.write_header()?;
        Ok(report)
    }

    fn write_header(&mut self) -> Result<()> {
        let args: Vec<String> = env::args().collect();
        let header = format!(
            "##{pkg}Version={}\n##{pkg}Command={}\n{}\n",
            *crate::cli::FULL_VERSION,
            args.join(" "),
            COLUMNS.join("\t"),
            pkg = env!("CARGO_PKG_NAME"),
        );
        self.writer
            .write_all(header.as_bytes())
            .map_err(|e| format!("Error writing report header: {}", e))
    }

    /// Writes one row.
    ///
    /// # Arguments
    /// * `summary` - `SequenceSummary` of one analysed sequence.
    pub fn write(&mut self, summary: &SequenceSummary) -> Result<()> {
        let parts = summary.parts.as_ref();
        let fields = [
            summary.seq_id.clone(),
            summary.length.to_string(),
            optional(summary.taxid),
            summary.num_genes.to_string(),
            summary.num_cds.to_string(),
            optional(parts.map(|p| p.starts.iter().join(","))),
            optional(parts.map(|p| p.lengths.iter().join(","))),
            optional(parts.and_then(|p| p.num_genes).map(|n| n.iter().join(","))),
            optional(summary.offset),
            optional(summary.trnh_gug),
            optional(summary.part_orientation.as_ref()),
            optional(summary.irs_took_from.as_ref()),
            optional(summary.took_part_starts.map(|s| s.iter().join(","))),
        ];
        writeln!(self.writer, "{}", fields.join("\t"))
            .map_err(|e| format!("Error writing report row for {}: {}", summary.seq_id, e))
    }

    /// Flushes buffered rows.
    pub fn finish(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| format!("Error flushing report: {}", e))?;
        self.writer
            .into_inner()
            .map_err(|e| format!("Error flushing report: {}", e))
    }
}

/// Formats a missing value as an empty cell.
fn optional<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chloroplast::PartsDesc;

    #[test]
    fn report_rows() {
        let mut report = ReportWriter::from_writer(Vec::new()).unwrap();
        report
            .write(&SequenceSummary {
                seq_id: "NC_1".to_string(),
                length: 1000,
                taxid: Some(7),
                num_genes: 5,
                num_cds: 3,
                parts: Some(PartsDesc {
                    starts: [-200, 300, 400, 700],
                    lengths: [500, 100, 300, 100],
                    num_genes: Some([2, 1, 1, 1]),
                    offset: -200,
                    trnh_gug: Some(10),
                }),
                offset: Some(-200),
                trnh_gug: Some(10),
                part_orientation: Some("lsc,ssc".to_string()),
                irs_took_from: None,
                took_part_starts: None,
            })
            .unwrap();
        report
            .write(&SequenceSummary {
                seq_id: "NC_2".to_string(),
                length: 1200,
                taxid: None,
                num_genes: 0,
                num_cds: 0,
                parts: None,
                offset: Some(0),
                trnh_gug: None,
                part_orientation: None,
                irs_took_from: Some("NC_1".to_string()),
                took_part_starts: Some([0, 700, 800, 1000]),
            })
            .unwrap();
        let output = String::from_utf8(report.finish().unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines[0].starts_with("##cpirVersion="));
        assert!(lines[1].starts_with("##cpirCommand="));
        assert_eq!(lines[2], COLUMNS.join("\t"));
        assert_eq!(
            lines[3],
            "NC_1\t1000\t7\t5\t3\t-200,300,400,700\t500,100,300,100\t2,1,1,1\t-200\t10\tlsc,ssc\t\t"
        );
        assert_eq!(lines[4], "NC_2\t1200\t\t0\t0\t\t\t\t0\t\t\tNC_1\t0,700,800,1000");
    }
}
