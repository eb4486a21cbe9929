use super::Result;
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read as ioRead};
use std::path::Path;

/// Opens a text input, transparently decompressing gzip files.
pub fn open_table_reader(path: &Path) -> Result<BufReader<Box<dyn ioRead>>> {
    fn is_gzipped(path: &Path) -> bool {
        let path_str = path.to_string_lossy().to_lowercase();
        path_str.ends_with(".gz") || path_str.ends_with(".gzip")
    }
    let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    if is_gzipped(path) {
        let gz_decoder = MultiGzDecoder::new(file);
        if gz_decoder.header().is_some() {
            Ok(BufReader::new(Box::new(gz_decoder)))
        } else {
            Err(format!("Invalid gzip header: {}", path.to_string_lossy()))
        }
    } else {
        Ok(BufReader::new(Box::new(file)))
    }
}

/// Splits a tab separated line into trimmed fields. NCBI dump files use
/// `\t|\t` as separator and a trailing `\t|`, both are accepted.
pub fn split_table_line(line: &str) -> Vec<&str> {
    line.trim_end_matches(['\r', '\n'])
        .trim_end_matches("\t|")
        .split('\t')
        .map(str::trim)
        .filter(|field| *field != "|")
        .collect()
}
