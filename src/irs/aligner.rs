use super::delta::read_delta;
use crate::utils::Result;
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    process::Command,
};

const FASTA_LINE_WIDTH: usize = 80;

/// One local alignment of a query record onto the target sequence.
/// `start..end` is the 0-based half open interval on the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentMatch {
    pub target: String,
    pub query: String,
    pub start: i64,
    pub end: i64,
    pub positive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlignmentResult {
    pub matches: Vec<AlignmentMatch>,
}

impl AlignmentResult {
    pub fn new(matches: Vec<AlignmentMatch>) -> Self {
        Self { matches }
    }

    /// Matches of `query`, optionally restricted to one target, ordered by target start.
    pub fn matches(&self, target: Option<&str>, query: &str) -> Vec<&AlignmentMatch> {
        let mut selected: Vec<&AlignmentMatch> = self
            .matches
            .iter()
            .filter(|m| m.query == query && target.map_or(true, |t| m.target == t))
            .collect();
        selected.sort_by_key(|m| (m.start, m.end));
        selected
    }
}

/// External pairwise aligner of short query records onto a target sequence.
pub trait AlignmentRunner: Send + Sync {
    fn align(&self, target_fasta: &Path, query_fasta: &Path) -> Result<AlignmentResult>;
}

/// Runs MUMmer's `nucmer` and reads its delta output. Output is written next
/// to the target FASTA as `res_<query>.delta`.
#[derive(Debug, Clone)]
pub struct NucmerRunner {
    exe: PathBuf,
}

impl Default for NucmerRunner {
    fn default() -> Self {
        let exe = std::env::var_os("NUCMER_EXE")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("nucmer"));
        Self { exe }
    }
}

impl NucmerRunner {
    pub fn new(exe: impl Into<PathBuf>) -> Self {
        Self { exe: exe.into() }
    }

    /// Fails early when the executable cannot be started.
    pub fn check(&self) -> Result<()> {
        let output = Command::new(&self.exe)
            .arg("--version")
            .output()
            .map_err(|e| format!("Failed to execute {}: {}", self.exe.display(), e))?;
        let version = String::from_utf8_lossy(&output.stdout);
        log::debug!("Using {} {}", self.exe.display(), version.trim());
        Ok(())
    }

    fn output_prefix(target_fasta: &Path, query_fasta: &Path) -> PathBuf {
        let stem = query_fasta
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = stem.strip_prefix("qry_").unwrap_or(&stem);
        let dir = target_fasta.parent().unwrap_or_else(|| Path::new("."));
        dir.join(format!("res_{}", stem))
    }
}

impl AlignmentRunner for NucmerRunner {
    fn align(&self, target_fasta: &Path, query_fasta: &Path) -> Result<AlignmentResult> {
        let prefix = Self::output_prefix(target_fasta, query_fasta);
        log::debug!(
            "Command: {} -p {} {} {}",
            self.exe.display(),
            prefix.display(),
            target_fasta.display(),
            query_fasta.display()
        );
        let output = Command::new(&self.exe)
            .arg("-p")
            .arg(&prefix)
            .arg(target_fasta)
            .arg(query_fasta)
            .output()
            .map_err(|e| format!("Failed to execute {}: {}", self.exe.display(), e))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} failed ({}): {}",
                self.exe.display(),
                output.status,
                stderr.trim()
            ));
        }
        let mut delta_path = prefix.into_os_string();
        delta_path.push(".delta");
        read_delta(Path::new(&delta_path))
    }
}

pub fn write_fasta(path: &Path, records: &[(&str, &[u8])]) -> Result<()> {
    let file = File::create(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    let write_err = |e: std::io::Error| format!("Error writing {}: {}", path.display(), e);
    for (name, bases) in records {
        writeln!(writer, ">{}", name).map_err(write_err)?;
        for line in bases.chunks(FASTA_LINE_WIDTH) {
            writer.write_all(line).map_err(write_err)?;
            writer.write_all(b"\n").map_err(write_err)?;
        }
    }
    writer.flush().map_err(write_err)
}
