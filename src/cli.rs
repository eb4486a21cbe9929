use crate::utils::Result;
use clap::{ArgAction, Args, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="cpir",
          version=&**FULL_VERSION,
          about="Chloroplast genome partitioning and inverted repeat reconstruction",
          long_about = None,
          disable_help_subcommand = true,
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Partition genomes and reconstruct missing inverted repeats")]
    Analyse(AnalyseArgs),
    #[clap(about = "Find the best inverted repeats of one sequence from its relatives")]
    FindIrs(FindIrsArgs),
}

#[derive(Args, Debug)]
pub struct InputArgs {
    #[clap(required = true)]
    #[clap(short = 'g')]
    #[clap(long = "genbank")]
    #[clap(help = "GenBank files with annotated chloroplast genomes")]
    #[clap(value_name = "GENBANK")]
    #[clap(num_args = 1..)]
    #[arg(value_parser = check_file_exists)]
    pub genbank_paths: Vec<PathBuf>,

    #[clap(required = true)]
    #[clap(short = 'n')]
    #[clap(long = "nodes")]
    #[clap(help = "NCBI taxonomy nodes.dmp file")]
    #[clap(value_name = "NODES")]
    #[arg(value_parser = check_file_exists)]
    pub nodes_path: PathBuf,

    #[clap(short = 'm')]
    #[clap(long = "metadata")]
    #[clap(help = "Table of seq_id, taxid and max_taxid per sequence")]
    #[clap(value_name = "METADATA")]
    #[arg(value_parser = check_file_exists)]
    pub metadata_path: Option<PathBuf>,

    #[clap(long = "max-taxid")]
    #[clap(help = "Highest taxon where relatives are searched, unless set per sequence")]
    #[clap(value_name = "TAXID")]
    pub max_taxid: Option<u32>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads [default: available cores]")]
    #[clap(value_name = "THREADS")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: Option<usize>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "match-length")]
    #[clap(value_name = "LENGTH")]
    #[clap(help = "Length of the IR ends aligned onto the sequence")]
    #[clap(default_value = "100")]
    #[arg(value_parser = match_length_in_range)]
    pub match_length: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "work-dir")]
    #[clap(value_name = "DIR")]
    #[clap(help = "Keep alignment files in this directory")]
    pub work_dir: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "nucmer")]
    #[clap(value_name = "EXE")]
    #[clap(help = "nucmer executable [default: $NUCMER_EXE or nucmer]")]
    pub nucmer_exe: Option<PathBuf>,
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct AnalyseArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,
}

#[derive(Parser, Debug)]
#[command(arg_required_else_help(true))]
pub struct FindIrsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "sequence")]
    #[clap(help = "Identifier of the sequence to resolve")]
    #[clap(value_name = "SEQ_ID")]
    pub seq_id: String,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn match_length_in_range(s: &str) -> Result<usize> {
    let length: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid match length", s))?;
    if length >= 20 {
        Ok(length)
    } else {
        Err("Match length must be at least 20".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}
