use cpir::{
    chloroplast::{PartName, SequenceDesc},
    cli::{AnalyseArgs, InputArgs},
    commands::analyse::analyse,
    genome::{SequenceProvider, SequenceStore},
    irs::{
        find_best_irs_by_similar, find_missing_partitions, AlignmentMatch, AlignmentResult,
        AlignmentRunner, IrResolver, MemoryStore, ResolverParams, TaxonomyTree, Tier,
    },
    utils::Result,
    writers::ReportWriter,
};
use gb_io::seq::{Feature, Location, Seq, Topology};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs::{self, File},
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

const LSC: usize = 9000;
const IR: usize = 2000;
const SSC: usize = 1500;
const LENGTH: usize = LSC + IR + SSC + IR;

// 1 - 10 - 20 - {21, 22}
//        - 30 - 31
const NODES: &str = "\
1\t|\t1\t|\tno rank\t|
10\t|\t1\t|\tfamily\t|
20\t|\t10\t|\tgenus\t|
21\t|\t20\t|\tspecies\t|
22\t|\t20\t|\tspecies\t|
30\t|\t10\t|\tgenus\t|
31\t|\t30\t|\tspecies\t|
";

fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases
        .iter()
        .rev()
        .map(|b| match b {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            _ => b'A',
        })
        .collect()
}

/// LSC, IRA, SSC and IRB laid out from the origin.
fn plastome(seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut random = |n: usize| -> Vec<u8> {
        (0..n)
            .map(|_| b"ACGT"[rng.random_range(0..4usize)])
            .collect()
    };
    let lsc = random(LSC);
    let ira = random(IR);
    let ssc = random(SSC);
    let irb = reverse_complement(&ira);
    [lsc, ira, ssc, irb].concat()
}

fn gb_feature(kind: &str, location: Location, qualifiers: &[(&str, &str)]) -> Feature {
    Feature {
        kind: kind.to_string().into(),
        location,
        qualifiers: qualifiers
            .iter()
            .map(|(k, v)| (k.to_string().into(), Some(v.to_string())))
            .collect(),
    }
}

fn complement(start: i64, end: i64) -> Location {
    Location::Complement(Box::new(Location::simple_range(start, end)))
}

fn record(id: &str, taxid: u32, bases: Vec<u8>, with_irs: bool) -> Seq {
    let length = bases.len() as i64;
    let mut features = vec![
        gb_feature(
            "source",
            Location::simple_range(0, length),
            &[("db_xref", &format!("taxon:{}", taxid))],
        ),
        gb_feature("gene", complement(20, 90), &[("gene", "trnH-GUG")]),
        gb_feature("gene", complement(100, 400), &[("gene", "rps16")]),
        gb_feature("CDS", complement(100, 400), &[("gene", "rps16")]),
        gb_feature("gene", Location::simple_range(9500, 9800), &[("gene", "rrn16")]),
        gb_feature("gene", complement(11200, 11500), &[("gene", "ndhF")]),
        gb_feature("gene", complement(13700, 14000), &[("gene", "rrn16")]),
    ];
    if with_irs {
        let ira = (LSC as i64, (LSC + IR) as i64);
        let irb = ((LSC + IR + SSC) as i64, length);
        for (start, end) in [ira, irb] {
            features.push(gb_feature(
                "repeat_region",
                Location::simple_range(start, end),
                &[("rpt_type", "inverted")],
            ));
        }
    }
    let mut seq = Seq::empty();
    seq.name = Some(id.to_string());
    seq.accession = Some(id.to_string());
    seq.topology = Topology::Circular;
    seq.len = Some(bases.len());
    seq.seq = bases;
    seq.features = features;
    seq
}

fn write_genbank(path: &Path, records: &[Seq]) {
    let file = File::create(path).unwrap();
    for record in records {
        gb_io::writer::write(&file, record).unwrap();
    }
}

/// Fixture: donor D21 (taxid 21) and donor D31 (taxid 31) are annotated,
/// target T22 (taxid 22) is the same genome as D21 without IR annotation.
struct Fixture {
    _dir: tempfile::TempDir,
    genbank: PathBuf,
    nodes: PathBuf,
    output_prefix: String,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let genbank = dir.path().join("plastomes.gb");
    let nodes = dir.path().join("nodes.dmp");
    let shared = plastome(21);
    write_genbank(
        &genbank,
        &[
            record("D31", 31, plastome(31), true),
            record("D21", 21, shared.clone(), true),
            record("T22", 22, shared, false),
        ],
    );
    fs::write(&nodes, NODES).unwrap();
    let output_prefix = dir.path().join("report").to_string_lossy().to_string();
    Fixture {
        _dir: dir,
        genbank,
        nodes,
        output_prefix,
    }
}

fn read_fasta(path: &Path) -> Vec<(String, Vec<u8>)> {
    let text = fs::read_to_string(path).unwrap();
    let mut records: Vec<(String, Vec<u8>)> = Vec::new();
    for line in text.lines() {
        if let Some(name) = line.strip_prefix('>') {
            records.push((name.to_string(), Vec::new()));
        } else if let Some((_, bases)) = records.last_mut() {
            bases.extend_from_slice(line.trim().as_bytes());
        }
    }
    records
}

fn occurrences(haystack: &[u8], needle: &[u8]) -> Vec<usize> {
    haystack
        .windows(needle.len())
        .enumerate()
        .filter(|(_, window)| *window == needle)
        .map(|(i, _)| i)
        .collect()
}

/// Exact matching stand-in for nucmer.
#[derive(Default)]
struct ExactAligner {
    calls: Mutex<Vec<String>>,
}

impl AlignmentRunner for ExactAligner {
    fn align(&self, target_fasta: &Path, query_fasta: &Path) -> Result<AlignmentResult> {
        self.calls
            .lock()
            .unwrap()
            .push(query_fasta.file_name().unwrap().to_string_lossy().to_string());
        let (target_name, target) = read_fasta(target_fasta).remove(0);
        let mut matches = Vec::new();
        for (query_name, query) in read_fasta(query_fasta) {
            let strands = [(query.clone(), true), (reverse_complement(&query), false)];
            for (pattern, positive) in strands {
                for start in occurrences(&target, &pattern) {
                    matches.push(AlignmentMatch {
                        target: target_name.clone(),
                        query: query_name.clone(),
                        start: start as i64,
                        end: (start + pattern.len()) as i64,
                        positive,
                    });
                }
            }
        }
        Ok(AlignmentResult::new(matches))
    }
}

fn load(fixture: &Fixture) -> (Vec<SequenceDesc>, TaxonomyTree) {
    let store = SequenceStore::from_paths(&[&fixture.genbank]).unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.get_length("T22").unwrap(), LENGTH);
    let descs = store
        .iter()
        .map(|seq| SequenceDesc::new(Arc::clone(seq), seq.taxon_id, None))
        .collect();
    (descs, TaxonomyTree::from_path(&fixture.nodes).unwrap())
}

#[test]
fn genbank_annotation_is_partitioned() {
    let fixture = fixture();
    let (descs, _) = load(&fixture);
    let donor = &descs[1];
    assert_eq!(donor.id(), "D21");
    assert_eq!(donor.taxid, Some(21));
    let partition = donor.parts.as_ref().unwrap();
    assert_eq!(partition.part(PartName::Lsc).len(), LSC);
    assert_eq!(partition.part(PartName::Ira).real_start(), LSC);
    assert_eq!(partition.part(PartName::Ssc).len(), SSC);
    assert!(descs[2].parts.is_none());

    let summary = donor.summary();
    assert_eq!(summary.num_genes, 5);
    assert_eq!(summary.num_cds, 1);
    assert_eq!(summary.trnh_gug, Some(20));
    assert_eq!(summary.part_orientation, None);
}

#[test]
fn missing_irs_reconstructed_from_closest_relative() {
    let fixture = fixture();
    let (mut descs, taxonomy) = load(&fixture);
    let aligner = ExactAligner::default();
    let store = MemoryStore::default();
    let params = ResolverParams {
        num_threads: 2,
        ..ResolverParams::default()
    };
    let resolver = IrResolver::new(&aligner, &store, &params);

    let resolved = find_missing_partitions(&mut descs, &taxonomy, &resolver).unwrap();
    let resolution = &resolved["T22"];
    assert_eq!(resolution.tier, Tier::Nice);
    assert_eq!(resolution.donor, "D21");
    assert_eq!(resolution.ira, (LSC as i64, (LSC + IR) as i64));
    assert_eq!(resolution.irb, ((LSC + IR + SSC) as i64, LENGTH as i64));
    // first-nice never reaches the second relative
    assert_eq!(*aligner.calls.lock().unwrap(), vec!["qry_D21.fa".to_string()]);

    let took = descs[2].took.as_ref().unwrap();
    assert_eq!(took.partition.part(PartName::Lsc).len(), LSC);
    assert_eq!(took.partition.part(PartName::Ssc).len(), SSC);

    let mut report = ReportWriter::from_writer(Vec::new()).unwrap();
    for desc in &descs {
        report.write(&desc.summary()).unwrap();
    }
    let output = String::from_utf8(report.finish().unwrap()).unwrap();
    let row = output.lines().find(|l| l.starts_with("T22\t")).unwrap();
    let fields: Vec<&str> = row.split('\t').collect();
    assert_eq!(fields[5], "");
    assert_eq!(fields[8], "0");
    assert_eq!(fields[11], "D21");
    assert_eq!(fields[12], "0,9000,11000,12500");
}

#[test]
fn best_irs_by_similar_looks_past_own_taxon() {
    let fixture = fixture();
    let (descs, taxonomy) = load(&fixture);
    let aligner = ExactAligner::default();
    let params = ResolverParams::default();
    let resolver = IrResolver::new(&aligner, &cpir::irs::NoStore, &params);

    // best-overall aligns every relative
    let resolution = find_best_irs_by_similar(&descs, "T22", &taxonomy, &resolver)
        .unwrap()
        .unwrap();
    assert_eq!(resolution.donor, "D21");
    assert_eq!(resolution.tier, Tier::Nice);
    assert_eq!(aligner.calls.lock().unwrap().len(), 2);

    // Own taxon excluded: D31 is the only candidate and its IRs do not match
    let resolution = find_best_irs_by_similar(&descs, "D21", &taxonomy, &resolver).unwrap();
    assert_eq!(resolution, None);
}

#[test]
fn analyse_writes_report_for_annotated_batch() {
    let fixture = fixture();
    let dir = tempfile::tempdir().unwrap();
    let genbank = dir.path().join("annotated.gb");
    write_genbank(&genbank, &[record("D21", 21, plastome(21), true)]);

    analyse(AnalyseArgs {
        input: InputArgs {
            genbank_paths: vec![genbank],
            nodes_path: fixture.nodes.clone(),
            metadata_path: None,
            max_taxid: None,
            num_threads: Some(1),
            match_length: 100,
            work_dir: None,
            nucmer_exe: None,
        },
        output_prefix: fixture.output_prefix.clone(),
    })
    .unwrap();

    let report = fs::read_to_string(format!("{}.tsv", fixture.output_prefix)).unwrap();
    let lines: Vec<&str> = report.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[2].starts_with("seq_id\tlength\ttaxid"));
    assert!(lines[3].starts_with("D21\t14500\t21\t5\t1\t0,9000,11000,12500\t9000,2000,1500,2000\t"));
}
