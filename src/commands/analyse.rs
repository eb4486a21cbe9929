use super::batch::{nucmer_runner, resolver_params, Batch};
use crate::cli::AnalyseArgs;
use crate::irs::{find_missing_partitions, IrResolver, NoStore};
use crate::utils::{create_writer, Result};
use crate::writers::ReportWriter;

pub fn analyse(args: AnalyseArgs) -> Result<()> {
    let mut batch = Batch::load(&args.input)?;
    let mut report = create_writer(&args.output_prefix, "tsv", ReportWriter::new)?;

    if batch.needs_alignment() {
        let runner = nucmer_runner(&args.input);
        let params = resolver_params(&args.input);
        log::debug!(
            "Initializing thread pool with {} threads...",
            params.num_threads
        );
        let resolver = IrResolver::new(&runner, &NoStore, &params);
        let resolved = find_missing_partitions(&mut batch.descs, &batch.taxonomy, &resolver)?;
        log::info!("Reconstructed IRs of {} sequence(s)", resolved.len());
    }

    for desc in &batch.descs {
        report.write(&desc.summary())?;
    }
    report.finish()?;
    log::info!("Report written to {}.tsv", args.output_prefix);
    Ok(())
}
