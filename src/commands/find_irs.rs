use super::batch::{nucmer_runner, resolver_params, Batch};
use crate::cli::FindIrsArgs;
use crate::irs::{find_best_irs_by_similar, IrResolver, NoStore};
use crate::utils::Result;

pub fn find_irs(args: FindIrsArgs) -> Result<()> {
    let batch = Batch::load(&args.input)?;
    let runner = nucmer_runner(&args.input);
    let params = resolver_params(&args.input);
    let resolver = IrResolver::new(&runner, &NoStore, &params);

    match find_best_irs_by_similar(&batch.descs, &args.seq_id, &batch.taxonomy, &resolver)? {
        Some(resolution) => {
            log::info!(
                "Sequence {}: {} IRs taken from {}",
                args.seq_id,
                resolution.tier,
                resolution.donor
            );
            println!(
                "{}\t{}..{}\t{}..{}\t{}\t{}",
                args.seq_id,
                resolution.ira.0,
                resolution.ira.1,
                resolution.irb.0,
                resolution.irb.1,
                resolution.donor,
                resolution.tier
            );
        }
        None => log::warn!("Sequence {}: no IRs found from relatives", args.seq_id),
    }
    Ok(())
}
