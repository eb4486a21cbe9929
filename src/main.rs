use clap::Parser;
use cpir::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{analyse, find_irs},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Analyse(_) => "analyse",
        Command::FindIrs(_) => "find-irs",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Analyse(args) => analyse::analyse(args)?,
        Command::FindIrs(args) => find_irs::find_irs(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
