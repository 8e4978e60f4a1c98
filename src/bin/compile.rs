use clap::Parser;
use cytag::{components::Component, context::Context, Error};
use fs_err::File;
use log::info;
use std::{io::BufWriter, path::PathBuf};

/// Compiles a resource directory into one binary bundle which loads faster.
#[derive(Parser)]
#[clap(version)]
struct BuildOptions {
    /// Directory with the lexicon, gazetteers and tables.
    #[clap(long, short)]
    resources: PathBuf,
    #[clap(long, short)]
    out: PathBuf,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = BuildOptions::parse();

    let context = Context::from_dir(&opts.resources)?;
    context.to_writer(BufWriter::new(File::create(&opts.out)?))?;

    info!("Wrote {} to {}.", Context::name(), opts.out.display());
    Ok(())
}
