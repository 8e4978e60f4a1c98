use clap::Parser;
use cytag::{
    components::{coverage::CoverageTable, tag_sequence::TagSequenceTable},
    context::{COVERAGE_FILE, TAG_SEQUENCES_FILE},
    output::read_xml,
    types::TaggedDocument,
    Error,
};
use fs_err as fs;
use log::info;
use std::path::PathBuf;

/// Derives the coverage and tag sequence tables from tagged XML output.
/// The output should be produced with `use_coverage` disabled.
#[derive(Parser)]
#[clap(version)]
struct Opts {
    /// XML files written by the tagger.
    inputs: Vec<PathBuf>,
    /// Directory the tables are written to.
    #[clap(long, short)]
    out: PathBuf,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let mut document = TaggedDocument::new();
    for path in &opts.inputs {
        let (name, part) = read_xml(&fs::read_to_string(path)?)?;
        info!("Read corpus '{}' with {} tokens.", name, part.n_tokens());
        document.files.extend(part.files);
    }

    fs::create_dir_all(&opts.out)?;

    let coverage = CoverageTable::from_document(&document);
    coverage.to_path(opts.out.join(COVERAGE_FILE))?;
    info!("Derived coverage for {} tokens.", coverage.len());

    let tag_sequences = TagSequenceTable::from_document(&document);
    tag_sequences.to_path(opts.out.join(TAG_SEQUENCES_FILE))?;
    info!("Derived {} tag sequence patterns.", tag_sequences.len());

    Ok(())
}
