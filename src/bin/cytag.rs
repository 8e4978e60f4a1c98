use clap::Parser;
use cytag::{
    components::{cg::VislCg3, Component},
    context::Context,
    output,
    pipeline::{annotate, Input, OutputFormat, OutputSpec, PosTagger, Stage, TaggerOptions},
    Error,
};
use std::{
    io::{self, BufWriter, Read},
    path::PathBuf,
};

#[derive(Parser)]
#[clap(version, about = "Part-of-speech tagging of Welsh text")]
struct Opts {
    /// Text to tag, or paths of input files. Reads standard input if empty.
    inputs: Vec<String>,
    /// Directory with the lexicon, gazetteers and tables.
    #[clap(long, short, default_value = "resources")]
    resources: PathBuf,
    /// A compiled resource bundle, used instead of the resource directory.
    #[clap(long, short)]
    compiled: Option<PathBuf>,
    /// JSON file with tagger options.
    #[clap(long, short)]
    options: Option<PathBuf>,
    /// Name of the corpus. Output is written to files only if a name is given.
    #[clap(long, short)]
    name: Option<String>,
    #[clap(long, short = 'd', default_value = "outputs")]
    output_dir: PathBuf,
    /// Stage to stop after: seg, sent, tok or pos.
    #[clap(long, default_value = "pos")]
    stage: Stage,
    /// Output format: tsv, xml or all.
    #[clap(long, short, default_value = "all")]
    format: OutputFormat,
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let opts = Opts::parse();

    let options = match &opts.options {
        Some(path) => TaggerOptions::from_path(path)?,
        None => TaggerOptions::default(),
    };
    let context = match &opts.compiled {
        Some(path) => Context::new(path)?,
        None => Context::from_dir(&opts.resources)?,
    };

    let paths: Vec<PathBuf> = opts.inputs.iter().map(PathBuf::from).collect();
    let input = if !paths.is_empty() && paths.iter().all(|x| x.is_file()) {
        Input::Files(paths)
    } else if opts.inputs.is_empty() {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Input::Text(text)
    } else {
        Input::Text(opts.inputs.join(" "))
    };

    match opts.name {
        Some(name) => {
            let spec = OutputSpec {
                dir: opts.output_dir.join(&name),
                name,
                format: opts.format,
                stage: opts.stage,
            };
            annotate(&context, options, &input, &spec)?;
        }
        None => {
            let engine = VislCg3::locate(options.engine_path.as_deref(), &options.grammar_path)?;
            let tagger = PosTagger::new(&context, engine, options);

            let (document, _) = match &input {
                Input::Text(text) => tagger.tag_text(text)?,
                Input::Files(paths) => tagger.tag_files(paths)?,
            };
            output::write_tsv(&document, BufWriter::new(io::stdout()))?;
        }
    }

    Ok(())
}
