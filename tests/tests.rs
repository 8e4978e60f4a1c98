use cytag::{
    components::{
        cg::ConstraintGrammar,
        taxonomy::{TagTaxonomy, UNKNOWN_TAG},
        Component,
    },
    context::Context,
    output::read_xml,
    pipeline::{
        annotate, annotate_with, Input, OutputFormat, OutputSpec, PosTagger, Stage, TaggerOptions,
        UnknownWords,
    },
    types::{Mutation, Resolution, TaggedDocument},
    Error,
};
use lazy_static::lazy_static;
use quickcheck::TestResult;
use quickcheck_macros::quickcheck;
use std::{fs, path::PathBuf};

const RESOURCES_PATH: &str = "tests/data/resources";

lazy_static! {
    static ref CONTEXT: Context = Context::from_dir(RESOURCES_PATH).unwrap();
}

/// Returns the request unchanged, i. e. keeps every reading.
struct PassThrough;

impl ConstraintGrammar for PassThrough {
    fn disambiguate(&self, input: &str) -> Result<String, Error> {
        Ok(input.to_string())
    }
}

fn tagger() -> PosTagger<'static, PassThrough> {
    PosTagger::new(&CONTEXT, PassThrough, TaggerOptions::default())
}

fn output_spec(dir: PathBuf, stage: Stage) -> OutputSpec {
    OutputSpec {
        dir,
        name: "prawf".into(),
        format: OutputFormat::All,
        stage,
    }
}

#[test]
fn tags_a_simple_sentence() -> Result<(), Error> {
    let (document, report) = tagger().tag_text("Aeth hi i'r dref.")?;

    let texts: Vec<_> = document.tokens().map(|x| x.text.as_str()).collect();
    assert_eq!(texts, vec!["Aeth", "hi", "i", "'r", "dref", "."]);

    let tags: Vec<_> = document
        .tokens()
        .map(|x| x.annotation.rich_tag.as_deref().unwrap())
        .collect();
    assert_eq!(
        tags,
        vec!["Bgorff3u", "Rhapers3bu", "Arsym", "YFB", "Ebu", "Atdt"]
    );

    let full_stop = document.tokens().last().unwrap();
    assert_eq!(full_stop.annotation.basic_tag.as_deref(), Some("Atd"));

    let dref = document.tokens().nth(4).unwrap();
    assert_eq!(dref.annotation.lemma.as_deref(), Some("tref"));
    assert_eq!(dref.annotation.mutation, Some(Mutation::Soft));

    assert!(report.cascade.unknown_words.is_empty());
    Ok(())
}

#[test]
fn digits_are_tagged_without_ambiguity() -> Result<(), Error> {
    let (document, _) = tagger().tag_text("Daeth 123 gyda Mair.")?;

    let digits = document.tokens().nth(1).unwrap();
    assert_eq!(digits.annotation.rich_tag.as_deref(), Some("Gwdig"));
    assert_eq!(digits.annotation.resolution, Some(Resolution::Engine));

    let name = document.tokens().nth(3).unwrap();
    assert_eq!(name.annotation.rich_tag.as_deref(), Some("Epb"));
    Ok(())
}

#[test]
fn unknown_words_are_reported() -> Result<(), Error> {
    let (document, report) = tagger().tag_text("Aeth xyzzy i'r dref.")?;

    let unknown = document.tokens().nth(1).unwrap();
    assert_eq!(unknown.annotation.rich_tag.as_deref(), Some(UNKNOWN_TAG));
    assert_eq!(unknown.annotation.resolution, Some(Resolution::Unknown));
    assert!(report.cascade.unknown_words.iter().any(|x| x == "xyzzy"));
    Ok(())
}

#[test]
fn readings_only_use_known_tags() {
    let tagger = tagger();
    let mut document = CONTEXT
        .segmenter()
        .segment_text("Mae'r car yn y dref.\nDaeth Dafydd Jones gyda'r BBC, e.e. 5 choeden.");
    tagger.prepare(&mut document, Stage::Token);

    let taxonomy = TagTaxonomy::get();
    for readings in CONTEXT.readings_generator().generate_document(&document) {
        for reading in readings.readings() {
            assert!(
                reading.rich_tag == UNKNOWN_TAG || taxonomy.contains(&reading.rich_tag),
                "unexpected tag {}",
                reading.rich_tag
            );
        }
    }
}

const WORDS: &[&str] = &[
    "Aeth", "hi", "i'r", "dref", "car", "123", "Mair", "choeden", "xyzzy", "BBC", ",", "yn",
    "Dr.", "(hi)", "gyda'r",
];

#[quickcheck]
fn tagging_keeps_every_token(indices: Vec<u8>) -> TestResult {
    if indices.is_empty() {
        return TestResult::discard();
    }

    let text = indices
        .iter()
        .map(|i| WORDS[*i as usize % WORDS.len()])
        .collect::<Vec<_>>()
        .join(" ")
        + ".";

    let tagger = tagger();
    let mut expected = CONTEXT.segmenter().segment_text(&text);
    tagger.prepare(&mut expected, Stage::Token);

    let document = match tagger.tag_text(&text) {
        Ok((document, _)) => document,
        Err(_) => return TestResult::failed(),
    };

    TestResult::from_bool(
        document.n_tokens() == expected.n_tokens()
            && document.tokens().all(|x| x.annotation.rich_tag.is_some()),
    )
}

#[test]
fn missing_engine_writes_nothing() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out");
    let options = TaggerOptions {
        engine_path: Some(dir.path().join("vislcg3")),
        ..TaggerOptions::default()
    };

    let result = annotate(
        &CONTEXT,
        options,
        &Input::Text("Aeth hi i'r dref.".into()),
        &output_spec(out.clone(), Stage::Pos),
    );

    assert!(matches!(result, Err(Error::MissingDependency { .. })));
    assert!(!out.exists());
    Ok(())
}

#[test]
fn annotation_writes_outputs_and_unknown_words() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("out");
    let unknown_words_path = dir.path().join("unknown_words");
    let options = TaggerOptions {
        unknown_words_path: Some(unknown_words_path.clone()),
        keep_engine_io: true,
        ..TaggerOptions::default()
    };

    let (document, report) = annotate_with(
        &CONTEXT,
        PassThrough,
        options,
        &Input::Text("Aeth xyzzy i'r dref.".into()),
        &output_spec(out.clone(), Stage::Pos),
    )?;
    assert!(report.is_some());

    for name in &["prawf.tsv", "prawf.xml", "prawf_readings", "prawf_readingsPostCG"] {
        assert!(out.join(name).exists(), "{} is missing", name);
    }

    let tsv = fs::read_to_string(out.join("prawf.tsv"))?;
    assert_eq!(tsv.lines().count(), document.n_tokens());

    let (name, read): (String, TaggedDocument) =
        read_xml(&fs::read_to_string(out.join("prawf.xml"))?)?;
    assert_eq!(name, "prawf");
    assert_eq!(read.n_tokens(), document.n_tokens());

    let unknown_words = UnknownWords::load(&unknown_words_path)?;
    assert!(unknown_words.contains("xyzzy"));
    Ok(())
}

#[test]
fn early_stages_need_no_engine() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let options = TaggerOptions {
        engine_path: Some(dir.path().join("vislcg3")),
        ..TaggerOptions::default()
    };
    let input = Input::Text("Aeth hi i'r dref. Daeth Mair.".into());

    let sentences = dir.path().join("sentences");
    let (document, report) = annotate(
        &CONTEXT,
        options.clone(),
        &input,
        &output_spec(sentences.clone(), Stage::Sentence),
    )?;
    assert!(report.is_none());
    assert_eq!(document.n_sentences(), 2);
    assert!(!sentences.exists());

    let tokens = dir.path().join("tokens");
    let (document, report) = annotate(
        &CONTEXT,
        options,
        &input,
        &output_spec(tokens.clone(), Stage::Token),
    )?;
    assert!(report.is_none());
    assert_eq!(document.n_tokens(), 9);
    assert!(document.tokens().all(|x| x.annotation.rich_tag.is_none()));
    assert!(tokens.join("prawf.tsv").exists());
    Ok(())
}

#[test]
fn compiled_context_tags_like_loaded_one() -> Result<(), Error> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("context.bin");
    CONTEXT.to_writer(fs::File::create(&path)?)?;

    let compiled = Context::new(&path)?;
    let tagger = PosTagger::new(&compiled, PassThrough, TaggerOptions::default());

    let (expected, _) = self::tagger().tag_text("Mae'r car yn y dref.")?;
    let (document, _) = tagger.tag_text("Mae'r car yn y dref.")?;

    let tags = |document: &TaggedDocument| -> Vec<Option<String>> {
        document
            .tokens()
            .map(|x| x.annotation.rich_tag.clone())
            .collect()
    };
    assert_eq!(tags(&document), tags(&expected));
    Ok(())
}

#[test]
#[cfg(unix)]
fn tags_through_an_engine_process() -> Result<(), Error> {
    use cytag::components::cg::{VislCg3, VISLCG3};
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let executable = dir.path().join(VISLCG3);
    fs::write(&executable, "#!/bin/sh\nexec cat\n")?;
    fs::set_permissions(&executable, fs::Permissions::from_mode(0o755))?;

    let engine = VislCg3::locate(Some(&executable), "grammar")?;
    let text = "Aeth hi i'r dref. Daeth Mair gyda'r car.";
    let (document, report) =
        PosTagger::new(&CONTEXT, engine, TaggerOptions::default()).tag_text(text)?;
    let (expected, _) = tagger().tag_text(text)?;

    assert_eq!(report.response, report.request);
    let tags = |document: &TaggedDocument| -> Vec<Option<String>> {
        document
            .tokens()
            .map(|x| x.annotation.rich_tag.clone())
            .collect()
    };
    assert_eq!(tags(&document), tags(&expected));
    Ok(())
}

#[test]
#[cfg(unix)]
fn unusable_engine_is_missing() -> Result<(), Error> {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir()?;
    let executable = dir.path().join("vislcg3");
    fs::write(&executable, "#!/bin/sh\nexec cat\n")?;
    fs::set_permissions(&executable, fs::Permissions::from_mode(0o644))?;

    let out = dir.path().join("out");
    let options = TaggerOptions {
        engine_path: Some(executable),
        ..TaggerOptions::default()
    };
    let result = annotate(
        &CONTEXT,
        options,
        &Input::Text("Aeth hi i'r dref.".into()),
        &output_spec(out.clone(), Stage::Pos),
    );

    assert!(matches!(result, Err(Error::MissingDependency { .. })));
    assert!(!out.exists());
    Ok(())
}
