//! Serialisation of annotated documents as TSV and XML, and reading the XML back.

use std::{io::Write, path::Path};
use xml::writer::{EmitterConfig, XmlEvent};

use crate::{
    types::{
        AnonSpan, Annotation, File, Mutation, Position, Segment, Sentence, TaggedDocument, Token,
    },
    Error,
};

/// Writes one line per token: `id surface position lemma basic rich +mutation`, tab separated.
/// `id` counts tokens across the whole document, starting at one.
pub fn write_tsv<W: Write>(document: &TaggedDocument, mut writer: W) -> Result<(), Error> {
    for (i, token) in document.tokens().enumerate() {
        let annotation = &token.annotation;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            token.text,
            token.position,
            annotation.lemma.as_deref().unwrap_or_default(),
            annotation.basic_tag.as_deref().unwrap_or_default(),
            annotation.rich_tag.as_deref().unwrap_or_default(),
            annotation
                .mutation
                .map(|x| format!("+{}", x.code()))
                .unwrap_or_default()
        )?;
    }

    Ok(())
}

fn file_name(name: &str) -> &str {
    Path::new(name)
        .file_name()
        .and_then(|x| x.to_str())
        .unwrap_or(name)
}

/// Writes the document as a `corpus` of `file`, `paragraph`, `sentence` and `token` elements.
///
/// Every element carries its global `id` and its index within the enclosing file (`file_id`);
/// sentences and tokens also carry their index in the enclosing paragraph (`para_id`) or
/// sentence (`sent_id`).
pub fn write_xml<W: Write>(document: &TaggedDocument, name: &str, writer: W) -> Result<(), Error> {
    let mut writer = EmitterConfig::new()
        .perform_indent(true)
        .create_writer(writer);

    writer.write(XmlEvent::start_element("corpus").attr("name", name))?;

    let (mut n_segments, mut n_sentences, mut n_tokens) = (0, 0, 0);

    for (file_index, file) in document.files.iter().enumerate() {
        let (mut file_sentences, mut file_tokens) = (0, 0);
        let file_id = (file_index + 1).to_string();

        writer.write(
            XmlEvent::start_element("file")
                .attr("id", &file_id)
                .attr("name", file_name(&file.name)),
        )?;

        for (segment_index, segment) in file.segments.iter().enumerate() {
            n_segments += 1;
            let id = n_segments.to_string();
            let in_file = (segment_index + 1).to_string();

            writer.write(
                XmlEvent::start_element("paragraph")
                    .attr("id", &id)
                    .attr("file_id", &in_file),
            )?;

            for (sentence_index, sentence) in segment.sentences.iter().enumerate() {
                n_sentences += 1;
                file_sentences += 1;
                let id = n_sentences.to_string();
                let in_file = file_sentences.to_string();
                let in_paragraph = (sentence_index + 1).to_string();

                writer.write(
                    XmlEvent::start_element("sentence")
                        .attr("id", &id)
                        .attr("file_id", &in_file)
                        .attr("para_id", &in_paragraph),
                )?;

                for (token_index, token) in sentence.tokens.iter().enumerate() {
                    n_tokens += 1;
                    file_tokens += 1;
                    let id = n_tokens.to_string();
                    let in_file = file_tokens.to_string();
                    let in_sentence = (token_index + 1).to_string();
                    let position = token.position.to_string();
                    let annotation = &token.annotation;

                    let mut element = XmlEvent::start_element("token")
                        .attr("id", &id)
                        .attr("file_id", &in_file)
                        .attr("sent_id", &in_sentence)
                        .attr("lemma", annotation.lemma.as_deref().unwrap_or_default())
                        .attr(
                            "basic_pos",
                            annotation.basic_tag.as_deref().unwrap_or_default(),
                        )
                        .attr("rich_pos", annotation.rich_tag.as_deref().unwrap_or_default());
                    if let Some(mutation) = annotation.mutation {
                        element = element.attr("mutation", mutation.code());
                    }
                    element = element.attr("position", &position);
                    if token.anonymised {
                        element = element.attr("anon", "true");
                    }

                    writer.write(element)?;
                    writer.write(XmlEvent::characters(&token.text))?;
                    writer.write(XmlEvent::end_element())?;
                }

                writer.write(XmlEvent::end_element())?;
            }

            writer.write(XmlEvent::end_element())?;
        }

        writer.write(XmlEvent::end_element())?;
    }

    writer.write(XmlEvent::end_element())?;
    Ok(())
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|x| !x.is_empty()).map(ToOwned::to_owned)
}

fn read_token(node: roxmltree::Node, fallback: Position) -> Token {
    let position = node
        .attribute("position")
        .and_then(|x| x.parse().ok())
        .unwrap_or(fallback);

    let mut token = Token::new(
        node.text().unwrap_or_default(),
        position,
        node.attribute("anon") == Some("true"),
    );
    token.annotation = Annotation {
        lemma: non_empty(node.attribute("lemma")),
        basic_tag: non_empty(node.attribute("basic_pos")),
        rich_tag: non_empty(node.attribute("rich_pos")),
        mutation: node.attribute("mutation").and_then(Mutation::from_code),
        resolution: None,
    };
    token
}

fn elements<'a, 'input: 'a>(
    node: roxmltree::Node<'a, 'input>,
    name: &'static str,
) -> impl Iterator<Item = roxmltree::Node<'a, 'input>> {
    node.children()
        .filter(move |x| x.is_element() && x.tag_name().name() == name)
}

/// Groups runs of consecutive anonymised tokens into spans.
fn anonymised_spans(document: &TaggedDocument) -> Vec<AnonSpan> {
    let mut spans: Vec<AnonSpan> = Vec::new();
    let mut previous_anonymised = false;

    for token in document.tokens() {
        if token.anonymised && previous_anonymised {
            if let Some(span) = spans.last_mut() {
                span.end = token.position;
            }
        } else if token.anonymised {
            spans.push(AnonSpan {
                start: token.position,
                end: token.position,
            });
        }
        previous_anonymised = token.anonymised;
    }

    spans
}

/// Reads a document written by [write_xml]. Returns the corpus name and the document.
/// Resolutions are not part of the format, so they are left empty.
pub fn read_xml(text: &str) -> Result<(String, TaggedDocument), Error> {
    let xml = roxmltree::Document::parse(text)?;
    let corpus = xml.root_element();
    let name = corpus.attribute("name").unwrap_or_default().to_string();

    let mut document = TaggedDocument::new();
    let mut n_sentences = 0;

    for file_node in elements(corpus, "file") {
        let mut file = File {
            name: file_node.attribute("name").unwrap_or_default().to_string(),
            segments: Vec::new(),
        };

        for paragraph_node in elements(file_node, "paragraph") {
            let mut segment = Segment::default();

            for sentence_node in elements(paragraph_node, "sentence") {
                n_sentences += 1;
                let mut sentence = Sentence::default();

                for (i, token_node) in elements(sentence_node, "token").enumerate() {
                    sentence
                        .tokens
                        .push(read_token(token_node, Position::new(n_sentences, i + 1)));
                }

                sentence.text = sentence
                    .tokens
                    .iter()
                    .map(|x| x.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ");
                segment.sentences.push(sentence);
            }

            segment.text = segment
                .sentences
                .iter()
                .map(|x| x.text.as_str())
                .collect::<Vec<_>>()
                .join(" ");
            file.segments.push(segment);
        }

        document.files.push(file);
    }

    document.anonymised_spans = anonymised_spans(&document);
    Ok((name, document))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resolution;

    fn document() -> TaggedDocument {
        let annotated = |text: &str, position, lemma: &str, basic: &str, rich: &str| {
            let mut token = Token::new(text, position, false);
            token.annotation = Annotation {
                lemma: Some(lemma.into()),
                basic_tag: Some(basic.into()),
                rich_tag: Some(rich.into()),
                mutation: None,
                resolution: Some(Resolution::Engine),
            };
            token
        };

        let mut first = Sentence::new("Aeth Dafydd.");
        first.tokens = vec![
            annotated("Aeth", Position::new(1, 1), "mynd", "B", "Bgorff3u"),
            annotated("Dafydd", Position::new(1, 2), "Dafydd", "E", "Epg"),
            annotated(".", Position::new(1, 3), ".", "Atd", "Atdt"),
        ];
        first.tokens[1].anonymised = true;

        let mut second = Sentence::new("Choeden.");
        second.tokens = vec![annotated("choeden", Position::new(2, 1), "coeden", "E", "Ebu")];
        second.tokens[0].annotation.mutation = Some(Mutation::Aspirate);

        let mut segment = Segment::new("Aeth Dafydd. Choeden.");
        segment.sentences = vec![first, second];

        TaggedDocument {
            files: vec![File {
                name: "/tmp/mewnbwn/testun.txt".into(),
                segments: vec![segment],
            }],
            anonymised_spans: vec![AnonSpan {
                start: Position::new(1, 2),
                end: Position::new(1, 2),
            }],
        }
    }

    #[test]
    fn writes_tsv_rows() -> Result<(), Error> {
        let mut out = Vec::new();
        write_tsv(&document(), &mut out)?;
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "1\tAeth\t1,1\tmynd\tB\tBgorff3u\t");
        assert_eq!(lines[3], "4\tchoeden\t2,1\tcoeden\tE\tEbu\t+am");
        Ok(())
    }

    #[test]
    fn writes_nested_xml() -> Result<(), Error> {
        let mut out = Vec::new();
        write_xml(&document(), "prawf", &mut out)?;
        let out = String::from_utf8(out).unwrap();

        let xml = roxmltree::Document::parse(&out)?;
        let corpus = xml.root_element();
        assert_eq!(corpus.attribute("name"), Some("prawf"));

        let file = elements(corpus, "file").next().unwrap();
        assert_eq!(file.attribute("name"), Some("testun.txt"));

        let tokens: Vec<_> = xml
            .descendants()
            .filter(|x| x.has_tag_name("token"))
            .collect();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[1].attribute("anon"), Some("true"));
        assert_eq!(tokens[3].attribute("mutation"), Some("am"));
        assert_eq!(tokens[3].attribute("id"), Some("4"));
        assert_eq!(tokens[3].attribute("sent_id"), Some("1"));
        assert_eq!(tokens[3].text(), Some("choeden"));
        Ok(())
    }

    #[test]
    fn reads_written_xml() -> Result<(), Error> {
        let original = document();
        let mut out = Vec::new();
        write_xml(&original, "prawf", &mut out)?;

        let (name, document) = read_xml(&String::from_utf8(out).unwrap())?;
        assert_eq!(name, "prawf");
        assert_eq!(document.n_tokens(), 4);
        assert_eq!(document.anonymised_spans, original.anonymised_spans);

        let token = document.tokens().last().unwrap();
        assert_eq!(token.position, Position::new(2, 1));
        assert_eq!(token.annotation.lemma.as_deref(), Some("coeden"));
        assert_eq!(token.annotation.mutation, Some(Mutation::Aspirate));
        Ok(())
    }
}
