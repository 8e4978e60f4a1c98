//! The closed tag set: which rich tags collapse into which basic tag, and which morphological
//! atoms a rich tag is written as in engine readings.

use lazy_static::lazy_static;
use std::collections::HashMap;

/// Basic tag of proper nouns.
pub const PROPER_NOUN_BASIC: &str = "E";
/// Proper noun of unspecified gender.
pub const PROPER_NOUN: &str = "Ep";
pub const PROPER_NOUN_MASCULINE: &str = "Epg";
pub const PROPER_NOUN_FEMININE: &str = "Epb";
/// Basic and rich tag of tokens no reading survived for.
pub const UNKNOWN_TAG: &str = "unk";

const TAG_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "E",
        &[
            "Egu", "Ebu", "Egll", "Ebll", "Egbu", "Egbll", "Ep", "Epg", "Epb",
        ],
    ),
    (
        "Ar",
        &[
            "Arsym", "Ar1u", "Ar2u", "Ar3gu", "Ar3bu", "Ar1ll", "Ar2ll", "Ar3ll",
        ],
    ),
    ("Cys", &["Cyscyd", "Cysis"]),
    (
        "Rhi",
        &[
            "Rhifol", "Rhifold", "Rhifolt", "Rhitref", "Rhitrefd", "Rhitreft",
        ],
    ),
    (
        "Ans",
        &["Anscadu", "Anscadbu", "Anscadll", "Anscyf", "Anscym", "Anseith"],
    ),
    (
        "B",
        &[
            "Be",
            "Bpres1u",
            "Bpres2u",
            "Bpres3u",
            "Bpres1ll",
            "Bpres2ll",
            "Bpres3ll",
            "Bpresamhers",
            "Bpres3perth",
            "Bpres3amhen",
            "Bdyf1u",
            "Bdyf2u",
            "Bdyf3u",
            "Bdyf1ll",
            "Bdyf2ll",
            "Bdyf3ll",
            "Bdyfamhers",
            "Bgorb1u",
            "Bgorb2u",
            "Bgorb3u",
            "Bgorb1ll",
            "Bgorb2ll",
            "Bgorb3ll",
            "Bgorbamhers",
            "Bamherff1u",
            "Bamherff2u",
            "Bamherff3u",
            "Bamherff1ll",
            "Bamherff2ll",
            "Bamherff3ll",
            "Bamherffamhers",
            "Bgorff1u",
            "Bgorff2u",
            "Bgorff3u",
            "Bgorff1ll",
            "Bgorff2ll",
            "Bgorff3ll",
            "Bgorffamhers",
            "Bgorffsef",
            "Bgorch2u",
            "Bgorch3u",
            "Bgorch1ll",
            "Bgorch2ll",
            "Bgorch3ll",
            "Bgorchamhers",
            "Bdibdyf1u",
            "Bdibdyf2u",
            "Bdibdyf3u",
            "Bdibdyf1ll",
            "Bdibdyf2ll",
            "Bdibdyf3ll",
            "Bdibdyfamhers",
            "Bamod1u",
            "Bamod2u",
            "Bamod3u",
            "Bamod1ll",
            "Bamod2ll",
            "Bamod3ll",
            "Bamodamhers",
        ],
    ),
    (
        "Rha",
        &[
            "Rhapers1u",
            "Rhapers2u",
            "Rhapers3gu",
            "Rhapers3bu",
            "Rhapers1ll",
            "Rhapers2ll",
            "Rhapers3ll",
            "Rhadib1u",
            "Rhadib2u",
            "Rhadib3gu",
            "Rhadib3bu",
            "Rhadib1ll",
            "Rhadib2ll",
            "Rhadib3ll",
            "Rhamedd1u",
            "Rhamedd2u",
            "Rhamedd3gu",
            "Rhamedd3bu",
            "Rhamedd1ll",
            "Rhamedd2ll",
            "Rhamedd3ll",
            "Rhacys1u",
            "Rhacys2u",
            "Rhacys3gu",
            "Rhacys3bu",
            "Rhacys1ll",
            "Rhacys2ll",
            "Rhacys3ll",
            "Rhagof",
            "Rhadangg",
            "Rhadangb",
            "Rhadangd",
            "Rhaperth",
            "Rhaatb",
            "Rhacil",
        ],
    ),
    ("U", &["U", "Uneg", "Ucad", "Ugof", "Utra", "Uberf"]),
    (
        "Gw",
        &[
            "Gwest", "Gwfform", "Gwsym", "Gwacr", "Gwtalf", "Gwdig", "Gwllyth", "Gwann",
        ],
    ),
    (
        "Atd",
        &["Atdt", "Atdcan", "Atdchw", "Atdde", "Atdcys", "Atddyf"],
    ),
    ("YFB", &["YFB"]),
    ("Adf", &["Adf"]),
    ("Ebych", &["Ebych"]),
];

/// Tags which consist of several atoms. All other tags are written as a single atom.
const DECOMPOSITIONS: &[(&str, &[&str])] = &[
    ("Egu", &["E", "g", "u"]),
    ("Ebu", &["E", "b", "u"]),
    ("Egll", &["E", "g", "ll"]),
    ("Ebll", &["E", "b", "ll"]),
    ("Egbu", &["E", "gb", "u"]),
    ("Egbll", &["E", "gb", "ll"]),
    ("Ep", &["E", "p"]),
    ("Epg", &["E", "p", "g"]),
    ("Epb", &["E", "p", "b"]),
    ("Arsym", &["Ar", "sym"]),
    ("Ar1u", &["Ar", "1", "u"]),
    ("Ar2u", &["Ar", "2", "u"]),
    ("Ar3gu", &["Ar", "3", "g", "u"]),
    ("Ar3bu", &["Ar", "3", "b", "u"]),
    ("Ar1ll", &["Ar", "1", "ll"]),
    ("Ar2ll", &["Ar", "2", "ll"]),
    ("Ar3ll", &["Ar", "3", "ll"]),
    ("Cyscyd", &["Cys", "cyd"]),
    ("Cysis", &["Cys", "is"]),
    ("Rhifol", &["Rhi", "fol"]),
    ("Rhifold", &["Rhi", "fol", "d"]),
    ("Rhifolt", &["Rhi", "fol", "t"]),
    ("Rhitref", &["Rhi", "tref"]),
    ("Rhitrefd", &["Rhi", "tref", "d"]),
    ("Rhitreft", &["Rhi", "tref", "t"]),
    ("Anscadu", &["Ans", "cad", "u"]),
    ("Anscadbu", &["Ans", "cad", "b", "u"]),
    ("Anscadll", &["Ans", "cad", "ll"]),
    ("Anscyf", &["Ans", "cyf"]),
    ("Anscym", &["Ans", "cym"]),
    ("Anseith", &["Ans", "eith"]),
    ("Be", &["B", "e"]),
    ("Bpres1u", &["B", "pres", "1", "u"]),
    ("Bpres2u", &["B", "pres", "2", "u"]),
    ("Bpres3u", &["B", "pres", "3", "u"]),
    ("Bpres1ll", &["B", "pres", "1", "ll"]),
    ("Bpres2ll", &["B", "pres", "2", "ll"]),
    ("Bpres3ll", &["B", "pres", "3", "ll"]),
    ("Bpresamhers", &["B", "pres", "amhers"]),
    ("Bpres3perth", &["B", "pres", "3", "perth"]),
    ("Bpres3amhen", &["B", "pres", "3", "amhen"]),
    ("Bdyf1u", &["B", "dyf", "1", "u"]),
    ("Bdyf2u", &["B", "dyf", "2", "u"]),
    ("Bdyf3u", &["B", "dyf", "3", "u"]),
    ("Bdyf1ll", &["B", "dyf", "1", "ll"]),
    ("Bdyf2ll", &["B", "dyf", "2", "ll"]),
    ("Bdyf3ll", &["B", "dyf", "3", "ll"]),
    ("Bdyfamhers", &["B", "dyf", "amhers"]),
    ("Bgorb1u", &["B", "gorb", "1", "u"]),
    ("Bgorb2u", &["B", "gorb", "2", "u"]),
    ("Bgorb3u", &["B", "gorb", "3", "u"]),
    ("Bgorb1ll", &["B", "gorb", "1", "ll"]),
    ("Bgorb2ll", &["B", "gorb", "2", "ll"]),
    ("Bgorb3ll", &["B", "gorb", "3", "ll"]),
    ("Bgorbamhers", &["B", "gorb", "amhers"]),
    ("Bamherff1u", &["B", "amherff", "1", "u"]),
    ("Bamherff2u", &["B", "amherff", "2", "u"]),
    ("Bamherff3u", &["B", "amherff", "3", "u"]),
    ("Bamherff1ll", &["B", "amherff", "1", "ll"]),
    ("Bamherff2ll", &["B", "amherff", "2", "ll"]),
    ("Bamherff3ll", &["B", "amherff", "3", "ll"]),
    ("Bamherffamhers", &["B", "amherff", "amhers"]),
    ("Bgorff1u", &["B", "gorff", "1", "u"]),
    ("Bgorff2u", &["B", "gorff", "2", "u"]),
    ("Bgorff3u", &["B", "gorff", "3", "u"]),
    ("Bgorff1ll", &["B", "gorff", "1", "ll"]),
    ("Bgorff2ll", &["B", "gorff", "2", "ll"]),
    ("Bgorff3ll", &["B", "gorff", "3", "ll"]),
    ("Bgorffamhers", &["B", "gorff", "amhers"]),
    ("Bgorffsef", &["B", "gorff", "sef"]),
    ("Bgorch2u", &["B", "gorch", "2", "u"]),
    ("Bgorch3u", &["B", "gorch", "3", "u"]),
    ("Bgorch1ll", &["B", "gorch", "1", "ll"]),
    ("Bgorch2ll", &["B", "gorch", "2", "ll"]),
    ("Bgorch3ll", &["B", "gorch", "3", "ll"]),
    ("Bgorchamhers", &["B", "gorch", "amhers"]),
    ("Bdibdyf1u", &["B", "dibdyf", "1", "u"]),
    ("Bdibdyf2u", &["B", "dibdyf", "2", "u"]),
    ("Bdibdyf3u", &["B", "dibdyf", "3", "u"]),
    ("Bdibdyf1ll", &["B", "dibdyf", "1", "ll"]),
    ("Bdibdyf2ll", &["B", "dibdyf", "2", "ll"]),
    ("Bdibdyf3ll", &["B", "dibdyf", "3", "ll"]),
    ("Bdibdyfamhers", &["B", "dibdyf", "amhers"]),
    ("Bamod1u", &["B", "amod", "1", "u"]),
    ("Bamod2u", &["B", "amod", "2", "u"]),
    ("Bamod3u", &["B", "amod", "3", "u"]),
    ("Bamod1ll", &["B", "amod", "1", "ll"]),
    ("Bamod2ll", &["B", "amod", "2", "ll"]),
    ("Bamod3ll", &["B", "amod", "3", "ll"]),
    ("Bamodamhers", &["B", "amod", "amhers"]),
    ("Rhapers1u", &["Rha", "pers", "1", "u"]),
    ("Rhapers2u", &["Rha", "pers", "2", "u"]),
    ("Rhapers3gu", &["Rha", "pers", "3", "g", "u"]),
    ("Rhapers3bu", &["Rha", "pers", "3", "b", "u"]),
    ("Rhapers1ll", &["Rha", "pers", "1", "ll"]),
    ("Rhapers2ll", &["Rha", "pers", "2", "ll"]),
    ("Rhapers3ll", &["Rha", "pers", "3", "ll"]),
    ("Rhadib1u", &["Rha", "dib", "1", "u"]),
    ("Rhadib2u", &["Rha", "dib", "2", "u"]),
    ("Rhadib3gu", &["Rha", "dib", "3", "g", "u"]),
    ("Rhadib3bu", &["Rha", "dib", "3", "b", "u"]),
    ("Rhadib1ll", &["Rha", "dib", "1", "ll"]),
    ("Rhadib2ll", &["Rha", "dib", "2", "ll"]),
    ("Rhadib3ll", &["Rha", "dib", "3", "ll"]),
    ("Rhamedd1u", &["Rha", "medd", "1", "u"]),
    ("Rhamedd2u", &["Rha", "medd", "2", "u"]),
    ("Rhamedd3gu", &["Rha", "medd", "3", "g", "u"]),
    ("Rhamedd3bu", &["Rha", "medd", "3", "b", "u"]),
    ("Rhamedd1ll", &["Rha", "medd", "1", "ll"]),
    ("Rhamedd2ll", &["Rha", "medd", "2", "ll"]),
    ("Rhamedd3ll", &["Rha", "medd", "3", "ll"]),
    ("Rhacys1u", &["Rha", "cys", "1", "u"]),
    ("Rhacys2u", &["Rha", "cys", "2", "u"]),
    ("Rhacys3gu", &["Rha", "cys", "3", "g", "u"]),
    ("Rhacys3bu", &["Rha", "cys", "3", "b", "u"]),
    ("Rhacys1ll", &["Rha", "cys", "1", "ll"]),
    ("Rhacys2ll", &["Rha", "cys", "2", "ll"]),
    ("Rhacys3ll", &["Rha", "cys", "3", "ll"]),
    ("Rhagof", &["Rha", "gof"]),
    ("Rhadangg", &["Rha", "dang", "g"]),
    ("Rhadangb", &["Rha", "dang", "b"]),
    ("Rhadangd", &["Rha", "dang", "d"]),
    ("Rhaperth", &["Rha", "perth"]),
    ("Rhaatb", &["Rha", "atb"]),
    ("Rhacil", &["Rha", "cil"]),
    ("Uneg", &["U", "neg"]),
    ("Ucad", &["U", "cad"]),
    ("Ugof", &["U", "gof"]),
    ("Utra", &["U", "tra"]),
    ("Uberf", &["U", "berf"]),
    ("Gwest", &["Gw", "est"]),
    ("Gwfform", &["Gw", "fform"]),
    ("Gwsym", &["Gw", "sym"]),
    ("Gwacr", &["Gw", "acr"]),
    ("Gwtalf", &["Gw", "talf"]),
    ("Gwdig", &["Gw", "dig"]),
    ("Gwllyth", &["Gw", "llyth"]),
    ("Gwann", &["Gw", "ann"]),
    ("Atdt", &["Atd", "t"]),
    ("Atdcan", &["Atd", "can"]),
    ("Atdchw", &["Atd", "chw"]),
    ("Atdde", &["Atd", "de"]),
    ("Atdcys", &["Atd", "cys"]),
    ("Atddyf", &["Atd", "dyf"]),
];

/// Rich tag to basic tag mapping and rich tag decomposition.
pub struct TagTaxonomy {
    basic: HashMap<&'static str, &'static str>,
    atoms: HashMap<&'static str, &'static [&'static str]>,
    legal_pairs: Vec<String>,
}

lazy_static! {
    static ref TAXONOMY: TagTaxonomy = TagTaxonomy::build();
}

impl TagTaxonomy {
    pub fn get() -> &'static TagTaxonomy {
        &TAXONOMY
    }

    fn build() -> Self {
        let mut basic = HashMap::new();
        let mut legal_pairs = Vec::new();

        for (category, rich_tags) in TAG_CATEGORIES {
            // a basic tag stands for itself when it is used as a rich tag e. g. by the lexicon
            basic.insert(*category, *category);
            legal_pairs.push(format!("{}:{}", category, category));

            for rich in rich_tags.iter() {
                basic.insert(*rich, *category);
                if rich != category {
                    legal_pairs.push(format!("{}:{}", category, rich));
                }
            }
        }

        TagTaxonomy {
            basic,
            atoms: DECOMPOSITIONS.iter().cloned().collect(),
            legal_pairs,
        }
    }

    pub fn contains(&self, rich_tag: &str) -> bool {
        self.basic.contains_key(rich_tag)
    }

    /// Gets the basic tag of a rich tag. Tags outside the taxonomy are their own category.
    pub fn basic_tag<'a>(&self, rich_tag: &'a str) -> &'a str {
        match self.basic.get(rich_tag) {
            Some(basic) => basic,
            None => rich_tag,
        }
    }

    /// Splits a rich tag into its morphological atoms e. g. `Egu` into `E g u`.
    pub fn decompose<'a>(&self, rich_tag: &'a str) -> Vec<&'a str> {
        match self.atoms.get(rich_tag) {
            Some(atoms) => atoms.to_vec(),
            None => vec![rich_tag],
        }
    }

    /// Inverse of [decompose][TagTaxonomy::decompose].
    pub fn compose<S: AsRef<str>>(&self, atoms: &[S]) -> String {
        atoms.iter().map(|x| x.as_ref()).collect()
    }

    /// All rich tags in the taxonomy.
    pub fn rich_tags(&self) -> impl Iterator<Item = &'static str> + '_ {
        TAG_CATEGORIES
            .iter()
            .flat_map(|(_, rich_tags)| rich_tags.iter().cloned())
    }

    /// All `basic:rich` pairs a token may be annotated with, in canonical order.
    pub fn legal_pairs(&self) -> &[String] {
        &self.legal_pairs
    }

    pub fn is_legal_pair(&self, basic_tag: &str, rich_tag: &str) -> bool {
        self.basic
            .get(rich_tag)
            .map_or(false, |basic| *basic == basic_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_decomposition_is_categorized() {
        let taxonomy = TagTaxonomy::get();
        for (rich, atoms) in DECOMPOSITIONS {
            assert!(taxonomy.contains(rich), "{} has no basic tag", rich);
            assert_eq!(taxonomy.compose(atoms), *rich);
            assert_eq!(taxonomy.basic_tag(rich), atoms[0]);
        }
    }

    #[test]
    fn decomposes_and_falls_back_to_itself() {
        let taxonomy = TagTaxonomy::get();
        assert_eq!(taxonomy.decompose("Rhapers3gu"), vec!["Rha", "pers", "3", "g", "u"]);
        assert_eq!(taxonomy.decompose("Adf"), vec!["Adf"]);
        assert_eq!(taxonomy.decompose("Xyz"), vec!["Xyz"]);
        assert_eq!(taxonomy.basic_tag("Xyz"), "Xyz");
    }

    #[test]
    fn legal_pairs_contain_category_and_rich_pairs() {
        let taxonomy = TagTaxonomy::get();
        let pairs = taxonomy.legal_pairs();
        assert_eq!(pairs[0], "E:E");
        assert!(pairs.contains(&"Atd:Atdt".to_string()));
        assert!(pairs.contains(&"U:U".to_string()));
        assert_eq!(pairs.iter().filter(|x| *x == "U:U").count(), 1);
        assert!(taxonomy.is_legal_pair("B", "Be"));
        assert!(!taxonomy.is_legal_pair("E", "Be"));
    }
}
