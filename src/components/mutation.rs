//! Undoing Welsh initial consonant mutations.

use crate::{
    types::{Mutation, MutationHypothesis},
    utils,
};

/// A rule `mutated -> base`: a word starting with `base` may appear starting with `mutated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRule {
    pub mutated: &'static str,
    pub base: &'static str,
    pub mutation: Mutation,
}

const fn rule(mutated: &'static str, base: &'static str, mutation: Mutation) -> MutationRule {
    MutationRule {
        mutated,
        base,
        mutation,
    }
}

const RULES: &[MutationRule] = &[
    rule("ch", "c", Mutation::Aspirate),
    rule("ph", "p", Mutation::Aspirate),
    rule("th", "t", Mutation::Aspirate),
    rule("ngh", "c", Mutation::Nasal),
    rule("mh", "p", Mutation::Nasal),
    rule("nh", "t", Mutation::Nasal),
    rule("ng", "g", Mutation::Nasal),
    rule("m", "b", Mutation::Nasal),
    rule("n", "d", Mutation::Nasal),
    rule("g", "c", Mutation::Soft),
    rule("b", "p", Mutation::Soft),
    rule("d", "t", Mutation::Soft),
    rule("f", "b", Mutation::Soft),
    rule("f", "m", Mutation::Soft),
    rule("l", "ll", Mutation::Soft),
    rule("r", "rh", Mutation::Soft),
    rule("dd", "d", Mutation::Soft),
    rule("ha", "a", Mutation::HProthesis),
    rule("he", "e", Mutation::HProthesis),
    rule("hi", "i", Mutation::HProthesis),
    rule("ho", "o", Mutation::HProthesis),
    rule("hu", "u", Mutation::HProthesis),
    rule("hw", "w", Mutation::HProthesis),
    rule("hy", "y", Mutation::HProthesis),
];

/// Words which look h-prothesised but never are.
const NOT_PROTHESISED: &[&str] = &["hyn"];

/// Enumerates the unmutated forms a token may have been derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationResolver;

impl MutationResolver {
    pub fn new() -> Self {
        MutationResolver
    }

    pub fn rules(&self) -> &'static [MutationRule] {
        RULES
    }

    /// All mutation hypotheses for `token`, in rule order. Soft mutation of an initial `g`
    /// (which drops the letter) is always hypothesised. If the token starts uppercase,
    /// every hypothesis is repeated with an uppercase first letter.
    pub fn resolve(&self, token: &str) -> Vec<MutationHypothesis> {
        if token.is_empty() {
            return Vec::new();
        }

        let lower = token.to_lowercase();
        let mut hypotheses: Vec<_> = RULES
            .iter()
            .filter(|rule| lower.starts_with(rule.mutated))
            .filter(|rule| {
                rule.mutation != Mutation::HProthesis || !NOT_PROTHESISED.contains(&lower.as_str())
            })
            .map(|rule| {
                MutationHypothesis::new(
                    format!("{}{}", rule.base, &lower[rule.mutated.len()..]),
                    rule.mutation,
                )
            })
            .collect();

        hypotheses.push(MutationHypothesis::new(
            format!("g{}", lower),
            Mutation::Soft,
        ));

        if utils::starts_uppercase(token) {
            let capitalized: Vec<_> = hypotheses
                .iter()
                .map(|x| MutationHypothesis::new(utils::capitalize(&x.form), x.mutation))
                .collect();
            hypotheses.extend(capitalized);
        }

        hypotheses
    }
}
