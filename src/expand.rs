//! Cartesian expansion of parsed templates.

use std::fmt;

use crate::template::{Template, Token};

/// One concrete word sequence produced from a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Expansion {
    words: Vec<String>,
}

impl Expansion {
    #[must_use]
    pub const fn new(words: Vec<String>) -> Self {
        Self { words }
    }

    /// Words in template order, one per template token.
    #[must_use]
    pub fn words(&self) -> &[String] {
        &self.words
    }

    #[must_use]
    pub fn into_words(self) -> Vec<String> {
        self.words
    }

    /// Sentence words: underscores become spaces and multi-word
    /// tokens are split into individual words.
    #[must_use]
    pub fn flatten(&self) -> Vec<String> {
        self.words
            .iter()
            .flat_map(|word| {
                word.split(|c: char| c == '_' || c.is_whitespace())
                    .filter(|w| !w.is_empty())
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}

impl fmt::Display for Expansion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.words.join(" "))
    }
}

/// Expand a template into every combination of its groups.
///
/// Groups nearer the front vary slowest: `A [ B1 B2 ] [ C1 C2 ]`
/// yields `A B1 C1`, `A B1 C2`, `A B2 C1`, `A B2 C2`. A template
/// without groups yields exactly one expansion.
///
/// The result size is the product of the group sizes; callers
/// guard against combinatorial blow-up.
#[must_use]
pub fn expand(template: &Template) -> Vec<Expansion> {
    let partials = template
        .tokens
        .iter()
        .fold(vec![Vec::new()], |partials: Vec<Vec<String>>, token| {
            match token {
                Token::Literal(word) => partials
                    .into_iter()
                    .map(|mut words| {
                        words.push(word.clone());
                        words
                    })
                    .collect(),
                Token::Group(alternatives) => {
                    let mut next = Vec::with_capacity(partials.len() * alternatives.len());
                    for words in &partials {
                        for alternative in alternatives {
                            let mut extended = Vec::with_capacity(words.len() + 1);
                            extended.extend_from_slice(words);
                            extended.push(alternative.clone());
                            next.push(extended);
                        }
                    }
                    next
                }
            }
        });

    partials.into_iter().map(Expansion::new).collect()
}
