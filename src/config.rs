use crate::record::{DEFAULT_SEPARATOR, Filter};

/// Run settings shared by the library entry points and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Column separator of the output file.
    pub separator: char,
    /// Records containing all of these words are not written.
    pub filter: Filter,
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR,
            filter: Filter::default(),
        }
    }

    #[must_use]
    pub const fn separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// Set the filter from a whitespace-separated word list.
    #[must_use]
    pub fn filter(mut self, words: &str) -> Self {
        self.filter = Filter::parse(words);
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
