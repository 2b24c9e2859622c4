use std::fmt;

/// Classifies a parse error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `]` with no open group.
    UnmatchedCloseBracket,
    /// `[` while a group is already open.
    NestedBracket,
    /// End of line reached inside a group.
    UnclosedBracket,
    /// `[ ]` with no alternatives.
    EmptyGroup,
    /// Block-open marker inside a block.
    NestedBlock,
    /// Block-close marker with no open block.
    UnmatchedBlockClose,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnmatchedCloseBracket => {
                write!(f, "unbalanced brackets: ']' without matching '['")
            }
            Self::NestedBracket => {
                write!(f, "unbalanced brackets: '[' inside an open group")
            }
            Self::UnclosedBracket => {
                write!(f, "too many open brackets")
            }
            Self::EmptyGroup => {
                write!(f, "empty alternative group")
            }
            Self::NestedBlock => {
                write!(f, "nested pattern blocks")
            }
            Self::UnmatchedBlockClose => {
                write!(f, "unbalanced pattern block (no open block)")
            }
        }
    }
}

/// Error produced while parsing a template line or the block structure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// 1-based input line. Standalone [`parse_template`] calls report line 1.
    pub line: usize,
}

impl ParseError {
    #[must_use]
    pub const fn new(kind: ParseErrorKind, line: usize) -> Self {
        Self { kind, line }
    }

    /// Relocate the error to a line of the input file.
    #[must_use]
    pub const fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }
}

/// One position of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A word copied into every expansion.
    Literal(String),
    /// Mutually exclusive alternatives; never empty.
    Group(Vec<String>),
}

impl Token {
    /// Number of choices this token contributes to the cartesian product.
    #[must_use]
    pub const fn arity(&self) -> usize {
        match self {
            Self::Literal(_) => 1,
            Self::Group(alternatives) => alternatives.len(),
        }
    }
}

/// A parsed template line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Template {
    pub tokens: Vec<Token>,
}

impl Template {
    /// Number of expansions this template produces.
    ///
    /// Saturates instead of overflowing on absurdly large products.
    #[must_use]
    pub fn expansion_count(&self) -> usize {
        self.tokens
            .iter()
            .fold(1usize, |acc, token| acc.saturating_mul(token.arity()))
    }

    #[must_use]
    pub fn group_count(&self) -> usize {
        self.tokens
            .iter()
            .filter(|token| matches!(token, Token::Group(_)))
            .count()
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Token::Literal(word) => f.write_str(word)?,
                Token::Group(alternatives) => write!(f, "[ {} ]", alternatives.join(" "))?,
            }
        }
        Ok(())
    }
}

/// Surround every bracket with spaces so `[a b]` splits like `[ a b ]`.
#[must_use]
pub fn pad_brackets(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + 8);
    for ch in input.chars() {
        if ch == '[' || ch == ']' {
            out.push(' ');
            out.push(ch);
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}

/// Parse one template line into literal and group tokens.
///
/// # Errors
///
/// Returns `ParseError` when brackets are unbalanced, nested,
/// or enclose no alternatives.
pub fn parse_template(input: &str) -> Result<Template, ParseError> {
    let padded = pad_brackets(input);
    let mut tokens = Vec::new();
    let mut group: Option<Vec<String>> = None;

    for word in padded.split_whitespace() {
        match word {
            "[" => {
                if group.is_some() {
                    return Err(ParseError::new(ParseErrorKind::NestedBracket, 1));
                }
                group = Some(Vec::new());
            }
            "]" => {
                let Some(alternatives) = group.take() else {
                    return Err(ParseError::new(ParseErrorKind::UnmatchedCloseBracket, 1));
                };
                if alternatives.is_empty() {
                    return Err(ParseError::new(ParseErrorKind::EmptyGroup, 1));
                }
                tokens.push(Token::Group(alternatives));
            }
            _ => match group.as_mut() {
                Some(alternatives) => alternatives.push(word.to_string()),
                None => tokens.push(Token::Literal(word.to_string())),
            },
        }
    }

    if group.is_some() {
        return Err(ParseError::new(ParseErrorKind::UnclosedBracket, 1));
    }

    Ok(Template { tokens })
}
