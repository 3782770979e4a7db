//! Whitespace tokenizer and command-line splitting.

use cmdtree_diagnostics::Span;

/// A token that borrows its text directly from the raw line.
///
/// `text` is always exactly `&input[start..end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Borrowed slice of the raw line.
    pub text: &'a str,
    /// Byte offset of the first character.
    pub start: usize,
    /// Byte offset one past the last character.
    pub end: usize,
}

impl Token<'_> {
    /// Byte span of this token.
    pub fn span(&self) -> Span {
        Span::new(self.start, self.end)
    }
}

/// Split `input` on Unicode whitespace.
pub fn tokenize(input: &str) -> Vec<Token<'_>> {
    let mut toks = Vec::new();
    let mut start = None;
    for (i, c) in input.char_indices() {
        match (c.is_whitespace(), start) {
            (true, Some(s)) => {
                toks.push(Token {
                    text: &input[s..i],
                    start: s,
                    end: i,
                });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        toks.push(Token {
            text: &input[s..],
            start: s,
            end: input.len(),
        });
    }
    toks
}

/// A raw line split into command name and argument tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine<'a> {
    raw: &'a str,
    name: Token<'a>,
    args: Vec<Token<'a>>,
    trailing_space: bool,
}

impl<'a> CommandLine<'a> {
    /// Split `raw` into name and arguments. An optional leading `/` on the
    /// name is dropped. Returns `None` for a blank line.
    pub fn parse(raw: &'a str) -> Option<Self> {
        let mut toks = tokenize(raw).into_iter();
        let first = toks.next()?;
        let name = match first.text.strip_prefix('/') {
            Some(rest) => Token {
                text: rest,
                start: first.start + 1,
                end: first.end,
            },
            None => first,
        };
        Some(Self {
            raw,
            name,
            args: toks.collect(),
            trailing_space: raw.ends_with(char::is_whitespace),
        })
    }

    /// The raw line.
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    /// Command name without the leading `/`.
    pub fn name(&self) -> &'a str {
        self.name.text
    }

    /// Argument tokens.
    pub fn args(&self) -> &[Token<'a>] {
        &self.args
    }

    /// Argument texts.
    pub fn arg_texts(&self) -> Vec<&'a str> {
        self.args.iter().map(|t| t.text).collect()
    }

    /// Whether the line ends in whitespace (the caller has started a new token).
    pub fn has_trailing_space(&self) -> bool {
        self.trailing_space
    }

    /// Argument texts for completion: an empty pending token is appended when
    /// the line ends in whitespace, so `"tp "` completes the first argument.
    pub fn completion_tokens(&self) -> Vec<&'a str> {
        let mut toks = self.arg_texts();
        if self.trailing_space {
            toks.push("");
        }
        toks
    }

    /// Span of the command name, including any leading `/`.
    pub fn name_span(&self) -> Span {
        let start = if self.raw[..self.name.start].ends_with('/') {
            self.name.start - 1
        } else {
            self.name.start
        };
        Span::new(start, self.name.end)
    }

    /// Span from the start of the name to the end of the last token.
    pub fn full_span(&self) -> Span {
        let end = self.args.last().map_or(self.name.end, |t| t.end);
        self.name_span().cover(Span::empty(end))
    }

    /// Span of every argument from index `consumed` on, or a zero-width span
    /// after the last token if all arguments were consumed.
    pub fn unconsumed_span(&self, consumed: usize) -> Span {
        match (self.args.get(consumed), self.args.last()) {
            (Some(first), Some(last)) => Span::new(first.start, last.end),
            _ => Span::empty(self.full_span().end),
        }
    }
}
