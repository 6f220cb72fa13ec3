//! Word tokens
//!
//! The parser hands the expander one [`WordToken`] per word: a sequence of
//! typed parts plus the three flags that tell the pipeline which of the
//! later steps apply. Parts record whether they came from quoted source so
//! field splitting and pathname expansion can exempt them.

/// One word to expand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordToken {
    pub parts: Vec<WordPart>,
    /// Steps 1-4 apply (tilde, parameter, command subst, arithmetic).
    pub expand: bool,
    /// Step 5 applies (field splitting).
    pub split: bool,
    /// Step 6 applies (pathname expansion).
    pub glob: bool,
}

impl WordToken {
    /// A token carrying arbitrary parts with the full pipeline enabled.
    pub fn new(parts: Vec<WordPart>) -> Self {
        Self {
            parts,
            expand: true,
            split: true,
            glob: true,
        }
    }

    /// A fully quoted literal word; no pipeline step applies.
    pub fn literal(text: impl Into<String>) -> Self {
        Self {
            parts: vec![WordPart::quoted(PartKind::Literal(text.into()))],
            expand: false,
            split: false,
            glob: false,
        }
    }

    pub fn without_split(mut self) -> Self {
        self.split = false;
        self
    }

    pub fn without_glob(mut self) -> Self {
        self.glob = false;
        self
    }
}

/// One part of a word, with quoting provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordPart {
    pub kind: PartKind,
    pub quoted: bool,
}

impl WordPart {
    pub fn unquoted(kind: PartKind) -> Self {
        Self {
            kind,
            quoted: false,
        }
    }

    pub fn quoted(kind: PartKind) -> Self {
        Self { kind, quoted: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartKind {
    /// Verbatim text.
    Literal(String),
    /// `$name`, `${name}` or a modifier form. Special parameters keep their
    /// one-character names (`?`, `-`, `$`, `!`, `#`, `@`, `*`) and
    /// positionals their decimal names.
    Parameter {
        name: String,
        modifier: Option<Modifier>,
    },
    /// `$( ... )` or backticks; the nested command text.
    CommandSubst(String),
    /// `$(( ... ))`; the expression text.
    Arithmetic(String),
    /// `~`, `~+`, `~-` or `~user`; the text between the tilde and the first
    /// slash.
    Tilde(String),
}

/// A `${name<op>word}` modifier. The word is raw source text, expanded
/// lazily only when the modifier needs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    pub op: ModOp,
    pub word: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModOp {
    /// `${name-word}` / `${name:-word}`
    UseDefault { colon: bool },
    /// `${name=word}` / `${name:=word}`
    AssignDefault { colon: bool },
    /// `${name?word}` / `${name:?word}`
    ErrorIfUnset { colon: bool },
    /// `${name+word}` / `${name:+word}`
    UseAlternate { colon: bool },
    /// `${#name}`
    Length,
    /// `${name#pat}` / `${name##pat}`
    RemovePrefix { longest: bool },
    /// `${name%pat}` / `${name%%pat}`
    RemoveSuffix { longest: bool },
}
