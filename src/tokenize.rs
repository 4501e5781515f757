use crate::syntax::{self, SyntaxLanguage};
use clap::ValueEnum;
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;

/// Distinct normalized tokens of one file.
pub type TokenSet = BTreeSet<String>;

/// Default cap on how much of a file the line tokenizer looks at.
pub const DEFAULT_MAX_LINE_CHARS: usize = 10_000;

/// Keywords the generic tokenizer keeps instead of folding to `_id`.
const KEYWORDS: &[&str] = &[
    "if", "else", "for", "while", "return", "switch", "case", "func", "var", "let", "const",
    "class", "struct", "import", "package", "public", "private", "protected", "def", "end",
    "do", "try", "catch", "finally",
];

/// Lexer branches shared by both quote styles; `$quote` is the single-quote rule.
macro_rules! generic_lexer {
    ($quote:literal) => {
        concat!(
            r"(?s)(?P<comment>/\*.*?\*/|//[^\n]*|#[^\n]*)",
            r#"|(?P<str>"(?:\\.|[^"\\])*"|`[^`]*`|"#,
            $quote,
            ")",
            r"|(?P<num>\d[\d_]*(?:\.\d+)?(?:[eE][+-]?\d+)?\w*)",
            r"|(?P<word>\w+)",
            r"|(?P<sym>[^\w\s])",
        )
    };
}

/// `'x'` and `'\n'` only, so lifetimes and apostrophes in prose stay tokens.
static GENERIC_LEXER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(generic_lexer!(r"'(?:\\.[^'\n]{0,9}|[^'\\\n])'"))
        .expect("generic lexer pattern is valid")
});

/// Single-quoted strings of any length, for languages that have them.
static QUOTED_LEXER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(generic_lexer!(r"'(?:\\.|[^'\\\n])*'"))
        .expect("quoted lexer pattern is valid")
});

/// Extensions whose single-quoted literals are strings rather than chars.
const SINGLE_QUOTED_STRINGS: &[&str] = &[
    "py", "js", "mjs", "cjs", "jsx", "ts", "tsx", "rb", "php", "yaml", "yml", "html", "css",
    "sql", "sh",
];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_]\w*$").expect("identifier pattern is valid"));

static RAW_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Za-z_][A-Za-z0-9_]*|\d+|[{}()\[\];.,=+\-*/<>!&|^%]")
        .expect("raw token pattern is valid")
});

/// Tokenizer selection as configured for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Strategy {
    /// Syntax tokens when both files have a grammar, generic tokens otherwise
    Auto,
    /// Comment-stripping lexer with identifier and literal folding
    #[default]
    Generic,
    /// Node kinds from a tree-sitter parse
    Syntax,
    /// Word runs and punctuation, no normalization
    Raw,
    /// Trimmed lines compared by overlap
    Lines,
}

/// What a tokenizer produces; the scorer follows from the variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenRepr {
    Set(TokenSet),
    Lines(Vec<String>),
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenizeError {
    #[error("no grammar for {}", .0.display())]
    UnsupportedLanguage(std::path::PathBuf),

    #[error("failed to load {0:?} grammar")]
    Grammar(SyntaxLanguage),

    #[error("could not parse as {language:?}: {reason}")]
    Parse {
        language: SyntaxLanguage,
        reason: String,
    },
}

/// A concrete tokenizer, resolved from a [`Strategy`] for one pair of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tokenizer {
    Generic,
    StructureAware,
    RawLexical,
    LineBased { max_chars: usize },
}

impl Tokenizer {
    /// Pick the tokenizer both files of a pair will use.
    pub fn for_pair(strategy: Strategy, a: &Path, b: &Path, max_line_chars: usize) -> Self {
        match strategy {
            // Node kinds only line up within one grammar
            Strategy::Auto => {
                match (syntax::language_for_path(a), syntax::language_for_path(b)) {
                    (Some(lang_a), Some(lang_b)) if lang_a == lang_b => Tokenizer::StructureAware,
                    _ => Tokenizer::Generic,
                }
            }
            Strategy::Generic => Tokenizer::Generic,
            Strategy::Syntax => Tokenizer::StructureAware,
            Strategy::Raw => Tokenizer::RawLexical,
            Strategy::Lines => Tokenizer::LineBased {
                max_chars: max_line_chars,
            },
        }
    }

    /// Tokenize one file. `path` only matters for picking a grammar.
    pub fn tokenize(&self, path: &Path, content: &str) -> Result<TokenRepr, TokenizeError> {
        match self {
            Tokenizer::Generic => Ok(TokenRepr::Set(generic_tokens_for(path, content))),
            Tokenizer::RawLexical => Ok(TokenRepr::Set(raw_tokens(content))),
            Tokenizer::LineBased { max_chars } => {
                Ok(TokenRepr::Lines(line_tokens(content, *max_chars)))
            }
            Tokenizer::StructureAware => {
                let language = syntax::language_for_path(path)
                    .ok_or_else(|| TokenizeError::UnsupportedLanguage(path.to_path_buf()))?;
                syntax::syntax_tokens(content, language).map(TokenRepr::Set)
            }
        }
    }
}

/// Lex `content`, drop comments, fold literals and identifiers.
///
/// Single quotes only delimit char literals here; see [`generic_tokens_for`].
pub fn generic_tokens(content: &str) -> TokenSet {
    lex_generic(&GENERIC_LEXER, content)
}

/// [`generic_tokens`], with single-quoted strings for the languages that use them.
pub fn generic_tokens_for(path: &Path, content: &str) -> TokenSet {
    let quoted = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            SINGLE_QUOTED_STRINGS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        });
    if quoted {
        lex_generic(&QUOTED_LEXER, content)
    } else {
        lex_generic(&GENERIC_LEXER, content)
    }
}

fn lex_generic(lexer: &Regex, content: &str) -> TokenSet {
    let mut tokens = TokenSet::new();
    for caps in lexer.captures_iter(content) {
        if caps.name("comment").is_some() {
            continue;
        }
        if caps.name("str").is_some() {
            tokens.insert("_str".to_string());
        } else if caps.name("num").is_some() {
            tokens.insert("_num".to_string());
        } else if let Some(word) = caps.name("word") {
            tokens.insert(normalize_word(word.as_str()));
        } else if let Some(sym) = caps.name("sym") {
            tokens.insert(sym.as_str().to_string());
        }
    }
    tokens
}

fn normalize_word(word: &str) -> String {
    let lower = word.to_lowercase();
    if KEYWORDS.contains(&lower.as_str()) {
        lower
    } else if IDENTIFIER.is_match(word) {
        "_id".to_string()
    } else {
        word.to_string()
    }
}

/// Word runs and single punctuation characters, verbatim.
pub fn raw_tokens(content: &str) -> TokenSet {
    RAW_TOKEN
        .find_iter(content)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Trimmed lines of the first `max_chars` characters of `content`.
pub fn line_tokens(content: &str, max_chars: usize) -> Vec<String> {
    let head = match content.char_indices().nth(max_chars) {
        Some((cut, _)) => &content[..cut],
        None => content,
    };
    head.split('\n').map(|line| line.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(tokens: &[&str]) -> TokenSet {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_generic_assignment() {
        assert_eq!(generic_tokens("x = 1"), set(&["_id", "=", "_num"]));
    }

    #[test]
    fn test_generic_keywords_kept_lowercase() {
        let tokens = generic_tokens("IF (a) Return b");
        assert!(tokens.contains("if"));
        assert!(tokens.contains("return"));
        assert!(tokens.contains("_id"));
        assert!(!tokens.contains("a"));
    }

    #[test]
    fn test_generic_func_vs_package() {
        assert_eq!(
            generic_tokens("func f(){}"),
            set(&["func", "_id", "(", ")", "{", "}"])
        );
        assert_eq!(generic_tokens("package main"), set(&["package", "_id"]));
    }

    #[test]
    fn test_generic_strips_comments() {
        let tokens = generic_tokens("a // while\n/* for\nclass */ b # do");
        assert_eq!(tokens, set(&["_id"]));
    }

    #[test]
    fn test_generic_string_hides_comment_markers() {
        let tokens = generic_tokens(r#"url = "http://example.com" # note"#);
        assert_eq!(tokens, set(&["_id", "=", "_str"]));
    }

    #[test]
    fn test_generic_literals() {
        let tokens = generic_tokens(r#"f('c', "s\"q", 3.14, 0xFF, 1e9)"#);
        assert_eq!(tokens, set(&["_id", "(", ")", ",", "_str", "_num"]));
    }

    #[test]
    fn test_generic_apostrophes_are_not_strings() {
        let tokens = generic_tokens("Don't panic if it's late");
        assert!(tokens.contains("if"));
        assert!(tokens.contains("'"));
        assert!(!tokens.contains("_str"));

        let tokens = generic_tokens("fn f<'a>(x: &'a str) -> char { '\\'' }");
        for expected in ["(", ")", ":", "&", "<", ">", "_str"] {
            assert!(tokens.contains(expected), "missing {expected} in {tokens:?}");
        }
    }

    #[test]
    fn test_generic_single_quoted_strings_by_extension() {
        let source = "name = 'it is # not a comment'";
        assert_eq!(
            generic_tokens_for(Path::new("a.py"), source),
            set(&["_id", "=", "_str"])
        );
        // A lone quote starts no literal, so `#` opens a comment
        assert_eq!(
            generic_tokens_for(Path::new("a.rs"), source),
            set(&["_id", "=", "'"])
        );
        assert_eq!(
            Tokenizer::Generic.tokenize(Path::new("b.JS"), source).unwrap(),
            TokenRepr::Set(set(&["_id", "=", "_str"]))
        );
    }

    #[test]
    fn test_generic_renaming_is_invisible() {
        let a = generic_tokens("let total = count + 1;");
        let b = generic_tokens("let sum = n + 2;");
        assert_eq!(a, b);
    }

    #[test]
    fn test_generic_empty() {
        assert!(generic_tokens("").is_empty());
        assert!(generic_tokens("// only a comment").is_empty());
    }

    #[test]
    fn test_raw_tokens() {
        let tokens = raw_tokens("let x = 42; // hi");
        assert_eq!(
            tokens,
            set(&["let", "x", "=", "42", ";", "/", "hi"])
        );
    }

    #[test]
    fn test_line_tokens_trim() {
        assert_eq!(
            line_tokens("  a  \n\tb\r\n", DEFAULT_MAX_LINE_CHARS),
            vec!["a", "b", ""]
        );
    }

    #[test]
    fn test_line_tokens_truncate() {
        let content = "x".repeat(20) + "\nrest";
        assert_eq!(line_tokens(&content, 5), vec!["xxxxx"]);
    }

    #[test]
    fn test_line_tokens_truncate_on_char_boundary() {
        assert_eq!(line_tokens("héllo", 2), vec!["hé"]);
    }

    #[test]
    fn test_for_pair() {
        let go = Path::new("a.go");
        let other_go = Path::new("src/b.GO");
        let py = Path::new("b.py");
        let txt = Path::new("c.txt");
        assert_eq!(
            Tokenizer::for_pair(Strategy::Auto, go, other_go, 10),
            Tokenizer::StructureAware
        );
        assert_eq!(
            Tokenizer::for_pair(Strategy::Auto, go, py, 10),
            Tokenizer::Generic
        );
        assert_eq!(
            Tokenizer::for_pair(Strategy::Auto, go, txt, 10),
            Tokenizer::Generic
        );
        assert_eq!(
            Tokenizer::for_pair(Strategy::Lines, go, txt, 10),
            Tokenizer::LineBased { max_chars: 10 }
        );
        assert_eq!(
            Tokenizer::for_pair(Strategy::Raw, go, txt, 10),
            Tokenizer::RawLexical
        );
    }

    #[test]
    fn test_structure_aware_unsupported_extension() {
        let err = Tokenizer::StructureAware
            .tokenize(Path::new("notes.txt"), "hello")
            .unwrap_err();
        assert!(matches!(err, TokenizeError::UnsupportedLanguage(_)));
    }

    #[test]
    fn test_tokenize_dispatch() {
        let path = Path::new("x.txt");
        assert_eq!(
            Tokenizer::Generic.tokenize(path, "x = 1").unwrap(),
            TokenRepr::Set(set(&["_id", "=", "_num"]))
        );
        assert_eq!(
            Tokenizer::LineBased { max_chars: 100 }
                .tokenize(path, "a\nb")
                .unwrap(),
            TokenRepr::Lines(vec!["a".to_string(), "b".to_string()])
        );
    }
}
