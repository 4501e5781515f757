use crate::tokenize::{TokenSet, TokenizeError};
use std::path::Path;
use tree_sitter::{Language, Node, Parser};

/// Languages the structure-aware tokenizer can parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxLanguage {
    Rust,
    TypeScript,
    Tsx,
    JavaScript,
    Jsx,
    Python,
    Go,
    Java,
    C,
    Cpp,
    CSharp,
    Ruby,
    Php,
}

/// Map a file extension to a parseable language
pub fn language_for_extension(ext: &str) -> Option<SyntaxLanguage> {
    match ext.to_lowercase().as_str() {
        "rs" => Some(SyntaxLanguage::Rust),
        "ts" => Some(SyntaxLanguage::TypeScript),
        "tsx" => Some(SyntaxLanguage::Tsx),
        "js" | "mjs" | "cjs" => Some(SyntaxLanguage::JavaScript),
        "jsx" => Some(SyntaxLanguage::Jsx),
        "py" => Some(SyntaxLanguage::Python),
        "go" => Some(SyntaxLanguage::Go),
        "java" => Some(SyntaxLanguage::Java),
        "c" | "h" => Some(SyntaxLanguage::C),
        "cpp" | "cc" | "cxx" | "hpp" => Some(SyntaxLanguage::Cpp),
        "cs" => Some(SyntaxLanguage::CSharp),
        "rb" => Some(SyntaxLanguage::Ruby),
        "php" => Some(SyntaxLanguage::Php),
        _ => None,
    }
}

/// Detect language from a file path's extension
pub fn language_for_path(path: &Path) -> Option<SyntaxLanguage> {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(language_for_extension)
}

fn tree_sitter_language(lang: SyntaxLanguage) -> Language {
    match lang {
        SyntaxLanguage::Rust => tree_sitter_rust::LANGUAGE.into(),
        SyntaxLanguage::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        SyntaxLanguage::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        SyntaxLanguage::JavaScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
        SyntaxLanguage::Jsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
        SyntaxLanguage::Python => tree_sitter_python::LANGUAGE.into(),
        SyntaxLanguage::Go => tree_sitter_go::LANGUAGE.into(),
        SyntaxLanguage::Java => tree_sitter_java::LANGUAGE.into(),
        SyntaxLanguage::C => tree_sitter_c::LANGUAGE.into(),
        SyntaxLanguage::Cpp => tree_sitter_cpp::LANGUAGE.into(),
        SyntaxLanguage::CSharp => tree_sitter_c_sharp::LANGUAGE.into(),
        SyntaxLanguage::Ruby => tree_sitter_ruby::LANGUAGE.into(),
        SyntaxLanguage::Php => tree_sitter_php::LANGUAGE_PHP.into(),
    }
}

/// Strip UTF-8 BOM if present
fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{FEFF}').unwrap_or(source)
}

/// Parse `source` and collect one canonical token per node of interest.
///
/// A tree with ERROR or MISSING nodes counts as a parse failure; the caller
/// decides what happens to the pair.
pub fn syntax_tokens(source: &str, lang: SyntaxLanguage) -> Result<TokenSet, TokenizeError> {
    let source = strip_bom(source);

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_language(lang))
        .map_err(|_| TokenizeError::Grammar(lang))?;

    let tree = parser.parse(source, None).ok_or_else(|| TokenizeError::Parse {
        language: lang,
        reason: "tree-sitter returned no tree".to_string(),
    })?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(TokenizeError::Parse {
            language: lang,
            reason: format!("syntax error near line {}", first_error_line(root)),
        });
    }

    let mut tokens = TokenSet::new();
    let mut cursor = root.walk();
    // Pre-order walk without recursion; deeply nested files stay off the stack
    'walk: loop {
        let node = cursor.node();
        if node.is_named() {
            if let Some(token) = canonical_token(node, source) {
                tokens.insert(token);
            }
        }

        if cursor.goto_first_child() {
            continue;
        }
        while !cursor.goto_next_sibling() {
            if !cursor.goto_parent() {
                break 'walk;
            }
        }
    }

    Ok(tokens)
}

/// 1-based line of the first ERROR or MISSING node
fn first_error_line(root: Node) -> usize {
    let mut node = root;
    'descend: while !(node.is_error() || node.is_missing()) {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.has_error() {
                node = child;
                continue 'descend;
            }
        }
        break;
    }
    node.start_position().row + 1
}

fn canonical_token(node: Node, source: &str) -> Option<String> {
    let kind = node.kind();

    if is_identifier(kind) {
        return Some("_id".to_string());
    }
    if is_literal(kind) {
        return Some("_val".to_string());
    }

    let token = match kind {
        "binary_expression" | "binary_operator" | "boolean_operator" | "comparison_operator"
        | "binary" | "unary_expression" | "unary_operator" | "not_operator" | "unary"
        | "prefix_unary_expression" | "postfix_unary_expression" | "unary_op_expression"
        | "update_expression" | "pointer_expression" => return operator_symbol(node, source),

        "assignment_statement" | "short_var_declaration" | "assignment_expression"
        | "compound_assignment_expr" | "augmented_assignment" | "augmented_assignment_expression"
        | "assignment" | "operator_assignment" => "=",

        "if_statement" | "if_expression" | "if" | "if_modifier" | "unless" => "if",

        "for_statement" | "for_expression" | "for_in_statement" | "for_range_loop"
        | "enhanced_for_statement" | "foreach_statement" | "while_statement"
        | "while_expression" | "loop_expression" | "do_statement" | "for" | "while" | "until"
        | "while_modifier" | "until_modifier" => "for",

        "return_statement" | "return_expression" | "return" => "return",

        "call_expression" | "call" | "method_invocation" | "invocation_expression"
        | "function_call_expression" | "member_call_expression" | "scoped_call_expression"
        | "macro_invocation" => "call",

        _ => return None,
    };
    Some(token.to_string())
}

fn is_identifier(kind: &str) -> bool {
    kind == "identifier"
        || kind.ends_with("_identifier")
        || matches!(
            kind,
            "constant" | "instance_variable" | "class_variable" | "global_variable" | "name"
        )
}

fn is_literal(kind: &str) -> bool {
    kind.ends_with("_literal")
        || matches!(
            kind,
            "string"
                | "template_string"
                | "encapsed_string"
                | "number"
                | "integer"
                | "float"
                | "true"
                | "false"
                | "none"
                | "null"
                | "nil"
                | "boolean"
                | "simple_symbol"
        )
}

/// The operator token of a binary or unary node.
///
/// Most grammars expose it as the `operator` field; the rest get the first
/// anonymous child that is not a bracket.
fn operator_symbol(node: Node, source: &str) -> Option<String> {
    if let Some(op) = node
        .child_by_field_name("operator")
        .or_else(|| node.child_by_field_name("operators"))
    {
        return op.utf8_text(source.as_bytes()).ok().map(str::to_string);
    }

    let mut cursor = node.walk();
    let symbol = node
        .children(&mut cursor)
        .find(|child| !child.is_named() && !matches!(child.kind(), "(" | ")" | "[" | "]"))
        .map(|child| child.kind().to_string());
    symbol
}
