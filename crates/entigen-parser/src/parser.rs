//! ast-grep wrapper for Java sources.

use ast_grep_core::Node;
use ast_grep_core::tree_sitter::StrDoc;
use ast_grep_language::SupportLang;

/// The concrete AST tree type returned by `parse_source`.
pub type AstTree = ast_grep_core::AstGrep<StrDoc<SupportLang>>;

/// Parse Java source into an ast-grep tree.
///
/// Parsing never fails: tree-sitter recovers from syntax errors by inserting
/// `ERROR` nodes, which [`count_syntax_errors`] reports.
#[must_use]
pub fn parse_source(source: &str) -> AstTree {
    use ast_grep_language::LanguageExt;
    SupportLang::Java.ast_grep(source)
}

/// Number of `ERROR` nodes below `node`.
pub fn count_syntax_errors<D: ast_grep_core::Doc>(node: &Node<D>) -> usize {
    let own = usize::from(node.kind().as_ref() == "ERROR");
    own + node
        .children()
        .map(|child| count_syntax_errors(&child))
        .sum::<usize>()
}

/// Whether `path` names a Java source file.
#[must_use]
pub fn is_java_file(path: &str) -> bool {
    path.rsplit('.').next() == Some("java") && path.contains('.')
}
