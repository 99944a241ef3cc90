//! Go source parsing
//!
//! Thin layer over tree-sitter-go. A file is parsed once into a [`GoFile`];
//! the declaration and literal queries used by the rename planners live in
//! the submodules and operate on that parsed form. Only syntax is examined,
//! there is no type checking.

pub mod decls;
pub mod grammar;
pub mod literal;

use std::fs;
use std::path::{Path, PathBuf};

use tree_sitter::{Node, Tree};

use crate::error::{ObfuscateError, Result};
pub use decls::{DeclKind, Declaration};
pub use grammar::GO_GRAMMAR;
pub use literal::LiteralSite;

/// A parsed Go source file.
pub struct GoFile {
    path: PathBuf,
    source: String,
    tree: Tree,
}

impl std::fmt::Debug for GoFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoFile").field("path", &self.path).finish()
    }
}

impl GoFile {
    /// Read and parse a file from disk.
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        let source = String::from_utf8(bytes)
            .map_err(|_| ObfuscateError::parse(path, "source is not valid UTF-8"))?;
        Self::parse(path, source)
    }

    /// Parse in-memory source. Syntax errors do not fail here; callers that
    /// need a complete tree call [`GoFile::ensure_well_formed`].
    pub fn parse(path: &Path, source: String) -> Result<Self> {
        let mut parser = tree_sitter::Parser::new();
        parser
            .set_language(&tree_sitter_go::LANGUAGE.into())
            .map_err(|e| ObfuscateError::parse(path, format!("failed to load Go grammar: {:?}", e)))?;

        let tree = parser
            .parse(&source, None)
            .ok_or_else(|| ObfuscateError::parse(path, "parser produced no tree"))?;

        Ok(Self {
            path: path.to_path_buf(),
            source,
            tree,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub(crate) fn text(&self, node: &Node) -> &str {
        node_text(node, &self.source)
    }

    /// Fail with a `ParseFailure` naming the first error position.
    pub fn ensure_well_formed(&self) -> Result<()> {
        let root = self.root();
        if !root.has_error() {
            return Ok(());
        }
        let mut first: Option<Node> = None;
        visit_all(&root, |node| {
            if first.is_none() && (node.is_error() || node.is_missing()) {
                first = Some(*node);
            }
        });
        let message = match first {
            Some(node) => {
                let pos = node.start_position();
                format!("syntax error at {}:{}", pos.row + 1, pos.column + 1)
            }
            None => "syntax error".to_string(),
        };
        Err(ObfuscateError::parse(&self.path, message))
    }

    /// Text of every comment positioned before the `package` clause.
    pub fn header_comments(&self) -> Vec<&str> {
        let root = self.root();
        let mut cursor = root.walk();
        let mut comments = Vec::new();
        for child in root.children(&mut cursor) {
            if child.kind() == GO_GRAMMAR.package_clause {
                break;
            }
            if child.kind() == GO_GRAMMAR.comment {
                comments.push(self.text(&child));
            }
        }
        comments
    }

    pub fn package_name(&self) -> Option<&str> {
        let root = self.root();
        let mut cursor = root.walk();
        let clause = root
            .children(&mut cursor)
            .find(|c| c.kind() == GO_GRAMMAR.package_clause)?;
        let mut inner = clause.walk();
        let name = clause.named_children(&mut inner).next()?;
        Some(node_text(&name, &self.source))
    }

    /// Import paths declared by this file, unquoted.
    pub fn imports(&self) -> Vec<String> {
        let root = self.root();
        let mut specs = Vec::new();
        let mut cursor = root.walk();
        for child in root.children(&mut cursor) {
            if child.kind() == GO_GRAMMAR.import_decl {
                collect_specs(&child, GO_GRAMMAR.import_spec, &mut specs);
            }
        }

        specs
            .iter()
            .filter_map(|spec| spec.child_by_field_name("path"))
            .filter_map(|path| literal::unquote(self.text(&path)))
            .filter_map(|bytes| String::from_utf8(bytes).ok())
            .collect()
    }
}

/// Get text content of a node
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or("")
}

/// Visit all nodes in a tree with a visitor function (iterative to avoid stack overflow)
pub fn visit_all<'t, F>(node: &Node<'t>, mut visitor: F)
where
    F: FnMut(&Node<'t>),
{
    let mut cursor = node.walk();
    let mut did_visit_children = false;

    loop {
        if !did_visit_children {
            visitor(&cursor.node());
            if cursor.goto_first_child() {
                continue;
            }
        }

        if cursor.goto_next_sibling() {
            did_visit_children = false;
            continue;
        }

        if !cursor.goto_parent() {
            break;
        }
        did_visit_children = true;
        if cursor.node() == *node {
            break;
        }
    }
}

/// Collect spec nodes of `kind` under a declaration, descending through
/// parenthesized spec lists but never into spec bodies.
pub(crate) fn collect_specs<'t>(decl: &Node<'t>, kind: &str, out: &mut Vec<Node<'t>>) {
    let mut cursor = decl.walk();
    for child in decl.named_children(&mut cursor) {
        if child.kind() == kind {
            out.push(child);
        } else if GO_GRAMMAR.is_spec_list(child.kind()) {
            collect_specs(&child, kind, out);
        }
    }
}
