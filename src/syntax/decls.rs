//! Declaration queries over a parsed Go file
//!
//! Go's declaration structure nests names inside spec nodes
//! (`type_declaration > type_spec`, `var_declaration > var_spec`), and
//! parenthesized groups may add a list wrapper depending on the grammar
//! release. These helpers flatten that into plain [`Declaration`] records.

use serde::Serialize;
use tree_sitter::Node;

use super::{collect_specs, visit_all, GoFile, GO_GRAMMAR};

/// Kind of a program-defined name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Function,
    Type,
    Var,
    Const,
    Method,
}

/// A declared name found in a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    /// Receiver base type, for methods only
    pub receiver: Option<String>,
    /// 1-based line of the declared name
    pub line: usize,
}

impl GoFile {
    /// Package-level functions (no receiver), types, vars and consts.
    pub fn top_level_declarations(&self) -> Vec<Declaration> {
        let root = self.root();
        let mut out = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            let kind = child.kind();
            if kind == GO_GRAMMAR.function_decl {
                if let Some(name) = child.child_by_field_name("name") {
                    out.push(self.declaration(&name, DeclKind::Function, None));
                }
            } else if kind == GO_GRAMMAR.type_decl {
                let mut type_cursor = child.walk();
                for spec in child.named_children(&mut type_cursor) {
                    if !GO_GRAMMAR.is_type_spec(spec.kind()) {
                        continue;
                    }
                    if let Some(name) = spec.child_by_field_name("name") {
                        out.push(self.declaration(&name, DeclKind::Type, None));
                    }
                }
            } else if kind == GO_GRAMMAR.var_decl || kind == GO_GRAMMAR.const_decl {
                let decl_kind = if kind == GO_GRAMMAR.var_decl {
                    DeclKind::Var
                } else {
                    DeclKind::Const
                };
                let mut specs = Vec::new();
                for spec_kind in GO_GRAMMAR.value_specs {
                    collect_specs(&child, spec_kind, &mut specs);
                }
                for spec in specs {
                    let mut name_cursor = spec.walk();
                    for name in spec.children_by_field_name("name", &mut name_cursor) {
                        out.push(self.declaration(&name, decl_kind, None));
                    }
                }
            }
        }
        out
    }

    /// Method declarations with their receiver base type names.
    ///
    /// Receivers whose base type cannot be determined syntactically are
    /// reported with `receiver: None`.
    pub fn method_declarations(&self) -> Vec<Declaration> {
        let root = self.root();
        let mut out = Vec::new();
        let mut cursor = root.walk();

        for child in root.children(&mut cursor) {
            if child.kind() != GO_GRAMMAR.method_decl {
                continue;
            }
            let Some(name) = child.child_by_field_name("name") else {
                continue;
            };
            let receiver = child
                .child_by_field_name("receiver")
                .and_then(|params| {
                    let mut params_cursor = params.walk();
                    let param = params
                        .named_children(&mut params_cursor)
                        .find(|p| p.kind() == GO_GRAMMAR.parameter_decl)?;
                    param.child_by_field_name("type")
                })
                .and_then(|ty| self.receiver_base_type(&ty));
            out.push(self.declaration(&name, DeclKind::Method, receiver));
        }
        out
    }

    /// Plain names of every method listed in any interface type in the file,
    /// named or anonymous, at any nesting depth.
    pub fn interface_method_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        visit_all(&self.root(), |node| {
            if node.kind() != GO_GRAMMAR.interface_type {
                return;
            }
            let mut cursor = node.walk();
            for member in node.named_children(&mut cursor) {
                if !GO_GRAMMAR.is_interface_method(member.kind()) {
                    continue;
                }
                if let Some(name) = member.child_by_field_name("name") {
                    names.push(self.text(&name).to_string());
                }
            }
        });
        names
    }

    /// True when any import of this file is the cgo pseudo-package `"C"`.
    pub fn uses_cgo(&self) -> bool {
        self.imports().iter().any(|path| path == "C")
    }

    fn declaration(&self, name: &Node, kind: DeclKind, receiver: Option<String>) -> Declaration {
        Declaration {
            name: self.text(name).to_string(),
            kind,
            receiver,
            line: name.start_position().row + 1,
        }
    }

    /// Strip pointer, parentheses and type arguments from a receiver type.
    fn receiver_base_type(&self, ty: &Node) -> Option<String> {
        let kind = ty.kind();
        if kind == GO_GRAMMAR.type_identifier {
            return Some(self.text(ty).to_string());
        }
        if kind == GO_GRAMMAR.generic_type {
            return ty
                .child_by_field_name("type")
                .and_then(|inner| self.receiver_base_type(&inner));
        }
        if kind == GO_GRAMMAR.pointer_type || kind == GO_GRAMMAR.parenthesized_type {
            let mut cursor = ty.walk();
            let inner = ty.named_children(&mut cursor).next()?;
            return self.receiver_base_type(&inner);
        }
        None
    }
}
