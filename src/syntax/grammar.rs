//! Go grammar node mappings
//!
//! Every tree-sitter node kind the analyzers look at is named here, so the
//! rest of the crate never spells grammar strings inline. Alternatives cover
//! node names that changed between tree-sitter-go releases.

/// tree-sitter-go node kinds used for declaration, import and literal lookup
#[derive(Debug, Clone)]
pub struct GoGrammar {
    pub comment: &'static str,
    pub package_clause: &'static str,

    // =========================================================================
    // Top-level declarations
    // =========================================================================
    pub function_decl: &'static str,
    pub method_decl: &'static str,
    pub type_decl: &'static str,
    /// `type T ...` and `type T = ...`
    pub type_specs: &'static [&'static str],
    pub var_decl: &'static str,
    pub const_decl: &'static str,
    pub var_spec: &'static str,
    pub value_specs: &'static [&'static str],
    /// Parenthesized spec groups; some releases wrap them in a list node
    pub spec_lists: &'static [&'static str],

    // =========================================================================
    // Imports
    // =========================================================================
    pub import_decl: &'static str,
    pub import_spec: &'static str,

    // =========================================================================
    // Types
    // =========================================================================
    pub interface_type: &'static str,
    /// Method members of an interface (`method_elem`, formerly `method_spec`)
    pub interface_methods: &'static [&'static str],
    pub parameter_decl: &'static str,
    pub type_identifier: &'static str,
    pub pointer_type: &'static str,
    pub generic_type: &'static str,
    pub parenthesized_type: &'static str,
    pub field_decl: &'static str,

    // =========================================================================
    // Literals
    // =========================================================================
    pub string_literals: &'static [&'static str],
    /// Right-hand side of a `var_spec`
    pub expression_list: &'static str,
    /// Ancestors under which a string literal must stay a compile-time constant
    pub constant_contexts: &'static [&'static str],
}

pub static GO_GRAMMAR: GoGrammar = GoGrammar {
    comment: "comment",
    package_clause: "package_clause",
    function_decl: "function_declaration",
    method_decl: "method_declaration",
    type_decl: "type_declaration",
    type_specs: &["type_spec", "type_alias"],
    var_decl: "var_declaration",
    const_decl: "const_declaration",
    var_spec: "var_spec",
    value_specs: &["var_spec", "const_spec"],
    spec_lists: &["var_spec_list", "const_spec_list", "import_spec_list"],
    import_decl: "import_declaration",
    import_spec: "import_spec",
    interface_type: "interface_type",
    interface_methods: &["method_elem", "method_spec"],
    parameter_decl: "parameter_declaration",
    type_identifier: "type_identifier",
    pointer_type: "pointer_type",
    generic_type: "generic_type",
    parenthesized_type: "parenthesized_type",
    field_decl: "field_declaration",
    string_literals: &["interpreted_string_literal", "raw_string_literal"],
    expression_list: "expression_list",
    constant_contexts: &["const_declaration", "import_spec", "array_type"],
};

impl GoGrammar {
    pub fn is_type_spec(&self, kind: &str) -> bool {
        self.type_specs.contains(&kind)
    }

    pub fn is_value_spec(&self, kind: &str) -> bool {
        self.value_specs.contains(&kind)
    }

    pub fn is_spec_list(&self, kind: &str) -> bool {
        self.spec_lists.contains(&kind)
    }

    pub fn is_interface_method(&self, kind: &str) -> bool {
        self.interface_methods.contains(&kind)
    }

    pub fn is_string_literal(&self, kind: &str) -> bool {
        self.string_literals.contains(&kind)
    }

    pub fn is_constant_context(&self, kind: &str) -> bool {
        self.constant_contexts.contains(&kind)
    }
}
