//! C++ frontend building a `ProgramModel` with tree-sitter.
//!
//! Class extraction tracks access specifiers through each class body so
//! method signatures carry their real access level. Function bodies are
//! reduced to a call tree: member calls become `Call` nodes with their
//! receiver resolved from the enclosing scope (parameters and local
//! declarations), and every construct that owns nested code becomes a
//! `Scope` node so nothing is lost to nesting.

use std::collections::HashMap;
use std::path::Path;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor};

use crate::model::{
    base_type_name, Access, BodyNode, CallSite, ClassDecl, FunctionDecl, MethodSig,
    ProgramModel, Span,
};

const CLASS_QUERY: &str = r#"
; Class definitions (default access private)
(class_specifier
  name: (type_identifier) @name
  body: (field_declaration_list)
) @class

; Struct definitions (default access public)
(struct_specifier
  name: (type_identifier) @name
  body: (field_declaration_list)
) @struct
"#;

const FUNCTION_QUERY: &str = r#"
(function_definition) @function
"#;

/// Node kinds that own nested code and become `Scope` nodes.
const SCOPE_KINDS: &[&str] = &[
    "compound_statement",
    "if_statement",
    "else_clause",
    "for_statement",
    "for_range_loop",
    "while_statement",
    "do_statement",
    "switch_statement",
    "case_statement",
    "lambda_expression",
    "try_statement",
    "catch_clause",
];

/// A parsed translation unit, kept alive for node text extraction.
struct ParsedUnit {
    tree: tree_sitter::Tree,
    source: Vec<u8>,
}

impl ParsedUnit {
    fn node_text(&self, node: Node) -> &str {
        node.utf8_text(&self.source).unwrap_or("")
    }
}

pub struct CppModelBuilder {
    language: Language,
}

impl CppModelBuilder {
    pub fn new() -> Self {
        Self {
            language: tree_sitter_cpp::LANGUAGE.into(),
        }
    }

    fn create_parser(&self) -> anyhow::Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(&self.language)?;
        Ok(parser)
    }

    /// Parse `source` and build the full program model.
    pub fn build(&self, path: &Path, source: &[u8]) -> anyhow::Result<ProgramModel> {
        let mut parser = self.create_parser()?;
        let tree = parser
            .parse(source, None)
            .ok_or_else(|| anyhow::anyhow!("failed to parse C++ source: {}", path.display()))?;

        let unit = ParsedUnit {
            tree,
            source: source.to_vec(),
        };

        // Classes first: function extraction resolves receiver types
        // against the class set.
        let classes = self.extract_classes(&unit)?;
        let mut model = ProgramModel {
            functions: Vec::new(),
            classes,
        };
        let functions = self.extract_functions(&unit, &model)?;
        model.functions = functions;
        Ok(model)
    }

    fn extract_classes(&self, unit: &ParsedUnit) -> anyhow::Result<Vec<ClassDecl>> {
        let query = Query::new(&self.language, CLASS_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, unit.tree.root_node(), &unit.source[..]);

        let mut classes = Vec::new();
        while let Some(m) = matches.next() {
            let mut name = "";
            let mut class_node = None;
            let mut default_access = Access::Private;

            for capture in m.captures {
                match query.capture_names()[capture.index as usize] {
                    "name" => name = unit.node_text(capture.node),
                    "class" => {
                        class_node = Some(capture.node);
                        default_access = Access::Private;
                    }
                    "struct" => {
                        class_node = Some(capture.node);
                        default_access = Access::Public;
                    }
                    _ => {}
                }
            }

            if name.is_empty() {
                continue;
            }
            if let Some(node) = class_node {
                let prefix = qualified_prefix(unit, node);
                let qualified = if prefix.is_empty() {
                    name.to_string()
                } else {
                    format!("{}::{}", prefix, name)
                };
                let methods = self.extract_methods(unit, node, &qualified, default_access);
                classes.push(ClassDecl {
                    qualified_name: qualified,
                    methods,
                    span: span_of(node),
                });
            }
        }

        classes.sort_by_key(|c| (c.span.line, c.span.column));
        Ok(classes)
    }

    /// Collect method signatures from a class body, tracking the access
    /// level as specifier labels go by.
    fn extract_methods(
        &self,
        unit: &ParsedUnit,
        class_node: Node,
        class_qualified: &str,
        default_access: Access,
    ) -> Vec<MethodSig> {
        let body = match class_node.child_by_field_name("body") {
            Some(b) => b,
            None => return Vec::new(),
        };

        let mut access = default_access;
        let mut methods = Vec::new();
        let mut cursor = body.walk();
        for child in body.children(&mut cursor) {
            match child.kind() {
                "access_specifier" => {
                    let label = unit.node_text(child);
                    access = if label.starts_with("public") {
                        Access::Public
                    } else if label.starts_with("protected") {
                        Access::Protected
                    } else {
                        Access::Private
                    };
                }
                "field_declaration" | "function_definition" | "declaration" => {
                    if let Some(m) =
                        self.method_from_declaration(unit, child, class_qualified, access)
                    {
                        methods.push(m);
                    }
                }
                "template_declaration" => {
                    let mut inner_cursor = child.walk();
                    let inner = child
                        .named_children(&mut inner_cursor)
                        .find(|n| matches!(n.kind(), "function_definition" | "declaration"));
                    if let Some(n) = inner {
                        if let Some(m) =
                            self.method_from_declaration(unit, n, class_qualified, access)
                        {
                            methods.push(m);
                        }
                    }
                }
                _ => {}
            }
        }
        methods
    }

    /// Build a method signature from a member declaration or inline
    /// definition. Returns `None` for fields, constructors, destructors
    /// and operators.
    fn method_from_declaration(
        &self,
        unit: &ParsedUnit,
        node: Node,
        class_qualified: &str,
        access: Access,
    ) -> Option<MethodSig> {
        let declarator = node.child_by_field_name("declarator")?;
        let (func_decl, ptr_suffix) = find_function_declarator(declarator)?;

        let name_node = func_decl.child_by_field_name("declarator")?;
        if !matches!(name_node.kind(), "identifier" | "field_identifier") {
            return None;
        }
        let name = unit.node_text(name_node);

        // Constructors and destructors have no declared type.
        let type_node = node.child_by_field_name("type")?;
        let base = unit.node_text(type_node);
        let return_type = if ptr_suffix.is_empty() {
            base.to_string()
        } else {
            format!("{} {}", base, ptr_suffix)
        };

        Some(MethodSig {
            qualified_name: format!("{}::{}", class_qualified, name),
            access,
            is_const: has_const_qualifier(unit, func_decl),
            is_static: has_static_specifier(unit, node),
            return_type,
            span: span_of(node),
        })
    }

    fn extract_functions(
        &self,
        unit: &ParsedUnit,
        model: &ProgramModel,
    ) -> anyhow::Result<Vec<FunctionDecl>> {
        let query = Query::new(&self.language, FUNCTION_QUERY)?;
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&query, unit.tree.root_node(), &unit.source[..]);

        let mut functions = Vec::new();
        while let Some(m) = matches.next() {
            for capture in m.captures {
                if let Some(f) = self.extract_function(unit, capture.node, model) {
                    functions.push(f);
                }
            }
        }

        functions.sort_by_key(|f| (f.span.line, f.span.column));
        Ok(functions)
    }

    /// Build one function, including inline methods and out-of-line
    /// qualified definitions.
    fn extract_function(
        &self,
        unit: &ParsedUnit,
        node: Node,
        model: &ProgramModel,
    ) -> Option<FunctionDecl> {
        let declarator = node.child_by_field_name("declarator")?;
        let (func_decl, _) = find_function_declarator(declarator)?;

        let name_node = func_decl.child_by_field_name("declarator")?;
        if !matches!(
            name_node.kind(),
            "identifier" | "field_identifier" | "qualified_identifier"
        ) {
            return None;
        }
        let name = unit.node_text(name_node);
        let prefix = qualified_prefix(unit, node);
        let qualified_name = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}::{}", prefix, name)
        };

        // Parameter types as written; named parameters seed the receiver
        // scope for call resolution.
        let mut params = Vec::new();
        let mut scope: HashMap<String, String> = HashMap::new();
        if let Some(list) = func_decl.child_by_field_name("parameters") {
            let mut cursor = list.walk();
            for p in list.named_children(&mut cursor) {
                if !matches!(
                    p.kind(),
                    "parameter_declaration" | "optional_parameter_declaration"
                ) {
                    continue;
                }
                let (ty, pname) = parameter_parts(unit, p);
                if let Some(pname) = &pname {
                    if let Some(resolved) = resolve_receiver_type(model, &ty) {
                        scope.insert(pname.clone(), resolved);
                    }
                }
                params.push(ty);
            }
        }

        let body = node
            .child_by_field_name("body")
            .map(|b| self.build_children(unit, b, &mut scope, model))
            .unwrap_or_default();

        Some(FunctionDecl {
            qualified_name,
            params,
            body,
            span: span_of(node),
        })
    }

    fn build_children(
        &self,
        unit: &ParsedUnit,
        node: Node,
        scope: &mut HashMap<String, String>,
        model: &ProgramModel,
    ) -> Vec<BodyNode> {
        let mut out = Vec::new();
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.build_node(unit, child, scope, model, &mut out);
        }
        out
    }

    fn build_node(
        &self,
        unit: &ParsedUnit,
        node: Node,
        scope: &mut HashMap<String, String>,
        model: &ProgramModel,
        out: &mut Vec<BodyNode>,
    ) {
        match node.kind() {
            "comment" => {}
            "declaration" => {
                self.record_locals(unit, node, scope, model);
                // Initializers may contain calls.
                out.extend(self.build_children(unit, node, scope, model));
            }
            "call_expression" => match self.member_call(unit, node, scope, model) {
                Some(call) => out.push(call),
                None => out.extend(self.build_children(unit, node, scope, model)),
            },
            kind if SCOPE_KINDS.contains(&kind) => {
                out.push(BodyNode::Scope(
                    self.build_children(unit, node, scope, model),
                ));
            }
            _ => out.extend(self.build_children(unit, node, scope, model)),
        }
    }

    /// Turn `x->method(...)` / `x.method(...)` into a `Call` node. The
    /// receiver and argument subexpressions become children so chained
    /// and nested calls stay reachable.
    fn member_call(
        &self,
        unit: &ParsedUnit,
        node: Node,
        scope: &mut HashMap<String, String>,
        model: &ProgramModel,
    ) -> Option<BodyNode> {
        let function = node.child_by_field_name("function")?;
        if function.kind() != "field_expression" {
            return None;
        }
        let receiver_expr = function.child_by_field_name("argument")?;
        let field = function.child_by_field_name("field")?;
        let method_name = unit.node_text(field);

        let receiver = if receiver_expr.kind() == "identifier" {
            scope
                .get(unit.node_text(receiver_expr))
                .cloned()
                .unwrap_or_default()
        } else {
            // Unresolvable receiver expression; the site is kept so
            // traversal still descends, but it matches no target.
            String::new()
        };

        let method = if receiver.is_empty() {
            method_name.to_string()
        } else {
            format!("{}::{}", receiver, method_name)
        };

        let mut children = Vec::new();
        self.build_node(unit, receiver_expr, scope, model, &mut children);
        if let Some(args) = node.child_by_field_name("arguments") {
            children.extend(self.build_children(unit, args, scope, model));
        }

        Some(BodyNode::Call {
            site: CallSite { method, receiver },
            children,
        })
    }

    /// Record local variable declarations into the receiver scope.
    fn record_locals(
        &self,
        unit: &ParsedUnit,
        decl: Node,
        scope: &mut HashMap<String, String>,
        model: &ProgramModel,
    ) {
        let type_text = match decl.child_by_field_name("type") {
            Some(t) => unit.node_text(t).to_string(),
            None => return,
        };
        let resolved = match resolve_receiver_type(model, &type_text) {
            Some(r) => r,
            None => return,
        };

        let mut cursor = decl.walk();
        for declarator in decl.children_by_field_name("declarator", &mut cursor) {
            let target = if declarator.kind() == "init_declarator" {
                declarator.child_by_field_name("declarator")
            } else {
                Some(declarator)
            };
            if let Some(id) = target.and_then(innermost_identifier) {
                scope.insert(unit.node_text(id).to_string(), resolved.clone());
            }
        }
    }
}

impl Default for CppModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Qualified-name prefix from enclosing namespaces and class bodies.
fn qualified_prefix(unit: &ParsedUnit, node: Node) -> String {
    let mut segments = Vec::new();
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "namespace_definition" | "class_specifier" | "struct_specifier" => {
                if let Some(name) = n.child_by_field_name("name") {
                    segments.push(unit.node_text(name).to_string());
                }
            }
            _ => {}
        }
        current = n.parent();
    }
    segments.reverse();
    segments.join("::")
}

/// Descend a declarator chain to the `function_declarator`, collecting
/// pointer/reference tokens as the return-type suffix.
fn find_function_declarator(node: Node) -> Option<(Node, String)> {
    let mut suffix = String::new();
    let mut current = Some(node);
    while let Some(n) = current {
        match n.kind() {
            "function_declarator" => return Some((n, suffix)),
            "pointer_declarator" => suffix.push('*'),
            "reference_declarator" => suffix.push('&'),
            _ => {}
        }
        current = n.child_by_field_name("declarator").or_else(|| {
            let mut cursor = n.walk();
            let found = n.named_children(&mut cursor).find(|c| {
                matches!(
                    c.kind(),
                    "function_declarator" | "pointer_declarator" | "reference_declarator"
                )
            });
            found
        });
    }
    None
}

/// Innermost identifier of a declarator (the declared name).
fn innermost_identifier(node: Node) -> Option<Node> {
    if node.kind() == "identifier" {
        return Some(node);
    }
    if let Some(inner) = node.child_by_field_name("declarator") {
        return innermost_identifier(inner);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.named_children(&mut cursor).collect();
    children.into_iter().find_map(innermost_identifier)
}

/// Trailing `const` on the function declarator itself (not a parameter).
fn has_const_qualifier(unit: &ParsedUnit, func_decl: Node) -> bool {
    let mut cursor = func_decl.walk();
    let found = func_decl
        .children(&mut cursor)
        .any(|c| c.kind() == "type_qualifier" && unit.node_text(c) == "const");
    found
}

fn has_static_specifier(unit: &ParsedUnit, decl: Node) -> bool {
    let mut cursor = decl.walk();
    let found = decl
        .children(&mut cursor)
        .any(|c| c.kind() == "storage_class_specifier" && unit.node_text(c) == "static");
    found
}

/// Parameter type as written, with the declared name sliced out, plus the
/// name itself when present.
fn parameter_parts(unit: &ParsedUnit, param: Node) -> (String, Option<String>) {
    let text = unit.node_text(param);
    if let Some(declarator) = param.child_by_field_name("declarator") {
        if let Some(id) = innermost_identifier(declarator) {
            let name = unit.node_text(id).to_string();
            let start = id.start_byte() - param.start_byte();
            let end = id.end_byte() - param.start_byte();
            let ty = format!("{}{}", &text[..start], &text[end..]);
            return (ty.trim().to_string(), Some(name));
        }
    }
    (text.trim().to_string(), None)
}

/// Resolve a declared type to the qualified name used for receiver
/// comparison: the matching class's qualified name when known, otherwise
/// the bare base type name.
fn resolve_receiver_type(model: &ProgramModel, declared: &str) -> Option<String> {
    if let Some(class) = model.resolve_class(declared) {
        return Some(class.qualified_name.clone());
    }
    base_type_name(declared)
}

fn span_of(node: Node) -> Span {
    let pos = node.start_position();
    Span::new(pos.row + 1, pos.column + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::walk;

    const SOURCE: &str = r#"
namespace demo {

class Widget {
public:
  int getId() const;
  unsigned size() const;
  SourceLocation getLocation() const;
  Widget *begin_children() const;
  void setId(int id);
  static bool classof(const Widget *W);
private:
  int secret() const;
  int id;
};

class FancyWidget {
public:
  int getFlair() const;
};

class StructuralHashVisitor {
public:
  bool VisitWidget(Widget *W) {
    W->getId();
    if (W->getId() > 0) {
      W->size();
    }
    return true;
  }
  bool VisitPair(Widget *W, FancyWidget *F) {
    W->getId();
    return true;
  }
};

} // namespace demo
"#;

    fn build_model() -> ProgramModel {
        CppModelBuilder::new()
            .build(Path::new("test.cpp"), SOURCE.as_bytes())
            .expect("source should parse")
    }

    fn widget(model: &ProgramModel) -> &ClassDecl {
        model
            .classes
            .iter()
            .find(|c| c.qualified_name == "demo::Widget")
            .expect("Widget should be extracted")
    }

    fn method<'a>(model: &'a ProgramModel, name: &str) -> &'a MethodSig {
        widget(model)
            .methods
            .iter()
            .find(|m| m.qualified_name == name)
            .unwrap_or_else(|| panic!("{} should be extracted", name))
    }

    #[test]
    fn test_classes_have_qualified_names() {
        let model = build_model();
        let names: Vec<&str> = model
            .classes
            .iter()
            .map(|c| c.qualified_name.as_str())
            .collect();

        assert!(names.contains(&"demo::Widget"));
        assert!(names.contains(&"demo::FancyWidget"));
        assert!(names.contains(&"demo::StructuralHashVisitor"));
    }

    #[test]
    fn test_method_flags() {
        let model = build_model();

        let get_id = method(&model, "demo::Widget::getId");
        assert_eq!(get_id.access, Access::Public);
        assert!(get_id.is_const);
        assert!(!get_id.is_static);
        assert_eq!(get_id.return_type, "int");

        let set_id = method(&model, "demo::Widget::setId");
        assert!(!set_id.is_const);

        let classof = method(&model, "demo::Widget::classof");
        assert!(classof.is_static);

        let secret = method(&model, "demo::Widget::secret");
        assert_eq!(secret.access, Access::Private);
    }

    #[test]
    fn test_return_types_as_written() {
        let model = build_model();
        assert_eq!(
            method(&model, "demo::Widget::getLocation").return_type,
            "SourceLocation"
        );
        assert_eq!(
            method(&model, "demo::Widget::begin_children").return_type,
            "Widget *"
        );
    }

    #[test]
    fn test_fields_are_not_methods() {
        let model = build_model();
        assert!(widget(&model)
            .methods
            .iter()
            .all(|m| m.qualified_name != "demo::Widget::id"));
    }

    #[test]
    fn test_inline_methods_become_functions() {
        let model = build_model();
        let visit = model
            .functions
            .iter()
            .find(|f| f.qualified_name == "demo::StructuralHashVisitor::VisitWidget")
            .expect("inline method should be a function");
        assert_eq!(visit.params, vec!["Widget *"]);
    }

    #[test]
    fn test_calls_resolve_receiver_from_parameter() {
        let model = build_model();
        let visit = model
            .functions
            .iter()
            .find(|f| f.qualified_name.ends_with("VisitWidget"))
            .unwrap();

        let mut calls = Vec::new();
        walk(&visit.body, &mut |node| {
            if let BodyNode::Call { site, .. } = node {
                calls.push(site.clone());
            }
        });

        // getId twice (statement + if condition), size once inside the if.
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|c| c.receiver == "demo::Widget"));
        assert!(calls.iter().any(|c| c.method == "demo::Widget::size"));
        assert!(calls.iter().any(|c| c.method == "demo::Widget::getId"));
    }

    #[test]
    fn test_two_parameter_function_keeps_both_types() {
        let model = build_model();
        let pair = model
            .functions
            .iter()
            .find(|f| f.qualified_name.ends_with("VisitPair"))
            .unwrap();
        assert_eq!(pair.params, vec!["Widget *", "FancyWidget *"]);
    }

    #[test]
    fn test_local_declaration_seeds_receiver_scope() {
        let source = r#"
class Widget {
public:
  int getId() const;
};

void probe() {
  Widget *local = make();
  local->getId();
}
"#;
        let model = CppModelBuilder::new()
            .build(Path::new("local.cpp"), source.as_bytes())
            .unwrap();
        let probe = model
            .functions
            .iter()
            .find(|f| f.qualified_name == "probe")
            .unwrap();

        let mut calls = Vec::new();
        walk(&probe.body, &mut |node| {
            if let BodyNode::Call { site, .. } = node {
                calls.push(site.clone());
            }
        });
        assert!(calls
            .iter()
            .any(|c| c.method == "Widget::getId" && c.receiver == "Widget"));
    }

    #[test]
    fn test_out_of_line_definition_is_qualified() {
        let source = r#"
class Visitor {
public:
  bool VisitThing(int x);
};

bool Visitor::VisitThing(int x) {
  return x > 0;
}
"#;
        let model = CppModelBuilder::new()
            .build(Path::new("out.cpp"), source.as_bytes())
            .unwrap();
        assert!(model
            .functions
            .iter()
            .any(|f| f.qualified_name == "Visitor::VisitThing"));
    }

    #[test]
    fn test_struct_defaults_to_public() {
        let source = r#"
struct Point {
  int x() const;
};
"#;
        let model = CppModelBuilder::new()
            .build(Path::new("s.cpp"), source.as_bytes())
            .unwrap();
        let point = model
            .classes
            .iter()
            .find(|c| c.qualified_name == "Point")
            .unwrap();
        assert_eq!(point.methods[0].access, Access::Public);
    }

    #[test]
    fn test_calls_inside_lambda_are_found() {
        let source = r#"
class Widget {
public:
  int getId() const;
};

void probe(Widget *W) {
  auto fn = [&]() {
    W->getId();
  };
}
"#;
        let model = CppModelBuilder::new()
            .build(Path::new("lambda.cpp"), source.as_bytes())
            .unwrap();
        let probe = model
            .functions
            .iter()
            .find(|f| f.qualified_name == "probe")
            .unwrap();

        let mut found = false;
        walk(&probe.body, &mut |node| {
            if let BodyNode::Call { site, .. } = node {
                if site.method == "Widget::getId" {
                    found = true;
                }
            }
        });
        assert!(found, "call inside lambda body should be collected");
    }
}
