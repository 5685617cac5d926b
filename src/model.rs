//! Program model shared by the frontend and the checker.
//!
//! A `ProgramModel` is the read-only snapshot of one translation unit:
//! the class declarations with their method signatures, and the function
//! definitions with their bodies reduced to an immutable call tree. The
//! frontend produces it in a single pass; nothing mutates it afterwards.

use std::fmt;

/// Source position (1-indexed line/column) for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

impl Span {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Member access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Access::Public => write!(f, "public"),
            Access::Protected => write!(f, "protected"),
            Access::Private => write!(f, "private"),
        }
    }
}

/// A method signature as declared on a class.
#[derive(Debug, Clone)]
pub struct MethodSig {
    /// Fully qualified name (e.g. `demo::Widget::getId`).
    pub qualified_name: String,
    pub access: Access,
    /// Const-qualified (non-mutating).
    pub is_const: bool,
    pub is_static: bool,
    /// Declared return type rendered as a string, pointer/reference
    /// qualifiers included as written (e.g. `const Widget *`).
    pub return_type: String,
    pub span: Span,
}

impl MethodSig {
    /// Instance-level methods are everything that is not static.
    pub fn is_instance(&self) -> bool {
        !self.is_static
    }
}

/// A user-defined class or struct with its method surface.
#[derive(Debug, Clone)]
pub struct ClassDecl {
    /// Fully qualified name (e.g. `demo::Widget`).
    pub qualified_name: String,
    pub methods: Vec<MethodSig>,
    pub span: Span,
}

impl ClassDecl {
    /// The unqualified final name segment.
    pub fn name(&self) -> &str {
        self.qualified_name
            .rsplit("::")
            .next()
            .unwrap_or(&self.qualified_name)
    }
}

/// A member call site: the invoked method plus the static type of the
/// receiver expression. The receiver is empty when the frontend could not
/// resolve it; such sites never match any target class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    /// Qualified name of the invoked method (e.g. `demo::Widget::getId`).
    pub method: String,
    /// Qualified name of the receiver's static type.
    pub receiver: String,
}

/// One node of a function body reduced to its call structure.
///
/// The tree keeps only what the checker needs: member call sites, and the
/// nesting of every construct that owns further nodes (blocks, branches,
/// loops, lambda bodies). Argument and receiver subexpressions of a call
/// are children of the call node, so chained calls are all reachable.
#[derive(Debug, Clone)]
pub enum BodyNode {
    Call {
        site: CallSite,
        children: Vec<BodyNode>,
    },
    Scope(Vec<BodyNode>),
}

/// Visit every node reachable from `roots` exactly once, depth-first.
///
/// Traversal is an explicit worklist over the immutable tree; nothing is
/// skipped based on reachability or control flow.
pub fn walk<'a>(roots: &'a [BodyNode], visit: &mut dyn FnMut(&'a BodyNode)) {
    let mut stack: Vec<&'a BodyNode> = roots.iter().rev().collect();
    while let Some(node) = stack.pop() {
        visit(node);
        let children = match node {
            BodyNode::Call { children, .. } => children,
            BodyNode::Scope(children) => children,
        };
        for child in children.iter().rev() {
            stack.push(child);
        }
    }
}

/// A function definition with its parameter types and body call tree.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    /// Fully qualified name (e.g. `StructuralHashVisitor::VisitWidget`).
    pub qualified_name: String,
    /// Parameter types as written in the signature, in order.
    pub params: Vec<String>,
    pub body: Vec<BodyNode>,
    pub span: Span,
}

/// The parsed snapshot of one translation unit.
#[derive(Debug, Clone, Default)]
pub struct ProgramModel {
    pub functions: Vec<FunctionDecl>,
    pub classes: Vec<ClassDecl>,
}

impl ProgramModel {
    /// Resolve a declared type string to the class it references.
    ///
    /// Strips cv-qualifiers and pointer/reference indirection, then matches
    /// the remaining name against the known classes - exactly, or as the
    /// final `::` segments of a qualified name (declared types in function
    /// signatures are usually written without full qualification).
    pub fn resolve_class(&self, declared: &str) -> Option<&ClassDecl> {
        let name = base_type_name(declared)?;
        self.classes.iter().find(|c| {
            c.qualified_name == name || c.qualified_name.ends_with(&format!("::{}", name))
        })
    }
}

/// Reduce a declared type string to its base type name.
///
/// `const Widget *` becomes `Widget`; `clang::Stmt &` becomes
/// `clang::Stmt`. Returns `None` when nothing remains after stripping.
pub fn base_type_name(declared: &str) -> Option<String> {
    let cleaned = declared.replace(['*', '&'], " ");
    cleaned
        .split_whitespace()
        .filter(|t| !matches!(*t, "const" | "volatile" | "struct" | "class" | "enum"))
        .last()
        .map(|t| t.to_string())
}
