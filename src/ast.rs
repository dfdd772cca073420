use crate::diagnostics::Span;

/// Index of a node inside its import's [`Ast`] arena.
///
/// Every import owns one arena; child edges are ids into the same arena,
/// so a node's owning import is always the import whose arena it lives
/// in. Code-gen information lives in a side table indexed by the same
/// ids (see `symbols::ImportTable`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    Neq,
    Lt,
    Gt,
    Lte,
    Gte,
    And,
    Or,
    Xor,
    Shl,
    Shr,
    Assign,
    LogAnd,
    LogOr,
}

impl BinOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinOpKind::Add => "+",
            BinOpKind::Sub => "-",
            BinOpKind::Mul => "*",
            BinOpKind::Div => "/",
            BinOpKind::Mod => "%",
            BinOpKind::Eq => "==",
            BinOpKind::Neq => "!=",
            BinOpKind::Lt => "<",
            BinOpKind::Gt => ">",
            BinOpKind::Lte => "<=",
            BinOpKind::Gte => ">=",
            BinOpKind::And => "&",
            BinOpKind::Or => "|",
            BinOpKind::Xor => "^",
            BinOpKind::Shl => "<<",
            BinOpKind::Shr => ">>",
            BinOpKind::Assign => "=",
            BinOpKind::LogAnd => "&&",
            BinOpKind::LogOr => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOpKind {
    Neg,
    Not,
    LogNot,
}

impl UnOpKind {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnOpKind::Neg => "-",
            UnOpKind::Not => "~",
            UnOpKind::LogNot => "!",
        }
    }
}

/// A function prototype: shared by declarations and definitions.
#[derive(Debug, Clone)]
pub struct FnProto {
    pub name: NodeId,
    pub params: Vec<NodeId>,
    pub ret: NodeId,
    pub attrs: Vec<NodeId>,
    pub is_pub: bool,
    pub is_variadic: bool,
}

#[derive(Debug, Clone)]
pub enum TypeExpr {
    Primitive { name: NodeId },
    Pointer { child: NodeId, is_mut: bool },
    Array { child: NodeId, size: NodeId },
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Root { children: Vec<NodeId> },
    Import { path: NodeId },
    Extern { attrs: Vec<NodeId>, fns: Vec<NodeId> },
    FnDecl { proto: NodeId },
    FnDef { proto: NodeId, body: NodeId },
    FnProto(FnProto),
    FnParam { name: NodeId, ty: NodeId },
    Type(TypeExpr),
    Block { children: Vec<NodeId> },
    VarDecl { name: NodeId, ty: Option<NodeId>, value: Option<NodeId>, is_mut: bool },
    Return { value: Option<NodeId> },
    If { cond: NodeId, then_block: NodeId, else_node: Option<NodeId> },
    BinOp { op: BinOpKind, lhs: NodeId, rhs: NodeId },
    UnOp { op: UnOpKind, operand: NodeId },
    Cast { value: NodeId, ty: NodeId },
    Call { callee: NodeId, args: Vec<NodeId> },
    ArrayIndex { array: NodeId, index: NodeId },
    Ident { name: String },
    IntLit { value: String },
    StrLit { value: String },
    BoolLit { value: bool },
    Void,
    NoReturn,
    Attr { name: String, arg: String },
}

/// Payload-free discriminant, for callers that only dispatch on shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AstKind {
    Root,
    Import,
    Extern,
    FnDecl,
    FnDef,
    FnProto,
    FnParam,
    Type,
    Block,
    VarDecl,
    Return,
    If,
    BinOp,
    UnOp,
    Cast,
    Call,
    ArrayIndex,
    Ident,
    IntLit,
    StrLit,
    BoolLit,
    Void,
    NoReturn,
    Attr,
}

impl AstKind {
    pub fn name(&self) -> &'static str {
        match self {
            AstKind::Root => "root",
            AstKind::Import => "import",
            AstKind::Extern => "extern",
            AstKind::FnDecl => "fn_decl",
            AstKind::FnDef => "fn_def",
            AstKind::FnProto => "fn_proto",
            AstKind::FnParam => "fn_param",
            AstKind::Type => "type",
            AstKind::Block => "block",
            AstKind::VarDecl => "var_decl",
            AstKind::Return => "return",
            AstKind::If => "if",
            AstKind::BinOp => "bin_op",
            AstKind::UnOp => "un_op",
            AstKind::Cast => "cast",
            AstKind::Call => "call",
            AstKind::ArrayIndex => "array_index",
            AstKind::Ident => "ident",
            AstKind::IntLit => "int",
            AstKind::StrLit => "string",
            AstKind::BoolLit => "bool",
            AstKind::Void => "void",
            AstKind::NoReturn => "no_return",
            AstKind::Attr => "attr",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
}

impl Node {
    pub fn kind(&self) -> AstKind {
        match &self.kind {
            NodeKind::Root { .. } => AstKind::Root,
            NodeKind::Import { .. } => AstKind::Import,
            NodeKind::Extern { .. } => AstKind::Extern,
            NodeKind::FnDecl { .. } => AstKind::FnDecl,
            NodeKind::FnDef { .. } => AstKind::FnDef,
            NodeKind::FnProto(_) => AstKind::FnProto,
            NodeKind::FnParam { .. } => AstKind::FnParam,
            NodeKind::Type(_) => AstKind::Type,
            NodeKind::Block { .. } => AstKind::Block,
            NodeKind::VarDecl { .. } => AstKind::VarDecl,
            NodeKind::Return { .. } => AstKind::Return,
            NodeKind::If { .. } => AstKind::If,
            NodeKind::BinOp { .. } => AstKind::BinOp,
            NodeKind::UnOp { .. } => AstKind::UnOp,
            NodeKind::Cast { .. } => AstKind::Cast,
            NodeKind::Call { .. } => AstKind::Call,
            NodeKind::ArrayIndex { .. } => AstKind::ArrayIndex,
            NodeKind::Ident { .. } => AstKind::Ident,
            NodeKind::IntLit { .. } => AstKind::IntLit,
            NodeKind::StrLit { .. } => AstKind::StrLit,
            NodeKind::BoolLit { .. } => AstKind::BoolLit,
            NodeKind::Void => AstKind::Void,
            NodeKind::NoReturn => AstKind::NoReturn,
            NodeKind::Attr { .. } => AstKind::Attr,
        }
    }
}

/// Node arena for a single source file.
#[derive(Debug, Clone, Default)]
pub struct Ast {
    nodes: Vec<Node>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { kind, span });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> AstKind {
        self.node(id).kind()
    }

    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    // Checked accessors: the typed view of a node, or None when the
    // variant does not match.

    pub fn as_ident(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::Ident { name } => Some(name),
            _ => None,
        }
    }

    pub fn as_int(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::IntLit { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_string(&self, id: NodeId) -> Option<&str> {
        match &self.node(id).kind {
            NodeKind::StrLit { value } => Some(value),
            _ => None,
        }
    }

    pub fn as_proto(&self, id: NodeId) -> Option<&FnProto> {
        match &self.node(id).kind {
            NodeKind::FnProto(proto) => Some(proto),
            _ => None,
        }
    }

    pub fn as_type(&self, id: NodeId) -> Option<&TypeExpr> {
        match &self.node(id).kind {
            NodeKind::Type(ty) => Some(ty),
            _ => None,
        }
    }

    pub fn root_children(&self, root: NodeId) -> &[NodeId] {
        match &self.node(root).kind {
            NodeKind::Root { children } => children,
            _ => &[],
        }
    }

    pub fn block_children(&self, block: NodeId) -> &[NodeId] {
        match &self.node(block).kind {
            NodeKind::Block { children } => children,
            _ => &[],
        }
    }

    /// Debug rendering: one node per line, two-space indents,
    /// newline-terminated, deterministic for a given tree.
    pub fn dump(&self, id: NodeId, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let node = self.node(id);
        match &node.kind {
            NodeKind::Root { children } => {
                let mut s = format!("{pad}root:\n");
                for child in children {
                    s += &self.dump(*child, indent + 2);
                }
                s
            }
            NodeKind::Import { path } => {
                format!("{pad}import:\n{}", self.dump(*path, indent + 2))
            }
            NodeKind::Extern { attrs, fns } => {
                let mut s = format!("{pad}extern:\n");
                for attr in attrs {
                    s += &self.dump(*attr, indent + 2);
                }
                for f in fns {
                    s += &self.dump(*f, indent + 2);
                }
                s
            }
            NodeKind::FnDecl { proto } => {
                format!("{pad}fn_decl:\n{}", self.dump(*proto, indent + 2))
            }
            NodeKind::FnDef { proto, body } => {
                let mut s = format!("{pad}fn_def:\n");
                s += &self.dump(*proto, indent + 2);
                s += &self.dump(*body, indent + 2);
                s
            }
            NodeKind::FnProto(proto) => {
                let mut s = format!(
                    "{pad}fn_proto{}{}:\n",
                    if proto.is_pub { " pub" } else { "" },
                    if proto.is_variadic { " variadic" } else { "" },
                );
                for attr in &proto.attrs {
                    s += &self.dump(*attr, indent + 2);
                }
                s += &self.dump(proto.name, indent + 2);
                for param in &proto.params {
                    s += &self.dump(*param, indent + 2);
                }
                s += &self.dump(proto.ret, indent + 2);
                s
            }
            NodeKind::FnParam { name, ty } => {
                let mut s = format!("{pad}fn_param:\n");
                s += &self.dump(*name, indent + 2);
                s += &self.dump(*ty, indent + 2);
                s
            }
            NodeKind::Type(ty) => match ty {
                TypeExpr::Primitive { name } => {
                    format!("{pad}type primitive:\n{}", self.dump(*name, indent + 2))
                }
                TypeExpr::Pointer { child, is_mut } => {
                    let qual = if *is_mut { "mut" } else { "const" };
                    format!("{pad}type pointer {qual}:\n{}", self.dump(*child, indent + 2))
                }
                TypeExpr::Array { child, size } => {
                    let mut s = format!("{pad}type array:\n");
                    s += &self.dump(*child, indent + 2);
                    s += &self.dump(*size, indent + 2);
                    s
                }
            },
            NodeKind::Block { children } => {
                let mut s = format!("{pad}block:\n");
                for child in children {
                    s += &self.dump(*child, indent + 2);
                }
                s
            }
            NodeKind::VarDecl { name, ty, value, is_mut } => {
                let mut s = format!(
                    "{pad}var_decl{}:\n",
                    if *is_mut { " mut" } else { "" }
                );
                s += &self.dump(*name, indent + 2);
                if let Some(ty) = ty {
                    s += &self.dump(*ty, indent + 2);
                }
                if let Some(value) = value {
                    s += &self.dump(*value, indent + 2);
                }
                s
            }
            NodeKind::Return { value } => {
                let mut s = format!("{pad}return:\n");
                if let Some(value) = value {
                    s += &self.dump(*value, indent + 2);
                }
                s
            }
            NodeKind::If { cond, then_block, else_node } => {
                let mut s = format!("{pad}if:\n");
                s += &self.dump(*cond, indent + 2);
                s += &self.dump(*then_block, indent + 2);
                if let Some(else_node) = else_node {
                    s += &self.dump(*else_node, indent + 2);
                }
                s
            }
            NodeKind::BinOp { op, lhs, rhs } => {
                let mut s = format!("{pad}bin_op {}:\n", op.symbol());
                s += &self.dump(*lhs, indent + 2);
                s += &self.dump(*rhs, indent + 2);
                s
            }
            NodeKind::UnOp { op, operand } => {
                format!("{pad}un_op {}:\n{}", op.symbol(), self.dump(*operand, indent + 2))
            }
            NodeKind::Cast { value, ty } => {
                let mut s = format!("{pad}cast:\n");
                s += &self.dump(*value, indent + 2);
                s += &self.dump(*ty, indent + 2);
                s
            }
            NodeKind::Call { callee, args } => {
                let mut s = format!("{pad}call:\n");
                s += &self.dump(*callee, indent + 2);
                for arg in args {
                    s += &self.dump(*arg, indent + 2);
                }
                s
            }
            NodeKind::ArrayIndex { array, index } => {
                let mut s = format!("{pad}array_index:\n");
                s += &self.dump(*array, indent + 2);
                s += &self.dump(*index, indent + 2);
                s
            }
            NodeKind::Ident { name } => format!("{pad}ident: {name}\n"),
            NodeKind::IntLit { value } => format!("{pad}int: {value}\n"),
            NodeKind::StrLit { value } => format!("{pad}string: {value}\n"),
            NodeKind::BoolLit { value } => format!("{pad}bool: {value}\n"),
            NodeKind::Void => format!("{pad}void\n"),
            NodeKind::NoReturn => format!("{pad}no_return\n"),
            NodeKind::Attr { name, arg } => {
                let mut s = format!("{pad}attr:\n");
                s += &format!("{pad}  name: {name}\n");
                s += &format!("{pad}  arg: {arg}\n");
                s
            }
        }
    }
}
