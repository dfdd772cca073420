use std::collections::HashMap;
use std::path::PathBuf;

use inkwell::types::{AnyType, AnyTypeEnum, BasicType, BasicTypeEnum};
use inkwell::values::BasicValueEnum;
use inkwell::AddressSpace;

use crate::ast::{Ast, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImportId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FnId(pub usize);

/// Interned type handle. Two types are the same type exactly when their
/// ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CtxId(pub usize);

/// One parsed source file, uniquely identified by its canonical path.
/// Owns the AST arena for the file and the code-gen side table indexed
/// by the same node ids, so every node's owning import is the import
/// whose arena contains it.
#[derive(Debug)]
pub struct ImportTable {
    pub path: PathBuf,
    pub source: String,
    pub ast: Ast,
    pub root: NodeId,
    pub fn_table: HashMap<String, FnId>,
    cg: Vec<CgNode>,
}

impl ImportTable {
    pub fn new(path: PathBuf, source: String, ast: Ast, root: NodeId) -> Self {
        let cg = vec![CgNode::default(); ast.len()];
        Self {
            path,
            source,
            ast,
            root,
            fn_table: HashMap::new(),
            cg,
        }
    }

    /// Module name used to qualify exported functions: the file stem.
    pub fn module_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn cg(&self, id: NodeId) -> &CgNode {
        &self.cg[id.index()]
    }

    pub fn cg_mut(&mut self, id: NodeId) -> &mut CgNode {
        &mut self.cg[id.index()]
    }
}

/// Analysis results attached to an AST node. Which fields are populated
/// depends on the node kind.
#[derive(Debug, Clone, Default)]
pub struct CgNode {
    /// Resolved type, on type nodes.
    pub ty: Option<TypeId>,
    /// Function table entry, on prototypes and definitions.
    pub fn_entry: Option<FnId>,
    /// Definition was rejected; later passes must not emit it.
    pub skip: bool,
    /// Body scope, on definitions.
    pub root_ctx: Option<CtxId>,
    /// Every context rooted in this definition.
    pub ctx_list: Vec<CtxId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallingConv {
    C,
    Fast,
}

impl CallingConv {
    pub fn as_llvm(&self) -> u32 {
        match self {
            CallingConv::C => 0,
            CallingConv::Fast => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FnAttrKind {
    Inline,
    AlwaysInline,
}

/// A declared function: prototype plus, for definitions, the body.
#[derive(Debug)]
pub struct FnTable {
    pub proto: NodeId,
    pub def: Option<NodeId>,
    pub import: ImportId,
    pub attrs: Vec<FnAttrKind>,
    pub calling_conv: CallingConv,
    pub is_external: bool,
}

/// A named local inside a block context. Parameters use their position
/// as `arg_index`; block-declared variables use -1.
#[derive(Debug)]
pub struct LocalVarTable<'ctx> {
    pub name: String,
    pub ty: TypeId,
    pub value: Option<BasicValueEnum<'ctx>>,
    pub is_const: bool,
    pub is_ptr: bool,
    pub decl_node: NodeId,
    pub arg_index: i32,
}

/// The runtime analog of a lexical scope: local-variable environment
/// plus links to the enclosing scope and the function's root scope.
#[derive(Debug)]
pub struct BlockCtx<'ctx> {
    pub node: NodeId,
    pub parent: Option<CtxId>,
    pub root: CtxId,
    locals: Vec<LocalVarTable<'ctx>>,
    by_name: HashMap<String, usize>,
}

impl<'ctx> BlockCtx<'ctx> {
    pub fn has_local(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn local(&self, name: &str) -> Option<&LocalVarTable<'ctx>> {
        self.by_name.get(name).map(|&i| &self.locals[i])
    }

    pub fn local_mut(&mut self, name: &str) -> Option<&mut LocalVarTable<'ctx>> {
        match self.by_name.get(name) {
            Some(&i) => Some(&mut self.locals[i]),
            None => None,
        }
    }

    /// Register a local. The caller has already ruled out duplicates.
    pub fn push_local(&mut self, var: LocalVarTable<'ctx>) {
        self.by_name.insert(var.name.clone(), self.locals.len());
        self.locals.push(var);
    }

    /// Locals in declaration order.
    pub fn locals(&self) -> &[LocalVarTable<'ctx>] {
        &self.locals
    }
}

/// Create a context in `ctxs`. A context with a parent shares the
/// parent's root; a context without one is its own root.
pub fn new_block_ctx<'ctx>(
    ctxs: &mut Vec<BlockCtx<'ctx>>,
    node: NodeId,
    parent: Option<CtxId>,
) -> CtxId {
    let id = CtxId(ctxs.len());
    let root = match parent {
        Some(p) => ctxs[p.0].root,
        None => id,
    };
    ctxs.push(BlockCtx {
        node,
        parent,
        root,
        locals: Vec::new(),
        by_name: HashMap::new(),
    });
    id
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Invalid,
    Void,
    Bool,
    NoReturn,
    Int,
    Ptr,
    Array,
}

#[derive(Debug)]
pub struct TypeEntry<'ctx> {
    pub kind: TypeKind,
    pub name: String,
    pub llvm: Option<AnyTypeEnum<'ctx>>,
    pub size_in_bits: u32,
    pub align_in_bits: u32,
    pub is_signed: bool,
    // pointer types
    pub pointee: Option<TypeId>,
    pub pointee_is_const: bool,
    // interning slots: pointer types derived from this type
    pub const_pointer: Option<TypeId>,
    pub mut_pointer: Option<TypeId>,
    // array types
    pub elem: Option<TypeId>,
    pub array_len: i64,
    // interning slots: array types with this element type, by length
    pub array_by_size: HashMap<i64, TypeId>,
}

impl<'ctx> TypeEntry<'ctx> {
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            name: String::new(),
            llvm: None,
            size_in_bits: 0,
            align_in_bits: 0,
            is_signed: false,
            pointee: None,
            pointee_is_const: false,
            const_pointer: None,
            mut_pointer: None,
            elem: None,
            array_len: 0,
            array_by_size: HashMap::new(),
        }
    }

    fn llvm_basic(&self) -> Option<BasicTypeEnum<'ctx>> {
        self.llvm.and_then(|t| BasicTypeEnum::try_from(t).ok())
    }
}

/// All types known to a compilation, interned: pointer and array
/// construction return the existing entry when one was already made for
/// the same child type and qualifier/length.
#[derive(Debug, Default)]
pub struct TypeStore<'ctx> {
    entries: Vec<TypeEntry<'ctx>>,
    by_name: HashMap<String, TypeId>,
}

impl<'ctx> TypeStore<'ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: TypeId) -> &TypeEntry<'ctx> {
        &self.entries[id.0]
    }

    pub fn get_mut(&mut self, id: TypeId) -> &mut TypeEntry<'ctx> {
        &mut self.entries[id.0]
    }

    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Add an entry without a name-table registration.
    pub fn add(&mut self, entry: TypeEntry<'ctx>) -> TypeId {
        let id = TypeId(self.entries.len());
        self.entries.push(entry);
        id
    }

    /// Add an entry and register it under its name.
    pub fn insert(&mut self, entry: TypeEntry<'ctx>) -> TypeId {
        let name = entry.name.clone();
        let id = self.add(entry);
        self.by_name.insert(name, id);
        id
    }

    /// The `*const T` / `*mut T` type for `T`, interned on `T`.
    pub fn pointer_to(&mut self, child: TypeId, is_const: bool, ptr_bits: u32) -> TypeId {
        let cached = {
            let c = self.get(child);
            if is_const {
                c.const_pointer
            } else {
                c.mut_pointer
            }
        };
        if let Some(id) = cached {
            return id;
        }

        let child_entry = self.get(child);
        let name = format!(
            "*{} {}",
            if is_const { "const" } else { "mut" },
            child_entry.name
        );
        let llvm = child_entry
            .llvm_basic()
            .map(|bt| bt.ptr_type(AddressSpace::from(0u16)).as_any_type_enum());

        let mut entry = TypeEntry::new(TypeKind::Ptr);
        entry.name = name;
        entry.llvm = llvm;
        entry.size_in_bits = ptr_bits;
        entry.align_in_bits = ptr_bits;
        entry.pointee = Some(child);
        entry.pointee_is_const = is_const;

        let id = self.insert(entry);
        let child_entry = self.get_mut(child);
        if is_const {
            child_entry.const_pointer = Some(id);
        } else {
            child_entry.mut_pointer = Some(id);
        }
        id
    }

    /// The `[T; n]` type for `T`, interned on `T` by length.
    pub fn array_of(&mut self, elem: TypeId, len: i64) -> TypeId {
        if let Some(&id) = self.get(elem).array_by_size.get(&len) {
            return id;
        }

        let elem_entry = self.get(elem);
        let name = format!("[{}; {}]", elem_entry.name, len);
        let llvm = if len >= 0 {
            elem_entry
                .llvm_basic()
                .map(|bt| bt.array_type(len as u32).as_any_type_enum())
        } else {
            None
        };

        let mut entry = TypeEntry::new(TypeKind::Array);
        entry.name = name;
        entry.llvm = llvm;
        entry.size_in_bits = if len >= 0 {
            elem_entry.size_in_bits.saturating_mul(len as u32)
        } else {
            0
        };
        entry.align_in_bits = elem_entry.align_in_bits;
        entry.elem = Some(elem);
        entry.array_len = len;

        let id = self.insert(entry);
        self.get_mut(elem).array_by_size.insert(len, id);
        id
    }
}

/// Handles to the types every compilation starts with.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinTypes {
    pub entry_invalid: TypeId,
    pub entry_void: TypeId,
    pub entry_bool: TypeId,
    pub entry_no_return: TypeId,
    pub entry_u8: TypeId,
    pub entry_i32: TypeId,
    pub entry_isize: TypeId,
    pub entry_str_lit: TypeId,
}
