use crate::ast::{AstKind, NodeId, NodeKind, TypeExpr};
use crate::diagnostics::Span;
use crate::llvm_codegen::Codegen;
use crate::symbols::{
    new_block_ctx, CallingConv, FnAttrKind, FnId, FnTable, ImportId, LocalVarTable, TypeId,
    TypeKind,
};

/// Semantic analysis over every registered import.
///
/// Pass 1 declares all function prototypes (extern and definition) and
/// resolves their types. Pass 2 creates the root block context of each
/// surviving definition and seeds it with one local per parameter.
/// Statement bodies are not analyzed yet.
pub fn analyze(cg: &mut Codegen) {
    let import_count = cg.imports.len();
    for i in 0..import_count {
        declare_import(cg, ImportId(i));
    }
    for i in 0..import_count {
        setup_fn_defs(cg, ImportId(i));
    }
}

// ---------- pass 1: declarations ----------

fn declare_import(cg: &mut Codegen, import: ImportId) {
    let root = cg.import(import).root;
    let children: Vec<NodeId> = cg.import(import).ast.root_children(root).to_vec();
    for child in children {
        match cg.import(import).ast.kind(child) {
            AstKind::Extern => declare_extern(cg, import, child),
            AstKind::FnDef => declare_fn_def(cg, import, child),
            _ => {}
        }
    }
}

fn declare_extern(cg: &mut Codegen, import: ImportId, node: NodeId) {
    let (attrs, fns) = match &cg.import(import).ast.node(node).kind {
        NodeKind::Extern { attrs, fns } => (attrs.clone(), fns.clone()),
        _ => return,
    };

    for attr in attrs {
        let (name, arg, span) = attr_info(cg, import, attr);
        if name == "link" {
            cg.link_table.insert(arg, true);
        } else {
            cg.add_error(import, span, format!("unknown attribute: {name}"));
        }
    }

    for decl in fns {
        let proto = match &cg.import(import).ast.node(decl).kind {
            NodeKind::FnDecl { proto } => *proto,
            _ => continue,
        };
        let info = proto_info(cg, import, proto);

        let fn_id = FnId(cg.fns.len());
        cg.fns.push(FnTable {
            proto,
            def: None,
            import,
            attrs: Vec::new(),
            calling_conv: CallingConv::C,
            is_external: true,
        });
        resolve_fn_proto(cg, import, proto, fn_id, false);
        cg.import_mut(import).cg_mut(proto).fn_entry = Some(fn_id);

        if cg.import(import).fn_table.contains_key(&info.name) {
            cg.add_error(
                import,
                info.span,
                format!("function '{}' is already defined", info.name),
            );
            continue;
        }
        cg.import_mut(import)
            .fn_table
            .insert(info.name.clone(), fn_id);

        if info.is_pub {
            let key = format!("{}.{}", cg.import(import).module_name(), info.name);
            if cg.global_fn_table.contains_key(&key) {
                cg.add_error(
                    import,
                    info.span,
                    format!("function '{key}' is already defined"),
                );
            } else {
                cg.global_fn_table.insert(key, fn_id);
            }
        }
    }
}

fn declare_fn_def(cg: &mut Codegen, import: ImportId, node: NodeId) {
    let proto = match &cg.import(import).ast.node(node).kind {
        NodeKind::FnDef { proto, .. } => *proto,
        _ => return,
    };
    let info = proto_info(cg, import, proto);
    let span = cg.import(import).ast.span(node);

    if cg.import(import).fn_table.contains_key(&info.name) {
        cg.add_error(
            import,
            span,
            format!("function '{}' is already defined", info.name),
        );
        cg.import_mut(import).cg_mut(node).skip = true;
        return;
    }
    // only extern declarations may be variadic
    if info.is_variadic {
        cg.add_error(import, span, "variadic functions are not supported");
        cg.import_mut(import).cg_mut(node).skip = true;
        return;
    }

    let fn_id = FnId(cg.fns.len());
    cg.fns.push(FnTable {
        proto,
        def: Some(node),
        import,
        attrs: Vec::new(),
        calling_conv: CallingConv::Fast,
        is_external: false,
    });
    resolve_fn_proto(cg, import, proto, fn_id, true);

    cg.import_mut(import)
        .fn_table
        .insert(info.name.clone(), fn_id);
    cg.import_mut(import).cg_mut(node).fn_entry = Some(fn_id);
    cg.import_mut(import).cg_mut(proto).fn_entry = Some(fn_id);
}

/// Check a prototype's attributes and resolve every type it mentions.
fn resolve_fn_proto(cg: &mut Codegen, import: ImportId, proto: NodeId, fn_id: FnId, is_def: bool) {
    let info = proto_info(cg, import, proto);

    for attr in info.attrs {
        let (name, _, span) = attr_info(cg, import, attr);
        let recognized = if is_def {
            match name.as_str() {
                "inline" => Some(FnAttrKind::Inline),
                "always_inline" => Some(FnAttrKind::AlwaysInline),
                _ => None,
            }
        } else {
            None
        };
        match recognized {
            Some(kind) => cg.fns[fn_id.0].attrs.push(kind),
            None => cg.add_error(import, span, format!("unknown attribute: {name}")),
        }
    }

    for param in info.params {
        let (_, ty_node, span) = param_info(cg, import, param);
        let ty = resolve_type(cg, import, ty_node);
        if cg.types.get(ty).kind == TypeKind::NoReturn {
            cg.add_error(import, span, "parameter of type '!' is not allowed");
        }
    }

    resolve_type(cg, import, info.ret);
}

/// Resolve a type node, record the interned type in its code-gen slot,
/// and return it. Unresolvable types come back as the invalid type.
fn resolve_type(cg: &mut Codegen, import: ImportId, node: NodeId) -> TypeId {
    let ty_expr = match &cg.import(import).ast.node(node).kind {
        NodeKind::Type(ty) => ty.clone(),
        _ => return cg.builtins().entry_invalid,
    };
    let span = cg.import(import).ast.span(node);

    let resolved = match ty_expr {
        TypeExpr::Primitive { name } => {
            let name = cg
                .import(import)
                .ast
                .as_ident(name)
                .unwrap_or("")
                .to_string();
            match cg.types.lookup(&name) {
                Some(id) => id,
                None => {
                    cg.add_error(import, span, format!("unknown type: '{name}'"));
                    cg.builtins().entry_invalid
                }
            }
        }
        TypeExpr::Pointer { child, is_mut } => {
            let child_ty = resolve_type(cg, import, child);
            if cg.types.get(child_ty).kind == TypeKind::NoReturn {
                cg.add_error(import, span, "pointer to '!' is not allowed");
                cg.builtins().entry_invalid
            } else {
                cg.get_pointer_to(child_ty, !is_mut)
            }
        }
        TypeExpr::Array { child, size } => {
            let elem = resolve_type(cg, import, child);
            if cg.types.get(elem).kind == TypeKind::NoReturn {
                cg.add_error(import, span, "array of '!' is not allowed");
                cg.builtins().entry_invalid
            } else {
                let len = match cg
                    .import(import)
                    .ast
                    .as_int(size)
                    .and_then(|v| v.parse::<i64>().ok())
                {
                    Some(len) => len,
                    None => {
                        let size_span = cg.import(import).ast.span(size);
                        cg.add_error(import, size_span, "array size must be an integer literal");
                        -1
                    }
                };
                cg.get_array(elem, len)
            }
        }
    };

    cg.import_mut(import).cg_mut(node).ty = Some(resolved);
    resolved
}

// ---------- pass 2: function top-level setup ----------

fn setup_fn_defs(cg: &mut Codegen, import: ImportId) {
    let root = cg.import(import).root;
    let children: Vec<NodeId> = cg.import(import).ast.root_children(root).to_vec();

    for child in children {
        let (proto, body) = match &cg.import(import).ast.node(child).kind {
            NodeKind::FnDef { proto, body } => (*proto, *body),
            _ => continue,
        };
        if cg.import(import).cg(child).skip {
            continue;
        }

        let ctx = new_block_ctx(&mut cg.ctxs, body, None);
        {
            let node_cg = cg.import_mut(import).cg_mut(child);
            node_cg.root_ctx = Some(ctx);
            node_cg.ctx_list.push(ctx);
        }

        let info = proto_info(cg, import, proto);
        let invalid = cg.builtins().entry_invalid;
        for (i, param) in info.params.iter().enumerate() {
            let (name, ty_node, span) = param_info(cg, import, *param);
            let ty = cg.import(import).cg(ty_node).ty.unwrap_or(invalid);

            if cg.ctxs[ctx.0].has_local(&name) {
                cg.add_error(import, span, format!("duplicate parameter name: '{name}'"));
                if let Some(prev) = cg.ctxs[ctx.0].local_mut(&name) {
                    if prev.ty != ty {
                        prev.ty = invalid;
                    }
                }
                continue;
            }
            cg.ctxs[ctx.0].push_local(LocalVarTable {
                name,
                ty,
                value: None,
                is_const: true,
                is_ptr: false,
                decl_node: *param,
                arg_index: i as i32,
            });
        }
    }
}

// ---------- node views ----------

struct ProtoInfo {
    name: String,
    span: Span,
    params: Vec<NodeId>,
    ret: NodeId,
    attrs: Vec<NodeId>,
    is_pub: bool,
    is_variadic: bool,
}

fn proto_info(cg: &Codegen, import: ImportId, proto: NodeId) -> ProtoInfo {
    let imp = cg.import(import);
    match &imp.ast.node(proto).kind {
        NodeKind::FnProto(p) => ProtoInfo {
            name: imp.ast.as_ident(p.name).unwrap_or("").to_string(),
            span: imp.ast.span(proto),
            params: p.params.clone(),
            ret: p.ret,
            attrs: p.attrs.clone(),
            is_pub: p.is_pub,
            is_variadic: p.is_variadic,
        },
        other => unreachable!("expected prototype node, found {other:?}"),
    }
}

fn attr_info(cg: &Codegen, import: ImportId, attr: NodeId) -> (String, String, Span) {
    let imp = cg.import(import);
    match &imp.ast.node(attr).kind {
        NodeKind::Attr { name, arg } => (name.clone(), arg.clone(), imp.ast.span(attr)),
        other => unreachable!("expected attribute node, found {other:?}"),
    }
}

fn param_info(cg: &Codegen, import: ImportId, param: NodeId) -> (String, NodeId, Span) {
    let imp = cg.import(import);
    match &imp.ast.node(param).kind {
        NodeKind::FnParam { name, ty } => (
            imp.ast.as_ident(*name).unwrap_or("").to_string(),
            *ty,
            imp.ast.span(param),
        ),
        other => unreachable!("expected parameter node, found {other:?}"),
    }
}
