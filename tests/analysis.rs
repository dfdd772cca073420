use std::fs;
use std::path::PathBuf;

use inkwell::context::Context;
use tempfile::TempDir;

use dal::ast::NodeKind;
use dal::diagnostics::Diagnostic;
use dal::llvm_codegen::{Codegen, CodegenOptions};
use dal::symbols::{ImportId, TypeKind};
use dal::CompileError;

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn options_for(dir: &TempDir) -> CodegenOptions {
    CodegenOptions {
        root_dir: dir.path().to_path_buf(),
        ..Default::default()
    }
}

fn expect_diagnostics(result: Result<(), CompileError>) -> Vec<Diagnostic> {
    match result {
        Err(CompileError::Diagnostics(diags)) => diags,
        Err(other) => panic!("expected diagnostics, got: {other}"),
        Ok(()) => panic!("expected diagnostics, compilation succeeded"),
    }
}

/// The function definition children of an import's root, in order.
fn fn_def_nodes(cg: &Codegen, import: ImportId) -> Vec<dal::ast::NodeId> {
    let imp = cg.import(import);
    imp.ast
        .root_children(imp.root)
        .iter()
        .copied()
        .filter(|&c| matches!(imp.ast.node(c).kind, NodeKind::FnDef { .. }))
        .collect()
}

#[test]
fn analyzes_a_simple_program() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "pub fn add(a: u8, b: u8) -> u8 { return a + b }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    let root = cg.root_import().unwrap();
    let fn_id = cg.import(root).fn_table["add"];
    let table = cg.fn_table(fn_id);
    assert!(!table.is_external);
    assert!(table.def.is_some());

    // the body scope holds one local per parameter, in order
    let defs = fn_def_nodes(&cg, root);
    assert_eq!(defs.len(), 1);
    let node_cg = cg.import(root).cg(defs[0]);
    assert!(!node_cg.skip);
    let ctx = node_cg.root_ctx.unwrap();
    let locals = cg.ctxs[ctx.0].locals();
    assert_eq!(locals.len(), 2);
    for (i, (local, want)) in locals.iter().zip(["a", "b"]).enumerate() {
        assert_eq!(local.name, want);
        assert_eq!(local.arg_index, i as i32);
        assert!(local.is_const);
        assert_eq!(local.ty, cg.builtins().entry_u8);
    }
}

#[test]
fn resolves_every_prototype_type() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "fn f(p: *const u8, a: [i32; 3]) -> bool { return true }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    let root = cg.root_import().unwrap();
    let imp = cg.import(root);
    let proto_id = cg.fn_table(imp.fn_table["f"]).proto;
    let proto = imp.ast.as_proto(proto_id).unwrap().clone();

    let param_ty = |param: dal::ast::NodeId| match &imp.ast.node(param).kind {
        NodeKind::FnParam { ty, .. } => imp.cg(*ty).ty.unwrap(),
        other => panic!("expected parameter, found {other:?}"),
    };

    let ptr = param_ty(proto.params[0]);
    assert_eq!(ptr, cg.builtins().entry_str_lit);
    assert_eq!(cg.types.get(ptr).kind, TypeKind::Ptr);
    assert_eq!(cg.types.get(ptr).name, "*const u8");

    let arr = param_ty(proto.params[1]);
    assert_eq!(cg.types.get(arr).kind, TypeKind::Array);
    assert_eq!(cg.types.get(arr).name, "[i32; 3]");
    assert_eq!(cg.types.get(arr).array_len, 3);

    assert_eq!(imp.cg(proto.ret).ty.unwrap(), cg.builtins().entry_bool);
}

#[test]
fn rejects_a_variadic_definition() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "fn f(a: u8, ...) { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));

    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("variadic functions are not supported"));

    let root = cg.root_import().unwrap();
    assert!(!cg.import(root).fn_table.contains_key("f"));
    let defs = fn_def_nodes(&cg, root);
    assert!(cg.import(root).cg(defs[0]).skip);
}

#[test]
fn interns_pointer_types() {
    let context = Context::create();
    let mut cg = Codegen::new(&context, CodegenOptions::default()).unwrap();

    let u8_ty = cg.builtins().entry_u8;
    let p1 = cg.get_pointer_to(u8_ty, true);
    let p2 = cg.get_pointer_to(u8_ty, true);
    assert_eq!(p1, p2);
    // string literals were derived from the same entry at startup
    assert_eq!(p1, cg.builtins().entry_str_lit);
    assert_eq!(cg.types.lookup("*const u8"), Some(p1));

    // constness distinguishes entries
    let m1 = cg.get_pointer_to(u8_ty, false);
    assert_ne!(m1, p1);
    assert_eq!(m1, cg.get_pointer_to(u8_ty, false));
    assert_eq!(cg.types.get(m1).name, "*mut u8");
}

#[test]
fn interns_array_types_by_length() {
    let context = Context::create();
    let mut cg = Codegen::new(&context, CodegenOptions::default()).unwrap();

    let i32_ty = cg.builtins().entry_i32;
    let a1 = cg.get_array(i32_ty, 4);
    let a2 = cg.get_array(i32_ty, 4);
    assert_eq!(a1, a2);
    let a3 = cg.get_array(i32_ty, 5);
    assert_ne!(a1, a3);
    assert_eq!(cg.types.get(a1).name, "[i32; 4]");
    assert_eq!(cg.types.get(a1).elem, Some(i32_ty));
}

#[test]
fn rejects_a_duplicate_definition() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "fn f() -> i32 { return 1 }\nfn f() -> i32 { return 2 }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));

    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("already defined"));

    let root = cg.root_import().unwrap();
    let defs = fn_def_nodes(&cg, root);
    assert_eq!(defs.len(), 2);
    assert!(!cg.import(root).cg(defs[0]).skip);
    assert!(cg.import(root).cg(defs[1]).skip);

    // the surviving table entry is the first definition
    let fn_id = cg.import(root).fn_table["f"];
    assert_eq!(cg.fn_table(fn_id).def, Some(defs[0]));
}

#[test]
fn reports_an_unresolvable_import() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "import \"nope\"\nfn main() { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));

    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("nope"));
    let root_dir = dir.path().display().to_string();
    assert!(
        diags[0].message.contains(&root_dir),
        "diagnostic should name the searched roots: {}",
        diags[0].message
    );
}

#[test]
fn loads_each_import_once() {
    let dir = TempDir::new().unwrap();
    write_file(&dir, "util.dal", "pub fn helper() -> i32 { return 7 }");
    let entry = write_file(
        &dir,
        "main.dal",
        "import \"util\"\nimport \"util\"\nfn main() { }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    assert_eq!(cg.imports.len(), 2);
    let util = cg
        .imports
        .iter()
        .find(|i| i.module_name() == "util")
        .unwrap();
    assert!(util.fn_table.contains_key("helper"));
}

#[test]
fn registers_link_requests_and_extern_decls() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "@link(\"c\")\nextern {\n    pub fn puts(s: *const u8) -> i32\n}\nfn main() { }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    assert!(cg.link_table.contains_key("c"));

    let root = cg.root_import().unwrap();
    let fn_id = cg.import(root).fn_table["puts"];
    let table = cg.fn_table(fn_id);
    assert!(table.is_external);
    assert!(table.def.is_none());

    // public extern declarations are published module-qualified
    assert_eq!(cg.global_fn_table.get("main.puts"), Some(&fn_id));
}

#[test]
fn rejects_unknown_attributes() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "@frobnicate(\"x\")\nextern {\n    fn f() -> i32\n}",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unknown attribute"));
}

#[test]
fn accepts_inline_attributes_on_definitions_only() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(
        &dir,
        "main.dal",
        "@inline(\"hint\")\nfn fast() -> i32 { return 1 }",
    );

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    let root = cg.root_import().unwrap();
    let table = cg.fn_table(cg.import(root).fn_table["fast"]);
    assert_eq!(table.attrs.len(), 1);

    // the same attribute on an extern declaration is unknown
    let dir2 = TempDir::new().unwrap();
    let entry2 = write_file(
        &dir2,
        "main.dal",
        "extern {\n    @inline(\"hint\")\n    fn g() -> i32\n}",
    );
    let context2 = Context::create();
    let mut cg2 = Codegen::new(&context2, options_for(&dir2)).unwrap();
    let diags = expect_diagnostics(cg2.generate(&entry2));
    assert!(diags[0].message.contains("unknown attribute"));
}

#[test]
fn rejects_never_typed_parameters() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "fn f(x: !) { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("parameter of type '!'"));
}

#[test]
fn unknown_primitive_types_fall_back_to_invalid() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "fn f(x: quux) { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("unknown type"));

    let root = cg.root_import().unwrap();
    let defs = fn_def_nodes(&cg, root);
    let ctx = cg.import(root).cg(defs[0]).root_ctx.unwrap();
    let locals = cg.ctxs[ctx.0].locals();
    assert_eq!(locals[0].ty, cg.builtins().entry_invalid);
}

#[test]
fn rejects_duplicate_parameter_names() {
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "fn f(a: u8, a: i32) { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    let diags = expect_diagnostics(cg.generate(&entry));
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("duplicate parameter name"));

    // the clashing local's type is poisoned since the types differ
    let root = cg.root_import().unwrap();
    let defs = fn_def_nodes(&cg, root);
    let ctx = cg.import(root).cg(defs[0]).root_ctx.unwrap();
    let locals = cg.ctxs[ctx.0].locals();
    assert_eq!(locals.len(), 1);
    assert_eq!(locals[0].ty, cg.builtins().entry_invalid);
}

#[test]
fn resolves_imports_through_the_standard_library() {
    // `io` ships with the compiler; resolving it exercises the second
    // search root.
    let dir = TempDir::new().unwrap();
    let entry = write_file(&dir, "main.dal", "import \"io\"\nfn main() { }");

    let context = Context::create();
    let mut cg = Codegen::new(&context, options_for(&dir)).unwrap();
    cg.generate(&entry).unwrap();

    assert_eq!(cg.imports.len(), 2);
    assert!(cg.global_fn_table.contains_key("io.puts"));
    assert!(cg.link_table.contains_key("c"));
}
