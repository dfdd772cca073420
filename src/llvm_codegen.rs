use std::collections::HashMap;
use std::path::{Path, PathBuf};

use inkwell::builder::Builder;
use inkwell::context::Context;
use inkwell::module::Module as LlvmModule;
use inkwell::targets::{CodeModel, InitializationConfig, RelocMode, Target, TargetMachine};
use inkwell::types::AnyType;
use inkwell::OptimizationLevel;

use crate::analyzer;
use crate::diagnostics::{Diagnostic, Span};
use crate::module_loader;
use crate::symbols::{
    BlockCtx, BuiltinTypes, FnId, FnTable, ImportId, ImportTable, TypeEntry, TypeId, TypeKind,
    TypeStore,
};
use crate::CompileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    Debug,
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutType {
    Exe,
    Lib,
    Obj,
}

#[derive(Debug, Clone)]
pub struct CodegenOptions {
    pub root_dir: PathBuf,
    pub build_mode: BuildMode,
    pub out_type: OutType,
    pub out_path: PathBuf,
    pub static_link: bool,
    pub strip_symbols: bool,
    pub verbose: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("."),
            build_mode: BuildMode::Debug,
            out_type: OutType::Exe,
            out_path: PathBuf::from("a.out"),
            static_link: false,
            strip_symbols: false,
            verbose: false,
        }
    }
}

/// Owns the whole pipeline: LLVM collaborator state, the global symbol
/// and type maps, every loaded import, and the accumulated diagnostics.
pub struct Codegen<'ctx> {
    context: &'ctx Context,
    pub module: LlvmModule<'ctx>,
    pub builder: Builder<'ctx>,
    pub target_machine: TargetMachine,
    ptr_size_bytes: u32,

    options: CodegenOptions,
    pub search_paths: Vec<PathBuf>,

    pub types: TypeStore<'ctx>,
    builtins: BuiltinTypes,
    pub imports: Vec<ImportTable>,
    pub import_map: HashMap<PathBuf, ImportId>,
    pub fns: Vec<FnTable>,
    /// Exported functions, keyed `"<module>.<fn>"`.
    pub global_fn_table: HashMap<String, FnId>,
    /// Libraries requested via `@link("...")`.
    pub link_table: HashMap<String, bool>,
    pub ctxs: Vec<BlockCtx<'ctx>>,
    pub errors: Vec<Diagnostic>,
    root_import: Option<ImportId>,
}

impl<'ctx> Codegen<'ctx> {
    pub fn new(context: &'ctx Context, options: CodegenOptions) -> Result<Self, CompileError> {
        Target::initialize_all(&InitializationConfig::default());
        Target::initialize_native(&InitializationConfig::default()).map_err(CompileError::Llvm)?;

        let triple = TargetMachine::get_default_triple();
        let target =
            Target::from_triple(&triple).map_err(|e| CompileError::Llvm(e.to_string()))?;

        let cpu = TargetMachine::get_host_cpu_name();
        let features = TargetMachine::get_host_cpu_features();

        let opt_level = match options.build_mode {
            BuildMode::Debug => OptimizationLevel::None,
            BuildMode::Release => OptimizationLevel::Aggressive,
        };
        let reloc_mode = if options.static_link {
            RelocMode::Static
        } else {
            RelocMode::PIC
        };

        let target_machine = target
            .create_target_machine(
                &triple,
                cpu.to_str().map_err(|e| CompileError::Llvm(e.to_string()))?,
                features
                    .to_str()
                    .map_err(|e| CompileError::Llvm(e.to_string()))?,
                opt_level,
                reloc_mode,
                CodeModel::Default,
            )
            .ok_or_else(|| CompileError::Llvm("failed to create target machine".to_string()))?;

        let module = context.create_module("dal");
        module.set_triple(&triple);
        let target_data = target_machine.get_target_data();
        module.set_data_layout(&target_data.get_data_layout());
        let ptr_size_bytes = target_data.get_pointer_byte_size(None);

        let builder = context.create_builder();

        let mut types = TypeStore::new();
        let builtins = Self::define_primitive_types(&mut types, context, ptr_size_bytes * 8);

        Ok(Self {
            context,
            module,
            builder,
            target_machine,
            ptr_size_bytes,
            options,
            search_paths: Vec::new(),
            types,
            builtins,
            imports: Vec::new(),
            import_map: HashMap::new(),
            fns: Vec::new(),
            global_fn_table: HashMap::new(),
            link_table: HashMap::new(),
            ctxs: Vec::new(),
            errors: Vec::new(),
            root_import: None,
        })
    }

    fn define_primitive_types(
        types: &mut TypeStore<'ctx>,
        context: &'ctx Context,
        ptr_bits: u32,
    ) -> BuiltinTypes {
        let entry_invalid = {
            let mut entry = TypeEntry::new(TypeKind::Invalid);
            entry.name = "(invalid)".to_string();
            // not registered by name: nothing in source may resolve to it
            types.add(entry)
        };
        let entry_bool = {
            let mut entry = TypeEntry::new(TypeKind::Bool);
            entry.name = "bool".to_string();
            entry.llvm = Some(context.bool_type().as_any_type_enum());
            entry.size_in_bits = 1;
            entry.align_in_bits = 8;
            types.insert(entry)
        };
        let entry_u8 = {
            let mut entry = TypeEntry::new(TypeKind::Int);
            entry.name = "u8".to_string();
            entry.llvm = Some(context.i8_type().as_any_type_enum());
            entry.size_in_bits = 8;
            entry.align_in_bits = 8;
            types.insert(entry)
        };
        // string literals are *const u8
        let entry_str_lit = types.pointer_to(entry_u8, true, ptr_bits);
        let entry_i32 = {
            let mut entry = TypeEntry::new(TypeKind::Int);
            entry.name = "i32".to_string();
            entry.llvm = Some(context.i32_type().as_any_type_enum());
            entry.size_in_bits = 32;
            entry.align_in_bits = 32;
            entry.is_signed = true;
            types.insert(entry)
        };
        let entry_isize = {
            let mut entry = TypeEntry::new(TypeKind::Int);
            entry.name = "isize".to_string();
            entry.llvm = Some(context.custom_width_int_type(ptr_bits).as_any_type_enum());
            entry.size_in_bits = ptr_bits;
            entry.align_in_bits = ptr_bits;
            entry.is_signed = true;
            types.insert(entry)
        };
        let entry_void = {
            let mut entry = TypeEntry::new(TypeKind::Void);
            entry.name = "void".to_string();
            entry.llvm = Some(context.void_type().as_any_type_enum());
            types.insert(entry)
        };
        let entry_no_return = {
            let mut entry = TypeEntry::new(TypeKind::NoReturn);
            entry.name = "!".to_string();
            entry.llvm = Some(context.void_type().as_any_type_enum());
            types.insert(entry)
        };

        BuiltinTypes {
            entry_invalid,
            entry_void,
            entry_bool,
            entry_no_return,
            entry_u8,
            entry_i32,
            entry_isize,
            entry_str_lit,
        }
    }

    /// Compile `entry_file` and everything it transitively imports, up
    /// to the end of semantic analysis. Code emission is a later phase.
    pub fn generate(&mut self, entry_file: &Path) -> Result<(), CompileError> {
        self.search_paths.push(self.options.root_dir.clone());
        self.search_paths.push(PathBuf::from(crate::DAL_STD_DIR));

        let root = module_loader::add_code(self, entry_file)?;
        self.root_import = Some(root);

        analyzer::analyze(self);

        if !self.errors.is_empty() {
            return Err(CompileError::Diagnostics(std::mem::take(&mut self.errors)));
        }
        if self.options.verbose {
            println!("\nsemantic analysis: all good");
        }
        Ok(())
    }

    pub fn context(&self) -> &'ctx Context {
        self.context
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    pub fn verbose(&self) -> bool {
        self.options.verbose
    }

    pub fn ptr_size_bytes(&self) -> u32 {
        self.ptr_size_bytes
    }

    pub fn builtins(&self) -> BuiltinTypes {
        self.builtins
    }

    pub fn root_import(&self) -> Option<ImportId> {
        self.root_import
    }

    pub fn import(&self, id: ImportId) -> &ImportTable {
        &self.imports[id.0]
    }

    pub fn import_mut(&mut self, id: ImportId) -> &mut ImportTable {
        &mut self.imports[id.0]
    }

    pub fn fn_table(&self, id: FnId) -> &FnTable {
        &self.fns[id.0]
    }

    /// Interned pointer type; repeated calls return the same id.
    pub fn get_pointer_to(&mut self, child: TypeId, is_const: bool) -> TypeId {
        self.types.pointer_to(child, is_const, self.ptr_size_bytes * 8)
    }

    /// Interned array type; repeated calls return the same id.
    pub fn get_array(&mut self, elem: TypeId, len: i64) -> TypeId {
        self.types.array_of(elem, len)
    }

    pub fn add_error(&mut self, import: ImportId, span: Span, message: impl Into<String>) {
        let import = &self.imports[import.0];
        self.errors
            .push(Diagnostic::new(message, &import.path, span, &import.source));
    }
}
