//! Module-level WebAssembly construction: section bookkeeping, string-literal interning,
//! and the handful of built-in runtime functions the code generator wires into every
//! module it emits (`Theta.Math.pow`, `Theta.String.eq`, `Theta.String.concat`).
//!
//! Grounded on SPEC_FULL.md §4.6's "Module finalization" and "Operator lowering"
//! paragraphs; string representation is this expansion's own concrete encoding decision
//! (no stabilized `stringref` opcode exists in the vendored `wasm-encoder`) — see
//! DESIGN.md.

use rustc_hash::FxHashMap;
use wasm_encoder::{
    CodeSection, ConstExpr, DataSection, ExportKind, ExportSection, Function, FunctionSection,
    GlobalSection, GlobalType, MemArg, MemorySection, MemoryType, Module, TypeSection, ValType,
};

use theta_ast::nodes::TypeName;

use crate::codegen::CodegenError;

pub const POW_NAME: &str = "Theta.Math.pow";
pub const STRING_EQ_NAME: &str = "Theta.String.eq";
pub const STRING_CONCAT_NAME: &str = "Theta.String.concat";

/// Strings are length-prefixed byte blobs in linear memory: a 4-byte little-endian
/// length followed by UTF-8 bytes, addressed by an `i32` pointer to the length word.
const STRING_HEADER_BYTES: u32 = 4;

#[must_use]
pub fn wasm_value_type(name: TypeName) -> Option<ValType> {
    match name {
        TypeName::Number => Some(ValType::I64),
        TypeName::Boolean | TypeName::String => Some(ValType::I32),
        _ => None,
    }
}

/// Accumulates every section of the module under construction. Functions are appended
/// in emission order; `finish` serializes once every function has been pushed.
pub struct ModuleBuilder {
    types: TypeSection,
    functions: FunctionSection,
    exports: ExportSection,
    code: CodeSection,
    data: DataSection,
    next_type_index: u32,
    next_func_index: u32,
    /// mangled name -> (function index, return TypeName)
    registry: FxHashMap<String, (u32, TypeName)>,
    /// interned string literal bytes -> pointer into linear memory
    interned_strings: FxHashMap<String, i32>,
    data_cursor: i32,
}

/// Index of the module's single mutable global, the bump-allocation cursor used by
/// `Theta.String.concat`.
const BUMP_GLOBAL_INDEX: u32 = 0;

impl ModuleBuilder {
    #[must_use]
    pub fn new() -> Self {
        let mut exports = ExportSection::new();
        exports.export("memory", ExportKind::Memory, 0);
        let mut builder = Self {
            types: TypeSection::new(),
            functions: FunctionSection::new(),
            exports,
            code: CodeSection::new(),
            data: DataSection::new(),
            next_type_index: 0,
            next_func_index: 0,
            registry: FxHashMap::default(),
            interned_strings: FxHashMap::default(),
            // Reserve the zero address: a null/empty-string sentinel is never a valid
            // pointer, which keeps accidental zero-initialized locals from aliasing data.
            data_cursor: 8,
        };
        builder.register_builtins();
        builder
    }

    fn declare_type(&mut self, params: &[ValType], results: &[ValType]) -> u32 {
        let index = self.next_type_index;
        self.types.ty().function(params.iter().copied(), results.iter().copied());
        self.next_type_index += 1;
        index
    }

    /// Reserves a function slot (type + function-section entry) and returns the index
    /// the caller must later fill in with exactly one `CodeSection::function` push, in
    /// the same order reservations were made.
    pub fn declare_function(
        &mut self,
        mangled_name: String,
        params: &[ValType],
        result: Option<ValType>,
        return_type: TypeName,
        export: bool,
        export_name: &str,
    ) -> u32 {
        let results: Vec<ValType> = result.into_iter().collect();
        let type_index = self.declare_type(params, &results);
        self.functions.function(type_index);
        let index = self.next_func_index;
        self.next_func_index += 1;
        if export {
            self.exports.export(export_name, ExportKind::Func, index);
        }
        log::trace!("declared function #{index} `{mangled_name}` (export: {export})");
        self.registry.insert(mangled_name, (index, return_type));
        index
    }

    pub fn push_body(&mut self, function: &Function) {
        self.code.function(function);
    }

    #[must_use]
    pub fn lookup(&self, mangled_name: &str) -> Option<(u32, TypeName)> {
        self.registry.get(mangled_name).copied()
    }

    #[must_use]
    pub fn pow_index(&self) -> u32 {
        self.registry[POW_NAME].0
    }

    #[must_use]
    pub fn string_eq_index(&self) -> u32 {
        self.registry[STRING_EQ_NAME].0
    }

    #[must_use]
    pub fn string_concat_index(&self) -> u32 {
        self.registry[STRING_CONCAT_NAME].0
    }

    /// Interns a string literal into the data section, returning its pointer. Repeated
    /// literals with identical contents share one allocation.
    pub fn intern_string(&mut self, value: &str) -> i32 {
        if let Some(&ptr) = self.interned_strings.get(value) {
            return ptr;
        }
        let ptr = self.data_cursor;
        let bytes = value.as_bytes();
        let mut blob = Vec::with_capacity(STRING_HEADER_BYTES as usize + bytes.len());
        blob.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        blob.extend_from_slice(bytes);
        self.data.active(0, &ConstExpr::i32_const(ptr), blob.iter().copied());
        self.data_cursor += blob.len() as i32;
        self.interned_strings.insert(value.to_string(), ptr);
        ptr
    }

    fn register_builtins(&mut self) {
        self.build_pow();
        self.build_string_eq();
        self.build_string_concat();
    }

    /// `Theta.Math.pow(base, exponent) -> base ** exponent` via an iterative multiply
    /// loop; negative bases/exponents are an acknowledged gap (SPEC_FULL.md §4.6).
    fn build_pow(&mut self) {
        use wasm_encoder::Instruction as I;
        let index = self.declare_function(
            POW_NAME.to_string(),
            &[ValType::I64, ValType::I64],
            Some(ValType::I64),
            TypeName::Number,
            false,
            "",
        );
        debug_assert_eq!(self.registry[POW_NAME].0, index);
        // locals: 0=base, 1=exponent, 2=result, 3=counter
        let mut f = Function::new([(2, ValType::I64)]);
        f.instruction(&I::I64Const(1));
        f.instruction(&I::LocalSet(2));
        f.instruction(&I::I64Const(0));
        f.instruction(&I::LocalSet(3));
        f.instruction(&I::Loop(wasm_encoder::BlockType::Empty));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::LocalGet(1));
        f.instruction(&I::I64LtS);
        f.instruction(&I::If(wasm_encoder::BlockType::Empty));
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::I64Mul);
        f.instruction(&I::LocalSet(2));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I64Const(1));
        f.instruction(&I::I64Add);
        f.instruction(&I::LocalSet(3));
        f.instruction(&I::Br(1));
        f.instruction(&I::End); // if
        f.instruction(&I::End); // loop
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::End); // function
        self.push_body(&f);
    }

    /// `Theta.String.eq(a, b) -> i32`: byte-for-byte comparison of two length-prefixed
    /// string pointers.
    fn build_string_eq(&mut self) {
        use wasm_encoder::Instruction as I;
        self.declare_function(
            STRING_EQ_NAME.to_string(),
            &[ValType::I32, ValType::I32],
            Some(ValType::I32),
            TypeName::Boolean,
            false,
            "",
        );
        // locals: 0=a, 1=b, 2=len, 3=i
        let mut f = Function::new([(2, ValType::I32)]);
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::I32Load(MemArg { offset: 0, align: 2, memory_index: 0 }));
        f.instruction(&I::LocalGet(1));
        f.instruction(&I::I32Load(MemArg { offset: 0, align: 2, memory_index: 0 }));
        f.instruction(&I::I32Ne);
        f.instruction(&I::If(wasm_encoder::BlockType::Empty));
        f.instruction(&I::I32Const(0));
        f.instruction(&I::Return);
        f.instruction(&I::End);
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::I32Load(MemArg { offset: 0, align: 2, memory_index: 0 }));
        f.instruction(&I::LocalSet(2));
        f.instruction(&I::I32Const(0));
        f.instruction(&I::LocalSet(3));
        f.instruction(&I::Loop(wasm_encoder::BlockType::Empty));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::I32LtS);
        f.instruction(&I::If(wasm_encoder::BlockType::Empty));
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I32Add);
        f.instruction(&I::I32Load8U(MemArg { offset: STRING_HEADER_BYTES, align: 0, memory_index: 0 }));
        f.instruction(&I::LocalGet(1));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I32Add);
        f.instruction(&I::I32Load8U(MemArg { offset: STRING_HEADER_BYTES, align: 0, memory_index: 0 }));
        f.instruction(&I::I32Ne);
        f.instruction(&I::If(wasm_encoder::BlockType::Empty));
        f.instruction(&I::I32Const(0));
        f.instruction(&I::Return);
        f.instruction(&I::End);
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I32Const(1));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalSet(3));
        f.instruction(&I::Br(1));
        f.instruction(&I::End); // if
        f.instruction(&I::End); // loop
        f.instruction(&I::I32Const(1));
        f.instruction(&I::End); // function
        self.push_body(&f);
    }

    /// `Theta.String.concat(a, b) -> i32`: bump-allocates a fresh buffer past the
    /// interned-literal data and copies both operands into it.
    fn build_string_concat(&mut self) {
        use wasm_encoder::Instruction as I;
        self.declare_function(
            STRING_CONCAT_NAME.to_string(),
            &[ValType::I32, ValType::I32],
            Some(ValType::I32),
            TypeName::String,
            false,
            "",
        );
        // locals: 0=a, 1=b, 2=len_a, 3=len_b, 4=dest
        let mut f = Function::new([(3, ValType::I32)]);
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::I32Load(MemArg { offset: 0, align: 2, memory_index: 0 }));
        f.instruction(&I::LocalSet(2));
        f.instruction(&I::LocalGet(1));
        f.instruction(&I::I32Load(MemArg { offset: 0, align: 2, memory_index: 0 }));
        f.instruction(&I::LocalSet(3));
        f.instruction(&I::GlobalGet(BUMP_GLOBAL_INDEX));
        f.instruction(&I::LocalSet(4));
        // write the combined length header
        f.instruction(&I::LocalGet(4));
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I32Add);
        f.instruction(&I::I32Store(MemArg { offset: 0, align: 2, memory_index: 0 }));
        // copy `a`'s bytes
        f.instruction(&I::LocalGet(4));
        f.instruction(&I::I32Const(STRING_HEADER_BYTES as i32));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(0));
        f.instruction(&I::I32Const(STRING_HEADER_BYTES as i32));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::MemoryCopy { src_mem: 0, dst_mem: 0 });
        // copy `b`'s bytes after `a`'s
        f.instruction(&I::LocalGet(4));
        f.instruction(&I::I32Const(STRING_HEADER_BYTES as i32));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(1));
        f.instruction(&I::I32Const(STRING_HEADER_BYTES as i32));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::MemoryCopy { src_mem: 0, dst_mem: 0 });
        // advance the bump pointer past the new allocation
        f.instruction(&I::GlobalGet(BUMP_GLOBAL_INDEX));
        f.instruction(&I::I32Const(STRING_HEADER_BYTES as i32));
        f.instruction(&I::LocalGet(2));
        f.instruction(&I::I32Add);
        f.instruction(&I::LocalGet(3));
        f.instruction(&I::I32Add);
        f.instruction(&I::I32Add);
        f.instruction(&I::GlobalSet(BUMP_GLOBAL_INDEX));
        f.instruction(&I::LocalGet(4));
        f.instruction(&I::End);
        self.push_body(&f);
    }

    /// Emits the memory, global, and data sections and serializes the finished module.
    /// Called once, after every user function body has been pushed.
    pub fn finish(mut self) -> Result<Vec<u8>, CodegenError> {
        let mut memory_section = MemorySection::new();
        memory_section.memory(MemoryType { minimum: 1, maximum: None, memory64: false, shared: false, page_size_log2: None });

        let mut globals = GlobalSection::new();
        globals.global(
            GlobalType { val_type: ValType::I32, mutable: true, shared: false },
            &ConstExpr::i32_const(self.data_cursor),
        );

        let mut module = Module::new();
        module.section(&self.types);
        module.section(&self.functions);
        module.section(&memory_section);
        module.section(&globals);
        module.section(&self.exports);
        module.section(&self.code);
        module.section(&self.data);
        Ok(module.finish())
    }
}

impl Default for ModuleBuilder {
    fn default() -> Self {
        Self::new()
    }
}
