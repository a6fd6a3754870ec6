//! Symbols representing variables, functions, structures and interface blocks.

pub mod builtins;
mod id;
pub mod table;

pub use id::{IdAllocator, SymbolId, LAST_BUILTIN_ID};

use crate::{
    arena::{Arena, Handle},
    BlockStorage, ConstantUnion, Extension, Intrinsic, LayoutQualifier, Type, TypeInner,
};
use std::{borrow::Cow, fmt, sync::OnceLock};

/// Separates the name of a function from its parameter encodings.
pub const MANGLED_NAME_SEPARATOR: char = '(';

/// Where a symbol comes from.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum SymbolType {
    /// Known when the compiler is built, statically allocated.
    BuiltIn,
    /// Parsed from the source of the program.
    UserDefined,
    /// Synthesized by a pass, such as a temporary.
    ToolInternal,
    /// A symbol without a name.
    Empty,
}

/// A reference to a symbol: either one of the static built-ins, or a symbol
/// in the pool of the current compilation.
///
/// Two references are equal when they designate the same symbol.
#[derive(Clone, Copy)]
pub enum SymbolRef {
    BuiltIn(&'static Symbol),
    Pool(Handle<Symbol>),
}

impl SymbolRef {
    pub fn resolve(self, pool: &Arena<Symbol>) -> &Symbol {
        match self {
            SymbolRef::BuiltIn(symbol) => symbol,
            SymbolRef::Pool(handle) => &pool[handle],
        }
    }

    pub fn as_pool(self) -> Option<Handle<Symbol>> {
        match self {
            SymbolRef::BuiltIn(_) => None,
            SymbolRef::Pool(handle) => Some(handle),
        }
    }

    pub fn is_builtin(self) -> bool {
        matches!(self, SymbolRef::BuiltIn(_))
    }
}

impl From<Handle<Symbol>> for SymbolRef {
    fn from(handle: Handle<Symbol>) -> Self {
        SymbolRef::Pool(handle)
    }
}

impl PartialEq for SymbolRef {
    fn eq(&self, other: &Self) -> bool {
        match (*self, *other) {
            (SymbolRef::BuiltIn(a), SymbolRef::BuiltIn(b)) => a.id == b.id,
            (SymbolRef::Pool(a), SymbolRef::Pool(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for SymbolRef {}

impl std::hash::Hash for SymbolRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        match *self {
            SymbolRef::BuiltIn(symbol) => symbol.id.hash(state),
            SymbolRef::Pool(handle) => handle.hash(state),
        }
    }
}

impl fmt::Debug for SymbolRef {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SymbolRef::BuiltIn(symbol) => write!(f, "BuiltIn({})", symbol.name),
            SymbolRef::Pool(handle) => write!(f, "Pool{:?}", handle),
        }
    }
}

/// Where the value of a constant variable is stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstantRef {
    Static(&'static [ConstantUnion]),
    Pool(Handle<Vec<ConstantUnion>>),
}

/// A symbol with its identity.
///
/// The name and identity never change after construction; the only
/// exception is the dedicated struct renaming done by
/// [`regenerate_struct_names`](crate::ops::regenerate_struct_names).
#[derive(Debug)]
pub struct Symbol {
    name: Cow<'static, str>,
    id: SymbolId,
    symbol_type: SymbolType,
    extension: Extension,
    kind: SymbolKind,
}

#[derive(Debug)]
pub enum SymbolKind {
    Variable(Variable),
    Structure(Structure),
    InterfaceBlock(InterfaceBlock),
    Function(Function),
}

impl Symbol {
    pub(crate) fn new(
        id: SymbolId,
        name: Cow<'static, str>,
        symbol_type: SymbolType,
        extension: Extension,
        kind: SymbolKind,
    ) -> Self {
        debug_assert!(
            !name.is_empty() || symbol_type != SymbolType::UserDefined,
            "user-defined symbols must be named"
        );
        debug_assert_eq!(id.is_builtin(), symbol_type == SymbolType::BuiltIn);
        Symbol {
            name,
            id,
            symbol_type,
            extension,
            kind,
        }
    }

    /// Constructor for the static built-ins.
    pub(crate) const fn builtin(
        id: SymbolId,
        name: &'static str,
        extension: Extension,
        kind: SymbolKind,
    ) -> Self {
        Symbol {
            name: Cow::Borrowed(name),
            id,
            symbol_type: SymbolType::BuiltIn,
            extension,
            kind,
        }
    }

    /// The name of the symbol.
    ///
    /// Nameless temporaries and parameters get a name derived from their
    /// identity, the same way for every backend.
    pub fn name(&self) -> Cow<str> {
        if !self.name.is_empty() {
            return Cow::Borrowed(&self.name);
        }
        debug_assert!(
            self.symbol_type == SymbolType::ToolInternal
                || (self.symbol_type == SymbolType::Empty && self.is_variable()),
            "only internal symbols and nameless variables have generated names"
        );
        Cow::Owned(format!("s{:x}", self.id.get()))
    }

    /// The name as written, possibly empty.
    pub fn raw_name(&self) -> &str {
        &self.name
    }

    /// The key of the symbol in its scope.
    ///
    /// For functions this encodes the type of every parameter, and is cached
    /// after the first call. Variables, structures and interface blocks just
    /// use their name.
    ///
    /// # Panics
    ///
    /// Nameless symbols have no mangled name.
    pub fn mangled_name<'a>(&'a self, pool: &Arena<Symbol>) -> Cow<'a, str> {
        assert_ne!(
            self.symbol_type,
            SymbolType::Empty,
            "mangled name requested for a nameless symbol"
        );
        match self.kind {
            SymbolKind::Function(ref function) => {
                Cow::Borrowed(function.mangled_name(&self.name, pool))
            }
            _ => self.name(),
        }
    }

    pub fn id(&self) -> SymbolId {
        self.id
    }

    pub fn symbol_type(&self) -> SymbolType {
        self.symbol_type
    }

    pub fn extension(&self) -> Extension {
        self.extension
    }

    pub fn kind(&self) -> &SymbolKind {
        &self.kind
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, SymbolKind::Function(_))
    }

    pub fn is_variable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.kind, SymbolKind::Structure(_))
    }

    pub fn is_interface_block(&self) -> bool {
        matches!(self.kind, SymbolKind::InterfaceBlock(_))
    }

    /// Returns `true` for the entry point of the program.
    pub fn is_main(&self) -> bool {
        self.is_function() && self.name == "main"
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self.kind {
            SymbolKind::Variable(ref variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_variable_mut(&mut self) -> Option<&mut Variable> {
        match self.kind {
            SymbolKind::Variable(ref mut variable) => Some(variable),
            _ => None,
        }
    }

    pub fn as_structure(&self) -> Option<&Structure> {
        match self.kind {
            SymbolKind::Structure(ref structure) => Some(structure),
            _ => None,
        }
    }

    pub fn as_interface_block(&self) -> Option<&InterfaceBlock> {
        match self.kind {
            SymbolKind::InterfaceBlock(ref block) => Some(block),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match self.kind {
            SymbolKind::Function(ref function) => Some(function),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut Function> {
        match self.kind {
            SymbolKind::Function(ref mut function) => Some(function),
            _ => None,
        }
    }

    /// Fields of a structure or interface block, empty for other symbols.
    pub fn fields(&self) -> &[Field] {
        match self.kind {
            SymbolKind::Structure(ref structure) => structure.fields(),
            SymbolKind::InterfaceBlock(ref block) => block.fields(),
            _ => &[],
        }
    }

    pub(crate) fn kind_mut(&mut self) -> &mut SymbolKind {
        &mut self.kind
    }

    pub(crate) fn set_name(&mut self, name: String) {
        debug_assert!(self.is_struct(), "only structures can be renamed");
        self.name = Cow::Owned(name);
    }
}

/// A variable.
///
/// May store the value of a constant variable of any type. Both the type and
/// the constant values are shared, never owned by the variable itself.
#[derive(Debug)]
pub struct Variable {
    ty: Type,
    constant: Option<ConstantRef>,
}

impl Variable {
    pub const fn new(ty: Type) -> Self {
        Variable { ty, constant: None }
    }

    pub(crate) const fn constant(ty: Type, values: &'static [ConstantUnion]) -> Self {
        Variable {
            ty,
            constant: Some(ConstantRef::Static(values)),
        }
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }

    pub fn const_pointer(&self) -> Option<ConstantRef> {
        self.constant
    }

    pub fn share_const_pointer(&mut self, values: ConstantRef) {
        self.constant = Some(values);
    }
}

/// A field of a structure or interface block.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: Cow<'static, str>,
    pub ty: Type,
    pub layout: LayoutQualifier,
}

impl Field {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: Type) -> Self {
        Field {
            name: name.into(),
            ty,
            layout: LayoutQualifier::EMPTY,
        }
    }
}

#[derive(Debug)]
enum Fields {
    Static(&'static [Field]),
    Pool(Vec<Field>),
}

impl Fields {
    fn as_slice(&self) -> &[Field] {
        match *self {
            Fields::Static(fields) => fields,
            Fields::Pool(ref fields) => fields,
        }
    }
}

/// A sampler extracted from a structure by [`Structure::collect_samplers`].
#[derive(Clone, Debug, PartialEq)]
pub struct SamplerField {
    /// Name of the flattened variable.
    pub name: String,
    /// Name of the original field path, as seen by the API.
    pub api_name: String,
    pub ty: Type,
}

/// A structure type.
#[derive(Debug)]
pub struct Structure {
    fields: Fields,
    at_global_scope: bool,
}

impl Structure {
    pub fn new(fields: Vec<Field>) -> Self {
        Structure {
            fields: Fields::Pool(fields),
            at_global_scope: false,
        }
    }

    pub(crate) const fn builtin(fields: &'static [Field]) -> Self {
        Structure {
            fields: Fields::Static(fields),
            at_global_scope: true,
        }
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    pub fn at_global_scope(&self) -> bool {
        self.at_global_scope
    }

    pub fn set_at_global_scope(&mut self, at_global_scope: bool) {
        self.at_global_scope = at_global_scope;
    }

    pub fn contains_samplers(&self, pool: &Arena<Symbol>) -> bool {
        self.fields().iter().any(|field| match field.ty.inner {
            TypeInner::Sampler(_) => true,
            TypeInner::Struct(r) => r
                .resolve(pool)
                .as_structure()
                .map_or(false, |s| s.contains_samplers(pool)),
            _ => false,
        })
    }

    /// Flatten every sampler inside this structure, recursing through nested
    /// structures and arrays.
    ///
    /// Each sampler is reported as `name_prefix_field[_index]`, together with
    /// the API-visible path `api_name_prefix.field[index]`.
    pub fn collect_samplers(
        &self,
        name_prefix: &str,
        api_name_prefix: &str,
        pool: &Arena<Symbol>,
        output: &mut Vec<SamplerField>,
    ) {
        for field in self.fields() {
            let name = format!("{}_{}", name_prefix, field.name);
            let api_name = format!("{}.{}", api_name_prefix, field.name);
            collect_type_samplers(&field.ty, name, api_name, pool, output);
        }
    }
}

fn collect_type_samplers(
    ty: &Type,
    name: String,
    api_name: String,
    pool: &Arena<Symbol>,
    output: &mut Vec<SamplerField>,
) {
    if let Some(size) = ty.array_size {
        let element = ty.element();
        for index in 0..size.get() {
            collect_type_samplers(
                &element,
                format!("{}_{}", name, index),
                format!("{}[{}]", api_name, index),
                pool,
                output,
            );
        }
        return;
    }

    match ty.inner {
        TypeInner::Sampler(_) => output.push(SamplerField {
            name,
            api_name,
            ty: *ty,
        }),
        TypeInner::Struct(r) => {
            if let Some(structure) = r.resolve(pool).as_structure() {
                structure.collect_samplers(&name, &api_name, pool, output);
            }
        }
        _ => {}
    }
}

/// An interface block type.
///
/// This holds the block name, not the instance name: block instances are
/// variables whose type refers to the block.
#[derive(Debug)]
pub struct InterfaceBlock {
    fields: Fields,
    block_storage: BlockStorage,
    binding: Option<u32>,
}

impl InterfaceBlock {
    pub fn new(fields: Vec<Field>, layout: &LayoutQualifier) -> Self {
        InterfaceBlock {
            fields: Fields::Pool(fields),
            block_storage: layout.block_storage.unwrap_or(BlockStorage::Shared),
            binding: layout.binding,
        }
    }

    pub fn fields(&self) -> &[Field] {
        self.fields.as_slice()
    }

    pub fn block_storage(&self) -> BlockStorage {
        self.block_storage
    }

    pub fn block_binding(&self) -> Option<u32> {
        self.binding
    }
}

#[derive(Clone, Debug)]
enum Parameters {
    Static(&'static [&'static Symbol]),
    Pool(Vec<Handle<Symbol>>),
}

#[derive(Clone, Debug)]
enum MangledName {
    Static(&'static str),
    Lazy(OnceLock<String>),
}

/// A function.
#[derive(Clone, Debug)]
pub struct Function {
    parameters: Parameters,
    return_type: Type,
    mangled_name: MangledName,
    op: Option<Intrinsic>,
    defined: bool,
    has_prototype_declaration: bool,
    known_to_not_have_side_effects: bool,
}

impl Function {
    /// A user-defined or internal function, without parameters yet.
    pub fn new(return_type: Type, known_to_not_have_side_effects: bool) -> Self {
        Function {
            parameters: Parameters::Pool(Vec::new()),
            return_type,
            mangled_name: MangledName::Lazy(OnceLock::new()),
            op: None,
            defined: false,
            has_prototype_declaration: false,
            known_to_not_have_side_effects,
        }
    }

    pub(crate) const fn builtin(
        parameters: &'static [&'static Symbol],
        return_type: Type,
        mangled_name: &'static str,
        op: Intrinsic,
    ) -> Self {
        Function {
            parameters: Parameters::Static(parameters),
            return_type,
            mangled_name: MangledName::Static(mangled_name),
            op: Some(op),
            defined: false,
            has_prototype_declaration: false,
            known_to_not_have_side_effects: true,
        }
    }

    pub fn add_parameter(&mut self, parameter: Handle<Symbol>) {
        match self.parameters {
            Parameters::Pool(ref mut parameters) => parameters.push(parameter),
            Parameters::Static(_) => unreachable!("built-in functions are immutable"),
        }
        // the signature changed
        self.mangled_name = MangledName::Lazy(OnceLock::new());
    }

    /// Reuse the parameters of a prototype for its definition, so both
    /// refer to the same parameter variables.
    pub fn share_parameters(&mut self, source: &Function) {
        let parameters = match source.parameters {
            Parameters::Pool(ref parameters) => parameters.clone(),
            Parameters::Static(_) => unreachable!("built-in functions have no definition"),
        };
        self.parameters = Parameters::Pool(parameters);
        self.mangled_name = match source.mangled_name {
            MangledName::Lazy(ref cache) => {
                let shared = OnceLock::new();
                if let Some(name) = cache.get() {
                    let _ = shared.set(name.clone());
                }
                MangledName::Lazy(shared)
            }
            MangledName::Static(name) => MangledName::Static(name),
        };
    }

    pub fn param_count(&self) -> usize {
        match self.parameters {
            Parameters::Static(parameters) => parameters.len(),
            Parameters::Pool(ref parameters) => parameters.len(),
        }
    }

    pub fn param(&self, index: usize) -> SymbolRef {
        match self.parameters {
            Parameters::Static(parameters) => SymbolRef::BuiltIn(parameters[index]),
            Parameters::Pool(ref parameters) => SymbolRef::Pool(parameters[index]),
        }
    }

    pub fn params(&self) -> impl Iterator<Item = SymbolRef> + '_ {
        (0..self.param_count()).map(move |index| self.param(index))
    }

    pub fn return_type(&self) -> &Type {
        &self.return_type
    }

    /// The intrinsic a built-in implements.
    pub fn builtin_op(&self) -> Option<Intrinsic> {
        self.op
    }

    pub fn set_defined(&mut self) {
        self.defined = true;
    }

    pub fn is_defined(&self) -> bool {
        self.defined
    }

    pub fn set_has_prototype_declaration(&mut self) {
        self.has_prototype_declaration = true;
    }

    pub fn has_prototype_declaration(&self) -> bool {
        self.has_prototype_declaration
    }

    pub fn is_known_to_not_have_side_effects(&self) -> bool {
        self.known_to_not_have_side_effects
    }

    fn mangled_name<'a>(&'a self, name: &str, pool: &Arena<Symbol>) -> &'a str {
        match self.mangled_name {
            MangledName::Static(mangled) => mangled,
            MangledName::Lazy(ref cache) => {
                cache.get_or_init(|| self.build_mangled_name(name, pool))
            }
        }
    }

    pub(crate) fn build_mangled_name(&self, name: &str, pool: &Arena<Symbol>) -> String {
        let mut mangled = String::with_capacity(name.len() + 1 + 4 * self.param_count());
        mangled.push_str(name);
        mangled.push(MANGLED_NAME_SEPARATOR);
        for param in self.params() {
            let variable = param
                .resolve(pool)
                .as_variable()
                .expect("function parameters are variables");
            variable.ty().write_mangled(pool, &mut mangled);
        }
        mangled
    }
}

/// A function parameter while its declaration is being parsed.
///
/// It turns into a variable exactly once: afterwards both its name and type
/// are cleared.
#[derive(Debug)]
pub struct Parameter {
    name: Option<Cow<'static, str>>,
    ty: Option<Type>,
}

impl Parameter {
    pub fn new(name: impl Into<Cow<'static, str>>, ty: Type) -> Self {
        Parameter {
            name: Some(name.into()),
            ty: Some(ty),
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.ty.is_none()
    }

    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    /// Destructively convert into a variable of `table`.
    ///
    /// # Panics
    ///
    /// If the parameter was already converted.
    pub fn take_variable(&mut self, table: &mut table::SymbolTable) -> Handle<Symbol> {
        let ty = self
            .ty
            .take()
            .expect("parameter already converted to a variable");
        let name = self.name.take().unwrap_or_default();
        let symbol_type = if name.is_empty() {
            SymbolType::Empty
        } else {
            SymbolType::UserDefined
        };
        table.create_variable(name, ty, symbol_type)
    }

    /// Same as [`take_variable`](Self::take_variable), consuming the
    /// parameter.
    pub fn into_variable(mut self, table: &mut table::SymbolTable) -> Handle<Symbol> {
        self.take_variable(table)
    }
}

#[cfg(test)]
mod tests {
    use super::{table::SymbolTable, *};
    use crate::{ScalarKind, VectorSize};

    #[test]
    fn mangled_name_is_cached() {
        let mut table = SymbolTable::default();
        let function = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
        let param = table.create_variable("x", Type::FLOAT, SymbolType::UserDefined);
        table.add_parameter(function, param);

        let symbol = &table.symbols()[function];
        let first = symbol.mangled_name(table.symbols());
        let second = symbol.mangled_name(table.symbols());
        assert_eq!(first, "f(f;");
        assert_eq!(first, second);
        // the second call returns the cached string
        assert!(std::ptr::eq(first.as_ptr(), second.as_ptr()));
    }

    #[test]
    fn mangled_names_follow_signatures() {
        let mut table = SymbolTable::default();
        let mut mangle = |name: &'static str, params: &[Type]| {
            let function = table.create_function(name, SymbolType::UserDefined, Type::VOID, false);
            for &ty in params {
                let param = table.create_variable("p", ty, SymbolType::UserDefined);
                table.add_parameter(function, param);
            }
            table.symbols()[function]
                .mangled_name(table.symbols())
                .into_owned()
        };

        let vec2 = Type::vector(ScalarKind::Float, VectorSize::Bi);
        let a = mangle("f", &[Type::FLOAT, vec2]);
        let b = mangle("f", &[Type::FLOAT, vec2]);
        let c = mangle("f", &[vec2, Type::FLOAT]);
        let d = mangle("g", &[Type::FLOAT, vec2]);
        let e = mangle("f", &[Type::FLOAT]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert_ne!(a, e);
    }

    #[test]
    fn parameter_is_consumed_once() {
        let mut table = SymbolTable::default();
        let mut parameter = Parameter::new("x", Type::INT);
        let variable = parameter.take_variable(&mut table);
        assert!(parameter.is_consumed());
        assert!(parameter.ty().is_none());
        assert_eq!(table.symbols()[variable].raw_name(), "x");
        assert_eq!(
            table.symbols()[variable].symbol_type(),
            SymbolType::UserDefined
        );
    }

    #[test]
    #[should_panic(expected = "already converted")]
    fn parameter_cannot_be_consumed_twice() {
        let mut table = SymbolTable::default();
        let mut parameter = Parameter::new("x", Type::INT);
        parameter.take_variable(&mut table);
        parameter.take_variable(&mut table);
    }

    #[test]
    fn nameless_parameter_is_empty() {
        let mut table = SymbolTable::default();
        let variable = Parameter::new("", Type::FLOAT).into_variable(&mut table);
        let symbol = &table.symbols()[variable];
        assert_eq!(symbol.symbol_type(), SymbolType::Empty);
        assert_eq!(symbol.name(), format!("s{:x}", symbol.id().get()));
    }

    #[test]
    #[should_panic(expected = "nameless symbol")]
    fn empty_symbol_has_no_mangled_name() {
        let mut table = SymbolTable::default();
        let variable = Parameter::new("", Type::FLOAT).into_variable(&mut table);
        let _ = table.symbols()[variable].mangled_name(table.symbols());
    }

    #[test]
    fn shared_parameters_keep_identities() {
        let mut table = SymbolTable::default();
        let prototype = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
        let param = table.create_variable("x", Type::FLOAT, SymbolType::UserDefined);
        table.add_parameter(prototype, param);
        let definition = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
        table.share_parameters(definition, prototype);

        let function = table.symbols()[definition].as_function().unwrap();
        assert_eq!(function.param_count(), 1);
        assert_eq!(function.param(0), SymbolRef::Pool(param));
        assert_eq!(
            table.symbols()[definition].mangled_name(table.symbols()),
            table.symbols()[prototype].mangled_name(table.symbols())
        );
    }

    #[test]
    fn sampler_fields_are_flattened() {
        use crate::SamplerKind;
        use std::num::NonZeroU32;

        let mut table = SymbolTable::default();
        let inner = table.create_structure(
            "Inner",
            vec![
                Field::new("tex", Type::sampler(SamplerKind::Sampler2D)),
                Field::new("scale", Type::FLOAT),
            ],
            SymbolType::UserDefined,
        );
        let outer = table.create_structure(
            "Outer",
            vec![
                Field::new("cube", Type::sampler(SamplerKind::SamplerCube)),
                Field::new(
                    "inner",
                    Type::new(TypeInner::Struct(inner.into()))
                        .array_of(NonZeroU32::new(2).unwrap()),
                ),
            ],
            SymbolType::UserDefined,
        );

        let mut samplers = Vec::new();
        table.symbols()[outer]
            .as_structure()
            .unwrap()
            .collect_samplers("s", "u", table.symbols(), &mut samplers);
        let names: Vec<_> = samplers
            .iter()
            .map(|s| (s.name.as_str(), s.api_name.as_str()))
            .collect();
        assert_eq!(
            names,
            [
                ("s_cube", "u.cube"),
                ("s_inner_0_tex", "u.inner[0].tex"),
                ("s_inner_1_tex", "u.inner[1].tex"),
            ]
        );
        assert!(table.symbols()[outer]
            .as_structure()
            .unwrap()
            .contains_samplers(table.symbols()));
    }
}
