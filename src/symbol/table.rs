//! Scope-aware symbol table.
//!
//! The table owns the pool every user-defined and internal symbol of a
//! compilation is allocated from, and binds names to symbols in a stack of
//! lexical scopes. The outermost scope holds the built-ins, the next one the
//! global declarations of the program.

use super::{
    builtins, ConstantRef, Field, Function, IdAllocator, InterfaceBlock, Structure, Symbol,
    SymbolKind, SymbolRef, SymbolType, Variable,
};
use crate::{
    arena::{Arena, Handle},
    ConstantUnion, Extension, FastHashMap, FastHashSet, LayoutQualifier, ShaderStage,
    ShaderVersion, Type,
};
use std::borrow::Cow;

const BUILTIN_LEVEL: usize = 0;
const GLOBAL_LEVEL: usize = 1;

#[derive(Clone, Debug, thiserror::Error, PartialEq)]
pub enum DeclarationError {
    #[error("Redefinition of `{name}`")]
    Redefinition { name: String },
}

/// Selects the built-ins visible to a program.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub struct BuiltinOptions {
    pub version: ShaderVersion,
    pub stage: ShaderStage,
    /// Extensions enabled by the program.
    pub extensions: Vec<Extension>,
}

impl Default for BuiltinOptions {
    fn default() -> Self {
        BuiltinOptions {
            version: ShaderVersion::Essl100,
            stage: ShaderStage::Fragment,
            extensions: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Scope {
    /// Symbols keyed by their mangled name.
    symbols: FastHashMap<String, SymbolRef>,
    /// Base names of the functions declared in this scope.
    function_names: FastHashSet<String>,
}

impl Scope {
    fn insert(&mut self, key: String, symbol: &Symbol, reference: SymbolRef) -> bool {
        if self.symbols.contains_key(&key) {
            return false;
        }
        let name = symbol.raw_name();
        if symbol.is_function() {
            if self.symbols.contains_key(name) {
                return false;
            }
            self.function_names.insert(name.to_string());
        } else if self.function_names.contains(name) {
            return false;
        }
        self.symbols.insert(key, reference);
        true
    }
}

#[derive(Debug)]
pub struct SymbolTable {
    symbols: Arena<Symbol>,
    constants: Arena<Vec<ConstantUnion>>,
    ids: IdAllocator,
    scopes: Vec<Scope>,
    options: BuiltinOptions,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new(BuiltinOptions::default())
    }
}

impl SymbolTable {
    /// Create a table with the built-ins available under `options` and an
    /// empty global scope.
    pub fn new(options: BuiltinOptions) -> Self {
        let mut builtin_scope = Scope::default();
        let pool = Arena::new();
        for entry in builtins::entries() {
            let enabled = |ext| options.extensions.contains(&ext);
            if !entry.is_available(options.version, options.stage, enabled) {
                continue;
            }
            let symbol = entry.symbol;
            let key = symbol.mangled_name(&pool).into_owned();
            let inserted = builtin_scope.insert(key, symbol, SymbolRef::BuiltIn(symbol));
            debug_assert!(inserted, "built-in {} declared twice", symbol.raw_name());
        }
        log::trace!(
            "Injected {} built-ins for {:?} {:?}",
            builtin_scope.symbols.len(),
            options.version,
            options.stage
        );

        SymbolTable {
            symbols: pool,
            constants: Arena::new(),
            ids: IdAllocator::new(),
            scopes: vec![builtin_scope, Scope::default()],
            options,
        }
    }

    pub fn options(&self) -> &BuiltinOptions {
        &self.options
    }

    /// The pool of user-defined and internal symbols.
    pub fn symbols(&self) -> &Arena<Symbol> {
        &self.symbols
    }

    pub fn get(&self, symbol: SymbolRef) -> &Symbol {
        symbol.resolve(&self.symbols)
    }

    /// Mutable access to a pool symbol. Built-ins are never mutable.
    pub fn get_mut(&mut self, handle: Handle<Symbol>) -> &mut Symbol {
        &mut self.symbols[handle]
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(Scope::default());
        log::trace!("Entering scope level {}", self.scopes.len() - 1);
    }

    /// # Panics
    ///
    /// When trying to pop the global scope.
    pub fn pop_scope(&mut self) {
        assert!(
            self.scopes.len() > GLOBAL_LEVEL + 1,
            "the global scope cannot be popped"
        );
        self.scopes.pop();
        log::trace!("Leaving scope level {}", self.scopes.len());
    }

    pub fn is_global_scope(&self) -> bool {
        self.scopes.len() == GLOBAL_LEVEL + 1
    }

    /// Level of the current scope, the global one being 1.
    pub fn scope_level(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bind a pool symbol in the current scope.
    ///
    /// Nameless symbols are never bound. Structures remember whether they
    /// were declared at global scope.
    pub fn declare(&mut self, handle: Handle<Symbol>) -> Result<(), DeclarationError> {
        let at_global_scope = self.is_global_scope();
        if let SymbolKind::Structure(ref mut structure) = *self.symbols[handle].kind_mut() {
            structure.set_at_global_scope(at_global_scope);
        }

        let symbol = &self.symbols[handle];
        if symbol.symbol_type() == SymbolType::Empty {
            return Ok(());
        }
        let key = symbol.mangled_name(&self.symbols).into_owned();
        log::trace!("Declaring {} ({:?}) at level {}", key, symbol.id(), self.scope_level());

        let level = self.scopes.len() - 1;
        if self.scopes[level].insert(key, symbol, SymbolRef::Pool(handle)) {
            Ok(())
        } else {
            Err(DeclarationError::Redefinition {
                name: symbol.raw_name().to_string(),
            })
        }
    }

    /// Find the innermost binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<SymbolRef> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.symbols.get(name).copied())
    }

    /// Find a function overload by its exact mangled name.
    pub fn lookup_function(&self, mangled_name: &str) -> Option<SymbolRef> {
        self.lookup(mangled_name)
            .filter(|&symbol| self.get(symbol).is_function())
    }

    /// Returns `true` if a function called `name` is visible.
    pub fn has_function_named(&self, name: &str) -> bool {
        self.scopes
            .iter()
            .any(|scope| scope.function_names.contains(name))
    }

    pub fn find_global(&self, name: &str) -> Option<SymbolRef> {
        self.scopes[GLOBAL_LEVEL].symbols.get(name).copied()
    }

    pub fn find_builtin(&self, name: &str) -> Option<SymbolRef> {
        self.scopes[BUILTIN_LEVEL].symbols.get(name).copied()
    }

    fn allocate(
        &mut self,
        name: Cow<'static, str>,
        symbol_type: SymbolType,
        kind: SymbolKind,
    ) -> Handle<Symbol> {
        let id = self.ids.allocate();
        self.symbols.append(Symbol::new(
            id,
            name,
            symbol_type,
            Extension::Undefined,
            kind,
        ))
    }

    pub fn create_variable(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        ty: Type,
        symbol_type: SymbolType,
    ) -> Handle<Symbol> {
        self.allocate(
            name.into(),
            symbol_type,
            SymbolKind::Variable(Variable::new(ty)),
        )
    }

    pub fn create_structure(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        fields: Vec<Field>,
        symbol_type: SymbolType,
    ) -> Handle<Symbol> {
        self.allocate(
            name.into(),
            symbol_type,
            SymbolKind::Structure(Structure::new(fields)),
        )
    }

    pub fn create_interface_block(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        fields: Vec<Field>,
        layout: &LayoutQualifier,
        symbol_type: SymbolType,
    ) -> Handle<Symbol> {
        self.allocate(
            name.into(),
            symbol_type,
            SymbolKind::InterfaceBlock(InterfaceBlock::new(fields, layout)),
        )
    }

    pub fn create_function(
        &mut self,
        name: impl Into<Cow<'static, str>>,
        symbol_type: SymbolType,
        return_type: Type,
        known_to_not_have_side_effects: bool,
    ) -> Handle<Symbol> {
        self.allocate(
            name.into(),
            symbol_type,
            SymbolKind::Function(Function::new(return_type, known_to_not_have_side_effects)),
        )
    }

    fn function_mut(&mut self, handle: Handle<Symbol>) -> &mut Function {
        match self.symbols[handle].as_function_mut() {
            Some(function) => function,
            None => unreachable!("{:?} is not a function", handle),
        }
    }

    pub fn add_parameter(&mut self, function: Handle<Symbol>, parameter: Handle<Symbol>) {
        debug_assert!(self.symbols[parameter].is_variable());
        self.function_mut(function).add_parameter(parameter);
    }

    /// Make `definition` refer to the parameters of `prototype`.
    pub fn share_parameters(&mut self, definition: Handle<Symbol>, prototype: Handle<Symbol>) {
        let source = self.function_mut(prototype).clone();
        self.function_mut(definition).share_parameters(&source);
    }

    /// Move constant data into the pool.
    pub fn add_constant_values(&mut self, values: Vec<ConstantUnion>) -> ConstantRef {
        ConstantRef::Pool(self.constants.append(values))
    }

    pub fn constant_values(&self, values: ConstantRef) -> &[ConstantUnion] {
        match values {
            ConstantRef::Static(values) => values,
            ConstantRef::Pool(handle) => &self.constants[handle],
        }
    }

    /// Create one internal variable per sampler found in `structure`,
    /// recording the API-visible name of each in `api_names`.
    pub fn create_sampler_symbols(
        &mut self,
        structure: SymbolRef,
        name_prefix: &str,
        api_name_prefix: &str,
        api_names: &mut FastHashMap<Handle<Symbol>, String>,
    ) -> Vec<Handle<Symbol>> {
        let mut samplers = Vec::new();
        if let Some(structure) = self.get(structure).as_structure() {
            structure.collect_samplers(name_prefix, api_name_prefix, &self.symbols, &mut samplers);
        }
        samplers
            .into_iter()
            .map(|sampler| {
                let handle =
                    self.create_variable(sampler.name, sampler.ty, SymbolType::ToolInternal);
                api_names.insert(handle, sampler.api_name);
                handle
            })
            .collect()
    }

    /// Give a structure a new name. Its scope binding is left unchanged.
    pub(crate) fn rename_structure(&mut self, handle: Handle<Symbol>, name: String) {
        self.symbols[handle].set_name(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Qualifier, SamplerKind, ScalarKind, TypeInner, VectorSize};

    fn user_variable(table: &mut SymbolTable, name: &'static str) -> Handle<Symbol> {
        table.create_variable(name, Type::FLOAT, SymbolType::UserDefined)
    }

    #[test]
    fn scopes_shadow_and_expire() {
        let mut table = SymbolTable::default();
        let outer = user_variable(&mut table, "a");
        table.declare(outer).unwrap();

        table.push_scope();
        assert_eq!(table.lookup("a"), Some(SymbolRef::Pool(outer)));
        let inner = user_variable(&mut table, "a");
        table.declare(inner).unwrap();
        let only_inner = user_variable(&mut table, "b");
        table.declare(only_inner).unwrap();
        assert_eq!(table.lookup("a"), Some(SymbolRef::Pool(inner)));
        table.pop_scope();

        assert_eq!(table.lookup("a"), Some(SymbolRef::Pool(outer)));
        assert_eq!(table.lookup("b"), None);
    }

    #[test]
    fn redefinition_in_same_scope() {
        let mut table = SymbolTable::default();
        let first = user_variable(&mut table, "a");
        let second = user_variable(&mut table, "a");
        table.declare(first).unwrap();
        assert_eq!(
            table.declare(second),
            Err(DeclarationError::Redefinition {
                name: "a".to_string()
            })
        );
    }

    #[test]
    fn variable_cannot_take_function_name() {
        let mut table = SymbolTable::default();
        let function = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
        table.declare(function).unwrap();
        let variable = user_variable(&mut table, "f");
        assert!(table.declare(variable).is_err());
    }

    #[test]
    fn overloads_resolve_by_signature() {
        let mut table = SymbolTable::default();
        let declare = |table: &mut SymbolTable, ty: Type| {
            let function = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
            let param = table.create_variable("x", ty, SymbolType::UserDefined);
            table.add_parameter(function, param);
            table.declare(function).unwrap();
            function
        };
        let float = declare(&mut table, Type::FLOAT);
        let int = declare(&mut table, Type::INT);

        assert_eq!(table.lookup_function("f(f;"), Some(SymbolRef::Pool(float)));
        assert_eq!(table.lookup_function("f(i;"), Some(SymbolRef::Pool(int)));
        assert_eq!(table.lookup_function("f(b;"), None);
        assert!(table.has_function_named("f"));

        let again = table.create_function("f", SymbolType::UserDefined, Type::VOID, false);
        let param = table.create_variable("y", Type::FLOAT, SymbolType::UserDefined);
        table.add_parameter(again, param);
        assert!(table.declare(again).is_err());
    }

    #[test]
    #[should_panic(expected = "global scope")]
    fn global_scope_is_permanent() {
        let mut table = SymbolTable::default();
        table.pop_scope();
    }

    #[test]
    fn builtins_follow_the_profile() {
        let essl1 = SymbolTable::default();
        let frag_color = essl1.find_builtin("gl_FragColor").unwrap();
        assert!(frag_color.is_builtin());
        assert_eq!(essl1.get(frag_color).id(), builtins::GL_FRAG_COLOR.id());
        assert!(essl1.lookup_function("texture2D(s2;f2;").is_some());
        assert!(essl1.lookup_function("texture(s2;f2;").is_none());
        assert!(essl1.lookup_function("dFdx(f;").is_none());
        assert!(essl1.lookup("gl_Position").is_none());

        let essl3 = SymbolTable::new(BuiltinOptions {
            version: ShaderVersion::Essl300,
            stage: ShaderStage::Vertex,
            extensions: Vec::new(),
        });
        assert!(essl3.lookup("gl_Position").is_some());
        assert!(essl3.lookup("gl_VertexID").is_some());
        assert!(essl3.lookup("gl_FragColor").is_none());
        assert!(essl3.lookup_function("transpose(m22;").is_some());
        assert!(essl3.lookup_function("dFdx(f3;").is_some());

        let derivatives = SymbolTable::new(BuiltinOptions {
            extensions: vec![Extension::OesStandardDerivatives],
            ..BuiltinOptions::default()
        });
        let dfdx = derivatives.lookup_function("dFdx(f;").unwrap();
        assert_eq!(
            derivatives.get(dfdx).extension(),
            Extension::OesStandardDerivatives
        );
    }

    #[test]
    fn user_symbols_may_shadow_builtins() {
        let mut table = SymbolTable::default();
        let radians = table.create_function("radians", SymbolType::UserDefined, Type::FLOAT, false);
        let param = table.create_variable("x", Type::FLOAT, SymbolType::UserDefined);
        table.add_parameter(radians, param);
        table.declare(radians).unwrap();
        assert_eq!(
            table.lookup_function("radians(f;"),
            Some(SymbolRef::Pool(radians))
        );
        assert!(table.find_builtin("radians(f;").unwrap().is_builtin());
    }

    #[test]
    fn structures_know_their_scope() {
        let mut table = SymbolTable::default();
        let global = table.create_structure(
            "G",
            vec![Field::new("x", Type::FLOAT)],
            SymbolType::UserDefined,
        );
        table.declare(global).unwrap();
        table.push_scope();
        let local = table.create_structure(
            "L",
            vec![Field::new("x", Type::FLOAT)],
            SymbolType::UserDefined,
        );
        table.declare(local).unwrap();

        let at_global = |handle: Handle<Symbol>| {
            table.symbols()[handle]
                .as_structure()
                .unwrap()
                .at_global_scope()
        };
        assert!(at_global(global));
        assert!(!at_global(local));
        assert_eq!(table.find_global("G"), Some(SymbolRef::Pool(global)));
        assert_eq!(table.find_global("L"), None);
    }

    #[test]
    fn nameless_symbols_are_not_bound() {
        let mut table = SymbolTable::default();
        let first = table.create_structure("", Vec::new(), SymbolType::Empty);
        let second = table.create_structure("", Vec::new(), SymbolType::Empty);
        table.declare(first).unwrap();
        table.declare(second).unwrap();
        assert_eq!(table.lookup(""), None);
    }

    #[test]
    fn constant_values() {
        let mut table = SymbolTable::default();
        let values = table.add_constant_values(vec![ConstantUnion::Float(1.0)]);
        let variable = table.create_variable(
            "k",
            Type::FLOAT.with_qualifier(Qualifier::Const),
            SymbolType::UserDefined,
        );
        table
            .get_mut(variable)
            .as_variable_mut()
            .unwrap()
            .share_const_pointer(values);

        let shared = table.symbols()[variable]
            .as_variable()
            .unwrap()
            .const_pointer()
            .unwrap();
        assert_eq!(table.constant_values(shared), &[ConstantUnion::Float(1.0)]);

        let max_draw_buffers = table.lookup("gl_MaxDrawBuffers").unwrap();
        let builtin = table
            .get(max_draw_buffers)
            .as_variable()
            .unwrap()
            .const_pointer()
            .unwrap();
        assert_eq!(table.constant_values(builtin), &[ConstantUnion::Sint(1)]);
    }

    #[test]
    fn interface_block_layout() {
        let mut table = SymbolTable::default();
        let layout = LayoutQualifier {
            binding: Some(3),
            block_storage: Some(crate::BlockStorage::Std140),
            ..LayoutQualifier::EMPTY
        };
        let block = table.create_interface_block(
            "Lights",
            vec![Field::new(
                "color",
                Type::vector(ScalarKind::Float, VectorSize::Quad),
            )],
            &layout,
            SymbolType::UserDefined,
        );
        let block = table.symbols()[block].as_interface_block().unwrap();
        assert_eq!(block.block_storage(), crate::BlockStorage::Std140);
        assert_eq!(block.block_binding(), Some(3));

        let default = InterfaceBlock::new(Vec::new(), &LayoutQualifier::EMPTY);
        assert_eq!(default.block_storage(), crate::BlockStorage::Shared);
        assert_eq!(default.block_binding(), None);
    }

    #[test]
    fn sampler_symbols_are_internal() {
        let mut table = SymbolTable::default();
        let structure = table.create_structure(
            "S",
            vec![
                Field::new("a", Type::sampler(SamplerKind::Sampler2D)),
                Field::new("b", Type::FLOAT),
            ],
            SymbolType::UserDefined,
        );
        let mut api_names = FastHashMap::default();
        let samplers =
            table.create_sampler_symbols(structure.into(), "s", "u", &mut api_names);
        assert_eq!(samplers.len(), 1);
        let sampler = &table.symbols()[samplers[0]];
        assert_eq!(sampler.raw_name(), "s_a");
        assert_eq!(sampler.symbol_type(), SymbolType::ToolInternal);
        assert!(matches!(
            sampler.as_variable().unwrap().ty().inner,
            TypeInner::Sampler(SamplerKind::Sampler2D)
        ));
        assert_eq!(api_names[&samplers[0]], "u.a");
    }
}
