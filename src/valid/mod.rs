//! Structural validation of a [`Tree`].
//!
//! Passes run on a valid tree, so a validation failure after a pass always
//! points at a defect of that pass.

mod construct;

use crate::{
    arena::{BadHandle, Handle},
    tree::{AggregateOp, BinaryOperator, BranchKind, Node, Tree},
    FastHashSet, ScalarKind, SymbolRef, SymbolTable, Type, TypeInner,
};
use bit_set::BitSet;

pub use construct::validate_construct;

bitflags::bitflags! {
    /// Validation flags.
    #[cfg_attr(feature = "serialize", derive(serde::Serialize))]
    #[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
    pub struct ValidationFlags: u8 {
        /// Symbol handles stored in the nodes.
        const HANDLES = 0x1;
        /// Every node has at most one parent.
        const SINGLE_PARENT = 0x2;
        /// Types of expressions agree with their operands.
        const TYPES = 0x4;
        /// Constructor argument counts match the constructed type.
        const CONSTRUCTORS = 0x8;
        /// Variables are declared before use and calls name functions.
        const REFERENCES = 0x10;
    }
}

impl Default for ValidationFlags {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Clone, Debug, thiserror::Error)]
#[cfg_attr(test, derive(PartialEq))]
pub enum ValidationError {
    #[error(transparent)]
    InvalidHandle(#[from] BadHandle),
    #[error("Node {0:?} has more than one parent")]
    MultipleParents(Handle<Node>),
    #[error("Node {node:?} has unexpected type {found:?}")]
    TypeMismatch { node: Handle<Node>, found: Type },
    #[error("Constructor {node:?} expects {expected} components but {given} were given")]
    ConstructorSize {
        node: Handle<Node>,
        expected: u32,
        given: u32,
    },
    #[error("Index {index} of {node:?} is out of bounds for size {size}")]
    IndexOutOfBounds {
        node: Handle<Node>,
        index: u32,
        size: u32,
    },
    #[error("Variable `{name}` used by {node:?} is not declared")]
    UndeclaredVariable { node: Handle<Node>, name: String },
    #[error("Call {0:?} does not refer to a known function")]
    UnknownFunction(Handle<Node>),
    #[error("Node {0:?} is not a valid statement here")]
    ExpectedStatement(Handle<Node>),
    #[error("Node {0:?} is not an expression")]
    ExpectedExpression(Handle<Node>),
    #[error("Node {node:?} writes to the read-only built-in `{name}`")]
    BuiltInModified { node: Handle<Node>, name: String },
}

/// Checks trees after each pass.
///
/// Validation only reads the tree, so it can be run any number of times.
#[derive(Debug)]
pub struct Validator {
    flags: ValidationFlags,
    visited: BitSet,
    scopes: Vec<FastHashSet<SymbolRef>>,
    return_type: Option<Type>,
}

impl Validator {
    pub fn new(flags: ValidationFlags) -> Self {
        Validator {
            flags,
            visited: BitSet::new(),
            scopes: Vec::new(),
            return_type: None,
        }
    }

    pub fn flags(&self) -> ValidationFlags {
        self.flags
    }

    /// Check the given tree to be valid.
    pub fn validate(&mut self, tree: &Tree, symbols: &SymbolTable) -> Result<(), ValidationError> {
        self.visited.clear();
        self.scopes.clear();
        self.return_type = None;

        let root = tree.root();
        if !matches!(*self.node(tree, root)?, Node::Block(_)) {
            return Err(ValidationError::ExpectedStatement(root));
        }
        self.validate_block(tree, symbols, root)
    }

    fn node<'t>(
        &mut self,
        tree: &'t Tree,
        handle: Handle<Node>,
    ) -> Result<&'t Node, ValidationError> {
        let node = tree.nodes.try_get(handle)?;
        if self.flags.contains(ValidationFlags::SINGLE_PARENT)
            && !self.visited.insert(handle.index())
        {
            return Err(ValidationError::MultipleParents(handle));
        }
        Ok(node)
    }

    fn symbol_ref(&self, symbols: &SymbolTable, symbol: SymbolRef) -> Result<(), ValidationError> {
        match symbol {
            SymbolRef::Pool(handle) if self.flags.contains(ValidationFlags::HANDLES) => {
                symbols.symbols().check_contains_handle(handle)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn declare(&mut self, symbol: SymbolRef) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(symbol);
        }
    }

    fn is_declared(&self, symbol: SymbolRef) -> bool {
        symbol.is_builtin() || self.scopes.iter().any(|scope| scope.contains(&symbol))
    }

    /// Validate a block whose node was already fetched.
    fn validate_block(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        block: Handle<Node>,
    ) -> Result<(), ValidationError> {
        let statements = match tree[block] {
            Node::Block(ref statements) => statements,
            _ => return Err(ValidationError::ExpectedStatement(block)),
        };
        self.scopes.push(FastHashSet::default());
        for &statement in statements {
            self.validate_statement(tree, symbols, statement)?;
        }
        self.scopes.pop();
        Ok(())
    }

    fn validate_body(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        body: Handle<Node>,
    ) -> Result<(), ValidationError> {
        match *self.node(tree, body)? {
            Node::Block(_) => self.validate_block(tree, symbols, body),
            _ => Err(ValidationError::ExpectedStatement(body)),
        }
    }

    fn validate_condition(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        condition: Handle<Node>,
    ) -> Result<(), ValidationError> {
        let ty = self.validate_expression(tree, symbols, condition)?;
        if self.flags.contains(ValidationFlags::TYPES) && !ty.same_shape(&Type::BOOL) {
            return Err(ValidationError::TypeMismatch {
                node: condition,
                found: ty,
            });
        }
        Ok(())
    }

    fn validate_statement(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        handle: Handle<Node>,
    ) -> Result<(), ValidationError> {
        let node = self.node(tree, handle)?;
        match *node {
            Node::Block(_) => self.validate_block(tree, symbols, handle),
            Node::Declaration {
                symbol,
                initializer,
            } => {
                if let Some(initializer) = initializer {
                    let init_ty = self.validate_expression(tree, symbols, initializer)?;
                    let var_ty = *tree
                        .ty(symbol)
                        .ok_or(ValidationError::ExpectedExpression(symbol))?;
                    if self.flags.contains(ValidationFlags::TYPES) && !init_ty.same_shape(&var_ty)
                    {
                        return Err(ValidationError::TypeMismatch {
                            node: initializer,
                            found: init_ty,
                        });
                    }
                }
                match *self.node(tree, symbol)? {
                    Node::Symbol { symbol: variable, ty } => {
                        self.symbol_ref(symbols, variable)?;
                        let declared = match symbols.get(variable).as_variable() {
                            Some(var) => *var.ty(),
                            None => return Err(ValidationError::ExpectedExpression(symbol)),
                        };
                        if self.flags.contains(ValidationFlags::TYPES) && !declared.same_shape(&ty)
                        {
                            return Err(ValidationError::TypeMismatch {
                                node: symbol,
                                found: ty,
                            });
                        }
                        self.declare(variable);
                        Ok(())
                    }
                    _ => Err(ValidationError::ExpectedExpression(symbol)),
                }
            }
            Node::IfElse {
                condition,
                accept,
                reject,
            } => {
                self.validate_condition(tree, symbols, condition)?;
                self.validate_body(tree, symbols, accept)?;
                match reject {
                    Some(reject) => self.validate_body(tree, symbols, reject),
                    None => Ok(()),
                }
            }
            Node::Loop {
                init,
                condition,
                expression,
                body,
                ..
            } => {
                self.scopes.push(FastHashSet::default());
                if let Some(init) = init {
                    self.validate_statement(tree, symbols, init)?;
                }
                if let Some(condition) = condition {
                    self.validate_condition(tree, symbols, condition)?;
                }
                if let Some(expression) = expression {
                    self.validate_expression(tree, symbols, expression)?;
                }
                self.validate_body(tree, symbols, body)?;
                self.scopes.pop();
                Ok(())
            }
            Node::Branch { kind, value } => {
                let value = match value {
                    Some(value) => value,
                    None => return Ok(()),
                };
                let ty = self.validate_expression(tree, symbols, value)?;
                match self.return_type {
                    Some(ref expected)
                        if kind == BranchKind::Return
                            && self.flags.contains(ValidationFlags::TYPES)
                            && !expected.same_shape(&ty) =>
                    {
                        Err(ValidationError::TypeMismatch {
                            node: value,
                            found: ty,
                        })
                    }
                    _ => Ok(()),
                }
            }
            Node::FunctionPrototype { function } => {
                self.validate_function_ref(symbols, handle, function)?;
                Ok(())
            }
            Node::FunctionDefinition { function, body } => {
                if self.return_type.is_some() {
                    return Err(ValidationError::ExpectedStatement(handle));
                }
                self.validate_function_ref(symbols, handle, function)?;
                let function = match symbols.get(function).as_function() {
                    Some(function) => function,
                    None => return Err(ValidationError::UnknownFunction(handle)),
                };
                self.scopes.push(function.params().collect());
                self.return_type = Some(*function.return_type());
                let result = self.validate_body(tree, symbols, body);
                self.return_type = None;
                self.scopes.pop();
                result
            }
            ref expression => self
                .validate_expression_node(tree, symbols, handle, expression)
                .map(|_| ()),
        }
    }

    fn validate_function_ref(
        &self,
        symbols: &SymbolTable,
        node: Handle<Node>,
        function: SymbolRef,
    ) -> Result<(), ValidationError> {
        if let SymbolRef::Pool(handle) = function {
            if symbols.symbols().check_contains_handle(handle).is_err() {
                return Err(ValidationError::UnknownFunction(node));
            }
        }
        if symbols.get(function).is_function() {
            Ok(())
        } else {
            Err(ValidationError::UnknownFunction(node))
        }
    }

    /// The root variable of an l-value, if it is a read-only built-in.
    fn read_only_builtin(
        &self,
        tree: &Tree,
        symbols: &SymbolTable,
        mut lvalue: Handle<Node>,
    ) -> Option<String> {
        loop {
            match tree[lvalue] {
                Node::Binary { op, left, .. } if op.is_index() => lvalue = left,
                Node::Symbol { symbol, .. } => {
                    let symbol = symbols.get(symbol);
                    let read_only = symbol.id().is_builtin()
                        && symbol
                            .as_variable()
                            .map_or(false, |var| var.ty().qualifier.is_read_only());
                    return if read_only {
                        Some(symbol.raw_name().to_string())
                    } else {
                        None
                    };
                }
                _ => return None,
            }
        }
    }

    fn check_writable(
        &self,
        tree: &Tree,
        symbols: &SymbolTable,
        node: Handle<Node>,
        lvalue: Handle<Node>,
    ) -> Result<(), ValidationError> {
        match self.read_only_builtin(tree, symbols, lvalue) {
            Some(name) => Err(ValidationError::BuiltInModified { node, name }),
            None => Ok(()),
        }
    }

    fn validate_expression(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        handle: Handle<Node>,
    ) -> Result<Type, ValidationError> {
        let node = self.node(tree, handle)?;
        self.validate_expression_node(tree, symbols, handle, node)
    }

    /// Validate an expression whose node was already fetched.
    fn validate_expression_node(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
        handle: Handle<Node>,
        node: &Node,
    ) -> Result<Type, ValidationError> {
        let check_types = self.flags.contains(ValidationFlags::TYPES);
        let mismatch = |node, found| Err(ValidationError::TypeMismatch { node, found });

        match *node {
            Node::Symbol { symbol, ty } => {
                self.symbol_ref(symbols, symbol)?;
                let resolved = symbols.get(symbol);
                let declared = match resolved.as_variable() {
                    Some(var) => *var.ty(),
                    None => {
                        return Err(ValidationError::UndeclaredVariable {
                            node: handle,
                            name: resolved.raw_name().to_string(),
                        })
                    }
                };
                if self.flags.contains(ValidationFlags::REFERENCES) && !self.is_declared(symbol) {
                    return Err(ValidationError::UndeclaredVariable {
                        node: handle,
                        name: resolved.raw_name().to_string(),
                    });
                }
                if check_types && !declared.same_shape(&ty) {
                    return mismatch(handle, ty);
                }
                Ok(ty)
            }
            Node::Constant { ref values, ty } => {
                let consistent = ty.is_struct()
                    || (values.len() as u32 == ty.object_size(symbols.symbols())
                        && values
                            .iter()
                            .all(|value| Some(value.scalar_kind()) == ty.scalar_kind()));
                if check_types && !consistent {
                    return mismatch(handle, ty);
                }
                Ok(ty)
            }
            Node::Binary {
                op,
                left,
                right,
                ty,
            } => {
                let left_ty = self.validate_expression(tree, symbols, left)?;
                let right_ty = self.validate_expression(tree, symbols, right)?;
                if op.is_assignment() {
                    self.check_writable(tree, symbols, handle, left)?;
                }
                if !check_types {
                    return Ok(ty);
                }
                if op == BinaryOperator::IndexDirect {
                    if let Some(index) = crate::tree::util::direct_index(tree, right) {
                        let size = if let Some(size) = left_ty.array_size {
                            size.get()
                        } else {
                            left_ty.nominal_size()
                        };
                        if index >= size {
                            return Err(ValidationError::IndexOutOfBounds {
                                node: handle,
                                index,
                                size,
                            });
                        }
                    }
                }
                match binary_result(op, &left_ty, &right_ty) {
                    Some(expected) if expected.same_shape(&ty) => Ok(ty),
                    _ => mismatch(handle, ty),
                }
            }
            Node::Unary { op, operand, ty } => {
                let operand_ty = self.validate_expression(tree, symbols, operand)?;
                if op.is_mutating() {
                    self.check_writable(tree, symbols, handle, operand)?;
                }
                let valid = operand_ty.same_shape(&ty)
                    && match op {
                        crate::tree::UnaryOperator::LogicalNot => ty.same_shape(&Type::BOOL),
                        _ => ty.scalar_kind() != Some(ScalarKind::Bool),
                    };
                if check_types && !valid {
                    return mismatch(handle, ty);
                }
                Ok(ty)
            }
            Node::Ternary {
                condition,
                accept,
                reject,
                ty,
            } => {
                self.validate_condition(tree, symbols, condition)?;
                let accept_ty = self.validate_expression(tree, symbols, accept)?;
                let reject_ty = self.validate_expression(tree, symbols, reject)?;
                if check_types && !(accept_ty.same_shape(&ty) && reject_ty.same_shape(&ty)) {
                    return mismatch(handle, ty);
                }
                Ok(ty)
            }
            Node::Aggregate {
                op,
                ref arguments,
                ty,
            } => {
                let mut argument_types = Vec::with_capacity(arguments.len());
                for &argument in arguments {
                    let arg_ty = self.validate_expression(tree, symbols, argument)?;
                    argument_types.push((argument, arg_ty));
                }
                match op {
                    AggregateOp::Construct => {
                        if self.flags.contains(ValidationFlags::CONSTRUCTORS) {
                            validate_construct(handle, &ty, &argument_types, symbols.symbols())?;
                        }
                    }
                    AggregateOp::Call(function) => {
                        if self.flags.contains(ValidationFlags::REFERENCES) {
                            self.validate_function_ref(symbols, handle, function)?;
                        }
                        if check_types {
                            self.validate_call(symbols, handle, function, &argument_types, &ty)?;
                        }
                    }
                }
                Ok(ty)
            }
            _ => Err(ValidationError::ExpectedExpression(handle)),
        }
    }

    fn validate_call(
        &self,
        symbols: &SymbolTable,
        node: Handle<Node>,
        function: SymbolRef,
        arguments: &[(Handle<Node>, Type)],
        ty: &Type,
    ) -> Result<(), ValidationError> {
        let function = match symbols.get(function).as_function() {
            Some(function) => function,
            None => return Err(ValidationError::UnknownFunction(node)),
        };
        if function.param_count() != arguments.len() {
            return Err(ValidationError::UnknownFunction(node));
        }
        for (param, &(argument, arg_ty)) in function.params().zip(arguments) {
            let matches = symbols
                .get(param)
                .as_variable()
                .map_or(false, |var| var.ty().same_shape(&arg_ty));
            if !matches {
                return Err(ValidationError::TypeMismatch {
                    node: argument,
                    found: arg_ty,
                });
            }
        }
        if function.return_type().same_shape(ty) {
            Ok(())
        } else {
            Err(ValidationError::TypeMismatch { node, found: *ty })
        }
    }
}

/// The type produced by `left op right`, if the operands are compatible.
fn binary_result(op: BinaryOperator, left: &Type, right: &Type) -> Option<Type> {
    use BinaryOperator as Bo;

    let same_kind = left.scalar_kind().is_some() && left.scalar_kind() == right.scalar_kind();
    match op {
        Bo::Assign => left.same_shape(right).then(|| *left),
        Bo::Comma => Some(*right),
        Bo::IndexDirect | Bo::IndexIndirect => {
            let index_ok = right.is_scalar()
                && matches!(right.scalar_kind(), Some(ScalarKind::Sint) | Some(ScalarKind::Uint));
            if index_ok {
                left.indexed()
            } else {
                None
            }
        }
        Bo::LogicalAnd | Bo::LogicalOr | Bo::LogicalXor => {
            (left.same_shape(&Type::BOOL) && right.same_shape(&Type::BOOL)).then(|| Type::BOOL)
        }
        Bo::Equal | Bo::NotEqual => left.same_shape(right).then(|| Type::BOOL),
        Bo::Less | Bo::Greater | Bo::LessEqual | Bo::GreaterEqual => {
            (left.is_scalar()
                && left.same_shape(right)
                && left.scalar_kind() != Some(ScalarKind::Bool))
                .then(|| Type::BOOL)
        }
        Bo::Add | Bo::Subtract | Bo::Multiply | Bo::Divide => {
            if !same_kind || left.is_array() || right.is_array() {
                return None;
            }
            if left.same_shape(right) {
                // component-wise, except for the linear algebra product
                return match (op, left.inner) {
                    (Bo::Multiply, TypeInner::Matrix { columns, rows }) if columns != rows => None,
                    _ => Some(*left),
                };
            }
            if left.is_scalar() {
                return Some(*right);
            }
            if right.is_scalar() {
                return Some(*left);
            }
            if op != Bo::Multiply {
                return None;
            }
            match (left.inner, right.inner) {
                (TypeInner::Matrix { columns, rows }, TypeInner::Vector { size, .. })
                    if size == columns =>
                {
                    Some(Type::vector(ScalarKind::Float, rows))
                }
                (TypeInner::Vector { size, .. }, TypeInner::Matrix { columns, rows })
                    if size == rows =>
                {
                    Some(Type::vector(ScalarKind::Float, columns))
                }
                (
                    TypeInner::Matrix { columns, rows },
                    TypeInner::Matrix {
                        columns: right_columns,
                        rows: right_rows,
                    },
                ) if columns == right_rows => Some(Type::matrix(right_columns, rows)),
                _ => None,
            }
        }
    }
}
