//! Helpers for passes building new nodes.

use super::{BinaryOperator, Node, Tree};
use crate::{
    arena::Handle,
    symbol::{Symbol, SymbolType},
    ConstantUnion, Precision, Qualifier, SymbolTable, Type,
};

/// A constant `int` usable as a direct index.
pub fn create_index_node(tree: &mut Tree, index: u32) -> Handle<Node> {
    tree.append(Node::Constant {
        values: vec![ConstantUnion::Sint(index as i32)],
        ty: Type::INT
            .with_precision(Precision::High)
            .with_qualifier(Qualifier::Const),
    })
}

/// Create a nameless internal variable of type `ty`.
///
/// The variable is not bound in any scope: it is only reachable through the
/// tree, and is named after its identity.
pub fn create_temp_variable(symbols: &mut SymbolTable, ty: &Type) -> Handle<Symbol> {
    let ty = Type {
        qualifier: Qualifier::Temporary,
        ..*ty
    };
    symbols.create_variable("", ty, SymbolType::ToolInternal)
}

/// A reference to `variable`, typed like it.
pub fn create_temp_symbol_node(
    tree: &mut Tree,
    symbols: &SymbolTable,
    variable: Handle<Symbol>,
) -> Handle<Node> {
    let ty = match symbols.symbols()[variable].as_variable() {
        Some(var) => *var.ty(),
        None => unreachable!("{:?} is not a variable", variable),
    };
    tree.append(Node::Symbol {
        symbol: variable.into(),
        ty,
    })
}

/// The declaration `variable = initializer;`.
pub fn create_temp_init_declaration_node(
    tree: &mut Tree,
    symbols: &SymbolTable,
    variable: Handle<Symbol>,
    initializer: Handle<Node>,
) -> Handle<Node> {
    let symbol = create_temp_symbol_node(tree, symbols, variable);
    tree.append(Node::Declaration {
        symbol,
        initializer: Some(initializer),
    })
}

/// `base[index]` for a vector, matrix or array `base`.
///
/// # Panics
///
/// If `base` can not be indexed.
pub fn create_vector_index_node(tree: &mut Tree, base: Handle<Node>, index: u32) -> Handle<Node> {
    let ty = match tree.ty(base).and_then(Type::indexed) {
        Some(ty) => ty,
        None => unreachable!("{:?} can not be indexed", base),
    };
    let right = create_index_node(tree, index);
    tree.append(Node::Binary {
        op: BinaryOperator::IndexDirect,
        left: base,
        right,
        ty,
    })
}

/// `base[column][row]` for a matrix `base`.
pub fn create_matrix_index_node(
    tree: &mut Tree,
    base: Handle<Node>,
    column: u32,
    row: u32,
) -> Handle<Node> {
    let column = create_vector_index_node(tree, base, column);
    create_vector_index_node(tree, column, row)
}

/// Constant value `index` of an index node built by [`create_index_node`].
pub fn direct_index(tree: &Tree, index: Handle<Node>) -> Option<u32> {
    match tree[index] {
        Node::Constant { ref values, .. } => match values.as_slice() {
            [ConstantUnion::Sint(value)] if *value >= 0 => Some(*value as u32),
            [ConstantUnion::Uint(value)] => Some(*value),
            _ => None,
        },
        _ => None,
    }
}
