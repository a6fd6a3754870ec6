//! Selection of the node shapes a pass rewrites.

use crate::{
    arena::{Arena, Handle},
    symbol::{Symbol, SymbolType},
    tree::{AggregateOp, BinaryOperator, Node, Tree},
    Type, TypeInner,
};

bitflags::bitflags! {
    /// Node shapes a [`PatternMatcher`] looks for.
    #[derive(Default)]
    #[cfg_attr(feature = "serialize", derive(serde::Serialize))]
    #[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
    pub struct PatternMask: u8 {
        /// Array-typed assignments, constructors and calls used as
        /// sub-expressions.
        const EXPRESSION_RETURNING_ARRAY = 0x1;
        /// `&&` and `||` with side effects on the right, and ternaries.
        const UNFOLDED_SHORT_CIRCUIT_EXPRESSION = 0x2;
        /// Declarations of variables of an anonymous structure type.
        const NAMELESS_STRUCT_DECLARATION = 0x4;
        /// Vector constructors with a matrix argument, and matrix
        /// constructors with a vector argument.
        const SCALARIZED_VEC_OR_MAT_CONSTRUCTOR = 0x8;
    }
}

/// Predicate over a node and its parent.
#[derive(Clone, Copy, Debug)]
pub struct PatternMatcher {
    mask: PatternMask,
}

impl PatternMatcher {
    pub fn new(mask: PatternMask) -> Self {
        PatternMatcher { mask }
    }

    pub fn mask(&self) -> PatternMask {
        self.mask
    }

    /// Check `node`, whose parent is `parent`, against every shape of the
    /// mask.
    pub fn matches(
        &self,
        tree: &Tree,
        symbols: &Arena<Symbol>,
        node: Handle<Node>,
        parent: Option<Handle<Node>>,
    ) -> bool {
        match tree[node] {
            Node::Binary { .. } => self.match_binary(tree, symbols, node, parent),
            Node::Aggregate { .. } => self.match_aggregate(tree, node, parent),
            Node::Ternary { .. } => self.match_ternary(),
            Node::Declaration { .. } => self.match_declaration(tree, symbols, node),
            _ => false,
        }
    }

    pub fn match_binary(
        &self,
        tree: &Tree,
        symbols: &Arena<Symbol>,
        node: Handle<Node>,
        parent: Option<Handle<Node>>,
    ) -> bool {
        let (op, right, ty) = match tree[node] {
            Node::Binary { op, right, ty, .. } => (op, right, ty),
            _ => return false,
        };

        if self.mask.contains(PatternMask::EXPRESSION_RETURNING_ARRAY)
            && ty.is_array()
            && op == BinaryOperator::Assign
            && parent.map_or(false, |p| !matches!(tree[p], Node::Block(_)))
        {
            return true;
        }

        self.mask
            .contains(PatternMask::UNFOLDED_SHORT_CIRCUIT_EXPRESSION)
            && matches!(op, BinaryOperator::LogicalAnd | BinaryOperator::LogicalOr)
            && tree.has_side_effects(right, symbols)
    }

    pub fn match_aggregate(
        &self,
        tree: &Tree,
        node: Handle<Node>,
        parent: Option<Handle<Node>>,
    ) -> bool {
        let (op, arguments, ty) = match tree[node] {
            Node::Aggregate {
                op,
                ref arguments,
                ty,
            } => (op, arguments, ty),
            _ => return false,
        };

        if self.mask.contains(PatternMask::EXPRESSION_RETURNING_ARRAY) && ty.is_array() {
            if let Some(parent) = parent {
                let parent_is_assignment = match tree[parent] {
                    Node::Binary { op, .. } => op.is_assignment(),
                    Node::Declaration { .. } => true,
                    _ => false,
                };
                if !parent_is_assignment && !matches!(tree[parent], Node::Block(_)) {
                    return true;
                }
            }
        }

        if self
            .mask
            .contains(PatternMask::SCALARIZED_VEC_OR_MAT_CONSTRUCTOR)
            && op == AggregateOp::Construct
        {
            let any_argument = |pred: fn(&Type) -> bool| {
                arguments
                    .iter()
                    .any(|&arg| tree.ty(arg).map_or(false, pred))
            };
            if ty.is_vector() && any_argument(Type::is_matrix) {
                return true;
            }
            if ty.is_matrix() && any_argument(Type::is_vector) {
                return true;
            }
        }

        false
    }

    pub fn match_ternary(&self) -> bool {
        self.mask
            .contains(PatternMask::UNFOLDED_SHORT_CIRCUIT_EXPRESSION)
    }

    pub fn match_declaration(
        &self,
        tree: &Tree,
        symbols: &Arena<Symbol>,
        node: Handle<Node>,
    ) -> bool {
        if !self.mask.contains(PatternMask::NAMELESS_STRUCT_DECLARATION) {
            return false;
        }
        let declarator = match tree[node] {
            Node::Declaration { symbol, .. } => symbol,
            _ => return false,
        };
        match tree.ty(declarator).map(|ty| ty.inner) {
            Some(TypeInner::Struct(structure)) => {
                structure.resolve(symbols).symbol_type() == SymbolType::Empty
            }
            _ => false,
        }
    }
}
