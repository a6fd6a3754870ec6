//! The intermediate tree produced by the parser and rewritten by passes.

pub mod util;

use crate::{
    arena::{Arena, Handle},
    symbol::Symbol,
    ConstantUnion, SymbolRef, Type,
};
use std::ops;

/// Operation performed by a [`Node::Binary`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    LogicalAnd,
    LogicalOr,
    LogicalXor,
    Assign,
    /// Indexing with a constant index.
    ///
    /// Applied twice, to a matrix and then to the resulting column, it
    /// addresses a single matrix element.
    IndexDirect,
    /// Indexing with a dynamic index.
    IndexIndirect,
    /// Evaluate the left operand, then yield the right one.
    Comma,
}

impl BinaryOperator {
    pub fn is_assignment(self) -> bool {
        self == Self::Assign
    }

    pub fn is_index(self) -> bool {
        matches!(self, Self::IndexDirect | Self::IndexIndirect)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::Greater
                | Self::LessEqual
                | Self::GreaterEqual
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Self::LogicalAnd | Self::LogicalOr | Self::LogicalXor)
    }
}

/// Operation performed by a [`Node::Unary`].
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum UnaryOperator {
    Negate,
    LogicalNot,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOperator {
    /// Returns `true` if the operator writes to its operand.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Negate | Self::LogicalNot)
    }
}

/// What a [`Node::Aggregate`] builds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AggregateOp {
    /// Construct a value of the node type from the arguments.
    Construct,
    /// Call a function, either built-in or from the program.
    Call(SymbolRef),
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum LoopKind {
    For,
    While,
    DoWhile,
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
pub enum BranchKind {
    Discard,
    Return,
    Break,
    Continue,
}

/// Broad kind of a node, deciding where it may appear.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum NodeCategory {
    /// Carries a resolved type. May also appear as a statement.
    Expression,
    /// Untyped statement.
    Statement,
    /// A sequence of statements forming the body of one scope.
    Block,
}

/// A node of the tree.
///
/// Expression nodes carry their resolved type. Operands and children are
/// handles into the [`Tree`] arena; a node replaced by a pass is simply left
/// behind.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Reference to a variable.
    Symbol { symbol: SymbolRef, ty: Type },
    /// Constant data, one entry per scalar component.
    Constant {
        values: Vec<ConstantUnion>,
        ty: Type,
    },
    Binary {
        op: BinaryOperator,
        left: Handle<Node>,
        right: Handle<Node>,
        ty: Type,
    },
    Unary {
        op: UnaryOperator,
        operand: Handle<Node>,
        ty: Type,
    },
    /// `condition ? accept : reject`
    Ternary {
        condition: Handle<Node>,
        accept: Handle<Node>,
        reject: Handle<Node>,
        ty: Type,
    },
    /// Constructor or function call.
    Aggregate {
        op: AggregateOp,
        arguments: Vec<Handle<Node>>,
        ty: Type,
    },
    /// Declaration of a single variable, given as a [`Node::Symbol`].
    Declaration {
        symbol: Handle<Node>,
        initializer: Option<Handle<Node>>,
    },
    Block(Vec<Handle<Node>>),
    IfElse {
        condition: Handle<Node>,
        accept: Handle<Node>,
        reject: Option<Handle<Node>>,
    },
    Loop {
        kind: LoopKind,
        init: Option<Handle<Node>>,
        condition: Option<Handle<Node>>,
        expression: Option<Handle<Node>>,
        body: Handle<Node>,
    },
    Branch {
        kind: BranchKind,
        value: Option<Handle<Node>>,
    },
    FunctionPrototype { function: SymbolRef },
    FunctionDefinition {
        function: SymbolRef,
        body: Handle<Node>,
    },
}

impl Node {
    /// The type of an expression node.
    pub fn ty(&self) -> Option<&Type> {
        match *self {
            Node::Symbol { ref ty, .. }
            | Node::Constant { ref ty, .. }
            | Node::Binary { ref ty, .. }
            | Node::Unary { ref ty, .. }
            | Node::Ternary { ref ty, .. }
            | Node::Aggregate { ref ty, .. } => Some(ty),
            _ => None,
        }
    }

    pub fn category(&self) -> NodeCategory {
        match *self {
            Node::Block(_) => NodeCategory::Block,
            _ if self.ty().is_some() => NodeCategory::Expression,
            _ => NodeCategory::Statement,
        }
    }

    pub fn is_expression(&self) -> bool {
        self.category() == NodeCategory::Expression
    }

    /// Handles of the children, in traversal order.
    pub fn children(&self) -> Vec<Handle<Node>> {
        match *self {
            Node::Symbol { .. } | Node::Constant { .. } | Node::FunctionPrototype { .. } => {
                Vec::new()
            }
            Node::Binary { left, right, .. } => vec![left, right],
            Node::Unary { operand, .. } => vec![operand],
            Node::Ternary {
                condition,
                accept,
                reject,
                ..
            } => vec![condition, accept, reject],
            Node::Aggregate { ref arguments, .. } => arguments.clone(),
            Node::Declaration {
                symbol,
                initializer,
            } => Some(symbol).into_iter().chain(initializer).collect(),
            Node::Block(ref statements) => statements.clone(),
            Node::IfElse {
                condition,
                accept,
                reject,
            } => Some(condition)
                .into_iter()
                .chain(Some(accept))
                .chain(reject)
                .collect(),
            Node::Loop {
                init,
                condition,
                expression,
                body,
                ..
            } => init
                .into_iter()
                .chain(condition)
                .chain(expression)
                .chain(Some(body))
                .collect(),
            Node::Branch { value, .. } => value.into_iter().collect(),
            Node::FunctionDefinition { body, .. } => vec![body],
        }
    }

    /// Replace the first occurrence of `original` among the children.
    ///
    /// Returns `false` if `original` is not a child of this node.
    pub fn replace_child(&mut self, original: Handle<Node>, replacement: Handle<Node>) -> bool {
        fn swap(
            slot: &mut Handle<Node>,
            original: Handle<Node>,
            replacement: Handle<Node>,
        ) -> bool {
            if *slot == original {
                *slot = replacement;
                true
            } else {
                false
            }
        }
        fn swap_opt(
            slot: &mut Option<Handle<Node>>,
            original: Handle<Node>,
            replacement: Handle<Node>,
        ) -> bool {
            match *slot {
                Some(ref mut handle) => swap(handle, original, replacement),
                None => false,
            }
        }

        match *self {
            Node::Symbol { .. } | Node::Constant { .. } | Node::FunctionPrototype { .. } => false,
            Node::Binary {
                ref mut left,
                ref mut right,
                ..
            } => swap(left, original, replacement) || swap(right, original, replacement),
            Node::Unary {
                ref mut operand, ..
            } => swap(operand, original, replacement),
            Node::Ternary {
                ref mut condition,
                ref mut accept,
                ref mut reject,
                ..
            } => {
                swap(condition, original, replacement)
                    || swap(accept, original, replacement)
                    || swap(reject, original, replacement)
            }
            Node::Aggregate {
                arguments: ref mut list,
                ..
            }
            | Node::Block(ref mut list) => match list.iter_mut().find(|h| **h == original) {
                Some(slot) => {
                    *slot = replacement;
                    true
                }
                None => false,
            },
            Node::Declaration {
                ref mut symbol,
                ref mut initializer,
            } => {
                swap(symbol, original, replacement)
                    || swap_opt(initializer, original, replacement)
            }
            Node::IfElse {
                ref mut condition,
                ref mut accept,
                ref mut reject,
            } => {
                swap(condition, original, replacement)
                    || swap(accept, original, replacement)
                    || swap_opt(reject, original, replacement)
            }
            Node::Loop {
                ref mut init,
                ref mut condition,
                ref mut expression,
                ref mut body,
                ..
            } => {
                swap_opt(init, original, replacement)
                    || swap_opt(condition, original, replacement)
                    || swap_opt(expression, original, replacement)
                    || swap(body, original, replacement)
            }
            Node::Branch { ref mut value, .. } => swap_opt(value, original, replacement),
            Node::FunctionDefinition { ref mut body, .. } => swap(body, original, replacement),
        }
    }
}

/// A whole program: the node arena and its root block.
#[derive(Debug)]
pub struct Tree {
    pub nodes: Arena<Node>,
    root: Handle<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree with an empty root block.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.append(Node::Block(Vec::new()));
        Tree { nodes, root }
    }

    pub fn root(&self) -> Handle<Node> {
        self.root
    }

    pub fn append(&mut self, node: Node) -> Handle<Node> {
        self.nodes.append(node)
    }

    /// The type of an expression.
    pub fn ty(&self, expression: Handle<Node>) -> Option<&Type> {
        self.nodes[expression].ty()
    }

    /// Statements of a block, or `None` for other nodes.
    pub fn statements(&self, block: Handle<Node>) -> Option<&[Handle<Node>]> {
        match self.nodes[block] {
            Node::Block(ref statements) => Some(statements),
            _ => None,
        }
    }

    /// Append `statement` at the end of `block`.
    ///
    /// # Panics
    ///
    /// If `block` is not a block.
    pub fn push_statement(&mut self, block: Handle<Node>, statement: Handle<Node>) {
        match self.nodes[block] {
            Node::Block(ref mut statements) => statements.push(statement),
            ref other => unreachable!("{:?} is not a block: {:?}", block, other),
        }
    }

    /// Returns `true` if evaluating `expression` may have side effects.
    ///
    /// Calls are only free of side effects when the callee is known to be.
    pub fn has_side_effects(&self, expression: Handle<Node>, symbols: &Arena<Symbol>) -> bool {
        let node = &self.nodes[expression];
        let own = match *node {
            Node::Binary { op, .. } => op.is_assignment(),
            Node::Unary { op, .. } => op.is_mutating(),
            Node::Aggregate {
                op: AggregateOp::Call(function),
                ..
            } => !function
                .resolve(symbols)
                .as_function()
                .map_or(false, |f| f.is_known_to_not_have_side_effects()),
            Node::Symbol { .. }
            | Node::Constant { .. }
            | Node::Ternary { .. }
            | Node::Aggregate { .. } => false,
            _ => true,
        };
        own || node
            .children()
            .into_iter()
            .any(|child| self.has_side_effects(child, symbols))
    }
}

impl ops::Index<Handle<Node>> for Tree {
    type Output = Node;
    fn index(&self, handle: Handle<Node>) -> &Node {
        &self.nodes[handle]
    }
}

impl ops::IndexMut<Handle<Node>> for Tree {
    fn index_mut(&mut self, handle: Handle<Node>) -> &mut Node {
        &mut self.nodes[handle]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{symbol::SymbolType, SymbolTable};

    #[test]
    fn categories() {
        let mut tree = Tree::new();
        let constant = tree.append(Node::Constant {
            values: vec![ConstantUnion::Float(1.0)],
            ty: Type::FLOAT,
        });
        let branch = tree.append(Node::Branch {
            kind: BranchKind::Return,
            value: Some(constant),
        });
        assert_eq!(tree[constant].category(), NodeCategory::Expression);
        assert_eq!(tree[branch].category(), NodeCategory::Statement);
        assert_eq!(tree[tree.root()].category(), NodeCategory::Block);
        assert_eq!(tree[branch].children(), vec![constant]);
    }

    #[test]
    fn replace_child_in_place() {
        let mut tree = Tree::new();
        let one = tree.append(Node::Constant {
            values: vec![ConstantUnion::Sint(1)],
            ty: Type::INT,
        });
        let two = tree.append(Node::Constant {
            values: vec![ConstantUnion::Sint(2)],
            ty: Type::INT,
        });
        let sum = tree.append(Node::Binary {
            op: BinaryOperator::Add,
            left: one,
            right: one,
            ty: Type::INT,
        });
        assert!(tree[sum].replace_child(one, two));
        assert_eq!(tree[sum].children(), vec![two, one]);
        let loose = tree.append(Node::Block(Vec::new()));
        assert!(!tree[sum].replace_child(loose, two));
    }

    #[test]
    fn side_effects() {
        let mut table = SymbolTable::default();
        let variable = table.create_variable("a", Type::FLOAT, SymbolType::UserDefined);
        let mut tree = Tree::new();
        let read = tree.append(Node::Symbol {
            symbol: variable.into(),
            ty: Type::FLOAT,
        });
        let negated = tree.append(Node::Unary {
            op: UnaryOperator::Negate,
            operand: read,
            ty: Type::FLOAT,
        });
        let increment = tree.append(Node::Unary {
            op: UnaryOperator::PostIncrement,
            operand: read,
            ty: Type::FLOAT,
        });
        assert!(!tree.has_side_effects(negated, table.symbols()));
        assert!(tree.has_side_effects(increment, table.symbols()));

        let impure = table.create_function("f", SymbolType::UserDefined, Type::FLOAT, false);
        let call = tree.append(Node::Aggregate {
            op: AggregateOp::Call(impure.into()),
            arguments: Vec::new(),
            ty: Type::FLOAT,
        });
        assert!(tree.has_side_effects(call, table.symbols()));

        let sin = table.lookup_function("sin(f;").unwrap();
        let builtin_call = tree.append(Node::Aggregate {
            op: AggregateOp::Call(sin),
            arguments: vec![read],
            ty: Type::FLOAT,
        });
        assert!(!tree.has_side_effects(builtin_call, table.symbols()));
    }
}
