//! Depth-first traversal of a [`Tree`], with in-place rewriting.
//!
//! A [`Traverser`] reports which visits it wants through [`VisitFlags`] and
//! gets called for every node. Each callback receives a [`Context`], giving
//! mutable access to the tree and the symbol table, the chain of ancestors of
//! the current node, and a way to insert statements before the statement
//! being visited.
//!
//! Children of a node are read after its pre-visit, so a traverser replacing
//! children during the pre-visit has the new children traversed.

pub mod matcher;

use crate::{
    arena::Handle,
    tree::{Node, Tree},
    SymbolTable,
};

bitflags::bitflags! {
    /// Visits a traverser is interested in.
    #[cfg_attr(feature = "serialize", derive(serde::Serialize))]
    #[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
    pub struct VisitFlags: u8 {
        /// Before the children.
        const PRE = 0x1;
        /// Between two children.
        const IN = 0x2;
        /// After the children.
        const POST = 0x4;
    }
}

impl Default for VisitFlags {
    fn default() -> Self {
        Self::PRE
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Visit {
    Pre,
    In,
    Post,
}

/// Callbacks of a traversal.
///
/// Callbacks of nodes with children return whether the traversal goes on:
/// `false` from a pre-visit skips the children and the post-visit, `false`
/// from an in-visit skips the remaining children.
#[allow(unused_variables)]
pub trait Traverser {
    fn flags(&self) -> VisitFlags {
        VisitFlags::default()
    }

    fn visit_symbol(&mut self, ctx: &mut Context, node: Handle<Node>) {}

    fn visit_constant(&mut self, ctx: &mut Context, node: Handle<Node>) {}

    fn visit_function_prototype(&mut self, ctx: &mut Context, node: Handle<Node>) {}

    fn visit_binary(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_unary(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_ternary(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_aggregate(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_declaration(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_block(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_if_else(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_loop(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_branch(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        true
    }

    fn visit_function_definition(
        &mut self,
        visit: Visit,
        ctx: &mut Context,
        node: Handle<Node>,
    ) -> bool {
        true
    }
}

/// State of a traversal, handed to every callback.
pub struct Context<'a> {
    pub tree: &'a mut Tree,
    pub symbols: &'a mut SymbolTable,
    /// Ancestors of the current node, outermost first.
    path: Vec<Handle<Node>>,
    /// One frame per open block: the statements rebuilt so far.
    insertions: Vec<Vec<Handle<Node>>>,
    in_function: bool,
}

impl<'a> Context<'a> {
    fn new(tree: &'a mut Tree, symbols: &'a mut SymbolTable) -> Self {
        Context {
            tree,
            symbols,
            path: Vec::new(),
            insertions: Vec::new(),
            in_function: false,
        }
    }

    /// The parent of the node being visited.
    pub fn parent(&self) -> Option<Handle<Node>> {
        self.path.last().copied()
    }

    /// Ancestors of the node being visited, innermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = Handle<Node>> + '_ {
        self.path.iter().rev().copied()
    }

    /// Number of blocks enclosing the node being visited.
    pub fn block_depth(&self) -> usize {
        self.insertions.len()
    }

    /// Returns `true` outside of function bodies.
    pub fn in_global_scope(&self) -> bool {
        !self.in_function
    }

    /// Insert `statement` in the innermost block, right before the statement
    /// currently visited.
    ///
    /// # Panics
    ///
    /// When no block encloses the current node.
    pub fn insert_before_current_statement(&mut self, statement: Handle<Node>) {
        match self.insertions.last_mut() {
            Some(frame) => frame.push(statement),
            None => unreachable!("no enclosing block to insert {:?} into", statement),
        }
    }
}

/// Walk `tree` from its root with `traverser`.
pub fn traverse<T: Traverser + ?Sized>(
    tree: &mut Tree,
    symbols: &mut SymbolTable,
    traverser: &mut T,
) {
    let root = tree.root();
    let mut ctx = Context::new(tree, symbols);
    walk(traverser, &mut ctx, root);
}

fn visit_node<T: Traverser + ?Sized>(
    traverser: &mut T,
    visit: Visit,
    ctx: &mut Context,
    handle: Handle<Node>,
) -> bool {
    match ctx.tree[handle] {
        Node::Binary { .. } => traverser.visit_binary(visit, ctx, handle),
        Node::Unary { .. } => traverser.visit_unary(visit, ctx, handle),
        Node::Ternary { .. } => traverser.visit_ternary(visit, ctx, handle),
        Node::Aggregate { .. } => traverser.visit_aggregate(visit, ctx, handle),
        Node::Declaration { .. } => traverser.visit_declaration(visit, ctx, handle),
        Node::Block(_) => traverser.visit_block(visit, ctx, handle),
        Node::IfElse { .. } => traverser.visit_if_else(visit, ctx, handle),
        Node::Loop { .. } => traverser.visit_loop(visit, ctx, handle),
        Node::Branch { .. } => traverser.visit_branch(visit, ctx, handle),
        Node::FunctionDefinition { .. } => traverser.visit_function_definition(visit, ctx, handle),
        Node::Symbol { .. } | Node::Constant { .. } | Node::FunctionPrototype { .. } => {
            unreachable!("leaf nodes have a single visit")
        }
    }
}

fn walk<T: Traverser + ?Sized>(traverser: &mut T, ctx: &mut Context, handle: Handle<Node>) {
    match ctx.tree[handle] {
        Node::Symbol { .. } => return traverser.visit_symbol(ctx, handle),
        Node::Constant { .. } => return traverser.visit_constant(ctx, handle),
        Node::FunctionPrototype { .. } => return traverser.visit_function_prototype(ctx, handle),
        _ => {}
    }

    let flags = traverser.flags();
    let mut visit = true;
    if flags.contains(VisitFlags::PRE) {
        visit = visit_node(traverser, Visit::Pre, ctx, handle);
    }
    if !visit {
        return;
    }

    let is_block = matches!(ctx.tree[handle], Node::Block(_));
    let is_function = matches!(ctx.tree[handle], Node::FunctionDefinition { .. });
    let was_in_function = ctx.in_function;
    ctx.in_function |= is_function;

    let children = ctx.tree[handle].children();
    if is_block {
        ctx.insertions.push(Vec::with_capacity(children.len()));
    }
    ctx.path.push(handle);
    let mut visited = 0;
    for (index, &child) in children.iter().enumerate() {
        if index != 0 && flags.contains(VisitFlags::IN) {
            visit = visit_node(traverser, Visit::In, ctx, handle);
            if !visit {
                break;
            }
        }
        walk(traverser, ctx, child);
        if is_block {
            if let Some(frame) = ctx.insertions.last_mut() {
                frame.push(child);
            }
        }
        visited += 1;
    }
    ctx.path.pop();
    if is_block {
        if let Some(mut rebuilt) = ctx.insertions.pop() {
            // the block is only swapped when statements were inserted
            if rebuilt.len() > visited {
                rebuilt.extend_from_slice(&children[visited..]);
                ctx.tree[handle] = Node::Block(rebuilt);
            }
        }
    }
    ctx.in_function = was_in_function;

    if visit && flags.contains(VisitFlags::POST) {
        visit_node(traverser, Visit::Post, ctx, handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tree::{util, BinaryOperator, BranchKind},
        ConstantUnion, Type,
    };

    fn constant(tree: &mut Tree, value: i32) -> Handle<Node> {
        tree.append(Node::Constant {
            values: vec![ConstantUnion::Sint(value)],
            ty: Type::INT,
        })
    }

    #[derive(Default)]
    struct Recorder {
        flags: VisitFlags,
        events: Vec<(Visit, Handle<Node>)>,
        leaves: Vec<Handle<Node>>,
    }

    impl Traverser for Recorder {
        fn flags(&self) -> VisitFlags {
            self.flags
        }
        fn visit_constant(&mut self, _ctx: &mut Context, node: Handle<Node>) {
            self.leaves.push(node);
        }
        fn visit_binary(&mut self, visit: Visit, _ctx: &mut Context, node: Handle<Node>) -> bool {
            self.events.push((visit, node));
            true
        }
    }

    #[test]
    fn pre_in_post_order() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let a = constant(&mut tree, 1);
        let b = constant(&mut tree, 2);
        let sum = tree.append(Node::Binary {
            op: BinaryOperator::Add,
            left: a,
            right: b,
            ty: Type::INT,
        });
        let root = tree.root();
        tree.push_statement(root, sum);

        let mut recorder = Recorder {
            flags: VisitFlags::all(),
            ..Recorder::default()
        };
        traverse(&mut tree, &mut table, &mut recorder);
        assert_eq!(
            recorder.events,
            [(Visit::Pre, sum), (Visit::In, sum), (Visit::Post, sum)]
        );
        assert_eq!(recorder.leaves, [a, b]);
    }

    struct ParentChecker {
        parents: Vec<Option<Handle<Node>>>,
    }

    impl Traverser for ParentChecker {
        fn visit_constant(&mut self, ctx: &mut Context, _node: Handle<Node>) {
            self.parents.push(ctx.parent());
            assert!(!ctx.in_global_scope());
            assert_eq!(ctx.ancestors().last(), Some(ctx.tree.root()));
        }
    }

    #[test]
    fn ancestry() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let value = constant(&mut tree, 0);
        let ret = tree.append(Node::Branch {
            kind: BranchKind::Return,
            value: Some(value),
        });
        let body = tree.append(Node::Block(vec![ret]));
        let main = table.create_function(
            "main",
            crate::symbol::SymbolType::UserDefined,
            Type::VOID,
            false,
        );
        let definition = tree.append(Node::FunctionDefinition {
            function: main.into(),
            body,
        });
        let root = tree.root();
        tree.push_statement(root, definition);

        let mut checker = ParentChecker {
            parents: Vec::new(),
        };
        traverse(&mut tree, &mut table, &mut checker);
        assert_eq!(checker.parents, [Some(ret)]);
    }

    /// Declares a copy of every return value before the return statement.
    struct Hoister;

    impl Traverser for Hoister {
        fn visit_branch(&mut self, _visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
            if let Node::Branch {
                value: Some(value), ..
            } = ctx.tree[node]
            {
                let ty = *ctx.tree.ty(value).unwrap();
                let variable = util::create_temp_variable(ctx.symbols, &ty);
                let declaration =
                    util::create_temp_init_declaration_node(ctx.tree, ctx.symbols, variable, value);
                ctx.insert_before_current_statement(declaration);
                let copy = util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable);
                ctx.tree[node].replace_child(value, copy);
            }
            true
        }
    }

    #[test]
    fn insertions_land_before_the_statement() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let first = constant(&mut tree, 1);
        let second = constant(&mut tree, 2);
        let ret_first = tree.append(Node::Branch {
            kind: BranchKind::Return,
            value: Some(first),
        });
        let inner_ret = tree.append(Node::Branch {
            kind: BranchKind::Return,
            value: Some(second),
        });
        let inner = tree.append(Node::Block(vec![inner_ret]));
        let root = tree.root();
        tree.push_statement(root, inner);
        tree.push_statement(root, ret_first);

        traverse(&mut tree, &mut table, &mut Hoister);

        let outer = tree.statements(root).unwrap().to_vec();
        assert_eq!(outer.len(), 3);
        assert_eq!(outer[0], inner);
        assert!(matches!(tree[outer[1]], Node::Declaration { .. }));
        assert_eq!(outer[2], ret_first);

        let nested = tree.statements(inner).unwrap();
        assert_eq!(nested.len(), 2);
        assert!(matches!(
            tree[nested[0]],
            Node::Declaration { initializer: Some(v), .. } if v == second
        ));
        assert_eq!(nested[1], inner_ret);
    }

    #[test]
    fn untouched_blocks_are_kept() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let value = constant(&mut tree, 1);
        let root = tree.root();
        tree.push_statement(root, value);
        let mut recorder = Recorder::default();
        traverse(&mut tree, &mut table, &mut recorder);
        assert_eq!(tree.statements(root), Some(&[value][..]));
        assert!(recorder.events.is_empty());
    }
}
