/*!
Scalarization of vector and matrix constructor arguments.

Vectors built from a matrix argument, and matrices built from a vector
argument, trip some drivers. Such constructors are rewritten so that each of
those arguments contributes its components one by one:

```glsl
mat4 m;
vec4 v = vec4(1, m);
```

becomes

```glsl
mat4 m;
float s1 = 1;
mat4 s2 = m;
vec4 v = vec4(s1, s2[0][0], s2[0][1], s2[0][2]);
```

Every argument is copied to a temporary first, so an argument with side
effects is still evaluated exactly once.
!*/

use super::Compiler;
use crate::{
    arena::Handle,
    symbol::Symbol,
    traverse::{
        self,
        matcher::{PatternMask, PatternMatcher},
        Context, Traverser, Visit,
    },
    tree::{util, Node},
    valid::ValidationError,
    SymbolTable, Tree, Type,
};

struct ScalarizeArgs {
    matcher: PatternMatcher,
    rewritten: usize,
}

impl Traverser for ScalarizeArgs {
    fn visit_aggregate(&mut self, visit: Visit, ctx: &mut Context, node: Handle<Node>) -> bool {
        debug_assert_eq!(visit, Visit::Pre);
        if !self
            .matcher
            .matches(ctx.tree, ctx.symbols.symbols(), node, ctx.parent())
        {
            return true;
        }

        let is_vector = ctx.tree.ty(node).map_or(false, Type::is_vector);
        if is_vector {
            scalarize_args(ctx, node, false, true);
        } else {
            scalarize_args(ctx, node, true, false);
        }
        log::debug!("Scalarized the arguments of constructor {:?}", node);
        self.rewritten += 1;
        true
    }
}

/// Copy `original` into a new temporary declared before the current
/// statement.
fn create_temp_variable(ctx: &mut Context, original: Handle<Node>, ty: &Type) -> Handle<Symbol> {
    let variable = util::create_temp_variable(ctx.symbols, ty);
    let declaration =
        util::create_temp_init_declaration_node(ctx.tree, ctx.symbols, variable, original);
    ctx.insert_before_current_statement(declaration);
    variable
}

fn scalarize_args(
    ctx: &mut Context,
    aggregate: Handle<Node>,
    scalarize_vector: bool,
    scalarize_matrix: bool,
) {
    let (original_args, ty) = match ctx.tree[aggregate] {
        Node::Aggregate {
            ref mut arguments,
            ty,
            ..
        } => (std::mem::take(arguments), ty),
        ref other => unreachable!("{:?} is not a constructor", other),
    };
    assert!(!ty.is_array(), "array constructors are never scalarized");
    assert!(ty.is_vector() || ty.is_matrix());

    let mut size = ty.object_size(ctx.symbols.symbols());
    let mut sequence = Vec::with_capacity(size as usize);
    for original_arg in original_args {
        assert!(
            size > 0,
            "constructor {:?} has more arguments than components",
            aggregate
        );
        let arg_ty = match ctx.tree.ty(original_arg) {
            Some(&ty) => ty,
            None => unreachable!("argument {:?} is not an expression", original_arg),
        };
        let variable = create_temp_variable(ctx, original_arg, &arg_ty);

        if arg_ty.is_scalar() {
            sequence.push(util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable));
            size -= 1;
        } else if arg_ty.is_vector() {
            let components = arg_ty.nominal_size();
            if scalarize_vector {
                let repeat = size.min(components);
                size -= repeat;
                for index in 0..repeat {
                    let symbol = util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable);
                    sequence.push(util::create_vector_index_node(ctx.tree, symbol, index));
                }
            } else {
                sequence.push(util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable));
                size = size.saturating_sub(components);
            }
        } else {
            assert!(
                arg_ty.is_matrix(),
                "constructor argument {:?} is not a scalar, vector or matrix",
                original_arg
            );
            let rows = arg_ty.rows();
            let elements = arg_ty.cols() * rows;
            if scalarize_matrix {
                let repeat = size.min(elements);
                size -= repeat;
                // column-major, the row advances first
                for element in 0..repeat {
                    let symbol = util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable);
                    sequence.push(util::create_matrix_index_node(
                        ctx.tree,
                        symbol,
                        element / rows,
                        element % rows,
                    ));
                }
            } else {
                sequence.push(util::create_temp_symbol_node(ctx.tree, ctx.symbols, variable));
                size = size.saturating_sub(elements);
            }
        }
    }

    if let Node::Aggregate {
        ref mut arguments, ..
    } = ctx.tree[aggregate]
    {
        *arguments = sequence;
    }
}

/// Scalarize the matrix arguments of vector constructors and the vector
/// arguments of matrix constructors, then validate the tree.
pub fn scalarize_vec_and_mat_constructor_args(
    compiler: &mut Compiler,
    tree: &mut Tree,
    symbols: &mut SymbolTable,
) -> Result<(), ValidationError> {
    let mut scalarizer = ScalarizeArgs {
        matcher: PatternMatcher::new(PatternMask::SCALARIZED_VEC_OR_MAT_CONSTRUCTOR),
        rewritten: 0,
    };
    traverse::traverse(tree, symbols, &mut scalarizer);
    log::debug!("Scalarized {} constructors", scalarizer.rewritten);

    compiler.validate_ast(tree, symbols)
}
