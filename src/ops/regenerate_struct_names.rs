use super::Compiler;
use crate::{
    arena::Handle,
    symbol::{SymbolId, SymbolType},
    traverse::{self, Context, Traverser},
    tree::Node,
    valid::ValidationError,
    FastHashSet, SymbolRef, SymbolTable, Tree, TypeInner,
};

const PREFIX: &str = "_w_struct_";

#[derive(Default)]
struct RegenerateStructNames {
    /// Structures seen in the global scope keep their names, even when used
    /// from a function.
    global_structs: FastHashSet<SymbolId>,
    renamed: usize,
}

impl Traverser for RegenerateStructNames {
    fn visit_symbol(&mut self, ctx: &mut Context, node: Handle<Node>) {
        let structure = match ctx.tree[node] {
            Node::Symbol { ty, .. } => match ty.inner {
                TypeInner::Struct(structure) => structure,
                _ => return,
            },
            _ => return,
        };
        let handle = match structure {
            SymbolRef::Pool(handle) => handle,
            SymbolRef::BuiltIn(_) => return,
        };

        let symbol = &ctx.symbols.symbols()[handle];
        match symbol.symbol_type() {
            SymbolType::UserDefined | SymbolType::ToolInternal => {}
            SymbolType::BuiltIn | SymbolType::Empty => return,
        }
        if symbol.as_structure().map_or(true, |s| s.at_global_scope()) {
            return;
        }
        let id = symbol.id();
        if ctx.block_depth() <= 1 {
            self.global_structs.insert(id);
            return;
        }
        if self.global_structs.contains(&id) || symbol.raw_name().starts_with(PREFIX) {
            return;
        }

        let name = format!("{}{}_{}", PREFIX, id.get(), symbol.raw_name());
        log::debug!("Renaming structure `{}` to `{}`", symbol.raw_name(), name);
        ctx.symbols.rename_structure(handle, name);
        self.renamed += 1;
    }
}

/// Give every structure declared inside a function a name unique to the
/// compilation, then validate the tree.
///
/// Structures of the global scope keep their names: they may be shared
/// between stages through uniforms.
pub fn regenerate_struct_names(
    compiler: &mut Compiler,
    tree: &mut Tree,
    symbols: &mut SymbolTable,
) -> Result<(), ValidationError> {
    let mut regenerate = RegenerateStructNames::default();
    traverse::traverse(tree, symbols, &mut regenerate);
    log::debug!("Renamed {} structures", regenerate.renamed);

    compiler.validate_ast(tree, symbols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{symbol::Field, Type};

    fn declare_variable(
        tree: &mut Tree,
        table: &mut SymbolTable,
        block: Handle<Node>,
        name: &'static str,
        ty: Type,
    ) {
        let variable = table.create_variable(name, ty, SymbolType::UserDefined);
        let symbol = tree.append(Node::Symbol {
            symbol: variable.into(),
            ty,
        });
        let declaration = tree.append(Node::Declaration {
            symbol,
            initializer: None,
        });
        tree.push_statement(block, declaration);
    }

    #[test]
    fn local_structures_are_renamed_once() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let root = tree.root();

        let global = table.create_structure(
            "G",
            vec![Field::new("x", Type::FLOAT)],
            SymbolType::UserDefined,
        );
        table.declare(global).unwrap();
        let global_ty = Type::new(TypeInner::Struct(global.into()));
        declare_variable(&mut tree, &mut table, root, "g", global_ty);

        let main = table.create_function("main", SymbolType::UserDefined, Type::VOID, false);
        table.push_scope();
        let local = table.create_structure(
            "S",
            vec![Field::new("x", Type::FLOAT)],
            SymbolType::UserDefined,
        );
        table.declare(local).unwrap();
        table.pop_scope();
        let local_ty = Type::new(TypeInner::Struct(local.into()));

        let body = tree.append(Node::Block(Vec::new()));
        declare_variable(&mut tree, &mut table, body, "a", local_ty);
        declare_variable(&mut tree, &mut table, body, "b", local_ty);
        declare_variable(&mut tree, &mut table, body, "h", global_ty);
        let definition = tree.append(Node::FunctionDefinition {
            function: main.into(),
            body,
        });
        tree.push_statement(root, definition);

        let mut compiler = Compiler::default();
        regenerate_struct_names(&mut compiler, &mut tree, &mut table).unwrap();

        let local = &table.symbols()[local];
        assert_eq!(local.raw_name(), format!("_w_struct_{}_S", local.id().get()));
        assert_eq!(table.symbols()[global].raw_name(), "G");

        // a second run leaves the new name alone
        regenerate_struct_names(&mut compiler, &mut tree, &mut table).unwrap();
        let local_ty_name = match local_ty.inner {
            TypeInner::Struct(structure) => {
                structure.resolve(table.symbols()).raw_name().to_string()
            }
            _ => unreachable!(),
        };
        assert_eq!(local_ty_name.matches(PREFIX).count(), 1);
    }
}
