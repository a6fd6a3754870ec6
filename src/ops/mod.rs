//! Rewrite passes and the pipeline running them.
//!
//! Every pass takes the tree and the symbol table, rewrites the tree in
//! place, and is followed by validation. A pass only adds internal symbols:
//! user-visible symbols are never removed, and only
//! [`regenerate_struct_names`] renames any.

mod regenerate_struct_names;
mod scalarize;

pub use regenerate_struct_names::regenerate_struct_names;
pub use scalarize::scalarize_vec_and_mat_constructor_args;

use crate::{
    symbol::table::DeclarationError,
    valid::{ValidationError, ValidationFlags, Validator},
    SymbolTable, Tree,
};

bitflags::bitflags! {
    /// Passes run by [`Compiler::compile`].
    #[cfg_attr(feature = "serialize", derive(serde::Serialize))]
    #[cfg_attr(feature = "deserialize", derive(serde::Deserialize))]
    pub struct CompileOptions: u32 {
        /// Split matrix arguments of vector constructors, and vector
        /// arguments of matrix constructors, into scalars.
        const SCALARIZE_VEC_AND_MAT_CONSTRUCTOR_ARGS = 0x1;
        /// Give structures declared inside functions unique names.
        const REGENERATE_STRUCT_NAMES = 0x2;
        /// Validate the tree before the first pass.
        const VALIDATE_AST = 0x4;
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::VALIDATE_AST
    }
}

#[derive(Clone, Debug, thiserror::Error)]
pub enum CompileError {
    #[error(transparent)]
    Declaration(#[from] DeclarationError),
    #[error("Tree is invalid after `{pass}`")]
    Validation {
        pass: &'static str,
        #[source]
        error: ValidationError,
    },
}

/// Runs passes over a compilation unit.
#[derive(Debug)]
pub struct Compiler {
    options: CompileOptions,
    validator: Validator,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new(CompileOptions::default())
    }
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self::with_validation(options, ValidationFlags::default())
    }

    pub fn with_validation(options: CompileOptions, flags: ValidationFlags) -> Self {
        Compiler {
            options,
            validator: Validator::new(flags),
        }
    }

    pub fn options(&self) -> CompileOptions {
        self.options
    }

    /// Validate the tree, logging the failure if any.
    pub fn validate_ast(
        &mut self,
        tree: &Tree,
        symbols: &SymbolTable,
    ) -> Result<(), ValidationError> {
        self.validator.validate(tree, symbols).map_err(|error| {
            log::warn!("AST validation failed: {}", error);
            error
        })
    }

    /// Run every enabled pass over `tree`, in order.
    ///
    /// The whole compilation is abandoned at the first pass leaving an
    /// invalid tree.
    pub fn compile(
        &mut self,
        tree: &mut Tree,
        symbols: &mut SymbolTable,
    ) -> Result<(), CompileError> {
        if self.options.contains(CompileOptions::VALIDATE_AST) {
            self.validate_ast(tree, symbols)
                .map_err(|error| CompileError::Validation {
                    pass: "parse",
                    error,
                })?;
        }

        type Pass = fn(&mut Compiler, &mut Tree, &mut SymbolTable) -> Result<(), ValidationError>;
        let passes: [(CompileOptions, &'static str, Pass); 2] = [
            (
                CompileOptions::REGENERATE_STRUCT_NAMES,
                "regenerate_struct_names",
                regenerate_struct_names,
            ),
            (
                CompileOptions::SCALARIZE_VEC_AND_MAT_CONSTRUCTOR_ARGS,
                "scalarize_vec_and_mat_constructor_args",
                scalarize_vec_and_mat_constructor_args,
            ),
        ];

        for &(option, pass, run) in passes.iter() {
            if !self.options.contains(option) {
                continue;
            }
            log::debug!("Running {}", pass);
            run(self, tree, symbols).map_err(|error| CompileError::Validation { pass, error })?;
            log::debug!("Finished {}", pass);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{tree::Node, ConstantUnion, Type};

    #[test]
    fn invalid_input_is_reported_before_any_pass() {
        let mut table = SymbolTable::default();
        let mut tree = Tree::new();
        let one = tree.append(Node::Constant {
            values: vec![ConstantUnion::Float(1.0)],
            ty: Type::INT,
        });
        let root = tree.root();
        tree.push_statement(root, one);

        let mut compiler = Compiler::default();
        match compiler.compile(&mut tree, &mut table) {
            Err(CompileError::Validation { pass, error }) => {
                assert_eq!(pass, "parse");
                assert!(matches!(error, ValidationError::TypeMismatch { node, .. } if node == one));
            }
            other => unreachable!("unexpected {:?}", other),
        }

        let mut unchecked = Compiler::new(CompileOptions::empty());
        assert!(unchecked.compile(&mut tree, &mut table).is_ok());
    }
}
