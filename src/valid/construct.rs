use super::ValidationError;
use crate::{
    arena::{Arena, Handle},
    symbol::Symbol,
    tree::Node,
    Type, TypeInner,
};

/// Check the arguments of a constructor of type `ty`.
///
/// Scalars, vectors and matrices are built component-wise: the arguments
/// must provide enough components, and every argument must contribute at
/// least one of them. A single scalar fills a whole vector or the diagonal of
/// a matrix, and a single matrix may build any other matrix.
pub fn validate_construct(
    node: Handle<Node>,
    ty: &Type,
    arguments: &[(Handle<Node>, Type)],
    symbols: &Arena<Symbol>,
) -> Result<(), ValidationError> {
    if let Some(size) = ty.array_size {
        if arguments.len() != size.get() as usize {
            return Err(ValidationError::ConstructorSize {
                node,
                expected: size.get(),
                given: arguments.len() as u32,
            });
        }
        let element = ty.element();
        return match arguments.iter().find(|&&(_, arg)| !arg.same_shape(&element)) {
            Some(&(arg, found)) => Err(ValidationError::TypeMismatch { node: arg, found }),
            None => Ok(()),
        };
    }

    match ty.inner {
        TypeInner::Scalar(_) | TypeInner::Vector { .. } | TypeInner::Matrix { .. } => {}
        TypeInner::Struct(structure) => {
            let fields = structure.resolve(symbols).fields();
            if arguments.len() != fields.len() {
                return Err(ValidationError::ConstructorSize {
                    node,
                    expected: fields.len() as u32,
                    given: arguments.len() as u32,
                });
            }
            return match arguments
                .iter()
                .zip(fields)
                .find(|&(&(_, arg), field)| !arg.same_shape(&field.ty))
            {
                Some((&(arg, found), _)) => Err(ValidationError::TypeMismatch { node: arg, found }),
                None => Ok(()),
            };
        }
        _ => {
            return Err(ValidationError::TypeMismatch { node, found: *ty });
        }
    }

    let mut given = 0;
    for &(arg, arg_ty) in arguments {
        if !(arg_ty.is_scalar() || arg_ty.is_vector() || arg_ty.is_matrix()) {
            return Err(ValidationError::TypeMismatch {
                node: arg,
                found: arg_ty,
            });
        }
        given += arg_ty.object_size(symbols);
    }

    let expected = ty.object_size(symbols);
    let valid = match *arguments {
        [] => false,
        [(_, single)] => {
            single.is_scalar() || (single.is_matrix() && ty.is_matrix()) || given >= expected
        }
        [.., (_, last)] => given >= expected && given - last.object_size(symbols) < expected,
    };
    if valid {
        Ok(())
    } else {
        Err(ValidationError::ConstructorSize {
            node,
            expected,
            given,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ScalarKind, VectorSize};
    use std::num::NonZeroU32;

    fn check(ty: Type, arguments: &[Type]) -> Result<(), ValidationError> {
        let mut nodes = Arena::new();
        let node = nodes.append(Node::Block(Vec::new()));
        let arguments: Vec<_> = arguments
            .iter()
            .map(|&ty| (nodes.append(Node::Block(Vec::new())), ty))
            .collect();
        validate_construct(node, &ty, &arguments, &Arena::new())
    }

    #[test]
    fn component_counts() {
        let vec2 = Type::vector(ScalarKind::Float, VectorSize::Bi);
        let vec3 = Type::vector(ScalarKind::Float, VectorSize::Tri);
        let vec4 = Type::vector(ScalarKind::Float, VectorSize::Quad);
        let mat2 = Type::matrix(VectorSize::Bi, VectorSize::Bi);
        let mat4 = Type::matrix(VectorSize::Quad, VectorSize::Quad);

        assert!(check(vec4, &[Type::FLOAT]).is_ok());
        assert!(check(vec4, &[vec2, vec2]).is_ok());
        assert!(check(vec3, &[Type::FLOAT, vec4]).is_ok());
        assert!(check(vec4, &[Type::FLOAT, mat4]).is_ok());
        assert!(check(vec4, &[mat2]).is_ok());
        assert!(check(mat4, &[mat2]).is_ok());
        assert!(check(mat2, &[vec2, vec2]).is_ok());

        assert!(matches!(
            check(vec4, &[vec2]),
            Err(ValidationError::ConstructorSize {
                expected: 4,
                given: 2,
                ..
            })
        ));
        assert!(check(vec2, &[vec2, Type::FLOAT]).is_err());
        assert!(check(vec2, &[]).is_err());
    }

    #[test]
    fn arrays_take_one_argument_per_element() {
        let array = Type::FLOAT.array_of(NonZeroU32::new(2).unwrap());
        assert!(check(array, &[Type::FLOAT, Type::FLOAT]).is_ok());
        assert!(check(array, &[Type::FLOAT]).is_err());
        assert!(matches!(
            check(array, &[Type::FLOAT, Type::INT]),
            Err(ValidationError::TypeMismatch { .. })
        ));
    }
}
