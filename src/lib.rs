/*! Shading language translator front end.

The crate holds the substrate every translation pass is built on:
  1. The symbol model ([`symbol::Symbol`]) and the scope-aware
     [`SymbolTable`] that owns every user-defined and internal symbol of a
     compilation, next to the static universe of built-ins.
  2. The [`Tree`] of nodes produced by the parser. Nodes live in an
     [`Arena`] and refer to each other through [`Handle`]s; nothing is freed
     individually, the arena goes away with the compilation.
  3. The [`traverse`] engine and the [`traverse::matcher::PatternMatcher`]
     used by passes to find the node shapes they rewrite.
  4. The passes in [`ops`], each followed by AST validation from [`valid`].

Built-in symbols are constant data shared by all compilations. They are
referenced through [`SymbolRef::BuiltIn`] and can never be mutated: the table
hands out mutable access only to symbols of its own pool.
!*/

#![allow(
    renamed_and_removed_lints,
    unknown_lints,
    clippy::new_without_default,
    clippy::match_like_matches_macro
)]
#![warn(
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_qualifications,
    clippy::pattern_type_mismatch
)]
#![deny(clippy::panic)]

mod arena;
pub mod ops;
pub mod symbol;
pub mod traverse;
pub mod tree;
pub mod valid;

pub use crate::arena::{Arena, BadHandle, Handle};
pub use crate::symbol::{table::SymbolTable, Symbol, SymbolRef};
pub use crate::tree::{Node, Tree};

use std::{
    collections::{HashMap, HashSet},
    fmt::Write as _,
    hash::BuildHasherDefault,
    num::NonZeroU32,
};

#[cfg(feature = "deserialize")]
use serde::Deserialize;
#[cfg(feature = "serialize")]
use serde::Serialize;

/// Hash map that is faster but not resilient to DoS attacks.
pub type FastHashMap<K, T> = HashMap<K, T, BuildHasherDefault<fxhash::FxHasher>>;
/// Hash set that is faster but not resilient to DoS attacks.
pub type FastHashSet<K> = HashSet<K, BuildHasherDefault<fxhash::FxHasher>>;

/// Stage of the programmable pipeline.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
#[allow(missing_docs)] // The names are self evident
pub enum ShaderStage {
    Vertex,
    Fragment,
    Compute,
}

/// Version of the shading language a program is written against.
///
/// Versions are ordered, so availability ranges can be checked with
/// plain comparisons.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum ShaderVersion {
    /// `#version 100`
    Essl100,
    /// `#version 300 es`
    Essl300,
    /// `#version 310 es`
    Essl310,
}

/// Extension a symbol depends on.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum Extension {
    /// The symbol is part of the core language.
    Undefined,
    ExtFragDepth,
    ExtShaderFramebufferFetch,
    OesStandardDerivatives,
}

/// Number of components in a vector, or columns/rows of a matrix.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum VectorSize {
    /// 2D vector
    Bi = 2,
    /// 3D vector
    Tri = 3,
    /// 4D vector
    Quad = 4,
}

/// Primitive type for a scalar.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum ScalarKind {
    /// Signed integer type.
    Sint,
    /// Unsigned integer type.
    Uint,
    /// Floating point type.
    Float,
    /// Boolean type.
    Bool,
}

/// Opaque sampler types.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum SamplerKind {
    Sampler2D,
    Sampler3D,
    SamplerCube,
}

#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum Precision {
    Undefined,
    Low,
    Medium,
    High,
}

/// Storage qualifier of a value.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum Qualifier {
    /// Function locals and intermediate values.
    Temporary,
    /// Globals without a storage qualifier.
    Global,
    /// Compile-time constants.
    Const,
    Attribute,
    VaryingIn,
    VaryingOut,
    Uniform,
    Buffer,
    Shared,
    ParamIn,
    ParamOut,
    ParamInOut,
    ParamConst,
    // built-in inputs and outputs
    Position,
    PointSize,
    FragCoord,
    FrontFacing,
    PointCoord,
    FragColor,
    FragData,
    FragDepth,
    LastFragData,
    VertexId,
    InstanceId,
    LocalInvocationId,
    WorkGroupId,
    NumWorkGroups,
}

impl Qualifier {
    /// Returns `true` for qualifiers of values that can never be written.
    pub fn is_read_only(self) -> bool {
        match self {
            Self::Const
            | Self::Attribute
            | Self::VaryingIn
            | Self::Uniform
            | Self::ParamConst
            | Self::FragCoord
            | Self::FrontFacing
            | Self::PointCoord
            | Self::LastFragData
            | Self::VertexId
            | Self::InstanceId
            | Self::LocalInvocationId
            | Self::WorkGroupId
            | Self::NumWorkGroups => true,
            _ => false,
        }
    }
}

/// Memory layout of an interface block.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum BlockStorage {
    Shared,
    Packed,
    Std140,
    Std430,
}

#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum MatrixPacking {
    ColumnMajor,
    RowMajor,
}

/// Contents of a `layout(...)` qualifier.
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub struct LayoutQualifier {
    pub location: Option<u32>,
    pub binding: Option<u32>,
    pub block_storage: Option<BlockStorage>,
    pub matrix_packing: Option<MatrixPacking>,
}

impl LayoutQualifier {
    pub const EMPTY: Self = LayoutQualifier {
        location: None,
        binding: None,
        block_storage: None,
        matrix_packing: None,
    };
}

/// Intrinsic operation implemented by a built-in function.
#[derive(Clone, Copy, Debug, Hash, Eq, Ord, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum Intrinsic {
    Radians,
    Degrees,
    Sin,
    Cos,
    Sqrt,
    Length,
    Normalize,
    Dot,
    Mix,
    Transpose,
    Texture2D,
    TextureCube,
    Texture,
    DFdx,
}

/// A single scalar of constant data.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
#[cfg_attr(feature = "deserialize", derive(Deserialize))]
pub enum ConstantUnion {
    Sint(i32),
    Uint(u32),
    Float(f32),
    Bool(bool),
}

impl ConstantUnion {
    pub fn scalar_kind(&self) -> ScalarKind {
        match *self {
            Self::Sint(_) => ScalarKind::Sint,
            Self::Uint(_) => ScalarKind::Uint,
            Self::Float(_) => ScalarKind::Float,
            Self::Bool(_) => ScalarKind::Bool,
        }
    }
}

/// The shape of a type, without qualifiers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TypeInner {
    Void,
    Scalar(ScalarKind),
    Vector {
        kind: ScalarKind,
        size: VectorSize,
    },
    /// Matrices are always made of floats.
    Matrix {
        columns: VectorSize,
        rows: VectorSize,
    },
    Sampler(SamplerKind),
    /// A [`symbol::Structure`].
    Struct(SymbolRef),
    /// A [`symbol::InterfaceBlock`].
    InterfaceBlock(SymbolRef),
}

/// A fully resolved type.
///
/// Types are small values referring to structures and interface blocks by
/// [`SymbolRef`], so they are copied around rather than shared.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Type {
    pub inner: TypeInner,
    pub precision: Precision,
    pub qualifier: Qualifier,
    pub array_size: Option<NonZeroU32>,
}

impl Type {
    pub const VOID: Self = Self::new(TypeInner::Void);
    pub const FLOAT: Self = Self::scalar(ScalarKind::Float);
    pub const INT: Self = Self::scalar(ScalarKind::Sint);
    pub const UINT: Self = Self::scalar(ScalarKind::Uint);
    pub const BOOL: Self = Self::scalar(ScalarKind::Bool);

    pub const fn new(inner: TypeInner) -> Self {
        Type {
            inner,
            precision: Precision::Undefined,
            qualifier: Qualifier::Temporary,
            array_size: None,
        }
    }

    pub const fn scalar(kind: ScalarKind) -> Self {
        Self::new(TypeInner::Scalar(kind))
    }

    pub const fn vector(kind: ScalarKind, size: VectorSize) -> Self {
        Self::new(TypeInner::Vector { kind, size })
    }

    pub const fn matrix(columns: VectorSize, rows: VectorSize) -> Self {
        Self::new(TypeInner::Matrix { columns, rows })
    }

    pub const fn sampler(kind: SamplerKind) -> Self {
        Self::new(TypeInner::Sampler(kind))
    }

    pub const fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    pub const fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifier = qualifier;
        self
    }

    /// Turn the type into an array of `size` elements.
    pub const fn array_of(mut self, size: NonZeroU32) -> Self {
        self.array_size = Some(size);
        self
    }

    /// The type of a single array element.
    pub fn element(&self) -> Self {
        Type {
            array_size: None,
            ..*self
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_size.is_some()
    }

    pub fn is_scalar(&self) -> bool {
        !self.is_array() && matches!(self.inner, TypeInner::Scalar(_))
    }

    pub fn is_vector(&self) -> bool {
        !self.is_array() && matches!(self.inner, TypeInner::Vector { .. })
    }

    pub fn is_matrix(&self) -> bool {
        !self.is_array() && matches!(self.inner, TypeInner::Matrix { .. })
    }

    pub fn is_sampler(&self) -> bool {
        matches!(self.inner, TypeInner::Sampler(_))
    }

    pub fn is_struct(&self) -> bool {
        matches!(self.inner, TypeInner::Struct(_))
    }

    pub fn scalar_kind(&self) -> Option<ScalarKind> {
        match self.inner {
            TypeInner::Scalar(kind) | TypeInner::Vector { kind, .. } => Some(kind),
            TypeInner::Matrix { .. } => Some(ScalarKind::Float),
            _ => None,
        }
    }

    /// Number of components of a vector, number of columns of a matrix,
    /// or 1 for everything else.
    pub fn nominal_size(&self) -> u32 {
        match self.inner {
            TypeInner::Vector { size, .. } => size as u32,
            TypeInner::Matrix { columns, .. } => columns as u32,
            _ => 1,
        }
    }

    pub fn cols(&self) -> u32 {
        match self.inner {
            TypeInner::Matrix { columns, .. } => columns as u32,
            _ => 1,
        }
    }

    pub fn rows(&self) -> u32 {
        match self.inner {
            TypeInner::Matrix { rows, .. } => rows as u32,
            _ => 1,
        }
    }

    /// Total count of scalars in a value of this type.
    ///
    /// Structures and interface blocks need the symbols of their fields, so
    /// this only counts them through `symbols`.
    pub fn object_size(&self, symbols: &Arena<Symbol>) -> u32 {
        let element = match self.inner {
            TypeInner::Void => 0,
            TypeInner::Scalar(_) | TypeInner::Sampler(_) => 1,
            TypeInner::Vector { size, .. } => size as u32,
            TypeInner::Matrix { columns, rows } => columns as u32 * rows as u32,
            TypeInner::Struct(r) | TypeInner::InterfaceBlock(r) => r
                .resolve(symbols)
                .fields()
                .iter()
                .map(|field| field.ty.object_size(symbols))
                .sum(),
        };
        element * self.array_size.map_or(1, NonZeroU32::get)
    }

    /// Compare the shapes of two types, ignoring precision and qualifiers.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.inner == other.inner && self.array_size == other.array_size
    }

    /// The type of `self[index]`.
    pub fn indexed(&self) -> Option<Self> {
        let base = Type::new(TypeInner::Void)
            .with_precision(self.precision)
            .with_qualifier(Qualifier::Temporary);
        if self.is_array() {
            return Some(Type {
                qualifier: Qualifier::Temporary,
                ..self.element()
            });
        }
        let inner = match self.inner {
            TypeInner::Vector { kind, .. } => TypeInner::Scalar(kind),
            TypeInner::Matrix { rows, .. } => TypeInner::Vector {
                kind: ScalarKind::Float,
                size: rows,
            },
            _ => return None,
        };
        Some(Type { inner, ..base })
    }

    /// Append the mangled encoding of this type to `out`.
    ///
    /// Every encoding is terminated by `;`, so concatenated encodings of
    /// parameter lists stay unambiguous.
    pub fn write_mangled(&self, symbols: &Arena<Symbol>, out: &mut String) {
        fn kind_code(kind: ScalarKind) -> char {
            match kind {
                ScalarKind::Float => 'f',
                ScalarKind::Sint => 'i',
                ScalarKind::Uint => 'u',
                ScalarKind::Bool => 'b',
            }
        }

        match self.inner {
            TypeInner::Void => out.push('v'),
            TypeInner::Scalar(kind) => out.push(kind_code(kind)),
            TypeInner::Vector { kind, size } => {
                out.push(kind_code(kind));
                let _ = write!(out, "{}", size as u8);
            }
            TypeInner::Matrix { columns, rows } => {
                let _ = write!(out, "m{}{}", columns as u8, rows as u8);
            }
            TypeInner::Sampler(kind) => out.push_str(match kind {
                SamplerKind::Sampler2D => "s2",
                SamplerKind::Sampler3D => "s3",
                SamplerKind::SamplerCube => "sC",
            }),
            TypeInner::Struct(r) | TypeInner::InterfaceBlock(r) => {
                let symbol = r.resolve(symbols);
                if symbol.symbol_type() == symbol::SymbolType::Empty {
                    let _ = write!(out, "{{#{:x}}}", symbol.id().get());
                } else {
                    let _ = write!(out, "{{{}}}", symbol.raw_name());
                }
            }
        }
        if let Some(size) = self.array_size {
            let _ = write!(out, "[{}]", size);
        }
        out.push(';');
    }
}
