//! The built-in symbols of the language.
//!
//! Everything here is constant data with identities fixed at build time.
//! [`SymbolTable::new`](super::table::SymbolTable::new) picks the entries
//! available to the shader being compiled.

use super::{Field, Function, Symbol, SymbolId, SymbolKind, SymbolRef, Structure, Variable};
use crate::{
    ConstantUnion, Extension, Intrinsic, LayoutQualifier, Precision, Qualifier, SamplerKind,
    ScalarKind, ShaderStage, ShaderVersion, Type, TypeInner, VectorSize,
};
use std::{borrow::Cow, num::NonZeroU32};

use crate::ShaderStage::{Compute, Fragment, Vertex};
use crate::ShaderVersion::{Essl100, Essl300, Essl310};

/// The largest identity used by a built-in.
pub const LAST_BUILTIN_ID: u32 = 95;

/// A built-in symbol together with the profiles exposing it.
#[derive(Debug)]
pub struct BuiltinEntry {
    pub symbol: &'static Symbol,
    pub since: ShaderVersion,
    /// Last version exposing the symbol, inclusive.
    pub until: Option<ShaderVersion>,
    pub stage: Option<ShaderStage>,
}

impl BuiltinEntry {
    pub fn is_available(
        &self,
        version: ShaderVersion,
        stage: ShaderStage,
        extension_enabled: impl Fn(Extension) -> bool,
    ) -> bool {
        version >= self.since
            && self.until.map_or(true, |until| version <= until)
            && self.stage.map_or(true, |s| s == stage)
            && (self.symbol.extension() == Extension::Undefined
                || extension_enabled(self.symbol.extension()))
    }
}

const fn id(raw: u32) -> SymbolId {
    SymbolId::builtin(raw)
}

const fn variable(raw: u32, name: &'static str, extension: Extension, ty: Type) -> Symbol {
    Symbol::builtin(
        id(raw),
        name,
        extension,
        SymbolKind::Variable(Variable::new(ty)),
    )
}

const fn constant(raw: u32, name: &'static str, value: &'static [ConstantUnion]) -> Symbol {
    let ty = Type::INT
        .with_precision(Precision::Medium)
        .with_qualifier(Qualifier::Const);
    Symbol::builtin(
        id(raw),
        name,
        Extension::Undefined,
        SymbolKind::Variable(Variable::constant(ty, value)),
    )
}

const fn param(raw: u32, name: &'static str, ty: Type) -> Symbol {
    variable(
        raw,
        name,
        Extension::Undefined,
        ty.with_qualifier(Qualifier::ParamIn),
    )
}

const fn function(
    raw: u32,
    name: &'static str,
    mangled_name: &'static str,
    extension: Extension,
    parameters: &'static [&'static Symbol],
    return_type: Type,
    op: Intrinsic,
) -> Symbol {
    Symbol::builtin(
        id(raw),
        name,
        extension,
        SymbolKind::Function(Function::builtin(parameters, return_type, mangled_name, op)),
    )
}

const fn entry(symbol: &'static Symbol, since: ShaderVersion) -> BuiltinEntry {
    BuiltinEntry {
        symbol,
        since,
        until: None,
        stage: None,
    }
}

const fn staged(
    symbol: &'static Symbol,
    since: ShaderVersion,
    until: Option<ShaderVersion>,
    stage: ShaderStage,
) -> BuiltinEntry {
    BuiltinEntry {
        symbol,
        since,
        until,
        stage: Some(stage),
    }
}

const fn until(symbol: &'static Symbol, until: ShaderVersion) -> BuiltinEntry {
    BuiltinEntry {
        symbol,
        since: ShaderVersion::Essl100,
        until: Some(until),
        stage: None,
    }
}

const ONE: NonZeroU32 = match NonZeroU32::new(1) {
    Some(one) => one,
    None => unreachable!(),
};

const HIGH_FLOAT: Type = Type::FLOAT.with_precision(Precision::High);
const VEC2: Type = Type::vector(ScalarKind::Float, VectorSize::Bi);
const VEC3: Type = Type::vector(ScalarKind::Float, VectorSize::Tri);
const VEC4: Type = Type::vector(ScalarKind::Float, VectorSize::Quad);
const UVEC3: Type = Type::vector(ScalarKind::Uint, VectorSize::Tri).with_precision(Precision::High);
const MAT2: Type = Type::matrix(VectorSize::Bi, VectorSize::Bi);
const MAT3: Type = Type::matrix(VectorSize::Tri, VectorSize::Tri);
const MAT4: Type = Type::matrix(VectorSize::Quad, VectorSize::Quad);

static DEPTH_RANGE_FIELDS: [Field; 3] = [
    Field {
        name: Cow::Borrowed("near"),
        ty: HIGH_FLOAT,
        layout: LayoutQualifier::EMPTY,
    },
    Field {
        name: Cow::Borrowed("far"),
        ty: HIGH_FLOAT,
        layout: LayoutQualifier::EMPTY,
    },
    Field {
        name: Cow::Borrowed("diff"),
        ty: HIGH_FLOAT,
        layout: LayoutQualifier::EMPTY,
    },
];

pub static GL_DEPTH_RANGE_PARAMETERS: Symbol = Symbol::builtin(
    id(1),
    "gl_DepthRangeParameters",
    Extension::Undefined,
    SymbolKind::Structure(Structure::builtin(&DEPTH_RANGE_FIELDS)),
);

pub static GL_DEPTH_RANGE: Symbol = variable(
    2,
    "gl_DepthRange",
    Extension::Undefined,
    Type::new(TypeInner::Struct(SymbolRef::BuiltIn(&GL_DEPTH_RANGE_PARAMETERS)))
        .with_qualifier(Qualifier::Uniform),
);
pub static GL_POSITION: Symbol = variable(
    3,
    "gl_Position",
    Extension::Undefined,
    VEC4.with_precision(Precision::High)
        .with_qualifier(Qualifier::Position),
);
pub static GL_POINT_SIZE: Symbol = variable(
    4,
    "gl_PointSize",
    Extension::Undefined,
    Type::FLOAT
        .with_precision(Precision::Medium)
        .with_qualifier(Qualifier::PointSize),
);
pub static GL_FRAG_COORD: Symbol = variable(
    5,
    "gl_FragCoord",
    Extension::Undefined,
    VEC4.with_precision(Precision::Medium)
        .with_qualifier(Qualifier::FragCoord),
);
pub static GL_FRONT_FACING: Symbol = variable(
    6,
    "gl_FrontFacing",
    Extension::Undefined,
    Type::BOOL.with_qualifier(Qualifier::FrontFacing),
);
pub static GL_POINT_COORD: Symbol = variable(
    7,
    "gl_PointCoord",
    Extension::Undefined,
    VEC2.with_precision(Precision::Medium)
        .with_qualifier(Qualifier::PointCoord),
);
pub static GL_FRAG_COLOR: Symbol = variable(
    8,
    "gl_FragColor",
    Extension::Undefined,
    VEC4.with_precision(Precision::Medium)
        .with_qualifier(Qualifier::FragColor),
);
pub static GL_FRAG_DATA: Symbol = variable(
    9,
    "gl_FragData",
    Extension::Undefined,
    VEC4.with_precision(Precision::Medium)
        .with_qualifier(Qualifier::FragData)
        .array_of(ONE),
);
pub static GL_FRAG_DEPTH_EXT: Symbol = variable(
    10,
    "gl_FragDepthEXT",
    Extension::ExtFragDepth,
    HIGH_FLOAT.with_qualifier(Qualifier::FragDepth),
);
pub static GL_LAST_FRAG_DATA: Symbol = variable(
    11,
    "gl_LastFragData",
    Extension::ExtShaderFramebufferFetch,
    VEC4.with_precision(Precision::Medium)
        .with_qualifier(Qualifier::LastFragData)
        .array_of(ONE),
);
pub static GL_FRAG_DEPTH: Symbol = variable(
    12,
    "gl_FragDepth",
    Extension::Undefined,
    HIGH_FLOAT.with_qualifier(Qualifier::FragDepth),
);
pub static GL_VERTEX_ID: Symbol = variable(
    13,
    "gl_VertexID",
    Extension::Undefined,
    Type::INT
        .with_precision(Precision::High)
        .with_qualifier(Qualifier::VertexId),
);
pub static GL_INSTANCE_ID: Symbol = variable(
    14,
    "gl_InstanceID",
    Extension::Undefined,
    Type::INT
        .with_precision(Precision::High)
        .with_qualifier(Qualifier::InstanceId),
);
pub static GL_LOCAL_INVOCATION_ID: Symbol = variable(
    15,
    "gl_LocalInvocationID",
    Extension::Undefined,
    UVEC3.with_qualifier(Qualifier::LocalInvocationId),
);
pub static GL_WORK_GROUP_ID: Symbol = variable(
    16,
    "gl_WorkGroupID",
    Extension::Undefined,
    UVEC3.with_qualifier(Qualifier::WorkGroupId),
);
pub static GL_NUM_WORK_GROUPS: Symbol = variable(
    17,
    "gl_NumWorkGroups",
    Extension::Undefined,
    UVEC3.with_qualifier(Qualifier::NumWorkGroups),
);

pub static GL_MAX_VERTEX_ATTRIBS: Symbol =
    constant(18, "gl_MaxVertexAttribs", &[ConstantUnion::Sint(8)]);
pub static GL_MAX_VERTEX_UNIFORM_VECTORS: Symbol =
    constant(19, "gl_MaxVertexUniformVectors", &[ConstantUnion::Sint(128)]);
pub static GL_MAX_VARYING_VECTORS: Symbol =
    constant(20, "gl_MaxVaryingVectors", &[ConstantUnion::Sint(8)]);
pub static GL_MAX_VERTEX_TEXTURE_IMAGE_UNITS: Symbol =
    constant(21, "gl_MaxVertexTextureImageUnits", &[ConstantUnion::Sint(0)]);
pub static GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS: Symbol = constant(
    22,
    "gl_MaxCombinedTextureImageUnits",
    &[ConstantUnion::Sint(8)],
);
pub static GL_MAX_TEXTURE_IMAGE_UNITS: Symbol =
    constant(23, "gl_MaxTextureImageUnits", &[ConstantUnion::Sint(8)]);
pub static GL_MAX_FRAGMENT_UNIFORM_VECTORS: Symbol =
    constant(24, "gl_MaxFragmentUniformVectors", &[ConstantUnion::Sint(16)]);
pub static GL_MAX_DRAW_BUFFERS: Symbol =
    constant(25, "gl_MaxDrawBuffers", &[ConstantUnion::Sint(1)]);

// Parameters are shared between all the overloads using them.
static PT_X_FLOAT: Symbol = param(26, "x", Type::FLOAT);
static PT_X_VEC2: Symbol = param(27, "x", VEC2);
static PT_X_VEC3: Symbol = param(28, "x", VEC3);
static PT_X_VEC4: Symbol = param(29, "x", VEC4);
static PT_Y_FLOAT: Symbol = param(30, "y", Type::FLOAT);
static PT_Y_VEC2: Symbol = param(31, "y", VEC2);
static PT_Y_VEC3: Symbol = param(32, "y", VEC3);
static PT_Y_VEC4: Symbol = param(33, "y", VEC4);
static PT_A_FLOAT: Symbol = param(34, "a", Type::FLOAT);
static PT_A_VEC2: Symbol = param(35, "a", VEC2);
static PT_A_VEC3: Symbol = param(36, "a", VEC3);
static PT_A_VEC4: Symbol = param(37, "a", VEC4);
static PT_M_MAT2: Symbol = param(38, "m", MAT2);
static PT_M_MAT3: Symbol = param(39, "m", MAT3);
static PT_M_MAT4: Symbol = param(40, "m", MAT4);
static PT_SAMPLER_2D: Symbol = param(41, "sampler", Type::sampler(SamplerKind::Sampler2D));
static PT_SAMPLER_CUBE: Symbol = param(42, "sampler", Type::sampler(SamplerKind::SamplerCube));
static PT_COORD_VEC2: Symbol = param(43, "coord", VEC2);
static PT_COORD_VEC3: Symbol = param(44, "coord", VEC3);

static PL_X_FLOAT: [&Symbol; 1] = [&PT_X_FLOAT];
static PL_X_VEC2: [&Symbol; 1] = [&PT_X_VEC2];
static PL_X_VEC3: [&Symbol; 1] = [&PT_X_VEC3];
static PL_X_VEC4: [&Symbol; 1] = [&PT_X_VEC4];
static PL_XY_FLOAT: [&Symbol; 2] = [&PT_X_FLOAT, &PT_Y_FLOAT];
static PL_XY_VEC2: [&Symbol; 2] = [&PT_X_VEC2, &PT_Y_VEC2];
static PL_XY_VEC3: [&Symbol; 2] = [&PT_X_VEC3, &PT_Y_VEC3];
static PL_XY_VEC4: [&Symbol; 2] = [&PT_X_VEC4, &PT_Y_VEC4];
static PL_XYA_FLOAT: [&Symbol; 3] = [&PT_X_FLOAT, &PT_Y_FLOAT, &PT_A_FLOAT];
static PL_XYA_VEC2: [&Symbol; 3] = [&PT_X_VEC2, &PT_Y_VEC2, &PT_A_VEC2];
static PL_XYA_VEC3: [&Symbol; 3] = [&PT_X_VEC3, &PT_Y_VEC3, &PT_A_VEC3];
static PL_XYA_VEC4: [&Symbol; 3] = [&PT_X_VEC4, &PT_Y_VEC4, &PT_A_VEC4];
static PL_M_MAT2: [&Symbol; 1] = [&PT_M_MAT2];
static PL_M_MAT3: [&Symbol; 1] = [&PT_M_MAT3];
static PL_M_MAT4: [&Symbol; 1] = [&PT_M_MAT4];
static PL_SAMPLER_2D: [&Symbol; 2] = [&PT_SAMPLER_2D, &PT_COORD_VEC2];
static PL_SAMPLER_CUBE: [&Symbol; 2] = [&PT_SAMPLER_CUBE, &PT_COORD_VEC3];

/// Declares the four `genType` overloads of a one-argument function
/// returning its argument type.
macro_rules! gen_type_unary {
    (
        $ext:ident, $op:ident, $name:literal, $first_id:expr =>
        $f:ident, $v2:ident, $v3:ident, $v4:ident
    ) => {
        static $f: Symbol = function(
            $first_id, $name, concat!($name, "(f;"),
            Extension::$ext, &PL_X_FLOAT, Type::FLOAT, Intrinsic::$op,
        );
        static $v2: Symbol = function(
            $first_id + 1, $name, concat!($name, "(f2;"),
            Extension::$ext, &PL_X_VEC2, VEC2, Intrinsic::$op,
        );
        static $v3: Symbol = function(
            $first_id + 2, $name, concat!($name, "(f3;"),
            Extension::$ext, &PL_X_VEC3, VEC3, Intrinsic::$op,
        );
        static $v4: Symbol = function(
            $first_id + 3, $name, concat!($name, "(f4;"),
            Extension::$ext, &PL_X_VEC4, VEC4, Intrinsic::$op,
        );
    };
}

gen_type_unary!(Undefined, Radians, "radians", 45 => RADIANS_F, RADIANS_F2, RADIANS_F3, RADIANS_F4);
gen_type_unary!(Undefined, Degrees, "degrees", 49 => DEGREES_F, DEGREES_F2, DEGREES_F3, DEGREES_F4);
gen_type_unary!(Undefined, Sin, "sin", 53 => SIN_F, SIN_F2, SIN_F3, SIN_F4);
gen_type_unary!(Undefined, Cos, "cos", 57 => COS_F, COS_F2, COS_F3, COS_F4);
gen_type_unary!(Undefined, Sqrt, "sqrt", 61 => SQRT_F, SQRT_F2, SQRT_F3, SQRT_F4);

static LENGTH_F: Symbol = function(
    65,
    "length",
    "length(f;",
    Extension::Undefined,
    &PL_X_FLOAT,
    Type::FLOAT,
    Intrinsic::Length,
);
static LENGTH_F2: Symbol = function(
    66,
    "length",
    "length(f2;",
    Extension::Undefined,
    &PL_X_VEC2,
    Type::FLOAT,
    Intrinsic::Length,
);
static LENGTH_F3: Symbol = function(
    67,
    "length",
    "length(f3;",
    Extension::Undefined,
    &PL_X_VEC3,
    Type::FLOAT,
    Intrinsic::Length,
);
static LENGTH_F4: Symbol = function(
    68,
    "length",
    "length(f4;",
    Extension::Undefined,
    &PL_X_VEC4,
    Type::FLOAT,
    Intrinsic::Length,
);

gen_type_unary!(
    Undefined, Normalize, "normalize", 69 =>
        NORMALIZE_F, NORMALIZE_F2, NORMALIZE_F3, NORMALIZE_F4
);

static DOT_F: Symbol = function(
    73,
    "dot",
    "dot(f;f;",
    Extension::Undefined,
    &PL_XY_FLOAT,
    Type::FLOAT,
    Intrinsic::Dot,
);
static DOT_F2: Symbol = function(
    74,
    "dot",
    "dot(f2;f2;",
    Extension::Undefined,
    &PL_XY_VEC2,
    Type::FLOAT,
    Intrinsic::Dot,
);
static DOT_F3: Symbol = function(
    75,
    "dot",
    "dot(f3;f3;",
    Extension::Undefined,
    &PL_XY_VEC3,
    Type::FLOAT,
    Intrinsic::Dot,
);
static DOT_F4: Symbol = function(
    76,
    "dot",
    "dot(f4;f4;",
    Extension::Undefined,
    &PL_XY_VEC4,
    Type::FLOAT,
    Intrinsic::Dot,
);

static MIX_F: Symbol = function(
    77,
    "mix",
    "mix(f;f;f;",
    Extension::Undefined,
    &PL_XYA_FLOAT,
    Type::FLOAT,
    Intrinsic::Mix,
);
static MIX_F2: Symbol = function(
    78,
    "mix",
    "mix(f2;f2;f2;",
    Extension::Undefined,
    &PL_XYA_VEC2,
    VEC2,
    Intrinsic::Mix,
);
static MIX_F3: Symbol = function(
    79,
    "mix",
    "mix(f3;f3;f3;",
    Extension::Undefined,
    &PL_XYA_VEC3,
    VEC3,
    Intrinsic::Mix,
);
static MIX_F4: Symbol = function(
    80,
    "mix",
    "mix(f4;f4;f4;",
    Extension::Undefined,
    &PL_XYA_VEC4,
    VEC4,
    Intrinsic::Mix,
);

static TRANSPOSE_M2: Symbol = function(
    81,
    "transpose",
    "transpose(m22;",
    Extension::Undefined,
    &PL_M_MAT2,
    MAT2,
    Intrinsic::Transpose,
);
static TRANSPOSE_M3: Symbol = function(
    82,
    "transpose",
    "transpose(m33;",
    Extension::Undefined,
    &PL_M_MAT3,
    MAT3,
    Intrinsic::Transpose,
);
static TRANSPOSE_M4: Symbol = function(
    83,
    "transpose",
    "transpose(m44;",
    Extension::Undefined,
    &PL_M_MAT4,
    MAT4,
    Intrinsic::Transpose,
);

static TEXTURE_2D: Symbol = function(
    84,
    "texture2D",
    "texture2D(s2;f2;",
    Extension::Undefined,
    &PL_SAMPLER_2D,
    VEC4,
    Intrinsic::Texture2D,
);
static TEXTURE_CUBE: Symbol = function(
    85,
    "textureCube",
    "textureCube(sC;f3;",
    Extension::Undefined,
    &PL_SAMPLER_CUBE,
    VEC4,
    Intrinsic::TextureCube,
);
static TEXTURE_S2: Symbol = function(
    86,
    "texture",
    "texture(s2;f2;",
    Extension::Undefined,
    &PL_SAMPLER_2D,
    VEC4,
    Intrinsic::Texture,
);
static TEXTURE_SC: Symbol = function(
    87,
    "texture",
    "texture(sC;f3;",
    Extension::Undefined,
    &PL_SAMPLER_CUBE,
    VEC4,
    Intrinsic::Texture,
);

gen_type_unary!(
    OesStandardDerivatives, DFdx, "dFdx", 88 =>
        DFDX_EXT_F, DFDX_EXT_F2, DFDX_EXT_F3, DFDX_EXT_F4
);
gen_type_unary!(Undefined, DFdx, "dFdx", 92 => DFDX_F, DFDX_F2, DFDX_F3, DFDX_F4);

/// Every built-in, in declaration order.
pub static BUILTINS: [BuiltinEntry; 76] = [
    entry(&GL_DEPTH_RANGE_PARAMETERS, Essl100),
    entry(&GL_DEPTH_RANGE, Essl100),
    staged(&GL_POSITION, Essl100, None, Vertex),
    staged(&GL_POINT_SIZE, Essl100, None, Vertex),
    staged(&GL_FRAG_COORD, Essl100, None, Fragment),
    staged(&GL_FRONT_FACING, Essl100, None, Fragment),
    staged(&GL_POINT_COORD, Essl100, None, Fragment),
    staged(&GL_FRAG_COLOR, Essl100, Some(Essl100), Fragment),
    staged(&GL_FRAG_DATA, Essl100, Some(Essl100), Fragment),
    staged(&GL_FRAG_DEPTH_EXT, Essl100, Some(Essl100), Fragment),
    staged(&GL_LAST_FRAG_DATA, Essl100, Some(Essl100), Fragment),
    staged(&GL_FRAG_DEPTH, Essl300, None, Fragment),
    staged(&GL_VERTEX_ID, Essl300, None, Vertex),
    staged(&GL_INSTANCE_ID, Essl300, None, Vertex),
    staged(&GL_LOCAL_INVOCATION_ID, Essl310, None, Compute),
    staged(&GL_WORK_GROUP_ID, Essl310, None, Compute),
    staged(&GL_NUM_WORK_GROUPS, Essl310, None, Compute),
    entry(&GL_MAX_VERTEX_ATTRIBS, Essl100),
    entry(&GL_MAX_VERTEX_UNIFORM_VECTORS, Essl100),
    entry(&GL_MAX_VARYING_VECTORS, Essl100),
    entry(&GL_MAX_VERTEX_TEXTURE_IMAGE_UNITS, Essl100),
    entry(&GL_MAX_COMBINED_TEXTURE_IMAGE_UNITS, Essl100),
    entry(&GL_MAX_TEXTURE_IMAGE_UNITS, Essl100),
    entry(&GL_MAX_FRAGMENT_UNIFORM_VECTORS, Essl100),
    entry(&GL_MAX_DRAW_BUFFERS, Essl100),
    entry(&RADIANS_F, Essl100),
    entry(&RADIANS_F2, Essl100),
    entry(&RADIANS_F3, Essl100),
    entry(&RADIANS_F4, Essl100),
    entry(&DEGREES_F, Essl100),
    entry(&DEGREES_F2, Essl100),
    entry(&DEGREES_F3, Essl100),
    entry(&DEGREES_F4, Essl100),
    entry(&SIN_F, Essl100),
    entry(&SIN_F2, Essl100),
    entry(&SIN_F3, Essl100),
    entry(&SIN_F4, Essl100),
    entry(&COS_F, Essl100),
    entry(&COS_F2, Essl100),
    entry(&COS_F3, Essl100),
    entry(&COS_F4, Essl100),
    entry(&SQRT_F, Essl100),
    entry(&SQRT_F2, Essl100),
    entry(&SQRT_F3, Essl100),
    entry(&SQRT_F4, Essl100),
    entry(&LENGTH_F, Essl100),
    entry(&LENGTH_F2, Essl100),
    entry(&LENGTH_F3, Essl100),
    entry(&LENGTH_F4, Essl100),
    entry(&NORMALIZE_F, Essl100),
    entry(&NORMALIZE_F2, Essl100),
    entry(&NORMALIZE_F3, Essl100),
    entry(&NORMALIZE_F4, Essl100),
    entry(&DOT_F, Essl100),
    entry(&DOT_F2, Essl100),
    entry(&DOT_F3, Essl100),
    entry(&DOT_F4, Essl100),
    entry(&MIX_F, Essl100),
    entry(&MIX_F2, Essl100),
    entry(&MIX_F3, Essl100),
    entry(&MIX_F4, Essl100),
    entry(&TRANSPOSE_M2, Essl300),
    entry(&TRANSPOSE_M3, Essl300),
    entry(&TRANSPOSE_M4, Essl300),
    until(&TEXTURE_2D, Essl100),
    until(&TEXTURE_CUBE, Essl100),
    entry(&TEXTURE_S2, Essl300),
    entry(&TEXTURE_SC, Essl300),
    until(&DFDX_EXT_F, Essl100),
    until(&DFDX_EXT_F2, Essl100),
    until(&DFDX_EXT_F3, Essl100),
    until(&DFDX_EXT_F4, Essl100),
    entry(&DFDX_F, Essl300),
    entry(&DFDX_F2, Essl300),
    entry(&DFDX_F3, Essl300),
    entry(&DFDX_F4, Essl300),
];

/// Iterate over every built-in entry.
pub fn entries() -> impl Iterator<Item = &'static BuiltinEntry> {
    BUILTINS.iter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Arena, FastHashSet};

    #[test]
    fn identities_are_unique_and_in_range() {
        let mut seen = FastHashSet::default();
        for entry in entries() {
            let symbol = entry.symbol;
            assert!(symbol.id().is_builtin(), "{}", symbol.raw_name());
            assert!(seen.insert(symbol.id()), "duplicate id for {}", symbol.raw_name());
            if let Some(function) = symbol.as_function() {
                for param in function.params() {
                    let param = param.resolve(&Arena::new()).id();
                    assert!(param.is_builtin());
                }
            }
        }
    }

    #[test]
    fn precomputed_mangled_names_match() {
        let pool = Arena::new();
        for entry in entries() {
            if let Some(function) = entry.symbol.as_function() {
                assert_eq!(
                    entry.symbol.mangled_name(&pool),
                    function.build_mangled_name(entry.symbol.raw_name(), &pool)
                );
            }
        }
    }

    #[test]
    fn every_function_has_an_intrinsic() {
        for entry in entries() {
            if let Some(function) = entry.symbol.as_function() {
                assert!(function.builtin_op().is_some());
                assert!(function.is_known_to_not_have_side_effects());
            }
        }
    }

    #[test]
    fn availability() {
        let none = |_| false;
        let frag_color = BUILTINS
            .iter()
            .find(|e| e.symbol.id() == GL_FRAG_COLOR.id())
            .unwrap();
        assert!(frag_color.is_available(Essl100, Fragment, none));
        assert!(!frag_color.is_available(Essl300, Fragment, none));
        assert!(!frag_color.is_available(Essl100, Vertex, none));

        let frag_depth_ext = BUILTINS
            .iter()
            .find(|e| e.symbol.id() == GL_FRAG_DEPTH_EXT.id())
            .unwrap();
        assert!(!frag_depth_ext.is_available(Essl100, Fragment, none));
        assert!(frag_depth_ext.is_available(Essl100, Fragment, |ext| {
            ext == Extension::ExtFragDepth
        }));
    }

    #[test]
    fn constants_carry_values() {
        let variable = GL_MAX_DRAW_BUFFERS.as_variable().unwrap();
        assert!(variable.ty().is_scalar());
        assert_eq!(variable.ty().qualifier, Qualifier::Const);
        match variable.const_pointer() {
            Some(super::super::ConstantRef::Static(values)) => {
                assert_eq!(values, &[ConstantUnion::Sint(1)])
            }
            other => unreachable!("unexpected constant {:?}", other),
        }
    }
}
