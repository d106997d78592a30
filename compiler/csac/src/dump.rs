//! JSON unit dumps.
//!
//! The front end that parses C++ writes each translation unit as a flat,
//! ordered list of nodes. Declarations, types and expressions are numbered
//! separately, by their position among the nodes of the same family, and a
//! node may only refer to nodes listed before it:
//!
//! ```json
//! {
//!   "path": "widget.cpp",
//!   "nodes": [
//!     { "node": "namespace", "name": "BloombergLP" },
//!     { "node": "namespace", "name": "bslma", "context": 0 },
//!     { "node": "record", "name": "Allocator", "context": 1, "span": [10, 19] },
//!     { "node": "record_type", "decl": 2 },
//!     { "node": "pointer", "to": 0 }
//!   ]
//! }
//! ```
//!
//! Relation nodes (`base`, `default_arg`, `initializer`, `statement`) attach
//! earlier nodes to each other and are not numbered.

use std::path::Path;

use csa_ir::ast::{Access, CtorFlags, ExprKind, InitTarget, Initializer, RecordFlags};
use csa_ir::{BuildError, DeclId, ExprId, QualType, Span, TranslationUnit, UnitBuilder};
use serde::Deserialize;

/// Failure to turn a dump file into a unit.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("'{path}' is not a valid unit dump: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("'{path}': node {node} {error}")]
    Node {
        path: String,
        node: usize,
        #[source]
        error: NodeError,
    },
    #[error("'{path}': {source}")]
    Build {
        path: String,
        #[source]
        source: BuildError,
    },
}

/// A node that cannot be placed in the unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("refers to undefined {family} #{index}")]
    Undefined { family: &'static str, index: u32 },
    #[error("must initialize exactly one of `base` or `member`")]
    InitializerTarget,
}

/// Top-level dump document.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitDump {
    /// Source file the unit was parsed from.
    #[serde(default)]
    pub path: Option<String>,
    /// Text of `path`, for line/column positions and snippets.
    #[serde(default)]
    pub source: Option<String>,
    pub nodes: Vec<Node>,
}

/// Byte range `[start, end)` in the source. Absent means "no location".
pub type SpanDump = [u32; 2];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordFlag {
    Local,
    Empty,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CtorFlag {
    HasBody,
    UserProvided,
    Default,
    Copy,
    Move,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessDump {
    #[default]
    Public,
    Protected,
    Private,
}

/// One dump entry, tagged by `"node"`.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    // Declarations
    Namespace {
        name: String,
        #[serde(default)]
        context: Option<u32>,
    },
    ClassTemplate {
        name: String,
        #[serde(default)]
        context: Option<u32>,
        #[serde(default)]
        span: SpanDump,
    },
    Record {
        name: String,
        #[serde(default)]
        context: Option<u32>,
        #[serde(default)]
        span: SpanDump,
        #[serde(default)]
        flags: Vec<RecordFlag>,
    },
    Specialization {
        template: u32,
        args: Vec<u32>,
        #[serde(default)]
        explicit: bool,
        #[serde(default)]
        span: SpanDump,
        #[serde(default)]
        flags: Vec<RecordFlag>,
    },
    Typedef {
        name: String,
        #[serde(default)]
        context: Option<u32>,
        underlying: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Field {
        record: u32,
        name: String,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Constructor {
        record: u32,
        #[serde(default)]
        access: AccessDump,
        #[serde(default)]
        flags: Vec<CtorFlag>,
        #[serde(default)]
        span: SpanDump,
    },
    /// Another declaration (usually the out-of-line definition) of a
    /// constructor declared earlier.
    Redeclaration {
        canonical: u32,
        #[serde(default)]
        flags: Vec<CtorFlag>,
        #[serde(default)]
        span: SpanDump,
    },
    Param {
        ctor: u32,
        #[serde(default)]
        name: String,
        ty: u32,
        /// Type as spelled, when it differs from the adjusted `ty`.
        #[serde(default)]
        written_ty: Option<u32>,
        #[serde(default)]
        span: SpanDump,
    },
    Conversion {
        record: u32,
        target: u32,
        #[serde(default)]
        span: SpanDump,
    },

    // Types
    Builtin {
        name: String,
    },
    RecordType {
        decl: u32,
    },
    TypedefType {
        decl: u32,
    },
    Pointer {
        to: u32,
    },
    LvalueRef {
        to: u32,
    },
    RvalueRef {
        to: u32,
    },
    Const {
        of: u32,
    },
    Elaborated {
        named: u32,
    },
    Substituted {
        replacement: u32,
    },
    TemplateType {
        template: u32,
        args: Vec<u32>,
        #[serde(default)]
        aliased: Option<u32>,
    },

    // Expressions
    Construct {
        ctor: u32,
        #[serde(default)]
        args: Vec<u32>,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Materialize {
        sub: u32,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Bind {
        sub: u32,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    /// Implicit conversion, located where its operand is.
    Cast {
        sub: u32,
        ty: u32,
    },
    DefaultArgument {
        param: u32,
        #[serde(default)]
        span: SpanDump,
    },
    DeclRef {
        decl: u32,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Integer {
        value: u64,
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Null {
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },
    Opaque {
        ty: u32,
        #[serde(default)]
        span: SpanDump,
    },

    // Relations
    Base {
        record: u32,
        ty: u32,
    },
    DefaultArg {
        param: u32,
        expr: u32,
    },
    Initializer {
        ctor: u32,
        #[serde(default)]
        base: Option<u32>,
        #[serde(default)]
        member: Option<u32>,
        init: u32,
        #[serde(default)]
        written: bool,
        #[serde(default)]
        span: SpanDump,
    },
    Statement {
        expr: u32,
    },
}

impl UnitDump {
    /// Parse a dump document. `origin` names it in errors.
    pub fn from_json(json: &str, origin: &str) -> Result<Self, LoadError> {
        serde_json::from_str(json).map_err(|source| LoadError::Json {
            path: origin.to_string(),
            source,
        })
    }

    /// Build the unit the dump describes.
    ///
    /// The unit is attributed to the dump's `path`, falling back to
    /// `origin`.
    pub fn into_unit(self, origin: &str) -> Result<TranslationUnit, LoadError> {
        let path = self.path.unwrap_or_else(|| origin.to_string());
        let builder = match self.source {
            Some(source) => UnitBuilder::new().with_source(path, source),
            None => UnitBuilder::new().with_path(path),
        };

        let mut loader = Loader::new(builder);
        for (index, node) in self.nodes.iter().enumerate() {
            loader.node(node).map_err(|error| LoadError::Node {
                path: origin.to_string(),
                node: index,
                error,
            })?;
        }
        tracing::debug!(
            decls = loader.decls.len(),
            types = loader.types.len(),
            exprs = loader.exprs.len(),
            "dump loaded"
        );
        loader.b.finish().map_err(|source| LoadError::Build {
            path: origin.to_string(),
            source,
        })
    }
}

/// Read and build the unit stored at `path`.
#[tracing::instrument(level = "debug", skip_all, fields(path = %path.display()))]
pub fn load_unit(path: &Path) -> Result<TranslationUnit, LoadError> {
    let origin = path.display().to_string();
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: origin.clone(),
        source,
    })?;
    UnitDump::from_json(&json, &origin)?.into_unit(&origin)
}

/// Build a unit from dump text held in memory.
pub fn parse_unit(json: &str, origin: &str) -> Result<TranslationUnit, LoadError> {
    UnitDump::from_json(json, origin)?.into_unit(origin)
}

fn span([start, end]: SpanDump) -> Span {
    Span::new(start, end)
}

fn record_flags(flags: &[RecordFlag]) -> RecordFlags {
    flags.iter().fold(RecordFlags::empty(), |acc, flag| {
        acc | match flag {
            RecordFlag::Local => RecordFlags::LOCAL,
            RecordFlag::Empty => RecordFlags::EMPTY,
        }
    })
}

fn ctor_flags(flags: &[CtorFlag]) -> CtorFlags {
    flags.iter().fold(CtorFlags::empty(), |acc, flag| {
        acc | match flag {
            CtorFlag::HasBody => CtorFlags::HAS_BODY,
            CtorFlag::UserProvided => CtorFlags::USER_PROVIDED,
            CtorFlag::Default => CtorFlags::DEFAULT_CTOR,
            CtorFlag::Copy => CtorFlags::COPY_CTOR,
            CtorFlag::Move => CtorFlags::MOVE_CTOR,
        }
    })
}

impl From<AccessDump> for Access {
    fn from(access: AccessDump) -> Self {
        match access {
            AccessDump::Public => Access::Public,
            AccessDump::Protected => Access::Protected,
            AccessDump::Private => Access::Private,
        }
    }
}

/// Maps dump numbering onto builder ids.
struct Loader {
    b: UnitBuilder,
    decls: Vec<DeclId>,
    types: Vec<QualType>,
    exprs: Vec<ExprId>,
}

impl Loader {
    fn new(b: UnitBuilder) -> Self {
        Loader {
            b,
            decls: Vec::new(),
            types: Vec::new(),
            exprs: Vec::new(),
        }
    }

    fn decl(&self, index: u32) -> Result<DeclId, NodeError> {
        lookup(&self.decls, index, "declaration")
    }

    fn context(&self, index: Option<u32>) -> Result<Option<DeclId>, NodeError> {
        index.map(|index| self.decl(index)).transpose()
    }

    fn ty(&self, index: u32) -> Result<QualType, NodeError> {
        lookup(&self.types, index, "type")
    }

    fn types(&self, indices: &[u32]) -> Result<Vec<QualType>, NodeError> {
        indices.iter().map(|&index| self.ty(index)).collect()
    }

    fn expr(&self, index: u32) -> Result<ExprId, NodeError> {
        lookup(&self.exprs, index, "expression")
    }

    fn node(&mut self, node: &Node) -> Result<(), NodeError> {
        match node {
            Node::Namespace { name, context } => {
                let context = self.context(*context)?;
                let id = self.b.namespace(name, context);
                self.decls.push(id);
            }
            Node::ClassTemplate {
                name,
                context,
                span: s,
            } => {
                let context = self.context(*context)?;
                let id = self.b.class_template(name, context, span(*s));
                self.decls.push(id);
            }
            Node::Record {
                name,
                context,
                span: s,
                flags,
            } => {
                let context = self.context(*context)?;
                let id = self.b.record(name, context, span(*s));
                if !flags.is_empty() {
                    self.b.set_record_flags(id, record_flags(flags));
                }
                self.decls.push(id);
            }
            Node::Specialization {
                template,
                args,
                explicit,
                span: s,
                flags,
            } => {
                let template = self.decl(*template)?;
                let args = self.types(args)?;
                let id = self.b.specialization(template, &args, *explicit, span(*s));
                if !flags.is_empty() {
                    self.b.set_record_flags(id, record_flags(flags));
                }
                self.decls.push(id);
            }
            Node::Typedef {
                name,
                context,
                underlying,
                span: s,
            } => {
                let context = self.context(*context)?;
                let underlying = self.ty(*underlying)?;
                let id = self.b.typedef(name, context, underlying, span(*s));
                self.decls.push(id);
            }
            Node::Field {
                record,
                name,
                ty,
                span: s,
            } => {
                let record = self.decl(*record)?;
                let ty = self.ty(*ty)?;
                let id = self.b.field(record, name, ty, span(*s));
                self.decls.push(id);
            }
            Node::Constructor {
                record,
                access,
                flags,
                span: s,
            } => {
                let record = self.decl(*record)?;
                let id = self
                    .b
                    .constructor(record, (*access).into(), ctor_flags(flags), span(*s));
                self.decls.push(id);
            }
            Node::Redeclaration {
                canonical,
                flags,
                span: s,
            } => {
                let canonical = self.decl(*canonical)?;
                let id = self
                    .b
                    .redeclare_constructor(canonical, ctor_flags(flags), span(*s));
                self.decls.push(id);
            }
            Node::Param {
                ctor,
                name,
                ty,
                written_ty,
                span: s,
            } => {
                let ctor = self.decl(*ctor)?;
                let ty = self.ty(*ty)?;
                let written = match written_ty {
                    Some(index) => self.ty(*index)?,
                    None => ty,
                };
                let id = self.b.param_as_written(ctor, name, ty, written, span(*s));
                self.decls.push(id);
            }
            Node::Conversion {
                record,
                target,
                span: s,
            } => {
                let record = self.decl(*record)?;
                let target = self.ty(*target)?;
                let id = self.b.conversion(record, target, span(*s));
                self.decls.push(id);
            }

            Node::Builtin { name } => {
                let ty = self.b.builtin(name);
                self.types.push(ty);
            }
            Node::RecordType { decl } => {
                let decl = self.decl(*decl)?;
                let ty = self.b.record_type(decl);
                self.types.push(ty);
            }
            Node::TypedefType { decl } => {
                let decl = self.decl(*decl)?;
                let ty = self.b.typedef_type(decl);
                self.types.push(ty);
            }
            Node::Pointer { to } => {
                let to = self.ty(*to)?;
                let ty = self.b.pointer_to(to);
                self.types.push(ty);
            }
            Node::LvalueRef { to } => {
                let to = self.ty(*to)?;
                let ty = self.b.lvalue_ref_to(to);
                self.types.push(ty);
            }
            Node::RvalueRef { to } => {
                let to = self.ty(*to)?;
                let ty = self.b.rvalue_ref_to(to);
                self.types.push(ty);
            }
            Node::Const { of } => {
                let ty = self.ty(*of)?.with_const(true);
                self.types.push(ty);
            }
            Node::Elaborated { named } => {
                let named = self.ty(*named)?;
                let ty = self.b.elaborated(named);
                self.types.push(ty);
            }
            Node::Substituted { replacement } => {
                let replacement = self.ty(*replacement)?;
                let ty = self.b.substituted(replacement);
                self.types.push(ty);
            }
            Node::TemplateType {
                template,
                args,
                aliased,
            } => {
                let template = self.decl(*template)?;
                let args = self.types(args)?;
                let aliased = aliased.map(|index| self.ty(index)).transpose()?;
                let ty = self.b.template_specialization(template, &args, aliased);
                self.types.push(ty);
            }

            Node::Construct {
                ctor,
                args,
                ty,
                span: s,
            } => {
                let ctor = self.decl(*ctor)?;
                let args = args
                    .iter()
                    .map(|&index| self.expr(index))
                    .collect::<Result<Vec<_>, _>>()?;
                let ty = self.ty(*ty)?;
                let id = self.b.construct(ctor, &args, ty, span(*s));
                self.exprs.push(id);
            }
            Node::Materialize { sub, ty, span: s } => {
                let kind = ExprKind::MaterializeTemporary(self.expr(*sub)?);
                self.push_expr(kind, *ty, *s)?;
            }
            Node::Bind { sub, ty, span: s } => {
                let kind = ExprKind::BindTemporary(self.expr(*sub)?);
                self.push_expr(kind, *ty, *s)?;
            }
            Node::Cast { sub, ty } => {
                let sub = self.expr(*sub)?;
                let ty = self.ty(*ty)?;
                let id = self.b.implicit_cast(sub, ty);
                self.exprs.push(id);
            }
            Node::DefaultArgument { param, span: s } => {
                let param = self.decl(*param)?;
                let id = self.b.default_arg(param, span(*s));
                self.exprs.push(id);
            }
            Node::DeclRef { decl, ty, span: s } => {
                let kind = ExprKind::DeclRef(self.decl(*decl)?);
                self.push_expr(kind, *ty, *s)?;
            }
            Node::Integer { value, ty, span: s } => {
                self.push_expr(ExprKind::IntegerLiteral(*value), *ty, *s)?;
            }
            Node::Null { ty, span: s } => self.push_expr(ExprKind::NullPointer, *ty, *s)?,
            Node::Opaque { ty, span: s } => self.push_expr(ExprKind::Opaque, *ty, *s)?,

            Node::Base { record, ty } => {
                let record = self.decl(*record)?;
                let ty = self.ty(*ty)?;
                self.b.add_base(record, ty);
            }
            Node::DefaultArg { param, expr } => {
                let param = self.decl(*param)?;
                let expr = self.expr(*expr)?;
                self.b.set_default_arg(param, expr);
            }
            Node::Initializer {
                ctor,
                base,
                member,
                init,
                written,
                span: s,
            } => {
                let target = match (base, member) {
                    (Some(base), None) => InitTarget::Base(self.ty(*base)?),
                    (None, Some(member)) => InitTarget::Member(self.decl(*member)?),
                    _ => return Err(NodeError::InitializerTarget),
                };
                let ctor = self.decl(*ctor)?;
                let init = self.expr(*init)?;
                self.b.add_initializer(
                    ctor,
                    Initializer {
                        target,
                        init,
                        is_written: *written,
                        span: span(*s),
                    },
                );
            }
            Node::Statement { expr } => {
                let expr = self.expr(*expr)?;
                self.b.statement(expr);
            }
        }
        Ok(())
    }

    fn push_expr(&mut self, kind: ExprKind, ty: u32, s: SpanDump) -> Result<(), NodeError> {
        let ty = self.ty(ty)?;
        let id = self.b.expr(kind, ty, span(s));
        self.exprs.push(id);
        Ok(())
    }
}

fn lookup<T: Copy>(table: &[T], index: u32, family: &'static str) -> Result<T, NodeError> {
    table
        .get(index as usize)
        .copied()
        .ok_or(NodeError::Undefined { family, index })
}

#[cfg(test)]
mod tests;
