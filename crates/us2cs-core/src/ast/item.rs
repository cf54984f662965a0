use crate::ast::{Block, Expr, Ident};
use crate::span::Span;
use crate::ty::{Param, ParamModifier, Signature, Ty, TypeId, TypeKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Visibility {
    Public,
    Protected,
    Internal,
    Private,
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Public
    }
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Internal => "internal",
            Visibility::Private => "private",
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(default)]
pub struct Modifiers {
    pub visibility: Visibility,
    pub is_static: bool,
    pub is_abstract: bool,
    pub is_override: bool,
    pub is_final: bool,
}

impl Modifiers {
    pub fn private() -> Self {
        Self {
            visibility: Visibility::Private,
            ..Default::default()
        }
    }

    pub fn statik() -> Self {
        Self {
            is_static: true,
            ..Default::default()
        }
    }
}

common_struct! {
    pub struct AttributeArg {
        /// Named property assignment (`Prop = value`), `None` when positional.
        #[serde(default)]
        pub name: Option<Ident>,
        pub value: Expr,
    }
}

common_struct! {
    pub struct Attribute {
        pub ty: Ty,
        #[serde(default)]
        pub args: Vec<AttributeArg>,
        #[serde(default)]
        pub span: Span,
    }
}

common_struct! {
    pub struct ParamDecl {
        pub name: Ident,
        pub ty: Ty,
        #[serde(default)]
        pub modifier: ParamModifier,
    }
}

impl ParamDecl {
    pub fn new(name: impl Into<Ident>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            modifier: ParamModifier::None,
        }
    }

    pub fn to_param(&self) -> Param {
        Param::new(self.name.name.clone(), self.ty.clone()).with_modifier(self.modifier)
    }
}

common_struct! {
    pub struct FieldDecl {
        pub name: Ident,
        pub ty: Ty,
        #[serde(default)]
        pub init: Option<Expr>,
        #[serde(default)]
        pub modifiers: Modifiers,
        #[serde(default)]
        pub attrs: Vec<Attribute>,
        #[serde(default)]
        pub span: Span,
    }
}

impl FieldDecl {
    pub fn new(name: impl Into<Ident>, ty: Ty, init: Option<Expr>) -> Self {
        Self {
            name: name.into(),
            ty,
            init,
            modifiers: Modifiers::default(),
            attrs: Vec::new(),
            span: Span::null(),
        }
    }
}

common_struct! {
    pub struct MethodDecl {
        pub name: Ident,
        #[serde(default)]
        pub params: Vec<ParamDecl>,
        pub ret: Ty,
        /// `None` for interface and abstract members.
        #[serde(default)]
        pub body: Option<Block>,
        #[serde(default)]
        pub modifiers: Modifiers,
        #[serde(default)]
        pub attrs: Vec<Attribute>,
        #[serde(default)]
        pub span: Span,
    }
}

impl MethodDecl {
    pub fn new(name: impl Into<Ident>, params: Vec<ParamDecl>, ret: Ty, body: Block) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            body: Some(body),
            modifiers: Modifiers::default(),
            attrs: Vec::new(),
            span: Span::null(),
        }
    }

    pub fn signature(&self) -> Signature {
        Signature::new(
            self.params.iter().map(ParamDecl::to_param).collect(),
            self.ret.clone(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum CtorChainKind {
    This,
    Base,
}

common_struct! {
    /// `: this(...)` or `: base(...)` initializer of a constructor.
    pub struct CtorChain {
        pub kind: CtorChainKind,
        pub args: Vec<Expr>,
        #[serde(default)]
        pub signature: Option<Signature>,
    }
}

common_struct! {
    pub struct CtorDecl {
        #[serde(default)]
        pub params: Vec<ParamDecl>,
        #[serde(default)]
        pub chain: Option<CtorChain>,
        pub body: Block,
        #[serde(default)]
        pub modifiers: Modifiers,
        #[serde(default)]
        pub span: Span,
    }
}

impl CtorDecl {
    pub fn new(params: Vec<ParamDecl>, body: Block) -> Self {
        Self {
            params,
            chain: None,
            body,
            modifiers: Modifiers::default(),
            span: Span::null(),
        }
    }

    pub fn delegates_to_this(&self) -> bool {
        matches!(&self.chain, Some(chain) if chain.kind == CtorChainKind::This)
    }
}

common_enum! {
    #[derive(derive_more::From)]
    pub enum MemberDecl {
        Field(FieldDecl),
        Method(MethodDecl),
        Ctor(CtorDecl),
    }
}

common_struct! {
    pub struct EnumMember {
        pub name: Ident,
        #[serde(default)]
        pub value: Option<i64>,
    }
}

common_struct! {
    pub struct TypeDecl {
        pub id: TypeId,
        pub name: Ident,
        pub kind: TypeKind,
        #[serde(default)]
        pub modifiers: Modifiers,
        #[serde(default)]
        pub attrs: Vec<Attribute>,
        #[serde(default)]
        pub base: Option<Ty>,
        #[serde(default)]
        pub interfaces: Vec<Ty>,
        #[serde(default)]
        pub members: Vec<MemberDecl>,
        #[serde(default)]
        pub enum_members: Vec<EnumMember>,
        /// The implicit class holding a script file's top level code.
        #[serde(default)]
        pub is_script: bool,
        #[serde(default)]
        pub span: Span,
    }
}

impl TypeDecl {
    pub fn new(id: TypeId, name: impl Into<Ident>, kind: TypeKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
            modifiers: Modifiers::default(),
            attrs: Vec::new(),
            base: None,
            interfaces: Vec::new(),
            members: Vec::new(),
            enum_members: Vec::new(),
            is_script: false,
            span: Span::null(),
        }
    }

    pub fn with_member(mut self, member: impl Into<MemberDecl>) -> Self {
        self.members.push(member.into());
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn ctors(&self) -> impl Iterator<Item = &CtorDecl> {
        self.members.iter().filter_map(|member| match member {
            MemberDecl::Ctor(ctor) => Some(ctor),
            _ => None,
        })
    }

    pub fn self_ty(&self) -> Ty {
        Ty::Named(self.id)
    }
}
