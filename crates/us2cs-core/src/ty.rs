//! Resolved types and the program-wide type table.
//!
//! The table is built by the front end and shared read-only with every pass. Expression
//! nodes reference nominal types through [`TypeId`] handles into it.

use itertools::Itertools;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct TypeId(pub u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TypePrimitive {
    Bool,
    Char,
    Byte,
    Int,
    Long,
    Float,
    Double,
    String,
    Object,
}

impl TypePrimitive {
    /// C# keyword for the primitive.
    pub fn keyword(self) -> &'static str {
        match self {
            TypePrimitive::Bool => "bool",
            TypePrimitive::Char => "char",
            TypePrimitive::Byte => "byte",
            TypePrimitive::Int => "int",
            TypePrimitive::Long => "long",
            TypePrimitive::Float => "float",
            TypePrimitive::Double => "double",
            TypePrimitive::String => "string",
            TypePrimitive::Object => "object",
        }
    }

    /// Position in the implicit numeric conversion ranking.
    pub fn numeric_rank(self) -> Option<u8> {
        match self {
            TypePrimitive::Byte | TypePrimitive::Char => Some(1),
            TypePrimitive::Int => Some(2),
            TypePrimitive::Long => Some(3),
            TypePrimitive::Float => Some(4),
            TypePrimitive::Double => Some(5),
            _ => None,
        }
    }

    pub fn is_integral(self) -> bool {
        matches!(
            self,
            TypePrimitive::Byte | TypePrimitive::Char | TypePrimitive::Int | TypePrimitive::Long
        )
    }
}

common_struct! {
    pub struct TypeDelegate {
        pub params: Vec<Ty>,
        pub ret: Box<Ty>,
    }
}

common_enum! {
    /// A resolved static type.
    pub enum Ty {
        Void,
        Null,
        Primitive(TypePrimitive),
        Named(TypeId),
        Array(Box<Ty>),
        Generic(TypeId, Vec<Ty>),
        Delegate(TypeDelegate),
    }
}

impl Ty {
    pub fn bool() -> Ty {
        Ty::Primitive(TypePrimitive::Bool)
    }
    pub fn char() -> Ty {
        Ty::Primitive(TypePrimitive::Char)
    }
    pub fn int() -> Ty {
        Ty::Primitive(TypePrimitive::Int)
    }
    pub fn long() -> Ty {
        Ty::Primitive(TypePrimitive::Long)
    }
    pub fn float() -> Ty {
        Ty::Primitive(TypePrimitive::Float)
    }
    pub fn double() -> Ty {
        Ty::Primitive(TypePrimitive::Double)
    }
    pub fn string() -> Ty {
        Ty::Primitive(TypePrimitive::String)
    }
    pub fn object() -> Ty {
        Ty::Primitive(TypePrimitive::Object)
    }
    pub fn array(elem: Ty) -> Ty {
        Ty::Array(Box::new(elem))
    }
    pub fn delegate(params: Vec<Ty>, ret: Ty) -> Ty {
        Ty::Delegate(TypeDelegate {
            params,
            ret: Box::new(ret),
        })
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Ty::Void)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Ty::Primitive(TypePrimitive::Object))
    }

    pub fn as_primitive(&self) -> Option<TypePrimitive> {
        match self {
            Ty::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.as_primitive()
            .and_then(TypePrimitive::numeric_rank)
            .is_some()
    }

    pub fn is_integral(&self) -> bool {
        self.as_primitive().map_or(false, TypePrimitive::is_integral)
    }

    /// Nominal type handle, ignoring generic arguments.
    pub fn type_id(&self) -> Option<TypeId> {
        match self {
            Ty::Named(id) | Ty::Generic(id, _) => Some(*id),
            _ => None,
        }
    }

    pub fn as_delegate(&self) -> Option<&TypeDelegate> {
        match self {
            Ty::Delegate(delegate) => Some(delegate),
            _ => None,
        }
    }

    pub fn element_type(&self) -> Option<&Ty> {
        match self {
            Ty::Array(elem) => Some(elem),
            _ => None,
        }
    }

    /// True when the type mentions a delegate shape anywhere.
    pub fn mentions_delegate(&self) -> bool {
        match self {
            Ty::Delegate(_) => true,
            Ty::Array(elem) => elem.mentions_delegate(),
            Ty::Generic(_, args) => args.iter().any(Ty::mentions_delegate),
            _ => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ParamModifier {
    None,
    Out,
    Ref,
    Params,
}

impl Default for ParamModifier {
    fn default() -> Self {
        ParamModifier::None
    }
}

impl ParamModifier {
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ParamModifier::None => None,
            ParamModifier::Out => Some("out"),
            ParamModifier::Ref => Some("ref"),
            ParamModifier::Params => Some("params"),
        }
    }
}

common_struct! {
    pub struct Param {
        pub name: String,
        pub ty: Ty,
        #[serde(default)]
        pub modifier: ParamModifier,
    }
}

impl Param {
    pub fn new(name: impl Into<String>, ty: Ty) -> Self {
        Self {
            name: name.into(),
            ty,
            modifier: ParamModifier::None,
        }
    }

    pub fn with_modifier(mut self, modifier: ParamModifier) -> Self {
        self.modifier = modifier;
        self
    }
}

common_struct! {
    /// Bound overload of a method or constructor.
    pub struct Signature {
        pub params: Vec<Param>,
        pub ret: Ty,
    }
}

impl Signature {
    pub fn new(params: Vec<Param>, ret: Ty) -> Self {
        Self { params, ret }
    }

    /// Required type for the argument at `index`, following a trailing `params` array.
    pub fn param_type_at(&self, index: usize) -> Option<&Ty> {
        match self.params.get(index) {
            Some(param) => Some(&param.ty),
            None => self
                .params
                .last()
                .filter(|param| param.modifier == ParamModifier::Params)
                .and_then(|param| param.ty.element_type()),
        }
    }

    pub fn params_index(&self) -> Option<usize> {
        self.params
            .iter()
            .position(|param| param.modifier == ParamModifier::Params)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Struct,
    Interface,
    Enum,
}

common_struct! {
    pub struct TypeInfo {
        pub name: String,
        #[serde(default)]
        pub namespace: Option<String>,
        pub kind: TypeKind,
        #[serde(default)]
        pub base: Option<Ty>,
        #[serde(default)]
        pub interfaces: Vec<Ty>,
        #[serde(default)]
        pub constructors: Vec<Signature>,
    }
}

impl TypeInfo {
    pub fn new(namespace: Option<&str>, name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.map(str::to_string),
            kind,
            base: None,
            interfaces: Vec::new(),
            constructors: Vec::new(),
        }
    }

    pub fn class(namespace: Option<&str>, name: impl Into<String>) -> Self {
        Self::new(namespace, name, TypeKind::Class)
    }

    pub fn with_base(mut self, base: Ty) -> Self {
        self.base = Some(base);
        self
    }

    pub fn with_constructor(mut self, signature: Signature) -> Self {
        self.constructors.push(signature);
        self
    }

    pub fn full_name(&self) -> String {
        match &self.namespace {
            Some(namespace) => format!("{}.{}", namespace, self.name),
            None => self.name.clone(),
        }
    }
}

/// Handles of the types the rewrite rules refer to by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WellKnownTypes {
    pub system_type: TypeId,
    pub system_enum: TypeId,
    pub hashtable: TypeId,
    pub unity_object: TypeId,
    pub component: TypeId,
    pub game_object: TypeId,
    pub mono_behaviour: TypeId,
    pub serializable: TypeId,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct TypeTableData {
    types: Vec<TypeInfo>,
}

/// Program-wide nominal type table.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(from = "TypeTableData", into = "TypeTableData")]
pub struct TypeTable {
    types: Vec<TypeInfo>,
    by_full_name: HashMap<String, TypeId>,
    by_simple_name: HashMap<String, TypeId>,
    well_known: WellKnownTypes,
}

impl From<TypeTableData> for TypeTable {
    fn from(data: TypeTableData) -> Self {
        TypeTable::from_types(data.types)
    }
}

impl From<TypeTable> for TypeTableData {
    fn from(table: TypeTable) -> Self {
        TypeTableData { types: table.types }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        TypeTable::new()
    }
}

impl TypeTable {
    /// Table holding only the well-known runtime types.
    pub fn new() -> Self {
        TypeTable::from_types(Vec::new())
    }

    /// Builds a table from `types`, keeping their ids, then appends missing well-known types.
    pub fn from_types(types: Vec<TypeInfo>) -> Self {
        let placeholder = TypeId(0);
        let mut table = TypeTable {
            types: Vec::new(),
            by_full_name: HashMap::new(),
            by_simple_name: HashMap::new(),
            well_known: WellKnownTypes {
                system_type: placeholder,
                system_enum: placeholder,
                hashtable: placeholder,
                unity_object: placeholder,
                component: placeholder,
                game_object: placeholder,
                mono_behaviour: placeholder,
                serializable: placeholder,
            },
        };
        for info in types {
            table.push(info);
        }

        let unity_object = table.ensure(TypeInfo::class(Some("UnityEngine"), "Object"));
        let component = table.ensure(
            TypeInfo::class(Some("UnityEngine"), "Component").with_base(Ty::Named(unity_object)),
        );
        let behaviour = table.ensure(
            TypeInfo::class(Some("UnityEngine"), "Behaviour").with_base(Ty::Named(component)),
        );
        table.well_known = WellKnownTypes {
            system_type: table.ensure(TypeInfo::class(Some("System"), "Type")),
            system_enum: table.ensure(TypeInfo::class(Some("System"), "Enum")),
            hashtable: table.ensure(
                TypeInfo::class(Some("System.Collections"), "Hashtable")
                    .with_constructor(Signature::new(Vec::new(), Ty::Void)),
            ),
            unity_object,
            component,
            game_object: table.ensure(
                TypeInfo::class(Some("UnityEngine"), "GameObject").with_base(Ty::Named(unity_object)),
            ),
            mono_behaviour: table.ensure(
                TypeInfo::class(Some("UnityEngine"), "MonoBehaviour")
                    .with_base(Ty::Named(behaviour)),
            ),
            serializable: table.ensure(TypeInfo::class(Some("System"), "SerializableAttribute")),
        };
        table
    }

    fn push(&mut self, info: TypeInfo) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.by_full_name.insert(info.full_name(), id);
        self.by_simple_name.entry(info.name.clone()).or_insert(id);
        self.types.push(info);
        id
    }

    fn ensure(&mut self, info: TypeInfo) -> TypeId {
        match self.by_full_name.get(&info.full_name()) {
            Some(id) => *id,
            None => self.push(info),
        }
    }

    /// Registers `info`, replacing a previous declaration with the same full name.
    pub fn declare(&mut self, info: TypeInfo) -> TypeId {
        match self.by_full_name.get(&info.full_name()).copied() {
            Some(id) => {
                self.types[id.index()] = info;
                id
            }
            None => self.push(info),
        }
    }

    pub fn well_known(&self) -> &WellKnownTypes {
        &self.well_known
    }

    pub fn get(&self, id: TypeId) -> Option<&TypeInfo> {
        self.types.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Looks a type up by full name first, then by simple name.
    pub fn lookup(&self, name: &str) -> Option<TypeId> {
        self.by_full_name
            .get(name)
            .or_else(|| self.by_simple_name.get(name))
            .copied()
    }

    pub fn kind_of(&self, ty: &Ty) -> Option<TypeKind> {
        ty.type_id().and_then(|id| self.get(id)).map(|info| info.kind)
    }

    pub fn is_enum(&self, ty: &Ty) -> bool {
        self.kind_of(ty) == Some(TypeKind::Enum)
    }

    /// Copy-semantics types: non-reference primitives, structs and enums.
    pub fn is_value_type(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Primitive(TypePrimitive::String | TypePrimitive::Object) => false,
            Ty::Primitive(_) => true,
            Ty::Named(_) | Ty::Generic(_, _) => {
                matches!(self.kind_of(ty), Some(TypeKind::Struct | TypeKind::Enum))
            }
            _ => false,
        }
    }

    pub fn is_reference_type(&self, ty: &Ty) -> bool {
        match ty {
            Ty::Void => false,
            Ty::Null | Ty::Array(_) | Ty::Delegate(_) => true,
            Ty::Primitive(p) => matches!(p, TypePrimitive::String | TypePrimitive::Object),
            Ty::Named(_) | Ty::Generic(_, _) => {
                matches!(self.kind_of(ty), Some(TypeKind::Class | TypeKind::Interface))
            }
        }
    }

    /// Walks the base chain and interface lists of `from` looking for `to`.
    pub fn is_subtype(&self, from: TypeId, to: TypeId) -> bool {
        let mut pending = vec![from];
        let mut visited = Vec::new();
        while let Some(id) = pending.pop() {
            if id == to {
                return true;
            }
            if visited.contains(&id) {
                continue;
            }
            visited.push(id);
            if let Some(info) = self.get(id) {
                pending.extend(info.base.iter().filter_map(Ty::type_id));
                pending.extend(info.interfaces.iter().filter_map(Ty::type_id));
            }
        }
        false
    }

    /// Whether C# accepts `from` where `to` is required without an explicit cast.
    pub fn is_implicitly_convertible(&self, from: &Ty, to: &Ty) -> bool {
        if from == to {
            return true;
        }
        match (from, to) {
            (Ty::Void, _) | (_, Ty::Void) => false,
            (_, Ty::Primitive(TypePrimitive::Object)) => true,
            (Ty::Null, _) => self.is_reference_type(to),
            (Ty::Primitive(f), Ty::Primitive(t)) => match (f.numeric_rank(), t.numeric_rank()) {
                // char widens to int and beyond but nothing widens to char
                (Some(fr), Some(tr)) => fr < tr && *t != TypePrimitive::Char,
                _ => false,
            },
            (Ty::Named(f), Ty::Named(t)) => {
                if *t == self.well_known.system_enum && self.is_enum(from) {
                    return true;
                }
                self.kind_of(from) != Some(TypeKind::Enum) && self.is_subtype(*f, *t)
            }
            (Ty::Generic(f, _), Ty::Named(t)) => self.is_subtype(*f, *t),
            (Ty::Array(f), Ty::Array(t)) => {
                self.is_reference_type(f) && self.is_implicitly_convertible(f, t)
            }
            _ => false,
        }
    }

    /// Whether an explicit cast from `from` to `to` is legal in C#.
    pub fn is_explicitly_convertible(&self, from: &Ty, to: &Ty) -> bool {
        if self.is_implicitly_convertible(from, to) {
            return true;
        }
        let numeric_or_enum = |ty: &Ty| ty.is_numeric() || self.is_enum(ty);
        if numeric_or_enum(from) && numeric_or_enum(to) {
            return true;
        }
        if from.is_object() {
            return true;
        }
        match (from.type_id(), to.type_id()) {
            (Some(f), Some(t)) => self.is_subtype(t, f) || self.kind_of(to) == Some(TypeKind::Interface),
            _ => false,
        }
    }

    /// Resolves the constructor of `id` matching `args`.
    ///
    /// Overloads accepting every argument implicitly win over those that need explicit casts.
    pub fn find_constructor(&self, id: TypeId, args: &[Ty]) -> Option<&Signature> {
        let info = self.get(id)?;
        let arity_matches = |signature: &&Signature| signature.params.len() == args.len();
        info.constructors
            .iter()
            .filter(arity_matches)
            .find(|signature| {
                signature
                    .params
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| self.is_implicitly_convertible(arg, &param.ty))
            })
            .or_else(|| {
                info.constructors.iter().filter(arity_matches).find(|signature| {
                    signature
                        .params
                        .iter()
                        .zip(args)
                        .all(|(param, arg)| self.is_explicitly_convertible(arg, &param.ty))
                })
            })
    }

    /// Fully qualified C# spelling of `ty`.
    pub fn display(&self, ty: &Ty) -> String {
        match ty {
            Ty::Void => "void".to_string(),
            Ty::Null => "null".to_string(),
            Ty::Primitive(p) => p.keyword().to_string(),
            Ty::Named(id) => self
                .get(*id)
                .map(TypeInfo::full_name)
                .unwrap_or_else(|| format!("<type {}>", id.0)),
            Ty::Array(elem) => format!("{}[]", self.display(elem)),
            Ty::Generic(id, args) => format!(
                "{}<{}>",
                self.display(&Ty::Named(*id)),
                args.iter().map(|arg| self.display(arg)).join(", ")
            ),
            Ty::Delegate(delegate) => {
                let mut params = delegate.params.iter().map(|p| self.display(p));
                if delegate.ret.is_void() {
                    format!("Action<{}>", params.join(", "))
                } else {
                    format!(
                        "Func<{}>",
                        params.chain(std::iter::once(self.display(&delegate.ret))).join(", ")
                    )
                }
            }
        }
    }
}

impl Display for TypePrimitive {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}
