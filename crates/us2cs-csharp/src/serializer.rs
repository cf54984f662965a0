//! C# source serializer for rewritten trees.

use crate::precedence::Precedence;
use crate::printer::{render_literal, CSharpPrinterConfig, TypeNames};
use itertools::Itertools;
use tracing::debug;
use us2cs_core::ast::*;
use us2cs_core::error::{Error, Result};
use us2cs_core::span::Span;
use us2cs_core::ty::{ParamModifier, Signature, Ty, TypeKind, TypeTable};
use us2cs_core::UnitSerializer;

/// Public entry point used by the batch converter.
#[derive(Clone, Debug, Default)]
pub struct CSharpSerializer {
    config: CSharpPrinterConfig,
}

impl CSharpSerializer {
    pub fn new(config: CSharpPrinterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CSharpPrinterConfig {
        &self.config
    }

    /// `using` directives of `unit`: explicit imports, then implicit ones, then the baseline.
    pub fn imports(&self, unit: &SourceUnit) -> Vec<String> {
        unit.imports
            .iter()
            .chain(&unit.implicit_imports)
            .chain(&self.config.baseline_imports)
            .unique()
            .cloned()
            .collect()
    }
}

impl UnitSerializer for CSharpSerializer {
    fn extension(&self) -> &str {
        &self.config.extension
    }

    fn serialize_unit(&self, unit: &SourceUnit, types: &TypeTable) -> Result<String> {
        if !unit.globals.is_empty() {
            return Err(Error::unsupported(
                format!("top level statements left in `{}`", unit.file_name),
                Span::null(),
            ));
        }
        let imports = self.imports(unit);
        let mut emitter = CSharpEmitter::new(&self.config, TypeNames::new(types, &imports));
        emitter.emit_unit(unit, &imports)?;
        debug!(file = %unit.file_name, decls = unit.decls.len(), "emitted C# unit");
        Ok(emitter.finish())
    }
}

struct CSharpEmitter<'a> {
    code: String,
    indent: usize,
    config: &'a CSharpPrinterConfig,
    names: TypeNames<'a>,
}

impl<'a> CSharpEmitter<'a> {
    fn new(config: &'a CSharpPrinterConfig, names: TypeNames<'a>) -> Self {
        Self {
            code: String::new(),
            indent: 0,
            config,
            names,
        }
    }

    fn finish(mut self) -> String {
        if !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.trim_end().to_string()
    }

    fn emit_unit(&mut self, unit: &SourceUnit, imports: &[String]) -> Result<()> {
        for import in imports {
            self.push_line(&format!("using {};", import));
        }
        for decl in &unit.decls {
            self.push_blank_line();
            self.emit_type_decl(decl)?;
        }
        Ok(())
    }

    fn emit_attributes(&mut self, attrs: &[Attribute]) -> Result<()> {
        for attr in attrs {
            let name = self.names.attribute(&attr.ty)?;
            if attr.args.is_empty() {
                self.push_line(&format!("[{}]", name));
                continue;
            }
            let args = attr
                .args
                .iter()
                .map(|arg| {
                    let value = self.render_expr(&arg.value, Precedence::Assignment)?;
                    Ok(match &arg.name {
                        Some(name) => format!("{} = {}", name.render(), value),
                        None => value,
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            self.push_line(&format!("[{}({})]", name, args.join(", ")));
        }
        Ok(())
    }

    fn emit_type_decl(&mut self, decl: &TypeDecl) -> Result<()> {
        self.emit_attributes(&decl.attrs)?;
        let name = decl.name.render();
        let mut header = vec![decl.modifiers.visibility.keyword().to_string()];
        if decl.modifiers.is_static {
            header.push("static".to_string());
        }
        if decl.modifiers.is_abstract && decl.kind == TypeKind::Class {
            header.push("abstract".to_string());
        }
        if decl.modifiers.is_final && decl.kind == TypeKind::Class {
            header.push("sealed".to_string());
        }
        if decl.is_script {
            header.push("partial".to_string());
        }
        header.push(
            match decl.kind {
                TypeKind::Class => "class",
                TypeKind::Struct => "struct",
                TypeKind::Interface => "interface",
                TypeKind::Enum => "enum",
            }
            .to_string(),
        );
        header.push(name);

        let mut supertypes = Vec::new();
        match (&decl.base, decl.kind) {
            (Some(base), _) => supertypes.push(self.names.render(base)?),
            (None, TypeKind::Class) => supertypes.push("object".to_string()),
            _ => {}
        }
        for interface in &decl.interfaces {
            supertypes.push(self.names.render(interface)?);
        }
        let mut header = header.join(" ");
        if !supertypes.is_empty() {
            header = format!("{} : {}", header, supertypes.join(", "));
        }

        self.push_line(&header);
        self.push_line("{");
        self.indent += 1;
        if decl.kind == TypeKind::Enum {
            self.emit_enum_members(&decl.enum_members);
        } else {
            let mut previous: Option<&MemberDecl> = None;
            for member in &decl.members {
                let separate = match (previous, member) {
                    (None, _) => false,
                    (Some(MemberDecl::Field(_)), MemberDecl::Field(_)) => false,
                    _ => true,
                };
                if separate {
                    self.push_blank_line();
                }
                self.emit_member(decl, member)?;
                previous = Some(member);
            }
        }
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    fn emit_enum_members(&mut self, members: &[EnumMember]) {
        let mut next = 0;
        let count = members.len();
        for (index, member) in members.iter().enumerate() {
            let value = member.value.unwrap_or(next);
            next = value + 1;
            let comma = if index + 1 < count { "," } else { "" };
            self.push_line(&format!("{} = {}{}", member.name.render(), value, comma));
        }
    }

    fn emit_member(&mut self, decl: &TypeDecl, member: &MemberDecl) -> Result<()> {
        match member {
            MemberDecl::Field(field) => self.emit_field(decl, field),
            MemberDecl::Method(method) => self.emit_method(decl, method),
            MemberDecl::Ctor(ctor) => self.emit_ctor(decl, ctor),
        }
    }

    fn emit_field(&mut self, decl: &TypeDecl, field: &FieldDecl) -> Result<()> {
        self.emit_attributes(&field.attrs)?;
        let mut line = String::new();
        if decl.kind != TypeKind::Interface {
            line.push_str(field.modifiers.visibility.keyword());
            line.push(' ');
        }
        if field.modifiers.is_static {
            line.push_str("static ");
        }
        line.push_str(&format!("{} {}", self.names.render(&field.ty)?, field.name.render()));
        if let Some(init) = &field.init {
            line.push_str(&format!(" = {}", self.render_expr(init, Precedence::Assignment)?));
        }
        line.push(';');
        self.push_line(&line);
        Ok(())
    }

    fn method_modifiers(&self, decl: &TypeDecl, modifiers: &Modifiers) -> Vec<&'static str> {
        if decl.kind == TypeKind::Interface {
            return Vec::new();
        }
        let mut words = vec![modifiers.visibility.keyword()];
        if modifiers.is_static {
            words.push("static");
        } else if modifiers.is_abstract {
            words.push("abstract");
        } else if modifiers.is_override {
            words.push("override");
        } else if decl.kind == TypeKind::Class
            && !modifiers.is_final
            && modifiers.visibility != Visibility::Private
        {
            words.push("virtual");
        }
        words
    }

    fn render_params(&self, params: &[ParamDecl]) -> Result<String> {
        Ok(params
            .iter()
            .map(|param| {
                let ty = self.names.render(&param.ty)?;
                Ok(match param.modifier.keyword() {
                    Some(keyword) => format!("{} {} {}", keyword, ty, param.name.render()),
                    None => format!("{} {}", ty, param.name.render()),
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn emit_method(&mut self, decl: &TypeDecl, method: &MethodDecl) -> Result<()> {
        self.emit_attributes(&method.attrs)?;
        let mut words: Vec<String> = self
            .method_modifiers(decl, &method.modifiers)
            .into_iter()
            .map(str::to_string)
            .collect();
        words.push(self.names.render(&method.ret)?);
        let signature = format!(
            "{} {}({})",
            words.join(" "),
            method.name.render(),
            self.render_params(&method.params)?
        );
        match &method.body {
            Some(body) if decl.kind != TypeKind::Interface => {
                self.push_line(&signature);
                self.emit_block(body)
            }
            _ => {
                self.push_line(&format!("{};", signature));
                Ok(())
            }
        }
    }

    fn emit_ctor(&mut self, decl: &TypeDecl, ctor: &CtorDecl) -> Result<()> {
        let mut line = if ctor.modifiers.is_static {
            format!("static {}()", decl.name.render())
        } else {
            format!(
                "{} {}({})",
                ctor.modifiers.visibility.keyword(),
                decl.name.render(),
                self.render_params(&ctor.params)?
            )
        };
        if let Some(chain) = &ctor.chain {
            let keyword = match chain.kind {
                CtorChainKind::This => "this",
                CtorChainKind::Base => "base",
            };
            line = format!(
                "{} : {}({})",
                line,
                keyword,
                self.render_args(&chain.args, chain.signature.as_ref())?
            );
        }
        self.push_line(&line);
        self.emit_block(&ctor.body)
    }

    fn emit_block(&mut self, block: &Block) -> Result<()> {
        self.push_line("{");
        self.indent += 1;
        for stmt in &block.stmts {
            self.emit_stmt(stmt)?;
        }
        self.indent -= 1;
        self.push_line("}");
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Expr(expr) => {
                let line = format!("{};", self.render_expr(expr, Precedence::Assignment)?);
                self.push_line(&line);
            }
            Stmt::Var(var) => {
                let line = format!("{};", self.render_var(var)?);
                self.push_line(&line);
            }
            Stmt::If(stmt_if) => self.emit_if(stmt_if, "if")?,
            Stmt::While(stmt_while) => {
                let cond = self.render_expr(&stmt_while.cond, Precedence::Assignment)?;
                self.push_line(&format!("while ({})", cond));
                self.emit_block(&stmt_while.body)?;
            }
            Stmt::For(stmt_for) => {
                let init = stmt_for
                    .init
                    .iter()
                    .map(|stmt| self.render_inline_stmt(stmt))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ");
                let cond = match &stmt_for.cond {
                    Some(cond) => self.render_expr(cond, Precedence::Assignment)?,
                    None => String::new(),
                };
                let step = stmt_for
                    .step
                    .iter()
                    .map(|expr| self.render_expr(expr, Precedence::Assignment))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ");
                self.push_line(&format!("for ({}; {}; {})", init, cond, step));
                self.emit_block(&stmt_for.body)?;
            }
            Stmt::ForEach(stmt_foreach) => {
                let line = format!(
                    "foreach ({} {} in {})",
                    self.names.render(&stmt_foreach.var_ty)?,
                    stmt_foreach.var.render(),
                    self.render_expr(&stmt_foreach.iter, Precedence::Assignment)?
                );
                self.push_line(&line);
                self.emit_block(&stmt_foreach.body)?;
            }
            Stmt::Return(ret) => {
                let line = match &ret.value {
                    Some(value) => format!("return {};", self.render_expr(value, Precedence::Assignment)?),
                    None => "return;".to_string(),
                };
                self.push_line(&line);
            }
            Stmt::Throw(expr) => {
                let line = format!("throw {};", self.render_expr(expr, Precedence::Assignment)?);
                self.push_line(&line);
            }
            Stmt::Break => self.push_line("break;"),
            Stmt::Continue => self.push_line("continue;"),
            Stmt::Block(block) => self.emit_block(block)?,
        }
        Ok(())
    }

    fn emit_if(&mut self, stmt_if: &StmtIf, keyword: &str) -> Result<()> {
        let cond = self.render_expr(&stmt_if.cond, Precedence::Assignment)?;
        self.push_line(&format!("{} ({})", keyword, cond));
        self.emit_block(&stmt_if.then)?;
        match &stmt_if.otherwise {
            Some(otherwise) => match otherwise.stmts.as_slice() {
                [Stmt::If(nested)] => self.emit_if(nested, "else if"),
                _ => {
                    self.push_line("else");
                    self.emit_block(otherwise)
                }
            },
            None => Ok(()),
        }
    }

    fn render_var(&self, var: &StmtVar) -> Result<String> {
        let ty = self.names.render(var.declared.as_ref().unwrap_or(&var.ty))?;
        Ok(match &var.init {
            Some(init) => format!(
                "{} {} = {}",
                ty,
                var.name.render(),
                self.render_expr(init, Precedence::Assignment)?
            ),
            None => format!("{} {}", ty, var.name.render()),
        })
    }

    fn render_inline_stmt(&self, stmt: &Stmt) -> Result<String> {
        match stmt {
            Stmt::Var(var) => self.render_var(var),
            Stmt::Expr(expr) => self.render_expr(expr, Precedence::Assignment),
            other => Err(Error::unsupported(
                format!("statement {:?} in a for-loop initializer", other),
                Span::null(),
            )),
        }
    }

    fn render_args(&self, args: &[Expr], signature: Option<&Signature>) -> Result<String> {
        Ok(args
            .iter()
            .enumerate()
            .map(|(index, arg)| {
                let rendered = self.render_expr(arg, Precedence::Assignment)?;
                let modifier = signature
                    .and_then(|signature| signature.params.get(index))
                    .map(|param| param.modifier);
                Ok(match modifier {
                    Some(modifier @ (ParamModifier::Out | ParamModifier::Ref)) => {
                        format!("{} {}", modifier.keyword().unwrap_or_default(), rendered)
                    }
                    _ => rendered,
                })
            })
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    fn render_exprs(&self, exprs: &[Expr]) -> Result<String> {
        Ok(exprs
            .iter()
            .map(|expr| self.render_expr(expr, Precedence::Assignment))
            .collect::<Result<Vec<_>>>()?
            .join(", "))
    }

    /// Renders `expr`, parenthesized when it binds more loosely than `min`.
    fn render_expr(&self, expr: &Expr, min: Precedence) -> Result<String> {
        let expr = expr.strip_parens();
        let rendered = self.render_expr_inner(expr)?;
        if Precedence::of_expr(expr) < min {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }

    /// Operand of a prefix operator or cast; a leading sign would fuse with the operator.
    fn render_prefix_operand(&self, expr: &Expr) -> Result<String> {
        let rendered = self.render_expr(expr, Precedence::Unary)?;
        if rendered.starts_with('-') || rendered.starts_with('+') {
            Ok(format!("({})", rendered))
        } else {
            Ok(rendered)
        }
    }

    fn render_expr_inner(&self, expr: &Expr) -> Result<String> {
        Ok(match &expr.kind {
            ExprKind::Literal(literal) => render_literal(literal),
            ExprKind::Ident(ident) => ident.name.render(),
            ExprKind::SelfRef => "this".to_string(),
            ExprKind::SuperRef => "base".to_string(),
            ExprKind::TypeRef(ty) => self.names.render(ty)?,
            ExprKind::Member(member) => format!(
                "{}.{}",
                self.render_expr(&member.target, Precedence::Primary)?,
                member.name.render()
            ),
            ExprKind::Invoke(invoke) => {
                let target = self.render_expr(&invoke.target, Precedence::Primary)?;
                let generics = if invoke.generic_args.is_empty() {
                    String::new()
                } else {
                    format!("<{}>", self.names.render_list(&invoke.generic_args)?)
                };
                format!(
                    "{}{}({})",
                    target,
                    generics,
                    self.render_args(&invoke.args, invoke.signature.as_ref())?
                )
            }
            ExprKind::Index(index) => format!(
                "{}[{}]",
                self.render_expr(&index.target, Precedence::Primary)?,
                self.render_exprs(&index.index)?
            ),
            ExprKind::Binary(binary) => {
                let precedence = Precedence::of_binary(binary.op);
                format!(
                    "{} {} {}",
                    self.render_expr(&binary.lhs, precedence)?,
                    binary.op.symbol(),
                    self.render_expr(&binary.rhs, precedence.tighter())?
                )
            }
            ExprKind::Unary(unary) if unary.op.is_postfix() => format!(
                "{}{}",
                self.render_expr(&unary.expr, Precedence::Primary)?,
                unary.op.symbol()
            ),
            ExprKind::Unary(unary) => {
                format!("{}{}", unary.op.symbol(), self.render_prefix_operand(&unary.expr)?)
            }
            ExprKind::Ternary(ternary) => format!(
                "{} ? {} : {}",
                self.render_expr(&ternary.cond, Precedence::Or)?,
                self.render_expr(&ternary.then, Precedence::Conditional)?,
                self.render_expr(&ternary.otherwise, Precedence::Conditional)?
            ),
            ExprKind::Cast(cast) => format!(
                "({}) {}",
                self.names.render(&cast.to)?,
                self.render_prefix_operand(&cast.expr)?
            ),
            ExprKind::TryCast(cast) => format!(
                "{} as {}",
                self.render_expr(&cast.expr, Precedence::Relational)?,
                self.names.render(&cast.to)?
            ),
            ExprKind::TypeOf(ty) => format!("typeof({})", self.names.render(ty)?),
            ExprKind::Default(ty) => format!("default({})", self.names.render(ty)?),
            ExprKind::New(new) => format!(
                "new {}({})",
                self.names.render(&new.ty)?,
                self.render_args(&new.args, new.signature.as_ref())?
            ),
            ExprKind::NewArray(new_array) => {
                // `new int[n][]`: the size goes on the outermost dimension
                let mut elem = &new_array.elem;
                let mut suffix = String::new();
                while let Ty::Array(inner) = elem {
                    suffix.push_str("[]");
                    elem = inner;
                }
                format!(
                    "new {}[{}]{}",
                    self.names.render(elem)?,
                    self.render_expr(&new_array.size, Precedence::Assignment)?,
                    suffix
                )
            }
            ExprKind::Lambda(lambda) => self.render_lambda(lambda)?,
            ExprKind::Array(array) => {
                let items = self.render_exprs(&array.items)?;
                if items.is_empty() {
                    format!("new {}[] {{}}", self.names.render(&array.elem)?)
                } else {
                    format!("new {}[] {{ {} }}", self.names.render(&array.elem)?, items)
                }
            }
            ExprKind::Map(map) => {
                let hashtable = self
                    .names
                    .named(self.names.types().well_known().hashtable)?;
                if map.entries.is_empty() {
                    format!("new {}()", hashtable)
                } else {
                    let entries = map
                        .entries
                        .iter()
                        .map(|entry| {
                            Ok(format!(
                                "{{ {}, {} }}",
                                self.render_expr(&entry.key, Precedence::Assignment)?,
                                self.render_expr(&entry.value, Precedence::Assignment)?
                            ))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    format!("new {}() {{ {} }}", hashtable, entries.join(", "))
                }
            }
            ExprKind::Assign(assign) => {
                let op = assign.op.map(BinOpKind::symbol).unwrap_or_default();
                format!(
                    "{} {}= {}",
                    self.render_expr(&assign.target, Precedence::Unary)?,
                    op,
                    self.render_expr(&assign.value, Precedence::Assignment)?
                )
            }
            ExprKind::Paren(inner) => self.render_expr(inner, Precedence::Assignment)?,
        })
    }

    /// `(int x) => { ... }` with the body indented one level past the current line.
    fn render_lambda(&self, lambda: &ExprLambda) -> Result<String> {
        let params = lambda
            .params
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => Ok(format!("{} {}", self.names.render(ty)?, param.name.render())),
                None => Ok(param.name.render()),
            })
            .collect::<Result<Vec<_>>>()?
            .join(", ");
        let head = format!("({}) =>", params);
        match &lambda.body {
            LambdaBody::Expr(body) => Ok(format!(
                "{} {}",
                head,
                self.render_expr(body, Precedence::Assignment)?
            )),
            LambdaBody::Block(block) => {
                let mut body = CSharpEmitter::new(
                    self.config,
                    TypeNames::new(self.names.types(), self.names.imports()),
                );
                body.indent = self.indent + 1;
                for stmt in &block.stmts {
                    body.emit_stmt(stmt)?;
                }
                Ok(format!(
                    "{} {{\n{}{}}}",
                    head,
                    body.code,
                    self.config.indent_string(self.indent)
                ))
            }
        }
    }

    fn push_line(&mut self, line: &str) {
        self.code.push_str(&self.config.indent_string(self.indent));
        self.code.push_str(line);
        self.code.push('\n');
    }

    fn push_blank_line(&mut self) {
        if self.code.ends_with("\n\n") || self.code.is_empty() || self.code.ends_with("{\n") {
            return;
        }
        if !self.code.ends_with('\n') {
            self.code.push('\n');
        }
        self.code.push('\n');
    }
}
