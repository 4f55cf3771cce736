use indexmap::IndexMap;

use crate::ast::{Expr, ExprKind, Lvalue, Procedure, Program, Stmt, Test, Type};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureInfo {
    pub signature: Vec<Type>,
    /// Parameters first, then locals, in declaration order.
    pub locals: IndexMap<String, Type>,
}

/// All procedure signatures and their local scopes. Built in one pass
/// over the program; immutable afterwards.
#[derive(Debug, PartialEq)]
pub struct SymbolTable {
    procedures: IndexMap<String, ProcedureInfo>,
}

impl SymbolTable {
    pub fn build(program: &Program) -> Result<Self, Error> {
        let mut table = SymbolTable {
            procedures: IndexMap::new(),
        };
        for procedure in &program.procedures {
            table.declare(procedure)?;
            table.check_uses(procedure)?;
        }
        Ok(table)
    }

    pub fn get(&self, name: &str) -> Option<&ProcedureInfo> {
        self.procedures.get(name)
    }

    fn declare(&mut self, procedure: &Procedure) -> Result<(), Error> {
        if self.procedures.contains_key(&procedure.name) {
            return Err(Error::DuplicateProcedure(procedure.name.clone()));
        }
        let mut info = ProcedureInfo {
            signature: Vec::new(),
            locals: IndexMap::new(),
        };
        for param in &procedure.params {
            if info.locals.insert(param.name.clone(), param.ty).is_some() {
                return Err(Error::DuplicateLocal(param.name.clone()));
            }
            info.signature.push(param.ty);
        }
        for local in &procedure.decls {
            let decl = &local.decl;
            if info.locals.insert(decl.name.clone(), decl.ty).is_some() {
                return Err(Error::DuplicateLocal(decl.name.clone()));
            }
        }
        self.procedures.insert(procedure.name.clone(), info);
        Ok(())
    }

    /// Every identifier must be a declared local and every call target a
    /// procedure declared at or before this point, so recursion works
    /// but forward calls do not.
    fn check_uses(&self, procedure: &Procedure) -> Result<(), Error> {
        let locals = &self.procedures[&procedure.name].locals;
        for stmt in &procedure.stmts {
            self.check_stmt(locals, stmt)?;
        }
        self.check_expr(locals, &procedure.ret)
    }

    fn check_stmt(&self, locals: &IndexMap<String, Type>, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign(lvalue, expr) => {
                self.check_lvalue(locals, lvalue)?;
                self.check_expr(locals, expr)
            }
            Stmt::If(test, then_body, else_body) => {
                self.check_test(locals, test)?;
                for stmt in then_body.iter().chain(else_body) {
                    self.check_stmt(locals, stmt)?;
                }
                Ok(())
            }
            Stmt::While(test, body) => {
                self.check_test(locals, test)?;
                for stmt in body {
                    self.check_stmt(locals, stmt)?;
                }
                Ok(())
            }
            Stmt::Println(expr) | Stmt::Delete(expr) => self.check_expr(locals, expr),
        }
    }

    fn check_test(&self, locals: &IndexMap<String, Type>, test: &Test) -> Result<(), Error> {
        self.check_expr(locals, &test.lhs)?;
        self.check_expr(locals, &test.rhs)
    }

    fn check_expr(&self, locals: &IndexMap<String, Type>, expr: &Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Num(_) | ExprKind::Null => Ok(()),
            ExprKind::Var(name) => {
                if locals.contains_key(name) {
                    Ok(())
                } else {
                    Err(Error::UndeclaredIdentifier(name.clone()))
                }
            }
            ExprKind::Binary(_, lhs, rhs) => {
                self.check_expr(locals, lhs)?;
                self.check_expr(locals, rhs)
            }
            ExprKind::AddrOf(lvalue) => self.check_lvalue(locals, lvalue),
            ExprKind::Deref(inner) | ExprKind::New(inner) => self.check_expr(locals, inner),
            ExprKind::Call(name, args) => {
                let callee = self
                    .procedures
                    .get(name)
                    .ok_or_else(|| Error::UndeclaredProcedure(name.clone()))?;
                if args.len() != callee.signature.len() {
                    return Err(Error::ArityMismatch {
                        name: name.clone(),
                        expected: callee.signature.len(),
                        supplied: args.len(),
                    });
                }
                if locals.contains_key(name) {
                    return Err(Error::ProcedureVariableClash(name.clone()));
                }
                for arg in args {
                    self.check_expr(locals, arg)?;
                }
                Ok(())
            }
        }
    }

    fn check_lvalue(&self, locals: &IndexMap<String, Type>, lvalue: &Lvalue) -> Result<(), Error> {
        match lvalue {
            Lvalue::Var(name) => {
                if locals.contains_key(name) {
                    Ok(())
                } else {
                    Err(Error::UndeclaredIdentifier(name.clone()))
                }
            }
            Lvalue::Deref(inner) => self.check_expr(locals, inner),
        }
    }
}
