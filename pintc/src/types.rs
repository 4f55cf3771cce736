use indexmap::IndexMap;

use crate::ast::{BinOp, Expr, ExprKind, Init, Lvalue, Procedure, Program, Stmt, Test, Type};
use crate::error::Error;
use crate::symbols::SymbolTable;

/// Annotates every expression with its type and rejects ill-typed
/// programs. Running it again on already-annotated input recomputes
/// the same annotations.
pub fn check(program: &mut Program, table: &SymbolTable) -> Result<(), Error> {
    for procedure in &mut program.procedures {
        let locals = table
            .get(&procedure.name)
            .ok_or_else(|| Error::Internal(format!("procedure `{}` not in table", procedure.name)))?
            .locals
            .clone();
        let checker = Checker {
            table,
            locals: &locals,
        };
        checker.procedure(procedure)?;
    }
    Ok(())
}

struct Checker<'a> {
    table: &'a SymbolTable,
    locals: &'a IndexMap<String, Type>,
}

impl Checker<'_> {
    fn procedure(&self, procedure: &mut Procedure) -> Result<(), Error> {
        if procedure.is_entry {
            match procedure.params.get(1) {
                Some(param) if param.ty == Type::Int => {}
                _ => {
                    return Err(Error::TypeError(
                        "the second parameter of wain must be int".into(),
                    ))
                }
            }
        }
        for local in &procedure.decls {
            match (&local.init, local.decl.ty) {
                (Init::Num(_), Type::Int) | (Init::Null, Type::IntStar) => {}
                (Init::Num(_), Type::IntStar) => {
                    return Err(Error::TypeError(format!(
                        "cannot initialize int* `{}` with a number",
                        local.decl.name
                    )))
                }
                (Init::Null, Type::Int) => {
                    return Err(Error::TypeError(format!(
                        "cannot initialize int `{}` with NULL",
                        local.decl.name
                    )))
                }
            }
        }
        for stmt in &mut procedure.stmts {
            self.stmt(stmt)?;
        }
        if self.expr(&mut procedure.ret)? != Type::Int {
            return Err(Error::TypeError(format!(
                "procedure `{}` must return int",
                procedure.name
            )));
        }
        Ok(())
    }

    fn stmt(&self, stmt: &mut Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign(lvalue, expr) => {
                let lhs = self.lvalue(lvalue)?;
                let rhs = self.expr(expr)?;
                if lhs != rhs {
                    return Err(Error::TypeError(format!(
                        "cannot assign {rhs} to {lhs}"
                    )));
                }
                Ok(())
            }
            Stmt::If(test, then_body, else_body) => {
                self.test(test)?;
                for stmt in then_body.iter_mut().chain(else_body) {
                    self.stmt(stmt)?;
                }
                Ok(())
            }
            Stmt::While(test, body) => {
                self.test(test)?;
                for stmt in body {
                    self.stmt(stmt)?;
                }
                Ok(())
            }
            Stmt::Println(expr) => {
                if self.expr(expr)? != Type::Int {
                    return Err(Error::TypeError("cannot print an int*".into()));
                }
                Ok(())
            }
            Stmt::Delete(expr) => {
                if self.expr(expr)? != Type::IntStar {
                    return Err(Error::TypeError("cannot delete an int".into()));
                }
                Ok(())
            }
        }
    }

    fn test(&self, test: &mut Test) -> Result<(), Error> {
        let lhs = self.expr(&mut test.lhs)?;
        let rhs = self.expr(&mut test.rhs)?;
        if lhs != rhs {
            return Err(Error::TypeError(format!("cannot compare {lhs} and {rhs}")));
        }
        Ok(())
    }

    fn expr(&self, expr: &mut Expr) -> Result<Type, Error> {
        let ty = match &mut expr.kind {
            ExprKind::Num(_) => Type::Int,
            ExprKind::Null => Type::IntStar,
            ExprKind::Var(name) => self.var(name)?,
            ExprKind::Binary(op, lhs, rhs) => {
                let lhs = self.expr(lhs)?;
                let rhs = self.expr(rhs)?;
                self.binary(*op, lhs, rhs)?
            }
            ExprKind::AddrOf(lvalue) => {
                if self.lvalue(lvalue)? != Type::Int {
                    return Err(Error::TypeError(
                        "cannot take the address of an int*".into(),
                    ));
                }
                Type::IntStar
            }
            ExprKind::Deref(inner) => {
                if self.expr(inner)? != Type::IntStar {
                    return Err(Error::TypeError("cannot dereference an int".into()));
                }
                Type::Int
            }
            ExprKind::New(size) => {
                if self.expr(size)? != Type::Int {
                    return Err(Error::TypeError("allocation size must be int".into()));
                }
                Type::IntStar
            }
            ExprKind::Call(name, args) => {
                let signature = self
                    .table
                    .get(name)
                    .ok_or_else(|| Error::UndeclaredProcedure(name.clone()))?
                    .signature
                    .clone();
                for (index, (arg, expected)) in args.iter_mut().zip(&signature).enumerate() {
                    let got = self.expr(arg)?;
                    if got != *expected {
                        return Err(Error::TypeError(format!(
                            "argument {} of `{name}` expects {expected}, found {got}",
                            index + 1
                        )));
                    }
                }
                Type::Int
            }
        };
        expr.ty = Some(ty);
        Ok(ty)
    }

    fn binary(&self, op: BinOp, lhs: Type, rhs: Type) -> Result<Type, Error> {
        use Type::{Int, IntStar};
        match (op, lhs, rhs) {
            (BinOp::Add, Int, Int) => Ok(Int),
            (BinOp::Add, IntStar, Int) | (BinOp::Add, Int, IntStar) => Ok(IntStar),
            (BinOp::Add, IntStar, IntStar) => {
                Err(Error::TypeError("cannot add two int* values".into()))
            }
            (BinOp::Sub, Int, Int) => Ok(Int),
            (BinOp::Sub, IntStar, Int) => Ok(IntStar),
            (BinOp::Sub, IntStar, IntStar) => Ok(Int),
            (BinOp::Sub, Int, IntStar) => {
                Err(Error::TypeError("cannot subtract an int* from an int".into()))
            }
            (BinOp::Mul | BinOp::Div | BinOp::Mod, Int, Int) => Ok(Int),
            (BinOp::Mul, _, _) => Err(Error::TypeError("cannot multiply int* values".into())),
            (BinOp::Div, _, _) => Err(Error::TypeError("cannot divide int* values".into())),
            (BinOp::Mod, _, _) => {
                Err(Error::TypeError("cannot take the remainder of int* values".into()))
            }
        }
    }

    fn lvalue(&self, lvalue: &mut Lvalue) -> Result<Type, Error> {
        match lvalue {
            Lvalue::Var(name) => self.var(name),
            Lvalue::Deref(inner) => {
                if self.expr(inner)? != Type::IntStar {
                    return Err(Error::TypeError("cannot dereference an int".into()));
                }
                Ok(Type::Int)
            }
        }
    }

    fn var(&self, name: &str) -> Result<Type, Error> {
        self.locals
            .get(name)
            .copied()
            .ok_or_else(|| Error::UndeclaredIdentifier(name.to_string()))
    }
}
