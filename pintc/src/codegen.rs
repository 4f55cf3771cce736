//! Assembly emission.
//!
//! Register convention: $3 carries every result, $5/$6/$7 are scratch,
//! $29 is the frame pointer, $30 the stack pointer, $31 the link
//! register. $4 holds 4, $11 holds 1 and $10 the address of the
//! runtime print routine for the whole program.

use indexmap::IndexMap;

use crate::ast::{
    BinOp, Expr, ExprKind, Init, LocalDecl, Lvalue, Procedure, Program, RelOp, Stmt, Test, Type,
};
use crate::error::Error;

pub fn generate(program: &Program) -> Result<String, Error> {
    let mut gen = CodeGen::default();
    let entry = program
        .procedures
        .iter()
        .find(|p| p.is_entry)
        .ok_or_else(|| Error::Internal("no entry procedure".into()))?;
    gen.entry(entry)?;
    // Remaining procedures in reverse declaration order, so the image
    // starts with the entry code.
    for procedure in program.procedures.iter().rev().filter(|p| !p.is_entry) {
        gen.procedure(procedure)?;
    }
    Ok(gen.out.join("\n") + "\n")
}

/// Independent counters so each control-flow construct gets its own
/// label family.
#[derive(Debug, Default)]
struct LabelCounters {
    ifs: usize,
    loops: usize,
    deletes: usize,
}

/// Stack-frame layout of the procedure currently being generated,
/// as offsets from $29.
#[derive(Debug, Default)]
struct Frame {
    offsets: IndexMap<String, i32>,
    next: i32,
}

impl Frame {
    fn new() -> Self {
        Frame {
            offsets: IndexMap::new(),
            next: 4,
        }
    }

    fn push(&mut self, name: &str) {
        self.next -= 4;
        self.offsets.insert(name.to_string(), self.next);
    }

    /// Parameters are pushed by the caller, above the frame pointer.
    /// Once the local count is known, every offset shifts up past them.
    fn adjust_for_params(&mut self, count: usize) {
        let delta = 4 * count as i32;
        for offset in self.offsets.values_mut() {
            *offset += delta;
        }
    }

    fn offset(&self, name: &str) -> Result<i32, Error> {
        self.offsets
            .get(name)
            .copied()
            .ok_or_else(|| Error::Internal(format!("no frame slot for `{name}`")))
    }
}

#[derive(Debug, Default)]
struct CodeGen {
    out: Vec<String>,
    labels: LabelCounters,
    frame: Frame,
}

impl CodeGen {
    fn emit(&mut self, line: impl Into<String>) {
        self.out.push(line.into());
    }

    /// Push $3.
    fn push_result(&mut self) {
        self.emit("sw $3, 0($30)");
        self.emit("sub $30, $30, $4");
    }

    /// Pop into $5.
    fn pop_scratch(&mut self) {
        self.emit("lw $5, 4($30)");
        self.emit("add $30, $30, $4");
    }

    fn save(&mut self, reg: &str) {
        self.emit(format!("sw {reg}, 0($30)"));
        self.emit("sub $30, $30, $4");
    }

    fn restore(&mut self, reg: &str) {
        self.emit(format!("lw {reg}, 4($30)"));
        self.emit("add $30, $30, $4");
    }

    /// Calls a runtime routine through $31, preserving the old link.
    fn call_runtime(&mut self, name: &str) {
        self.save("$31");
        self.emit("lis $31");
        self.emit(format!(".word {name}"));
        self.emit("jalr $31");
        self.restore("$31");
    }

    fn entry(&mut self, entry: &Procedure) -> Result<(), Error> {
        self.frame = Frame::new();
        self.emit("lis $4");
        self.emit(".word 4");
        self.emit("lis $11");
        self.emit(".word 1");
        self.emit("lis $10");
        self.emit(".word print");
        self.emit("sub $29, $30, $4");
        self.emit("sub $30, $30, $4");
        self.emit("sw $1, 0($30)");
        self.emit("sub $30, $30, $4");
        self.emit("sw $2, 0($30)");
        self.emit("sub $30, $30, $4");
        // The heap initializer reads the array length from $2; with an
        // int first parameter there is no array.
        if entry.params[0].ty == Type::Int {
            self.emit("add $2, $0, $0");
        }
        self.emit("wain:");
        self.call_runtime("init");

        for param in &entry.params {
            self.frame.push(&param.name);
        }
        self.locals(&entry.decls)?;
        for stmt in &entry.stmts {
            self.stmt(stmt)?;
        }
        self.expr(&entry.ret)?;
        self.emit("add $30, $29, $4");
        self.emit("jr $31");
        Ok(())
    }

    fn procedure(&mut self, procedure: &Procedure) -> Result<(), Error> {
        self.frame = Frame::new();
        self.emit(format!("F{}:", procedure.name));
        self.emit("sub $29, $30, $0");
        for param in &procedure.params {
            self.frame.push(&param.name);
        }
        self.locals(&procedure.decls)?;
        self.frame.adjust_for_params(procedure.params.len());
        self.save("$1");
        self.save("$2");
        self.save("$5");
        self.save("$6");
        self.save("$7");
        for stmt in &procedure.stmts {
            self.stmt(stmt)?;
        }
        self.expr(&procedure.ret)?;
        self.restore("$7");
        self.restore("$6");
        self.restore("$5");
        self.restore("$2");
        self.restore("$1");
        self.emit("add $30, $29, $0");
        self.emit("jr $31");
        Ok(())
    }

    fn locals(&mut self, decls: &[LocalDecl]) -> Result<(), Error> {
        for local in decls {
            match &local.init {
                Init::Num(num) => {
                    self.emit("lis $5");
                    self.emit(format!(".word {num}"));
                    self.emit("sw $5, 0($30)");
                    self.emit("sub $30, $30, $4");
                }
                Init::Null => {
                    self.emit("sw $11, 0($30)");
                    self.emit("sub $30, $30, $4");
                }
            }
            self.frame.push(&local.decl.name);
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &Stmt) -> Result<(), Error> {
        match stmt {
            Stmt::Assign(Lvalue::Var(name), expr) => {
                self.expr(expr)?;
                let offset = self.frame.offset(name)?;
                self.emit(format!("sw $3, {offset}($29)"));
                Ok(())
            }
            Stmt::Assign(Lvalue::Deref(target), expr) => {
                self.expr(target)?;
                self.push_result();
                self.expr(expr)?;
                self.pop_scratch();
                self.emit("sw $3, 0($5)");
                Ok(())
            }
            Stmt::Println(expr) => {
                self.expr(expr)?;
                self.save("$1");
                self.emit("add $1, $3, $0");
                self.save("$31");
                self.emit("jalr $10");
                self.restore("$31");
                self.restore("$1");
                Ok(())
            }
            Stmt::If(test, then_body, else_body) => {
                let n = self.labels.ifs;
                self.labels.ifs += 1;
                self.test(test)?;
                self.emit(format!("beq $3, $11, true{n}"));
                for stmt in else_body {
                    self.stmt(stmt)?;
                }
                self.emit(format!("beq $0, $0, endif{n}"));
                self.emit(format!("true{n}:"));
                for stmt in then_body {
                    self.stmt(stmt)?;
                }
                self.emit(format!("endif{n}:"));
                Ok(())
            }
            Stmt::While(test, body) => {
                let n = self.labels.loops;
                self.labels.loops += 1;
                self.emit(format!("loop{n}:"));
                self.test(test)?;
                self.emit(format!("beq $3, $0, done{n}"));
                for stmt in body {
                    self.stmt(stmt)?;
                }
                self.emit(format!("beq $0, $0, loop{n}"));
                self.emit(format!("done{n}:"));
                Ok(())
            }
            Stmt::Delete(expr) => {
                let n = self.labels.deletes;
                self.labels.deletes += 1;
                self.expr(expr)?;
                // NULL is represented as 1; deleting it is a no-op.
                self.emit(format!("beq $3, $11, skipDelete{n}"));
                self.emit("add $1, $3, $0");
                self.call_runtime("delete");
                self.emit(format!("skipDelete{n}:"));
                Ok(())
            }
        }
    }

    /// Leaves 1 in $3 when the comparison holds, 0 otherwise. Pointer
    /// comparisons are unsigned.
    fn test(&mut self, test: &Test) -> Result<(), Error> {
        self.expr(&test.lhs)?;
        self.push_result();
        self.expr(&test.rhs)?;
        self.pop_scratch();
        let slt = if expr_ty(&test.lhs)? == Type::IntStar {
            "sltu"
        } else {
            "slt"
        };
        match test.op {
            RelOp::Lt => self.emit(format!("{slt} $3, $5, $3")),
            RelOp::Gt => self.emit(format!("{slt} $3, $3, $5")),
            RelOp::Ne => {
                self.emit(format!("{slt} $6, $3, $5"));
                self.emit(format!("{slt} $7, $5, $3"));
                self.emit("add $3, $6, $7");
            }
            RelOp::Eq => {
                self.emit(format!("{slt} $6, $3, $5"));
                self.emit(format!("{slt} $7, $5, $3"));
                self.emit("add $3, $6, $7");
                self.emit("sub $3, $11, $3");
            }
            RelOp::Le => {
                self.emit(format!("{slt} $3, $3, $5"));
                self.emit("sub $3, $11, $3");
            }
            RelOp::Ge => {
                self.emit(format!("{slt} $3, $5, $3"));
                self.emit("sub $3, $11, $3");
            }
        }
        Ok(())
    }

    fn expr(&mut self, expr: &Expr) -> Result<(), Error> {
        match &expr.kind {
            ExprKind::Num(num) => {
                self.emit("lis $3");
                self.emit(format!(".word {num}"));
            }
            ExprKind::Null => {
                self.emit("add $3, $11, $0");
            }
            ExprKind::Var(name) => {
                let offset = self.frame.offset(name)?;
                self.emit(format!("lw $3, {offset}($29)"));
            }
            ExprKind::Deref(inner) => {
                self.expr(inner)?;
                self.emit("lw $3, 0($3)");
            }
            ExprKind::AddrOf(lvalue) => match lvalue.as_ref() {
                Lvalue::Var(name) => {
                    let offset = self.frame.offset(name)?;
                    self.emit("lis $5");
                    self.emit(format!(".word {offset}"));
                    self.emit("add $3, $5, $29");
                }
                Lvalue::Deref(inner) => self.expr(inner)?,
            },
            ExprKind::Binary(op, lhs, rhs) => {
                self.expr(lhs)?;
                self.push_result();
                self.expr(rhs)?;
                self.pop_scratch();
                self.binary(*op, expr_ty(lhs)?, expr_ty(rhs)?)?;
            }
            ExprKind::New(size) => {
                self.expr(size)?;
                self.emit("add $1, $3, $0");
                self.call_runtime("new");
                // The allocator returns 0 on failure; the language
                // maps that to NULL, which is 1.
                self.emit("bne $3, $0, 1");
                self.emit("add $3, $11, $0");
            }
            ExprKind::Call(name, args) => {
                self.save("$29");
                self.save("$31");
                for arg in args {
                    self.expr(arg)?;
                    self.push_result();
                }
                self.emit("lis $31");
                self.emit(format!(".word F{name}"));
                self.emit("jalr $31");
                if !args.is_empty() {
                    self.emit("lis $5");
                    self.emit(format!(".word {}", args.len()));
                    self.emit("multu $4, $5");
                    self.emit("mflo $5");
                    self.emit("add $30, $30, $5");
                }
                self.restore("$31");
                self.restore("$29");
            }
        }
        Ok(())
    }

    /// $5 holds the left operand, $3 the right; the result lands in $3.
    fn binary(&mut self, op: BinOp, lhs: Type, rhs: Type) -> Result<(), Error> {
        use Type::{Int, IntStar};
        match (op, lhs, rhs) {
            (BinOp::Add, Int, Int) => self.emit("add $3, $5, $3"),
            (BinOp::Add, Int, IntStar) => {
                // Scale the int side by the word size.
                self.emit("mult $5, $4");
                self.emit("mflo $5");
                self.emit("add $3, $5, $3");
            }
            (BinOp::Add, IntStar, Int) => {
                self.emit("mult $3, $4");
                self.emit("mflo $3");
                self.emit("add $3, $5, $3");
            }
            (BinOp::Sub, Int, Int) => self.emit("sub $3, $5, $3"),
            (BinOp::Sub, IntStar, Int) => {
                self.emit("mult $3, $4");
                self.emit("mflo $3");
                self.emit("sub $3, $5, $3");
            }
            (BinOp::Sub, IntStar, IntStar) => {
                // Pointer difference in elements, not bytes.
                self.emit("sub $3, $5, $3");
                self.emit("div $3, $4");
                self.emit("mflo $3");
            }
            (BinOp::Mul, Int, Int) => {
                self.emit("mult $5, $3");
                self.emit("mflo $3");
            }
            (BinOp::Div, Int, Int) => {
                self.emit("div $5, $3");
                self.emit("mflo $3");
            }
            (BinOp::Mod, Int, Int) => {
                self.emit("div $5, $3");
                self.emit("mfhi $3");
            }
            (op, lhs, rhs) => {
                return Err(Error::Internal(format!(
                    "ill-typed {op:?} on {lhs} and {rhs} reached code generation"
                )))
            }
        }
        Ok(())
    }
}

fn expr_ty(expr: &Expr) -> Result<Type, Error> {
    expr.ty
        .ok_or_else(|| Error::Internal("untyped expression reached code generation".into()))
}
