use std::fmt;

use crate::error::Error;
use crate::tree::Node;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Type {
    Int,
    IntStar,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::IntStar => write!(f, "int*"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Declaration order; the entry procedure is last.
    pub procedures: Vec<Procedure>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Procedure {
    pub name: String,
    /// The `wain` entry procedure, with its fixed two-parameter shape.
    pub is_entry: bool,
    pub params: Vec<Decl>,
    pub decls: Vec<LocalDecl>,
    pub stmts: Vec<Stmt>,
    pub ret: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decl {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocalDecl {
    pub decl: Decl,
    pub init: Init,
}

/// Initializer of a local declaration. Number lexemes are kept
/// verbatim so they reach the emitted `.word` untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    Num(String),
    Null,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Assign(Lvalue, Expr),
    If(Test, Vec<Stmt>, Vec<Stmt>),
    While(Test, Vec<Stmt>),
    Println(Expr),
    Delete(Expr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Test {
    pub op: RelOp,
    pub lhs: Expr,
    pub rhs: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    /// Filled in by the type checker.
    pub ty: Option<Type>,
}

impl Expr {
    pub fn new(kind: ExprKind) -> Self {
        Expr { kind, ty: None }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Num(String),
    Null,
    Var(String),
    Binary(BinOp, Box<Expr>, Box<Expr>),
    AddrOf(Box<Lvalue>),
    Deref(Box<Expr>),
    New(Box<Expr>),
    Call(String, Vec<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lvalue {
    Var(String),
    Deref(Box<Expr>),
}

/// Lowers the parse tree into the sum-type representation above.
/// Parenthesised subtrees collapse; every production must be one the
/// grammar defines or the tree is rejected as malformed.
pub fn lower(root: &Node) -> Result<Program, Error> {
    if root.rule() != "start BOF procedures EOF" {
        return Err(unexpected(root));
    }
    let mut procedures = Vec::new();
    lower_procedures(root.child(1)?, &mut procedures)?;
    Ok(Program { procedures })
}

fn unexpected(node: &Node) -> Error {
    Error::MalformedTree(format!("unexpected production `{}`", node.rule()))
}

fn lower_procedures(node: &Node, out: &mut Vec<Procedure>) -> Result<(), Error> {
    match node.rhs.join(" ").as_str() {
        "procedure procedures" => {
            out.push(lower_procedure(node.child(0)?)?);
            lower_procedures(node.child(1)?, out)
        }
        "main" => {
            out.push(lower_main(node.child(0)?)?);
            Ok(())
        }
        _ => Err(unexpected(node)),
    }
}

fn lower_procedure(node: &Node) -> Result<Procedure, Error> {
    if node.rule()
        != "procedure INT ID LPAREN params RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE"
    {
        return Err(unexpected(node));
    }
    Ok(Procedure {
        name: node.child(1)?.lexeme()?.to_string(),
        is_entry: false,
        params: lower_params(node.child(3)?)?,
        decls: lower_dcls(node.child(6)?)?,
        stmts: lower_statements(node.child(7)?)?,
        ret: lower_expr(node.child(9)?)?,
    })
}

fn lower_main(node: &Node) -> Result<Procedure, Error> {
    if node.rule()
        != "main INT WAIN LPAREN dcl COMMA dcl RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE"
    {
        return Err(unexpected(node));
    }
    Ok(Procedure {
        name: "wain".to_string(),
        is_entry: true,
        params: vec![lower_dcl(node.child(3)?)?, lower_dcl(node.child(5)?)?],
        decls: lower_dcls(node.child(8)?)?,
        stmts: lower_statements(node.child(9)?)?,
        ret: lower_expr(node.child(11)?)?,
    })
}

fn lower_params(node: &Node) -> Result<Vec<Decl>, Error> {
    match node.rhs.join(" ").as_str() {
        "" => Ok(Vec::new()),
        "paramlist" => {
            let mut params = Vec::new();
            let mut list = node.child(0)?;
            loop {
                match list.rhs.join(" ").as_str() {
                    "dcl" => {
                        params.push(lower_dcl(list.child(0)?)?);
                        return Ok(params);
                    }
                    "dcl COMMA paramlist" => {
                        params.push(lower_dcl(list.child(0)?)?);
                        list = list.child(2)?;
                    }
                    _ => return Err(unexpected(list)),
                }
            }
        }
        _ => Err(unexpected(node)),
    }
}

fn lower_dcl(node: &Node) -> Result<Decl, Error> {
    if node.rule() != "dcl type ID" {
        return Err(unexpected(node));
    }
    let ty = match node.child(0)?.rhs.join(" ").as_str() {
        "INT" => Type::Int,
        "INT STAR" => Type::IntStar,
        _ => return Err(unexpected(node.child(0)?)),
    };
    Ok(Decl {
        name: node.child(1)?.lexeme()?.to_string(),
        ty,
    })
}

fn lower_dcls(node: &Node) -> Result<Vec<LocalDecl>, Error> {
    match node.rhs.join(" ").as_str() {
        "" => Ok(Vec::new()),
        "dcls dcl BECOMES NUM SEMI" => {
            let mut decls = lower_dcls(node.child(0)?)?;
            decls.push(LocalDecl {
                decl: lower_dcl(node.child(1)?)?,
                init: Init::Num(node.child(3)?.lexeme()?.to_string()),
            });
            Ok(decls)
        }
        "dcls dcl BECOMES NULL SEMI" => {
            let mut decls = lower_dcls(node.child(0)?)?;
            decls.push(LocalDecl {
                decl: lower_dcl(node.child(1)?)?,
                init: Init::Null,
            });
            Ok(decls)
        }
        _ => Err(unexpected(node)),
    }
}

fn lower_statements(node: &Node) -> Result<Vec<Stmt>, Error> {
    match node.rhs.join(" ").as_str() {
        "" => Ok(Vec::new()),
        "statements statement" => {
            let mut stmts = lower_statements(node.child(0)?)?;
            stmts.push(lower_statement(node.child(1)?)?);
            Ok(stmts)
        }
        _ => Err(unexpected(node)),
    }
}

fn lower_statement(node: &Node) -> Result<Stmt, Error> {
    match node.rhs.join(" ").as_str() {
        "lvalue BECOMES expr SEMI" => Ok(Stmt::Assign(
            lower_lvalue(node.child(0)?)?,
            lower_expr(node.child(2)?)?,
        )),
        "IF LPAREN test RPAREN LBRACE statements RBRACE ELSE LBRACE statements RBRACE" => {
            Ok(Stmt::If(
                lower_test(node.child(2)?)?,
                lower_statements(node.child(5)?)?,
                lower_statements(node.child(9)?)?,
            ))
        }
        "WHILE LPAREN test RPAREN LBRACE statements RBRACE" => Ok(Stmt::While(
            lower_test(node.child(2)?)?,
            lower_statements(node.child(5)?)?,
        )),
        "PRINTLN LPAREN expr RPAREN SEMI" => Ok(Stmt::Println(lower_expr(node.child(2)?)?)),
        "DELETE LBRACK RBRACK expr SEMI" => Ok(Stmt::Delete(lower_expr(node.child(3)?)?)),
        _ => Err(unexpected(node)),
    }
}

fn lower_test(node: &Node) -> Result<Test, Error> {
    let op = match node.rhs.join(" ").as_str() {
        "expr EQ expr" => RelOp::Eq,
        "expr NE expr" => RelOp::Ne,
        "expr LT expr" => RelOp::Lt,
        "expr LE expr" => RelOp::Le,
        "expr GT expr" => RelOp::Gt,
        "expr GE expr" => RelOp::Ge,
        _ => return Err(unexpected(node)),
    };
    Ok(Test {
        op,
        lhs: lower_expr(node.child(0)?)?,
        rhs: lower_expr(node.child(2)?)?,
    })
}

fn lower_expr(node: &Node) -> Result<Expr, Error> {
    match node.rhs.join(" ").as_str() {
        "term" => lower_term(node.child(0)?),
        "expr PLUS term" => binary(BinOp::Add, node),
        "expr MINUS term" => binary(BinOp::Sub, node),
        _ => Err(unexpected(node)),
    }
}

fn lower_term(node: &Node) -> Result<Expr, Error> {
    match node.rhs.join(" ").as_str() {
        "factor" => lower_factor(node.child(0)?),
        "term STAR factor" => binary(BinOp::Mul, node),
        "term SLASH factor" => binary(BinOp::Div, node),
        "term PCT factor" => binary(BinOp::Mod, node),
        _ => Err(unexpected(node)),
    }
}

fn binary(op: BinOp, node: &Node) -> Result<Expr, Error> {
    let lhs = lower_operand(node.child(0)?)?;
    let rhs = lower_operand(node.child(2)?)?;
    Ok(Expr::new(ExprKind::Binary(
        op,
        Box::new(lhs),
        Box::new(rhs),
    )))
}

fn lower_operand(node: &Node) -> Result<Expr, Error> {
    match node.lhs.as_str() {
        "expr" => lower_expr(node),
        "term" => lower_term(node),
        "factor" => lower_factor(node),
        _ => Err(unexpected(node)),
    }
}

fn lower_factor(node: &Node) -> Result<Expr, Error> {
    match node.rhs.join(" ").as_str() {
        "ID" => Ok(Expr::new(ExprKind::Var(
            node.child(0)?.lexeme()?.to_string(),
        ))),
        "NUM" => Ok(Expr::new(ExprKind::Num(
            node.child(0)?.lexeme()?.to_string(),
        ))),
        "NULL" => Ok(Expr::new(ExprKind::Null)),
        "LPAREN expr RPAREN" => lower_expr(node.child(1)?),
        "AMP lvalue" => Ok(Expr::new(ExprKind::AddrOf(Box::new(lower_lvalue(
            node.child(1)?,
        )?)))),
        "STAR factor" => Ok(Expr::new(ExprKind::Deref(Box::new(lower_factor(
            node.child(1)?,
        )?)))),
        "NEW INT LBRACK expr RBRACK" => Ok(Expr::new(ExprKind::New(Box::new(lower_expr(
            node.child(3)?,
        )?)))),
        "ID LPAREN RPAREN" => Ok(Expr::new(ExprKind::Call(
            node.child(0)?.lexeme()?.to_string(),
            Vec::new(),
        ))),
        "ID LPAREN arglist RPAREN" => {
            let name = node.child(0)?.lexeme()?.to_string();
            let mut args = Vec::new();
            let mut list = node.child(2)?;
            loop {
                match list.rhs.join(" ").as_str() {
                    "expr" => {
                        args.push(lower_expr(list.child(0)?)?);
                        break;
                    }
                    "expr COMMA arglist" => {
                        args.push(lower_expr(list.child(0)?)?);
                        list = list.child(2)?;
                    }
                    _ => return Err(unexpected(list)),
                }
            }
            Ok(Expr::new(ExprKind::Call(name, args)))
        }
        _ => Err(unexpected(node)),
    }
}

fn lower_lvalue(node: &Node) -> Result<Lvalue, Error> {
    match node.rhs.join(" ").as_str() {
        "ID" => Ok(Lvalue::Var(node.child(0)?.lexeme()?.to_string())),
        "STAR factor" => Ok(Lvalue::Deref(Box::new(lower_factor(node.child(1)?)?))),
        "LPAREN lvalue RPAREN" => lower_lvalue(node.child(1)?),
        _ => Err(unexpected(node)),
    }
}
