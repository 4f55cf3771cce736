//! Builders for flattened parse-tree text, shared by the integration
//! suites. Each helper returns the preorder listing of one subtree.
#![allow(dead_code)]

pub fn dcl_int(name: &str) -> String {
    format!("dcl type ID\ntype INT\nINT int\nID {name}\n")
}

pub fn dcl_ptr(name: &str) -> String {
    format!("dcl type ID\ntype INT STAR\nINT int\nSTAR *\nID {name}\n")
}

pub fn fac_id(name: &str) -> String {
    format!("factor ID\nID {name}\n")
}

pub fn fac_num(num: &str) -> String {
    format!("factor NUM\nNUM {num}\n")
}

pub fn expr_of(factor: &str) -> String {
    format!("expr term\nterm factor\n{factor}")
}

pub fn add(lhs_factor: &str, rhs_factor: &str) -> String {
    format!("expr expr PLUS term\nexpr term\nterm factor\n{lhs_factor}PLUS +\nterm factor\n{rhs_factor}")
}

pub fn sub(lhs_factor: &str, rhs_factor: &str) -> String {
    format!("expr expr MINUS term\nexpr term\nterm factor\n{lhs_factor}MINUS -\nterm factor\n{rhs_factor}")
}

/// Call expression; `args` are full expr subtrees.
pub fn call(name: &str, args: &[String]) -> String {
    if args.is_empty() {
        return expr_of(&format!(
            "factor ID LPAREN RPAREN\nID {name}\nLPAREN (\nRPAREN )\n"
        ));
    }
    let mut list = String::new();
    for (index, arg) in args.iter().enumerate() {
        if index + 1 < args.len() {
            list.push_str(&format!("arglist expr COMMA arglist\n{arg}COMMA ,\n"));
        } else {
            list.push_str(&format!("arglist expr\n{arg}"));
        }
    }
    expr_of(&format!(
        "factor ID LPAREN arglist RPAREN\nID {name}\nLPAREN (\n{list}RPAREN )\n"
    ))
}

/// Local declarations; `Some(num)` initializes with a number, `None`
/// with NULL.
pub fn dcls(items: &[(String, Option<&str>)]) -> String {
    match items.split_last() {
        None => "dcls\n".to_string(),
        Some(((decl, Some(num)), rest)) => format!(
            "dcls dcls dcl BECOMES NUM SEMI\n{}{decl}BECOMES =\nNUM {num}\nSEMI ;\n",
            dcls(rest)
        ),
        Some(((decl, None), rest)) => format!(
            "dcls dcls dcl BECOMES NULL SEMI\n{}{decl}BECOMES =\nNULL NULL\nSEMI ;\n",
            dcls(rest)
        ),
    }
}

pub fn stmts(list: &[String]) -> String {
    match list.split_last() {
        None => "statements\n".to_string(),
        Some((last, rest)) => format!("statements statements statement\n{}{last}", stmts(rest)),
    }
}

pub fn assign(name: &str, expr: &str) -> String {
    format!("statement lvalue BECOMES expr SEMI\nlvalue ID\nID {name}\nBECOMES =\n{expr}SEMI ;\n")
}

pub fn println_stmt(expr: &str) -> String {
    format!("statement PRINTLN LPAREN expr RPAREN SEMI\nPRINTLN println\nLPAREN (\n{expr}RPAREN )\nSEMI ;\n")
}

pub fn delete_stmt(expr: &str) -> String {
    format!("statement DELETE LBRACK RBRACK expr SEMI\nDELETE delete\nLBRACK [\nRBRACK ]\n{expr}SEMI ;\n")
}

pub fn while_stmt(test: &str, body: &str) -> String {
    format!("statement WHILE LPAREN test RPAREN LBRACE statements RBRACE\nWHILE while\nLPAREN (\n{test}RPAREN )\nLBRACE {{\n{body}RBRACE }}\n")
}

pub fn if_stmt(test: &str, then_body: &str, else_body: &str) -> String {
    format!("statement IF LPAREN test RPAREN LBRACE statements RBRACE ELSE LBRACE statements RBRACE\nIF if\nLPAREN (\n{test}RPAREN )\nLBRACE {{\n{then_body}RBRACE }}\nELSE else\nLBRACE {{\n{else_body}RBRACE }}\n")
}

pub fn test_gt(lhs: &str, rhs: &str) -> String {
    format!("test expr GT expr\n{lhs}GT >\n{rhs}")
}

pub fn test_eq(lhs: &str, rhs: &str) -> String {
    format!("test expr EQ expr\n{lhs}EQ ==\n{rhs}")
}

/// A non-entry procedure with up to two int parameters and no locals
/// or statements.
pub fn procedure(name: &str, params: &[&str], ret: &str) -> String {
    let params_text = match params {
        [] => "params\n".to_string(),
        [a] => format!("params paramlist\nparamlist dcl\n{}", dcl_int(a)),
        [a, b] => format!(
            "params paramlist\nparamlist dcl COMMA paramlist\n{}COMMA ,\nparamlist dcl\n{}",
            dcl_int(a),
            dcl_int(b)
        ),
        _ => panic!("at most two parameters"),
    };
    format!("procedure INT ID LPAREN params RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE\nINT int\nID {name}\nLPAREN (\n{params_text}RPAREN )\nLBRACE {{\ndcls\nstatements\nRETURN return\n{ret}SEMI ;\nRBRACE }}\n")
}

/// The `wain` subtree.
pub fn main_proc(param1: &str, param2: &str, decls: &str, body: &str, ret: &str) -> String {
    format!("main INT WAIN LPAREN dcl COMMA dcl RPAREN LBRACE dcls statements RETURN expr SEMI RBRACE\nINT int\nWAIN wain\nLPAREN (\n{param1}COMMA ,\n{param2}RPAREN )\nLBRACE {{\n{decls}{body}RETURN return\n{ret}SEMI ;\nRBRACE }}\n")
}

/// The whole program: the listed procedures in order, then `wain`.
pub fn program(procedures: &[String], main: &str) -> String {
    let mut text = String::from("start BOF procedures EOF\nBOF BOF\n");
    for procedure in procedures {
        text.push_str("procedures procedure procedures\n");
        text.push_str(procedure);
    }
    text.push_str("procedures main\n");
    text.push_str(main);
    text.push_str("EOF EOF\n");
    text
}

/// `int wain(int a, int b) { return a + b; }`
pub fn simple_wain() -> String {
    program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &add(&fac_id("a"), &fac_id("b")),
        ),
    )
}
