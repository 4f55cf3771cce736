mod common;

use common::*;
use pintc::{ast, compile, tree, types, Error, SymbolTable};

fn err(source: &str) -> Error {
    compile(source).unwrap_err()
}

#[test]
fn simple_program_compiles() {
    assert!(compile(&simple_wain()).is_ok());
}

#[test]
fn arity_mismatch_is_rejected() {
    // sum takes two arguments, the call supplies one.
    let source = program(
        &[procedure(
            "sum",
            &["a", "b"],
            &add(&fac_id("a"), &fac_id("b")),
        )],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &call("sum", &[expr_of(&fac_id("a"))]),
        ),
    );
    assert!(matches!(
        err(&source),
        Error::ArityMismatch {
            expected: 2,
            supplied: 1,
            ..
        }
    ));
}

#[test]
fn pointer_addition_is_rejected() {
    let source = program(
        &[],
        &main_proc(
            &dcl_ptr("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &add(&fac_id("a"), &fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::TypeError(_)));
}

#[test]
fn duplicate_local_is_rejected() {
    let decls = dcls(&[
        (dcl_int("x"), Some("0")),
        (dcl_int("x"), Some("1")),
    ]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            "statements\n",
            &expr_of(&fac_id("x")),
        ),
    );
    assert!(matches!(err(&source), Error::DuplicateLocal(name) if name == "x"));
}

#[test]
fn parameter_shadowed_by_local_is_rejected() {
    let decls = dcls(&[(dcl_int("a"), Some("0"))]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::DuplicateLocal(name) if name == "a"));
}

#[test]
fn duplicate_procedure_is_rejected() {
    let source = program(
        &[
            procedure("f", &[], &expr_of(&fac_num("0"))),
            procedure("f", &[], &expr_of(&fac_num("1"))),
        ],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::DuplicateProcedure(name) if name == "f"));
}

#[test]
fn undeclared_identifier_is_rejected() {
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("c")),
        ),
    );
    assert!(matches!(err(&source), Error::UndeclaredIdentifier(name) if name == "c"));
}

#[test]
fn forward_call_is_rejected() {
    // g is declared after f but called from f.
    let source = program(
        &[
            procedure("f", &[], &call("g", &[])),
            procedure("g", &[], &expr_of(&fac_num("0"))),
        ],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::UndeclaredProcedure(name) if name == "g"));
}

#[test]
fn variable_shadowing_a_procedure_cannot_be_called() {
    // `a` is both a procedure and wain's first parameter; inside wain
    // the name refers to the variable.
    let source = program(
        &[procedure("a", &[], &expr_of(&fac_num("0")))],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &call("a", &[]),
        ),
    );
    assert!(matches!(err(&source), Error::ProcedureVariableClash(name) if name == "a"));
}

#[test]
fn wain_second_parameter_must_be_int() {
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_ptr("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::TypeError(_)));
}

#[test]
fn null_initializer_requires_pointer() {
    let decls = dcls(&[(dcl_int("x"), None)]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::TypeError(_)));
}

#[test]
fn number_initializer_requires_int() {
    let decls = dcls(&[(dcl_ptr("p"), Some("0"))]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::TypeError(_)));
}

#[test]
fn pointer_comparison_with_int_is_rejected() {
    let body = stmts(&[while_stmt(
        &test_gt(&expr_of(&fac_id("p")), &expr_of(&fac_num("0"))),
        "statements\n",
    )]);
    let decls = dcls(&[(dcl_ptr("p"), None)]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            &body,
            &expr_of(&fac_id("a")),
        ),
    );
    assert!(matches!(err(&source), Error::TypeError(_)));
}

#[test]
fn checking_twice_yields_the_same_annotations() {
    let root = tree::parse(&simple_wain()).unwrap();
    let mut program = ast::lower(&root).unwrap();
    let table = SymbolTable::build(&program).unwrap();

    types::check(&mut program, &table).unwrap();
    let first = format!("{program:?}");
    types::check(&mut program, &table).unwrap();
    assert_eq!(first, format!("{program:?}"));

    let rebuilt = SymbolTable::build(&program).unwrap();
    assert_eq!(table, rebuilt);
}
