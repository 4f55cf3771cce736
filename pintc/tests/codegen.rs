mod common;

use common::*;
use pintc::compile;

/// The runtime entry points the generated code jumps to. A real build
/// links the runtime in front of the image; a no-op stand-in is enough
/// to assemble.
const RUNTIME_STUB: &str = "print: jr $31\ninit: jr $31\nnew: jr $31\ndelete: jr $31\n";

fn instruction_lines(text: &str) -> usize {
    text.lines()
        .filter(|line| {
            let line = line.trim();
            !line.is_empty() && !line.ends_with(':')
        })
        .count()
}

#[test]
fn generated_assembly_assembles() {
    let decls = dcls(&[(dcl_int("x"), Some("0"))]);
    let body = stmts(&[
        while_stmt(
            &test_gt(&expr_of(&fac_id("a")), &expr_of(&fac_num("0"))),
            &stmts(&[
                assign("x", &add(&fac_id("x"), &fac_id("b"))),
                assign("a", &sub(&fac_id("a"), &fac_num("1"))),
            ]),
        ),
        if_stmt(
            &test_eq(&expr_of(&fac_id("x")), &expr_of(&fac_num("0"))),
            &stmts(&[println_stmt(&expr_of(&fac_id("a")))]),
            &stmts(&[println_stmt(&expr_of(&fac_id("x")))]),
        ),
    ]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            &body,
            &expr_of(&fac_id("x")),
        ),
    );

    let asm = compile(&source).unwrap();
    let full = format!("{asm}{RUNTIME_STUB}");
    let assembly = mrasm::assemble(&full).unwrap();
    assert_eq!(assembly.to_bytes().len(), 4 * instruction_lines(&full));
}

#[test]
fn module_prologue_and_entry_label() {
    let asm = compile(&simple_wain()).unwrap();
    let lines: Vec<&str> = asm.lines().collect();
    assert_eq!(
        &lines[..6],
        &["lis $4", ".word 4", "lis $11", ".word 1", "lis $10", ".word print"]
    );
    assert!(lines.contains(&"wain:"));
    assert_eq!(*lines.last().unwrap(), "jr $31");
}

#[test]
fn int_first_parameter_zeroes_the_length_register() {
    let asm = compile(&simple_wain()).unwrap();
    assert!(asm.contains("add $2, $0, $0"));

    // With an array parameter, $2 carries a real length.
    let source = program(
        &[],
        &main_proc(
            &dcl_ptr("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("b")),
        ),
    );
    let asm = compile(&source).unwrap();
    assert!(!asm.contains("add $2, $0, $0"));
}

#[test]
fn entry_comes_first_then_procedures_in_reverse_order() {
    let source = program(
        &[
            procedure("first", &[], &expr_of(&fac_num("1"))),
            procedure("second", &[], &expr_of(&fac_num("2"))),
        ],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            "dcls\n",
            "statements\n",
            &expr_of(&fac_id("a")),
        ),
    );
    let asm = compile(&source).unwrap();
    let wain = asm.find("wain:").unwrap();
    let second = asm.find("Fsecond:").unwrap();
    let first = asm.find("Ffirst:").unwrap();
    assert!(wain < second && second < first);
}

#[test]
fn procedure_parameters_sit_above_the_frame_pointer() {
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
            &call(
                "sum",
                &[expr_of(&fac_id("a")), expr_of(&fac_id("b"))],
            ),
        ),
    );
    let asm = compile(&source).unwrap();
    let body = &asm[asm.find("Fsum:").unwrap()..];
    // First parameter at 8($29), second at 4($29).
    assert!(body.contains("lw $3, 8($29)"));
    assert!(body.contains("lw $3, 4($29)"));
    // The two-argument call pops 8 bytes in one step.
    assert!(asm.contains("multu $4, $5"));
}

#[test]
fn control_flow_labels_are_unique() {
    let decls = dcls(&[(dcl_ptr("p"), None)]);
    let body = stmts(&[
        if_stmt(
            &test_eq(&expr_of(&fac_id("a")), &expr_of(&fac_num("0"))),
            "statements\n",
            "statements\n",
        ),
        if_stmt(
            &test_eq(&expr_of(&fac_id("b")), &expr_of(&fac_num("0"))),
            "statements\n",
            "statements\n",
        ),
        while_stmt(
            &test_gt(&expr_of(&fac_id("a")), &expr_of(&fac_num("0"))),
            &stmts(&[assign("a", &sub(&fac_id("a"), &fac_num("1")))]),
        ),
        delete_stmt(&expr_of(&fac_id("p"))),
    ]);
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
    let asm = compile(&source).unwrap();
    for label in [
        "true0:", "endif0:", "true1:", "endif1:", "loop0:", "done0:", "skipDelete0:",
    ] {
        assert_eq!(asm.matches(label).count(), 1, "missing or duplicated {label}");
    }

    let full = format!("{asm}{RUNTIME_STUB}");
    assert!(mrasm::assemble(&full).is_ok());
}

#[test]
fn null_is_one_and_pointer_difference_scales() {
    let decls = dcls(&[(dcl_ptr("p"), None), (dcl_ptr("q"), None)]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            "statements\n",
            &sub(&fac_id("p"), &fac_id("q")),
        ),
    );
    let asm = compile(&source).unwrap();
    // NULL initializers store the $11 sentinel.
    assert_eq!(asm.matches("sw $11, 0($30)").count(), 2);
    // Pointer difference divides by the word size.
    assert!(asm.contains("div $3, $4"));
}

#[test]
fn pointer_comparisons_are_unsigned() {
    let decls = dcls(&[(dcl_ptr("p"), None), (dcl_ptr("q"), None)]);
    let body = stmts(&[while_stmt(
        &test_gt(&expr_of(&fac_id("p")), &expr_of(&fac_id("q"))),
        "statements\n",
    )]);
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
    let asm = compile(&source).unwrap();
    assert!(asm.contains("sltu $3, $3, $5"));
    assert!(!asm.contains("slt $3, $3, $5\n"));
}

#[test]
fn allocation_failure_maps_to_null() {
    let decls = dcls(&[(dcl_ptr("p"), None)]);
    let body = stmts(&[
        assign_new("p", &expr_of(&fac_id("a"))),
        delete_stmt(&expr_of(&fac_id("p"))),
    ]);
    let source = program(
        &[],
        &main_proc(
            &dcl_int("a"),
            &dcl_int("b"),
            &decls,
            &body,
            &expr_of(&fac_id("b")),
        ),
    );
    let asm = compile(&source).unwrap();
    assert!(asm.contains(".word new"));
    assert!(asm.contains("bne $3, $0, 1"));

    let full = format!("{asm}{RUNTIME_STUB}");
    assert!(mrasm::assemble(&full).is_ok());
}

/// `name = new int[size];`
fn assign_new(name: &str, size: &str) -> String {
    let rhs = expr_of(&format!(
        "factor NEW INT LBRACK expr RBRACK\nNEW new\nINT int\nLBRACK [\n{size}RBRACK ]\n"
    ));
    assign(name, &rhs)
}
