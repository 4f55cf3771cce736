pub mod ast;
pub mod codegen;
pub mod error;
pub mod symbols;
pub mod tree;
pub mod types;

pub use error::Error;
pub use symbols::SymbolTable;

/// Full front-end pipeline: flattened parse tree in, MR32 assembly
/// text out. The first semantic error aborts with no output.
pub fn compile(source: &str) -> Result<String, Error> {
    let root = tree::parse(source)?;
    let mut program = ast::lower(&root)?;
    let table = SymbolTable::build(&program)?;
    types::check(&mut program, &table)?;
    codegen::generate(&program)
}
