use clap::Parser;
use std::io::Write;

use pintc::{ast, codegen, tree, types, Error, SymbolTable};

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input parse-tree file
    #[clap(default_value = "main.tree")]
    input: String,

    /// Output assembly file
    #[clap(short, long, default_value = "main.asm")]
    output: String,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let source = std::fs::read_to_string(&args.input)
        .map_err(|err| Error::FileOpen(args.input.clone(), err))?;

    let root = tree::parse(&source)?;
    let mut program = ast::lower(&root)?;
    let table = SymbolTable::build(&program)?;
    types::check(&mut program, &table)?;
    let assembly = codegen::generate(&program)?;

    if args.verbose {
        for procedure in &program.procedures {
            eprintln!(
                "{}: {} parameter(s), {} local(s)",
                procedure.name,
                procedure.params.len(),
                procedure.decls.len()
            );
        }
        eprintln!("{} lines emitted", assembly.lines().count());
    }

    // Written only once the whole pipeline succeeded.
    let mut file = std::fs::File::create(&args.output)
        .map_err(|err| Error::FileWrite(args.output.clone(), err))?;
    file.write_all(assembly.as_bytes())
        .map_err(|err| Error::FileWrite(args.output.clone(), err))?;
    Ok(())
}
