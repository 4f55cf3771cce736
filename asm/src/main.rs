use clap::Parser;
use std::io::Write;

use mrasm::{assemble, dump, Error};

#[derive(Debug, clap::Parser)]
#[clap(author, version, about)]
struct Args {
    /// Input files
    #[clap(default_value = "main.asm")]
    input: Vec<String>,

    /// Output binary image
    #[clap(short, long, default_value = "main.bin")]
    output: String,

    /// Print a colorized listing after assembly
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    let args = Args::parse();
    if let Err(err) = run(&args) {
        eprintln!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    let mut source = String::new();
    for path in &args.input {
        let text =
            std::fs::read_to_string(path).map_err(|err| Error::FileOpen(path.clone(), err))?;
        source.push_str(&text);
        if !text.ends_with('\n') {
            source.push('\n');
        }
    }

    let assembly = assemble(&source)?;

    // The image is written only after both passes succeeded.
    let mut file = std::fs::File::create(&args.output)
        .map_err(|err| Error::FileCreate(args.output.clone(), err))?;
    file.write_all(&assembly.to_bytes())
        .map_err(|err| Error::FileWrite(args.output.clone(), err))?;

    // Symbol table on the diagnostic channel, ascending label order.
    for (name, pc) in assembly.labels.sorted() {
        eprintln!("{name} {pc}");
    }

    if args.dump {
        dump::print_listing(&assembly);
    }
    Ok(())
}
