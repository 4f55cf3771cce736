use color_print::cformat;

use crate::emit::Assembly;

/// Prints a colorized listing: pc and encoded bytes next to each
/// source line that produced an instruction.
pub fn print_listing(assembly: &Assembly) {
    let mut words = assembly.words.iter();
    for line in &assembly.lines {
        match &line.code {
            Some((_, pc)) => {
                let bin = match words.next() {
                    Some(inst) => {
                        let word = inst.encode();
                        format!(
                            "{:02X} {:02X} {:02X} {:02X}",
                            (word >> 24) & 0xff,
                            (word >> 16) & 0xff,
                            (word >> 8) & 0xff,
                            word & 0xff
                        )
                    }
                    None => cformat!("<r,s>?? ?? ?? ??</>"),
                };
                println!("{}", cformat!("<y>[{:08X}]</> {} | {}", pc, bin, line.text));
            }
            None => {
                println!("{:>23}| {}", "", cformat!("<g>{}</>", line.text));
            }
        }
    }
    println!("-----------------------+---------------------------------------------");
}
