use arch::profile::Profile;
use color_print::cprintln;
use msasm::{listing, table::Table, Error};
use std::{
    fs::File,
    io::{Read, Write},
};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input script
    #[clap(default_value = "main.txt")]
    input: String,

    /// Output image
    #[clap(short, long, default_value = "main.bin")]
    output: String,

    /// Compile for the Mini Maestro 12, 18 and 24
    #[clap(long)]
    mini: bool,

    /// Dump disassembled image
    #[clap(short, long)]
    dump: bool,

    /// Write a listing file
    #[clap(short, long)]
    listing: Option<String>,

    /// Write the subroutine table as YAML
    #[clap(short, long)]
    table: Option<String>,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    println!("Maestro Script Assembler by kanade-k-1228");

    let profile = Profile::from_mini(args.mini);

    println!("1. Read Source");
    println!("  < {}", args.input);
    let source = read_source(&args.input).unwrap_or_else(|e| fail(e));

    println!("2. Compile ({profile} Maestro)");
    let program = match msasm::compile(&source, &args.input, profile) {
        Ok(program) => program,
        Err(diag) => {
            let lines: Vec<String> = source
                .split('\n')
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect();
            diag.print_diag(&lines);
            std::process::exit(1);
        }
    };
    let image = program.byte_list();
    println!(
        "  {} bytes, {} subroutines, CRC 0x{:04X}",
        image.len(),
        program.subroutine_commands().len(),
        program.crc()
    );

    println!("3. Write Output");
    println!("  > {}", args.output);
    if let Err(e) = write_file(&args.output, &image) {
        fail(e);
    }

    if let Some(path) = &args.listing {
        println!("  > {}", path);
        if let Err(e) = write_file(path, listing::render(&program).as_bytes()) {
            fail(e);
        }
    }

    if let Some(path) = &args.table {
        println!("  > {}", path);
        let written = Table::new(&program)
            .to_yaml()
            .and_then(|yaml| write_file(path, yaml.as_bytes()));
        if let Err(e) = written {
            fail(e);
        }
    }

    if args.dump {
        listing::print_dump(&program);
    }
}

fn read_source(path: &str) -> Result<String, Error> {
    let mut file = File::open(path).map_err(|e| Error::FileOpen(path.to_string(), e))?;
    let mut source = String::new();
    file.read_to_string(&mut source)
        .map_err(|e| Error::FileRead(path.to_string(), e))?;
    Ok(source)
}

fn write_file(path: &str, bytes: &[u8]) -> Result<(), Error> {
    let mut file = File::create(path).map_err(|e| Error::FileCreate(path.to_string(), e))?;
    file.write_all(bytes)
        .map_err(|e| Error::FileWrite(path.to_string(), e))
}

fn fail(error: Error) -> ! {
    cprintln!("<r,s>error</>: {}", error);
    if let Some(source) = std::error::Error::source(&error) {
        cprintln!("  <s>caused by</>: {}", source);
    }
    std::process::exit(1);
}
