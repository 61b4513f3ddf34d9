mod args;
mod tui;

use args::Args;
use patsrc_lib::{Error, Status, World};
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::process::exit;

/// Dumps the engine state to the given file.
fn dump_to_file(world: &World, path: &str) -> Result<(), Error> {
    let file = File::create(path)?;
    world.dump_state(&mut BufWriter::new(file))
}

/// Appends one generation's object to the given file.
fn append_object(world: &World, path: &str, gen: i32) -> Result<(), Error> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    world.write_gen(&mut BufWriter::new(file), gen, true)
}

/// Runs the search without the curses interface.
///
/// Without an output file the first object is printed and the program
/// stops (all of them with `--all`); with one, every object is appended
/// to it until the search space is exhausted.
fn run_headless(mut args: Args) -> i32 {
    let mut found: u64 = 0;
    let mut since_dump: u64 = 0;
    let mut last_cols: i32 = 0;

    loop {
        match args.world.search(Some(args.view_freq)) {
            Status::Ok => {
                since_dump += args.view_freq;
                if args.dump_freq > 0 && since_dump >= args.dump_freq {
                    since_dump = 0;
                    if let Err(e) = dump_to_file(&args.world, &args.dump_file) {
                        eprintln!("cannot dump \"{}\": {}", args.dump_file, e);
                    }
                }
                if args.output_cols > 0 {
                    if let Some(path) = &args.output_file {
                        let cols = args.world.full_columns();
                        if cols >= last_cols + args.output_cols {
                            last_cols = cols;
                            let _ = append_object(&args.world, path, 0);
                        }
                        if last_cols > cols {
                            last_cols = cols;
                        }
                    }
                }
            }
            Status::Found => {
                found += 1;
                match &args.output_file {
                    Some(path) => {
                        if let Err(e) = append_object(&args.world, path, 0) {
                            eprintln!("cannot write \"{}\": {}", path, e);
                            return 1;
                        }
                        if !args.quiet {
                            eprintln!("Object {} found.", found);
                        }
                    }
                    None => {
                        print!("{}", args.world.display_gen(0));
                        if !args.all {
                            return 0;
                        }
                        println!();
                    }
                }
            }
            Status::NotExist => break,
        }
    }

    if args.dump_freq > 0 {
        let _ = dump_to_file(&args.world, &args.dump_file);
    }

    if found == 0 {
        eprintln!("No objects found.");
        return 1;
    }
    if let Some(path) = &args.output_file {
        if !args.quiet {
            println!(
                "Search completed, \"{}\" contains {} object{}.",
                path,
                found,
                if found == 1 { "" } else { "s" }
            );
        }
    }
    0
}

fn main() {
    let args = Args::parse().unwrap_or_else(|e| e.exit());
    let code = if args.no_tui || args.quiet {
        run_headless(args)
    } else {
        tui::tui(args)
    };
    exit(code);
}
