//! Parsing command-line arguments.

use clap::{
    App,
    AppSettings::AllowNegativeNumbers,
    Arg, ArgMatches, Error, ErrorKind, Result as ClapResult,
};
use patsrc_lib::{load_state, Config, PatternMode, World};
use std::fs::File;
use std::io::BufReader;

/// View and dump frequencies are given in thousands of search steps.
pub(crate) const FREQ_MULT: u64 = 1000;

fn is_number(s: String) -> Result<(), String> {
    s.parse::<i32>()
        .map(|_| ())
        .map_err(|_| String::from("expected an integer"))
}

fn is_positive(s: String) -> Result<(), String> {
    match s.parse::<i32>() {
        Ok(n) if n > 0 => Ok(()),
        _ => Err(String::from("expected a positive integer")),
    }
}

/// The parsed command line: a ready-to-search world plus the frontend's own
/// settings.
pub(crate) struct Args {
    pub(crate) world: World,
    pub(crate) all: bool,
    pub(crate) quiet: bool,
    pub(crate) no_tui: bool,
    pub(crate) view_freq: u64,
    pub(crate) dump_freq: u64,
    pub(crate) dump_file: String,
    pub(crate) output_file: Option<String>,
    pub(crate) output_cols: i32,
}

/// The value of a flag that takes an optional coordinate: absent is 0,
/// bare is 1, with a value it is that value.
fn coord_flag(matches: &ArgMatches, name: &str) -> i32 {
    if !matches.is_present(name) {
        0
    } else {
        matches
            .value_of(name)
            .map_or(1, |v| v.parse().unwrap_or(1))
    }
}

impl Args {
    pub(crate) fn parse() -> ClapResult<Self> {
        let matches = App::new(env!("CARGO_PKG_NAME"))
            .version(env!("CARGO_PKG_VERSION"))
            .about(env!("CARGO_PKG_DESCRIPTION"))
            .long_about(
                "Searches for still lifes, oscillators and spaceships in \
                 Life-like cellular automata,\nusing the backtracking \
                 algorithm of David Bell's lifesrc.",
            )
            .setting(AllowNegativeNumbers)
            .arg(
                Arg::with_name("ROWS")
                    .help("Number of rows of the search rectangle")
                    .short("r")
                    .long("rows")
                    .takes_value(true)
                    .required_unless("LOAD")
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("COLS")
                    .help("Number of columns of the search rectangle")
                    .short("c")
                    .long("cols")
                    .takes_value(true)
                    .required_unless("LOAD")
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("GENS")
                    .help("Number of generations of the period")
                    .short("g")
                    .long("gens")
                    .takes_value(true)
                    .default_value("1")
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("TR")
                    .help("Translate rows between the last and first generation")
                    .long("tr")
                    .takes_value(true)
                    .validator(is_number),
            )
            .arg(
                Arg::with_name("TC")
                    .help("Translate columns between the last and first generation")
                    .long("tc")
                    .takes_value(true)
                    .validator(is_number),
            )
            .arg(
                Arg::with_name("FR")
                    .help("Flip rows between the last and first generation, from this column on")
                    .long("fr")
                    .min_values(0)
                    .max_values(1)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("FC")
                    .help("Flip columns between the last and first generation, from this row on")
                    .long("fc")
                    .min_values(0)
                    .max_values(1)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("FQ")
                    .help("Rotate a quarter turn between the last and first generation")
                    .long("fq"),
            )
            .arg(
                Arg::with_name("SR")
                    .help("Enforce row mirror symmetry, from this column on")
                    .long("sr")
                    .min_values(0)
                    .max_values(1)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("SC")
                    .help("Enforce column mirror symmetry, from this row on")
                    .long("sc")
                    .min_values(0)
                    .max_values(1)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("SP")
                    .help("Enforce symmetry around the central point")
                    .long("sp"),
            )
            .arg(
                Arg::with_name("SF")
                    .help("Enforce symmetry across the forward diagonal")
                    .long("sf"),
            )
            .arg(
                Arg::with_name("SB")
                    .help("Enforce symmetry across the backward diagonal")
                    .long("sb"),
            )
            .arg(
                Arg::with_name("NC")
                    .help("On cells must be near on cells of the previous N columns")
                    .long("nc")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("WC")
                    .help("Maximum width of the on span in any column of generation 0")
                    .long("wc")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("MT")
                    .help("Maximum total on cells in generation 0")
                    .long("mt")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("MC")
                    .help("Maximum on cells in any column of generation 0")
                    .long("mc")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("UR")
                    .help("Require at least one on cell in this row of generation 0")
                    .long("ur")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("UC")
                    .help("Require at least one on cell in this column of generation 0")
                    .long("uc")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("OW")
                    .help("Order the search to find wide objects first")
                    .long("ow"),
            )
            .arg(
                Arg::with_name("OG")
                    .help("Order the search over all generations of a column first")
                    .long("og"),
            )
            .arg(
                Arg::with_name("OM")
                    .help("Order the search from the middle column outwards")
                    .long("om"),
            )
            .arg(
                Arg::with_name("PARENTS")
                    .help("Only look for parents of the last generation")
                    .short("p")
                    .long("parents"),
            )
            .arg(
                Arg::with_name("ALL")
                    .help("Find all objects, including those with sub-periods")
                    .short("a")
                    .long("all"),
            )
            .arg(
                Arg::with_name("FOLLOW")
                    .help("Follow the average position of the previous column's cells")
                    .short("f")
                    .long("follow"),
            )
            .arg(
                Arg::with_name("FG")
                    .help("First try the state of the previous or next generation")
                    .long("fg"),
            )
            .arg(
                Arg::with_name("VIEW")
                    .help("View the search progress every N thousand steps")
                    .short("v")
                    .long("view")
                    .takes_value(true)
                    .default_value("10")
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("DUMP")
                    .help("Dump the search state every N thousand steps")
                    .short("d")
                    .long("dump")
                    .takes_value(true)
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("DUMPFILE")
                    .help("File to dump the search state to")
                    .long("dump-file")
                    .takes_value(true)
                    .default_value("patsrc.dmp"),
            )
            .arg(
                Arg::with_name("LOAD")
                    .help("Load a dumped search state")
                    .short("l")
                    .long("load")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("INIT")
                    .help("Read an initial pattern")
                    .short("i")
                    .long("init")
                    .takes_value(true)
                    .conflicts_with("LOAD"),
            )
            .arg(
                Arg::with_name("INITMODE")
                    .help("How much of the initial pattern to apply")
                    .long("init-mode")
                    .takes_value(true)
                    .possible_values(&["on", "all", "deep"])
                    .default_value("all"),
            )
            .arg(
                Arg::with_name("OUTPUT")
                    .help("Append found objects to this file")
                    .short("o")
                    .long("output")
                    .takes_value(true),
            )
            .arg(
                Arg::with_name("OUTPUTCOLS")
                    .help("Also write progress whenever N more columns become fully decided")
                    .long("output-cols")
                    .takes_value(true)
                    .requires("OUTPUT")
                    .validator(is_positive),
            )
            .arg(
                Arg::with_name("RULE")
                    .help("Rule of the cellular automaton, e.g. B3/S23 or 3/23")
                    .short("R")
                    .long("rule")
                    .takes_value(true)
                    .default_value("B3/S23"),
            )
            .arg(
                Arg::with_name("QUIET")
                    .help("Do not print progress")
                    .short("q")
                    .long("quiet"),
            )
            .arg(
                Arg::with_name("NOTUI")
                    .help("Search without the curses interface")
                    .short("n")
                    .long("no-tui"),
            )
            .get_matches_safe()?;

        let world = if let Some(path) = matches.value_of("LOAD") {
            let file = File::open(path)
                .map_err(|e| Error::with_description(&e.to_string(), ErrorKind::Io))?;
            load_state(BufReader::new(file)).map_err(|e| {
                Error::with_description(
                    &format!("cannot load {}: {}", path, e),
                    ErrorKind::InvalidValue,
                )
            })?
        } else {
            let rows = matches.value_of("ROWS").unwrap().parse().unwrap();
            let cols = matches.value_of("COLS").unwrap().parse().unwrap();
            let gens = matches.value_of("GENS").unwrap().parse().unwrap();

            let config = Config::new(rows, cols, gens)
                .set_translate(
                    matches.value_of("TR").map_or(0, |v| v.parse().unwrap()),
                    matches.value_of("TC").map_or(0, |v| v.parse().unwrap()),
                )
                .set_flip_rows(coord_flag(&matches, "FR"))
                .set_flip_cols(coord_flag(&matches, "FC"))
                .set_flip_quads(matches.is_present("FQ"))
                .set_row_sym(coord_flag(&matches, "SR"))
                .set_col_sym(coord_flag(&matches, "SC"))
                .set_point_sym(matches.is_present("SP"))
                .set_fwd_sym(matches.is_present("SF"))
                .set_bwd_sym(matches.is_present("SB"))
                .set_near_cols(matches.value_of("NC").map_or(0, |v| v.parse().unwrap()))
                .set_col_width(matches.value_of("WC").map_or(0, |v| v.parse().unwrap()))
                .set_max_count(matches.value_of("MT").map_or(0, |v| v.parse().unwrap()))
                .set_col_cells(matches.value_of("MC").map_or(0, |v| v.parse().unwrap()))
                .set_use_row(matches.value_of("UR").map_or(0, |v| v.parse().unwrap()))
                .set_use_col(matches.value_of("UC").map_or(0, |v| v.parse().unwrap()))
                .set_order_wide(matches.is_present("OW"))
                .set_order_gens(matches.is_present("OG"))
                .set_order_middle(matches.is_present("OM"))
                .set_parent(matches.is_present("PARENTS"))
                .set_all_objects(matches.is_present("ALL"))
                .set_follow(matches.is_present("FOLLOW"))
                .set_follow_gens(matches.is_present("FG"))
                .set_rule_string(matches.value_of("RULE").unwrap());

            let mut world = config.world().map_err(|e| {
                Error::with_description(&format!("invalid search: {}", e), ErrorKind::InvalidValue)
            })?;

            if let Some(path) = matches.value_of("INIT") {
                let mode = match matches.value_of("INITMODE").unwrap() {
                    "on" => PatternMode::OnOnly,
                    "deep" => PatternMode::Deep,
                    _ => PatternMode::All,
                };
                let file = File::open(path)
                    .map_err(|e| Error::with_description(&e.to_string(), ErrorKind::Io))?;
                world.read_pattern(BufReader::new(file), mode).map_err(|e| {
                    Error::with_description(
                        &format!("cannot read {}: {}", path, e),
                        ErrorKind::InvalidValue,
                    )
                })?;
            }

            world
        };

        let view_freq = matches
            .value_of("VIEW")
            .map_or(10, |v| v.parse().unwrap_or(10)) as u64
            * FREQ_MULT;
        let dump_freq = matches
            .value_of("DUMP")
            .map_or(0, |v| v.parse().unwrap_or(0)) as u64
            * FREQ_MULT;

        Ok(Args {
            world,
            all: matches.is_present("ALL"),
            quiet: matches.is_present("QUIET"),
            no_tui: matches.is_present("NOTUI"),
            view_freq,
            dump_freq,
            dump_file: matches.value_of("DUMPFILE").unwrap().to_string(),
            output_file: matches.value_of("OUTPUT").map(String::from),
            output_cols: matches
                .value_of("OUTPUTCOLS")
                .map_or(0, |v| v.parse().unwrap_or(0)),
        })
    }
}
