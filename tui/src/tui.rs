//! The curses interface.
//!
//! The engine is stepped in chunks of the view frequency; between chunks
//! the keyboard is polled without blocking, state dumps and progress
//! writes happen on their configured cadences, and the screen is redrawn.

use crate::args::Args;
use crate::{append_object, dump_to_file};
use pancurses::{ColorPair, Input, Window};
use patsrc_lib::{Status, World};
use std::time::{Duration, Instant};

struct SearchWindow {
    gen: i32,
    searching: bool,
    start_time: Option<Instant>,
    timing: Duration,

    window: Window,
    top_bar: Window,
    bottom_bar: Window,
    world_win: Window,
}

impl SearchWindow {
    fn new() -> Self {
        let window = pancurses::initscr();
        let (win_y, win_x) = window.get_max_yx();
        let top_bar = window.subwin(1, win_x, 0, 0).unwrap();
        let bottom_bar = window.subwin(1, win_x, win_y - 1, 0).unwrap();
        let world_win = window.subwin(win_y - 2, win_x, 1, 0).unwrap();

        pancurses::start_color();
        pancurses::init_pair(1, pancurses::COLOR_BLACK, pancurses::COLOR_WHITE);
        top_bar.bkgdset(ColorPair(1));
        bottom_bar.bkgdset(ColorPair(1));
        pancurses::curs_set(0);
        pancurses::noecho();
        window.keypad(true);
        window.nodelay(false);

        SearchWindow {
            gen: 0,
            searching: false,
            start_time: None,
            timing: Default::default(),
            window,
            top_bar,
            bottom_bar,
            world_win,
        }
    }

    fn update(&self, world: &World, found: u64) {
        let config = world.config();

        self.world_win.erase();
        self.world_win.mvprintw(0, 0, world.display_gen(self.gen));
        self.world_win.refresh();

        let status_str = match world.status() {
            Status::Found => "Found object.",
            Status::NotExist => "No such object.",
            Status::Ok => {
                if self.searching {
                    "Searching..."
                } else {
                    "Paused."
                }
            }
        };
        self.top_bar.erase();
        self.top_bar.mvprintw(
            0,
            0,
            format!(
                "{} {}x{}x{} rule {}  gen {}  cells {}",
                status_str,
                config.row_max,
                config.col_max,
                config.gen_max,
                world.rule().rule_string(),
                self.gen,
                world.count_gen(self.gen),
            ),
        );
        if found > 0 {
            self.top_bar.printw(format!("  objects {}", found));
        }
        if !self.searching {
            self.top_bar.printw(format!("  time {:.2?}", self.timing));
        }
        self.top_bar.refresh();

        let help = match world.status() {
            Status::Found => "[space] next object  [w]rite  [d]ump  [arrows] gen  [q]uit",
            Status::NotExist => "[w]rite  [d]ump  [arrows] gen  [q]uit",
            Status::Ok => {
                if self.searching {
                    "[space] pause  [q]uit"
                } else {
                    "[space] search  [w]rite  [d]ump  [arrows] gen  [q]uit"
                }
            }
        };
        self.bottom_bar.erase();
        self.bottom_bar.mvprintw(0, 0, help);
        self.bottom_bar.refresh();
    }

    fn resize(&mut self) {
        pancurses::resize_term(0, 0);
        let (win_y, win_x) = self.window.get_max_yx();
        self.top_bar = self.window.subwin(1, win_x, 0, 0).unwrap();
        self.bottom_bar = self.window.subwin(1, win_x, win_y - 1, 0).unwrap();
        self.world_win = self.window.subwin(win_y - 2, win_x, 1, 0).unwrap();
    }

    fn flash(&self, message: &str) {
        self.bottom_bar.erase();
        self.bottom_bar.mvprintw(0, 0, message);
        self.bottom_bar.refresh();
    }

    fn quit(&self) -> bool {
        self.window.nodelay(false);
        self.flash("Really quit? [y/N]");
        matches!(
            self.window.getch(),
            Some(Input::Character('y')) | Some(Input::Character('Y'))
        )
    }

    fn pause(&mut self) {
        self.searching = false;
        if let Some(instant) = self.start_time.take() {
            self.timing += instant.elapsed();
        }
        self.window.nodelay(false);
    }

    fn start(&mut self) {
        self.searching = true;
        self.start_time = Some(Instant::now());
        self.window.nodelay(true);
    }
}

pub(crate) fn tui(mut args: Args) -> i32 {
    let mut win = SearchWindow::new();
    let mut found: u64 = 0;
    let mut last_cols: i32 = 0;
    let mut since_dump: u64 = 0;
    let write_file = args
        .output_file
        .clone()
        .unwrap_or_else(|| String::from("patsrc.out"));

    win.update(&args.world, found);

    loop {
        match win.window.getch() {
            Some(Input::Character('q')) | Some(Input::Character('Q')) => {
                // An unfinished search wants confirmation.
                if args.world.status() == Status::Ok {
                    win.pause();
                    win.update(&args.world, found);
                    if win.quit() {
                        break;
                    }
                    win.update(&args.world, found);
                } else {
                    break;
                }
            }
            Some(Input::KeyRight) | Some(Input::KeyNPage) => {
                win.gen = (win.gen + 1).rem_euclid(args.world.config().gen_max);
                win.update(&args.world, found);
            }
            Some(Input::KeyLeft) | Some(Input::KeyPPage) => {
                win.gen = (win.gen - 1).rem_euclid(args.world.config().gen_max);
                win.update(&args.world, found);
            }
            Some(Input::Character(' ')) | Some(Input::Character('\n')) | Some(Input::KeyEnter) => {
                if win.searching {
                    win.pause();
                } else if args.world.status() != Status::NotExist {
                    win.start();
                }
                win.update(&args.world, found);
            }
            Some(Input::Character('w')) => {
                match append_object(&args.world, &write_file, win.gen) {
                    Ok(()) => win.flash(&format!("\"{}\" written", write_file)),
                    Err(e) => win.flash(&format!("cannot write \"{}\": {}", write_file, e)),
                }
            }
            Some(Input::Character('d')) => {
                match dump_to_file(&args.world, &args.dump_file) {
                    Ok(()) => win.flash(&format!("state dumped to \"{}\"", args.dump_file)),
                    Err(e) => win.flash(&format!("cannot dump \"{}\": {}", args.dump_file, e)),
                }
            }
            Some(Input::KeyResize) => {
                win.resize();
                win.update(&args.world, found);
            }
            None => match args.world.search(Some(args.view_freq)) {
                Status::Ok => {
                    since_dump += args.view_freq;
                    if args.dump_freq > 0 && since_dump >= args.dump_freq {
                        since_dump = 0;
                        let _ = dump_to_file(&args.world, &args.dump_file);
                    }
                    if args.output_cols > 0 {
                        let cols = args.world.full_columns();
                        if cols >= last_cols + args.output_cols {
                            last_cols = cols;
                            let _ = append_object(&args.world, &write_file, 0);
                        }
                        if last_cols > cols {
                            last_cols = cols;
                        }
                    }
                    win.update(&args.world, found);
                }
                status => {
                    if status == Status::Found {
                        found += 1;
                        if args.output_file.is_some() {
                            let _ = append_object(&args.world, &write_file, 0);
                        }
                    }
                    if args.dump_freq > 0 {
                        let _ = dump_to_file(&args.world, &args.dump_file);
                    }
                    win.pause();
                    win.update(&args.world, found);
                }
            },
            _ => {}
        }
    }

    pancurses::endwin();
    print!("{}", args.world.display_gen(win.gen));
    0
}
