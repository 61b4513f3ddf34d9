/*!
__patsrc__ is an exhaustive searcher for small periodic patterns
(still lifes, oscillators and spaceships) in two-state Life-like
cellular automata, using the backtracking, constraint-propagating
algorithm of David Bell's lifesrc.

The search space is every cell of every generation of a bounded
rectangle. A configuration is reported when its generation 0 evolves
through the requested period and maps onto itself under the configured
translation, flips and symmetries. Pruning constraints (population
caps, column caps and widths, near-column counts, sub-period
rejection) cut the space down.

This is the library; there is also a command-line tool with a curses
interface in the `patsrc-tui` crate.

# Example

Finds a blinker.

```rust
use patsrc_lib::{Config, Status};

// A 3 by 3 rectangle searched over 2 generations.
let config = Config::new(3, 3, 2);

let mut world = config.world().unwrap();

if let Status::Found = world.search(None) {
    print!("{}", world.display_gen(0));
}
```
*/

mod cells;
mod config;
mod error;
mod pattern;
mod rules;
mod save;
mod search;
mod world;

pub use cells::State;
pub use config::{Config, TRANS_MAX};
pub use error::Error;
pub use pattern::PatternMode;
pub use rules::Rule;
pub use save::{load_state, DUMP_VERSION};
pub use search::Status;
pub use world::World;
