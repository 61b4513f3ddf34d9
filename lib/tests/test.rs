use patsrc_lib::{load_state, Config, Error, PatternMode, State, Status};

#[test]
fn blinker() -> Result<(), Error> {
    let mut world = Config::new(3, 3, 2).world()?;
    assert_eq!(world.search(None), Status::Found);
    assert_eq!(world.display_gen(0), ".O.\n.O.\n.O.\n");
    assert_eq!(world.display_gen(1), "...\nOOO\n...\n");
    Ok(())
}

#[test]
fn next_object_and_exhaustion() -> Result<(), Error> {
    let mut world = Config::new(3, 3, 2).world()?;
    assert_eq!(world.search(None), Status::Found);
    let first = world.display_gen(0);
    assert_eq!(world.search(None), Status::Found);
    assert_ne!(world.display_gen(0), first);
    assert_eq!(world.search(None), Status::NotExist);
    // Once exhausted, the answer stays.
    assert_eq!(world.search(None), Status::NotExist);
    Ok(())
}

#[test]
fn glider() -> Result<(), Error> {
    let mut world = Config::new(4, 4, 4).set_translate(1, 1).world()?;
    assert_eq!(world.search(None), Status::Found);
    assert_eq!(world.count_gen(0), 5);
    Ok(())
}

#[test]
fn no_one_by_one_still_life() -> Result<(), Error> {
    let mut world = Config::new(1, 1, 1).world()?;
    assert_eq!(world.search(None), Status::NotExist);
    Ok(())
}

#[test]
fn point_symmetry() -> Result<(), Error> {
    let mut world = Config::new(5, 5, 1)
        .set_point_sym(true)
        .set_max_count(5)
        .world()?;
    assert_eq!(world.search(None), Status::Found);
    assert!(world.cell_count() > 0 && world.cell_count() <= 5);
    for row in 1..=5 {
        for col in 1..=5 {
            assert_eq!(
                world.get_cell_state(row, col, 0),
                world.get_cell_state(6 - row, 6 - col, 0),
                "asymmetry at {} {}",
                row,
                col
            );
        }
    }
    Ok(())
}

#[test]
fn sub_period_rejection() -> Result<(), Error> {
    // Nothing in 3 by 3 has true period 4, so without all_objects the
    // still lifes and blinkers are all rejected.
    let mut world = Config::new(3, 3, 4).world()?;
    assert_eq!(world.search(None), Status::NotExist);

    let mut world = Config::new(3, 3, 4).set_all_objects(true).world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}

#[test]
fn parent_search() -> Result<(), Error> {
    let mut world = Config::new(3, 3, 2).set_parent(true).world()?;
    world.read_pattern("...\nOOO\n...\n".as_bytes(), PatternMode::All)?;
    assert_eq!(world.search(None), Status::Found);
    // The last generation is the one that was pinned; generation 0 is one
    // of its predecessors.
    assert_eq!(world.display_gen(1), "...\nOOO\n...\n");
    assert!(world.cell_count() > 0);
    Ok(())
}

#[test]
fn required_row() -> Result<(), Error> {
    let mut world = Config::new(4, 4, 1).set_use_row(4).world()?;
    assert_eq!(world.search(None), Status::Found);
    let bottom = (1..=4).any(|col| world.get_cell_state(4, col, 0) == State::On);
    assert!(bottom);
    Ok(())
}

#[test]
fn population_cap() -> Result<(), Error> {
    // No still life has fewer than four cells.
    let mut world = Config::new(5, 5, 1).set_max_count(3).world()?;
    assert_eq!(world.search(None), Status::NotExist);

    let mut world = Config::new(5, 5, 1).set_max_count(4).world()?;
    assert_eq!(world.search(None), Status::Found);
    assert_eq!(world.cell_count(), 4);
    Ok(())
}

#[test]
fn column_caps() -> Result<(), Error> {
    // A still life cannot keep to one on cell per column.
    let mut world = Config::new(5, 5, 1).set_col_cells(1).world()?;
    assert_eq!(world.search(None), Status::NotExist);

    let mut world = Config::new(5, 5, 1).set_col_cells(2).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut world = Config::new(5, 5, 1).set_col_width(2).world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}

#[test]
fn near_columns() -> Result<(), Error> {
    let mut world = Config::new(5, 5, 1).set_near_cols(2).world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}

#[test]
fn selector_modes() -> Result<(), Error> {
    let mut world = Config::new(4, 4, 2).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut world = Config::new(4, 4, 2).set_follow(true).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut world = Config::new(4, 4, 2).set_follow_gens(true).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut world = Config::new(4, 4, 2)
        .set_order_gens(true)
        .set_order_middle(true)
        .set_order_wide(true)
        .world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}

#[test]
fn row_flip_at_wrap() -> Result<(), Error> {
    let mut world = Config::new(3, 3, 2).set_flip_rows(1).world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}

#[test]
fn config_conflicts_are_rejected() {
    assert_eq!(
        Config::new(4, 3, 1).set_fwd_sym(true).world().unwrap_err(),
        Error::SquareWorld
    );
    assert_eq!(
        Config::new(3, 3, 1)
            .set_point_sym(true)
            .set_row_sym(1)
            .world()
            .unwrap_err(),
        Error::ConflictingSymmetries
    );
    assert_eq!(
        Config::new(3, 3, 2)
            .set_parent(true)
            .set_translate(1, 0)
            .world()
            .unwrap_err(),
        Error::ParentTransform
    );
    assert_eq!(
        Config::new(3, 3, 2)
            .set_translate(0, 1)
            .set_flip_cols(1)
            .world()
            .unwrap_err(),
        Error::ConflictingTransforms
    );
    assert_eq!(
        Config::new(0, 3, 1).world().unwrap_err(),
        Error::NonPositive
    );
}

#[test]
fn dump_load_round_trip() -> Result<(), Error> {
    let mut world = Config::new(4, 4, 2).set_translate(0, 1).world()?;
    assert_eq!(world.search(Some(5)), Status::Ok);

    let mut first = Vec::new();
    world.dump_state(&mut first)?;

    let mut reloaded = load_state(&first[..])?;
    let mut second = Vec::new();
    reloaded.dump_state(&mut second)?;
    assert_eq!(first, second);

    // Both worlds continue to the same conclusion.
    let a = world.search(None);
    let b = reloaded.search(None);
    assert_eq!(a, b);
    assert_eq!(world.display_gen(0), reloaded.display_gen(0));
    Ok(())
}

#[test]
fn dump_after_found_resumes_to_next_object() -> Result<(), Error> {
    let mut world = Config::new(3, 3, 2).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut dump = Vec::new();
    world.dump_state(&mut dump)?;

    let mut reloaded = load_state(&dump[..])?;
    assert_eq!(reloaded.status(), Status::Found);
    assert_eq!(reloaded.display_gen(0), world.display_gen(0));

    assert_eq!(reloaded.search(None), Status::Found);
    assert_ne!(reloaded.display_gen(0), world.display_gen(0));
    assert_eq!(reloaded.search(None), Status::NotExist);
    Ok(())
}

#[test]
fn write_read_round_trip() -> Result<(), Error> {
    let mut world = Config::new(2, 2, 1).world()?;
    assert_eq!(world.search(None), Status::Found);

    let mut object = Vec::new();
    world.write_gen(&mut object, 0, false)?;
    assert_eq!(String::from_utf8(object.clone()).unwrap(), "**\n**\n");

    // Feeding the object back fully determines the world, so the very
    // first search step reports it found.
    let mut reread = Config::new(2, 2, 1).world()?;
    reread.read_pattern(&object[..], PatternMode::All)?;
    assert_eq!(reread.search(Some(1)), Status::Found);
    Ok(())
}

#[test]
fn nonstandard_rule() -> Result<(), Error> {
    // Seeds is explosive; a 2 by 2 period 2 oscillator exists in it.
    let mut world = Config::new(2, 2, 2).set_rule_string("B2/S").world()?;
    assert_eq!(world.search(None), Status::Found);
    Ok(())
}
