use chessboard_bridge::{
    BoardError, CellAddress, Coordinate, Port, PositionMap, UciMove, LED_SQUARES, WIRING,
};

fn sq(s: &str) -> Coordinate {
    s.parse().unwrap()
}

#[test]
fn standard_map_matches_wiring_corners() {
    let map = PositionMap::standard().unwrap();

    let a1 = CellAddress::parse("MCP1", "PA", "PA0").unwrap();
    assert_eq!(map.led_for_cell(a1), 1);
    assert_eq!(map.coordinate_for_cell(a1), sq("a1"));

    let a2 = CellAddress::parse("MCP1", "PB", "PB0").unwrap();
    assert_eq!(map.led_for_cell(a2), 30);
    assert_eq!(map.coordinate_for_cell(a2), sq("a2"));

    let h8 = CellAddress::parse("MCP4", "PB", "PB7").unwrap();
    assert_eq!(map.led_for_cell(h8), 106);
    assert_eq!(map.coordinate_for_cell(h8), sq("h8"));

    let e2 = map.cell_for_coordinate(sq("e2"));
    assert_eq!(e2.to_string(), "MCP1/PB4");
    assert_eq!(map.led_for_coordinate(sq("e2")), 22);
}

#[test]
fn every_square_round_trips_through_its_cell_and_led() {
    let map = PositionMap::standard().unwrap();
    for square in Coordinate::all() {
        let cell = map.cell_for_coordinate(square);
        assert_eq!(map.coordinate_for_cell(cell), square);
        let led = map.led_for_coordinate(square);
        assert_eq!(map.coordinate_for_led(led), Some(square));
        assert_eq!(map.cell_for_led(led), Some(cell));
    }
}

#[test]
fn unwired_led_indices_have_no_square() {
    let map = PositionMap::standard().unwrap();
    assert_eq!(map.coordinate_for_led(0), None);
    assert_eq!(map.coordinate_for_led(2), None);
    assert_eq!(map.coordinate_for_led(121), None);
    assert_eq!(map.cell_for_led(255), None);
}

#[test]
fn duplicate_led_in_wiring_is_rejected() {
    let mut wiring = WIRING;
    wiring[0][0][1] = wiring[0][0][0];
    assert_eq!(
        PositionMap::from_tables(&wiring, &LED_SQUARES).err(),
        Some(BoardError::InconsistentWiring)
    );
}

#[test]
fn square_table_must_cover_every_led() {
    let mut squares = LED_SQUARES;
    squares[1] = (3, "a1");
    assert_eq!(
        PositionMap::from_tables(&WIRING, &squares).err(),
        Some(BoardError::InconsistentWiring)
    );

    let mut squares = LED_SQUARES;
    squares[0] = (2, "a1");
    assert_eq!(
        PositionMap::from_tables(&WIRING, &squares).err(),
        Some(BoardError::UnknownLed(2))
    );
}

#[test]
fn cell_address_parsing() {
    let cell = CellAddress::parse("MCP2", "PB", "PB5").unwrap();
    assert_eq!(cell.chip(), 1);
    assert_eq!(cell.port(), Port::B);
    assert_eq!(cell.pin(), 5);
    assert_eq!(cell.chip_name(), "MCP2");
    assert_eq!(cell.pin_name(), "PB5");
    assert_eq!(CellAddress::from_slot(cell.slot()), cell);

    assert_eq!(CellAddress::parse("MCP0", "PA", "PA0"), Err(BoardError::InvalidChip));
    assert_eq!(CellAddress::parse("MCP5", "PA", "PA0"), Err(BoardError::InvalidChip));
    assert_eq!(CellAddress::parse("MCP1", "PC", "PC0"), Err(BoardError::InvalidPort));
    assert_eq!(CellAddress::parse("MCP1", "PA", "PB0"), Err(BoardError::InvalidPin));
    assert_eq!(CellAddress::parse("MCP1", "PA", "PA8"), Err(BoardError::InvalidPin));
}

#[test]
fn cells_enumerate_in_slot_order() {
    let slots: Vec<usize> = CellAddress::all().map(|cell| cell.slot()).collect();
    assert_eq!(slots, (0..64).collect::<Vec<_>>());
}

#[test]
fn coordinates_parse_and_print() {
    let e4 = sq("e4");
    assert_eq!(e4.file_char(), 'e');
    assert_eq!(e4.rank_number(), 4);
    assert!(!e4.is_boundary_rank());
    assert!(sq("h7").is_boundary_rank());
    assert_eq!(e4.to_string(), "e4");
    assert!("i1".parse::<Coordinate>().is_err());
    assert!("a9".parse::<Coordinate>().is_err());
    assert!("a".parse::<Coordinate>().is_err());
}

#[test]
fn uci_moves() {
    let mv: UciMove = "e2e4".parse().unwrap();
    assert_eq!(mv.from, sq("e2"));
    assert_eq!(mv.to, sq("e4"));
    assert_eq!(mv.promotion, None);
    assert_eq!(mv.to_string(), "e2e4");

    let promo: UciMove = "e7e8q".parse().unwrap();
    assert_eq!(promo.promotion, Some('q'));
    assert_eq!(promo.to_string(), "e7e8q");

    assert_eq!("e2e2".parse::<UciMove>(), Err(BoardError::InvalidMove));
    assert_eq!("e7e8k".parse::<UciMove>(), Err(BoardError::InvalidMove));
    assert_eq!("e2".parse::<UciMove>(), Err(BoardError::InvalidMove));
    assert_eq!("e2x4".parse::<UciMove>(), Err(BoardError::InvalidMove));
}
