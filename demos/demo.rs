use nanodate::{PreciseDate, Timestamp};

fn main() {
    // Current instant (millisecond resolution, sub-millisecond fields zero)
    let now = PreciseDate::now();
    println!("Now: {}", now);
    println!("Full time: {}", now.full_time_string());

    // From a protobuf-style {seconds, nanos} struct
    let d = PreciseDate::parse(Timestamp::new(1_547_253_035i64, 381_101_032)).unwrap();
    println!("ISO: {}", d.to_iso_string());
    println!("Full time: {}", d.full_time_string());
    println!("Struct: {:?}", d.to_struct());
    println!("Tuple: {:?}", d.to_tuple());

    // Sub-millisecond accessors
    println!("Milliseconds: {}", d.milliseconds());
    println!("Microseconds: {}", d.microseconds());
    println!("Nanoseconds: {}", d.nanoseconds());

    // The universal parser accepts five input shapes
    for full in [
        PreciseDate::parse_full(Timestamp::new(1_547_253_035i64, 381_101_032)).unwrap(),
        PreciseDate::parse_full((1_547_253_035i64, 381_101_032)).unwrap(),
        PreciseDate::parse_full("1547253035381101032").unwrap(),
        PreciseDate::parse_full("2019-01-12T00:30:35.381101032Z").unwrap(),
        PreciseDate::parse_full(1_547_253_035_381i64).unwrap(),
    ] {
        println!("Parsed: {}", full);
    }

    // Carry/borrow normalization
    let mut t = PreciseDate::from_millis(0).unwrap();
    t.set_microseconds(1_500).unwrap();
    println!("After 1500 µs: {} ms + {} µs", t.time(), t.microseconds());

    // Pre-epoch instants floor toward past infinity
    let before = PreciseDate::parse(Timestamp::new(-1_547_253_035i64, 381_101_032)).unwrap();
    println!("Pre-epoch full time: {}", before.full_time_string());
    println!("Pre-epoch struct: {:?}", before.to_struct());

    // Full-precision UTC constructor
    let full = PreciseDate::full_utc_string(2019, 1, 12, 0, 30, 35, 381, 101, 32).unwrap();
    println!("fullUTC: {}", full);
}
