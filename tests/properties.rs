use nanodate::{PreciseDate, Timestamp};
use proptest::prelude::*;

// Roughly ±126 years around the epoch, comfortably inside the range the
// base date collaborator can represent.
const SPAN: i128 = 4_000_000_000_000_000_000;

fn arb_date() -> impl Strategy<Value = PreciseDate> {
    (-SPAN..=SPAN).prop_map(|total| PreciseDate::parse(total).unwrap())
}

proptest! {
    /// setting the canonical string back leaves the instant unchanged.
    #[test]
    fn full_time_round_trip(d in arb_date()) {
        let mut copy = d;
        copy.set_full_time(d.full_time_string().as_str()).unwrap();
        prop_assert_eq!(copy, d);
    }

    /// the canonical string is the decimal total nanosecond count.
    #[test]
    fn full_time_string_is_decimal_total(total in -SPAN..=SPAN) {
        let d = PreciseDate::parse(total).unwrap();
        prop_assert_eq!(d.full_time_string().parse::<i128>().unwrap(), total);
    }

    /// sub-millisecond fields are always normalized to 0..=999.
    #[test]
    fn sub_fields_stay_normalized(d in arb_date()) {
        prop_assert!(d.microseconds() <= 999);
        prop_assert!(d.nanoseconds() <= 999);
        prop_assert!(d.milliseconds() <= 999);
    }

    /// struct and tuple carry identical values, and reconstruct the total
    /// with a non-negative nanosecond remainder.
    #[test]
    fn struct_tuple_agreement(total in -SPAN..=SPAN) {
        let d = PreciseDate::parse(total).unwrap();
        let ts = d.to_struct();
        prop_assert_eq!(d.to_tuple(), (ts.seconds, ts.nanos));
        prop_assert!((0..1_000_000_000).contains(&ts.nanos));
        prop_assert_eq!(ts.seconds as i128 * 1_000_000_000 + ts.nanos as i128, total);
    }

    /// setMicroseconds normalization: the field reads the euclidean
    /// remainder and whole milliseconds carry into the base date.
    #[test]
    fn microsecond_normalization(m in -1_000_000i64..=1_000_000) {
        let mut d = PreciseDate::from_millis(0).unwrap();
        d.set_microseconds(m).unwrap();
        prop_assert_eq!(d.microseconds() as i64, m.rem_euclid(1_000));
        prop_assert_eq!(d.time(), m.div_euclid(1_000));
        prop_assert_eq!(d.nanoseconds(), 0);
    }

    /// setNanoseconds from the epoch leaves exactly that many total
    /// nanoseconds, cascading through microseconds and milliseconds.
    #[test]
    fn nanosecond_normalization(n in -1_000_000_000i64..=1_000_000_000) {
        let mut d = PreciseDate::from_millis(0).unwrap();
        d.set_nanoseconds(n).unwrap();
        prop_assert_eq!(d.nanoseconds() as i64, n.rem_euclid(1_000));
        prop_assert_eq!(d.full_time_string().parse::<i64>().unwrap(), n);
    }

    /// microsecond setter is additive: two calls equal one combined call.
    #[test]
    fn microsecond_setter_is_additive(a in -100_000i64..=100_000, b in -100_000i64..=100_000) {
        let mut split = PreciseDate::from_millis(0).unwrap();
        split.set_microseconds(a).unwrap();
        split.set_microseconds(b).unwrap();
        let mut combined = PreciseDate::from_millis(0).unwrap();
        combined.set_microseconds(a + b).unwrap();
        prop_assert_eq!(split, combined);
    }

    /// the 9-digit ISO string parses back to the same instant.
    #[test]
    fn iso_round_trip(
        secs in -2_208_988_800i64..=4_102_444_800,
        frac in 0i64..1_000_000_000,
    ) {
        let total = secs as i128 * 1_000_000_000 + frac as i128;
        let d = PreciseDate::parse(total).unwrap();
        prop_assert_eq!(
            PreciseDate::parse_full(d.to_iso_string().as_str()).unwrap(),
            d.full_time_string()
        );
    }

    /// a 6-digit fraction means microsecond precision: right-padding with
    /// three zeros changes nothing.
    #[test]
    fn iso_microsecond_padding(
        secs in 0i64..=4_102_444_800,
        micros in 0i64..1_000_000,
    ) {
        let total = secs as i128 * 1_000_000_000 + micros as i128 * 1_000;
        let nine = PreciseDate::parse(total).unwrap().to_iso_string();
        // nanosecond group is zero, so the 9-digit form ends in "000Z"
        let six = format!("{}Z", &nine[..nine.len() - 4]);
        prop_assert_eq!(
            PreciseDate::parse_full(six.as_str()).unwrap(),
            PreciseDate::parse_full(nine.as_str()).unwrap()
        );
    }

    /// pre-epoch struct inputs follow the floor rule: floored seconds plus
    /// the forward distance from them.
    #[test]
    fn pre_epoch_sign_symmetry(s in 1i64..=2_000_000_000, n in 0i32..1_000_000_000) {
        let full = PreciseDate::parse_full(Timestamp::new(-s, n)).unwrap();
        prop_assert_eq!(
            full.parse::<i128>().unwrap(),
            -(s as i128) * 1_000_000_000 + n as i128
        );
    }

    /// switching the base time discards the finer fields.
    #[test]
    fn set_time_resets_precision(d in arb_date(), ms in -1_000_000_000i64..=1_000_000_000) {
        let mut copy = d;
        copy.set_time(ms).unwrap();
        prop_assert_eq!(copy.time(), ms);
        prop_assert_eq!(copy.microseconds(), 0);
        prop_assert_eq!(copy.nanoseconds(), 0);
    }

    /// ordering follows the total nanosecond count.
    #[test]
    fn ordering_matches_total(a in -SPAN..=SPAN, b in -SPAN..=SPAN) {
        let da = PreciseDate::parse(a).unwrap();
        let db = PreciseDate::parse(b).unwrap();
        prop_assert_eq!(da.cmp(&db), a.cmp(&b));
    }
}
