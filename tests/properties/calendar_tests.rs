use chrono::NaiveDate;
use proptest::prelude::*;

use takt::scheduling::WorkWeek;

fn arb_work_week() -> impl Strategy<Value = WorkWeek> {
    prop::collection::btree_set(0u8..7, 1..=7)
        .prop_map(|days| WorkWeek::from_indices(days).expect("non-empty work week"))
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2031, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("valid date"))
}

proptest! {
    #[test]
    fn added_days_land_on_working_days(week in arb_work_week(), date in arb_date(), days in 1i64..400) {
        let end = week.add_working_days(date, days);
        prop_assert!(week.is_working_day(end));
        prop_assert!(end > date);
    }

    #[test]
    fn between_inverts_add(week in arb_work_week(), date in arb_date(), days in 0i64..400) {
        let end = week.add_working_days(date, days);
        prop_assert_eq!(week.working_days_between(date, end), days);
        prop_assert_eq!(week.working_days_between(end, date), -days);
    }

    #[test]
    fn add_is_strictly_monotonic(week in arb_work_week(), date in arb_date(), days in 0i64..200) {
        prop_assert!(week.add_working_days(date, days) < week.add_working_days(date, days + 1));
    }

    #[test]
    fn full_week_calendar_is_plain_date_math(date in arb_date(), days in 0i64..400) {
        let week = WorkWeek::from_indices(0u8..7).expect("full week");
        let expected = date + chrono::Days::new(days.unsigned_abs());
        prop_assert_eq!(week.add_working_days(date, days), expected);
    }

    #[test]
    fn names_roundtrip(week in arb_work_week()) {
        let rebuilt = WorkWeek::from_names(&week.names()).expect("names parse");
        prop_assert_eq!(rebuilt, week);
    }
}
