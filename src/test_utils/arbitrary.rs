use chrono::NaiveDate;
use proptest::prelude::*;

use crate::config::{Config, SchedulerConfig, ServerConfig, StorageConfig};
use crate::scheduling::WorkWeek;

const DAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Non-empty set of weekday indices, Sunday = 0.
pub fn arb_weekday_indices() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::btree_set(0u8..7, 1..=7).prop_map(|set| set.into_iter().collect())
}

/// Generate an arbitrary non-empty working week.
pub fn arb_work_week() -> impl Strategy<Value = WorkWeek> {
    arb_weekday_indices().prop_map(|indices| {
        WorkWeek::from_indices(indices).expect("indices are non-empty and in range")
    })
}

/// Any date between 2020 and 2030.
pub fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2020i32..2030, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).expect("day 1..=28 is valid"))
}

fn arb_scheduler() -> impl Strategy<Value = SchedulerConfig> {
    (1i64..15, 0i64..4, arb_weekday_indices()).prop_map(
        |(default_takt_time, buffer_size, indices)| SchedulerConfig {
            default_takt_time,
            buffer_size,
            working_days: indices
                .into_iter()
                .map(|idx| DAY_NAMES[idx as usize].to_string())
                .collect(),
        },
    )
}

fn arb_storage() -> impl Strategy<Value = StorageConfig> {
    prop::option::of("[a-z][a-z0-9_]{0,12}\\.db")
        .prop_map(|db_path| StorageConfig {
            db_path: db_path.map(Into::into),
        })
}

fn arb_server() -> impl Strategy<Value = ServerConfig> {
    (1024u16..65535).prop_map(|port| ServerConfig {
        bind: format!("127.0.0.1:{port}"),
    })
}

/// Generate an arbitrary valid Config.
pub fn arb_config() -> impl Strategy<Value = Config> {
    (arb_scheduler(), arb_storage(), arb_server()).prop_map(|(scheduler, storage, server)| {
        Config {
            scheduler,
            storage,
            server,
        }
    })
}

proptest! {
    #[test]
    fn generated_configs_validate(config in arb_config()) {
        prop_assert!(config.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip(config in arb_config()) {
        let rendered = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        prop_assert_eq!(parsed, config);
    }

    #[test]
    fn work_week_names_roundtrip(week in arb_work_week()) {
        let names = week.names();
        prop_assert_eq!(WorkWeek::from_names(names.as_slice()).unwrap(), week);
    }
}
