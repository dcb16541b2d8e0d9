use std::{io::Write, time::Duration};

use chrono::{DateTime, FixedOffset, TimeDelta, Utc};
use chrono_tz::Tz;
use envfill::{Base64, Base64Json, FileContents, FileText, FromEnv, ReadError};

#[derive(Debug, Default, PartialEq, serde::Deserialize)]
pub struct Greeting {
    pub hello: String,
}

#[derive(FromEnv, Debug, Default, PartialEq)]
pub struct Secrets {
    #[env = "TOKEN"]
    pub token: Base64,
    #[env = "CERT"]
    pub cert: FileContents,
    #[env = "MOTD"]
    pub motd: FileText,
    #[env = "GREETING"]
    pub greeting: Base64Json<Greeting>,
}

#[test]
fn extension_types() {
    let mut cert = tempfile::NamedTempFile::new().unwrap();
    cert.write_all(&[0xde, 0xad, 0xbe, 0xef]).unwrap();
    let mut motd = tempfile::NamedTempFile::new().unwrap();
    motd.write_all("welcome\n".as_bytes()).unwrap();

    let secrets = temp_env::with_vars(
        [
            ("TOKEN", Some("YXNkZg")),
            ("CERT", cert.path().to_str()),
            ("MOTD", motd.path().to_str()),
            ("GREETING", Some("eyJoZWxsbyI6IndvcmxkIn0K")),
        ],
        envfill::from_env::<Secrets>,
    )
    .unwrap();

    assert_eq!(
        Secrets {
            token: Base64("asdf".into()),
            cert: FileContents(vec![0xde, 0xad, 0xbe, 0xef]),
            motd: FileText("welcome\n".into()),
            greeting: Base64Json(Greeting {
                hello: "world".into()
            }),
        },
        secrets
    );
}

#[test]
fn extension_type_failures() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.pem");
    let missing = missing.to_str().unwrap().to_owned();

    let mut secrets = Secrets::default();
    let err = envfill::populate_with(&mut secrets, |key| match key {
        "TOKEN" => Some("YXNkZg==".into()),
        "CERT" => Some(missing.clone()),
        "MOTD" => Some(missing.clone()),
        "GREETING" => Some("e".into()),
        _ => None,
    })
    .unwrap_err();

    let keys: Vec<_> = err.items().iter().map(|item| item.key()).collect();
    assert_eq!(vec!["TOKEN", "CERT", "MOTD", "GREETING"], keys);

    let read = err.get("CERT").unwrap().cause();
    let read = read.downcast_ref::<ReadError>().unwrap();
    assert_eq!(dir.path().join("missing.pem"), read.path());

    assert_eq!(Secrets::default(), secrets);
}

#[test]
fn temporal_fields() {
    #[derive(FromEnv, Debug, PartialEq)]
    pub struct Schedule {
        #[env = "STARTS_AT"]
        pub starts_at: DateTime<FixedOffset>,
        #[env = "ENDS_AT"]
        pub ends_at: DateTime<Utc>,
        #[env = "INTERVAL"]
        pub interval: Duration,
        #[env = "OFFSET"]
        pub offset: TimeDelta,
    }

    let epoch = DateTime::<Utc>::UNIX_EPOCH;
    let mut schedule = Schedule {
        starts_at: epoch.fixed_offset(),
        ends_at: epoch,
        interval: Duration::ZERO,
        offset: TimeDelta::zero(),
    };

    envfill::populate_with(&mut schedule, |key| match key {
        "STARTS_AT" => Some("2021-09-14T12:13:14.123123+09:00".into()),
        "ENDS_AT" => Some("2021-09-14T12:13:14Z".into()),
        "INTERVAL" => Some("1h15m30.5s".into()),
        "OFFSET" => Some("-90m".into()),
        _ => None,
    })
    .unwrap();

    assert_eq!(
        DateTime::parse_from_rfc3339("2021-09-14T03:13:14.123123Z").unwrap(),
        schedule.starts_at
    );
    assert_eq!(9 * 3600, schedule.starts_at.offset().local_minus_utc());
    assert_eq!(
        DateTime::parse_from_rfc3339("2021-09-14T12:13:14Z").unwrap(),
        schedule.ends_at
    );
    assert_eq!(Duration::from_millis(4_530_500), schedule.interval);
    assert_eq!(TimeDelta::minutes(-90), schedule.offset);
}

#[test]
fn temporal_fields_reject_json() {
    #[derive(FromEnv, Debug, Default)]
    pub struct Config {
        pub wait: Duration,
    }

    let mut config = Config::default();
    let err = envfill::populate_with(&mut config, |_| Some(r#"{"secs": 1, "nanos": 0}"#.into()))
        .unwrap_err();

    assert_eq!(
        "invalid duration \"{\\\"secs\\\": 1, \\\"nanos\\\": 0}\"",
        err.items()[0].cause().to_string()
    );
}

#[test]
fn time_zone_fields() {
    #[derive(FromEnv, Debug, PartialEq)]
    pub struct Region {
        #[env = "LOC"]
        pub loc: Tz,
    }

    assert_eq!(vec!["LOC"], envfill::keys::<Region>());

    let region = temp_env::with_var("LOC", Some("Asia/Jakarta"), || {
        let mut region = Region { loc: Tz::UTC };
        envfill::populate(&mut region).map(|()| region)
    })
    .unwrap();

    assert_eq!(Tz::Asia__Jakarta, region.loc);
    assert_eq!("Asia/Jakarta", region.loc.name());
}

#[test]
fn unknown_time_zone_is_reported() {
    #[derive(FromEnv, Debug)]
    pub struct Region {
        #[env = "LOC"]
        pub loc: Tz,
    }

    let mut region = Region { loc: Tz::UTC };
    let err = envfill::populate_with(&mut region, |_| Some("Asia/Somewhere".into())).unwrap_err();

    assert_eq!(
        "1 errors occurred:\n\t* cannot parse env LOC: unknown time zone \"Asia/Somewhere\"\n\n",
        err.to_string()
    );
    assert_eq!(Tz::UTC, region.loc);
}

#[test]
fn instants_require_the_strict_layout() {
    #[derive(FromEnv, Debug)]
    pub struct Schedule {
        pub at: DateTime<Utc>,
    }

    let mut schedule = Schedule {
        at: DateTime::<Utc>::UNIX_EPOCH,
    };
    let err = envfill::populate_with(&mut schedule, |_| Some("2021-09-14 12:13:14+09:00".into()))
        .unwrap_err();

    assert_eq!(
        "invalid RFC 3339 instant \"2021-09-14 12:13:14+09:00\"",
        err.items()[0].cause().to_string()
    );
    assert_eq!(DateTime::<Utc>::UNIX_EPOCH, schedule.at);
}
