//! The three timestamp shapes the scraper writes: the `Time` column, the
//! data file name, and the error log prefix.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Local, TimeZone, Utc};

/// `YYYY-MM-DD HH:MM:SS` in UTC, seconds precision.
pub fn data<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    ts.with_timezone(&Utc).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `YYYY-M-D`, calendar date in the timestamp's own zone, no zero padding.
pub fn filename<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
    format!("{}-{}-{}", ts.year(), ts.month(), ts.day())
}

/// `Ddd Mon DD YYYY HH:MM:SS GMT+HHMM (zone)`.
pub fn error<Tz: TimeZone>(ts: &DateTime<Tz>, zone: &str) -> String
where
    Tz::Offset: Display,
{
    format!("{} ({zone})", ts.format("%a %b %d %Y %H:%M:%S GMT%z"))
}

/// Name of the machine's time zone, e.g. `Europe/Madrid`.
///
/// Falls back to `GMT+HHMM` when the platform will not say.
pub fn local_zone_name() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| Local::now().format("GMT%z").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn data_format_is_utc_truncated() {
        let ts = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2017, 3, 5, 1, 2, 3)
            .unwrap();
        assert_eq!(data(&ts), "2017-03-04 23:02:03");
    }

    #[test]
    fn filename_has_no_padding() {
        let ts = Utc.with_ymd_and_hms(2017, 3, 5, 10, 0, 0).unwrap();
        assert_eq!(filename(&ts), "2017-3-5");
        let ts = Utc.with_ymd_and_hms(2017, 11, 25, 10, 0, 0).unwrap();
        assert_eq!(filename(&ts), "2017-11-25");
    }

    #[test]
    fn error_format_matches_date_to_string() {
        let ts = Utc.with_ymd_and_hms(2017, 3, 5, 9, 8, 7).unwrap();
        assert_eq!(error(&ts, "UTC"), "Sun Mar 05 2017 09:08:07 GMT+0000 (UTC)");
    }

    #[test]
    fn local_error_timestamp_names_the_zone() {
        let zone = local_zone_name();
        assert!(!zone.is_empty());
        assert!(!zone.starts_with('+') && !zone.starts_with('-'));

        let ts = Local.with_ymd_and_hms(2017, 3, 5, 9, 8, 7).unwrap();
        let text = error(&ts, &zone);
        assert!(text.starts_with("Sun Mar 05 2017 09:08:07 GMT"));
        assert!(text.ends_with(&format!(" ({zone})")));
        // the parenthesised part is a name, not the offset a second time
        let offset = ts.format("%:z").to_string();
        assert!(!text.ends_with(&format!("({offset})")));
    }
}
