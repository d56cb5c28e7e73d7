//! `dd.mm.yyyy` dates without a calendar dependency.

use std::time::{SystemTime, UNIX_EPOCH};

/// Today's date (UTC) as `dd.mm.yyyy`.
pub fn today() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format_date(secs / 86_400)
}

/// Format a day count since 1970-01-01 as `dd.mm.yyyy`.
pub fn format_date(days_since_epoch: u64) -> String {
    let (y, m, d) = civil_from_days(days_since_epoch as i64);
    format!("{d:02}.{m:02}.{y:04}")
}

// Proleptic Gregorian conversion, see H. Hinnant's "chrono-compatible
// low-level date algorithms".
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let y = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let m = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if m <= 2 { y + 1 } else { y }, m, d)
}
