//! Lightweight cron expression parser.
//! Supports: "MIN HOUR DOM MON DOW" (5-field, no seconds, UTC)
//! Values: *, */N, N, N,M,...
//! Day of week: 0 = Sunday … 6 = Saturday (7 is accepted as Sunday).
//! Example: "0 11 * * 2" = every Tuesday at 11:00
//!
//! Restricted DOM and DOW fields must both match (no cron "either" rule).

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};

/// How far ahead to search. A weekly schedule always fits.
const SEARCH_DAYS: i64 = 8;

/// Parse a cron expression and compute the next run time strictly after `after`.
pub fn next_run_from_cron(expression: &str, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let parts: Vec<&str> = expression.split_whitespace().collect();
    if parts.len() != 5 {
        tracing::warn!(
            "Invalid cron expression: '{}' (need 5 fields: MIN HOUR DOM MON DOW)",
            expression
        );
        return None;
    }

    let minutes = parse_field(parts[0], 0, 59)?;
    let hours = parse_field(parts[1], 0, 23)?;
    let days = parse_field(parts[2], 1, 31)?;
    let months = parse_field(parts[3], 1, 12)?;
    let weekdays: Vec<u32> = parse_field(parts[4], 0, 7)?
        .into_iter()
        .map(|d| d % 7)
        .collect();

    let mut candidate = after + Duration::minutes(1);
    candidate = candidate
        .with_second(0)
        .and_then(|c| c.with_nanosecond(0))
        .unwrap_or(candidate);
    let limit = after + Duration::days(SEARCH_DAYS);

    while candidate <= limit {
        let day_matches = days.contains(&candidate.day())
            && months.contains(&candidate.month())
            && weekdays.contains(&candidate.weekday().num_days_from_sunday());
        if !day_matches {
            // Skip straight to the next midnight
            candidate = candidate
                .date_naive()
                .succ_opt()?
                .and_hms_opt(0, 0, 0)?
                .and_utc();
            continue;
        }

        if minutes.contains(&candidate.minute()) && hours.contains(&candidate.hour()) {
            return Some(candidate);
        }
        candidate += Duration::minutes(1);
    }

    None
}

/// Parse a cron field into a list of matching values.
fn parse_field(field: &str, min: u32, max: u32) -> Option<Vec<u32>> {
    if field == "*" {
        return Some((min..=max).collect());
    }

    // */N: every N
    if let Some(step) = field.strip_prefix("*/") {
        let n: u32 = step.parse().ok()?;
        if n == 0 {
            return None;
        }
        return Some((min..=max).step_by(n as usize).collect());
    }

    // Comma-separated: "1,3,5"
    if field.contains(',') {
        let vals: Result<Vec<u32>, _> = field.split(',').map(|s| s.trim().parse()).collect();
        return vals
            .ok()
            .map(|v| v.into_iter().filter(|x| *x >= min && *x <= max).collect());
    }

    let n: u32 = field.parse().ok()?;
    if n >= min && n <= max {
        Some(vec![n])
    } else {
        None
    }
}
