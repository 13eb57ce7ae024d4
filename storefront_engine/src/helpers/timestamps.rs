use chrono::{DateTime, Duration, Utc};

/// Returns the timestamp to stamp on a record that was last written at `previous`.
///
/// The result is always at least one microsecond after `previous`, even if the wall clock has gone backwards or two
/// writes land in the same tick.
pub fn next_update_timestamp(now: DateTime<Utc>, previous: DateTime<Utc>) -> DateTime<Utc> {
    let floor = previous + Duration::microseconds(1);
    if now > floor {
        now
    } else {
        floor
    }
}
