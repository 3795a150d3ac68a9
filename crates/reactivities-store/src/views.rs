//! Read-only projections over the registry contents.
//!
//! Everything here is a pure function of its input: the same registry
//! contents always produce the same output.

use chrono::NaiveDate;
use reactivities_shared::Activity;

/// One calendar day and the activities on it, in chronological order.
pub type DateBucket = (NaiveDate, Vec<Activity>);

/// Activities sorted ascending by date. Ties keep their input order.
pub fn sorted_by_date<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Vec<Activity> {
    let mut sorted: Vec<Activity> = activities.into_iter().cloned().collect();
    sorted.sort_by_key(|a| a.date);
    sorted
}

/// Group activities by the UTC calendar day of their date.
///
/// Buckets ascend by day and each bucket is chronological.
pub fn group_by_date<'a>(activities: impl IntoIterator<Item = &'a Activity>) -> Vec<DateBucket> {
    let mut buckets: Vec<DateBucket> = Vec::new();

    for activity in sorted_by_date(activities) {
        let day = activity.date.date_naive();
        match buckets.last_mut() {
            Some((key, bucket)) if *key == day => bucket.push(activity),
            _ => buckets.push((day, vec![activity])),
        }
    }

    buckets
}
