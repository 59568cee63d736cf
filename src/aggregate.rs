//! Pure aggregation over already-fetched event lists.
//!
//! No I/O happens here. Events are bucketed by their **local** calendar day
//! (see [`crate::datetime::local_day`]); events without a date are excluded
//! from every bucket. Days without events are absent from the maps, never
//! zero-valued.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::datetime::local_day;
use crate::event::Event;

/// Partition events into local-calendar-day buckets.
///
/// Within a bucket, events are ordered by `event_time` (lexicographic HH:MM
/// comparison) when both sides carry one; pairs where either side lacks a
/// time keep the relative order produced by the upstream query.
pub fn group_by_local_date(events: &[Event]) -> BTreeMap<NaiveDate, Vec<Event>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();

    for event in events {
        if let Some(date) = event.date {
            buckets
                .entry(local_day(date))
                .or_default()
                .push(event.clone());
        }
    }

    for bucket in buckets.values_mut() {
        sort_bucket_by_time(bucket);
    }

    buckets
}

/// Order the timed events of a bucket among themselves; untimed events keep
/// their exact positions. A plain comparator treating missing times as equal
/// would not be a total order.
fn sort_bucket_by_time(bucket: &mut [Event]) {
    let slots: Vec<usize> = bucket
        .iter()
        .enumerate()
        .filter(|(_, e)| e.event_time.is_some())
        .map(|(i, _)| i)
        .collect();

    let mut timed: Vec<Event> = slots.iter().map(|&i| bucket[i].clone()).collect();
    timed.sort_by(|a, b| a.event_time.cmp(&b.event_time));

    for (slot, event) in slots.into_iter().zip(timed) {
        bucket[slot] = event;
    }
}

/// Count events per local calendar day. Drives the date-tape heatmap.
pub fn counts_per_date(events: &[Event]) -> BTreeMap<NaiveDate, usize> {
    let mut counts: BTreeMap<NaiveDate, usize> = BTreeMap::new();

    for event in events {
        if let Some(date) = event.date {
            *counts.entry(local_day(date)).or_insert(0) += 1;
        }
    }

    counts
}
