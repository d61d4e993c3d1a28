//! Threshold-crossing derivation.
//!
//! Walks the tide-height series pairwise and emits one event per interval in
//! which the series crosses the gate threshold, with the exact instant found
//! by linear interpolation between the two bracketing samples. Gaps in the
//! series are interpolated across as if the series were continuous; that is
//! the intended approximation, not a defect.

use chrono::Duration;
use chrono_tz::Tz;

use super::model::{Crossing, GateEvent, GateEventsByDay, SampleSeries};

/// Derive gate events from a height series.
///
/// An `Up` event fires on `prev < threshold <= next`, a `Down` event on
/// `prev > threshold >= next`. Samples sitting exactly on the threshold
/// count as at-or-above for `Up` and at-or-below for `Down`, so a plateau
/// exactly at the threshold yields one event on entry and nothing after.
/// Each event is filed under the local calendar date of the *interpolated*
/// instant, which near midnight can differ from both samples' dates.
pub fn derive_crossings(series: &SampleSeries, threshold: f64, zone: Tz) -> GateEventsByDay {
    let mut events = GateEventsByDay::new();

    for pair in series.samples().windows(2) {
        let (prev, next) = (&pair[0], &pair[1]);

        let kind = if prev.height < threshold && threshold <= next.height {
            Crossing::Up
        } else if prev.height > threshold && threshold >= next.height {
            Crossing::Down
        } else {
            continue;
        };

        // The crossing condition guarantees prev.height != next.height, so
        // the ratio is well defined and lies in [0, 1].
        let ratio = (threshold - prev.height) / (next.height - prev.height);
        let span_ms = (next.at - prev.at).num_milliseconds();
        let at = prev.at + Duration::milliseconds((span_ms as f64 * ratio).round() as i64);

        let day = at.with_timezone(&zone).date_naive();
        events.entry(day).or_default().push(GateEvent {
            at,
            kind,
            threshold,
        });
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tide::model::Sample;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use chrono_tz::Europe::London;

    const THRESHOLD: f64 = 4.0;

    fn sample(time: &str, height: f64) -> Sample {
        Sample {
            at: time.parse::<DateTime<Utc>>().unwrap(),
            height,
        }
    }

    fn series(points: &[(&str, f64)]) -> SampleSeries {
        SampleSeries::new(points.iter().map(|(t, h)| sample(t, *h)).collect())
    }

    fn flat(events: &GateEventsByDay) -> Vec<&GateEvent> {
        events.values().flatten().collect()
    }

    #[test]
    fn up_crossing_is_interpolated_exactly() {
        // (09:00, 3.0) -> (09:30, 4.5): crossing at 09:00 + 30min * 1/1.5 = 09:20
        let events = derive_crossings(
            &series(&[("2025-06-01T09:00:00Z", 3.0), ("2025-06-01T09:30:00Z", 4.5)]),
            THRESHOLD,
            London,
        );
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, Crossing::Up);
        assert_eq!(all[0].threshold, THRESHOLD);
        assert_eq!(
            all[0].at,
            "2025-06-01T09:20:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn down_crossing_is_interpolated_exactly() {
        // (09:00, 5.0) -> (09:30, 3.0): crossing at 09:15
        let events = derive_crossings(
            &series(&[("2025-06-01T09:00:00Z", 5.0), ("2025-06-01T09:30:00Z", 3.0)]),
            THRESHOLD,
            London,
        );
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, Crossing::Down);
        assert_eq!(
            all[0].at,
            "2025-06-01T09:15:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn crossing_timestamp_stays_between_bracketing_samples() {
        let s = series(&[("2025-06-01T09:00:00Z", 3.9), ("2025-06-01T09:30:00Z", 4.01)]);
        let events = derive_crossings(&s, THRESHOLD, London);
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert!(all[0].at >= s.samples()[0].at);
        assert!(all[0].at <= s.samples()[1].at);
    }

    #[test]
    fn empty_and_single_sample_series_produce_no_events() {
        assert!(derive_crossings(&series(&[]), THRESHOLD, London).is_empty());
        assert!(
            derive_crossings(&series(&[("2025-06-01T09:00:00Z", 5.0)]), THRESHOLD, London)
                .is_empty()
        );
    }

    #[test]
    fn no_crossing_series_yields_empty_map() {
        let below = series(&[
            ("2025-06-01T09:00:00Z", 1.0),
            ("2025-06-01T09:30:00Z", 2.0),
            ("2025-06-01T10:00:00Z", 3.0),
        ]);
        let above = series(&[
            ("2025-06-01T09:00:00Z", 5.0),
            ("2025-06-01T09:30:00Z", 6.0),
        ]);
        assert!(derive_crossings(&below, THRESHOLD, London).is_empty());
        assert!(derive_crossings(&above, THRESHOLD, London).is_empty());
    }

    #[test]
    fn plateau_at_threshold_counts_once() {
        // Entering a plateau exactly at the threshold fires one Up event;
        // the threshold-equal pairs afterwards fire nothing.
        let events = derive_crossings(
            &series(&[
                ("2025-06-01T09:00:00Z", 3.9),
                ("2025-06-01T09:30:00Z", 4.0),
                ("2025-06-01T10:00:00Z", 4.0),
                ("2025-06-01T10:30:00Z", 4.0),
                ("2025-06-01T11:00:00Z", 4.1),
            ]),
            THRESHOLD,
            London,
        );
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, Crossing::Up);
        assert_eq!(
            all[0].at,
            "2025-06-01T09:30:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn descent_onto_threshold_plateau_counts_once() {
        let events = derive_crossings(
            &series(&[
                ("2025-06-01T09:00:00Z", 4.1),
                ("2025-06-01T09:30:00Z", 4.0),
                ("2025-06-01T10:00:00Z", 4.0),
                ("2025-06-01T10:30:00Z", 3.9),
            ]),
            THRESHOLD,
            London,
        );
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].kind, Crossing::Down);
    }

    #[test]
    fn midnight_straddling_crossing_lands_on_the_next_day() {
        // Winter date, so local time == UTC in Europe/London. The
        // interpolated instant (00:00) is on the 2nd even though the first
        // sample is on the 1st.
        let events = derive_crossings(
            &series(&[
                ("2025-01-01T23:50:00Z", 3.9),
                ("2025-01-02T00:10:00Z", 4.1),
            ]),
            THRESHOLD,
            London,
        );
        assert_eq!(events.len(), 1);
        let day = *events.keys().next().unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
    }

    #[test]
    fn day_key_uses_local_time_not_utc() {
        // In BST (UTC+1), 23:30 UTC on the 1st is 00:30 local on the 2nd.
        let events = derive_crossings(
            &series(&[
                ("2025-06-01T23:00:00Z", 3.0),
                ("2025-06-02T00:00:00Z", 5.0),
            ]),
            THRESHOLD,
            London,
        );
        // Crossing at 23:30 UTC.
        let day = *events.keys().next().unwrap();
        assert_eq!(day, NaiveDate::from_ymd_opt(2025, 6, 2).unwrap());
    }

    #[test]
    fn interpolates_across_gaps_as_if_continuous() {
        // Six hours between samples; still one linear crossing.
        let events = derive_crossings(
            &series(&[("2025-06-01T06:00:00Z", 2.0), ("2025-06-01T12:00:00Z", 6.0)]),
            THRESHOLD,
            London,
        );
        let all = flat(&events);
        assert_eq!(all.len(), 1);
        assert_eq!(
            all[0].at,
            "2025-06-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn derivation_is_idempotent() {
        let s = series(&[
            ("2025-06-01T09:00:00Z", 3.0),
            ("2025-06-01T09:30:00Z", 4.5),
            ("2025-06-01T15:00:00Z", 3.0),
            ("2025-06-02T03:00:00Z", 4.2),
            ("2025-06-02T09:00:00Z", 2.0),
        ]);
        let first = derive_crossings(&s, THRESHOLD, London);
        let second = derive_crossings(&s, THRESHOLD, London);
        assert_eq!(first, second);
    }

    #[test]
    fn events_are_chronological_within_and_across_days() {
        let mut points = Vec::new();
        // Two tides a day for three days, oscillating around the threshold.
        for day in 1..=3 {
            for (hour, height) in [(2, 3.0), (5, 5.0), (8, 3.0), (14, 5.0), (20, 3.0)] {
                points.push(Sample {
                    at: Utc
                        .with_ymd_and_hms(2025, 6, day, hour, 0, 0)
                        .unwrap(),
                    height,
                });
            }
        }
        let events = derive_crossings(&SampleSeries::new(points), THRESHOLD, London);

        let all: Vec<_> = events.values().flatten().collect();
        assert_eq!(all.len(), 12);
        for pair in all.windows(2) {
            assert!(pair[0].at < pair[1].at);
        }
        // Directions alternate because the series oscillates.
        for pair in all.windows(2) {
            assert_ne!(pair[0].kind, pair[1].kind);
        }
    }
}
