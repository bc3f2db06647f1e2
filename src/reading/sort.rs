use std::cmp::Reverse;

use crate::reading::SensorReading;

/// Orders a batch most-recent-first. Readings whose timestamp does not
/// parse sort after every reading with a parsable one; the sort is
/// stable, so unparsable entries keep their incoming relative order.
pub fn sort_readings(readings: &mut [SensorReading]) {
    readings.sort_by_cached_key(|r| Reverse(r.recorded_instant()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(id: i64, recorded_at: Option<&str>) -> SensorReading {
        SensorReading {
            id,
            temperature: None,
            humidity: None,
            recorded_at: recorded_at.map(str::to_string),
        }
    }

    fn ids(readings: &[SensorReading]) -> Vec<i64> {
        readings.iter().map(|r| r.id).collect()
    }

    #[test]
    fn sorts_most_recent_first_with_unparsable_last() {
        let mut batch = vec![
            reading(1, Some("2024-01-02T10:00:00Z")),
            reading(2, None),
            reading(3, Some("2024-01-01T10:00:00Z")),
        ];

        sort_readings(&mut batch);

        assert_eq!(ids(&batch), vec![1, 3, 2]);
    }

    #[test]
    fn output_is_non_increasing_by_instant() {
        let mut batch = vec![
            reading(1, Some("2023-12-31T23:59:59Z")),
            reading(2, Some("garbage")),
            reading(3, Some("2024-03-01T00:00:00Z")),
            reading(4, None),
            reading(5, Some("2024-01-15T12:00:00Z")),
            reading(6, Some("2024-03-01T00:00:00Z")),
        ];

        sort_readings(&mut batch);

        let instants: Vec<_> = batch.iter().map(|r| r.recorded_instant()).collect();
        let parsable: Vec<_> = instants.iter().flatten().collect();
        assert!(parsable.windows(2).all(|w| w[0] >= w[1]));

        // every unparsable reading sits after every parsable one
        let first_unparsable = instants.iter().position(|i| i.is_none()).unwrap();
        assert!(instants[first_unparsable..].iter().all(|i| i.is_none()));
    }

    #[test]
    fn sorting_is_idempotent() {
        let mut batch = vec![
            reading(1, Some("2024-01-02T10:00:00Z")),
            reading(2, Some("bad")),
            reading(3, None),
            reading(4, Some("2024-01-01T10:00:00Z")),
        ];

        sort_readings(&mut batch);
        let once = ids(&batch);
        sort_readings(&mut batch);

        assert_eq!(ids(&batch), once);
    }

    #[test]
    fn unparsable_pairs_keep_their_incoming_order() {
        let mut batch = vec![reading(10, Some("???")), reading(20, None), reading(30, Some("also bad"))];

        sort_readings(&mut batch);

        assert_eq!(ids(&batch), vec![10, 20, 30]);
    }

    #[test]
    fn empty_batch_is_fine() {
        let mut batch: Vec<SensorReading> = Vec::new();
        sort_readings(&mut batch);
        assert!(batch.is_empty());
    }
}
