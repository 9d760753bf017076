use core_types::{BridgeEvent, Phase, ProgramWindow};

/// The ledger split around the program window. Each event lands in exactly one
/// partition and every partition keeps the input order.
#[derive(Debug, Clone, Default)]
pub struct Partitions<'a> {
    pub before: Vec<&'a BridgeEvent>,
    pub during: Vec<&'a BridgeEvent>,
    pub after: Vec<&'a BridgeEvent>,
}

impl<'a> Partitions<'a> {
    pub fn get(&self, phase: Phase) -> &[&'a BridgeEvent] {
        match phase {
            Phase::Before => &self.before,
            Phase::During => &self.during,
            Phase::After => &self.after,
        }
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.during.len() + self.after.len()
    }
}

/// Splits `events` into before/during/after `window`. Boundary instants go to `during`.
pub fn partition<'a>(events: &'a [BridgeEvent], window: &ProgramWindow) -> Partitions<'a> {
    let mut partitions = Partitions::default();

    for event in events {
        match window.phase_of(event.timestamp()) {
            Phase::Before => partitions.before.push(event),
            Phase::During => partitions.during.push(event),
            Phase::After => partitions.after.push(event),
        }
    }

    tracing::debug!(
        before = partitions.before.len(),
        during = partitions.during.len(),
        after = partitions.after.len(),
        "Partitioned events around the program window."
    );

    partitions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use core_types::Direction;
    use proptest::prelude::*;
    use rust_decimal::Decimal;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    fn event_at(hours: i64, id: usize) -> BridgeEvent {
        BridgeEvent::new(
            base() + Duration::hours(hours),
            format!("0x{id}"),
            "ethereum",
            Direction::Inbound,
            "USDC",
            Decimal::ONE,
        )
        .unwrap()
    }

    #[test]
    fn test_boundaries_go_to_during_and_order_is_kept() {
        let window = ProgramWindow::new(base() + Duration::hours(10), base() + Duration::hours(20))
            .unwrap();
        let events = vec![
            event_at(25, 0),
            event_at(10, 1),
            event_at(9, 2),
            event_at(20, 3),
            event_at(15, 4),
            event_at(0, 5),
        ];

        let parts = partition(&events, &window);

        let ids = |side: &[&BridgeEvent]| {
            side.iter().map(|e| e.source_address().to_string()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&parts.before), vec!["0x2", "0x5"]);
        assert_eq!(ids(&parts.during), vec!["0x1", "0x3", "0x4"]);
        assert_eq!(ids(&parts.after), vec!["0x0"]);
    }

    #[test]
    fn test_empty_input_yields_empty_partitions() {
        let window = ProgramWindow::new(base(), base()).unwrap();
        let parts = partition(&[], &window);
        assert_eq!(parts.len(), 0);
        assert!(Phase::ALL.iter().all(|&phase| parts.get(phase).is_empty()));
    }

    proptest! {
        #[test]
        fn prop_partition_is_total_and_disjoint(
            offsets in prop::collection::vec(-500i64..500, 0..200),
            start in -300i64..300,
            length in 0i64..300,
        ) {
            let events: Vec<BridgeEvent> = offsets
                .iter()
                .enumerate()
                .map(|(id, hours)| event_at(*hours, id))
                .collect();
            let window = ProgramWindow::new(
                base() + Duration::hours(start),
                base() + Duration::hours(start + length),
            )
            .unwrap();

            let parts = partition(&events, &window);

            prop_assert_eq!(parts.len(), events.len());

            let mut seen = vec![0u8; events.len()];
            for phase in Phase::ALL {
                for event in parts.get(phase) {
                    prop_assert_eq!(window.phase_of(event.timestamp()), phase);
                    let id: usize = event.source_address()[2..].parse().unwrap();
                    seen[id] += 1;
                }
            }
            prop_assert!(seen.iter().all(|count| *count == 1));
        }
    }
}
