//! Property tests for the correlation engine

use lldpmap::{
    prune, Correlation, CorrelationPlan, Correlator, KeyExtractor, MemoryWalker, NeighborTable,
    PrunePolicy, RemoteIndexLayout, SourceTable, WalkEntry,
};
use lldpmap_test::DeviceFixture;
use proptest::prelude::*;

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn correlate(entries: Vec<WalkEntry>, layout: RemoteIndexLayout) -> Correlation {
    let plan = CorrelationPlan::default().with_layout(layout);
    let mut correlator = Correlator::new(MemoryWalker::with_entries(entries), plan);
    block_on(correlator.run()).unwrap()
}

fn label() -> impl Strategy<Value = String> {
    prop_oneof![Just(String::new()), "[a-z][a-z0-9-]{0,8}"]
}

fn layout() -> impl Strategy<Value = RemoteIndexLayout> {
    prop_oneof![
        Just(RemoteIndexLayout::LocalPortFirst),
        Just(RemoteIndexLayout::TimeMarkFirst)
    ]
}

/// A device with ports 1..=n and neighbors spread over them, possibly with
/// empty values. Port 1 always has a neighbor so no walk comes back empty.
fn device() -> impl Strategy<Value = DeviceFixture> {
    (1u32..16, layout())
        .prop_flat_map(|(ports, layout)| {
            let neighbors = prop::collection::vec((1..=ports, label(), label()), 0..24);
            (Just(ports), Just(layout), neighbors, label(), label())
        })
        .prop_map(|(ports, layout, neighbors, sys, port)| {
            let mut fixture = DeviceFixture::new().with_layout(layout);
            for index in 1..=ports {
                fixture = fixture.with_port(index, format!("eth{index}"), format!("port {index}"));
            }
            fixture = fixture.with_neighbor(1, sys, port);
            for (index, sys, port) in neighbors {
                fixture = fixture.with_neighbor(index, sys, port);
            }
            fixture
        })
}

fn pruned(table: &NeighborTable, policy: PrunePolicy) -> NeighborTable {
    let mut table = table.clone();
    prune(&mut table, policy);
    table
}

proptest! {
    #[test]
    fn correlation_ignores_response_order(
        (fixture, shuffled) in device().prop_flat_map(|fixture| {
            let entries = fixture.entries();
            (Just(fixture), Just(entries).prop_shuffle())
        })
    ) {
        let ordered = correlate(fixture.entries(), fixture.layout());
        let reordered = correlate(shuffled, fixture.layout());
        prop_assert_eq!(ordered.table, reordered.table);
    }

    #[test]
    fn correlation_is_repeatable(fixture in device()) {
        let first = correlate(fixture.entries(), fixture.layout());
        let second = correlate(fixture.entries(), fixture.layout());
        prop_assert_eq!(first, second);
    }

    #[test]
    fn every_local_port_has_a_record(fixture in device()) {
        let correlation = correlate(fixture.entries(), fixture.layout());
        prop_assert_eq!(correlation.table.len(), fixture.ports().len());
        prop_assert!(!correlation.report.has_orphans());
    }

    #[test]
    fn both_empty_keeps_superset_of_either_empty(fixture in device()) {
        let table = correlate(fixture.entries(), fixture.layout()).table;
        let both = pruned(&table, PrunePolicy::BothEmpty);
        let either = pruned(&table, PrunePolicy::EitherEmpty);

        for (key, record) in either.entries() {
            prop_assert_eq!(both.get(key), Some(record));
        }
        for (key, record) in both.entries() {
            prop_assert_eq!(table.get(key), Some(record));
        }
    }

    #[test]
    fn last_neighbor_per_port_wins(fixture in device()) {
        let table = correlate(fixture.entries(), fixture.layout()).table;

        // Neighbors are added with increasing remote index, so the last
        // non-empty value per port is the one that sorts last
        for port in fixture.ports() {
            let record = table
                .get(&port.index.into())
                .expect("record for every port");
            let expected_sys = fixture
                .neighbors()
                .iter()
                .rfind(|n| n.local_index == port.index && !n.system_name.is_empty())
                .map(|n| n.system_name.as_str())
                .unwrap_or("");
            let expected_port = fixture
                .neighbors()
                .iter()
                .rfind(|n| n.local_index == port.index && !n.port_id.is_empty())
                .map(|n| n.port_id.as_str())
                .unwrap_or("");
            prop_assert_eq!(record.remote_system_name.as_str(), expected_sys);
            prop_assert_eq!(record.remote_port_label.as_str(), expected_port);
        }
    }

    #[test]
    fn key_extraction_is_pure(
        index in prop::collection::vec(any::<u32>(), 0..5),
        layout in layout(),
        table in prop::sample::select(SourceTable::ALL.to_vec()),
    ) {
        let extractor = KeyExtractor::new(layout);
        let oid = table.subtree().child(&index);
        prop_assert_eq!(extractor.extract(&oid, table), extractor.extract(&oid, table));
    }
}
