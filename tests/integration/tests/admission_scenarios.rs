//! Integration test: admission decisions over hand-built areas.
//!
//! Advertisements are originated with qospf-routing, encoded with the
//! qospf-core metric codec and run through the full admission pipeline.

use std::net::Ipv4Addr;

use qospf_core::{metric, QospfConfig};
use qospf_routing::{RejectReason, SessionAdmissionController};
use qospf_integration_tests::*;

fn controller() -> SessionAdmissionController {
    SessionAdmissionController::new(QospfConfig::default())
}

// =========================================================================
// Line topology
// =========================================================================

#[test]
fn test_line_admits_two_hop_route() {
    let area = line(10 * MBPS, 5 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 23, 2], 0, 5 * MBPS, 20 * MS))
        .expect("consistent area");

    assert!(result.is_admitted());
    assert_eq!(
        result.hops(),
        &[Ipv4Addr::new(192, 168, 12, 2), Ipv4Addr::new(192, 168, 23, 2)]
    );
}

#[test]
fn test_line_rejects_excessive_floor() {
    let area = line(10 * MBPS, 5 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 23, 2], 0, 20 * MBPS, 20 * MS))
        .expect("consistent area");

    assert!(!result.is_admitted());
    assert!(result.hops().is_empty());
    assert_eq!(result.reject_reason(), Some(RejectReason::NoFeasiblePath));
}

#[test]
fn test_line_rejects_tight_ceiling() {
    let area = line(10 * MBPS, 5 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 23, 2], 0, MBPS, 9 * MS))
        .expect("consistent area");
    assert_eq!(result.reject_reason(), Some(RejectReason::NoFeasiblePath));
}

#[test]
fn test_destination_is_any_router_address() {
    // R2 is found by its address on the far subnet too
    let area = line(10 * MBPS, 5 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 23, 2], [192, 168, 12, 2], 0, MBPS, 10 * MS))
        .expect("consistent area");
    assert_eq!(result.hops(), &[Ipv4Addr::new(192, 168, 23, 1)]);
}

// =========================================================================
// Parallel links
// =========================================================================

#[test]
fn test_parallel_links_prefer_lower_delay() {
    let area = parallel(10 * MBPS, 10 * MS, 3 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 12, 2], 0, 5 * MBPS, 5 * MS))
        .expect("consistent area");

    assert!(result.is_admitted());
    assert_eq!(result.hops(), &[Ipv4Addr::new(192, 168, 112, 2)]);
}

#[test]
fn test_parallel_links_order_does_not_matter() {
    let area = parallel(10 * MBPS, 3 * MS, 10 * MS);
    let result = controller()
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 12, 2], 0, 5 * MBPS, 5 * MS))
        .expect("consistent area");
    assert_eq!(result.hops(), &[Ipv4Addr::new(192, 168, 12, 2)]);
}

// =========================================================================
// Ring with a chord
// =========================================================================

#[test]
fn test_ring_takes_fewest_hops_that_fit() {
    let area = ring_with_chord(1);
    let result = controller()
        .admit(&area, &request([10, 1, 12, 1], [10, 1, 23, 2], 0, MBPS, 5 * MS))
        .expect("consistent area");
    assert_eq!(
        result.hops(),
        &[Ipv4Addr::new(10, 1, 12, 2), Ipv4Addr::new(10, 1, 23, 2)]
    );
}

#[test]
fn test_ring_wide_floor_goes_around() {
    let area = ring_with_chord(1);
    let result = controller()
        .admit(&area, &request([10, 1, 12, 1], [10, 1, 23, 2], 0, 10 * MBPS, 45 * MS))
        .expect("consistent area");
    assert_eq!(
        result.hops(),
        &[Ipv4Addr::new(10, 1, 14, 2), Ipv4Addr::new(10, 1, 34, 2)]
    );
}

#[test]
fn test_ring_without_feasible_path() {
    // R1-R4-R3 is 40 ms and every other way to R3 crosses a narrow link
    let area = ring_with_chord(1);
    let result = controller()
        .admit(&area, &request([10, 1, 12, 1], [10, 1, 23, 2], 0, 10 * MBPS, 30 * MS))
        .expect("consistent area");
    assert_eq!(result.reject_reason(), Some(RejectReason::NoFeasiblePath));
}

#[test]
fn test_priority_selects_queue_on_multi_queue_links() {
    let area = ring_with_chord(3);
    let c = controller();
    for priority in [0x00, 0x60, 0xE0] {
        let result = c
            .admit(&area, &request([10, 1, 12, 1], [10, 1, 23, 2], priority, MBPS, 5 * MS))
            .expect("consistent area");
        assert!(result.is_admitted(), "priority {:#x}", priority);
    }
    // distinct priorities are distinct sessions
    assert_eq!(c.sessions().len(), 3);
}

#[test]
fn test_admitted_routes_meet_their_constraint() {
    let areas = [
        line(10 * MBPS, 5 * MS),
        parallel(10 * MBPS, 10 * MS, 3 * MS),
        ring_with_chord(2),
    ];
    let endpoints = [
        ([192, 168, 12, 1], [192, 168, 23, 2]),
        ([192, 168, 12, 1], [192, 168, 112, 2]),
        ([10, 1, 12, 1], [10, 1, 23, 2]),
        ([10, 1, 14, 1], [10, 1, 24, 1]),
    ];
    let constraints = [
        (MBPS, 5 * MS),
        (MBPS, 50 * MS),
        (5 * MBPS, 20 * MS),
        (10 * MBPS, 45 * MS),
        (50 * MBPS, 100 * MS),
    ];

    let c = controller();
    let mut admitted = 0;
    for area in &areas {
        for &(src, dst) in &endpoints {
            for &(floor, ceiling) in &constraints {
                let req = request(src, dst, 0, floor, ceiling);
                let result = c.admit(area, &req).expect("consistent area");
                if !result.is_admitted() || result.hops().is_empty() {
                    continue;
                }
                admitted += 1;
                let metric = walk_route(area, req.flow.source_address, result.hops(), 0)
                    .expect("route follows advertised links");
                assert!(
                    metric.satisfies(&req.constraint),
                    "{:?} over {:?} gives {:?}",
                    req.constraint,
                    result.hops(),
                    metric
                );
            }
        }
    }
    assert!(admitted > 0);
}

// =========================================================================
// Metric codec
// =========================================================================

#[test]
fn test_metric_codec_bound_at_one_megabyte() {
    let encoded = metric::encode(1_000_000.0).expect("in range");
    let decoded = encoded.value();
    assert!(decoded <= 1_000_000.0);
    assert!(1_000_000.0 - decoded < encoded.step());
}
