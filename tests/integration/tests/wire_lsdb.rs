//! Integration test: advertisements on the wire, through the link-state
//! database, into admission.

use std::net::Ipv4Addr;

use bytes::Bytes;
use qospf_core::lsa::{self, INITIAL_SEQUENCE_NUMBER};
use qospf_core::{LsaBody, QospfConfig, RouterLsa};
use qospf_routing::{AreaLsdb, LinkStateDatabase, RoutingError, SessionAdmissionController};
use qospf_integration_tests::*;

fn database(area: &[RouterLsa]) -> LinkStateDatabase {
    let db = LinkStateDatabase::new();
    for router in area {
        assert!(db.install_router(router));
    }
    db
}

#[test]
fn test_wire_dump_reloads_into_equal_decisions() {
    let original = database(&line(10 * MBPS, 5 * MS));
    let dump = hex::encode(original.to_wire());

    let reloaded = LinkStateDatabase::new();
    let installed = reloaded
        .install_from_wire(Bytes::from(hex::decode(dump).unwrap()))
        .unwrap();
    assert_eq!(installed, 3);
    assert_eq!(reloaded.router_advertisements(), original.router_advertisements());

    let req = request([192, 168, 12, 1], [192, 168, 23, 2], 0, 5 * MBPS, 20 * MS);
    let controller = SessionAdmissionController::new(QospfConfig::default());
    let a = controller.admit(&original, &req).unwrap();
    let b = controller.admit(&reloaded, &req).unwrap();
    assert_eq!(a.hops(), b.hops());
    assert_eq!(a.session_id, b.session_id);
}

#[test]
fn test_newer_advertisement_changes_decision() {
    let db = database(&line(10 * MBPS, 5 * MS));
    let controller = SessionAdmissionController::new(QospfConfig::default());
    let req = request([192, 168, 12, 1], [192, 168, 23, 2], 0, 5 * MBPS, 20 * MS);
    assert!(controller.admit(&db, &req).unwrap().is_admitted());

    // R2 re-advertises with most of its bandwidth gone
    let mut congested = line(2 * MBPS, 5 * MS).remove(1);
    congested.sequence_number = INITIAL_SEQUENCE_NUMBER + 1;
    assert!(db.install_router(&congested));
    assert_eq!(db.len(), 3);

    let result = controller.admit(&db, &req).unwrap();
    assert!(!result.is_admitted());
    let session = controller.sessions().get(&req.key()).unwrap();
    assert_eq!(session.retries, 2);
    assert!(!session.admitted);
    assert!(session.admitted_at.is_some());

    // an older instance is ignored
    let stale = line(10 * MBPS, 5 * MS).remove(1);
    assert!(!db.install_router(&stale));
}

#[test]
fn test_non_router_advertisements_are_kept_but_ignored() {
    let db = database(&line(10 * MBPS, 5 * MS));
    let mut network = line(10 * MBPS, 5 * MS)[0].to_lsa();
    network.header.lsa_type = qospf_core::LsaType::Network;
    network.body = LsaBody::Network(vec![255, 255, 255, 252, 10, 0, 0, 1]);
    let encoded = network.encode();

    assert_eq!(db.install_from_wire(encoded).unwrap(), 1);
    assert_eq!(db.len(), 4);
    assert_eq!(db.router_advertisements().len(), 3);

    let result = SessionAdmissionController::new(QospfConfig::default())
        .admit(&db, &request([192, 168, 12, 1], [192, 168, 23, 2], 0, MBPS, 20 * MS))
        .unwrap();
    assert!(result.is_admitted());
}

#[test]
fn test_truncated_stream_is_rejected() {
    let wire = database(&line(10 * MBPS, 5 * MS)).to_wire();
    let cut = wire.slice(..wire.len() - 3);
    let err = LinkStateDatabase::new().install_from_wire(cut).unwrap_err();
    assert!(matches!(err, RoutingError::Core(_)));
}

#[test]
fn test_stream_decodes_to_router_advertisements() {
    let area = parallel(10 * MBPS, 10 * MS, 3 * MS);
    let lsas: Vec<_> = area.iter().map(RouterLsa::to_lsa).collect();
    let wire = lsa::encode_stream(&lsas);
    let decoded = lsa::decode_stream(wire).unwrap();
    let routers: Vec<RouterLsa> = decoded.iter().filter_map(|l| l.router()).collect();
    assert_eq!(routers, area);
    assert_eq!(routers[0].links[0].link_data, Ipv4Addr::new(192, 168, 12, 1));
}

#[test]
fn test_unpaired_link_is_a_consistency_error() {
    // R9 advertises a link to a router nobody knows about
    let mut area = line(10 * MBPS, 5 * MS);
    area.push(router(9, vec![link(0, [172, 16, 0, 1], 8, MBPS, MS, 1)]));
    let err = SessionAdmissionController::new(QospfConfig::default())
        .admit(&area, &request([192, 168, 12, 1], [192, 168, 23, 2], 0, MBPS, 20 * MS))
        .unwrap_err();
    assert!(matches!(err, RoutingError::DatabaseConsistency(_)));
}
