//! Persistence behavior: best-effort background saves, explicit saves,
//! snapshot round-trips and last-write-wins adoption.

use std::sync::Arc;

use wirekit::prelude::*;
use wirekit::ids::SequentialIds;
use wirekit::persist::{DiagramPersistence, MemoryPersistence};

fn store_with(persistence: Arc<MemoryPersistence>) -> DiagramStore {
    DiagramStore::new("proj")
        .with_ids(Arc::new(SequentialIds::default()))
        .with_persistence(persistence)
}

#[tokio::test]
async fn save_now_persists_snapshot() {
    let persistence = Arc::new(MemoryPersistence::new());
    let mut store = store_with(Arc::clone(&persistence));

    store.add_connection(
        Connection::new("c1", "mcu", "vcc", "led", "positive", WireKind::Power),
        &[],
    );
    store.save_now().await.unwrap();

    let stored = persistence.load("proj").await.unwrap().unwrap();
    assert_eq!(stored.connections.len(), 1);
    assert_eq!(stored.components.len(), 2);
}

#[tokio::test]
async fn background_save_failure_keeps_local_state() {
    struct FailingPersistence;

    #[async_trait::async_trait]
    impl DiagramPersistence for FailingPersistence {
        async fn load(&self, _: &str) -> Result<Option<Diagram>, WirekitError> {
            Err(WirekitError::Persistence("service down".into()))
        }
        async fn save(&self, _: &str, _: &Diagram) -> Result<Diagram, WirekitError> {
            Err(WirekitError::Persistence("service down".into()))
        }
        async fn validate(
            &self,
            _: &str,
            _: &Diagram,
        ) -> Result<ValidationReport, WirekitError> {
            Err(WirekitError::Persistence("service down".into()))
        }
    }

    let mut store = DiagramStore::new("proj")
        .with_ids(Arc::new(SequentialIds::default()))
        .with_persistence(Arc::new(FailingPersistence));

    store.add_connection(
        Connection::new("c1", "mcu", "vcc", "led", "positive", WireKind::Power),
        &[],
    );
    // The failed save is logged; in-memory state stays authoritative.
    assert!(store.save_now().await.is_err());
    assert_eq!(store.diagram().unwrap().connections.len(), 1);
}

#[tokio::test]
async fn snapshot_roundtrip_is_lossless() {
    let persistence = MemoryPersistence::new();
    let mut diagram = Diagram::new("d1", "Bench rig");
    diagram.connections.push(Connection::new(
        "c1", "mcu", "NOT_A_REAL_PIN", "led", "also_not_real", WireKind::Data,
    ));

    persistence.save("proj", &diagram).await.unwrap();
    let loaded = persistence.load("proj").await.unwrap().unwrap();

    // Unresolved endpoint tokens survive storage untouched.
    assert_eq!(loaded.connections[0].from_pin, "NOT_A_REAL_PIN");
    assert_eq!(loaded.connections[0].to_pin, "also_not_real");
}

#[tokio::test]
async fn remote_validate_matches_local() {
    let persistence = MemoryPersistence::new();
    let mut diagram = Diagram::new("d1", "Bad rig");
    diagram.connections.push(Connection::new(
        "c1", "ghost", "vcc", "phantom", "gnd", WireKind::Power,
    ));

    let report = persistence.validate("proj", &diagram).await.unwrap();
    assert!(!report.is_valid);
    assert_eq!(report.errors.len(), 2);
}
