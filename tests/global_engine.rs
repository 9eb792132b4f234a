//! `#[audited]` code reporting to the process-wide engine.

use callaudit::prelude::*;
use callaudit::{AuditError, MultiSink, StaticTag};

struct Inventory;

#[audited]
impl Inventory {
    fn reserve(&self, sku: &str, quantity: u32) -> bool {
        !sku.is_empty() && quantity > 0
    }
}

#[audited]
fn checksum(#[do_not_audit] payload: &[u8]) -> u32 {
    payload.iter().map(|b| u32::from(*b)).sum()
}

#[test]
fn test_global_engine() {
    // Before installation audited code runs against a disabled engine
    assert!(!callaudit::global().is_enabled());
    assert_eq!(checksum(&[1, 2, 3]), 6);

    let sink = MemorySink::new();
    let engine = AuditEngine::builder()
        .config(AuditConfig::new().application_name("inventory"))
        .tag_provider(StaticTag::new("node-1"))
        .sink(MultiSink::new().with_sink(sink.clone()).with_sink(TracingSink::new()))
        .build();
    install(engine).unwrap();

    assert!(matches!(
        install(AuditEngine::disabled()),
        Err(AuditError::AlreadyInstalled)
    ));

    assert!(Inventory.reserve("A-1", 2));
    assert_eq!(checksum(&[4, 5]), 9);

    let lines = sink.lines();
    let module = module_path!();
    assert_eq!(
        lines,
        vec![
            format!(
                "[ inventory ] - [ node-1 ] Entering >>> {}::Inventory.reserve Arguments: {{ sku=A-1 quantity=2 }}",
                module
            ),
            format!(
                "[ inventory ] - [ node-1 ] Exiting <<< {}::Inventory.reserve Returned: true",
                module
            ),
            format!(
                "[ inventory ] - [ node-1 ] Entering >>> {}.checksum Arguments: {{  }}",
                module
            ),
            format!(
                "[ inventory ] - [ node-1 ] Exiting <<< {}.checksum Returned: 9",
                module
            ),
        ]
    );
}
