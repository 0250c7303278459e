//! Facade, worker isolation and lifecycle.

mod common;

use common::{RecordingSink, seen};
use rust_decimal::Decimal;
use satchel_core::config::{DebounceConfig, DebounceConfigError, DispatchConfig};
use satchel_core::dispatch::{EventDispatcher, StartError};
use satchel_core::events::{CoreEvent, EventKind, EventSink, SinkError};
use satchel_sdk::objects::{
    AlertType, BitcoinNetworkSummary, BitcoinSent, ChangePasswordResult, ExchangeSummary,
    ExportPerformed, HistoryEntry, Satoshis, SecuritySummary, Severity, ShutdownType,
    TransactionCreation, WalletId,
};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::OffsetDateTime;
use uuid::Uuid;

fn start_with(config: DispatchConfig, sink: Arc<dyn EventSink>) -> EventDispatcher {
    EventDispatcher::new(config, sink).unwrap()
}

fn start(sink: Arc<RecordingSink>) -> EventDispatcher {
    start_with(DispatchConfig::default(), sink)
}

fn fire_one_of_each(dispatcher: &EventDispatcher) {
    dispatcher.fire_exchange_rate_changed(
        Decimal::new(6_512_345, 2),
        "USD",
        Some("Bitstamp".into()),
        OffsetDateTime::now_utc(),
    );
    dispatcher.fire_exchange_status_changed(ExchangeSummary::ok("Bitstamp"));
    dispatcher.fire_transaction_created(TransactionCreation {
        txid: Some("f00d".into()),
        amount: Satoshis(50_000),
        fee: Some(Satoshis(1_000)),
        destination: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".into(),
        note: None,
        success: true,
        failure_reason: None,
    });
    dispatcher.fire_bitcoin_sent(BitcoinSent {
        destination: "1BoatSLRHtKNngkdXEeobR76b53LETtpyT".into(),
        amount: Satoshis(50_000),
        success: true,
        failure_reason: None,
    });
    dispatcher.fire_change_password_result(ChangePasswordResult {
        success: false,
        failure_reason: Some("wrong password".into()),
    });
    dispatcher.fire_transaction_seen(seen(1));
    dispatcher.fire_bitcoin_network_changed(BitcoinNetworkSummary::downloading(42, 8));
    dispatcher.fire_backup_wallet_loaded(WalletId(Uuid::new_v4()), "/tmp/backup.zip");
    dispatcher.fire_security_alert(SecuritySummary {
        alert: AlertType::DebuggerAttached,
        severity: Severity::Red,
    });
    dispatcher.fire_history_changed(HistoryEntry::now("wallet opened"));
    dispatcher.fire_shutdown(ShutdownType::Soft);
    dispatcher.fire_configuration_changed();
    dispatcher.fire_export_performed(ExportPerformed {
        success: true,
        transactions_file: Some("/tmp/tx.csv".into()),
        contacts_file: None,
        failure_reason: None,
    });
}

#[test]
fn test_every_kind_reaches_the_sink() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = start(sink.clone());

    fire_one_of_each(&dispatcher);

    // 13 published kinds, transaction-seen also produces its consolidated event
    assert!(sink.wait_for(Duration::from_secs(5), |s| s.len() == 14));
    let kinds: HashSet<EventKind> = sink.events().iter().map(|r| r.event.kind()).collect();
    assert_eq!(kinds.len(), EventKind::ALL.len());

    // Joining the workers settles the counters.
    dispatcher.shutdown();
    let stats = dispatcher.stats();
    assert_eq!(stats.submitted, 12, "network changes bypass the pools");
    assert_eq!(stats.delivered, 14);
    assert_eq!(stats.submission_failures, 0);
}

#[test]
fn test_network_change_is_posted_before_returning() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = start(sink.clone());

    dispatcher.fire_bitcoin_network_changed(BitcoinNetworkSummary::downloading(0, 0));

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].thread, std::thread::current().id());
    assert_eq!(events[0].event.kind(), EventKind::BitcoinNetworkChanged);
}

#[test]
fn test_pooled_events_run_on_general_lanes() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = start(sink.clone());

    dispatcher.fire_configuration_changed();
    dispatcher.fire_security_alert(SecuritySummary {
        alert: AlertType::BackupStale,
        severity: Severity::Amber,
    });

    assert!(sink.wait_for(Duration::from_secs(2), |s| s.len() == 2));
    for recorded in sink.events() {
        let name = recorded.thread_name.unwrap_or_default();
        assert!(name.starts_with("core-events-"), "ran on {name}");
    }
}

#[test]
fn test_single_producer_order_is_kept_per_kind() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = start(sink.clone());

    for n in 0..100 {
        dispatcher.fire_history_changed(HistoryEntry::now(n.to_string()));
        dispatcher.fire_exchange_status_changed(ExchangeSummary::ok(n.to_string()));
    }

    assert!(sink.wait_for(Duration::from_secs(5), |s| s.len() == 200));

    let history: Vec<String> = sink
        .of_kind(EventKind::HistoryChanged)
        .into_iter()
        .filter_map(|r| match r.event {
            CoreEvent::HistoryChanged { entry } => Some(entry.description.to_string()),
            _ => None,
        })
        .collect();
    let status: Vec<String> = sink
        .of_kind(EventKind::ExchangeStatusChanged)
        .into_iter()
        .filter_map(|r| match r.event {
            CoreEvent::ExchangeStatusChanged { summary } => summary.provider.map(|p| p.to_string()),
            _ => None,
        })
        .collect();
    let expected: Vec<String> = (0..100).map(|n: i32| n.to_string()).collect();
    assert_eq!(history, expected);
    assert_eq!(status, expected);
}

#[test]
fn test_slow_sink_does_not_block_producers() {
    let sink = Arc::new(RecordingSink::slow(Duration::from_millis(100)));
    let dispatcher = start(sink.clone());

    let started = Instant::now();
    for _ in 0..10 {
        fire_one_of_each_pooled(&dispatcher);
    }
    let elapsed = started.elapsed();

    assert!(
        elapsed < Duration::from_millis(100),
        "facade blocked for {elapsed:?}"
    );
    assert_eq!(dispatcher.stats().submission_failures, 0);
}

fn fire_one_of_each_pooled(dispatcher: &EventDispatcher) {
    dispatcher.fire_configuration_changed();
    dispatcher.fire_transaction_seen(seen(3));
    dispatcher.fire_shutdown(ShutdownType::Hard);
    dispatcher.fire_exchange_status_changed(ExchangeSummary::ok("Kraken"));
}

#[test]
fn test_slow_kind_does_not_hold_back_other_kinds() {
    // Only history posts are slow.
    let sink = Arc::new(RecordingSink::new());
    let recorder = sink.clone();
    let slow_history = move |event: CoreEvent| -> Result<(), SinkError> {
        if event.kind() == EventKind::HistoryChanged {
            std::thread::sleep(Duration::from_millis(300));
        }
        recorder.post(event)
    };
    let dispatcher = start_with(DispatchConfig::default(), Arc::new(slow_history));

    dispatcher.fire_history_changed(HistoryEntry::now("slow"));
    dispatcher.fire_configuration_changed();

    assert!(sink.wait_for(Duration::from_millis(200), |s| {
        s.count(EventKind::ConfigurationChanged) == 1
    }));
    assert_eq!(sink.count(EventKind::HistoryChanged), 0);
    assert!(sink.wait_for(Duration::from_secs(2), |s| {
        s.count(EventKind::HistoryChanged) == 1
    }));
}

#[test]
fn test_panicking_sink_does_not_kill_worker() {
    let sink = Arc::new(RecordingSink::new());
    let recorder = sink.clone();
    let flaky = move |event: CoreEvent| -> Result<(), SinkError> {
        if let CoreEvent::ExchangeStatusChanged { summary } = &event {
            if summary.provider.as_deref() == Some("boom") {
                panic!("consumer blew up");
            }
        }
        recorder.post(event)
    };
    let dispatcher = start_with(DispatchConfig::default(), Arc::new(flaky));

    dispatcher.fire_exchange_status_changed(ExchangeSummary::ok("boom"));
    dispatcher.fire_exchange_status_changed(ExchangeSummary::ok("fine"));

    assert!(sink.wait_for(Duration::from_secs(2), |s| {
        s.count(EventKind::ExchangeStatusChanged) == 1
    }));
    dispatcher.shutdown();
    let stats = dispatcher.stats();
    assert_eq!(stats.delivery_failures, 1);
    assert_eq!(stats.delivered, 1);
}

#[test]
fn test_sink_errors_are_counted_not_raised() {
    let rejecting = |_: CoreEvent| -> Result<(), SinkError> {
        Err(SinkError::Rejected("presentation layer not ready".into()))
    };
    let dispatcher = start_with(DispatchConfig::default(), Arc::new(rejecting));

    dispatcher.fire_configuration_changed();
    dispatcher.fire_bitcoin_network_changed(BitcoinNetworkSummary::downloading(10, 1));
    dispatcher.shutdown();

    let stats = dispatcher.stats();
    assert_eq!(stats.delivery_failures, 2);
    assert_eq!(stats.delivered, 0);
}

#[test]
fn test_full_queue_is_a_submission_failure() {
    let sink = Arc::new(RecordingSink::slow(Duration::from_millis(300)));
    let config = DispatchConfig {
        pool_size: 1,
        queue_capacity: 2,
        ..DispatchConfig::default()
    };
    let dispatcher = start_with(config, sink.clone());

    for _ in 0..10 {
        dispatcher.fire_configuration_changed();
    }

    let stats = dispatcher.stats();
    assert_eq!(stats.submitted + stats.submission_failures, 10);
    assert!(stats.submission_failures >= 7, "{stats:?}");
}

#[test]
fn test_shutdown_drains_queued_events() {
    let sink = Arc::new(RecordingSink::slow(Duration::from_millis(20)));
    let config = DispatchConfig {
        pool_size: 1,
        ..DispatchConfig::default()
    };
    let dispatcher = start_with(config, sink.clone());

    for _ in 0..10 {
        dispatcher.fire_configuration_changed();
    }
    dispatcher.shutdown();

    assert_eq!(sink.count(EventKind::ConfigurationChanged), 10);
    assert!(dispatcher.is_shut_down());
}

#[test]
fn test_firing_after_shutdown_is_swallowed() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = start(sink.clone());
    dispatcher.shutdown();
    dispatcher.shutdown();

    fire_one_of_each_pooled(&dispatcher);

    let stats = dispatcher.stats();
    assert_eq!(stats.submission_failures, 4);
    assert_eq!(stats.submitted, 0);
    assert!(sink.events().is_empty());
}

#[test]
fn test_shutdown_from_inside_the_sink() {
    let slot: Arc<std::sync::OnceLock<EventDispatcher>> = Arc::default();
    let handle = slot.clone();
    let sink = move |event: CoreEvent| -> Result<(), SinkError> {
        if let (CoreEvent::ShutdownRequested { .. }, Some(dispatcher)) = (&event, handle.get()) {
            dispatcher.shutdown();
        }
        Ok(())
    };
    let dispatcher = start_with(DispatchConfig::default(), Arc::new(sink));
    let _ = slot.set(dispatcher.clone());

    dispatcher.fire_shutdown(ShutdownType::Hard);

    let started = Instant::now();
    while !dispatcher.is_shut_down() && started.elapsed() < Duration::from_secs(2) {
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(dispatcher.is_shut_down());
}

#[test]
fn test_empty_pool_is_rejected() {
    let config = DispatchConfig {
        pool_size: 0,
        ..DispatchConfig::default()
    };
    let result = EventDispatcher::new(config, Arc::new(RecordingSink::new()));
    assert!(matches!(result, Err(StartError::EmptyPool)));

    let config = DispatchConfig {
        queue_capacity: 0,
        ..DispatchConfig::default()
    };
    let result = EventDispatcher::new(config, Arc::new(RecordingSink::new()));
    assert!(matches!(result, Err(StartError::EmptyQueue)));
}

#[test]
fn test_unusable_debounce_settings_are_rejected() {
    let config = DispatchConfig {
        debounce: DebounceConfig {
            window: Duration::from_millis(500),
            armed_ttl: Duration::from_millis(200),
        },
        ..DispatchConfig::default()
    };
    let result = EventDispatcher::new(config, Arc::new(RecordingSink::new()));
    assert!(matches!(
        result,
        Err(StartError::InvalidDebounce(
            DebounceConfigError::TtlNotAfterWindow { .. }
        ))
    ));

    let config = DispatchConfig {
        debounce: DebounceConfig::with_window(Duration::MAX),
        ..DispatchConfig::default()
    };
    let result = EventDispatcher::new(config, Arc::new(RecordingSink::new()));
    assert!(matches!(
        result,
        Err(StartError::InvalidDebounce(
            DebounceConfigError::WindowTooLong { .. }
        ))
    ));
}
