//! Integration tests for one-shot, filtered, throttled, replaying and
//! timeout-bounded listeners.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use buzz_events::{BusError, EventBus, Listener};
use buzz_test::{ErrorLog, Message, Recorder, message};

#[test]
fn once_fires_exactly_once() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();
    let subscription = bus.once("n", recorder.listener());

    for n in 0..10_u32 {
        bus.emit("n", n).unwrap();
    }

    assert_eq!(recorder.values(), vec![0]);
    subscription.unsubscribe();
}

#[test]
fn once_can_be_cancelled_before_delivery() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();

    bus.once("n", recorder.listener()).unsubscribe();
    bus.emit("n", 1_u32).unwrap();

    assert_eq!(recorder.count(), 0);
}

#[test]
fn once_fires_once_when_emissions_race() {
    let bus = EventBus::new();
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    bus.once(
        "n",
        Listener::new(move |_: &u32| {
            thread::sleep(Duration::from_millis(50));
            inner.fetch_add(1, Ordering::SeqCst);
        }),
    );

    let start = Barrier::new(2);
    thread::scope(|s| {
        for _ in 0..2 {
            s.spawn(|| {
                start.wait();
                bus.emit("n", 1_u32).unwrap();
            });
        }
    });

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(bus.listener_count("n"), 0);
}

#[test]
fn once_listener_reemitting_its_event_runs_once() {
    let bus = EventBus::new();
    let weak = bus.downgrade();
    let count = Arc::new(AtomicUsize::new(0));
    let inner = Arc::clone(&count);
    bus.once(
        "n",
        Listener::new(move |n: &u32| {
            inner.fetch_add(1, Ordering::SeqCst);
            if let Some(bus) = weak.upgrade() {
                bus.emit("n", n.saturating_add(1)).unwrap();
            }
        }),
    );

    bus.emit("n", 1_u32).unwrap();

    assert_eq!(count.load(Ordering::SeqCst), 1);
    assert_eq!(bus.listener_count("n"), 0);
}

#[test]
fn failing_once_listener_retries_on_next_emission() {
    let bus = EventBus::new();
    let errors = ErrorLog::attach(&bus);
    let recorder = Recorder::<u32>::failing("not yet");
    bus.once("n", recorder.listener());

    bus.emit("n", 1_u32).unwrap();
    bus.emit("n", 2_u32).unwrap();

    assert_eq!(recorder.values(), vec![1, 2]);
    assert_eq!(errors.count(), 2);
    assert_eq!(bus.listener_count("n"), 1);
}

#[test]
fn filter_passes_matching_payloads_only() {
    let bus = EventBus::new();
    let recorder = Recorder::<Message>::new();
    bus.filter("chat", recorder.listener(), |m: &Message| m.text.starts_with('!'));

    bus.emit("chat", message("hello")).unwrap();
    bus.emit("chat", message("!help")).unwrap();

    assert_eq!(recorder.values(), vec![message("!help")]);
}

#[test]
fn replay_delivers_history_then_live_events() {
    let bus = EventBus::new();
    for n in 1..=4_u32 {
        bus.emit_with_history("n", n).unwrap();
    }

    let recorder = Recorder::<u32>::new();
    bus.replay("n", recorder.listener()).unwrap();
    assert_eq!(recorder.values(), vec![1, 2, 3, 4]);

    bus.emit("n", 5_u32).unwrap();
    bus.emit_with_history("n", 6_u32).unwrap();

    assert_eq!(recorder.values(), vec![1, 2, 3, 4, 5, 6]);
    assert_eq!(bus.history_len("n"), 5);
}

#[test]
fn replay_waits_for_recording_in_flight() {
    let bus = EventBus::new();
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    let (in_listener, held) = (Arc::clone(&entered), Arc::clone(&release));
    bus.on(
        "n",
        Listener::new(move |_: &u32| {
            in_listener.wait();
            held.wait();
        }),
    );

    let recorder = Recorder::<u32>::new();
    thread::scope(|s| {
        s.spawn(|| bus.emit_with_history("n", 42_u32).unwrap());
        entered.wait();

        let replaying = s.spawn(|| bus.replay("n", recorder.listener()).unwrap());
        thread::sleep(Duration::from_millis(50));
        release.wait();
        let _subscription = replaying.join().unwrap();
    });

    assert_eq!(recorder.values(), vec![42]);
    assert_eq!(bus.history_len("n"), 1);
}

#[test]
fn replay_of_other_typed_history_reports_mismatch() {
    let bus = EventBus::new();
    let errors = ErrorLog::attach(&bus);
    bus.emit_with_history("n", String::from("text")).unwrap();
    bus.emit_with_history("n", 1_u32).unwrap();

    let recorder = Recorder::<u32>::new();
    bus.replay("n", recorder.listener()).unwrap();

    assert_eq!(recorder.values(), vec![1]);
    assert_eq!(errors.kinds(), vec!["payload_mismatch"]);
}

#[tokio::test(start_paused = true)]
async fn throttle_delivers_once_per_interval() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();
    bus.throttle("n", recorder.listener(), Duration::from_millis(1000));

    bus.emit("n", 1_u32).unwrap();
    tokio::time::advance(Duration::from_millis(10)).await;
    bus.emit("n", 2_u32).unwrap();
    assert_eq!(recorder.values(), vec![1]);

    tokio::time::advance(Duration::from_millis(1500)).await;
    bus.emit("n", 3_u32).unwrap();
    assert_eq!(recorder.values(), vec![1, 3]);
}

#[tokio::test(start_paused = true)]
async fn throttle_window_is_measured_from_last_delivery() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();
    bus.throttle("n", recorder.listener(), Duration::from_millis(100));

    for n in 0..10_u32 {
        bus.emit("n", n).unwrap();
        tokio::time::advance(Duration::from_millis(30)).await;
    }

    // Deliveries at t=0, 120, 240.
    assert_eq!(recorder.values(), vec![0, 4, 8]);
}

#[tokio::test(start_paused = true)]
async fn once_with_timeout_delivers_before_deadline() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();
    bus.once_with_timeout("n", recorder.listener(), Duration::from_millis(50))
        .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    bus.emit("n", 1_u32).unwrap();
    assert_eq!(bus.listener_count("n"), 0);

    tokio::time::sleep(Duration::from_millis(100)).await;
    bus.emit("n", 2_u32).unwrap();
    assert_eq!(recorder.values(), vec![1]);
}

#[tokio::test(start_paused = true)]
async fn once_with_timeout_expires_without_event() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();
    let baseline = bus.listener_count("n");

    let subscription = bus
        .once_with_timeout("n", recorder.listener(), Duration::from_millis(50))
        .unwrap();
    assert!(subscription.is_active());

    tokio::time::sleep(Duration::from_millis(60)).await;

    assert!(!subscription.is_active());
    assert_eq!(bus.listener_count("n"), baseline);
    bus.emit("n", 1_u32).unwrap();
    assert_eq!(recorder.count(), 0);
}

#[test]
fn once_with_timeout_needs_a_runtime() {
    let bus = EventBus::new();
    let recorder = Recorder::<u32>::new();

    let result = bus.once_with_timeout("n", recorder.listener(), Duration::from_secs(1));

    assert!(matches!(result, Err(BusError::TimerUnavailable)));
    assert_eq!(bus.listener_count("n"), 0);
}

#[test]
fn adapters_are_not_removed_by_off() {
    let bus = EventBus::new();
    let listener: Listener<u32> = Recorder::<u32>::new().listener();

    bus.once("n", listener.clone());
    bus.filter("n", listener.clone(), |_| true);

    assert_eq!(bus.off("n", &listener), 0);
    assert_eq!(bus.listener_count("n"), 2);
}
