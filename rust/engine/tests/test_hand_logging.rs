use std::fs;
use std::io::{BufRead, BufReader};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

use holdem_engine::action::Action;
use holdem_engine::config::GameConfig;
use holdem_engine::engine::Engine;
use holdem_engine::events::{CallbackSink, EventLog, GameEvent};
use holdem_engine::logger::{format_hand_id, HandLogger, HandRecord, JsonlSink};
use tracing::Level;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::{Layer, Registry};

fn three_handed(seed: u64) -> GameConfig {
    GameConfig::with_players(3).with_starting_chips(100).with_seed(seed)
}

#[test]
fn event_order_for_an_uncontested_hand() {
    let log = EventLog::new();
    let mut engine = Engine::new(three_handed(1))
        .unwrap()
        .with_event_sink(log.clone());
    engine.start_new_hand();
    assert_eq!(log.names(), vec!["HAND_STARTED", "BLINDS_POSTED", "CARDS_DEALT"]);

    log.clear();
    engine.execute_action(Action::fold(0)).unwrap();
    engine.execute_action(Action::fold(1)).unwrap();
    engine.end_hand().unwrap();
    assert_eq!(
        log.names(),
        vec![
            "PLAYER_ACTION",
            "PLAYER_ACTION",
            "CHIPS_RETURNED",
            "BETTING_ROUND_COMPLETE",
            "PHASE_CHANGED",
            "POT_AWARDED",
            "HAND_ENDED",
        ]
    );
}

#[test]
fn rejected_actions_publish_nothing() {
    let log = EventLog::new();
    let mut engine = Engine::new(three_handed(1))
        .unwrap()
        .with_event_sink(log.clone());
    engine.start_new_hand();
    let published = log.len();
    assert!(engine.execute_action(Action::check(0)).is_err());
    assert_eq!(log.len(), published);
}

#[test]
fn channel_sink_receives_events_in_order() {
    let (tx, rx) = mpsc::channel::<GameEvent>();
    let mut engine = Engine::new(three_handed(2)).unwrap().with_event_sink(tx);
    engine.start_new_hand();
    engine.execute_action(Action::call(0)).unwrap();

    let names: Vec<&str> = rx.try_iter().map(|e| e.name()).collect();
    assert_eq!(
        names,
        vec!["HAND_STARTED", "BLINDS_POSTED", "CARDS_DEALT", "PLAYER_ACTION"]
    );
}

#[test]
fn callback_sink_never_sees_hole_cards() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink_seen = Arc::clone(&seen);
    let mut engine = Engine::new(three_handed(3))
        .unwrap()
        .with_event_sink(CallbackSink(move |e: &GameEvent| {
            sink_seen
                .lock()
                .unwrap()
                .push(serde_json::to_string(e).unwrap());
        }));
    engine.start_new_hand();

    let lines = seen.lock().unwrap().clone();
    let dealt = lines.iter().find(|l| l.contains("CARDS_DEALT")).unwrap();
    let v: serde_json::Value = serde_json::from_str(dealt).unwrap();
    assert_eq!(v["type"], "CARDS_DEALT");
    assert_eq!(v["seats"], serde_json::json!([1, 2, 0]));
    assert!(v["board"].as_array().unwrap().is_empty());

    assert!(lines.iter().all(|l| !l.contains("hole_cards")));
    assert_eq!(engine.state().player(0).unwrap().hole_cards.len(), 2);
}

#[test]
fn jsonl_sink_writes_one_event_per_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events.jsonl");
    let sink = JsonlSink::create(&path).unwrap();
    let mut engine = Engine::new(three_handed(4)).unwrap().with_event_sink(sink);
    engine.start_new_hand();
    engine.execute_action(Action::fold(0)).unwrap();
    drop(engine);

    let content = fs::read_to_string(&path).unwrap();
    assert!(!content.contains('\r'));
    let lines: Vec<serde_json::Value> = content
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0]["type"], "HAND_STARTED");
    assert_eq!(lines[0]["hand_number"], 1);
    assert_eq!(lines[3]["type"], "PLAYER_ACTION");
    assert_eq!(lines[3]["action"], "fold");
    assert!(lines[3]["timestamp"].as_str().unwrap().ends_with('Z'));
}

#[test]
fn hand_logger_writes_a_record_per_hand() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("hands.jsonl");
    let logger = HandLogger::create(&path).unwrap();
    let mut engine = Engine::new(three_handed(5))
        .unwrap()
        .with_hand_logger(logger);

    for _ in 0..2 {
        engine.start_new_hand();
        let first = engine.current_player().unwrap();
        engine.execute_action(Action::fold(first)).unwrap();
        let second = engine.current_player().unwrap();
        engine.execute_action(Action::fold(second)).unwrap();
        engine.end_hand().unwrap();
    }
    let record = engine.last_hand_record().unwrap();
    assert!(record.hand_id.ends_with("-000002"));
    assert_eq!(record.actions.len(), 2);
    assert!(record.showdown.is_none());
    drop(engine);

    let file = fs::File::open(&path).unwrap();
    let records: Vec<HandRecord> = BufReader::new(file)
        .lines()
        .map(|l| serde_json::from_str(&l.unwrap()).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].hand_number, 1);
    assert_eq!(records[0].seed, Some(5));
    assert!(records[0].ts.is_some());
    assert_eq!(records[1].dealer, 1);
    assert!(records[1].result.as_deref().unwrap().contains("wins"));
}

#[test]
fn action_records_track_chip_movement() {
    let mut engine = Engine::new(three_handed(6)).unwrap();
    engine.start_new_hand();
    engine.execute_action(Action::raise_to(0, 10)).unwrap();
    engine.execute_action(Action::call(1)).unwrap();

    let log = &engine.state().action_log;
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].amount, 10);
    assert_eq!((log[0].chips_before, log[0].chips_after), (100, 90));
    assert_eq!((log[0].pot_before, log[0].pot_after), (3, 13));
    assert_eq!(log[1].amount, 9);
    assert_eq!(log[1].street_index, 2);
}

#[test]
fn hand_ids_are_date_and_sequence() {
    assert_eq!(format_hand_id("20250102", 7), "20250102-000007");
    let mut logger = HandLogger::with_seq_for_test("20250102");
    assert_eq!(logger.next_id(), "20250102-000001");
    assert_eq!(logger.next_id(), "20250102-000002");
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<(Level, String)>>>);

struct CaptureLayer(Captured);

impl<S: tracing::Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        struct Message(String);
        impl tracing::field::Visit for Message {
            fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
                if field.name() == "message" {
                    self.0 = format!("{value:?}");
                }
            }
        }
        let mut msg = Message(String::new());
        event.record(&mut msg);
        self.0 .0.lock().unwrap().push((*event.metadata().level(), msg.0));
    }
}

#[test]
fn engine_logs_through_tracing() {
    let captured = Captured::default();
    let subscriber = Registry::default().with(CaptureLayer(captured.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let mut engine = Engine::new(three_handed(7)).unwrap();
        engine.start_new_hand();
        let _ = engine.execute_action(Action::check(0));
        engine.execute_action(Action::fold(0)).unwrap();
        engine.execute_action(Action::fold(1)).unwrap();
        engine.end_hand().unwrap();
    });

    let entries = captured.0.lock().unwrap().clone();
    let has = |level: Level, text: &str| {
        entries
            .iter()
            .any(|(l, m)| *l == level && m.contains(text))
    };
    assert!(has(Level::INFO, "hand started"));
    assert!(has(Level::WARN, "action rejected"));
    assert!(has(Level::DEBUG, "action applied"));
    assert!(has(Level::INFO, "pot awarded"));
    assert!(has(Level::INFO, "hand ended"));
}

#[test]
fn round_cap_is_logged_as_a_warning() {
    let captured = Captured::default();
    let subscriber = Registry::default().with(CaptureLayer(captured.clone()));

    tracing::subscriber::with_default(subscriber, || {
        let mut engine = Engine::new(GameConfig::heads_up().with_seed(3)).unwrap();
        engine.start_new_hand();
        let result = engine.process_betting_round(|seat, snapshot| {
            Ok(Action::raise_to(seat, snapshot.min_raise_to))
        });
        assert!(result.is_err());
    });

    let entries = captured.0.lock().unwrap().clone();
    assert!(entries
        .iter()
        .any(|(l, m)| *l == Level::WARN && m.contains("iteration cap")));
}
