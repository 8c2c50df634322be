use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tokio::time;

use dinnervisor::{
    Config, Coordinator, Event, EventKind, PhilosopherId, RetryPolicy, Subscribe, TimingPolicy,
};

fn config(philosophers: usize, seats: usize, chopsticks: usize, timing: TimingPolicy) -> Config {
    let mut cfg = Config::with_philosophers(philosophers);
    cfg.seats = seats;
    cfg.chopsticks = chopsticks;
    cfg.timing = timing;
    cfg.bus_capacity = 16 * 1024;
    cfg
}

/// Resolves once every philosopher in `0..n` has started a meal.
async fn everyone_ate(mut rx: Receiver<Event>, n: usize) {
    let mut eaters = BTreeSet::new();
    while eaters.len() < n {
        match rx.recv().await {
            Ok(ev) if ev.kind == EventKind::Eating => {
                if let Some(id) = ev.philosopher {
                    eaters.insert(id);
                }
            }
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return,
        }
    }
}

/// Resolves once every philosopher in `0..n` has published something.
async fn everyone_started(mut rx: Receiver<Event>, n: usize) {
    let mut started = BTreeSet::new();
    while started.len() < n {
        match rx.recv().await {
            Ok(ev) => started.extend(ev.philosopher),
            Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return,
        }
    }
}

/// Resolves on the first event of `kind`.
async fn first(mut rx: Receiver<Event>, kind: EventKind) {
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == kind => return,
            Ok(_) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => return,
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn three_at_a_round_table_all_eat() {
    let cfg = config(3, 3, 3, TimingPolicy::random(Duration::from_millis(20)));
    let coord = Coordinator::builder(cfg).build().unwrap();
    let ledger = coord.ledger();
    let table = coord.table();
    let rx = coord.bus().subscribe();

    let stop = async {
        time::timeout(Duration::from_secs(20), everyone_ate(rx, 3))
            .await
            .expect("someone never ate");
    };
    let reports = coord.run_until(stop).await.unwrap();

    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.meals >= 1));
    for id in 0..3 {
        let tally = ledger.tally(PhilosopherId(id)).await.unwrap();
        assert!(tally.meals >= 1);
        assert!(!tally.dining);
    }
    assert_eq!(table.seats().free(), 3);
    assert_eq!(table.chopsticks().available_count(), 3);
}

// Zero-length think and eat keep the actors busy, so the paused clock never
// moves on its own; the dinner stops as soon as every philosopher is running.
#[tokio::test(start_paused = true)]
async fn instant_dinner_for_three_eats_before_stopping() {
    let timing = TimingPolicy::Fixed {
        think: Duration::ZERO,
        eat: Duration::ZERO,
        timeout: Duration::from_secs(60),
    };
    let coord = Coordinator::builder(config(3, 3, 3, timing)).build().unwrap();
    let table = coord.table();
    let rx = coord.bus().subscribe();

    let reports = coord.run_until(everyone_started(rx, 3)).await.unwrap();

    let ids: Vec<_> = reports.iter().map(|r| r.philosopher).collect();
    assert_eq!(ids, (0..3).map(PhilosopherId).collect::<Vec<_>>());
    assert!(reports.iter().all(|r| r.meals >= 1), "{reports:?}");
    assert_eq!(table.seats().free(), 3);
    assert_eq!(table.chopsticks().available_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn stalled_neighbor_forces_timeout_and_retry() {
    let timing = TimingPolicy::Fixed {
        think: Duration::from_millis(10),
        eat: Duration::from_millis(10),
        timeout: Duration::from_millis(100),
    };
    let cfg = config(1, 1, 2, timing);
    let coord = Coordinator::builder(cfg).build().unwrap();
    let ledger = coord.ledger();
    let table = coord.table();
    let mut watch = coord.bus().subscribe();
    let rx = coord.bus().subscribe();

    // Seat 0 needs chopsticks 0 and 1; nobody at the table holds 1.
    let ghost = table.chopsticks().try_acquire(1).unwrap();
    tokio::spawn(async move {
        time::sleep(Duration::from_millis(250)).await;
        drop(ghost);
    });

    let reports = coord.run_until(first(rx, EventKind::Eating)).await.unwrap();

    let report = reports[0];
    assert_eq!(report.philosopher, PhilosopherId(0));
    assert_eq!(report.meals, 1);
    assert_eq!(report.timeouts, 2);
    assert_eq!(ledger.tally(PhilosopherId(0)).await.unwrap().timeouts, 2);

    let mut kinds = Vec::new();
    while let Ok(ev) = watch.try_recv() {
        if ev.philosopher == Some(PhilosopherId(0)) {
            kinds.push(ev.kind);
        }
    }
    let timed_out = kinds
        .iter()
        .position(|k| *k == EventKind::AcquireTimedOut)
        .unwrap();
    assert_eq!(kinds[timed_out + 1], EventKind::RetryScheduled);
    assert_eq!(kinds[timed_out + 2], EventKind::PrimaryPickedUp);
    assert!(kinds.contains(&EventKind::SecondaryPickedUp));
    assert_eq!(table.chopsticks().available_count(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn five_seats_stay_live_for_any_party_size() {
    for n in 1..=5 {
        let cfg = config(n, 5, 5, TimingPolicy::random(Duration::from_millis(5)));
        let coord = Coordinator::builder(cfg).build().unwrap();
        let rx = coord.bus().subscribe();

        let stop = async move {
            time::timeout(Duration::from_secs(20), everyone_ate(rx, n))
                .await
                .expect("dinner stalled");
        };
        let reports = coord.run_until(stop).await.unwrap();
        assert_eq!(reports.len(), n);
    }
}

/// Replays the bus and panics the moment a seat or chopstick is picked up while
/// its previous holder has not put it down. Returns meals per philosopher.
async fn audit(mut rx: Receiver<Event>) -> BTreeMap<PhilosopherId, u64> {
    let mut seats = HashMap::new();
    let mut chopsticks = HashMap::new();
    let mut meals = BTreeMap::new();
    loop {
        let ev = match rx.recv().await {
            Ok(ev) => ev,
            Err(RecvError::Lagged(n)) => panic!("audit fell {n} events behind"),
            Err(RecvError::Closed) => break,
        };
        if ev.is_terminal() {
            break;
        }
        let Some(who) = ev.philosopher else { continue };
        match ev.kind {
            EventKind::Seated => pick_up(&mut seats, ev.seat, who, "seat"),
            EventKind::Stood => put_down(&mut seats, ev.seat, who, "seat"),
            EventKind::PrimaryPickedUp => pick_up(&mut chopsticks, ev.chopstick, who, "chopstick"),
            EventKind::SecondaryPickedUp => pick_up(&mut chopsticks, ev.neighbor, who, "chopstick"),
            EventKind::AcquireTimedOut => put_down(&mut chopsticks, ev.chopstick, who, "chopstick"),
            EventKind::ChopsticksReleased => {
                put_down(&mut chopsticks, ev.chopstick, who, "chopstick");
                put_down(&mut chopsticks, ev.neighbor, who, "chopstick");
            }
            EventKind::Eating => *meals.entry(who).or_default() += 1,
            _ => {}
        }
    }
    assert!(seats.is_empty(), "seats still held at the end: {seats:?}");
    assert!(chopsticks.is_empty(), "chopsticks still held at the end: {chopsticks:?}");
    meals
}

fn pick_up(held: &mut HashMap<usize, PhilosopherId>, slot: Option<usize>, who: PhilosopherId, what: &str) {
    let slot = slot.unwrap_or_else(|| panic!("{what} event from {who} without an index"));
    if let Some(holder) = held.insert(slot, who) {
        panic!("{who} picked up {what} {slot} while {holder} held it");
    }
}

fn put_down(held: &mut HashMap<usize, PhilosopherId>, slot: Option<usize>, who: PhilosopherId, what: &str) {
    let slot = slot.unwrap_or_else(|| panic!("{what} event from {who} without an index"));
    assert_eq!(held.remove(&slot), Some(who), "{who} put down {what} {slot} it did not hold");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn no_seat_or_chopstick_is_ever_shared() {
    let mut cfg = config(8, 3, 4, TimingPolicy::random(Duration::from_millis(3)));
    cfg.bus_capacity = 1 << 16;
    let coord = Coordinator::builder(cfg).build().unwrap();
    let table = coord.table();
    let auditor = tokio::spawn(audit(coord.bus().subscribe()));

    let reports = coord
        .run_until(time::sleep(Duration::from_millis(200)))
        .await
        .unwrap();
    let meals = auditor.await.unwrap();

    assert_eq!(reports.len(), 8);
    for report in &reports {
        let audited = meals.get(&report.philosopher).copied().unwrap_or(0);
        assert_eq!(audited, report.meals, "{}", report.philosopher);
    }
    assert!(meals.values().sum::<u64>() > 0, "nobody ate");
    assert_eq!(table.seats().free(), 3);
    assert_eq!(table.chopsticks().available_count(), 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn exactly_one_acknowledgment_per_philosopher() {
    let mut cfg = config(7, 3, 4, TimingPolicy::random(Duration::from_millis(2)));
    cfg.retry = RetryPolicy::StandAfter(2);
    let coord = Coordinator::builder(cfg).build().unwrap();
    let ledger = coord.ledger();
    let mut rx = coord.bus().subscribe();

    let reports = coord
        .run_until(time::sleep(Duration::from_millis(100)))
        .await
        .unwrap();

    let ids: Vec<_> = reports.iter().map(|r| r.philosopher).collect();
    assert_eq!(ids, (0..7).map(PhilosopherId).collect::<Vec<_>>());

    let mut finished = 0;
    let mut terminal = 0;
    loop {
        match rx.try_recv() {
            Ok(ev) => {
                finished += usize::from(ev.kind == EventKind::ActorFinished);
                terminal += usize::from(ev.is_terminal());
            }
            Err(tokio::sync::broadcast::error::TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }
    assert_eq!(finished, 7);
    assert_eq!(terminal, 1);

    let eaten: u64 = reports.iter().map(|r| r.meals).sum();
    assert_eq!(ledger.total_meals().await, eaten);
    assert!(ledger.still_dining().await.is_empty());
}

struct Heckler;

#[async_trait]
impl Subscribe for Heckler {
    async fn on_event(&self, ev: &Event) {
        if ev.kind == EventKind::Eating {
            panic!("heckled");
        }
    }

    fn name(&self) -> &'static str {
        "heckler"
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn panicking_subscriber_does_not_spoil_dinner() {
    let cfg = config(2, 2, 2, TimingPolicy::random(Duration::from_millis(5)));
    let coord = Coordinator::builder(cfg)
        .with_subscriber(Arc::new(Heckler))
        .build()
        .unwrap();
    let rx = coord.bus().subscribe();

    let stop = async {
        time::timeout(Duration::from_secs(20), first(rx, EventKind::SubscriberPanicked))
            .await
            .expect("heckler never panicked");
    };
    let reports = coord.run_until(stop).await.unwrap();
    assert_eq!(reports.len(), 2);
}
