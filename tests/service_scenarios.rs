//! End-to-end scenarios against the cooking service.
//!
//! Timer tests run on a paused tokio clock, so multi-second waits complete
//! instantly and deterministically.

use cookflow::core::{Recipe, Step, TaskKey};
use cookflow::notify::{ChannelNotifier, Notice, ALL_DONE, AWAITING_START};
use cookflow::scheduler::SchedulerError;
use cookflow::session::{PollOutcome, SessionError};
use cookflow::store::InMemoryRecipeStore;
use cookflow::{CookingService, ServiceConfig, ServiceError};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

fn catalog() -> InMemoryRecipeStore {
    InMemoryRecipeStore::from_recipes(vec![
        Recipe::new(
            "R1",
            vec![Step::normal(1, "Cut"), Step::blockable(2, "Bake", "2s")],
        ),
        Recipe::new("R2", vec![Step::normal(1, "Plate")]),
        Recipe::new(
            "Stew",
            vec![
                Step::blockable(1, "Simmer", "10 seconds"),
                Step::normal(2, "Season"),
            ],
        ),
        Recipe::new("Broken", vec![Step::blockable(1, "Rest", "a little while")]),
        Recipe::new("Tea", vec![Step::blockable(1, "Steep", "1s")]),
        Recipe::new(
            "Bread",
            vec![
                Step::blockable(1, "Proof", "5s"),
                Step::blockable(2, "Bake", "2s"),
            ],
        ),
        Recipe::new("Aged", vec![Step::blockable(1, "Age", "5000000000000000h")]),
        Recipe::new("Cellared", vec![Step::blockable(1, "Cellar", "4000000000000000h")]),
    ])
    .unwrap()
}

fn service_with(config: ServiceConfig) -> (CookingService, Receiver<Notice>) {
    let (notifier, receiver) = ChannelNotifier::channel(64);
    let service = CookingService::new(&config, Arc::new(catalog()), Arc::new(notifier));
    (service, receiver)
}

fn service() -> (CookingService, Receiver<Notice>) {
    service_with(ServiceConfig::default())
}

fn drain(receiver: &mut Receiver<Notice>) -> Vec<String> {
    let mut messages = Vec::new();
    while let Ok(notice) = receiver.try_recv() {
        messages.push(notice.message);
    }
    messages
}

fn step_of(outcome: Option<PollOutcome>) -> (String, u32) {
    match outcome {
        Some(PollOutcome::Step(view)) => (view.dish_name, view.step.step_number),
        other => panic!("expected a step, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn two_recipe_scenario_interleaves_timer_completion() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["R1", "R2"]).await);

    assert_eq!(step_of(service.poll_next("s1").await), ("R1".into(), 1));
    assert_eq!(step_of(service.poll_next("s1").await), ("R1".into(), 2));

    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
    assert_eq!(drain(&mut notices), vec![AWAITING_START.to_string()]);

    assert_eq!(service.start_blockable("s1").await.unwrap(), TaskKey::new(0, 1));
    assert_eq!(step_of(service.poll_next("s1").await), ("R2".into(), 1));

    tokio::time::sleep(Duration::from_millis(2100)).await;

    let messages = drain(&mut notices);
    assert_eq!(messages.len(), 1);
    let json = messages[0]
        .strip_prefix("BLOCK_FINISHED: ")
        .expect("block finished notice");
    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["dishName"], "R1");
    assert_eq!(value["stepNumber"], 2);
    assert_eq!(value["isBlockable"], true);

    assert_eq!(service.poll_next("s1").await, Some(PollOutcome::AllDone));
    assert_eq!(drain(&mut notices), vec![ALL_DONE.to_string()]);
    assert_eq!(service.outstanding_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn all_done_is_terminal() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["R1", "R2"]).await);
    service.poll_next("s1").await;
    service.poll_next("s1").await;
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();
    service.poll_next("s1").await;
    tokio::time::sleep(Duration::from_millis(2100)).await;

    for _ in 0..4 {
        assert_eq!(service.poll_next("s1").await, Some(PollOutcome::AllDone));
    }
    assert!(service.start_blockable("s1").await.unwrap_err().is_invalid_state());
    assert_eq!(service.outstanding_timers(), 0);

    service.finish_blockable("s1", 0).await;
    let finished = drain(&mut notices)
        .into_iter()
        .filter(|m| m.starts_with("BLOCK_FINISHED: "))
        .count();
    assert_eq!(finished, 1);
}

#[tokio::test(start_paused = true)]
async fn overlapping_timers_finish_out_of_order() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Tea", "Bread"]).await);

    assert_eq!(step_of(service.poll_next("s1").await), ("Tea".into(), 1));
    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
    assert_eq!(service.start_blockable("s1").await.unwrap(), TaskKey::new(0, 0));

    assert_eq!(step_of(service.poll_next("s1").await), ("Bread".into(), 1));
    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
    assert_eq!(service.start_blockable("s1").await.unwrap(), TaskKey::new(1, 0));

    match service.poll_next("s1").await {
        Some(PollOutcome::Pending(tasks)) => assert_eq!(tasks.len(), 2),
        other => panic!("expected Pending, got {other:?}"),
    }

    // Tea finishes first; its recipe has nothing left.
    tokio::time::sleep(Duration::from_millis(1500)).await;
    match service.poll_next("s1").await {
        Some(PollOutcome::Pending(tasks)) => {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].key, TaskKey::new(1, 0));
        }
        other => panic!("expected Pending, got {other:?}"),
    }

    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(step_of(service.poll_next("s1").await), ("Bread".into(), 2));
    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
    assert_eq!(service.start_blockable("s1").await.unwrap(), TaskKey::new(1, 1));

    tokio::time::sleep(Duration::from_millis(2500)).await;
    for _ in 0..3 {
        assert_eq!(service.poll_next("s1").await, Some(PollOutcome::AllDone));
    }

    let finished = drain(&mut notices)
        .into_iter()
        .filter(|m| m.starts_with("BLOCK_FINISHED: "))
        .count();
    assert_eq!(finished, 3);
    assert_eq!(service.outstanding_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn wait_past_clock_range_is_an_error() {
    let (service, _notices) = service();
    assert!(service.create("s1", &["Aged"]).await);
    service.poll_next("s1").await;

    let err = service.start_blockable("s1").await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Scheduler(SchedulerError::DelayOutOfRange { .. })
    ));
    assert_eq!(service.outstanding_timers(), 0);
    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn scaled_wait_past_duration_range_is_an_error() {
    let mut config = ServiceConfig::default();
    config.scheduler.time_scale = 2.0;
    let (service, _notices) = service_with(config);
    assert!(service.create("s1", &["Cellared"]).await);
    service.poll_next("s1").await;

    let err = service.start_blockable("s1").await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Scheduler(SchedulerError::DelayOutOfRange { .. })
    ));
    assert_eq!(service.outstanding_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn started_step_is_not_passed_before_timer_fires() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew"]).await);

    assert_eq!(step_of(service.poll_next("s1").await), ("Stew".into(), 1));
    service.start_blockable("s1").await.unwrap();

    tokio::time::sleep(Duration::from_secs(3)).await;
    match service.poll_next("s1").await {
        Some(PollOutcome::Pending(tasks)) => {
            assert_eq!(tasks.len(), 1);
            assert_eq!(tasks[0].key, TaskKey::new(0, 0));
            assert_eq!(tasks[0].remaining_secs(), 7);
        }
        other => panic!("expected Pending, got {other:?}"),
    }
    assert_eq!(
        drain(&mut notices),
        vec!["recipe 0 step 0 wait, left: 7 seconds".to_string()]
    );

    tokio::time::sleep(Duration::from_secs(8)).await;
    assert!(drain(&mut notices)[0].starts_with("BLOCK_FINISHED: "));
    assert_eq!(step_of(service.poll_next("s1").await), ("Stew".into(), 2));
}

#[tokio::test(start_paused = true)]
async fn pending_notice_repeats_on_every_poll() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();

    service.poll_next("s1").await;
    service.poll_next("s1").await;

    assert_eq!(drain(&mut notices).len(), 2);
}

#[tokio::test]
async fn unknown_dish_leaves_registry_unchanged() {
    let (service, _notices) = service();

    assert!(!service.create("s1", &["R1", "Mapo tofu"]).await);

    assert!(!service.contains("s1"));
    assert_eq!(service.session_count(), 0);
    assert_eq!(service.poll_next("s1").await, None);
}

#[tokio::test]
async fn unknown_session_is_silent_except_for_start() {
    let (service, mut notices) = service();

    assert_eq!(service.poll_next("ghost").await, None);
    service.finish_blockable("ghost", 0).await;
    service.unbind("ghost").await;

    assert_eq!(
        service.start_blockable("ghost").await,
        Err(ServiceError::SessionNotFound("ghost".to_string()))
    );
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn starting_a_normal_step_is_an_invalid_state() {
    let (service, _notices) = service();
    assert!(service.create("s1", &["R2"]).await);
    service.poll_next("s1").await;

    let err = service.start_blockable("s1").await.unwrap_err();

    assert!(err.is_invalid_state());
    assert_eq!(service.outstanding_timers(), 0);
}

#[tokio::test]
async fn malformed_duration_fails_without_arming() {
    let (service, _notices) = service();
    assert!(service.create("s1", &["Broken"]).await);
    service.poll_next("s1").await;

    let err = service.start_blockable("s1").await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Duration { task, .. } if task == TaskKey::new(0, 0)
    ));
    assert_eq!(service.outstanding_timers(), 0);
    assert!(matches!(
        service.poll_next("s1").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn scheduler_exhaustion_is_reported() {
    let mut config = ServiceConfig::default();
    config.scheduler.max_outstanding_timers = 1;
    let (service, _notices) = service_with(config);
    assert!(service.create("a", &["Stew"]).await);
    assert!(service.create("b", &["Stew"]).await);
    service.poll_next("a").await;
    service.poll_next("b").await;

    service.start_blockable("a").await.unwrap();
    let err = service.start_blockable("b").await.unwrap_err();

    assert_eq!(
        err,
        ServiceError::Scheduler(SchedulerError::Exhausted { capacity: 1 })
    );
    assert!(matches!(
        service.poll_next("b").await,
        Some(PollOutcome::AwaitingStart(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn second_start_on_running_step_is_rejected() {
    let (service, _notices) = service();
    assert!(service.create("s1", &["Stew"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();

    let err = service.start_blockable("s1").await.unwrap_err();

    assert!(matches!(err, ServiceError::Session(SessionError::InvalidState { .. })));
    assert_eq!(service.outstanding_timers(), 1);
}

#[tokio::test(start_paused = true)]
async fn timer_for_unbound_session_has_no_effect() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();

    service.unbind("s1").await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert!(drain(&mut notices).is_empty());
    assert!(!service.contains("s1"));
    assert_eq!(service.outstanding_timers(), 0);
}

#[tokio::test(start_paused = true)]
async fn finishing_directly_cancels_timer_and_notifies_once() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew", "R2"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();
    assert_eq!(step_of(service.poll_next("s1").await), ("R2".into(), 1));

    service.finish_blockable("s1", 0).await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    let finished: Vec<String> = drain(&mut notices)
        .into_iter()
        .filter(|m| m.starts_with("BLOCK_FINISHED: "))
        .collect();
    assert_eq!(finished.len(), 1);
    assert_eq!(step_of(service.poll_next("s1").await), ("Stew".into(), 2));
}

#[tokio::test(start_paused = true)]
async fn recreating_a_session_cancels_old_timers() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();

    assert!(service.create("s1", &["R2"]).await);
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert!(drain(&mut notices).is_empty());
    assert_eq!(step_of(service.poll_next("s1").await), ("R2".into(), 1));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_everything() {
    let (service, mut notices) = service();
    assert!(service.create("s1", &["Stew"]).await);
    service.poll_next("s1").await;
    service.start_blockable("s1").await.unwrap();

    service.shutdown().await;
    tokio::time::sleep(Duration::from_secs(20)).await;

    assert_eq!(service.session_count(), 0);
    assert!(drain(&mut notices).is_empty());

    assert!(service.create("s2", &["Stew"]).await);
    service.poll_next("s2").await;
    assert_eq!(
        service.start_blockable("s2").await.unwrap_err(),
        ServiceError::Scheduler(SchedulerError::ShutDown)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_polls_never_duplicate_or_skip() {
    let recipes: Vec<Recipe> = (0..3)
        .map(|r| {
            Recipe::new(
                format!("Dish {r}"),
                (1..=40).map(|s| Step::normal(s, format!("step {s}"))).collect(),
            )
        })
        .collect();
    let store = InMemoryRecipeStore::from_recipes(recipes).unwrap();
    let (notifier, _receiver) = ChannelNotifier::channel(16);
    let service = CookingService::new(
        &ServiceConfig::default(),
        Arc::new(store),
        Arc::new(notifier),
    );
    assert!(service.create("shared", &["Dish 0", "Dish 1", "Dish 2"]).await);

    let mut workers = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        workers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            loop {
                match service.poll_next("shared").await {
                    Some(PollOutcome::Step(view)) => {
                        seen.push((view.dish_name, view.step.step_number))
                    }
                    Some(PollOutcome::AllDone) | None => break,
                    Some(other) => panic!("unexpected outcome {other:?}"),
                }
            }
            seen
        }));
    }

    let mut all = Vec::new();
    for worker in workers {
        all.extend(worker.await.unwrap());
    }
    let unique: HashSet<_> = all.iter().cloned().collect();
    assert_eq!(all.len(), 120);
    assert_eq!(unique.len(), 120);
}
