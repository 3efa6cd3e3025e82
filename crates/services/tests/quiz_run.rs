use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{Difficulty, QuizSettings};
use services::{AppServices, Clock, RunOutcome, SessionCommand, SessionUpdate};
use storage::repository::{InMemoryRepository, KeyValueStore, QuestionRecord, Storage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

struct Harness {
    commands: mpsc::Sender<SessionCommand>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    run: JoinHandle<RunOutcome>,
    repo: InMemoryRepository,
}

impl Harness {
    fn start() -> Self {
        let repo = InMemoryRepository::new();
        repo.put_questions(
            Difficulty::Easy,
            vec![
                QuestionRecord::new("First?", "A", vec!["X".into(), "Y".into()]),
                QuestionRecord::new("Second?", "B", vec!["X".into(), "Z".into()]),
            ],
        )
        .unwrap();
        let storage = Storage {
            questions: Arc::new(repo.clone()),
            kv: Arc::new(repo.clone()),
        };
        let services = AppServices::from_storage(&storage, Clock::System, QuizSettings::default());
        let quiz_loop = services.quiz_loop();

        let (commands, command_rx) = mpsc::channel(8);
        let (update_tx, updates) = mpsc::unbounded_channel();
        let run = tokio::spawn(async move {
            quiz_loop
                .run(Difficulty::Easy, command_rx, update_tx)
                .await
                .expect("session starts")
        });

        Self {
            commands,
            updates,
            run,
            repo,
        }
    }

    async fn send(&self, command: SessionCommand) {
        self.commands.send(command).await.expect("session listening");
    }

    /// Skip updates until one matches.
    async fn wait_for(&mut self, pred: impl Fn(&SessionUpdate) -> bool) -> SessionUpdate {
        loop {
            let update = self.updates.recv().await.expect("update stream open");
            if pred(&update) {
                return update;
            }
        }
    }
}

fn on_question(update: &SessionUpdate, index: usize) -> bool {
    matches!(update, SessionUpdate::Changed(s) if s.current_index == index && !s.input_locked)
}

fn locked(update: &SessionUpdate) -> bool {
    matches!(update, SessionUpdate::Changed(s) if s.input_locked)
}

#[tokio::test(start_paused = true)]
async fn answering_everything_completes_and_scores() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    h.send(SessionCommand::Select("A".into())).await;
    h.wait_for(|u| matches!(u, SessionUpdate::Changed(s) if s.active_selection.as_deref() == Some("A")))
        .await;
    h.send(SessionCommand::Next).await;
    h.wait_for(locked).await;
    h.wait_for(|u| on_question(u, 1)).await;

    h.send(SessionCommand::Select("B".into())).await;
    h.send(SessionCommand::Finish).await;
    let SessionUpdate::Completed(outcome) = h
        .wait_for(|u| matches!(u, SessionUpdate::Completed(_)))
        .await
    else {
        unreachable!()
    };

    assert_eq!(outcome.report.score, 2);
    assert!(outcome.report.is_new_high_score);
    assert_eq!(h.run.await.unwrap(), RunOutcome::Completed(outcome));
    assert_eq!(
        h.repo.get("quiz_highscore_easy").await.unwrap().as_deref(),
        Some("2")
    );
}

#[tokio::test(start_paused = true)]
async fn unattended_session_times_out_every_question() {
    let started = tokio::time::Instant::now();
    let mut h = Harness::start();

    let SessionUpdate::Completed(outcome) = h
        .wait_for(|u| matches!(u, SessionUpdate::Completed(_)))
        .await
    else {
        unreachable!()
    };

    assert_eq!(outcome.transcript.len(), 2);
    assert!(outcome.transcript.records().iter().all(|r| r.timed_out()));
    assert_eq!(outcome.report.score, 0);
    // Two 30 s countdowns plus two 700 ms feedback windows.
    assert_eq!(started.elapsed(), Duration::from_millis(61_400));
}

#[tokio::test(start_paused = true)]
async fn countdown_is_published_each_second() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    let update = h.wait_for(|u| matches!(u, SessionUpdate::Changed(_))).await;
    let SessionUpdate::Changed(snapshot) = update else {
        unreachable!()
    };
    assert_eq!(snapshot.seconds_remaining, 29);
}

#[tokio::test(start_paused = true)]
async fn input_during_feedback_window_is_rejected() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    h.send(SessionCommand::Skip).await;
    h.wait_for(locked).await;
    h.send(SessionCommand::Select("X".into())).await;
    let update = h
        .wait_for(|u| matches!(u, SessionUpdate::Rejected { .. }))
        .await;
    assert_eq!(update, SessionUpdate::Rejected {
        reason: "input is locked until the next question".into(),
    });

    let SessionUpdate::Changed(snapshot) = h.wait_for(|u| on_question(u, 1)).await else {
        unreachable!()
    };
    assert_eq!(snapshot.active_selection, None);
    assert_eq!(snapshot.progress.answered, 1);
}

#[tokio::test(start_paused = true)]
async fn invalid_actions_are_reported_without_changing_state() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    h.send(SessionCommand::Next).await;
    assert_eq!(
        h.wait_for(|u| matches!(u, SessionUpdate::Rejected { .. })).await,
        SessionUpdate::Rejected {
            reason: "select an answer first".into(),
        }
    );

    h.send(SessionCommand::Previous).await;
    assert_eq!(
        h.wait_for(|u| matches!(u, SessionUpdate::Rejected { .. })).await,
        SessionUpdate::Rejected {
            reason: "already at the first question".into(),
        }
    );
    h.send(SessionCommand::Quit).await;
    assert!(matches!(h.run.await.unwrap(), RunOutcome::Abandoned { .. }));
}

#[tokio::test(start_paused = true)]
async fn previous_restarts_first_question_with_a_fresh_countdown() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    h.send(SessionCommand::Select("A".into())).await;
    h.send(SessionCommand::Next).await;
    h.wait_for(|u| on_question(u, 1)).await;
    h.wait_for(|u| matches!(u, SessionUpdate::Changed(s) if s.seconds_remaining == 29))
        .await;

    h.send(SessionCommand::Previous).await;
    let SessionUpdate::Changed(snapshot) = h.wait_for(|u| on_question(u, 0)).await else {
        unreachable!()
    };
    assert_eq!(snapshot.progress.answered, 0);
    assert_eq!(snapshot.active_selection, None);
    assert_eq!(snapshot.seconds_remaining, 30);
    assert_eq!(snapshot.prompt.as_deref(), Some("First?"));

    // Only the new countdown is live: the next tick is 29 and it runs out
    // after a full 30 seconds.
    let reentered = tokio::time::Instant::now();
    let SessionUpdate::Changed(tick) = h
        .wait_for(|u| matches!(u, SessionUpdate::Changed(_)))
        .await
    else {
        unreachable!()
    };
    assert_eq!(tick.current_index, 0);
    assert_eq!(tick.seconds_remaining, 29);

    let SessionUpdate::Changed(locked_snapshot) = h.wait_for(locked).await else {
        unreachable!()
    };
    assert_eq!(reentered.elapsed(), Duration::from_secs(30));
    assert_eq!(locked_snapshot.current_index, 0);
    let record = locked_snapshot.last_record.expect("timeout commits");
    assert!(record.timed_out());
    assert_eq!(record.prompt(), "First?");

    h.send(SessionCommand::Quit).await;
    let RunOutcome::Abandoned { transcript } = h.run.await.unwrap() else {
        panic!("expected abandon");
    };
    assert_eq!(transcript.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn quitting_abandons_without_scoring() {
    let mut h = Harness::start();
    h.wait_for(|u| on_question(u, 0)).await;

    h.send(SessionCommand::Select("A".into())).await;
    h.send(SessionCommand::Next).await;
    h.wait_for(|u| on_question(u, 1)).await;
    h.send(SessionCommand::Quit).await;

    let RunOutcome::Abandoned { transcript } = h.run.await.unwrap() else {
        panic!("expected abandon");
    };
    assert_eq!(transcript.len(), 1);
    assert_eq!(h.repo.get("quiz_highscore_easy").await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn dropping_command_sender_abandons() {
    let Harness { commands, run, .. } = Harness::start();
    drop(commands);
    assert!(matches!(run.await.unwrap(), RunOutcome::Abandoned { .. }));
}
