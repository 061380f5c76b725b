//! End-to-end interview flows over the simulated voice channel.
//!
//! Time is paused, so engine delays elapse instantly and deterministically.

use incident_core::{
    start_interview, AnswerSource, ConfirmOutcome, HandoffEvent, InterviewConfig, InterviewError,
    InterviewSession, InterviewState, MicToggle, Phase, QuestionCatalog, SessionUpdate,
};
use incident_voice::{ChannelEvent, ChannelEventKind, ChannelMode, SimulationConfig, VoiceEngines};
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

const TYPED: [&str; 8] = [
    "Server down",
    "Data centre 2, rack 14",
    "System outage",
    "Primary database stopped accepting connections at 09:12",
    "About 300 users, billing and login affected",
    "Failed over to the replica",
    "Replaced the faulty disk and resynced",
    "Add disk health alerts",
];

fn config() -> InterviewConfig {
    InterviewConfig {
        simulation: SimulationConfig {
            transcript: "Rack 12 lost power".to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn start() -> InterviewSession {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let config = config();
    let engines = VoiceEngines::simulated(&config.simulation);
    start_interview("english", engines, config).expect("interview starts")
}

fn answer_typed(session: &mut InterviewSession, text: &str) -> ConfirmOutcome {
    assert_ok!(session.submit_typed(text));
    assert_ok!(session.confirm())
}

#[tokio::test(start_paused = true)]
async fn typed_answers_walk_all_questions_to_completion() {
    let mut session = start();
    let mut handoff = session.take_handoff_receiver().unwrap();
    assert!(session.take_handoff_receiver().is_none());

    let outcome = answer_typed(&mut session, "Server down");
    assert_eq!(outcome, ConfirmOutcome::Advanced { cursor: 1 });
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.answers().get("title").map(String::as_str), Some("Server down"));

    for (i, text) in TYPED.iter().enumerate().skip(1).take(6) {
        assert_eq!(
            answer_typed(&mut session, text),
            ConfirmOutcome::Advanced { cursor: i + 1 }
        );
    }
    assert_eq!(session.cursor(), 7);

    let completed = match answer_typed(&mut session, TYPED[7]) {
        ConfirmOutcome::Completed(c) => c,
        other => panic!("expected completion, got {other:?}"),
    };
    assert_eq!(session.phase(), Phase::Complete);
    assert_eq!(completed.answers.len(), 8);
    for (id, text) in QuestionCatalog::standard().ids().zip(TYPED) {
        assert_eq!(completed.answers.get(id).map(String::as_str), Some(text));
    }
    assert_eq!(completed.language, "english");

    match handoff.try_recv() {
        Ok(HandoffEvent::Completed(delivered)) => assert_eq!(delivered, completed),
        other => panic!("expected completion hand-off, got {other:?}"),
    }
    assert!(handoff.try_recv().is_err());

    // Nothing works after completion, and nothing is delivered twice
    assert!(matches!(session.confirm(), Err(InterviewError::InvalidState(_))));
    assert!(matches!(session.submit_typed("more"), Err(InterviewError::InvalidState(_))));
    assert!(matches!(session.previous(), Err(InterviewError::InvalidState(_))));
    assert!(handoff.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn mic_is_rejected_while_question_is_spoken() {
    let mut session = start();
    let before = session.channel_state();
    assert_eq!(before.mode, ChannelMode::Speaking);
    assert_eq!(session.status(), "Speaking...");

    assert!(matches!(session.toggle_mic(), Err(InterviewError::ChannelBusy)));
    assert_eq!(session.channel_state(), before);
    assert_eq!(session.state(), &InterviewState::AwaitingInput);
    assert_eq!(session.cursor(), 0);
}

#[tokio::test(start_paused = true)]
async fn confirm_with_nothing_staged_changes_nothing() {
    let mut session = start();
    session.settle().await;
    answer_typed(&mut session, "Server down");
    session.settle().await;

    assert!(matches!(session.confirm(), Err(InterviewError::NoPendingAnswer)));
    assert_eq!(session.cursor(), 1);
    assert_eq!(session.answers().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn spoken_answer_is_staged_then_committed() {
    let mut session = start();
    let updates = session.settle().await;
    assert_eq!(updates, vec![SessionUpdate::SpeechFinished]);
    assert_eq!(session.status(), "Click the microphone to answer.");

    assert_eq!(assert_ok!(session.toggle_mic()), MicToggle::Listening);
    assert_eq!(session.channel_state().active_question, Some(0));
    assert_eq!(
        session.next_update().await,
        Some(SessionUpdate::TranscriptHeard("Rack 12 lost power".to_string()))
    );
    assert_eq!(session.live_transcript(), "Rack 12 lost power");

    assert_eq!(assert_ok!(session.toggle_mic()), MicToggle::Processing);
    assert_eq!(session.status(), "Processing your response...");
    let updates = session.settle().await;
    assert!(matches!(updates.as_slice(), [SessionUpdate::AnswerStaged(_)]));

    let pending = session.pending().cloned().unwrap();
    assert_eq!(pending.source, AnswerSource::Captured);
    assert_eq!(pending.text, "Rack 12 lost power");
    assert_eq!(session.status(), "Please confirm if this is correct:");

    assert_eq!(assert_ok!(session.confirm()), ConfirmOutcome::Advanced { cursor: 1 });
    assert_eq!(
        session.answers().get("title").map(String::as_str),
        Some("Rack 12 lost power")
    );
    assert!(session.live_transcript().is_empty());
}

#[tokio::test(start_paused = true)]
async fn late_transcript_does_not_follow_back_navigation() {
    let mut session = start();
    answer_typed(&mut session, "Server down");
    session.settle().await;

    assert_ok!(session.toggle_mic());
    let stale_ticket = session.channel_state().ticket().unwrap();
    assert_eq!(stale_ticket.question_index, 1);

    assert_eq!(assert_ok!(session.previous()), 0);
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(session.pump().is_empty());

    assert_eq!(session.pending(), None);
    assert_eq!(session.state(), &InterviewState::AwaitingInput);
    assert!(session.live_transcript().is_empty());

    // Even if the completion had already been queued, its ticket no longer matches
    let late = ChannelEvent {
        ticket: stale_ticket,
        kind: ChannelEventKind::CaptureFinished("late words".to_string()),
    };
    assert_eq!(session.apply(late), None);
    assert_eq!(session.pending(), None);
    assert_eq!(session.answers().get("title").map(String::as_str), Some("Server down"));
}

#[tokio::test(start_paused = true)]
async fn revisiting_a_question_overwrites_only_that_answer() {
    let mut session = start();
    for text in &TYPED[..3] {
        answer_typed(&mut session, text);
    }
    assert_eq!(session.cursor(), 3);

    assert_eq!(assert_ok!(session.previous()), 2);
    assert_eq!(assert_ok!(session.previous()), 1);
    assert_eq!(session.answers().len(), 3);
    assert_eq!(
        session.answers().get("location").map(String::as_str),
        Some(TYPED[1])
    );

    assert_eq!(
        answer_typed(&mut session, "Building B, floor 3"),
        ConfirmOutcome::Advanced { cursor: 2 }
    );
    assert_eq!(session.answers().len(), 3);
    assert_eq!(session.answers()["title"], TYPED[0]);
    assert_eq!(session.answers()["location"], "Building B, floor 3");
    assert_eq!(session.answers()["incident_type"], TYPED[2]);
}

#[tokio::test(start_paused = true)]
async fn previous_at_first_question_is_rejected() {
    let mut session = start();
    assert!(matches!(session.previous(), Err(InterviewError::AtFirstQuestion)));
    assert_eq!(session.cursor(), 0);
    assert_eq!(session.channel_state().mode, ChannelMode::Speaking);
}

#[tokio::test(start_paused = true)]
async fn retry_discards_staged_answer() {
    let mut session = start();
    assert_ok!(session.submit_typed("Wrong building"));
    assert!(session.pending().is_some());

    assert_ok!(session.retry());
    assert_eq!(session.pending(), None);
    assert_eq!(session.state(), &InterviewState::AwaitingInput);
    assert_eq!(session.cursor(), 0);
    assert!(matches!(session.confirm(), Err(InterviewError::NoPendingAnswer)));
    assert!(session.answers().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopping_before_anything_is_heard_stages_nothing() {
    let mut session = start();
    session.settle().await;
    assert_ok!(session.toggle_mic());
    assert_ok!(session.toggle_mic());
    let updates = session.settle().await;
    assert_eq!(updates, vec![SessionUpdate::NothingHeard]);
    assert_eq!(session.state(), &InterviewState::AwaitingInput);
    assert_eq!(session.pending(), None);
}

#[tokio::test(start_paused = true)]
async fn blank_typed_answer_is_rejected() {
    let mut session = start();
    let gen_before = session.channel_state().generation;
    assert!(matches!(session.submit_typed("  \t"), Err(InterviewError::EmptyInput)));
    assert_eq!(session.state(), &InterviewState::AwaitingInput);
    assert_eq!(session.channel_state().generation, gen_before);
}

#[tokio::test(start_paused = true)]
async fn typed_answer_interrupts_speech() {
    let mut session = start();
    assert!(session.is_speaking());
    assert_ok!(session.submit_typed("Server down"));
    assert!(!session.is_speaking());
    tokio::time::sleep(Duration::from_secs(10)).await;
    assert!(session.pump().is_empty());
    assert!(session.pending().is_some());
}

#[tokio::test(start_paused = true)]
async fn staged_answer_blocks_mic_and_second_typed_answer() {
    let mut session = start();
    assert_ok!(session.submit_typed("Server down"));
    assert!(matches!(session.toggle_mic(), Err(InterviewError::InvalidState(_))));
    assert!(matches!(
        session.submit_typed("Another"),
        Err(InterviewError::InvalidState(_))
    ));
    assert!(matches!(session.repeat_current(), Err(InterviewError::InvalidState(_))));
    assert_eq!(session.pending().map(|p| p.text.as_str()), Some("Server down"));
}

#[tokio::test(start_paused = true)]
async fn repeat_waits_for_silence() {
    let mut session = start();
    assert!(matches!(session.repeat_current(), Err(InterviewError::ChannelBusy)));
    session.settle().await;
    assert_ok!(session.repeat_current());
    assert!(session.is_speaking());
    assert_eq!(session.settle().await, vec![SessionUpdate::SpeechFinished]);
}

#[tokio::test(start_paused = true)]
async fn abandon_delivers_no_answers() {
    let mut session = start();
    let mut handoff = session.take_handoff_receiver().unwrap();
    answer_typed(&mut session, "Server down");
    let id = session.id();

    assert_ok!(session.abandon());
    match handoff.recv().await {
        Some(HandoffEvent::Abandoned { session_id, .. }) => assert_eq!(session_id, id),
        other => panic!("expected abandon notice, got {other:?}"),
    }
    assert!(handoff.recv().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn completed_interview_serializes_for_report_renderer() {
    let mut session = start();
    let mut last = None;
    for text in TYPED {
        last = Some(answer_typed(&mut session, text));
    }
    let completed = match last {
        Some(ConfirmOutcome::Completed(c)) => c,
        other => panic!("expected completion, got {other:?}"),
    };

    let json = serde_json::to_value(&completed).unwrap();
    assert_eq!(json["language"], "english");
    assert_eq!(json["answers"]["prevention"], "Add disk health alerts");
    assert_eq!(json["answers"].as_object().unwrap().len(), 8);

    let err = assert_err!(session.retry());
    assert!(matches!(err, InterviewError::InvalidState(_)));
}

#[tokio::test(start_paused = true)]
async fn completion_after_revisits_has_one_answer_per_question() {
    let mut session = start();
    for text in &TYPED[..7] {
        answer_typed(&mut session, text);
    }
    for expected in (4..7).rev() {
        assert_eq!(assert_ok!(session.previous()), expected);
    }
    for (i, text) in TYPED.iter().enumerate().skip(4).take(3) {
        assert_eq!(
            answer_typed(&mut session, &format!("{text} (revised)")),
            ConfirmOutcome::Advanced { cursor: i + 1 }
        );
    }

    let completed = match answer_typed(&mut session, TYPED[7]) {
        ConfirmOutcome::Completed(c) => c,
        other => panic!("expected completion, got {other:?}"),
    };
    let ids: Vec<&str> = completed.answers.keys().map(String::as_str).collect();
    let catalog = QuestionCatalog::standard();
    let mut expected: Vec<&str> = catalog.ids().collect();
    expected.sort_unstable();
    assert_eq!(ids, expected);
    assert_eq!(completed.answers["impact"], format!("{} (revised)", TYPED[4]));
    assert_eq!(completed.answers["title"], TYPED[0]);
}
