//! The interactive loop: language prompt, then stdin commands multiplexed with channel updates
//! and the hand-off. Generic over the reader and writer so a scripted transcript can drive it.

use crate::commands::{Command, HELP};
use incident_core::{
    CompletedInterview, ConfirmOutcome, HandoffEvent, InterviewError, InterviewSession,
    LanguageGate, Phase, SessionUpdate,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tracing::{debug, info};

/// How a run ended.
#[derive(Debug)]
pub enum Outcome {
    Completed(CompletedInterview),
    Abandoned,
    /// Left at the language prompt; no session was started.
    Left,
}

enum Flow {
    Continue,
    Completed(CompletedInterview),
    Quit,
}

pub async fn run<R, W>(mut gate: LanguageGate, input: R, out: &mut W) -> anyhow::Result<Outcome>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    if !choose_language(&mut gate, &mut lines, out).await? {
        writeln!(out, "Leaving without a report.")?;
        return Ok(Outcome::Left);
    }

    let mut session = gate.start()?;
    let mut handoff = session
        .take_handoff_receiver()
        .ok_or_else(|| anyhow::anyhow!("hand-off receiver already taken"))?;
    info!(session_id = %session.id(), language = %session.language(), "CLI session started");
    writeln!(out, "{HELP}")?;
    print_question(out, &session)?;

    loop {
        tokio::select! {
            biased;

            Some(event) = handoff.recv() => {
                if let HandoffEvent::Completed(completed) = event {
                    print_completed(out, &completed)?;
                    return Ok(Outcome::Completed(completed));
                }
                return Ok(Outcome::Abandoned);
            }
            Some(update) = session.next_update() => {
                print_update(out, &session, &update)?;
            }
            line = lines.next_line() => {
                let command = match line? {
                    Some(line) => Command::parse(&line),
                    // stdin closed
                    None => Some(Command::Quit),
                };
                let Some(command) = command else { continue };
                match handle(&mut session, command, out) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Completed(completed)) => {
                        print_completed(out, &completed)?;
                        return Ok(Outcome::Completed(completed));
                    }
                    Ok(Flow::Quit) => {
                        if session.phase() == Phase::Complete {
                            return Ok(Outcome::Left);
                        }
                        session.abandon()?;
                        if let Some(HandoffEvent::Abandoned { session_id, .. }) = handoff.recv().await {
                            writeln!(out, "Report {session_id} abandoned. Nothing was saved.")?;
                        }
                        return Ok(Outcome::Abandoned);
                    }
                    Err(e) => match e.downcast::<InterviewError>() {
                        Ok(e) => writeln!(out, "⚠️  {e}")?,
                        Err(e) => return Err(e),
                    },
                }
            }
        }
    }
}

/// Returns false when the reporter leaves before choosing.
async fn choose_language<R, W>(
    gate: &mut LanguageGate,
    lines: &mut Lines<R>,
    out: &mut W,
) -> anyhow::Result<bool>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    while gate.selected().is_none() {
        writeln!(
            out,
            "Select your language ({}), or 'back' to leave:",
            gate.supported_languages().join(", ")
        )?;
        let Some(line) = lines.next_line().await? else {
            return Ok(false);
        };
        match line.trim() {
            "back" | "quit" => return Ok(false),
            tag => {
                if let Err(e) = gate.select_language(tag) {
                    writeln!(out, "{e}")?;
                }
            }
        }
    }
    Ok(true)
}

fn handle<W: Write>(
    session: &mut InterviewSession,
    command: Command,
    out: &mut W,
) -> anyhow::Result<Flow> {
    match command {
        Command::Mic => {
            session.toggle_mic()?;
            writeln!(out, "{}", session.status())?;
        }
        Command::Type(text) => {
            let pending = session.submit_typed(&text)?;
            print_pending(out, session, &pending.text)?;
        }
        Command::Confirm => match session.confirm()? {
            ConfirmOutcome::Advanced { .. } => print_question(out, session)?,
            ConfirmOutcome::Completed(completed) => {
                writeln!(out, "{}", session.status())?;
                return Ok(Flow::Completed(completed));
            }
        },
        Command::Retry => {
            session.retry()?;
            writeln!(out, "{}", session.status())?;
        }
        Command::Back => {
            session.previous()?;
            print_question(out, session)?;
            if let Some(previous) = session.answers().get(&session.current_question().id) {
                writeln!(out, "Current answer: {previous}")?;
            }
        }
        Command::Repeat => {
            session.repeat_current()?;
            writeln!(out, "{}", session.status())?;
        }
        Command::Status => {
            writeln!(out, "{} [{}]", session.progress(), session.current_question().category)?;
            writeln!(out, "{}", session.status())?;
            if !session.live_transcript().is_empty() {
                writeln!(out, "Live transcript: {}", session.live_transcript())?;
            }
        }
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

fn print_question<W: Write>(out: &mut W, session: &InterviewSession) -> std::io::Result<()> {
    let question = session.current_question();
    writeln!(out)?;
    writeln!(out, "{} [{}]", session.progress(), question.category)?;
    writeln!(out, "{}", question.text)?;
    writeln!(out, "{}", session.status())
}

fn print_pending<W: Write>(
    out: &mut W,
    session: &InterviewSession,
    text: &str,
) -> std::io::Result<()> {
    writeln!(out, "Your answer: {text}")?;
    writeln!(out, "{} (yes/no)", session.status())
}

fn print_update<W: Write>(
    out: &mut W,
    session: &InterviewSession,
    update: &SessionUpdate,
) -> std::io::Result<()> {
    match update {
        SessionUpdate::SpeechFinished => writeln!(out, "{}", session.status()),
        SessionUpdate::TranscriptHeard(text) => writeln!(out, "Live transcript: {text}"),
        SessionUpdate::AnswerStaged(pending) => print_pending(out, session, &pending.text),
        SessionUpdate::NothingHeard => writeln!(
            out,
            "Didn't catch that. Use the mic again or type your answer."
        ),
        SessionUpdate::ChannelFailed(e) => writeln!(out, "⚠️  Voice channel error: {e}"),
    }
}

fn print_completed<W: Write>(out: &mut W, completed: &CompletedInterview) -> anyhow::Result<()> {
    debug!(session_id = %completed.session_id, "printing completed interview");
    writeln!(out, "{}", serde_json::to_string_pretty(completed)?)?;
    Ok(())
}
