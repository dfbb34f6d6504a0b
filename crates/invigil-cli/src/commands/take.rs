//! The `invigil take` command.
//!
//! Runs one quiz attempt over stdin/stdout. A single event loop
//! multiplexes stdin lines with a one-second tick; each iteration applies
//! exactly one session event and executes its effects before the next one
//! is read. A tick that arrives very late means the process was suspended
//! (Ctrl-Z, a closed laptop lid), which the integrity monitor sees as a
//! hidden/visible toggle.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use tokio::io::AsyncBufReadExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use invigil_core::error::StoreError;
use invigil_core::model::{QuestionKind, QuizKind, QuizResult, Student};
use invigil_core::monitor::EnvironmentSignal;
use invigil_core::quizfile::parse_module;
use invigil_core::schedule::evaluate_schedule;
use invigil_core::session::{Actor, Effect, Session, SessionEvent, SessionState, TimeBudget};
use invigil_core::traits::{dispatch_result, ResultStore, SessionObserver};
use invigil_store::{MemoryStore, StoreConfig};

/// A tick arriving this late means the host was stopped or asleep.
const SUSPEND_GAP: Duration = Duration::from_secs(5);

/// Prints dispatch failures where the operator will see them.
struct OperatorNotifier;

impl SessionObserver for OperatorNotifier {
    fn on_dispatch_failure(&self, result: &QuizResult, error: &StoreError) {
        eprintln!(
            "WARNING: result {} for {} was not stored: {error}. Notify the operator.",
            result.id, result.student_nis
        );
    }
}

/// Best-effort alternate-screen guard. Absence of a terminal is logged
/// and ignored; the session runs the same either way.
struct Screen {
    tty: bool,
    active: bool,
}

impl Screen {
    fn new() -> Self {
        Self {
            tty: io::stdout().is_terminal(),
            active: false,
        }
    }

    fn enter(&mut self) {
        if !self.tty {
            warn!("stdout is not a terminal; full screen unavailable");
            return;
        }
        if !self.active {
            print!("\x1b[?1049h\x1b[H");
            let _ = io::stdout().flush();
            self.active = true;
        }
    }

    fn exit(&mut self) {
        if self.active {
            print!("\x1b[?1049l");
            let _ = io::stdout().flush();
            self.active = false;
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        self.exit();
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    preview: bool,
    seed: Option<u64>,
    name: Option<String>,
    nis: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = super::open_store(config_path.as_deref())?;
    // A preview must never touch the records on disk.
    let store: Arc<dyn ResultStore> = if preview {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(store)
    };

    let module = parse_module(&quiz_path)?;
    let quiz = module.quiz.clone();

    let (actor, classes) = if preview {
        (Actor::Operator, Vec::new())
    } else {
        resolve_identity(name, nis, &config)?
    };

    // Render-time gate check; the start transition checks it again.
    if let Some(message) = evaluate_schedule(&quiz, Utc::now()).message() {
        if actor.is_student() {
            println!("{message}");
            return Ok(());
        }
        println!("(preview) {message}");
    }

    if let Actor::Student { name, nis } = &actor {
        if let Some(reason) =
            retake_block(store.as_ref(), &module.title, &quiz.title, nis, quiz.kind).await?
        {
            println!("{reason}");
            return Ok(());
        }
        store
            .upsert_student(&Student {
                nis: nis.clone(),
                name: name.clone(),
                classes,
            })
            .await
            .context("failed to register the student on the roster")?;
    }

    let mut session = Session::new(module.title.clone(), quiz, actor);
    if let Some(seed) = seed {
        session = session.with_shuffle_seed(seed);
    }

    let mut screen = Screen::new();
    let mut dispatch: Option<JoinHandle<()>> = None;

    let effects = session.apply(SessionEvent::Start, Utc::now());
    run_effects(effects, &mut screen, &store, &mut dispatch);
    if !session.is_running() {
        // Blocked start; the reason was printed by its effect.
        return Ok(());
    }

    print_header(&session, preview);
    render_question(&session);
    prompt();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick: Option<Instant> = None;

    while !session.is_terminal() {
        tokio::select! {
            _ = ticker.tick() => {
                let arrived = Instant::now();
                if let Some(previous) = last_tick {
                    if arrived.duration_since(previous) >= SUSPEND_GAP {
                        println!("\nThe quiz screen was left while the clock ran.");
                        let effects = session
                            .apply(SessionEvent::Signal(EnvironmentSignal::Hidden), Utc::now());
                        run_effects(effects, &mut screen, &store, &mut dispatch);
                        let effects = session
                            .apply(SessionEvent::Signal(EnvironmentSignal::Visible), Utc::now());
                        run_effects(effects, &mut screen, &store, &mut dispatch);
                    }
                }
                last_tick = Some(arrived);
                if session.is_terminal() {
                    break;
                }
                let effects = session.apply(SessionEvent::Tick, Utc::now());
                run_effects(effects, &mut screen, &store, &mut dispatch);
                announce_time(&session);
            }
            line = lines.next_line() => {
                match line.context("failed to read stdin")? {
                    Some(line) => {
                        if let Some(event) = line_to_event(&line, &session) {
                            let render = matches!(
                                &event,
                                SessionEvent::Navigate { .. } | SessionEvent::Answer { .. }
                            );
                            let effects = session.apply(event, Utc::now());
                            run_effects(effects, &mut screen, &store, &mut dispatch);
                            if render && session.is_running() {
                                render_question(&session);
                            }
                        }
                        if session.is_running() {
                            prompt();
                        }
                    }
                    // End of input submits whatever is on the sheet.
                    None => {
                        let effects = session.apply(SessionEvent::Submit, Utc::now());
                        run_effects(effects, &mut screen, &store, &mut dispatch);
                    }
                }
            }
        }
    }

    screen.exit();
    print_outcome(&session);

    if let Some(handle) = dispatch {
        let _ = handle.await;
    }

    Ok(())
}

fn resolve_identity(
    name: Option<String>,
    nis: Option<String>,
    config: &StoreConfig,
) -> Result<(Actor, Vec<String>)> {
    match (name, nis) {
        (Some(name), Some(nis)) => Ok((Actor::Student { name, nis }, Vec::new())),
        (None, None) => match &config.student {
            Some(identity) => Ok((
                Actor::Student {
                    name: identity.name.clone(),
                    nis: identity.nis.clone(),
                },
                identity.classes.clone(),
            )),
            None => anyhow::bail!(
                "no student identity configured; add a [student] table to invigil.toml \
                 or pass --name and --nis"
            ),
        },
        _ => anyhow::bail!("pass both --name and --nis, or neither"),
    }
}

/// One attempt per exam; a disqualified attempt blocks any quiz kind
/// until an operator clears it.
async fn retake_block(
    store: &dyn ResultStore,
    module_title: &str,
    quiz_title: &str,
    nis: &str,
    kind: QuizKind,
) -> Result<Option<String>> {
    let previous = store.list_results().await?.into_iter().find(|r| {
        r.student_nis == nis && r.module_title == module_title && r.quiz_title == quiz_title
    });

    Ok(match previous {
        Some(prev) if prev.is_disqualified => Some(format!(
            "A disqualified attempt at this quiz is on record ({}). \
             Ask the operator to clear it before retaking.",
            prev.id
        )),
        Some(_) if !kind.allows_retry() => {
            Some("This exam has already been submitted. Only one attempt is allowed.".to_string())
        }
        _ => None,
    })
}

fn run_effects(
    effects: Vec<Effect>,
    screen: &mut Screen,
    store: &Arc<dyn ResultStore>,
    dispatch: &mut Option<JoinHandle<()>>,
) {
    for effect in effects {
        match effect {
            Effect::EnterFullscreen => screen.enter(),
            Effect::ExitFullscreen => screen.exit(),
            // The host interval runs for the whole loop; the session drops
            // ticks that arrive outside Running.
            Effect::StartTimer | Effect::StopTimer => {}
            Effect::Warn(warning) => println!("\n!! {warning}"),
            Effect::Blocked { reason } => println!("{reason}"),
            Effect::Dispatch(result) => {
                *dispatch = Some(dispatch_result(
                    store.clone(),
                    Arc::new(OperatorNotifier),
                    result,
                ));
            }
        }
    }
}

fn print_header(session: &Session, preview: bool) {
    let quiz = session.quiz();
    println!("{} :: {}", session.module_title(), quiz.title);
    let budget = match quiz.time_budget_secs() {
        Some(secs) => TimeBudget::Finite(secs).to_string(),
        None => "no time limit".to_string(),
    };
    println!(
        "{} questions, {budget}, {} quiz{}",
        quiz.questions.len(),
        quiz.kind,
        if preview {
            " (preview, nothing is stored)"
        } else {
            ""
        },
    );
    println!("Answer with the option number or free text. Commands: :n :p :g K :submit");
}

fn render_question(session: &Session) {
    let Some(current) = session.current_question() else {
        return;
    };

    println!();
    println!(
        "[{}/{}] {}",
        current.position + 1,
        current.total,
        current.question.prompt
    );
    if let Some(image) = &current.question.image {
        println!("  (image: {image})");
    }
    match &current.question.kind {
        QuestionKind::MultipleChoice { options, .. } => {
            for (i, option) in options.iter().enumerate() {
                println!("  {}. {option}", i + 1);
            }
        }
        QuestionKind::Essay { .. } => println!("  (free-text answer)"),
    }
    if let Some(answer) = current.answer {
        if !answer.is_empty() {
            println!("  current answer: {answer}");
        }
    }
}

/// Maps one input line to a session event; prints a hint when it cannot.
fn line_to_event(line: &str, session: &Session) -> Option<SessionEvent> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    if let Some(rest) = line.strip_prefix(":g") {
        return match rest.trim().parse::<usize>() {
            Ok(k) if k >= 1 => Some(SessionEvent::Navigate { position: k - 1 }),
            _ => {
                println!("Usage: :g <question number>");
                None
            }
        };
    }

    match line {
        ":submit" => Some(SessionEvent::Submit),
        ":n" => {
            let current = session.current_question()?;
            Some(SessionEvent::Navigate {
                position: current.position + 1,
            })
        }
        ":p" => {
            let current = session.current_question()?;
            Some(SessionEvent::Navigate {
                position: current.position.saturating_sub(1),
            })
        }
        _ if line.starts_with(':') => {
            println!("Commands: :n next, :p previous, :g K go to question K, :submit finish");
            None
        }
        answer => {
            let current = session.current_question()?;
            let response = match &current.question.kind {
                QuestionKind::MultipleChoice { options, .. } => match answer.parse::<usize>() {
                    Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].clone(),
                    _ => {
                        println!("Answer with the option number (1-{}).", options.len());
                        return None;
                    }
                },
                QuestionKind::Essay { .. } => answer.to_string(),
            };
            Some(SessionEvent::Answer {
                question_id: current.question.id.clone(),
                response,
            })
        }
    }
}

/// Calls out the remaining time at round thresholds.
fn announce_time(session: &Session) {
    if let Some(TimeBudget::Finite(secs)) = session.remaining() {
        if matches!(secs, 300 | 60 | 30 | 10) {
            println!("\n{} left.", TimeBudget::Finite(secs));
            prompt();
        }
    }
}

fn print_outcome(session: &Session) {
    match session.state() {
        SessionState::Completed(outcome) => {
            println!();
            if session.quiz().kind.reveals_results() {
                println!("Score: {}/100", outcome.total);
                for answer in &outcome.answers {
                    let shown = if answer.answer.is_empty() {
                        "(unanswered)"
                    } else {
                        answer.answer.as_str()
                    };
                    println!(
                        "  [{}/{}] {}: {shown}",
                        answer.score, answer.max_score, answer.question_id
                    );
                }
                if outcome.violations > 0 {
                    println!(
                        "  {} integrity violation(s) were recorded.",
                        outcome.violations
                    );
                }
            } else {
                println!(
                    "Submission received at {}.",
                    outcome.submitted_at.format("%Y-%m-%d %H:%M UTC")
                );
                println!("Exam results are released by the operator.");
            }
        }
        SessionState::Disqualified(outcome) => {
            println!();
            println!(
                "Disqualified after {} integrity violations. The recorded score is 0.",
                outcome.violations
            );
        }
        _ => {}
    }
}

fn prompt() {
    print!("> ");
    let _ = io::stdout().flush();
}
