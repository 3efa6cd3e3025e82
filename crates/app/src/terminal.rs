//! Line-oriented front-end. Each screen prints itself and reads one line at a time.

use std::io::BufRead;

use quiz_core::model::Difficulty;
use services::{AppServices, RunOutcome, SessionCommand, SessionUpdate};
use tokio::sync::mpsc;
use ui::vm::{
    DifficultyOptionVm, OptionState, QuizScreen, QuizVm, ResultsVm, load_difficulty_options,
    map_results,
};
use ui::{Navigator, Route, ViewError};

type AnyError = Box<dyn std::error::Error>;

const QUIZ_KEYS: &str = "[1-9] select  n next  f finish  s skip  p previous  q leave";

/// Stdin lines, read on a dedicated thread so a pending read never blocks shutdown.
struct Input {
    lines: mpsc::UnboundedReceiver<String>,
}

impl Input {
    fn spawn() -> Self {
        let (tx, lines) = mpsc::unbounded_channel();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines }
    }

    /// `None` once stdin is closed.
    async fn next(&mut self) -> Option<String> {
        self.lines.recv().await.map(|line| line.trim().to_lowercase())
    }
}

enum Played {
    Finished(services::QuizOutcome),
    Left,
    Failed(ViewError),
    Closed,
}

/// Show screens until the user quits or stdin closes.
///
/// # Errors
///
/// Returns an error if the session task panics.
pub async fn run(services: &AppServices, mut nav: Navigator) -> Result<(), AnyError> {
    let mut input = Input::spawn();

    loop {
        match nav.current().clone() {
            Route::Home => {
                println!();
                println!("=== Trivia Quiz ===");
                println!("Enter to start, q to quit.");
                match input.next().await.as_deref() {
                    None | Some("q") => return Ok(()),
                    Some(_) => {
                        nav.start();
                    }
                }
            }
            Route::Difficulty => {
                let options =
                    load_difficulty_options(&services.questions(), &services.scores()).await;
                print_difficulties(&options);
                let Some(line) = input.next().await else {
                    return Ok(());
                };
                match line.as_str() {
                    "q" => return Ok(()),
                    "h" => {
                        nav.home();
                    }
                    choice => match pick_difficulty(choice, &options) {
                        Some(difficulty) => {
                            nav.choose(difficulty);
                        }
                        None => println!("Pick one of the available numbers."),
                    },
                }
            }
            Route::Quiz { difficulty } => match play(services, difficulty, &mut input).await? {
                Played::Finished(outcome) => {
                    nav.finish(outcome);
                }
                Played::Left => {
                    nav.home();
                }
                Played::Failed(err) => {
                    println!("{err}");
                    nav.start();
                }
                Played::Closed => return Ok(()),
            },
            Route::Results { outcome } => {
                print_results(&map_results(outcome.as_deref()));
                println!("r restart  h home  q quit");
                match input.next().await.as_deref() {
                    None | Some("q") => return Ok(()),
                    Some("r") => {
                        nav.restart();
                    }
                    Some("h") => {
                        nav.home();
                    }
                    Some(_) => {}
                }
            }
        }
    }
}

async fn play(
    services: &AppServices,
    difficulty: Difficulty,
    input: &mut Input,
) -> Result<Played, AnyError> {
    let (commands, command_rx) = mpsc::channel(16);
    let (update_tx, mut updates) = mpsc::unbounded_channel();
    let quiz_loop = services.quiz_loop();
    let task = tokio::spawn(async move { quiz_loop.run(difficulty, command_rx, update_tx).await });

    println!("Loading {} questions...", difficulty.label());
    let mut screen = QuizScreen::loading(difficulty);
    let mut drawn: Option<QuizVm> = None;

    loop {
        tokio::select! {
            update = updates.recv() => {
                let Some(update) = update else { break };
                if let SessionUpdate::Rejected { reason } = &update {
                    println!("! {reason}");
                }
                if screen.apply(&update).is_some() {
                    break;
                }
                if let Some(vm) = screen.vm() {
                    draw(vm, &mut drawn);
                }
            }
            line = input.next() => {
                let Some(line) = line else {
                    task.abort();
                    return Ok(Played::Closed);
                };
                match parse_command(&line, screen.vm()) {
                    // A send error means the session already ended; the update
                    // stream will close next.
                    Some(command) => { let _ = commands.send(command).await; }
                    None => println!("{QUIZ_KEYS}"),
                }
            }
        }
    }

    Ok(match task.await? {
        Ok(RunOutcome::Completed(outcome)) => Played::Finished(outcome),
        Ok(RunOutcome::Abandoned { .. }) => Played::Left,
        Err(err) => Played::Failed(ViewError::from(&err)),
    })
}

fn parse_command(line: &str, vm: Option<&QuizVm>) -> Option<SessionCommand> {
    match line {
        "n" => Some(SessionCommand::Next),
        "f" => Some(SessionCommand::Finish),
        "s" => Some(SessionCommand::Skip),
        "p" => Some(SessionCommand::Previous),
        "q" => Some(SessionCommand::Quit),
        digits => {
            let number = digits.parse::<usize>().ok()?;
            let label = vm?.option_label(number)?;
            Some(SessionCommand::Select(label.to_string()))
        }
    }
}

fn pick_difficulty(choice: &str, options: &[DifficultyOptionVm]) -> Option<Difficulty> {
    let index = choice.parse::<usize>().ok()?.checked_sub(1)?;
    options
        .get(index)
        .filter(|option| option.available)
        .map(|option| option.difficulty)
}

/// Redraw when the question or its options change; a countdown tick only
/// prints once it is urgent.
fn draw(vm: &QuizVm, drawn: &mut Option<QuizVm>) {
    match drawn.as_ref() {
        Some(prev)
            if prev.question_number == vm.question_number
                && prev.input_locked == vm.input_locked
                && prev.options == vm.options =>
        {
            if prev.timer_label != vm.timer_label && vm.timer_urgent {
                println!("  {} left", vm.timer_label);
            }
        }
        _ => print_question(vm),
    }
    *drawn = Some(vm.clone());
}

fn print_difficulties(options: &[DifficultyOptionVm]) {
    println!();
    println!("Choose a difficulty (h home, q quit):");
    for (index, option) in options.iter().enumerate() {
        let marker = if option.available { ' ' } else { 'x' };
        println!(
            " {marker}{}) {:<7} {:<14} {}",
            index + 1,
            option.label,
            option.count_label,
            option.high_score_label
        );
    }
}

fn print_question(vm: &QuizVm) {
    println!();
    println!(
        "[{}] {}  ({})",
        vm.difficulty_label, vm.progress_label, vm.timer_label
    );
    println!("{}", vm.prompt);
    for (index, option) in vm.options.iter().enumerate() {
        let mark = match option.state {
            OptionState::Idle | OptionState::Dimmed => " ",
            OptionState::Selected => ">",
            OptionState::Correct => "+",
            OptionState::Incorrect => "-",
        };
        println!(" {mark} {}) {}", index + 1, option.label);
    }
    if let Some(feedback) = &vm.feedback {
        println!("{feedback}");
    } else {
        println!("{QUIZ_KEYS}");
    }
}

fn print_results(vm: &ResultsVm) {
    println!();
    match vm {
        ResultsVm::Empty { message } => println!("{message}"),
        ResultsVm::Ready(summary) => {
            println!(
                "=== Results: {} ===  Score {}  ({})",
                summary.difficulty_label, summary.score_label, summary.elapsed_label
            );
            println!("{}", summary.high_score_label);
            for row in &summary.rows {
                let mark = if row.is_correct { '+' } else { '-' };
                println!(" {mark} {}. {}", row.number, row.prompt);
                println!(
                    "     you: {}  correct: {}",
                    row.your_answer, row.correct_answer
                );
                if let Some(note) = &row.note {
                    println!("     {note}");
                }
            }
        }
    }
}
