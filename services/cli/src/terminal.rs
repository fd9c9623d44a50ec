//! Line-oriented quiz loop. Generic over the reader and writer so the whole
//! flow can be driven by scripted input.

use crate::render::{self, Palette};
use civic_sense::access::{require_session, AccountSession, AuthError, IdentityProvider};
use civic_sense::error::AppError;
use civic_sense::quiz::{CompletionOutcome, Ordinal, QuizController, QuizGateway, SessionPhase};
use std::io::{self, BufRead, Write};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AnswerInput {
    Keep,
    Value(Ordinal),
    Quit,
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultsCommand {
    Toggle(usize),
    Retake,
    Quit,
    Unknown,
}

/// Establishes an identity session for `email`, registering the account on
/// first use, and passes it through the quiz gate.
pub(crate) fn sign_in<P, R, W>(
    provider: &P,
    email: &str,
    password: Option<String>,
    input: &mut R,
    out: &mut W,
) -> Result<AccountSession, AppError>
where
    P: IdentityProvider + ?Sized,
    R: BufRead,
    W: Write,
{
    let password = match password {
        Some(password) => password,
        None => {
            write!(out, "Password for {email}: ")?;
            out.flush()?;
            read_line(input)?.ok_or(AuthError::InvalidCredentials)?
        }
    };

    match provider.sign_up(email, &password) {
        Ok(_) => {}
        Err(AuthError::AlreadyRegistered) => {
            provider.sign_in(email, &password)?;
        }
        Err(err) => return Err(err.into()),
    }

    Ok(require_session(provider)?)
}

/// Runs the quiz until the user quits or input ends.
pub(crate) async fn drive<G, R, W>(
    controller: &mut QuizController<G>,
    input: &mut R,
    out: &mut W,
    palette: Palette,
) -> Result<(), AppError>
where
    G: QuizGateway,
    R: BufRead,
    W: Write,
{
    let mut ask = true;
    loop {
        match controller.session().phase() {
            SessionPhase::Ready => {
                if ask && collect_answers(controller, input, out, palette)? == Flow::Quit {
                    return Ok(());
                }
                ask = true;

                match controller.submit().await? {
                    CompletionOutcome::Applied => {}
                    CompletionOutcome::Degraded | CompletionOutcome::Stale => {
                        writeln!(out)?;
                        writeln!(out, "Results are not available right now. Your answers are kept.")?;
                        write!(out, "Press Enter to try again, e to edit answers, or q to quit: ")?;
                        out.flush()?;
                        match read_line(input)?.as_deref() {
                            None => return Ok(()),
                            Some(line) if is_quit(line) => return Ok(()),
                            Some(line) if line.eq_ignore_ascii_case("e") => {}
                            Some(_) => ask = false,
                        }
                    }
                }
            }
            SessionPhase::Results => {
                if results_menu(controller, input, out, palette)? == Flow::Quit {
                    return Ok(());
                }
            }
            SessionPhase::Loading | SessionPhase::Submitting => return Ok(()),
        }
    }
}

fn collect_answers<G, R, W>(
    controller: &mut QuizController<G>,
    input: &mut R,
    out: &mut W,
    palette: Palette,
) -> Result<Flow, AppError>
where
    G: QuizGateway,
    R: BufRead,
    W: Write,
{
    let view = controller.view();
    let total = view.questions.len();
    if total == 0 {
        writeln!(out)?;
        writeln!(out, "No questions are available right now.")?;
        return Ok(Flow::Continue);
    }

    for question in &view.questions {
        render::question(out, palette, question, total)?;
        loop {
            render::answer_prompt(out, question.answer)?;
            let Some(line) = read_line(input)? else {
                return Ok(Flow::Quit);
            };
            match parse_answer(&line) {
                AnswerInput::Keep => break,
                AnswerInput::Quit => return Ok(Flow::Quit),
                AnswerInput::Value(value) => {
                    controller.answer(question.id.clone(), value)?;
                    break;
                }
                AnswerInput::Invalid => writeln!(out, "Please enter a number from 1 to 5.")?,
            }
        }
    }
    Ok(Flow::Continue)
}

fn results_menu<G, R, W>(
    controller: &mut QuizController<G>,
    input: &mut R,
    out: &mut W,
    palette: Palette,
) -> Result<Flow, AppError>
where
    G: QuizGateway,
    R: BufRead,
    W: Write,
{
    let mut redraw = true;
    loop {
        if redraw {
            if let Some(view) = controller.results_view() {
                render::results(out, palette, &view)?;
            }
            redraw = false;
        }

        writeln!(out)?;
        write!(out, "[d N] toggle breakdown  [r] retake quiz  [q] quit: ")?;
        out.flush()?;
        let Some(line) = read_line(input)? else {
            return Ok(Flow::Quit);
        };

        match parse_command(&line) {
            ResultsCommand::Toggle(number) => {
                let target = controller.results_view().and_then(|view| {
                    number
                        .checked_sub(1)
                        .and_then(|index| view.top_matches.get(index))
                        .map(|entry| entry.manifesto_id.clone())
                });
                match target {
                    Some(id) => {
                        let open = controller.toggle_details(&id)?.is_some();
                        debug!(manifesto = %id, open, "breakdown toggled");
                        redraw = true;
                    }
                    None => writeln!(out, "There is no match numbered {number}.")?,
                }
            }
            ResultsCommand::Retake => {
                controller.reset()?;
                return Ok(Flow::Continue);
            }
            ResultsCommand::Quit => return Ok(Flow::Quit),
            ResultsCommand::Unknown => writeln!(out, "Unrecognised command.")?,
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

fn is_quit(line: &str) -> bool {
    line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit")
}

fn parse_answer(line: &str) -> AnswerInput {
    if line.is_empty() {
        return AnswerInput::Keep;
    }
    if is_quit(line) {
        return AnswerInput::Quit;
    }
    line.parse::<u8>()
        .ok()
        .and_then(|value| Ordinal::new(value).ok())
        .map_or(AnswerInput::Invalid, AnswerInput::Value)
}

fn parse_command(line: &str) -> ResultsCommand {
    if is_quit(line) {
        return ResultsCommand::Quit;
    }
    if line.eq_ignore_ascii_case("r") {
        return ResultsCommand::Retake;
    }
    line.strip_prefix(['d', 'D'])
        .and_then(|rest| rest.trim().parse::<usize>().ok())
        .map_or(ResultsCommand::Unknown, ResultsCommand::Toggle)
}
