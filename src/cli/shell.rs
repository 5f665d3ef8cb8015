use std::io::{self, BufRead, Lines, StdinLock};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};

use crate::cli::context::{CliError, CliMode, CommandError, LoopControl, ShellContext};
use crate::cli::output::{self, OutputPreferences};
use crate::ledger::{Category, ExpenseCategory, IncomeCategory};

/// Set to run commands read line by line from stdin, without prompts or colours.
pub const SCRIPT_ENV: &str = "MYBUDGET_CLI_SCRIPT";

const KIND_WORDS: [&str; 4] = ["expense", "expenses", "income", "incomes"];
const FREQUENCY_WORDS: [&str; 6] = ["once", "daily", "weekly", "monthly", "yearly", "custom"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };
    output::set_preferences(OutputPreferences {
        plain: mode == CliMode::Script,
    });

    let mut context = ShellContext::new(mode)?;
    let mut input = match mode {
        CliMode::Interactive => LineSource::editor(&context)?,
        CliMode::Script => LineSource::Script(io::stdin().lock().lines()),
    };

    while context.running {
        let line = match input.next(&context.prompt())? {
            Next::Line(line) => line,
            Next::Interrupted => {
                if context.confirm_exit()? {
                    break;
                }
                continue;
            }
            Next::Done => break,
        };
        input.remember(&line);
        match handle_line(&mut context, &line) {
            Ok(LoopControl::Continue) => {}
            Ok(LoopControl::Exit) => break,
            Err(err) => context.report_error(err)?,
        }
    }
    Ok(())
}

enum Next {
    Line(String),
    Interrupted,
    Done,
}

/// Where shell lines come from: the line editor, or stdin in script mode.
enum LineSource {
    Editor(Box<Editor<ArgumentCompleter, DefaultHistory>>),
    Script(Lines<StdinLock<'static>>),
}

impl LineSource {
    fn editor(context: &ShellContext) -> Result<Self, CliError> {
        let mut editor = Editor::<ArgumentCompleter, DefaultHistory>::new()?;
        editor.set_helper(Some(ArgumentCompleter::new(context.command_names())));
        editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);
        Ok(LineSource::Editor(Box::new(editor)))
    }

    fn next(&mut self, prompt: &str) -> Result<Next, CliError> {
        match self {
            LineSource::Editor(editor) => match editor.readline(prompt) {
                Ok(line) => Ok(Next::Line(line)),
                Err(ReadlineError::Interrupted) => Ok(Next::Interrupted),
                Err(ReadlineError::Eof) => {
                    output::info("Exiting shell.");
                    Ok(Next::Done)
                }
                Err(err) => Err(err.into()),
            },
            LineSource::Script(lines) => match lines.next() {
                Some(line) => Ok(Next::Line(line?)),
                None => Ok(Next::Done),
            },
        }
    }

    fn remember(&mut self, line: &str) {
        if let LineSource::Editor(editor) = self {
            let trimmed = line.trim();
            if !trimmed.is_empty() {
                editor.add_history_entry(trimmed).ok();
            }
        }
    }
}

/// Splits a line into words and runs the matching command.
pub(crate) fn handle_line(
    context: &mut ShellContext,
    line: &str,
) -> Result<LoopControl, CommandError> {
    let tokens = match shell_words::split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output::warning(format!("Could not read `{}`: {}", line.trim(), err));
            return Ok(LoopControl::Continue);
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return Ok(LoopControl::Continue);
    };

    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    context.last_command = Some(line.trim().to_string());

    let control = context.dispatch(&raw.to_lowercase(), raw, &args)?;
    if control == LoopControl::Exit {
        context.running = false;
    }
    Ok(control)
}

/// Completes command names, then the kind, category and frequency words each
/// command takes.
struct ArgumentCompleter {
    commands: Vec<&'static str>,
}

impl ArgumentCompleter {
    fn new(mut commands: Vec<&'static str>) -> Self {
        commands.sort_unstable();
        commands.dedup();
        Self { commands }
    }

    fn candidates(&self, words: &[&str], position: usize) -> Vec<&'static str> {
        if position == 0 {
            return self.commands.clone();
        }
        match (words[0].to_ascii_lowercase().as_str(), position) {
            ("history" | "clear" | "delete" | "archive" | "unarchive", 1) => KIND_WORDS.to_vec(),
            ("add-expense", 3) => ExpenseCategory::ALL
                .into_iter()
                .map(|category| Category::Expense(category).name())
                .collect(),
            ("add-income", 3) => IncomeCategory::SELECTABLE
                .into_iter()
                .map(|category| Category::Income(category).name())
                .collect(),
            ("add-expense" | "add-income", 4) => FREQUENCY_WORDS.to_vec(),
            ("help", 1) => self.commands.clone(),
            _ => Vec::new(),
        }
    }
}

impl Completer for ArgumentCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let prefix = &line[..pos];
        let words: Vec<&str> = prefix.split_whitespace().collect();
        let partial = if prefix.ends_with(char::is_whitespace) {
            ""
        } else {
            words.last().copied().unwrap_or("")
        };
        let position = if partial.is_empty() {
            words.len()
        } else {
            words.len() - 1
        };

        let needle = partial.to_ascii_lowercase();
        let matches = self
            .candidates(&words, position)
            .into_iter()
            .filter(|candidate| candidate.to_ascii_lowercase().starts_with(&needle))
            .map(|candidate| Pair {
                display: candidate.to_string(),
                replacement: candidate.to_string(),
            })
            .collect();
        Ok((pos - partial.len(), matches))
    }
}

impl Hinter for ArgumentCompleter {
    type Hint = String;
}

impl Highlighter for ArgumentCompleter {}

impl Validator for ArgumentCompleter {}

impl Helper for ArgumentCompleter {}
