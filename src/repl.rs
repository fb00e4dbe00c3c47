use crate::interpreter::Interpreter;
use crate::registry::Registry;
use crate::value::starts_with_ignore_case;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Tab completion over the registered command names.
///
/// The candidate list is captured when the helper is built; the registry
/// does not change while a session is running.
pub struct ConsoleHelper {
    commands: Vec<(&'static str, String)>,
}

impl ConsoleHelper {
    pub fn new(registry: &Registry) -> Self {
        let commands = registry
            .list_names("")
            .zip(registry.list_signatures(""))
            .collect();
        Self { commands }
    }
}

impl Completer for ConsoleHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // complete the word under the cursor, which may be a nested call
        let start = line[..pos]
            .char_indices()
            .rev()
            .find(|(_, c)| *c == '(' || *c == ',' || *c == '=' || c.is_whitespace())
            .map_or(0, |(i, c)| i + c.len_utf8());
        let prefix = &line[start..pos];

        let candidates = self
            .commands
            .iter()
            .filter(|(name, _)| starts_with_ignore_case(name, prefix))
            .map(|(name, listing)| Pair {
                display: listing.clone(),
                replacement: name.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ConsoleHelper {
    type Hint = String;
}

impl Highlighter for ConsoleHelper {}

impl Validator for ConsoleHelper {}

impl Helper for ConsoleHelper {}

/// Read-Eval-Print Loop over an [`Interpreter`].
///
/// History is kept in memory for the session only. `help` lists the
/// commands and `exit`/`quit` leave the loop, unless a registered operation
/// has one of those names. Ctrl-C and Ctrl-D also exit.
pub fn repl(console: &mut Interpreter, prompt: &str) -> rustyline::Result<()> {
    let mut rl: Editor<ConsoleHelper, DefaultHistory> = Editor::new()?;
    rl.set_helper(Some(ConsoleHelper::new(console.registry())));

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                rl.add_history_entry(line)?;

                match builtin(console, line) {
                    Some(Builtin::Help) => console.help(),
                    Some(Builtin::Exit) => break,
                    None => {
                        console.evaluate(line);
                    }
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Builtin {
    Help,
    Exit,
}

/// Session words handled by the loop itself. Registered operations win.
fn builtin(console: &Interpreter, line: &str) -> Option<Builtin> {
    let word = line.trim_end_matches("()");
    let builtin = if word.eq_ignore_ascii_case("help") {
        Builtin::Help
    } else if word.eq_ignore_ascii_case("exit") || word.eq_ignore_ascii_case("quit") {
        Builtin::Exit
    } else {
        return None;
    };
    match console.registry().find_by_name_and_arity(word, 0) {
        Some(_) => None,
        None => Some(builtin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Args, CommandTable, Target};
    use crate::value::ParamType;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Door;

    impl Target for Door {
        fn declare(table: &mut CommandTable<Self>) {
            table.command("Open", |_: &mut Door, _: &Args| Ok(None));
            table
                .command("Lock", |_: &mut Door, _: &Args| Ok(None))
                .param("code", ParamType::Int);
            table.command("Quit", |_: &mut Door, _: &Args| Ok(None));
        }
    }

    fn console() -> Interpreter {
        let mut console = Interpreter::default();
        console.register(Rc::new(RefCell::new(Door))).unwrap();
        console
    }

    fn complete(helper: &ConsoleHelper, line: &str) -> (usize, Vec<(String, String)>) {
        let history = DefaultHistory::new();
        let ctx = Context::new(&history);
        let (start, pairs) = helper.complete(line, line.len(), &ctx).unwrap();
        (
            start,
            pairs.into_iter().map(|p| (p.replacement, p.display)).collect(),
        )
    }

    #[test]
    fn test_completes_command_names_with_signatures() {
        let helper = ConsoleHelper::new(console().registry());
        assert_eq!(
            complete(&helper, "lo"),
            (0, vec![("Lock".to_string(), "Lock(code : int)".to_string())])
        );
    }

    #[test]
    fn test_completes_inside_nested_call() {
        let helper = ConsoleHelper::new(console().registry());
        let (start, pairs) = complete(&helper, "Lock(op");
        assert_eq!(start, 5);
        assert_eq!(pairs, vec![("Open".to_string(), "Open".to_string())]);
    }

    #[test]
    fn test_session_builtins_yield_to_registered_operations() {
        let console = console();
        assert_eq!(builtin(&console, "help"), Some(Builtin::Help));
        assert_eq!(builtin(&console, "HELP()"), Some(Builtin::Help));
        assert_eq!(builtin(&console, "exit"), Some(Builtin::Exit));
        assert_eq!(builtin(&console, "quit"), None);
        assert_eq!(builtin(&console, "Open"), None);
    }
}
