use super::symbols::{AMPERSAND, DOLLAR, NEWLINE, PIPE, SHELL_NAME_PARAMETER, WHITESPACE};
use crate::exec::{Command, ParseResult};
use crate::state::ShellEnvironment;

/// Splits a raw input line into pipeline stages.
///
/// Tokens are separated by single spaces; the empty tokens produced by runs of spaces are
/// dropped. A newline ends the token it appears in. `|` starts a new stage, `&` marks the
/// line as a background job, and `$`-tokens are crudely expanded (`$0` becomes the shell
/// name, anything else becomes an empty argument). Control tokens never reach a `Command`.
///
/// Returns `None` if the line contains nothing but whitespace.
pub fn tokenize(line: &str, shell_name: &str, env: &mut ShellEnvironment) -> Option<ParseResult> {
    let mut stages = vec![Command::new()];
    let mut saw_token = false;

    for raw_token in line.split(WHITESPACE) {
        let token = strip_newline(raw_token);
        if token.is_empty() {
            continue;
        }

        saw_token = true;
        match token {
            PIPE => {
                env.add_pipe();
                stages.push(Command::new());
            }
            AMPERSAND => env.set_background(),
            _ => {
                let arg = expand_parameter(token, shell_name);
                // * There is always at least one stage, so this cannot fail
                if let Some(stage) = stages.last_mut() {
                    stage.push(arg);
                }
            }
        }
    }

    if !saw_token {
        return None;
    }

    Some(ParseResult::new(stages, env.background()))
}

// Everything from the first newline onwards is dropped from the token
fn strip_newline(token: &str) -> &str {
    match token.find(NEWLINE) {
        Some(index) => &token[..index],
        None => token,
    }
}

fn expand_parameter<'a>(token: &'a str, shell_name: &'a str) -> &'a str {
    if token == SHELL_NAME_PARAMETER {
        shell_name
    } else if token.starts_with(DOLLAR) {
        // ? Real parameter expansion would look the variable up instead
        ""
    } else {
        token
    }
}
