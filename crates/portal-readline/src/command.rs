//! REPL command parsing.

use std::path::PathBuf;
use std::str::FromStr;

use portal_core::application::{ApplicationId, FileSlot};
use portal_core::error::PortalError;
use portal_core::state::ViewState;

/// Command names offered for completion, in help order.
pub const COMMAND_NAMES: [&str; 8] = [
    "apply", "login", "logout", "go", "show", "download", "help", "quit",
];

/// Targets of the `go` command.
pub const VIEW_NAMES: [&str; 3] = ["applicant", "login", "admin"];

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fill in and submit the applicant form.
    Apply,
    /// Sign in, prompting for whatever was not given inline.
    Login {
        username: Option<String>,
        password: Option<String>,
    },
    Logout,
    Go(ViewState),
    /// Re-render the current view.
    Show,
    Download {
        id: ApplicationId,
        slot: FileSlot,
        dir: Option<PathBuf>,
    },
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = PortalError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words
            .next()
            .ok_or_else(|| PortalError::validation("empty command"))?;
        let args: Vec<&str> = words.collect();

        let command = match (name, args.as_slice()) {
            ("apply", []) => Command::Apply,
            ("login", []) => Command::Login {
                username: None,
                password: None,
            },
            ("login", [username]) => Command::Login {
                username: Some(username.to_string()),
                password: None,
            },
            ("login", [username, password]) => Command::Login {
                username: Some(username.to_string()),
                password: Some(password.to_string()),
            },
            ("logout", []) => Command::Logout,
            ("go", [view]) => Command::Go(view.parse()?),
            ("show", []) => Command::Show,
            ("download", [id, slot]) => Command::Download {
                id: id.parse()?,
                slot: slot.parse()?,
                dir: None,
            },
            ("download", [id, slot, dir]) => Command::Download {
                id: id.parse()?,
                slot: slot.parse()?,
                dir: Some(PathBuf::from(*dir)),
            },
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            (name, _) if COMMAND_NAMES.contains(&name) => {
                return Err(PortalError::validation(format!(
                    "wrong arguments for '{}', see 'help'",
                    name
                )));
            }
            (name, _) => {
                return Err(PortalError::validation(format!(
                    "unknown command '{}', see 'help'",
                    name
                )));
            }
        };
        Ok(command)
    }
}

/// Usage text for the `help` command.
pub const HELP: &str = "\
apply                               fill in and submit an application
login [username [password]]         sign in as admin (demo account, not secure;
                                    an inline password is shown, not saved to history)
logout                              sign out
go <applicant|login|admin>          switch view
show                                show the current view again
download <id> <slot> [dir]          save an attachment (slot: resume, coverLetter, transcripts)
help                                show this help
quit                                exit";
