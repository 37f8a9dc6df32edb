mod command;
mod presenter;

use std::borrow::Cow::{self, Borrowed, Owned};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use portal_application::Portal;
use portal_core::application::{ApplicationForm, FileSlot, LoginForm, SelectedFile};
use portal_core::auth::DemoCredentialVerifier;
use portal_core::state::ViewState;
use portal_infrastructure::{
    ConfigService, FileStore, FsFileReader, MemoryStore, SessionLoginRepository,
    StoreApplicationRepository,
};

use crate::command::{COMMAND_NAMES, Command, HELP, VIEW_NAMES};
use crate::presenter::{TextPresenter, print_page};

type PortalEditor = Editor<CliHelper, DefaultHistory>;

/// CLI helper for rustyline that provides completion, highlighting, and hints.
///
/// While `masking` is set the input is echoed as `*` and no hints or
/// completions are offered.
#[derive(Clone)]
struct CliHelper {
    commands: Vec<String>,
    masking: bool,
}

impl CliHelper {
    fn new() -> Self {
        Self {
            commands: COMMAND_NAMES.iter().map(|c| c.to_string()).collect(),
            masking: false,
        }
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        if self.masking {
            return Ok((0, vec![]));
        }
        let line = &line[..pos];

        let (start, word, choices): (usize, &str, Vec<&str>) = match line.strip_prefix("go ") {
            Some(view) => (3, view, VIEW_NAMES.to_vec()),
            None if !line.contains(' ') => {
                (0, line, self.commands.iter().map(String::as_str).collect())
            }
            None => return Ok((0, vec![])),
        };

        let candidates = choices
            .into_iter()
            .filter(|choice| choice.starts_with(word))
            .map(|choice| Pair {
                display: choice.to_string(),
                replacement: choice.to_string(),
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if self.masking {
            return Owned("*".repeat(line.chars().count()));
        }
        let first = line.split_whitespace().next().unwrap_or_default();
        if self.commands.iter().any(|cmd| cmd == first) {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if self.masking {
            return None;
        }
        let line = &line[..pos];

        if !line.is_empty() && !line.contains(' ') {
            self.commands
                .iter()
                .find(|cmd| cmd.starts_with(line) && cmd.len() > line.len())
                .map(|cmd| cmd[line.len()..].to_string())
        } else {
            None
        }
    }
}

impl Validator for CliHelper {}

/// Installs the stderr log subscriber. `RUST_LOG` wins over the configured level.
fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Reads one line of input for a form field.
fn ask(rl: &mut PortalEditor, prompt: &str) -> Result<String> {
    Ok(rl.readline(&format!("  {}", prompt))?)
}

/// Reads a secret without echoing it.
fn ask_masked(rl: &mut PortalEditor, prompt: &str) -> Result<String> {
    if let Some(helper) = rl.helper_mut() {
        helper.masking = true;
    }
    let answer = ask(rl, prompt);
    if let Some(helper) = rl.helper_mut() {
        helper.masking = false;
    }
    answer
}

/// Inline passwords stay out of history.
fn keeps_in_history(command: &Command) -> bool {
    !matches!(command, Command::Login { password: Some(_), .. })
}

fn prompt_application(rl: &mut PortalEditor) -> Result<ApplicationForm> {
    let full_name = ask(rl, "Full name: ")?;
    let email = ask(rl, "Email: ")?;
    let phone = ask(rl, "Phone: ")?;

    let mut form = ApplicationForm::new(full_name, email, phone);
    for slot in FileSlot::ALL {
        let path = ask(rl, &format!("{} file (blank for none): ", slot.label()))?;
        let path = path.trim();
        if !path.is_empty() {
            *form.slot_mut(slot) = Some(SelectedFile::from_path(path));
        }
    }
    Ok(form)
}

async fn apply(portal: &mut Portal, rl: &mut PortalEditor) -> Result<()> {
    if portal.state().view != ViewState::Applicant {
        portal.navigate_to(ViewState::Applicant).await;
    }

    let form = prompt_application(rl)?;
    portal.fill_application_form(form);

    match portal.submit_application().await {
        Ok(id) => {
            println!(
                "{}",
                format!("Application submitted successfully! (id {})", id).bright_green()
            );
        }
        Err(e) => {
            // Without an alert the form was refused before submitting.
            match portal.page().alert {
                Some(alert) => {
                    println!("{}", alert.red());
                    println!("{}", e.to_string().bright_black());
                    portal.dismiss_alert().await;
                }
                None => println!("{}", e.to_string().yellow()),
            }
        }
    }
    Ok(())
}

async fn login(
    portal: &mut Portal,
    rl: &mut PortalEditor,
    username: Option<String>,
    password: Option<String>,
) -> Result<()> {
    if portal.state().view != ViewState::Login {
        portal.navigate_to(ViewState::Login).await;
    }

    let username = match username {
        Some(username) => username,
        None => ask(rl, "Username: ")?,
    };
    let password = match password {
        Some(password) => password,
        None => ask_masked(rl, "Password: ")?,
    };
    portal.fill_login_form(LoginForm::new(username, password));

    if portal.submit_login().await? {
        println!("{}", "Logged in.".bright_green());
    } else if portal.page().login_error {
        println!("{}", "Invalid username or password.".red());
    }
    Ok(())
}

async fn download(
    portal: &Portal,
    id: portal_core::application::ApplicationId,
    slot: FileSlot,
    dir: Option<PathBuf>,
) -> Result<()> {
    let download = portal.download(id, slot).await?;

    // Only the final component of the stored name is used.
    let file_name = Path::new(&download.file_name)
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from(format!("{}-{}", id, slot)));
    let dir = dir.unwrap_or_else(|| PathBuf::from("."));
    let target = dir.join(file_name);

    tokio::fs::create_dir_all(&dir)
        .await
        .with_context(|| format!("Failed to create {:?}", dir))?;
    tokio::fs::write(&target, &download.bytes)
        .await
        .with_context(|| format!("Failed to write {:?}", target))?;

    tracing::info!("Saved attachment {}/{} to {:?}", id, slot, target);
    println!(
        "{}",
        format!(
            "Saved {} ({}, {} bytes) to {}",
            download.file_name,
            download.mime_type,
            download.bytes.len(),
            target.display()
        )
        .bright_green()
    );
    Ok(())
}

async fn run_command(portal: &mut Portal, rl: &mut PortalEditor, command: Command) -> Result<()> {
    match command {
        Command::Apply => apply(portal, rl).await?,
        Command::Login { username, password } => login(portal, rl, username, password).await?,
        Command::Logout => {
            portal.logout().await?;
            println!("{}", "Logged out.".bright_green());
        }
        Command::Go(view) => portal.navigate_to(view).await,
        Command::Show => {
            portal.refresh().await;
            print_page(&portal.page());
        }
        Command::Download { id, slot, dir } => download(portal, id, slot, dir).await?,
        Command::Help => println!("{}", HELP.bright_black()),
        Command::Quit => {}
    }
    Ok(())
}

/// The main entry point for the job portal REPL.
///
/// Loads the configuration, opens the durable store, and runs one portal
/// session until `quit` or end of input. The login flag lives only as long
/// as the session.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ===== Configuration & Logging =====
    let config_service = ConfigService::new();
    let config = config_service
        .load_or_create()
        .context("Failed to load configuration")?;
    init_tracing(&config.logging.level);

    // ===== Backend Initialization =====
    let storage_dir = config_service.storage_dir(&config)?;
    let mut durable = FileStore::new(&storage_dir)
        .await
        .with_context(|| format!("Failed to open storage at {:?}", storage_dir))?;
    if let Some(quota) = config.storage.quota_bytes {
        durable = durable.with_quota(quota);
    }
    tracing::debug!("Using storage at {:?}", storage_dir);

    let mut portal = Portal::new(
        Arc::new(StoreApplicationRepository::new(Arc::new(durable))),
        Arc::new(SessionLoginRepository::new(Arc::new(MemoryStore::new()))),
        Arc::new(DemoCredentialVerifier),
        Arc::new(FsFileReader::new()),
        Box::new(TextPresenter::new()),
    );

    // ===== REPL Setup =====
    let mut rl: PortalEditor = Editor::new()?;
    rl.set_helper(Some(CliHelper::new()));

    println!("{}", "=== Job Application Portal ===".bright_magenta().bold());
    println!("{}", "Type 'help' for commands, or 'quit' to exit.".bright_black());

    portal.initialize().await;

    // ===== Main REPL Loop =====
    loop {
        let prompt = format!("{}> ", portal.state().view);

        match rl.readline(&prompt) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let command = match trimmed.parse::<Command>() {
                    Ok(command) => command,
                    Err(e) => {
                        let _ = rl.add_history_entry(trimmed);
                        eprintln!("{}", e.to_string().yellow());
                        continue;
                    }
                };

                if keeps_in_history(&command) {
                    let _ = rl.add_history_entry(trimmed);
                }

                if command == Command::Quit {
                    println!("{}", "Goodbye!".bright_green());
                    break;
                }

                if let Err(e) = run_command(&mut portal, &mut rl, command).await {
                    eprintln!("{}", format!("Error: {:#}", e).red());
                }
            }
            Err(rustyline::error::ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                eprintln!("{}", format!("Error: {:?}", err).red());
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masking_hides_input() {
        let mut helper = CliHelper::new();
        assert_eq!(helper.highlight("password123", 0), "password123");

        helper.masking = true;
        assert_eq!(helper.highlight("password123", 0), "***********");
        assert_eq!(helper.highlight("", 0), "");
    }

    #[test]
    fn test_inline_password_is_not_kept_in_history() {
        let with_password = "login admin password123".parse::<Command>().unwrap();
        assert!(!keeps_in_history(&with_password));

        let without_password = "login admin".parse::<Command>().unwrap();
        assert!(keeps_in_history(&without_password));
        assert!(keeps_in_history(&Command::Show));
    }

    #[test]
    fn test_highlight_known_command() {
        let helper = CliHelper::new();
        assert_eq!(helper.highlight("quit", 0), "quit".bright_cyan().to_string());
        assert_eq!(helper.highlight("nonsense", 0), "nonsense");
    }
}
