//! Terminal presentation of rendered pages.

use colored::Colorize;
use portal_application::PageSink;
use portal_core::render::{ApplicationCard, Dashboard, RenderedPage};
use portal_core::state::ViewState;

/// Prints a page whenever the visible panel or its content changes.
///
/// Outcome messages (notices, errors) are reported by the REPL loop, so
/// re-renders that only toggle them print nothing here.
#[derive(Default)]
pub struct TextPresenter {
    last: Option<RenderedPage>,
}

impl TextPresenter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageSink for TextPresenter {
    fn present(&mut self, page: &RenderedPage) {
        let previous = self.last.replace(page.clone());

        if page.submit_control.busy {
            if !previous.is_some_and(|p| p.submit_control.busy) {
                println!("{}", "Submitting application...".bright_black());
            }
            return;
        }

        let changed = previous
            .is_none_or(|p| p.panel != page.panel || p.dashboard != page.dashboard);
        if changed {
            print_page(page);
        }
    }
}

/// Prints the whole page.
pub fn print_page(page: &RenderedPage) {
    println!();
    match page.panel {
        ViewState::Applicant => {
            println!("{}", "=== Job Application ===".bright_magenta().bold());
            println!(
                "{}",
                "Use 'apply' to submit your application. Resume, cover letter and transcripts are optional."
                    .bright_black()
            );
        }
        ViewState::Login => {
            println!("{}", "=== Admin Login ===".bright_magenta().bold());
            println!("{}", "Use 'login' to sign in.".bright_black());
        }
        ViewState::Admin => {
            println!("{}", "=== Admin Dashboard ===".bright_magenta().bold());
            println!("{}", "Use 'logout' to sign out.".bright_black());
            if let Some(dashboard) = &page.dashboard {
                print_dashboard(dashboard);
            }
        }
    }

    if page.show_admin_login_link {
        println!("{}", "[Admin login: go login]".cyan());
    }
    if page.show_applicant_link {
        println!("{}", "[Back to application form: go applicant]".cyan());
    }
    println!();
}

fn print_dashboard(dashboard: &Dashboard) {
    match dashboard {
        Dashboard::Empty { message } => println!("{}", message.yellow()),
        Dashboard::Listing(cards) => {
            println!("{}", format!("{} application(s)", cards.len()).bright_black());
            for card in cards {
                print_card(card);
            }
        }
    }
}

fn print_card(card: &ApplicationCard) {
    println!();
    println!("{}", card.full_name.bold());
    println!("  Id:        {}", card.id);
    println!("  Email:     {}", card.email);
    println!("  Phone:     {}", card.phone);
    println!("  Submitted: {}", card.submitted);
    if card.downloads.is_empty() {
        println!("  {}", "No files attached".bright_black());
    }
    for link in &card.downloads {
        println!(
            "  {:<13}{}  {}",
            format!("{}:", link.slot.label()),
            link.label.bright_blue(),
            format!("(download {} {})", card.id, link.slot).bright_black()
        );
    }
}
