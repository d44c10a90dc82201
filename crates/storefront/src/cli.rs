//! Command-line front end.
//!
//! Each invocation runs one command against a freshly loaded [`AppState`]
//! and renders the resulting screen as plain text.

use catalog::{App, CategoryFilter, HomeEntry};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::error::{AuthError, SyncError};
use crate::state::{AppState, Page, ProfileSection, Screen};
use crate::sync::{FeedbackKind, FeedbackOutcome};

#[derive(Debug, Parser)]
#[command(name = "storefront")]
#[command(about = "Browse the app catalog and keep track of your downloads")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List apps, with featured strips
    Home {
        /// Category to show ("All" or a category name)
        #[arg(long, value_parser = parse_category)]
        category: Option<CategoryFilter>,

        /// Case-insensitive text the app name must contain
        #[arg(long)]
        search: Option<String>,
    },

    /// List apps grouped by category
    Categories,

    /// List recent app updates
    Updates,

    /// Show one app's details
    Show {
        /// App id
        id: String,
    },

    /// Sign in, creating the account if it does not exist
    Login { identifier: String, secret: String },

    /// Sign out
    Logout,

    /// Print the signed-in identity
    Whoami,

    /// Install an app for the signed-in user
    Install {
        /// App id
        id: String,
    },

    /// Show the signed-in user's downloads and feedback
    Profile,

    /// Replace your complaint
    Complain { text: Vec<String> },

    /// Replace your suggestion
    Suggest { text: Vec<String> },
}

fn parse_category(value: &str) -> Result<CategoryFilter, String> {
    CategoryFilter::parse(value).ok_or_else(|| format!("unknown category: {}", value))
}

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}", .0.user_message())]
    Auth(#[from] AuthError),

    #[error("{0}")]
    Sync(#[from] SyncError),
}

/// Run `command` and render the outcome.
pub async fn execute(state: &mut AppState, command: Command) -> Result<String, CliError> {
    match command {
        Command::Home { category, search } => {
            state.set_category(category.unwrap_or_default());
            state.set_search(search.unwrap_or_default());
            state.navigate(Page::Home);
        }
        Command::Categories => state.navigate(Page::Categories),
        Command::Updates => state.navigate(Page::Updates),
        Command::Show { id } => {
            if !state.select_app(&id) {
                return Err(SyncError::UnknownApp { id }.into());
            }
        }
        Command::Login { identifier, secret } => {
            let identity = state.login(&identifier, &secret).await?;
            return Ok(format!("Signed in as {}", identity));
        }
        Command::Logout => {
            state.logout().await;
            return Ok("Signed out.".to_string());
        }
        Command::Whoami => {
            return Ok(match state.identity() {
                Some(identity) => identity.to_string(),
                None => "Not signed in.".to_string(),
            });
        }
        Command::Install { id } => {
            state.install(&id).await?;
            return Ok(notice_text(state));
        }
        Command::Profile => {
            state.navigate(Page::Account);
            state.toggle_section(ProfileSection::Downloads);
        }
        Command::Complain { text } => {
            return submit(state, FeedbackKind::Complaint, text.join(" ")).await;
        }
        Command::Suggest { text } => {
            return submit(state, FeedbackKind::Suggestion, text.join(" ")).await;
        }
    }
    Ok(render(&state.screen()))
}

async fn submit(state: &mut AppState, kind: FeedbackKind, text: String) -> Result<String, CliError> {
    state.set_draft(kind, text);
    match state.submit_feedback(kind).await? {
        FeedbackOutcome::Submitted => Ok(notice_text(state)),
        FeedbackOutcome::Skipped => Ok("Nothing to submit.".to_string()),
    }
}

fn notice_text(state: &AppState) -> String {
    state.notice().map(|n| n.text).unwrap_or_default()
}

fn app_line(app: &App) -> String {
    format!(
        "  {:<10} {:<28} {:<13} {}★",
        app.id,
        app.name,
        app.category.as_str(),
        app.formatted_rating()
    )
}

/// Render a screen as plain text.
pub fn render(screen: &Screen<'_>) -> String {
    let mut lines: Vec<String> = Vec::new();
    match screen {
        Screen::Detail(app) => render_detail(&mut lines, app),
        Screen::Home {
            options,
            selected,
            search,
            entries,
            featured,
        } => {
            let chips: Vec<String> = options
                .iter()
                .map(|option| {
                    if option == selected {
                        format!("[{}]", option)
                    } else {
                        option.to_string()
                    }
                })
                .collect();
            lines.push(format!("Categories: {}", chips.join(" ")));
            if !search.is_empty() {
                lines.push(format!("Search: {}", search));
            }
            if entries.is_empty() {
                lines.push("No apps found.".to_string());
            }

            let mut strip = 0;
            for entry in entries {
                match entry {
                    HomeEntry::App(app) => lines.push(app_line(app)),
                    HomeEntry::Featured(window) => {
                        let active = featured.get(strip).copied().unwrap_or(0);
                        let names: Vec<String> = window
                            .iter()
                            .enumerate()
                            .map(|(i, app)| {
                                if i == active {
                                    format!("*{}*", app.name)
                                } else {
                                    app.name.clone()
                                }
                            })
                            .collect();
                        lines.push(format!("  -- Featured: {} --", names.join(" | ")));
                        strip += 1;
                    }
                }
            }
        }
        Screen::Categories(groups) => {
            for (category, apps) in groups {
                lines.push(category.to_string());
                lines.extend(apps.iter().map(|app| app_line(app)));
            }
        }
        Screen::Updates(entries) => {
            if entries.is_empty() {
                lines.push("No updates.".to_string());
            }
            for entry in entries {
                lines.push(format!(
                    "{} {} ({})",
                    entry.app.name, entry.update.version, entry.update.update_date
                ));
                if !entry.update.update_notes.is_empty() {
                    lines.push(format!("    {}", entry.update.update_notes));
                }
            }
        }
        Screen::Profile {
            identity,
            downloads,
            complaints,
            suggestion,
            ..
        } => {
            lines.push(format!("Signed in as {}", identity));
            lines.push("My Downloads:".to_string());
            if downloads.is_empty() {
                lines.push("  You haven't downloaded any apps yet.".to_string());
            }
            lines.extend(downloads.iter().map(|app| app_line(app)));
            if !complaints.is_empty() {
                lines.push(format!("Current complaint: {}", complaints));
            }
            if !suggestion.is_empty() {
                lines.push(format!("Current suggestion: {}", suggestion));
            }
        }
        Screen::SignIn { message } => {
            lines.push("Not signed in. Use `storefront login <identifier> <secret>`.".to_string());
            if let Some(message) = message {
                lines.push(message.to_string());
            }
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn render_detail(lines: &mut Vec<String>, app: &App) {
    lines.push(format!("{} ({})", app.name, app.id));
    lines.push(format!("by {}", app.developer));
    lines.push(format!(
        "{}★ | {} downloads | {}",
        app.formatted_rating(),
        app.downloads,
        app.category
    ));
    lines.push(format!("Install: {}", app.download_url));
    if let Some(website) = &app.website_url {
        lines.push(format!("Use online: {}", website));
    }
    if !app.description.is_empty() {
        lines.push(String::new());
        lines.push(app.description.clone());
    }
    if !app.feature_images.is_empty() {
        lines.push(String::new());
        lines.push("Screenshots:".to_string());
        lines.extend(app.feature_images.iter().map(|image| format!("  {}", image)));
    }
    if !app.previous_versions.is_empty() {
        lines.push(String::new());
        lines.push("Previous Versions:".to_string());
        lines.extend(
            app.previous_versions
                .iter()
                .map(|version| format!("  Version {}: {}", version.version, version.download_url)),
        );
    }
}
