//! CLI output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

use super::OutputFormat;
use crate::api::{Contact, Organization, Role};
use crate::session::Session;

/// Print a success message
pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red(), message);
}

/// Print a warning message
pub fn warn(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

/// Print an info message
pub fn info(message: &str) {
    println!("{} {}", "ℹ".blue(), message);
}

/// Spinner shown while a request is in flight
pub fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_string());
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

/// Print a value as JSON or YAML. Returns `false` for the table format so
/// the caller can render its own table.
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<bool> {
    match format {
        OutputFormat::Table => Ok(false),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yaml::to_string(value)?);
            Ok(true)
        }
    }
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles.iter().map(|t| Cell::new(t).fg(Color::Cyan)).collect()
}

fn new_table(titles: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(titles));
    table
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Print the current session
pub fn print_session(session: &Session) {
    println!("{}", "Session".bold().underline());
    println!();
    let status = session.status().to_string();
    let status = if session.is_authenticated() {
        status.green()
    } else {
        status.red()
    };
    println!("  {} {}", "Status:".bold(), status);

    if let Some(user) = session.user() {
        println!("  {} {} ({})", "User:".bold(), user.name, user.initials());
        println!("  {} {}", "Email:".bold(), user.email);
        println!("  {} {}", "Role:".bold(), or_dash(&user.role));
    }
}

/// Print a table of contacts
pub fn print_contacts_table(contacts: &[Contact]) {
    if contacts.is_empty() {
        info("No contacts found");
        return;
    }

    let mut table = new_table(&["ID", "Name", "Type", "Phone", "Email", "Positions"]);
    for contact in contacts {
        let positions = contact.positions().collect::<Vec<_>>().join(", ");
        table.add_row(vec![
            Cell::new(contact.id),
            Cell::new(&contact.full_name),
            Cell::new(or_dash(&contact.contact_type)).fg(Color::Yellow),
            Cell::new(or_dash(&contact.phone)),
            Cell::new(or_dash(&contact.email)),
            Cell::new(or_dash(&positions)),
        ]);
    }

    println!("{table}");
}

/// Print one contact in detail
pub fn print_contact_detail(contact: &Contact) {
    println!("{}", "Contact Details".bold().underline());
    println!();
    println!("  {} {}", "Name:".bold(), contact.full_name);
    println!("  {} {}", "Type:".bold(), or_dash(&contact.contact_type));
    println!("  {} {}", "Phone:".bold(), or_dash(&contact.phone));
    println!("  {} {}", "Email:".bold(), or_dash(&contact.email).cyan());

    if !contact.contact_organizations.is_empty() {
        println!();
        println!("  {}", "Organizations:".bold());
        for org in &contact.contact_organizations {
            println!("    - {} {} ({})", org.position, org.class_name, org.term);
        }
    }

    let subjects = contact.subject_names().collect::<Vec<_>>();
    if !subjects.is_empty() {
        println!();
        println!("  {}", "Subjects:".bold());
        for subject in subjects {
            println!("    - {}", subject);
        }
    }
}

/// Print a table of organizations
pub fn print_organizations_table(organizations: &[Organization]) {
    if organizations.is_empty() {
        info("No organizations found");
        return;
    }

    let mut table = new_table(&["ID", "Name", "Members"]);
    for org in organizations {
        table.add_row(vec![
            Cell::new(org.id),
            Cell::new(&org.organization_name),
            Cell::new(format!("{} members", org.contacts.len())),
        ]);
    }

    println!("{table}");
}

/// Print an organization and its members
pub fn print_organization_detail(organization: &Organization) {
    println!("{}", organization.organization_name.bold().underline());
    println!();
    if organization.contacts.is_empty() {
        info("No members");
        return;
    }

    let mut table = new_table(&["ID", "Name", "Role", "Phone"]);
    for contact in &organization.contacts {
        table.add_row(vec![
            Cell::new(contact.id),
            Cell::new(&contact.full_name),
            Cell::new(or_dash(&contact.contact_type)),
            Cell::new(or_dash(&contact.phone)),
        ]);
    }
    println!("{table}");
}

/// Print a table of roles
pub fn print_roles_table(roles: &[Role]) {
    if roles.is_empty() {
        info("No roles found");
        return;
    }

    let mut table = new_table(&["ID", "Name"]);
    for role in roles {
        table.add_row(vec![Cell::new(role.id), Cell::new(&role.name)]);
    }
    println!("{table}");
}

/// Confirm an action with the user
pub fn confirm(message: &str) -> bool {
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .unwrap_or(false)
}
