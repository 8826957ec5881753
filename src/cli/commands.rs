//! CLI command implementations

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

use crate::api::NewContact;
use crate::auth::{ProfileUpdate, RegistrationForm};
use crate::cli::{
    confirm, error, info, print_contact_detail, print_contacts_table, print_organization_detail,
    print_organizations_table, print_roles_table, print_session, print_structured, spinner,
    success, warn, ContactsAction, OrgsAction, OutputFormat, ProfileAction,
};
use crate::config::{self, Config};
use crate::directory::Directory;
use crate::error::Error;
use crate::session::{AuthStatus, SessionManager};

/// Loaded configuration plus a session that has finished its startup check
struct Context {
    config: Config,
    session: SessionManager,
}

impl Context {
    async fn open(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => config::load_config_from_path(path)?,
            None => config::load_config()?,
        };

        let session = SessionManager::from_config(&config)?;
        let status = session.initialize().await;
        tracing::debug!("Startup session check: {}", status);

        Ok(Self { config, session })
    }

    fn require_session(&self) -> Result<()> {
        if self.session.status() != AuthStatus::Authenticated {
            bail!("Not signed in. Run 'contactbook login' first.");
        }
        Ok(())
    }

    fn directory(&self) -> Result<Directory> {
        self.require_session()?;
        Ok(Directory::new(&self.session))
    }
}

/// Show a user-facing message for a failed command and hand the error back
fn report(action: &str, err: Error) -> anyhow::Error {
    match &err {
        Error::Unauthorized => {
            error(&format!("{}: your session is no longer valid", action));
            info("Run 'contactbook login' to sign in again");
        }
        Error::Forbidden(_) => {
            error(&format!("{}: your account is not allowed to do this", action))
        }
        Error::Http(_) => error(&format!("{}: could not reach the server", action)),
        _ => error(&format!("{}: {}", action, err)),
    }
    err.into()
}

fn prompt_text(prompt: &str) -> Result<String> {
    Ok(dialoguer::Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()?)
}

fn prompt_password(prompt: &str) -> Result<String> {
    Ok(dialoguer::Password::new().with_prompt(prompt).interact()?)
}

/// Initialize a new contactbook.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("contactbook.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created contactbook.toml");
    info("Set api.base_url (or CONTACTBOOK_API_URL) and run 'contactbook login'");

    Ok(())
}

/// Sign in
pub async fn login(
    config_path: Option<&Path>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let ctx = Context::open(config_path).await?;

    if let Some(user) = ctx.session.user() {
        info(&format!("Currently signed in as {}", user.email));
    }

    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let password = match password {
        Some(password) => password,
        None => prompt_password("Password")?,
    };

    let progress = spinner("Signing in...");
    let result = ctx.session.login(email.trim(), &password).await;
    progress.finish_and_clear();

    match result {
        Ok(user) => {
            success(&format!("Signed in as {} ({})", user.name, user.email));
            Ok(())
        }
        Err(e) => Err(report("Login failed", e)),
    }
}

/// Create an account
pub async fn register(
    config_path: Option<&Path>,
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let ctx = Context::open(config_path).await?;

    let name = match name {
        Some(name) => name,
        None => prompt_text("Full name")?,
    };
    let email = match email {
        Some(email) => email,
        None => prompt_text("Email")?,
    };
    let (password, confirm_password) = match password {
        Some(password) => (password.clone(), password),
        None => (
            prompt_password("Password")?,
            prompt_password("Confirm password")?,
        ),
    };

    let form = RegistrationForm {
        name,
        email: email.trim().to_string(),
        password,
        confirm_password,
    };

    let progress = spinner("Creating account...");
    let result = ctx
        .session
        .register_form(&form, &ctx.config.registration)
        .await;
    progress.finish_and_clear();

    match result {
        Ok(user) => {
            success(&format!("Registration successful. Signed in as {}", user.email));
            Ok(())
        }
        Err(e) => Err(report("Registration failed", e)),
    }
}

/// Sign out
pub async fn logout(config_path: Option<&Path>) -> Result<()> {
    let ctx = Context::open(config_path).await?;

    if ctx.session.status() != AuthStatus::Authenticated {
        info("Not signed in");
    }

    match ctx.session.logout().await {
        Ok(()) => {
            success("Signed out");
            Ok(())
        }
        Err(e) => {
            warn("Signed out, but the stored session could not be removed");
            Err(report("Logout", e))
        }
    }
}

/// Show the session
pub async fn status(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = Context::open(config_path).await?;
    let session = ctx.session.session();

    let value = serde_json::json!({
        "status": session.status(),
        "user": session.user(),
    });
    if !print_structured(&value, format)? {
        print_session(&session);
    }

    Ok(())
}

pub async fn profile(config_path: Option<&Path>, action: ProfileAction) -> Result<()> {
    let ctx = Context::open(config_path).await?;
    ctx.require_session()?;

    match action {
        ProfileAction::Show { format } => {
            let user = ctx
                .session
                .refresh_profile()
                .await
                .map_err(|e| report("Could not load profile", e))?;
            if !print_structured(&user, format)? {
                print_session(&ctx.session.session());
            }
        }
        ProfileAction::Update { name, email } => {
            let update = ProfileUpdate { name, email };
            let user = ctx
                .session
                .update_profile(&update)
                .await
                .map_err(|e| report("Profile update failed", e))?;
            success(&format!("Profile updated: {} <{}>", user.name, user.email));
        }
        ProfileAction::Password => {
            let current = prompt_password("Current password")?;
            let new = prompt_password("New password")?;
            let again = prompt_password("Confirm new password")?;
            if new != again {
                bail!("Passwords do not match");
            }
            ctx.session
                .change_password(&current, &new)
                .await
                .map_err(|e| report("Password change failed", e))?;
            success("Password changed");
        }
        ProfileAction::Delete { force } => {
            if !force
                && !confirm("Delete your account? This cannot be undone.")
            {
                info("Cancelled");
                return Ok(());
            }
            ctx.session
                .delete_account()
                .await
                .map_err(|e| report("Account deletion failed", e))?;
            success("Account deleted");
        }
    }

    Ok(())
}

pub async fn contacts(config_path: Option<&Path>, action: ContactsAction) -> Result<()> {
    let ctx = Context::open(config_path).await?;
    let directory = ctx.directory()?;

    match action {
        ContactsAction::List { format } => {
            let progress = spinner("Loading contacts...");
            let result = directory.contacts().await;
            progress.finish_and_clear();
            let contacts = result.map_err(|e| report("Could not load contacts", e))?;
            if !print_structured(&contacts, format)? {
                print_contacts_table(&contacts);
            }
        }
        ContactsAction::Show { id, format } => {
            let contact = directory
                .contact(id)
                .await
                .map_err(|e| report("Could not load contact", e))?;
            if !print_structured(&contact, format)? {
                print_contact_detail(&contact);
            }
        }
        ContactsAction::Add {
            name,
            phone,
            email,
            contact_type,
        } => {
            let body = NewContact {
                full_name: name,
                phone,
                email,
                contact_type,
            };
            let contact = directory
                .add_contact(&body)
                .await
                .map_err(|e| report("Could not add contact", e))?;
            success(&format!("Added contact #{}: {}", contact.id, contact.full_name));
        }
        ContactsAction::Remove { id, force } => {
            if !force && !confirm(&format!("Delete contact #{}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            directory
                .remove_contact(id)
                .await
                .map_err(|e| report("Could not delete contact", e))?;
            success(&format!("Deleted contact #{}", id));
        }
    }

    Ok(())
}

pub async fn orgs(config_path: Option<&Path>, action: OrgsAction) -> Result<()> {
    let ctx = Context::open(config_path).await?;
    let directory = ctx.directory()?;

    match action {
        OrgsAction::List { format } => {
            let progress = spinner("Loading organizations...");
            let result = directory.organizations().await;
            progress.finish_and_clear();
            let organizations = result.map_err(|e| report("Could not load organizations", e))?;
            if !print_structured(&organizations, format)? {
                print_organizations_table(&organizations);
            }
        }
        OrgsAction::Show { id, format } => {
            let organization = directory
                .organization(id)
                .await
                .map_err(|e| report("Could not load organization", e))?;
            if !print_structured(&organization, format)? {
                print_organization_detail(&organization);
            }
        }
        OrgsAction::Add { name } => {
            let organization = directory
                .add_organization(&name)
                .await
                .map_err(|e| report("Could not create organization", e))?;
            success(&format!(
                "Created organization #{}: {}",
                organization.id, organization.organization_name
            ));
        }
        OrgsAction::Remove { id, force } => {
            if !force && !confirm(&format!("Delete organization #{}?", id)) {
                info("Cancelled");
                return Ok(());
            }
            directory
                .remove_organization(id)
                .await
                .map_err(|e| report("Could not delete organization", e))?;
            success(&format!("Deleted organization #{}", id));
        }
    }

    Ok(())
}

pub async fn roles(config_path: Option<&Path>, format: OutputFormat) -> Result<()> {
    let ctx = Context::open(config_path).await?;
    let directory = ctx.directory()?;

    let roles = directory
        .roles()
        .await
        .map_err(|e| report("Could not load roles", e))?;
    if !print_structured(&roles, format)? {
        print_roles_table(&roles);
    }

    Ok(())
}
