//! Contact, organization and role lookups for a signed-in user.
//!
//! Every call is made with the session's installed credential. When the
//! server rejects that credential, the rejection is handed to the
//! [`SessionManager`], which decides whether the session ends.

use crate::api::{ApiClient, Contact, NewContact, NewOrganization, Organization, Role};
use crate::error::{Error, Result};
use crate::session::SessionManager;

#[derive(Clone)]
pub struct Directory {
    api: ApiClient,
    session: SessionManager,
}

impl Directory {
    pub fn new(session: &SessionManager) -> Self {
        Self {
            api: session.api().clone(),
            session: session.clone(),
        }
    }

    /// Token the next call will be sent with; fails fast when signed out
    fn sending_token(&self) -> Result<String> {
        if !self.session.status().is_authenticated() {
            return Err(Error::NotAuthenticated);
        }
        self.session.token().ok_or(Error::NotAuthenticated)
    }

    async fn settle<T>(&self, token: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.session.handle_rejection(Some(token), e).await;
        }
        result
    }

    pub async fn contacts(&self) -> Result<Vec<Contact>> {
        let token = self.sending_token()?;
        let result = self.api.list_contacts().await;
        self.settle(&token, result).await
    }

    pub async fn contact(&self, id: i64) -> Result<Contact> {
        let token = self.sending_token()?;
        let result = self.api.get_contact(id).await;
        self.settle(&token, result).await
    }

    pub async fn add_contact(&self, contact: &NewContact) -> Result<Contact> {
        if contact.full_name.trim().is_empty() {
            return Err(Error::Validation("Full name is required".to_string()));
        }
        let token = self.sending_token()?;
        let result = self.api.create_contact(contact).await;
        self.settle(&token, result).await
    }

    pub async fn update_contact(&self, id: i64, contact: &NewContact) -> Result<Contact> {
        let token = self.sending_token()?;
        let result = self.api.update_contact(id, contact).await;
        self.settle(&token, result).await
    }

    pub async fn remove_contact(&self, id: i64) -> Result<()> {
        let token = self.sending_token()?;
        let result = self.api.delete_contact(id).await;
        self.settle(&token, result).await
    }

    pub async fn organizations(&self) -> Result<Vec<Organization>> {
        let token = self.sending_token()?;
        let result = self.api.list_organizations().await;
        self.settle(&token, result).await
    }

    pub async fn organization(&self, id: i64) -> Result<Organization> {
        let token = self.sending_token()?;
        let result = self.api.get_organization(id).await;
        self.settle(&token, result).await
    }

    pub async fn add_organization(&self, name: &str) -> Result<Organization> {
        if name.trim().is_empty() {
            return Err(Error::Validation("Organization name is required".to_string()));
        }
        let token = self.sending_token()?;
        let body = NewOrganization {
            organization_name: name.trim().to_string(),
        };
        let result = self.api.create_organization(&body).await;
        self.settle(&token, result).await
    }

    pub async fn remove_organization(&self, id: i64) -> Result<()> {
        let token = self.sending_token()?;
        let result = self.api.delete_organization(id).await;
        self.settle(&token, result).await
    }

    pub async fn roles(&self) -> Result<Vec<Role>> {
        let token = self.sending_token()?;
        let result = self.api.list_roles().await;
        self.settle(&token, result).await
    }
}
