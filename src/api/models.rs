//! Directory data returned by the remote API

use serde::{Deserialize, Serialize};

/// A person in the directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: i64,
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub contact_type: String,
    #[serde(default)]
    pub contact_organizations: Vec<ContactOrganization>,
    #[serde(default, rename = "contactSubject")]
    pub contact_subjects: Vec<ContactSubject>,
}

impl Contact {
    /// Positions held across all organizations
    pub fn positions(&self) -> impl Iterator<Item = &str> {
        self.contact_organizations.iter().map(|o| o.position.as_str())
    }

    /// Names of every subject linked to the contact
    pub fn subject_names(&self) -> impl Iterator<Item = &str> {
        self.contact_subjects
            .iter()
            .flat_map(|cs| cs.subjects.iter())
            .map(|s| s.subject_name.as_str())
    }
}

/// Membership of a contact in an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactOrganization {
    pub id: i64,
    /// Class or unit
    #[serde(rename = "kelas", default)]
    pub class_name: String,
    /// Position held
    #[serde(rename = "jabatan", default)]
    pub position: String,
    /// Term of the position, e.g. `2024/2025`
    #[serde(rename = "periodeJabatan", default)]
    pub term: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubject {
    pub id: i64,
    #[serde(rename = "subject", default)]
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: i64,
    pub subject_name: String,
}

/// A group of contacts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: i64,
    pub organization_name: String,
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// Body for creating or replacing a contact
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub contact_type: String,
}

/// Body for creating an organization
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganization {
    pub organization_name: String,
}
