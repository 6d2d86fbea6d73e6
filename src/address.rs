//! Recipient containers shared by To, Cc, Bcc and Reply-To.
//!
//! Input is accumulated best-effort: addresses that fail syntax validation or
//! are already present are dropped without an error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single address with an optional display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressEntry {
    pub address: String,
    pub name: Option<String>,
}

impl AddressEntry {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            name: None,
        }
    }

    /// An entry with a display name. A blank name is stored as no name.
    pub fn named(address: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            address: address.into(),
            name: if name.is_empty() { None } else { Some(name) },
        }
    }

    /// `name <address>` when a name is present, bare `address` otherwise.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{name} <{}>", self.address),
            None => self.address.clone(),
        }
    }
}

impl fmt::Display for AddressEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for AddressEntry {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

impl From<String> for AddressEntry {
    fn from(address: String) -> Self {
        Self::new(address)
    }
}

/// `(address, name)`
impl From<(&str, &str)> for AddressEntry {
    fn from((address, name): (&str, &str)) -> Self {
        Self::named(address, name)
    }
}

impl From<(String, String)> for AddressEntry {
    fn from((address, name): (String, String)) -> Self {
        Self::named(address, name)
    }
}

/// Anything that can be turned into a list of address entries: a single
/// address, an `(address, name)` pair, or a collection of either.
pub trait IntoAddressEntries {
    fn into_entries(self) -> Vec<AddressEntry>;
}

impl IntoAddressEntries for AddressEntry {
    fn into_entries(self) -> Vec<AddressEntry> {
        vec![self]
    }
}

impl IntoAddressEntries for &str {
    fn into_entries(self) -> Vec<AddressEntry> {
        vec![self.into()]
    }
}

impl IntoAddressEntries for String {
    fn into_entries(self) -> Vec<AddressEntry> {
        vec![self.into()]
    }
}

impl IntoAddressEntries for (&str, &str) {
    fn into_entries(self) -> Vec<AddressEntry> {
        vec![self.into()]
    }
}

impl<T: Into<AddressEntry>> IntoAddressEntries for Vec<T> {
    fn into_entries(self) -> Vec<AddressEntry> {
        self.into_iter().map(Into::into).collect()
    }
}

impl<T: Into<AddressEntry>, const N: usize> IntoAddressEntries for [T; N] {
    fn into_entries(self) -> Vec<AddressEntry> {
        self.into_iter().map(Into::into).collect()
    }
}

/// Syntactic email check used by every recipient container and the sender.
pub fn is_valid_address(address: &str) -> bool {
    validator::validate_email(address)
}

/// An insertion-ordered, de-duplicated set of addresses for one recipient role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AddressBook {
    entries: Vec<AddressEntry>,
}

impl AddressBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one or more entries, returning how many were actually stored.
    pub fn add(&mut self, input: impl IntoAddressEntries) -> usize {
        input
            .into_entries()
            .into_iter()
            .map(|entry| self.insert(entry))
            .filter(|stored| *stored)
            .count()
    }

    /// Store `entry` if its address is valid and not already present.
    pub fn insert(&mut self, entry: AddressEntry) -> bool {
        if !is_valid_address(&entry.address) {
            tracing::trace!(target: "mandrill", "Dropping invalid address {}", entry.address);
            return false;
        }
        if self.contains(&entry.address) {
            tracing::trace!(
                target: "mandrill",
                "Dropping duplicate address {}",
                entry.address
            );
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Case-sensitive lookup by address.
    pub fn contains(&self, address: &str) -> bool {
        self.entries.iter().any(|entry| entry.address == address)
    }

    pub fn get(&self, address: &str) -> Option<&AddressEntry> {
        self.entries.iter().find(|entry| entry.address == address)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AddressEntry> {
        self.entries.iter()
    }

    pub fn addresses(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.address.as_str())
    }

    /// Entries joined with `;`, named ones rendered as `name <address>`.
    ///
    /// This is the value of the `Reply-To` header in the wire payload.
    pub fn header_value(&self) -> String {
        self.entries
            .iter()
            .map(AddressEntry::display)
            .collect::<Vec<_>>()
            .join(";")
    }
}

impl<'a> IntoIterator for &'a AddressBook {
    type Item = &'a AddressEntry;
    type IntoIter = std::slice::Iter<'a, AddressEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
