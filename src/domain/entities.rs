//! Domain entities: core data structures

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an alias.
///
/// The remote service owns the set of states. Values this client does not
/// recognize are kept verbatim in `Unknown` instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AliasState {
    /// Created but never received mail
    Pending,
    Enabled,
    Disabled,
    /// Terminal: no transition leaves this state
    Deleted,
    Unknown(String),
}

impl AliasState {
    pub fn as_str(&self) -> &str {
        match self {
            AliasState::Pending => "pending",
            AliasState::Enabled => "enabled",
            AliasState::Disabled => "disabled",
            AliasState::Deleted => "deleted",
            AliasState::Unknown(raw) => raw.as_str(),
        }
    }
}

impl From<String> for AliasState {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pending" => AliasState::Pending,
            "enabled" => AliasState::Enabled,
            "disabled" => AliasState::Disabled,
            "deleted" => AliasState::Deleted,
            _ => AliasState::Unknown(raw),
        }
    }
}

impl From<&str> for AliasState {
    fn from(raw: &str) -> Self {
        AliasState::from(raw.to_string())
    }
}

impl From<AliasState> for String {
    fn from(state: AliasState) -> Self {
        state.as_str().to_string()
    }
}

impl fmt::Display for AliasState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A remotely stored alias address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alias {
    /// Unique identifier assigned by the service
    pub id: String,
    /// The alias address itself
    pub email: String,
    /// Group key: the site/domain the alias was created for
    pub domain: String,
    pub state: AliasState,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
}

/// Fields for creating a new alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlias {
    pub domain: String,
    #[serde(default)]
    pub description: String,
    /// Initial state; the service defaults to pending when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<AliasState>,
}

/// Metadata-only changes to an alias. State is never changed through this.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A mail item (message) held by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    /// Mailbox name or id the item currently lives in
    pub mailbox: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub received_at: Option<DateTime<Utc>>,
}

/// A mutation applied to mail items in bulk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemMutation {
    Delete,
    Move { mailbox: String },
    SetRead(bool),
}

impl ItemMutation {
    /// Whether the item already satisfies this mutation.
    ///
    /// Deletion is never considered satisfied: an item that can still be
    /// fetched has not been deleted.
    pub fn is_satisfied_by(&self, item: &Item) -> bool {
        match self {
            ItemMutation::Delete => false,
            ItemMutation::Move { mailbox } => item.mailbox == *mailbox,
            ItemMutation::SetRead(read) => item.read == *read,
        }
    }

    /// Describe the item's current state in the terms of this mutation.
    pub fn current_state(&self, item: &Item) -> String {
        match self {
            ItemMutation::Delete | ItemMutation::Move { .. } => item.mailbox.clone(),
            ItemMutation::SetRead(_) => read_label(item.read).to_string(),
        }
    }

    /// Describe the state the mutation moves an item into.
    pub fn target_state(&self) -> String {
        match self {
            ItemMutation::Delete => "deleted".to_string(),
            ItemMutation::Move { mailbox } => mailbox.clone(),
            ItemMutation::SetRead(read) => read_label(*read).to_string(),
        }
    }
}

fn read_label(read: bool) -> &'static str {
    if read {
        "read"
    } else {
        "unread"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_known_state_strings_when_parsing_then_maps_case_insensitively() {
        assert_eq!(AliasState::from("Enabled"), AliasState::Enabled);
        assert_eq!(AliasState::from(" disabled "), AliasState::Disabled);
        assert_eq!(AliasState::from("DELETED"), AliasState::Deleted);
        assert_eq!(AliasState::from("pending"), AliasState::Pending);
    }

    #[test]
    fn given_unrecognized_state_when_parsing_then_keeps_raw_value() {
        let state = AliasState::from("quarantined");
        assert_eq!(state, AliasState::Unknown("quarantined".to_string()));
        assert_eq!(state.to_string(), "quarantined");
    }

    #[test]
    fn given_alias_json_with_unknown_state_when_deserializing_then_tolerates_it() {
        let json = r#"{
            "id": "a1",
            "email": "x1@alias.test",
            "domain": "example.com",
            "state": "frozen",
            "createdAt": "2024-03-01T10:00:00Z"
        }"#;
        let alias: Alias = serde_json::from_str(json).expect("deserialize alias");
        assert_eq!(alias.state, AliasState::Unknown("frozen".to_string()));
        assert_eq!(alias.description, "");
        assert!(alias.last_message_at.is_none());
    }

    #[test]
    fn given_state_when_serializing_then_writes_lowercase_string() {
        let json = serde_json::to_string(&AliasState::Enabled).unwrap();
        assert_eq!(json, r#""enabled""#);
    }

    #[test]
    fn given_item_in_target_mailbox_when_checking_move_then_satisfied() {
        let item = Item {
            id: "m1".into(),
            mailbox: "Archive".into(),
            subject: String::new(),
            read: true,
            received_at: None,
        };
        let mv = ItemMutation::Move {
            mailbox: "Archive".into(),
        };
        assert!(mv.is_satisfied_by(&item));
        assert!(ItemMutation::SetRead(true).is_satisfied_by(&item));
        assert!(!ItemMutation::SetRead(false).is_satisfied_by(&item));
        assert!(!ItemMutation::Delete.is_satisfied_by(&item));
    }
}
