//! The `User` record, its request payloads, and validation.
//!
//! JSON field names follow the service's published wire format (`ID`, `Name`,
//! `CreatedAt`, ...). Request payloads also accept the lowercase spellings.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::entity::Entity;
use crate::error::{DomainError, DomainResult};
use crate::id::UserId;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

/// Returns `true` if `email` is a syntactically acceptable address.
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

fn check_fields(name: &str, age: i64, email: &str) -> DomainResult<()> {
    if !validate_email(email) {
        return Err(DomainError::validation(format!("invalid email: {email:?}")));
    }
    if name.is_empty() {
        return Err(DomainError::validation("name must not be empty"));
    }
    if age < 1 {
        return Err(DomainError::validation(format!("age must be positive, got {age}")));
    }
    Ok(())
}

/// A persisted user row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: UserId,
    #[serde(rename = "CreatedAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "UpdatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Soft-delete marker; rows with a value here are invisible to reads.
    #[serde(rename = "DeletedAt")]
    pub deleted_at: Option<DateTime<Utc>>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Age")]
    pub age: i64,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Address")]
    pub address: String,
}

impl User {
    /// Materialize a freshly inserted row.
    pub fn from_new(id: UserId, new: NewUser, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            name: new.name,
            age: new.age,
            email: new.email,
            address: new.address,
        }
    }

    /// Merge the set fields of `patch` onto this record.
    ///
    /// Empty strings and a zero age count as "not set", so a client cannot
    /// blank out a column through an update.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(name) = patch.name.as_deref().filter(|s| !s.is_empty()) {
            self.name = name.to_string();
        }
        if let Some(age) = patch.age.filter(|a| *a != 0) {
            self.age = age;
        }
        if let Some(email) = patch.email.as_deref().filter(|s| !s.is_empty()) {
            self.email = email.to_string();
        }
        if let Some(address) = patch.address.as_deref().filter(|s| !s.is_empty()) {
            self.address = address.to_string();
        }
    }

    pub fn validate(&self) -> DomainResult<()> {
        check_fields(&self.name, self.age, &self.email)
    }
}

impl Entity for User {
    type Id = UserId;

    fn id(&self) -> UserId {
        self.id
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Create payload. Only these four columns are ever taken from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewUser {
    #[serde(rename = "Name", alias = "name")]
    pub name: String,
    #[serde(rename = "Age", alias = "age")]
    pub age: i64,
    #[serde(rename = "Email", alias = "email")]
    pub email: String,
    #[serde(rename = "Address", alias = "address")]
    pub address: String,
}

impl NewUser {
    /// Non-empty name, positive age, well-formed email.
    pub fn validate(&self) -> DomainResult<()> {
        check_fields(&self.name, self.age, &self.email)
    }
}

/// Partial update payload; `None` leaves the stored column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserPatch {
    #[serde(rename = "Name", alias = "name")]
    pub name: Option<String>,
    #[serde(rename = "Age", alias = "age")]
    pub age: Option<i64>,
    #[serde(rename = "Email", alias = "email")]
    pub email: Option<String>,
    #[serde(rename = "Address", alias = "address")]
    pub address: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.as_deref().is_none_or(str::is_empty)
            && self.age.is_none_or(|a| a == 0)
            && self.email.as_deref().is_none_or(str::is_empty)
            && self.address.as_deref().is_none_or(str::is_empty)
    }
}

/// Equality filter used by listing. Unset or zero-valued fields match anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UserFilter {
    #[serde(rename = "ID", alias = "id", deserialize_with = "empty_as_none")]
    pub id: Option<i64>,
    #[serde(rename = "Name", alias = "name")]
    pub name: Option<String>,
    #[serde(rename = "Age", alias = "age", deserialize_with = "empty_as_none")]
    pub age: Option<i64>,
    #[serde(rename = "Email", alias = "email")]
    pub email: Option<String>,
    #[serde(rename = "Address", alias = "address")]
    pub address: Option<String>,
}

/// Numeric filter value: a blank query value (`?Age=`) means "no filter".
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Number(v)) => Ok(Some(v)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
    }
}

impl UserFilter {
    pub fn id(&self) -> Option<i64> {
        self.id.filter(|v| *v != 0)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn age(&self) -> Option<i64> {
        self.age.filter(|v| *v != 0)
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|s| !s.is_empty())
    }

    pub fn address(&self) -> Option<&str> {
        self.address.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches(&self, user: &User) -> bool {
        self.id().is_none_or(|v| user.id.get() == v)
            && self.name().is_none_or(|v| user.name == v)
            && self.age().is_none_or(|v| user.age == v)
            && self.email().is_none_or(|v| user.email == v)
            && self.address().is_none_or(|v| user.address == v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn alice() -> NewUser {
        NewUser {
            name: "Alice".to_string(),
            age: 30,
            email: "alice@example.com".to_string(),
            address: "1 Main St".to_string(),
        }
    }

    fn stored(id: i64) -> User {
        User::from_new(UserId::new(id), alice(), Utc::now())
    }

    #[test]
    fn accepts_common_addresses() {
        for email in [
            "alice@example.com",
            "a.b+tag@sub.example.org",
            "o'neil@x.io",
            "user@localhost",
        ] {
            assert!(validate_email(email), "{email} should be valid");
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for email in ["", "alice", "@example.com", "alice@", "alice@-example.com", "a b@x.io"] {
            assert!(!validate_email(email), "{email} should be invalid");
        }
    }

    #[test]
    fn new_user_validation_rules() {
        assert!(alice().validate().is_ok());

        let no_name = NewUser { name: String::new(), ..alice() };
        assert!(matches!(no_name.validate(), Err(DomainError::Validation(_))));

        let zero_age = NewUser { age: 0, ..alice() };
        assert!(matches!(zero_age.validate(), Err(DomainError::Validation(_))));

        let bad_email = NewUser { email: "nope".to_string(), ..alice() };
        assert!(matches!(bad_email.validate(), Err(DomainError::Validation(_))));

        let no_address = NewUser { address: String::new(), ..alice() };
        assert!(no_address.validate().is_ok());
    }

    #[test]
    fn apply_skips_unset_and_zero_fields() {
        let mut user = stored(1);
        user.apply(&UserPatch {
            name: Some(String::new()),
            age: Some(0),
            email: None,
            address: Some("2 Side St".to_string()),
        });
        assert_eq!(user.name, "Alice");
        assert_eq!(user.age, 30);
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.address, "2 Side St");
    }

    #[test]
    fn apply_then_validate_catches_bad_merge() {
        let mut user = stored(1);
        user.apply(&UserPatch { age: Some(-4), ..Default::default() });
        assert!(user.validate().is_err());
    }

    #[test]
    fn patch_emptiness() {
        assert!(UserPatch::default().is_empty());
        let blank = UserPatch { name: Some(String::new()), age: Some(0), ..Default::default() };
        assert!(blank.is_empty());
        assert!(!UserPatch { age: Some(3), ..Default::default() }.is_empty());
    }

    #[test]
    fn filter_ignores_zero_values() {
        let user = stored(5);
        let filter = UserFilter {
            id: Some(0),
            name: Some(String::new()),
            age: Some(0),
            ..Default::default()
        };
        assert!(filter.matches(&user));

        let by_name = UserFilter { name: Some("Bob".to_string()), ..Default::default() };
        assert!(!by_name.matches(&user));

        let by_id = UserFilter { id: Some(5), age: Some(30), ..Default::default() };
        assert!(by_id.matches(&user));
    }

    #[test]
    fn filter_treats_blank_numbers_as_unset() {
        let filter: UserFilter = serde_json::from_str(r#"{"ID": "", "Age": " "}"#).unwrap();
        assert_eq!(filter, UserFilter::default());

        let filter: UserFilter = serde_json::from_str(r#"{"id": "5", "age": 30}"#).unwrap();
        assert_eq!(filter.id(), Some(5));
        assert_eq!(filter.age(), Some(30));

        assert!(serde_json::from_str::<UserFilter>(r#"{"Age": "old"}"#).is_err());
    }

    #[test]
    fn user_serializes_with_wire_names() {
        let value = serde_json::to_value(stored(9)).unwrap();
        assert_eq!(value["ID"], 9);
        assert_eq!(value["Name"], "Alice");
        assert_eq!(value["Age"], 30);
        assert!(value["DeletedAt"].is_null());
        assert!(value.get("CreatedAt").is_some());
    }

    #[test]
    fn payloads_accept_lowercase_keys() {
        let new: NewUser =
            serde_json::from_str(r#"{"name":"Bob","age":41,"email":"bob@example.com"}"#).unwrap();
        assert_eq!(new.name, "Bob");
        assert_eq!(new.age, 41);
        assert_eq!(new.address, "");

        let patch: UserPatch = serde_json::from_str(r#"{"Email":"b@example.com"}"#).unwrap();
        assert_eq!(patch.email.as_deref(), Some("b@example.com"));
        assert!(patch.name.is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Any non-positive age is rejected regardless of the other fields.
        #[test]
        fn non_positive_age_never_validates(age in i64::MIN..1i64) {
            let user = NewUser { age, ..alice() };
            prop_assert!(user.validate().is_err());
        }

        /// Well-formed local@domain.tld addresses always pass.
        #[test]
        fn simple_addresses_validate(
            local in "[a-z0-9]{1,20}",
            domain in "[a-z][a-z0-9]{0,20}",
            tld in "[a-z]{2,6}",
        ) {
            let email = format!("{local}@{domain}.{tld}");
            prop_assert!(validate_email(&email));
        }
    }
}
