// The persisted user-data document and its JSON codec. The whole document
// is the unit of persistence: it is decoded in full, mutated in memory and
// encoded in full again.

use crate::error::{AppError, Result};
use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// One account. The password is stored as typed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: u32,
    pub name: String,
    pub username: String,
    pub password: String,
}

/// Shape of `userdata.json`. Missing keys decode as empty/absent.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserDataDocument {
    #[serde(default)]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub last_user: Option<UserRecord>,
    #[serde(default)]
    pub last_modified_date: Option<NaiveDateTime>,
}

impl UserDataDocument {
    /// Append a user with the next id and make it the last user.
    pub fn add_user(&mut self, name: String, username: String, password: String) -> &UserRecord {
        let record = UserRecord {
            id: self.users.len() as u32 + 1,
            name,
            username,
            password,
        };
        self.last_user = Some(record.clone());
        self.users.push(record);
        &self.users[self.users.len() - 1]
    }

    /// Stamp the document as modified at `now`. The stamp never moves
    /// backwards or repeats, even if the wall clock does, unless the
    /// previous stamp is already the latest representable time.
    pub fn touch(&mut self, now: NaiveDateTime) {
        let stamp = match self.last_modified_date {
            Some(prev) if now <= prev => prev
                .checked_add_signed(TimeDelta::milliseconds(1))
                .unwrap_or(now),
            _ => now,
        };
        self.last_modified_date = Some(stamp);
    }
}

/// Pretty-printed JSON, two-space indent.
pub fn encode(doc: &UserDataDocument) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(doc).map_err(AppError::Encode)
}

/// Anything that is not a JSON object of the right shape is an error,
/// including an empty file and a bare `null`.
pub fn decode(bytes: &[u8]) -> Result<UserDataDocument> {
    serde_json::from_slice(bytes).map_err(AppError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(h, m, s))
            .unwrap()
    }

    #[test]
    fn empty_document_round_trips() {
        let doc = UserDataDocument::default();
        let bytes = encode(&doc).unwrap();
        assert_eq!(decode(&bytes).unwrap(), doc);
    }

    #[test]
    fn document_with_last_user_round_trips() {
        let mut doc = UserDataDocument::default();
        doc.add_user("Alice".into(), "alice".into(), "s3cret".into());
        doc.touch(at(9, 30, 0));

        let bytes = encode(&doc).unwrap();
        assert_eq!(decode(&bytes).unwrap(), doc);
    }

    #[test]
    fn document_without_last_user_round_trips() {
        let mut doc = UserDataDocument::default();
        doc.add_user("Alice".into(), "alice".into(), String::new());
        doc.last_user = None;

        let bytes = encode(&doc).unwrap();
        let back = decode(&bytes).unwrap();
        assert_eq!(back, doc);
        assert!(back.last_user.is_none());
    }

    #[test]
    fn encodes_with_original_field_names_and_indentation() {
        let mut doc = UserDataDocument::default();
        doc.add_user("Alice".into(), "alice".into(), "pw".into());
        doc.touch(at(0, 0, 0));

        let text = String::from_utf8(encode(&doc).unwrap()).unwrap();
        assert!(text.contains("\n  \"users\": ["));
        assert!(text.contains("\"lastUser\": {"));
        assert!(text.contains("\"lastModifiedDate\": \"2024-01-01T00:00:00\""));
        assert!(text.contains("\"username\": \"alice\""));
    }

    #[test]
    fn empty_document_encodes_nulls() {
        let text = String::from_utf8(encode(&UserDataDocument::default()).unwrap()).unwrap();
        assert!(text.contains("\"lastUser\": null"));
        assert!(text.contains("\"lastModifiedDate\": null"));
    }

    #[test]
    fn malformed_input_is_a_decode_error() {
        for input in ["", "null", "42", "{ not json", "{\"users\": 3}"] {
            let err = decode(input.as_bytes()).unwrap_err();
            assert!(matches!(err, AppError::Decode(_)), "input {input:?}");
        }
    }

    #[test]
    fn missing_keys_decode_as_empty() {
        let doc = decode(b"{}").unwrap();
        assert_eq!(doc, UserDataDocument::default());
    }

    #[test]
    fn decodes_timestamp_without_fraction() {
        let json = r#"{
            "users": [{"id": 1, "name": "Alice", "username": "alice", "password": "pw"}],
            "lastUser": {"id": 1, "name": "Alice", "username": "alice", "password": "pw"},
            "lastModifiedDate": "2024-01-01T00:00:00"
        }"#;
        let doc = decode(json.as_bytes()).unwrap();
        assert_eq!(doc.last_modified_date, Some(at(0, 0, 0)));
        assert_eq!(doc.last_user.as_ref().map(|u| u.username.as_str()), Some("alice"));
    }

    #[test]
    fn ids_follow_user_count() {
        let mut doc = UserDataDocument::default();
        assert_eq!(doc.add_user("A".into(), "a".into(), "".into()).id, 1);
        assert_eq!(doc.add_user("B".into(), "b".into(), "".into()).id, 2);
        assert_eq!(doc.last_user.as_ref().map(|u| u.id), Some(2));
        assert_eq!(doc.last_user.as_ref(), doc.users.last());
    }

    #[test]
    fn touch_is_strictly_increasing() {
        let mut doc = UserDataDocument::default();
        doc.touch(at(12, 0, 0));
        assert_eq!(doc.last_modified_date, Some(at(12, 0, 0)));

        doc.touch(at(13, 0, 0));
        assert_eq!(doc.last_modified_date, Some(at(13, 0, 0)));

        // clock went backwards
        doc.touch(at(11, 0, 0));
        assert!(doc.last_modified_date.unwrap() > at(13, 0, 0));
    }

    #[test]
    fn touch_at_the_end_of_time_falls_back_to_now() {
        let mut doc = UserDataDocument {
            last_modified_date: Some(NaiveDateTime::MAX),
            ..Default::default()
        };

        doc.touch(at(12, 0, 0));

        assert_eq!(doc.last_modified_date, Some(at(12, 0, 0)));
    }
}
