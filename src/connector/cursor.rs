//! Opaque continuation tokens for stateless, resumable listing.
//!
//! A [`Bag`] is a stack of per-resource-type page states. It is decoded from
//! the token the host hands in, advanced by one page, and encoded again; no
//! listing state survives between calls.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use super::resource::ResourceType;
use crate::error::SyncError;

/// Listing progress for one resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageState {
    pub resource_type_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,

    /// Page to request next; empty means the first page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token: String,
}

impl PageState {
    pub fn new(resource_type: &ResourceType) -> Self {
        Self {
            resource_type_id: resource_type.id.to_string(),
            resource_id: None,
            token: String::new(),
        }
    }
}

/// Stack of page states carried inside a continuation token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bag {
    #[serde(default)]
    states: Vec<PageState>,
}

impl Bag {
    pub fn push(&mut self, state: PageState) {
        self.states.push(state);
    }

    pub fn pop(&mut self) -> Option<PageState> {
        self.states.pop()
    }

    pub fn current(&self) -> Option<&PageState> {
        self.states.last()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Replace the current state's token, or drop the state when `token` is empty.
    pub fn next(&mut self, token: &str) -> Result<(), SyncError> {
        let mut state = self
            .pop()
            .ok_or_else(|| SyncError::InvalidCursor("no active page state".to_string()))?;

        if !token.is_empty() {
            state.token = token.to_string();
            self.push(state);
        }
        Ok(())
    }

    /// Encode the bag; an empty bag encodes to the empty string.
    pub fn marshal(&self) -> Result<String, SyncError> {
        if self.is_empty() {
            return Ok(String::new());
        }

        let json = serde_json::to_vec(self)
            .map_err(|e| SyncError::InvalidCursor(format!("cannot encode: {e}")))?;
        Ok(URL_SAFE_NO_PAD.encode(json))
    }

    /// Decode a token produced by [`marshal`](Self::marshal).
    pub fn unmarshal(token: &str) -> Result<Self, SyncError> {
        if token.is_empty() {
            return Ok(Self::default());
        }

        let json = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| SyncError::InvalidCursor(format!("not base64: {e}")))?;
        serde_json::from_slice(&json)
            .map_err(|e| SyncError::InvalidCursor(format!("malformed: {e}")))
    }

    /// Rebuild listing progress for `resource_type` from a host token.
    ///
    /// Returns the bag and the page to fetch (0 when starting fresh). A token
    /// whose current state belongs to another resource type is rejected.
    pub fn resume(token: &str, resource_type: &ResourceType) -> Result<(Self, u32), SyncError> {
        let mut bag = Self::unmarshal(token)?;

        // Fresh listing
        let Some(current) = bag.current() else {
            bag.push(PageState::new(resource_type));
            return Ok((bag, 0));
        };

        if current.resource_type_id != resource_type.id {
            return Err(SyncError::InvalidCursor(format!(
                "token belongs to resource type '{}', not '{}'",
                current.resource_type_id, resource_type.id
            )));
        }

        // Empty token means the first page
        let page = if current.token.is_empty() {
            0
        } else {
            current.token.parse::<u32>().map_err(|_| {
                SyncError::InvalidCursor(format!("bad page number '{}'", current.token))
            })?
        };

        Ok((bag, page))
    }

    /// Record the fetcher's continuation and encode the next host token.
    pub fn advance(mut self, next_page: Option<u32>) -> Result<String, SyncError> {
        // No next page drops the state, so a finished listing encodes to ""
        let token = next_page.map(|p| p.to_string()).unwrap_or_default();
        self.next(&token)?;
        self.marshal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::resource::{ROLE_RESOURCE_TYPE, USER_RESOURCE_TYPE};

    #[test]
    fn test_empty_token_starts_fresh() {
        let (bag, page) = Bag::resume("", &USER_RESOURCE_TYPE).unwrap();
        assert_eq!(page, 0);
        assert_eq!(bag.current().unwrap().resource_type_id, "user");
    }

    #[test]
    fn test_round_trip() {
        let mut bag = Bag::default();
        bag.push(PageState::new(&USER_RESOURCE_TYPE));
        bag.next("3").unwrap();

        let token = bag.marshal().unwrap();
        assert!(!token.is_empty());
        assert_eq!(Bag::unmarshal(&token).unwrap(), bag);

        let mut nested = bag.clone();
        nested.push(PageState {
            resource_type_id: "role".into(),
            resource_id: Some("1001".into()),
            token: "12".into(),
        });
        let token = nested.marshal().unwrap();
        assert_eq!(Bag::unmarshal(&token).unwrap(), nested);
    }

    #[test]
    fn test_advance_then_resume() {
        let (bag, page) = Bag::resume("", &ROLE_RESOURCE_TYPE).unwrap();
        assert_eq!(page, 0);

        let token = bag.advance(Some(2)).unwrap();
        let (bag, page) = Bag::resume(&token, &ROLE_RESOURCE_TYPE).unwrap();
        assert_eq!(page, 2);

        assert_eq!(bag.advance(None).unwrap(), "");
    }

    #[test]
    fn test_foreign_resource_type_rejected() {
        let (bag, _) = Bag::resume("", &USER_RESOURCE_TYPE).unwrap();
        let token = bag.advance(Some(2)).unwrap();

        let err = Bag::resume(&token, &ROLE_RESOURCE_TYPE).unwrap_err();
        assert!(matches!(err, SyncError::InvalidCursor(_)));
        assert!(err.to_string().contains("'user'"));
    }

    #[test]
    fn test_malformed_tokens_rejected() {
        for token in ["%%%", "bm90IGpzb24", URL_SAFE_NO_PAD.encode("{\"states\":7}").as_str()] {
            let err = Bag::resume(token, &USER_RESOURCE_TYPE).unwrap_err();
            assert!(matches!(err, SyncError::InvalidCursor(_)), "{token}");
        }

        let mut bag = Bag::default();
        bag.push(PageState {
            resource_type_id: "user".into(),
            resource_id: None,
            token: "two".into(),
        });
        let token = bag.marshal().unwrap();
        assert!(matches!(
            Bag::resume(&token, &USER_RESOURCE_TYPE),
            Err(SyncError::InvalidCursor(_))
        ));
    }

    #[test]
    fn test_next_on_empty_bag() {
        let mut bag = Bag::default();
        assert!(bag.next("2").is_err());
    }
}
