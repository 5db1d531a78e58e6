//! Global application store collaborator.
//!
//! The core only reads through selectors and writes through dispatched
//! actions; it never mutates store state directly.

/// Read-only snapshot of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub username: String,
    pub current_org_id: Option<String>,
}

/// Actions the core may dispatch into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreAction {
    /// Reload the user's API keys.
    FetchApiKeys,
    /// Reload the configured auth providers after a wizard save.
    RefreshAuthConfigs,
}

/// Selector + dispatch surface of the global store.
pub trait EditorStore: Send + Sync {
    fn current_user(&self) -> CurrentUser;

    fn current_org_id(&self) -> Option<String> {
        self.current_user().current_org_id
    }

    fn dispatch(&self, action: StoreAction);
}
