/// Microphone authorization state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationStatus {
    /// Access granted; capture may proceed.
    Authorized,
    /// The user has never been asked.
    NotDetermined,
    /// The user refused access.
    Denied,
    /// Access blocked by policy (parental controls, MDM).
    Restricted,
}

/// Resolves, and if needed requests, microphone access.
///
/// `authorize` is terminal per call: a denial is final until the caller asks
/// again, and nothing is retried internally. The only side effect is the
/// one-time OS prompt a `request_access` may raise.
pub trait PermissionGate: Send + Sync {
    /// Current authorization state, without prompting.
    fn status(&self) -> AuthorizationStatus;

    /// Ask the user for access. Blocks the calling thread until the decision
    /// lands. Invoked at most once per `authorize`, and only from the
    /// not-determined state.
    fn request_access(&self) -> bool;

    /// Resolve access for one capture attempt.
    fn authorize(&self) -> bool {
        match self.status() {
            AuthorizationStatus::Authorized => true,
            AuthorizationStatus::NotDetermined => self.request_access(),
            AuthorizationStatus::Denied | AuthorizationStatus::Restricted => false,
        }
    }
}
