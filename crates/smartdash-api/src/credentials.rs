use secrecy::SecretString;

/// Where the gateway reads the current session from at request time.
///
/// The gateway never caches credentials: it asks the source on every
/// request, so a session written or cleared between two calls is picked
/// up by the next one. `smartdash-core` implements this over its durable
/// session store.
pub trait CredentialSource: Send + Sync {
    /// Bearer token for the `Authorization` header.
    fn token(&self) -> Option<SecretString>;

    /// Value for the `X-User-Id` header.
    fn user_id(&self) -> Option<String>;
}

/// No session at all. Requests go out without auth headers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Anonymous;

impl CredentialSource for Anonymous {
    fn token(&self) -> Option<SecretString> {
        None
    }

    fn user_id(&self) -> Option<String> {
        None
    }
}

/// Fixed credentials, for scripts and tests.
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: Option<SecretString>,
    user_id: Option<String>,
}

impl StaticCredentials {
    pub fn new(token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            token: Some(SecretString::from(token.into())),
            user_id: Some(user_id.into()),
        }
    }
}

impl CredentialSource for StaticCredentials {
    fn token(&self) -> Option<SecretString> {
        self.token.clone()
    }

    fn user_id(&self) -> Option<String> {
        self.user_id.clone()
    }
}
