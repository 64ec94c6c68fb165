use tracing::warn;

/// Most characters of a token that may ever appear in logs
const MASKED_PREFIX_LEN: usize = 8;

/// Bearer-token gate guarding the tool endpoints
#[derive(Clone)]
pub struct ApiKeyAuth {
    api_key: String,
}

impl ApiKeyAuth {
    pub fn new<S: Into<String>>(api_key: S) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Check an `Authorization` header value of the form `Bearer <token>`.
    ///
    /// The scheme is matched case-insensitively and the token exactly. All
    /// rejection causes return `false` so callers cannot tell them apart.
    pub fn verify(&self, authorization: Option<&str>) -> bool {
        let Some(header) = authorization else {
            warn!("Missing authorization header");
            return false;
        };

        let parts: Vec<&str> = header.split_whitespace().collect();
        if parts.len() != 2 || !parts[0].eq_ignore_ascii_case("bearer") {
            warn!("Invalid authorization format");
            return false;
        }

        let provided = parts[1];
        let is_valid = provided == self.api_key;
        if !is_valid {
            warn!("Invalid API key attempt: {}", mask(provided));
        }
        is_valid
    }

    /// Masked form of the configured key, safe to log at startup
    pub fn masked_key(&self) -> String {
        mask(&self.api_key)
    }
}

impl std::fmt::Debug for ApiKeyAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeyAuth")
            .field("api_key", &self.masked_key())
            .finish()
    }
}

/// At most half of the token is shown, capped at [`MASKED_PREFIX_LEN`]
fn mask(token: &str) -> String {
    let shown = (token.chars().count() / 2).min(MASKED_PREFIX_LEN);
    let prefix: String = token.chars().take(shown).collect();
    format!("{}...", prefix)
}
