use domain::errors::RagError;
use infrastructure::oauth::{AccessToken, OAuthFlow};

pub struct AuthService {
    flow: OAuthFlow,
}

impl AuthService {
    pub fn new(flow: OAuthFlow) -> Self {
        Self { flow }
    }

    pub async fn login(&self) -> Result<AccessToken, RagError> {
        self.flow.authorize().await.map_err(|err| match err {
            RagError::Authentication(_) => err,
            other => RagError::Authentication(other.to_string()),
        })
    }

    pub fn switch_account(&self) -> Result<(), RagError> {
        self.flow.forget()?;
        tracing::info!(path = %self.flow.token_path().display(), "saved login removed");
        Ok(())
    }
}
