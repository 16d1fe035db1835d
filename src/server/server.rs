use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_http::*;
use crate::infra_memory::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Everything the sign-in redirect needs to know about the provider.
#[derive(Debug, Clone)]
pub struct SignInOptions {
    pub authorize_url: String,
    pub client_id: String,
    pub redirect_url: String,
    pub scope: String,
    pub cookie_name: String,
    pub secure_cookie: bool,
}

pub struct Server {
    pub authenticator: Arc<dyn SessionAuthenticator>,
    pub accessor: SessionAccessor,
    pub activity_source: Arc<dyn ActivitySource>,
    pub chat_model: Arc<dyn ChatModel>,
    pub state_signer: Arc<StateSigner>,
    pub clock: Arc<dyn Clock>,
    pub sign_in: Arc<SignInOptions>,
    pub cancel: CancellationToken,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let cancel = CancellationToken::new();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let timeout = Duration::from_secs(settings.oauth.timeout_secs);

        let authenticator: Arc<dyn SessionAuthenticator> = match settings.auth.backend.as_str() {
            "fake" => Arc::new(FakeSessionAuthenticator::new()),
            "real" => {
                if settings.oauth.client_id.is_empty() || settings.oauth.client_secret.is_empty() {
                    return Err(anyhow::anyhow!("OAuth client id and secret must be configured"));
                }
                let token_client = Arc::new(ReqwestTokenClient::try_new(TokenClientConfig {
                    token_url: settings.oauth.token_url.clone(),
                    client_id: settings.oauth.client_id.clone(),
                    client_secret: settings.oauth.client_secret.clone(),
                    timeout,
                })?);
                let store = token_store(settings).await?;
                Arc::new(RealSessionAuthenticator::new(
                    store,
                    token_client.clone(),
                    token_client,
                    clock.clone(),
                    cancel.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown auth backend: {}", other)),
        };

        if settings.session.state_key.is_empty() {
            return Err(anyhow::anyhow!("session state key must be configured"));
        }
        let state_signer = Arc::new(StateSigner::new(settings.session.state_key.as_bytes()));

        let activity_source: Arc<dyn ActivitySource> = Arc::new(ReqwestActivitySource::try_new(
            settings.upstream.activities_url.clone(),
            timeout,
        )?);

        let chat_model = chat_model(settings)?;

        let sign_in = Arc::new(SignInOptions {
            authorize_url: settings.oauth.authorize_url.clone(),
            client_id: settings.oauth.client_id.clone(),
            redirect_url: settings.oauth.redirect_url.clone(),
            scope: settings.oauth.scope.clone(),
            cookie_name: settings.session.cookie_name.clone(),
            secure_cookie: settings.session.secure_cookie,
        });

        info!(
            auth = %settings.auth.backend,
            store = %settings.store.backend,
            chat = %settings.chat.backend,
            "server started"
        );

        Ok(Self {
            accessor: SessionAccessor::new(authenticator.clone()),
            authenticator,
            activity_source,
            chat_model,
            state_signer,
            clock,
            sign_in,
            cancel,
        })
    }

    /// Wraps the process shutdown signal for the HTTP listener. When `signal` fires,
    /// in-flight token refreshes are abandoned first, so the listener's drain does not
    /// wait on them. Their records are left as they were.
    pub fn shutdown_signal<S>(&self, signal: S) -> impl Future<Output = ()> + Send + use<S>
    where
        S: Future<Output = ()> + Send + 'static,
    {
        let cancel = self.cancel.clone();
        async move {
            signal.await;
            info!("shutdown requested, abandoning in-flight token refreshes");
            cancel.cancel();
        }
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");
        self.cancel.cancel();
    }
}

fn chat_model(settings: &Settings) -> anyhow::Result<Arc<dyn ChatModel>> {
    match settings.chat.backend.as_str() {
        "canned" => Ok(Arc::new(CannedChatModel::new())),
        "openai" => {
            if settings.chat.api_key.is_empty() {
                return Err(anyhow::anyhow!("chat.api_key must be configured for openai"));
            }
            Ok(Arc::new(OpenAiChatModel::try_new(ChatModelConfig {
                url: settings.chat.url.clone(),
                api_key: settings.chat.api_key.clone(),
                model: settings.chat.model.clone(),
                timeout: Duration::from_secs(settings.chat.timeout_secs),
            })?))
        }
        other => Err(anyhow::anyhow!("Unknown chat backend: {}", other)),
    }
}

async fn token_store(settings: &Settings) -> anyhow::Result<Arc<dyn TokenStore>> {
    match settings.store.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryTokenStore::new())),
        "redis" => {
            let url = settings
                .store
                .redis_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("store.redis_url is required for redis"))?;
            let redis_client = redis::Client::open(url)?;
            let redis_manager = redis_client.get_connection_manager().await?;
            Ok(Arc::new(RedisTokenStore::new(
                redis_manager,
                settings.store.prefix.clone(),
                settings.store.ttl_secs,
            )))
        }
        other => Err(anyhow::anyhow!("Unknown store backend: {}", other)),
    }
}
