//! Service wiring: everything is built once and shared by `Arc`

use std::sync::Arc;

use crate::application::errors::{ClientError, StorageError};
use crate::application::images::ImageResolver;
use crate::application::navigation::NavigationGuard;
use crate::application::services::{RestaurantStore, ReviewStore, ServiceDeps, UserService};
use crate::application::session::Session;
use crate::domain::traits::{Navigator, Notifier, Store, Transport};
use crate::infrastructure::adapters::{HistoryNavigator, NoticeQueue};
use crate::infrastructure::config::{Config, StorageBackend};
use crate::infrastructure::database::{SqliteStore, DATABASE_FILE};
use crate::infrastructure::gateway::{
    AuthInterceptor, Gateway, InterceptorChain, LoggingInterceptor, ReqwestTransport,
    ResponseNormalizer,
};
use crate::infrastructure::storage::{CredentialStore, JsonStore, MemoryStore};

pub struct ClientContext {
    pub config: Config,
    pub session: Arc<Session>,
    pub gateway: Arc<Gateway>,
    pub notices: Arc<NoticeQueue>,
    pub navigator: Arc<HistoryNavigator>,
    pub users: UserService,
    pub restaurants: RestaurantStore,
    pub reviews: ReviewStore,
    pub guard: NavigationGuard,
    pub images: ImageResolver,
}

impl ClientContext {
    pub fn build(config: Config, transport: Arc<dyn Transport>, store: Arc<dyn Store>) -> Self {
        let credentials = CredentialStore::new(store, config.storage.credential_key.clone());
        let session = Arc::new(Session::new(credentials.clone()));
        let notices = Arc::new(NoticeQueue::new());
        let navigator = Arc::new(HistoryNavigator::default());

        let notifier: Arc<dyn Notifier> = notices.clone();
        let nav: Arc<dyn Navigator> = navigator.clone();

        let chain = InterceptorChain::new()
            .on_request(AuthInterceptor::new(credentials))
            .on_response(ResponseNormalizer::new(session.clone(), notifier.clone(), nav.clone()))
            .on_both(LoggingInterceptor);
        let gateway = Arc::new(Gateway::new(transport, chain));

        let deps = ServiceDeps {
            gateway: gateway.clone(),
            session: session.clone(),
            notifier,
            navigator: nav.clone(),
            config: config.stores.clone(),
        };

        Self {
            users: UserService::new(deps.clone()),
            restaurants: RestaurantStore::new(deps.clone()),
            reviews: ReviewStore::new(deps),
            guard: NavigationGuard::new(session.clone(), nav),
            images: ImageResolver::from_config(&config.images),
            config,
            session,
            gateway,
            notices,
            navigator,
        }
    }

    /// Open the configured storage backend and connect over HTTP
    pub async fn connect(config: Config) -> Result<Self, ClientError> {
        let store = open_store(&config).await?;
        let transport = ReqwestTransport::new(&config.api.base_url, config.timeout())
            .map_err(|e| ClientError::InvalidInput(format!("HTTP client: {}", e)))?;
        Ok(Self::build(config, Arc::new(transport), store))
    }
}

pub async fn open_store(config: &Config) -> Result<Arc<dyn Store>, StorageError> {
    match config.storage.backend {
        StorageBackend::File => {
            let store = JsonStore::new(&config.storage.path);
            store.init().await?;
            Ok(Arc::new(store))
        }
        StorageBackend::Sqlite => {
            tokio::fs::create_dir_all(&config.storage.path).await?;
            let store = SqliteStore::new(config.storage.path.join(DATABASE_FILE))
                .map_err(|e| StorageError::Database(e.to_string()))?;
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
