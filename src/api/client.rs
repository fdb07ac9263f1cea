use super::context::{ContextResolver, EnvContext, StaticContext};
use super::error::{WebApiError, WebApiResult};
use super::executor::{Executor, FailureHook};
use super::logging::{ApiLogger, LoggingConfig};
use super::models::{EntityReference, ServiceEndpoint};
use super::operations::{Callbacks, Dispatched, Operation, Outcome};
use super::request::{ExecutionMode, RequestDescriptor};
use super::transport::{ReqwestTransport, Transport};
use crate::config::{ClientSettings, Config};
use arc_swap::ArcSwap;
use log::{debug, info};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Dynamics CRM Web API client.
///
/// Cheap to clone; clones share the transport and the settings.
#[derive(Clone)]
pub struct WebApiClient {
    resolver: Arc<dyn ContextResolver>,
    executor: Executor,
    settings: Arc<ArcSwap<ClientSettings>>,
}

impl WebApiClient {
    pub fn new<R, T>(resolver: R, transport: T) -> Self
    where
        R: ContextResolver + 'static,
        T: Transport + 'static,
    {
        Self {
            resolver: Arc::new(resolver),
            executor: Executor::new(Arc::new(transport)),
            settings: Arc::new(ArcSwap::from_pointee(ClientSettings::default())),
        }
    }

    pub fn builder() -> WebApiClientBuilder {
        WebApiClientBuilder::default()
    }

    /// Build a reqwest-backed client from loaded configuration.
    ///
    /// Without a configured host the URL is read from `DYNAMICS_HOST` on
    /// every call.
    pub fn from_config(config: &Config) -> WebApiResult<Self> {
        let transport = ReqwestTransport::with_timeout(
            config.connection.access_token.clone(),
            Duration::from_secs(config.connection.timeout_secs),
        )?;

        let builder = Self::builder()
            .transport(transport)
            .settings(config.settings.clone())
            .logging(config.logging.clone());

        let builder = match &config.connection.host {
            Some(host) => builder.resolver(StaticContext::new(host.clone())),
            None => builder.resolver(EnvContext::new()),
        };
        builder.build()
    }

    /// Replace the settings used by every call dispatched from now on
    pub fn initialize(&self, settings: ClientSettings) -> WebApiResult<()> {
        settings.validate()?;
        info!(
            "Web API client initialized: api_version={}, max_page_size={}",
            settings.api_version, settings.max_page_size
        );
        self.settings.store(Arc::new(settings));
        Ok(())
    }

    /// Snapshot of the current settings
    pub fn settings(&self) -> Arc<ClientSettings> {
        self.settings.load_full()
    }

    /// Resolve the service endpoint from the host context (never cached)
    pub fn service_endpoint(&self) -> WebApiResult<ServiceEndpoint> {
        let settings = self.settings.load();
        let client_url = self.resolver.client_url()?;
        Ok(ServiceEndpoint::from_client_url(&client_url, &settings.api_version))
    }

    /// Resolve the context and describe the exchange for `operation`
    pub fn prepare(&self, operation: &Operation, mode: ExecutionMode) -> WebApiResult<RequestDescriptor> {
        let settings = self.settings.load_full();
        let client_url = self.resolver.client_url()?;
        let endpoint = ServiceEndpoint::from_client_url(&client_url, &settings.api_version);
        Ok(operation.descriptor(&endpoint, &settings).mode(mode))
    }

    /// Run `operation` inline and return its outcome
    pub async fn execute(&self, operation: &Operation) -> WebApiResult<Outcome> {
        let descriptor = self.prepare(operation, ExecutionMode::Blocking)?;
        self.run_prepared(operation, &descriptor).await
    }

    /// Run `operation` and report through `callbacks`.
    ///
    /// Context resolution happens before anything is sent; its failure is
    /// returned here and no callback runs. After that, every result goes to
    /// exactly one callback. In [`ExecutionMode::Async`] the exchange is
    /// spawned and this returns without waiting for it.
    pub async fn dispatch(
        &self,
        operation: Operation,
        mode: ExecutionMode,
        callbacks: Callbacks,
    ) -> WebApiResult<Dispatched> {
        let descriptor = self.prepare(&operation, mode)?;
        debug!("Dispatching {} ({:?}) to {}", operation.operation_type(), mode, descriptor.url);

        match descriptor.mode {
            ExecutionMode::Blocking => {
                let result = self.run_prepared(&operation, &descriptor).await;
                callbacks.deliver(result);
                Ok(Dispatched::Completed)
            }
            ExecutionMode::Async => {
                let client = self.clone();
                let handle = tokio::spawn(async move {
                    let result = client.run_prepared(&operation, &descriptor).await;
                    callbacks.deliver(result);
                });
                Ok(Dispatched::Pending(handle))
            }
        }
    }

    async fn run_prepared(&self, operation: &Operation, descriptor: &RequestDescriptor) -> WebApiResult<Outcome> {
        let exchange = self.executor.execute(operation.operation_type(), descriptor).await?;
        operation.outcome(exchange)
    }

    /// Retrieve a single record
    pub async fn retrieve(&self, entity_set: &str, id: &str) -> WebApiResult<Value> {
        self.execute(&Operation::retrieve(entity_set, id)).await?.into_entity()
    }

    /// Retrieve one page of records; `query` is e.g. `accounts?$select=name`
    pub async fn retrieve_multiple(&self, query: &str) -> WebApiResult<Vec<Value>> {
        self.execute(&Operation::retrieve_multiple(query)).await?.into_entities()
    }

    pub async fn retrieve_multiple_with_page_size(&self, query: &str, max_page_size: u32) -> WebApiResult<Vec<Value>> {
        self.execute(&Operation::retrieve_multiple_with_page_size(query, max_page_size))
            .await?
            .into_entities()
    }

    /// Create a record and return its id
    pub async fn create(&self, entity_set: &str, data: Value) -> WebApiResult<String> {
        self.execute(&Operation::create(entity_set, data)).await?.into_entity_id()
    }

    /// Create a record and return the selected columns of the new record
    pub async fn create_and_select(&self, entity_set: &str, data: Value, select: Option<&str>) -> WebApiResult<Value> {
        self.execute(&Operation::create_and_select(entity_set, data, select.map(str::to_string)))
            .await?
            .into_entity()
    }

    pub async fn update(&self, entity_set: &str, id: &str, data: Value) -> WebApiResult<()> {
        self.execute(&Operation::update(entity_set, id, data)).await?.into_no_content()
    }

    pub async fn delete(&self, entity_set: &str, id: &str) -> WebApiResult<()> {
        self.execute(&Operation::delete(entity_set, id)).await?.into_no_content()
    }

    pub async fn associate(&self, parent: EntityReference, relationship: &str, child: EntityReference) -> WebApiResult<()> {
        self.execute(&Operation::associate(parent, relationship, child))
            .await?
            .into_no_content()
    }

    pub async fn disassociate(&self, parent: EntityReference, relationship: &str, child_id: &str) -> WebApiResult<()> {
        self.execute(&Operation::disassociate(parent, relationship, child_id))
            .await?
            .into_no_content()
    }

    pub async fn disassociate_lookup(&self, parent: EntityReference, relationship: &str) -> WebApiResult<()> {
        self.execute(&Operation::disassociate_lookup(parent, relationship))
            .await?
            .into_no_content()
    }

    pub async fn call_unbound_action(&self, action: &str, payload: Option<Value>) -> WebApiResult<Option<Value>> {
        self.execute(&Operation::call_unbound_action(action, payload))
            .await?
            .into_action_result()
    }

    pub async fn call_bound_action(
        &self,
        entity_set: &str,
        id: &str,
        action: &str,
        payload: Option<Value>,
    ) -> WebApiResult<Option<Value>> {
        self.execute(&Operation::call_bound_action(entity_set, id, action, payload))
            .await?
            .into_action_result()
    }
}

#[derive(Default)]
pub struct WebApiClientBuilder {
    resolver: Option<Arc<dyn ContextResolver>>,
    transport: Option<Arc<dyn Transport>>,
    settings: ClientSettings,
    logging: LoggingConfig,
    failure_hook: Option<FailureHook>,
}

impl WebApiClientBuilder {
    pub fn resolver<R: ContextResolver + 'static>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    pub fn settings(mut self, settings: ClientSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = logging;
        self
    }

    /// Called with status and status text whenever a response fails its
    /// operation's success check, before the error is delivered
    pub fn on_http_failure<F>(mut self, hook: F) -> Self
    where
        F: Fn(u16, &str) + Send + Sync + 'static,
    {
        self.failure_hook = Some(Arc::new(hook));
        self
    }

    pub fn build(self) -> WebApiResult<WebApiClient> {
        self.settings.validate()?;

        let resolver = self
            .resolver
            .ok_or_else(|| WebApiError::Config("a context resolver is required".to_string()))?;
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(None)?),
        };

        let mut executor = Executor::new(transport).with_logger(ApiLogger::new(self.logging));
        if let Some(hook) = self.failure_hook {
            executor = executor.with_failure_hook(hook);
        }

        Ok(WebApiClient {
            resolver,
            executor,
            settings: Arc::new(ArcSwap::from_pointee(self.settings)),
        })
    }
}
