//! # Session
//!
//! A [`Session`] owns everything tied to one server-side session: the transport, the session id
//! issued by the server and the heartbeat task keeping that id alive.
//!
//! Every request made on behalf of the session, whether by a proxy object or by the heartbeat,
//! goes through the shared [`Connection`], which serializes them: the connection lock is held for
//! exactly one transport request at a time, and never while a reply is being decoded.
use crate::{
    config::{ClientConfig, Protocol, Version},
    grpc::transport::GrpcTransport,
    object::{
        Document, ObjectError,
        factory::{Mode, ObjectFactory},
    },
    rest::RestTransport,
    schema::{SchemaCache, SchemaError},
    transport::{
        AppInfo, ChunkStream, FieldAddress, FieldReply, MethodRequest, ObjectHandle, SessionType,
        Transport, TransportError, ValueShape,
    },
};
use std::{sync::Arc, time::Duration};
use tokio::{
    sync::{Mutex, MutexGuard, watch},
    task::JoinHandle,
};
use tracing::{debug, error, info, warn};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Server version {found} is outside the supported range [{min}, {max}]")]
    VersionMismatch {
        found: Version,
        min: Version,
        max: Version,
    },
    #[error("The server did not issue a session id")]
    SessionCreationFailed,
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Object(#[from] ObjectError),
}

/// What [`Session::connect`] needs to know besides the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub min_version: Version,
    pub max_version: Version,
    pub session_type: SessionType,
    pub keepalive_interval: Duration,
    /// Attempts at the initial version check. Later requests are never retried.
    pub connect_attempts: u32,
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        ClientConfig::default().session_config()
    }
}

#[derive(Debug)]
struct SessionState {
    id: String,
    open: bool,
}

/// The transport of a session, shared by the session, its heartbeat and every remote object.
#[derive(Debug)]
pub(crate) struct Connection {
    transport: Arc<dyn Transport>,
    state: Mutex<SessionState>,
}

impl Connection {
    fn new(transport: Arc<dyn Transport>, id: String) -> Self {
        Self {
            transport,
            state: Mutex::new(SessionState { id, open: true }),
        }
    }

    async fn lock(&self) -> Result<MutexGuard<'_, SessionState>, TransportError> {
        let state = self.state.lock().await;
        if !state.open {
            return Err(TransportError::SessionClosed);
        }
        Ok(state)
    }

    pub async fn keepalive(&self) -> Result<(), TransportError> {
        let state = self.lock().await?;
        self.transport.keepalive(&state.id).await
    }

    pub async fn schema(&self, location: &str) -> Result<Option<serde_json::Value>, TransportError> {
        let state = self.lock().await?;
        self.transport.schema(&state.id, location).await
    }

    pub async fn schema_keywords(&self) -> Result<Vec<String>, TransportError> {
        let state = self.lock().await?;
        self.transport.schema_keywords(&state.id).await
    }

    pub async fn document(
        &self,
        document_id: &str,
        skeleton: bool,
    ) -> Result<serde_json::Value, TransportError> {
        let state = self.lock().await?;
        self.transport
            .document(&state.id, document_id, skeleton)
            .await
    }

    pub async fn get_field(
        &self,
        field: &FieldAddress,
        shape: ValueShape,
    ) -> Result<FieldReply, TransportError> {
        let state = self.lock().await?;
        self.transport.get_field(&state.id, field, shape).await
    }

    pub async fn set_field(
        &self,
        field: &FieldAddress,
        value: serde_json::Value,
        index: Option<u64>,
    ) -> Result<(), TransportError> {
        let state = self.lock().await?;
        self.transport.set_field(&state.id, field, value, index).await
    }

    pub async fn set_field_array(&self, chunks: ChunkStream) -> Result<(), TransportError> {
        let state = self.lock().await?;
        self.transport.set_field_array(&state.id, chunks).await
    }

    pub async fn list_methods(
        &self,
        object: &ObjectHandle,
    ) -> Result<Vec<serde_json::Value>, TransportError> {
        let state = self.lock().await?;
        self.transport.list_methods(&state.id, object).await
    }

    pub async fn execute_method(
        &self,
        request: &MethodRequest,
    ) -> Result<serde_json::Value, TransportError> {
        let state = self.lock().await?;
        self.transport.execute_method(&state.id, request).await
    }
}

struct Heartbeat {
    stop: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Heartbeat {
    fn spawn(connection: Arc<Connection>, interval: Duration) -> Self {
        let (stop, stopped) = watch::channel(false);
        let task = tokio::spawn(Self::run(connection, interval, stopped));
        Self { stop, task }
    }

    async fn run(connection: Arc<Connection>, interval: Duration, mut stopped: watch::Receiver<bool>) {
        loop {
            tokio::select! {
                _ = stopped.changed() => break,
                _ = tokio::time::sleep(interval) => {}
            }

            match connection.keepalive().await {
                Ok(()) => {}
                Err(TransportError::SessionClosed) => break,
                Err(e) => {
                    warn!("Keepalive failed, stopping the heartbeat: {}", e);
                    break;
                }
            }
        }
        debug!("Heartbeat stopped");
    }
}

/// A live session on a Caffa server.
///
/// Sessions must be closed with [`Session::close`]. Dropping an open session stops the heartbeat
/// but leaves the server-side session to expire on its own.
pub struct Session {
    id: String,
    app_info: AppInfo,
    session_type: SessionType,
    connection: Arc<Connection>,
    factory: Arc<ObjectFactory>,
    heartbeat: Option<Heartbeat>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("app_info", &self.app_info)
            .field("session_type", &self.session_type)
            .field("open", &self.heartbeat.is_some())
            .finish()
    }
}

impl Session {
    /// Builds the transport described by `config` and connects through it.
    pub async fn open(config: &ClientConfig) -> Result<Self, SessionError> {
        let address = config.address();
        let transport: Arc<dyn Transport> = match config.protocol {
            Protocol::Grpc => Arc::new(
                GrpcTransport::connect(address, &config.username, &config.password).await?,
            ),
            Protocol::Rest => Arc::new(RestTransport::new(
                address,
                &config.username,
                &config.password,
            )?),
        };

        Self::connect(transport, &config.session_config()).await
    }

    /// Checks the server version, creates the session and starts the heartbeat.
    pub async fn connect(
        transport: Arc<dyn Transport>,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let app_info = check_version(transport.as_ref(), config).await?;

        let id = transport.create_session(config.session_type).await?;
        if id.is_empty() {
            return Err(SessionError::SessionCreationFailed);
        }
        info!("Created {} session {}", config.session_type, id);

        let connection = Arc::new(Connection::new(transport, id.clone()));
        let heartbeat = Heartbeat::spawn(connection.clone(), config.keepalive_interval);

        Ok(Self {
            id,
            app_info,
            session_type: config.session_type,
            factory: ObjectFactory::online(connection.clone()),
            connection,
            heartbeat: Some(heartbeat),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn app_info(&self) -> &AppInfo {
        &self.app_info
    }

    pub fn session_type(&self) -> SessionType {
        self.session_type
    }

    pub fn is_open(&self) -> bool {
        self.heartbeat.is_some()
    }

    /// The factory building objects under this session.
    pub fn factory(&self) -> &Arc<ObjectFactory> {
        &self.factory
    }

    pub fn schemas(&self) -> &SchemaCache {
        self.factory.schemas()
    }

    pub async fn schema_keywords(&self) -> Result<Vec<String>, SessionError> {
        Ok(self.schemas().keywords().await?)
    }

    /// Fetches a document as a remote object. An empty `id` selects the default document.
    pub async fn document(&self, id: &str) -> Result<Document, SessionError> {
        let json = self.connection.document(id, true).await?;
        let object = self.factory.materialize(&json, Mode::Remote).await?;
        Ok(Document::new(object))
    }

    /// Stops the heartbeat and destroys the server-side session.
    ///
    /// Once this returns no further request is issued for the session. Closing twice is a no-op.
    pub async fn close(&mut self) -> Result<(), SessionError> {
        let Some(heartbeat) = self.heartbeat.take() else {
            return Ok(());
        };

        let destroyed = {
            let mut state = self.connection.state.lock().await;
            let _ = heartbeat.stop.send(true);
            state.open = false;
            self.connection.transport.destroy_session(&state.id).await
        };

        if let Err(e) = heartbeat.task.await {
            warn!("Heartbeat task ended abnormally: {}", e);
        }
        info!("Closed session {}", self.id);

        Ok(destroyed?)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(heartbeat) = self.heartbeat.take() {
            let _ = heartbeat.stop.send(true);
            heartbeat.task.abort();
        }
    }
}

async fn check_version(
    transport: &dyn Transport,
    config: &SessionConfig,
) -> Result<AppInfo, SessionError> {
    let attempts = config.connect_attempts.max(1);
    let mut attempt = 1;

    let app_info = loop {
        match transport.app_info().await {
            Ok(app_info) => break app_info,
            Err(e) if attempt < attempts => {
                warn!(
                    "Failed to reach the server (attempt {}/{}): {}. Retrying in {:?}",
                    attempt, attempts, e, config.retry_delay
                );
                tokio::time::sleep(config.retry_delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e.into()),
        }
    };

    let found = app_info.version();
    info!("Found {} version {}", app_info.name, found);

    if found < config.min_version || found > config.max_version {
        error!(
            "{} version {} is not supported, expected [{}, {}]",
            app_info.name, found, config.min_version, config.max_version
        );
        return Err(SessionError::VersionMismatch {
            found,
            min: config.min_version,
            max: config.max_version,
        });
    }

    Ok(app_info)
}
