//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    routing::{delete, get, post},
};
use embers_shared::time::{Clock, SystemClock};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    domain::{MessageRelay, RoomStore},
    infrastructure::{message_relay::BroadcastMessageRelay, repository::InMemoryRoomStore},
    usecase::{
        AuthorizeUseCase, CreateRoomUseCase, DestroyRoomUseCase, GetMessagesUseCase,
        GetTtlUseCase, RoomLifecycle, SendMessageUseCase, SubscribeRoomUseCase,
    },
};

use super::{
    cookie::CookiePolicy,
    handler::{
        create_room, destroy_room, get_messages, get_ttl, health_check, join_room, send_message,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Self-destructing chat room server
///
/// # Example
///
/// ```ignore
/// let server = Server::in_memory(ServerConfig::default());
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
    /// RoomLifecycle（TTL 延長・破棄・期限切れ掃除）
    lifecycle: Arc<RoomLifecycle>,
}

impl Server {
    /// Create a new Server instance from its store and relay
    ///
    /// # Arguments
    ///
    /// * `config` - Runtime settings
    /// * `store` - RoomStore implementation
    /// * `relay` - MessageRelay implementation
    /// * `clock` - Source of message and room timestamps
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn RoomStore>,
        relay: Arc<dyn MessageRelay>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        // Initialize dependencies in order:
        // 1. RoomLifecycle
        // 2. UseCases
        // 3. AppState
        let lifecycle = Arc::new(RoomLifecycle::new(store.clone(), relay.clone()));

        let state = Arc::new(AppState {
            create_room_usecase: Arc::new(CreateRoomUseCase::new(
                store.clone(),
                clock.clone(),
                config.room_ttl,
            )),
            authorize_usecase: Arc::new(AuthorizeUseCase::new(store.clone(), config.capacity)),
            send_message_usecase: Arc::new(SendMessageUseCase::new(
                store.clone(),
                relay.clone(),
                lifecycle.clone(),
                clock,
            )),
            get_messages_usecase: Arc::new(GetMessagesUseCase::new(store.clone())),
            get_ttl_usecase: Arc::new(GetTtlUseCase::new(store)),
            destroy_room_usecase: Arc::new(DestroyRoomUseCase::new(lifecycle.clone())),
            subscribe_room_usecase: Arc::new(SubscribeRoomUseCase::new(relay)),
            cookie_policy: CookiePolicy {
                secure: config.secure_cookies,
            },
        });

        Self {
            config,
            state,
            lifecycle,
        }
    }

    /// Server backed by the in-memory store and broadcast relay
    pub fn in_memory(config: ServerConfig) -> Self {
        Self::new(
            config,
            Arc::new(InMemoryRoomStore::new()),
            Arc::new(BroadcastMessageRelay::default()),
            Arc::new(SystemClock),
        )
    }

    pub fn router(&self) -> Router {
        Router::new()
            // Room エンドポイント
            .route("/room/create", post(create_room))
            .route("/room/join", post(join_room))
            .route("/room/ttl", get(get_ttl))
            .route("/room", delete(destroy_room))
            // メッセージエンドポイント
            .route("/messages", post(send_message).get(get_messages))
            // WebSocket エンドポイント
            .route("/realtime", get(websocket_handler))
            .route("/api/health", get(health_check))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    ///
    /// Also runs the expiry sweeper for the lifetime of the server.
    pub async fn serve<F>(
        self,
        listener: TcpListener,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let sweeper = self.lifecycle.spawn_sweeper(self.config.sweep_interval);

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await;

        sweeper.abort();
        result?;
        Ok(())
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address or
    /// if there's an error during server execution.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!("Chat room server listening on {}", listener.local_addr()?);
        tracing::info!(
            "Room capacity {}, initial TTL {}s",
            self.config.capacity,
            self.config.room_ttl.as_secs()
        );
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}
