//! HTTP and realtime API client for one server.
//!
//! Identity cookies issued by the server are kept in a cookie jar and replayed
//! on every request, including the WebSocket handshake.

use std::sync::Arc;

use embers_server::infrastructure::dto::http::{
    CreateRoomResponse, ErrorResponse, MessageDto, MessagesResponse, SendMessageRequest,
    SendMessageResponse, TtlResponse,
};
use reqwest::{
    Method, RequestBuilder, Response, StatusCode, Url,
    cookie::{CookieStore, Jar},
};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, client::IntoClientRequest, http::HeaderValue},
};

use crate::error::ClientError;

pub type RealtimeStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct RoomApi {
    base_url: Url,
    http: reqwest::Client,
    jar: Arc<Jar>,
}

impl RoomApi {
    /// # Arguments
    ///
    /// * `base_url` - Server root, e.g. `http://127.0.0.1:8080`
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url).map_err(|e| ClientError::Rejected {
            status: 0,
            message: format!("invalid server URL '{}': {}", base_url, e),
        })?;
        let jar = Arc::new(Jar::default());
        let http = reqwest::Client::builder()
            .cookie_provider(jar.clone())
            .build()?;

        Ok(Self {
            base_url,
            http,
            jar,
        })
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        url.set_path(path);
        url
    }

    fn room_request(&self, method: Method, path: &str, room_id: &str) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(path))
            .query(&[("roomId", room_id)])
    }

    pub async fn create_room(&self) -> Result<String, ClientError> {
        let response = self.http.post(self.endpoint("/room/create")).send().await?;
        let body: CreateRoomResponse = check(response).await?.json().await?;
        Ok(body.room_id)
    }

    /// Pass the access gate; stores the identity cookie on first entry
    pub async fn join(&self, room_id: &str) -> Result<(), ClientError> {
        let response = self
            .room_request(Method::POST, "/room/join", room_id)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    pub async fn ttl(&self, room_id: &str) -> Result<u64, ClientError> {
        let response = self
            .room_request(Method::GET, "/room/ttl", room_id)
            .send()
            .await?;
        let body: TtlResponse = check(response).await?.json().await?;
        Ok(body.ttl)
    }

    pub async fn messages(&self, room_id: &str) -> Result<Vec<MessageDto>, ClientError> {
        let response = self
            .room_request(Method::GET, "/messages", room_id)
            .send()
            .await?;
        let body: MessagesResponse = check(response).await?.json().await?;
        Ok(body.messages)
    }

    /// Returns the server-assigned message id
    pub async fn send_message(
        &self,
        room_id: &str,
        sender: &str,
        text: &str,
    ) -> Result<String, ClientError> {
        let response = self
            .room_request(Method::POST, "/messages", room_id)
            .json(&SendMessageRequest {
                sender: sender.to_string(),
                text: text.to_string(),
            })
            .send()
            .await?;
        let body: SendMessageResponse = check(response).await?.json().await?;
        Ok(body.message_id)
    }

    pub async fn destroy(&self, room_id: &str) -> Result<(), ClientError> {
        let response = self
            .room_request(Method::DELETE, "/room", room_id)
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Open the room's realtime channel, presenting the stored identity cookie
    pub async fn connect_realtime(&self, room_id: &str) -> Result<RealtimeStream, ClientError> {
        let http_url = self.endpoint("/realtime");
        let mut ws_url = http_url.clone();
        let scheme = if http_url.scheme() == "https" { "wss" } else { "ws" };
        // http(s) -> ws(s) is always a valid scheme change.
        let _ = ws_url.set_scheme(scheme);
        ws_url.query_pairs_mut().append_pair("roomId", room_id);

        let mut request = ws_url.as_str().into_client_request()?;
        if let Some(cookie) = self.jar.cookies(&http_url)
            && let Ok(value) = HeaderValue::from_bytes(cookie.as_bytes())
        {
            request.headers_mut().insert(tungstenite::http::header::COOKIE, value);
        }

        match connect_async(request).await {
            Ok((stream, _)) => Ok(stream),
            Err(tungstenite::Error::Http(response)) => Err(status_error(
                response.status().as_u16(),
                String::from_utf8_lossy(response.body().as_deref().unwrap_or_default())
                    .into_owned(),
            )),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map non-success responses to [`ClientError`]
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(status_error(status.as_u16(), body))
}

fn status_error(status: u16, body: String) -> ClientError {
    match StatusCode::from_u16(status) {
        Ok(StatusCode::NOT_FOUND) => ClientError::RoomNotFound,
        Ok(StatusCode::FORBIDDEN) => ClientError::RoomFull,
        _ => {
            let message = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            ClientError::Rejected { status, message }
        }
    }
}
