//! Shared application state.

use std::sync::Arc;

use crate::usecase::{
    AuthorizeUseCase, CreateRoomUseCase, DestroyRoomUseCase, GetMessagesUseCase, GetTtlUseCase,
    SendMessageUseCase, SubscribeRoomUseCase,
};

use super::{
    access::{RoomAccess, RoomRequest},
    cookie::{CookiePolicy, SessionCookie},
    error::ApiError,
};

pub struct AppState {
    /// CreateRoomUseCase（Room 作成のユースケース）
    pub create_room_usecase: Arc<CreateRoomUseCase>,
    /// AuthorizeUseCase（入室判定のユースケース）
    pub authorize_usecase: Arc<AuthorizeUseCase>,
    /// SendMessageUseCase（メッセージ送信のユースケース）
    pub send_message_usecase: Arc<SendMessageUseCase>,
    /// GetMessagesUseCase（履歴取得のユースケース）
    pub get_messages_usecase: Arc<GetMessagesUseCase>,
    /// GetTtlUseCase（残り時間取得のユースケース）
    pub get_ttl_usecase: Arc<GetTtlUseCase>,
    /// DestroyRoomUseCase（Room 破棄のユースケース）
    pub destroy_room_usecase: Arc<DestroyRoomUseCase>,
    /// SubscribeRoomUseCase（リアルタイム購読のユースケース）
    pub subscribe_room_usecase: Arc<SubscribeRoomUseCase>,
    pub cookie_policy: CookiePolicy,
}

impl AppState {
    /// Run the access gate for a room-scoped request.
    ///
    /// A caller without a valid token for the room is treated as a fresh join
    /// and receives a new cookie when admitted.
    pub async fn authorize(&self, request: RoomRequest) -> Result<RoomAccess, ApiError> {
        let authorization = self
            .authorize_usecase
            .execute(request.room_id, request.presented)
            .await?;

        let cookie = if authorization.newly_issued {
            let max_age = self
                .get_ttl_usecase
                .execute(&authorization.room_id)
                .await
                .unwrap_or(0);
            SessionCookie::issue(
                &authorization.room_id,
                &authorization.token,
                max_age,
                self.cookie_policy,
            )
        } else {
            SessionCookie::none()
        };

        Ok(RoomAccess {
            room_id: authorization.room_id,
            token: authorization.token,
            cookie,
        })
    }
}
