//! UseCase layer: one struct per room operation.

mod authorize;
mod create_room;
mod destroy_room;
mod error;
mod get_messages;
mod get_ttl;
mod lifecycle;
mod send_message;
mod subscribe_room;

pub use authorize::{Authorization, AuthorizeUseCase};
pub use create_room::CreateRoomUseCase;
pub use destroy_room::DestroyRoomUseCase;
pub use error::{
    AuthorizeError, CreateRoomError, DestroyRoomError, ReadRoomError, SendMessageError,
};
pub use get_messages::GetMessagesUseCase;
pub use get_ttl::GetTtlUseCase;
pub use lifecycle::{RetryPolicy, RoomLifecycle};
pub use send_message::{MessageDraft, SendMessageUseCase};
pub use subscribe_room::SubscribeRoomUseCase;
