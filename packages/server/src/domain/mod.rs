//! Domain layer: value objects, entities and the ports the use cases depend on.
//!
//! Infrastructure provides the concrete implementations of [`RoomStore`] and
//! [`MessageRelay`]; nothing in this module knows about them.

pub mod entity;
pub mod error;
pub mod relay;
pub mod repository;
pub mod value_object;

pub use entity::{Admission, Message, RoomMeta};
pub use error::{RelayError, StoreError, ValueObjectError};
pub use relay::{MessageRelay, RoomEvent, RoomSubscription};
pub use repository::RoomStore;
pub use value_object::{
    IdentityToken, MAX_SENDER_CHARS, MAX_TEXT_CHARS, MessageId, MessageText, RoomId,
    RoomIdFactory, SenderName, Timestamp,
};
