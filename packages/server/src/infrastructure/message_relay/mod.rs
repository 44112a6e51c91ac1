//! メッセージ配信（Pub/Sub）の実装
//!
//! - `broadcast`: tokio の broadcast チャンネルを使ったプロセス内実装

pub mod broadcast;

pub use broadcast::BroadcastMessageRelay;
