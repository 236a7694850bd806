//! Outbound notification collaborator and message formatting.

use std::future::Future;

use thiserror::Error;

use crate::price::PriceValue;

#[derive(Debug, Error)]
#[error("failed to notify chat {owner_id}: {reason}")]
pub struct NotifyError {
    pub owner_id: i64,
    pub reason: String,
}

/// Delivers a text message to the chat that owns a tracked product.
pub trait Notifier: Send + Sync {
    fn notify(
        &self,
        owner_id: i64,
        message: &str,
    ) -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Characters reserved by Telegram's `MarkdownV2` parse mode.
const MARKDOWN_V2_RESERVED: &[char] = &[
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!',
];

/// Backslash-escapes every `MarkdownV2` reserved character in `text`.
#[must_use]
pub fn escape_markdown_v2(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        if MARKDOWN_V2_RESERVED.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Plain-text body of a price-change alert.
#[must_use]
pub fn format_price_change(product_name: &str, previous: &PriceValue, current: &PriceValue) -> String {
    format!(
        "El precio del producto ha cambiado:\n{product_name}\nNuevo precio: {current}\nPrecio anterior: {previous}"
    )
}
