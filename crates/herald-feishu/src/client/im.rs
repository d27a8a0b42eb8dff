//! Chat operations.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::de::IgnoredAny;
use serde_json::Value;
use tracing::{debug, info};

use super::FeishuClient;
use crate::error::FeishuError;
use crate::types::{ChatPage, ChatSummary, MessageContent, message_payload};

/// Pages scanned when looking a chat up by name.
const CHAT_SEARCH_PAGES: usize = 5;

/// Page size used when looking a chat up by name.
const CHAT_SEARCH_PAGE_SIZE: u32 = 50;

/// Characters left unescaped in query values (RFC 3986 unreserved).
const QUERY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

impl FeishuClient {
    /// Send one message to a chat.
    pub fn send_message(
        &self,
        chat_id: &str,
        content: MessageContent<'_>,
    ) -> Result<(), FeishuError> {
        debug!("Sending {} message to {}", content.msg_type(), chat_id);
        self.post::<_, IgnoredAny>(
            "im/v1/messages?receive_id_type=chat_id",
            &message_payload(chat_id, content),
        )?
        .check()?;
        Ok(())
    }

    /// Send a plain text message.
    pub fn send_text(&self, chat_id: &str, text: &str) -> Result<(), FeishuError> {
        self.send_message(chat_id, MessageContent::Text(text))
    }

    /// Send an interactive card rendering `markdown`.
    pub fn send_card(&self, chat_id: &str, markdown: &str) -> Result<(), FeishuError> {
        self.send_message(chat_id, MessageContent::Card(markdown))
    }

    /// Send a rich-text `post` message.
    ///
    /// `content` is the full post object, e.g. from [`PostMessage::to_content`](crate::types::PostMessage::to_content).
    pub fn send_post(&self, chat_id: &str, content: &Value) -> Result<(), FeishuError> {
        self.send_message(chat_id, MessageContent::Post(content))
    }

    /// One page of chats the application belongs to.
    pub fn list_chats(
        &self,
        page_size: u32,
        page_token: Option<&str>,
    ) -> Result<ChatPage, FeishuError> {
        let page = self
            .get::<ChatPage>(&chats_path(page_size, page_token))?
            .check()?
            .unwrap_or_default();
        Ok(page)
    }

    /// Find a chat by display name.
    ///
    /// An exact name match wins over a substring match. Only the first few
    /// pages of the listing are scanned.
    pub fn find_chat_by_name(&self, name: &str) -> Result<Option<ChatSummary>, FeishuError> {
        info!("Looking up chat '{}'", name);
        find_in_pages(name, CHAT_SEARCH_PAGES, |token| {
            self.list_chats(CHAT_SEARCH_PAGE_SIZE, token)
        })
    }
}

/// Listing path for one page of chats, with the page token escaped.
fn chats_path(page_size: u32, page_token: Option<&str>) -> String {
    let mut path = format!("im/v1/chats?page_size={page_size}");
    if let Some(token) = page_token.filter(|t| !t.is_empty()) {
        path.push_str("&page_token=");
        path.extend(utf8_percent_encode(token, QUERY_ESCAPE));
    }
    path
}

/// Scan up to `max_pages` pages from `fetch` for a chat named `name`.
///
/// The first chat named exactly `name` on any scanned page wins, and stops
/// the scan. Otherwise the first chat whose name contains `name` is returned.
/// Chats without an id are ignored.
fn find_in_pages<F>(
    name: &str,
    max_pages: usize,
    mut fetch: F,
) -> Result<Option<ChatSummary>, FeishuError>
where
    F: FnMut(Option<&str>) -> Result<ChatPage, FeishuError>,
{
    let mut fuzzy: Option<ChatSummary> = None;
    let mut token: Option<String> = None;

    for _ in 0..max_pages {
        let page = fetch(token.as_deref())?;

        for chat in page.items.iter().filter(|chat| !chat.chat_id.is_empty()) {
            if chat.name == name {
                return Ok(Some(chat.clone()));
            }
            if fuzzy.is_none() && chat.name.contains(name) {
                fuzzy = Some(chat.clone());
            }
        }

        match page.next_page_token() {
            Some(next) if page.has_more => token = Some(next.to_owned()),
            _ => break,
        }
    }

    Ok(fuzzy)
}
