//! Instant messaging wire types.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Content of an outgoing chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageContent<'a> {
    /// Plain text message.
    Text(&'a str),
    /// Interactive card with a single `lark_md` element.
    Card(&'a str),
    /// Rich-text post; the full `{"post": {...}}` object.
    Post(&'a Value),
}

impl MessageContent<'_> {
    /// Value of the `msg_type` field.
    pub fn msg_type(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Card(_) => "interactive",
            Self::Post(_) => "post",
        }
    }

    /// Serialized `content` field.
    ///
    /// The message API takes content as a JSON string, not a nested object.
    pub fn to_content_string(&self) -> String {
        match self {
            Self::Text(text) => json!({ "text": text }).to_string(),
            Self::Card(markdown) => card_content(markdown).to_string(),
            Self::Post(content) => content.to_string(),
        }
    }
}

/// Card body rendering `markdown` with the `lark_md` dialect.
pub fn card_content(markdown: &str) -> Value {
    json!({
        "config": { "wide_screen_mode": true },
        "elements": [
            { "tag": "div", "text": { "tag": "lark_md", "content": markdown } }
        ]
    })
}

/// Request body for sending `content` to a chat.
pub fn message_payload(chat_id: &str, content: MessageContent<'_>) -> Value {
    json!({
        "receive_id": chat_id,
        "msg_type": content.msg_type(),
        "content": content.to_content_string(),
    })
}

/// One inline element of a post line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum PostElement {
    Text { text: String },
    A { text: String, href: String },
    At { user_id: String },
    Img { image_key: String },
}

/// A simple rich-text post: one text line with an optional link, then an
/// optional mention and image on lines of their own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostMessage {
    pub title: String,
    pub text: Option<String>,
    pub link_text: Option<String>,
    pub link_url: Option<String>,
    pub at_user_id: Option<String>,
    pub image_key: Option<String>,
}

impl PostMessage {
    /// Lines of the post body.
    ///
    /// The link needs both text and URL. A post with nothing in it still
    /// carries one empty text line, which the API requires.
    pub fn lines(&self) -> Vec<Vec<PostElement>> {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_owned);
        let text = present(self.text.as_deref());
        let link_text = present(self.link_text.as_deref());
        let link_url = present(self.link_url.as_deref());

        let mut lines = Vec::new();
        let mut first = Vec::new();
        if let Some(text) = text {
            let gap = if link_text.is_some() || link_url.is_some() {
                " "
            } else {
                ""
            };
            first.push(PostElement::Text {
                text: format!("{text}{gap}"),
            });
        }
        if let (Some(text), Some(href)) = (link_text, link_url) {
            first.push(PostElement::A { text, href });
        }
        if !first.is_empty() {
            lines.push(first);
        }
        if let Some(user_id) = present(self.at_user_id.as_deref()) {
            lines.push(vec![PostElement::At { user_id }]);
        }
        if let Some(image_key) = present(self.image_key.as_deref()) {
            lines.push(vec![PostElement::Img { image_key }]);
        }

        if lines.is_empty() {
            lines.push(vec![PostElement::Text {
                text: String::new(),
            }]);
        }
        lines
    }

    /// The `{"post": {"zh_cn": {...}}}` content object.
    pub fn to_content(&self) -> Value {
        json!({
            "post": {
                "zh_cn": {
                    "title": self.title,
                    "content": self.lines(),
                }
            }
        })
    }
}

/// One page of the chat listing.
#[derive(Debug, Default, Deserialize)]
pub struct ChatPage {
    /// Chats on this page.
    #[serde(default)]
    pub items: Vec<ChatSummary>,
    /// Token for the next page; absent or empty on the last page.
    #[serde(default)]
    pub page_token: Option<String>,
    /// Whether more pages follow.
    #[serde(default)]
    pub has_more: bool,
}

impl ChatPage {
    /// Token for the next page, if there is one.
    pub fn next_page_token(&self) -> Option<&str> {
        self.page_token.as_deref().filter(|token| !token.is_empty())
    }
}

/// A chat the application has joined.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChatSummary {
    /// Chat id (`oc_...`).
    #[serde(default)]
    pub chat_id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Chat description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_text_payload_content_is_string() {
        let payload = message_payload("oc_1", MessageContent::Text("hi \"there\""));
        assert_eq!(payload["receive_id"], "oc_1");
        assert_eq!(payload["msg_type"], "text");
        let content: Value =
            serde_json::from_str(payload["content"].as_str().unwrap()).unwrap();
        assert_eq!(content, json!({"text": "hi \"there\""}));
    }

    #[test]
    fn test_card_payload() {
        let payload = message_payload("oc_1", MessageContent::Card("**Title**\n- item"));
        assert_eq!(payload["msg_type"], "interactive");
        let content: Value =
            serde_json::from_str(payload["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["config"]["wide_screen_mode"], true);
        assert_eq!(content["elements"][0]["text"]["tag"], "lark_md");
        assert_eq!(content["elements"][0]["text"]["content"], "**Title**\n- item");
    }

    #[test]
    fn test_card_content_keeps_unicode() {
        let content = MessageContent::Card("今日资讯").to_content_string();
        assert!(content.contains("今日资讯"));
    }

    #[test]
    fn test_post_with_text_and_link() {
        let post = PostMessage {
            title: "Notice".to_owned(),
            text: Some("Read this".to_owned()),
            link_text: Some("details".to_owned()),
            link_url: Some("https://example.com".to_owned()),
            ..PostMessage::default()
        };
        assert_eq!(
            post.to_content(),
            json!({"post": {"zh_cn": {"title": "Notice", "content": [[
                {"tag": "text", "text": "Read this "},
                {"tag": "a", "text": "details", "href": "https://example.com"}
            ]]}}})
        );
    }

    #[test]
    fn test_post_mention_and_image_lines() {
        let post = PostMessage {
            title: "T".to_owned(),
            link_text: Some("orphan".to_owned()),
            at_user_id: Some("ou_1".to_owned()),
            image_key: Some("img_1".to_owned()),
            ..PostMessage::default()
        };
        assert_eq!(
            serde_json::to_value(post.lines()).unwrap(),
            json!([
                [{"tag": "at", "user_id": "ou_1"}],
                [{"tag": "img", "image_key": "img_1"}]
            ])
        );
    }

    #[test]
    fn test_empty_post_has_blank_line() {
        let post = PostMessage {
            title: "T".to_owned(),
            text: Some(String::new()),
            ..PostMessage::default()
        };
        assert_eq!(
            post.lines(),
            vec![vec![PostElement::Text {
                text: String::new()
            }]]
        );
    }

    #[test]
    fn test_post_payload() {
        let content = PostMessage {
            title: "今日".to_owned(),
            text: Some("hello".to_owned()),
            ..PostMessage::default()
        }
        .to_content();
        let payload = message_payload("oc_1", MessageContent::Post(&content));

        assert_eq!(payload["msg_type"], "post");
        let sent: Value = serde_json::from_str(payload["content"].as_str().unwrap()).unwrap();
        assert_eq!(sent, content);
        assert!(payload["content"].as_str().unwrap().contains("今日"));
    }

    #[test]
    fn test_parse_chat_page() {
        let page: ChatPage = serde_json::from_value(json!({
            "items": [
                {"chat_id": "oc_a", "name": "Team A", "description": "", "owner_id": "ou_x"},
                {"chat_id": "oc_b", "name": "Team B"}
            ],
            "page_token": "",
            "has_more": false
        }))
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].name, "Team B");
        assert_eq!(page.next_page_token(), None);
    }
}
