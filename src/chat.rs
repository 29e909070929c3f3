use std::time::Duration;

use crate::models::{ChatMessage, SearchedUser};

pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// State for the open conversation. Present only while a chat is selected;
/// dropping it is what stops the poll timer, so every entered chat has
/// exactly one matching teardown.
pub struct ChatThread {
    pub chat_id: i64,
    pub other_user: SearchedUser,
    pub messages: Vec<ChatMessage>,
    pub draft: String,
    pub sending: bool,
}

impl ChatThread {
    pub fn new(chat_id: i64, other_user: SearchedUser) -> Self {
        Self {
            chat_id,
            other_user,
            messages: Vec::new(),
            draft: String::new(),
            sending: false,
        }
    }

    /// Replaces the snapshot wholesale, in the order the server returned it.
    /// A snapshot for another chat (a fetch that outlived its selection) is
    /// dropped; returns whether the snapshot was applied.
    pub fn apply_snapshot(&mut self, chat_id: i64, messages: Vec<ChatMessage>) -> bool {
        if chat_id != self.chat_id {
            return false;
        }
        self.messages = messages;
        true
    }

    /// Gates a send: only a non-empty trimmed draft with no send already in
    /// flight goes out. The draft itself is untouched until the server acks.
    pub fn begin_send(&mut self) -> Option<String> {
        if self.sending {
            return None;
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        self.sending = true;
        Some(text.to_string())
    }

    /// Completes the in-flight send. Delivery clears the draft; failure keeps
    /// it so the user can retry.
    pub fn finish_send(&mut self, delivered: bool) {
        self.sending = false;
        if delivered {
            self.draft.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counterpart() -> SearchedUser {
        SearchedUser {
            id: 2,
            username: "dmitry".to_string(),
            avatar_url: String::new(),
            status: String::new(),
            online: true,
        }
    }

    fn message(id: i64, text: &str) -> ChatMessage {
        ChatMessage {
            id,
            sender_id: 2,
            message_text: text.to_string(),
            created_at: "2024-05-01 10:00:00".to_string(),
            username: "dmitry".to_string(),
            avatar_url: String::new(),
        }
    }

    #[test]
    fn test_snapshot_replaces_wholesale_in_server_order() {
        let mut thread = ChatThread::new(5, counterpart());
        thread.apply_snapshot(5, vec![message(1, "old"), message(2, "older view")]);

        // the server's ordering is taken as-is, even if ids look shuffled
        assert!(thread.apply_snapshot(5, vec![message(3, "c"), message(1, "a")]));
        let ids: Vec<i64> = thread.messages.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_snapshot_for_other_chat_is_dropped() {
        let mut thread = ChatThread::new(5, counterpart());
        thread.apply_snapshot(5, vec![message(1, "mine")]);

        assert!(!thread.apply_snapshot(9, vec![message(2, "someone else's")]));
        assert_eq!(thread.messages.len(), 1);
        assert_eq!(thread.messages[0].id, 1);
    }

    #[test]
    fn test_empty_draft_does_not_send() {
        let mut thread = ChatThread::new(5, counterpart());
        assert_eq!(thread.begin_send(), None);

        thread.draft = "   ".to_string();
        assert_eq!(thread.begin_send(), None);
        assert!(!thread.sending);
    }

    #[test]
    fn test_only_one_send_in_flight() {
        let mut thread = ChatThread::new(5, counterpart());
        thread.draft = "hello".to_string();

        assert_eq!(thread.begin_send(), Some("hello".to_string()));
        assert!(thread.sending);
        assert_eq!(thread.begin_send(), None);
    }

    #[test]
    fn test_delivered_send_clears_draft() {
        let mut thread = ChatThread::new(5, counterpart());
        thread.draft = "  hello  ".to_string();

        assert_eq!(thread.begin_send(), Some("hello".to_string()));
        thread.finish_send(true);
        assert!(thread.draft.is_empty());
        assert!(!thread.sending);
    }

    #[test]
    fn test_failed_send_keeps_draft() {
        let mut thread = ChatThread::new(5, counterpart());
        thread.draft = "hello".to_string();

        thread.begin_send().unwrap();
        thread.finish_send(false);
        assert_eq!(thread.draft, "hello");
        assert!(!thread.sending);
    }
}
