//! Session-local chat list and current selection.
//!
//! The registry is a plain value owned by the app root and handed to the
//! views that need it. Every mutation swaps in a fresh `Arc<Vec<Chat>>`;
//! no-ops keep the old one, so `Arc::ptr_eq` tells observers whether
//! anything changed.

use std::collections::HashSet;
use std::sync::Arc;

use crate::normalize::normalize;
use crate::title::derive_title;
use crate::{Chat, ChatId, ChatMessage, CoreMessage, RemoteChat};

#[derive(Debug, Clone, PartialEq)]
pub struct ChatRegistry {
    current_chat_id: Option<ChatId>,
    chats: Arc<Vec<Chat>>,
}

impl Default for ChatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatRegistry {
    /// Empty registry with a fresh selection. The selected chat has no entry
    /// until history hydration picks it up from the remote store.
    pub fn new() -> Self {
        Self {
            current_chat_id: Some(ChatId::new()),
            chats: Arc::new(Vec::new()),
        }
    }

    pub fn current_chat_id(&self) -> Option<&ChatId> {
        self.current_chat_id.as_ref()
    }

    pub fn chats(&self) -> &Arc<Vec<Chat>> {
        &self.chats
    }

    pub fn chat(&self, id: &ChatId) -> Option<&Chat> {
        self.chats.iter().find(|chat| &chat.id == id)
    }

    pub fn current_chat(&self) -> Option<&Chat> {
        self.current_chat_id.as_ref().and_then(|id| self.chat(id))
    }

    pub fn create_new_chat(&mut self) -> ChatId {
        let id = ChatId::new();
        let mut chats = self.chats.as_ref().clone();
        chats.push(Chat::new(id.clone()));
        self.chats = Arc::new(chats);
        self.current_chat_id = Some(id.clone());
        tracing::debug!(chat_id = %id, "created chat");
        id
    }

    /// Select `id` without checking that it exists.
    pub fn set_current_chat_id(&mut self, id: ChatId) {
        self.current_chat_id = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.current_chat_id = None;
    }

    pub fn add_message_to_chat(&mut self, chat_id: &ChatId, message: ChatMessage) {
        self.update_chat(chat_id, |chat| chat.messages.push(message));
    }

    pub fn update_chat_title(&mut self, chat_id: &ChatId, messages: &[CoreMessage]) {
        let title = derive_title(messages);
        self.update_chat(chat_id, |chat| chat.title = title);
    }

    /// Like [`update_chat_title`](Self::update_chat_title) but for messages
    /// already in display form, as the live session holds them.
    pub fn retitle_from_display(&mut self, chat_id: &ChatId, messages: &[ChatMessage]) {
        let Some(first) = messages.first() else {
            return;
        };
        let title = first.content.clone();
        self.update_chat(chat_id, |chat| chat.title = title);
    }

    /// Replace the list with the remote history.
    ///
    /// Remote chats come first, in remote order. Local chats that were never
    /// persisted (and are not in the remote list yet) are kept after them;
    /// persisted chats missing from the remote list were deleted elsewhere
    /// and are dropped.
    pub fn hydrate(&mut self, remote: Vec<RemoteChat>) {
        let remote_ids: HashSet<ChatId> = remote.iter().map(|c| c.id.clone()).collect();

        let mut chats: Vec<Chat> = remote.into_iter().map(hydrate_chat).collect();
        chats.extend(
            self.chats
                .iter()
                .filter(|chat| !chat.persisted && !remote_ids.contains(&chat.id))
                .cloned(),
        );

        tracing::debug!(count = chats.len(), "hydrated chat history");
        self.chats = Arc::new(chats);
    }

    /// Drop a chat locally (after the remote delete succeeded). Removing the
    /// selected chat leaves nothing selected.
    pub fn remove_chat(&mut self, chat_id: &ChatId) {
        if !self.chats.iter().any(|chat| &chat.id == chat_id) {
            if self.current_chat_id.as_ref() == Some(chat_id) {
                self.current_chat_id = None;
            }
            return;
        }

        let chats = self
            .chats
            .iter()
            .filter(|chat| &chat.id != chat_id)
            .cloned()
            .collect();
        self.chats = Arc::new(chats);

        if self.current_chat_id.as_ref() == Some(chat_id) {
            self.current_chat_id = None;
        }
        tracing::debug!(%chat_id, "removed chat");
    }

    fn update_chat(&mut self, chat_id: &ChatId, apply: impl FnOnce(&mut Chat)) {
        let Some(index) = self.chats.iter().position(|chat| &chat.id == chat_id) else {
            return;
        };

        let mut chats = self.chats.as_ref().clone();
        apply(&mut chats[index]);
        self.chats = Arc::new(chats);
    }
}

fn hydrate_chat(remote: RemoteChat) -> Chat {
    Chat {
        title: derive_title(&remote.messages),
        messages: normalize(&remote.messages),
        id: remote.id,
        persisted: true,
    }
}
