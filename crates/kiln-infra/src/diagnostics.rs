// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A [`MessageSink`] that keeps every message in memory.

use std::sync::{Mutex, MutexGuard, PoisonError};

use kiln_core::diagnostics::{Message, MessageSink, Severity};

/// Collects build messages, grouped by item name.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Mutex<Vec<Message>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Message>> {
        self.messages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every message, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        self.lock().clone()
    }

    /// Messages of one group, oldest first.
    pub fn group(&self, group: &str) -> Vec<Message> {
        self.lock()
            .iter()
            .filter(|m| m.group == group)
            .cloned()
            .collect()
    }

    /// Whether a group holds at least one error.
    pub fn has_errors(&self, group: &str) -> bool {
        self.lock()
            .iter()
            .any(|m| m.group == group && m.severity == Severity::Error)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl MessageSink for MessageLog {
    fn add(&self, message: Message) {
        match message.severity {
            Severity::Error => log::debug!("[{}] error: {}", message.group, message.text),
            Severity::Warning => log::debug!("[{}] warning: {}", message.group, message.text),
            Severity::Message => log::trace!("[{}] {}", message.group, message.text),
        }
        self.lock().push(message);
    }

    fn clear_group(&self, group: &str) {
        self.lock().retain(|m| m.group != group);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_group_keeps_other_groups() {
        let log = MessageLog::new();
        log.add(Message::new(Severity::Error, "A", "broken"));
        log.add(Message::new(Severity::Message, "B", "fine"));
        assert!(log.has_errors("A"));

        log.clear_group("A");
        assert!(!log.has_errors("A"));
        assert_eq!(log.messages().len(), 1);
        assert_eq!(log.group("B")[0].text, "fine");
    }
}
