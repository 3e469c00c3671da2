//! Console presentation adapters: buffered notices and in-memory history

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::domain::traits::{Navigator, NoticeLevel, Notifier};

/// One transient notice
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Notifier that buffers notices until the presentation layer drains them
#[derive(Default)]
pub struct NoticeQueue {
    notices: Mutex<VecDeque<Notice>>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every buffered notice, oldest first
    pub fn drain(&self) -> Vec<Notice> {
        let mut notices = self.notices.lock().unwrap_or_else(|e| e.into_inner());
        notices.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.notices.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, level: NoticeLevel, message: &str) {
        match level {
            NoticeLevel::Error => tracing::debug!("notice [{}] {}", level, message),
            _ => tracing::trace!("notice [{}] {}", level, message),
        }
        self.notices
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Notice {
                level,
                message: message.to_string(),
            });
    }
}

/// Navigator backed by a history stack
pub struct HistoryNavigator {
    history: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new(start: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![start.into()]),
        }
    }

    /// Every path visited, oldest first
    pub fn history(&self) -> Vec<String> {
        self.history.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Go back one entry; the first entry is never popped
    pub fn back(&self) -> Option<String> {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.len() > 1 {
            history.pop();
            history.last().cloned()
        } else {
            None
        }
    }
}

impl Default for HistoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HistoryNavigator {
    fn current_path(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
            .unwrap_or_else(|| "/".to_string())
    }

    fn push(&self, path: &str) {
        let mut history = self.history.lock().unwrap_or_else(|e| e.into_inner());
        if history.last().map(String::as_str) != Some(path) {
            tracing::debug!("navigate -> {}", path);
            history.push(path.to_string());
        }
    }
}
