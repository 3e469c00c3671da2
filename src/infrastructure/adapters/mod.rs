//! Presentation adapters

pub mod console;

pub use console::{HistoryNavigator, Notice, NoticeQueue};
