//! Rolling alert feed shown in the status bar.

use crate::ledger::AlertLevel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const ALERT_FEED_CAPACITY: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id:        String,
    pub level:     AlertLevel,
    pub message:   String,
    pub raised_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlertFeed {
    alerts: VecDeque<Alert>,
}

impl AlertFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an alert, dropping the oldest once the feed is full.
    pub fn raise(&mut self, level: AlertLevel, message: impl Into<String>) {
        let message = message.into();
        log::debug!("alert {level:?}: {message}");
        self.alerts.push_back(Alert {
            id: uuid::Uuid::new_v4().to_string(),
            level,
            message,
            raised_at: Utc::now(),
        });
        while self.alerts.len() > ALERT_FEED_CAPACITY {
            self.alerts.pop_front();
        }
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter()
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
