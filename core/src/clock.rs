//! Turn clock: owns the calendar, the turn phase, and the action budget.

use crate::types::Turn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An in-game calendar month.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct GameDate {
    pub year:  i32,
    pub month: u32,
}

impl GameDate {
    pub fn new(year: i32, month: u32) -> Self {
        debug_assert!((1..=12).contains(&month), "month out of range: {month}");
        Self { year, month }
    }

    /// The month after this one, rolling the year at month 13.
    pub fn next(self) -> Self {
        if self.month >= 12 {
            Self { year: self.year + 1, month: 1 }
        } else {
            Self { year: self.year, month: self.month + 1 }
        }
    }

    /// Months since year 0; orders dates and backs range filters.
    pub fn ordinal(self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month)
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl PartialOrd for GameDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for GameDate {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

/// Where the current turn stands.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Nothing pending; the player may advance.
    Idle,
    /// An event with choices waits for the player; settlement is deferred.
    AwaitingChoice,
    /// Settlement is running.
    Processing,
    /// Settlement finished; the monthly report is available.
    ReportReady,
}

impl TurnPhase {
    pub fn can_advance(self) -> bool {
        matches!(self, Self::Idle | Self::ReportReady)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Playing,
    GameOver,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TurnClock {
    pub current_date:      GameDate,
    pub report_date:       GameDate,
    pub turn:              Turn,
    pub phase:             TurnPhase,
    pub status:            GameStatus,
    pub available_actions: u32,
    pub used_actions:      u32,
}

impl TurnClock {
    pub fn new(start: GameDate, available_actions: u32) -> Self {
        Self {
            current_date: start,
            report_date: start,
            turn: 1,
            phase: TurnPhase::Idle,
            status: GameStatus::Playing,
            available_actions,
            used_actions: 0,
        }
    }

    /// Advance one month. Returns the month that just ended.
    /// Panics if the phase forbids advancing; callers check first.
    pub fn advance(&mut self) -> GameDate {
        assert!(self.phase.can_advance(), "advance() called in phase {:?}", self.phase);
        let ending = self.current_date;
        self.current_date = ending.next();
        self.report_date = ending;
        self.turn += 1;
        self.reset_actions();
        ending
    }

    /// Spend one action point. False when the budget is exhausted.
    pub fn use_action(&mut self) -> bool {
        if self.used_actions >= self.available_actions {
            return false;
        }
        self.used_actions += 1;
        true
    }

    pub fn reset_actions(&mut self) {
        self.used_actions = 0;
    }

    pub fn remaining_actions(&self) -> u32 {
        self.available_actions.saturating_sub(self.used_actions)
    }

    pub fn is_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn december_rolls_into_january() {
        assert_eq!(GameDate::new(2157, 12).next(), GameDate::new(2158, 1));
        assert_eq!(GameDate::new(2157, 3).next(), GameDate::new(2157, 4));
    }

    #[test]
    fn advance_records_the_ending_month_as_report_date() {
        let mut clock = TurnClock::new(GameDate::new(2157, 3), 3);
        let ending = clock.advance();
        assert_eq!(ending, GameDate::new(2157, 3));
        assert_eq!(clock.report_date, ending);
        assert_eq!(clock.current_date, GameDate::new(2157, 4));
        assert_eq!(clock.turn, 2);
    }

    #[test]
    fn action_budget_is_exhausted_then_reset() {
        let mut clock = TurnClock::new(GameDate::new(2157, 3), 2);
        assert!(clock.use_action());
        assert!(clock.use_action());
        assert!(!clock.use_action());
        assert_eq!(clock.remaining_actions(), 0);
        clock.advance();
        assert_eq!(clock.remaining_actions(), 2);
    }
}
