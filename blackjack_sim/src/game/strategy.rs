//! Static basic strategy tables and the bid ladder used by every simulated player.
//! The tables are keyed first by the hand total, then by the value of the dealer's up-card (2 through 11).

use crate::game::error::BlackjackGameError;
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::ops::RangeInclusive;

/// An action a player can take on a hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Stand,
    Hit,
    Double,
    Split,
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Action::Stand => "stand",
            Action::Hit => "hit",
            Action::Double => "double down",
            Action::Split => "split",
        };
        write!(f, "{}", name)
    }
}

/// The actions offered to a player at a single decision point. Standing and hitting are always
/// offered, doubling and splitting only when the table allows them for the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AvailableActions {
    double: bool,
    split: bool,
}

impl AvailableActions {
    /// Only stand and hit.
    pub fn new() -> AvailableActions {
        AvailableActions::default()
    }

    pub fn with_double(mut self) -> AvailableActions {
        self.double = true;
        self
    }

    pub fn with_split(mut self) -> AvailableActions {
        self.split = true;
        self
    }

    pub fn contains(&self, action: Action) -> bool {
        match action {
            Action::Stand | Action::Hit => true,
            Action::Double => self.double,
            Action::Split => self.split,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyTable {
    Hard,
    Soft,
    Pairs,
}

impl StrategyTable {
    pub const ALL: [StrategyTable; 3] =
        [StrategyTable::Hard, StrategyTable::Soft, StrategyTable::Pairs];

    /// The hand totals the table holds rows for.
    pub fn totals(&self) -> RangeInclusive<u8> {
        match self {
            StrategyTable::Hard => 4..=21,
            StrategyTable::Soft => 2..=10,
            StrategyTable::Pairs => 2..=11,
        }
    }

    fn rows(&self) -> &'static HashMap<u8, HashMap<u8, Action>> {
        match self {
            StrategyTable::Hard => &HARD_TOTALS,
            StrategyTable::Soft => &SOFT_TOTALS,
            StrategyTable::Pairs => &PAIR_TOTALS,
        }
    }
}

impl Display for StrategyTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StrategyTable::Hard => "hard",
            StrategyTable::Soft => "soft",
            StrategyTable::Pairs => "pairs",
        };
        write!(f, "{}", name)
    }
}

/// Values the dealer's up-card can take, an ace counts as 11.
pub const UP_CARDS: RangeInclusive<u8> = 2..=11;

const S: Action = Action::Stand;
const H: Action = Action::Hit;
const D: Action = Action::Double;
const P: Action = Action::Split;

// Columns are the dealer up-card: 2 3 4 5 6 7 8 9 10 A
// Row 4 is only reached by a pair of twos that cannot be split.
const HARD_ROWS: [(u8, [Action; 10]); 18] = [
    (4, [H, H, H, H, H, H, H, H, H, H]),
    (5, [H, H, H, H, H, H, H, H, H, H]),
    (6, [H, H, H, H, H, H, H, H, H, H]),
    (7, [H, H, H, H, H, H, H, H, H, H]),
    (8, [H, H, H, H, H, H, H, H, H, H]),
    (9, [H, D, D, D, D, H, H, H, H, H]),
    (10, [D, D, D, D, D, D, D, D, H, H]),
    (11, [D, D, D, D, D, D, D, D, D, H]),
    (12, [H, H, S, S, S, H, H, H, H, H]),
    (13, [S, S, S, S, S, H, H, H, H, H]),
    (14, [S, S, S, S, S, H, H, H, H, H]),
    (15, [S, S, S, S, S, H, H, H, H, H]),
    (16, [S, S, S, S, S, H, H, H, H, H]),
    (17, [S, S, S, S, S, S, S, S, S, S]),
    (18, [S, S, S, S, S, S, S, S, S, S]),
    (19, [S, S, S, S, S, S, S, S, S, S]),
    (20, [S, S, S, S, S, S, S, S, S, S]),
    (21, [S, S, S, S, S, S, S, S, S, S]),
];

// Rows are the value of the card held next to the ace.
const SOFT_ROWS: [(u8, [Action; 10]); 9] = [
    (2, [H, H, H, D, D, H, H, H, H, H]),
    (3, [H, H, H, D, D, H, H, H, H, H]),
    (4, [H, H, D, D, D, H, H, H, H, H]),
    (5, [H, H, D, D, D, H, H, H, H, H]),
    (6, [H, D, D, D, D, H, H, H, H, H]),
    (7, [S, D, D, D, D, S, S, H, H, H]),
    (8, [S, S, S, S, S, S, S, S, S, S]),
    (9, [S, S, S, S, S, S, S, S, S, S]),
    (10, [S, S, S, S, S, S, S, S, S, S]),
];

// Rows are the value of the paired card, aces are 11.
const PAIR_ROWS: [(u8, [Action; 10]); 10] = [
    (2, [P, P, P, P, P, P, H, H, H, H]),
    (3, [P, P, P, P, P, P, H, H, H, H]),
    (4, [H, H, H, P, P, H, H, H, H, H]),
    (5, [D, D, D, D, D, D, D, D, H, H]),
    (6, [P, P, P, P, P, H, H, H, H, H]),
    (7, [P, P, P, P, P, P, H, H, H, H]),
    (8, [P, P, P, P, P, P, P, P, P, P]),
    (9, [P, P, P, P, P, S, P, P, S, S]),
    (10, [S, S, S, S, S, S, S, S, S, S]),
    (11, [P, P, P, P, P, P, P, P, P, P]),
];

fn build_lookup_table(rows: &[(u8, [Action; 10])]) -> HashMap<u8, HashMap<u8, Action>> {
    rows.iter()
        .map(|(total, actions)| {
            let row = UP_CARDS
                .zip(actions.iter().copied())
                .collect::<HashMap<u8, Action>>();
            (*total, row)
        })
        .collect()
}

lazy_static! {
    static ref HARD_TOTALS: HashMap<u8, HashMap<u8, Action>> = build_lookup_table(&HARD_ROWS);
    static ref SOFT_TOTALS: HashMap<u8, HashMap<u8, Action>> = build_lookup_table(&SOFT_ROWS);
    static ref PAIR_TOTALS: HashMap<u8, HashMap<u8, Action>> = build_lookup_table(&PAIR_ROWS);
}

/// Looks up the action for `total` against the dealer's `up_card` in `table`.
pub fn lookup(table: StrategyTable, total: u8, up_card: u8) -> Result<Action, BlackjackGameError> {
    table
        .rows()
        .get(&total)
        .and_then(|row| row.get(&up_card))
        .copied()
        .ok_or(BlackjackGameError::StrategyLookup {
            table,
            total,
            up_card,
        })
}

/// Checks that every table has an entry for each of its totals against every up-card.
pub fn validate_tables() -> Result<(), BlackjackGameError> {
    for table in StrategyTable::ALL {
        for total in table.totals() {
            for up_card in UP_CARDS {
                lookup(table, total, up_card)?;
            }
        }
    }
    Ok(())
}

/// Parameters of the progressive betting scheme. After a net loss the bid is multiplied by
/// `bid_multiplier`, never going past `original_bid * bid_multiplier ^ bid_pow_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BidLadder {
    pub original_bid: f64,
    pub bid_multiplier: f64,
    pub bid_pow_limit: i32,
}

impl BidLadder {
    pub fn new(original_bid: f64, bid_multiplier: f64, bid_pow_limit: i32) -> BidLadder {
        BidLadder {
            original_bid,
            bid_multiplier,
            bid_pow_limit,
        }
    }

    pub fn limit(&self) -> f64 {
        self.original_bid * self.bid_multiplier.powi(self.bid_pow_limit)
    }

    /// Computes the next bid from the last one and the running result since it was placed.
    pub fn next_bid(&self, last_bid: f64, lost_balance: f64) -> f64 {
        if lost_balance < 0.0 {
            let next_bid = last_bid * self.bid_multiplier;
            if next_bid <= self.limit() {
                next_bid
            } else {
                last_bid
            }
        } else if lost_balance == 0.0 {
            last_bid
        } else {
            self.original_bid
        }
    }

    /// Short description used to label simulation output.
    pub fn label(&self) -> String {
        format!(
            "ladder {}x{}^{}",
            self.original_bid, self.bid_multiplier, self.bid_pow_limit
        )
    }
}

impl Default for BidLadder {
    fn default() -> Self {
        BidLadder::new(1.0, 2.0, 5)
    }
}
