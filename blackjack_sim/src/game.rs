//! Module that focuses on the simulation of a single game of blackjack. In other words, this module
//! provides everything needed to play a table of simulated players round after round until the
//! round budget is spent or nobody can keep playing.

pub mod dealer;
pub mod error;
pub mod hand;
pub mod player;
pub mod strategy;

pub mod prelude {
    pub use super::BlackjackGameSim;
    pub use crate::game::dealer::{
        Balances, Dealer, DoublePolicy, RoundLog, SharedBalances, TableRules,
    };
    pub use crate::game::error::{BlackjackGameError, ErrorKind};
    pub use crate::game::hand::{Hand, HandStatus, Reason, Score};
    pub use crate::game::player::{PlayerSim, PlayerStatus};
    pub use crate::game::strategy::{self, Action, AvailableActions, BidLadder, StrategyTable};
    pub use std::io::{self, Write};
}

pub use prelude::*;

use blackjack_lib::Deck;
use log::{error, info};

/// Struct that runs a dealer for a number of rounds, keeping the totals needed to report on the
/// simulation afterwards.
pub struct BlackjackGameSim<D: Deck> {
    dealer: Dealer<D>,
    num_rounds: u32,
    pub rounds_played: u32,
    pub totals: RoundLog,
    pub ended_early: bool,
}

impl<D: Deck> BlackjackGameSim<D> {
    /// Associated method for building a new blackjack game.
    /// `dealer` is seated with the players before the game starts, `num_rounds` is the most rounds a
    /// single call to `self.run()` will play.
    pub fn new(dealer: Dealer<D>, num_rounds: u32) -> BlackjackGameSim<D> {
        BlackjackGameSim {
            dealer,
            num_rounds,
            rounds_played: 0,
            totals: RoundLog::default(),
            ended_early: false,
        }
    }

    pub fn dealer(&self) -> &Dealer<D> {
        &self.dealer
    }

    fn can_continue(&self) -> bool {
        let any_balance = self.dealer.balances().borrow().any_positive();
        let any_player = self
            .dealer
            .players()
            .iter()
            .any(|player| player.status() != PlayerStatus::Disabled);
        any_balance && any_player
    }

    /// Plays rounds until the budget runs out or no player can continue.
    pub fn run(&mut self) -> Result<(), BlackjackGameError> {
        for _ in 0..self.num_rounds {
            if !self.can_continue() {
                info!("all players are out after {} rounds", self.rounds_played);
                self.ended_early = true;
                break;
            }

            match self.dealer.play_round() {
                Ok(log) => {
                    self.totals.merge(&log);
                    self.rounds_played += 1;
                }
                Err(e) => {
                    error!("round {} aborted: {}", self.rounds_played + 1, e);
                    return Err(e);
                }
            }
        }

        if !self.ended_early {
            info!("round budget of {} exhausted", self.num_rounds);
        }
        Ok(())
    }

    /// Writes the stats currently recorded to `writer`.
    pub fn display_stats(&self, mut writer: impl Write) -> io::Result<()> {
        const WIDTH: usize = 80;
        const TEXT_WIDTH: usize = "number of player blackjacks:".len() + 20;
        const NUMERIC_WIDTH: usize = WIDTH - TEXT_WIDTH;

        writeln!(writer, "{:-^WIDTH$}", "stats")?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "rounds played:", self.rounds_played
        )?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total wins:", self.totals.wins
        )?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total pushes:", self.totals.pushes
        )?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "total losses:", self.totals.losses
        )?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$.2}",
            "total winnings:", self.totals.winnings
        )?;
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "number of player blackjacks:", self.totals.player_blackjacks
        )?;
        for player in self.dealer.players() {
            let balance = self.dealer.balances().borrow().get(player.id());
            writeln!(
                writer,
                "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$.2}",
                format!("{} final balance:", player.id()),
                balance.unwrap_or(f64::NAN)
            )?;
        }
        writeln!(
            writer,
            "{:<TEXT_WIDTH$}{:>NUMERIC_WIDTH$}",
            "ended early:", self.ended_early
        )?;
        writeln!(writer, "{}", "-".repeat(WIDTH))?;

        Ok(())
    }
}
