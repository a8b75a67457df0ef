//! The dealer drives a full round for every seated player: bids, the deal, each player's turn,
//! the dealer's own hand and the payouts. Balances live outside the dealer and are injected as a
//! shared handle, so several tables may settle against the same map.

use crate::game::error::BlackjackGameError;
use crate::game::hand::{Hand, HandStatus, Reason};
use crate::game::player::{PlayerSim, PlayerStatus};
use crate::game::strategy::{Action, AvailableActions};
use blackjack_lib::{Card, Deck};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::iter::FromIterator;
use std::rc::Rc;

/// Mapping from player id to that player's balance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Balances {
    inner: HashMap<String, f64>,
}

pub type SharedBalances = Rc<RefCell<Balances>>;

impl Balances {
    pub fn new() -> Balances {
        Balances::default()
    }

    pub fn get(&self, player_id: &str) -> Option<f64> {
        self.inner.get(player_id).copied()
    }

    pub fn set<S: Into<String>>(&mut self, player_id: S, amount: f64) {
        self.inner.insert(player_id.into(), amount);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.inner.iter()
    }

    /// True if any player still has money left.
    pub fn any_positive(&self) -> bool {
        self.inner.values().any(|&balance| balance > 0.0)
    }

    pub fn shared(self) -> SharedBalances {
        Rc::new(RefCell::new(self))
    }
}

impl FromIterator<(String, f64)> for Balances {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Balances {
            inner: iter.into_iter().collect(),
        }
    }
}

/// Which two-card hands may be doubled down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DoublePolicy {
    /// Soft hands whose high total is between 8 and 11.
    #[default]
    SoftEightToEleven,
    /// Hard hands totalling 9, 10 or 11.
    HardNineToEleven,
    AnyTwoCards,
}

impl DoublePolicy {
    pub fn allows(&self, hand: &Hand) -> bool {
        let high = hand.score().high;
        match self {
            DoublePolicy::SoftEightToEleven => hand.is_soft() && (8..=11).contains(&high),
            DoublePolicy::HardNineToEleven => !hand.is_soft() && (9..=11).contains(&high),
            DoublePolicy::AnyTwoCards => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableRules {
    pub min_bet: f64,
    pub max_bet: f64,
    /// The deck is reshuffled once fewer than this percentage of its cards remain.
    pub shuffle_perc: f64,
    pub double_policy: DoublePolicy,
}

impl Default for TableRules {
    fn default() -> Self {
        TableRules {
            min_bet: 1.0,
            max_bet: 100.0,
            shuffle_perc: 50.0,
            double_policy: DoublePolicy::default(),
        }
    }
}

/// Tally of the hands settled in a round. `winnings` is the players' net profit.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RoundLog {
    pub wins: i32,
    pub pushes: i32,
    pub losses: i32,
    pub player_blackjacks: i32,
    pub winnings: f64,
}

impl RoundLog {
    pub fn merge(&mut self, other: &RoundLog) {
        self.wins += other.wins;
        self.pushes += other.pushes;
        self.losses += other.losses;
        self.player_blackjacks += other.player_blackjacks;
        self.winnings += other.winnings;
    }
}

pub struct Dealer<D: Deck> {
    deck: D,
    deck_starting_length: usize,
    rules: TableRules,
    balances: SharedBalances,
    players: Vec<PlayerSim>,
    bids: HashMap<String, Vec<f64>>,
    hand: Hand,
    reshuffles: u32,
}

impl<D: Deck> Dealer<D> {
    pub fn new(deck: D, balances: SharedBalances, rules: TableRules) -> Dealer<D> {
        let deck_starting_length = deck.len();
        Dealer {
            deck,
            deck_starting_length,
            rules,
            balances,
            players: vec![],
            bids: HashMap::new(),
            hand: Hand::new(),
            reshuffles: 0,
        }
    }

    pub fn add_player(&mut self, player: PlayerSim) {
        self.players.push(player);
    }

    pub fn players(&self) -> &[PlayerSim] {
        &self.players
    }

    pub fn player(&self, player_id: &str) -> Option<&PlayerSim> {
        self.players.iter().find(|p| p.id() == player_id)
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn balances(&self) -> SharedBalances {
        Rc::clone(&self.balances)
    }

    /// The dealer's hand of the current (or last) round.
    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub fn deck(&self) -> &D {
        &self.deck
    }

    /// Number of times the deck has been reshuffled by this dealer.
    pub fn reshuffles(&self) -> u32 {
        self.reshuffles
    }

    /// Getter method for the dealers face up card.
    pub fn dealers_face_up_card(&self) -> Option<&Card> {
        self.hand.cards().first()
    }

    /// Draws the top card. Reshuffles the deck as soon as its length falls under `shuffle_perc`
    /// percent of the starting length.
    pub fn draw_card(&mut self) -> Result<Card, BlackjackGameError> {
        let card = self.deck.draw()?;

        let shuffle_limit = self.rules.shuffle_perc * (self.deck_starting_length as f64) / 100.0;
        if (self.deck.len() as f64) < shuffle_limit {
            debug!(
                "reshuffling with {} of {} cards left",
                self.deck.len(),
                self.deck_starting_length
            );
            self.deck.reset();
            self.reshuffles += 1;
        }

        Ok(card)
    }

    pub fn get_balance(&self, player_id: &str) -> Result<f64, BlackjackGameError> {
        match self.balances.borrow().get(player_id) {
            Some(balance) if !balance.is_nan() && balance >= 0.0 => Ok(balance),
            _ => Err(BlackjackGameError::InvalidBalance(player_id.to_string())),
        }
    }

    pub fn set_balance(&mut self, player_id: &str, amount: f64) {
        self.balances.borrow_mut().set(player_id, amount);
    }

    /// Moves `amount` from the player's balance onto the wager of hand `hand_index`.
    pub fn bid(
        &mut self,
        player_id: &str,
        hand_index: usize,
        amount: f64,
    ) -> Result<(), BlackjackGameError> {
        let balance = self.get_balance(player_id)?;
        if balance < amount {
            return Err(BlackjackGameError::InsufficientFunds { balance, amount });
        }

        self.set_balance(player_id, balance - amount);
        let bids = self.bids.entry(player_id.to_string()).or_default();
        if bids.len() <= hand_index {
            bids.resize(hand_index + 1, 0.0);
        }
        bids[hand_index] += amount;
        Ok(())
    }

    pub fn get_bid_amount(&self, player_id: &str, hand_index: usize) -> f64 {
        self.bids
            .get(player_id)
            .and_then(|bids| bids.get(hand_index))
            .copied()
            .unwrap_or(0.0)
    }

    /// True when the player's balance covers a second wager equal to the one on `hand_index`.
    pub fn can_double(&self, player_id: &str, hand_index: usize) -> Result<bool, BlackjackGameError> {
        Ok(self.get_balance(player_id)? >= self.get_bid_amount(player_id, hand_index))
    }

    pub fn bid_double(&mut self, player_id: &str, hand_index: usize) -> Result<(), BlackjackGameError> {
        let amount = self.get_bid_amount(player_id, hand_index);
        self.bid(player_id, hand_index, amount)
    }

    fn credit(&mut self, player_id: &str, amount: f64) -> Result<(), BlackjackGameError> {
        let balance = self.get_balance(player_id)?;
        self.set_balance(player_id, balance + amount);
        Ok(())
    }

    fn player_at(&self, player_index: usize) -> Result<&PlayerSim, BlackjackGameError> {
        self.players
            .get(player_index)
            .ok_or_else(|| BlackjackGameError::NoActiveHand(format!("#{}", player_index)))
    }

    fn player_at_mut(&mut self, player_index: usize) -> Result<&mut PlayerSim, BlackjackGameError> {
        self.players
            .get_mut(player_index)
            .ok_or_else(|| BlackjackGameError::NoActiveHand(format!("#{}", player_index)))
    }

    pub fn player_hand_lose(
        &mut self,
        player_index: usize,
        hand_index: usize,
        reason: Reason,
    ) -> Result<(), BlackjackGameError> {
        let player_id = self.player_at(player_index)?.id().to_string();
        let amount_lost = self.get_bid_amount(&player_id, hand_index);
        let player = self.player_at_mut(player_index)?;
        player.hand_mut(hand_index)?.lose(reason)?;
        player.loss(amount_lost);
        Ok(())
    }

    pub fn player_hand_draw(
        &mut self,
        player_index: usize,
        hand_index: usize,
        reason: Option<Reason>,
    ) -> Result<(), BlackjackGameError> {
        let player_id = self.player_at(player_index)?.id().to_string();
        let bid_amount = self.get_bid_amount(&player_id, hand_index);
        self.player_at_mut(player_index)?
            .hand_mut(hand_index)?
            .push(reason)?;
        self.credit(&player_id, bid_amount)?;
        self.player_at_mut(player_index)?.draw();
        Ok(())
    }

    pub fn player_hand_won(
        &mut self,
        player_index: usize,
        hand_index: usize,
        reason: Reason,
    ) -> Result<(), BlackjackGameError> {
        let player_id = self.player_at(player_index)?.id().to_string();
        let bid_amount = self.get_bid_amount(&player_id, hand_index);
        let amount_won = if reason == Reason::Blackjack {
            bid_amount + bid_amount * 1.5
        } else {
            bid_amount + bid_amount
        };
        self.player_at_mut(player_index)?
            .hand_mut(hand_index)?
            .won(reason)?;
        self.credit(&player_id, amount_won)?;
        self.player_at_mut(player_index)?.win(amount_won);
        Ok(())
    }

    /// Plays a complete round with every player that is not disabled.
    pub fn play_round(&mut self) -> Result<RoundLog, BlackjackGameError> {
        self.reset();

        let seated = (0..self.players.len())
            .filter(|&i| self.players[i].status() != PlayerStatus::Disabled)
            .collect::<Vec<usize>>();
        if seated.is_empty() {
            info!("no players available");
            return Ok(RoundLog::default());
        }

        // Bids
        let mut active = vec![];
        for i in seated {
            let player_id = self.players[i].id().to_string();
            let balance = self.get_balance(&player_id)?;
            let mut amount = self.players[i].bid(balance);

            if amount < self.rules.min_bet {
                info!("player \"{}\" is out", player_id);
                self.players[i].set_status(PlayerStatus::Disabled);
                continue;
            }
            // The ladder carries on from the capped bid.
            if amount > self.rules.max_bet {
                debug!(
                    "player \"{}\" bid {:.2} capped at the table maximum {:.2}",
                    player_id, amount, self.rules.max_bet
                );
                amount = self.rules.max_bet;
                self.players[i].last_bid = amount;
            }

            self.bid(&player_id, 0, amount)?;
            active.push(i);
        }
        if active.is_empty() {
            return Ok(RoundLog::default());
        }

        // Deal two cards to every player and the dealer, the dealer's first card is face up
        for _ in 0..2 {
            for &i in &active {
                let card = self.draw_card()?;
                self.players[i].add_card(card)?;
            }
            let card = self.draw_card()?;
            self.hand.add_card(card)?;
        }

        let up_card = self
            .dealers_face_up_card()
            .map(|card| card.absolute_value())
            .ok_or_else(|| BlackjackGameError::NoActiveHand("dealer".to_string()))?;

        for &i in &active {
            self.play_turn(i, up_card)?;
        }

        self.finish_round(&active)?;

        let log = self.round_log(&active);
        debug!("dealer finished with {}, {:?}", self.hand, log);
        Ok(log)
    }

    /// Runs the decision loop of a single player until none of their hands is being played.
    fn play_turn(&mut self, i: usize, up_card: u8) -> Result<(), BlackjackGameError> {
        self.players[i].set_status(PlayerStatus::Playing);

        let natural = self.players[i]
            .hands()
            .first()
            .map_or(false, |hand| hand.is_blackjack());
        if natural {
            self.players[i].set_status(PlayerStatus::Waiting);
            return Ok(());
        }

        while self.players[i].status() == PlayerStatus::Playing {
            let actions = self.available_actions(i)?;
            let acting = self.players[i].current_hand_index();
            let action = self.players[i].play(up_card, &actions)?;
            self.play_option(i, action)?;

            if self.players[i].hands()[acting].score().high > 21 {
                self.players[i].hand_mut(acting)?.lose(Reason::Bust)?;
                self.next_hand(i)?;
            }

            if self.players[i].is_done() {
                let player = &self.players[i];
                let loss_amount: f64 = player
                    .hands()
                    .iter()
                    .enumerate()
                    .filter(|(_, hand)| hand.status() == HandStatus::Lose)
                    .map(|(index, _)| self.get_bid_amount(player.id(), index))
                    .sum();

                if loss_amount > 0.0 {
                    self.players[i].loss(loss_amount);
                }
                self.players[i].set_status(PlayerStatus::Waiting);
            }
        }

        Ok(())
    }

    /// Builds the set of actions the player may choose from for their current hand.
    fn available_actions(&self, i: usize) -> Result<AvailableActions, BlackjackGameError> {
        let player = &self.players[i];
        let hand = player
            .current_hand()
            .ok_or_else(|| BlackjackGameError::NoActiveHand(player.id().to_string()))?;

        let mut actions = AvailableActions::new();
        if hand.num_of_cards() != 2 {
            return Ok(actions);
        }

        let covered = self.can_double(player.id(), player.current_hand_index())?;
        if covered && hand.has_pairs() && player.hands().len() == 1 {
            actions = actions.with_split();
        }
        if covered && self.rules.double_policy.allows(hand) {
            actions = actions.with_double();
        }
        Ok(actions)
    }

    /// Carries out the action the player chose on their current hand.
    fn play_option(&mut self, i: usize, action: Action) -> Result<(), BlackjackGameError> {
        let player_id = self.players[i].id().to_string();
        match action {
            Action::Stand => {
                self.players[i].current_hand_mut()?.stand()?;
                self.next_hand(i)
            }
            Action::Hit => {
                let card = self.draw_card()?;
                self.players[i].current_hand_mut()?.add_card(card)
            }
            Action::Split => {
                let hand_index = self.players[i].current_hand_index();
                self.players[i].split()?;
                let amount = self.get_bid_amount(&player_id, hand_index);
                self.bid(&player_id, hand_index + 1, amount)?;
                let card = self.draw_card()?;
                self.players[i].current_hand_mut()?.add_card(card)
            }
            Action::Double => {
                let hand_index = self.players[i].current_hand_index();
                self.bid_double(&player_id, hand_index)?;
                let card = self.draw_card()?;
                let hand = self.players[i].current_hand_mut()?;
                hand.add_card(card)?;
                hand.stand()?;
                self.next_hand(i)
            }
        }
    }

    /// Moves the player on to their second hand if there is one, dealing the split hand its second card.
    fn next_hand(&mut self, i: usize) -> Result<(), BlackjackGameError> {
        if !self.players[i].has_second_hand() {
            return Ok(());
        }
        self.players[i].select_second_hand()?;
        let needs_card = self.players[i]
            .current_hand()
            .map_or(false, |hand| hand.num_of_cards() == 1);
        if needs_card {
            let card = self.draw_card()?;
            self.players[i].current_hand_mut()?.add_card(card)?;
        }
        Ok(())
    }

    /// Every hand of the active players that is still waiting on the dealer.
    fn waiting_hands(&self, active: &[usize]) -> Vec<(usize, usize)> {
        active
            .iter()
            .filter(|&&i| self.players[i].status() == PlayerStatus::Waiting)
            .flat_map(|&i| {
                self.players[i]
                    .hands()
                    .iter()
                    .enumerate()
                    .filter(|(_, hand)| hand.status() == HandStatus::Waiting)
                    .map(move |(h, _)| (i, h))
            })
            .collect()
    }

    /// Plays out the dealer's hand and settles every hand still waiting.
    fn finish_round(&mut self, active: &[usize]) -> Result<(), BlackjackGameError> {
        let mut dealer_score = self.hand.score().high;

        if dealer_score == 21 {
            for (i, h) in self.waiting_hands(active) {
                self.player_hand_lose(i, h, Reason::DealerWon)?;
            }
            return Ok(());
        }

        for (i, h) in self.waiting_hands(active) {
            if self.players[i].hands()[h].is_blackjack() {
                self.player_hand_won(i, h, Reason::Blackjack)?;
            }
        }

        while dealer_score < 17 {
            let card = self.draw_card()?;
            self.hand.add_card(card)?;
            dealer_score = self.hand.score().high;
        }

        if dealer_score > 21 {
            self.hand.lose(Reason::Bust)?;
            for (i, h) in self.waiting_hands(active) {
                self.player_hand_won(i, h, Reason::DealerBust)?;
            }
            return Ok(());
        }

        for (i, h) in self.waiting_hands(active) {
            let player_score = self.players[i].hands()[h].score().high;
            if dealer_score > player_score {
                self.player_hand_lose(i, h, Reason::DealerWon)?;
            } else if dealer_score < player_score {
                self.player_hand_won(i, h, Reason::DealerLost)?;
            } else {
                self.player_hand_draw(i, h, None)?;
            }
        }
        Ok(())
    }

    fn round_log(&self, active: &[usize]) -> RoundLog {
        let mut log = RoundLog::default();
        for &i in active {
            let player = &self.players[i];
            for (h, hand) in player.hands().iter().enumerate() {
                let bid = self.get_bid_amount(player.id(), h);
                match hand.status() {
                    HandStatus::Won if hand.reason() == Some(Reason::Blackjack) => {
                        log.wins += 1;
                        log.player_blackjacks += 1;
                        log.winnings += bid * 1.5;
                    }
                    HandStatus::Won => {
                        log.wins += 1;
                        log.winnings += bid;
                    }
                    HandStatus::Lose => {
                        log.losses += 1;
                        log.winnings -= bid;
                    }
                    HandStatus::Draw => log.pushes += 1,
                    HandStatus::Waiting | HandStatus::Playing => {}
                }
            }
        }
        log
    }

    /// Clears the bids and every hand of the last round. Balances are left untouched.
    pub fn reset(&mut self) {
        self.bids.clear();
        self.hand = Hand::new();
        self.players.iter_mut().for_each(|player| player.clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::error::ErrorKind;
    use crate::game::strategy::BidLadder;
    use blackjack_lib::{Rank, StackedDeck};
    use Rank::*;

    fn balances_of(entries: &[(&str, f64)]) -> SharedBalances {
        entries
            .iter()
            .map(|&(id, balance)| (id.to_string(), balance))
            .collect::<Balances>()
            .shared()
    }

    fn table_with(ranks: &[Rank], balance: f64, rules: TableRules) -> Dealer<StackedDeck> {
        let deck = StackedDeck::from_ranks(ranks.iter().copied());
        let mut dealer = Dealer::new(deck, balances_of(&[("yo", balance)]), rules);
        dealer.add_player(PlayerSim::new("yo", BidLadder::default()));
        dealer
    }

    /// Rules that never reshuffle, so stacked decks are dealt exactly in order.
    fn no_shuffle() -> TableRules {
        TableRules {
            shuffle_perc: 0.0,
            ..TableRules::default()
        }
    }

    fn table(ranks: &[Rank]) -> Dealer<StackedDeck> {
        table_with(ranks, 100.0, no_shuffle())
    }

    #[test]
    fn test_new_dealer() {
        let dealer = table(&[Two, Three]);
        assert_eq!(dealer.get_balance("yo").unwrap(), 100.0);
        assert_eq!(dealer.players().len(), 1);
        assert!(dealer.player("yo").is_some());
        assert!(dealer.dealers_face_up_card().is_none());
        assert_eq!(dealer.deck().len(), 2);
    }

    #[test]
    fn test_draw_card() {
        let mut dealer = table(&[Two, Three]);
        assert_eq!(dealer.draw_card().unwrap().rank, Two);
        assert_eq!(dealer.deck().len(), 1);
        assert_eq!(dealer.draw_card().unwrap().rank, Three);
        assert_eq!(
            dealer.draw_card().unwrap_err().kind(),
            ErrorKind::Deck
        );
    }

    #[test]
    fn test_reshuffle_under_threshold() {
        let rules = TableRules {
            shuffle_perc: 50.0,
            ..TableRules::default()
        };
        let mut dealer = table_with(&[Two; 10], 100.0, rules);
        for _ in 0..5 {
            dealer.draw_card().unwrap();
        }
        assert_eq!(dealer.deck().len(), 5);
        assert_eq!(dealer.reshuffles(), 0);

        dealer.draw_card().unwrap();
        assert_eq!(dealer.deck().len(), 10);
        assert_eq!(dealer.reshuffles(), 1);
    }

    #[test]
    fn test_bid() {
        let mut dealer = table(&[]);
        dealer.bid("yo", 0, 25.0).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 75.0);
        assert_eq!(dealer.get_bid_amount("yo", 0), 25.0);
        assert_eq!(dealer.get_bid_amount("yo", 1), 0.0);
        assert_eq!(dealer.get_bid_amount("other", 0), 0.0);

        let err = dealer.bid("yo", 0, 80.0).unwrap_err();
        assert_eq!(
            err,
            BlackjackGameError::InsufficientFunds {
                balance: 75.0,
                amount: 80.0
            }
        );
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(dealer.get_balance("yo").unwrap(), 75.0);
    }

    #[test]
    fn test_double() {
        let mut dealer = table(&[]);
        dealer.bid("yo", 0, 50.0).unwrap();
        assert!(dealer.can_double("yo", 0).unwrap());
        dealer.bid_double("yo", 0).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 0.0);
        assert_eq!(dealer.get_bid_amount("yo", 0), 100.0);
        assert!(!dealer.can_double("yo", 0).unwrap());
        assert!(dealer.bid_double("yo", 0).is_err());
    }

    #[test]
    fn test_invalid_balance() {
        let mut dealer = table(&[]);
        dealer.set_balance("yo", f64::NAN);
        assert_eq!(
            dealer.get_balance("yo").unwrap_err(),
            BlackjackGameError::InvalidBalance("yo".to_string())
        );
        dealer.set_balance("yo", -1.0);
        assert!(dealer.get_balance("yo").is_err());
        assert!(dealer.get_balance("nobody").is_err());
        assert!(dealer.bid("nobody", 0, 1.0).is_err());
    }

    #[test]
    fn test_player_hand_won() {
        let mut dealer = table(&[Ten, Nine]);
        dealer.bid("yo", 0, 100.0).unwrap();
        for _ in 0..2 {
            let card = dealer.draw_card().unwrap();
            dealer.players[0].add_card(card).unwrap();
        }
        dealer.player_hand_won(0, 0, Reason::DealerLost).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 200.0);
        assert_eq!(dealer.players()[0].lost_balance, 200.0);

        let hand = &dealer.players()[0].hands()[0];
        assert_eq!(hand.status(), HandStatus::Won);
        assert!(dealer.player_hand_lose(0, 0, Reason::Bust).is_err());
    }

    #[test]
    fn test_player_hand_won_blackjack() {
        let mut dealer = table(&[Ace, Ten]);
        dealer.bid("yo", 0, 100.0).unwrap();
        for _ in 0..2 {
            let card = dealer.draw_card().unwrap();
            dealer.players[0].add_card(card).unwrap();
        }
        dealer.player_hand_won(0, 0, Reason::Blackjack).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 250.0);
    }

    #[test]
    fn test_player_hand_draw_and_lose() {
        let mut dealer = table(&[Ten, Nine]);
        dealer.bid("yo", 0, 10.0).unwrap();
        let card = dealer.draw_card().unwrap();
        dealer.players[0].add_card(card).unwrap();
        dealer.players[0].lost_balance = 4.0;
        dealer.player_hand_draw(0, 0, None).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 100.0);
        assert_eq!(dealer.players()[0].lost_balance, 0.0);

        dealer.reset();
        dealer.bid("yo", 0, 10.0).unwrap();
        let card = dealer.draw_card().unwrap();
        dealer.players[0].add_card(card).unwrap();
        dealer.player_hand_lose(0, 0, Reason::DealerWon).unwrap();
        assert_eq!(dealer.get_balance("yo").unwrap(), 90.0);
        assert_eq!(dealer.players()[0].lost_balance, -10.0);
    }

    #[test]
    fn test_round_player_wins() {
        let mut dealer = table(&[Ten, Ten, Nine, Seven]);
        let log = dealer.play_round().unwrap();

        assert_eq!(dealer.get_balance("yo").unwrap(), 101.0);
        assert_eq!(
            log,
            RoundLog {
                wins: 1,
                winnings: 1.0,
                ..RoundLog::default()
            }
        );
        let player = dealer.player("yo").unwrap();
        assert_eq!(player.status(), PlayerStatus::Waiting);
        assert_eq!(player.hands()[0].reason(), Some(Reason::DealerLost));
        assert_eq!(player.lost_balance, 2.0);
        assert_eq!(dealer.hand().score().high, 17);
    }

    #[test]
    fn test_round_dealer_blackjack_then_bid_doubles() {
        let mut dealer = table(&[Ten, Ace, Nine, Ten, Ten, Ten, Nine, Seven]);
        let log = dealer.play_round().unwrap();
        assert_eq!(log.losses, 1);
        assert_eq!(log.winnings, -1.0);
        assert_eq!(dealer.get_balance("yo").unwrap(), 99.0);
        let player = dealer.player("yo").unwrap();
        assert_eq!(player.lost_balance, -1.0);
        assert_eq!(player.hands()[0].reason(), Some(Reason::DealerWon));

        let log = dealer.play_round().unwrap();
        assert_eq!(dealer.get_bid_amount("yo", 0), 2.0);
        assert_eq!(log.winnings, 2.0);
        assert_eq!(dealer.get_balance("yo").unwrap(), 101.0);
        assert_eq!(dealer.player("yo").unwrap().lost_balance, 3.0);
    }

    #[test]
    fn test_round_player_blackjack_pays_three_to_two() {
        let mut dealer = table(&[Ace, Ten, Ten, Six, Ten]);
        let log = dealer.play_round().unwrap();

        assert_eq!(dealer.get_balance("yo").unwrap(), 101.5);
        assert_eq!(log.player_blackjacks, 1);
        assert_eq!(log.winnings, 1.5);
        let hand = &dealer.player("yo").unwrap().hands()[0];
        assert_eq!(hand.status(), HandStatus::Won);
        assert_eq!(hand.reason(), Some(Reason::Blackjack));
        assert_eq!(dealer.hand().status(), HandStatus::Lose);
        assert_eq!(dealer.hand().reason(), Some(Reason::Bust));
    }

    #[test]
    fn test_round_dealer_21_beats_player_blackjack() {
        let mut dealer = table(&[Ace, Ace, Ten, Ten]);
        let log = dealer.play_round().unwrap();
        assert_eq!(log.losses, 1);
        assert_eq!(dealer.get_balance("yo").unwrap(), 99.0);
    }

    #[test]
    fn test_round_player_busts() {
        let mut dealer = table(&[Ten, Ten, Six, Seven, Ten]);
        let log = dealer.play_round().unwrap();

        assert_eq!(log.losses, 1);
        assert_eq!(dealer.get_balance("yo").unwrap(), 99.0);
        let player = dealer.player("yo").unwrap();
        assert_eq!(player.hands()[0].reason(), Some(Reason::Bust));
        assert_eq!(player.hands()[0].num_of_cards(), 3);
        assert_eq!(player.lost_balance, -1.0);
        // the dealer stands on 17 and draws nothing after a bust
        assert_eq!(dealer.hand().num_of_cards(), 2);
    }

    #[test]
    fn test_round_push() {
        let mut dealer = table(&[Ten, Ten, Eight, Eight]);
        dealer.players[0].lost_balance = 2.0;
        let log = dealer.play_round().unwrap();

        assert_eq!(log.pushes, 1);
        assert_eq!(log.winnings, 0.0);
        assert_eq!(dealer.get_balance("yo").unwrap(), 100.0);
        assert_eq!(dealer.player("yo").unwrap().lost_balance, 0.0);
    }

    #[test]
    fn test_round_split() {
        let mut dealer = table(&[Eight, Ten, Eight, Seven, Three, Ten, Nine]);
        let log = dealer.play_round().unwrap();

        let player = dealer.player("yo").unwrap();
        assert_eq!(player.hands().len(), 2);
        assert_eq!(player.hands()[0].score().high, 21);
        assert_eq!(player.hands()[0].status(), HandStatus::Won);
        assert_eq!(player.hands()[1].score().high, 17);
        assert_eq!(player.hands()[1].status(), HandStatus::Draw);
        assert_eq!(dealer.get_bid_amount("yo", 1), 1.0);
        assert_eq!(log.wins, 1);
        assert_eq!(log.pushes, 1);
        assert_eq!(dealer.get_balance("yo").unwrap(), 101.0);
    }

    #[test]
    fn test_split_needs_balance_for_second_wager() {
        let mut dealer = table_with(&[Eight, Ten, Eight, Seven, Two], 1.0, no_shuffle());
        dealer.play_round().unwrap();

        let player = dealer.player("yo").unwrap();
        assert_eq!(player.hands().len(), 1);
        assert_eq!(player.hands()[0].score().high, 18);
        assert_eq!(dealer.get_balance("yo").unwrap(), 2.0);
    }

    #[test]
    fn test_round_double_down() {
        let rules = TableRules {
            double_policy: DoublePolicy::HardNineToEleven,
            ..no_shuffle()
        };
        let mut dealer = table_with(&[Six, Ten, Five, Seven, Ten], 100.0, rules);
        let log = dealer.play_round().unwrap();

        assert_eq!(dealer.get_bid_amount("yo", 0), 2.0);
        assert_eq!(log.winnings, 2.0);
        assert_eq!(dealer.get_balance("yo").unwrap(), 102.0);
    }

    #[test]
    fn test_default_policy_hits_hard_eleven() {
        let mut dealer = table(&[Six, Ten, Five, Seven, Ten]);
        dealer.play_round().unwrap();

        assert_eq!(dealer.get_bid_amount("yo", 0), 1.0);
        assert_eq!(dealer.get_balance("yo").unwrap(), 101.0);
    }

    #[test]
    fn test_double_policy() {
        let mut hard = Hand::new();
        hard.add_card(Card::new(Six, blackjack_lib::Suit::Club)).unwrap();
        hard.add_card(Card::new(Four, blackjack_lib::Suit::Club)).unwrap();
        assert!(!DoublePolicy::SoftEightToEleven.allows(&hard));
        assert!(DoublePolicy::HardNineToEleven.allows(&hard));
        assert!(DoublePolicy::AnyTwoCards.allows(&hard));

        let mut soft = Hand::new();
        soft.add_card(Card::new(Ace, blackjack_lib::Suit::Club)).unwrap();
        soft.add_card(Card::new(Six, blackjack_lib::Suit::Club)).unwrap();
        assert!(!DoublePolicy::SoftEightToEleven.allows(&soft));
        assert!(!DoublePolicy::HardNineToEleven.allows(&soft));
    }

    #[test]
    fn test_broke_player_is_disabled() {
        let mut dealer = table_with(&[Ten, Ten, Nine, Seven], 0.0, no_shuffle());
        let log = dealer.play_round().unwrap();

        assert_eq!(log, RoundLog::default());
        assert_eq!(
            dealer.player("yo").unwrap().status(),
            PlayerStatus::Disabled
        );
        assert_eq!(dealer.deck().len(), 4);

        dealer.set_balance("yo", 50.0);
        dealer.play_round().unwrap();
        assert_eq!(
            dealer.player("yo").unwrap().status(),
            PlayerStatus::Disabled
        );
        assert_eq!(dealer.get_balance("yo").unwrap(), 50.0);
    }

    #[test]
    fn test_bid_is_capped_at_table_maximum() {
        let rules = TableRules {
            max_bet: 5.0,
            ..no_shuffle()
        };
        let deck = StackedDeck::from_ranks([Ten, Ten, Ten, Nine, Nine, Seven]);
        let balances = balances_of(&[("a", 100.0), ("b", 100.0)]);
        let mut dealer = Dealer::new(deck, Rc::clone(&balances), rules);
        dealer.add_player(PlayerSim::new("a", BidLadder::default()));
        dealer.add_player(PlayerSim::new("b", BidLadder::new(10.0, 2.0, 5)));

        let log = dealer.play_round().unwrap();
        assert_eq!(log.wins, 2);
        assert_eq!(dealer.get_bid_amount("a", 0), 1.0);
        assert_eq!(dealer.get_bid_amount("b", 0), 5.0);
        assert_eq!(dealer.player("b").unwrap().last_bid, 5.0);
        assert_eq!(balances.borrow().get("a"), Some(101.0));
        assert_eq!(balances.borrow().get("b"), Some(105.0));
    }

    #[test]
    fn test_all_in_pair_of_twos_hits() {
        let mut dealer = table_with(&[Two, Five, Two, Ten, Ten, Ten], 1.0, no_shuffle());
        let log = dealer.play_round().unwrap();

        let player = dealer.player("yo").unwrap();
        assert_eq!(player.hands().len(), 1);
        assert_eq!(player.hands()[0].score().high, 14);
        assert_eq!(log.wins, 1);
        assert_eq!(dealer.get_balance("yo").unwrap(), 2.0);
    }

    #[test]
    fn test_split_hand_dealt_another_two_hits() {
        let mut dealer = table(&[Two, Five, Two, Ten, Two, Ten, Nine, Eight, Ten]);
        let log = dealer.play_round().unwrap();

        let player = dealer.player("yo").unwrap();
        assert_eq!(player.hands().len(), 2);
        assert_eq!(player.hands()[0].score().high, 14);
        assert_eq!(player.hands()[1].score().high, 19);
        assert_eq!(log.wins, 2);
        assert_eq!(dealer.get_balance("yo").unwrap(), 102.0);
    }

    #[test]
    fn test_unknown_seat_is_an_error() {
        let mut dealer = table(&[]);
        let err = BlackjackGameError::NoActiveHand("#3".to_string());
        assert_eq!(dealer.player_hand_won(3, 0, Reason::DealerLost), Err(err.clone()));
        assert_eq!(dealer.player_hand_lose(3, 0, Reason::Bust), Err(err.clone()));
        assert_eq!(dealer.player_hand_draw(3, 0, None), Err(err));
        assert_eq!(dealer.get_balance("yo").unwrap(), 100.0);
    }

    #[test]
    fn test_players_are_dealt_in_seat_order() {
        let deck = StackedDeck::from_ranks([Ten, Nine, Ten, Nine, Ten, Seven]);
        let balances = balances_of(&[("a", 100.0), ("b", 100.0)]);
        let mut dealer = Dealer::new(deck, Rc::clone(&balances), no_shuffle());
        dealer.add_player(PlayerSim::new("a", BidLadder::default()));
        dealer.add_player(PlayerSim::new("b", BidLadder::default()));

        let log = dealer.play_round().unwrap();
        assert_eq!(log.wins, 2);

        let ranks = |id: &str| {
            dealer.player(id).unwrap().hands()[0]
                .cards()
                .iter()
                .map(|card| card.rank)
                .collect::<Vec<Rank>>()
        };
        assert_eq!(ranks("a"), vec![Ten, Nine]);
        assert_eq!(ranks("b"), vec![Nine, Ten]);
        assert_eq!(balances.borrow().get("a"), Some(101.0));
        assert_eq!(balances.borrow().get("b"), Some(101.0));
    }

    #[test]
    fn test_round_log_merge() {
        let mut total = RoundLog::default();
        total.merge(&RoundLog {
            wins: 2,
            losses: 1,
            winnings: 1.5,
            ..RoundLog::default()
        });
        total.merge(&RoundLog {
            pushes: 1,
            player_blackjacks: 1,
            winnings: -3.0,
            ..RoundLog::default()
        });
        assert_eq!(total.wins, 2);
        assert_eq!(total.pushes, 1);
        assert_eq!(total.losses, 1);
        assert_eq!(total.player_blackjacks, 1);
        assert_eq!(total.winnings, -1.5);
    }
}
