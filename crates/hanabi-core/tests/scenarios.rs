use hanabi_core::game::action::Action;
use hanabi_core::game::config::GameConfig;
use hanabi_core::game::engine::{Resolution, TurnEngine};
use hanabi_core::game::phase::{GamePhase, TerminationReason};
use hanabi_core::game::state::GameState;
use hanabi_core::model::card::Card;
use hanabi_core::model::color::Color;
use hanabi_core::model::deck::Deck;
use hanabi_core::model::player::PlayerId;

fn card(color: Color, number: u8) -> Card {
    Card::new(color, number)
}

#[test]
fn strikes_exhaust_and_keep_the_score() {
    // Player 0 is dealt R1 and G2, player 1 is dealt Y3 and B5, each in slot 0 first.
    let top = [
        card(Color::Red, 1),
        card(Color::Yellow, 3),
        card(Color::Green, 2),
        card(Color::Blue, 5),
    ];
    let state = GameState::deal(GameConfig::for_players(2), Deck::arranged(&top).unwrap()).unwrap();
    let mut engine = TurnEngine::new(state).with_recording();

    let result = engine.run(|_, _| Action::Play(0)).unwrap();

    assert_eq!(result.reason, TerminationReason::StrikesExhausted);
    assert_eq!(result.turns, 4);
    assert_eq!(result.score, 1);
    assert_eq!(result.strikes, 3);
    assert_eq!(result.misplays, 3);
    assert!(!result.won);
    assert_eq!(engine.state().stacks().height(Color::Red), 1);
    assert!(matches!(
        engine.turns()[3].resolution,
        Resolution::Misplayed { strikes: 3, .. }
    ));
}

#[test]
fn deck_exhaustion_grants_one_more_turn_per_player() {
    let state =
        GameState::deal(GameConfig::for_players(4), Deck::shuffled_with_seed(2024)).unwrap();
    let mut engine = TurnEngine::new(state).with_recording();

    let result = engine.run(|_, _| Action::Discard(0)).unwrap();

    assert_eq!(result.reason, TerminationReason::FinalRoundElapsed);
    assert_eq!(result.turns, 34 + 4);
    let turns = engine.turns();
    assert_eq!(turns[33].phase, GamePhase::FinalRound { turns_remaining: 4 });
    assert!(turns[33].drawn.is_some());
    for (offset, turn) in turns[34..].iter().enumerate() {
        assert_eq!(turn.drawn, None);
        if offset < 3 {
            assert_eq!(
                turn.phase,
                GamePhase::FinalRound {
                    turns_remaining: 3 - offset as u8
                }
            );
        }
    }
    let state = engine.state();
    assert!(state.deck().is_empty());
    assert_eq!(state.discards().len(), 38);
    for seat in PlayerId::seats(4) {
        assert_eq!(state.hand(seat).len(), 3);
    }
}

#[test]
fn playing_a_five_refills_a_hint_only_when_enabled() {
    // Player 0 holds R1..R5 in order; player 1 spends hints meanwhile.
    let top = [
        card(Color::Red, 1),
        card(Color::Yellow, 1),
        card(Color::Red, 2),
        card(Color::Yellow, 1),
        card(Color::Red, 3),
        card(Color::Yellow, 1),
        card(Color::Red, 4),
        card(Color::Green, 1),
        card(Color::Red, 5),
        card(Color::Green, 1),
    ];
    for (refill, expected_hints) in [(true, 5u8), (false, 4u8)] {
        let config = GameConfig::for_players(2).with_refill_hint_on_five(refill);
        let state = GameState::deal(config, Deck::arranged(&top).unwrap()).unwrap();
        let mut engine = TurnEngine::new(state);
        for _ in 0..4 {
            engine.step(Action::Play(0)).unwrap();
            engine.step(Action::Hint).unwrap();
        }
        assert_eq!(engine.state().tokens().hints(), 4);

        let record = engine.step(Action::Play(0)).unwrap();
        assert_eq!(
            record.resolution,
            Resolution::Played {
                card: card(Color::Red, 5),
                hint_restored: refill,
            }
        );
        assert_eq!(engine.state().tokens().hints(), expected_hints);
        assert!(engine.state().stacks().is_complete(Color::Red));
    }
}

#[test]
fn strike_out_takes_precedence_over_the_countdown() {
    let config = GameConfig::for_players(2).with_max_strikes(1);
    let state = GameState::deal(config, Deck::standard()).unwrap();
    let mut engine = TurnEngine::new(state);
    while !engine.state().deck().is_empty() {
        engine.step(Action::Discard(0)).unwrap();
    }
    assert!(matches!(engine.phase(), GamePhase::FinalRound { .. }));

    // Canonical order leaves only high white cards at the bottom of the deck.
    let misplay = (0..engine.state().hand(engine.state().current_player()).len())
        .find(|&slot| {
            let seat = engine.state().current_player();
            let card = engine.state().hand(seat).get(slot).unwrap();
            !engine.state().stacks().accepts(card)
        })
        .unwrap();
    engine.step(Action::Play(misplay)).unwrap();
    assert_eq!(
        engine.phase(),
        GamePhase::Terminated(TerminationReason::StrikesExhausted)
    );
}
