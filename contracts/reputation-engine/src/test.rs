#![cfg(test)]

use badge_registry::{BadgeRegistry, BadgeRegistryClient};
use p2p_shared::{Role, Tier};
use soroban_sdk::{
    testutils::{Address as _, Ledger},
    Address, BytesN, Env,
};

use crate::history::HistoryCursor;
use crate::{eligible_tier, Error, ReputationEngine, ReputationEngineClient, HISTORY_CAPACITY};

const LOCAL_CHAIN: u64 = 1;
const REMOTE_CHAIN: u64 = 7;

struct Setup {
    env: Env,
    engine: ReputationEngineClient<'static>,
    badges: BadgeRegistryClient<'static>,
    admin: Address,
    escrow: Address,
    relay: Address,
}

fn setup_test() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| li.timestamp = 10_000);

    let admin = Address::generate(&env);
    let escrow = Address::generate(&env);
    let relay = Address::generate(&env);

    let badges_id = env.register(BadgeRegistry, ());
    let badges = BadgeRegistryClient::new(&env, &badges_id);
    badges.initialize(&admin);

    let engine_id = env.register(ReputationEngine, ());
    let engine = ReputationEngineClient::new(&env, &engine_id);
    engine.initialize(&admin, &badges_id, &LOCAL_CHAIN);

    badges.grant_role(&admin, &Role::BadgeMinter, &engine_id);
    engine.grant_role(&admin, &Role::EscrowCaller, &escrow);
    engine.grant_role(&admin, &Role::CrossChainCaller, &relay);

    Setup {
        env,
        engine,
        badges,
        admin,
        escrow,
        relay,
    }
}

fn trade_id(env: &Env, n: u32) -> BytesN<32> {
    let mut bytes = [0u8; 32];
    bytes[..4].copy_from_slice(&n.to_be_bytes());
    BytesN::from_array(env, &bytes)
}

fn sync_id(env: &Env, n: u8) -> BytesN<32> {
    BytesN::from_array(env, &[n; 32])
}

/// Record `count` trades starting at id `first`, the seller rated `seller_rating`.
fn record_trades(
    s: &Setup,
    seller: &Address,
    buyer: &Address,
    first: u32,
    count: u32,
    seller_rating: u32,
) {
    for n in first..first + count {
        s.engine.record_trade(
            &s.escrow,
            &trade_id(&s.env, n),
            seller,
            buyer,
            &1_000,
            &seller_rating,
            &500,
        );
    }
}

// ============================================================================
// INITIALIZATION
// ============================================================================

#[test]
fn test_initialization() {
    let s = setup_test();

    let config = s.engine.get_config();
    assert_eq!(config.admin, s.admin);
    assert_eq!(config.badge_registry, s.badges.address);
    assert_eq!(config.local_chain_id, LOCAL_CHAIN);
    assert!(s.engine.has_role(&Role::Admin, &s.admin));
    assert!(s.engine.has_role(&Role::EscrowCaller, &s.escrow));
}

#[test]
#[should_panic(expected = "Error(Contract, #200)")] // AlreadyInitialized
fn test_double_initialization() {
    let s = setup_test();
    s.engine.initialize(&s.admin, &s.badges.address, &LOCAL_CHAIN);
}

#[test]
fn test_set_badge_registry_admin_only() {
    let s = setup_test();
    let other = Address::generate(&s.env);

    let res = s.engine.try_set_badge_registry(&s.escrow, &other);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));

    s.engine.set_badge_registry(&s.admin, &other);
    assert_eq!(s.engine.get_config().badge_registry, other);
}

// ============================================================================
// REGISTRATION
// ============================================================================

#[test]
fn test_register_user_is_idempotent() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    s.engine.register_user(&user, &user);
    let first = s.engine.get_reputation(&user);
    assert!(first.is_active);
    assert_eq!(first.joined_at, 10_000);
    assert_eq!(first.total_trades, 0);

    s.env.ledger().with_mut(|li| li.timestamp = 20_000);
    s.engine.register_user(&s.escrow, &user);
    assert_eq!(s.engine.get_reputation(&user), first);
}

#[test]
fn test_register_other_user_requires_role() {
    let s = setup_test();
    let user = Address::generate(&s.env);
    let outsider = Address::generate(&s.env);

    let res = s.engine.try_register_user(&outsider, &user);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));
    assert_eq!(s.engine.try_get_reputation(&user), Err(Ok(Error::UserNotFound)));
}

// ============================================================================
// TRADE OUTCOMES
// ============================================================================

#[test]
fn test_record_trade_updates_both_parties() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);
    let id = trade_id(&s.env, 1);

    s.engine
        .record_trade(&s.escrow, &id, &seller, &buyer, &5_000, &450, &300);

    let seller_rep = s.engine.get_reputation(&seller);
    assert_eq!(seller_rep.total_trades, 1);
    assert_eq!(seller_rep.successful_trades, 1);
    assert_eq!(seller_rep.rating_points, 450);
    assert_eq!(seller_rep.rating_count, 1);
    assert_eq!(seller_rep.average_rating, 450);
    assert_eq!(seller_rep.last_trade_at, 10_000);

    let buyer_rep = s.engine.get_reputation(&buyer);
    assert_eq!(buyer_rep.average_rating, 300);
    assert_eq!(s.engine.get_average_rating(&buyer), 300);

    let history = s.engine.get_trade_history(&seller);
    assert_eq!(history.len(), 1);
    let record = history.get(0).unwrap();
    assert_eq!(record.trade_id, id);
    assert_eq!(record.counterparty, buyer);
    assert_eq!(record.amount, 5_000);
    assert_eq!(record.rating, 450);
    assert!(!record.as_buyer);

    let record = s.engine.get_trade_history(&buyer).get(0).unwrap();
    assert_eq!(record.counterparty, seller);
    assert!(record.as_buyer);

    assert!(s.engine.is_trade_recorded(&id));
}

#[test]
fn test_average_is_integer_mean() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    s.engine
        .record_trade(&s.escrow, &trade_id(&s.env, 1), &seller, &buyer, &1, &500, &500);
    s.engine
        .record_trade(&s.escrow, &trade_id(&s.env, 2), &seller, &buyer, &1, &401, &500);

    // (500 + 401) / 2 = 450.5, truncated
    assert_eq!(s.engine.get_average_rating(&seller), 450);
}

#[test]
fn test_record_trade_rejects_out_of_band_ratings() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    let res = s
        .engine
        .try_record_trade(&s.escrow, &trade_id(&s.env, 1), &seller, &buyer, &1, &99, &500);
    assert_eq!(res, Err(Ok(Error::InvalidRating)));

    let res = s
        .engine
        .try_record_trade(&s.escrow, &trade_id(&s.env, 1), &seller, &buyer, &1, &500, &501);
    assert_eq!(res, Err(Ok(Error::InvalidRating)));

    // Boundaries are inclusive
    s.engine
        .record_trade(&s.escrow, &trade_id(&s.env, 1), &seller, &buyer, &1, &100, &500);
}

#[test]
fn test_record_trade_rejects_self_trade() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    let res = s
        .engine
        .try_record_trade(&s.escrow, &trade_id(&s.env, 1), &user, &user, &1, &500, &500);
    assert_eq!(res, Err(Ok(Error::InvalidParticipants)));
}

#[test]
fn test_record_trade_applied_once() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);
    let id = trade_id(&s.env, 1);

    s.engine
        .record_trade(&s.escrow, &id, &seller, &buyer, &1, &500, &500);
    let res = s
        .engine
        .try_record_trade(&s.escrow, &id, &seller, &buyer, &1, &500, &500);
    assert_eq!(res, Err(Ok(Error::TradeAlreadyRecorded)));
    assert_eq!(s.engine.get_reputation(&seller).total_trades, 1);
}

#[test]
fn test_record_trade_requires_escrow_role() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    let res = s
        .engine
        .try_record_trade(&s.relay, &trade_id(&s.env, 1), &seller, &buyer, &1, &500, &500);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));

    s.engine.revoke_role(&s.admin, &Role::EscrowCaller, &s.escrow);
    let res = s
        .engine
        .try_record_trade(&s.escrow, &trade_id(&s.env, 1), &seller, &buyer, &1, &500, &500);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));
}

// ============================================================================
// BADGE PROMOTION
// ============================================================================

#[test]
fn test_tenth_trade_earns_bronze() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    record_trades(&s, &seller, &buyer, 0, 9, 400);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::None);

    record_trades(&s, &seller, &buyer, 9, 1, 400);
    assert_eq!(s.engine.get_eligible_tier(&seller), Tier::Bronze);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Bronze);

    let badge = s.badges.badge_of_tier(&seller, &Tier::Bronze);
    assert_eq!(badge.trades_at_mint, 10);
    assert_eq!(badge.rating_at_mint, 400);
    assert_eq!(badge.source_chain, LOCAL_CHAIN);
}

#[test]
fn test_silver_needs_trades_and_rating() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    record_trades(&s, &seller, &buyer, 0, 24, 460);
    assert_eq!(s.engine.get_eligible_tier(&seller), Tier::Bronze);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Bronze);

    record_trades(&s, &seller, &buyer, 24, 1, 460);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Silver);
    assert_eq!(s.badges.balance_of(&seller), 2);

    // Further trades at the same tier mint nothing new
    record_trades(&s, &seller, &buyer, 25, 3, 460);
    assert_eq!(s.badges.balance_of(&seller), 2);
}

#[test]
fn test_enough_trades_with_low_rating_earn_nothing() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    record_trades(&s, &seller, &buyer, 0, 12, 399);
    assert_eq!(s.engine.get_eligible_tier(&seller), Tier::None);
    assert_eq!(s.badges.balance_of(&seller), 0);
}

#[test]
fn test_rejected_mint_does_not_fail_trade() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    s.badges
        .revoke_role(&s.admin, &Role::BadgeMinter, &s.engine.address);

    record_trades(&s, &seller, &buyer, 0, 10, 500);
    assert_eq!(s.engine.get_reputation(&seller).successful_trades, 10);
    assert_eq!(s.engine.get_eligible_tier(&seller), Tier::Bronze);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::None);

    // Once minting is allowed again the next update catches up
    s.badges
        .grant_role(&s.admin, &Role::BadgeMinter, &s.engine.address);
    record_trades(&s, &seller, &buyer, 10, 1, 500);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Bronze);
}

#[test]
fn test_eligible_tier_thresholds() {
    assert_eq!(eligible_tier(0, 0), Tier::None);
    assert_eq!(eligible_tier(9, 500), Tier::None);
    assert_eq!(eligible_tier(10, 400), Tier::Bronze);
    assert_eq!(eligible_tier(25, 449), Tier::Bronze);
    assert_eq!(eligible_tier(25, 450), Tier::Silver);
    assert_eq!(eligible_tier(50, 480), Tier::Gold);
    assert_eq!(eligible_tier(100, 490), Tier::Platinum);
    assert_eq!(eligible_tier(249, 500), Tier::Platinum);
    assert_eq!(eligible_tier(250, 495), Tier::Diamond);
    assert_eq!(eligible_tier(1_000, 480), Tier::Gold);
}

// ============================================================================
// DISPUTES
// ============================================================================

#[test]
fn test_record_dispute_resolution() {
    let s = setup_test();
    let winner = Address::generate(&s.env);
    let loser = Address::generate(&s.env);
    let resolver = Address::generate(&s.env);
    s.engine
        .grant_role(&s.admin, &Role::DisputeResolver, &resolver);

    s.engine
        .record_dispute_resolution(&resolver, &trade_id(&s.env, 1), &winner, &loser);
    s.engine
        .record_dispute_resolution(&s.escrow, &trade_id(&s.env, 2), &winner, &loser);

    let winner_rep = s.engine.get_reputation(&winner);
    assert_eq!(winner_rep.disputes_won, 2);
    assert_eq!(winner_rep.disputes_lost, 0);
    assert_eq!(winner_rep.total_trades, 0);
    assert_eq!(s.engine.get_reputation(&loser).disputes_lost, 2);
}

#[test]
fn test_record_dispute_guards() {
    let s = setup_test();
    let user = Address::generate(&s.env);
    let other = Address::generate(&s.env);

    let res = s
        .engine
        .try_record_dispute_resolution(&s.escrow, &trade_id(&s.env, 1), &user, &user);
    assert_eq!(res, Err(Ok(Error::InvalidParticipants)));

    let res = s
        .engine
        .try_record_dispute_resolution(&s.relay, &trade_id(&s.env, 1), &user, &other);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));
}

// ============================================================================
// CROSS-CHAIN SYNC
// ============================================================================

#[test]
fn test_sync_applies_once_per_sync_id() {
    let s = setup_test();
    let user = Address::generate(&s.env);
    let id = sync_id(&s.env, 1);

    s.engine
        .sync_cross_chain_reputation(&s.relay, &user, &REMOTE_CHAIN, &5, &2_250, &5, &id);
    // Redelivery of the same sync is accepted and ignored
    s.engine
        .sync_cross_chain_reputation(&s.relay, &user, &REMOTE_CHAIN, &5, &2_250, &5, &id);

    let rep = s.engine.get_reputation(&user);
    assert_eq!(rep.total_trades, 5);
    assert_eq!(rep.successful_trades, 5);
    assert_eq!(rep.rating_points, 2_250);
    assert_eq!(rep.rating_count, 5);
    assert_eq!(rep.average_rating, 450);
    assert!(s.engine.is_sync_processed(&id));
}

#[test]
fn test_sync_adds_to_local_counters() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    record_trades(&s, &seller, &buyer, 0, 4, 500);
    s.engine.sync_cross_chain_reputation(
        &s.relay,
        &seller,
        &REMOTE_CHAIN,
        &6,
        &2_400,
        &6,
        &sync_id(&s.env, 1),
    );

    let rep = s.engine.get_reputation(&seller);
    assert_eq!(rep.successful_trades, 10);
    assert_eq!(rep.rating_points, 4_400);
    assert_eq!(rep.average_rating, 440);
    assert_eq!(s.engine.get_sync_snapshot(&seller), (10, 4_400, 10));

    // The promotion is stamped with the chain the sync came from
    let badge = s.badges.badge_of_tier(&seller, &Tier::Bronze);
    assert_eq!(badge.source_chain, REMOTE_CHAIN);
}

#[test]
fn test_sync_requires_relay_role() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    let res = s.engine.try_sync_cross_chain_reputation(
        &s.escrow,
        &user,
        &REMOTE_CHAIN,
        &1,
        &500,
        &1,
        &sync_id(&s.env, 1),
    );
    assert_eq!(res, Err(Ok(Error::Unauthorized)));
    assert!(!s.engine.is_sync_processed(&sync_id(&s.env, 1)));
}

#[test]
fn test_sync_rejects_rating_totals_outside_rating_band() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    // Above 500 per rating, large enough to wrap a u32 average
    let res = s.engine.try_sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &1,
        &((1u64 << 32) + 100),
        &1,
        &sync_id(&s.env, 1),
    );
    assert_eq!(res, Err(Ok(Error::InvalidSyncData)));

    // Points without any rating
    let res = s.engine.try_sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &300,
        &5_000,
        &0,
        &sync_id(&s.env, 2),
    );
    assert_eq!(res, Err(Ok(Error::InvalidSyncData)));

    // Below 100 per rating
    let res = s.engine.try_sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &3,
        &299,
        &3,
        &sync_id(&s.env, 3),
    );
    assert_eq!(res, Err(Ok(Error::InvalidSyncData)));

    // Count so large the bounds overflow
    let res = s.engine.try_sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &1,
        &u64::MAX,
        &u64::MAX,
        &sync_id(&s.env, 4),
    );
    assert_eq!(res, Err(Ok(Error::InvalidSyncData)));

    assert!(!s.engine.is_sync_processed(&sync_id(&s.env, 1)));
    assert!(!s.engine.is_sync_processed(&sync_id(&s.env, 2)));
    assert_eq!(s.engine.get_sync_snapshot(&user), (0, 0, 0));
    assert_eq!(s.engine.get_eligible_tier(&user), Tier::None);
}

#[test]
fn test_sync_accepts_rating_band_edges() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    s.engine.sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &2,
        &200,
        &2,
        &sync_id(&s.env, 1),
    );
    s.engine.sync_cross_chain_reputation(
        &s.relay,
        &user,
        &REMOTE_CHAIN,
        &2,
        &1_000,
        &2,
        &sync_id(&s.env, 2),
    );

    let rep = s.engine.get_reputation(&user);
    assert_eq!(rep.rating_points, 1_200);
    assert_eq!(rep.rating_count, 4);
    assert_eq!(rep.average_rating, 300);
}

#[test]
fn test_sync_lowering_average_keeps_earned_tier() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    record_trades(&s, &seller, &buyer, 0, 10, 400);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Bronze);

    s.engine.sync_cross_chain_reputation(
        &s.relay,
        &seller,
        &REMOTE_CHAIN,
        &10,
        &1_000,
        &10,
        &sync_id(&s.env, 1),
    );

    let rep = s.engine.get_reputation(&seller);
    assert_eq!(rep.successful_trades, 20);
    assert_eq!(rep.average_rating, 250);
    assert_eq!(s.engine.get_eligible_tier(&seller), Tier::None);
    assert_eq!(s.badges.user_highest_tier(&seller), Tier::Bronze);
    assert!(s.badges.has_minimum_tier(&seller, &Tier::Bronze));
}

#[test]
fn test_snapshot_of_unknown_user_is_zero() {
    let s = setup_test();
    let user = Address::generate(&s.env);

    assert_eq!(s.engine.get_sync_snapshot(&user), (0, 0, 0));
    assert_eq!(s.engine.get_average_rating(&user), 0);
    assert_eq!(s.engine.get_eligible_tier(&user), Tier::None);
    assert_eq!(s.engine.get_trade_history(&user).len(), 0);
}

// ============================================================================
// HISTORY
// ============================================================================

#[test]
fn test_history_keeps_most_recent_entries() {
    let s = setup_test();
    let seller = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);

    for n in 0..HISTORY_CAPACITY + 5 {
        s.env
            .ledger()
            .with_mut(|li| li.timestamp = 10_000 + n as u64);
        s.engine.record_trade(
            &s.escrow,
            &trade_id(&s.env, n),
            &seller,
            &buyer,
            &(n as i128),
            &500,
            &500,
        );
    }

    let history = s.engine.get_trade_history(&seller);
    assert_eq!(history.len(), HISTORY_CAPACITY);
    assert_eq!(history.get(0).unwrap().trade_id, trade_id(&s.env, 5));
    assert_eq!(
        history.get(HISTORY_CAPACITY - 1).unwrap().trade_id,
        trade_id(&s.env, HISTORY_CAPACITY + 4)
    );

    for i in 1..history.len() {
        assert!(history.get(i - 1).unwrap().timestamp < history.get(i).unwrap().timestamp);
    }

    // Counters are not bounded by the history window
    assert_eq!(
        s.engine.get_reputation(&seller).total_trades,
        (HISTORY_CAPACITY + 5) as u64
    );
}

#[test]
fn test_history_cursor_wraps() {
    let mut cursor = HistoryCursor::empty();

    assert_eq!(cursor.advance(3), 0);
    assert_eq!(cursor.advance(3), 1);
    assert_eq!(cursor.len, 2);
    assert_eq!(cursor.slot_at(0, 3), 0);

    assert_eq!(cursor.advance(3), 2);
    assert_eq!(cursor.advance(3), 0);
    assert_eq!(cursor.len, 3);
    assert_eq!(cursor.next, 1);

    // Oldest surviving entry sits right after the last write
    assert_eq!(cursor.slot_at(0, 3), 1);
    assert_eq!(cursor.slot_at(2, 3), 0);
}
