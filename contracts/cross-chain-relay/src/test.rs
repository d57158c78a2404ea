#![cfg(test)]

use badge_registry::{BadgeRegistry, BadgeRegistryClient};
use p2p_shared::Role;
use reputation_engine::{ReputationEngine, ReputationEngineClient};
use soroban_sdk::{
    contract, contractimpl, contracttype, symbol_short,
    testutils::{Address as _, Ledger},
    token,
    xdr::{FromXdr, ToXdr},
    Address, Bytes, BytesN, Env, String,
};

use crate::{
    CrossChainRelay, CrossChainRelayClient, Error, RelayPayload, ReputationSyncPayload,
    TokenTransferPayload,
};

const LOCAL_CHAIN: u64 = 1;
const REMOTE_CHAIN: u64 = 2;
const FEE_BPS: u32 = 100;

// ============================================================================
// MOCK ROUTER
// ============================================================================

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SentMessage {
    pub id: BytesN<32>,
    pub sender: Address,
    pub dest_chain: u64,
    pub receiver: Address,
    pub payload: Bytes,
    pub fast: bool,
}

/// Records outbound messages instead of delivering them.
#[contract]
pub struct MockRouter;

#[contractimpl]
impl MockRouter {
    pub fn send_message(
        env: Env,
        sender: Address,
        dest_chain: u64,
        receiver: Address,
        payload: Bytes,
        fast: bool,
    ) -> BytesN<32> {
        let count: u32 = env
            .storage()
            .instance()
            .get(&symbol_short!("count"))
            .unwrap_or(0)
            + 1;
        env.storage().instance().set(&symbol_short!("count"), &count);

        let id = message_id(&env, count);
        let message = SentMessage {
            id: id.clone(),
            sender,
            dest_chain,
            receiver,
            payload,
            fast,
        };
        env.storage().instance().set(&symbol_short!("last"), &message);
        id
    }

    pub fn last_message(env: Env) -> SentMessage {
        env.storage()
            .instance()
            .get(&symbol_short!("last"))
            .unwrap()
    }
}

// ============================================================================
// SETUP
// ============================================================================

struct Setup {
    env: Env,
    relay: CrossChainRelayClient<'static>,
    router: MockRouterClient<'static>,
    engine: ReputationEngineClient<'static>,
    token: token::Client<'static>,
    minter: token::StellarAssetClient<'static>,
    admin: Address,
    fee_collector: Address,
    operator: Address,
    user: Address,
    peer: Address,
}

fn setup_test() -> Setup {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().with_mut(|li| li.timestamp = 5_000);

    let admin = Address::generate(&env);
    let fee_collector = Address::generate(&env);
    let operator = Address::generate(&env);
    let user = Address::generate(&env);
    let peer = Address::generate(&env);

    let badges = BadgeRegistryClient::new(&env, &env.register(BadgeRegistry, ()));
    let engine = ReputationEngineClient::new(&env, &env.register(ReputationEngine, ()));
    let router = MockRouterClient::new(&env, &env.register(MockRouter, ()));
    let relay = CrossChainRelayClient::new(&env, &env.register(CrossChainRelay, ()));

    badges.initialize(&admin);
    engine.initialize(&admin, &badges.address, &LOCAL_CHAIN);
    relay.initialize(
        &admin,
        &router.address,
        &engine.address,
        &fee_collector,
        &FEE_BPS,
        &LOCAL_CHAIN,
    );

    badges.grant_role(&admin, &Role::BadgeMinter, &engine.address);
    engine.grant_role(&admin, &Role::CrossChainCaller, &relay.address);
    relay.grant_role(&admin, &Role::LiquidityOperator, &operator);

    let sac = env.register_stellar_asset_contract_v2(admin.clone());
    let token = token::Client::new(&env, &sac.address());
    let minter = token::StellarAssetClient::new(&env, &sac.address());
    minter.mint(&user, &1_000_000);
    minter.mint(&operator, &1_000_000);

    relay.configure_chain(&admin, &REMOTE_CHAIN, &peer, &token.address, &true);

    Setup {
        env,
        relay,
        router,
        engine,
        token,
        minter,
        admin,
        fee_collector,
        operator,
        user,
        peer,
    }
}

fn message_id(env: &Env, n: u32) -> BytesN<32> {
    let mut bytes = [0xAB; 32];
    bytes[28..].copy_from_slice(&n.to_be_bytes());
    BytesN::from_array(env, &bytes)
}

fn transfer_payload(env: &Env, recipient: &Address, amount: i128) -> Bytes {
    RelayPayload::TokenTransfer(TokenTransferPayload {
        sender: Address::generate(env),
        recipient: recipient.clone(),
        amount,
    })
    .to_xdr(env)
}

fn sync_payload(env: &Env, user: &Address, trades: u64, points: u64) -> Bytes {
    RelayPayload::ReputationSync(ReputationSyncPayload {
        user: user.clone(),
        successful_trades: trades,
        rating_points: points,
        rating_count: trades,
    })
    .to_xdr(env)
}

// ============================================================================
// INITIALIZATION & CONFIG
// ============================================================================

#[test]
fn test_initialization() {
    let s = setup_test();

    let config = s.relay.get_config();
    assert_eq!(config.admin, s.admin);
    assert_eq!(config.router, s.router.address);
    assert_eq!(config.reputation_engine, s.engine.address);
    assert_eq!(config.bridge_fee_bps, FEE_BPS);
    assert_eq!(config.local_chain_id, LOCAL_CHAIN);

    let chain = s.relay.get_chain_config(&REMOTE_CHAIN);
    assert_eq!(chain.bridge, s.peer);
    assert_eq!(chain.local_token, s.token.address);
    assert!(chain.active);
}

#[test]
#[should_panic(expected = "Error(Contract, #400)")] // AlreadyInitialized
fn test_double_initialization() {
    let s = setup_test();
    s.relay.initialize(
        &s.admin,
        &s.router.address,
        &s.engine.address,
        &s.fee_collector,
        &FEE_BPS,
        &LOCAL_CHAIN,
    );
}

#[test]
fn test_chain_configuration() {
    let s = setup_test();

    let res = s
        .relay
        .try_configure_chain(&s.admin, &LOCAL_CHAIN, &s.peer, &s.token.address, &true);
    assert_eq!(res, Err(Ok(Error::InvalidChain)));

    let res = s
        .relay
        .try_configure_chain(&s.user, &9, &s.peer, &s.token.address, &true);
    assert_eq!(res, Err(Ok(Error::Unauthorized)));

    assert_eq!(
        s.relay.try_get_chain_config(&9),
        Err(Ok(Error::ChainNotSupported))
    );
    assert_eq!(
        s.relay.try_set_chain_active(&s.admin, &9, &true),
        Err(Ok(Error::ChainNotSupported))
    );

    s.relay.set_chain_active(&s.admin, &REMOTE_CHAIN, &false);
    assert!(!s.relay.get_chain_config(&REMOTE_CHAIN).active);
}

#[test]
fn test_bridge_fee_cap() {
    let s = setup_test();

    assert_eq!(
        s.relay.try_set_bridge_fee(&s.admin, &501),
        Err(Ok(Error::InvalidFee))
    );
    s.relay.set_bridge_fee(&s.admin, &500);
    assert_eq!(s.relay.calculate_bridge_fee(&10_000), 500);
}

// ============================================================================
// OUTBOUND
// ============================================================================

#[test]
fn test_bridge_tokens_standard_lane() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);

    let id = s
        .relay
        .bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &10_000, &false);

    assert_eq!(s.token.balance(&s.user), 990_000);
    assert_eq!(s.token.balance(&s.fee_collector), 100);
    assert_eq!(s.token.balance(&s.relay.address), 9_900);

    let pending = s.relay.get_pending_transfer(&id);
    assert_eq!(pending.sender, s.user);
    assert_eq!(pending.recipient, recipient);
    assert_eq!(pending.dest_chain, REMOTE_CHAIN);
    assert_eq!(pending.amount, 9_900);
    assert_eq!(pending.fee, 100);
    assert!(!pending.fast);
    assert_eq!(pending.created_at, 5_000);

    let sent = s.router.last_message();
    assert_eq!(sent.id, id);
    assert_eq!(sent.sender, s.relay.address);
    assert_eq!(sent.dest_chain, REMOTE_CHAIN);
    assert_eq!(sent.receiver, s.peer);
    assert!(!sent.fast);

    let payload = RelayPayload::from_xdr(&s.env, &sent.payload).unwrap();
    assert_eq!(
        payload,
        RelayPayload::TokenTransfer(TokenTransferPayload {
            sender: s.user.clone(),
            recipient,
            amount: 9_900,
        })
    );
}

#[test]
fn test_bridge_tokens_fast_lane_when_pool_covers() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);

    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &50_000);
    let id = s
        .relay
        .bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &10_000, &true);

    assert!(s.relay.get_pending_transfer(&id).fast);
    assert!(s.router.last_message().fast);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 40_100);
}

#[test]
fn test_bridge_tokens_falls_back_without_liquidity() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);

    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &5_000);
    let id = s
        .relay
        .bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &10_000, &true);

    assert!(!s.relay.get_pending_transfer(&id).fast);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 5_000);
}

#[test]
fn test_bridge_tokens_validation() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);

    assert_eq!(
        s.relay
            .try_bridge_tokens(&s.user, &9, &recipient, &10_000, &false),
        Err(Ok(Error::ChainNotSupported))
    );
    assert_eq!(
        s.relay
            .try_bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &0, &false),
        Err(Ok(Error::InsufficientAmount))
    );

    s.relay.set_chain_active(&s.admin, &REMOTE_CHAIN, &false);
    assert_eq!(
        s.relay
            .try_bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &10_000, &false),
        Err(Ok(Error::ChainNotSupported))
    );
    assert_eq!(s.token.balance(&s.user), 1_000_000);
}

#[test]
fn test_sync_reputation_exports_snapshot() {
    let s = setup_test();
    let escrow = Address::generate(&s.env);
    let buyer = Address::generate(&s.env);
    s.engine.grant_role(&s.admin, &Role::EscrowCaller, &escrow);
    s.engine.record_trade(
        &escrow,
        &BytesN::from_array(&s.env, &[1; 32]),
        &s.user,
        &buyer,
        &100,
        &480,
        &500,
    );

    let id = s.relay.sync_reputation(&s.user, &REMOTE_CHAIN);

    let sent = s.router.last_message();
    assert_eq!(sent.id, id);
    assert!(!sent.fast);
    let payload = RelayPayload::from_xdr(&s.env, &sent.payload).unwrap();
    assert_eq!(
        payload,
        RelayPayload::ReputationSync(ReputationSyncPayload {
            user: s.user.clone(),
            successful_trades: 1,
            rating_points: 480,
            rating_count: 1,
        })
    );
}

// ============================================================================
// INBOUND
// ============================================================================

#[test]
fn test_receive_token_transfer() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    let id = message_id(&s.env, 1);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &50_000);

    s.relay.receive_message(
        &id,
        &REMOTE_CHAIN,
        &s.peer,
        &transfer_payload(&s.env, &recipient, 7_000),
    );

    assert_eq!(s.token.balance(&recipient), 7_000);
    assert_eq!(s.token.balance(&s.relay.address), 43_000);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 43_000);
    assert!(s.relay.is_message_processed(&id));
}

#[test]
fn test_replayed_message_rejected() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    let id = message_id(&s.env, 1);
    let payload = transfer_payload(&s.env, &recipient, 7_000);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &50_000);

    s.relay
        .receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    let res = s
        .relay
        .try_receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    assert_eq!(res, Err(Ok(Error::MessageAlreadyProcessed)));
    assert_eq!(s.token.balance(&recipient), 7_000);
}

#[test]
fn test_message_from_unknown_source_rejected() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    let id = message_id(&s.env, 1);
    let payload = transfer_payload(&s.env, &recipient, 7_000);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &50_000);

    let impostor = Address::generate(&s.env);
    let res = s
        .relay
        .try_receive_message(&id, &REMOTE_CHAIN, &impostor, &payload);
    assert_eq!(res, Err(Ok(Error::InvalidMessageSource)));

    let res = s.relay.try_receive_message(&id, &9, &s.peer, &payload);
    assert_eq!(res, Err(Ok(Error::InvalidMessageSource)));

    assert!(!s.relay.is_message_processed(&id));
    assert_eq!(s.token.balance(&recipient), 0);
}

#[test]
fn test_short_relay_balance_leaves_message_retryable() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    let id = message_id(&s.env, 1);
    let payload = transfer_payload(&s.env, &recipient, 7_000);

    let res = s
        .relay
        .try_receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    assert_eq!(res, Err(Ok(Error::InsufficientLiquidity)));
    assert!(!s.relay.is_message_processed(&id));

    s.minter.mint(&s.relay.address, &7_000);
    s.relay
        .receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    assert_eq!(s.token.balance(&recipient), 7_000);
}

#[test]
fn test_undecodable_payload_rejected() {
    let s = setup_test();
    let id = message_id(&s.env, 1);
    let junk = String::from_str(&s.env, "not a relay message").to_xdr(&s.env);

    let res = s
        .relay
        .try_receive_message(&id, &REMOTE_CHAIN, &s.peer, &junk);
    assert_eq!(res, Err(Ok(Error::InvalidPayload)));
    assert!(!s.relay.is_message_processed(&id));
}

#[test]
fn test_reputation_sync_applied_once() {
    let s = setup_test();
    let trader = Address::generate(&s.env);
    let id = message_id(&s.env, 1);
    let payload = sync_payload(&s.env, &trader, 5, 2_250);

    s.relay
        .receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    let res = s
        .relay
        .try_receive_message(&id, &REMOTE_CHAIN, &s.peer, &payload);
    assert_eq!(res, Err(Ok(Error::MessageAlreadyProcessed)));

    let rep = s.engine.get_reputation(&trader);
    assert_eq!(rep.total_trades, 5);
    assert_eq!(rep.average_rating, 450);
}

#[test]
fn test_distinct_sync_messages_each_apply() {
    let s = setup_test();
    let trader = Address::generate(&s.env);

    s.relay.receive_message(
        &message_id(&s.env, 1),
        &REMOTE_CHAIN,
        &s.peer,
        &sync_payload(&s.env, &trader, 5, 2_250),
    );
    s.relay.receive_message(
        &message_id(&s.env, 2),
        &REMOTE_CHAIN,
        &s.peer,
        &sync_payload(&s.env, &trader, 5, 2_500),
    );

    let rep = s.engine.get_reputation(&trader);
    assert_eq!(rep.successful_trades, 10);
    assert_eq!(rep.rating_points, 4_750);
    assert_eq!(rep.average_rating, 475);
}

// ============================================================================
// LIQUIDITY
// ============================================================================

#[test]
fn test_liquidity_management() {
    let s = setup_test();

    assert_eq!(
        s.relay.try_add_liquidity(&s.user, &REMOTE_CHAIN, &1_000),
        Err(Ok(Error::Unauthorized))
    );
    assert_eq!(
        s.relay.try_add_liquidity(&s.operator, &9, &1_000),
        Err(Ok(Error::ChainNotSupported))
    );

    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &30_000);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 30_000);
    assert_eq!(s.token.balance(&s.operator), 970_000);

    assert_eq!(
        s.relay
            .try_remove_liquidity(&s.operator, &REMOTE_CHAIN, &30_001),
        Err(Ok(Error::InsufficientLiquidity))
    );

    s.relay
        .remove_liquidity(&s.operator, &REMOTE_CHAIN, &10_000);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 20_000);
    assert_eq!(s.token.balance(&s.operator), 980_000);
}

#[test]
fn test_inbound_release_draws_down_pool() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &30_000);

    s.relay.receive_message(
        &message_id(&s.env, 1),
        &REMOTE_CHAIN,
        &s.peer,
        &transfer_payload(&s.env, &recipient, 25_000),
    );
    assert_eq!(s.token.balance(&s.relay.address), 5_000);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 5_000);

    assert_eq!(
        s.relay
            .try_remove_liquidity(&s.operator, &REMOTE_CHAIN, &30_000),
        Err(Ok(Error::InsufficientLiquidity))
    );

    s.relay.remove_liquidity(&s.operator, &REMOTE_CHAIN, &5_000);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 0);
    assert_eq!(s.token.balance(&s.relay.address), 0);
    assert_eq!(s.token.balance(&s.operator), 975_000);
}

#[test]
fn test_inbound_release_spends_locked_funds_before_pool() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &10_000);

    // 9_900 locked by an outbound standard-lane transfer
    s.relay
        .bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &10_000, &false);
    assert_eq!(s.token.balance(&s.relay.address), 19_900);

    s.relay.receive_message(
        &message_id(&s.env, 1),
        &REMOTE_CHAIN,
        &s.peer,
        &transfer_payload(&s.env, &recipient, 12_000),
    );

    assert_eq!(s.token.balance(&s.relay.address), 7_900);
    assert_eq!(s.relay.get_pool_balance(&REMOTE_CHAIN), 7_900);
    s.relay.remove_liquidity(&s.operator, &REMOTE_CHAIN, &7_900);
    assert_eq!(s.token.balance(&s.relay.address), 0);
}

#[test]
fn test_route_token_locked_while_pool_funded() {
    let s = setup_test();
    let other_token = Address::generate(&s.env);
    s.relay.add_liquidity(&s.operator, &REMOTE_CHAIN, &1_000);

    let res = s.relay.try_configure_chain(
        &s.admin,
        &REMOTE_CHAIN,
        &s.peer,
        &other_token,
        &true,
    );
    assert_eq!(res, Err(Ok(Error::PoolNotEmpty)));

    // Same token is still reconfigurable
    s.relay
        .configure_chain(&s.admin, &REMOTE_CHAIN, &s.peer, &s.token.address, &false);
    assert!(!s.relay.get_chain_config(&REMOTE_CHAIN).active);

    s.relay.remove_liquidity(&s.operator, &REMOTE_CHAIN, &1_000);
    s.relay
        .configure_chain(&s.admin, &REMOTE_CHAIN, &s.peer, &other_token, &true);
    assert_eq!(
        s.relay.get_chain_config(&REMOTE_CHAIN).local_token,
        other_token
    );
}

// ============================================================================
// END TO END
// ============================================================================

#[test]
fn test_transfer_between_two_relays() {
    let s = setup_test();
    let recipient = Address::generate(&s.env);

    // Second relay standing in for the remote chain, peered with the first
    let remote = CrossChainRelayClient::new(&s.env, &s.env.register(CrossChainRelay, ()));
    remote.initialize(
        &s.admin,
        &s.router.address,
        &s.engine.address,
        &s.fee_collector,
        &FEE_BPS,
        &REMOTE_CHAIN,
    );
    remote.configure_chain(
        &s.admin,
        &LOCAL_CHAIN,
        &s.relay.address,
        &s.token.address,
        &true,
    );
    remote.grant_role(&s.admin, &Role::LiquidityOperator, &s.operator);
    remote.add_liquidity(&s.operator, &LOCAL_CHAIN, &100_000);

    s.relay
        .bridge_tokens(&s.user, &REMOTE_CHAIN, &recipient, &20_000, &false);
    let sent = s.router.last_message();

    remote.receive_message(&sent.id, &LOCAL_CHAIN, &sent.sender, &sent.payload);

    assert_eq!(s.token.balance(&recipient), 19_800);
    assert_eq!(s.token.balance(&s.relay.address), 19_800);
    assert_eq!(s.token.balance(&remote.address), 80_200);
    assert_eq!(remote.get_pool_balance(&LOCAL_CHAIN), 80_200);
    assert!(remote.is_message_processed(&sent.id));
}
