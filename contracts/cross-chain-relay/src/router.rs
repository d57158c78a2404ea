use soroban_sdk::{contractclient, Address, Bytes, BytesN, Env};

/// Inter-ledger message transport.
///
/// The router delivers `payload` to `receiver` on `dest_chain` by invoking its
/// `receive_message` entry point, authorizing the call as itself. The returned
/// id is unique per message and identical on both ends.
#[contractclient(name = "RouterClient")]
pub trait MessageRouter {
    fn send_message(
        env: Env,
        sender: Address,
        dest_chain: u64,
        receiver: Address,
        payload: Bytes,
        fast: bool,
    ) -> BytesN<32>;
}
