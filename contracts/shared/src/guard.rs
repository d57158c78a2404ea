use soroban_sdk::{contracttype, Env};

#[contracttype]
#[derive(Clone)]
enum GuardKey {
    Entered,
}

/// Whether a guarded entry point of the current contract is mid-execution.
pub fn is_entered(env: &Env) -> bool {
    env.storage()
        .instance()
        .get::<_, bool>(&GuardKey::Entered)
        .unwrap_or(false)
}

/// Run `body` with the non-reentrancy flag held.
///
/// A nested call into any guarded entry point of the same contract fails with
/// `reentered`. An `Err` from `body` aborts the host invocation, which rolls
/// the flag back together with every other write, so the flag is only cleared
/// explicitly on success.
pub fn non_reentrant<T, E>(
    env: &Env,
    reentered: E,
    body: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if is_entered(env) {
        return Err(reentered);
    }
    env.storage().instance().set(&GuardKey::Entered, &true);
    let out = body()?;
    env.storage().instance().remove(&GuardKey::Entered);
    Ok(out)
}
