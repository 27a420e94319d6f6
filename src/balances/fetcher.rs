//! Balance Fetcher
//!
//! Annotates registry wallets with balances. A fetch never fails the
//! session: transport or parse problems are logged and leave the balance
//! unset, and the loading flag is always cleared afterwards.

use solana_sdk::native_token::LAMPORTS_PER_SOL;
use std::thread;

use super::rpc::BalanceProvider;
use crate::error::{VaultError, VaultResult};
use crate::types::Network;
use crate::wallet::WalletRegistry;
use crate::{log_debug, log_warn};

/// Lamports to SOL
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / LAMPORTS_PER_SOL as f64
}

/// Fetch one address, mapping any failure to `None`
fn resolve_balance<P>(provider: &P, address: &str, network: Network, index: u32) -> Option<f64>
where
    P: BalanceProvider + ?Sized,
{
    match provider.get_balance(address, network) {
        Ok(lamports) => {
            log_debug!("balances", "Balance fetched", index = index, lamports = lamports);
            Some(lamports_to_sol(lamports))
        }
        Err(e) => {
            log_warn!(
                "balances",
                "Error fetching balance",
                index = index,
                address = address,
                network = network,
                error = e
            );
            None
        }
    }
}

/// Fetch the balance of wallet `index` with exactly one request.
///
/// Returns the stored balance; `Ok(None)` means the fetch failed and was
/// degraded. Only an unknown index is an error.
pub fn fetch_wallet_balance<P>(
    registry: &mut WalletRegistry,
    index: u32,
    provider: &P,
    network: Network,
) -> VaultResult<Option<f64>>
where
    P: BalanceProvider + ?Sized,
{
    let address = registry
        .get(index)
        .map(|w| w.address().to_string())
        .ok_or_else(|| VaultError::not_found(format!("No wallet with index {}", index)))?;

    registry.begin_balance_fetch(index);
    let balance = resolve_balance(provider, &address, network, index);
    registry.set_balance(index, balance);

    Ok(balance)
}

/// Fetch every wallet concurrently, one worker per wallet.
///
/// Each outcome is written back only to the wallet it belongs to. Returns
/// how many fetches succeeded.
pub fn refresh_all_balances<P>(registry: &mut WalletRegistry, provider: &P, network: Network) -> usize
where
    P: BalanceProvider + ?Sized,
{
    let targets = registry.addresses();
    for (index, _) in &targets {
        registry.begin_balance_fetch(*index);
    }

    let outcomes: Vec<(u32, Option<f64>)> = thread::scope(|scope| {
        let workers: Vec<_> = targets
            .iter()
            .map(|(index, address)| {
                let index = *index;
                let handle = scope.spawn(move || resolve_balance(provider, address, network, index));
                (index, handle)
            })
            .collect();

        workers
            .into_iter()
            .map(|(index, handle)| (index, handle.join().unwrap_or(None)))
            .collect()
    });

    let mut succeeded = 0;
    for (index, balance) in outcomes {
        if balance.is_some() {
            succeeded += 1;
        }
        registry.set_balance(index, balance);
    }
    succeeded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::{parse_phrase, MnemonicPolicy};
    use std::collections::HashMap;
    use std::sync::Mutex;

    const ABANDON_ABOUT: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    /// Serves fixed lamport counts; unknown addresses fail like a dead socket
    struct FixedBalances {
        by_address: HashMap<String, u64>,
        calls: Mutex<Vec<(String, Network)>>,
    }

    impl FixedBalances {
        fn new(by_address: HashMap<String, u64>) -> Self {
            Self {
                by_address,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl BalanceProvider for FixedBalances {
        fn get_balance(&self, address: &str, network: Network) -> VaultResult<u64> {
            self.calls.lock().unwrap().push((address.to_string(), network));
            self.by_address
                .get(address)
                .copied()
                .ok_or_else(|| VaultError::network_error("Connection failed"))
        }
    }

    fn registry_with(count: u32) -> WalletRegistry {
        let seed = parse_phrase(ABANDON_ABOUT, MnemonicPolicy::Strict)
            .unwrap()
            .to_seed("")
            .unwrap();
        let mut registry = WalletRegistry::new(seed);
        for _ in 0..count {
            registry.add().unwrap();
        }
        registry
    }

    #[test]
    fn test_lamports_to_sol() {
        assert_eq!(lamports_to_sol(2_500_000_000), 2.5);
        assert_eq!(lamports_to_sol(0), 0.0);
        assert_eq!(lamports_to_sol(1), 0.000000001);
    }

    #[test]
    fn test_fetch_success_converts_to_sol() {
        let mut registry = registry_with(1);
        let address = registry.get(0).unwrap().address().to_string();
        let provider = FixedBalances::new(HashMap::from([(address.clone(), 2_500_000_000)]));

        let balance = fetch_wallet_balance(&mut registry, 0, &provider, Network::Devnet).unwrap();

        assert_eq!(balance, Some(2.5));
        let wallet = registry.get(0).unwrap();
        assert_eq!(wallet.balance(), Some(2.5));
        assert!(!wallet.is_loading_balance());

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.as_slice(), &[(address, Network::Devnet)]);
    }

    #[test]
    fn test_fetch_failure_degrades_silently() {
        let mut registry = registry_with(1);
        registry.set_balance(0, Some(1.0));
        let provider = FixedBalances::new(HashMap::new());

        let balance = fetch_wallet_balance(&mut registry, 0, &provider, Network::Mainnet).unwrap();

        assert_eq!(balance, None);
        let wallet = registry.get(0).unwrap();
        assert_eq!(wallet.balance(), None);
        assert!(!wallet.is_loading_balance());
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_fetch_unknown_index() {
        let mut registry = registry_with(1);
        let provider = FixedBalances::new(HashMap::new());
        let err = fetch_wallet_balance(&mut registry, 9, &provider, Network::Devnet).unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::NotFound);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_refresh_all_updates_each_wallet() {
        let mut registry = registry_with(3);
        let addresses = registry.addresses();
        let provider = FixedBalances::new(HashMap::from([
            (addresses[0].1.clone(), 1_000_000_000),
            (addresses[2].1.clone(), 500_000_000),
        ]));

        let succeeded = refresh_all_balances(&mut registry, &provider, Network::Devnet);

        assert_eq!(succeeded, 2);
        assert_eq!(registry.get(0).unwrap().balance(), Some(1.0));
        assert_eq!(registry.get(1).unwrap().balance(), None);
        assert_eq!(registry.get(2).unwrap().balance(), Some(0.5));
        assert!(registry.wallets().iter().all(|w| !w.is_loading_balance()));
        assert_eq!(provider.calls.lock().unwrap().len(), 3);
    }
}
