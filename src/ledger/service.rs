//! Ledger service
//!
//! Deposit, withdraw, transfer and history-query semantics. Every
//! balance-mutating operation runs inside the transactional retry
//! wrapper; partially-applied balance changes are never observable
//! outside a committed scope.

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::{Amount, Balance};
use crate::error::{AppError, AppResult};
use crate::model::{LedgerTransaction, User, Wallet};
use crate::store::{
    run_in_transaction, Filter, Page, PageMeta, Repository, RetryPolicy, StoreSession, Value,
};

use super::{entries, reference};

/// Money-movement core over wallets and the transaction ledger.
#[derive(Debug, Clone)]
pub struct LedgerService {
    pool: PgPool,
    users: Repository<User>,
    wallets: Repository<Wallet>,
    transactions: Repository<LedgerTransaction>,
    policy: RetryPolicy,
    system_account_id: Uuid,
}

impl LedgerService {
    pub fn new(pool: PgPool, policy: RetryPolicy, system_account_id: Uuid) -> Self {
        Self {
            users: Repository::new(pool.clone()),
            wallets: Repository::new(pool.clone()),
            transactions: Repository::new(pool.clone()),
            pool,
            policy,
            system_account_id,
        }
    }

    /// Credit a user's wallet and append the matching ledger entry.
    pub async fn deposit(
        &self,
        user_id: Uuid,
        amount: Decimal,
        narration: Option<String>,
    ) -> AppResult<LedgerTransaction> {
        let system_account_id = self.system_account_id;
        // each attempt gets its own handles; the unit of work owns them
        run_in_transaction(&self.pool, &self.policy, |session| {
            let users = self.users.clone();
            let wallets = self.wallets.clone();
            let transactions = self.transactions.clone();
            let narration = narration.clone();
            Box::pin(async move {
                let (_, wallet) = load_owner(&users, &wallets, user_id, session).await?;

                let amount = Amount::new(amount).map_err(|_| {
                    AppError::BadRequest("Deposit amount must be greater than zero.".to_string())
                })?;

                let new_balance = wallet_balance(&wallet)?.credit(&amount)?;
                wallets
                    .update_by_id(
                        wallet.id,
                        &[("balance", Value::from(new_balance.value()))],
                        Some(&mut *session),
                    )
                    .await?;

                let entry = entries::deposit_entry(
                    &wallet,
                    &amount,
                    reference::next_reference(),
                    system_account_id,
                    narration,
                );
                let created = transactions.create(&entry, Some(&mut *session)).await?;
                Ok(created)
            })
        })
        .await
    }

    /// Debit a user's wallet and append the matching ledger entry.
    pub async fn withdraw(&self, user_id: Uuid, amount: Decimal) -> AppResult<LedgerTransaction> {
        let system_account_id = self.system_account_id;
        run_in_transaction(&self.pool, &self.policy, |session| {
            let users = self.users.clone();
            let wallets = self.wallets.clone();
            let transactions = self.transactions.clone();
            Box::pin(async move {
                let (_, wallet) = load_owner(&users, &wallets, user_id, session).await?;

                let amount = Amount::new(amount).map_err(|_| {
                    AppError::BadRequest(
                        "Withdrawal amount must be greater than zero.".to_string(),
                    )
                })?;

                let balance = wallet_balance(&wallet)?;
                if !balance.is_sufficient_for(&amount) {
                    return Err(AppError::BadRequest(
                        "Insufficient balance for withdrawal.".to_string(),
                    ));
                }

                let new_balance = balance.debit(&amount)?;
                wallets
                    .update_by_id(
                        wallet.id,
                        &[("balance", Value::from(new_balance.value()))],
                        Some(&mut *session),
                    )
                    .await?;

                let entry = entries::withdrawal_entry(
                    &wallet,
                    &amount,
                    reference::next_reference(),
                    system_account_id,
                );
                let created = transactions.create(&entry, Some(&mut *session)).await?;
                Ok(created)
            })
        })
        .await
    }

    /// Move funds between two users' wallets inside one scope. Returns the
    /// debit leg; the credit leg is linked to it by
    /// `related_transaction_id` and the shared reference.
    pub async fn transfer(
        &self,
        user_id: Uuid,
        counterparty_id: Uuid,
        amount: Decimal,
        narration: Option<String>,
    ) -> AppResult<LedgerTransaction> {
        run_in_transaction(&self.pool, &self.policy, |session| {
            let users = self.users.clone();
            let wallets = self.wallets.clone();
            let transactions = self.transactions.clone();
            let narration = narration.clone();
            Box::pin(async move {
                let (sender, sender_wallet) =
                    load_owner(&users, &wallets, user_id, session).await?;

                let amount = Amount::new(amount).map_err(|_| {
                    AppError::BadRequest("Transfer amount must be greater than zero.".to_string())
                })?;

                let sender_balance = wallet_balance(&sender_wallet)?;
                if !sender_balance.is_sufficient_for(&amount) {
                    return Err(AppError::BadRequest(
                        "Insufficient balance for transfer.".to_string(),
                    ));
                }

                let counterparty = users
                    .get_by_id(counterparty_id, Some(&mut *session))
                    .await?
                    .ok_or_else(|| AppError::Forbidden("Counterparty not found.".to_string()))?;
                let counterparty_wallet = wallets
                    .get_one(
                        &Filter::new().eq("user_id", counterparty.id),
                        Some(&mut *session),
                    )
                    .await?
                    .ok_or_else(|| {
                        AppError::Forbidden("Counterparty wallet not found.".to_string())
                    })?;

                // sender decremented before counterparty incremented; both
                // updates complete before either ledger row is inserted
                let sender_new = sender_balance.debit(&amount)?;
                let counterparty_new = wallet_balance(&counterparty_wallet)?.credit(&amount)?;

                wallets
                    .update_by_id(
                        sender_wallet.id,
                        &[("balance", Value::from(sender_new.value()))],
                        Some(&mut *session),
                    )
                    .await?;
                wallets
                    .update_by_id(
                        counterparty_wallet.id,
                        &[("balance", Value::from(counterparty_new.value()))],
                        Some(&mut *session),
                    )
                    .await?;

                let (debit, mut credit) = entries::transfer_legs(
                    &sender,
                    &sender_wallet,
                    &counterparty,
                    &counterparty_wallet,
                    &amount,
                    reference::next_reference(),
                    narration,
                );

                let debit_row = transactions.create(&debit, Some(&mut *session)).await?;
                credit.related_transaction_id = Some(debit_row.id);
                transactions.create(&credit, Some(&mut *session)).await?;

                Ok(debit_row)
            })
        })
        .await
    }

    /// Page through a user's ledger history.
    pub async fn get_transactions(
        &self,
        user_id: Uuid,
        filter: Filter,
        page: Page,
    ) -> AppResult<(Vec<LedgerTransaction>, PageMeta)> {
        let user = self
            .users
            .get_by_id(user_id, None)
            .await?
            .ok_or_else(|| AppError::Forbidden("User not found.".to_string()))?;

        let filter = filter.eq("user_id", user.id);
        let total = self.transactions.count(&filter, None).await?;
        let rows = self.transactions.list(&filter, &page, None).await?;

        Ok((rows, page.meta(total)))
    }

    /// Current wallet for a user.
    pub async fn get_balance(&self, user_id: Uuid) -> AppResult<Wallet> {
        let user = self
            .users
            .get_by_id(user_id, None)
            .await?
            .ok_or_else(|| AppError::Forbidden("User not found.".to_string()))?;

        self.wallets
            .get_one(&Filter::new().eq("user_id", user.id), None)
            .await?
            .ok_or_else(|| AppError::Forbidden("Wallet not found for this user.".to_string()))
    }
}

/// Load a user and their wallet inside the current scope, failing
/// `Forbidden` when either is missing.
async fn load_owner(
    users: &Repository<User>,
    wallets: &Repository<Wallet>,
    user_id: Uuid,
    session: &mut StoreSession,
) -> AppResult<(User, Wallet)> {
    let user = users
        .get_by_id(user_id, Some(&mut *session))
        .await?
        .ok_or_else(|| AppError::Forbidden("User not found.".to_string()))?;

    let wallet = wallets
        .get_one(&Filter::new().eq("user_id", user.id), Some(&mut *session))
        .await?
        .ok_or_else(|| AppError::Forbidden("Wallet not found for this user.".to_string()))?;

    Ok((user, wallet))
}

/// Decode a stored balance, treating a negative value as data corruption.
fn wallet_balance(wallet: &Wallet) -> AppResult<Balance> {
    Balance::new(wallet.balance)
        .map_err(|e| AppError::Internal(format!("wallet {} holds invalid balance: {e}", wallet.id)))
}
