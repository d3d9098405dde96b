//! Ledger entry builders
//!
//! Pure construction of the rows each money movement appends to the
//! ledger. Balance-before/after are captured from the wallet state at the
//! instant of mutation; the builders never touch the store.

use uuid::Uuid;

use crate::domain::Amount;
use crate::model::{NewTransaction, TxKind, TxStatus, User, Wallet};

/// Credit entry for a deposit. The wallet balance is the pre-mutation
/// value; the counterparty is the fixed system account.
pub fn deposit_entry(
    wallet: &Wallet,
    amount: &Amount,
    reference: String,
    system_account_id: Uuid,
    narration: Option<String>,
) -> NewTransaction {
    let balance_before = wallet.balance;
    NewTransaction {
        transaction_reference: reference,
        user_id: wallet.user_id,
        counterparty_id: system_account_id,
        wallet_id: wallet.id,
        kind: TxKind::Credit,
        amount: amount.value(),
        currency: wallet.currency.clone(),
        balance_before,
        balance_after: balance_before + amount.value(),
        status: TxStatus::Successful,
        narration: narration.or_else(|| Some("Deposit".to_string())),
        category: Some("deposit".to_string()),
        related_transaction_id: None,
        metadata: None,
    }
}

/// Debit entry for a withdrawal. Sufficiency must already be checked.
pub fn withdrawal_entry(
    wallet: &Wallet,
    amount: &Amount,
    reference: String,
    system_account_id: Uuid,
) -> NewTransaction {
    let balance_before = wallet.balance;
    NewTransaction {
        transaction_reference: reference,
        user_id: wallet.user_id,
        counterparty_id: system_account_id,
        wallet_id: wallet.id,
        kind: TxKind::Debit,
        amount: amount.value(),
        currency: wallet.currency.clone(),
        balance_before,
        balance_after: balance_before - amount.value(),
        status: TxStatus::Successful,
        narration: Some("Withdrawal".to_string()),
        category: Some("withdrawal".to_string()),
        related_transaction_id: None,
        metadata: None,
    }
}

/// Both legs of a transfer, sharing one reference. Each leg's
/// before/after comes from its own wallet. The credit leg's
/// `related_transaction_id` is filled in once the debit leg is persisted.
pub fn transfer_legs(
    sender: &User,
    sender_wallet: &Wallet,
    counterparty: &User,
    counterparty_wallet: &Wallet,
    amount: &Amount,
    reference: String,
    narration: Option<String>,
) -> (NewTransaction, NewTransaction) {
    let debit = NewTransaction {
        transaction_reference: reference.clone(),
        user_id: sender.id,
        counterparty_id: counterparty.id,
        wallet_id: sender_wallet.id,
        kind: TxKind::Debit,
        amount: amount.value(),
        currency: sender_wallet.currency.clone(),
        balance_before: sender_wallet.balance,
        balance_after: sender_wallet.balance - amount.value(),
        status: TxStatus::Successful,
        narration: narration.or_else(|| {
            Some(format!("Transferred {} to {}", amount, counterparty.short_name()))
        }),
        category: Some("transfer".to_string()),
        related_transaction_id: None,
        metadata: None,
    };

    let credit = NewTransaction {
        transaction_reference: reference,
        user_id: counterparty.id,
        counterparty_id: sender.id,
        wallet_id: counterparty_wallet.id,
        kind: TxKind::Credit,
        amount: amount.value(),
        currency: counterparty_wallet.currency.clone(),
        balance_before: counterparty_wallet.balance,
        balance_after: counterparty_wallet.balance + amount.value(),
        status: TxStatus::Successful,
        narration: Some(format!("Received {} from {}", amount, sender.short_name())),
        category: Some("transfer".to_string()),
        related_transaction_id: None,
        metadata: None,
    };

    (debit, credit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn wallet_with_balance(user_id: Uuid, balance: i64) -> Wallet {
        Wallet {
            id: Uuid::new_v4(),
            user_id,
            email: "owner@example.com".to_string(),
            currency: "NGN".to_string(),
            balance: Decimal::from(balance),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn user_named(first_name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            password: "hash".to_string(),
            first_name: Some(first_name.to_string()),
            last_name: None,
            phone_number: None,
            salt: Some("salt".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_deposit_entry_balances() {
        // balance 1000, deposit 500 -> before 1000, after 1500
        let wallet = wallet_with_balance(Uuid::new_v4(), 1000);
        let amount = Amount::from_integer(500).unwrap();
        let system = Uuid::new_v4();

        let entry = deposit_entry(&wallet, &amount, "TX-REF".to_string(), system, None);

        assert_eq!(entry.kind, TxKind::Credit);
        assert_eq!(entry.balance_before, Decimal::from(1000));
        assert_eq!(entry.balance_after, Decimal::from(1500));
        assert_eq!(entry.counterparty_id, system);
        assert_eq!(entry.status, TxStatus::Successful);
        assert_eq!(entry.narration.as_deref(), Some("Deposit"));
    }

    #[test]
    fn test_withdrawal_entry_balances() {
        let wallet = wallet_with_balance(Uuid::new_v4(), 1000);
        let amount = Amount::from_integer(400).unwrap();

        let entry = withdrawal_entry(&wallet, &amount, "TX-REF".to_string(), Uuid::new_v4());

        assert_eq!(entry.kind, TxKind::Debit);
        assert_eq!(entry.balance_before, Decimal::from(1000));
        assert_eq!(entry.balance_after, Decimal::from(600));
    }

    #[test]
    fn test_transfer_legs_share_reference() {
        // sender 1000, counterparty 500, transfer 200
        let sender = user_named("John");
        let counterparty = user_named("Jane");
        let sender_wallet = wallet_with_balance(sender.id, 1000);
        let counterparty_wallet = wallet_with_balance(counterparty.id, 500);
        let amount = Amount::from_integer(200).unwrap();

        let (debit, credit) = transfer_legs(
            &sender,
            &sender_wallet,
            &counterparty,
            &counterparty_wallet,
            &amount,
            "TX-SHARED".to_string(),
            None,
        );

        assert_eq!(debit.transaction_reference, credit.transaction_reference);
        assert_eq!(debit.kind, TxKind::Debit);
        assert_eq!(credit.kind, TxKind::Credit);

        // each leg's before/after from its own wallet
        assert_eq!(debit.balance_before, Decimal::from(1000));
        assert_eq!(debit.balance_after, Decimal::from(800));
        assert_eq!(credit.balance_before, Decimal::from(500));
        assert_eq!(credit.balance_after, Decimal::from(700));

        // each leg points at the other party
        assert_eq!(debit.counterparty_id, counterparty.id);
        assert_eq!(credit.counterparty_id, sender.id);

        assert_eq!(debit.narration.as_deref(), Some("Transferred 200 to Jane"));
        assert_eq!(credit.narration.as_deref(), Some("Received 200 from John"));
    }

    #[test]
    fn test_transfer_custom_narration_only_on_debit_leg() {
        let sender = user_named("John");
        let counterparty = user_named("Jane");
        let sender_wallet = wallet_with_balance(sender.id, 1000);
        let counterparty_wallet = wallet_with_balance(counterparty.id, 0);
        let amount = Amount::from_integer(100).unwrap();

        let (debit, credit) = transfer_legs(
            &sender,
            &sender_wallet,
            &counterparty,
            &counterparty_wallet,
            &amount,
            "TX-SHARED".to_string(),
            Some("Rent".to_string()),
        );

        assert_eq!(debit.narration.as_deref(), Some("Rent"));
        assert_eq!(credit.narration.as_deref(), Some("Received 100 from John"));
    }
}
