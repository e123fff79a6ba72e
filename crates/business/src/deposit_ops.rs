//! Deposit operations - open, mature, break, top up
//!
//! Closing a deposit pays its balance back into the funding account and
//! leaves the deposit settled. `solve_deposit` pays the interest as well,
//! `break_up_deposit` only the principal.

use crate::error::{OperationError, OperationResult};
use crate::guards::{
    checked_sum, draw, ensure_absorbs, ensure_covered, ensure_funded_by, ensure_open, rejected,
};
use minibank_core::{
    Ack, BankAccount, ClientId, CoreError, Deposit, FinancialProduct, History, IdAllocator,
    OperationKind, SharedMechanism,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Engine for deposit operations
pub struct DepositOperation;

impl DepositOperation {
    /// Open a deposit of `|initial_balance|` against `funding_account`.
    ///
    /// Without an explicit mechanism the deposit uses the account's one.
    /// Moving the principal out of the account is up to the caller.
    pub fn create_deposit(
        ids: &mut IdAllocator,
        funding_account: &BankAccount,
        initial_balance: Decimal,
        owner_id: ClientId,
        mechanism: Option<SharedMechanism>,
        history: &mut History,
        description: &str,
    ) -> Deposit {
        let mechanism = mechanism.unwrap_or_else(|| funding_account.mechanism().clone());
        let deposit = Deposit::open_for(
            ids.next_product(),
            funding_account,
            owner_id,
            initial_balance,
            mechanism,
        );

        history.append(
            Ack::new(OperationKind::CreateDeposit, owner_id, description)
                .with_account(funding_account.id())
                .with_product(deposit.id()),
        );
        info!(
            deposit_id = %deposit.id(),
            account_id = %funding_account.id(),
            balance = %deposit.balance(),
            mechanism = deposit.mechanism().name(),
            "Deposit created"
        );
        deposit
    }

    /// Close the deposit at maturity.
    ///
    /// The account receives `balance + balance * interests()`; returns that payout.
    pub fn solve_deposit(
        deposit: &mut Deposit,
        funding_account: &mut BankAccount,
        history: &mut History,
        description: &str,
    ) -> OperationResult<Decimal> {
        Self::check_close(deposit, funding_account).map_err(|e| rejected("solve_deposit", e))?;

        let interest = deposit
            .accrued_interest()
            .map_err(|e| rejected("solve_deposit", e.into()))?;
        let payout = checked_sum(deposit.balance(), interest)
            .and_then(|payout| ensure_absorbs(funding_account, payout).map(|_| payout))
            .map_err(|e| rejected("solve_deposit", e))?;
        debug!(deposit_id = %deposit.id(), rate = %deposit.interests(), %interest, "Deposit interest computed");

        deposit.accrue(interest)?;
        deposit.settle();
        funding_account.increase_balance(payout)?;

        history.append(
            Ack::new(OperationKind::SolveDeposit, deposit.owner_id(), description)
                .with_account(funding_account.id())
                .with_product(deposit.id()),
        );
        info!(
            deposit_id = %deposit.id(),
            account_id = %funding_account.id(),
            %payout,
            "Deposit solved"
        );
        Ok(payout)
    }

    /// Close the deposit early; only the principal goes back to the account
    pub fn break_up_deposit(
        deposit: &mut Deposit,
        funding_account: &mut BankAccount,
        history: &mut History,
        description: &str,
    ) -> OperationResult<Decimal> {
        Self::check_close(deposit, funding_account)
            .and_then(|_| ensure_absorbs(funding_account, deposit.balance()))
            .map_err(|e| rejected("break_up_deposit", e))?;

        let principal = deposit.settle();
        funding_account.increase_balance(principal)?;

        history.append(
            Ack::new(OperationKind::BreakDeposit, deposit.owner_id(), description)
                .with_account(funding_account.id())
                .with_product(deposit.id()),
        );
        info!(
            deposit_id = %deposit.id(),
            account_id = %funding_account.id(),
            %principal,
            "Deposit broken up"
        );
        Ok(principal)
    }

    /// Swap the interest mechanism; allowed on settled deposits too
    pub fn change_percentage(
        deposit: &mut Deposit,
        mechanism: SharedMechanism,
        history: &mut History,
        description: &str,
    ) -> SharedMechanism {
        let previous = deposit.replace_mechanism(mechanism);
        history.append(
            Ack::new(OperationKind::ChangePercentage, deposit.owner_id(), description)
                .with_account(deposit.funding_account())
                .with_product(deposit.id()),
        );
        info!(
            deposit_id = %deposit.id(),
            from = previous.name(),
            to = deposit.mechanism().name(),
            "Deposit interest mechanism changed"
        );
        previous
    }

    /// Move money between the funding account and the deposit.
    ///
    /// A positive `amount` tops the deposit up from the account, a negative
    /// one withdraws part of the principal back. The deposit may not go
    /// below zero.
    pub fn transfer(
        deposit: &mut Deposit,
        funding_account: &mut BankAccount,
        amount: Decimal,
        history: &mut History,
        description: &str,
    ) -> OperationResult<()> {
        Self::check_transfer(deposit, funding_account, amount)
            .map_err(|e| rejected("deposit_transfer", e))?;

        if amount > Decimal::ZERO {
            draw(funding_account, amount)?;
            deposit.increase_balance(amount)?;
        } else {
            deposit.increase_balance(amount)?;
            funding_account.increase_balance(-amount)?;
        }

        history.append(
            Ack::new(OperationKind::Transfer, deposit.owner_id(), description)
                .with_account(funding_account.id())
                .with_product(deposit.id()),
        );
        info!(
            deposit_id = %deposit.id(),
            account_id = %funding_account.id(),
            %amount,
            balance = %deposit.balance(),
            "Deposit transfer completed"
        );
        Ok(())
    }

    fn check_close(deposit: &Deposit, funding_account: &BankAccount) -> OperationResult<()> {
        ensure_open(deposit)?;
        ensure_funded_by(deposit, funding_account)
    }

    fn check_transfer(
        deposit: &Deposit,
        funding_account: &BankAccount,
        amount: Decimal,
    ) -> OperationResult<()> {
        if amount.is_zero() {
            return Err(OperationError::InvalidAmount(amount));
        }
        Self::check_close(deposit, funding_account)?;

        if amount > Decimal::ZERO {
            ensure_covered(funding_account, amount)?;
            checked_sum(deposit.balance(), amount)?;
        } else if !deposit.admits(deposit.balance() + amount) {
            return Err(CoreError::SignViolation {
                product_id: deposit.id(),
                kind: deposit.kind(),
                balance: deposit.balance(),
                change: amount,
            }
            .into());
        } else {
            ensure_absorbs(funding_account, -amount)?;
        }
        Ok(())
    }
}
