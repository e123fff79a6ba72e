//! Bank aggregate - client registry, accounts, products and history
//!
//! `Bank` owns every entity and the single `History`, allocates ids, and
//! routes each request to the matching operation engine. Registry checks
//! (existence, ownership, uniqueness) live here; balance rules live in the
//! engines and the core types.

use crate::account_ops::BankAccountOperation;
use crate::config::BankConfig;
use crate::credit_ops::CreditOperation;
use crate::deposit_ops::DepositOperation;
use crate::error::{BankError, BankResult, OperationError};
use crate::guards::{draw, ensure_positive, rejected};
use anyhow::Context;
use minibank_core::{
    AccountId, AccountKind, Ack, BankAccount, Client, ClientId, Credit, Deposit, FinancialProduct,
    History, IdAllocator, OperationKind, Product, ProductId, ProductVisitor, SharedMechanism,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Outcome of `Bank::repay_credit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repayment {
    /// Part of the debt was repaid; the credit stays open
    Installment { paid: Decimal, outstanding: Decimal },
    /// The payment covered the whole debt; the credit was settled and removed
    PaidOff { paid: Decimal },
}

/// The bank: owns clients, accounts, credits, deposits and the history
#[derive(Debug)]
pub struct Bank {
    config: BankConfig,
    ids: IdAllocator,
    clients: BTreeMap<ClientId, Client>,
    accounts: BTreeMap<AccountId, BankAccount>,
    credits: BTreeMap<ProductId, Credit>,
    deposits: BTreeMap<ProductId, Deposit>,
    history: History,
    account_rate: SharedMechanism,
    credit_rate: SharedMechanism,
    deposit_rate: SharedMechanism,
}

impl Bank {
    /// Create an empty bank from a validated configuration
    pub fn new(config: BankConfig) -> BankResult<Self> {
        config.validate()?;
        let account_rate = config
            .default_account_rate
            .build()
            .context("Failed to build default account rate")?;
        let credit_rate = config
            .default_credit_rate
            .build()
            .context("Failed to build default credit rate")?;
        let deposit_rate = config
            .default_deposit_rate
            .build()
            .context("Failed to build default deposit rate")?;

        Ok(Self {
            ids: IdAllocator::seeded(config.id_seed),
            config,
            clients: BTreeMap::new(),
            accounts: BTreeMap::new(),
            credits: BTreeMap::new(),
            deposits: BTreeMap::new(),
            history: History::new(),
            account_rate,
            credit_rate,
            deposit_rate,
        })
    }

    // === Clients ===

    /// Register a client; national ids must be unique
    pub fn add_new_client(
        &mut self,
        first_name: &str,
        last_name: &str,
        national_id: &str,
    ) -> BankResult<ClientId> {
        if self.clients.values().any(|c| c.national_id == national_id) {
            warn!(national_id, "Client already registered");
            return Err(BankError::ClientAlreadyExists(national_id.to_string()).into());
        }

        let id = self.ids.next_client();
        let client = Client::new(id, first_name, last_name, national_id);
        self.history
            .append(Ack::new(OperationKind::AddNewClient, id, &client.full_name()));
        info!(client_id = %id, name = %client.full_name(), "Client added");
        self.clients.insert(id, client);
        Ok(id)
    }

    /// Remove a client that no longer owns any account
    pub fn delete_client_by_id(&mut self, id: ClientId) -> BankResult<Client> {
        self.require_client(id)?;
        let accounts = self.accounts.values().filter(|a| a.owner_id() == id).count();
        if accounts > 0 {
            warn!(client_id = %id, accounts, "Client still owns accounts");
            return Err(BankError::ClientHasAccounts {
                client_id: id,
                accounts,
            }
            .into());
        }

        let client = self
            .clients
            .remove(&id)
            .ok_or(BankError::ClientNotFound(id))?;
        self.history
            .append(Ack::new(OperationKind::DeleteClient, id, &client.full_name()));
        info!(client_id = %id, "Client deleted");
        Ok(client)
    }

    pub fn client_exists(&self, id: ClientId) -> bool {
        self.clients.contains_key(&id)
    }

    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    // === Accounts ===

    pub fn add_new_normal_account(
        &mut self,
        owner_id: ClientId,
        description: &str,
    ) -> BankResult<AccountId> {
        self.require_client(owner_id)?;
        let account = BankAccountOperation::create_normal_account(
            &mut self.ids,
            owner_id,
            self.account_rate.clone(),
            &mut self.history,
            description,
        );
        let id = account.id();
        self.accounts.insert(id, account);
        Ok(id)
    }

    /// Open a debit account; without a limit the configured default applies
    pub fn add_new_debit_account(
        &mut self,
        owner_id: ClientId,
        limit: Option<Decimal>,
        description: &str,
    ) -> BankResult<AccountId> {
        self.require_client(owner_id)?;
        let limit = limit.unwrap_or(self.config.default_debit_limit);
        let account = BankAccountOperation::create_debit_account(
            &mut self.ids,
            owner_id,
            limit,
            self.account_rate.clone(),
            &mut self.history,
            description,
        )
        .with_context(|| format!("Failed to open debit account for {}", owner_id))?;
        let id = account.id();
        self.accounts.insert(id, account);
        Ok(id)
    }

    pub fn payment(&mut self, account_id: AccountId, amount: Decimal, description: &str) -> BankResult<()> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        BankAccountOperation::payment(account, amount, &mut self.history, description)
            .with_context(|| format!("Payment to {} failed", account_id))
    }

    pub fn withdraw(&mut self, account_id: AccountId, amount: Decimal, description: &str) -> BankResult<()> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        BankAccountOperation::withdraw(account, amount, &mut self.history, description)
            .with_context(|| format!("Withdrawal from {} failed", account_id))
    }

    pub fn transfer_between_accounts(
        &mut self,
        from: AccountId,
        to: AccountId,
        amount: Decimal,
        description: &str,
    ) -> BankResult<()> {
        if from == to {
            return Err(rejected("transfer_between_accounts", OperationError::SameAccount(from)).into());
        }

        // Take the source out so both accounts can be borrowed mutably
        let mut source = self
            .accounts
            .remove(&from)
            .ok_or(BankError::AccountNotFound(from))?;
        let result = match self.accounts.get_mut(&to) {
            Some(target) => BankAccountOperation::transfer_from_to(
                &mut source,
                target,
                amount,
                &mut self.history,
                description,
            )
            .map_err(anyhow::Error::from),
            None => Err(BankError::AccountNotFound(to).into()),
        };
        self.accounts.insert(from, source);

        result.with_context(|| format!("Transfer from {} to {} failed", from, to))
    }

    /// Apply one interest period to an account; returns the signed change
    pub fn accrue_account_interest(
        &mut self,
        account_id: AccountId,
        description: &str,
    ) -> BankResult<Decimal> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        BankAccountOperation::pay_percentage(account, &mut self.history, description)
            .with_context(|| format!("Interest on {} failed", account_id))
    }

    pub fn change_account_percentage(
        &mut self,
        account_id: AccountId,
        mechanism: SharedMechanism,
        description: &str,
    ) -> BankResult<()> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        BankAccountOperation::change_percentage(account, mechanism, &mut self.history, description);
        Ok(())
    }

    /// Switch an account between normal and debit; returns the previous kind
    pub fn change_account_type(
        &mut self,
        account_id: AccountId,
        kind: AccountKind,
        description: &str,
    ) -> BankResult<AccountKind> {
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        BankAccountOperation::change_account_type(account, kind, &mut self.history, description)
            .with_context(|| format!("Type change of {} failed", account_id))
    }

    // === Deposits ===

    /// Open a deposit funded from `account_id`; the principal leaves the account
    pub fn add_new_deposit(
        &mut self,
        owner_id: ClientId,
        account_id: AccountId,
        amount: Decimal,
        mechanism: Option<SharedMechanism>,
        description: &str,
    ) -> BankResult<ProductId> {
        self.require_owned_account(owner_id, account_id)?;
        ensure_positive(amount).map_err(|e| rejected("add_new_deposit", e))?;

        let mechanism = mechanism.unwrap_or_else(|| self.deposit_rate.clone());
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        draw(account, amount)
            .map_err(|e| rejected("add_new_deposit", e))
            .with_context(|| format!("Failed to fund deposit from {}", account_id))?;

        let deposit = DepositOperation::create_deposit(
            &mut self.ids,
            account,
            amount,
            owner_id,
            Some(mechanism),
            &mut self.history,
            description,
        );
        let id = deposit.id();
        self.deposits.insert(id, deposit);
        Ok(id)
    }

    /// Close a deposit with interest; returns the payout
    pub fn solve_deposit(&mut self, deposit_id: ProductId, description: &str) -> BankResult<Decimal> {
        let deposit = self
            .deposits
            .get_mut(&deposit_id)
            .ok_or(BankError::DepositNotFound(deposit_id))?;
        let account_id = deposit.funding_account();
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;

        let payout = DepositOperation::solve_deposit(deposit, account, &mut self.history, description)
            .with_context(|| format!("Failed to solve {}", deposit_id))?;
        self.deposits.remove(&deposit_id);
        Ok(payout)
    }

    /// Close a deposit early without interest; returns the principal
    pub fn break_up_deposit(&mut self, deposit_id: ProductId, description: &str) -> BankResult<Decimal> {
        let deposit = self
            .deposits
            .get_mut(&deposit_id)
            .ok_or(BankError::DepositNotFound(deposit_id))?;
        let account_id = deposit.funding_account();
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;

        let principal =
            DepositOperation::break_up_deposit(deposit, account, &mut self.history, description)
                .with_context(|| format!("Failed to break up {}", deposit_id))?;
        self.deposits.remove(&deposit_id);
        Ok(principal)
    }

    /// Move money into (positive) or out of (negative) a deposit.
    ///
    /// A deposit emptied this way is settled and removed.
    pub fn top_up_deposit(
        &mut self,
        deposit_id: ProductId,
        amount: Decimal,
        description: &str,
    ) -> BankResult<()> {
        let deposit = self
            .deposits
            .get_mut(&deposit_id)
            .ok_or(BankError::DepositNotFound(deposit_id))?;
        let account_id = deposit.funding_account();
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;

        DepositOperation::transfer(deposit, account, amount, &mut self.history, description)
            .with_context(|| format!("Transfer for {} failed", deposit_id))?;
        if deposit.is_settled() {
            self.deposits.remove(&deposit_id);
        }
        Ok(())
    }

    pub fn change_deposit_percentage(
        &mut self,
        deposit_id: ProductId,
        mechanism: SharedMechanism,
        description: &str,
    ) -> BankResult<()> {
        let deposit = self
            .deposits
            .get_mut(&deposit_id)
            .ok_or(BankError::DepositNotFound(deposit_id))?;
        DepositOperation::change_percentage(deposit, mechanism, &mut self.history, description);
        Ok(())
    }

    // === Credits ===

    /// Open a credit against `account_id`; the principal is paid out to the account
    pub fn add_new_credit(
        &mut self,
        owner_id: ClientId,
        account_id: AccountId,
        amount: Decimal,
        mechanism: Option<SharedMechanism>,
        description: &str,
    ) -> BankResult<ProductId> {
        self.require_owned_account(owner_id, account_id)?;
        ensure_positive(amount).map_err(|e| rejected("add_new_credit", e))?;

        let mechanism = mechanism.unwrap_or_else(|| self.credit_rate.clone());
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        account
            .increase_balance(amount)
            .with_context(|| format!("Failed to disburse credit to {}", account_id))?;

        let credit = CreditOperation::create_credit(
            &mut self.ids,
            account,
            amount,
            owner_id,
            Some(mechanism),
            &mut self.history,
            description,
        );
        let id = credit.id();
        self.credits.insert(id, credit);
        Ok(id)
    }

    /// Repay a credit from its funding account.
    ///
    /// A payment larger than the debt settles the credit instead; if the
    /// account cannot cover the full debt either, the error is returned
    /// and nothing changes.
    pub fn repay_credit(
        &mut self,
        credit_id: ProductId,
        amount: Decimal,
        description: &str,
    ) -> BankResult<Repayment> {
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(BankError::CreditNotFound(credit_id))?;
        let account_id = credit.funding_account();
        let account = self
            .accounts
            .get_mut(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;

        match CreditOperation::transfer(credit, account, amount, &mut self.history, description) {
            Ok(()) if credit.is_settled() => {
                self.credits.remove(&credit_id);
                info!(credit_id = %credit_id, paid = %amount, "Credit repaid in full");
                Ok(Repayment::PaidOff { paid: amount })
            }
            Ok(()) => Ok(Repayment::Installment {
                paid: amount,
                outstanding: credit.outstanding(),
            }),
            Err(err) if err.is_overpayment() => {
                let paid =
                    CreditOperation::pay_off_credit(credit, account, &mut self.history, description)
                        .with_context(|| format!("Failed to pay off {}", credit_id))?;
                self.credits.remove(&credit_id);
                Ok(Repayment::PaidOff { paid })
            }
            Err(err) => Err(err).with_context(|| format!("Failed to repay {}", credit_id)),
        }
    }

    /// Accrue one period of interest on a credit; returns the interest charged
    pub fn accrue_credit_interest(
        &mut self,
        credit_id: ProductId,
        description: &str,
    ) -> BankResult<Decimal> {
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(BankError::CreditNotFound(credit_id))?;
        CreditOperation::pay_percentage(credit, &mut self.history, description)
            .with_context(|| format!("Interest on {} failed", credit_id))
    }

    pub fn change_credit_percentage(
        &mut self,
        credit_id: ProductId,
        mechanism: SharedMechanism,
        description: &str,
    ) -> BankResult<()> {
        let credit = self
            .credits
            .get_mut(&credit_id)
            .ok_or(BankError::CreditNotFound(credit_id))?;
        CreditOperation::change_percentage(credit, mechanism, &mut self.history, description);
        Ok(())
    }

    // === Accessors ===

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn account(&self, id: AccountId) -> Option<&BankAccount> {
        self.accounts.get(&id)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &BankAccount> {
        self.accounts.values()
    }

    pub fn accounts_of(&self, owner_id: ClientId) -> Vec<&BankAccount> {
        self.accounts
            .values()
            .filter(|a| a.owner_id() == owner_id)
            .collect()
    }

    pub fn credit(&self, id: ProductId) -> Option<&Credit> {
        self.credits.get(&id)
    }

    pub fn deposit(&self, id: ProductId) -> Option<&Deposit> {
        self.deposits.get(&id)
    }

    /// Every open product, ordered by id
    pub fn products(&self) -> Vec<Product<'_>> {
        let mut products: Vec<Product<'_>> = self
            .credits
            .values()
            .map(Product::from)
            .chain(self.deposits.values().map(Product::from))
            .collect();
        products.sort_by_key(|p| p.id());
        products
    }

    /// Walk every open product with `visitor`
    pub fn accept_all(&self, visitor: &mut dyn ProductVisitor) {
        for product in self.products() {
            product.accept(visitor);
        }
    }

    // === Registry checks ===

    fn require_client(&self, id: ClientId) -> Result<&Client, BankError> {
        self.clients.get(&id).ok_or_else(|| {
            warn!(client_id = %id, "Unknown client");
            BankError::ClientNotFound(id)
        })
    }

    fn require_owned_account(
        &self,
        owner_id: ClientId,
        account_id: AccountId,
    ) -> Result<&BankAccount, BankError> {
        self.require_client(owner_id)?;
        let account = self
            .accounts
            .get(&account_id)
            .ok_or(BankError::AccountNotFound(account_id))?;
        if account.owner_id() != owner_id {
            warn!(account_id = %account_id, client_id = %owner_id, "Account owned by another client");
            return Err(BankError::NotAccountOwner {
                account_id,
                client_id: owner_id,
            });
        }
        Ok(account)
    }
}
