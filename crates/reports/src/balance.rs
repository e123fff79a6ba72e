//! Balance report - one row per open product, built by visiting products
//!
//! `BalanceReport` is a `ProductVisitor`: hand it to `Product::accept` (or
//! to a bank's `accept_all`) and it records credits and deposits in visit
//! order, keeping running totals for each side.

use crate::exporters::ReportData;
use chrono::{DateTime, Utc};
use minibank_core::{
    AccountId, ClientId, Credit, Deposit, FinancialProduct, Product, ProductId, ProductKind,
    ProductVisitor,
};
use rust_decimal::Decimal;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceRow {
    pub product_id: ProductId,
    pub kind: ProductKind,
    pub owner_id: ClientId,
    pub funding_account: AccountId,
    pub balance: Decimal,
    pub rate: Decimal,
}

impl BalanceRow {
    fn of(product: &dyn FinancialProduct) -> Self {
        Self {
            product_id: product.id(),
            kind: product.kind(),
            owner_id: product.owner_id(),
            funding_account: product.funding_account(),
            balance: product.balance(),
            rate: product.interests(),
        }
    }
}

/// Balance report across credits and deposits
#[derive(Debug, Clone)]
pub struct BalanceReport {
    pub title: String,
    pub rows: Vec<BalanceRow>,
    /// Sum of what is owed on credits (positive)
    pub outstanding_debt: Decimal,
    /// Sum of deposit balances
    pub deposited: Decimal,
    pub generated_at: DateTime<Utc>,
}

impl BalanceReport {
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            rows: Vec::new(),
            outstanding_debt: Decimal::ZERO,
            deposited: Decimal::ZERO,
            generated_at: Utc::now(),
        }
    }

    /// Build a report from any collection of products
    pub fn collect<'a, I>(title: &str, products: I) -> Self
    where
        I: IntoIterator<Item = Product<'a>>,
    {
        let mut report = Self::new(title);
        for product in products {
            product.accept(&mut report);
        }
        report
    }

    /// Deposits minus debt
    pub fn net_position(&self) -> Decimal {
        self.deposited - self.outstanding_debt
    }

    pub fn count(&self, kind: ProductKind) -> usize {
        self.rows.iter().filter(|row| row.kind == kind).count()
    }
}

impl ProductVisitor for BalanceReport {
    fn visit_credit(&mut self, credit: &Credit) {
        self.outstanding_debt += credit.outstanding();
        self.rows.push(BalanceRow::of(credit));
    }

    fn visit_deposit(&mut self, deposit: &Deposit) {
        self.deposited += deposit.balance();
        self.rows.push(BalanceRow::of(deposit));
    }
}

impl ReportData for BalanceReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Product".to_string(),
            "Kind".to_string(),
            "Owner".to_string(),
            "Account".to_string(),
            "Balance".to_string(),
            "Rate".to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                vec![
                    row.product_id.to_string(),
                    row.kind.to_string(),
                    row.owner_id.to_string(),
                    row.funding_account.to_string(),
                    row.balance.to_string(),
                    row.rate.to_string(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        vec![
            ("Credits".to_string(), self.count(ProductKind::Credit).to_string()),
            ("Deposits".to_string(), self.count(ProductKind::Deposit).to_string()),
            ("Outstanding Debt".to_string(), self.outstanding_debt.to_string()),
            ("Deposited".to_string(), self.deposited.to_string()),
            ("Net Position".to_string(), self.net_position().to_string()),
            ("Generated At".to_string(), self.generated_at.to_rfc3339()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::{CsvExporter, ReportExporter};
    use minibank_core::{BankAccount, FlatRate, ZeroRate};
    use rust_decimal_macros::dec;

    fn account() -> BankAccount {
        BankAccount::with_balance(AccountId(1), ClientId(1), dec!(0), ZeroRate::shared())
    }

    #[test]
    fn test_balance_report_visits_products() {
        let account = account();
        let credit = Credit::open(ProductId(1), &account, dec!(300), FlatRate::shared(dec!(0.08)).unwrap());
        let small = Deposit::open(ProductId(2), &account, dec!(100), ZeroRate::shared());
        let large = Deposit::open(ProductId(3), &account, dec!(500), ZeroRate::shared());

        let report = BalanceReport::collect(
            "Balances",
            vec![Product::from(&credit), Product::from(&small), Product::from(&large)],
        );

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.count(ProductKind::Credit), 1);
        assert_eq!(report.count(ProductKind::Deposit), 2);
        assert_eq!(report.outstanding_debt, dec!(300));
        assert_eq!(report.deposited, dec!(600));
        assert_eq!(report.net_position(), dec!(300));
        assert_eq!(report.rows[0].balance, dec!(-300));
        assert_eq!(report.rows[0].rate, dec!(0.08));
    }

    #[test]
    fn test_balance_report_export() {
        let account = account();
        let credit = Credit::open(ProductId(7), &account, dec!(50), ZeroRate::shared());
        let mut report = BalanceReport::new("Balances");
        credit.accept(&mut report);

        let csv = CsvExporter::new().export(&report).unwrap();
        assert!(csv.contains("Product,Kind,Owner,Account,Balance,Rate"));
        assert!(csv.contains("PRD_007,credit,CLI_001,ACC_001,-50,0"));
    }
}
