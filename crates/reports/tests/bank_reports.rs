//! Reports built from a live `Bank`

use minibank_business::{Bank, BankConfig};
use minibank_core::{OperationKind, ProductKind};
use minibank_reports::{
    read_jsonl, write_jsonl, BalanceReport, CsvExporter, HistoryReport, JsonExporter,
    ReportExporter,
};
use rust_decimal_macros::dec;

fn bank_with_products() -> Bank {
    let mut bank = Bank::new(BankConfig::default()).unwrap();
    let jan = bank.add_new_client("Jan", "Kowalski", "90010112345").unwrap();
    let account = bank.add_new_normal_account(jan, "main").unwrap();
    bank.payment(account, dec!(10000), "salary").unwrap();
    bank.add_new_credit(jan, account, dec!(2000), None, "car").unwrap();
    bank.add_new_deposit(jan, account, dec!(5000), None, "savings").unwrap();
    bank
}

#[test]
fn balance_report_covers_open_products() {
    let bank = bank_with_products();

    let mut report = BalanceReport::new("Balances");
    bank.accept_all(&mut report);

    assert_eq!(report.count(ProductKind::Credit), 1);
    assert_eq!(report.count(ProductKind::Deposit), 1);
    assert_eq!(report.outstanding_debt, dec!(2000));
    assert_eq!(report.deposited, dec!(5000));
    // Products come out ordered by id: credit PRD_001, deposit PRD_002
    assert_eq!(report.rows[1].rate, dec!(0.03));

    let csv = CsvExporter::new().export(&report).unwrap();
    assert_eq!(csv.lines().count(), 3);
}

#[test]
fn history_report_and_jsonl_match_bank_history() {
    let bank = bank_with_products();
    let history = bank.history();

    let report = HistoryReport::from_history("Audit", history);
    assert_eq!(report.entries.len(), history.len());
    assert_eq!(report.counts().get("CREATE_CREDIT"), Some(&1));

    let json = JsonExporter::new().compact().export(&report).unwrap();
    assert!(json.contains("\"Operation\":\"PAYMENT\""));

    let mut buffer = Vec::new();
    let written = write_jsonl(history, &mut buffer).unwrap();
    let acks = read_jsonl(buffer.as_slice()).unwrap();

    assert_eq!(written, history.len());
    assert_eq!(acks.as_slice(), history.as_slice());
    assert_eq!(acks[0].kind, OperationKind::AddNewClient);
    assert_eq!(acks.last().map(|a| a.sequence), Some(history.len() as u64));
}
