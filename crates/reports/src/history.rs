//! History report - the audit trail as a table

use crate::exporters::ReportData;
use chrono::{DateTime, Utc};
use minibank_core::{Ack, ClientId, History, OperationKind};
use std::collections::BTreeMap;

/// Audit trail report, optionally narrowed to one actor or operation kind
#[derive(Debug, Clone)]
pub struct HistoryReport {
    pub title: String,
    pub entries: Vec<Ack>,
    pub generated_at: DateTime<Utc>,
}

impl HistoryReport {
    pub fn new(title: &str, entries: Vec<Ack>) -> Self {
        Self {
            title: title.to_string(),
            entries,
            generated_at: Utc::now(),
        }
    }

    /// Every entry of the history
    pub fn from_history(title: &str, history: &History) -> Self {
        Self::new(title, history.iter().cloned().collect())
    }

    pub fn for_actor(title: &str, history: &History, actor: ClientId) -> Self {
        Self::new(title, history.by_actor(actor).into_iter().cloned().collect())
    }

    pub fn for_kind(title: &str, history: &History, kind: OperationKind) -> Self {
        Self::new(title, history.by_kind(kind).into_iter().cloned().collect())
    }

    /// Number of entries per operation kind
    pub fn counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for ack in &self.entries {
            *counts.entry(ack.kind.as_str()).or_insert(0) += 1;
        }
        counts
    }
}

impl ReportData for HistoryReport {
    fn title(&self) -> &str {
        &self.title
    }

    fn headers(&self) -> Vec<String> {
        vec![
            "Seq".to_string(),
            "Timestamp".to_string(),
            "Operation".to_string(),
            "Actor".to_string(),
            "Account".to_string(),
            "Product".to_string(),
            "Description".to_string(),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.entries
            .iter()
            .map(|ack| {
                vec![
                    ack.sequence.to_string(),
                    ack.timestamp.to_rfc3339(),
                    ack.kind.to_string(),
                    ack.actor.to_string(),
                    ack.account.map(|a| a.to_string()).unwrap_or_default(),
                    ack.product.map(|p| p.to_string()).unwrap_or_default(),
                    ack.description.clone(),
                ]
            })
            .collect()
    }

    fn summary(&self) -> Vec<(String, String)> {
        let mut summary = vec![("Entries".to_string(), self.entries.len().to_string())];
        summary.extend(
            self.counts()
                .into_iter()
                .map(|(kind, count)| (kind.to_string(), count.to_string())),
        );
        summary.push(("Generated At".to_string(), self.generated_at.to_rfc3339()));
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporters::{MarkdownExporter, ReportExporter};
    use minibank_core::{AccountId, ProductId};

    fn history() -> History {
        let mut history = History::new();
        history.append(Ack::new(OperationKind::AddNewClient, ClientId(1), "Jan Kowalski"));
        history.append(
            Ack::new(OperationKind::CreateAccount, ClientId(1), "main").with_account(AccountId(1)),
        );
        history.append(
            Ack::new(OperationKind::CreateCredit, ClientId(1), "car")
                .with_account(AccountId(1))
                .with_product(ProductId(1)),
        );
        history.append(Ack::new(OperationKind::AddNewClient, ClientId(2), "Anna Nowak"));
        history
    }

    #[test]
    fn test_history_report_filters() {
        let history = history();

        assert_eq!(HistoryReport::from_history("All", &history).entries.len(), 4);
        assert_eq!(HistoryReport::for_actor("Jan", &history, ClientId(1)).entries.len(), 3);

        let clients = HistoryReport::for_kind("Clients", &history, OperationKind::AddNewClient);
        assert_eq!(clients.entries.len(), 2);
        assert_eq!(clients.counts().get("ADD_NEW_CLIENT"), Some(&2));
    }

    #[test]
    fn test_history_report_markdown() {
        let report = HistoryReport::from_history("Audit", &history());
        let output = MarkdownExporter::new().export(&report).unwrap();

        assert!(output.contains("# Audit"));
        assert!(output.contains("- **Entries**: 4"));
        assert!(output.contains("- **CREATE_CREDIT**: 1"));
        assert!(output.contains("| 3 |"));
        assert!(output.contains("| PRD_001 | car |"));
    }
}
