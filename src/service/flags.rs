use crate::models::{ComplianceStatus, FlagSummary, InvoiceRecord, RiskEntry};

/// 汇总欺诈 / 合规标记, fraud_score >= threshold 视为高风险
pub fn summarize_flags(records: &[InvoiceRecord], threshold: f64) -> FlagSummary {
    let mut summary = FlagSummary {
        total_invoices: records.len(),
        ..FlagSummary::default()
    };

    for record in records {
        if record.is_flagged {
            summary.flagged_count += 1;
        }

        match record.compliance_status {
            ComplianceStatus::Compliant => summary.compliance.compliant += 1,
            ComplianceStatus::NeedsReview => summary.compliance.needs_review += 1,
            ComplianceStatus::Unknown => summary.compliance.unknown += 1,
        }

        for label in record.anomaly_flags.iter().flatten() {
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            *summary.anomaly_labels.entry(label.to_string()).or_insert(0) += 1;
        }

        if let Some(score) = record.fraud_score.filter(|s| s.is_finite()) {
            if score >= threshold {
                summary.high_risk.push(RiskEntry {
                    id: record.id.clone(),
                    vendor_name: record.vendor_key().to_string(),
                    fraud_score: score,
                });
            }
        }
    }

    summary.high_risk.sort_by(|a, b| {
        b.fraud_score
            .total_cmp(&a.fraud_score)
            .then_with(|| a.id.cmp(&b.id))
    });
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, score: Option<f64>, flags: &[&str]) -> InvoiceRecord {
        InvoiceRecord {
            id: id.to_string(),
            vendor_name: Some("Acme".to_string()),
            total_amount: None,
            category: None,
            created_at: Some("2024-01-01".to_string()),
            is_flagged: score.is_some_and(|s| s >= 0.5),
            compliance_status: ComplianceStatus::Unknown,
            fraud_score: score,
            anomaly_flags: Some(flags.iter().map(|f| f.to_string()).collect()),
        }
    }

    #[test]
    fn counts_flags_labels_and_high_risk() {
        let mut compliant = record("a", Some(0.2), &["duplicate"]);
        compliant.compliance_status = ComplianceStatus::Compliant;
        let records = vec![
            compliant,
            record("b", Some(0.9), &["round_amount", "duplicate"]),
            record("c", Some(0.75), &[]),
            record("d", Some(f64::NAN), &[" "]),
            record("e", None, &[]),
        ];

        let summary = summarize_flags(&records, 0.7);
        assert_eq!(summary.total_invoices, 5);
        assert_eq!(summary.flagged_count, 2);
        assert_eq!(summary.compliance.compliant, 1);
        assert_eq!(summary.compliance.unknown, 4);
        let labels: Vec<(&str, usize)> = summary
            .anomaly_labels
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        assert_eq!(labels, vec![("duplicate", 2), ("round_amount", 1)]);
        let ids: Vec<&str> = summary.high_risk.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }
}
