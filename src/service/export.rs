use crate::models::InvoiceRecord;
use csv::Writer;

const HEADER: [&str; 9] = [
    "id",
    "vendor_name",
    "category",
    "total_amount",
    "created_at",
    "is_flagged",
    "compliance_status",
    "fraud_score",
    "anomaly_flags",
];

/// 导出发票为 CSV (缺失值输出为空字段)
pub fn export_invoices_csv(
    records: &[InvoiceRecord],
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(HEADER)?;

    for record in records {
        writer.write_record(&[
            record.id.clone(),
            record.vendor_name.clone().unwrap_or_default(),
            record.category.clone().unwrap_or_default(),
            record
                .total_amount
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default(),
            record.created_at.clone().unwrap_or_default(),
            record.is_flagged.to_string(),
            record.compliance_status.as_str().to_string(),
            record.fraud_score.map(|s| s.to_string()).unwrap_or_default(),
            record
                .anomaly_flags
                .as_ref()
                .map(|flags| flags.join(";"))
                .unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.to_string())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ComplianceStatus;
    use bigdecimal::BigDecimal;
    use std::str::FromStr;

    #[test]
    fn writes_header_and_rows_with_empty_missing_fields() {
        let records = vec![InvoiceRecord {
            id: "inv-1".to_string(),
            vendor_name: Some("Acme, Inc.".to_string()),
            total_amount: BigDecimal::from_str("12.50").ok(),
            category: None,
            created_at: Some("2024-01-05T00:00:00Z".to_string()),
            is_flagged: true,
            compliance_status: ComplianceStatus::NeedsReview,
            fraud_score: None,
            anomaly_flags: Some(vec!["duplicate".to_string(), "weekend".to_string()]),
        }];

        let bytes = export_invoices_csv(&records).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("id,vendor_name,category,total_amount,created_at,is_flagged,compliance_status,fraud_score,anomaly_flags")
        );
        assert_eq!(
            lines.next(),
            Some("inv-1,\"Acme, Inc.\",,12.50,2024-01-05T00:00:00Z,true,needs_review,,duplicate;weekend")
        );
        assert_eq!(lines.next(), None);
    }
}
