use crate::models::InvoiceRow;
use sqlx::PgPool;

/// 用户发票查询; 参数侧转换为 uuid, user_id 索引可用
const LIST_INVOICES_SQL: &str = r#"
        SELECT id::text AS id,
               vendor_name,
               total_amount,
               category,
               to_char(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at,
               is_flagged,
               compliance_status,
               fraud_score,
               anomaly_flags
        FROM invoices
        WHERE user_id = $1::uuid
        ORDER BY invoices.created_at ASC, invoices.id ASC
        "#;

/// 查询用户的全部发票 (按创建时间升序)
///
/// created_at 以 UTC RFC3339 文本返回, 由聚合器负责解析。
pub async fn list_invoices_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<InvoiceRow>, sqlx::Error> {
    sqlx::query_as::<_, InvoiceRow>(LIST_INVOICES_SQL)
        .bind(user_id)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_filter_casts_the_parameter_not_the_column() {
        assert!(LIST_INVOICES_SQL.contains("WHERE user_id = $1::uuid"));
        assert!(!LIST_INVOICES_SQL.contains("user_id::text"));
    }
}
