use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Lifecycle of a debt: PENDING debts can be edited, paid or deleted;
/// PAID is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "debt_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum DebtStatus {
    Pending,
    Paid,
}

/// Debt record in the database. `user_id` is the owning user and never
/// changes after creation; `paid_at` is set exactly when status flips to PAID.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Debt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: Decimal,
    pub description: String,
    pub status: DebtStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
}

/// One `GROUP BY status` aggregate row for a user's debts.
#[derive(Debug, Clone, FromRow)]
pub struct StatusTotal {
    pub status: DebtStatus,
    pub count: i64,
    pub total: Decimal,
}

impl Debt {
    pub async fn insert(
        db: &PgPool,
        user_id: Uuid,
        amount: Decimal,
        description: &str,
    ) -> sqlx::Result<Debt> {
        sqlx::query_as::<_, Debt>(
            r#"
            INSERT INTO debts (user_id, amount, description)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, amount, description, status, created_at, paid_at
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> sqlx::Result<Option<Debt>> {
        sqlx::query_as::<_, Debt>(
            r#"
            SELECT id, user_id, amount, description, status, created_at, paid_at
            FROM debts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await
    }

    /// Most recent first; optional status filter.
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        status: Option<DebtStatus>,
    ) -> sqlx::Result<Vec<Debt>> {
        sqlx::query_as::<_, Debt>(
            r#"
            SELECT id, user_id, amount, description, status, created_at, paid_at
            FROM debts
            WHERE user_id = $1
              AND ($2::debt_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_all(db)
        .await
    }

    /// Partial update: unset fields keep their current value.
    pub async fn update(
        db: &PgPool,
        id: Uuid,
        amount: Option<Decimal>,
        description: Option<&str>,
    ) -> sqlx::Result<Debt> {
        sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debts
            SET amount = COALESCE($2, amount),
                description = COALESCE($3, description)
            WHERE id = $1
            RETURNING id, user_id, amount, description, status, created_at, paid_at
            "#,
        )
        .bind(id)
        .bind(amount)
        .bind(description)
        .fetch_one(db)
        .await
    }

    pub async fn mark_paid(db: &PgPool, id: Uuid) -> sqlx::Result<Debt> {
        sqlx::query_as::<_, Debt>(
            r#"
            UPDATE debts
            SET status = 'PAID', paid_at = now()
            WHERE id = $1
            RETURNING id, user_id, amount, description, status, created_at, paid_at
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await
    }

    pub async fn delete(db: &PgPool, id: Uuid) -> sqlx::Result<()> {
        sqlx::query("DELETE FROM debts WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        Ok(())
    }

    /// Count and sum per status in one read. Statuses with no rows are
    /// simply absent from the result.
    pub async fn status_totals(db: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<StatusTotal>> {
        sqlx::query_as::<_, StatusTotal>(
            r#"
            SELECT status, COUNT(*) AS count, COALESCE(SUM(amount), 0) AS total
            FROM debts
            WHERE user_id = $1
            GROUP BY status
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_json_uses_uppercase() {
        assert_eq!(
            serde_json::to_string(&DebtStatus::Pending).unwrap(),
            r#""PENDING""#
        );
        assert_eq!(serde_json::to_string(&DebtStatus::Paid).unwrap(), r#""PAID""#);
        let parsed: DebtStatus = serde_json::from_str(r#""PAID""#).unwrap();
        assert_eq!(parsed, DebtStatus::Paid);
    }

    #[test]
    fn debt_json_roundtrip_preserves_amount_scale() {
        let debt = Debt {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount: Decimal::new(1000, 2), // 10.00
            description: "rent".into(),
            status: DebtStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            paid_at: None,
        };
        let json = serde_json::to_string(&debt).unwrap();
        assert!(json.contains(r#""amount":"10.00""#));
        assert!(json.contains(r#""paid_at":null"#));
        let back: Debt = serde_json::from_str(&json).unwrap();
        assert_eq!(back.amount, debt.amount);
        assert_eq!(back.status, DebtStatus::Pending);
    }
}
