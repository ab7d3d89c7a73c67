//! PostgreSQL schema migrations for leadmatch storage.

use sqlx::PgPool;

/// Run all PostgreSQL migrations.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            company_name TEXT NOT NULL,
            cnpj TEXT,
            website TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_companies_tenant ON companies (tenant_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS prospecting_candidates (
            id TEXT PRIMARY KEY,
            tenant_id TEXT NOT NULL,
            icp_id TEXT NOT NULL,
            source TEXT NOT NULL,
            source_batch_id TEXT NOT NULL,
            company_name TEXT NOT NULL,
            cnpj TEXT CHECK (cnpj IS NULL OR cnpj ~ '^[0-9]{14}$'),
            website TEXT,
            domain TEXT,
            sector TEXT,
            uf TEXT,
            city TEXT,
            country TEXT,
            contact_name TEXT,
            contact_role TEXT,
            contact_email TEXT,
            contact_phone TEXT,
            linkedin_url TEXT,
            notes TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Concurrent imports of the same CNPJ for one tenant collapse onto one row.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_candidates_tenant_cnpj
         ON prospecting_candidates (tenant_id, cnpj) WHERE cnpj IS NOT NULL",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_candidates_batch
         ON prospecting_candidates (tenant_id, source_batch_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("PostgreSQL migrations completed");
    Ok(())
}
