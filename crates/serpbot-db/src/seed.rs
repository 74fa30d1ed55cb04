use serpbot_core::SeedFile;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// Row counts touched by [`seed_fixtures`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub clients: usize,
    pub websites: usize,
    pub keywords: usize,
    pub observations: usize,
}

/// Upsert clients, websites, keywords, and observations from a seed file.
///
/// Everything runs inside a single transaction; if any statement fails the
/// whole batch is rolled back. Re-seeding the same file is idempotent, and
/// an observation already stored for the same keyword, engine, and day has
/// its position replaced.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_fixtures(pool: &PgPool, seed: &SeedFile) -> Result<SeedSummary, DbError> {
    let mut tx = pool.begin().await?;
    let mut summary = SeedSummary::default();

    for client in &seed.clients {
        sqlx::query(
            "INSERT INTO clients (username, email) \
             VALUES ($1, $2) \
             ON CONFLICT (username) DO UPDATE SET email = EXCLUDED.email",
        )
        .bind(&client.username)
        .bind(&client.email)
        .execute(&mut *tx)
        .await?;
        summary.clients += 1;

        for website in &client.websites {
            let website_id: Uuid = sqlx::query_scalar(
                "INSERT INTO websites (domain, username) \
                 VALUES ($1, $2) \
                 ON CONFLICT (username, domain) DO UPDATE SET domain = EXCLUDED.domain \
                 RETURNING id",
            )
            .bind(&website.domain)
            .bind(&client.username)
            .fetch_one(&mut *tx)
            .await?;
            summary.websites += 1;

            for keyword in &website.keywords {
                let keyword_id: Uuid = sqlx::query_scalar(
                    "INSERT INTO keywords (website_id, name) \
                     VALUES ($1, $2) \
                     ON CONFLICT (website_id, name) DO UPDATE SET name = EXCLUDED.name \
                     RETURNING id",
                )
                .bind(website_id)
                .bind(&keyword.name)
                .fetch_one(&mut *tx)
                .await?;
                summary.keywords += 1;

                for observation in &keyword.observations {
                    sqlx::query(
                        "INSERT INTO trends (keyword_id, engine, observed_on, position) \
                         VALUES ($1, $2, $3, $4) \
                         ON CONFLICT (keyword_id, engine, observed_on) \
                         DO UPDATE SET position = EXCLUDED.position",
                    )
                    .bind(keyword_id)
                    .bind(observation.engine.as_str())
                    .bind(observation.date)
                    .bind(observation.position)
                    .execute(&mut *tx)
                    .await?;
                    summary.observations += 1;
                }
            }
        }
    }

    tx.commit().await?;
    tracing::info!(
        clients = summary.clients,
        websites = summary.websites,
        keywords = summary.keywords,
        observations = summary.observations,
        "seeded fixtures"
    );
    Ok(summary)
}
