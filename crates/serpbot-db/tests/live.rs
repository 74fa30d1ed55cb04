//! Live integration tests for serpbot-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/serpbot-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory. `DATABASE_URL` must point at a Postgres server.

use chrono::NaiveDate;
use serpbot_core::{
    compute_trend, parse_fixtures, Engine, RankPolicy, TrendErrorKind, TrendRequest,
};
use serpbot_db::{
    get_website_by_id, list_keywords_by_website, list_trends, list_websites_by_owner,
    seed_fixtures, PgTrendStore,
};

const FIXTURE: &str = r"
clients:
  - username: nicolas
    email: temp@onintime.com
    websites:
      - domain: onintime.com
        keywords:
          - name: zeta
            observations:
              - { engine: google, date: 2024-01-02, position: 7 }
          - name: alpha
            observations:
              - { engine: google, date: 2024-01-01, position: 5 }
              - { engine: google, date: 2024-01-03, position: 3 }
              - { engine: google, date: 2024-02-01, position: -1 }
              - { engine: bing, date: 2024-01-01, position: 11 }
  - username: mallory
    email: mallory@example.com
    websites:
      - domain: mallory.example.com
";

fn day(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
}

async fn seed(pool: &sqlx::PgPool) -> uuid::Uuid {
    let fixture = parse_fixtures(FIXTURE).expect("fixture");
    seed_fixtures(pool, &fixture).await.expect("seed_fixtures");
    list_websites_by_owner(pool, "nicolas")
        .await
        .expect("list websites")
        .first()
        .expect("nicolas owns a website")
        .id
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_is_idempotent(pool: sqlx::PgPool) {
    let fixture = parse_fixtures(FIXTURE).expect("fixture");
    let first = seed_fixtures(&pool, &fixture).await.expect("first seed");
    let second = seed_fixtures(&pool, &fixture).await.expect("second seed");
    assert_eq!(first, second);
    assert_eq!(first.observations, 5);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trends")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(stored, 5);
}

#[sqlx::test(migrations = "../../migrations")]
async fn keywords_come_back_in_insertion_order(pool: sqlx::PgPool) {
    let website_id = seed(&pool).await;
    let names: Vec<String> = list_keywords_by_website(&pool, website_id)
        .await
        .expect("keywords")
        .into_iter()
        .map(|k| k.name)
        .collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_trends_filters_engine_and_exclusive_bound(pool: sqlx::PgPool) {
    let website_id = seed(&pool).await;
    let alpha = list_keywords_by_website(&pool, website_id)
        .await
        .expect("keywords")
        .into_iter()
        .find(|k| k.name == "alpha")
        .expect("alpha");

    let all = list_trends(&pool, alpha.id, Engine::Google, None)
        .await
        .expect("all");
    let dates: Vec<NaiveDate> = all.iter().map(|r| r.observed_on).collect();
    assert_eq!(
        dates,
        vec![day("2024-01-01"), day("2024-01-03"), day("2024-02-01")]
    );

    let bounded = list_trends(&pool, alpha.id, Engine::Google, Some(day("2024-01-03")))
        .await
        .expect("bounded");
    assert_eq!(bounded.len(), 1);
    assert_eq!(bounded[0].position, -1);

    let bing = list_trends(&pool, alpha.id, Engine::Bing, None)
        .await
        .expect("bing");
    assert_eq!(bing.len(), 1);
    assert_eq!(bing[0].position, 11);
}

#[sqlx::test(migrations = "../../migrations")]
async fn pg_store_computes_aligned_trend(pool: sqlx::PgPool) {
    let website_id = seed(&pool).await;
    let store = PgTrendStore::new(pool.clone());

    let trend = compute_trend(
        &store,
        TrendRequest {
            owner: "nicolas",
            website_id,
            engine: "google",
            period: "all",
        },
        day("2024-06-01"),
        RankPolicy::default(),
    )
    .await
    .expect("trend");

    assert_eq!(
        trend.date_labels,
        vec![
            day("2024-01-01"),
            day("2024-01-02"),
            day("2024-01-03"),
            day("2024-02-01"),
        ]
    );
    assert_eq!(trend.keywords[0].label, "zeta");
    assert_eq!(trend.keywords[0].data, vec![None, Some(7), None, None]);
    assert_eq!(trend.keywords[1].label, "alpha");
    assert_eq!(
        trend.keywords[1].data,
        vec![Some(5), None, Some(3), Some(100)]
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn pg_store_hides_foreign_websites(pool: sqlx::PgPool) {
    let website_id = seed(&pool).await;
    let store = PgTrendStore::new(pool.clone());

    assert!(get_website_by_id(&pool, website_id)
        .await
        .expect("lookup")
        .is_some());

    let err = compute_trend(
        &store,
        TrendRequest {
            owner: "mallory",
            website_id,
            engine: "google",
            period: "all",
        },
        day("2024-06-01"),
        RankPolicy::default(),
    )
    .await
    .expect_err("foreign website must be hidden");
    assert_eq!(err.kind(), TrendErrorKind::NotFound);
}

#[sqlx::test(migrations = "../../migrations")]
async fn closed_pool_surfaces_internal_error(pool: sqlx::PgPool) {
    let website_id = seed(&pool).await;
    let store = PgTrendStore::new(pool.clone());
    pool.close().await;

    let err = compute_trend(
        &store,
        TrendRequest {
            owner: "nicolas",
            website_id,
            engine: "google",
            period: "7d",
        },
        day("2024-06-01"),
        RankPolicy::default(),
    )
    .await
    .expect_err("closed pool must fail");
    assert_eq!(err.kind(), TrendErrorKind::Internal);
}
