//! Read-only reporting commands: website listing and rank trends.

use std::fmt::Write as _;

use chrono::Utc;
use serpbot_core::{AggregatedSeries, RankPolicy, TrendRequest};
use serpbot_db::PgTrendStore;
use uuid::Uuid;

/// Arguments of the `trend` command.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrendArgs<'a> {
    pub owner: &'a str,
    pub website_id: Uuid,
    pub engine: &'a str,
    pub period: &'a str,
    pub table: bool,
}

/// Print the websites owned by `owner`, one per line.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_websites(pool: &sqlx::PgPool, owner: &str) -> anyhow::Result<()> {
    let websites = serpbot_db::list_websites_by_owner(pool, owner).await?;

    if websites.is_empty() {
        println!("no websites found for {owner}; run `db seed` first");
        return Ok(());
    }

    println!("{:<38}DOMAIN", "ID");
    for website in &websites {
        println!("{:<38}{}", website.id, website.domain);
    }
    Ok(())
}

/// Compute and print a rank trend.
///
/// The output is the same JSON document the HTTP API returns under `data`,
/// or a plain table with `--table`.
///
/// # Errors
///
/// Returns an error for unknown tags, a website `owner` cannot see, or a
/// database failure.
pub(crate) async fn run_trend(
    pool: &sqlx::PgPool,
    config: &serpbot_core::AppConfig,
    args: TrendArgs<'_>,
) -> anyhow::Result<()> {
    let store = PgTrendStore::new(pool.clone());
    let policy = RankPolicy {
        max_rank: config.max_rank,
    };

    let trend = serpbot_core::compute_trend(
        &store,
        TrendRequest {
            owner: args.owner,
            website_id: args.website_id,
            engine: args.engine,
            period: args.period,
        },
        Utc::now().date_naive(),
        policy,
    )
    .await
    .map_err(|e| match std::error::Error::source(&e) {
        Some(cause) => anyhow::anyhow!("{e}: {cause}"),
        None => anyhow::anyhow!("{e}"),
    })?;

    if args.table {
        print!("{}", format_table(&trend));
    } else {
        println!("{}", serde_json::to_string_pretty(&trend)?);
    }
    Ok(())
}

/// Render a trend with one row per date and one column per keyword.
///
/// Dates without an observation show `-`.
fn format_table(trend: &AggregatedSeries) -> String {
    let mut out = String::new();
    if trend.keywords.is_empty() {
        out.push_str("no keywords tracked for this website\n");
        return out;
    }

    let widths: Vec<usize> = trend
        .keywords
        .iter()
        .map(|series| series.label.chars().count().max(4) + 2)
        .collect();

    let _ = write!(out, "{:<12}", "DATE");
    for (series, width) in trend.keywords.iter().zip(&widths) {
        let _ = write!(out, "{:>width$}", series.label, width = *width);
    }
    out.push('\n');

    for (index, date) in trend.date_labels.iter().enumerate() {
        let _ = write!(out, "{:<12}", date.format("%Y-%m-%d"));
        for (series, width) in trend.keywords.iter().zip(&widths) {
            let cell = series
                .data
                .get(index)
                .copied()
                .flatten()
                .map_or_else(|| "-".to_string(), |rank| rank.to_string());
            let _ = write!(out, "{cell:>width$}", width = *width);
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serpbot_core::KeywordSeries;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("valid date")
    }

    #[test]
    fn table_marks_missing_data_with_dash() {
        let trend = AggregatedSeries {
            date_labels: vec![day("2024-01-01"), day("2024-01-02")],
            keywords: vec![
                KeywordSeries {
                    label: "alpha".to_string(),
                    data: vec![Some(5), None],
                },
                KeywordSeries {
                    label: "beta".to_string(),
                    data: vec![None, Some(100)],
                },
            ],
        };

        let table = format_table(&trend);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("DATE"));
        assert_eq!(
            lines[1].split_whitespace().collect::<Vec<_>>(),
            ["2024-01-01", "5", "-"]
        );
        assert_eq!(
            lines[2].split_whitespace().collect::<Vec<_>>(),
            ["2024-01-02", "-", "100"]
        );
    }

    #[test]
    fn table_without_keywords_says_so() {
        let trend = AggregatedSeries {
            date_labels: vec![],
            keywords: vec![],
        };
        assert_eq!(
            format_table(&trend),
            "no keywords tracked for this website\n"
        );
    }
}
