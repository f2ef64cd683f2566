//! Tier and tier benefit operations for the repository.

use crate::domain::{TierBenefit, TierDefinition};
use sqlx::sqlite::{SqliteConnection, SqliteRow};
use sqlx::Row;
use std::collections::HashMap;

use super::Repository;

impl Repository {
    /// All tiers by `sort_order`, each with its benefits by `sort_order`.
    pub async fn list_tiers(&self) -> Result<Vec<TierDefinition>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let tiers = fetch_tiers(&mut *tx).await?;
        tx.commit().await?;
        Ok(tiers)
    }

    pub async fn get_tier(&self, id: &str) -> Result<Option<TierDefinition>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, slug, color, icon, min_score, sort_order, description
            FROM tiers WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tier = tier_from_row(&row);
        tier.benefits = self.list_benefits(id).await?;
        Ok(Some(tier))
    }

    /// Insert a tier (benefits are stored separately).
    ///
    /// # Errors
    /// Fails with a unique violation when the slug is taken.
    pub async fn insert_tier(&self, tier: &TierDefinition) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tiers (name, slug, color, icon, min_score, sort_order, description, id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&tier.name)
        .bind(&tier.slug)
        .bind(&tier.color)
        .bind(&tier.icon)
        .bind(tier.min_score)
        .bind(tier.sort_order)
        .bind(tier.description.as_deref())
        .bind(&tier.id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_tier(&self, tier: &TierDefinition) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE tiers SET
                name = ?, slug = ?, color = ?, icon = ?, min_score = ?, sort_order = ?, description = ?
            WHERE id = ?
            "#,
        )
        .bind(&tier.name)
        .bind(&tier.slug)
        .bind(&tier.color)
        .bind(&tier.icon)
        .bind(tier.min_score)
        .bind(tier.sort_order)
        .bind(tier.description.as_deref())
        .bind(&tier.id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a tier and, through the foreign key, its benefits.
    pub async fn delete_tier(&self, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tiers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    // Benefits
    // =========================================================================

    pub async fn list_benefits(&self, tier_id: &str) -> Result<Vec<TierBenefit>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, description, sort_order
            FROM tier_benefits
            WHERE tier_id = ?
            ORDER BY sort_order ASC, rowid ASC
            "#,
        )
        .bind(tier_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(benefit_from_row).collect())
    }

    pub async fn get_benefit(
        &self,
        tier_id: &str,
        benefit_id: &str,
    ) -> Result<Option<TierBenefit>, sqlx::Error> {
        let row = sqlx::query(
            "SELECT id, title, description, sort_order FROM tier_benefits WHERE id = ? AND tier_id = ?",
        )
        .bind(benefit_id)
        .bind(tier_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(benefit_from_row))
    }

    pub async fn insert_benefit(&self, tier_id: &str, benefit: &TierBenefit) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO tier_benefits (id, tier_id, title, description, sort_order) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&benefit.id)
        .bind(tier_id)
        .bind(&benefit.title)
        .bind(benefit.description.as_deref())
        .bind(benefit.sort_order)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_benefit(&self, tier_id: &str, benefit: &TierBenefit) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tier_benefits SET title = ?, description = ?, sort_order = ? WHERE id = ? AND tier_id = ?",
        )
        .bind(&benefit.title)
        .bind(benefit.description.as_deref())
        .bind(benefit.sort_order)
        .bind(&benefit.id)
        .bind(tier_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_benefit(&self, tier_id: &str, benefit_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tier_benefits WHERE id = ? AND tier_id = ?")
            .bind(benefit_id)
            .bind(tier_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Next free benefit position within a tier.
    pub async fn next_benefit_sort_order(&self, tier_id: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query(
            "SELECT COALESCE(MAX(sort_order) + 1, 0) AS next FROM tier_benefits WHERE tier_id = ?",
        )
        .bind(tier_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.get("next"))
    }
}

pub(super) async fn fetch_tiers(conn: &mut SqliteConnection) -> Result<Vec<TierDefinition>, sqlx::Error> {
    let tier_rows = sqlx::query(
        r#"
        SELECT id, name, slug, color, icon, min_score, sort_order, description
        FROM tiers
        ORDER BY sort_order ASC, rowid ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let benefit_rows = sqlx::query(
        r#"
        SELECT id, tier_id, title, description, sort_order
        FROM tier_benefits
        ORDER BY sort_order ASC, rowid ASC
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut benefits: HashMap<String, Vec<TierBenefit>> = HashMap::new();
    for row in &benefit_rows {
        let tier_id: String = row.get("tier_id");
        benefits.entry(tier_id).or_default().push(benefit_from_row(row));
    }

    Ok(tier_rows
        .iter()
        .map(|row| {
            let mut tier = tier_from_row(row);
            tier.benefits = benefits.remove(&tier.id).unwrap_or_default();
            tier
        })
        .collect())
}

fn tier_from_row(row: &SqliteRow) -> TierDefinition {
    TierDefinition {
        id: row.get("id"),
        name: row.get("name"),
        slug: row.get("slug"),
        color: row.get("color"),
        icon: row.get("icon"),
        min_score: row.get("min_score"),
        sort_order: row.get("sort_order"),
        description: row.get("description"),
        benefits: Vec::new(),
    }
}

fn benefit_from_row(row: &SqliteRow) -> TierBenefit {
    TierBenefit {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        sort_order: row.get("sort_order"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::init_db;
    use crate::db::repo::is_unique_violation;
    use tempfile::TempDir;

    async fn setup_test_db() -> (Repository, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (Repository::new(pool), temp_dir)
    }

    fn tier(slug: &str, min_score: f64, sort_order: i64) -> TierDefinition {
        TierDefinition {
            id: format!("tier-{slug}"),
            name: slug.to_uppercase(),
            slug: slug.to_string(),
            color: "#c0c0c0".to_string(),
            icon: "medal".to_string(),
            min_score,
            sort_order,
            description: None,
            benefits: vec![],
        }
    }

    fn benefit(id: &str, sort_order: i64) -> TierBenefit {
        TierBenefit {
            id: id.to_string(),
            title: format!("perk {id}"),
            description: None,
            sort_order,
        }
    }

    #[tokio::test]
    async fn test_tiers_listed_with_sorted_benefits() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_tier(&tier("silver", 50.0, 2)).await.unwrap();
        repo.insert_tier(&tier("gold", 150.0, 1)).await.unwrap();
        repo.insert_benefit("tier-gold", &benefit("b2", 1)).await.unwrap();
        repo.insert_benefit("tier-gold", &benefit("b1", 0)).await.unwrap();

        let tiers = repo.list_tiers().await.unwrap();
        let slugs: Vec<&str> = tiers.iter().map(|t| t.slug.as_str()).collect();
        assert_eq!(slugs, vec!["gold", "silver"]);
        let perks: Vec<&str> = tiers[0].benefits.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(perks, vec!["b1", "b2"]);
        assert!(tiers[1].benefits.is_empty());
        assert_eq!(repo.next_benefit_sort_order("tier-gold").await.unwrap(), 2);
        assert_eq!(repo.next_benefit_sort_order("tier-silver").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_slug_is_unique_violation() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_tier(&tier("gold", 150.0, 1)).await.unwrap();
        let mut dup = tier("gold", 10.0, 3);
        dup.id = "other".to_string();
        let err = repo.insert_tier(&dup).await.unwrap_err();
        assert!(is_unique_violation(&err));
    }

    #[tokio::test]
    async fn test_delete_tier_cascades_benefits() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_tier(&tier("gold", 150.0, 1)).await.unwrap();
        repo.insert_benefit("tier-gold", &benefit("b1", 0)).await.unwrap();

        assert!(repo.delete_tier("tier-gold").await.unwrap());
        assert!(repo.get_tier("tier-gold").await.unwrap().is_none());
        assert!(repo.list_benefits("tier-gold").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_benefit_scoped_to_tier() {
        let (repo, _temp) = setup_test_db().await;
        repo.insert_tier(&tier("gold", 150.0, 1)).await.unwrap();
        repo.insert_tier(&tier("silver", 50.0, 2)).await.unwrap();
        repo.insert_benefit("tier-gold", &benefit("b1", 0)).await.unwrap();

        assert!(repo.get_benefit("tier-silver", "b1").await.unwrap().is_none());
        assert!(!repo.delete_benefit("tier-silver", "b1").await.unwrap());

        let mut b = repo.get_benefit("tier-gold", "b1").await.unwrap().unwrap();
        b.title = "meet and greet".to_string();
        assert!(repo.update_benefit("tier-gold", &b).await.unwrap());
        let tier = repo.get_tier("tier-gold").await.unwrap().unwrap();
        assert_eq!(tier.benefits[0].title, "meet and greet");
    }
}
