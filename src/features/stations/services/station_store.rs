use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::core::error::{AppError, Result};
use crate::features::stations::models::{
    EntityKind, Locality, NewStation, Province, StationFilter, StationWithPlace,
};
use crate::shared::text::zero_pad;

/// Writes accumulated by a load run, committed together in one transaction
#[derive(Debug, Default, Clone)]
pub struct WriteBatch {
    pub provinces: Vec<Province>,
    pub localities: Vec<Locality>,
    pub stations: Vec<NewStation>,
}

impl WriteBatch {
    pub fn is_empty(&self) -> bool {
        self.provinces.is_empty() && self.localities.is_empty() && self.stations.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.provinces.len() + self.localities.len() + self.stations.len()
    }
}

/// Zero-padded code for counter value `value` of `kind`
pub fn format_code(kind: EntityKind, value: i64) -> String {
    zero_pad(value, kind.code_width())
}

/// Persistence seam for provinces, localities and stations
#[async_trait]
pub trait StationStore: Send + Sync {
    /// Highest purely numeric code stored for `kind`, 0 when there is none
    async fn max_numeric_code(&self, kind: EntityKind) -> Result<i64>;

    /// Raise the counter of `kind` to at least `floor`
    async fn sync_counter(&self, kind: EntityKind, floor: i64) -> Result<()>;

    /// Atomically take the next code of `kind`
    async fn next_code(&self, kind: EntityKind) -> Result<String>;

    /// Case-insensitive lookup by canonical name
    async fn find_province_by_name(&self, name: &str) -> Result<Option<Province>>;

    /// Exact name lookup among the localities of the named provinces
    async fn find_locality(
        &self,
        name: &str,
        province_names: &[String],
    ) -> Result<Option<Locality>>;

    /// Whether a station from `region` with natural key `key` is already stored
    async fn station_exists(&self, region: &str, key: &str) -> Result<bool>;

    /// Upsert provinces and localities by code, then insert stations
    async fn commit(&self, batch: WriteBatch) -> Result<()>;

    /// Delete every row of `kind` in pages of `page_size`, returning the count.
    /// The kind's counter restarts from zero.
    async fn clear(&self, kind: EntityKind, page_size: i64) -> Result<u64>;

    async fn search_stations(&self, filter: &StationFilter) -> Result<Vec<StationWithPlace>>;
}

fn table_name(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Province => "provinces",
        EntityKind::Locality => "localities",
        EntityKind::Station => "stations",
    }
}

/// `ILIKE` pattern matching `value` as a literal substring
fn contains_pattern(value: &str) -> String {
    let mut pattern = String::with_capacity(value.len() + 2);
    pattern.push('%');
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {:?}", context, e);
        AppError::Database(e)
    }
}

/// PostgreSQL implementation of [`StationStore`]
pub struct PgStationStore {
    pool: PgPool,
}

impl PgStationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_provinces(
        tx: &mut Transaction<'_, Postgres>,
        provinces: &[Province],
    ) -> Result<()> {
        for province in provinces {
            sqlx::query(
                r#"
                INSERT INTO provinces (code, name)
                VALUES ($1, $2)
                ON CONFLICT (code) DO UPDATE SET name = EXCLUDED.name
                "#,
            )
            .bind(&province.code)
            .bind(&province.name)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to upsert province"))?;
        }
        Ok(())
    }

    async fn insert_localities(
        tx: &mut Transaction<'_, Postgres>,
        localities: &[Locality],
    ) -> Result<()> {
        for locality in localities {
            sqlx::query(
                r#"
                INSERT INTO localities (code, name, province_code)
                VALUES ($1, $2, $3)
                ON CONFLICT (code) DO UPDATE
                SET name = EXCLUDED.name, province_code = EXCLUDED.province_code
                "#,
            )
            .bind(&locality.code)
            .bind(&locality.name)
            .bind(&locality.province_code)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to upsert locality"))?;
        }
        Ok(())
    }

    async fn insert_stations(
        tx: &mut Transaction<'_, Postgres>,
        stations: &[NewStation],
    ) -> Result<()> {
        for station in stations {
            sqlx::query(
                r#"
                INSERT INTO stations (
                    code, name, station_type, address, postal_code, latitude, longitude,
                    description, schedule, contact, url, locality_code, source_region, source_key
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                "#,
            )
            .bind(&station.code)
            .bind(&station.name)
            .bind(station.station_type)
            .bind(&station.address)
            .bind(&station.postal_code)
            .bind(station.latitude)
            .bind(station.longitude)
            .bind(&station.description)
            .bind(&station.schedule)
            .bind(&station.contact)
            .bind(&station.url)
            .bind(&station.locality_code)
            .bind(&station.source_region)
            .bind(&station.source_key)
            .execute(&mut **tx)
            .await
            .map_err(db_error("Failed to insert station"))?;
        }
        Ok(())
    }
}

#[async_trait]
impl StationStore for PgStationStore {
    async fn max_numeric_code(&self, kind: EntityKind) -> Result<i64> {
        let sql = format!(
            "SELECT COALESCE(MAX(code::BIGINT), 0) FROM {} WHERE code ~ '^[0-9]+$'",
            table_name(kind)
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to scan existing codes"))
    }

    async fn sync_counter(&self, kind: EntityKind, floor: i64) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO id_counters (kind, value)
            VALUES ($1, $2)
            ON CONFLICT (kind) DO UPDATE
            SET value = GREATEST(id_counters.value, EXCLUDED.value)
            "#,
        )
        .bind(kind.counter_key())
        .bind(floor)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to seed id counter"))?;
        Ok(())
    }

    async fn next_code(&self, kind: EntityKind) -> Result<String> {
        let value = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO id_counters (kind, value)
            VALUES ($1, 1)
            ON CONFLICT (kind) DO UPDATE SET value = id_counters.value + 1
            RETURNING value
            "#,
        )
        .bind(kind.counter_key())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to allocate code"))?;

        Ok(format_code(kind, value))
    }

    async fn find_province_by_name(&self, name: &str) -> Result<Option<Province>> {
        sqlx::query_as::<_, Province>(
            r#"
            SELECT code, name
            FROM provinces
            WHERE LOWER(name) = LOWER($1)
            ORDER BY code
            LIMIT 1
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find province"))
    }

    async fn find_locality(
        &self,
        name: &str,
        province_names: &[String],
    ) -> Result<Option<Locality>> {
        let province_names: Vec<String> =
            province_names.iter().map(|n| n.to_lowercase()).collect();

        sqlx::query_as::<_, Locality>(
            r#"
            SELECT l.code, l.name, l.province_code
            FROM localities l
            JOIN provinces p ON p.code = l.province_code
            WHERE l.name = $1 AND LOWER(p.name) = ANY($2)
            ORDER BY l.code
            LIMIT 1
            "#,
        )
        .bind(name)
        .bind(&province_names)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to find locality"))
    }

    async fn station_exists(&self, region: &str, key: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM stations WHERE source_region = $1 AND source_key = $2)",
        )
        .bind(region)
        .bind(key)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to check station"))
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("Failed to begin load transaction"))?;

        Self::insert_provinces(&mut tx, &batch.provinces).await?;
        Self::insert_localities(&mut tx, &batch.localities).await?;
        Self::insert_stations(&mut tx, &batch.stations).await?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit load transaction"))?;

        tracing::debug!(
            "Committed {} provinces, {} localities, {} stations",
            batch.provinces.len(),
            batch.localities.len(),
            batch.stations.len()
        );
        Ok(())
    }

    async fn clear(&self, kind: EntityKind, page_size: i64) -> Result<u64> {
        let table = table_name(kind);
        let sql = format!(
            "DELETE FROM {table} WHERE code IN (SELECT code FROM {table} LIMIT $1)",
            table = table
        );

        let mut deleted = 0u64;
        loop {
            let affected = sqlx::query(&sql)
                .bind(page_size)
                .execute(&self.pool)
                .await
                .map_err(db_error("Failed to clear page"))?
                .rows_affected();
            if affected == 0 {
                break;
            }
            deleted += affected;
        }

        sqlx::query("UPDATE id_counters SET value = 0 WHERE kind = $1")
            .bind(kind.counter_key())
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to reset id counter"))?;

        Ok(deleted)
    }

    async fn search_stations(&self, filter: &StationFilter) -> Result<Vec<StationWithPlace>> {
        sqlx::query_as::<_, StationWithPlace>(
            r#"
            SELECT s.code, s.name, s.station_type, s.address, s.postal_code,
                   s.latitude, s.longitude, s.description, s.schedule, s.contact, s.url,
                   s.locality_code, l.name AS locality_name,
                   p.code AS province_code, p.name AS province_name,
                   s.source_region, s.created_at
            FROM stations s
            JOIN localities l ON l.code = s.locality_code
            JOIN provinces p ON p.code = l.province_code
            WHERE ($1::TEXT IS NULL OR l.name ILIKE $1)
              AND ($2::TEXT IS NULL OR s.postal_code = $2)
              AND ($3::TEXT IS NULL OR p.name ILIKE $3)
              AND ($4::station_type IS NULL OR s.station_type = $4)
            ORDER BY s.code
            LIMIT $5
            "#,
        )
        .bind(filter.locality.as_deref().map(contains_pattern))
        .bind(&filter.postal_code)
        .bind(filter.province.as_deref().map(contains_pattern))
        .bind(filter.station_type)
        .bind(filter.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to search stations"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("vigo"), "%vigo%");
        assert_eq!(contains_pattern("_"), "%\\_%");
        assert_eq!(contains_pattern("50%"), "%50\\%%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn test_format_code_pads_per_kind() {
        assert_eq!(format_code(EntityKind::Province, 7), "0007");
        assert_eq!(format_code(EntityKind::Locality, 123), "0123");
        assert_eq!(format_code(EntityKind::Station, 42), "00042");
    }

    #[test]
    fn test_write_batch_len() {
        let mut batch = WriteBatch::default();
        assert!(batch.is_empty());
        batch.provinces.push(Province {
            code: "0001".to_string(),
            name: "Lugo".to_string(),
        });
        assert_eq!(batch.len(), 1);
        assert!(!batch.is_empty());
    }
}
