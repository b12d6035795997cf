use std::time::Duration;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{Result, schema};

pub struct Db {
	pub pool: PgPool,
}
impl Db {
	pub async fn connect(cfg: &eusko_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect(&cfg.dsn).await?;

		Ok(Self { pool })
	}

	/// Builds a pool that opens connections on first use.
	pub fn connect_lazy(cfg: &eusko_config::Postgres) -> Result<Self> {
		let pool = pool_options(cfg).connect_lazy(&cfg.dsn)?;

		Ok(Self { pool })
	}

	pub async fn ensure_schema(&self) -> Result<()> {
		let sql = schema::render_schema();
		let lock_id: i64 = 4_815_162_342;
		// Serializes concurrent bootstraps; released on commit.
		let mut tx = self.pool.begin().await?;

		sqlx::query("SELECT pg_advisory_xact_lock($1)").bind(lock_id).execute(&mut *tx).await?;

		for statement in sql.split(';') {
			let trimmed = statement.trim();

			if trimmed.is_empty() {
				continue;
			}

			sqlx::query(trimmed).execute(&mut *tx).await?;
		}

		tx.commit().await?;

		Ok(())
	}

	pub async fn ping(&self) -> bool {
		sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
	}
}

fn pool_options(cfg: &eusko_config::Postgres) -> PgPoolOptions {
	PgPoolOptions::new()
		.max_connections(cfg.pool_max_conns)
		.acquire_timeout(Duration::from_millis(cfg.acquire_timeout_ms))
}
