use crate::{
	Error, Result,
	db::Db,
	models::{Favorite, User},
};

const USER_COLUMNS: &str = "id, email, name, password_hash, created_at";
const FAVORITE_COLUMNS: &str = "id, user_id, destino_id, created_at";

pub async fn find_user_by_email(db: &Db, email: &str) -> Result<Option<User>> {
	let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
	let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&db.pool).await?;

	Ok(user)
}

pub async fn find_user_by_id(db: &Db, id: i64) -> Result<Option<User>> {
	let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
	let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&db.pool).await?;

	Ok(user)
}

/// Inserts a user. The unique constraint on `email` is authoritative: a duplicate surfaces as
/// [`Error::Conflict`] even when a caller's pre-check raced with another insert.
pub async fn insert_user(
	db: &Db,
	email: &str,
	name: Option<&str>,
	password_hash: &str,
) -> Result<User> {
	let sql = format!(
		"\
INSERT INTO users (email, name, password_hash)
VALUES ($1, $2, $3)
RETURNING {USER_COLUMNS}"
	);

	sqlx::query_as::<_, User>(&sql)
		.bind(email)
		.bind(name)
		.bind(password_hash)
		.fetch_one(&db.pool)
		.await
		.map_err(|err| match err.as_database_error() {
			Some(db_err) if db_err.is_unique_violation() =>
				Error::Conflict(format!("User with email {email:?} already exists.")),
			_ => Error::Sqlx(err),
		})
}

pub async fn update_user_name(db: &Db, id: i64, name: &str) -> Result<Option<User>> {
	let sql = format!("UPDATE users SET name = $1 WHERE id = $2 RETURNING {USER_COLUMNS}");
	let user = sqlx::query_as::<_, User>(&sql).bind(name).bind(id).fetch_optional(&db.pool).await?;

	Ok(user)
}

pub async fn list_favorites(db: &Db, user_id: i64) -> Result<Vec<Favorite>> {
	let sql = format!(
		"\
SELECT {FAVORITE_COLUMNS}
FROM favoritos
WHERE user_id = $1
ORDER BY created_at DESC, id DESC"
	);
	let favorites = sqlx::query_as::<_, Favorite>(&sql).bind(user_id).fetch_all(&db.pool).await?;

	Ok(favorites)
}

/// Inserts a favorite unless the `(user_id, destino_id)` pair already exists, in which case
/// `None` is returned.
pub async fn insert_favorite(db: &Db, user_id: i64, destino_id: &str) -> Result<Option<Favorite>> {
	let sql = format!(
		"\
INSERT INTO favoritos (user_id, destino_id)
VALUES ($1, $2)
ON CONFLICT (user_id, destino_id) DO NOTHING
RETURNING {FAVORITE_COLUMNS}"
	);
	let favorite = sqlx::query_as::<_, Favorite>(&sql)
		.bind(user_id)
		.bind(destino_id)
		.fetch_optional(&db.pool)
		.await?;

	Ok(favorite)
}

/// Deletes a favorite owned by `user_id`. Returns the number of removed rows, zero when the key
/// does not exist or belongs to someone else.
pub async fn delete_favorite(db: &Db, user_id: i64, favorite_id: i64) -> Result<u64> {
	let result = sqlx::query("DELETE FROM favoritos WHERE id = $1 AND user_id = $2")
		.bind(favorite_id)
		.bind(user_id)
		.execute(&db.pool)
		.await?;

	Ok(result.rows_affected())
}
