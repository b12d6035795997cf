use time::OffsetDateTime;

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct User {
	pub id: i64,
	pub email: String,
	pub name: Option<String>,
	pub password_hash: String,
	pub created_at: OffsetDateTime,
}

#[derive(Clone, Debug, sqlx::FromRow)]
pub struct Favorite {
	pub id: i64,
	pub user_id: i64,
	pub destino_id: String,
	pub created_at: OffsetDateTime,
}
