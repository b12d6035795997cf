use eusko_config::Postgres;
use eusko_storage::{Error, db::Db, queries};
use eusko_testkit::TestDatabase;

async fn bootstrapped(test_db: &TestDatabase) -> Db {
	let cfg = Postgres {
		dsn: test_db.dsn().to_string(),
		pool_max_conns: 2,
		acquire_timeout_ms: 5_000,
	};
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set EUSKO_PG_DSN to run."]
async fn schema_bootstrap_is_idempotent() {
	let Some(base_dsn) = eusko_testkit::env_dsn() else {
		eprintln!("Skipping schema_bootstrap_is_idempotent; set EUSKO_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;

	db.ensure_schema().await.expect("Second bootstrap should be a no-op.");

	for table in ["users", "favoritos"] {
		let count: i64 = sqlx::query_scalar(
			"SELECT count(*) FROM information_schema.tables WHERE table_name = $1",
		)
		.bind(table)
		.fetch_one(&db.pool)
		.await
		.expect("Failed to query schema tables.");

		assert_eq!(count, 1, "Missing table {table}.");
	}

	assert!(db.ping().await);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set EUSKO_PG_DSN to run."]
async fn duplicate_email_is_a_conflict() {
	let Some(base_dsn) = eusko_testkit::env_dsn() else {
		eprintln!("Skipping duplicate_email_is_a_conflict; set EUSKO_PG_DSN to run this test.");

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let first = queries::insert_user(&db, "a@b.com", Some("Ane"), "hash")
		.await
		.expect("Failed to insert user.");
	let err = queries::insert_user(&db, "a@b.com", None, "other")
		.await
		.expect_err("Expected duplicate email to fail.");

	assert!(matches!(err, Error::Conflict(_)), "Unexpected error: {err:?}");

	let count: i64 = sqlx::query_scalar("SELECT count(*) FROM users")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count users.");

	assert_eq!(count, 1);

	// Case-sensitive: a different spelling is a different identity.
	queries::insert_user(&db, "A@b.com", None, "hash").await.expect("Expected distinct email.");

	let found = queries::find_user_by_email(&db, "a@b.com")
		.await
		.expect("Failed to look up user.")
		.expect("Expected user.");

	assert_eq!(found.id, first.id);
	assert!(queries::find_user_by_email(&db, "missing@b.com").await.expect("lookup").is_none());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set EUSKO_PG_DSN to run."]
async fn favorites_are_unique_ordered_and_cascade() {
	let Some(base_dsn) = eusko_testkit::env_dsn() else {
		eprintln!(
			"Skipping favorites_are_unique_ordered_and_cascade; set EUSKO_PG_DSN to run this test."
		);

		return;
	};
	let test_db = TestDatabase::new(&base_dsn).await.expect("Failed to create test database.");
	let db = bootstrapped(&test_db).await;
	let user = queries::insert_user(&db, "fav@b.com", None, "hash").await.expect("insert user");
	let first = queries::insert_favorite(&db, user.id, "museos_1")
		.await
		.expect("insert favorite")
		.expect("Expected a new favorite.");
	let second = queries::insert_favorite(&db, user.id, "playas_2")
		.await
		.expect("insert favorite")
		.expect("Expected a new favorite.");

	assert!(queries::insert_favorite(&db, user.id, "museos_1").await.expect("insert").is_none());

	let listed = queries::list_favorites(&db, user.id).await.expect("list favorites");

	assert_eq!(listed.iter().map(|fav| fav.id).collect::<Vec<_>>(), vec![second.id, first.id]);
	assert_eq!(queries::delete_favorite(&db, user.id, first.id).await.expect("delete"), 1);
	assert_eq!(queries::delete_favorite(&db, user.id, first.id).await.expect("delete"), 0);
	assert_eq!(queries::delete_favorite(&db, user.id + 1, second.id).await.expect("delete"), 0);

	sqlx::query("DELETE FROM users WHERE id = $1")
		.bind(user.id)
		.execute(&db.pool)
		.await
		.expect("Failed to delete user.");

	let remaining: i64 = sqlx::query_scalar("SELECT count(*) FROM favoritos")
		.fetch_one(&db.pool)
		.await
		.expect("Failed to count favorites.");

	assert_eq!(remaining, 0);

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
