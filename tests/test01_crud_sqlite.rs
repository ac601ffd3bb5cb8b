use std::sync::Arc;

use sql_dal::prelude::*;
use tokio::runtime::Runtime;

const USERS_DDL: &str = "
    CREATE TABLE users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        age INTEGER,
        status TEXT
    );
";

fn init_tracing() {
    // repeated init across tests in one binary is expected to fail
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

async fn users_engine() -> Result<QueryEngine, DataAccessError> {
    init_tracing();
    let manager = Arc::new(ConnectionManager::new(
        DatabaseConfig::builder(":memory:").finish(),
    ));
    let db = QueryEngine::new(manager);
    db.execute_batch(USERS_DDL).await?;
    Ok(db)
}

#[test]
fn create_then_read_ada() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;

        let fields = FieldMap::new().with("name", "Ada").with("age", 30);
        assert!(db.create("users", &fields).await?);
        assert_eq!(db.row_count(), 1);
        let id = db.last_insert_id().await?;
        assert_eq!(id, 1);

        let rows = db
            .read("users", &ConditionMap::new().with("name", "Ada"))
            .await?;
        assert_eq!(rows.len(), 1);
        let row = &rows.results[0];
        assert_eq!(row.get("name").and_then(RowValues::as_text), Some("Ada"));
        assert_eq!(row.get("age").and_then(RowValues::as_int), Some(&30));
        assert_eq!(row.get("id").and_then(RowValues::as_int), Some(&id));
        assert!(row.get("status").is_some_and(RowValues::is_null));

        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn create_read_round_trip_for_several_maps() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        let maps = vec![
            FieldMap::new().with("name", "Grace"),
            FieldMap::new().with("name", "Alan").with("age", 41),
            FieldMap::new()
                .with("status", "active")
                .with("name", "Barbara")
                .with("age", 0),
            FieldMap::new().with("name", "O'Brien; DROP TABLE users; --"),
        ];

        for m in &maps {
            db.create("users", m).await?;
            let rows = db.read("users", m).await?;
            assert!(!rows.is_empty());
            assert!(rows.results.iter().any(|r| r.contains_all(m)));
        }

        // the injection-looking value was stored as data
        assert_eq!(db.row_count_total("users", &ConditionMap::new()).await?, 4);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn read_without_conditions_returns_everything() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        assert!(db.read("users", &ConditionMap::new()).await?.is_empty());

        for name in ["a", "b", "c"] {
            db.create("users", &FieldMap::new().with("name", name)).await?;
        }
        let rows = db.read("users", &ConditionMap::new()).await?;
        assert_eq!(rows.len(), 3);

        let projected = db
            .read_fields("users", &ConditionMap::new().with("name", "b"), "id, name")
            .await?;
        assert_eq!(projected.len(), 1);
        assert_eq!(
            projected.get_column_names().map(|c| c.as_slice().to_vec()),
            Some(vec!["id".to_string(), "name".to_string()])
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn read_one_distinguishes_no_row() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        let none = db
            .read_one("users", &ConditionMap::new().with("name", "nobody"))
            .await?;
        assert!(none.is_none());

        db.create("users", &FieldMap::new().with("name", "Ada")).await?;
        let some = db
            .read_one("users", &ConditionMap::new().with("name", "Ada"))
            .await?;
        assert!(some.is_some());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn update_same_column_in_set_and_where() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        db.create("users", &FieldMap::new().with("name", "a").with("status", "y"))
            .await?;
        db.create("users", &FieldMap::new().with("name", "b").with("status", "y"))
            .await?;
        db.create("users", &FieldMap::new().with("name", "c").with("status", "z"))
            .await?;

        db.update(
            "users",
            &FieldMap::new().with("status", "x"),
            &ConditionMap::new().with("status", "y"),
        )
        .await?;
        assert_eq!(db.row_count(), 2);

        let x = db
            .read("users", &ConditionMap::new().with("status", "x"))
            .await?;
        assert_eq!(x.len(), 2);
        assert!(
            db.read("users", &ConditionMap::new().with("status", "y"))
                .await?
                .is_empty()
        );
        let z = db
            .read("users", &ConditionMap::new().with("status", "z"))
            .await?;
        assert_eq!(z.len(), 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn update_set_column_with_condition_prefix() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        db.execute_batch(
            "CREATE TABLE flags (id INTEGER PRIMARY KEY, status TEXT, condition_status TEXT);",
        )
        .await?;
        db.create(
            "flags",
            &FieldMap::new().with("status", "y").with("condition_status", "a"),
        )
        .await?;
        db.create(
            "flags",
            &FieldMap::new().with("status", "z").with("condition_status", "b"),
        )
        .await?;

        db.update(
            "flags",
            &FieldMap::new().with("condition_status", "NEW"),
            &ConditionMap::new().with("status", "y"),
        )
        .await?;
        assert_eq!(db.row_count(), 1);

        let updated = db
            .read_one("flags", &ConditionMap::new().with("status", "y"))
            .await?
            .ok_or("updated row missing")?;
        assert_eq!(
            updated.get("condition_status").and_then(RowValues::as_text),
            Some("NEW")
        );
        let untouched = db
            .read_one("flags", &ConditionMap::new().with("status", "z"))
            .await?
            .ok_or("untouched row missing")?;
        assert_eq!(
            untouched.get("condition_status").and_then(RowValues::as_text),
            Some("b")
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn boolean_fields_round_trip_through_contains_all() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        db.execute_batch(
            "CREATE TABLE toggles (id INTEGER PRIMARY KEY, name TEXT, enabled INTEGER);",
        )
        .await?;
        let fields = FieldMap::new().with("name", "dark-mode").with("enabled", true);
        db.create("toggles", &fields).await?;

        let rows = db.read("toggles", &fields).await?;
        assert_eq!(rows.len(), 1);
        // stored as INTEGER 1, compared as a boolean
        assert_eq!(rows.results[0].get("enabled"), Some(&RowValues::Int(1)));
        assert!(rows.results[0].contains_all(&fields));
        assert!(!rows.results[0].contains_all(&FieldMap::new().with("enabled", false)));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn delete_then_read_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        for (name, age) in [("a", 1), ("b", 2), ("a", 3)] {
            db.create("users", &FieldMap::new().with("name", name).with("age", age))
                .await?;
        }

        let c = ConditionMap::new().with("name", "a");
        db.delete("users", &c).await?;
        assert_eq!(db.row_count(), 2);
        assert!(db.read("users", &c).await?.is_empty());

        // deleting again matches nothing and still succeeds
        db.delete("users", &c).await?;
        assert_eq!(db.row_count(), 0);
        assert!(db.read("users", &c).await?.is_empty());
        assert_eq!(db.row_count_total("users", &ConditionMap::new()).await?, 1);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn empty_maps_are_invalid_input() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        db.create("users", &FieldMap::new().with("name", "keep")).await?;

        let err = db.create("users", &FieldMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = db
            .update("users", &FieldMap::new().with("name", "x"), &ConditionMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err = db.delete("users", &ConditionMap::new()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let rows = db.read("users", &ConditionMap::new()).await?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.results[0].get("name").and_then(RowValues::as_text), Some("keep"));
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn constraint_violation_is_execution_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        // name is NOT NULL
        let err = db
            .create("users", &FieldMap::new().with("name", RowValues::Null))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Execution);
        assert_eq!(db.row_count(), 0);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn unknown_table_is_syntax_error() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = users_engine().await?;
        let err = db
            .read("no_such_table", &ConditionMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Syntax);

        let err = db
            .read("users; DROP TABLE users", &ConditionMap::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
