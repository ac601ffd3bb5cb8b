use std::collections::HashSet;
use std::sync::Arc;

use sql_dal::prelude::*;
use tokio::runtime::Runtime;

async fn seeded(rows: i64) -> Result<QueryEngine, DataAccessError> {
    let manager = Arc::new(ConnectionManager::new(
        DatabaseConfig::builder(":memory:").finish(),
    ));
    let mut db = QueryEngine::new(manager);
    db.execute_batch(
        "CREATE TABLE items (id INTEGER PRIMARY KEY AUTOINCREMENT, label TEXT, bucket TEXT);",
    )
    .await?;
    for i in 1..=rows {
        let bucket = if i % 2 == 0 { "even" } else { "odd" };
        db.create(
            "items",
            &FieldMap::new()
                .with("label", format!("item-{i}"))
                .with("bucket", bucket),
        )
        .await?;
    }
    Ok(db)
}

fn ids(rs: &ResultSet) -> HashSet<i64> {
    rs.results
        .iter()
        .filter_map(|r| r.get("id").and_then(RowValues::as_int).copied())
        .collect()
}

#[test]
fn consecutive_pages_are_disjoint() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = seeded(25).await?;
        let everything = ConditionMap::new();

        let page1 = db.paginate("items", 1, 10, &everything).await?;
        let page2 = db.paginate("items", 2, 10, &everything).await?;
        let page3 = db.paginate("items", 3, 10, &everything).await?;

        assert_eq!(page1.len(), 10);
        assert_eq!(page2.len(), 10);
        assert_eq!(page3.len(), 5);
        assert!(ids(&page1).is_disjoint(&ids(&page2)));
        assert!(ids(&page2).is_disjoint(&ids(&page3)));

        let beyond = db.paginate("items", 4, 10, &everything).await?;
        assert!(beyond.is_empty());
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn paginate_with_conditions_and_fields() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = seeded(20).await?;
        let even = ConditionMap::new().with("bucket", "even");

        let page = db.paginate_fields("items", 1, 4, &even, "id, label").await?;
        assert_eq!(page.len(), 4);
        assert!(page.results.iter().all(|r| r.get("bucket").is_none()));
        assert!(ids(&page).iter().all(|id| id % 2 == 0));

        let rest = db.paginate("items", 3, 4, &even).await?;
        assert_eq!(rest.len(), 2);
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn row_count_total_counts_matches() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut db = seeded(7).await?;
        assert_eq!(db.row_count_total("items", &ConditionMap::new()).await?, 7);
        assert_eq!(
            db.row_count_total("items", &ConditionMap::new().with("bucket", "odd"))
                .await?,
            4
        );
        assert_eq!(
            db.row_count_total("items", &ConditionMap::new().with("bucket", "none"))
                .await?,
            0
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}

#[test]
fn condition_on_offset_column_keeps_its_own_value() -> Result<(), Box<dyn std::error::Error>> {
    let rt = Runtime::new()?;
    rt.block_on(async {
        let manager = Arc::new(ConnectionManager::new(
            DatabaseConfig::builder(":memory:").finish(),
        ));
        let mut db = QueryEngine::new(manager);
        db.execute_batch("CREATE TABLE shifts (id INTEGER PRIMARY KEY, offset INTEGER);")
            .await?;
        for _ in 0..5 {
            db.create("shifts", &FieldMap::new().with("offset", 7)).await?;
        }
        db.create("shifts", &FieldMap::new().with("offset", 0)).await?;

        let by_offset = ConditionMap::new().with("offset", 7);
        assert_eq!(db.read("shifts", &by_offset).await?.len(), 5);

        let page1 = db.paginate("shifts", 1, 3, &by_offset).await?;
        let page2 = db.paginate("shifts", 2, 3, &by_offset).await?;
        assert_eq!(page1.len(), 3);
        assert_eq!(page2.len(), 2);
        assert!(ids(&page1).is_disjoint(&ids(&page2)));
        assert!(
            page1
                .results
                .iter()
                .chain(page2.results.iter())
                .all(|r| r.get("offset") == Some(&RowValues::Int(7)))
        );
        Ok::<(), Box<dyn std::error::Error>>(())
    })?;
    Ok(())
}
