use serde::Serialize;
use serde_json::json;
use sql_access::prelude::*;

async fn seeded() -> Result<Database, SqlAccessError> {
    let mut db = Database::connect(SqliteOptions::new(":memory:".into())).await?;
    db.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, score REAL, doc TEXT);
         INSERT INTO users (id, name, score) VALUES (5, 'alice', 1.5), (6, 'bob', 2.5);",
    )
    .await?;
    Ok(db)
}

#[tokio::test]
async fn integer_filter_returns_matching_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let rows = db.get_objects("SELECT * FROM users WHERE id = ?", [5]).await?;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("id"), Some(&RowValues::Int(5)));
    assert_eq!(rows[0].get("name").and_then(RowValues::as_text), Some("alice"));
    Ok(())
}

#[tokio::test]
async fn single_value_is_promoted_to_a_list() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let sql = "SELECT name FROM users WHERE id = ?";
    let single = db.get_objects(sql, 6).await?;
    let listed = db.get_objects(sql, vec![6]).await?;
    let boxed = db.get_objects(sql, Param::Int(6)).await?;
    assert_eq!(single, listed);
    assert_eq!(single, boxed);
    assert_eq!(single[0].get("name").and_then(RowValues::as_text), Some("bob"));
    Ok(())
}

#[tokio::test]
async fn mixed_kinds_bind_in_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let changed = db
        .execute(
            "INSERT INTO users (id, name, score) VALUES (?, ?, ?)",
            params![7, "carol", 3.25],
        )
        .await?;
    assert_eq!(changed, 1);
    let row = db
        .get_object("SELECT * FROM users WHERE name = ? AND score > ?", params!["carol", 3])
        .await?
        .expect("inserted row");
    assert_eq!(row.get("id"), Some(&RowValues::Int(7)));
    assert_eq!(row.get("score").and_then(RowValues::as_float), Some(3.25));
    Ok(())
}

#[tokio::test]
async fn booleans_bind_as_integers() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let row = db.get_object("SELECT ? AS t, ? AS f", params![true, false]).await?;
    let row = row.expect("one row");
    assert_eq!(row.get("t"), Some(&RowValues::Int(1)));
    assert_eq!(row.get("f").and_then(RowValues::as_bool), Some(false));
    Ok(())
}

#[tokio::test]
async fn nested_mapping_round_trips_through_text() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let doc = json!({"a": [1, 2, {"b": null}], "c": "d"});
    let row = db
        .get_object(
            "SELECT ? AS doc, json_extract(?, '$.c') AS c",
            params![doc.clone(), doc.clone()],
        )
        .await?
        .expect("one row");
    assert_eq!(row.get("doc").and_then(RowValues::as_json), Some(doc));
    assert_eq!(row.get("c").and_then(RowValues::as_text), Some("d"));
    Ok(())
}

#[tokio::test]
async fn serializable_struct_binds_as_composite() -> Result<(), Box<dyn std::error::Error>> {
    #[derive(Serialize)]
    struct Prefs {
        theme: String,
        tabs: Vec<u8>,
    }

    let mut db = seeded().await?;
    let prefs = Param::structured(&Prefs {
        theme: "dark".into(),
        tabs: vec![2, 4],
    })?;
    db.execute("UPDATE users SET doc = ? WHERE id = ?", params![prefs, 5])
        .await?;
    let row = db.get_table_row("users", "id", 5).await?.expect("row 5");
    assert_eq!(
        row.get("doc").and_then(RowValues::as_json),
        Some(json!({"theme": "dark", "tabs": [2, 4]}))
    );
    Ok(())
}

#[tokio::test]
async fn count_mismatch_fails_before_execution() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    let err = db
        .execute("INSERT INTO users (id, name) VALUES (?, ?)", [8])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SqlAccessError::ParameterCountMismatch {
            expected: 2,
            actual: 1
        }
    ));
    assert!(err.is_caller_error());
    assert!(!db.object_exists("SELECT 1 FROM users WHERE id = ?", 8).await?);
    Ok(())
}

#[tokio::test]
async fn unsupported_kinds_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    for value in [Param::Null, Param::Blob(vec![1, 2]), Param::UInt(u64::MAX)] {
        let err = db.query("SELECT ?", value).await.unwrap_err();
        assert!(matches!(err, SqlAccessError::UnsupportedParameterType { .. }));
    }
    assert!(db.query("SELECT ?", None::<i64>).await.is_err());
    Ok(())
}

#[tokio::test]
async fn empty_or_invalid_template_is_prepare_failure() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded().await?;
    assert!(matches!(
        db.query("   ", ()).await.unwrap_err(),
        SqlAccessError::PrepareFailed(_)
    ));
    assert!(matches!(
        db.query("SELEC nothing", ()).await.unwrap_err(),
        SqlAccessError::PrepareFailed(_)
    ));
    Ok(())
}
