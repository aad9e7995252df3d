// Result store using SQLite
//
// Every save replaces the previous run's tables inside one transaction, so a
// failed save leaves the earlier output readable.

use std::path::Path;

use rusqlite::{params, Connection};

use stockmatch_matcher::MatchResult;

const SCHEMA: &str = r#"
DROP VIEW IF EXISTS buyer_recommendations_view;
DROP TABLE IF EXISTS buyer_recommendations;
DROP TABLE IF EXISTS unified_supplier_data;
DROP TABLE IF EXISTS run_meta;

CREATE TABLE unified_supplier_data (
    ordinal INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    quality TEXT NOT NULL,
    grade TEXT NOT NULL,
    finish TEXT,
    thickness_mm REAL,          -- NULL for described-layout sources
    width_mm REAL,
    description TEXT NOT NULL,
    weight_kg REAL NOT NULL,
    quantity INTEGER NOT NULL
);

CREATE TABLE buyer_recommendations (
    buyer_id TEXT NOT NULL,
    rank INTEGER NOT NULL,
    match_score INTEGER NOT NULL,
    item_ordinal INTEGER NOT NULL,
    supplier_source TEXT NOT NULL,
    grade TEXT NOT NULL,
    finish TEXT,
    thickness_mm REAL,
    width_mm REAL,
    weight_kg REAL NOT NULL,
    quantity INTEGER NOT NULL,
    match_reason TEXT NOT NULL,
    PRIMARY KEY (buyer_id, rank)
);

CREATE VIEW buyer_recommendations_view AS
SELECT buyer_id, supplier_source, grade, finish, thickness_mm, width_mm,
       weight_kg, quantity, match_reason
FROM buyer_recommendations
ORDER BY buyer_id, rank;

CREATE TABLE run_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL
);
"#;

pub fn save(result: &MatchResult, path: &Path) -> Result<(), String> {
    let mut conn = Connection::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let tx = conn.transaction().map_err(|e| e.to_string())?;

    tx.execute_batch(SCHEMA).map_err(|e| e.to_string())?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO unified_supplier_data (ordinal, source, quality, grade, finish, thickness_mm, width_mm, description, weight_kg, quantity) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            )
            .map_err(|e| e.to_string())?;
        for item in &result.items {
            stmt.execute(params![
                item.ordinal as i64,
                item.source,
                item.quality,
                item.grade,
                item.finish,
                item.thickness_mm,
                item.width_mm,
                item.description,
                item.weight_kg,
                item.quantity,
            ])
            .map_err(|e| e.to_string())?;
        }
    }

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO buyer_recommendations (buyer_id, rank, match_score, item_ordinal, supplier_source, grade, finish, thickness_mm, width_mm, weight_kg, quantity, match_reason) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            )
            .map_err(|e| e.to_string())?;
        for ranked in &result.recommendations {
            let r = &ranked.recommendation;
            stmt.execute(params![
                r.buyer_id,
                ranked.rank as i64,
                ranked.match_score,
                ranked.item_ordinal as i64,
                r.supplier_source,
                r.grade,
                r.finish,
                r.thickness_mm,
                r.width_mm,
                r.weight_kg,
                r.quantity,
                r.match_reason,
            ])
            .map_err(|e| e.to_string())?;
        }
    }

    let meta = [
        ("config_name", result.meta.config_name.clone()),
        ("engine_version", result.meta.engine_version.clone()),
        ("run_at", result.meta.run_at.clone()),
        ("top_k", result.meta.top_k.to_string()),
        ("finish_vocabulary", result.meta.finish_vocabulary.to_string()),
    ];
    for (key, value) in &meta {
        tx.execute(
            "INSERT INTO run_meta (key, value) VALUES (?1, ?2)",
            params![key, value],
        )
        .map_err(|e| e.to_string())?;
    }

    tx.commit().map_err(|e| e.to_string())?;

    tracing::debug!(
        path = %path.display(),
        items = result.items.len(),
        recommendations = result.recommendations.len(),
        "result store written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use rusqlite::OptionalExtension;
    use stockmatch_matcher::{run, MatchConfig, MatchInput, RawTable, Recommendation};
    use tempfile::NamedTempFile;

    const CONFIG: &str = r#"
name = "store-test"

[[suppliers]]
source = "supplier_1"
layout = "dimensional"
file = "s1.csv"

[[suppliers]]
source = "supplier_2"
layout = "described"
file = "s2.csv"

[buyers]
file = "b.csv"
"#;

    fn result(buyers: &str) -> MatchResult {
        let config = MatchConfig::from_toml(CONFIG).unwrap();
        let mut suppliers = HashMap::new();
        suppliers.insert(
            "supplier_1".to_string(),
            RawTable::from_delimited(
                "supplier_1",
                "Quality/Choice,Grade,Finish,Thickness (mm),Width (mm),Description,Gross weight (kg),Quantity\n\
                 3rd,A36,pickled,2.0,1000,Coil,3000,50\n\
                 2nd,A36,pickled,2.3,1005,Coil,2500,20\n",
                b',',
            )
            .unwrap(),
        );
        suppliers.insert(
            "supplier_2".to_string(),
            RawTable::from_delimited(
                "supplier_2",
                "Material,Description,Weight (kg),Quantity,Reserved\nA36,Material is Pickled,1800,25,NO\n",
                b',',
            )
            .unwrap(),
        );
        let header = "Buyer ID,Preferred Grade,Preferred Finish,Preferred Thickness (mm),Preferred Width (mm),Max Weight (kg),Min Quantity\n";
        let buyers =
            RawTable::from_delimited("buyer_preferences", &format!("{header}{buyers}"), b',').unwrap();
        run(&config, &MatchInput { suppliers, buyers }).unwrap()
    }

    fn load_recommendations(path: &Path) -> Vec<Recommendation> {
        let conn = Connection::open(path).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT buyer_id, supplier_source, grade, finish, thickness_mm, width_mm, weight_kg, quantity, match_reason FROM buyer_recommendations_view",
            )
            .unwrap();
        let rows = stmt.query_map([], |row| {
            Ok(Recommendation {
                buyer_id: row.get(0)?,
                supplier_source: row.get(1)?,
                grade: row.get(2)?,
                finish: row.get(3)?,
                thickness_mm: row.get(4)?,
                width_mm: row.get(5)?,
                weight_kg: row.get(6)?,
                quantity: row.get(7)?,
                match_reason: row.get(8)?,
            })
        })
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
        rows
    }

    fn load_meta(path: &Path, key: &str) -> Option<String> {
        let conn = Connection::open(path).unwrap();
        conn.query_row("SELECT value FROM run_meta WHERE key = ?1", params![key], |r| r.get(0))
            .optional()
            .unwrap()
    }

    fn count(path: &Path, table: &str) -> i64 {
        let conn = Connection::open(path).unwrap();
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn test_save_and_load() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let path = temp_file.path();

        let result = result("B002,A36,pickled,2.0,1000,,\nB001,A36,pickled,2.0,1000,,\n");
        save(&result, path).expect("Save should succeed");

        assert_eq!(count(path, "unified_supplier_data"), 3);
        assert_eq!(count(path, "buyer_recommendations"), 6);

        let rows = load_recommendations(path);
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].buyer_id, "B001");
        assert_eq!(rows[3].buyer_id, "B002");
        // Described-layout item keeps NULL dimensions
        assert_eq!(rows[2].supplier_source, "supplier_2");
        assert_eq!(rows[2].thickness_mm, None);
        assert_eq!(rows, result.presented().cloned().collect::<Vec<_>>());

        assert_eq!(load_meta(path, "config_name").as_deref(), Some("store-test"));
        assert_eq!(load_meta(path, "top_k").as_deref(), Some("5"));
        assert_eq!(load_meta(path, "missing"), None);
    }

    #[test]
    fn test_view_hides_score() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let path = temp_file.path();
        save(&result("B001,A36,pickled,2.0,1000,,\n"), path).unwrap();

        let conn = Connection::open(path).unwrap();
        let stmt = conn.prepare("SELECT * FROM buyer_recommendations_view").unwrap();
        let columns: Vec<&str> = stmt.column_names();
        assert_eq!(columns.len(), 9);
        assert!(!columns.contains(&"match_score"));
        assert_eq!(columns[8], "match_reason");
    }

    #[test]
    fn test_rerun_replaces_previous_output() {
        let temp_file = NamedTempFile::with_suffix(".db").unwrap();
        let path = temp_file.path();

        save(&result("B001,A36,pickled,2.0,1000,,\nB002,A36,pickled,2.0,1000,,\n"), path).unwrap();
        assert_eq!(count(path, "buyer_recommendations"), 6);

        save(&result("B003,X999,pickled,2.0,1000,,\n"), path).unwrap();
        assert_eq!(count(path, "buyer_recommendations"), 0);
        assert_eq!(count(path, "unified_supplier_data"), 3);
        assert!(load_recommendations(path).is_empty());
    }
}
