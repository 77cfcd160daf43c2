#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::fs;
    use std::io::Write;

    use tempfile::TempDir;

    use crate::feature::{Action, FeaturePayload, FeatureRecord, Transaction};
    use crate::storage::{SnapshotStore, WalStore};

    fn point_payload(id: &str, x: f64, y: f64) -> FeaturePayload {
        let feature = geojson::Feature {
            bbox: None,
            geometry: Some(geojson::Geometry::new(geojson::Value::Point(vec![x, y]))),
            id: Some(geojson::feature::Id::String(id.to_string())),
            properties: None,
            foreign_members: None,
        };
        FeaturePayload::try_from(feature).unwrap()
    }

    fn upsert(origin: &str, lsn: u64, id: &str) -> Transaction {
        Transaction {
            action: Action::Upsert,
            origin: origin.to_string(),
            lsn,
            payload: point_payload(id, 1.0, 2.0),
        }
    }

    // ============================================================
    // WAL
    // ============================================================

    #[test]
    fn test_wal_append_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let wal = WalStore::new(dir.path().join("wal.txt"));

        let tx = upsert("storage-1-1", 1, "a");
        wal.append(&tx).unwrap();

        assert_eq!(wal.load().unwrap(), vec![tx]);
    }

    #[test]
    fn test_wal_preserves_append_order() {
        let dir = TempDir::new().unwrap();
        let wal = WalStore::new(dir.path().join("wal.txt"));

        for lsn in 1..=3 {
            wal.append(&upsert("storage-1-1", lsn, "a")).unwrap();
        }

        let loaded = wal.load().unwrap();
        let lsns: Vec<u64> = loaded.iter().map(|tx| tx.lsn).collect();
        assert_eq!(lsns, vec![1, 2, 3]);
    }

    #[test]
    fn test_wal_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let wal = WalStore::new(dir.path().join("nope.txt"));

        assert!(wal.load().unwrap().is_empty());
    }

    #[test]
    fn test_wal_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wal.txt");
        let wal = WalStore::new(&path);

        wal.append(&upsert("storage-1-1", 1, "a")).unwrap();

        // Uszkodzona linia w środku pliku nie może przerwać odtwarzania
        let mut file = fs::OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "this is not json").unwrap();
        drop(file);

        wal.append(&upsert("storage-1-1", 2, "b")).unwrap();

        let loaded = wal.load().unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].lsn, 1);
        assert_eq!(loaded[1].lsn, 2);
    }

    #[test]
    fn test_wal_truncate_empties_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("wal.txt");
        let wal = WalStore::new(&path);

        wal.append(&upsert("storage-1-1", 1, "a")).unwrap();
        wal.append(&upsert("storage-1-1", 2, "b")).unwrap();
        wal.truncate().unwrap();

        assert!(wal.load().unwrap().is_empty());
        assert_eq!(fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn test_wal_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let wal = WalStore::new(dir.path().join("1").join("4").join("wal.txt"));

        wal.append(&upsert("storage-1-4", 1, "a")).unwrap();
        assert_eq!(wal.load().unwrap().len(), 1);
    }

    // ============================================================
    // SNAPSHOT
    // ============================================================

    #[test]
    fn test_snapshot_save_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        let mut data = HashMap::new();
        data.insert(
            "a".to_string(),
            FeatureRecord {
                origin: "storage-1-1".to_string(),
                lsn: 1,
                payload: point_payload("a", 1.0, 2.0),
            },
        );
        data.insert(
            "b".to_string(),
            FeatureRecord {
                origin: "storage-1-2".to_string(),
                lsn: 5,
                payload: point_payload("b", 3.0, 4.0),
            },
        );

        store.save(&data).unwrap();
        let loaded = store.load().unwrap().expect("snapshot should exist");

        assert_eq!(loaded, data);
    }

    #[test]
    fn test_snapshot_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_snapshot_wire_format() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        let store = SnapshotStore::new(&path);

        let mut data = HashMap::new();
        data.insert(
            "a".to_string(),
            FeatureRecord {
                origin: "storage-1-1".to_string(),
                lsn: 3,
                payload: point_payload("a", 1.0, 2.0),
            },
        );
        store.save(&data).unwrap();

        // Jeden obiekt JSON: id -> {name, lsn, feature}
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["a"]["name"], "storage-1-1");
        assert_eq!(value["a"]["lsn"], 3);
        assert_eq!(value["a"]["feature"]["id"], "a");
    }

    #[test]
    fn test_snapshot_save_replaces_previous() {
        let dir = TempDir::new().unwrap();
        let store = SnapshotStore::new(dir.path().join("snapshot.json"));

        let mut first = HashMap::new();
        first.insert(
            "a".to_string(),
            FeatureRecord {
                origin: "storage-1-1".to_string(),
                lsn: 1,
                payload: point_payload("a", 1.0, 2.0),
            },
        );
        store.save(&first).unwrap();

        let second = HashMap::new();
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap().unwrap(), second);
    }
}
