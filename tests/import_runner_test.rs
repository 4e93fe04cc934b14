// ==========================================
// ImportRunner 集成测试
// ==========================================
// 测试目标: 验证完整的逐行导入编排(key 定位 / upsert / 错误中止)
// ==========================================

mod test_helpers;

use tabular_import::{
    AttributeOptions, CsvSource, ImportError, ImportPlan, ImportRunner, MemorySource, Value,
};
use tabular_import::logging;
use tempfile::NamedTempFile;
use test_helpers::{count_plants, create_plants_store, float_field, text_field};

#[test]
fn test_basic_import_creates_records() {
    logging::init_test();
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[
        &[("code", "P1"), ("name", "North")],
        &[("code", "P2"), ("name", "South")],
    ]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    let summary = runner.run().unwrap();

    assert_eq!(summary.total_rows, 2);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.updated, 0);
    assert_eq!(count_plants(&conn), 2);
    assert_eq!(text_field(&conn, "P1", "name").as_deref(), Some("North"));
    assert_eq!(text_field(&conn, "P2", "name").as_deref(), Some("South"));
}

#[test]
fn test_second_run_is_idempotent() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("name", "North")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    let first = runner.run().unwrap();
    let second = runner.run().unwrap();

    assert_eq!(first.created, 1);
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 1);
    // 重复执行不产生重复行
    assert_eq!(count_plants(&conn), 1);
    assert_eq!(text_field(&conn, "P1", "name").as_deref(), Some("North"));
}

#[test]
fn test_second_run_refetches_changed_source() {
    let (conn, store) = create_plants_store();
    let source_file = NamedTempFile::new().unwrap();
    std::fs::write(source_file.path(), "code,name\nP1,Old\n").unwrap();

    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap();
    let source = CsvSource::new(source_file.path());
    let mut runner = ImportRunner::new(plan, Box::new(source), store);

    runner.run().unwrap();
    assert_eq!(text_field(&conn, "P1", "name").as_deref(), Some("Old"));

    // 数据源更新后,下一轮重新拉取而不是复用上一轮的行流
    std::fs::write(source_file.path(), "code,name\nP1,New\n").unwrap();
    runner.run().unwrap();
    assert_eq!(text_field(&conn, "P1", "name").as_deref(), Some("New"));
}

#[test]
fn test_overwrite_false_preserves_existing_value() {
    let (conn, store) = create_plants_store();

    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new().overwrite(false))
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("name", "Original")]]);
    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    runner.run().unwrap();
    let store = runner.into_store();

    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new().overwrite(false))
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("name", "Renamed")]]);
    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    runner.run().unwrap();

    // 已有值不被覆盖
    assert_eq!(text_field(&conn, "P1", "name").as_deref(), Some("Original"));
}

#[test]
fn test_unit_conversion_writes_companion_column() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store(
            "energy",
            AttributeOptions::new()
                .units_field_name("unit")
                .to_units("kwh"),
        )
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("energy", "10"), ("unit", "MWh")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    runner.run().unwrap();

    let energy = float_field(&conn, "P1", "energy").unwrap();
    assert!((energy - 10_000.0).abs() < 1e-9);
    assert_eq!(text_field(&conn, "P1", "energy_units").as_deref(), Some("kwh"));
}

#[test]
fn test_missing_key_value_aborts_run() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("name", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap();
    // 第一行没有 code 列
    let source = MemorySource::from_pairs(&[&[("name", "Anonymous")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    let err = runner.run().unwrap_err();
    assert!(matches!(err, ImportError::MissingKeyValue(field) if field == "code"));
    assert_eq!(count_plants(&conn), 0);
}

#[test]
fn test_row_error_aborts_without_skipping() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store(
            "energy",
            AttributeOptions::new()
                .units_field_name("unit")
                .to_units("kwh"),
        )
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[
        &[("code", "P1"), ("energy", "10"), ("unit", "MWh")],
        &[("code", "P2"), ("energy", "5"), ("unit", "parsecs")],
        &[("code", "P3"), ("energy", "7"), ("unit", "kwh")],
    ]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    let err = runner.run().unwrap_err();
    assert!(matches!(err, ImportError::UnknownUnit(unit) if unit == "parsecs"));
    // 错误行之前的保存生效,错误行及之后不再处理
    assert_eq!(count_plants(&conn), 1);
    assert_eq!(text_field(&conn, "P3", "name"), None);
}

#[test]
fn test_missing_row_units_aborts_run() {
    let (_conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store(
            "energy",
            AttributeOptions::new()
                .units_field_name("unit")
                .to_units("kwh"),
        )
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("energy", "10"), ("unit", " ")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    match runner.run().unwrap_err() {
        ImportError::MissingUnits { from, to } => {
            assert_eq!(from, None);
            assert_eq!(to, Some("kwh".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_row_digest_column_is_filled() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store("row_digest", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1"), ("name", "North")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    runner.run().unwrap();

    let digest = text_field(&conn, "P1", "row_digest").unwrap();
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn test_static_value_applied_to_every_row() {
    let (conn, store) = create_plants_store();
    let plan = ImportPlan::builder()
        .key("code", AttributeOptions::new())
        .unwrap()
        .store(
            "region",
            AttributeOptions::new().static_value(Some(Value::from("imported"))),
        )
        .unwrap()
        .build()
        .unwrap();
    let source = MemorySource::from_pairs(&[&[("code", "P1")], &[("code", "P2")]]);

    let mut runner = ImportRunner::new(plan, Box::new(source), store);
    runner.run().unwrap();

    assert_eq!(text_field(&conn, "P1", "region").as_deref(), Some("imported"));
    assert_eq!(text_field(&conn, "P2", "region").as_deref(), Some("imported"));
}
