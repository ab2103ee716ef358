#![cfg(feature = "sea-orm")]

mod common;

use common::date;
use filtercrate::{
    FieldSchema, FilterKind, FilterSpec, QueryDriver, ReportBuilder, ScalarKind, ScalarValue,
    SeaOrmDriver,
};
use sea_orm::Condition;
use sea_orm::sea_query::{
    Alias, Asterisk, ConditionalStatement, Query, QueryStatementWriter, SqliteQueryBuilder,
};

fn sql(condition: Condition) -> String {
    Query::select()
        .column(Asterisk)
        .from(Alias::new("entries"))
        .cond_where(condition)
        .to_string(SqliteQueryBuilder)
}

#[test]
fn equal_on_timestamp_field_spans_the_whole_day() {
    let driver = SeaOrmDriver::new().timestamp_field("created_at");
    let condition = driver.equal(
        Condition::all(),
        "created_at",
        &ScalarValue::Date(date(2013, 1, 5)),
    );
    let sql = sql(condition);
    assert!(sql.contains("BETWEEN"), "{sql}");
    assert!(sql.contains("2013-01-05 00:00:00"), "{sql}");
    assert!(sql.contains("23:59:59"), "{sql}");
}

#[test]
fn equal_on_date_field_stays_exact() {
    let driver = SeaOrmDriver::new();
    let condition = driver.equal(
        Condition::all(),
        "shipping_date",
        &ScalarValue::Date(date(2013, 1, 5)),
    );
    let sql = sql(condition);
    assert!(!sql.contains("BETWEEN"), "{sql}");
    assert!(sql.contains("\"shipping_date\" ="), "{sql}");
    assert!(sql.contains("2013-01-05"), "{sql}");
}

#[test]
fn comparison_bounds_respect_day_edges_on_timestamps() {
    let driver = SeaOrmDriver::new().timestamp_field("created_at");
    let day = ScalarValue::Date(date(2013, 1, 5));

    let sql_gte = sql(driver.greater_equal(Condition::all(), "created_at", &day));
    assert!(sql_gte.contains(">="), "{sql_gte}");
    assert!(sql_gte.contains("2013-01-05 00:00:00"), "{sql_gte}");

    let sql_lte = sql(driver.less_equal(Condition::all(), "created_at", &day));
    assert!(sql_lte.contains("<="), "{sql_lte}");
    assert!(sql_lte.contains("2013-01-05 23:59:59"), "{sql_lte}");
}

#[test]
fn contains_uses_case_insensitive_like_for_text() {
    let driver = SeaOrmDriver::new();
    let condition = driver.contains(Condition::all(), "name", &ScalarValue::from("ell"));
    let sql = sql(condition);
    assert!(sql.contains("UPPER"), "{sql}");
    assert!(sql.contains("'%ELL%'"), "{sql}");
}

#[test]
fn contains_falls_back_to_equality_for_scalars() {
    let driver = SeaOrmDriver::new();
    let condition = driver.contains(Condition::all(), "group_id", &ScalarValue::Int(2));
    let sql = sql(condition);
    assert!(!sql.contains("LIKE"), "{sql}");
    assert!(sql.contains("\"group_id\" = 2"), "{sql}");
}

#[test]
fn any_of_uses_native_set_membership() {
    let driver = SeaOrmDriver::new();
    let condition = driver.any_of(
        Condition::all(),
        "group_id",
        &[ScalarValue::Int(1), ScalarValue::Int(2)],
    );
    let sql = sql(condition);
    assert!(sql.contains("IN"), "{sql}");
    assert!(sql.contains('1') && sql.contains('2'), "{sql}");
}

#[test]
fn any_of_expands_dates_on_timestamp_fields() {
    let driver = SeaOrmDriver::new().timestamp_field("created_at");
    let condition = driver.any_of(
        Condition::all(),
        "created_at",
        &[
            ScalarValue::Date(date(2013, 1, 5)),
            ScalarValue::Date(date(2013, 1, 7)),
        ],
    );
    let sql = sql(condition);
    assert!(sql.contains("OR"), "{sql}");
    assert!(sql.contains("BETWEEN"), "{sql}");
}

#[test]
fn uuid_shaped_strings_compare_as_uuids() {
    let driver = SeaOrmDriver::new();
    let condition = driver.equal(
        Condition::all(),
        "id",
        &ScalarValue::from("550e8400-e29b-41d4-a716-446655440000"),
    );
    let sql = sql(condition);
    assert!(sql.contains("550e8400-e29b-41d4-a716-446655440000"), "{sql}");
}

#[test]
fn dotted_paths_address_joined_columns() {
    let driver = SeaOrmDriver::new();
    let condition = driver.equal(Condition::all(), "groups.name", &ScalarValue::from("admin"));
    let sql = sql(condition);
    assert!(sql.contains("\"groups\".\"name\""), "{sql}");
}

#[test]
fn report_composes_conditions_in_declaration_order() {
    let definition = ReportBuilder::new(SeaOrmDriver::new().timestamp_field("created_at"))
        .filter(FilterSpec::new("group_id", FilterKind::Integer).multiple())
        .unwrap()
        .filter(FilterSpec::new("created_at", FilterKind::Date).range())
        .unwrap()
        .filter(FilterSpec::new(
            "condition",
            FilterKind::Dynamic(FieldSchema::new().field("name", ScalarKind::String)),
        ))
        .unwrap()
        .build();

    let mut report = definition.instance(Condition::all());
    report.set("group_id", vec![1, 2]).unwrap();
    report
        .set("created_at", vec!["2013-01-03", "2013-01-05"])
        .unwrap();
    report.set("condition", vec!["name", "=~", "ell"]).unwrap();

    let sql = sql(report.assets().unwrap().clone());
    let in_pos = sql.find("IN").unwrap();
    let range_pos = sql.find(">=").unwrap();
    let like_pos = sql.find("LIKE").unwrap();
    assert!(in_pos < range_pos && range_pos < like_pos, "{sql}");
}
