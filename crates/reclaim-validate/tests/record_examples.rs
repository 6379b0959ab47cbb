use chrono::NaiveDate;
use proptest::prelude::*;
use reclaim_model::{
    FieldValue, IssueCode, NormalizationConfig, RawRecord, RecordStatus, Recoverability,
};
use reclaim_schema::{SchemaRegistry, SchemaSource};
use reclaim_validate::RecordValidator;

const SCHEMA: &str = "\
name,type,required,rule
record_id,int,true,
client_name,str,true,
unit_number,str,true,upper;alnum
move_in_date,date,true,
active_status,bool,true,
balance_cents,currency,true,
";

const COLUMNS: [&str; 6] = [
    "record_id",
    "client_name",
    "unit_number",
    "move_in_date",
    "active_status",
    "balance_cents",
];

fn validator() -> RecordValidator {
    let registry = SchemaRegistry::load(SchemaSource::csv(SCHEMA)).expect("schema");
    RecordValidator::new(registry, &NormalizationConfig::default()).expect("validator")
}

fn record(values: [&str; 6]) -> RawRecord {
    RawRecord::from_pairs(1, COLUMNS.into_iter().zip(values))
}

#[test]
fn legacy_row_is_quarantined_on_bad_amount() {
    let verdict = validator().validate(&record([
        "A1003",
        "Singh, Amar",
        "4 b",
        "Mar 17 2024",
        "1",
        "1.2k",
    ]));

    assert_eq!(verdict.value("record_id"), Some(&FieldValue::Integer(1003)));
    assert_eq!(
        verdict.value("client_name"),
        Some(&FieldValue::Text("Singh, Amar".to_string()))
    );
    assert_eq!(
        verdict.value("unit_number"),
        Some(&FieldValue::Text("4B".to_string()))
    );
    assert_eq!(
        verdict.value("move_in_date"),
        Some(&FieldValue::Date(
            NaiveDate::from_ymd_opt(2024, 3, 17).expect("date")
        ))
    );
    assert_eq!(
        verdict.value("move_in_date").map(ToString::to_string).as_deref(),
        Some("2024-03-17")
    );
    assert_eq!(verdict.value("active_status"), Some(&FieldValue::Boolean(true)));

    let balance = verdict.outcome("balance_cents").expect("balance outcome");
    assert_eq!(balance.value, None);
    assert_eq!(
        balance.issue.as_ref().map(|issue| issue.code),
        Some(IssueCode::InvalidFormat)
    );
    assert_eq!(verdict.status, RecordStatus::Quarantined);
}

#[test]
fn empty_identifier_blocks_the_record() {
    let verdict = validator().validate(&record([
        "",
        "Singh, Amar",
        "4B",
        "2024-03-17",
        "yes",
        "$10.00",
    ]));
    let id = verdict.outcome("record_id").expect("id outcome");
    assert_eq!(id.issue.as_ref().map(|i| i.code), Some(IssueCode::MissingRequired));
    assert_eq!(
        id.issue.as_ref().map(|i| i.recoverability()),
        Some(Recoverability::NonRecoverable)
    );
    assert_eq!(verdict.status, RecordStatus::Escalated);
}

#[test]
fn outcomes_follow_schema_order() {
    let verdict = validator().validate(&record(["1", "a", "b", "2024-01-01", "n", "0"]));
    let fields: Vec<_> = verdict.outcomes.iter().map(|o| o.field.as_str()).collect();
    assert_eq!(fields, COLUMNS);
}

fn raw_value() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        Just("A1003".to_string()),
        Just("yes".to_string()),
        Just("1.2k".to_string()),
        Just("$12.30".to_string()),
        Just("Mar 17 2024".to_string()),
        "[ -~]{0,12}",
    ]
}

proptest! {
    #[test]
    fn status_agrees_with_issues(values in prop::array::uniform6(raw_value())) {
        let refs: [&str; 6] = std::array::from_fn(|i| values[i].as_str());
        let verdict = validator().validate(&record(refs));
        let blocking = verdict.issues().filter(|(_, issue)| issue.blocking).count();
        let recoverable = verdict.issues().filter(|(_, issue)| !issue.blocking).count();
        match verdict.status {
            RecordStatus::Clean => prop_assert_eq!(blocking, 0),
            RecordStatus::Quarantined => {
                prop_assert_eq!(blocking, 0);
                prop_assert!(recoverable > 0);
            }
            RecordStatus::Escalated => prop_assert!(blocking > 0),
        }
    }
}
