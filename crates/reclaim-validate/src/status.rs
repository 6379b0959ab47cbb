use reclaim_model::{FieldOutcome, RecordStatus};

/// Status implied by field outcomes alone.
///
/// Any blocking issue makes the record `Escalated` (pending the retry
/// policy). Otherwise issues on required fields quarantine it; issues on
/// optional fields do so only when `quarantine_optional` is set.
pub fn provisional_status(outcomes: &[FieldOutcome], quarantine_optional: bool) -> RecordStatus {
    if outcomes.iter().any(FieldOutcome::is_blocking) {
        RecordStatus::Escalated
    } else if outcomes
        .iter()
        .any(|o| o.issue.is_some() && (o.required || quarantine_optional))
    {
        RecordStatus::Quarantined
    } else {
        RecordStatus::Clean
    }
}

#[cfg(test)]
mod tests {
    use reclaim_model::{FieldIssue, FieldValue, IssueCode};

    use super::*;

    fn issue(required: bool, code: IssueCode) -> FieldOutcome {
        FieldOutcome::failed("f", required, None, FieldIssue::new(code, "x"))
    }

    #[test]
    fn status_rules() {
        let ok = FieldOutcome::valid("id", true, FieldValue::Integer(1));
        assert_eq!(provisional_status(&[ok.clone()], false), RecordStatus::Clean);
        assert_eq!(
            provisional_status(&[ok.clone(), issue(false, IssueCode::InvalidFormat)], false),
            RecordStatus::Clean
        );
        assert_eq!(
            provisional_status(&[ok.clone(), issue(false, IssueCode::InvalidFormat)], true),
            RecordStatus::Quarantined
        );
        assert_eq!(
            provisional_status(&[ok.clone(), issue(true, IssueCode::InvalidFormat)], false),
            RecordStatus::Quarantined
        );
        assert_eq!(
            provisional_status(
                &[ok, issue(true, IssueCode::InvalidFormat), issue(true, IssueCode::MissingRequired)],
                false
            ),
            RecordStatus::Escalated
        );
    }
}
