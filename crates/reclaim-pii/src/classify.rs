//! Static PII classification policy.

use reclaim_model::{FieldSpec, PiiClass, PiiTag, SemanticType};

enum NameMatch {
    Exact(&'static str),
    Contains(&'static str),
    Prefix(&'static str),
}

/// Field-name policy, checked in order after explicit tags and semantic types.
const NAME_POLICY: &[(NameMatch, PiiClass)] = &[
    (NameMatch::Contains("ssn"), PiiClass::Ssn),
    (NameMatch::Contains("social_security"), PiiClass::Ssn),
    (NameMatch::Contains("tax_id"), PiiClass::Ssn),
    (NameMatch::Contains("credit_card"), PiiClass::CreditCard),
    (NameMatch::Contains("card_number"), PiiClass::CreditCard),
    (NameMatch::Prefix("cc_"), PiiClass::CreditCard),
    (NameMatch::Contains("email"), PiiClass::Email),
    (NameMatch::Contains("phone"), PiiClass::Phone),
    (NameMatch::Contains("mobile"), PiiClass::Phone),
    (NameMatch::Exact("name"), PiiClass::Name),
    (NameMatch::Contains("first_name"), PiiClass::Name),
    (NameMatch::Contains("last_name"), PiiClass::Name),
    (NameMatch::Contains("full_name"), PiiClass::Name),
    (NameMatch::Contains("client_name"), PiiClass::Name),
    (NameMatch::Contains("contact_name"), PiiClass::Name),
    (NameMatch::Contains("customer_name"), PiiClass::Name),
    (NameMatch::Contains("birth"), PiiClass::Other),
    (NameMatch::Exact("dob"), PiiClass::Other),
    (NameMatch::Contains("address"), PiiClass::Other),
    (NameMatch::Contains("street"), PiiClass::Other),
    (NameMatch::Contains("passport"), PiiClass::Other),
    (NameMatch::Contains("license"), PiiClass::Other),
];

impl NameMatch {
    fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(s) => name == *s,
            Self::Contains(s) => name.contains(s),
            Self::Prefix(s) => name.starts_with(s),
        }
    }
}

/// PII class of a field, from its definition only.
///
/// An explicit `pii=` rule tag wins, then the semantic type, then the
/// field and legacy column names.
pub fn classify(spec: &FieldSpec) -> Option<PiiClass> {
    match spec.rule.pii {
        Some(PiiTag::Exempt) => return None,
        Some(PiiTag::Class(class)) => return Some(class),
        None => {}
    }
    match spec.semantic_type {
        SemanticType::Email => return Some(PiiClass::Email),
        SemanticType::Phone => return Some(PiiClass::Phone),
        _ => {}
    }
    let names = [spec.name.to_ascii_lowercase(), spec.source_column().to_ascii_lowercase()];
    NAME_POLICY
        .iter()
        .find(|(rule, _)| names.iter().any(|name| rule.matches(name)))
        .map(|(_, class)| *class)
}

#[cfg(test)]
mod tests {
    use reclaim_model::FieldRule;

    use super::*;

    fn string_field(name: &str) -> FieldSpec {
        FieldSpec::new(name, SemanticType::String)
    }

    #[test]
    fn classifies_by_name() {
        assert_eq!(classify(&string_field("client_name")), Some(PiiClass::Name));
        assert_eq!(classify(&string_field("ssn_last4")), Some(PiiClass::Ssn));
        assert_eq!(classify(&string_field("cc_number")), Some(PiiClass::CreditCard));
        assert_eq!(classify(&string_field("date_of_birth")), Some(PiiClass::Other));
        assert_eq!(classify(&string_field("unit_number")), None);
        assert_eq!(classify(&string_field("company_name")), None);
    }

    #[test]
    fn semantic_type_and_source_column() {
        assert_eq!(
            classify(&FieldSpec::new("contact", SemanticType::Email)),
            Some(PiiClass::Email)
        );
        assert_eq!(
            classify(&FieldSpec::new("primary", SemanticType::Phone)),
            Some(PiiClass::Phone)
        );
        assert_eq!(
            classify(&string_field("tenant").with_source("TENANT_FULL_NAME")),
            Some(PiiClass::Name)
        );
    }

    #[test]
    fn explicit_tags_win() {
        let exempt = string_field("client_name").with_rule(FieldRule {
            pii: Some(PiiTag::Exempt),
            ..FieldRule::default()
        });
        assert_eq!(classify(&exempt), None);
        let tagged = string_field("reference").with_rule(FieldRule {
            pii: Some(PiiTag::Class(PiiClass::Ssn)),
            ..FieldRule::default()
        });
        assert_eq!(classify(&tagged), Some(PiiClass::Ssn));
    }
}
