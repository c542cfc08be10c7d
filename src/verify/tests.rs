use proptest::prelude::*;

use super::*;
use crate::probe::tests::{ACCEPTING, Script, ScriptedConnector};
use crate::records::MxRecord;
use crate::records::tests::StubResolver;

fn example_dns() -> StubResolver {
    StubResolver::new()
        .with_mx("example.com", vec![MxRecord::new(10, "mx1.example.com")])
        .with_txt("example.com", vec!["v=spf1 -all"])
}

#[test]
fn accepted_recipient_scenario() {
    let dns = example_dns();
    let smtp = ScriptedConnector::new().host("mx1.example.com", Script::Replies(ACCEPTING));

    let result = Verifier::new(&dns, &smtp).verify("user@example.com");

    assert_eq!(result.email, "user@example.com");
    assert!(result.syntax_valid);
    assert!(result.is_valid);
    assert!(result.has_mx);
    assert!(result.has_spf);
    assert_eq!(result.spf_record, "v=spf1 -all");
    assert!(!result.has_dmarc);
    assert_eq!(result.dmarc_record, "");
    assert_eq!(result.error, "");
    assert_eq!(smtp.attempts(), vec!["mx1.example.com"]);
}

#[test]
fn malformed_address_triggers_no_network() {
    let dns = example_dns();
    let smtp = ScriptedConnector::new();

    let result = Verifier::new(&dns, &smtp).verify("not-an-address");

    assert!(!result.syntax_valid);
    assert!(!result.is_valid);
    assert!(!result.has_mx);
    assert_eq!(result.error, "Invalid email format");
    assert_eq!(dns.calls(), 0);
    assert!(smtp.attempts().is_empty());
}

#[test]
fn missing_mx_skips_probe() {
    let dns = StubResolver::new()
        .with_txt("nomx.example", vec!["v=spf1 include:_spf.nomx.example -all"])
        .with_txt("_dmarc.nomx.example", vec!["v=DMARC1; p=quarantine"]);
    let smtp = ScriptedConnector::new();

    let result = Verifier::new(&dns, &smtp).verify("user@nomx.example");

    assert!(result.syntax_valid);
    assert!(!result.has_mx);
    assert!(!result.is_valid);
    assert_eq!(result.error, "No MX records found for the domain");
    assert!(result.has_spf);
    assert_eq!(result.dmarc_record, "v=DMARC1; p=quarantine");
    assert!(smtp.attempts().is_empty());
}

#[test]
fn failing_mx_lookup_reads_as_missing_mx() {
    let dns = StubResolver::new().failing("example.com");
    let smtp = ScriptedConnector::new();

    let result = Verifier::new(&dns, &smtp).verify("user@example.com");

    assert!(!result.has_mx);
    assert!(!result.has_spf);
    assert_eq!(result.error, NO_MX_RECORDS);
    assert!(smtp.attempts().is_empty());
}

#[test]
fn rejection_detail_propagated() {
    let dns = example_dns();
    let smtp = ScriptedConnector::new().host(
        "mx1.example.com",
        Script::Replies("220 mx\r\n250 hi\r\n250 ok\r\n550 mailbox unavailable\r\n"),
    );

    let result = Verifier::new(&dns, &smtp).verify("ghost@example.com");

    assert!(result.syntax_valid);
    assert!(result.has_mx);
    assert!(!result.is_valid);
    assert_eq!(result.error, "SMTP Error Code 550: mailbox unavailable");
}

#[test]
fn unreachable_exchangers_reported() {
    let dns = example_dns();
    let smtp = ScriptedConnector::new();

    let result = Verifier::new(&dns, &smtp).verify("user@example.com");

    assert!(result.has_mx);
    assert!(!result.is_valid);
    assert_eq!(result.error, "Could not verify email: all MX servers failed");
}

proptest! {
    #[test]
    fn no_lookups_without_at_sign(input in "[^@]{0,40}") {
        let dns = example_dns();
        let smtp = ScriptedConnector::new();
        let result = Verifier::new(&dns, &smtp).verify(&input);
        prop_assert!(!result.syntax_valid);
        prop_assert_eq!(dns.calls(), 0);
        prop_assert!(smtp.attempts().is_empty());
    }
}

#[cfg(feature = "with-serde")]
#[test]
fn json_round_trip_preserves_fields() {
    let result = VerificationResult {
        email: "user@example.com".to_string(),
        syntax_valid: true,
        is_valid: false,
        has_mx: true,
        has_spf: true,
        spf_record: "v=spf1 -all".to_string(),
        has_dmarc: true,
        dmarc_record: "v=DMARC1; p=reject".to_string(),
        error: "SMTP Error Code 550: mailbox unavailable".to_string(),
    };

    let json = serde_json::to_string(&result).expect("serialize");
    let back: VerificationResult = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, result);

    let value: serde_json::Value = serde_json::from_str(&json).expect("value");
    assert_eq!(value["has_mx"], serde_json::Value::Bool(true));
    assert_eq!(value["is_valid"], serde_json::Value::Bool(false));
}

#[cfg(feature = "with-serde")]
#[test]
fn json_keys_are_stable() {
    let dns = example_dns();
    let smtp = ScriptedConnector::new().host("mx1.example.com", Script::Replies(ACCEPTING));
    let result = Verifier::new(&dns, &smtp).verify("user@example.com");

    let json = serde_json::to_string_pretty(&result).expect("serialize");
    insta::assert_snapshot!(json, @r###"
    {
      "email": "user@example.com",
      "syntax_valid": true,
      "is_valid": true,
      "has_mx": true,
      "has_spf": true,
      "spf_record": "v=spf1 -all",
      "has_dmarc": false,
      "dmarc_record": "",
      "error": ""
    }
    "###);
}

#[cfg(feature = "with-serde")]
#[test]
fn missing_error_key_defaults_to_empty() {
    let json = r#"{"email":"a@b.co","syntax_valid":true,"is_valid":true,"has_mx":true,
        "has_spf":false,"spf_record":"","has_dmarc":false,"dmarc_record":""}"#;
    let result: VerificationResult = serde_json::from_str(json).expect("deserialize");
    assert_eq!(result.error, "");
    assert!(result.is_valid);
}
