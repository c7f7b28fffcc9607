//! Demo credential issued in response to a holder's signed request.

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use uuid::Uuid;
use vcsign_loader::contexts::{CREDENTIALS_V1_URL, DCC_V1_URL};

use crate::error::ServiceError;

/// Template used when none is configured: a DCC learning credential.
pub fn default_demo_template() -> Value {
    json!({
        "@context": [CREDENTIALS_V1_URL, DCC_V1_URL],
        "type": ["VerifiableCredential", "LearningCredentialRecord"],
        "issuer": {
            "type": "Issuer",
            "name": "Digital Credentials Consortium Demo Issuer",
            "url": "https://digitalcredentials.mit.edu"
        },
        "credentialSubject": {
            "type": "Person",
            "hasCredential": {
                "type": ["EducationalOccupationalCredential"],
                "name": "DCC Demo Credential",
                "description": "Issued to demonstrate credential wallets."
            }
        }
    })
}

/// Copy of `template` with a fresh `urn:uuid` id, `holder` as subject id,
/// `issuer` as issuer (string or `issuer.id`) and `issuanceDate` now.
pub fn stamp_demo_credential(
    template: &Value,
    holder: &str,
    issuer: &str,
) -> Result<Value, ServiceError> {
    let mut credential = template.clone();
    let Some(fields) = credential.as_object_mut() else {
        return Err(ServiceError::Configuration(
            "demo credential template must be a JSON object".into(),
        ));
    };

    fields.insert("id".into(), json!(format!("urn:uuid:{}", Uuid::now_v7())));
    fields.insert(
        "issuanceDate".into(),
        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );

    let issuer = match fields.remove("issuer") {
        Some(Value::Object(mut object)) => {
            object.insert("id".into(), json!(issuer));
            Value::Object(object)
        }
        _ => json!(issuer),
    };
    fields.insert("issuer".into(), issuer);

    let subject = fields
        .entry("credentialSubject")
        .or_insert_with(|| Value::Object(Map::new()));
    match subject.as_object_mut() {
        Some(subject) => {
            subject.insert("id".into(), json!(holder));
        }
        None => {
            return Err(ServiceError::Configuration(
                "demo credential subject must be a JSON object".into(),
            ))
        }
    }

    Ok(credential)
}
