use serde_json::Value;

use crate::error::CoreError;

/// Prefix of fully-qualified security vocabulary terms.
pub const SECURITY_VOCAB_PREFIX: &str = "https://w3id.org/security#";

/// Read a property from a proof object by short name or by its
/// fully-qualified security vocabulary name.
///
/// When the value is an object carrying an `id`, the `id` is returned, so an
/// embedded node and a bare identifier are treated the same way.
pub fn get_proof_property(proof: &Value, name: &str) -> Result<Value, CoreError> {
    let value = proof
        .get(name)
        .or_else(|| proof.get(format!("{SECURITY_VOCAB_PREFIX}{name}")))
        .ok_or_else(|| CoreError::InvalidProofProperty(name.to_string()))?;

    match value.get("id") {
        Some(id) if value.is_object() => Ok(id.clone()),
        _ => Ok(value.clone()),
    }
}

/// [`get_proof_property`] for string-valued properties.
pub fn get_proof_property_str(proof: &Value, name: &str) -> Result<String, CoreError> {
    match get_proof_property(proof, name)? {
        Value::String(s) => Ok(s),
        _ => Err(CoreError::InvalidProofProperty(format!(
            "{name} is not a string"
        ))),
    }
}
