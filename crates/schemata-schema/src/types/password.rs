//! `password`: stored as an Argon2id hash, never exported.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;
use schemata_core::Record;
use serde_json::Value;
use tracing::warn;

use super::{Converter, FieldTypePlugin, Omit};
use crate::convert::ConvertContext;
use crate::error::ConvertError;
use crate::field::{Field, kinds};
use crate::format::Format;

pub(super) fn plugin() -> FieldTypePlugin {
    FieldTypePlugin::new(kinds::PASSWORD)
        .converters(HashPassword)
        .exporter(Format::Csv, Omit)
}

/// Hashes a non-empty password exactly as typed. Blank input leaves the stored hash alone.
struct HashPassword;

#[async_trait]
impl Converter for HashPassword {
    async fn convert(
        &self,
        _cx: &ConvertContext<'_>,
        input: &Record,
        name: &str,
        target: &mut Record,
        _field: &Field,
    ) -> Result<(), ConvertError> {
        let password = match input.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => return Ok(()),
        };
        if password.trim().is_empty() {
            return Ok(());
        }
        match hash_password(&password) {
            Ok(hash) => {
                target.insert(name.to_string(), Value::String(hash));
            }
            Err(e) => warn!(field = %name, error = %e, "Failed to hash password, leaving it unchanged"),
        }
        Ok(())
    }
}

fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use argon2::{PasswordHash, PasswordVerifier};
    use schemata_core::RequestContext;
    use serde_json::json;

    use super::*;
    use crate::service::Schemas;
    use crate::test_support::RecordingManagers;

    fn verifies(hash: &str, password: &[u8]) -> bool {
        let parsed = PasswordHash::new(hash).unwrap();
        Argon2::default().verify_password(password, &parsed).is_ok()
    }

    async fn convert(input: Value, target: &mut Record) {
        let schemas = Schemas::builder(Arc::new(RecordingManagers::default())).build();
        let cx = RequestContext::anonymous();
        schemas
            .convert_fields(
                &cx,
                &[Field::new("password", kinds::PASSWORD)],
                &Format::Form,
                input.as_object().unwrap(),
                target,
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_surrounding_spaces_are_part_of_the_password() {
        let mut target = Record::new();
        convert(json!({"password": "  open sesame "}), &mut target).await;

        let hash = target["password"].as_str().unwrap();
        assert!(verifies(hash, b"  open sesame "));
        assert!(!verifies(hash, b"open sesame"));
    }

    #[tokio::test]
    async fn test_blank_password_keeps_existing_hash() {
        let mut target = Record::new();
        target.insert("password".into(), json!("$argon2id$old"));
        convert(json!({"password": "   "}), &mut target).await;

        assert_eq!(target["password"], json!("$argon2id$old"));
    }

    #[test]
    fn test_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verifies(&hash, b"hunter2"));
    }

    #[test]
    fn test_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }
}
