use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{Map, Value, json};

use crate::services::DebugSink;
use crate::services::jwks::PublicKeyMaterial;

pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn public_key(name: &str) -> RsaPublicKey {
    let pem = fs::read_to_string(fixture(name)).expect("fixture");
    let private = RsaPrivateKey::from_pkcs1_pem(&pem)
        .or_else(|_| RsaPrivateKey::from_pkcs8_pem(&pem))
        .expect("RSA private key fixture");
    private.to_public_key()
}

pub fn public_key_for(name: &str) -> PublicKeyMaterial {
    let pem = public_key(name)
        .to_public_key_pem(LineEnding::LF)
        .expect("public key pem");
    PublicKeyMaterial::from_pem(pem)
}

pub fn rsa_jwk(name: &str, kid: &str) -> Value {
    let key = public_key(name);
    json!({
        "kty": "RSA",
        "use": "sig",
        "alg": "RS256",
        "kid": kid,
        "n": URL_SAFE_NO_PAD.encode(key.n().to_bytes_be()),
        "e": URL_SAFE_NO_PAD.encode(key.e().to_bytes_be()),
    })
}

pub fn claim_map() -> Map<String, Value> {
    let value = json!({
        "iss": "https://issuer.test",
        "aud": "https://aud.test",
        "sub": "user-1",
        "client_id": "client-1"
    });
    match value {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

#[derive(Default)]
pub struct RecordingSink {
    entries: RefCell<Vec<(String, Value)>>,
}

impl RecordingSink {
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.entries.borrow().clone()
    }
}

impl DebugSink for RecordingSink {
    fn emit(&self, label: &str, value: &Value) {
        self.entries
            .borrow_mut()
            .push((label.to_string(), value.clone()));
    }
}
