use std::sync::Arc;
use std::thread;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use password_matcher::{default_verifier, Verifier};
use serde_json::json;
use sha2::{Digest as _, Sha256};

#[test]
fn one_verifier_serves_many_threads() {
    let verifier = Arc::new(Verifier::default());
    let handles = (0..8)
        .map(|i| {
            let verifier = Arc::clone(&verifier);
            thread::spawn(move || {
                let password = format!("password-{i}");
                let salt = format!("salt-{i}");
                let hash = BASE64.encode(Sha256::digest(format!("{salt}{password}")));
                let secret = json!({
                    "algorithm": "salted-iterated",
                    "salt": salt,
                    "iterations": 1,
                    "hash": hash,
                });
                (0..50).all(|_| {
                    verifier.matches(&password, &secret) && !verifier.matches("nope", &secret)
                })
            })
        })
        .collect::<Vec<_>>();

    for handle in handles {
        assert!(handle.join().expect("worker thread"));
    }
}

#[test]
fn default_verifier_is_initialised_once() {
    let first = default_verifier() as *const Verifier;
    let second = thread::spawn(|| default_verifier() as *const Verifier as usize)
        .join()
        .expect("thread");
    assert_eq!(first as usize, second);
}
