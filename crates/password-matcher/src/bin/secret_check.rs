//! Check a password against a stored hashed-password secret.
//!
//! Operator helper for inspecting records pulled from a credentials store; not used by
//! production code. The password is read from the first line of stdin so it does not end up in
//! shell history.

use std::io::BufRead as _;
use std::process::ExitCode;

use zeroize::Zeroizing;

fn main() -> ExitCode {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if args.len() != 1 {
        eprintln!("Usage: secret-check <secret.json>   (password is read from stdin)");
        return ExitCode::from(2);
    }

    let raw = match std::fs::read_to_string(&args[0]) {
        Ok(raw) => raw,
        Err(err) => {
            eprintln!("failed to read {}: {err}", args[0]);
            return ExitCode::from(2);
        }
    };
    let secret: serde_json::Value = match serde_json::from_str(&raw) {
        Ok(secret) => secret,
        Err(err) => {
            eprintln!("{} is not valid JSON: {err}", args[0]);
            return ExitCode::from(2);
        }
    };

    let mut password = Zeroizing::new(String::new());
    if let Err(err) = std::io::stdin().lock().read_line(&mut password) {
        eprintln!("failed to read password from stdin: {err}");
        return ExitCode::from(2);
    }
    let password = password.trim_end_matches(['\r', '\n']);

    if password_matcher::matches(password, &secret) {
        println!("match");
        ExitCode::SUCCESS
    } else {
        println!("no match");
        ExitCode::from(1)
    }
}
