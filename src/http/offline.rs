use super::RequestOptions;
use crate::types::{OFFLINE_TOKEN, paths};
use serde_json::{Value, json};

/// Canned payload for paths that have an offline substitute, `None` for
/// everything else.
///
/// Only login and registration are allow-listed, so the UI can still reach
/// its demo mode when no endpoint answers.
pub fn offline_substitute(path: &str, options: &RequestOptions) -> Option<Value> {
    let route = path.split('?').next().unwrap_or(path).trim_end_matches('/');
    let body = options.body.as_ref();
    let field = |name: &str| {
        body.and_then(|b| b.get(name))
            .and_then(Value::as_str)
            .map(str::to_string)
    };

    match route {
        paths::LOGIN => {
            let username = field("username")
                .or_else(|| field("email"))
                .unwrap_or_else(|| "demo".to_string());
            Some(json!({
                "access_token": OFFLINE_TOKEN,
                "token_type": "bearer",
                "user": {
                    "id": "offline-user",
                    "username": username,
                },
                "offline": true,
            }))
        }
        paths::REGISTER => Some(json!({
            "id": "offline-user",
            "username": field("username").unwrap_or_else(|| "demo".to_string()),
            "email": field("email"),
            "access_token": OFFLINE_TOKEN,
            "offline": true,
        })),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_substitute_echoes_username() {
        let options = RequestOptions::post(json!({"username": "ada", "password": "x"}));
        let payload = offline_substitute(paths::LOGIN, &options).unwrap();
        assert_eq!(payload["access_token"], OFFLINE_TOKEN);
        assert_eq!(payload["user"]["username"], "ada");
        assert_eq!(payload["offline"], true);
    }

    #[test]
    fn test_login_substitute_falls_back_to_email_then_demo() {
        let options = RequestOptions::post(json!({"email": "ada@example.com"}));
        let payload = offline_substitute(paths::LOGIN, &options).unwrap();
        assert_eq!(payload["user"]["username"], "ada@example.com");

        let payload = offline_substitute(paths::LOGIN, &RequestOptions::default()).unwrap();
        assert_eq!(payload["user"]["username"], "demo");
    }

    #[test]
    fn test_register_substitute() {
        let options = RequestOptions::post(json!({"username": "ada", "email": "a@b.c"}));
        let payload = offline_substitute("/api/auth/register/", &options).unwrap();
        assert_eq!(payload["username"], "ada");
        assert_eq!(payload["email"], "a@b.c");
    }

    #[test]
    fn test_other_paths_have_no_substitute() {
        assert!(offline_substitute(paths::AGENTS, &RequestOptions::get()).is_none());
        assert!(offline_substitute(paths::HEALTH, &RequestOptions::get()).is_none());
    }
}
