/// Application configuration loaded from environment variables.
///
/// Server address, secrets and the database URL stay with Rocket's own
/// figment (`Rocket.toml` / `ROCKET_*`); this covers what the handlers need.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub csrf_cookie_name: String,
    pub cookie_secure: bool,
    pub cookie_domain: Option<String>,
    pub success_redirect: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let csrf_cookie_name =
            std::env::var("REGISTRATION_CSRF_COOKIE_NAME").unwrap_or_else(|_| "_csrf".into());
        let cookie_secure = std::env::var("REGISTRATION_COOKIE_SECURE")
            .map(|value| parse_flag(&value))
            .unwrap_or(true);
        let cookie_domain = std::env::var("REGISTRATION_COOKIE_DOMAIN")
            .ok()
            .filter(|value| !value.is_empty());
        let success_redirect =
            std::env::var("REGISTRATION_SUCCESS_REDIRECT").unwrap_or_else(|_| "/".into());

        Self {
            csrf_cookie_name,
            cookie_secure,
            cookie_domain,
            success_redirect,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            csrf_cookie_name: "_csrf".into(),
            cookie_secure: true,
            cookie_domain: None,
            success_redirect: "/".into(),
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value, "1" | "true" | "TRUE" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_parsing_accepts_common_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "on"] {
            assert!(parse_flag(value), "{value} should enable the flag");
        }
        for value in ["0", "false", "off", ""] {
            assert!(!parse_flag(value), "{value} should disable the flag");
        }
    }
}
