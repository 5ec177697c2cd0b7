//! Canonical form for email addresses before they are checked and stored.

const GMAIL_DOMAINS: &[&str] = &["gmail.com", "googlemail.com"];
const ICLOUD_DOMAINS: &[&str] = &["icloud.com", "me.com", "mac.com"];
const OUTLOOK_DOMAINS: &[&str] = &[
    "hotmail.com",
    "hotmail.co.uk",
    "hotmail.de",
    "hotmail.fr",
    "hotmail.it",
    "live.com",
    "live.co.uk",
    "live.fr",
    "msn.com",
    "outlook.com",
    "outlook.de",
    "passport.com",
];
const YAHOO_DOMAINS: &[&str] = &[
    "rocketmail.com",
    "yahoo.ca",
    "yahoo.co.uk",
    "yahoo.com",
    "yahoo.de",
    "yahoo.fr",
    "yahoo.in",
    "yahoo.it",
    "ymail.com",
];
const YANDEX_DOMAINS: &[&str] = &[
    "yandex.ru",
    "yandex.ua",
    "yandex.kz",
    "yandex.com",
    "yandex.by",
    "ya.ru",
];

/// Lowercase an address and strip provider-specific aliasing so that
/// `John.Doe+news@GoogleMail.com` and `johndoe@gmail.com` compare equal.
///
/// Returns `None` when the value is not shaped like `local@domain`, or when
/// stripping aliases would leave an empty local part.
pub fn normalize_email(raw: &str) -> Option<String> {
    let (local, domain) = raw.rsplit_once('@')?;
    if local.is_empty() || domain.is_empty() {
        return None;
    }

    let domain = domain.to_lowercase();
    let mut local = local.to_lowercase();

    let domain = if GMAIL_DOMAINS.contains(&domain.as_str()) {
        local = strip_subaddress(&local, '+').replace('.', "");
        "gmail.com".to_string()
    } else if ICLOUD_DOMAINS.contains(&domain.as_str()) || OUTLOOK_DOMAINS.contains(&domain.as_str())
    {
        local = strip_subaddress(&local, '+').to_string();
        domain
    } else if YAHOO_DOMAINS.contains(&domain.as_str()) {
        local = match local.rsplit_once('-') {
            Some((head, _)) => head.to_string(),
            None => local,
        };
        domain
    } else if YANDEX_DOMAINS.contains(&domain.as_str()) {
        "yandex.ru".to_string()
    } else {
        domain
    };

    if local.is_empty() {
        return None;
    }

    Some(format!("{local}@{domain}"))
}

fn strip_subaddress(local: &str, separator: char) -> &str {
    local.split(separator).next().unwrap_or(local)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_generic_addresses() {
        assert_eq!(
            normalize_email("Jane.Doe+Work@Example.COM").as_deref(),
            Some("jane.doe+work@example.com")
        );
    }

    #[test]
    fn collapses_gmail_aliases() {
        assert_eq!(
            normalize_email("John.Doe+news@GoogleMail.com").as_deref(),
            Some("johndoe@gmail.com")
        );
    }

    #[test]
    fn strips_outlook_and_icloud_subaddresses() {
        assert_eq!(
            normalize_email("someone+promo@hotmail.com").as_deref(),
            Some("someone@hotmail.com")
        );
        assert_eq!(
            normalize_email("someone+promo@icloud.com").as_deref(),
            Some("someone@icloud.com")
        );
    }

    #[test]
    fn drops_last_yahoo_hyphen_segment() {
        assert_eq!(
            normalize_email("first-second-tag@yahoo.com").as_deref(),
            Some("first-second@yahoo.com")
        );
    }

    #[test]
    fn maps_yandex_domains() {
        assert_eq!(
            normalize_email("user@ya.ru").as_deref(),
            Some("user@yandex.ru")
        );
    }

    #[test]
    fn rejects_values_without_local_and_domain() {
        assert_eq!(normalize_email("not-an-email"), None);
        assert_eq!(normalize_email("@example.com"), None);
        assert_eq!(normalize_email("user@"), None);
        assert_eq!(normalize_email("+tag@gmail.com"), None);
    }
}
