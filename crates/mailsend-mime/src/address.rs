//! Address helpers.

/// Extracts the domain part of an email address.
///
/// Accepts a bare `local@domain` or a mailbox such as
/// `Name <local@domain>` (the display name may itself be an encoded word).
/// Everything after the first `@` of the address is returned, or an empty
/// string when there is no `@`.
///
/// ```
/// use mailsend_mime::derive_host_from_address;
///
/// assert_eq!(derive_host_from_address("user@example.com"), "example.com");
/// assert_eq!(derive_host_from_address("Jane <jane@mail.example.org>"), "mail.example.org");
/// assert_eq!(derive_host_from_address("not-an-address"), "");
/// ```
#[must_use]
pub fn derive_host_from_address(address: &str) -> &str {
    let address = address.trim();
    let addr_spec = match (address.rfind('<'), address.rfind('>')) {
        (Some(start), Some(end)) if start < end => &address[start + 1..end],
        _ => address,
    };

    addr_spec
        .split_once('@')
        .map_or("", |(_, domain)| domain.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_address() {
        assert_eq!(derive_host_from_address("user@example.com"), "example.com");
        assert_eq!(derive_host_from_address("  user@example.com  "), "example.com");
    }

    #[test]
    fn test_mailbox_with_encoded_name() {
        assert_eq!(derive_host_from_address("=?UTF-8?B?QQ==?= <a@x.com>"), "x.com");
        assert_eq!(derive_host_from_address("<noreply@host.test>"), "host.test");
    }

    #[test]
    fn test_takes_everything_after_first_at() {
        assert_eq!(derive_host_from_address("a@b@c"), "b@c");
    }

    #[test]
    fn test_no_domain() {
        assert_eq!(derive_host_from_address("not-an-address"), "");
        assert_eq!(derive_host_from_address(""), "");
        assert_eq!(derive_host_from_address("user@"), "");
    }
}
