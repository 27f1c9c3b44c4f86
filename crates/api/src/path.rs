//! Path templating for API routes.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Characters escaped inside a single path segment. Unreserved characters
/// stay readable so composite names like `job-jobspace` pass through as-is.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Replace each `{name}` placeholder in `template` with its percent-encoded value.
///
/// Placeholders without a matching variable are left untouched.
pub fn build_path(template: &str, variables: &[(&str, &str)]) -> String {
    let mut path = template.to_string();
    for (key, value) in variables {
        let encoded = utf8_percent_encode(value, PATH_SEGMENT).to_string();
        path = path.replace(&format!("{{{key}}}"), &encoded);
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_and_encodes_segments() {
        assert_eq!(
            build_path("/v1/diagnostic/{id}/config/{var}", &[("id", "ui-tests-taas"), ("var", "API_KEY")]),
            "/v1/diagnostic/ui-tests-taas/config/API_KEY"
        );
        assert_eq!(build_path("/apps/{app}", &[("app", "a/b c")]), "/apps/a%2Fb%20c");
    }

    #[test]
    fn leaves_unknown_placeholders() {
        assert_eq!(build_path("/v1/{missing}", &[]), "/v1/{missing}");
    }
}
