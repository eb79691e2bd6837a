use crate::normalize::{NormalizationPolicy, normalize};
use crate::pattern::PatternToken;

/// Separator between slug path segments.
pub const PATH_SEPARATOR: char = '/';

/// Joins resolved token texts into the final slug.
///
/// Field tokens are normalized one by one, with `/` preserved so a field
/// value can contribute nested segments; structural tokens are copied
/// verbatim. Empty segments are dropped, so the result never contains `//`
/// and never ends with `/`.
pub fn assemble<'a, S>(
    parts: impl IntoIterator<Item = (&'a PatternToken, S)>,
    policy: &NormalizationPolicy,
) -> String
where
    S: AsRef<str>,
{
    let field_policy = policy.path_policy();
    let mut segments: Vec<String> = Vec::new();

    for (token, text) in parts {
        let text = text.as_ref();
        let segment = if token.is_field() {
            normalize(text, &field_policy)
        } else {
            text.to_string()
        };
        segments.extend(
            segment
                .split(PATH_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }

    segments.join(&PATH_SEPARATOR.to_string())
}
