//! URL path joining.

/// Join url path pieces with exactly one `/` between them.
///
/// The first piece keeps its leading part (scheme, host or leading `/`);
/// empty pieces are skipped.
///
/// # Examples
///
/// - `join_url(&["/pulp/repos/", "zoo", "manifest.json"])` -> `"/pulp/repos/zoo/manifest.json"`
/// - `join_url(&["https://cdn.example.com/", "/a/"])` -> `"https://cdn.example.com/a"`
pub fn join_url(pieces: &[&str]) -> String {
    let rooted = pieces.first().is_some_and(|first| first.starts_with('/'));
    let mut joined = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        let piece = if i == 0 {
            piece.trim_end_matches('/')
        } else {
            piece.trim_matches('/')
        };
        if piece.is_empty() {
            continue;
        }
        if !joined.is_empty() || (rooted && i > 0) {
            joined.push('/');
        }
        joined.push_str(piece);
    }
    joined
}
