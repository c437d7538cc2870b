//! Source reference resolution.
//!
//! Shortcodes accept two kinds of image references:
//!
//! - **Rooted**: starts with `.` (e.g. `./src/img/cat.jpg`). Already relative
//!   to the project root and passed through untouched.
//! - **Bare**: anything else (e.g. `cat.jpg`). Relative to the directory of
//!   the page that invoked the shortcode, so it is prefixed with that
//!   directory.
//!
//! No validation happens here. A path that doesn't exist surfaces later as a
//! producer error.

/// Resolve a source reference against the invoking page's directory.
///
/// ```
/// use simple_picture::paths::resolve;
///
/// assert_eq!(resolve("./src/img/cat.jpg", "./src/posts"), "./src/img/cat.jpg");
/// assert_eq!(resolve("cat.jpg", "./src/posts"), "./src/posts/cat.jpg");
/// ```
pub fn resolve(source_ref: &str, page_dir: &str) -> String {
    if source_ref.starts_with('.') {
        source_ref.to_string()
    } else {
        format!("{page_dir}/{source_ref}")
    }
}

/// Directory part of a page's input path: everything before the last `/`.
///
/// An input path without any `/` has an empty directory.
pub fn page_dir(input_path: &str) -> &str {
    input_path
        .rfind('/')
        .map(|pos| &input_path[..pos])
        .unwrap_or("")
}
