use crate::router::RouterBuilder;
use std::io;

/// Writes one line per registered route, in [`walk`](RouterBuilder::walk) order.
///
/// Methods are padded to a common width:
///
/// ```text
/// GET     /users
/// DELETE  /users/{id}
/// ```
///
/// # Errors
///
/// Returns the first error raised by `writer`.
pub fn print_routes<W: io::Write>(mut writer: W, builder: &RouterBuilder) -> io::Result<()> {
    let mut routes = Vec::new();
    builder.walk(|method, pattern| routes.push((method.as_str().to_ascii_uppercase(), pattern.to_owned())));

    let width = routes.iter().map(|(method, _)| method.len()).max().unwrap_or_default();
    for (method, pattern) in routes {
        writeln!(writer, "{method:<width$}  {pattern}")?;
    }
    writer.flush()
}
