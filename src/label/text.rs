use crate::event::{Event, EventKind};

/// Greedy word wrap.
///
/// Words are whitespace-separated; each is appended to the current line while
/// the measured candidate still fits in `max_width`. A word that does not fit
/// starts a new line. A single word wider than `max_width` is never split and
/// sits alone on its own (overlong) line. Lines are never empty and keep the
/// original word order.
pub fn wrap_text<E>(
    text: &str,
    max_width: f64,
    mut measure: impl FnMut(&str) -> Result<f64, E>,
) -> Result<Vec<String>, E> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if measure(&candidate)? <= max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    Ok(lines)
}

/// Display lines for an event: the wrapped title followed by the wrapped
/// `"Author, Year"` caption for works, or the wrapped description followed by
/// a bare year line for everything else.
pub fn event_lines<E>(
    event: &Event,
    max_width: f64,
    mut measure: impl FnMut(&str) -> Result<f64, E>,
) -> Result<Vec<String>, E> {
    match &event.kind {
        EventKind::Work { title, author } => {
            let mut lines = wrap_text(title, max_width, &mut measure)?;
            let caption = format!("{author}, {}", event.year);
            lines.extend(wrap_text(&caption, max_width, &mut measure)?);
            Ok(lines)
        }
        EventKind::Occurrence { description } => {
            let mut lines = wrap_text(description, max_width, &mut measure)?;
            lines.push(event.year.to_string());
            Ok(lines)
        }
    }
}
