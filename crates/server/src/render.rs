//! HTML rendering for the single-page interface.
//!
//! The page is rebuilt from scratch on every request: a title selector, a
//! "Predict Rating" button, and, after an evaluation, either the result or a
//! single error box. All catalog text is escaped.

use std::fmt::Write;

use crate::orchestrator::Evaluation;
use posters::PosterLookupResult;

/// What the page shows below the selector
#[derive(Debug, Clone)]
pub enum PageState {
    /// Nothing evaluated yet
    Idle,
    /// Result of the last evaluation, or its error description
    Evaluated(Result<Evaluation, String>),
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = "\
body { font-family: sans-serif; margin: 2rem auto; max-width: 1100px; }
form { margin-bottom: 1.5rem; }
.error { background: #fdecea; border: 1px solid #f5c2c0; padding: 1rem; }
.gallery { display: grid; gap: 1rem; }
.gallery figure { margin: 0; text-align: center; }
.gallery img { width: 100%; }
";

/// Render the whole page.
///
/// `selected` is preselected in the dropdown; it defaults to the first title.
pub fn render_page(titles: &[String], selected: Option<&str>, state: &PageState) -> String {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Movie Rating Predictor</title>\n");
    let _ = write!(html, "<style>\n{}</style>\n", STYLE);
    html.push_str("</head>\n<body>\n<h1>Movie Rating Predictor</h1>\n");

    render_form(&mut html, titles, selected);

    match state {
        PageState::Idle => {}
        PageState::Evaluated(Ok(evaluation)) => render_evaluation(&mut html, evaluation),
        PageState::Evaluated(Err(description)) => {
            let _ = writeln!(
                html,
                "<div class=\"error\">Prediction failed: {}</div>",
                escape_html(description)
            );
        }
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn render_form(html: &mut String, titles: &[String], selected: Option<&str>) {
    let selected = selected.or_else(|| titles.first().map(String::as_str));

    html.push_str("<form method=\"post\" action=\"/evaluate\">\n");
    html.push_str("<label for=\"title\">Select a movie</label>\n");
    html.push_str("<select id=\"title\" name=\"title\">\n");
    for title in titles {
        let escaped = escape_html(title);
        let marker = if Some(title.as_str()) == selected {
            " selected"
        } else {
            ""
        };
        let _ = writeln!(html, "<option value=\"{}\"{}>{}</option>", escaped, marker, escaped);
    }
    html.push_str("</select>\n<button type=\"submit\">Predict Rating</button>\n</form>\n");
}

fn render_evaluation(html: &mut String, evaluation: &Evaluation) {
    let title = escape_html(&evaluation.title);
    let _ = writeln!(
        html,
        "<h2>Predicted Rating for '{}': {}</h2>",
        title,
        evaluation.predicted_rating_label()
    );
    let _ = writeln!(
        html,
        "<p>Actual TMDB Rating: {}</p>",
        evaluation.reference_rating_label()
    );
    let _ = writeln!(
        html,
        "<img src=\"{}\" alt=\"{}\" width=\"300\">",
        escape_html(&evaluation.poster.image_url),
        title
    );

    if evaluation.similar.is_empty() {
        return;
    }
    // One grid column per neighbour
    let count = evaluation.similar.len();
    let _ = writeln!(html, "<h2>Top {} Similar Movies</h2>", count);
    let _ = writeln!(
        html,
        "<div class=\"gallery\" style=\"grid-template-columns: repeat({}, 1fr)\">",
        count
    );
    for movie in &evaluation.similar {
        render_poster_card(html, &movie.poster);
    }
    html.push_str("</div>\n");
}

fn render_poster_card(html: &mut String, poster: &PosterLookupResult) {
    let title = escape_html(&poster.display_title);
    let _ = writeln!(
        html,
        "<figure><img src=\"{}\" alt=\"{}\"><figcaption>{}</figcaption></figure>",
        escape_html(&poster.image_url),
        title,
        title
    );
}
