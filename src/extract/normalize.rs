use scraper::{ElementRef, Html};

/// Elements whose text never belongs to the posting itself.
const NON_CONTENT: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "footer", "header", "svg",
];

/// Turns raw markup into plain text.
///
/// Non-content elements are dropped, whitespace runs collapse to a single
/// space and the result is trimmed. Input without any `<` is treated as
/// already-plain text, which makes the function idempotent.
pub fn normalize(raw: &str) -> String {
    if !raw.contains('<') {
        return collapse_whitespace(raw);
    }

    let document = Html::parse_document(raw);
    let mut out = String::with_capacity(raw.len() / 2);
    collect_text(document.root_element(), &mut out);

    // A stray '<' in the text would make a second pass parse it as markup.
    collapse_whitespace(&out.replace('<', " "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element, collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child) {
            if !NON_CONTENT.contains(&child_element.value().name()) {
                collect_text(child_element, out);
            }
        } else if let Some(text) = child.value().as_text() {
            out.push_str(text);
            out.push(' ');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_non_content_elements() {
        let html = r#"<html><head><style>.x { color: red }</style><script>var a = 1;</script></head>
            <body><header>Menu Connexion</header><nav>Accueil</nav>
            <main><h1>Développeur   Rust</h1><p>CDI à Paris</p></main>
            <footer>Mentions légales</footer></body></html>"#;
        assert_eq!(normalize(html), "Développeur Rust CDI à Paris");
    }

    #[test]
    fn decodes_entities_and_separates_blocks() {
        let html = "<div><p>R&amp;D</p><p>Python&nbsp;et Docker</p></div>";
        assert_eq!(normalize(html), "R&D Python et Docker");
    }

    #[test]
    fn normalization_is_idempotent() {
        let inputs = [
            "<p>  Salaire &lt; 50k€ </p><p>Télétravail\t2 jours</p>",
            "<div>a<br>b</div>",
            "plain   text\nwith\n\nbreaks",
            "",
            "<<<>>>",
            "<unclosed attr='",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn never_fails_on_garbage() {
        assert_eq!(normalize("<"), "");
        assert_eq!(normalize("   "), "");
    }
}
