use scraper::{Html, Selector};
use serde_json::Value;

/// Every JSON-LD object on the page, with `@graph` members and top-level arrays flattened.
fn documents(document: &Html) -> Vec<Value> {
    let mut out = Vec::new();

    if let Ok(script_selector) = Selector::parse("script[type='application/ld+json']") {
        for script in document.select(&script_selector) {
            if let Ok(json) = serde_json::from_str::<Value>(script.text().collect::<String>().trim()) {
                flatten(json, &mut out);
            }
        }
    }

    out
}

fn flatten(value: Value, out: &mut Vec<Value>) {
    match value {
        Value::Array(items) => items.into_iter().for_each(|item| flatten(item, out)),
        Value::Object(mut map) => {
            if let Some(graph) = map.remove("@graph") {
                flatten(graph, out);
            }
            out.push(Value::Object(map));
        }
        _ => {}
    }
}

/// Extracts author names from JSON-LD metadata in the HTML document.
pub fn extract_authors(document: &Html) -> Vec<String> {
    let mut authors = Vec::new();

    for json in documents(document) {
        let Some(author) = json.get("author") else {
            continue;
        };
        match author {
            Value::Array(arr) => {
                for author_obj in arr {
                    match author_obj {
                        Value::String(s) => authors.push(s.trim().to_string()),
                        other => {
                            if let Some(name) = other.get("name").and_then(|n| n.as_str()) {
                                authors.push(name.trim().to_string());
                            }
                        }
                    }
                }
            }
            Value::Object(obj) => {
                if let Some(name) = obj.get("name").and_then(|n| n.as_str()) {
                    authors.push(name.trim().to_string());
                }
            }
            Value::String(s) => authors.push(s.trim().to_string()),
            _ => {}
        }
    }

    authors.retain(|a| !a.is_empty());
    authors
}

/// First `datePublished` found in JSON-LD metadata.
pub fn extract_date_published(document: &Html) -> Option<String> {
    documents(document)
        .iter()
        .filter_map(|json| json.get("datePublished").and_then(|d| d.as_str()))
        .map(|d| d.trim().to_string())
        .find(|d| !d.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_authors_variants() {
        let html = r#"
            <script type="application/ld+json">{"@type": "BlogPosting", "author": [{"name": " Jeff Barr "}, "Danilo Poccia"]}</script>
            <script type="application/ld+json">{"@type": "Article", "author": {"name": "Channy Yun"}}</script>
            <script type="application/ld+json">not json</script>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_authors(&document),
            vec!["Jeff Barr", "Danilo Poccia", "Channy Yun"]
        );
    }

    #[test]
    fn test_graph_is_searched() {
        let html = r#"
            <script type="application/ld+json">
                {"@context": "https://schema.org", "@graph": [
                    {"@type": "WebPage"},
                    {"@type": "BlogPosting", "author": "Sébastien Stormacq", "datePublished": "2024-05-07T09:00:00-07:00"}
                ]}
            </script>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(extract_authors(&document), vec!["Sébastien Stormacq"]);
        assert_eq!(
            extract_date_published(&document).as_deref(),
            Some("2024-05-07T09:00:00-07:00")
        );
    }

    #[test]
    fn test_no_metadata() {
        let document = Html::parse_document("<p>plain</p>");
        assert!(extract_authors(&document).is_empty());
        assert_eq!(extract_date_published(&document), None);
    }
}
