use crate::model::catalog::{Catalog, Message};

const INDENT: &str = "    ";

/// Writes a catalog in canonical `.ts` form.
///
/// Canonical means: one-line prolog, 4-space indentation, `\n` line ends,
/// self-closing empty translations and no newline after `</TS>`.
pub fn rebuild(catalog: &Catalog) -> String {
    let mut out = String::with_capacity(catalog.message_count() * 128 + 128);

    out.push_str("<?xml version=\"1.0\" ?><!DOCTYPE TS><TS");
    push_attr(&mut out, "language", &catalog.language);
    if let Some(src) = &catalog.source_language {
        push_attr(&mut out, "sourcelanguage", src);
    }
    push_attr(&mut out, "version", &catalog.version);
    out.push_str(">\n");

    for ctx in &catalog.contexts {
        out.push_str("<context>\n");
        push_element(&mut out, 1, "name", &ctx.name);
        for m in &ctx.messages {
            push_message(&mut out, m);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>");
    out
}

fn push_message(out: &mut String, m: &Message) {
    out.push_str(INDENT);
    out.push_str("<message");
    if let Some(id) = &m.id {
        push_attr(out, "id", id);
    }
    if m.numerus {
        push_attr(out, "numerus", "yes");
    }
    out.push_str(">\n");

    for loc in &m.locations {
        out.push_str(&INDENT.repeat(2));
        out.push_str("<location");
        push_attr(out, "filename", &loc.filename);
        if let Some(line) = &loc.line {
            push_attr(out, "line", line);
        }
        out.push_str("/>\n");
    }

    if m.source_variants.is_empty() {
        push_element(out, 2, "source", &m.source);
    } else {
        out.push_str(&INDENT.repeat(2));
        out.push_str("<source");
        push_attr(out, "variants", "yes");
        out.push_str(">\n");
        push_variants(out, &m.source_variants);
        out.push_str(&INDENT.repeat(2));
        out.push_str("</source>\n");
    }
    if let Some(old) = &m.oldsource {
        push_element(out, 2, "oldsource", old);
    }
    if let Some(c) = &m.comment {
        push_element(out, 2, "comment", c);
    }
    if let Some(c) = &m.extra_comment {
        push_element(out, 2, "extracomment", c);
    }
    if let Some(c) = &m.translator_comment {
        push_element(out, 2, "translatorcomment", c);
    }

    out.push_str(&INDENT.repeat(2));
    out.push_str("<translation");
    if let Some(t) = m.status.as_attr() {
        push_attr(out, "type", t);
    }

    if m.numerus && !m.numerus_forms.is_empty() {
        out.push_str(">\n");
        for form in &m.numerus_forms {
            push_element(out, 3, "numerusform", form);
        }
        out.push_str(&INDENT.repeat(2));
        out.push_str("</translation>\n");
    } else if !m.numerus && !m.translation_variants.is_empty() {
        push_attr(out, "variants", "yes");
        out.push_str(">\n");
        push_variants(out, &m.translation_variants);
        out.push_str(&INDENT.repeat(2));
        out.push_str("</translation>\n");
    } else if m.numerus || m.translation.is_empty() {
        out.push_str("/>\n");
    } else {
        out.push('>');
        push_escaped(out, &m.translation);
        out.push_str("</translation>\n");
    }

    out.push_str(INDENT);
    out.push_str("</message>\n");
}

fn push_variants(out: &mut String, variants: &[String]) {
    for v in variants {
        push_element(out, 3, "lengthvariant", v);
    }
}

fn push_element(out: &mut String, depth: usize, tag: &str, text: &str) {
    out.push_str(&INDENT.repeat(depth));
    out.push('<');
    out.push_str(tag);
    out.push('>');
    push_escaped(out, text);
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

fn push_attr(out: &mut String, key: &str, value: &str) {
    out.push(' ');
    out.push_str(key);
    out.push_str("=\"");
    push_escaped(out, value);
    out.push('"');
}

fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{Context, Location, MessageStatus};
    use crate::model::config::ParseOptions;
    use crate::parsers::ts;

    #[test]
    fn writes_canonical_layout() {
        let mut catalog = Catalog::new("ko");
        catalog.version = "2.0".into();
        let mut ctx = Context::new("About");
        ctx.messages.push(Message::new("QField Version: %1"));
        ctx.messages.push(Message::translated("What's new", "새로운 기능 <b>%1</b>"));
        catalog.contexts.push(ctx);

        let expected = r#"<?xml version="1.0" ?><!DOCTYPE TS><TS language="ko" version="2.0">
<context>
    <name>About</name>
    <message>
        <source>QField Version: %1</source>
        <translation type="unfinished"/>
    </message>
    <message>
        <source>What&apos;s new</source>
        <translation>새로운 기능 &lt;b&gt;%1&lt;/b&gt;</translation>
    </message>
</context>
</TS>"#;
        assert_eq!(rebuild(&catalog), expected);
    }

    #[test]
    fn supplementary_fields_survive_a_round_trip() {
        let mut catalog = Catalog::new("ko");
        catalog.source_language = Some("en".into());
        let mut m = Message::new("%n layer(s)");
        m.id = Some("layers".into());
        m.numerus = true;
        m.numerus_forms = vec!["레이어 %n개".into()];
        m.status = MessageStatus::Finished;
        m.comment = Some("count".into());
        m.translator_comment = Some("checked".into());
        m.locations.push(Location {
            filename: "main.qml".into(),
            line: Some("3".into()),
        });
        let mut vanished = Message::translated("Old", "옛");
        vanished.status = MessageStatus::Vanished;
        let mut ctx = Context::new("Layers");
        ctx.messages.push(m);
        ctx.messages.push(vanished);
        catalog.contexts.push(ctx);

        let text = rebuild(&catalog);
        let parsed = ts::parse(&text, &ParseOptions::strict()).unwrap();
        assert_eq!(parsed.catalog, catalog);
        assert_eq!(rebuild(&parsed.catalog), text);
    }

    #[test]
    fn length_variants_survive_a_round_trip() {
        let mut m = Message::translated("Altitude above sea level", "고도");
        m.source_variants = vec!["Altitude above sea level".into(), "Altitude".into()];
        m.translation_variants = vec!["고도".into(), "고".into()];
        let mut ctx = Context::new("PositionInformationView");
        ctx.messages.push(m);
        let mut catalog = Catalog::new("ko");
        catalog.contexts.push(ctx);

        let text = rebuild(&catalog);
        assert!(text.contains(
            "        <translation variants=\"yes\">\n            <lengthvariant>고도</lengthvariant>\n            <lengthvariant>고</lengthvariant>\n        </translation>\n"
        ));
        let parsed = ts::parse(&text, &ParseOptions::strict()).unwrap();
        assert_eq!(parsed.catalog, catalog);
        assert_eq!(rebuild(&parsed.catalog), text);
    }

    #[test]
    fn empty_catalog() {
        let catalog = Catalog::new("ko");
        assert_eq!(
            rebuild(&catalog),
            "<?xml version=\"1.0\" ?><!DOCTYPE TS><TS language=\"ko\" version=\"2.1\">\n</TS>"
        );
    }
}
