use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

use crate::error::CatalogError;
use crate::model::catalog::{Catalog, Context, Location, Message, MessageStatus};
use crate::model::config::{ParseOptions, StatusPolicy};

/// Parser output: the catalog plus whatever was recovered from.
#[derive(Debug, Serialize, Clone)]
pub struct Parsed {
    pub catalog: Catalog,
    pub warnings: Vec<String>,
}

pub fn parse(text: &str, opts: &ParseOptions) -> Result<Parsed, CatalogError> {
    let mut parser = TsParser {
        reader: Reader::from_str(text),
        opts,
        warnings: Vec::new(),
    };
    parser.reader.config_mut().trim_text(false);

    let catalog = parser.document()?;

    Ok(Parsed {
        catalog,
        warnings: parser.warnings,
    })
}

struct TsParser<'i, 'o> {
    reader: Reader<&'i [u8]>,
    opts: &'o ParseOptions,
    warnings: Vec<String>,
}

impl<'i> TsParser<'i, '_> {
    fn next(&mut self) -> Result<Event<'i>, CatalogError> {
        self.reader
            .read_event()
            .map_err(|e| CatalogError::parse(self.position(), e.to_string()))
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn malformed(&self, message: impl Into<String>) -> CatalogError {
        CatalogError::parse(self.position(), message)
    }

    /// Recoverable defect: a warning in recovery mode, an error otherwise.
    fn defect(&mut self, err: CatalogError) -> Result<(), CatalogError> {
        if !self.opts.recover_messages {
            return Err(err);
        }
        tracing::warn!(position = self.position(), "{err}");
        self.warnings.push(err.to_string());
        Ok(())
    }

    fn warn(&mut self, message: String) {
        tracing::warn!(position = self.position(), "{message}");
        self.warnings.push(message);
    }

    fn skip(&mut self, start: &BytesStart) -> Result<(), CatalogError> {
        tracing::debug!(element = %tag_name(start), "skipping unsupported element");
        self.reader
            .read_to_end(start.name())
            .map_err(|e| CatalogError::parse(self.position(), e.to_string()))?;
        Ok(())
    }

    fn attr(&self, start: &BytesStart, key: &[u8]) -> Result<Option<String>, CatalogError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| self.malformed(e.to_string()))?;
            if attr.key.as_ref() == key {
                let value = attr
                    .unescape_value()
                    .map_err(|e| self.malformed(e.to_string()))?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }

    fn has_variants(&self, start: &BytesStart) -> Result<bool, CatalogError> {
        Ok(self.attr(start, b"variants")?.as_deref() == Some("yes"))
    }

    fn document(&mut self) -> Result<Catalog, CatalogError> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"TS" => {
                    let mut catalog = self.root(&e)?;
                    self.contexts(&mut catalog)?;
                    self.trailer()?;
                    return Ok(catalog);
                }
                Event::Empty(e) if e.name().as_ref() == b"TS" => {
                    let catalog = self.root(&e)?;
                    self.trailer()?;
                    return Ok(catalog);
                }
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.malformed(format!(
                        "expected <TS> root element, found <{}>",
                        tag_name(&e)
                    )));
                }
                Event::Text(t) if !is_blank(&t) => {
                    return Err(self.malformed("text before root element"));
                }
                Event::Eof => return Err(self.malformed("missing <TS> root element")),
                _ => {}
            }
        }
    }

    fn root(&mut self, start: &BytesStart) -> Result<Catalog, CatalogError> {
        let language = match self.attr(start, b"language")? {
            Some(l) => l,
            None => {
                self.defect(self.malformed("<TS> has no language attribute"))?;
                String::new()
            }
        };

        let mut catalog = Catalog::new(language);
        catalog.source_language = self.attr(start, b"sourcelanguage")?;
        if let Some(version) = self.attr(start, b"version")? {
            catalog.version = version;
        }
        Ok(catalog)
    }

    fn trailer(&mut self) -> Result<(), CatalogError> {
        loop {
            match self.next()? {
                Event::Eof => return Ok(()),
                Event::Start(_) | Event::Empty(_) => {
                    return Err(self.malformed("content after root element"));
                }
                Event::Text(t) if !is_blank(&t) => {
                    return Err(self.malformed("content after root element"));
                }
                _ => {}
            }
        }
    }

    fn contexts(&mut self, catalog: &mut Catalog) -> Result<(), CatalogError> {
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"context" => {
                    if let Some(context) = self.context()? {
                        self.push_context(catalog, context)?;
                    }
                }
                Event::Empty(e) if e.name().as_ref() == b"context" => {
                    self.defect(self.malformed("<context> without <name>"))?;
                }
                Event::Start(e) => self.skip(&e)?,
                Event::End(_) => return Ok(()),
                Event::Eof => return Err(self.malformed("unexpected end of document in <TS>")),
                _ => {}
            }
        }
    }

    fn push_context(&mut self, catalog: &mut Catalog, context: Context) -> Result<(), CatalogError> {
        if catalog.context(&context.name).is_some() {
            self.defect(CatalogError::DuplicateContext(context.name.clone()))?;
            if let Some(existing) = catalog.context_mut(&context.name) {
                existing.messages.extend(context.messages);
            }
            return Ok(());
        }
        catalog.contexts.push(context);
        Ok(())
    }

    fn context(&mut self) -> Result<Option<Context>, CatalogError> {
        let mut name: Option<String> = None;
        let mut messages = Vec::new();

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"name" => name = Some(self.text("name")?),
                    b"message" => {
                        let ctx = name.clone().unwrap_or_default();
                        if let Some(m) = self.message(&ctx, &e)? {
                            messages.push(m);
                        }
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"name" => name = Some(String::new()),
                    b"message" => {
                        let ctx = name.clone().unwrap_or_default();
                        self.defect(CatalogError::InvalidMessage {
                            context: ctx,
                            message: "message has no <source>".into(),
                        })?;
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.malformed("unexpected end of document in <context>"));
                }
                _ => {}
            }
        }

        match name {
            Some(name) => Ok(Some(Context { name, messages })),
            None => {
                self.defect(self.malformed("<context> without <name>"))?;
                Ok(None)
            }
        }
    }

    fn message(&mut self, ctx: &str, start: &BytesStart) -> Result<Option<Message>, CatalogError> {
        let mut message = Message {
            id: self.attr(start, b"id")?,
            numerus: self.attr(start, b"numerus")?.as_deref() == Some("yes"),
            ..Default::default()
        };
        let mut source: Option<String> = None;
        let mut duplicate_source = false;
        let mut has_translation = false;

        loop {
            match self.next()? {
                Event::Start(e) => match e.name().as_ref() {
                    b"source" => {
                        let text = if self.has_variants(&e)? {
                            message.source_variants = self.length_variants("source")?;
                            message.source_variants.first().cloned().unwrap_or_default()
                        } else {
                            self.text("source")?
                        };
                        duplicate_source |= source.replace(text).is_some();
                    }
                    b"oldsource" => message.oldsource = Some(self.text("oldsource")?),
                    b"comment" => message.comment = Some(self.text("comment")?),
                    b"extracomment" => message.extra_comment = Some(self.text("extracomment")?),
                    b"translatorcomment" => {
                        message.translator_comment = Some(self.text("translatorcomment")?)
                    }
                    b"location" => {
                        message.locations.push(self.location(&e)?);
                        self.skip(&e)?;
                    }
                    b"translation" => {
                        has_translation = true;
                        message.status = self.status(ctx, &e)?;
                        if message.numerus {
                            message.numerus_forms = self.numerus_forms()?;
                        } else if self.has_variants(&e)? {
                            let variants = self.length_variants("translation")?;
                            message.translation = variants.first().cloned().unwrap_or_default();
                            message.translation_variants = variants;
                        } else {
                            message.translation = self.text("translation")?;
                        }
                    }
                    _ => self.skip(&e)?,
                },
                Event::Empty(e) => match e.name().as_ref() {
                    b"source" => duplicate_source |= source.replace(String::new()).is_some(),
                    b"oldsource" => message.oldsource = Some(String::new()),
                    b"comment" => message.comment = Some(String::new()),
                    b"extracomment" => message.extra_comment = Some(String::new()),
                    b"translatorcomment" => message.translator_comment = Some(String::new()),
                    b"location" => message.locations.push(self.location(&e)?),
                    b"translation" => {
                        has_translation = true;
                        message.status = self.status(ctx, &e)?;
                    }
                    _ => {}
                },
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.malformed("unexpected end of document in <message>"));
                }
                _ => {}
            }
        }

        if !has_translation {
            message.status = MessageStatus::Unfinished;
        }

        let reason = match (source, duplicate_source) {
            (Some(_), true) => "message has more than one <source>",
            (None, _) => "message has no <source>",
            (Some(text), false) => {
                message.source = text;
                return Ok(Some(message));
            }
        };

        self.defect(CatalogError::InvalidMessage {
            context: ctx.to_string(),
            message: reason.into(),
        })?;
        Ok(None)
    }

    fn location(&self, start: &BytesStart) -> Result<Location, CatalogError> {
        Ok(Location {
            filename: self.attr(start, b"filename")?.unwrap_or_default(),
            line: self.attr(start, b"line")?,
        })
    }

    fn status(&mut self, ctx: &str, start: &BytesStart) -> Result<MessageStatus, CatalogError> {
        let Some(value) = self.attr(start, b"type")? else {
            return Ok(MessageStatus::Finished);
        };

        if let Some(status) = MessageStatus::from_attr(&value) {
            return Ok(status);
        }

        let err = CatalogError::UnknownStatus {
            context: ctx.to_string(),
            status: value,
        };
        match self.opts.status_policy {
            StatusPolicy::Strict => Err(err),
            StatusPolicy::Lenient => {
                tracing::warn!("{err}, treating as unfinished");
                self.warnings.push(err.to_string());
                Ok(MessageStatus::Unfinished)
            }
        }
    }

    /// Plural forms of a numerus translation. Bare text without
    /// `<numerusform>` children is kept as one form.
    fn numerus_forms(&mut self) -> Result<Vec<String>, CatalogError> {
        let mut forms = Vec::new();
        let mut loose = String::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"numerusform" => {
                    let form = if self.has_variants(&e)? {
                        let variants = self.length_variants("numerusform")?;
                        if variants.len() > 1 {
                            self.warn(format!(
                                "numerus form keeps only the first of {} length variants",
                                variants.len()
                            ));
                        }
                        variants.into_iter().next().unwrap_or_default()
                    } else {
                        self.text("numerusform")?
                    };
                    forms.push(form);
                }
                Event::Empty(e) if e.name().as_ref() == b"numerusform" => forms.push(String::new()),
                Event::Start(e) => self.skip(&e)?,
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| self.malformed(e.to_string()))?;
                    loose.push_str(&text);
                }
                Event::CData(c) => loose.push_str(&String::from_utf8_lossy(&c)),
                Event::End(_) => break,
                Event::Eof => {
                    return Err(self.malformed("unexpected end of document in <translation>"));
                }
                _ => {}
            }
        }

        if !loose.trim().is_empty() {
            self.warn("numerus translation has text outside <numerusform>, kept as a form".into());
            if forms.is_empty() {
                forms.push(loose);
            } else {
                forms.push(loose.trim().to_string());
            }
        }
        Ok(forms)
    }

    /// Collects the `<lengthvariant>` children of a `variants="yes"` element.
    fn length_variants(&mut self, tag: &str) -> Result<Vec<String>, CatalogError> {
        let mut variants = Vec::new();
        loop {
            match self.next()? {
                Event::Start(e) if e.name().as_ref() == b"lengthvariant" => {
                    variants.push(self.text("lengthvariant")?);
                }
                Event::Empty(e) if e.name().as_ref() == b"lengthvariant" => {
                    variants.push(String::new());
                }
                Event::Start(e) => self.skip(&e)?,
                Event::Text(t) if !is_blank(&t) => {
                    return Err(self.malformed(format!("text outside <lengthvariant> in <{tag}>")));
                }
                Event::End(_) => return Ok(variants),
                Event::Eof => {
                    return Err(self.malformed(format!("unexpected end of document in <{tag}>")));
                }
                _ => {}
            }
        }
    }

    /// Collects the text content of a leaf element, up to its end tag.
    fn text(&mut self, tag: &str) -> Result<String, CatalogError> {
        let mut out = String::new();
        loop {
            match self.next()? {
                Event::Text(t) => {
                    let text = t.unescape().map_err(|e| self.malformed(e.to_string()))?;
                    out.push_str(&text);
                }
                Event::CData(c) => out.push_str(&String::from_utf8_lossy(&c)),
                Event::Start(e) | Event::Empty(e) => {
                    return Err(self.malformed(format!(
                        "unexpected element <{}> inside <{tag}>",
                        tag_name(&e)
                    )));
                }
                Event::End(_) => return Ok(out),
                Event::Eof => {
                    return Err(self.malformed(format!("unexpected end of document in <{tag}>")));
                }
                _ => {}
            }
        }
    }
}

fn tag_name(start: &BytesStart) -> String {
    String::from_utf8_lossy(start.name().as_ref()).into_owned()
}

fn is_blank(text: &[u8]) -> bool {
    text.iter().all(|b| b.is_ascii_whitespace())
}
