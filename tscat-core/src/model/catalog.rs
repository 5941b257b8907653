use serde::{Deserialize, Serialize};

fn default_version() -> String {
    "2.1".to_string()
}

/// A whole translation catalog for one target language.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub language: String,

    #[serde(default, alias = "sourcelanguage")]
    pub source_language: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub contexts: Vec<Context>,
}

impl Catalog {
    pub fn new(language: impl Into<String>) -> Self {
        Catalog {
            language: language.into(),
            source_language: None,
            version: default_version(),
            contexts: Vec::new(),
        }
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_mut(&mut self, name: &str) -> Option<&mut Context> {
        self.contexts.iter_mut().find(|c| c.name == name)
    }

    /// Iterates `(context name, message)` pairs in document order.
    pub fn messages(&self) -> impl Iterator<Item = (&str, &Message)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn messages_mut(&mut self) -> impl Iterator<Item = (&str, &mut Message)> {
        self.contexts.iter_mut().flat_map(|c| {
            let name = c.name.as_str();
            c.messages.iter_mut().map(move |m| (name, m))
        })
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }
}

/// Messages originating from one logical UI area.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Context {
    pub name: String,

    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Context {
    pub fn new(name: impl Into<String>) -> Self {
        Context {
            name: name.into(),
            messages: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct Message {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub locations: Vec<Location>,

    pub source: String,

    /// Length variants of the source; `source` holds the first one.
    #[serde(default)]
    pub source_variants: Vec<String>,

    #[serde(default)]
    pub oldsource: Option<String>,

    /// Disambiguation comment written by the developer.
    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub translator_comment: Option<String>,

    #[serde(default)]
    pub translation: String,

    /// Length variants of the translation; `translation` holds the first one.
    #[serde(default)]
    pub translation_variants: Vec<String>,

    #[serde(default)]
    pub numerus: bool,

    /// Plural forms, only meaningful when `numerus` is set.
    #[serde(default)]
    pub numerus_forms: Vec<String>,

    #[serde(default)]
    pub status: MessageStatus,
}

impl Message {
    pub fn new(source: impl Into<String>) -> Self {
        Message {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn translated(source: impl Into<String>, translation: impl Into<String>) -> Self {
        Message {
            source: source.into(),
            translation: translation.into(),
            status: MessageStatus::Finished,
            ..Default::default()
        }
    }

    /// True when no translated text exists (all numerus forms count).
    pub fn is_untranslated(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().all(|f| f.is_empty())
        } else {
            self.translation.is_empty()
        }
    }

    /// Translated texts: the plural forms for numerus messages, the single
    /// translation otherwise.
    pub fn translated_texts(&self) -> Vec<&str> {
        if self.numerus {
            self.numerus_forms.iter().map(String::as_str).collect()
        } else {
            vec![self.translation.as_str()]
        }
    }

    pub fn set_translation(&mut self, text: String) {
        if self.numerus {
            if self.numerus_forms.is_empty() {
                self.numerus_forms.push(text);
            } else {
                for form in self.numerus_forms.iter_mut() {
                    *form = text.clone();
                }
            }
        } else {
            self.translation_variants.clear();
            self.translation = text;
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,

    #[serde(default)]
    pub line: Option<String>,
}

/// Translation state. Protocol payloads without a `status` field are
/// unfinished, unlike markup where a missing `type` means finished.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[serde(rename_all = "snake_case")]
pub enum MessageStatus {
    Finished,
    #[default]
    Unfinished,
    Vanished,
    /// Older spelling of `Vanished`.
    Obsolete,
}

impl MessageStatus {
    /// Value of the `type` attribute, `None` for finished messages.
    pub fn as_attr(self) -> Option<&'static str> {
        match self {
            MessageStatus::Finished => None,
            MessageStatus::Unfinished => Some("unfinished"),
            MessageStatus::Vanished => Some("vanished"),
            MessageStatus::Obsolete => Some("obsolete"),
        }
    }

    pub fn from_attr(value: &str) -> Option<Self> {
        match value {
            "finished" => Some(MessageStatus::Finished),
            "unfinished" => Some(MessageStatus::Unfinished),
            "vanished" => Some(MessageStatus::Vanished),
            "obsolete" => Some(MessageStatus::Obsolete),
            _ => None,
        }
    }

    /// Vanished and obsolete messages no longer exist upstream.
    pub fn is_gone(self) -> bool {
        matches!(self, MessageStatus::Vanished | MessageStatus::Obsolete)
    }
}
