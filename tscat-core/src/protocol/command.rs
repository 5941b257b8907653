#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ping,
    CatalogParse,
    CatalogSerialize,
    CatalogLoad,
    CatalogSave,
    CatalogStats,
    CatalogMerge,
    RunQa,
    DetectEncoding,
    TmHarvest,
    TranslateEntries,
    TranslateWithTm,
    Unknown,
}

impl Command {
    pub fn is_catalog(self) -> bool {
        matches!(
            self,
            Command::CatalogParse
                | Command::CatalogSerialize
                | Command::CatalogLoad
                | Command::CatalogSave
                | Command::CatalogStats
                | Command::CatalogMerge
        )
    }
}

impl From<&str> for Command {
    fn from(s: &str) -> Self {
        match s {
            "ping" => Command::Ping,
            "catalog.parse" => Command::CatalogParse,
            "catalog.serialize" => Command::CatalogSerialize,
            "catalog.load" => Command::CatalogLoad,
            "catalog.save" => Command::CatalogSave,
            "catalog.stats" => Command::CatalogStats,
            "catalog.merge" => Command::CatalogMerge,
            "run_qa" => Command::RunQa,
            "detect_encoding" | "encoding.detect" => Command::DetectEncoding,
            "tm.harvest" => Command::TmHarvest,
            "translate_entries" => Command::TranslateEntries,
            "translate_with_tm" => Command::TranslateWithTm,
            _ => Command::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!(Command::from("encoding.detect"), Command::DetectEncoding);
        assert_eq!(Command::from("detect_encoding"), Command::DetectEncoding);
        assert_eq!(Command::from("catalog.merge"), Command::CatalogMerge);
        assert!(Command::from("catalog.load").is_catalog());
        assert!(!Command::from("run_qa").is_catalog());
        assert_eq!(Command::from("project.open"), Command::Unknown);
    }
}
