use serde::Serialize;

use crate::model::catalog::{Catalog, MessageStatus};

#[derive(Debug, Serialize, Clone, PartialEq, Default)]
pub struct CatalogStats {
    pub contexts: usize,
    pub messages: usize,
    pub finished: usize,
    pub unfinished: usize,
    pub vanished: usize,
    pub obsolete: usize,
    /// finished / (finished + unfinished)
    pub completion: f64,
}

pub fn compute(catalog: &Catalog) -> CatalogStats {
    let mut stats = CatalogStats {
        contexts: catalog.contexts.len(),
        ..Default::default()
    };

    for (_, m) in catalog.messages() {
        stats.messages += 1;
        match m.status {
            MessageStatus::Finished => stats.finished += 1,
            MessageStatus::Unfinished => stats.unfinished += 1,
            MessageStatus::Vanished => stats.vanished += 1,
            MessageStatus::Obsolete => stats.obsolete += 1,
        }
    }

    let live = stats.finished + stats.unfinished;
    stats.completion = if live == 0 {
        1.0
    } else {
        stats.finished as f64 / live as f64
    };

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::catalog::{Context, Message};

    #[test]
    fn counts_each_status() {
        let mut catalog = Catalog::new("ko");
        let mut ctx = Context::new("About");
        ctx.messages.push(Message::translated("Altitude", "고도"));
        ctx.messages.push(Message::new("QField Version: %1"));
        ctx.messages.push(Message::new("Buy the Karma edition"));
        let mut gone = Message::translated("Old", "옛");
        gone.status = MessageStatus::Vanished;
        ctx.messages.push(gone);
        catalog.contexts.push(ctx);
        catalog.contexts.push(Context::new("Empty"));

        let stats = compute(&catalog);
        assert_eq!(stats.contexts, 2);
        assert_eq!(stats.messages, 4);
        assert_eq!(stats.finished, 1);
        assert_eq!(stats.unfinished, 2);
        assert_eq!(stats.vanished, 1);
        assert!((stats.completion - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_catalog_is_complete() {
        assert_eq!(compute(&Catalog::new("ko")).completion, 1.0);
    }
}
