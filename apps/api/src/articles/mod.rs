// Article intake: selection from the `articles` table and optional page-text enrichment.
// Ranking itself is computed upstream; this side only reads it.

pub mod enrich;
pub mod fetcher;
