//! Parallel Multi-Document Parsing
//!
//! Uses Rayon to parse independent documents concurrently. Every document gets
//! its own parser built by a caller factory, so no state is shared between
//! workers.

use rayon::prelude::*;

use super::parser::TagParser;
use crate::error::Result;
use crate::reader::ContentHandler;

/// Parse each document with a fresh handler and map the finished handler to a result
///
/// Results are returned in input order. A failing document does not stop the
/// others.
pub fn parse_many<D, H, F, G, T>(documents: &[D], make_handler: F, collect: G) -> Vec<Result<T>>
where
    D: AsRef<[u8]> + Sync,
    H: ContentHandler,
    F: Fn() -> H + Sync,
    G: Fn(H) -> T + Sync,
    T: Send,
{
    documents
        .par_iter()
        .map(|document| {
            let mut parser = TagParser::new(make_handler());
            parser.parse_from([document.as_ref()])?;
            Ok(collect(parser.into_handler()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sax::{Canonicalizer, PathTracker, TagAdapter, Variable};

    fn variables() -> TagAdapter<PathTracker<Canonicalizer<Vec<Variable>>>> {
        TagAdapter::new(PathTracker::new(Canonicalizer::new(Vec::new())))
    }

    #[test]
    fn test_results_in_input_order() {
        let docs: Vec<String> = (0..32).map(|i| format!("<n>{i}</n>")).collect();
        let results = parse_many(&docs, variables, |h| h.into_sink().into_sink().into_sink());
        for (i, result) in results.into_iter().enumerate() {
            let vars = result.unwrap();
            assert_eq!(vars[2], Variable::new("/n/", i.to_string()));
        }
    }

    #[test]
    fn test_failure_is_per_document() {
        let docs = ["<a/>", "<a><b></a>", "<c/>"];
        let results = parse_many(&docs, variables, |h| h.depth());
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(Error::Malformed(_))));
        assert!(results[2].is_ok());
    }
}
