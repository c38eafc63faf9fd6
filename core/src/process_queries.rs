use crate::error::Result;
use crate::index::SearchServer;
use crate::parallel;
use crate::Document;
use rayon::prelude::*;

/// Run every query against the server on the worker pool. Results keep query order;
/// the first malformed query fails the whole batch.
pub fn process_queries<Q>(server: &SearchServer, queries: &[Q]) -> Result<Vec<Vec<Document>>>
where
    Q: AsRef<str> + Sync,
{
    parallel::install(|| {
        queries
            .par_iter()
            .map(|query| server.find_top_documents(query.as_ref()))
            .collect()
    })
}

/// Like [`process_queries`], with all result lists concatenated in query order.
pub fn process_queries_joined<Q>(server: &SearchServer, queries: &[Q]) -> Result<Vec<Document>>
where
    Q: AsRef<str> + Sync,
{
    Ok(process_queries(server, queries)?.into_iter().flatten().collect())
}
