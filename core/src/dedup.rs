use crate::error::Result;
use crate::index::SearchServer;
use crate::{DocId, ExecutionMode};

/// Ids of documents whose distinct indexed words equal those of a lower id.
///
/// Every live pair is compared, so this is quadratic in the document count. Documents
/// already marked are skipped on both sides; documents with no indexed words never match.
pub fn find_duplicates(server: &SearchServer) -> Vec<DocId> {
    let documents: Vec<(DocId, _)> = server
        .iter()
        .map(|id| (id, server.word_frequencies(id)))
        .filter(|(_, words)| !words.is_empty())
        .collect();

    let mut marked = vec![false; documents.len()];
    for i in 0..documents.len() {
        if marked[i] { continue; }
        for j in i + 1..documents.len() {
            if !marked[j] && documents[i].1.keys().eq(documents[j].1.keys()) {
                marked[j] = true;
            }
        }
    }

    documents
        .iter()
        .zip(&marked)
        .filter(|(_, is_duplicate)| **is_duplicate)
        .map(|((id, _), _)| *id)
        .collect()
}

pub fn remove_duplicates(server: &mut SearchServer) -> Result<Vec<DocId>> {
    remove_duplicates_with(server, ExecutionMode::Sequential)
}

/// Remove every duplicate found by [`find_duplicates`]; returns the removed ids, ascending.
pub fn remove_duplicates_with(server: &mut SearchServer, mode: ExecutionMode) -> Result<Vec<DocId>> {
    let duplicates = find_duplicates(server);
    for &document_id in &duplicates {
        tracing::info!(document_id, "found duplicate document");
        server.remove_document_with(mode, document_id)?;
    }
    tracing::info!(removed = duplicates.len(), remaining = server.document_count(), "duplicate removal finished");
    Ok(duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DocumentStatus;

    #[test]
    fn word_order_and_repetition_do_not_matter() {
        let mut server = SearchServer::new("and").unwrap();
        server.add_document(1, "funny pet and nasty rat", DocumentStatus::Actual, &[1]).unwrap();
        server.add_document(2, "funny funny pet and nasty nasty rat", DocumentStatus::Actual, &[1]).unwrap();
        server.add_document(3, "rat nasty pet funny", DocumentStatus::Banned, &[1]).unwrap();
        assert_eq!(find_duplicates(&server), vec![2, 3]);
    }

    #[test]
    fn subsets_are_not_duplicates() {
        let mut server = SearchServer::default();
        server.add_document(1, "pet rat", DocumentStatus::Actual, &[]).unwrap();
        server.add_document(2, "pet", DocumentStatus::Actual, &[]).unwrap();
        assert!(find_duplicates(&server).is_empty());
    }

    #[test]
    fn unindexed_documents_are_ignored() {
        let mut server = SearchServer::new("and").unwrap();
        server.add_document(1, "and", DocumentStatus::Actual, &[]).unwrap();
        server.add_document(2, "and and", DocumentStatus::Actual, &[]).unwrap();
        assert!(find_duplicates(&server).is_empty());
    }
}
